//! Backend test support utilities
//!
//! This crate provides utilities specifically for backend testing, currently
//! unified logging initialization shared by unit and integration tests.

pub mod logging;
