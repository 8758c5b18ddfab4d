//! Domain layer: pure word-chain logic, no I/O.

pub mod chain;
pub mod kana;

pub use chain::{is_valid_transition, prefix, suffix};

#[cfg(test)]
mod tests_chain;
