//! WebSocket layer: wire protocol types and the per-connection adapter.

pub mod protocol;
pub mod session;
