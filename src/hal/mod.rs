//! Hardware Abstraction Layer for RustNecTx.
//!
//! Thin wrapper around the ESP-IDF MCPWM driver.
//! Protocol logic stays in [`crate::scheduler`], HAL is just registers.

#[cfg(target_os = "espidf")]
pub mod mcpwm;

#[cfg(target_os = "espidf")]
pub use mcpwm::{abort, init, is_busy, send, send_extended, send_raw, transmitter, McpwmTimer};
