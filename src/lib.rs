//! # RustNecTx
//!
//! NEC infrared transmitter driven by a hardware timer and its
//! compare-match interrupt. No busy-waiting: `send` arms the timer and
//! returns, the interrupt shapes every pulse.
//!
//! ## Architecture
//!
//! ```text
//! code ──▶ scheduler ──▶ PulseTimer ──▶ IR LED
//!            ▲                │
//!            └── compare ISR ◀┘
//! ```
//!
//! - [`code`]: command/address packing, pure
//! - [`scheduler`]: state machine, start/abort entry points
//! - [`timer`]: the narrow hardware contract
//! - [`hal`]: MCPWM implementation and global API (ESP-IDF only)
//!
//! One frame in flight at a time. No queues, no mutexes, no allocation.

#![cfg_attr(not(test), no_std)]

pub mod code;
pub mod config;
pub mod context;
pub mod error;
pub mod hal;
pub mod logging;
pub mod scheduler;
pub mod sim;
pub mod stats;
pub mod timer;
pub mod timing;
pub mod uart_logger;

pub use code::{encode, encode_extended, NecCode};
pub use config::{NecConfig, TIMER_CLOCK};
pub use context::{Status, TxPhase};
pub use error::NecError;
pub use scheduler::NecTransmitter;
pub use timer::PulseTimer;
pub use timing::{ClockError, TimerClock};
