//! Module: config
//!
//! Purpose: Configuration for RustNecTx.
//!
//! Architecture:
//! - Clock constants are fixed at build time; [`TIMER_CLOCK`] is derived
//!   in a `const`, so an unusable source clock fails the build
//! - Pin and interrupt routing are runtime values passed to `hal::init`
//!
//! Safety: RT-safe. Nothing here is mutated after startup.

use crate::timing::TimerClock;

/// Base resolution requested from the MCPWM group clock.
pub const TIMER_SOURCE_HZ: u32 = 10_000_000;

/// Divisors applied on top of [`TIMER_SOURCE_HZ`]; ascending.
pub const TIMER_PRESCALERS: &[u32] = &[1, 2, 4, 8, 16, 32, 64, 128];

/// Timer clock used by the board transmitter.
pub const TIMER_CLOCK: TimerClock = match TimerClock::derive(TIMER_SOURCE_HZ, TIMER_PRESCALERS) {
    Ok(clock) => clock,
    Err(_) => panic!("TIMER_SOURCE_HZ is unusable with TIMER_PRESCALERS"),
};

/// Output and interrupt routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NecConfig {
    /// GPIO driving the IR LED stage.
    pub output_pin: i32,
    /// MCPWM group.
    pub group_id: i32,
    /// Interrupt priority, 0 lets the driver choose.
    pub intr_priority: i32,
}

impl Default for NecConfig {
    fn default() -> Self {
        Self {
            output_pin: 4,
            group_id: 0,
            intr_priority: 0,
        }
    }
}
