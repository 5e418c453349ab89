//! Pulse timer contract.
//!
//! The narrow surface the scheduler needs from the hardware. One
//! implementation per board ([`crate::hal`]), plus [`crate::sim::SimTimer`]
//! for host tests.
//!
//! The timer runs in a PWM mode where the output goes high at the start of
//! each cycle, low when the counter reaches the compare value, and the cycle
//! ends at the period value. A compare-match interrupt calls
//! [`crate::scheduler::NecTransmitter::on_compare_match`].

/// Hardware timer driving the IR output.
///
/// Methods take `&self`: they stand for register writes, and are called
/// from both the caller and the interrupt.
pub trait PulseTimer: Sync {
    /// True while the timer clock is enabled.
    ///
    /// This is the transmitter's busy signal.
    fn is_running(&self) -> bool;

    /// Enable the timer clock.
    ///
    /// Returns false when the hardware did not start; the timer stays
    /// stopped and `is_running` stays false.
    fn run(&self) -> bool;

    /// Disable the timer clock. Takes effect without waiting for the caller.
    fn halt(&self);

    /// Write period and compare values into the buffered registers.
    ///
    /// The new values apply from the next cycle; the cycle in flight is
    /// never disturbed.
    fn load_next(&self, period_ticks: u16, pulse_ticks: u16);

    /// Monotonic timestamp for log entries.
    fn now_us(&self) -> i64;
}

