//! Register-level timer stand-in.
//!
//! On host: records what the scheduler writes so tests can check the
//! pulse train cycle by cycle. Nothing here generates real interrupts;
//! the test calls `on_compare_match()` where the hardware would.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use crate::timer::PulseTimer;

/// Simulated PWM timer with buffered period/compare registers.
pub struct SimTimer {
    running: AtomicBool,
    fault: AtomicBool,
    period: AtomicU16,
    pulse: AtomicU16,
    starts: AtomicU32,
    halts: AtomicU32,
    loads: AtomicU32,
    now_us: AtomicU32,
}

impl SimTimer {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            fault: AtomicBool::new(false),
            period: AtomicU16::new(0),
            pulse: AtomicU16::new(0),
            starts: AtomicU32::new(0),
            halts: AtomicU32::new(0),
            loads: AtomicU32::new(0),
            now_us: AtomicU32::new(0),
        }
    }

    /// `(period, pulse)` currently in the buffered registers.
    pub fn next_cycle(&self) -> (u16, u16) {
        (
            self.period.load(Ordering::Acquire),
            self.pulse.load(Ordering::Acquire),
        )
    }

    /// Number of times the clock was enabled.
    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::Relaxed)
    }

    /// Number of times the clock was disabled.
    pub fn halts(&self) -> u32 {
        self.halts.load(Ordering::Relaxed)
    }

    /// Number of buffered register writes.
    pub fn loads(&self) -> u32 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Make every start command fail, as an unconfigured timer does.
    pub fn set_fault(&self, fault: bool) {
        self.fault.store(fault, Ordering::Release);
    }

    /// Move the timestamp source forward.
    pub fn advance_us(&self, us: u32) {
        self.now_us.fetch_add(us, Ordering::Relaxed);
    }
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseTimer for SimTimer {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn run(&self) -> bool {
        if self.fault.load(Ordering::Acquire) {
            return false;
        }
        self.starts.fetch_add(1, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
        true
    }

    fn halt(&self) {
        self.halts.fetch_add(1, Ordering::Relaxed);
        self.running.store(false, Ordering::Release);
    }

    fn load_next(&self, period_ticks: u16, pulse_ticks: u16) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.period.store(period_ticks, Ordering::Release);
        self.pulse.store(pulse_ticks, Ordering::Release);
    }

    fn now_us(&self) -> i64 {
        self.now_us.load(Ordering::Relaxed) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_timer_registers() {
        let timer = SimTimer::new();
        assert!(!timer.is_running());

        timer.load_next(100, 10);
        assert!(timer.run());
        assert!(timer.is_running());
        assert_eq!(timer.next_cycle(), (100, 10));

        timer.halt();
        assert!(!timer.is_running());
        assert_eq!((timer.starts(), timer.halts(), timer.loads()), (1, 1, 1));
    }

    #[test]
    fn test_sim_timer_fault_blocks_start() {
        let timer = SimTimer::new();
        timer.set_fault(true);
        assert!(!timer.run());
        assert!(!timer.is_running());
        assert_eq!(timer.starts(), 0);

        timer.set_fault(false);
        assert!(timer.run());
        assert!(timer.is_running());
    }

    #[test]
    fn test_sim_timer_clock() {
        let timer = SimTimer::new();
        timer.advance_us(1500);
        timer.advance_us(500);
        assert_eq!(timer.now_us(), 2000);
    }
}
