//! Transmit counters.
//!
//! Lock-free, callable from the compare-match interrupt. Counters wrap and
//! are never cleared except by [`TxStats::reset`].

use core::sync::atomic::{AtomicU32, Ordering};

/// Running totals since boot.
///
/// # Usage
///
/// ```ignore
/// let before = tx.stats().snapshot();
/// let _ = tx.send(0x10, 0x34, false);
/// // ... frame runs ...
/// let after = tx.stats().snapshot();
/// assert_eq!(after.frames - before.frames, 1);
/// ```
pub struct TxStats {
    /// Submissions accepted by start.
    accepted: AtomicU32,

    /// Submissions rejected as busy.
    rejected: AtomicU32,

    /// Frames that reached their trailer.
    frames: AtomicU32,

    /// Repeat pulses emitted.
    repeats: AtomicU32,

    /// Abort calls that cleared an active transmission.
    aborts: AtomicU32,
}

impl TxStats {
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
            frames: AtomicU32::new(0),
            repeats: AtomicU32::new(0),
            aborts: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_repeat(&self) {
        self.repeats.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.frames.store(0, Ordering::Relaxed);
        self.repeats.store(0, Ordering::Relaxed);
        self.aborts.store(0, Ordering::Relaxed);
    }

    /// Get a snapshot of the current counters.
    #[inline]
    pub fn snapshot(&self) -> TxStatsSnapshot {
        TxStatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            repeats: self.repeats.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
        }
    }
}

impl Default for TxStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxStatsSnapshot {
    pub accepted: u32,
    pub rejected: u32,
    pub frames: u32,
    pub repeats: u32,
    pub aborts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let stats = TxStats::new();

        stats.record_accepted();
        stats.record_rejected();
        stats.record_rejected();
        stats.record_frame();
        stats.record_repeat();
        stats.record_abort();

        let snap = stats.snapshot();
        assert_eq!(snap.accepted, 1);
        assert_eq!(snap.rejected, 2);
        assert_eq!(snap.frames, 1);
        assert_eq!(snap.repeats, 1);
        assert_eq!(snap.aborts, 1);
    }

    #[test]
    fn test_stats_reset() {
        let stats = TxStats::new();
        stats.record_accepted();
        stats.reset();
        assert_eq!(stats.snapshot(), TxStatsSnapshot::default());
    }
}
