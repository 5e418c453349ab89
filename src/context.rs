//! Shared transmit context.
//!
//! One instance lives for the life of the transmitter and is shared between
//! the submitting caller and the compare-match interrupt.
//!
//! # Ownership
//!
//! ```text
//! timer stopped ──▶ caller may write (start, abort)
//! timer running ──▶ interrupt writes (step write-back)
//!                   caller may only clear status (abort)
//! ```
//!
//! All access goes through atomics, so the context can sit in a `static`
//! and be touched from interrupt context without locks.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Steps in one frame: 32 data bits plus the trailer.
pub const FRAME_STEPS: u8 = 33;

/// Packed progress word.
///
/// ```text
///   7       6      5..0
/// [phase][repeat][remaining_bits]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    const REMAINING_MASK: u8 = 0x3F;
    const REPEAT_EN: u8 = 0x40;
    const REPEAT_PHASE: u8 = 0x80;

    /// Nothing in flight.
    pub const IDLE: Self = Self(0);

    /// Assemble from fields. `remaining_bits` is masked to 6 bits.
    #[inline]
    pub const fn new(remaining_bits: u8, repeat_enabled: bool, repeat_phase: bool) -> Self {
        let mut bits = remaining_bits & Self::REMAINING_MASK;
        if repeat_enabled {
            bits |= Self::REPEAT_EN;
        }
        if repeat_phase {
            bits |= Self::REPEAT_PHASE;
        }
        Self(bits)
    }

    /// Status loaded by an accepted submission.
    #[inline]
    pub const fn armed(repeat: bool) -> Self {
        Self::new(FRAME_STEPS, repeat, false)
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn remaining_bits(self) -> u8 {
        self.0 & Self::REMAINING_MASK
    }

    #[inline]
    pub const fn repeat_enabled(self) -> bool {
        self.0 & Self::REPEAT_EN != 0
    }

    #[inline]
    pub const fn repeat_phase(self) -> bool {
        self.0 & Self::REPEAT_PHASE != 0
    }

    #[inline]
    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }

    /// Logical phase for diagnostics.
    pub const fn phase(self) -> TxPhase {
        if self.is_idle() {
            TxPhase::Idle
        } else if self.remaining_bits() > 0 {
            TxPhase::Frame {
                remaining_bits: self.remaining_bits(),
            }
        } else if self.repeat_phase() {
            TxPhase::RepeatPulse
        } else {
            TxPhase::RepeatGap
        }
    }
}

/// Where the state machine stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    /// Data bits or trailer still to emit.
    Frame { remaining_bits: u8 },
    /// Trailer or long gap in flight; next step emits the repeat pulse.
    RepeatGap,
    /// Repeat pulse in flight; next step emits the long gap.
    RepeatPulse,
}

/// Code word and status as seen by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub code: u32,
    pub status: Status,
}

impl Frame {
    pub const IDLE: Self = Self {
        code: 0,
        status: Status::IDLE,
    };
}

/// The single shared context.
pub struct TransmitContext {
    code: AtomicU32,
    status: AtomicU8,
}

impl TransmitContext {
    pub const fn new() -> Self {
        Self {
            code: AtomicU32::new(0),
            status: AtomicU8::new(0),
        }
    }

    /// Load a new frame. Only valid while the timer is stopped.
    ///
    /// Status is published last so a reader that sees it non-idle also
    /// sees the code.
    #[inline]
    pub fn load(&self, code: u32, status: Status) {
        self.code.store(code, Ordering::Relaxed);
        self.status.store(status.bits(), Ordering::Release);
    }

    #[inline]
    pub fn snapshot(&self) -> Frame {
        let status = Status(self.status.load(Ordering::Acquire));
        Frame {
            code: self.code.load(Ordering::Relaxed),
            status,
        }
    }

    #[inline]
    pub fn status(&self) -> Status {
        Status(self.status.load(Ordering::Acquire))
    }

    /// Interrupt write-back.
    ///
    /// The status is only replaced if it still equals `seen.status`; a
    /// concurrent clear stays cleared and a frame loaded after the timer
    /// halted is left alone. Returns `false` in that case.
    #[inline]
    pub fn commit(&self, seen: Frame, next: Frame) -> bool {
        let swapped = self
            .status
            .compare_exchange(
                seen.status.0,
                next.status.0,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if swapped && next.code != seen.code {
            self.code.store(next.code, Ordering::Relaxed);
        }
        swapped
    }

    /// Clear status unconditionally. Returns the status that was replaced.
    #[inline]
    pub fn clear(&self) -> Status {
        Status(self.status.swap(0, Ordering::AcqRel))
    }
}

impl Default for TransmitContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_fields() {
        let status = Status::new(17, true, false);
        assert_eq!(status.remaining_bits(), 17);
        assert!(status.repeat_enabled());
        assert!(!status.repeat_phase());
        assert_eq!(status.bits(), 0x51);
    }

    #[test]
    fn test_armed_status() {
        assert_eq!(Status::armed(false).bits(), 33);
        assert_eq!(Status::armed(true).bits(), 33 | 0x40);
    }

    #[test]
    fn test_phase_mapping() {
        assert_eq!(Status::IDLE.phase(), TxPhase::Idle);
        assert_eq!(
            Status::armed(false).phase(),
            TxPhase::Frame { remaining_bits: 33 }
        );
        assert_eq!(Status::new(0, true, false).phase(), TxPhase::RepeatGap);
        assert_eq!(Status::new(0, true, true).phase(), TxPhase::RepeatPulse);
    }

    #[test]
    fn test_commit_respects_clear() {
        let ctx = TransmitContext::new();
        ctx.load(0xAA, Status::armed(true));

        let seen = ctx.snapshot();
        let cleared = ctx.clear();
        assert_eq!(cleared, seen.status);

        let next = Frame {
            code: 0x55,
            status: Status::new(32, true, false),
        };
        assert!(!ctx.commit(seen, next));
        assert!(ctx.status().is_idle());
        assert_eq!(ctx.snapshot().code, 0xAA);
    }

    #[test]
    fn test_commit_applies() {
        let ctx = TransmitContext::new();
        ctx.load(0b10, Status::armed(false));

        let seen = ctx.snapshot();
        let next = Frame {
            code: 0b1,
            status: Status::new(32, false, false),
        };
        assert!(ctx.commit(seen, next));
        assert_eq!(ctx.snapshot(), next);
    }
}
