//! Interrupt-driven NEC pulse scheduler.
//!
//! # Flow
//!
//! ```text
//! caller                      timer                     compare ISR
//! ──────                      ─────                     ───────────
//! start(code) ──load ctx──▶   run()
//!                             leader (primed) ───────▶  step(): bit 0
//!                             bit 0 ─────────────────▶  step(): bit 1
//!                             ...                       ...
//!                             bit 31 ────────────────▶  step(): trailer
//!                             trailer ───────────────▶  step(): halt, prime leader
//! ```
//!
//! Each step writes the *next* cycle into the buffered registers, so the
//! interrupt always runs one cycle ahead of the wire.
//!
//! # Rules
//!
//! - The caller writes the context only while the timer is stopped
//! - The interrupt writes the context only while the timer runs
//! - `abort` may clear the status at any time; nothing else crosses over

use crate::code::{encode, encode_extended};
use crate::context::{Frame, Status, TransmitContext, TxPhase};
use crate::error::NecError;
use crate::logging::{LogStream, TxEvent};
use crate::stats::TxStats;
use crate::timer::PulseTimer;
use crate::timing::{
    Shape, TimerClock, BIT_ONE, BIT_ZERO, LEADER, REPEAT_GAP, REPEAT_PULSE, TRAILER,
};

/// Outcome of one state machine step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Context after the step.
    pub next: Frame,
    /// Cycle to program into the buffered registers.
    pub shape: Shape,
    /// Stop the timer clock.
    pub halt: bool,
}

/// Advance the state machine by one timer cycle.
///
/// Total over every status encoding; never panics, never allocates.
pub const fn step(frame: Frame) -> Step {
    let status = frame.status;
    let mut code = frame.code;
    let mut remaining = status.remaining_bits();
    let repeat_enabled = status.repeat_enabled();
    let mut repeat_phase = status.repeat_phase();

    if remaining > 0 {
        remaining -= 1;

        let shape = if remaining > 0 {
            let bit = if code & 1 == 0 { BIT_ZERO } else { BIT_ONE };
            code >>= 1;
            bit
        } else {
            TRAILER
        };

        Step {
            next: Frame {
                code,
                status: Status::new(remaining, repeat_enabled, repeat_phase),
            },
            shape,
            halt: false,
        }
    } else if repeat_enabled {
        repeat_phase = !repeat_phase;

        Step {
            next: Frame {
                code,
                status: Status::new(0, true, repeat_phase),
            },
            shape: if repeat_phase { REPEAT_PULSE } else { REPEAT_GAP },
            halt: false,
        }
    } else {
        Step {
            next: Frame {
                code,
                status: Status::IDLE,
            },
            shape: LEADER,
            halt: true,
        }
    }
}

/// NEC transmitter bound to one pulse timer.
///
/// Can live in a `static` when `T` has a const constructor; see
/// [`crate::hal`] for the board instance.
///
/// # Example
///
/// ```
/// use rust_nec_tx::scheduler::NecTransmitter;
/// use rust_nec_tx::sim::SimTimer;
/// use rust_nec_tx::timing::TimerClock;
///
/// let clock = TimerClock::derive(1_000_000, &[1, 8, 64]).unwrap();
/// let tx = NecTransmitter::new(SimTimer::new(), clock);
///
/// tx.send(0x10, 0x34, false).unwrap();
/// assert!(tx.send(0x11, 0x34, false).is_err());
///
/// while tx.is_busy() {
///     tx.on_compare_match();
/// }
/// ```
pub struct NecTransmitter<T: PulseTimer> {
    ctx: TransmitContext,
    timer: T,
    clock: TimerClock,
    stats: TxStats,
    log: LogStream,
}

impl<T: PulseTimer> NecTransmitter<T> {
    pub const fn new(timer: T, clock: TimerClock) -> Self {
        Self {
            ctx: TransmitContext::new(),
            timer,
            clock,
            stats: TxStats::new(),
            log: LogStream::new(),
        }
    }

    /// Prime the buffered registers with the leader cycle.
    ///
    /// Call once after the hardware is configured and before the first
    /// start, with the timer stopped.
    pub fn prime(&self) {
        let (period, pulse) = self.clock.shape_ticks(LEADER);
        self.timer.load_next(period, pulse);
    }

    /// Submit a raw code word.
    ///
    /// Never blocks. If a frame is in flight the request is dropped and
    /// `NecError::Busy` is returned; the caller decides whether to retry.
    pub fn start(&self, code: u32, repeat: bool) -> Result<(), NecError> {
        if self.timer.is_running() {
            self.stats.record_rejected();
            self.log.record(self.timer.now_us(), TxEvent::Rejected { code });
            return Err(NecError::Busy);
        }

        // Timer stopped: no interrupt can observe these writes.
        self.ctx.load(code, Status::armed(repeat));
        if !self.timer.run() {
            // Nothing will consume the frame
            self.ctx.clear();
            self.stats.record_rejected();
            self.log.record(self.timer.now_us(), TxEvent::Rejected { code });
            return Err(NecError::Busy);
        }

        self.stats.record_accepted();
        self.log
            .record(self.timer.now_us(), TxEvent::Accepted { code, repeat });
        Ok(())
    }

    /// Send a standard NEC command.
    #[inline]
    pub fn send(&self, command: u8, address: u8, repeat: bool) -> Result<(), NecError> {
        self.start(encode(command, address), repeat)
    }

    /// Send an extended NEC command (16-bit address).
    #[inline]
    pub fn send_extended(&self, command: u8, address: u16, repeat: bool) -> Result<(), NecError> {
        self.start(encode_extended(command, address), repeat)
    }

    /// Send a raw 32-bit code word.
    #[inline]
    pub fn send_raw(&self, code: u32, repeat: bool) -> Result<(), NecError> {
        self.start(code, repeat)
    }

    /// Stop the current transmission and any repeats.
    ///
    /// The pulse on the wire finishes; the next interrupt halts the timer.
    /// No-op when idle.
    pub fn abort(&self) {
        let previous = self.ctx.clear();
        if !previous.is_idle() {
            self.stats.record_abort();
            self.log.record(
                self.timer.now_us(),
                TxEvent::Aborted {
                    remaining_bits: previous.remaining_bits(),
                },
            );
        }
    }

    /// Compare-match interrupt body. Advances exactly one step.
    pub fn on_compare_match(&self) {
        let frame = self.ctx.snapshot();
        let step = step(frame);

        if step.halt {
            self.timer.halt();
        }

        let (period, pulse) = self.clock.shape_ticks(step.shape);
        self.timer.load_next(period, pulse);

        // An abort or start that raced this step owns the context now
        if self.ctx.commit(frame, step.next) {
            self.note_step(&step);
        }
    }

    fn note_step(&self, step: &Step) {
        match step.shape {
            TRAILER => {
                self.stats.record_frame();
                self.log.record(self.timer.now_us(), TxEvent::FrameSent);
            }
            REPEAT_PULSE => self.stats.record_repeat(),
            LEADER if step.halt => {
                self.log.record(self.timer.now_us(), TxEvent::Stopped);
            }
            _ => {}
        }
    }

    /// True while the timer runs; start would return busy.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.timer.is_running()
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.ctx.status()
    }

    #[inline]
    pub fn phase(&self) -> TxPhase {
        self.ctx.status().phase()
    }

    /// Code word still to be shifted out.
    #[inline]
    pub fn pending_code(&self) -> u32 {
        self.ctx.snapshot().code
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn clock(&self) -> &TimerClock {
        &self.clock
    }

    pub fn stats(&self) -> &TxStats {
        &self.stats
    }

    pub fn log(&self) -> &LogStream {
        &self.log
    }
}
