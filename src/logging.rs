//! RT-safe event logging for RustNecTx.
//!
//! # Architecture
//!
//! ```text
//! caller / ISR           LogStream            UART task
//! ────────────           ─────────            ─────────
//!
//! record() ───────────▶ [E0][E1][E2] ──────▶ format + UART TX
//! O(1)                   lock-free            blocking ok
//! non-blocking           bounded ring
//! ```
//!
//! # Rules
//!
//! - The compare-match interrupt SHALL NOT format text or block
//! - Entries are fixed-size events; formatting happens on drain
//! - Entries are dropped (and counted) when the ring is full

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Something the transmitter did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxEvent {
    /// Submission accepted, timer started.
    Accepted { code: u32, repeat: bool },
    /// Submission dropped because a frame was in flight.
    Rejected { code: u32 },
    /// Abort cleared an active transmission.
    Aborted { remaining_bits: u8 },
    /// Trailer emitted; the frame's data is on the wire.
    FrameSent,
    /// Timer halted, transmitter idle.
    Stopped,
}

impl TxEvent {
    /// Default level for this event.
    pub fn level(&self) -> LogLevel {
        match self {
            TxEvent::Accepted { .. } => LogLevel::Info,
            TxEvent::Rejected { .. } => LogLevel::Warn,
            TxEvent::Aborted { .. } => LogLevel::Info,
            TxEvent::FrameSent => LogLevel::Debug,
            TxEvent::Stopped => LogLevel::Debug,
        }
    }
}

impl core::fmt::Display for TxEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TxEvent::Accepted { code, repeat } => {
                write!(f, "tx start code=0x{:08X} repeat={}", code, repeat)
            }
            TxEvent::Rejected { code } => write!(f, "tx busy, dropped code=0x{:08X}", code),
            TxEvent::Aborted { remaining_bits } => {
                write!(f, "tx abort ({} steps left)", remaining_bits)
            }
            TxEvent::FrameSent => write!(f, "frame sent"),
            TxEvent::Stopped => write!(f, "tx idle"),
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// What happened.
    pub event: TxEvent,
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Trace,
        event: TxEvent::Stopped,
    };
}

/// Lock-free bounded event log (multiple producers, single consumer).
///
/// Producers claim a slot with a CAS on the write index, fill it, then
/// publish it through the slot's sequence number. The consumer only reads
/// published slots, so an interrupt that preempts a half-finished push
/// cannot expose a torn entry.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: [UnsafeCell<LogEntry>; N],
    published: [AtomicU32; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
    max_level: AtomicU8,
}

// SAFETY: Producers get unique slots via CAS and never touch a slot the
// consumer has not released. Single consumer by contract.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream recording up to `Debug`.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        const EMPTY_SLOT: UnsafeCell<LogEntry> = UnsafeCell::new(LogEntry::EMPTY);
        const UNPUBLISHED: AtomicU32 = AtomicU32::new(0);

        Self {
            entries: [EMPTY_SLOT; N],
            published: [UNPUBLISHED; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            max_level: AtomicU8::new(LogLevel::Debug as u8),
        }
    }

    /// Most verbose level that is kept.
    pub fn set_level(&self, level: LogLevel) {
        self.max_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.max_level.load(Ordering::Relaxed))
    }

    /// Record an event at its default level.
    #[inline]
    pub fn record(&self, timestamp_us: i64, event: TxEvent) -> bool {
        self.push(timestamp_us, event.level(), event)
    }

    /// Push a log entry (RT-safe, never blocks).
    ///
    /// Returns `true` if queued, `false` if filtered out or dropped.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, event: TxEvent) -> bool {
        if level as u8 > self.max_level.load(Ordering::Relaxed) {
            return false;
        }

        let mut write = self.write_idx.load(Ordering::Relaxed);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: Slot `idx` was claimed exclusively by the CAS above and the
        // consumer has already released it (checked against read_idx).
        unsafe {
            *self.entries[idx].get() = LogEntry {
                timestamp_us,
                level,
                event,
            };
        }

        self.published[idx].store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain next log entry (for the UART task).
    ///
    /// Returns `None` if the next entry is not yet published.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let idx = (read as usize) & Self::MASK;

        if self.published[idx].load(Ordering::Acquire) != read.wrapping_add(1) {
            return None;
        }

        // SAFETY: Published slot, single consumer; producers will not reuse
        // it until read_idx moves past it.
        let entry = unsafe { *self.entries[idx].get() };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Number of claimed entries not yet drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written. Output is truncated to fit.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}
