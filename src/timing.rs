//! NEC pulse shapes and timer clock derivation.
//!
//! Every NEC interval is a small multiple of one time unit (562.5µs).
//! The scheduler works in units; [`TimerClock`] turns units into timer
//! ticks for the period/compare registers.
//!
//! # Shapes (units)
//!
//! ```text
//!              period  pulse
//! leader          24     16     9ms mark, 4.5ms space
//! bit 0            2      1
//! bit 1            4      1
//! trailer         72      1     end mark + frame gap
//! repeat pulse    20     16     9ms mark, 2.25ms space
//! repeat gap     172      1     end mark + 96ms space
//! ```

/// NEC time unit in nanoseconds.
pub const UNIT_NS: u32 = 562_500;

/// Shortest tick that still fits the longest period (172 units) in 16 bits.
pub const MIN_TICK_NS: u32 = 1476;

/// Longest period any shape uses.
pub const MAX_PERIOD_UNITS: u8 = 172;

/// One timer cycle: the output is high for `pulse` units, then low until
/// `period` units have elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    pub period: u8,
    pub pulse: u8,
}

impl Shape {
    pub const fn new(period: u8, pulse: u8) -> Self {
        Self { period, pulse }
    }

    /// Space following the mark, in units.
    #[inline]
    pub const fn space(self) -> u8 {
        self.period - self.pulse
    }
}

/// Frame leader; also the idle-priming cycle.
pub const LEADER: Shape = Shape::new(24, 16);
pub const BIT_ZERO: Shape = Shape::new(2, 1);
pub const BIT_ONE: Shape = Shape::new(4, 1);
pub const TRAILER: Shape = Shape::new(72, 1);
pub const REPEAT_PULSE: Shape = Shape::new(20, 16);
pub const REPEAT_GAP: Shape = Shape::new(172, 1);

/// Clock derivation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Source frequency is zero or above 1GHz.
    InvalidSource,
    /// No prescaler gives a tick long enough for a 16-bit period register.
    TooFast,
    /// One time unit is shorter than a tick.
    TooSlow,
}

impl ClockError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSource => "C01",
            Self::TooFast => "C02",
            Self::TooSlow => "C03",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidSource => "invalid source clock",
            Self::TooFast => "source clock too fast for prescalers",
            Self::TooSlow => "source clock too slow",
        }
    }
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Prescaled timer clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerClock {
    source_hz: u32,
    prescaler: u32,
    tick_ns: u32,
}

impl TimerClock {
    /// Pick the smallest prescaler whose tick is at least [`MIN_TICK_NS`].
    ///
    /// `prescalers` must be sorted ascending. The source period is truncated
    /// to whole nanoseconds before the search.
    pub const fn derive(source_hz: u32, prescalers: &[u32]) -> Result<Self, ClockError> {
        if source_hz == 0 || source_hz > 1_000_000_000 {
            return Err(ClockError::InvalidSource);
        }

        let source_ns = 1_000_000_000 / source_hz;
        let wanted = (MIN_TICK_NS + source_ns) / source_ns;

        let mut i = 0;
        while i < prescalers.len() {
            let prescaler = prescalers[i];
            if prescaler >= wanted {
                let tick_ns = match source_ns.checked_mul(prescaler) {
                    Some(tick_ns) => tick_ns,
                    None => return Err(ClockError::TooSlow),
                };
                let clock = Self {
                    source_hz,
                    prescaler,
                    tick_ns,
                };
                if clock.ticks(1) == 0 {
                    return Err(ClockError::TooSlow);
                }
                return Ok(clock);
            }
            i += 1;
        }

        Err(ClockError::TooFast)
    }

    #[inline]
    pub const fn source_hz(&self) -> u32 {
        self.source_hz
    }

    #[inline]
    pub const fn prescaler(&self) -> u32 {
        self.prescaler
    }

    /// Tick duration in nanoseconds.
    #[inline]
    pub const fn tick_ns(&self) -> u32 {
        self.tick_ns
    }

    /// Counting frequency after the prescaler.
    #[inline]
    pub const fn tick_hz(&self) -> u32 {
        self.source_hz / self.prescaler
    }

    /// Register value for an interval of `units` time units.
    ///
    /// Saturates at `u16::MAX`; a derived clock never needs to.
    #[inline]
    pub const fn ticks(&self, units: u8) -> u16 {
        if units == 0 {
            return 0;
        }
        let ticks = (UNIT_NS * units as u32 - 1) / self.tick_ns;
        if ticks > u16::MAX as u32 {
            u16::MAX
        } else {
            ticks as u16
        }
    }

    /// `(period, pulse)` register values for a shape.
    #[inline]
    pub const fn shape_ticks(&self, shape: Shape) -> (u16, u16) {
        (self.ticks(shape.period), self.ticks(shape.pulse))
    }
}
