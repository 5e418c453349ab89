//! Submission error.

/// Error returned by the send/start entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NecError {
    /// A frame or repeat cycle is already in flight; the request was dropped.
    Busy,
}

impl NecError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Busy => "E01",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Busy => "transmitter busy",
        }
    }
}

impl core::fmt::Display for NecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
