// src/common/response/error.rs

use core::fmt;

/// One of the three `KEY=<int>` fields of a status reply.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StatusField {
    Battery,
    Rssi,
    Utilization,
}

impl StatusField {
    /// Key as it appears on the wire, including the `=`.
    pub const fn key(&self) -> &'static str {
        match self {
            StatusField::Battery => "BATT=",
            StatusField::Rssi => "RSSI=",
            StatusField::Utilization => "UTIL=",
        }
    }
}

/// Error type specific to status reply parsing.
///
/// Never leaves the link session: every variant is recovered by falling back
/// to the cached or simulated status.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StatusParseError {
    /// Nothing was received before the response budget ran out.
    EmptyInput,
    /// Response budget ran out after part of a reply, before its newline.
    Truncated,
    /// Reply filled the receive buffer without a newline.
    Overflow,
    /// Could not decode response content as UTF-8.
    InvalidUtf8,
    /// Expected `KEY=` prefix not found where the field should start.
    MissingField(StatusField),
    /// Field value is not a decimal integer.
    NumericError(StatusField),
    /// Field value parsed but is outside the range the field allows.
    OutOfRange(StatusField),
    /// Extra content after the third field.
    TrailingData,
}

impl From<core::str::Utf8Error> for StatusParseError {
    fn from(_: core::str::Utf8Error) -> Self {
        StatusParseError::InvalidUtf8
    }
}

impl fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusParseError::EmptyInput => f.write_str("no status reply"),
            StatusParseError::Truncated => f.write_str("status reply cut off before its newline"),
            StatusParseError::Overflow => f.write_str("status reply overflowed the receive buffer"),
            StatusParseError::InvalidUtf8 => f.write_str("status reply is not valid UTF-8"),
            StatusParseError::MissingField(field) => write!(f, "missing {}", field.key()),
            StatusParseError::NumericError(field) => write!(f, "{} is not an integer", field.key()),
            StatusParseError::OutOfRange(field) => write!(f, "{} out of range", field.key()),
            StatusParseError::TrailingData => f.write_str("unexpected data after UTIL"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StatusParseError {}
