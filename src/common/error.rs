// src/common/error.rs

use super::response::StatusParseError;
use core::fmt::Debug;

/// Startup failure of a peripheral. Fatal: the scheduler is never built
/// without an initialized sensor and link session.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InitError<E>
where
    E: Debug,
{
    /// Underlying pin or UART error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// Settings that no UART can be brought up with (zero baud, bad frame).
    #[error("Invalid peripheral configuration")]
    InvalidConfig,
}

/// Failure of one ranging cycle.
///
/// `RangeSensor::measure` folds every variant into the `-1` sentinel reading;
/// `try_measure` hands it to the caller.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RangeError<E>
where
    E: Debug,
{
    /// Echo never went high within the sonar timeout (nothing in range).
    #[error("Echo did not rise within {timeout_us} us")]
    EchoRiseTimeout { timeout_us: u32 },

    /// Echo went high but stayed high past the sonar timeout.
    #[error("Echo did not fall within {timeout_us} us of rising")]
    EchoFallTimeout { timeout_us: u32 },

    /// Trigger or echo pin reported an error.
    #[error("Pin error: {0:?}")]
    Pin(E),
}

/// Failure of a non-blocking serial call driven to completion under a budget.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinkIoError<E>
where
    E: Debug,
{
    #[error("I/O error: {0:?}")]
    Io(E),

    #[error("Operation timed out")]
    Timeout,
}

/// Why an `AT+SEND` command was not (fully) transmitted.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendError<E>
where
    E: Debug,
{
    /// Message does not fit the outbound buffer once framed. Nothing was written.
    #[error("Message too long: {len} bytes, at most {max}")]
    MessageTooLong { len: usize, max: usize },

    /// Command could not be formatted into the outbound buffer. Nothing was written.
    #[error("Command formatting failed")]
    Format,

    /// Underlying UART error, possibly after part of the command went out.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// UART did not accept a byte or finish flushing in time.
    #[error("Send timed out")]
    Timeout,
}

/// Why a status poll produced no live status.
///
/// `LinkSession::refresh_status` recovers from every variant by falling back
/// to the cached or simulated status; `query_status` hands it to the caller.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusPollError<E>
where
    E: Debug,
{
    /// `AT+STATUS?` could not be written.
    #[error("status request not sent: {0}")]
    Request(SendError<E>),

    /// UART error while collecting the reply.
    #[error("I/O error reading status reply: {0:?}")]
    Io(E),

    /// Reply missing, truncated or malformed.
    #[error("status reply unusable: {0}")]
    Reply(StatusParseError),

    /// Input kept arriving while stale bytes were discarded; no request sent.
    #[error("inbound backlog not cleared after discarding {discarded} bytes")]
    Backlog { discarded: usize },
}

impl<E: Debug> From<LinkIoError<E>> for SendError<E> {
    fn from(e: LinkIoError<E>) -> Self {
        match e {
            LinkIoError::Io(e) => SendError::Io(e),
            LinkIoError::Timeout => SendError::Timeout,
        }
    }
}
