// src/link/session/io_helpers.rs

use super::LinkSession;
use crate::common::{
    error::LinkIoError,
    hal_traits::{Clock, LinkSerial},
    response::StatusParseError,
    timing,
};
use core::time::Duration;
use nb::Result as NbResult;

/// Outcome of collecting a status reply, before parsing.
pub(super) enum ReplyRead<'buf, E> {
    Line(&'buf [u8]),
    Failed(StatusParseError),
    Io(E),
}

// Implementation block for I/O related helpers
impl<IF, C> LinkSession<IF, C>
where
    IF: LinkSerial,
    C: Clock,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, LinkIoError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let budget_us = timing::as_micros_u32(timeout);
        let start = self.clock.now_us();

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if timing::elapsed(start, self.clock.now_us()) >= budget_us {
                        return Err(LinkIoError::Timeout);
                    }
                    self.clock.delay_us(timing::IO_POLL_INTERVAL_US);
                }
                Err(nb::Error::Other(e)) => return Err(LinkIoError::Io(e)),
            }
        }
    }

    /// Sends the already framed command bytes over the serial interface.
    pub(super) fn send_command_bytes(&mut self, cmd_bytes: &[u8]) -> Result<(), LinkIoError<IF::Error>> {
        for byte in cmd_bytes {
            self.execute_blocking_io_with_timeout(timing::BYTE_WRITE_BUDGET, |iface| {
                iface.write_byte(*byte)
            })?;
        }

        self.execute_blocking_io_with_timeout(timing::FLUSH_BUDGET, |iface| iface.flush())?;
        Ok(())
    }

    /// Collects one reply line (up to and including `\n`) into the buffer.
    ///
    /// Stops at the newline, when the buffer is full, or when the response
    /// budget has elapsed since the call started, whichever comes first. Only a
    /// newline-terminated line is handed back; bytes cut off by the budget are
    /// reported as [`StatusParseError::Truncated`].
    pub(super) fn read_reply_line<'buf>(&mut self, buffer: &'buf mut [u8]) -> ReplyRead<'buf, IF::Error> {
        let budget_us = timing::as_micros_u32(timing::STATUS_RESPONSE_BUDGET);
        let start = self.clock.now_us();
        let mut bytes_read = 0;

        loop {
            if timing::elapsed(start, self.clock.now_us()) >= budget_us {
                break;
            }

            match self.interface.read_byte() {
                Ok(byte) => {
                    if bytes_read >= buffer.len() {
                        return ReplyRead::Failed(StatusParseError::Overflow);
                    }
                    buffer[bytes_read] = byte;
                    bytes_read += 1;

                    if byte == b'\n' {
                        return ReplyRead::Line(&buffer[..bytes_read]);
                    }
                }
                Err(nb::Error::WouldBlock) => self.clock.delay_us(timing::IO_POLL_INTERVAL_US),
                Err(nb::Error::Other(e)) => return ReplyRead::Io(e),
            }
        }

        if bytes_read == 0 {
            ReplyRead::Failed(StatusParseError::EmptyInput)
        } else {
            ReplyRead::Failed(StatusParseError::Truncated)
        }
    }
}
