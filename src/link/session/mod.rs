// src/link/session/mod.rs

use crate::common::{
    address::{ChannelIndex, NodeId},
    command::{CommandFormatError, LinkCommand},
    config::UART_BUFFER_SIZE,
    error::{InitError, SendError, StatusPollError},
    frame::SerialConfig,
    hal_traits::{Clock, LinkSerial},
    response::parse_status_line,
    timing,
    types::{LinkStatus, StatusSource},
};
use heapless::Vec;

mod io_helpers;
#[cfg(test)]
pub(crate) mod mock;

use io_helpers::ReplyRead;

/// Most bytes one `drain_incoming` call consumes, so a chatty radio cannot
/// hold the control loop.
pub const MAX_DRAIN_PER_CALL: usize = UART_BUFFER_SIZE;

/// Drain calls `query_status` spends clearing stale input before giving up.
const STALE_DRAIN_ROUNDS: usize = 8;

/// Serial session with the radio peripheral.
///
/// Owns the UART and the last status successfully parsed from the radio. Both
/// live as long as the session; the cache survives any number of failed polls.
#[derive(Debug)]
pub struct LinkSession<IF, C>
where
    IF: LinkSerial,
    C: Clock,
{
    interface: IF,
    clock: C,
    cached_status: Option<LinkStatus>,
    /// Partial inbound line assembled by `drain_incoming`.
    inbound: Vec<u8, UART_BUFFER_SIZE>,
}

impl<IF, C> LinkSession<IF, C>
where
    IF: LinkSerial,
    C: Clock,
{
    /// Configures the UART and waits for the radio to settle.
    pub fn initialize(mut interface: IF, clock: C, config: &SerialConfig) -> Result<Self, InitError<IF::Error>> {
        if !config.is_usable() {
            return Err(InitError::InvalidConfig);
        }
        interface.configure(config).map_err(InitError::Io)?;
        clock.delay_ms(timing::as_millis_u32(timing::RADIO_SETTLE));
        log::info!("radio UART initialized at {} baud", config.baud_rate);

        Ok(LinkSession {
            interface,
            clock,
            cached_status: None,
            inbound: Vec::new(),
        })
    }

    // --- Public Methods ---

    /// Frames `message` as `AT+SEND` and writes it.
    ///
    /// Oversized messages are rejected before anything is written. Nothing is
    /// retried here; the caller tries again on its next cycle.
    pub fn send_text(
        &mut self,
        channel: ChannelIndex,
        destination: NodeId,
        message: &str,
    ) -> Result<(), SendError<IF::Error>> {
        let cmd = LinkCommand::SendText { channel, destination, message };
        let command_buffer = cmd.format_into().map_err(|e| match e {
            CommandFormatError::MessageTooLong { len, max } => SendError::MessageTooLong { len, max },
            CommandFormatError::BufferOverflow => SendError::Format,
        })?;

        self.send_command_bytes(command_buffer.as_bytes())?;
        log::debug!("sent to radio: {}", command_buffer.trim_end());
        Ok(())
    }

    /// Polls the radio for its status, falling back when the reply is unusable.
    ///
    /// Always returns a valid status. A live reply updates the cache. Otherwise
    /// the cache is returned tagged [`StatusSource::Cached`], or the simulated
    /// baseline tagged [`StatusSource::Simulated`] if nothing was ever cached.
    pub fn refresh_status(&mut self) -> LinkStatus {
        match self.query_status() {
            Ok(status) => {
                log::info!("radio status: {}", status);
                status
            }
            Err(e) => {
                let fallback = self.fallback_status();
                log::warn!("status poll failed ({}); reporting {}", e, fallback);
                fallback
            }
        }
    }

    /// Polls the radio once and reports why no live status came back, if so.
    ///
    /// A live status also replaces the cache.
    pub fn query_status(&mut self) -> Result<LinkStatus, StatusPollError<IF::Error>> {
        // Anything already pending is not the reply to this poll.
        self.discard_stale_input()?;

        let command_buffer = LinkCommand::StatusQuery
            .format_into()
            .map_err(|_| StatusPollError::Request(SendError::Format))?;
        self.send_command_bytes(command_buffer.as_bytes())
            .map_err(|e| StatusPollError::Request(e.into()))?;
        log::debug!("requesting radio status");

        let mut read_buffer = [0u8; UART_BUFFER_SIZE];
        let line = match self.read_reply_line(&mut read_buffer) {
            ReplyRead::Line(line) => line,
            ReplyRead::Failed(e) => return Err(StatusPollError::Reply(e)),
            ReplyRead::Io(e) => return Err(StatusPollError::Io(e)),
        };

        let status = parse_status_line(line).map_err(StatusPollError::Reply)?;
        self.cached_status = Some(status);
        Ok(status)
    }

    /// Consumes inbound bytes that are already pending, without waiting.
    ///
    /// Complete lines are logged; a line longer than the inbound buffer is
    /// discarded. Returns the number of bytes consumed.
    pub fn drain_incoming(&mut self) -> usize {
        let mut drained = 0;
        while drained < MAX_DRAIN_PER_CALL {
            match self.interface.read_byte() {
                Ok(byte) => {
                    drained += 1;
                    self.accept_inbound(byte);
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => {
                    log::warn!("radio UART read error while draining: {:?}", e);
                    break;
                }
            }
        }
        drained
    }

    /// Last status parsed from a live reply, if any.
    #[inline]
    pub fn cached_status(&self) -> Option<LinkStatus> {
        self.cached_status
    }

    /// Gives the UART and clock back.
    pub fn release(self) -> (IF, C) {
        (self.interface, self.clock)
    }

    // --- Private helpers ---

    fn fallback_status(&self) -> LinkStatus {
        match self.cached_status {
            Some(status) => status.with_source(StatusSource::Cached),
            None => LinkStatus::SIMULATED,
        }
    }

    /// Drains until the UART has nothing pending, within `STALE_DRAIN_ROUNDS`.
    fn discard_stale_input(&mut self) -> Result<(), StatusPollError<IF::Error>> {
        for _ in 0..STALE_DRAIN_ROUNDS {
            if self.drain_incoming() < MAX_DRAIN_PER_CALL {
                self.inbound.clear();
                return Ok(());
            }
        }
        Err(StatusPollError::Backlog {
            discarded: STALE_DRAIN_ROUNDS * MAX_DRAIN_PER_CALL,
        })
    }

    fn accept_inbound(&mut self, byte: u8) {
        log::trace!("radio rx {:#04x}", byte);
        if byte == b'\n' {
            let line = self.inbound.strip_suffix(b"\r").unwrap_or(&self.inbound[..]);
            match core::str::from_utf8(line) {
                Ok(text) => log::debug!("radio: {}", text),
                Err(_) => log::debug!("radio: {} non-text bytes", line.len()),
            }
            self.inbound.clear();
        } else if self.inbound.push(byte).is_err() {
            log::warn!("inbound radio line exceeds {} bytes, discarded", UART_BUFFER_SIZE);
            self.inbound.clear();
        }
    }
}
