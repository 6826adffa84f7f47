//! Radio command definitions.
//!
//! The peripheral speaks a line-oriented AT dialect: every command is ASCII
//! and ends with `\r\n`.

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use super::address::{ChannelIndex, NodeId};
use super::config::{MAX_MESSAGE_LEN, UART_BUFFER_SIZE};

/// Outbound command buffer. Framing never allocates.
pub type CommandBuffer = ArrayString<UART_BUFFER_SIZE>;

/// Why a command could not be framed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommandFormatError {
    /// Payload is longer than [`MAX_MESSAGE_LEN`].
    MessageTooLong { len: usize, max: usize },
    /// Framed command overflowed the command buffer.
    BufferOverflow,
}

/// A command sent to the radio.
///
/// `Display` produces the exact wire string, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand<'a> {
    /// `AT+SEND=<channel>,<destination>,<message>\r\n`: queue a text message.
    SendText {
        channel: ChannelIndex,
        destination: NodeId,
        message: &'a str,
    },

    /// `AT+STATUS?\r\n`: ask for battery, RSSI and channel utilization.
    StatusQuery,
}

impl fmt::Display for LinkCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkCommand::SendText { channel, destination, message } => {
                write!(f, "AT+SEND={},{},{}\r\n", channel, destination, message)
            }
            LinkCommand::StatusQuery => f.write_str("AT+STATUS?\r\n"),
        }
    }
}

impl LinkCommand<'_> {
    /// Frames the command into a fixed-capacity buffer.
    ///
    /// Text messages longer than [`MAX_MESSAGE_LEN`] are rejected up front so
    /// that an oversized payload is never partially framed.
    pub fn format_into(&self) -> Result<CommandBuffer, CommandFormatError> {
        if let LinkCommand::SendText { message, .. } = self {
            if message.len() > MAX_MESSAGE_LEN {
                return Err(CommandFormatError::MessageTooLong {
                    len: message.len(),
                    max: MAX_MESSAGE_LEN,
                });
            }
        }

        let mut buffer = CommandBuffer::new();
        write!(buffer, "{}", self).map_err(|_| CommandFormatError::BufferOverflow)?;
        Ok(buffer)
    }
}
