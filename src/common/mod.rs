// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod command;
pub mod config;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod response;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::{ChannelIndex, InvalidChannelIndex, NodeId};

// From command.rs
pub use command::{CommandBuffer, CommandFormatError, LinkCommand};

// From config.rs (constants stay under common::config::*)
pub use config::{Config, PinAssignments, ScheduleConfig};

// From error.rs
pub use error::{InitError, LinkIoError, RangeError, SendError, StatusPollError};

// From frame.rs
pub use frame::{Parity, SerialConfig};

// From hal_traits.rs
pub use hal_traits::{Clock, LinkSerial};

// From response/mod.rs
pub use response::{parse_status_line, StatusField, StatusParseError};

// From types.rs
pub use types::{LinkStatus, Reading, StatusSource};
