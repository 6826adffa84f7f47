// src/common/response/mod.rs

mod error;
pub mod parse; // Make parse functions public

pub use error::{StatusField, StatusParseError};
pub use parse::parse_status_line;
