// src/common/response/parse.rs

use super::error::{StatusField, StatusParseError};
use crate::common::types::LinkStatus;

use core::str::{self, FromStr};

// --- Internal Helpers ---
#[inline]
fn trim_line_end(buffer: &[u8]) -> &[u8] {
    let mut end = buffer.len();
    while end > 0 && matches!(buffer[end - 1], b'\n' | b'\r' | b' ' | b'\t') {
        end -= 1;
    }
    &buffer[..end]
}

/// Parses one `KEY=<int>` segment.
fn parse_field(segment: Option<&str>, field: StatusField) -> Result<i32, StatusParseError> {
    let value = segment
        .and_then(|s| s.strip_prefix(field.key()))
        .ok_or(StatusParseError::MissingField(field))?;
    i32::from_str(value).map_err(|_| StatusParseError::NumericError(field))
}

fn percent(value: i32, field: StatusField) -> Result<u8, StatusParseError> {
    match u8::try_from(value) {
        Ok(v) if v <= 100 => Ok(v),
        _ => Err(StatusParseError::OutOfRange(field)),
    }
}

// --- Public Parsing Functions ---

/// Parses a status reply of the form `BATT=<int>,RSSI=<int>,UTIL=<int>`.
///
/// Trailing `\r\n` (or other trailing whitespace) is ignored; everything else
/// must match exactly. Battery and utilization must be 0-100, RSSI must fit an
/// `i16`.
pub fn parse_status_line(buffer: &[u8]) -> Result<LinkStatus, StatusParseError> {
    let line = trim_line_end(buffer);
    if line.is_empty() {
        return Err(StatusParseError::EmptyInput);
    }
    let line = str::from_utf8(line)?;

    let mut segments = line.split(',');
    let batt = parse_field(segments.next(), StatusField::Battery)?;
    let rssi = parse_field(segments.next(), StatusField::Rssi)?;
    let util = parse_field(segments.next(), StatusField::Utilization)?;
    if segments.next().is_some() {
        return Err(StatusParseError::TrailingData);
    }

    let battery_level = percent(batt, StatusField::Battery)?;
    let rssi = i16::try_from(rssi).map_err(|_| StatusParseError::OutOfRange(StatusField::Rssi))?;
    let channel_utilization = percent(util, StatusField::Utilization)?;

    Ok(LinkStatus::live(battery_level, rssi, channel_utilization))
}
