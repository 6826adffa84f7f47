// src/payload.rs

//! JSON text carried in `AT+SEND` messages.
//!
//! The link session treats these strings as opaque; only the receiving end
//! parses them.

use core::fmt::Write;

use heapless::String;

use crate::common::config::JSON_BUFFER_SIZE;
use crate::common::types::{LinkStatus, Reading};

/// Payload buffer.
pub type PayloadBuffer = String<JSON_BUFFER_SIZE>;

/// Payload did not fit [`PayloadBuffer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload exceeds {} bytes", JSON_BUFFER_SIZE)]
pub struct PayloadOverflow;

fn write_status_object(out: &mut PayloadBuffer, status: &LinkStatus) -> core::fmt::Result {
    write!(
        out,
        "{{\"battery_level\":{},\"rssi\":{},\"channel_util\":{}}}",
        status.battery_level, status.rssi, status.channel_utilization
    )
}

/// `{"sensor":"sonar","distance_cm":<2dp>,"timestamp":<ms>}`
pub fn format_reading(reading: &Reading) -> Result<PayloadBuffer, PayloadOverflow> {
    let mut out = PayloadBuffer::new();
    write!(
        out,
        "{{\"sensor\":\"sonar\",\"distance_cm\":{:.2},\"timestamp\":{}}}",
        reading.distance_cm, reading.timestamp_ms
    )
    .map_err(|_| PayloadOverflow)?;
    Ok(out)
}

/// `{"radio_status":{"battery_level":..,"rssi":..,"channel_util":..}}`
pub fn format_status(status: &LinkStatus) -> Result<PayloadBuffer, PayloadOverflow> {
    let mut out = PayloadBuffer::new();
    out.push_str("{\"radio_status\":").map_err(|_| PayloadOverflow)?;
    write_status_object(&mut out, status).map_err(|_| PayloadOverflow)?;
    out.push('}').map_err(|_| PayloadOverflow)?;
    Ok(out)
}

/// Reading and radio status in one object, the message the transmit duty sends.
pub fn format_combined(reading: &Reading, status: &LinkStatus) -> Result<PayloadBuffer, PayloadOverflow> {
    let mut out = PayloadBuffer::new();
    write!(
        out,
        "{{\"sensor\":\"sonar\",\"distance_cm\":{:.2},\"timestamp\":{},\"radio_status\":",
        reading.distance_cm, reading.timestamp_ms
    )
    .map_err(|_| PayloadOverflow)?;
    write_status_object(&mut out, status).map_err(|_| PayloadOverflow)?;
    out.push('}').map_err(|_| PayloadOverflow)?;
    Ok(out)
}
