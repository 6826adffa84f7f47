// src/common/types.rs

use core::fmt;

// --- Ranging ---

/// Result of one ranging cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Reading {
    /// Distance in centimeters, or [`Reading::FAILED_DISTANCE`] if the cycle failed.
    pub distance_cm: f32,
    /// Milliseconds since boot of the last successful measurement.
    ///
    /// A failed cycle carries the timestamp of the previous success (0 if none).
    pub timestamp_ms: u32,
}

impl Reading {
    /// Sentinel distance for a cycle that timed out or hit a pin error.
    pub const FAILED_DISTANCE: f32 = -1.0;

    pub const fn new(distance_cm: f32, timestamp_ms: u32) -> Self {
        Reading { distance_cm, timestamp_ms }
    }

    pub const fn failed(timestamp_ms: u32) -> Self {
        Reading { distance_cm: Self::FAILED_DISTANCE, timestamp_ms }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.distance_cm >= 0.0
    }
}

// --- Radio status ---

/// Where a [`LinkStatus`] came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StatusSource {
    /// Parsed from the radio's reply to this poll.
    Live,
    /// Reply missing or unparseable; last live status reused.
    Cached,
    /// Reply missing or unparseable and nothing cached yet; baseline values.
    Simulated,
    /// Never populated. Only seen on [`LinkStatus::UNKNOWN`].
    Unset,
}

impl StatusSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatusSource::Live => "live",
            StatusSource::Cached => "cached",
            StatusSource::Simulated => "simulated",
            StatusSource::Unset => "unset",
        }
    }

    /// True for anything other than a reply received on this poll.
    #[inline]
    pub const fn is_fallback(&self) -> bool {
        !matches!(self, StatusSource::Live)
    }
}

impl fmt::Display for StatusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radio link-health telemetry.
///
/// When `valid` is false none of the other fields may be used; ask the link
/// session for a fresh or fallback status instead.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LinkStatus {
    /// Battery charge, percent (0-100).
    pub battery_level: u8,
    /// Received signal strength, dBm.
    pub rssi: i16,
    /// Channel airtime in use, percent (0-100).
    pub channel_utilization: u8,
    pub valid: bool,
    pub source: StatusSource,
}

impl LinkStatus {
    /// Placeholder before the first poll. Not valid.
    pub const UNKNOWN: LinkStatus = LinkStatus {
        battery_level: 0,
        rssi: 0,
        channel_utilization: 0,
        valid: false,
        source: StatusSource::Unset,
    };

    /// Baseline reported when the radio never answered a status poll.
    pub const SIMULATED: LinkStatus = LinkStatus {
        battery_level: 75,
        rssi: -80,
        channel_utilization: 20,
        valid: true,
        source: StatusSource::Simulated,
    };

    /// A status freshly parsed from the radio.
    pub const fn live(battery_level: u8, rssi: i16, channel_utilization: u8) -> Self {
        LinkStatus {
            battery_level,
            rssi,
            channel_utilization,
            valid: true,
            source: StatusSource::Live,
        }
    }

    /// Same values, tagged with a different source.
    pub const fn with_source(self, source: StatusSource) -> Self {
        LinkStatus { source, ..self }
    }

    /// The status if it may be read, `None` otherwise.
    pub fn trusted(&self) -> Option<&LinkStatus> {
        if self.valid {
            Some(self)
        } else {
            None
        }
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return f.write_str("unknown");
        }
        write!(
            f,
            "battery={}%, rssi={} dBm, channel_util={}% ({})",
            self.battery_level, self.rssi, self.channel_utilization, self.source
        )
    }
}
