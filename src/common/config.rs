// src/common/config.rs

//! Build-time configuration of the node.
//!
//! Everything here is fixed when the firmware is built. Components receive
//! copies at construction and never write back.

use super::address::{ChannelIndex, NodeId};
use super::frame::SerialConfig;
use super::timing;

// === Sonar (HC-SR04) ===
pub const SONAR_TRIGGER_PIN: u8 = 2;
pub const SONAR_ECHO_PIN: u8 = 3;
pub const SONAR_TIMEOUT_US: u32 = 30_000;

// === Radio UART ===
pub const RADIO_UART_ID: u8 = 1;
pub const RADIO_UART_TX_PIN: u8 = 4;
pub const RADIO_UART_RX_PIN: u8 = 5;
pub const RADIO_BAUD_RATE: u32 = 115_200;

// === Transmission ===
pub const TRANSMIT_INTERVAL_MS: u32 = 300_000;
pub const STATUS_POLL_INTERVAL_MS: u32 = 60_000;

// === Mesh addressing ===
pub const CHANNEL_INDEX: ChannelIndex = ChannelIndex::PRIMARY;
pub const DESTINATION: NodeId = NodeId::BROADCAST;

// === Buffers ===
pub const JSON_BUFFER_SIZE: usize = 512;
pub const UART_BUFFER_SIZE: usize = 256;
/// Bytes of the outbound buffer reserved for `AT+SEND=c,XXXXXXXX,` and `\r\n`.
pub const PROTOCOL_OVERHEAD: usize = 50;
/// Longest message `send_text` accepts.
pub const MAX_MESSAGE_LEN: usize = UART_BUFFER_SIZE - PROTOCOL_OVERHEAD;

/// GPIO and UART numbering used by the board bring-up code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PinAssignments {
    pub sonar_trigger: u8,
    pub sonar_echo: u8,
    pub radio_uart: u8,
    pub radio_tx: u8,
    pub radio_rx: u8,
}

/// Periods and first-run offsets of the scheduler duties, in milliseconds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScheduleConfig {
    pub transmit_interval_ms: u32,
    pub status_poll_interval_ms: u32,
    pub transmit_first_delay_ms: u32,
    pub status_poll_first_delay_ms: u32,
    pub loop_idle_ms: u32,
}

impl ScheduleConfig {
    pub const DEFAULT: ScheduleConfig = ScheduleConfig {
        transmit_interval_ms: TRANSMIT_INTERVAL_MS,
        status_poll_interval_ms: STATUS_POLL_INTERVAL_MS,
        transmit_first_delay_ms: timing::TRANSMIT_FIRST_DELAY.as_millis() as u32,
        status_poll_first_delay_ms: timing::STATUS_POLL_FIRST_DELAY.as_millis() as u32,
        loop_idle_ms: timing::LOOP_IDLE.as_millis() as u32,
    };
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Full node configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    pub pins: PinAssignments,
    pub serial: SerialConfig,
    pub sonar_timeout_us: u32,
    pub channel: ChannelIndex,
    pub destination: NodeId,
    pub schedule: ScheduleConfig,
}

impl Config {
    pub const DEFAULT: Config = Config {
        pins: PinAssignments {
            sonar_trigger: SONAR_TRIGGER_PIN,
            sonar_echo: SONAR_ECHO_PIN,
            radio_uart: RADIO_UART_ID,
            radio_tx: RADIO_UART_TX_PIN,
            radio_rx: RADIO_UART_RX_PIN,
        },
        serial: SerialConfig::eight_n_one(RADIO_BAUD_RATE),
        sonar_timeout_us: SONAR_TIMEOUT_US,
        channel: CHANNEL_INDEX,
        destination: DESTINATION,
        schedule: ScheduleConfig::DEFAULT,
    };

    /// Logs the configuration once at startup.
    pub fn log_summary(&self) {
        log::info!(
            "sonar on pins {} (trigger) and {} (echo), timeout {} us",
            self.pins.sonar_trigger,
            self.pins.sonar_echo,
            self.sonar_timeout_us
        );
        log::info!(
            "radio on uart{} pins {} (TX) and {} (RX) at {} baud",
            self.pins.radio_uart,
            self.pins.radio_tx,
            self.pins.radio_rx,
            self.serial.baud_rate
        );
        log::info!(
            "transmit interval: {} ms ({} min), status poll interval: {} ms",
            self.schedule.transmit_interval_ms,
            self.schedule.transmit_interval_ms / 60_000,
            self.schedule.status_poll_interval_ms
        );
        log::info!(
            "channel index: {}, destination: 0x{}{}",
            self.channel,
            self.destination,
            if self.destination.is_broadcast() { " (broadcast)" } else { "" }
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// The timing module carries the same defaults as `Duration`s.
const _: () = assert!(SONAR_TIMEOUT_US as u128 == timing::SONAR_TIMEOUT.as_micros());
const _: () = assert!(TRANSMIT_INTERVAL_MS as u128 == timing::TRANSMIT_INTERVAL.as_millis());
const _: () = assert!(STATUS_POLL_INTERVAL_MS as u128 == timing::STATUS_POLL_INTERVAL.as_millis());
const _: () = assert!(PROTOCOL_OVERHEAD < UART_BUFFER_SIZE);
