// src/lib.rs

//! Ranging-and-link core of a sonar telemetry node.
//!
//! An HC-SR04 style ultrasonic sensor is sampled on a fixed period and the
//! reading, bundled with the radio's own link-health telemetry, is sent as a
//! JSON text message through a Meshtastic style radio attached over UART.
//!
//! * [`sensor::RangeSensor`] runs the trigger/echo cycle with bounded waits.
//! * [`link::LinkSession`] frames `AT+` commands, parses status replies and
//!   keeps the last good status for fallback.
//! * [`scheduler::Scheduler`] interleaves the transmit, status-poll and drain
//!   duties in one cooperative loop.
//!
//! Hardware is reached only through [`common::Clock`], [`common::LinkSerial`]
//! and the `embedded-hal` digital pin traits.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod common;
pub mod link;
pub mod payload;
pub mod scheduler;
pub mod sensor;

// Re-export key types for convenience
pub use common::{Config, LinkStatus, Reading};
pub use link::LinkSession;
pub use scheduler::Scheduler;
pub use sensor::RangeSensor;
