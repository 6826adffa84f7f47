// src/common/timing.rs

use core::time::Duration;

// Nominal values. The counters these are compared against are wrapping u32
// microsecond/millisecond counters, so every comparison below goes through the
// wrapping helpers at the bottom of this file.

// === Ranging (HC-SR04) ===

/// Width of the trigger pulse that starts a ranging cycle.
pub const TRIGGER_PULSE: Duration = Duration::from_micros(10);
/// Upper bound for each echo edge wait (rise, then fall measured from rise).
pub const SONAR_TIMEOUT: Duration = Duration::from_micros(30_000);
/// Centimeters per microsecond of echo pulse: 0.0343 cm/us halved for the round trip.
pub const CM_PER_ECHO_US: f32 = 0.01715;

// === Radio link ===

/// Time the radio needs after the UART is configured before it accepts commands.
pub const RADIO_SETTLE: Duration = Duration::from_millis(100);
/// Hard ceiling for collecting a status reply after `AT+STATUS?` is written.
pub const STATUS_RESPONSE_BUDGET: Duration = Duration::from_millis(100);
/// Budget for a single byte write to be accepted by the UART.
pub const BYTE_WRITE_BUDGET: Duration = Duration::from_millis(5);
/// Budget for the transmit FIFO to drain after a command.
pub const FLUSH_BUDGET: Duration = Duration::from_millis(20);
/// Delay between polls of a non-blocking serial call that returned `WouldBlock`.
pub const IO_POLL_INTERVAL_US: u32 = 100;

// === Scheduling ===

/// Default period of the transmit duty (5 minutes).
pub const TRANSMIT_INTERVAL: Duration = Duration::from_millis(300_000);
/// Default period of the status-poll duty (1 minute).
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(60_000);
/// Offset of the first transmit after the scheduler starts.
pub const TRANSMIT_FIRST_DELAY: Duration = Duration::from_millis(5_000);
/// Offset of the first status poll after the scheduler starts.
pub const STATUS_POLL_FIRST_DELAY: Duration = Duration::from_millis(2_000);
/// Sleep between control-loop passes.
pub const LOOP_IDLE: Duration = Duration::from_millis(100);

// === Wrapping counter helpers ===

/// Elapsed ticks between two readings of a wrapping u32 counter.
#[inline]
pub const fn elapsed(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}

/// True once `now` has reached or passed `deadline` on a wrapping u32 counter.
///
/// Valid while the two are less than 2^31 ticks apart (about 24 days for a
/// millisecond counter).
#[inline]
pub const fn reached(deadline: u32, now: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

/// Converts a `Duration` to whole microseconds, saturating at `u32::MAX`.
#[inline]
pub fn as_micros_u32(d: Duration) -> u32 {
    u32::try_from(d.as_micros()).unwrap_or(u32::MAX)
}

/// Converts a `Duration` to whole milliseconds, saturating at `u32::MAX`.
#[inline]
pub fn as_millis_u32(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}
