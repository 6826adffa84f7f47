// src/common/hal_traits.rs

use super::frame::SerialConfig;
use core::fmt::Debug;

/// Monotonic time source and delays used by every component.
///
/// Methods take `&self` so one clock can be shared by the sensor, the link
/// session and the scheduler through the blanket impl for `&C`. On a
/// microcontroller this is a free-running hardware timer read.
pub trait Clock {
    /// Free-running microsecond counter. Wraps at `u32::MAX`.
    fn now_us(&self) -> u32;

    /// Milliseconds since boot. Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&self, ms: u32);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }

    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn delay_us(&self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Abstraction for the byte-oriented UART to the radio peripheral.
pub trait LinkSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte from the serial interface.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is pending. This must
    /// never wait for a byte to arrive.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte to the serial interface.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the transmit FIFO is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Applies baud rate and frame format.
    ///
    /// Called once from `LinkSession::initialize`; errors here abort startup.
    fn configure(&mut self, config: &SerialConfig) -> Result<(), Self::Error>;
}
