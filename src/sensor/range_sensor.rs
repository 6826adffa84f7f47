// src/sensor/range_sensor.rs

use crate::common::{
    error::{InitError, RangeError},
    hal_traits::Clock,
    timing,
    types::Reading,
};
use embedded_hal::digital::{Error as _, ErrorKind, InputPin, OutputPin};

/// Converts an echo pulse width to centimeters (sound at 343 m/s, halved for the round trip).
#[inline]
pub fn pulse_width_to_cm(pulse_width_us: u32) -> f32 {
    pulse_width_us as f32 * timing::CM_PER_ECHO_US
}

/// Ultrasonic ranging sensor driven through a trigger output and an echo input.
#[derive(Debug)]
pub struct RangeSensor<TRIG, ECHO, C>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    C: Clock,
{
    trigger: TRIG,
    echo: ECHO,
    clock: C,
    timeout_us: u32,
    last_measurement_ms: u32,
}

impl<TRIG, ECHO, C> RangeSensor<TRIG, ECHO, C>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    C: Clock,
{
    /// Takes ownership of the pins and parks the trigger low.
    ///
    /// `timeout_us` bounds each echo edge wait; zero is rejected.
    pub fn initialize(
        mut trigger: TRIG,
        echo: ECHO,
        clock: C,
        timeout_us: u32,
    ) -> Result<Self, InitError<ErrorKind>> {
        if timeout_us == 0 {
            return Err(InitError::InvalidConfig);
        }
        trigger.set_low().map_err(|e| InitError::Io(e.kind()))?;

        Ok(RangeSensor {
            trigger,
            echo,
            clock,
            timeout_us,
            last_measurement_ms: 0,
        })
    }

    /// Runs one ranging cycle. Never fails: any error yields the `-1` sentinel
    /// with the timestamp of the last successful measurement.
    pub fn measure(&mut self) -> Reading {
        match self.try_measure() {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("sonar ranging failed: {}", e);
                Reading::failed(self.last_measurement_ms)
            }
        }
    }

    /// Runs one ranging cycle and reports why it failed, if it did.
    pub fn try_measure(&mut self) -> Result<Reading, RangeError<ErrorKind>> {
        self.send_trigger_pulse()?;

        let wait_start = self.clock.now_us();
        let rise = self
            .wait_for_echo(true, wait_start)?
            .ok_or(RangeError::EchoRiseTimeout { timeout_us: self.timeout_us })?;
        let fall = self
            .wait_for_echo(false, rise)?
            .ok_or(RangeError::EchoFallTimeout { timeout_us: self.timeout_us })?;

        let pulse_width = timing::elapsed(rise, fall);
        let distance_cm = pulse_width_to_cm(pulse_width);
        self.last_measurement_ms = self.clock.now_ms();

        log::debug!("echo pulse {} us -> {} cm", pulse_width, distance_cm);
        Ok(Reading::new(distance_cm, self.last_measurement_ms))
    }

    /// Milliseconds since boot of the last successful cycle (0 before the first).
    #[inline]
    pub fn last_measurement_ms(&self) -> u32 {
        self.last_measurement_ms
    }

    /// Gives the pins and clock back.
    pub fn release(self) -> (TRIG, ECHO, C) {
        (self.trigger, self.echo, self.clock)
    }

    // --- Private helpers ---

    fn send_trigger_pulse(&mut self) -> Result<(), RangeError<ErrorKind>> {
        self.trigger.set_high().map_err(|e| RangeError::Pin(e.kind()))?;
        self.clock.delay_us(timing::as_micros_u32(timing::TRIGGER_PULSE));
        self.trigger.set_low().map_err(|e| RangeError::Pin(e.kind()))
    }

    /// Busy-polls the echo line until it reads `level`.
    ///
    /// Returns the counter value at which the level was seen, or `None` once
    /// more than the timeout has elapsed since `since`.
    fn wait_for_echo(&mut self, level: bool, since: u32) -> Result<Option<u32>, RangeError<ErrorKind>> {
        loop {
            let high = self.echo.is_high().map_err(|e| RangeError::Pin(e.kind()))?;
            let now = self.clock.now_us();
            if high == level {
                return Ok(Some(now));
            }
            if timing::elapsed(since, now) > self.timeout_us {
                return Ok(None);
            }
        }
    }
}
