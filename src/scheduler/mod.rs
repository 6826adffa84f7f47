// src/scheduler/mod.rs

//! Cooperative control loop of the node.
//!
//! Three duties share one thread: the transmit duty ranges and sends, the
//! status-poll duty refreshes the cached radio status, and the drain duty
//! empties the radio's inbound bytes on every pass. The periodic duties keep
//! separate schedules, so a slow or failed run of one never shifts the other.

use core::fmt::Debug;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::common::{
    address::{ChannelIndex, NodeId},
    config::{Config, ScheduleConfig},
    error::SendError,
    hal_traits::{Clock, LinkSerial},
    types::{LinkStatus, Reading},
};
use crate::link::LinkSession;
use crate::payload;
use crate::sensor::RangeSensor;

mod duty;

pub use duty::{Duty, DutyState};

/// Source of distance readings driven by the transmit duty.
pub trait Ranging {
    /// One ranging cycle; a failed cycle yields [`Reading::failed`].
    fn measure(&mut self) -> Reading;
}

/// Radio operations the loop needs.
pub trait RadioLink {
    type Error: Debug;

    fn send_text(
        &mut self,
        channel: ChannelIndex,
        destination: NodeId,
        message: &str,
    ) -> Result<(), SendError<Self::Error>>;

    /// Always returns a valid status, live or fallback.
    fn refresh_status(&mut self) -> LinkStatus;

    /// Consumes whatever is pending without waiting.
    fn drain_incoming(&mut self) -> usize;
}

impl<TRIG, ECHO, C> Ranging for RangeSensor<TRIG, ECHO, C>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    C: Clock,
{
    fn measure(&mut self) -> Reading {
        RangeSensor::measure(self)
    }
}

impl<IF, C> RadioLink for LinkSession<IF, C>
where
    IF: LinkSerial,
    C: Clock,
{
    type Error = IF::Error;

    fn send_text(
        &mut self,
        channel: ChannelIndex,
        destination: NodeId,
        message: &str,
    ) -> Result<(), SendError<Self::Error>> {
        LinkSession::send_text(self, channel, destination, message)
    }

    fn refresh_status(&mut self) -> LinkStatus {
        LinkSession::refresh_status(self)
    }

    fn drain_incoming(&mut self) -> usize {
        LinkSession::drain_incoming(self)
    }
}

/// How a transmit duty run ended.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TransmitOutcome {
    /// Reading framed and handed to the radio.
    Sent(Reading),
    /// Ranging failed; nothing was sent this cycle.
    SensorFailed,
    /// Payload did not fit its buffer; nothing was sent.
    PayloadOverflow,
    /// Radio rejected or did not finish the send.
    SendFailed,
}

/// What one pass of the loop did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassReport {
    /// Inbound bytes drained.
    pub drained: usize,
    /// Status the poll duty produced, if it ran.
    pub status_poll: Option<LinkStatus>,
    /// Transmit duty outcome, if it ran.
    pub transmit: Option<TransmitOutcome>,
}

impl PassReport {
    /// Neither periodic duty ran.
    pub fn is_idle(&self) -> bool {
        self.status_poll.is_none() && self.transmit.is_none()
    }
}

/// Owns the sensor, the radio link and the clock, and runs the duties.
#[derive(Debug)]
pub struct Scheduler<S, L, C>
where
    S: Ranging,
    L: RadioLink,
    C: Clock,
{
    sensor: S,
    link: L,
    clock: C,
    channel: ChannelIndex,
    destination: NodeId,
    schedule: ScheduleConfig,
    /// Status attached to outgoing readings; replaced only by the poll duty.
    radio_status: LinkStatus,
    transmit: Duty,
    status_poll: Duty,
}

impl<S, L, C> Scheduler<S, L, C>
where
    S: Ranging,
    L: RadioLink,
    C: Clock,
{
    /// Takes the initialized peripherals, fetches the radio status once and
    /// arms both periodic duties relative to now.
    pub fn start(sensor: S, mut link: L, clock: C, config: &Config) -> Self {
        config.log_summary();

        let radio_status = link.refresh_status();
        let now = clock.now_ms();
        let schedule = config.schedule;

        log::info!(
            "scheduler started: first status poll in {} ms, first transmission in {} ms",
            schedule.status_poll_first_delay_ms,
            schedule.transmit_first_delay_ms
        );

        Scheduler {
            sensor,
            link,
            clock,
            channel: config.channel,
            destination: config.destination,
            schedule,
            radio_status,
            transmit: Duty::new(
                "transmit",
                schedule.transmit_interval_ms,
                now.wrapping_add(schedule.transmit_first_delay_ms),
            ),
            status_poll: Duty::new(
                "status_poll",
                schedule.status_poll_interval_ms,
                now.wrapping_add(schedule.status_poll_first_delay_ms),
            ),
        }
    }

    /// Runs the loop forever, idling between passes.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_pass();
            self.clock.delay_ms(self.schedule.loop_idle_ms);
        }
    }

    /// One pass: drain, then the status poll if due, then the transmission if due.
    pub fn run_pass(&mut self) -> PassReport {
        let drained = self.link.drain_incoming();

        let status_poll = if self.status_poll.poll(self.clock.now_ms()) {
            Some(self.run_status_poll())
        } else {
            None
        };

        let transmit = if self.transmit.poll(self.clock.now_ms()) {
            Some(self.run_transmit())
        } else {
            None
        };

        PassReport { drained, status_poll, transmit }
    }

    /// Status the next transmission will carry.
    #[inline]
    pub fn radio_status(&self) -> LinkStatus {
        self.radio_status
    }

    #[inline]
    pub fn transmit_duty(&self) -> &Duty {
        &self.transmit
    }

    #[inline]
    pub fn status_poll_duty(&self) -> &Duty {
        &self.status_poll
    }

    /// Stops scheduling and gives the peripherals back.
    pub fn release(self) -> (S, L, C) {
        (self.sensor, self.link, self.clock)
    }

    // --- Duties ---

    fn run_status_poll(&mut self) -> LinkStatus {
        self.status_poll.begin();
        let status = self.link.refresh_status();
        self.radio_status = status;
        self.status_poll.finish(self.clock.now_ms());
        status
    }

    fn run_transmit(&mut self) -> TransmitOutcome {
        self.transmit.begin();
        let outcome = self.transmit_reading();
        self.transmit.finish(self.clock.now_ms());
        outcome
    }

    fn transmit_reading(&mut self) -> TransmitOutcome {
        let reading = self.sensor.measure();
        if !reading.is_valid() {
            log::warn!("sonar reading failed, skipping transmission");
            return TransmitOutcome::SensorFailed;
        }
        log::info!("sonar reading: {:.2} cm at {} ms", reading.distance_cm, reading.timestamp_ms);

        let status = self.attachable_status();
        let message = match payload::format_combined(&reading, &status) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("reading not sent: {}", e);
                return TransmitOutcome::PayloadOverflow;
            }
        };

        match self.link.send_text(self.channel, self.destination, &message) {
            Ok(()) => {
                log::info!("reading transmitted ({} bytes, radio {})", message.len(), status.source);
                TransmitOutcome::Sent(reading)
            }
            Err(e) => {
                log::warn!("failed to transmit reading: {}", e);
                TransmitOutcome::SendFailed
            }
        }
    }

    fn attachable_status(&mut self) -> LinkStatus {
        match self.radio_status.trusted() {
            Some(status) => *status,
            None => {
                self.radio_status = self.link.refresh_status();
                self.radio_status
            }
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::StatusSource;
    use crate::link::session::mock::{MockClock, MockCommError, MockInterface};
    use std::collections::VecDeque;
    use std::string::{String, ToString};
    use std::vec::Vec;

    const PASS_MS: u64 = 100;

    struct FakeRanging {
        readings: VecDeque<Reading>,
        calls: u32,
    }

    impl FakeRanging {
        fn steady(distance_cm: f32) -> Self {
            let mut readings = VecDeque::new();
            readings.push_back(Reading::new(distance_cm, 0));
            FakeRanging { readings, calls: 0 }
        }

        fn failing() -> Self {
            let mut readings = VecDeque::new();
            readings.push_back(Reading::failed(0));
            FakeRanging { readings, calls: 0 }
        }
    }

    impl Ranging for FakeRanging {
        // Repeats the last queued reading once the queue is down to one.
        fn measure(&mut self) -> Reading {
            self.calls += 1;
            if self.readings.len() > 1 {
                self.readings.pop_front().unwrap()
            } else {
                *self.readings.front().unwrap()
            }
        }
    }

    struct FakeLink<'a> {
        clock: &'a MockClock,
        statuses: VecDeque<LinkStatus>,
        /// Clock time one refresh costs, like a poll that waits out its reply budget.
        refresh_cost_ms: u64,
        fail_sends: bool,
        sent: Vec<String>,
        send_attempts: u32,
        refreshes: u32,
        drains: u32,
    }

    impl<'a> FakeLink<'a> {
        fn new(clock: &'a MockClock) -> Self {
            FakeLink {
                clock,
                statuses: VecDeque::new(),
                refresh_cost_ms: 0,
                fail_sends: false,
                sent: Vec::new(),
                send_attempts: 0,
                refreshes: 0,
                drains: 0,
            }
        }
    }

    impl RadioLink for FakeLink<'_> {
        type Error = MockCommError;

        fn send_text(
            &mut self,
            _channel: ChannelIndex,
            _destination: NodeId,
            message: &str,
        ) -> Result<(), SendError<Self::Error>> {
            self.send_attempts += 1;
            if self.fail_sends {
                return Err(SendError::Io(MockCommError));
            }
            self.sent.push(message.to_string());
            Ok(())
        }

        fn refresh_status(&mut self) -> LinkStatus {
            self.refreshes += 1;
            self.clock.advance(self.refresh_cost_ms * 1000);
            self.statuses.pop_front().unwrap_or(LinkStatus::SIMULATED)
        }

        fn drain_incoming(&mut self) -> usize {
            self.drains += 1;
            0
        }
    }

    /// Runs passes every `PASS_MS` until the clock reaches `until_ms`.
    fn run_until<S: Ranging, L: RadioLink>(sched: &mut Scheduler<S, L, &MockClock>, clock: &MockClock, until_ms: u64) -> u32 {
        let mut passes = 0;
        while clock.now_us.get() / 1000 < until_ms {
            clock.advance(PASS_MS * 1000);
            sched.run_pass();
            passes += 1;
        }
        passes
    }

    #[test]
    fn test_start_fetches_status_eagerly() {
        let clock = MockClock::default();
        let mut link = FakeLink::new(&clock);
        link.statuses.push_back(LinkStatus::live(50, -90, 10));
        let sched = Scheduler::start(FakeRanging::steady(42.0), link, &clock, &Config::DEFAULT);

        assert_eq!(sched.link.refreshes, 1);
        assert_eq!(sched.radio_status(), LinkStatus::live(50, -90, 10));
        assert_eq!(sched.status_poll_duty().next_due_ms(), 2_000);
        assert_eq!(sched.transmit_duty().next_due_ms(), 5_000);
        assert_eq!(sched.sensor.calls, 0);
    }

    #[test]
    fn test_first_runs_follow_startup_offsets() {
        let clock = MockClock::default();
        let mut sched = Scheduler::start(FakeRanging::steady(42.0), FakeLink::new(&clock), &clock, &Config::DEFAULT);

        clock.advance(1_900 * 1000);
        assert!(sched.run_pass().is_idle());

        clock.advance(PASS_MS * 1000);
        let report = sched.run_pass();
        assert_eq!(report.status_poll, Some(LinkStatus::SIMULATED));
        assert_eq!(report.transmit, None);

        run_until(&mut sched, &clock, 4_900);
        assert_eq!(sched.link.send_attempts, 0);
        clock.advance(PASS_MS * 1000);
        let report = sched.run_pass();
        assert_eq!(report.transmit, Some(TransmitOutcome::Sent(Reading::new(42.0, 0))));
        assert_eq!(sched.link.sent.len(), 1);
    }

    #[test]
    fn test_drain_runs_every_pass() {
        let clock = MockClock::default();
        let mut sched = Scheduler::start(FakeRanging::steady(42.0), FakeLink::new(&clock), &clock, &Config::DEFAULT);
        let passes = run_until(&mut sched, &clock, 10_000);
        assert_eq!(sched.link.drains, passes);
    }

    #[test]
    fn test_send_failures_do_not_postpone_status_poll() {
        let clock = MockClock::default();
        let mut link = FakeLink::new(&clock);
        link.fail_sends = true;
        let mut sched = Scheduler::start(FakeRanging::steady(42.0), link, &clock, &Config::DEFAULT);

        run_until(&mut sched, &clock, 600_000);
        // eager fetch plus polls at 2 s, 62 s, ... 542 s
        assert_eq!(sched.link.refreshes, 11);
        // transmissions at 5 s and 305 s, both failed
        assert_eq!(sched.link.send_attempts, 2);
        assert!(sched.link.sent.is_empty());
        assert_eq!(sched.transmit_duty().runs(), 2);
        assert_eq!(sched.transmit_duty().next_due_ms(), 605_000);
    }

    #[test]
    fn test_sensor_failures_skip_send_and_keep_schedule() {
        let clock = MockClock::default();
        let mut sched = Scheduler::start(FakeRanging::failing(), FakeLink::new(&clock), &clock, &Config::DEFAULT);

        run_until(&mut sched, &clock, 4_900);
        clock.advance(PASS_MS * 1000);
        assert_eq!(sched.run_pass().transmit, Some(TransmitOutcome::SensorFailed));

        run_until(&mut sched, &clock, 600_000);
        assert_eq!(sched.sensor.calls, 2);
        assert_eq!(sched.link.send_attempts, 0);
        assert_eq!(sched.link.refreshes, 11);
    }

    #[test]
    fn test_slow_status_polls_do_not_postpone_transmit() {
        let clock = MockClock::default();
        let mut link = FakeLink::new(&clock);
        // every poll waits out its reply budget and falls back
        link.refresh_cost_ms = 100;
        let mut sched = Scheduler::start(FakeRanging::steady(42.0), link, &clock, &Config::DEFAULT);
        assert_eq!(sched.transmit_duty().next_due_ms(), 5_100);

        run_until(&mut sched, &clock, 600_000);
        assert_eq!(sched.link.send_attempts, 2);
        assert_eq!(sched.transmit_duty().next_due_ms(), 605_100);
        assert_eq!(sched.link.refreshes, 11);
    }

    #[test]
    fn test_transmit_uses_cached_status_without_fetching() {
        let clock = MockClock::default();
        let mut link = FakeLink::new(&clock);
        link.statuses.push_back(LinkStatus::live(50, -90, 10));
        link.statuses.push_back(LinkStatus::live(40, -95, 12));
        let mut sched = Scheduler::start(FakeRanging::steady(17.15), link, &clock, &Config::DEFAULT);

        run_until(&mut sched, &clock, 5_000);
        assert_eq!(sched.link.refreshes, 2);
        assert_eq!(sched.link.sent.len(), 1);
        assert_eq!(
            sched.link.sent[0],
            "{\"sensor\":\"sonar\",\"distance_cm\":17.15,\"timestamp\":0,\
             \"radio_status\":{\"battery_level\":40,\"rssi\":-95,\"channel_util\":12}}"
        );
    }

    #[test]
    fn test_status_poll_runs_before_transmit_in_same_pass() {
        let clock = MockClock::default();
        let mut link = FakeLink::new(&clock);
        link.statuses.push_back(LinkStatus::live(50, -90, 10));
        link.statuses.push_back(LinkStatus::live(33, -70, 5));
        let mut config = Config::DEFAULT;
        config.schedule.transmit_first_delay_ms = 1_000;
        config.schedule.status_poll_first_delay_ms = 1_000;
        let mut sched = Scheduler::start(FakeRanging::steady(42.0), link, &clock, &config);

        clock.advance(1_000 * 1000);
        let report = sched.run_pass();
        assert_eq!(report.status_poll, Some(LinkStatus::live(33, -70, 5)));
        assert!(matches!(report.transmit, Some(TransmitOutcome::Sent(_))));
        assert!(sched.link.sent[0].contains("\"battery_level\":33"));
    }

    #[test]
    fn test_untrusted_status_is_refreshed_before_sending() {
        let clock = MockClock::default();
        let mut link = FakeLink::new(&clock);
        link.statuses.push_back(LinkStatus::UNKNOWN);
        link.statuses.push_back(LinkStatus::live(60, -85, 15));
        let mut config = Config::DEFAULT;
        config.schedule.transmit_first_delay_ms = 500;
        let mut sched = Scheduler::start(FakeRanging::steady(42.0), link, &clock, &config);

        clock.advance(500 * 1000);
        let report = sched.run_pass();
        assert!(matches!(report.transmit, Some(TransmitOutcome::Sent(_))));
        assert_eq!(sched.link.refreshes, 2);
        assert!(sched.link.sent[0].contains("\"battery_level\":60"));
        assert_eq!(sched.radio_status().source, StatusSource::Live);
    }

    #[test]
    fn test_end_to_end_with_link_session() {
        let clock = MockClock::default();
        let mut mock_if = MockInterface::new();
        mock_if.reply_to_status(b"BATT=50,RSSI=-90,UTIL=10\r\n");
        let config = Config::DEFAULT;
        let link = LinkSession::initialize(mock_if, &clock, &config.serial).unwrap();
        let mut sched = Scheduler::start(FakeRanging::steady(17.15), link, &clock, &config);
        assert_eq!(sched.radio_status(), LinkStatus::live(50, -90, 10));

        let start_ms = clock.now_ms() as u64;
        run_until(&mut sched, &clock, start_ms + 5_000);

        let (sensor, link, _) = sched.release();
        assert_eq!(sensor.calls, 1);
        let (mock_if, _) = link.release();
        let expected_send = "AT+SEND=0,FFFFFFFF,{\"sensor\":\"sonar\",\"distance_cm\":17.15,\"timestamp\":0,\
                             \"radio_status\":{\"battery_level\":50,\"rssi\":-90,\"channel_util\":10}}\r\n";
        assert_eq!(
            mock_if.written(),
            ["AT+STATUS?\r\n", "AT+STATUS?\r\n", expected_send].concat()
        );
    }
}
