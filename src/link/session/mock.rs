// src/link/session/mock.rs

//! Mock radio UART and clock shared by the session tests.

use crate::common::{frame::SerialConfig, hal_traits::{Clock, LinkSerial}};
use core::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

// --- Mock Clock ---
#[derive(Debug, Default)]
pub struct MockClock {
    /// Shared so a mock interface can time its replies on the same clock.
    pub now_us: Rc<Cell<u64>>,
}
impl MockClock {
    pub fn advance(&self, us: u64) {
        self.now_us.set(self.now_us.get() + us);
    }
}
impl Clock for MockClock {
    fn now_us(&self) -> u32 {
        self.now_us.get() as u32
    }
    fn now_ms(&self) -> u32 {
        (self.now_us.get() / 1000) as u32
    }
    fn delay_us(&self, us: u32) {
        self.advance(us as u64);
    }
    fn delay_ms(&self, ms: u32) {
        self.advance(ms as u64 * 1000);
    }
}

// --- Mock Comm Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockCommError;

// --- Mock Interface ---
/// Radio stand-in. Bytes in `read_queue` are pending right away; `status_reply`
/// becomes pending once a full `AT+STATUS?\r\n` has been written, or
/// `reply_delay_us` later when a reply clock is set.
#[derive(Debug, Default)]
pub struct MockInterface {
    pub config: Option<SerialConfig>,
    pub read_queue: VecDeque<u8>,
    pub write_log: Vec<u8>,
    pub status_reply: Option<Vec<u8>>,
    pub reply_delay_us: u64,
    reply_clock: Option<Rc<Cell<u64>>>,
    /// Reply waiting for its release time.
    scheduled_reply: Option<(u64, Vec<u8>)>,
    pub fail_configure: bool,
    pub fail_writes: bool,
    pub fail_reads: bool,
    /// Writes return `WouldBlock` forever (stalled FIFO).
    pub stall_writes: bool,
    pub io_call_counts: HashMap<&'static str, u32>,
}
impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn stage_read_data(&mut self, data: &[u8]) {
        self.read_queue.extend(data.iter().copied());
    }
    pub fn reply_to_status(&mut self, reply: &[u8]) {
        self.status_reply = Some(reply.to_vec());
    }
    /// Answers each status request with `reply`, `delay_us` after the request
    /// is written as measured on `clock`.
    pub fn reply_to_status_after(&mut self, reply: &[u8], delay_us: u64, clock: &MockClock) {
        self.status_reply = Some(reply.to_vec());
        self.reply_delay_us = delay_us;
        self.reply_clock = Some(Rc::clone(&clock.now_us));
    }
    pub fn written(&self) -> &str {
        core::str::from_utf8(&self.write_log).unwrap()
    }
    pub fn get_call_count(&self, name: &'static str) -> u32 {
        *self.io_call_counts.get(name).unwrap_or(&0)
    }
    fn increment_call_count(&mut self, name: &'static str) {
        *self.io_call_counts.entry(name).or_insert(0) += 1;
    }
    fn release_scheduled_reply(&mut self) {
        let now = self.reply_clock.as_ref().map(|c| c.get());
        let due = match (&self.scheduled_reply, now) {
            (Some((release_at, _)), Some(now)) => now >= *release_at,
            _ => false,
        };
        if due {
            if let Some((_, reply)) = self.scheduled_reply.take() {
                self.read_queue.extend(reply);
            }
        }
    }
}
impl LinkSerial for MockInterface {
    type Error = MockCommError;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.increment_call_count("read_byte");
        if self.fail_reads {
            return Err(nb::Error::Other(MockCommError));
        }
        self.release_scheduled_reply();
        self.read_queue.pop_front().ok_or(nb::Error::WouldBlock)
    }
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        self.increment_call_count("write_byte");
        if self.fail_writes {
            return Err(nb::Error::Other(MockCommError));
        }
        if self.stall_writes {
            return Err(nb::Error::WouldBlock);
        }
        self.write_log.push(byte);
        if self.write_log.ends_with(b"AT+STATUS?\r\n") {
            if let Some(reply) = self.status_reply.clone() {
                match self.reply_clock.as_ref().map(|c| c.get()) {
                    Some(now) => self.scheduled_reply = Some((now + self.reply_delay_us, reply)),
                    None => self.read_queue.extend(reply),
                }
            }
        }
        Ok(())
    }
    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.increment_call_count("flush");
        Ok(())
    }
    fn configure(&mut self, config: &SerialConfig) -> Result<(), Self::Error> {
        self.increment_call_count("configure");
        if self.fail_configure {
            return Err(MockCommError);
        }
        self.config = Some(*config);
        Ok(())
    }
}
