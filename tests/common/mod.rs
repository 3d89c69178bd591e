//! Shared test fixtures
//!
//! A frame builder that lays out a broadcast minute bit by bit, and a
//! synthetic transmitter that keys a carrier into radio events the way the
//! receiver module would report them.

#![allow(dead_code)]

use msf_clock::msf::frame::{encode_bcd, parity, FRAME_BITS, MINUTE_MARKER};
use msf_clock::msf::ParityGroup;
use msf_clock::types::{EdgeDirection, RadioEvent};

/// Channel-B index of the summer-time-pending flag (second 53)
pub const B_DST_PENDING: usize = 52;
/// Channel-B index of the summer-time flag (second 58)
pub const B_DST_ACTIVE: usize = 57;

/// Fields of one broadcast minute
#[derive(Clone, Copy, Debug)]
pub struct Minute {
    pub yy: u32,
    pub month: u32,
    pub day: u32,
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
    /// DUT1 in tenths of a second (-8..=8)
    pub dut1: i32,
    pub dst_pending: bool,
    pub dst_active: bool,
}

impl Minute {
    /// Thursday 2023-06-15 14:30, summer time, DUT1 -0.2 s
    pub const fn june_2023() -> Self {
        Self {
            yy: 23,
            month: 6,
            day: 15,
            weekday: 4,
            hour: 14,
            minute: 30,
            dut1: -2,
            dst_pending: false,
            dst_active: true,
        }
    }

    /// Lay the fields out as channel A and channel B with valid parity
    pub fn encode(&self) -> (Vec<bool>, Vec<bool>) {
        let mut a = vec![false; FRAME_BITS];
        let mut b = vec![false; FRAME_BITS];

        encode_bcd(self.yy, &mut a[16..24]);
        encode_bcd(self.month, &mut a[24..29]);
        encode_bcd(self.day, &mut a[29..35]);
        encode_bcd(self.weekday, &mut a[35..38]);
        encode_bcd(self.hour, &mut a[38..44]);
        encode_bcd(self.minute, &mut a[44..51]);
        a[51..59].copy_from_slice(&MINUTE_MARKER);

        let count = self.dut1.unsigned_abs() as usize;
        let base = if self.dut1 >= 0 { 0 } else { 8 };
        for bit in &mut b[base..base + count] {
            *bit = true;
        }
        b[B_DST_PENDING] = self.dst_pending;
        b[B_DST_ACTIVE] = self.dst_active;

        for group in ParityGroup::ALL {
            b[group.flag_index()] = !parity(&a[group.span()]);
        }

        (a, b)
    }
}

/// Keys a carrier and records the receiver edges it would produce
///
/// The receiver output is inverted, so the carrier dropping is a rising
/// edge and the carrier returning is a falling edge.
pub struct Transmitter {
    now_us: u32,
    events: Vec<RadioEvent>,
}

impl Transmitter {
    pub fn new(start_us: u32) -> Self {
        Self {
            now_us: start_us,
            events: Vec::new(),
        }
    }

    pub fn now_us(&self) -> u32 {
        self.now_us
    }

    /// Carrier off for `ms`
    pub fn off(&mut self, ms: u32) -> &mut Self {
        self.events
            .push(RadioEvent::edge(EdgeDirection::Rising, self.now_us));
        self.now_us = self.now_us.wrapping_add(ms * 1_000);
        self
    }

    /// Carrier on for `ms`
    pub fn on(&mut self, ms: u32) -> &mut Self {
        self.events
            .push(RadioEvent::edge(EdgeDirection::Falling, self.now_us));
        self.now_us = self.now_us.wrapping_add(ms * 1_000);
        self
    }

    /// Carrier drops for `us` microseconds without starting a new interval
    pub fn glitch(&mut self, us: u32) -> &mut Self {
        self.events
            .push(RadioEvent::edge(EdgeDirection::Rising, self.now_us));
        self.now_us = self.now_us.wrapping_add(us);
        self.events
            .push(RadioEvent::edge(EdgeDirection::Falling, self.now_us));
        self
    }

    /// Let `ms` pass with the carrier unchanged
    pub fn hold(&mut self, ms: u32) -> &mut Self {
        self.now_us = self.now_us.wrapping_add(ms * 1_000);
        self
    }

    /// Second zero of a minute
    pub fn marker(&mut self) -> &mut Self {
        self.off(500).on(500)
    }

    /// One data second carrying bits A and B
    pub fn second(&mut self, a: bool, b: bool) -> &mut Self {
        match (a, b) {
            (false, false) => self.off(100).on(900),
            (false, true) => self.off(100).on(100).off(100).on(700),
            (true, false) => self.off(200).on(800),
            (true, true) => self.off(300).on(700),
        }
    }

    /// A full minute: marker followed by one second per bit pair
    pub fn minute(&mut self, a: &[bool], b: &[bool]) -> &mut Self {
        self.marker();
        for (&bit_a, &bit_b) in a.iter().zip(b) {
            self.second(bit_a, bit_b);
        }
        self
    }

    /// Drain the recorded events
    pub fn take(&mut self) -> Vec<RadioEvent> {
        core::mem::take(&mut self.events)
    }
}
