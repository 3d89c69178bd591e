//! Clock Control Tests
//!
//! Tests for dial rendering, the tick and time-sync callbacks and the
//! driver that wires the decoder to them. Async code runs on
//! `embassy_futures::block_on`.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test clock_tests

mod common;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use common::{Minute, Transmitter};
use embassy_futures::block_on;
use msf_clock::clock::{
    ClockDriver, ClockSync, DialLevels, DialOutput, PersistentClock, SyncOutcome,
};
use msf_clock::msf::{DecodedTime, DecoderConfig, DecoderEvent};
use msf_clock::types::Dial;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

/// In-memory persistent clock
#[derive(Debug)]
struct MockClock {
    now: NaiveDateTime,
    writes: Vec<NaiveDateTime>,
    fail: bool,
}

impl MockClock {
    fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            writes: Vec::new(),
            fail: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ClockFault;

impl PersistentClock for MockClock {
    type Error = ClockFault;

    async fn read_current_time(&mut self) -> Result<NaiveDateTime, ClockFault> {
        if self.fail {
            return Err(ClockFault);
        }
        Ok(self.now)
    }

    async fn write_current_time(&mut self, time: &NaiveDateTime) -> Result<(), ClockFault> {
        if self.fail {
            return Err(ClockFault);
        }
        self.now = *time;
        self.writes.push(*time);
        Ok(())
    }
}

/// Records the last level written to each dial
#[derive(Debug, Default)]
struct MockDials {
    enabled: bool,
    levels: DialLevels,
    writes: usize,
}

impl DialOutput for MockDials {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn set_level(&mut self, dial: Dial, level: u8) {
        self.writes += 1;
        match dial {
            Dial::Hour => self.levels.hour = level,
            Dial::Minute => self.levels.minute = level,
            Dial::Second => self.levels.second = level,
        }
    }
}

fn radio_time(datetime: NaiveDateTime) -> DecodedTime {
    use chrono::{Datelike, Timelike};
    DecodedTime {
        year: datetime.year() as u16,
        month: datetime.month() as u8,
        day: datetime.day() as u8,
        weekday: datetime.weekday().num_days_from_sunday() as u8,
        hour: datetime.hour() as u8,
        minute: datetime.minute() as u8,
        dut1_ms: 0,
        dst_pending: false,
        dst_active: false,
        datetime,
    }
}

// =============================================================================
// Dial Rendering Tests
// =============================================================================

#[test]
fn test_render_mid_afternoon() {
    let levels = DialLevels::render(&at(2023, 6, 15, 15, 30, 45), 255);
    assert_eq!(
        levels,
        DialLevels {
            hour: 63,
            minute: 127,
            second: 191
        }
    );
}

#[test]
fn test_hour_dial_uses_twelve_hour_scale() {
    let morning = DialLevels::render(&at(2023, 6, 15, 3, 0, 0), 255);
    let evening = DialLevels::render(&at(2023, 6, 15, 15, 0, 0), 255);
    assert_eq!(morning.hour, evening.hour);
}

#[test]
fn test_render_scales_with_full_scale() {
    let levels = DialLevels::render(&at(2023, 6, 15, 6, 30, 30), 100);
    assert_eq!(levels.hour, 50);
    assert_eq!(levels.minute, 50);
    assert_eq!(levels.second, 50);
}

#[test]
fn test_dial_output_helpers() {
    let mut dials = MockDials::default();
    dials.write_levels(&DialLevels {
        hour: 1,
        minute: 2,
        second: 3,
    });
    assert_eq!(dials.levels.level(Dial::Minute), 2);
    assert_eq!(dials.writes, 3);

    dials.zero();
    assert_eq!(dials.levels, DialLevels::ZERO);
}

// =============================================================================
// Tick Tests
// =============================================================================

#[test]
fn test_tick_renders_rtc_time() {
    let mut sync = ClockSync::new(
        MockClock::new(at(2023, 6, 15, 15, 30, 45)),
        MockDials::default(),
    );
    let levels = block_on(sync.tick()).unwrap();

    assert_eq!(levels, DialLevels::for_time(&at(2023, 6, 15, 15, 30, 45)));
    assert_eq!(sync.dials().levels, levels);
}

#[test]
fn test_tick_failure_keeps_previous_levels() {
    let mut clock = MockClock::new(at(2023, 6, 15, 15, 30, 45));
    clock.fail = true;
    let mut sync = ClockSync::new(clock, MockDials::default());

    assert_eq!(block_on(sync.tick()), Err(ClockFault));
    assert_eq!(sync.dials().writes, 0);
}

#[test]
fn test_start_and_stop_park_dials() {
    let mut sync = ClockSync::new(MockClock::new(at(2023, 6, 15, 9, 15, 0)), MockDials::default());
    sync.start();
    assert!(sync.dials().enabled);
    assert_eq!(sync.dials().levels, DialLevels::ZERO);

    block_on(sync.tick()).unwrap();
    assert_ne!(sync.dials().levels, DialLevels::ZERO);

    sync.stop();
    assert_eq!(sync.dials().levels, DialLevels::ZERO);
}

// =============================================================================
// Time Sync Tests
// =============================================================================

#[test]
fn test_rtc_ahead_is_corrected() {
    let radio = radio_time(at(2023, 6, 15, 14, 30, 0));
    let mut sync = ClockSync::new(MockClock::new(at(2023, 6, 15, 14, 30, 7)), MockDials::default());

    let outcome = block_on(sync.time_sync(&radio)).unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Corrected {
            ahead_by: TimeDelta::seconds(7)
        }
    );
    assert_eq!(sync.clock().writes, vec![radio.datetime]);
    assert_eq!(block_on(sync.now()), Ok(radio.datetime));
}

#[test]
fn test_rtc_behind_is_left_alone() {
    // A clock running slow is never pulled forward by the radio
    let radio = radio_time(at(2023, 6, 15, 14, 30, 0));
    let mut sync = ClockSync::new(
        MockClock::new(at(2023, 6, 15, 14, 29, 55)),
        MockDials::default(),
    );

    let outcome = block_on(sync.time_sync(&radio)).unwrap();
    assert!(!outcome.corrected());
    assert_eq!(
        outcome,
        SyncOutcome::Unchanged {
            offset: TimeDelta::seconds(-5)
        }
    );
    assert!(sync.clock().writes.is_empty());
}

#[test]
fn test_rtc_in_step_is_left_alone() {
    let radio = radio_time(at(2023, 6, 15, 14, 30, 0));
    let mut sync = ClockSync::new(MockClock::new(radio.datetime), MockDials::default());

    let outcome = block_on(sync.time_sync(&radio)).unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Unchanged {
            offset: TimeDelta::zero()
        }
    );
}

#[test]
fn test_time_sync_propagates_clock_errors() {
    let radio = radio_time(at(2023, 6, 15, 14, 30, 0));
    let mut clock = MockClock::new(at(2023, 6, 15, 14, 31, 0));
    clock.fail = true;
    let mut sync = ClockSync::new(clock, MockDials::default());

    assert_eq!(block_on(sync.time_sync(&radio)), Err(ClockFault));
}

// =============================================================================
// Driver Tests
// =============================================================================

fn broadcast() -> Vec<msf_clock::types::RadioEvent> {
    let (a, b) = Minute::june_2023().encode();
    let mut tx = Transmitter::new(0);
    tx.minute(&a, &b).marker();
    tx.take()
}

#[test]
fn test_driver_corrects_fast_rtc_from_broadcast() {
    let rtc = MockClock::new(at(2023, 6, 15, 14, 30, 12));
    let mut driver = ClockDriver::new(rtc, MockDials::default());
    driver.start();

    let mut minutes = 0;
    for event in broadcast() {
        if let Some(DecoderEvent::Minute(_)) = block_on(driver.handle(event)) {
            minutes += 1;
        }
    }

    assert_eq!(minutes, 1);
    assert_eq!(driver.sync().clock().writes, vec![at(2023, 6, 15, 14, 30, 0)]);
    assert_eq!(driver.clock_errors(), 0);
}

#[test]
fn test_driver_ticks_dials_every_second() {
    let rtc = MockClock::new(at(2023, 6, 15, 15, 30, 45));
    let mut driver = ClockDriver::new(rtc, MockDials::default());
    driver.start();

    let mut seconds = 0;
    for event in broadcast() {
        if block_on(driver.handle(event)) == Some(DecoderEvent::Second) {
            seconds += 1;
        }
    }

    assert!(seconds >= 60);
    assert_eq!(
        driver.sync().dials().levels,
        DialLevels {
            hour: 63,
            minute: 127,
            second: 191
        }
    );
}

#[test]
fn test_driver_survives_clock_failures() {
    let mut rtc = MockClock::new(at(2023, 6, 15, 14, 31, 0));
    rtc.fail = true;
    let mut driver = ClockDriver::new(rtc, MockDials::default());

    let mut decoded = None;
    for event in broadcast() {
        if let Some(DecoderEvent::Minute(time)) = block_on(driver.handle(event)) {
            decoded = Some(time);
        }
    }

    // every tick and the time sync failed, decoding carried on
    assert!(decoded.is_some());
    assert!(driver.clock_errors() > 60);
    assert_eq!(driver.decoder().bits(), 0);
}

#[test]
fn test_driver_stop_resets_decoder_and_dials() {
    let rtc = MockClock::new(at(2023, 6, 15, 15, 30, 45));
    let mut driver = ClockDriver::with_config(
        DecoderConfig::default(),
        ClockSync::with_full_scale(rtc, MockDials::default(), 100),
    );
    driver.start();

    let events = broadcast();
    for &event in &events[..40] {
        block_on(driver.handle(event));
    }
    assert!(driver.decoder().bits() > 0);
    assert_ne!(driver.sync().dials().levels, DialLevels::ZERO);

    driver.stop();
    assert_eq!(driver.decoder().bits(), 0);
    assert_eq!(driver.sync().dials().levels, DialLevels::ZERO);
}
