//! Clock Synchronization Controller
//!
//! Two callbacks driven by the decoder: a per-second tick that refreshes the
//! dials from the persistent clock, and a per-minute time sync that corrects
//! the persistent clock from the radio.

use chrono::{NaiveDateTime, TimeDelta};

use super::dial::{DialLevels, DialOutput};
use super::PersistentClock;
use crate::config::DIAL_FULL_SCALE;
use crate::msf::DecodedTime;

/// Result of one time sync
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The persistent clock was ahead and has been rewritten
    Corrected {
        /// Persistent clock minus radio time before the correction
        ahead_by: TimeDelta,
    },
    /// The persistent clock was left alone
    Unchanged {
        /// Persistent clock minus radio time (zero or negative)
        offset: TimeDelta,
    },
}

impl SyncOutcome {
    /// True if the persistent clock was written
    #[must_use]
    pub const fn corrected(&self) -> bool {
        matches!(self, Self::Corrected { .. })
    }
}

/// Couples the persistent clock with the dial outputs
pub struct ClockSync<C, D> {
    clock: C,
    dials: D,
    full_scale: u8,
}

impl<C: PersistentClock, D: DialOutput> ClockSync<C, D> {
    /// Create a controller with the configured full-scale level
    pub fn new(clock: C, dials: D) -> Self {
        Self::with_full_scale(clock, dials, DIAL_FULL_SCALE)
    }

    /// Create a controller with an explicit full-scale level
    pub fn with_full_scale(clock: C, dials: D, full_scale: u8) -> Self {
        Self {
            clock,
            dials,
            full_scale,
        }
    }

    /// Configure the dial outputs and park them at zero
    pub fn start(&mut self) {
        debug!("initialising the dial driver");
        self.dials.enable();
        self.dials.zero();
    }

    /// Once-per-second refresh from the persistent clock
    ///
    /// # Errors
    /// Propagates the persistent clock's read error; the dials keep their
    /// previous levels.
    pub async fn tick(&mut self) -> Result<DialLevels, C::Error> {
        let now = self.clock.read_current_time().await?;
        let levels = DialLevels::render(&now, self.full_scale);
        trace!("updating clock dials {}", levels);
        self.dials.write_levels(&levels);
        Ok(levels)
    }

    /// Correct the persistent clock from a decoded minute
    ///
    /// Only a persistent clock that is strictly *ahead* of the radio is
    /// rewritten. A clock running behind is left as is.
    ///
    /// # Errors
    /// Propagates read and write errors from the persistent clock.
    pub async fn time_sync(&mut self, radio: &DecodedTime) -> Result<SyncOutcome, C::Error> {
        debug!("syncing clock driver");
        let rtc = self.clock.read_current_time().await?;
        let difference = rtc - radio.datetime;

        if difference > TimeDelta::zero() {
            warn!(
                "difference in clocks - rtc ahead by {}ms, correcting to {}-{}-{} {}:{}",
                difference.num_milliseconds(),
                radio.year,
                radio.month,
                radio.day,
                radio.hour,
                radio.minute
            );
            self.clock.write_current_time(&radio.datetime).await?;
            Ok(SyncOutcome::Corrected {
                ahead_by: difference,
            })
        } else {
            Ok(SyncOutcome::Unchanged { offset: difference })
        }
    }

    /// Park every dial at zero
    pub fn stop(&mut self) {
        info!("stopping dial outputs");
        self.dials.zero();
    }

    /// Read the persistent clock without touching the dials
    ///
    /// # Errors
    /// Propagates the persistent clock's read error.
    pub async fn now(&mut self) -> Result<NaiveDateTime, C::Error> {
        self.clock.read_current_time().await
    }

    /// Borrow the persistent clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Borrow the dial outputs
    pub fn dials(&self) -> &D {
        &self.dials
    }
}
