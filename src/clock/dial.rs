//! Dial Rendering
//!
//! Maps a time of day onto three independent output levels. Each dial is a
//! moving-coil meter driven by a filtered PWM channel, so a level is simply
//! the fraction of the dial's travel.

use chrono::Timelike;

use crate::config::DIAL_FULL_SCALE;
use crate::types::Dial;

/// Output levels for the three dials
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DialLevels {
    /// Hour dial (twelve hour scale)
    pub hour: u8,
    /// Minute dial
    pub minute: u8,
    /// Second dial
    pub second: u8,
}

impl DialLevels {
    /// All dials at rest
    pub const ZERO: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Render a time of day, truncating toward zero
    #[must_use]
    pub fn render<T: Timelike>(time: &T, full_scale: u8) -> Self {
        Self {
            hour: scale(time.hour() % 12, 12, full_scale),
            minute: scale(time.minute(), 60, full_scale),
            second: scale(time.second(), 60, full_scale),
        }
    }

    /// Render with the configured full-scale level
    #[must_use]
    pub fn for_time<T: Timelike>(time: &T) -> Self {
        Self::render(time, DIAL_FULL_SCALE)
    }

    /// Level for one dial
    #[must_use]
    pub const fn level(&self, dial: Dial) -> u8 {
        match dial {
            Dial::Hour => self.hour,
            Dial::Minute => self.minute,
            Dial::Second => self.second,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DialLevels {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "h={} m={} s={}", self.hour, self.minute, self.second);
    }
}

/// `value / range * full_scale` in integer arithmetic
fn scale(value: u32, range: u32, full_scale: u8) -> u8 {
    let level = value.min(range) * u32::from(full_scale) / range;
    u8::try_from(level).unwrap_or(full_scale)
}

/// Proportional outputs driving the dials
pub trait DialOutput {
    /// Configure the outputs for driving (pin mode, timer enable)
    fn enable(&mut self);

    /// Write one dial's level
    fn set_level(&mut self, dial: Dial, level: u8);

    /// Write all three levels
    fn write_levels(&mut self, levels: &DialLevels) {
        for dial in Dial::ALL {
            self.set_level(dial, levels.level(dial));
        }
    }

    /// Park every dial at zero
    fn zero(&mut self) {
        self.write_levels(&DialLevels::ZERO);
    }
}
