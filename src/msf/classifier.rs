//! Edge Timing Classifier
//!
//! Measures the interval each edge terminates and snaps it onto one of the
//! nominal MSF pulse widths.

use super::DecoderConfig;
use crate::types::{EdgeDirection, PulseWidth};

/// Result of classifying one edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pulse {
    /// Edge swallowed as the trailing half of a glitch
    Skipped,
    /// No complete interval yet (start-up or counter wrap)
    Incomplete,
    /// Interval below the glitch threshold
    Noise,
    /// Interval matched a nominal width
    Width(PulseWidth),
    /// Interval outside every tolerance window (raw microseconds)
    Unclassified(u32),
}

impl Pulse {
    /// Nominal width, if the pulse was classified
    #[must_use]
    pub const fn width(self) -> Option<PulseWidth> {
        match self {
            Self::Width(w) => Some(w),
            _ => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Pulse {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Skipped => defmt::write!(f, "Skipped"),
            Self::Incomplete => defmt::write!(f, "Incomplete"),
            Self::Noise => defmt::write!(f, "Noise"),
            Self::Width(w) => defmt::write!(f, "{}", w),
            Self::Unclassified(us) => defmt::write!(f, "Unclassified({}us)", us),
        }
    }
}

/// Rolling edge timing state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseClassifier {
    ignore_pulse_us: u32,
    pulse_margin_us: u32,
    /// Timestamp of the last falling edge (carrier returned)
    carrier_on_since: Option<u32>,
    /// Timestamp of the last rising edge (carrier dropped)
    carrier_off_since: Option<u32>,
    /// Drop the next edge entirely
    skip_next: bool,
}

impl PulseClassifier {
    /// Create a classifier with the given tolerances
    #[must_use]
    pub const fn new(config: &DecoderConfig) -> Self {
        Self {
            ignore_pulse_us: config.ignore_pulse_us,
            pulse_margin_us: config.pulse_margin_us,
            carrier_on_since: None,
            carrier_off_since: None,
            skip_next: false,
        }
    }

    /// Classify the interval terminated by this edge
    pub fn classify(&mut self, direction: EdgeDirection, timestamp_us: u32) -> Pulse {
        // trailing half of a glitch
        if self.skip_next {
            self.skip_next = false;
            return Pulse::Skipped;
        }

        match direction {
            EdgeDirection::Falling if self.carrier_on_since.is_none() => {
                self.carrier_on_since = Some(timestamp_us);
            }
            EdgeDirection::Rising if self.carrier_off_since.is_none() => {
                self.carrier_off_since = Some(timestamp_us);
            }
            _ => {}
        }

        let wrapped = [self.carrier_on_since, self.carrier_off_since]
            .iter()
            .flatten()
            .any(|&since| timestamp_us < since);
        if wrapped {
            debug!("edge clock wrapped at {}us", timestamp_us);
            self.carrier_on_since = None;
            self.carrier_off_since = None;
            return Pulse::Incomplete;
        }

        let (Some(on_since), Some(off_since)) = (self.carrier_on_since, self.carrier_off_since)
        else {
            return Pulse::Incomplete;
        };

        let interval_us = match direction {
            EdgeDirection::Rising => {
                self.carrier_off_since = Some(timestamp_us);
                timestamp_us - on_since
            }
            EdgeDirection::Falling => {
                self.carrier_on_since = Some(timestamp_us);
                timestamp_us - off_since
            }
        };

        if interval_us < self.ignore_pulse_us {
            debug!("ignoring {} glitch of {}us", direction, interval_us);
            self.skip_next = true;
            return Pulse::Noise;
        }

        match self.match_width(interval_us) {
            Some(width) => Pulse::Width(width),
            None => {
                warn!("unexpected pulse - length = {}us", interval_us);
                Pulse::Unclassified(interval_us)
            }
        }
    }

    /// First nominal width whose window contains the interval
    fn match_width(&self, interval_us: u32) -> Option<PulseWidth> {
        PulseWidth::ALL
            .into_iter()
            .find(|w| interval_us.abs_diff(w.as_micros()) < self.pulse_margin_us)
    }

    /// Forget both timing references
    pub fn reset(&mut self) {
        self.carrier_on_since = None;
        self.carrier_off_since = None;
        self.skip_next = false;
    }

    /// True when no timing reference is held
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.carrier_on_since.is_none() && self.carrier_off_since.is_none() && !self.skip_next
    }
}

impl Default for PulseClassifier {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}
