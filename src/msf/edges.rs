//! Edge Reconstruction
//!
//! The edge source only learns the pin level after it wakes. A carrier blip
//! shorter than the wake-up latency leaves the pin where it started, so the
//! two edges of the blip arrive as one wake-up that repeats the previous
//! level. [`EdgeTracker`] restores the missing edge so the classifier still
//! sees an alternating sequence.

use crate::types::{EdgeDirection, RadioEvent};

/// Last reported receiver level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeTracker {
    high: bool,
}

impl EdgeTracker {
    /// Start from the level read when the input was configured
    #[must_use]
    pub const fn new(high: bool) -> Self {
        Self { high }
    }

    /// Level of the last reported edge
    #[must_use]
    pub const fn level(&self) -> bool {
        self.high
    }

    /// Edges implied by reading `high` after a wake-up at `timestamp_us`
    ///
    /// Returns the missed opposite edge first when the level did not change,
    /// both stamped with the wake-up time. The classifier then measures the
    /// missed edge as noise and skips its partner.
    pub fn observe(&mut self, high: bool, timestamp_us: u32) -> (Option<RadioEvent>, RadioEvent) {
        let missed = (high == self.high).then(|| {
            debug!("collapsed edge pair at {}us", timestamp_us);
            RadioEvent::edge(EdgeDirection::from_level(!high), timestamp_us)
        });
        self.high = high;
        (missed, RadioEvent::edge(EdgeDirection::from_level(high), timestamp_us))
    }
}
