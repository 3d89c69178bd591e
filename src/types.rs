//! Shared types used across the clock firmware
//!
//! This module defines the domain types that flow between the hardware
//! glue, the MSF decoder and the clock controller.

use core::fmt;

/// Direction of a transition on the radio receiver output
///
/// The receiver output is inverted: the pin is high while the carrier is
/// off. A falling edge therefore ends a carrier-off interval and a rising
/// edge ends a carrier-on interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    /// Low to high (carrier dropped)
    Rising,
    /// High to low (carrier returned)
    Falling,
}

impl EdgeDirection {
    /// Derive the direction from the pin level sampled after the edge
    #[must_use]
    pub const fn from_level(high: bool) -> Self {
        if high {
            Self::Rising
        } else {
            Self::Falling
        }
    }

    /// Carrier state during the interval this edge terminates
    #[must_use]
    pub const fn ended_carrier(self) -> Carrier {
        match self {
            Self::Rising => Carrier::On,
            Self::Falling => Carrier::Off,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for EdgeDirection {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Rising => defmt::write!(f, "RISE"),
            Self::Falling => defmt::write!(f, "FALL"),
        }
    }
}

/// Carrier state of the long-wave signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Carrier {
    /// Carrier present
    On,
    /// Carrier keyed off
    Off,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Carrier {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::On => defmt::write!(f, "ON"),
            Self::Off => defmt::write!(f, "OFF"),
        }
    }
}

/// Event delivered by the edge-notification path
///
/// Timestamps come from a free-running microsecond counter that wraps
/// at `u32::MAX` (about every 71 minutes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioEvent {
    /// Receiver output changed level
    Edge {
        /// Transition direction
        direction: EdgeDirection,
        /// Monotonic timestamp in microseconds
        timestamp_us: u32,
    },
    /// No edge arrived within the watchdog interval
    WatchdogTimeout {
        /// Monotonic timestamp in microseconds
        timestamp_us: u32,
    },
}

impl RadioEvent {
    /// Shorthand for an edge event
    #[must_use]
    pub const fn edge(direction: EdgeDirection, timestamp_us: u32) -> Self {
        Self::Edge {
            direction,
            timestamp_us,
        }
    }

    /// Timestamp of the event
    #[must_use]
    pub const fn timestamp_us(&self) -> u32 {
        match *self {
            Self::Edge { timestamp_us, .. } | Self::WatchdogTimeout { timestamp_us } => {
                timestamp_us
            }
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Edge {
                direction,
                timestamp_us,
            } => defmt::write!(f, "Edge({}, {}us)", direction, timestamp_us),
            Self::WatchdogTimeout { timestamp_us } => {
                defmt::write!(f, "Timeout({}us)", timestamp_us);
            }
        }
    }
}

/// Nominal pulse widths of the MSF slow code
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PulseWidth {
    /// 100 ms
    Ms100,
    /// 200 ms
    Ms200,
    /// 300 ms
    Ms300,
    /// 400 ms
    Ms400,
    /// 500 ms
    Ms500,
    /// 700 ms
    Ms700,
    /// 800 ms
    Ms800,
    /// 900 ms
    Ms900,
}

impl PulseWidth {
    /// All widths in classification order
    pub const ALL: [Self; 8] = [
        Self::Ms900,
        Self::Ms800,
        Self::Ms700,
        Self::Ms500,
        Self::Ms400,
        Self::Ms300,
        Self::Ms200,
        Self::Ms100,
    ];

    /// Width in milliseconds
    #[must_use]
    pub const fn as_millis(self) -> u32 {
        match self {
            Self::Ms100 => 100,
            Self::Ms200 => 200,
            Self::Ms300 => 300,
            Self::Ms400 => 400,
            Self::Ms500 => 500,
            Self::Ms700 => 700,
            Self::Ms800 => 800,
            Self::Ms900 => 900,
        }
    }

    /// Width in microseconds
    #[must_use]
    pub const fn as_micros(self) -> u32 {
        self.as_millis() * 1000
    }

    /// Look up a nominal width from milliseconds
    #[must_use]
    pub const fn from_millis(ms: u32) -> Option<Self> {
        match ms {
            100 => Some(Self::Ms100),
            200 => Some(Self::Ms200),
            300 => Some(Self::Ms300),
            400 => Some(Self::Ms400),
            500 => Some(Self::Ms500),
            700 => Some(Self::Ms700),
            800 => Some(Self::Ms800),
            900 => Some(Self::Ms900),
            _ => None,
        }
    }
}

impl fmt::Display for PulseWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PulseWidth {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}ms", self.as_millis());
    }
}

/// One of the three analog dials
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dial {
    /// Hour dial (twelve hour scale)
    Hour,
    /// Minute dial
    Minute,
    /// Second dial
    Second,
}

impl Dial {
    /// All dials in output order
    pub const ALL: [Self; 3] = [Self::Hour, Self::Minute, Self::Second];
}

#[cfg(feature = "embedded")]
impl defmt::Format for Dial {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Hour => defmt::write!(f, "HOUR"),
            Self::Minute => defmt::write!(f, "MIN"),
            Self::Second => defmt::write!(f, "SEC"),
        }
    }
}
