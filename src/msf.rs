//! MSF Time-Code Decoder
//!
//! Turns the edge stream from the long-wave receiver into validated
//! minute frames. The layers are, leaves first:
//!
//! - [`edges`]: wake-up levels → alternating edges
//! - [`classifier`]: edge timing → nominal pulse widths
//! - [`assembler`]: pulse widths → channel A/B bits, minute boundaries
//! - [`frame`]: minute frame validation and BCD decoding
//!
//! The decoder is synchronous and allocation free. It owns all of its
//! state and must be driven from exactly one context.

pub mod assembler;
pub mod classifier;
pub mod edges;
pub mod frame;

pub use assembler::{DecoderEvent, FrameState, MsfDecoder};
pub use classifier::{Pulse, PulseClassifier};
pub use edges::EdgeTracker;
pub use frame::{DecodedTime, FrameError, ParityGroup};

use crate::config;

/// Tunable decoder parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Intervals below this are glitches (microseconds)
    pub ignore_pulse_us: u32,
    /// Accepted deviation from a nominal width (microseconds, exclusive)
    pub pulse_margin_us: u32,
    /// Silence treated as loss of signal (microseconds)
    pub signal_loss_us: u32,
    /// Century for the two-digit broadcast year
    pub century: u16,
}

impl DecoderConfig {
    /// Configuration built from the constants in [`crate::config`]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ignore_pulse_us: config::IGNORE_PULSE_US,
            pulse_margin_us: config::PULSE_MARGIN_US,
            signal_loss_us: config::SIGNAL_LOSS_US,
            century: config::DEFAULT_CENTURY,
        }
    }

    /// Override the century
    #[must_use]
    pub const fn with_century(mut self, century: u16) -> Self {
        self.century = century;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}
