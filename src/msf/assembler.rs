//! Frame Assembler
//!
//! State machine over classified pulses. MSF sends two data bits per second
//! as a pair of pulse widths, so the meaning of a pulse depends on exactly
//! one prior carrier-off and carrier-on width:
//!
//! ```text
//!  carrier  off        on
//!  ───────┐      ┌────────────── ...
//!         └──────┘
//!  500 off → minute marker        100 off + 900 on       → A=0 B=0
//!  200 off → A=1 B=0              100 off + 100 on + 100 off → A=0 B=1
//!  300 off → A=1 B=1              500 off + 500 on       → second 0
//! ```
//!
//! All frame state is cleared at each minute marker, so a corrupted minute
//! never leaks into the next one.

use heapless::Vec;

use super::classifier::{Pulse, PulseClassifier};
use super::frame::{self, DecodedTime, FrameError};
use super::DecoderConfig;
use crate::types::{Carrier, EdgeDirection, PulseWidth, RadioEvent};

/// Capacity of each channel buffer
pub const MAX_FRAME_BITS: usize = 64;

/// Range of bit counts that is worth handing to the validator
const PLAUSIBLE_BITS: core::ops::RangeInclusive<usize> = 58..=60;

/// Decoder alignment state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameState {
    /// No minute marker seen since start-up or signal loss
    #[default]
    AwaitingMarker,
    /// Aligned to the minute; holds the previous pulse widths
    InFrame {
        /// Width of the last carrier-off pulse
        last_off: PulseWidth,
        /// Width of the last carrier-on pulse, if any since alignment
        last_on: Option<PulseWidth>,
    },
}

#[cfg(feature = "embedded")]
impl defmt::Format for FrameState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::AwaitingMarker => defmt::write!(f, "AwaitingMarker"),
            Self::InFrame { last_off, last_on } => {
                defmt::write!(f, "InFrame(off={}, on={})", last_off, last_on);
            }
        }
    }
}

/// Output of the decoder for one radio event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderEvent {
    /// A carrier-on pulse completed; drive the once-per-second tick
    Second,
    /// A minute frame validated and decoded
    Minute(DecodedTime),
    /// A complete frame failed validation
    Rejected(FrameError),
    /// The minute was dropped before validation
    Discarded {
        /// Channel-A bits collected
        bits: usize,
        /// Bad pulses seen during the minute
        bad_packets: u16,
    },
    /// No edges for longer than any legal pulse
    SignalLost,
}

/// Channel A/B bit buffers for one broadcast minute
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinuteFrame {
    a: Vec<bool, MAX_FRAME_BITS>,
    b: Vec<bool, MAX_FRAME_BITS>,
}

impl MinuteFrame {
    /// Empty frame
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: Vec::new(),
            b: Vec::new(),
        }
    }

    /// Append one second's bit pair; false when the buffers are full
    pub fn push(&mut self, a: bool, b: bool) -> bool {
        if self.a.is_full() {
            return false;
        }
        // both buffers share a length, so neither push can fail here
        let _ = self.a.push(a);
        let _ = self.b.push(b);
        true
    }

    /// Channel A (primary time code)
    #[must_use]
    pub fn channel_a(&self) -> &[bool] {
        &self.a
    }

    /// Channel B (DUT1, flags and parity)
    #[must_use]
    pub fn channel_b(&self) -> &[bool] {
        &self.b
    }

    /// Seconds collected so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// True when nothing has been collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Drop all bits
    pub fn clear(&mut self) {
        self.a.clear();
        self.b.clear();
    }
}

/// MSF minute decoder
///
/// Owns the classifier, the alignment state, the minute buffers and the
/// bad-packet counter. Feed it every [`RadioEvent`] in arrival order.
#[derive(Clone, Debug)]
pub struct MsfDecoder {
    config: DecoderConfig,
    classifier: PulseClassifier,
    state: FrameState,
    frame: MinuteFrame,
    bad_packets: u16,
    last_edge_us: Option<u32>,
}

impl MsfDecoder {
    /// Create a decoder waiting for its first minute marker
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            classifier: PulseClassifier::new(&config),
            state: FrameState::AwaitingMarker,
            frame: MinuteFrame::new(),
            bad_packets: 0,
            last_edge_us: None,
        }
    }

    /// Process one event from the edge-notification path
    pub fn process(&mut self, event: RadioEvent) -> Option<DecoderEvent> {
        match event {
            RadioEvent::Edge {
                direction,
                timestamp_us,
            } => {
                self.last_edge_us = Some(timestamp_us);
                self.on_edge(direction, timestamp_us)
            }
            RadioEvent::WatchdogTimeout { timestamp_us } => self.on_timeout(timestamp_us),
        }
    }

    fn on_edge(&mut self, direction: EdgeDirection, timestamp_us: u32) -> Option<DecoderEvent> {
        let pulse = self.classifier.classify(direction, timestamp_us);
        trace!("{} -> {}", direction, pulse);

        let width = match pulse {
            Pulse::Width(width) => width,
            Pulse::Unclassified(_) => {
                self.bad_packet();
                return None;
            }
            Pulse::Skipped | Pulse::Incomplete | Pulse::Noise => return None,
        };

        match direction.ended_carrier() {
            Carrier::Off => self.on_carrier_off(width),
            Carrier::On => {
                self.on_carrier_on(width);
                Some(DecoderEvent::Second)
            }
        }
    }

    fn on_carrier_off(&mut self, width: PulseWidth) -> Option<DecoderEvent> {
        if width == PulseWidth::Ms500 {
            return Some(self.close_minute());
        }

        let FrameState::InFrame { last_off, last_on } = self.state else {
            return None;
        };

        match width {
            // tri-transition: 100 off, 100 on, 100 off
            PulseWidth::Ms100 => {
                if last_off == PulseWidth::Ms100 && last_on == Some(PulseWidth::Ms100) {
                    self.push_bits(false, true);
                }
            }
            PulseWidth::Ms200 => self.push_bits(true, false),
            PulseWidth::Ms300 => self.push_bits(true, true),
            other => {
                warn!("unknown carrier-off pulse {}", other);
                self.bad_packet();
            }
        }

        self.state = FrameState::InFrame {
            last_off: width,
            last_on,
        };
        None
    }

    fn on_carrier_on(&mut self, width: PulseWidth) {
        let FrameState::InFrame { last_off, .. } = self.state else {
            return;
        };

        match (last_off, width) {
            // second zero, or the 100 ms tail of a tri-transition
            (PulseWidth::Ms500, PulseWidth::Ms500)
            | (PulseWidth::Ms100, PulseWidth::Ms100 | PulseWidth::Ms700) => {}
            (PulseWidth::Ms100, PulseWidth::Ms900) => self.push_bits(false, false),
            _ if last_off.as_millis() + width.as_millis() != 1000 => {
                warn!(
                    "unexpected data packet/carrier period = {}ms",
                    last_off.as_millis() + width.as_millis()
                );
                self.bad_packet();
            }
            _ => {}
        }

        debug!("tick: {}ms", last_off.as_millis() + width.as_millis());
        self.state = FrameState::InFrame {
            last_off,
            last_on: Some(width),
        };
    }

    /// Handle the 500 ms carrier-off that opens every minute
    fn close_minute(&mut self) -> DecoderEvent {
        let bits = self.frame.len();
        let bad_packets = self.bad_packets;

        let outcome = match self.state {
            FrameState::AwaitingMarker => {
                info!("minute marker found, frame aligned");
                DecoderEvent::Discarded { bits, bad_packets }
            }
            FrameState::InFrame { .. }
                if bad_packets == 0 && PLAUSIBLE_BITS.contains(&bits) =>
            {
                match frame::decode_frame(
                    self.frame.channel_a(),
                    self.frame.channel_b(),
                    self.config.century,
                ) {
                    Ok(time) => {
                        info!(
                            "decoded {}-{}-{} {}:{} dst={} dut1={}ms",
                            time.year,
                            time.month,
                            time.day,
                            time.hour,
                            time.minute,
                            time.dst_active,
                            time.dut1_ms
                        );
                        if time.dst_pending {
                            warn!("daylight savings transition due in next 60 mins");
                        }
                        DecoderEvent::Minute(time)
                    }
                    Err(err) => {
                        error!("{}", err);
                        DecoderEvent::Rejected(err)
                    }
                }
            }
            FrameState::InFrame { .. } => {
                warn!(
                    "bad packets seen {}, collected {}/60 packets - skipping",
                    bad_packets, bits
                );
                DecoderEvent::Discarded { bits, bad_packets }
            }
        };

        let last_on = match self.state {
            FrameState::InFrame { last_on, .. } => last_on,
            FrameState::AwaitingMarker => None,
        };
        self.frame.clear();
        self.bad_packets = 0;
        self.state = FrameState::InFrame {
            last_off: PulseWidth::Ms500,
            last_on,
        };
        outcome
    }

    fn on_timeout(&mut self, timestamp_us: u32) -> Option<DecoderEvent> {
        let silent_us = self
            .last_edge_us
            .map_or(0, |last| timestamp_us.wrapping_sub(last));
        if silent_us < self.config.signal_loss_us || self.is_reset() {
            return None;
        }

        warn!("no signal for {}us, dropping frame state", silent_us);
        self.reset();
        Some(DecoderEvent::SignalLost)
    }

    fn push_bits(&mut self, a: bool, b: bool) {
        if !self.frame.push(a, b) {
            warn!("frame overflow at {} bits", self.frame.len());
            self.bad_packet();
        }
    }

    fn bad_packet(&mut self) {
        if matches!(self.state, FrameState::InFrame { .. }) {
            self.bad_packets = self.bad_packets.saturating_add(1);
        }
    }

    fn is_reset(&self) -> bool {
        self.state == FrameState::AwaitingMarker
            && self.frame.is_empty()
            && self.bad_packets == 0
            && self.classifier.is_idle()
    }

    /// Drop all frame and timing state and wait for the next marker
    pub fn reset(&mut self) {
        self.classifier.reset();
        self.state = FrameState::AwaitingMarker;
        self.frame.clear();
        self.bad_packets = 0;
    }

    /// Current alignment state
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Bits collected for the current minute
    #[must_use]
    pub const fn frame(&self) -> &MinuteFrame {
        &self.frame
    }

    /// Channel-A bits collected so far
    #[must_use]
    pub fn bits(&self) -> usize {
        self.frame.len()
    }

    /// Bad pulses counted in the current minute
    #[must_use]
    pub const fn bad_packets(&self) -> u16 {
        self.bad_packets
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

impl Default for MsfDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}
