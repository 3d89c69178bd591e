//! Clock Driver
//!
//! Single owner of the decoder state. Every radio event is processed here,
//! and the resulting tick or time sync runs inline before `handle` returns.
//! Failures of the persistent clock are logged and swallowed so the edge
//! path keeps running.

use super::dial::DialOutput;
use super::sync::ClockSync;
use super::PersistentClock;
use crate::msf::{DecoderConfig, DecoderEvent, MsfDecoder};
use crate::types::RadioEvent;

/// Radio decoder wired to the clock controller
pub struct ClockDriver<C, D> {
    decoder: MsfDecoder,
    sync: ClockSync<C, D>,
    clock_errors: u32,
}

impl<C: PersistentClock, D: DialOutput> ClockDriver<C, D> {
    /// Create a driver with the default decoder configuration
    pub fn new(clock: C, dials: D) -> Self {
        Self::with_config(DecoderConfig::default(), ClockSync::new(clock, dials))
    }

    /// Create a driver from an explicit decoder configuration and controller
    pub fn with_config(config: DecoderConfig, sync: ClockSync<C, D>) -> Self {
        Self {
            decoder: MsfDecoder::new(config),
            sync,
            clock_errors: 0,
        }
    }

    /// Prepare the outputs before the first event
    pub fn start(&mut self) {
        info!("starting clock driver");
        self.sync.start();
    }

    /// Process one radio event and run any resulting callback
    pub async fn handle(&mut self, event: RadioEvent) -> Option<DecoderEvent> {
        let outcome = self.decoder.process(event)?;

        match &outcome {
            DecoderEvent::Second => {
                if self.sync.tick().await.is_err() {
                    self.clock_errors = self.clock_errors.saturating_add(1);
                    error!("tick callback failed reading the persistent clock");
                }
            }
            DecoderEvent::Minute(time) => match self.sync.time_sync(time).await {
                Ok(result) => {
                    trace!("time sync corrected={}", result.corrected());
                }
                Err(_) => {
                    self.clock_errors = self.clock_errors.saturating_add(1);
                    error!("time sync callback failed on the persistent clock");
                }
            },
            DecoderEvent::Rejected(_)
            | DecoderEvent::Discarded { .. }
            | DecoderEvent::SignalLost => {}
        }

        Some(outcome)
    }

    /// Drop decoder state and park the dials
    pub fn stop(&mut self) {
        info!("stop clock driver");
        self.decoder.reset();
        self.sync.stop();
    }

    /// The decoder, for inspection
    pub const fn decoder(&self) -> &MsfDecoder {
        &self.decoder
    }

    /// The clock controller, for inspection
    pub const fn sync(&self) -> &ClockSync<C, D> {
        &self.sync
    }

    /// Persistent clock failures swallowed so far
    pub const fn clock_errors(&self) -> u32 {
        self.clock_errors
    }
}
