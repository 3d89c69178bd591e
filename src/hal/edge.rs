//! Radio Edge Monitor
//!
//! Subscribes to both edges of the receiver output on an EXTI line and
//! turns them into timestamped [`RadioEvent`]s. A watchdog timeout is
//! emitted whenever no edge arrives within the watchdog interval.
//! Edge pairs that complete before the task wakes are restored by
//! [`EdgeTracker`].

use embassy_futures::select::{select, Either};
use embassy_stm32::exti::ExtiInput;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender, TrySendError};
use embassy_time::{with_timeout, Duration, Instant};

use super::cancel::CancelToken;
use crate::config::{EDGE_QUEUE_DEPTH, WATCHDOG_MS};
use crate::msf::EdgeTracker;
use crate::types::RadioEvent;

/// Queue between the edge monitor and the decoder task
pub type EdgeChannel = Channel<CriticalSectionRawMutex, RadioEvent, EDGE_QUEUE_DEPTH>;

/// Producer side of [`EdgeChannel`]
pub type EdgeSender = Sender<'static, CriticalSectionRawMutex, RadioEvent, EDGE_QUEUE_DEPTH>;

/// Wrapping microsecond timestamp
///
/// Truncation to 32 bits is the wraparound the classifier expects.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn now_us() -> u32 {
    Instant::now().as_micros() as u32
}

/// Radio receiver input
pub struct RadioInput<'d> {
    pin: ExtiInput<'d>,
    tracker: EdgeTracker,
    pending: Option<RadioEvent>,
}

impl<'d> RadioInput<'d> {
    /// Wrap an EXTI-capable input
    #[must_use]
    pub fn new(pin: ExtiInput<'d>) -> Self {
        let tracker = EdgeTracker::new(pin.is_high());
        Self {
            pin,
            tracker,
            pending: None,
        }
    }

    /// Wait for the next edge or for the watchdog to expire
    ///
    /// A wake-up that finds the pin unchanged yields the missed opposite
    /// edge first and the observed edge on the following call.
    pub async fn next_event(&mut self, watchdog: Duration) -> RadioEvent {
        if let Some(event) = self.pending.take() {
            return event;
        }

        match with_timeout(watchdog, self.pin.wait_for_any_edge()).await {
            Ok(()) => {
                let timestamp_us = now_us();
                match self.tracker.observe(self.pin.is_high(), timestamp_us) {
                    (Some(missed), edge) => {
                        self.pending = Some(edge);
                        missed
                    }
                    (None, edge) => edge,
                }
            }
            Err(_) => RadioEvent::WatchdogTimeout {
                timestamp_us: now_us(),
            },
        }
    }
}

/// Forward radio events into the decoder queue until cancelled
pub async fn monitor(
    mut input: RadioInput<'static>,
    events: EdgeSender,
    cancel: &'static CancelToken,
) {
    let Some(mut cancelled) = cancel.subscribe() else {
        error!("no cancellation slot left for the edge monitor");
        return;
    };
    let watchdog = Duration::from_millis(WATCHDOG_MS);
    info!("edge monitor running, watchdog {}ms", WATCHDOG_MS);

    loop {
        let outcome = select(cancelled.wait(), input.next_event(watchdog)).await;
        let event = match outcome {
            Either::First(()) => break,
            Either::Second(event) => event,
        };
        if let Err(TrySendError::Full(event)) = events.try_send(event) {
            warn!("edge queue full, dropped {}", event);
        }
    }

    info!("edge monitor stopped");
}
