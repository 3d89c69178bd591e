//! Clock Control
//!
//! Reconciles decoded radio time with the battery-backed clock and renders
//! the authoritative time onto the analog dials.
//!
//! - [`dial`]: time → proportional dial levels
//! - [`sync`]: per-second tick and per-minute time sync
//! - [`driver`]: owns the decoder and dispatches its events inline

pub mod dial;
pub mod driver;
pub mod sync;

pub use dial::{DialLevels, DialOutput};
pub use driver::ClockDriver;
pub use sync::{ClockSync, SyncOutcome};

use chrono::NaiveDateTime;

/// Battery-backed clock that survives power loss
///
/// Reads and writes must complete quickly: they run inline on the edge
/// handling path.
#[allow(async_fn_in_trait)]
pub trait PersistentClock {
    /// Error raised by the underlying bus or device
    type Error;

    /// Read the current time
    async fn read_current_time(&mut self) -> Result<NaiveDateTime, Self::Error>;

    /// Overwrite the current time
    async fn write_current_time(&mut self, time: &NaiveDateTime) -> Result<(), Self::Error>;
}
