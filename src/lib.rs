//! MSF Radio Clock Firmware Library
//!
//! Core of an STM32G474-based analog clock disciplined by the UK MSF
//! 60 kHz time signal. A long-wave receiver module feeds the demodulated
//! carrier to a GPIO pin; the decoder turns its edges into a minute of
//! bits, validates and decodes the frame, and uses the result to correct
//! a battery-backed DS3231. Three moving-coil dials show the RTC time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLOCK LAYER                            │
//! │  ClockDriver  │  ClockSync (tick / time sync)  │  Dials     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     DECODER LAYER                           │
//! │  PulseClassifier → MsfDecoder (frame state) → decode_frame  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  HAL / DRIVER LAYER                         │
//! │  EXTI edges  │  TIM3 PWM  │  I2C1 DS3231  │  Stop button    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Functional core, imperative shell**: the decoder is synchronous and
//!   returns events; only the shell touches hardware
//! - **Single owner**: one task owns all decoder state, edges arrive over a
//!   queue
//! - **Recoverable by default**: a bad minute is dropped, never fatal
//! - **Host testable**: everything outside `hal` builds without the target

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Edge capture, PWM dial outputs and the cancellation token.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// The DS3231 real-time clock.
pub mod drivers;

/// MSF Time-Code Decoder
///
/// Pulse classification, frame assembly, validation and decoding.
pub mod msf;

/// Clock Control
///
/// Time synchronization against the RTC and dial rendering.
pub mod clock;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::clock::{
        ClockDriver, ClockSync, DialLevels, DialOutput, PersistentClock, SyncOutcome,
    };
    pub use crate::config::*;
    pub use crate::drivers::{Ds3231, Ds3231Error};
    pub use crate::msf::{DecodedTime, DecoderConfig, DecoderEvent, FrameError, MsfDecoder};
    pub use crate::types::*;

    #[cfg(feature = "embedded")]
    pub use crate::hal::{CancelToken, EdgeChannel, PwmDials, RadioInput};

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant, Timer};
}
