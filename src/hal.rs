//! Hardware Abstraction Layer
//!
//! Thin adapters between the STM32G474 peripherals and the portable
//! decoder and clock code. Only built with the `embedded` feature.

pub mod cancel;
pub mod edge;
pub mod pwm;

pub use cancel::CancelToken;
pub use edge::{EdgeChannel, RadioInput};
pub use pwm::PwmDials;
