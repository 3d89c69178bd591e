//! Peripheral Drivers
//!
//! Drivers for external ICs. These sit on the `embedded-hal-async` traits
//! rather than the STM32 HAL so they also build for host tests.

pub mod ds3231;

pub use ds3231::{Ds3231, Ds3231Error};
