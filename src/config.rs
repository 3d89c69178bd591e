//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the radio clock hardware.
//! All pin mappings, bus addresses and decoder tolerances are centralized here.

/// System clock frequency (STM32G474 @ 170MHz)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// I2C bus frequency for the DS3231
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// DS3231 I2C address
pub const RTC_I2C_ADDR: u8 = 0x68;

/// PWM carrier frequency for the dial outputs
pub const DIAL_PWM_FREQUENCY_HZ: u32 = 1_000;

/// Full-scale dial level
pub const DIAL_FULL_SCALE: u8 = 255;

/// Edge watchdog interval in milliseconds
pub const WATCHDOG_MS: u64 = 500;

/// Depth of the edge event queue between the EXTI task and the decoder
pub const EDGE_QUEUE_DEPTH: usize = 16;

/// Century used to expand the two-digit broadcast year (21 = 2000-2099)
pub const DEFAULT_CENTURY: u16 = 21;

/// Intervals shorter than this are treated as a glitch (microseconds)
pub const IGNORE_PULSE_US: u32 = 50_000;

/// Tolerance either side of a nominal pulse width (microseconds)
pub const PULSE_MARGIN_US: u32 = 35_000;

/// Silence after which the signal is considered lost (microseconds)
///
/// Longer than any legal pulse, so watchdog notifications raised inside a
/// 700-900 ms carrier-on interval do not reset the frame.
pub const SIGNAL_LOSS_US: u32 = 1_000_000;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// MSF receiver output (inverted: high = carrier off)
    pub const MSF_INPUT: &str = "PA1";

    /// Hour dial PWM output (TIM3 CH1)
    pub const HOUR_DIAL: &str = "PA6";

    /// Minute dial PWM output (TIM3 CH2)
    pub const MINUTE_DIAL: &str = "PA4";

    /// Second dial PWM output (TIM3 CH3)
    pub const SECOND_DIAL: &str = "PB0";

    /// I2C1 SCL (DS3231)
    pub const I2C1_SCL: &str = "PB8";

    /// I2C1 SDA (DS3231)
    pub const I2C1_SDA: &str = "PB9";

    /// Stop button (active high, Nucleo user button)
    pub const STOP_BUTTON: &str = "PC13";
}

/// Timer assignments
pub mod timers {
    //! Hardware timer assignments

    /// Dial PWM timer
    pub const DIAL_PWM: u8 = 3;
}

/// DMA channel assignments
pub mod dma {
    //! DMA channel assignments for I2C transfers

    /// I2C1 TX DMA channel
    pub const I2C1_TX: u8 = 1;

    /// I2C1 RX DMA channel
    pub const I2C1_RX: u8 = 2;
}
