//! DS3231 Real-Time Clock Driver
//!
//! Battery-backed clock holding the authoritative time between radio
//! corrections. Generic over any `embedded-hal-async` I2C bus so the same
//! driver runs on the STM32 DMA bus and against a mock on the host.
//!
//! Time is kept in the seven registers starting at 0x00, all BCD. The
//! century flag lives in bit 7 of the month register.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use embedded_hal_async::i2c::I2c;

use crate::config::{DEFAULT_CENTURY, RTC_I2C_ADDR};

/// DS3231 register addresses
mod reg {
    pub const SECONDS: u8 = 0x00;
    pub const CONTROL: u8 = 0x0E;
    pub const STATUS: u8 = 0x0F;
}

/// Hours register: 12-hour mode select
const HOUR_12H: u8 = 0x40;
/// Hours register: PM flag in 12-hour mode
const HOUR_PM: u8 = 0x20;
/// Month register: century rollover flag
const CENTURY: u8 = 0x80;
/// Status register: oscillator stopped since last clear
const STATUS_OSF: u8 = 0x80;
/// Control register: oscillator disabled on battery
const CONTROL_EOSC: u8 = 0x80;

/// DS3231 driver errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ds3231Error<E> {
    /// Bus transaction failed
    Bus(E),
    /// Registers hold (or would need to hold) a time the device cannot represent
    InvalidTime,
}

impl<E> From<E> for Ds3231Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}

#[cfg(feature = "embedded")]
impl<E> defmt::Format for Ds3231Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(_) => defmt::write!(f, "I2C bus error"),
            Self::InvalidTime => defmt::write!(f, "invalid time"),
        }
    }
}

/// Result type for DS3231 operations
pub type Ds3231Result<T, E> = Result<T, Ds3231Error<E>>;

/// DS3231 driver
pub struct Ds3231<I> {
    i2c: I,
    address: u8,
    century: u16,
}

impl<I: I2c> Ds3231<I> {
    /// Create a driver at the default address
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, RTC_I2C_ADDR)
    }

    /// Create a driver at an explicit 7-bit address
    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address: address & 0x7F,
            century: DEFAULT_CENTURY,
        }
    }

    /// Release the bus
    pub fn release(self) -> I {
        self.i2c
    }

    /// Read the current time
    ///
    /// # Errors
    /// `Bus` on a failed transaction, `InvalidTime` if the registers do not
    /// hold a calendar date.
    pub async fn datetime(&mut self) -> Ds3231Result<NaiveDateTime, I::Error> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(self.address, &[reg::SECONDS], &mut regs)
            .await?;
        decode_registers(&regs, self.century).ok_or(Ds3231Error::InvalidTime)
    }

    /// Set the current time
    ///
    /// # Errors
    /// `InvalidTime` if the year falls outside the device's two centuries,
    /// `Bus` on a failed transaction.
    pub async fn set_datetime(&mut self, time: &NaiveDateTime) -> Ds3231Result<(), I::Error> {
        let regs = encode_registers(time, self.century).ok_or(Ds3231Error::InvalidTime)?;
        let mut frame = [0u8; 8];
        frame[0] = reg::SECONDS;
        frame[1..].copy_from_slice(&regs);
        self.i2c.write(self.address, &frame).await?;
        debug!("ds3231 set {}:{}:{}", time.hour(), time.minute(), time.second());
        Ok(())
    }

    /// True if the oscillator stopped since the flag was last cleared
    ///
    /// # Errors
    /// `Bus` on a failed transaction.
    pub async fn oscillator_stopped(&mut self) -> Ds3231Result<bool, I::Error> {
        Ok(self.read_reg(reg::STATUS).await? & STATUS_OSF != 0)
    }

    /// Keep the oscillator running on battery and clear the stop flag
    ///
    /// # Errors
    /// `Bus` on a failed transaction.
    pub async fn init(&mut self) -> Ds3231Result<(), I::Error> {
        let control = self.read_reg(reg::CONTROL).await?;
        if control & CONTROL_EOSC != 0 {
            self.write_reg(reg::CONTROL, control & !CONTROL_EOSC).await?;
        }
        let status = self.read_reg(reg::STATUS).await?;
        if status & STATUS_OSF != 0 {
            warn!("ds3231 oscillator was stopped, time may be stale");
            self.write_reg(reg::STATUS, status & !STATUS_OSF).await?;
        }
        Ok(())
    }

    async fn read_reg(&mut self, register: u8) -> Result<u8, I::Error> {
        let mut buf = [0u8];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .await?;
        Ok(buf[0])
    }

    async fn write_reg(&mut self, register: u8, value: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[register, value]).await
    }
}

impl<I: I2c> crate::clock::PersistentClock for Ds3231<I> {
    type Error = Ds3231Error<I::Error>;

    async fn read_current_time(&mut self) -> Result<NaiveDateTime, Self::Error> {
        self.datetime().await
    }

    async fn write_current_time(&mut self, time: &NaiveDateTime) -> Result<(), Self::Error> {
        self.set_datetime(time).await
    }
}

/// Packed BCD byte to binary
#[must_use]
pub const fn bcd_to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Binary (0-99) to packed BCD byte
#[must_use]
pub const fn bin_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// First year of the device's lower century
const fn century_base(century: u16) -> i32 {
    (century as i32 - 1) * 100
}

fn decode_registers(regs: &[u8; 7], century: u16) -> Option<NaiveDateTime> {
    let second = bcd_to_bin(regs[0] & 0x7F);
    let minute = bcd_to_bin(regs[1] & 0x7F);
    let hour = if regs[2] & HOUR_12H != 0 {
        let h12 = bcd_to_bin(regs[2] & 0x1F) % 12;
        if regs[2] & HOUR_PM != 0 { h12 + 12 } else { h12 }
    } else {
        bcd_to_bin(regs[2] & 0x3F)
    };
    let day = bcd_to_bin(regs[4] & 0x3F);
    let month = bcd_to_bin(regs[5] & 0x1F);
    let mut year = century_base(century) + i32::from(bcd_to_bin(regs[6]));
    if regs[5] & CENTURY != 0 {
        year += 100;
    }

    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))?.and_hms_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
    )
}

fn encode_registers(time: &NaiveDateTime, century: u16) -> Option<[u8; 7]> {
    let offset = time.year() - century_base(century);
    if !(0..200).contains(&offset) {
        return None;
    }
    let flag = if offset >= 100 { CENTURY } else { 0 };
    // Every field below is < 100 after the range check
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let regs = [
        bin_to_bcd(time.second() as u8),
        bin_to_bcd(time.minute() as u8),
        bin_to_bcd(time.hour() as u8),
        time.weekday().number_from_monday() as u8,
        bin_to_bcd(time.day() as u8),
        bin_to_bcd(time.month() as u8) | flag,
        bin_to_bcd((offset % 100) as u8),
    ];
    Some(regs)
}
