//! Minute Frame Validation and Decoding
//!
//! An MSF minute carries seconds 1-59 on two parallel channels. Channel A
//! holds the BCD date and time plus the fixed minute marker; channel B holds
//! DUT1, the summer-time flags and four odd-parity bits.
//!
//! Bit `n` of each slice below is second `n + 1` of the broadcast minute.

use chrono::{NaiveDate, NaiveDateTime};
use core::ops::Range;

/// Number of channel-A bits in a normal minute
pub const FRAME_BITS: usize = 59;

/// Trailer of channel A (seconds 52-59)
pub const MINUTE_MARKER: [bool; 8] = [false, true, true, true, true, true, true, false];

const MARKER: Range<usize> = 51..59;
const YEAR: Range<usize> = 16..24;
const MONTH: Range<usize> = 24..29;
const DAY: Range<usize> = 29..35;
const WEEKDAY: Range<usize> = 35..38;
const HOUR: Range<usize> = 38..44;
const MINUTE: Range<usize> = 44..51;

const DUT1_POSITIVE: Range<usize> = 0..8;
const DUT1_NEGATIVE: Range<usize> = 8..16;
const DST_PENDING: usize = 52;
const DST_ACTIVE: usize = 57;

/// Field group covered by one channel-B parity bit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParityGroup {
    /// Year (A17-A24, checked by B54)
    Year,
    /// Month and day (A25-A35, checked by B55)
    Date,
    /// Day of week (A36-A38, checked by B56)
    Weekday,
    /// Hour and minute (A39-A51, checked by B57)
    Time,
}

impl ParityGroup {
    /// All groups in check order
    pub const ALL: [Self; 4] = [Self::Year, Self::Date, Self::Weekday, Self::Time];

    /// Channel-A bits covered by this group
    #[must_use]
    pub const fn span(self) -> Range<usize> {
        match self {
            Self::Year => 16..24,
            Self::Date => 24..35,
            Self::Weekday => 35..38,
            Self::Time => 38..51,
        }
    }

    /// Channel-B index of the parity bit
    #[must_use]
    pub const fn flag_index(self) -> usize {
        match self {
            Self::Year => 53,
            Self::Date => 54,
            Self::Weekday => 55,
            Self::Time => 56,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ParityGroup {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Year => defmt::write!(f, "year(16:24)"),
            Self::Date => defmt::write!(f, "date(24:35)"),
            Self::Weekday => defmt::write!(f, "weekday(35:38)"),
            Self::Time => defmt::write!(f, "time(38:51)"),
        }
    }
}

/// Reasons a completed minute is dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Channel A did not hold exactly 59 bits (leap second?)
    Length(usize),
    /// The 01111110 trailer was not found
    MarkerNotFound,
    /// A parity check failed
    Parity(ParityGroup),
    /// Fields decoded to an impossible calendar date
    InvalidDate,
}

#[cfg(feature = "embedded")]
impl defmt::Format for FrameError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Length(n) => defmt::write!(f, "MSF data incorrect length {} - leap second?", n),
            Self::MarkerNotFound => defmt::write!(f, "unable to find minute marker"),
            Self::Parity(group) => defmt::write!(f, "parity failed over {}", group),
            Self::InvalidDate => defmt::write!(f, "decoded fields are not a valid date"),
        }
    }
}

/// A validated, decoded minute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedTime {
    /// Full year
    pub year: u16,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Day of week as broadcast (0 = Sunday)
    pub weekday: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// UT1 - UTC correction in milliseconds (multiples of 100)
    pub dut1_ms: i16,
    /// Summer time change due within the hour
    pub dst_pending: bool,
    /// Summer time in force
    pub dst_active: bool,
    /// The same instant as a calendar timestamp (second 0 of the minute)
    pub datetime: NaiveDateTime,
}

/// Even/odd sum of a bit slice (1 = odd number of set bits)
#[must_use]
pub fn parity(bits: &[bool]) -> bool {
    bits.iter().filter(|&&b| b).count() % 2 == 1
}

/// Widest BCD field in a minute frame
pub const MAX_BCD_BITS: usize = 8;

/// Decode a BCD field transmitted most-significant bit first
///
/// The bits are packed into an integer, then split into 4-bit nibbles from
/// the least significant end; nibble `i` contributes `nibble * 10^i`.
/// Only the first [`MAX_BCD_BITS`] bits are read.
#[must_use]
pub fn decode_bcd(bits: &[bool]) -> u32 {
    let bits = &bits[..bits.len().min(MAX_BCD_BITS)];
    let packed = bits
        .iter()
        .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit));

    let nibbles = bits.len().div_ceil(4);
    let mut value = 0;
    let mut scale = 1;
    for i in 0..nibbles {
        value += ((packed >> (4 * i)) & 0xF) * scale;
        scale *= 10;
    }
    value
}

/// Encode `value` as a BCD field of `out.len()` bits, most significant first
///
/// Digits that do not fit in the field are dropped.
pub fn encode_bcd(value: u32, out: &mut [bool]) {
    let mut packed = 0u32;
    let mut rest = value;
    for i in 0..out.len().div_ceil(4) {
        packed |= (rest % 10) << (4 * i);
        rest /= 10;
    }
    let len = out.len();
    for (i, bit) in out.iter_mut().enumerate() {
        *bit = (packed >> (len - 1 - i)) & 1 == 1;
    }
}

/// Check length, minute marker and the four parity groups
///
/// A parity group fails when the computed parity *equals* its channel-B
/// flag: MSF uses odd parity over the field plus flag.
///
/// # Errors
/// Returns the first failed check.
pub fn validate(a: &[bool], b: &[bool]) -> Result<(), FrameError> {
    if a.len() != FRAME_BITS {
        return Err(FrameError::Length(a.len()));
    }
    if a[MARKER] != MINUTE_MARKER {
        return Err(FrameError::MarkerNotFound);
    }
    if b.len() != FRAME_BITS {
        return Err(FrameError::Length(b.len()));
    }
    for group in ParityGroup::ALL {
        if parity(&a[group.span()]) == b[group.flag_index()] {
            return Err(FrameError::Parity(group));
        }
    }
    Ok(())
}

/// Validate and decode a complete minute
///
/// `century` expands the two-digit year as `(century - 1) * 100 + yy`.
///
/// # Errors
/// Returns a [`FrameError`] if validation fails or the fields do not form a
/// real date and time.
pub fn decode_frame(a: &[bool], b: &[bool], century: u16) -> Result<DecodedTime, FrameError> {
    validate(a, b)?;

    let field = |range: Range<usize>| decode_bcd(&a[range]);
    let narrow = |v: u32| u8::try_from(v).map_err(|_| FrameError::InvalidDate);

    let year = u16::try_from(field(YEAR))
        .ok()
        .and_then(|yy| century.checked_sub(1)?.checked_mul(100)?.checked_add(yy))
        .ok_or(FrameError::InvalidDate)?;
    let month = narrow(field(MONTH))?;
    let day = narrow(field(DAY))?;
    let weekday = narrow(field(WEEKDAY))?;
    let hour = narrow(field(HOUR))?;
    let minute = narrow(field(MINUTE))?;

    let set_bits = |range: Range<usize>| b[range].iter().filter(|&&bit| bit).count() as i16;
    let dut1_ms = 100 * set_bits(DUT1_POSITIVE) - 100 * set_bits(DUT1_NEGATIVE);

    let datetime = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| date.and_hms_opt(u32::from(hour), u32::from(minute), 0))
        .ok_or(FrameError::InvalidDate)?;

    Ok(DecodedTime {
        year,
        month,
        day,
        weekday,
        hour,
        minute,
        dut1_ms,
        dst_pending: b[DST_PENDING],
        dst_active: b[DST_ACTIVE],
        datetime,
    })
}
