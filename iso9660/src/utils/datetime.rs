//! Date/time parsing
//!
//! ISO9660 has two datetime formats: 7-byte and 17-byte. High Sierra drops
//! the GMT offset from the 7-byte form. Rock Ridge TF entries use either.

/// 7-byte directory record datetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTime7 {
    /// Years since 1900
    pub year: u8,

    /// Month (1-12)
    pub month: u8,

    /// Day (1-31)
    pub day: u8,

    /// Hour (0-23)
    pub hour: u8,

    /// Minute (0-59)
    pub minute: u8,

    /// Second (0-59)
    pub second: u8,

    /// GMT offset in 15-minute intervals (-48 to +52)
    pub gmt_offset: i8,
}

impl DateTime7 {
    /// Parse from 7-byte array
    pub fn from_bytes(bytes: &[u8; 7]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: bytes[6] as i8,
        }
    }

    /// Parse a 6-byte High Sierra datetime (no GMT offset)
    pub fn from_high_sierra(bytes: &[u8; 6]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: 0,
        }
    }

    /// Get full year (1900 + year)
    pub fn full_year(&self) -> u16 {
        1900 + self.year as u16
    }
}

/// 17-byte ASCII datetime (volume descriptors, long-form TF)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime17 {
    /// Year (4 ASCII digits)
    pub year: u16,

    /// Month (2 ASCII digits, 1-12)
    pub month: u8,

    /// Day (2 ASCII digits, 1-31)
    pub day: u8,

    /// Hour (2 ASCII digits, 0-23)
    pub hour: u8,

    /// Minute (2 ASCII digits, 0-59)
    pub minute: u8,

    /// Second (2 ASCII digits, 0-59)
    pub second: u8,

    /// Hundredths (2 ASCII digits)
    pub hundredths: u8,

    /// GMT offset in 15-minute intervals
    pub gmt_offset: i8,
}

impl DateTime17 {
    /// Parse from 17-byte string, `None` if any digit is not ASCII 0-9
    /// or the date is the all-zero "not specified" value
    pub fn from_bytes(bytes: &[u8; 17]) -> Option<Self> {
        let digits = |range: core::ops::Range<usize>| -> Option<u16> {
            bytes[range].iter().try_fold(0u16, |acc, &b| {
                b.is_ascii_digit().then(|| acc * 10 + (b - b'0') as u16)
            })
        };

        let parsed = Self {
            year: digits(0..4)?,
            month: digits(4..6)? as u8,
            day: digits(6..8)? as u8,
            hour: digits(8..10)? as u8,
            minute: digits(10..12)? as u8,
            second: digits(12..14)? as u8,
            hundredths: digits(14..16)? as u8,
            gmt_offset: bytes[16] as i8,
        };

        if parsed.year == 0 && parsed.month == 0 && parsed.day == 0 {
            return None;
        }

        Some(parsed)
    }
}

/// Rock Ridge timestamp in either encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RripTime {
    /// 7-byte form
    Short(DateTime7),
    /// 17-byte form
    Long(DateTime17),
}

impl RripTime {
    /// Decode a raw TF field
    pub fn decode(blob: &[u8]) -> Option<Self> {
        match blob.len() {
            7 => {
                let bytes: &[u8; 7] = blob.try_into().ok()?;
                Some(Self::Short(DateTime7::from_bytes(bytes)))
            }
            17 => {
                let bytes: &[u8; 17] = blob.try_into().ok()?;
                DateTime17::from_bytes(bytes).map(Self::Long)
            }
            _ => None,
        }
    }
}
