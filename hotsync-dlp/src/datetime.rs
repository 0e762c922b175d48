//! The 8-byte date/time form DLP carries in arguments like `ReadSysInfo`'s
//! last-sync timestamp or a record's modification time.
//!
//! Wire layout: `{year:u16be, month:u8, day:u8, hour:u8, minute:u8,
//! second:u8, pad:u8}`. A `year` of zero is a sentinel meaning "unset",
//! rendered as the Palm OS epoch (1904-01-01 00:00:00 UTC) rather than a
//! real calendar year zero.

use crate::error::{DlpError, Result};

pub const WIRE_SIZE: usize = 8;

/// Seconds from the Unix epoch (1970-01-01) back to the Palm epoch
/// (1904-01-01). Palm timestamps are commonly stored as seconds since their
/// own epoch; this constant lets callers convert without a date library.
pub const PALM_EPOCH_UNIX_OFFSET: i64 = -2_082_844_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalmDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl PalmDateTime {
    /// The sentinel value meaning "no timestamp" on the wire (`year == 0`).
    pub const UNSET: Self = Self { year: 0, month: 0, day: 0, hour: 0, minute: 0, second: 0 };

    pub const fn is_unset(&self) -> bool {
        self.year == 0
    }

    pub fn encode(&self, out: &mut [u8]) -> Result<usize> {
        if out.len() < WIRE_SIZE {
            return Err(DlpError::ArgTooLarge(WIRE_SIZE));
        }
        out[0..2].copy_from_slice(&self.year.to_be_bytes());
        out[2] = self.month;
        out[3] = self.day;
        out[4] = self.hour;
        out[5] = self.minute;
        out[6] = self.second;
        out[7] = 0;
        Ok(WIRE_SIZE)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < WIRE_SIZE {
            return Err(DlpError::Truncated);
        }
        Ok(Self {
            year: u16::from_be_bytes([buf[0], buf[1]]),
            month: buf[2],
            day: buf[3],
            hour: buf[4],
            minute: buf[5],
            second: buf[6],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_concrete_date() {
        let dt = PalmDateTime { year: 2024, month: 3, day: 14, hour: 9, minute: 26, second: 53 };
        let mut buf = [0u8; WIRE_SIZE];
        let n = dt.encode(&mut buf).unwrap();
        assert_eq!(n, WIRE_SIZE);
        assert_eq!(PalmDateTime::decode(&buf).unwrap(), dt);
    }

    #[test]
    fn zero_year_is_the_unset_sentinel() {
        let mut buf = [0u8; WIRE_SIZE];
        PalmDateTime::UNSET.encode(&mut buf).unwrap();
        let decoded = PalmDateTime::decode(&buf).unwrap();
        assert!(decoded.is_unset());
    }
}
