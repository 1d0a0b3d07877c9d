//! On-disk record layout of `.BYS` therapy logs and its decoder.
//!
//! A record window is 30 bytes:
//! `[marker:4][values:6 x u16 BE][start ts:6][end ts:6][spacer:u16 BE]`.
//! Timestamps are six literal byte components `(yy, mm, dd, hh, mi, ss)`
//! with `year = 2000 + yy`.
use std::fmt;

use time::macros::format_description;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Magic marker found at the start of every record window.
pub const MAGIC: [u8; 4] = [0x28, 0x46, 0x96, 0x28];
/// Size of one record window, marker included.
pub const RECORD_LEN: usize = 30;
/// Number of big-endian data values per record.
pub const VALUE_COUNT: usize = 6;

const VALUES_AT: usize = 4;
const START_TS_AT: usize = 16;
const END_TS_AT: usize = 22;
const SPACER_AT: usize = 28;

/// Result of decoding a 6-byte timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimestampResult {
    Valid(PrimitiveDateTime),
    Invalid,
}

impl TimestampResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, TimestampResult::Valid(_))
    }

    pub fn valid(&self) -> Option<PrimitiveDateTime> {
        match self {
            TimestampResult::Valid(dt) => Some(*dt),
            TimestampResult::Invalid => None,
        }
    }
}

impl fmt::Display for TimestampResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fd = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        match self {
            TimestampResult::Valid(dt) => match dt.format(&fd) {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
            TimestampResult::Invalid => f.write_str("Invalid Date"),
        }
    }
}

/// Decode raw timestamp bytes. Never fails: anything that is not an existing
/// calendar date/time maps to [`TimestampResult::Invalid`].
pub fn decode_timestamp(raw: [u8; 6]) -> TimestampResult {
    let [yy, mm, dd, hh, mi, ss] = raw;
    let Ok(month) = Month::try_from(mm) else { return TimestampResult::Invalid };
    match (Date::from_calendar_date(2000 + yy as i32, month, dd), Time::from_hms(hh, mi, ss)) {
        (Ok(date), Ok(time)) => TimestampResult::Valid(PrimitiveDateTime::new(date, time)),
        _ => TimestampResult::Invalid,
    }
}

/// One decoded record window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    /// Offset of the magic marker in the source buffer.
    pub offset: usize,
    pub values: [u16; VALUE_COUNT],
    pub start_time: TimestampResult,
    pub end_time: TimestampResult,
    /// Trailing field, meaning unknown.
    pub spacer: u16,
}

impl RawRecord {
    /// Decode one window. The marker bytes are trusted to have been matched by
    /// the caller and are not checked again.
    pub fn decode(offset: usize, window: &[u8; RECORD_LEN]) -> Self {
        let be_u16 = |at: usize| u16::from_be_bytes([window[at], window[at + 1]]);
        let ts = |at: usize| {
            let mut raw = [0u8; 6];
            raw.copy_from_slice(&window[at..at + 6]);
            decode_timestamp(raw)
        };

        let mut values = [0u16; VALUE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = be_u16(VALUES_AT + i * 2);
        }

        RawRecord {
            offset,
            values,
            start_time: ts(START_TS_AT),
            end_time: ts(END_TS_AT),
            spacer: be_u16(SPACER_AT),
        }
    }

    /// Session length in minutes.
    pub fn duration_min(&self) -> u16 { self.values[5] }

    /// Pressure in device units (1/1000 cmH2O).
    pub fn pressure_raw(&self) -> u16 { self.values[3] }

    /// Apnea/hypopnea event count proxy.
    pub fn apnea_events(&self) -> u16 { self.values[2] }

    /// Leak proxy in 1/100 L/min.
    pub fn leak_raw(&self) -> u16 { self.values[1] }

    /// Byte range of the source buffer covered by this record.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + RECORD_LEN
    }

    /// True when this record's window shares bytes with `other`'s window.
    pub fn overlaps(&self, other: &RawRecord) -> bool {
        self.offset < other.offset + RECORD_LEN && other.offset < self.offset + RECORD_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    fn window(values: [u16; 6], start: [u8; 6], end: [u8; 6], spacer: u16) -> [u8; RECORD_LEN] {
        let mut w = [0u8; RECORD_LEN];
        w[..4].copy_from_slice(&MAGIC);
        for (i, v) in values.iter().enumerate() {
            w[4 + i * 2..6 + i * 2].copy_from_slice(&v.to_be_bytes());
        }
        w[16..22].copy_from_slice(&start);
        w[22..28].copy_from_slice(&end);
        w[28..30].copy_from_slice(&spacer.to_be_bytes());
        w
    }

    #[test]
    fn decodes_fixed_fields_big_endian() {
        let w = window([1, 0x0203, 7, 9500, 0xFFFF, 420], [24, 1, 15, 8, 30, 0], [24, 1, 15, 15, 30, 0], 0xABCD);
        let r = RawRecord::decode(0x40, &w);
        assert_eq!(r.offset, 0x40);
        assert_eq!(r.values, [1, 0x0203, 7, 9500, 0xFFFF, 420]);
        assert_eq!(r.duration_min(), 420);
        assert_eq!(r.pressure_raw(), 9500);
        assert_eq!(r.apnea_events(), 7);
        assert_eq!(r.leak_raw(), 0x0203);
        assert_eq!(r.spacer, 0xABCD);
        assert_eq!(r.start_time, TimestampResult::Valid(datetime!(2024-01-15 08:30:00)));
        assert_eq!(r.end_time, TimestampResult::Valid(datetime!(2024-01-15 15:30:00)));
    }

    #[test]
    fn invalid_timestamps_still_produce_a_record() {
        let w = window([0; 6], [24, 2, 30, 8, 30, 0], [0xFF; 6], 0);
        let r = RawRecord::decode(0, &w);
        assert_eq!(r.start_time, TimestampResult::Invalid);
        assert_eq!(r.end_time, TimestampResult::Invalid);
    }

    #[test]
    fn timestamp_calendar_rules() {
        assert_eq!(decode_timestamp([24, 1, 15, 8, 30, 0]), TimestampResult::Valid(datetime!(2024-01-15 08:30:00)));
        assert_eq!(decode_timestamp([0, 1, 1, 0, 0, 0]), TimestampResult::Valid(datetime!(2000-01-01 00:00:00)));
        assert_eq!(decode_timestamp([99, 12, 31, 23, 59, 59]), TimestampResult::Valid(datetime!(2099-12-31 23:59:59)));
        // leap years
        assert!(decode_timestamp([24, 2, 29, 0, 0, 0]).is_valid());
        assert!(decode_timestamp([0, 2, 29, 0, 0, 0]).is_valid());
        assert!(!decode_timestamp([23, 2, 29, 0, 0, 0]).is_valid());
        assert!(!decode_timestamp([100, 2, 29, 0, 0, 0]).is_valid()); // 2100
        // out of range components
        for yy in [0u8, 23, 24, 99] {
            assert_eq!(decode_timestamp([yy, 2, 30, 0, 0, 0]), TimestampResult::Invalid);
        }
        assert_eq!(decode_timestamp([24, 0, 1, 0, 0, 0]), TimestampResult::Invalid);
        assert_eq!(decode_timestamp([24, 13, 1, 0, 0, 0]), TimestampResult::Invalid);
        assert_eq!(decode_timestamp([24, 4, 31, 0, 0, 0]), TimestampResult::Invalid);
        assert_eq!(decode_timestamp([24, 1, 0, 0, 0, 0]), TimestampResult::Invalid);
        assert_eq!(decode_timestamp([24, 1, 1, 24, 0, 0]), TimestampResult::Invalid);
        assert_eq!(decode_timestamp([24, 1, 1, 0, 60, 0]), TimestampResult::Invalid);
        assert_eq!(decode_timestamp([24, 1, 1, 0, 0, 60]), TimestampResult::Invalid);
    }

    #[test]
    fn valid_components_come_back_unchanged() {
        for (yy, mm, dd) in [(0u8, 1u8, 31u8), (24, 2, 29), (25, 6, 30), (255, 12, 31)] {
            for (hh, mi, ss) in [(0u8, 0u8, 0u8), (23, 59, 59), (12, 7, 45)] {
                let dt = decode_timestamp([yy, mm, dd, hh, mi, ss]).valid().unwrap();
                assert_eq!(dt.year(), 2000 + yy as i32);
                assert_eq!(u8::from(dt.month()), mm);
                assert_eq!((dt.day(), dt.hour(), dt.minute(), dt.second()), (dd, hh, mi, ss));
            }
        }
    }

    fn days_in_month(year: i32, month: u8) -> u8 {
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        match month {
            2 if leap => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    #[test]
    fn every_date_byte_combination_follows_the_calendar() {
        for yy in 0..=u8::MAX {
            let year = 2000 + yy as i32;
            for mm in 0..=14u8 {
                for dd in 0..=32u8 {
                    let expect = (1..=12).contains(&mm) && dd >= 1 && dd <= days_in_month(year, mm);
                    assert_eq!(decode_timestamp([yy, mm, dd, 12, 0, 0]).is_valid(), expect, "{yy} {mm} {dd}");
                }
            }
        }
    }

    #[test]
    fn every_time_byte_combination_follows_the_clock() {
        for hh in 0..=25u8 {
            for mi in 0..=61u8 {
                for ss in 0..=61u8 {
                    let expect = hh < 24 && mi < 60 && ss < 60;
                    assert_eq!(decode_timestamp([24, 6, 1, hh, mi, ss]).is_valid(), expect, "{hh} {mi} {ss}");
                }
            }
        }
    }

    proptest! {
        #[test]
        fn valid_components_round_trip(
            yy in any::<u8>(),
            mm in 1u8..=12,
            day_seed in any::<u8>(),
            hh in 0u8..24,
            mi in 0u8..60,
            ss in 0u8..60,
        ) {
            let dd = day_seed % days_in_month(2000 + yy as i32, mm) + 1;
            let dt = decode_timestamp([yy, mm, dd, hh, mi, ss]).valid();
            prop_assert!(dt.is_some());
            let dt = dt.unwrap();
            prop_assert_eq!(dt.year(), 2000 + yy as i32);
            prop_assert_eq!(u8::from(dt.month()), mm);
            prop_assert_eq!((dt.day(), dt.hour(), dt.minute(), dt.second()), (dd, hh, mi, ss));
        }

        #[test]
        fn decoding_any_window_is_total(bytes in proptest::collection::vec(any::<u8>(), RECORD_LEN), offset in any::<u32>()) {
            let mut w = [0u8; RECORD_LEN];
            w.copy_from_slice(&bytes);
            let r = RawRecord::decode(offset as usize, &w);
            prop_assert_eq!(r.offset, offset as usize);
            prop_assert_eq!(r.values[0], u16::from_be_bytes([bytes[4], bytes[5]]));
            prop_assert_eq!(r.spacer, u16::from_be_bytes([bytes[28], bytes[29]]));
        }
    }

    #[test]
    fn display_matches_csv_format() {
        assert_eq!(decode_timestamp([24, 1, 15, 8, 30, 0]).to_string(), "2024-01-15 08:30:00");
        assert_eq!(TimestampResult::Invalid.to_string(), "Invalid Date");
    }

    #[test]
    fn overlap_is_symmetric() {
        let w = window([0; 6], [0; 6], [0; 6], 0);
        let a = RawRecord::decode(0, &w);
        let b = RawRecord::decode(4, &w);
        let c = RawRecord::decode(30, &w);
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert_eq!(b.span(), 4..34);
    }
}
