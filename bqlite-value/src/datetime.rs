//! Packed civil date/time encoding.
//!
//! Layout, from the least-significant bit: 20 bits of microseconds, then
//! 6-bit second, 6-bit minute, 5-bit hour, 5-bit day, 4-bit month, 14-bit
//! year (60 bits total, fits a `u64`). `Time` uses the same layout with
//! year/month/day cleared to zero. `Date` is days since 1970-01-01 stored
//! directly as a signed 64-bit integer, not packed.

use crate::error::ValueError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const MICROS_BITS: u32 = 20;
const SECOND_BITS: u32 = 6;
const MINUTE_BITS: u32 = 6;
const HOUR_BITS: u32 = 5;
const DAY_BITS: u32 = 5;
const MONTH_BITS: u32 = 4;

const MICROS_SHIFT: u32 = 0;
const SECOND_SHIFT: u32 = MICROS_SHIFT + MICROS_BITS;
const MINUTE_SHIFT: u32 = SECOND_SHIFT + SECOND_BITS;
const HOUR_SHIFT: u32 = MINUTE_SHIFT + MINUTE_BITS;
const DAY_SHIFT: u32 = HOUR_SHIFT + HOUR_BITS;
const MONTH_SHIFT: u32 = DAY_SHIFT + DAY_BITS;
const YEAR_SHIFT: u32 = MONTH_SHIFT + MONTH_BITS;

fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// Packs a `(year, month, day, hour, minute, second, micros)` tuple. Callers
/// that only need a time-of-day pass `year = month = day = 0`.
pub fn pack(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32, micros: u32) -> u64 {
    ((year as u64 & mask(14)) << YEAR_SHIFT)
        | ((month as u64 & mask(MONTH_BITS)) << MONTH_SHIFT)
        | ((day as u64 & mask(DAY_BITS)) << DAY_SHIFT)
        | ((hour as u64 & mask(HOUR_BITS)) << HOUR_SHIFT)
        | ((minute as u64 & mask(MINUTE_BITS)) << MINUTE_SHIFT)
        | ((second as u64 & mask(SECOND_BITS)) << SECOND_SHIFT)
        | ((micros as u64 & mask(MICROS_BITS)) << MICROS_SHIFT)
}

pub fn unpack(bits: u64) -> (i32, u32, u32, u32, u32, u32, u32) {
    let year = ((bits >> YEAR_SHIFT) & mask(14)) as i32;
    let month = ((bits >> MONTH_SHIFT) & mask(MONTH_BITS)) as u32;
    let day = ((bits >> DAY_SHIFT) & mask(DAY_BITS)) as u32;
    let hour = ((bits >> HOUR_SHIFT) & mask(HOUR_BITS)) as u32;
    let minute = ((bits >> MINUTE_SHIFT) & mask(MINUTE_BITS)) as u32;
    let second = ((bits >> SECOND_SHIFT) & mask(SECOND_BITS)) as u32;
    let micros = ((bits >> MICROS_SHIFT) & mask(MICROS_BITS)) as u32;
    (year, month, day, hour, minute, second, micros)
}

pub fn pack_datetime(dt: &NaiveDateTime) -> u64 {
    pack(
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.and_utc().timestamp_subsec_micros(),
    )
}

pub fn unpack_datetime(bits: u64) -> Result<NaiveDateTime, ValueError> {
    let (year, month, day, hour, minute, second, micros) = unpack(bits);
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ValueError::conversion("packed-bits", "DATETIME", "out-of-range date component")
    })?;
    let time = NaiveTime::from_hms_micro_opt(hour, minute, second, micros).ok_or_else(|| {
        ValueError::conversion("packed-bits", "DATETIME", "out-of-range time component")
    })?;
    Ok(NaiveDateTime::new(date, time))
}

pub fn pack_time(t: &NaiveTime) -> u64 {
    pack(
        0,
        0,
        0,
        t.hour(),
        t.minute(),
        t.second(),
        (t.nanosecond() % 1_000_000_000) / 1000,
    )
}

pub fn unpack_time(bits: u64) -> Result<NaiveTime, ValueError> {
    let (_, _, _, hour, minute, second, micros) = unpack(bits);
    NaiveTime::from_hms_micro_opt(hour, minute, second, micros)
        .ok_or_else(|| ValueError::conversion("packed-bits", "TIME", "out-of-range time component"))
}

const UNIX_EPOCH: i64 = 719_163; // NaiveDate(1970,1,1).num_days_from_ce()

pub fn date_to_days(d: &NaiveDate) -> i64 {
    d.num_days_from_ce() as i64 - UNIX_EPOCH
}

pub fn days_to_date(days: i64) -> Result<NaiveDate, ValueError> {
    NaiveDate::from_num_days_from_ce_opt((days + UNIX_EPOCH) as i32)
        .ok_or_else(|| ValueError::conversion("days-since-epoch", "DATE", "out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_round_trips() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 123456)
            .unwrap();
        let bits = pack_datetime(&dt);
        assert_eq!(unpack_datetime(bits).unwrap(), dt);
    }

    #[test]
    fn time_round_trips() {
        let t = NaiveTime::from_hms_micro_opt(23, 59, 58, 999999).unwrap();
        let bits = pack_time(&t);
        assert_eq!(unpack_time(bits).unwrap(), t);
    }

    #[test]
    fn date_round_trips() {
        let d = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        let days = date_to_days(&d);
        assert_eq!(days_to_date(days).unwrap(), d);
    }

    #[test]
    fn date_epoch_is_zero() {
        let d = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(&d), 0);
    }
}
