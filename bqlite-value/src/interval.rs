//! `INTERVAL` values with ISO 8601 calendar and time semantics. Represented
//! as the classic three-part months/days/microseconds split so that calendar
//! arithmetic (adding a month respects month-end clamping) is distinguishable
//! from fixed-duration arithmetic (adding 86400 seconds is always exactly one
//! day in micros).

use crate::error::ValueError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl Interval {
    pub fn new(years: i32, months: i32, days: i32, hours: i64, minutes: i64, seconds: i64, micros: i64) -> Self {
        Interval {
            months: years * 12 + months,
            days,
            micros: ((hours * 60 + minutes) * 60 + seconds) * 1_000_000 + micros,
        }
    }

    pub fn negate(self) -> Self {
        Interval {
            months: -self.months,
            days: -self.days,
            micros: -self.micros,
        }
    }

    pub fn add(self, other: Self) -> Self {
        Interval {
            months: self.months + other.months,
            days: self.days + other.days,
            micros: self.micros + other.micros,
        }
    }

    pub fn sub(self, other: Self) -> Self {
        self.add(other.negate())
    }

    pub fn scale(self, factor: f64) -> Self {
        Interval {
            months: (self.months as f64 * factor).round() as i32,
            days: (self.days as f64 * factor).round() as i32,
            micros: (self.micros as f64 * factor).round() as i64,
        }
    }

    /// Applies the interval to a datetime: months first (with end-of-month
    /// clamping), then days, then the fixed microsecond offset.
    pub fn apply_to_datetime(self, dt: NaiveDateTime) -> Result<NaiveDateTime, ValueError> {
        let shifted_date = add_months(dt.date(), self.months)?;
        let shifted_date = shifted_date
            .checked_add_signed(chrono::Duration::days(self.days as i64))
            .ok_or_else(|| ValueError::Overflow { detail: "INTERVAL day overflow".into() })?;
        let base = NaiveDateTime::new(shifted_date, dt.time());
        base.checked_add_signed(chrono::Duration::microseconds(self.micros))
            .ok_or_else(|| ValueError::Overflow { detail: "INTERVAL time overflow".into() })
    }

    pub fn to_iso8601(self) -> String {
        let years = self.months / 12;
        let months = self.months % 12;
        let secs = self.micros.abs() / 1_000_000;
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;
        let micros = self.micros.abs() % 1_000_000;
        let sign = if self.micros < 0 { "-" } else { "" };
        format!("P{years}Y{months}M{days}DT{sign}{hours}H{minutes}M{seconds}.{micros:06}S", days = self.days)
    }
}

fn add_months(d: NaiveDate, months: i32) -> Result<NaiveDate, ValueError> {
    let total = d.year() * 12 + (d.month() as i32 - 1) + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) + 1;
    let last_day = last_day_of_month(year, month as u32);
    let day = d.day().min(last_day);
    NaiveDate::from_ymd_opt(year, month as u32, day)
        .ok_or_else(|| ValueError::Overflow { detail: "INTERVAL month overflow".into() })
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn month_end_clamps() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let iv = Interval::new(0, 1, 0, 0, 0, 0, 0);
        let got = iv.apply_to_datetime(dt).unwrap();
        assert_eq!(got.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn add_then_sub_is_identity() {
        let iv = Interval::new(1, 2, 3, 4, 5, 6, 7);
        assert_eq!(iv.add(iv.negate()), Interval::default());
    }
}
