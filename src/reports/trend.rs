//! Fixed-length, gap-free time series anchored to a reference date.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::database::models::{AttendanceRecord, LeaveApplication};
use crate::reports::aggregate::rate;
use crate::reports::filter::DateRange;

pub const DAILY_POINTS: u32 = 7;
pub const MONTHLY_POINTS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: i64,
    /// Present only for series measured against a headcount.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub name: String,
    pub granularity: Granularity,
    pub points: Vec<TrendPoint>,
}

fn days_before(reference: NaiveDate, days: u32) -> NaiveDate {
    reference
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Calendar days covered by the daily series: the reference date and the six before it.
pub fn daily_window(reference: NaiveDate) -> DateRange {
    DateRange::new(days_before(reference, DAILY_POINTS - 1), reference)
}

/// Months covered by the monthly series, oldest first, as (first day, last day).
pub fn monthly_buckets(reference: NaiveDate) -> Vec<DateRange> {
    let current = first_of_month(reference);
    (0..MONTHLY_POINTS)
        .rev()
        .map(|back| {
            let start = current
                .checked_sub_months(Months::new(back))
                .unwrap_or(current);
            DateRange::new(start, last_of_month(start))
        })
        .collect()
}

pub fn monthly_window(reference: NaiveDate) -> DateRange {
    let buckets = monthly_buckets(reference);
    let start = buckets.first().map_or(reference, |b| b.start);
    let end = buckets.last().map_or(reference, |b| b.end);
    DateRange::new(start, end)
}

/// Present count per day for the seven days ending at `reference`, with the
/// rate against `headcount`. Days without records yield zero.
pub fn daily_attendance_trend(
    reference: NaiveDate,
    records: &[AttendanceRecord],
    headcount: i64,
) -> TrendSeries {
    let points = (0..DAILY_POINTS)
        .rev()
        .map(|back| {
            let day = days_before(reference, back);
            let present = records
                .iter()
                .filter(|r| r.date == day && r.is_present())
                .count() as i64;
            TrendPoint {
                label: day.format("%a %d %b").to_string(),
                start: day,
                end: day,
                count: present,
                rate: Some(rate(present, headcount)),
            }
        })
        .collect();

    TrendSeries {
        name: "attendance".to_string(),
        granularity: Granularity::Daily,
        points,
    }
}

/// Leave applications created in each of the six calendar months ending with
/// the month of `reference`.
pub fn monthly_leave_trend(reference: NaiveDate, leaves: &[LeaveApplication]) -> TrendSeries {
    let points = monthly_buckets(reference)
        .into_iter()
        .map(|bucket| {
            let count = leaves
                .iter()
                .filter(|l| bucket.contains(l.created_at.date_naive()))
                .count() as i64;
            TrendPoint {
                label: bucket.start.format("%b %Y").to_string(),
                start: bucket.start,
                end: bucket.end,
                count,
                rate: None,
            }
        })
        .collect();

    TrendSeries {
        name: "leave applications".to_string(),
        granularity: Granularity::Monthly,
        points,
    }
}
