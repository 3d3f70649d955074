//! Per-staff performance score.
//!
//! The weights are a fixed contract:
//! attendance contributes up to 60 points, each approved leave application
//! costs 2 points up to a cap of 30, and each open or under-review
//! disciplinary case costs 10 points. The result is clamped to `[0, 100]`.

use std::collections::HashMap;

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;
use crate::database::models::{AttendanceRecord, DisciplinaryCase, LeaveApplication, StaffProfile};
use crate::reports::aggregate::{rate, round2};
use crate::reports::filter::DateRange;

pub const ATTENDANCE_WEIGHT: f64 = 60.0;
pub const LEAVE_PENALTY_PER_APPLICATION: f64 = 2.0;
pub const LEAVE_PENALTY_CAP: f64 = 30.0;
pub const CASE_PENALTY: f64 = 10.0;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum ScorePeriod {
        Week => "week",
        #[default]
        Month => "month",
        Quarter => "quarter",
        Year => "year",
    }
}

impl ScorePeriod {
    pub fn lookback_days(&self) -> u64 {
        match self {
            ScorePeriod::Week => 7,
            ScorePeriod::Month => 30,
            ScorePeriod::Quarter => 90,
            ScorePeriod::Year => 365,
        }
    }

    /// `lookback_days` calendar days ending on, and including, the date of `now`.
    pub fn window(&self, now: DateTime<Utc>) -> DateRange {
        let end = now.date_naive();
        let start = end
            .checked_sub_days(Days::new(self.lookback_days() - 1))
            .unwrap_or(end);
        DateRange::new(start, end)
    }
}

pub fn leave_penalty(leave_applications: i64) -> f64 {
    (leave_applications.max(0) as f64 * LEAVE_PENALTY_PER_APPLICATION).min(LEAVE_PENALTY_CAP)
}

pub fn disciplinary_penalty(open_cases: i64) -> f64 {
    open_cases.max(0) as f64 * CASE_PENALTY
}

/// Combine the three signals into a score in `[0, 100]`, two decimals.
pub fn score(attendance_rate: f64, leave_applications: i64, open_cases: i64) -> f64 {
    let attendance = attendance_rate.clamp(0.0, 100.0) / 100.0 * ATTENDANCE_WEIGHT;
    let raw = attendance - leave_penalty(leave_applications) - disciplinary_penalty(open_cases);
    round2(raw.clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceScore {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub department: Option<String>,
    pub attendance_records: i64,
    pub present_days: i64,
    pub attendance_rate: f64,
    pub leave_applications: i64,
    pub open_cases: i64,
    pub leave_penalty: f64,
    pub disciplinary_penalty: f64,
    pub score: f64,
}

/// Score one staff member from their records. Expects approved leave and
/// unresolved cases only; attendance rate counts `present` days.
pub fn evaluate(
    staff: &StaffProfile,
    attendance: &[&AttendanceRecord],
    approved_leaves: &[&LeaveApplication],
    open_cases: &[&DisciplinaryCase],
) -> PerformanceScore {
    let attendance_records = attendance.len() as i64;
    let present_days = attendance.iter().filter(|r| r.is_present()).count() as i64;
    let attendance_rate = rate(present_days, attendance_records);
    let leave_applications = approved_leaves.len() as i64;
    let open_cases = open_cases.len() as i64;

    PerformanceScore {
        staff_id: staff.id,
        staff_name: staff.full_name(),
        department: staff.department.clone(),
        attendance_records,
        present_days,
        attendance_rate,
        leave_applications,
        open_cases,
        leave_penalty: leave_penalty(leave_applications),
        disciplinary_penalty: disciplinary_penalty(open_cases),
        score: score(attendance_rate, leave_applications, open_cases),
    }
}

fn by_staff<'a, T>(items: &'a [T], staff_of: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<&'a T>> {
    let mut groups: HashMap<Uuid, Vec<&T>> = HashMap::new();
    for item in items {
        groups.entry(staff_of(item)).or_default().push(item);
    }
    groups
}

/// Score every staff member from one batch of records, highest score first.
pub fn evaluate_all(
    staff: &[StaffProfile],
    attendance: &[AttendanceRecord],
    approved_leaves: &[LeaveApplication],
    open_cases: &[DisciplinaryCase],
) -> Vec<PerformanceScore> {
    let attendance = by_staff(attendance, |r| r.staff_id);
    let leaves = by_staff(approved_leaves, |l| l.staff_id);
    let cases = by_staff(open_cases, |c| c.staff_id);

    let mut scores: Vec<PerformanceScore> = staff
        .iter()
        .map(|member| {
            evaluate(
                member,
                attendance.get(&member.id).map_or(&[][..], Vec::as_slice),
                leaves.get(&member.id).map_or(&[][..], Vec::as_slice),
                cases.get(&member.id).map_or(&[][..], Vec::as_slice),
            )
        })
        .collect();

    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.staff_name.cmp(&b.staff_name))
    });
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AttendanceStatus, CaseStatus, InfractionType, LeaveStatus, LeaveType};
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn documented_weights_example() {
        // 80% attendance, two approved leaves, one open case
        assert_eq!(score(80.0, 2, 1), 34.0);
    }

    #[test]
    fn leave_penalty_is_capped() {
        assert_eq!(leave_penalty(3), 6.0);
        assert_eq!(leave_penalty(15), 30.0);
        assert_eq!(leave_penalty(40), 30.0);
        assert_eq!(score(100.0, 40, 0), 30.0);
    }

    #[test]
    fn score_floors_at_zero() {
        assert_eq!(score(10.0, 5, 3), 0.0);
        assert_eq!(score(0.0, 0, 0), 0.0);
    }

    #[test]
    fn perfect_attendance_tops_out_at_sixty() {
        assert_eq!(score(100.0, 0, 0), 60.0);
    }

    #[test]
    fn lookback_windows_end_today() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 0, 0).unwrap();
        assert_eq!(ScorePeriod::Week.window(now), DateRange::new(date(2024, 3, 25), date(2024, 3, 31)));
        assert_eq!(ScorePeriod::Quarter.window(now).start, date(2024, 1, 2));
        assert_eq!("year".parse::<ScorePeriod>(), Ok(ScorePeriod::Year));
        assert_eq!(ScorePeriod::default(), ScorePeriod::Month);
    }

    #[test]
    fn window_spans_exactly_the_lookback_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 0, 0).unwrap();
        for period in ScorePeriod::ALL {
            let window = period.window(now);
            let days = (window.end - window.start).num_days() + 1;
            assert_eq!(days as u64, period.lookback_days(), "{}", period);
        }

        // Eight daily records, only the last seven fall inside a week.
        let staff = Uuid::new_v4();
        let filter = crate::reports::filter::RecordFilter::attendance(vec![])
            .within(Some(ScorePeriod::Week.window(now)));
        let admitted = (24..=31)
            .map(|d| AttendanceRecord::new(staff, date(2024, 3, d), AttendanceStatus::Present))
            .filter(|r| filter.matches_attendance(r))
            .count();
        assert_eq!(admitted, 7);
    }

    #[test]
    fn evaluate_all_scores_from_present_days() {
        let good = StaffProfile::new("Ada", "Obi", Some("Nursing"));
        let idle = StaffProfile::new("Ben", "Cole", None);
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let mut attendance: Vec<AttendanceRecord> = (1..=8)
            .map(|d| AttendanceRecord::new(good.id, date(2024, 3, d), AttendanceStatus::Present))
            .collect();
        attendance.push(AttendanceRecord::new(good.id, date(2024, 3, 9), AttendanceStatus::Late));
        attendance.push(AttendanceRecord::new(good.id, date(2024, 3, 10), AttendanceStatus::Absent));

        let leaves = vec![
            LeaveApplication::new(good.id, LeaveType::Annual, date(2024, 3, 11), date(2024, 3, 12), LeaveStatus::Approved, created),
            LeaveApplication::new(good.id, LeaveType::Sick, date(2024, 3, 14), date(2024, 3, 14), LeaveStatus::Approved, created),
        ];
        let cases = vec![DisciplinaryCase::new(good.id, InfractionType::Minor, CaseStatus::Open, date(2024, 3, 2), created)];

        let scores = evaluate_all(&[idle.clone(), good.clone()], &attendance, &leaves, &cases);

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].staff_id, good.id);
        assert_eq!(scores[0].attendance_rate, 80.0);
        assert_eq!(scores[0].score, 34.0);
        assert_eq!(scores[1].staff_id, idle.id);
        assert_eq!(scores[1].attendance_records, 0);
        assert_eq!(scores[1].score, 0.0);
    }

    proptest! {
        #[test]
        fn score_stays_within_bounds(rate in 0.0f64..=100.0, leaves in 0i64..1_000, cases in 0i64..1_000) {
            let s = score(rate, leaves, cases);
            prop_assert!((0.0..=100.0).contains(&s));
        }
    }
}
