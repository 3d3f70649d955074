//! Format-independent statistics over already-filtered record lists.
//!
//! Status tallies bucket missing or unrecognised values under
//! [`UNSPECIFIED`]; no record is ever dropped from a count.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{
    AttendanceRecord, AttendanceStatus, CaseStatus, DisciplinaryCase, LeaveApplication,
    LeaveStatus, StaffProfile, StringEnum,
};

pub const UNSPECIFIED: &str = "unspecified";

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator * 100` to two decimals; zero when the denominator is zero.
pub fn rate(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: i64,
    pub counts: BTreeMap<String, i64>,
}

impl StatusCounts {
    pub fn get(&self, status: &str) -> i64 {
        self.counts.get(status).copied().unwrap_or(0)
    }
}

/// Count occurrences of each status. Every known status appears, zero or not;
/// `unspecified` appears only when some record had no recognised status.
pub fn tally<S: StringEnum>(statuses: impl IntoIterator<Item = Option<S>>) -> StatusCounts {
    let mut counts: BTreeMap<String, i64> = S::variants()
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut total = 0;
    for status in statuses {
        let key = status.map_or(UNSPECIFIED, |s| s.as_str());
        *counts.entry(key.to_string()).or_insert(0) += 1;
        total += 1;
    }
    StatusCounts { total, counts }
}

/// Accounted-for days within an attendance tally.
pub fn accounted_for(counts: &StatusCounts) -> i64 {
    AttendanceStatus::ALL
        .iter()
        .filter(|s| s.is_accounted_for())
        .map(|s| counts.get(s.as_str()))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub statuses: StatusCounts,
    pub accounted_for: i64,
    pub attendance_rate: f64,
    pub total_hours_worked: f64,
}

pub fn summarize_attendance(records: &[AttendanceRecord]) -> AttendanceSummary {
    let statuses = tally(records.iter().map(|r| r.status));
    let accounted_for = records.iter().filter(|r| r.is_accounted_for()).count() as i64;
    let total_hours_worked = round2(records.iter().filter_map(|r| r.hours_worked()).sum());
    AttendanceSummary {
        attendance_rate: rate(accounted_for, statuses.total),
        statuses,
        accounted_for,
        total_hours_worked,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSummary {
    pub statuses: StatusCounts,
    pub approval_rate: f64,
    pub total_days: i64,
}

pub fn summarize_leaves(leaves: &[LeaveApplication]) -> LeaveSummary {
    let statuses = tally(leaves.iter().map(|l| l.status));
    LeaveSummary {
        approval_rate: rate(statuses.get(LeaveStatus::Approved.as_str()), statuses.total),
        total_days: leaves.iter().map(|l| l.number_of_days).sum(),
        statuses,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    pub statuses: StatusCounts,
    pub resolution_rate: f64,
}

pub fn summarize_cases(cases: &[DisciplinaryCase]) -> CaseSummary {
    let statuses = tally(cases.iter().map(|c| c.status));
    CaseSummary {
        resolution_rate: rate(statuses.get(CaseStatus::Resolved.as_str()), statuses.total),
        statuses,
    }
}

/// Occurrences and accumulated day count for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub count: i64,
    pub days: i64,
}

/// Group items by a derived key, counting occurrences and summing `days_of`.
pub fn breakdown<T>(
    items: &[T],
    key_of: impl Fn(&T) -> String,
    days_of: impl Fn(&T) -> i64,
) -> BTreeMap<String, CategoryTotals> {
    let mut groups: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for item in items {
        let entry = groups.entry(key_of(item)).or_default();
        entry.count += 1;
        entry.days += days_of(item);
    }
    groups
}

pub fn category_key<S: StringEnum>(value: Option<S>) -> String {
    value.map_or(UNSPECIFIED, |v| v.as_str()).to_string()
}

/// `YYYY-MM` key for monthly breakdowns.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn leaves_by_type(leaves: &[LeaveApplication]) -> BTreeMap<String, CategoryTotals> {
    breakdown(leaves, |l| category_key(l.leave_type), |l| l.number_of_days)
}

pub fn leaves_by_month(leaves: &[LeaveApplication]) -> BTreeMap<String, CategoryTotals> {
    breakdown(leaves, |l| month_key(l.created_at.date_naive()), |l| l.number_of_days)
}

pub fn cases_by_type(cases: &[DisciplinaryCase]) -> BTreeMap<String, CategoryTotals> {
    breakdown(cases, |c| category_key(c.infraction_type), |_| 0)
}

pub fn cases_by_month(cases: &[DisciplinaryCase]) -> BTreeMap<String, CategoryTotals> {
    breakdown(cases, |c| month_key(c.date_of_infraction), |_| 0)
}

/// Staff id to department lookup used by rollups.
pub struct DepartmentIndex {
    departments: HashMap<Uuid, Option<String>>,
}

impl DepartmentIndex {
    pub fn new<'a>(staff: impl IntoIterator<Item = &'a StaffProfile>) -> Self {
        Self {
            departments: staff
                .into_iter()
                .map(|s| (s.id, s.department.clone()))
                .collect(),
        }
    }

    /// Department of `staff_id`, or `unspecified` when absent, blank or unknown.
    pub fn department_of(&self, staff_id: Uuid) -> String {
        self.departments
            .get(&staff_id)
            .and_then(|d| d.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNSPECIFIED)
            .to_string()
    }
}

/// Partition records by their staff member's department and tally each group.
pub fn department_rollup<T, S: StringEnum>(
    records: &[T],
    index: &DepartmentIndex,
    staff_of: impl Fn(&T) -> Uuid,
    status_of: impl Fn(&T) -> Option<S>,
) -> BTreeMap<String, StatusCounts> {
    let mut groups: BTreeMap<String, Vec<Option<S>>> = BTreeMap::new();
    for record in records {
        groups
            .entry(index.department_of(staff_of(record)))
            .or_default()
            .push(status_of(record));
    }
    groups
        .into_iter()
        .map(|(department, statuses)| (department, tally(statuses)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{InfractionType, LeaveType};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn attendance(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        let staff = Uuid::new_v4();
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| AttendanceRecord::new(staff, date(2024, 1, 1 + i as u32), *s))
            .collect()
    }

    #[test]
    fn rate_with_zero_denominator_is_zero() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(5, 0), 0.0);
        assert!(!rate(0, 0).is_nan());
    }

    #[test]
    fn rate_rounds_to_two_decimals() {
        assert_eq!(rate(1, 3), 33.33);
        assert_eq!(rate(2, 3), 66.67);
    }

    #[test]
    fn attendance_rate_counts_accounted_for_days() {
        use AttendanceStatus::*;
        let mut statuses = vec![Present; 7];
        statuses.extend([Absent, Late, Leave]);
        let summary = summarize_attendance(&attendance(&statuses));

        assert_eq!(summary.statuses.total, 10);
        assert_eq!(summary.accounted_for, 9);
        assert_eq!(summary.attendance_rate, 90.0);
        assert_eq!(summary.statuses.get("present"), 7);
        assert_eq!(summary.statuses.get("off-duty"), 0);
        assert_eq!(accounted_for(&summary.statuses), 9);
    }

    #[test]
    fn empty_sets_summarize_to_zero() {
        let summary = summarize_attendance(&[]);
        assert_eq!(summary.attendance_rate, 0.0);
        assert_eq!(summarize_leaves(&[]).approval_rate, 0.0);
        assert_eq!(summarize_cases(&[]).resolution_rate, 0.0);
    }

    #[test]
    fn unknown_statuses_are_bucketed_as_unspecified() {
        let mut records = attendance(&[AttendanceStatus::Present, AttendanceStatus::Absent]);
        records[1].status = None;
        let summary = summarize_attendance(&records);

        assert_eq!(summary.statuses.total, 2);
        assert_eq!(summary.statuses.get(UNSPECIFIED), 1);
        assert_eq!(summary.statuses.get("absent"), 0);
        assert_eq!(summary.attendance_rate, 50.0);
    }

    #[test]
    fn tally_omits_unspecified_when_every_status_is_known() {
        let counts = tally([Some(LeaveStatus::Pending)]);
        assert!(!counts.counts.contains_key(UNSPECIFIED));
        assert_eq!(counts.counts.len(), LeaveStatus::ALL.len());
    }

    #[test]
    fn hours_worked_only_when_both_times_present() {
        let mut records = attendance(&[AttendanceStatus::Present, AttendanceStatus::Present]);
        records[0].check_in_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
        records[0].check_out_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 16, 30, 0).unwrap());
        records[1].check_in_time = Some(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap());

        assert_eq!(records[0].hours_worked(), Some(8.5));
        assert_eq!(records[1].hours_worked(), None);
        assert_eq!(summarize_attendance(&records).total_hours_worked, 8.5);
    }

    #[test]
    fn leave_breakdown_accumulates_days_per_type() {
        let staff = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let leaves = vec![
            LeaveApplication::new(staff, LeaveType::Annual, date(2024, 3, 4), date(2024, 3, 8), LeaveStatus::Approved, created),
            LeaveApplication::new(staff, LeaveType::Annual, date(2024, 4, 1), date(2024, 4, 2), LeaveStatus::Pending, created),
            LeaveApplication::new(staff, LeaveType::Sick, date(2024, 3, 11), date(2024, 3, 11), LeaveStatus::Approved, created),
        ];

        let by_type = leaves_by_type(&leaves);
        assert_eq!(by_type["annual"], CategoryTotals { count: 2, days: 7 });
        assert_eq!(by_type["sick"], CategoryTotals { count: 1, days: 1 });

        let summary = summarize_leaves(&leaves);
        assert_eq!(summary.approval_rate, 66.67);
        assert_eq!(summary.total_days, 8);
    }

    #[test]
    fn monthly_breakdown_keys_by_year_and_month() {
        let staff = Uuid::new_v4();
        let cases = vec![
            DisciplinaryCase::new(staff, InfractionType::Minor, CaseStatus::Open, date(2024, 1, 31), Utc::now()),
            DisciplinaryCase::new(staff, InfractionType::Major, CaseStatus::Resolved, date(2024, 2, 1), Utc::now()),
            DisciplinaryCase::new(staff, InfractionType::Minor, CaseStatus::Resolved, date(2024, 2, 29), Utc::now()),
        ];
        let by_month = cases_by_month(&cases);
        assert_eq!(by_month.keys().collect::<Vec<_>>(), vec!["2024-01", "2024-02"]);
        assert_eq!(by_month["2024-02"].count, 2);
        assert_eq!(summarize_cases(&cases).resolution_rate, 66.67);
    }

    #[test]
    fn department_rollup_partitions_every_record() {
        let nurse = StaffProfile::new("Ada", "Obi", Some("Nursing"));
        let blank = StaffProfile::new("Cy", "Dee", Some("  "));
        let nowhere = StaffProfile::new("Eve", "Fox", None);
        let stranger = Uuid::new_v4();
        let index = DepartmentIndex::new(&[nurse.clone(), blank.clone(), nowhere.clone()]);

        let records = vec![
            AttendanceRecord::new(nurse.id, date(2024, 1, 1), AttendanceStatus::Present),
            AttendanceRecord::new(nurse.id, date(2024, 1, 2), AttendanceStatus::Absent),
            AttendanceRecord::new(blank.id, date(2024, 1, 1), AttendanceStatus::Present),
            AttendanceRecord::new(nowhere.id, date(2024, 1, 1), AttendanceStatus::Late),
            AttendanceRecord::new(stranger, date(2024, 1, 1), AttendanceStatus::Present),
        ];
        let rollup = department_rollup(&records, &index, |r| r.staff_id, |r| r.status);

        assert_eq!(rollup.keys().collect::<Vec<_>>(), vec!["Nursing", UNSPECIFIED]);
        assert_eq!(rollup["Nursing"].total, 2);
        assert_eq!(rollup[UNSPECIFIED].total, 3);
        let sum: i64 = rollup.values().map(|c| c.total).sum();
        assert_eq!(sum, records.len() as i64);
    }

    proptest! {
        #[test]
        fn department_rollup_sums_to_record_count(
            picks in proptest::collection::vec((0usize..4, 0usize..6), 0..60)
        ) {
            let staff = [
                StaffProfile::new("Ada", "Obi", Some("Nursing")),
                StaffProfile::new("Bo", "Lee", Some("Portering")),
                StaffProfile::new("Cy", "Dee", None),
            ];
            let index = DepartmentIndex::new(&staff);
            let records: Vec<AttendanceRecord> = picks
                .iter()
                .map(|(who, status)| {
                    // Index 3 is a staff id the index does not know.
                    let staff_id = staff.get(*who).map_or_else(Uuid::new_v4, |s| s.id);
                    let mut record = AttendanceRecord::new(staff_id, date(2024, 1, 1), AttendanceStatus::Present);
                    record.status = AttendanceStatus::ALL.get(*status).copied();
                    record
                })
                .collect();

            let rollup = department_rollup(&records, &index, |r| r.staff_id, |r| r.status);
            let sum: i64 = rollup.values().map(|c| c.total).sum();
            prop_assert_eq!(sum, records.len() as i64);
        }
    }
}
