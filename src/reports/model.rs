//! The canonical Report object shared by every renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;
use crate::database::models::{
    AttendanceStatus, CaseStatus, InfractionType, LeaveStatus, LeaveType,
};
use crate::reports::aggregate::{CategoryTotals, StatusCounts};
use crate::reports::filter::DateRange;
use crate::reports::performance::PerformanceScore;
use crate::reports::trend::TrendSeries;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ReportType {
        Attendance => "attendance",
        Leave => "leave",
        Disciplinary => "disciplinary",
        Performance => "performance",
        Department => "department",
        Dashboard => "dashboard",
        PerStaff => "per-staff",
        LeaveBalance => "leave-balance",
    }
}

impl ReportType {
    pub fn requires_date_range(&self) -> bool {
        matches!(
            self,
            ReportType::Attendance | ReportType::Leave | ReportType::Disciplinary
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Attendance => "Attendance Report",
            ReportType::Leave => "Leave Report",
            ReportType::Disciplinary => "Disciplinary Report",
            ReportType::Performance => "Staff Performance Report",
            ReportType::Department => "Department Statistics Report",
            ReportType::Dashboard => "Dashboard Summary",
            ReportType::PerStaff => "Staff Member Report",
            ReportType::LeaveBalance => "Leave Balance Report",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub label: String,
}

impl ReportPeriod {
    pub fn from_range(range: Option<DateRange>) -> Self {
        match range {
            Some(range) => Self {
                start: Some(range.start),
                end: Some(range.end),
                label: format!("{} to {}", range.start, range.end),
            },
            None => Self {
                start: None,
                end: None,
                label: "All records".to_string(),
            },
        }
    }

    pub fn as_of(date: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(date),
            label: format!("As of {}", date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(i64),
    Decimal(f64),
    Text(String),
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{}", n),
            StatValue::Decimal(v) => write!(f, "{:.2}", v),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub metric: String,
    pub value: StatValue,
}

/// A named group of statistics, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub name: String,
    pub stats: Vec<Stat>,
}

impl StatBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Vec::new(),
        }
    }

    fn push(mut self, metric: impl Into<String>, value: StatValue) -> Self {
        self.stats.push(Stat {
            metric: metric.into(),
            value,
        });
        self
    }

    pub fn count(self, metric: impl Into<String>, value: i64) -> Self {
        self.push(metric, StatValue::Count(value))
    }

    pub fn decimal(self, metric: impl Into<String>, value: f64) -> Self {
        self.push(metric, StatValue::Decimal(value))
    }

    pub fn text(self, metric: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(metric, StatValue::Text(value.into()))
    }

    /// `total` followed by one count per status.
    pub fn statuses(name: impl Into<String>, counts: &StatusCounts) -> Self {
        counts
            .counts
            .iter()
            .fold(Self::new(name).count("total", counts.total), |block, (status, n)| {
                block.count(status.clone(), *n)
            })
    }

    /// One count per category, plus a `<category> days` entry when `with_days`.
    pub fn categories(
        name: impl Into<String>,
        groups: &BTreeMap<String, CategoryTotals>,
        with_days: bool,
    ) -> Self {
        groups.iter().fold(Self::new(name), |block, (key, totals)| {
            let block = block.count(key.clone(), totals.count);
            if with_days {
                block.count(format!("{} days", key), totals.days)
            } else {
                block
            }
        })
    }

    pub fn get(&self, metric: &str) -> Option<&StatValue> {
        self.stats
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| &s.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDetail {
    pub staff_id: Uuid,
    pub staff_name: Option<String>,
    pub department: Option<String>,
    pub date: NaiveDate,
    pub status: Option<AttendanceStatus>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDetail {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub staff_name: Option<String>,
    pub department: Option<String>,
    pub leave_type: Option<LeaveType>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: i64,
    pub status: Option<LeaveStatus>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetail {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub staff_name: Option<String>,
    pub department: Option<String>,
    pub infraction_type: Option<InfractionType>,
    pub status: Option<CaseStatus>,
    pub date_of_infraction: NaiveDate,
    pub sanction: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRow {
    pub department: String,
    pub staff_count: i64,
    pub active_staff: i64,
    pub attendance: StatusCounts,
    pub attendance_rate: f64,
    pub leaves: StatusCounts,
    pub cases: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceRow {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub department: Option<String>,
    pub leave_type: LeaveType,
    pub total: i64,
    pub taken: i64,
    pub remaining: i64,
}

/// The per-record listing of a report; the variant name is its output key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Details {
    Attendance(Vec<AttendanceDetail>),
    Leaves(Vec<LeaveDetail>),
    Cases(Vec<CaseDetail>),
    Performance(Vec<PerformanceScore>),
    Departments(Vec<DepartmentRow>),
    Balances(Vec<LeaveBalanceRow>),
}

impl Details {
    pub fn len(&self) -> usize {
        match self {
            Details::Attendance(rows) => rows.len(),
            Details::Leaves(rows) => rows.len(),
            Details::Cases(rows) => rows.len(),
            Details::Performance(rows) => rows.len(),
            Details::Departments(rows) => rows.len(),
            Details::Balances(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_type: ReportType,
    pub title: String,
    pub period: ReportPeriod,
    pub statistics: Vec<StatBlock>,
    #[serde(default)]
    pub trends: Vec<TrendSeries>,
    #[serde(flatten)]
    pub details: Details,
    pub total_records: usize,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        report_type: ReportType,
        period: ReportPeriod,
        details: Details,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            report_type,
            title: report_type.title().to_string(),
            period,
            statistics: Vec::new(),
            trends: Vec::new(),
            total_records: details.len(),
            details,
            generated_at,
        }
    }

    pub fn with_block(mut self, block: StatBlock) -> Self {
        self.statistics.push(block);
        self
    }

    pub fn with_trend(mut self, series: TrendSeries) -> Self {
        self.trends.push(series);
        self
    }

    pub fn statistic(&self, block: &str, metric: &str) -> Option<&StatValue> {
        self.statistics
            .iter()
            .find(|b| b.name == block)
            .and_then(|b| b.get(metric))
    }
}
