//! Translation of report request parameters into per-entity record filters.
//!
//! Department lives on the staff profile rather than on operational records,
//! so department narrowing is always a two-phase step: resolve the matching
//! staff ids through the store, then constrain records by id membership.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{
    AttendanceRecord, AttendanceStatus, CaseStatus, DisciplinaryCase, InfractionType,
    LeaveApplication, LeaveStatus, LeaveType, StaffProfile,
};
use crate::reports::error::ReportError;
use crate::reports::model::ReportType;
use crate::reports::performance::ScorePeriod;
use crate::reports::store::{EntityKind, RecordStore};

/// Raw, unvalidated report parameters as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub department: Option<String>,
    pub staff_id: Option<String>,
    pub leave_type: Option<String>,
    pub infraction_type: Option<String>,
    pub status: Option<String>,
    pub period: Option<String>,
    pub format: Option<String>,
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What a caller is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerScope {
    Full,
    /// Limited to the listed staff members (typically self plus supervised staff).
    Restricted(BTreeSet<Uuid>),
}

impl CallerScope {
    pub fn restricted(ids: impl IntoIterator<Item = Uuid>) -> Self {
        CallerScope::Restricted(ids.into_iter().collect())
    }

    pub fn permits(&self, staff_id: Uuid) -> bool {
        match self {
            CallerScope::Full => true,
            CallerScope::Restricted(ids) => ids.contains(&staff_id),
        }
    }

    pub fn staff_ids(&self) -> Option<&BTreeSet<Uuid>> {
        match self {
            CallerScope::Full => None,
            CallerScope::Restricted(ids) => Some(ids),
        }
    }
}

/// Staff narrowing produced by the first phase of filter building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffSelection {
    Everyone,
    Only(BTreeSet<Uuid>),
}

impl StaffSelection {
    pub fn only(ids: impl IntoIterator<Item = Uuid>) -> Self {
        StaffSelection::Only(ids.into_iter().collect())
    }

    fn ids(&self) -> Option<BTreeSet<Uuid>> {
        match self {
            StaffSelection::Everyone => None,
            StaffSelection::Only(ids) => Some(ids.clone()),
        }
    }
}

/// The date column a record filter's range applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    AttendanceDate,
    CreatedAt,
}

impl DateField {
    /// SQL for the calendar date of this column. Timestamps are read as UTC
    /// dates whatever the session time zone.
    pub fn date_expr(&self) -> &'static str {
        match self {
            DateField::AttendanceDate => "date",
            DateField::CreatedAt => "(created_at AT TIME ZONE 'UTC')::date",
        }
    }
}

/// Kind-specific constraints. Empty status lists impose no constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Attendance {
        statuses: Vec<AttendanceStatus>,
    },
    Leave {
        statuses: Vec<LeaveStatus>,
        leave_type: Option<LeaveType>,
    },
    Disciplinary {
        statuses: Vec<CaseStatus>,
        infraction_type: Option<InfractionType>,
    },
}

/// A composable predicate over one kind of operational record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    pub criteria: Criteria,
    pub date_field: DateField,
    pub date_range: Option<DateRange>,
    pub staff_ids: Option<BTreeSet<Uuid>>,
    /// Caller-scope membership, applied in addition to `staff_ids`.
    pub scope_ids: Option<BTreeSet<Uuid>>,
}

impl RecordFilter {
    pub fn new(criteria: Criteria) -> Self {
        let date_field = match criteria {
            Criteria::Attendance { .. } => DateField::AttendanceDate,
            Criteria::Leave { .. } | Criteria::Disciplinary { .. } => DateField::CreatedAt,
        };
        Self {
            criteria,
            date_field,
            date_range: None,
            staff_ids: None,
            scope_ids: None,
        }
    }

    pub fn attendance(statuses: Vec<AttendanceStatus>) -> Self {
        Self::new(Criteria::Attendance { statuses })
    }

    pub fn leave(statuses: Vec<LeaveStatus>, leave_type: Option<LeaveType>) -> Self {
        Self::new(Criteria::Leave {
            statuses,
            leave_type,
        })
    }

    pub fn disciplinary(statuses: Vec<CaseStatus>, infraction_type: Option<InfractionType>) -> Self {
        Self::new(Criteria::Disciplinary {
            statuses,
            infraction_type,
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self.criteria {
            Criteria::Attendance { .. } => EntityKind::Attendance,
            Criteria::Leave { .. } => EntityKind::Leave,
            Criteria::Disciplinary { .. } => EntityKind::Disciplinary,
        }
    }

    pub fn within(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }

    pub fn for_selection(mut self, selection: &StaffSelection) -> Self {
        self.staff_ids = selection.ids();
        self
    }

    pub fn in_scope(mut self, scope: &CallerScope) -> Self {
        self.scope_ids = scope.staff_ids().cloned();
        self
    }

    fn admits(&self, staff_id: Uuid, date: NaiveDate) -> bool {
        let in_range = self.date_range.is_none_or(|range| range.contains(date));
        let selected = self.staff_ids.as_ref().is_none_or(|ids| ids.contains(&staff_id));
        let scoped = self.scope_ids.as_ref().is_none_or(|ids| ids.contains(&staff_id));
        in_range && selected && scoped
    }

    pub fn matches_attendance(&self, record: &AttendanceRecord) -> bool {
        let Criteria::Attendance { statuses } = &self.criteria else {
            return false;
        };
        self.admits(record.staff_id, record.date) && one_of(statuses, record.status)
    }

    pub fn matches_leave(&self, leave: &LeaveApplication) -> bool {
        let Criteria::Leave {
            statuses,
            leave_type,
        } = &self.criteria
        else {
            return false;
        };
        self.admits(leave.staff_id, leave.created_at.date_naive())
            && one_of(statuses, leave.status)
            && leave_type.is_none_or(|t| leave.leave_type == Some(t))
    }

    pub fn matches_case(&self, case: &DisciplinaryCase) -> bool {
        let Criteria::Disciplinary {
            statuses,
            infraction_type,
        } = &self.criteria
        else {
            return false;
        };
        self.admits(case.staff_id, case.created_at.date_naive())
            && one_of(statuses, case.status)
            && infraction_type.is_none_or(|t| case.infraction_type == Some(t))
    }
}

fn one_of<S: PartialEq + Copy>(wanted: &[S], actual: Option<S>) -> bool {
    wanted.is_empty() || actual.is_some_and(|status| wanted.contains(&status))
}

/// Predicate over staff profiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffFilter {
    pub ids: Option<BTreeSet<Uuid>>,
    pub scope_ids: Option<BTreeSet<Uuid>>,
    pub supervisor_id: Option<Uuid>,
    pub active_only: bool,
}

impl StaffFilter {
    pub fn by_ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn supervised_by(supervisor_id: Uuid) -> Self {
        Self {
            supervisor_id: Some(supervisor_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, staff: &StaffProfile) -> bool {
        self.ids.as_ref().is_none_or(|ids| ids.contains(&staff.id))
            && self.scope_ids.as_ref().is_none_or(|ids| ids.contains(&staff.id))
            && self.supervisor_id.is_none_or(|s| staff.supervisor_id == Some(s))
            && (!self.active_only || staff.is_active)
    }
}

/// Status parameter parsed against the record kind the report is about.
#[derive(Debug, Clone, PartialEq, Default)]
enum StatusParam {
    #[default]
    Unset,
    Attendance(Vec<AttendanceStatus>),
    Leave(Vec<LeaveStatus>),
    Disciplinary(Vec<CaseStatus>),
}

/// Validated report parameters, able to emit a filter for each record kind.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    report_type: ReportType,
    scope: CallerScope,
    pub date_range: Option<DateRange>,
    pub department: Option<String>,
    pub staff_id: Option<Uuid>,
    pub leave_type: Option<LeaveType>,
    pub infraction_type: Option<InfractionType>,
    pub period: ScorePeriod,
    status: StatusParam,
}

impl FilterBuilder {
    /// Validate `params` for `report_type`. Fails before any record is fetched
    /// on malformed values, missing mandatory parameters, or a staff target
    /// outside the caller's scope.
    pub fn new(
        report_type: ReportType,
        params: &ReportParams,
        scope: &CallerScope,
    ) -> Result<Self, ReportError> {
        let start = parse_date(report_type, "startDate", params.start_date.as_deref())?;
        let end = parse_date(report_type, "endDate", params.end_date.as_deref())?;

        let date_range = match (start, end) {
            (Some(start), Some(end)) if start > end => {
                return Err(ReportError::invalid(
                    report_type,
                    "endDate",
                    format!("end date {} is before start date {}", end, start),
                ));
            }
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            (Some(_), None) => {
                return Err(ReportError::invalid(
                    report_type,
                    "endDate",
                    "endDate is required when startDate is given",
                ));
            }
            (None, Some(_)) => {
                return Err(ReportError::invalid(
                    report_type,
                    "startDate",
                    "startDate is required when endDate is given",
                ));
            }
            (None, None) => None,
        };

        if date_range.is_none() && report_type.requires_date_range() {
            return Err(ReportError::invalid(
                report_type,
                "startDate",
                "a startDate and endDate are required for this report",
            ));
        }

        let staff_id = non_empty(params.staff_id.as_deref())
            .map(|raw| {
                raw.parse::<Uuid>().map_err(|_| {
                    ReportError::invalid(report_type, "staffId", format!("'{}' is not a valid id", raw))
                })
            })
            .transpose()?;

        if report_type == ReportType::PerStaff && staff_id.is_none() {
            return Err(ReportError::invalid(
                report_type,
                "staffId",
                "a staffId is required for this report",
            ));
        }

        if let Some(id) = staff_id {
            if !scope.permits(id) {
                return Err(ReportError::denied(
                    report_type,
                    format!("staff member {} is outside your reporting scope", id),
                ));
            }
        }

        let leave_type = parse_enum(report_type, "leaveType", params.leave_type.as_deref())?;
        let infraction_type =
            parse_enum(report_type, "infractionType", params.infraction_type.as_deref())?;
        let period = parse_enum(report_type, "period", params.period.as_deref())?.unwrap_or_default();

        let status = match (report_type, non_empty(params.status.as_deref())) {
            (_, None) => StatusParam::Unset,
            (ReportType::Attendance, Some(raw)) => {
                StatusParam::Attendance(parse_list(report_type, raw)?)
            }
            (ReportType::Leave, Some(raw)) => StatusParam::Leave(parse_list(report_type, raw)?),
            (ReportType::Disciplinary, Some(raw)) => {
                StatusParam::Disciplinary(parse_list(report_type, raw)?)
            }
            // Summary-style reports cover every status.
            (_, Some(_)) => StatusParam::Unset,
        };

        Ok(Self {
            report_type,
            scope: scope.clone(),
            date_range,
            department: non_empty(params.department.as_deref()).map(str::to_string),
            staff_id,
            leave_type,
            infraction_type,
            period,
            status,
        })
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn scope(&self) -> &CallerScope {
        &self.scope
    }

    /// First phase: turn staffId / department into a staff id selection.
    /// `staffId` takes precedence over `department`.
    pub async fn resolve_staff(&self, store: &dyn RecordStore) -> Result<StaffSelection, ReportError> {
        if let Some(id) = self.staff_id {
            return Ok(StaffSelection::only([id]));
        }
        match &self.department {
            Some(department) => {
                let ids = store
                    .resolve_staff_ids_by_department(department)
                    .await
                    .map_err(ReportError::fetch(self.report_type, "resolve department staff"))?;
                log::debug!(
                    "Department '{}' resolved to {} staff ids",
                    department,
                    ids.len()
                );
                Ok(StaffSelection::only(ids))
            }
            None => Ok(StaffSelection::Everyone),
        }
    }

    pub fn attendance_filter(&self, selection: &StaffSelection) -> RecordFilter {
        let statuses = match &self.status {
            StatusParam::Attendance(statuses) => statuses.clone(),
            _ => Vec::new(),
        };
        RecordFilter::attendance(statuses)
            .within(self.date_range)
            .for_selection(selection)
            .in_scope(&self.scope)
    }

    pub fn leave_filter(&self, selection: &StaffSelection) -> RecordFilter {
        let statuses = match &self.status {
            StatusParam::Leave(statuses) => statuses.clone(),
            _ => Vec::new(),
        };
        RecordFilter::leave(statuses, self.leave_type)
            .within(self.date_range)
            .for_selection(selection)
            .in_scope(&self.scope)
    }

    pub fn case_filter(&self, selection: &StaffSelection) -> RecordFilter {
        let statuses = match &self.status {
            StatusParam::Disciplinary(statuses) => statuses.clone(),
            _ => Vec::new(),
        };
        RecordFilter::disciplinary(statuses, self.infraction_type)
            .within(self.date_range)
            .for_selection(selection)
            .in_scope(&self.scope)
    }

    pub fn staff_filter(&self, selection: &StaffSelection) -> StaffFilter {
        StaffFilter {
            ids: selection.ids(),
            scope_ids: self.scope.staff_ids().cloned(),
            ..StaffFilter::default()
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(
    report_type: ReportType,
    parameter: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, ReportError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| {
            ReportError::invalid(
                report_type,
                parameter,
                format!("'{}' is not a date (expected YYYY-MM-DD)", raw),
            )
        })
}

fn parse_enum<T: std::str::FromStr<Err = String>>(
    report_type: ReportType,
    parameter: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, ReportError> {
    non_empty(raw)
        .map(|raw| raw.parse::<T>().map_err(|e| ReportError::invalid(report_type, parameter, e)))
        .transpose()
}

fn parse_list<T: std::str::FromStr<Err = String>>(
    report_type: ReportType,
    raw: &str,
) -> Result<Vec<T>, ReportError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| ReportError::invalid(report_type, "status", e)))
        .collect()
}
