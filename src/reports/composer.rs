//! Report composition: filter building, fetching, aggregation and assembly of
//! one [`Report`] per request.
//!
//! Independent reads within a request run concurrently and are joined before
//! assembly. Any failed read fails the whole report.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{
    AttendanceRecord, AttendanceStatus, CaseStatus, DisciplinaryCase, LeaveApplication,
    LeaveStatus, LeaveType, StaffProfile,
};
use crate::reports::aggregate::{
    accounted_for, cases_by_month, cases_by_type, department_rollup, leaves_by_month,
    leaves_by_type, rate, round2, summarize_attendance, summarize_cases, summarize_leaves, tally,
    DepartmentIndex, StatusCounts,
};
use crate::reports::error::ReportError;
use crate::reports::filter::{
    CallerScope, DateRange, FilterBuilder, RecordFilter, ReportParams, StaffFilter,
    StaffSelection,
};
use crate::reports::model::{
    AttendanceDetail, CaseDetail, DepartmentRow, Details, LeaveBalanceRow, LeaveDetail, Report,
    ReportPeriod, ReportType, StatBlock,
};
use crate::reports::performance::{evaluate, evaluate_all};
use crate::reports::policy::LeavePolicy;
use crate::reports::store::RecordStore;
use crate::reports::trend::{daily_attendance_trend, daily_window, monthly_leave_trend, monthly_window};

type Directory = HashMap<Uuid, StaffProfile>;

#[derive(Clone)]
pub struct ReportComposer {
    store: Arc<dyn RecordStore>,
    policy: Arc<LeavePolicy>,
    timeout: Option<Duration>,
}

impl ReportComposer {
    pub fn new(store: Arc<dyn RecordStore>, policy: LeavePolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
            timeout: None,
        }
    }

    /// Fail the whole composition when it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub async fn compose_report(
        &self,
        report_type: ReportType,
        params: &ReportParams,
        scope: &CallerScope,
    ) -> Result<Report, ReportError> {
        self.compose_report_at(report_type, params, scope, Utc::now())
            .await
    }

    /// Compose with an explicit "now", which anchors lookbacks, today's
    /// figures and the generation timestamp.
    pub async fn compose_report_at(
        &self,
        report_type: ReportType,
        params: &ReportParams,
        scope: &CallerScope,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let builder = FilterBuilder::new(report_type, params, scope).inspect_err(|e| {
            log::warn!("Rejected {} report request: {}", report_type, e);
        })?;

        log::info!(
            "Composing {} report ({})",
            report_type,
            match scope {
                CallerScope::Full => "full access".to_string(),
                CallerScope::Restricted(ids) => format!("restricted to {} staff", ids.len()),
            }
        );
        let started = Instant::now();

        let assembled = self.assemble(&builder, now);
        let report = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, assembled)
                .await
                .map_err(|_| ReportError::timed_out(report_type, limit))??,
            None => assembled.await?,
        };

        log::info!(
            "Composed {} report with {} records in {}ms",
            report_type,
            report.total_records,
            started.elapsed().as_millis()
        );
        Ok(report)
    }

    async fn assemble(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        match builder.report_type() {
            ReportType::Attendance => self.attendance_report(builder, now).await,
            ReportType::Leave => self.leave_report(builder, now).await,
            ReportType::Disciplinary => self.disciplinary_report(builder, now).await,
            ReportType::Performance => self.performance_report(builder, now).await,
            ReportType::Department => self.department_report(builder, now).await,
            ReportType::Dashboard => self.dashboard_report(builder, now).await,
            ReportType::PerStaff => self.per_staff_report(builder, now).await,
            ReportType::LeaveBalance => self.leave_balance_report(builder, now).await,
        }
    }

    async fn attendance(
        &self,
        report_type: ReportType,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceRecord>, ReportError> {
        self.store
            .fetch_attendance(filter)
            .await
            .map_err(ReportError::fetch(report_type, "fetch attendance records"))
    }

    async fn leaves(
        &self,
        report_type: ReportType,
        filter: &RecordFilter,
    ) -> Result<Vec<LeaveApplication>, ReportError> {
        self.store
            .fetch_leaves(filter)
            .await
            .map_err(ReportError::fetch(report_type, "fetch leave applications"))
    }

    async fn cases(
        &self,
        report_type: ReportType,
        filter: &RecordFilter,
    ) -> Result<Vec<DisciplinaryCase>, ReportError> {
        self.store
            .fetch_cases(filter)
            .await
            .map_err(ReportError::fetch(report_type, "fetch disciplinary cases"))
    }

    async fn staff(
        &self,
        report_type: ReportType,
        filter: &StaffFilter,
    ) -> Result<Vec<StaffProfile>, ReportError> {
        self.store
            .fetch_staff(filter)
            .await
            .map_err(ReportError::fetch(report_type, "fetch staff profiles"))
    }

    async fn count(
        &self,
        report_type: ReportType,
        filter: &RecordFilter,
    ) -> Result<i64, ReportError> {
        self.store
            .count(filter)
            .await
            .map_err(ReportError::fetch(report_type, "count records"))
    }

    /// Staff profiles for the given ids, keyed by id, for name and department joins.
    async fn directory(
        &self,
        report_type: ReportType,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<Directory, ReportError> {
        let ids: BTreeSet<Uuid> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(Directory::new());
        }
        let staff = self.staff(report_type, &StaffFilter::by_ids(ids)).await?;
        Ok(staff.into_iter().map(|s| (s.id, s)).collect())
    }

    async fn attendance_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let selection = builder.resolve_staff(self.store()).await?;
        let records = self
            .attendance(report_type, &builder.attendance_filter(&selection))
            .await?;
        let directory = self
            .directory(report_type, records.iter().map(|r| r.staff_id))
            .await?;

        let summary = summarize_attendance(&records);
        let rollup = department_rollup(
            &records,
            &DepartmentIndex::new(directory.values()),
            |r| r.staff_id,
            |r| r.status,
        );

        let mut details: Vec<AttendanceDetail> = records
            .iter()
            .map(|r| attendance_detail(r, &directory))
            .collect();
        details.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.staff_name.cmp(&b.staff_name)));

        Ok(Report::new(
            report_type,
            ReportPeriod::from_range(builder.date_range),
            Details::Attendance(details),
            now,
        )
        .with_block(StatBlock::statuses("Attendance status", &summary.statuses))
        .with_block(
            StatBlock::new("Attendance summary")
                .count("accounted for", summary.accounted_for)
                .decimal("attendance rate", summary.attendance_rate)
                .decimal("total hours worked", summary.total_hours_worked),
        )
        .with_block(department_totals("Records by department", &rollup)))
    }

    async fn leave_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let selection = builder.resolve_staff(self.store()).await?;
        let leaves = self
            .leaves(report_type, &builder.leave_filter(&selection))
            .await?;
        let directory = self
            .directory(report_type, leaves.iter().map(|l| l.staff_id))
            .await?;

        let summary = summarize_leaves(&leaves);
        let mut details: Vec<LeaveDetail> =
            leaves.iter().map(|l| leave_detail(l, &directory)).collect();
        details.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(Report::new(
            report_type,
            ReportPeriod::from_range(builder.date_range),
            Details::Leaves(details),
            now,
        )
        .with_block(StatBlock::statuses("Leave status", &summary.statuses))
        .with_block(
            StatBlock::new("Leave summary")
                .decimal("approval rate", summary.approval_rate)
                .count("total days", summary.total_days),
        )
        .with_block(StatBlock::categories("By leave type", &leaves_by_type(&leaves), true))
        .with_block(StatBlock::categories("By month", &leaves_by_month(&leaves), true)))
    }

    async fn disciplinary_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let selection = builder.resolve_staff(self.store()).await?;
        let cases = self
            .cases(report_type, &builder.case_filter(&selection))
            .await?;
        let directory = self
            .directory(report_type, cases.iter().map(|c| c.staff_id))
            .await?;

        let summary = summarize_cases(&cases);
        let mut details: Vec<CaseDetail> =
            cases.iter().map(|c| case_detail(c, &directory)).collect();
        details.sort_by(|a, b| b.date_of_infraction.cmp(&a.date_of_infraction));

        Ok(Report::new(
            report_type,
            ReportPeriod::from_range(builder.date_range),
            Details::Cases(details),
            now,
        )
        .with_block(StatBlock::statuses("Case status", &summary.statuses))
        .with_block(
            StatBlock::new("Case summary").decimal("resolution rate", summary.resolution_rate),
        )
        .with_block(StatBlock::categories("By infraction type", &cases_by_type(&cases), false))
        .with_block(StatBlock::categories("By month", &cases_by_month(&cases), false)))
    }

    async fn performance_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let selection = builder.resolve_staff(self.store()).await?;
        let window = builder.period.window(now);
        let scope = builder.scope();

        let staff_filter = StaffFilter {
            active_only: true,
            ..builder.staff_filter(&selection)
        };
        let attendance_filter = RecordFilter::attendance(vec![])
            .within(Some(window))
            .for_selection(&selection)
            .in_scope(scope);
        let leave_filter = RecordFilter::leave(vec![LeaveStatus::Approved], None)
            .within(Some(window))
            .for_selection(&selection)
            .in_scope(scope);
        let case_filter = RecordFilter::disciplinary(CaseStatus::UNRESOLVED.to_vec(), None)
            .within(Some(window))
            .for_selection(&selection)
            .in_scope(scope);

        let (staff, attendance, leaves, cases) = tokio::try_join!(
            self.staff(report_type, &staff_filter),
            self.attendance(report_type, &attendance_filter),
            self.leaves(report_type, &leave_filter),
            self.cases(report_type, &case_filter),
        )?;

        let scores = evaluate_all(&staff, &attendance, &leaves, &cases);
        let average = if scores.is_empty() {
            0.0
        } else {
            round2(scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64)
        };
        let highest = scores.first().map_or(0.0, |s| s.score);
        let lowest = scores.last().map_or(0.0, |s| s.score);

        let summary = StatBlock::new("Performance summary")
            .text("period", builder.period.as_str())
            .count("staff evaluated", scores.len() as i64)
            .decimal("average score", average)
            .decimal("highest score", highest)
            .decimal("lowest score", lowest);

        Ok(Report::new(
            report_type,
            lookback_period(builder, window),
            Details::Performance(scores),
            now,
        )
        .with_block(summary))
    }

    async fn department_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let selection = builder.resolve_staff(self.store()).await?;

        // One batched read per record kind, partitioned in memory below.
        let staff_filter = builder.staff_filter(&selection);
        let attendance_filter = builder.attendance_filter(&selection);
        let leave_filter = builder.leave_filter(&selection);
        let case_filter = builder.case_filter(&selection);
        let (staff, attendance, leaves, cases) = tokio::try_join!(
            self.staff(report_type, &staff_filter),
            self.attendance(report_type, &attendance_filter),
            self.leaves(report_type, &leave_filter),
            self.cases(report_type, &case_filter),
        )?;

        let index = DepartmentIndex::new(&staff);
        let attendance_by_dept = department_rollup(&attendance, &index, |r| r.staff_id, |r| r.status);
        let leaves_by_dept = department_rollup(&leaves, &index, |l| l.staff_id, |l| l.status);
        let cases_by_dept = department_rollup(&cases, &index, |c| c.staff_id, |c| c.status);

        let mut departments: BTreeSet<String> =
            staff.iter().map(|s| index.department_of(s.id)).collect();
        departments.extend(attendance_by_dept.keys().cloned());
        departments.extend(leaves_by_dept.keys().cloned());
        departments.extend(cases_by_dept.keys().cloned());

        let rows: Vec<DepartmentRow> = departments
            .into_iter()
            .map(|department| {
                let members: Vec<&StaffProfile> = staff
                    .iter()
                    .filter(|s| index.department_of(s.id) == department)
                    .collect();
                let attendance = attendance_by_dept
                    .get(&department)
                    .cloned()
                    .unwrap_or_else(|| tally::<AttendanceStatus>([]));
                DepartmentRow {
                    staff_count: members.len() as i64,
                    active_staff: members.iter().filter(|s| s.is_active).count() as i64,
                    attendance_rate: rate(accounted_for(&attendance), attendance.total),
                    attendance,
                    leaves: leaves_by_dept
                        .get(&department)
                        .cloned()
                        .unwrap_or_else(|| tally::<LeaveStatus>([])),
                    cases: cases_by_dept
                        .get(&department)
                        .cloned()
                        .unwrap_or_else(|| tally::<CaseStatus>([])),
                    department,
                }
            })
            .collect();

        let summary = StatBlock::new("Department summary")
            .count("departments", rows.len() as i64)
            .count("staff", staff.len() as i64)
            .count("active staff", staff.iter().filter(|s| s.is_active).count() as i64)
            .count("attendance records", attendance.len() as i64)
            .count("leave applications", leaves.len() as i64)
            .count("disciplinary cases", cases.len() as i64);

        Ok(Report::new(
            report_type,
            ReportPeriod::from_range(builder.date_range),
            Details::Departments(rows),
            now,
        )
        .with_block(summary)
        .with_block(department_totals("Attendance by department", &attendance_by_dept))
        .with_block(department_totals("Leave applications by department", &leaves_by_dept))
        .with_block(department_totals("Cases by department", &cases_by_dept)))
    }

    async fn dashboard_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let reference = builder.date_range.map_or(now.date_naive(), |r| r.end);
        let selection = builder.resolve_staff(self.store()).await?;
        let scope = builder.scope();

        let today_filter = RecordFilter::attendance(vec![])
            .within(Some(DateRange::new(reference, reference)))
            .for_selection(&selection)
            .in_scope(scope);
        let pending_filter = RecordFilter::leave(vec![LeaveStatus::Pending], None)
            .for_selection(&selection)
            .in_scope(scope);
        let open_cases_filter = RecordFilter::disciplinary(CaseStatus::UNRESOLVED.to_vec(), None)
            .for_selection(&selection)
            .in_scope(scope);
        let daily_filter = RecordFilter::attendance(vec![AttendanceStatus::Present])
            .within(Some(daily_window(reference)))
            .for_selection(&selection)
            .in_scope(scope);
        let monthly_filter = RecordFilter::leave(vec![], None)
            .within(Some(monthly_window(reference)))
            .for_selection(&selection)
            .in_scope(scope);

        let (headcount, today, pending_count, open_cases, pending, daily, monthly) = tokio::try_join!(
            self.headcount(report_type, builder, &selection),
            self.attendance(report_type, &today_filter),
            self.count(report_type, &pending_filter),
            self.count(report_type, &open_cases_filter),
            self.leaves(report_type, &pending_filter),
            self.attendance(report_type, &daily_filter),
            self.leaves(report_type, &monthly_filter),
        )?;

        let directory = self
            .directory(report_type, pending.iter().map(|l| l.staff_id))
            .await?;
        let mut details: Vec<LeaveDetail> =
            pending.iter().map(|l| leave_detail(l, &directory)).collect();
        details.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let summary = summarize_attendance(&today);
        let status = |s: AttendanceStatus| summary.statuses.get(s.as_str());

        Ok(Report::new(
            report_type,
            ReportPeriod::as_of(reference),
            Details::Leaves(details),
            now,
        )
        .with_block(
            StatBlock::new("Staff")
                .count("active staff", headcount)
                .count("marked today", summary.statuses.total)
                .count("not marked today", (headcount - summary.statuses.total).max(0)),
        )
        .with_block(
            StatBlock::new("Today")
                .count("present", status(AttendanceStatus::Present))
                .count("late", status(AttendanceStatus::Late))
                .count("absent", status(AttendanceStatus::Absent))
                .count("on leave", status(AttendanceStatus::Leave))
                .count("off duty", status(AttendanceStatus::OffDuty))
                .decimal("attendance rate", summary.attendance_rate),
        )
        .with_block(
            StatBlock::new("Pending actions")
                .count("pending leave applications", pending_count)
                .count("open disciplinary cases", open_cases),
        )
        .with_trend(daily_attendance_trend(reference, &daily, headcount))
        .with_trend(monthly_leave_trend(reference, &monthly)))
    }

    /// Active staff visible to the request: the store-wide count when nothing
    /// narrows the request, otherwise the size of the narrowed staff set.
    async fn headcount(
        &self,
        report_type: ReportType,
        builder: &FilterBuilder,
        selection: &StaffSelection,
    ) -> Result<i64, ReportError> {
        match (builder.scope(), selection) {
            (CallerScope::Full, StaffSelection::Everyone) => self
                .store
                .active_staff_count()
                .await
                .map_err(ReportError::fetch(report_type, "count active staff")),
            _ => {
                let filter = StaffFilter {
                    active_only: true,
                    ..builder.staff_filter(selection)
                };
                Ok(self.staff(report_type, &filter).await?.len() as i64)
            }
        }
    }

    async fn per_staff_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let Some(staff_id) = builder.staff_id else {
            return Err(ReportError::invalid(
                report_type,
                "staffId",
                "a staffId is required for this report",
            ));
        };
        let selection = StaffSelection::only([staff_id]);
        let window = builder.period.window(now);

        let window_attendance = RecordFilter::attendance(vec![])
            .within(Some(window))
            .for_selection(&selection);
        let window_leaves = RecordFilter::leave(vec![LeaveStatus::Approved], None)
            .within(Some(window))
            .for_selection(&selection);
        let window_cases = RecordFilter::disciplinary(CaseStatus::UNRESOLVED.to_vec(), None)
            .within(Some(window))
            .for_selection(&selection);

        let profile_filter = StaffFilter::by_ids([staff_id]);
        let attendance_filter = builder.attendance_filter(&selection);
        let leave_filter = builder.leave_filter(&selection);
        let case_filter = builder.case_filter(&selection);

        let (profile, attendance, leaves, cases, scored_attendance, scored_leaves, scored_cases) = tokio::try_join!(
            self.staff(report_type, &profile_filter),
            self.attendance(report_type, &attendance_filter),
            self.leaves(report_type, &leave_filter),
            self.cases(report_type, &case_filter),
            self.attendance(report_type, &window_attendance),
            self.leaves(report_type, &window_leaves),
            self.cases(report_type, &window_cases),
        )?;

        let Some(profile) = profile.into_iter().next() else {
            return Err(ReportError::invalid(
                report_type,
                "staffId",
                format!("no staff member with id {}", staff_id),
            ));
        };

        let performance = evaluate(
            &profile,
            &scored_attendance.iter().collect::<Vec<_>>(),
            &scored_leaves.iter().collect::<Vec<_>>(),
            &scored_cases.iter().collect::<Vec<_>>(),
        );
        let attendance_summary = summarize_attendance(&attendance);
        let leave_summary = summarize_leaves(&leaves);
        let case_summary = summarize_cases(&cases);

        let directory = Directory::from([(profile.id, profile.clone())]);
        let mut details: Vec<AttendanceDetail> = attendance
            .iter()
            .map(|r| attendance_detail(r, &directory))
            .collect();
        details.sort_by(|a, b| a.date.cmp(&b.date));

        let balances = LeaveType::ALL.iter().fold(StatBlock::new("Leave balance"), |block, t| {
            block.count(
                format!("{} remaining", t),
                self.policy.balance_for(&profile, *t).remaining,
            )
        });

        Ok(Report::new(
            report_type,
            ReportPeriod::from_range(builder.date_range),
            Details::Attendance(details),
            now,
        )
        .with_block(
            StatBlock::new("Profile")
                .text("name", profile.full_name())
                .text("staff number", profile.staff_number.clone().unwrap_or_else(|| "N/A".to_string()))
                .text("department", profile.department.clone().unwrap_or_else(|| "N/A".to_string()))
                .text("role", profile.role.as_str())
                .text("active", if profile.is_active { "yes" } else { "no" }),
        )
        .with_block(StatBlock::statuses("Attendance status", &attendance_summary.statuses))
        .with_block(
            StatBlock::new("Attendance summary")
                .count("accounted for", attendance_summary.accounted_for)
                .decimal("attendance rate", attendance_summary.attendance_rate)
                .decimal("total hours worked", attendance_summary.total_hours_worked),
        )
        .with_block(StatBlock::statuses("Leave status", &leave_summary.statuses))
        .with_block(
            StatBlock::new("Leave summary")
                .decimal("approval rate", leave_summary.approval_rate)
                .count("total days", leave_summary.total_days),
        )
        .with_block(StatBlock::statuses("Case status", &case_summary.statuses))
        .with_block(
            StatBlock::new("Performance")
                .text("period", builder.period.as_str())
                .decimal("attendance rate", performance.attendance_rate)
                .count("approved leave applications", performance.leave_applications)
                .count("open cases", performance.open_cases)
                .decimal("leave penalty", performance.leave_penalty)
                .decimal("disciplinary penalty", performance.disciplinary_penalty)
                .decimal("score", performance.score),
        )
        .with_block(balances))
    }

    async fn leave_balance_report(
        &self,
        builder: &FilterBuilder,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let report_type = builder.report_type();
        let selection = builder.resolve_staff(self.store()).await?;
        let filter = StaffFilter {
            active_only: true,
            ..builder.staff_filter(&selection)
        };
        let mut staff = self.staff(report_type, &filter).await?;
        staff.sort_by_key(|s| s.full_name());

        let leave_types: Vec<LeaveType> = match builder.leave_type {
            Some(leave_type) => vec![leave_type],
            None => LeaveType::ALL.to_vec(),
        };

        let rows: Vec<LeaveBalanceRow> = staff
            .iter()
            .flat_map(|member| {
                leave_types.iter().map(move |t| {
                    let balance = self.policy.balance_for(member, *t);
                    LeaveBalanceRow {
                        staff_id: member.id,
                        staff_name: member.full_name(),
                        department: member.department.clone(),
                        leave_type: *t,
                        total: balance.total,
                        taken: balance.taken,
                        remaining: balance.remaining,
                    }
                })
            })
            .collect();

        let totals = leave_types.iter().fold(
            StatBlock::new("Leave balance summary")
                .count("staff", staff.len() as i64)
                .text("policy version", self.policy.version.clone()),
            |block, t| {
                let (taken, remaining) = rows
                    .iter()
                    .filter(|r| r.leave_type == *t)
                    .fold((0, 0), |(taken, remaining), r| (taken + r.taken, remaining + r.remaining));
                block
                    .count(format!("{} taken", t), taken)
                    .count(format!("{} remaining", t), remaining)
            },
        );

        Ok(Report::new(
            report_type,
            ReportPeriod::as_of(now.date_naive()),
            Details::Balances(rows),
            now,
        )
        .with_block(totals))
    }
}

fn lookback_period(builder: &FilterBuilder, window: DateRange) -> ReportPeriod {
    ReportPeriod {
        start: Some(window.start),
        end: Some(window.end),
        label: format!(
            "Last {} ({} to {})",
            builder.period, window.start, window.end
        ),
    }
}

fn department_totals(
    name: &str,
    rollup: &BTreeMap<String, StatusCounts>,
) -> StatBlock {
    rollup
        .iter()
        .fold(StatBlock::new(name), |block, (department, counts)| {
            block.count(department.clone(), counts.total)
        })
}

fn staff_fields(staff_id: Uuid, directory: &Directory) -> (Option<String>, Option<String>) {
    let staff = directory.get(&staff_id);
    (
        staff.map(StaffProfile::full_name),
        staff.and_then(|s| s.department.clone()),
    )
}

fn attendance_detail(record: &AttendanceRecord, directory: &Directory) -> AttendanceDetail {
    let (staff_name, department) = staff_fields(record.staff_id, directory);
    AttendanceDetail {
        staff_id: record.staff_id,
        staff_name,
        department,
        date: record.date,
        status: record.status,
        check_in_time: record.check_in_time,
        check_out_time: record.check_out_time,
        hours_worked: record.hours_worked(),
        remarks: record.remarks.clone(),
    }
}

fn leave_detail(leave: &LeaveApplication, directory: &Directory) -> LeaveDetail {
    let (staff_name, department) = staff_fields(leave.staff_id, directory);
    LeaveDetail {
        id: leave.id,
        staff_id: leave.staff_id,
        staff_name,
        department,
        leave_type: leave.leave_type,
        start_date: leave.start_date,
        end_date: leave.end_date,
        number_of_days: leave.number_of_days,
        status: leave.status,
        rejection_reason: leave.rejection_reason.clone(),
        created_at: leave.created_at,
    }
}

fn case_detail(case: &DisciplinaryCase, directory: &Directory) -> CaseDetail {
    let (staff_name, department) = staff_fields(case.staff_id, directory);
    CaseDetail {
        id: case.id,
        staff_id: case.staff_id,
        staff_name,
        department,
        infraction_type: case.infraction_type,
        status: case.status,
        date_of_infraction: case.date_of_infraction,
        sanction: case.sanction.clone(),
        created_at: case.created_at,
    }
}
