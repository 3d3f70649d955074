use std::collections::BTreeMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::Value;

use staffops::database::memory::MemoryStore;
use staffops::database::models::LeaveType;
use staffops::reports::model::{Details, StatValue};
use staffops::reports::render::Workbook;
use staffops::reports::store::EntityKind;
use staffops::reports::{
    CallerScope, OutputFormat, RenderedOutput, Renderer, ReportError, ReportParams, ReportType,
};

mod common;
use common::Roster;

fn range(start: &str, end: &str) -> ReportParams {
    ReportParams {
        start_date: Some(start.to_string()),
        end_date: Some(end.to_string()),
        ..ReportParams::default()
    }
}

fn count(value: Option<&StatValue>) -> i64 {
    match value {
        Some(StatValue::Count(n)) => *n,
        other => panic!("expected a count, got {:?}", other),
    }
}

fn decimal(value: Option<&StatValue>) -> f64 {
    match value {
        Some(StatValue::Decimal(v)) => *v,
        other => panic!("expected a decimal, got {:?}", other),
    }
}

#[tokio::test]
async fn attendance_report_summarizes_every_status() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());

    let report = composer
        .compose_report_at(
            ReportType::Attendance,
            &range("2024-03-11", "2024-03-15"),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_records, 12);
    assert_eq!(report.period.label, "2024-03-11 to 2024-03-15");
    assert_eq!(count(report.statistic("Attendance status", "total")), 12);
    assert_eq!(count(report.statistic("Attendance status", "present")), 5);
    assert_eq!(count(report.statistic("Attendance status", "absent")), 3);
    assert_eq!(count(report.statistic("Attendance status", "unspecified")), 1);
    assert_eq!(count(report.statistic("Attendance summary", "accounted for")), 8);
    assert_eq!(decimal(report.statistic("Attendance summary", "attendance rate")), 66.67);
    // Five present shifts of 8.5 hours each.
    assert_eq!(decimal(report.statistic("Attendance summary", "total hours worked")), 42.5);
    assert_eq!(count(report.statistic("Records by department", "Nursing")), 6);
    assert_eq!(count(report.statistic("Records by department", "unspecified")), 1);

    let Details::Attendance(rows) = &report.details else {
        panic!("expected attendance rows");
    };
    assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    assert!(rows.iter().all(|r| r.staff_name.is_some()));
}

#[tokio::test]
async fn missing_date_range_fails_before_any_fetch() {
    let roster = Roster::new();
    let store = std::sync::Arc::new(roster.store());
    let composer = staffops::reports::ReportComposer::new(
        store.clone(),
        staffops::reports::LeavePolicy::default(),
    );

    for report_type in [ReportType::Attendance, ReportType::Leave, ReportType::Disciplinary] {
        let err = composer
            .compose_report(report_type, &ReportParams::default(), &CallerScope::Full)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidParameter { parameter: "startDate", .. }
        ));
    }
    assert_eq!(store.fetch_calls(), 0);
}

#[tokio::test]
async fn restricted_caller_cannot_target_other_staff() {
    let roster = Roster::new();
    let store = std::sync::Arc::new(roster.store());
    let composer = staffops::reports::ReportComposer::new(
        store.clone(),
        staffops::reports::LeavePolicy::default(),
    );
    let params = ReportParams {
        staff_id: Some(roster.porter.id.to_string()),
        ..ReportParams::default()
    };

    let err = composer
        .compose_report(
            ReportType::PerStaff,
            &params,
            &CallerScope::restricted([roster.nurse.id]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::AccessDenied { .. }));
    assert_eq!(store.fetch_calls(), 0);
}

#[tokio::test]
async fn restricted_scope_narrows_records() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());
    let scope = CallerScope::restricted([roster.supervisor.id, roster.nurse.id]);

    let report = composer
        .compose_report_at(
            ReportType::Attendance,
            &range("2024-03-11", "2024-03-15"),
            &scope,
            common::now(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_records, 6);
}

#[tokio::test]
async fn department_rollups_partition_the_totals() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());

    let report = composer
        .compose_report_at(
            ReportType::Department,
            &range("2024-03-01", "2024-03-31"),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap();

    let Details::Departments(rows) = &report.details else {
        panic!("expected department rows");
    };
    let by_name: BTreeMap<&str, _> = rows.iter().map(|r| (r.department.as_str(), r)).collect();
    assert_eq!(by_name.keys().copied().collect::<Vec<_>>(), vec!["Nursing", "Portering", "unspecified"]);

    let nursing = by_name["Nursing"];
    assert_eq!(nursing.staff_count, 2);
    assert_eq!(nursing.active_staff, 2);
    assert_eq!(nursing.attendance.total, 6);
    assert_eq!(nursing.attendance_rate, 83.33);
    assert_eq!(nursing.leaves.get("pending"), 1);
    assert_eq!(nursing.cases.get("under-review"), 1);

    let portering = by_name["Portering"];
    assert_eq!(portering.staff_count, 2);
    assert_eq!(portering.active_staff, 1);
    assert_eq!(portering.cases.get("open"), 1);

    let attendance_total: i64 = rows.iter().map(|r| r.attendance.total).sum();
    let leave_total: i64 = rows.iter().map(|r| r.leaves.total).sum();
    let case_total: i64 = rows.iter().map(|r| r.cases.total).sum();
    assert_eq!(attendance_total, count(report.statistic("Department summary", "attendance records")));
    assert_eq!(leave_total, count(report.statistic("Department summary", "leave applications")));
    assert_eq!(case_total, count(report.statistic("Department summary", "disciplinary cases")));
}

#[tokio::test]
async fn department_parameter_limits_rollup_to_that_department() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());
    let params = ReportParams {
        department: Some("Nursing".to_string()),
        ..range("2024-03-01", "2024-03-31")
    };

    let report = composer
        .compose_report_at(ReportType::Department, &params, &CallerScope::Full, common::now())
        .await
        .unwrap();

    let Details::Departments(rows) = &report.details else {
        panic!("expected department rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].department, "Nursing");
    assert_eq!(rows[0].attendance.total, 6);
}

#[tokio::test]
async fn dashboard_reads_trends_and_pending_work() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());

    let report = composer
        .compose_report_at(
            ReportType::Dashboard,
            &ReportParams::default(),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap();

    assert_eq!(report.period.label, "As of 2024-03-15");
    assert_eq!(count(report.statistic("Staff", "active staff")), 4);
    assert_eq!(count(report.statistic("Staff", "marked today")), 3);
    assert_eq!(count(report.statistic("Staff", "not marked today")), 1);
    assert_eq!(count(report.statistic("Today", "present")), 2);
    assert_eq!(count(report.statistic("Today", "absent")), 1);
    assert_eq!(count(report.statistic("Pending actions", "pending leave applications")), 1);
    assert_eq!(count(report.statistic("Pending actions", "open disciplinary cases")), 2);

    assert_eq!(report.trends.len(), 2);
    let daily: Vec<i64> = report.trends[0].points.iter().map(|p| p.count).collect();
    assert_eq!(daily, vec![0, 0, 2, 1, 0, 0, 2]);
    assert_eq!(report.trends[0].points[6].rate, Some(50.0));

    let monthly: Vec<(String, i64)> = report.trends[1]
        .points
        .iter()
        .map(|p| (p.label.clone(), p.count))
        .collect();
    assert_eq!(
        monthly,
        vec![
            ("Oct 2023".to_string(), 0),
            ("Nov 2023".to_string(), 0),
            ("Dec 2023".to_string(), 0),
            ("Jan 2024".to_string(), 1),
            ("Feb 2024".to_string(), 1),
            ("Mar 2024".to_string(), 2),
        ]
    );

    assert_eq!(report.total_records, 1);
}

#[tokio::test]
async fn performance_scores_follow_the_weights() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());

    let report = composer
        .compose_report_at(
            ReportType::Performance,
            &ReportParams::default(),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap();

    let Details::Performance(scores) = &report.details else {
        panic!("expected performance rows");
    };
    // The inactive porter is not evaluated.
    assert_eq!(scores.len(), 4);
    assert!(scores.iter().all(|s| s.staff_id != roster.former.id));

    assert_eq!(scores[0].staff_id, roster.supervisor.id);
    assert_eq!(scores[0].score, 60.0);
    assert_eq!(scores[1].staff_id, roster.nurse.id);
    assert_eq!(scores[1].attendance_rate, 60.0);
    assert_eq!(scores[1].open_cases, 1);
    assert_eq!(scores[1].score, 26.0);

    let porter = scores.iter().find(|s| s.staff_id == roster.porter.id).unwrap();
    assert_eq!(porter.leave_applications, 1);
    assert_eq!(porter.open_cases, 1);
    assert_eq!(porter.score, 0.0);

    assert_eq!(decimal(report.statistic("Performance summary", "average score")), 21.5);
    assert_eq!(count(report.statistic("Performance summary", "staff evaluated")), 4);
}

#[tokio::test]
async fn per_staff_report_combines_every_record_kind() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());
    let params = ReportParams {
        staff_id: Some(roster.nurse.id.to_string()),
        period: Some("week".to_string()),
        ..ReportParams::default()
    };

    let report = composer
        .compose_report_at(ReportType::PerStaff, &params, &CallerScope::Full, common::now())
        .await
        .unwrap();

    assert_eq!(report.total_records, 5);
    assert_eq!(
        report.statistic("Profile", "department"),
        Some(&StatValue::Text("Nursing".to_string()))
    );
    assert_eq!(count(report.statistic("Leave status", "total")), 2);
    assert_eq!(count(report.statistic("Case status", "under-review")), 1);
    assert_eq!(decimal(report.statistic("Performance", "score")), 26.0);
    assert_eq!(count(report.statistic("Leave balance", "annual remaining")), 18);
    assert_eq!(count(report.statistic("Leave balance", "sick remaining")), 10);
}

#[tokio::test]
async fn unknown_staff_member_is_an_invalid_parameter() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());
    let params = ReportParams {
        staff_id: Some(uuid::Uuid::new_v4().to_string()),
        ..ReportParams::default()
    };

    let err = composer
        .compose_report_at(ReportType::PerStaff, &params, &CallerScope::Full, common::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidParameter { parameter: "staffId", .. }));
}

#[tokio::test]
async fn leave_balances_fall_back_to_policy() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());
    let params = ReportParams {
        leave_type: Some("annual".to_string()),
        ..ReportParams::default()
    };

    let report = composer
        .compose_report_at(ReportType::LeaveBalance, &params, &CallerScope::Full, common::now())
        .await
        .unwrap();

    let Details::Balances(rows) = &report.details else {
        panic!("expected balance rows");
    };
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.leave_type == LeaveType::Annual));

    let nurse = rows.iter().find(|r| r.staff_id == roster.nurse.id).unwrap();
    assert_eq!((nurse.total, nurse.taken, nurse.remaining), (21, 3, 18));
    let porter = rows.iter().find(|r| r.staff_id == roster.porter.id).unwrap();
    assert_eq!((porter.total, porter.taken, porter.remaining), (21, 0, 21));
}

#[tokio::test]
async fn failed_read_fails_the_whole_report() {
    let roster = Roster::new();
    let composer = common::composer(roster.store().failing_on(EntityKind::Disciplinary));

    let err = composer
        .compose_report_at(
            ReportType::Department,
            &range("2024-03-01", "2024-03-31"),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap_err();

    match err {
        ReportError::UpstreamFetch {
            report_type,
            operation,
            ..
        } => {
            assert_eq!(report_type, ReportType::Department);
            assert_eq!(operation, "fetch disciplinary cases");
        }
        other => panic!("expected an upstream failure, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_store_times_out_as_upstream_failure() {
    let roster = Roster::new();
    let composer = common::composer(roster.store().with_delay(Duration::from_millis(250)))
        .with_timeout(Some(Duration::from_millis(20)));

    let err = composer
        .compose_report_at(
            ReportType::Dashboard,
            &ReportParams::default(),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReportError::UpstreamFetch { ref operation, .. } if operation == "compose (timed out)"
    ));
}

#[tokio::test]
async fn empty_store_produces_zeroes_not_errors() {
    let composer = common::composer(MemoryStore::default());

    let report = composer
        .compose_report_at(
            ReportType::Leave,
            &range("2024-01-01", "2024-12-31"),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_records, 0);
    assert_eq!(decimal(report.statistic("Leave summary", "approval rate")), 0.0);
    assert_eq!(count(report.statistic("Leave status", "pending")), 0);
}

#[tokio::test]
async fn structured_and_spreadsheet_outputs_agree() {
    let roster = Roster::new();
    let composer = common::composer(roster.store());
    let report = composer
        .compose_report_at(
            ReportType::Leave,
            &range("2023-01-01", "2024-03-31"),
            &CallerScope::Full,
            common::now(),
        )
        .await
        .unwrap();
    let renderer = Renderer::default();

    let RenderedOutput::Structured(value) = renderer.render(&report, OutputFormat::Structured).unwrap() else {
        panic!("expected structured output");
    };
    let RenderedOutput::File(file) = renderer.render(&report, OutputFormat::Spreadsheet).unwrap() else {
        panic!("expected a spreadsheet");
    };
    assert_eq!(file.content_type, "text/csv");

    let workbook = Workbook::from_csv(&file.bytes).unwrap();
    let summary: BTreeMap<String, String> = workbook
        .sheet("Summary")
        .unwrap()
        .rows
        .iter()
        .map(|row| (row[0].clone(), row[1].clone()))
        .collect();

    let mut compared = 0;
    for block in value["statistics"].as_array().unwrap() {
        let name = block["name"].as_str().unwrap();
        for stat in block["stats"].as_array().unwrap() {
            let key = format!("{}: {}", name, stat["metric"].as_str().unwrap());
            let cell = &summary[&key];
            match &stat["value"] {
                Value::Number(n) => {
                    let parsed: f64 = cell.parse().unwrap();
                    assert!((n.as_f64().unwrap() - parsed).abs() < 0.005, "{} differs", key);
                }
                Value::String(s) => assert_eq!(s, cell),
                other => panic!("unexpected statistic value {:?}", other),
            }
            compared += 1;
        }
    }
    assert_eq!(compared, summary.len());

    let primary = workbook.sheet("Leave Report").unwrap();
    assert_eq!(primary.rows.len() as u64, value["totalRecords"].as_u64().unwrap());
}
