#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

use staffops::database::memory::MemoryStore;
use staffops::database::models::*;
use staffops::reports::{LeavePolicy, ReportComposer, Renderer};
use staffops::services::Claims;
use staffops::{AppState, Config};

pub const TEST_SECRET: &str = "test-jwt-secret-key-that-is-long-enough";

/// Fixed "now" for composer scenarios: Friday 15 March 2024, midday.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Staff member with a generated name.
pub fn staff(department: Option<&str>) -> StaffProfile {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    StaffProfile::new(&first, &last, department)
}

pub fn shift(staff_id: uuid::Uuid, day: u32, status: AttendanceStatus) -> AttendanceRecord {
    let mut record = AttendanceRecord::new(staff_id, date(2024, 3, day), status);
    if status == AttendanceStatus::Present {
        record.check_in_time = Some(at(2024, 3, day, 8, 0));
        record.check_out_time = Some(at(2024, 3, day, 16, 30));
    }
    record
}

/// A small ward with two departments, one inactive member and one member
/// with no department.
pub struct Roster {
    pub supervisor: StaffProfile,
    pub nurse: StaffProfile,
    pub porter: StaffProfile,
    pub former: StaffProfile,
    pub floater: StaffProfile,
}

impl Roster {
    pub fn new() -> Self {
        let mut supervisor = staff(Some("Nursing"));
        supervisor.role = StaffRole::Supervisor;

        let mut nurse = staff(Some("Nursing"));
        nurse.supervisor_id = Some(supervisor.id);
        nurse
            .leave_balances
            .insert(LeaveType::Annual, LeaveBalance::new(21, 3));

        let porter = staff(Some("Portering"));

        let mut former = staff(Some("Portering"));
        former.is_active = false;

        let floater = staff(None);

        Self {
            supervisor,
            nurse,
            porter,
            former,
            floater,
        }
    }

    pub fn all(&self) -> Vec<StaffProfile> {
        vec![
            self.supervisor.clone(),
            self.nurse.clone(),
            self.porter.clone(),
            self.former.clone(),
            self.floater.clone(),
        ]
    }

    /// Twelve attendance records for 11-15 March 2024.
    pub fn attendance(&self) -> Vec<AttendanceRecord> {
        use AttendanceStatus::*;
        let (nurse, porter) = (self.nurse.id, self.porter.id);
        let mut unmarked = AttendanceRecord::new(self.floater.id, date(2024, 3, 14), Present);
        unmarked.status = None;

        vec![
            shift(nurse, 11, Present),
            shift(nurse, 12, Present),
            shift(nurse, 13, Late),
            shift(nurse, 14, Absent),
            shift(nurse, 15, Present),
            shift(porter, 11, Present),
            shift(porter, 12, Leave),
            shift(porter, 13, OffDuty),
            shift(porter, 14, Absent),
            shift(porter, 15, Absent),
            shift(self.supervisor.id, 15, Present),
            unmarked,
        ]
    }

    pub fn leaves(&self) -> Vec<LeaveApplication> {
        use LeaveStatus::*;
        use LeaveType::*;
        vec![
            LeaveApplication::new(self.nurse.id, Annual, date(2024, 3, 18), date(2024, 3, 22), Pending, at(2024, 3, 10, 9, 0)),
            LeaveApplication::new(self.porter.id, Sick, date(2024, 3, 12), date(2024, 3, 12), Approved, at(2024, 3, 12, 7, 0)),
            LeaveApplication::new(self.nurse.id, Annual, date(2024, 1, 8), date(2024, 1, 10), Approved, at(2024, 1, 2, 10, 0)),
            LeaveApplication::new(self.floater.id, Study, date(2024, 2, 5), date(2024, 2, 6), Rejected, at(2024, 2, 1, 14, 0)),
            LeaveApplication::new(self.supervisor.id, Annual, date(2023, 8, 14), date(2023, 8, 18), Approved, at(2023, 8, 1, 9, 0)),
        ]
    }

    pub fn cases(&self) -> Vec<DisciplinaryCase> {
        vec![
            DisciplinaryCase::new(self.porter.id, InfractionType::Major, CaseStatus::Open, date(2024, 3, 5), at(2024, 3, 6, 9, 0)),
            DisciplinaryCase::new(self.porter.id, InfractionType::Minor, CaseStatus::Resolved, date(2024, 2, 10), at(2024, 2, 11, 9, 0)),
            DisciplinaryCase::new(self.nurse.id, InfractionType::Minor, CaseStatus::UnderReview, date(2024, 3, 13), at(2024, 3, 13, 15, 0)),
        ]
    }

    pub fn store(&self) -> MemoryStore {
        MemoryStore::default()
            .with_staff(self.all())
            .with_attendance(self.attendance())
            .with_leaves(self.leaves())
            .with_cases(self.cases())
    }
}

pub fn composer(store: MemoryStore) -> ReportComposer {
    ReportComposer::new(Arc::new(store), LeavePolicy::default())
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://@localhost:5432/staffops_test".to_string(),
        database_max_connections: 1,
        jwt_secret: TEST_SECRET.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        report_timeout_secs: 5,
        report_rows_per_page: 25,
        leave_policy: LeavePolicy::default(),
    }
}

pub fn app_data(store: MemoryStore) -> (web::Data<AppState>, web::Data<Config>) {
    let config = test_config();
    let composer = composer(store).with_timeout(config.report_timeout());
    let state = AppState::new(composer, Renderer::new(config.report_rows_per_page));
    (web::Data::new(state), web::Data::new(config))
}

pub fn token_for(staff: &StaffProfile, role: StaffRole) -> String {
    Claims::new(staff.id, &staff.email, role, Duration::hours(1))
        .encode(TEST_SECRET)
        .unwrap()
}

/// Create authorization header for requests
pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
