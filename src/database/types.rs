use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::models::{
    AttendanceRecord, DisciplinaryCase, LeaveApplication, LeaveBalance, LeaveType, StaffProfile,
};

// Database row types; status and category columns are plain text so unknown
// values decode as `None` instead of failing the whole fetch.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub status: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub marked_by: Option<Uuid>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaveRow {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub leave_type: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: i32,
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CaseRow {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub infraction_type: Option<String>,
    pub status: Option<String>,
    pub date_of_infraction: NaiveDate,
    pub sanction: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffRow {
    pub id: Uuid,
    pub staff_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub leave_balances: Option<Json<BTreeMap<String, LeaveBalance>>>,
    pub supervisor_id: Option<Uuid>,
}

// Conversion functions
impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: row.id,
            staff_id: row.staff_id,
            date: row.date,
            status: row.status.and_then(|s| s.parse().ok()),
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            remarks: row.remarks,
            marked_by: row.marked_by,
        }
    }
}

impl From<LeaveRow> for LeaveApplication {
    fn from(row: LeaveRow) -> Self {
        Self {
            id: row.id,
            staff_id: row.staff_id,
            leave_type: row.leave_type.and_then(|s| s.parse().ok()),
            start_date: row.start_date,
            end_date: row.end_date,
            number_of_days: i64::from(row.number_of_days),
            status: row.status.and_then(|s| s.parse().ok()),
            rejection_reason: row.rejection_reason,
            approved_by: row.approved_by,
            created_at: row.created_at,
        }
    }
}

impl From<CaseRow> for DisciplinaryCase {
    fn from(row: CaseRow) -> Self {
        Self {
            id: row.id,
            staff_id: row.staff_id,
            infraction_type: row.infraction_type.and_then(|s| s.parse().ok()),
            status: row.status.and_then(|s| s.parse().ok()),
            date_of_infraction: row.date_of_infraction,
            sanction: row.sanction,
            created_at: row.created_at,
        }
    }
}

impl From<StaffRow> for StaffProfile {
    fn from(row: StaffRow) -> Self {
        let leave_balances = row
            .leave_balances
            .map(|Json(balances)| {
                balances
                    .into_iter()
                    .filter_map(|(key, balance)| {
                        key.parse::<LeaveType>().ok().map(|t| (t, balance))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: row.id,
            staff_number: row.staff_number,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            department: row.department,
            role: row.role.parse().unwrap_or_default(),
            is_active: row.is_active,
            leave_balances,
            supervisor_id: row.supervisor_id,
        }
    }
}
