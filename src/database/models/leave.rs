use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub leave_type: Option<LeaveType>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: i64,
    pub status: Option<LeaveStatus>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl LeaveApplication {
    pub fn new(
        staff_id: Uuid,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: LeaveStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            leave_type: Some(leave_type),
            start_date,
            end_date,
            number_of_days: inclusive_day_count(start_date, end_date),
            status: Some(status),
            rejection_reason: None,
            approved_by: None,
            created_at,
        }
    }
}

/// Inclusive number of calendar days in `start..=end`; zero when the range is inverted.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum LeaveType {
        Annual => "annual",
        Maternity => "maternity",
        Paternity => "paternity",
        Sick => "sick",
        Compassionate => "compassionate",
        Study => "study",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}
