use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// One staff member's attendance for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub date: NaiveDate,
    /// `None` when the stored value is missing or not a known status
    pub status: Option<AttendanceStatus>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub marked_by: Option<Uuid>,
}

impl AttendanceRecord {
    pub fn new(staff_id: Uuid, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            date,
            status: Some(status),
            check_in_time: None,
            check_out_time: None,
            remarks: None,
            marked_by: None,
        }
    }

    /// Hours between check-in and check-out, only when both are recorded.
    pub fn hours_worked(&self) -> Option<f64> {
        let (check_in, check_out) = (self.check_in_time?, self.check_out_time?);
        let seconds = (check_out - check_in).num_seconds();
        if seconds < 0 {
            return None;
        }
        Some((seconds as f64 / 3600.0 * 100.0).round() / 100.0)
    }

    pub fn is_accounted_for(&self) -> bool {
        self.status.is_some_and(|s| s.is_accounted_for())
    }

    pub fn is_present(&self) -> bool {
        self.status == Some(AttendanceStatus::Present)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Leave => "leave",
        OffDuty => "off-duty",
        Late => "late",
    }
}

impl AttendanceStatus {
    /// Days counted toward the attendance rate numerator. Scheduled leave and
    /// off-duty days count as accounted for.
    pub fn is_accounted_for(&self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}
