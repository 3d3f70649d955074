use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::leave::LeaveType;
use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub id: Uuid,
    pub staff_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: StaffRole,
    pub is_active: bool,
    #[serde(default)]
    pub leave_balances: BTreeMap<LeaveType, LeaveBalance>,
    pub supervisor_id: Option<Uuid>,
}

impl StaffProfile {
    pub fn new(first_name: &str, last_name: &str, department: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_number: None,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!(
                "{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase()
            ),
            department: department.map(str::to_string),
            role: StaffRole::Staff,
            is_active: true,
            leave_balances: BTreeMap::new(),
            supervisor_id: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", from = "StoredBalance")]
pub struct LeaveBalance {
    pub total: i64,
    pub taken: i64,
    pub remaining: i64,
}

impl LeaveBalance {
    pub fn new(total: i64, taken: i64) -> Self {
        Self {
            total,
            taken,
            remaining: total - taken,
        }
    }
}

/// Balance as stored. Missing figures count as zero and a missing
/// `remaining` is derived from the other two.
#[derive(Deserialize)]
struct StoredBalance {
    #[serde(default)]
    total: i64,
    #[serde(default)]
    taken: i64,
    remaining: Option<i64>,
}

impl From<StoredBalance> for LeaveBalance {
    fn from(stored: StoredBalance) -> Self {
        Self {
            remaining: stored.remaining.unwrap_or(stored.total - stored.taken),
            ..Self::new(stored.total, stored.taken)
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum StaffRole {
        #[default]
        Staff => "staff",
        Supervisor => "supervisor",
        Hr => "hr",
        Admin => "admin",
    }
}

impl StaffRole {
    /// Roles that may report on every staff member.
    pub fn has_full_access(&self) -> bool {
        matches!(self, StaffRole::Hr | StaffRole::Admin)
    }
}
