use std::collections::BTreeMap;

use crate::database::models::{LeaveBalance, LeaveType, StaffProfile};

/// Annual leave entitlement table, in days per leave type. Passed explicitly to
/// whatever needs entitlement defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct LeavePolicy {
    pub version: String,
    entitlements: BTreeMap<LeaveType, i64>,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            version: "2024.1".to_string(),
            entitlements: BTreeMap::from([
                (LeaveType::Annual, 21),
                (LeaveType::Maternity, 90),
                (LeaveType::Paternity, 14),
                (LeaveType::Sick, 10),
                (LeaveType::Compassionate, 5),
                (LeaveType::Study, 10),
            ]),
        }
    }
}

impl LeavePolicy {
    /// Default table with `LEAVE_ENTITLEMENT_<TYPE>` overrides read through `lookup`.
    /// Values that do not parse as a non-negative integer are ignored.
    pub fn with_overrides(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut policy = Self::default();
        for leave_type in LeaveType::ALL {
            let key = format!(
                "LEAVE_ENTITLEMENT_{}",
                leave_type.as_str().to_uppercase()
            );
            match lookup(&key).map(|v| v.trim().parse::<i64>()) {
                Some(Ok(days)) if days >= 0 => {
                    policy.entitlements.insert(*leave_type, days);
                }
                Some(_) => log::warn!("Ignoring invalid value for {}", key),
                None => {}
            }
        }
        policy
    }

    pub fn entitlement(&self, leave_type: LeaveType) -> i64 {
        self.entitlements.get(&leave_type).copied().unwrap_or(0)
    }

    /// The staff member's recorded balance, or the full entitlement untouched.
    pub fn balance_for(&self, staff: &StaffProfile, leave_type: LeaveType) -> LeaveBalance {
        staff
            .leave_balances
            .get(&leave_type)
            .copied()
            .unwrap_or_else(|| LeaveBalance::new(self.entitlement(leave_type), 0))
    }
}
