use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisciplinaryCase {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub infraction_type: Option<InfractionType>,
    pub status: Option<CaseStatus>,
    pub date_of_infraction: NaiveDate,
    pub sanction: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DisciplinaryCase {
    pub fn new(
        staff_id: Uuid,
        infraction_type: InfractionType,
        status: CaseStatus,
        date_of_infraction: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            infraction_type: Some(infraction_type),
            status: Some(status),
            date_of_infraction,
            sanction: None,
            created_at,
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum InfractionType {
        Minor => "minor",
        Major => "major",
        Severe => "severe",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum CaseStatus {
        Open => "open",
        UnderReview => "under-review",
        Resolved => "resolved",
        Appealed => "appealed",
    }
}

impl CaseStatus {
    /// Statuses that count against a performance score.
    pub const UNRESOLVED: [CaseStatus; 2] = [CaseStatus::Open, CaseStatus::UnderReview];
}
