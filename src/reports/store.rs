use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{AttendanceRecord, DisciplinaryCase, LeaveApplication, StaffProfile};
use crate::reports::filter::{RecordFilter, StaffFilter};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// The record kinds the store can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Attendance,
    Leave,
    Disciplinary,
    Staff,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Attendance => "attendance",
            EntityKind::Leave => "leave",
            EntityKind::Disciplinary => "disciplinary",
            EntityKind::Staff => "staff",
        };
        f.write_str(name)
    }
}

/// Read-only access to operational records. Implementations must be safe to
/// call concurrently; the engine issues independent reads in parallel.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_attendance(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn fetch_leaves(&self, filter: &RecordFilter) -> Result<Vec<LeaveApplication>, StoreError>;

    async fn fetch_cases(&self, filter: &RecordFilter) -> Result<Vec<DisciplinaryCase>, StoreError>;

    async fn fetch_staff(&self, filter: &StaffFilter) -> Result<Vec<StaffProfile>, StoreError>;

    /// Number of records of `filter.kind()` matching the filter.
    async fn count(&self, filter: &RecordFilter) -> Result<i64, StoreError>;

    async fn resolve_staff_ids_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<Uuid>, StoreError>;

    async fn active_staff_count(&self) -> Result<i64, StoreError>;
}
