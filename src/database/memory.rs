//! In-process [`RecordStore`] over plain vectors. Applies filters with the
//! same predicates the Postgres store translates to SQL, and can be told to
//! fail or stall reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{AttendanceRecord, DisciplinaryCase, LeaveApplication, StaffProfile};
use crate::reports::filter::{RecordFilter, StaffFilter};
use crate::reports::store::{EntityKind, RecordStore, StoreError};

pub struct MemoryStore {
    staff: RwLock<Vec<StaffProfile>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
    leaves: RwLock<Vec<LeaveApplication>>,
    cases: RwLock<Vec<DisciplinaryCase>>,
    fetch_calls: AtomicU64,
    failing: Option<EntityKind>,
    delay: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            staff: RwLock::new(Vec::new()),
            attendance: RwLock::new(Vec::new()),
            leaves: RwLock::new(Vec::new()),
            cases: RwLock::new(Vec::new()),
            fetch_calls: AtomicU64::new(0),
            failing: None,
            delay: Duration::ZERO,
        }
    }
}

impl MemoryStore {
    pub fn with_staff(mut self, staff: Vec<StaffProfile>) -> Self {
        self.staff.get_mut().extend(staff);
        self
    }

    pub fn with_attendance(mut self, records: Vec<AttendanceRecord>) -> Self {
        self.attendance.get_mut().extend(records);
        self
    }

    pub fn with_leaves(mut self, leaves: Vec<LeaveApplication>) -> Self {
        self.leaves.get_mut().extend(leaves);
        self
    }

    pub fn with_cases(mut self, cases: Vec<DisciplinaryCase>) -> Self {
        self.cases.get_mut().extend(cases);
        self
    }

    /// Every read touching `kind` fails with [`StoreError::Unavailable`].
    pub fn failing_on(mut self, kind: EntityKind) -> Self {
        self.failing = Some(kind);
        self
    }

    /// Every read sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of reads served (or refused) so far.
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    async fn enter(&self, kind: EntityKind) -> Result<(), StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing == Some(kind) {
            return Err(StoreError::Unavailable(format!("{} records unavailable", kind)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_attendance(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.enter(EntityKind::Attendance).await?;
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .read()
            .await
            .iter()
            .filter(|r| filter.matches_attendance(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.staff_id.cmp(&b.staff_id)));
        Ok(records)
    }

    async fn fetch_leaves(&self, filter: &RecordFilter) -> Result<Vec<LeaveApplication>, StoreError> {
        self.enter(EntityKind::Leave).await?;
        let mut leaves: Vec<LeaveApplication> = self
            .leaves
            .read()
            .await
            .iter()
            .filter(|l| filter.matches_leave(l))
            .cloned()
            .collect();
        leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leaves)
    }

    async fn fetch_cases(&self, filter: &RecordFilter) -> Result<Vec<DisciplinaryCase>, StoreError> {
        self.enter(EntityKind::Disciplinary).await?;
        let mut cases: Vec<DisciplinaryCase> = self
            .cases
            .read()
            .await
            .iter()
            .filter(|c| filter.matches_case(c))
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.date_of_infraction.cmp(&a.date_of_infraction));
        Ok(cases)
    }

    async fn fetch_staff(&self, filter: &StaffFilter) -> Result<Vec<StaffProfile>, StoreError> {
        self.enter(EntityKind::Staff).await?;
        let mut staff: Vec<StaffProfile> = self
            .staff
            .read()
            .await
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        staff.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(staff)
    }

    async fn count(&self, filter: &RecordFilter) -> Result<i64, StoreError> {
        let kind = filter.kind();
        self.enter(kind).await?;
        let count = match kind {
            EntityKind::Attendance => self
                .attendance
                .read()
                .await
                .iter()
                .filter(|r| filter.matches_attendance(r))
                .count(),
            EntityKind::Leave => self
                .leaves
                .read()
                .await
                .iter()
                .filter(|l| filter.matches_leave(l))
                .count(),
            EntityKind::Disciplinary => self
                .cases
                .read()
                .await
                .iter()
                .filter(|c| filter.matches_case(c))
                .count(),
            EntityKind::Staff => 0,
        };
        Ok(count as i64)
    }

    async fn resolve_staff_ids_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<Uuid>, StoreError> {
        self.enter(EntityKind::Staff).await?;
        Ok(self
            .staff
            .read()
            .await
            .iter()
            .filter(|s| s.department.as_deref() == Some(department))
            .map(|s| s.id)
            .collect())
    }

    async fn active_staff_count(&self) -> Result<i64, StoreError> {
        self.enter(EntityKind::Staff).await?;
        Ok(self.staff.read().await.iter().filter(|s| s.is_active).count() as i64)
    }
}
