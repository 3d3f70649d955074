use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{
    models::{
        AttendanceRecord, DisciplinaryCase, LeaveApplication, StaffProfile, StringEnum,
    },
    types::{AttendanceRow, CaseRow, LeaveRow, StaffRow},
    utils::sql,
};
use crate::reports::filter::{Criteria, RecordFilter, StaffFilter};
use crate::reports::store::{EntityKind, RecordStore, StoreError};

const ATTENDANCE_COLUMNS: &str =
    "id, staff_id, date, status, check_in_time, check_out_time, remarks, marked_by";
const LEAVE_COLUMNS: &str = "id, staff_id, leave_type, start_date, end_date, number_of_days, \
     status, rejection_reason, approved_by, created_at";
const CASE_COLUMNS: &str =
    "id, staff_id, infraction_type, status, date_of_infraction, sanction, created_at";
const STAFF_COLUMNS: &str = "id, staff_number, first_name, last_name, email, department, role, \
     is_active, leave_balances, supervisor_id";

fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Attendance => "attendance",
        EntityKind::Leave => "leave_applications",
        EntityKind::Disciplinary => "disciplinary_cases",
        EntityKind::Staff => "staff",
    }
}

/// Append `filter` as `AND ...` conditions to a query that already has a `WHERE`.
fn push_record_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &RecordFilter) {
    if let Some(range) = filter.date_range {
        query
            .push(format!(" AND {} BETWEEN ", filter.date_field.date_expr()))
            .push_bind(range.start)
            .push(" AND ")
            .push_bind(range.end);
    }
    for ids in [&filter.staff_ids, &filter.scope_ids].into_iter().flatten() {
        query
            .push(" AND staff_id = ANY(")
            .push_bind(ids.iter().copied().collect::<Vec<Uuid>>())
            .push(")");
    }
    match &filter.criteria {
        Criteria::Attendance { statuses } => push_statuses(query, statuses),
        Criteria::Leave {
            statuses,
            leave_type,
        } => {
            push_statuses(query, statuses);
            if let Some(leave_type) = leave_type {
                query.push(" AND leave_type = ").push_bind(leave_type.as_str());
            }
        }
        Criteria::Disciplinary {
            statuses,
            infraction_type,
        } => {
            push_statuses(query, statuses);
            if let Some(infraction_type) = infraction_type {
                query
                    .push(" AND infraction_type = ")
                    .push_bind(infraction_type.as_str());
            }
        }
    }
}

fn push_statuses<S: StringEnum>(query: &mut QueryBuilder<'_, Postgres>, statuses: &[S]) {
    if statuses.is_empty() {
        return;
    }
    query
        .push(" AND status = ANY(")
        .push_bind(
            statuses
                .iter()
                .map(|s| s.as_str().to_string())
                .collect::<Vec<String>>(),
        )
        .push(")");
}

fn push_staff_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &StaffFilter) {
    for ids in [&filter.ids, &filter.scope_ids].into_iter().flatten() {
        query
            .push(" AND id = ANY(")
            .push_bind(ids.iter().copied().collect::<Vec<Uuid>>())
            .push(")");
    }
    if let Some(supervisor_id) = filter.supervisor_id {
        query.push(" AND supervisor_id = ").push_bind(supervisor_id);
    }
    if filter.active_only {
        query.push(" AND is_active");
    }
}

fn select(columns: &str, filter: &RecordFilter, order_by: &str) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {} FROM {} WHERE TRUE",
        columns,
        table(filter.kind())
    ));
    push_record_filter(&mut query, filter);
    query.push(format!(" ORDER BY {}", order_by));
    log::debug!("Record query: {}", query.sql());
    query
}

/// Postgres-backed [`RecordStore`].
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_attendance(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = select(ATTENDANCE_COLUMNS, filter, "date, staff_id")
            .build_query_as::<AttendanceRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn fetch_leaves(&self, filter: &RecordFilter) -> Result<Vec<LeaveApplication>, StoreError> {
        let rows = select(LEAVE_COLUMNS, filter, "created_at DESC")
            .build_query_as::<LeaveRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn fetch_cases(&self, filter: &RecordFilter) -> Result<Vec<DisciplinaryCase>, StoreError> {
        let rows = select(CASE_COLUMNS, filter, "date_of_infraction DESC")
            .build_query_as::<CaseRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn fetch_staff(&self, filter: &StaffFilter) -> Result<Vec<StaffProfile>, StoreError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            STAFF_COLUMNS,
            table(EntityKind::Staff)
        ));
        push_staff_filter(&mut query, filter);
        query.push(" ORDER BY last_name, first_name");

        let rows = query
            .build_query_as::<StaffRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &RecordFilter) -> Result<i64, StoreError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT COUNT(*) FROM {} WHERE TRUE",
            table(filter.kind())
        ));
        push_record_filter(&mut query, filter);

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn resolve_staff_ids_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<Uuid>, StoreError> {
        let ids = sqlx::query_scalar::<_, Uuid>(&sql(r#"
            SELECT
                id
            FROM
                staff
            WHERE
                department = ?
        "#))
        .bind(department)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn active_staff_count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                staff
            WHERE
                is_active = ?
        "#))
        .bind(true)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
