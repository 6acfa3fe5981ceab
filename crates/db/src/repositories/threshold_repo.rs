//! Repository for the `thresholds` table.
//!
//! Two entry points:
//!
//! - [`ThresholdRepo::list`] -- filtered, non-transactional read.
//! - [`ThresholdRepo::reconcile`] -- makes the table match a complete desired
//!   set inside one transaction and reports which records were written.

use dx_core::change_detection::{detect_change, ChangeKind};
use dx_core::threshold_type::ThresholdTypeId;
use dx_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::error::ThresholdRepoError;
use crate::models::threshold::{Threshold, ThresholdFilter};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `thresholds` SELECT and RETURNING clauses.
const COLUMNS: &str = "\
    id, group_id, threshold_type_id, created_by, created_date, \
    updated_by, updated_date, approved_by, at_risk_threshold, \
    no_detection_threshold, in_warning_threshold, full_threshold";

// ---------------------------------------------------------------------------
// ThresholdRepo
// ---------------------------------------------------------------------------

/// Provides filtered reads and transactional reconciliation of thresholds.
pub struct ThresholdRepo;

impl ThresholdRepo {
    /// List thresholds matching every set field of `filter`.
    ///
    /// Row order is whatever the table scan yields; callers must not rely on it.
    pub async fn list(
        pool: &PgPool,
        filter: &ThresholdFilter,
    ) -> Result<Vec<Threshold>, ThresholdRepoError> {
        let (where_clause, bind_values) = build_threshold_filter(filter);
        let query = format!("SELECT {COLUMNS} FROM thresholds {where_clause}");

        let mut q = sqlx::query_as::<_, Threshold>(&query);
        for val in &bind_values {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::SmallInt(v) => q = q.bind(*v),
            }
        }

        q.fetch_all(pool).await.map_err(ThresholdRepoError::Read)
    }

    /// Make the table match `desired` and return the records that were written.
    ///
    /// `desired` is the complete intended state, not a delta:
    ///
    /// 1. Records with `id != 0` are compared against their persisted row and
    ///    updated only when [`detect_change`] reports a difference. An id with
    ///    no persisted row is skipped.
    /// 2. Rows whose id is not among those records are deleted (all rows when
    ///    there are none).
    /// 3. Records with `id == 0` are inserted.
    ///
    /// The returned rows are the updated ones followed by the inserted ones,
    /// each in input order. Unchanged, skipped and deleted rows never appear.
    /// Any failure rolls the whole transaction back.
    ///
    /// Values finer than the column scale are rejected with
    /// [`ThresholdRepoError::Invalid`] before the transaction starts. Range
    /// violations are left to the table's `CHECK` constraints.
    pub async fn reconcile(
        pool: &PgPool,
        desired: &[Threshold],
    ) -> Result<Vec<Threshold>, ThresholdRepoError> {
        for threshold in desired {
            if let Err(err) = threshold.validate_scale() {
                tracing::warn!(id = threshold.id, error = %err, "Rejected threshold reconcile");
                return Err(err.into());
            }
        }

        let mut tx = pool.begin().await.map_err(ThresholdRepoError::Reconcile)?;
        let now = chrono::Utc::now();

        match reconcile_in_tx(&mut tx, desired, now).await {
            Ok(changed) => {
                tx.commit().await.map_err(ThresholdRepoError::Reconcile)?;
                Ok(changed)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Threshold reconcile rollback failed");
                }
                tracing::error!(error = %err, "Threshold reconcile aborted");
                Err(ThresholdRepoError::Reconcile(err))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reconcile steps
// ---------------------------------------------------------------------------

async fn reconcile_in_tx(
    conn: &mut PgConnection,
    desired: &[Threshold],
    now: Timestamp,
) -> Result<Vec<Threshold>, sqlx::Error> {
    let (existing, new): (Vec<&Threshold>, Vec<&Threshold>) =
        desired.iter().partition(|t| !t.is_new());

    let mut changed = Vec::with_capacity(desired.len());
    let mut unchanged = 0usize;
    let mut missing = 0usize;

    for threshold in &existing {
        let kind = match find_by_id(conn, threshold.id).await? {
            None => ChangeKind::Missing,
            Some(persisted) => detect_change(&threshold.snapshot(), &persisted.snapshot()),
        };

        match kind {
            ChangeKind::Updated => changed.push(update(conn, threshold, now).await?),
            ChangeKind::Missing => {
                missing += 1;
                tracing::warn!(
                    id = threshold.id,
                    "Threshold id has no persisted row, skipping"
                );
            }
            ChangeKind::Unchanged => unchanged += 1,
            other => tracing::warn!(
                id = threshold.id,
                change = %other,
                "Unexpected comparison outcome, leaving row as stored"
            ),
        }
        tracing::debug!(id = threshold.id, change = %kind, "Compared threshold");
    }

    let keep_ids: Vec<DbId> = existing.iter().map(|t| t.id).collect();
    let deleted = delete_except(conn, keep_ids).await?;
    if deleted > 0 {
        tracing::debug!(rows = deleted, change = %ChangeKind::Deleted, "Deleted thresholds");
    }

    for threshold in &new {
        let row = insert(conn, threshold, now).await?;
        tracing::debug!(id = row.id, change = %ChangeKind::Inserted, "Inserted threshold");
        changed.push(row);
    }

    tracing::info!(
        submitted = desired.len(),
        changed = changed.len(),
        inserted = new.len(),
        unchanged,
        missing,
        deleted,
        "Thresholds reconciled"
    );

    Ok(changed)
}

async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Threshold>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM thresholds WHERE id = $1");
    sqlx::query_as::<_, Threshold>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Rewrite every mutable column. `created_by` / `created_date` are left alone.
async fn update(
    conn: &mut PgConnection,
    threshold: &Threshold,
    now: Timestamp,
) -> Result<Threshold, sqlx::Error> {
    let query = format!(
        "UPDATE thresholds SET \
            group_id = $2, \
            threshold_type_id = $3, \
            updated_by = $4, \
            updated_date = $5, \
            approved_by = $6, \
            at_risk_threshold = $7, \
            no_detection_threshold = $8, \
            in_warning_threshold = $9, \
            full_threshold = $10 \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Threshold>(&query)
        .bind(threshold.id)
        .bind(threshold.group_id)
        .bind(threshold.threshold_type_id)
        .bind(&threshold.updated_by)
        .bind(now)
        .bind(&threshold.approved_by)
        .bind(threshold.at_risk_threshold)
        .bind(threshold.no_detection_threshold)
        .bind(threshold.in_warning_threshold)
        .bind(threshold.full_threshold)
        .fetch_one(conn)
        .await
}

/// Delete every row whose id is not in `keep_ids`. Returns the number removed.
async fn delete_except(conn: &mut PgConnection, keep_ids: Vec<DbId>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM thresholds WHERE id <> ALL($1)")
        .bind(keep_ids)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

async fn insert(
    conn: &mut PgConnection,
    threshold: &Threshold,
    now: Timestamp,
) -> Result<Threshold, sqlx::Error> {
    let query = format!(
        "INSERT INTO thresholds \
            (group_id, threshold_type_id, created_by, created_date, approved_by, \
             at_risk_threshold, no_detection_threshold, in_warning_threshold, full_threshold) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Threshold>(&query)
        .bind(threshold.group_id)
        .bind(threshold.threshold_type_id)
        .bind(&threshold.created_by)
        .bind(now)
        .bind(&threshold.approved_by)
        .bind(threshold.at_risk_threshold)
        .bind(threshold.no_detection_threshold)
        .bind(threshold.in_warning_threshold)
        .bind(threshold.full_threshold)
        .fetch_one(conn)
        .await
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built threshold queries.
#[derive(Debug, PartialEq)]
enum BindValue {
    BigInt(i64),
    SmallInt(ThresholdTypeId),
}

/// Build a WHERE clause and bind values from a `ThresholdFilter`.
///
/// The clause is empty if no filters are active, or starts with `WHERE `.
fn build_threshold_filter(filter: &ThresholdFilter) -> (String, Vec<BindValue>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();

    if filter.id != 0 {
        bind_values.push(BindValue::BigInt(filter.id));
        conditions.push(format!("id = ${}", bind_values.len()));
    }

    if let Some(group_id) = filter.group_id {
        bind_values.push(BindValue::BigInt(group_id));
        conditions.push(format!("group_id = ${}", bind_values.len()));
    }

    if let Some(type_id) = filter.threshold_type_id {
        bind_values.push(BindValue::SmallInt(type_id));
        conditions.push(format!("threshold_type_id = ${}", bind_values.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values)
}
