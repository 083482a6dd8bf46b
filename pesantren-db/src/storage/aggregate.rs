//! Refresh-on-demand aggregates.
//!
//! Postgres would express these as materialized views. Here each aggregate is a
//! snapshot table rebuilt wholesale inside one immediate transaction, so readers
//! see either the previous snapshot or the new one. Nothing refreshes them
//! implicitly; staleness lasts until a caller asks for [`Store::refresh_aggregate`].

use diesel::prelude::*;
use diesel::sql_types::BigInt;
use tracing::info;

use super::models::LatestAttendance as LatestAttendanceRow;
use super::schema::mv_latest_attendance;
use super::{StorageError, Store, now_millis};

pub trait Aggregate {
    /// Snapshot table name.
    const NAME: &'static str;

    /// Replace the snapshot contents. Runs inside the caller's transaction and
    /// returns the number of rows now in the snapshot.
    fn refresh(conn: &mut SqliteConnection, refreshed_at: i64) -> QueryResult<usize>;
}

/// Newest attendance record per student.
///
/// Ordering is `ts DESC, id DESC`: among records sharing the newest timestamp
/// the greatest record id wins, and records without a timestamp only win when
/// the student has no timestamped record. Records whose `santri_id` was cleared
/// are not attributed to anyone and are skipped.
pub struct LatestAttendance;

impl Aggregate for LatestAttendance {
    const NAME: &'static str = "mv_latest_attendance";

    fn refresh(conn: &mut SqliteConnection, refreshed_at: i64) -> QueryResult<usize> {
        diesel::delete(mv_latest_attendance::table).execute(conn)?;
        diesel::sql_query(
            "INSERT INTO mv_latest_attendance \
                 (santri_id, record_id, ts, status, session_key, name, refreshed_at) \
             SELECT santri_id, id, ts, status, session_key, name, ? \
             FROM ( \
                 SELECT ar.*, ROW_NUMBER() OVER ( \
                     PARTITION BY ar.santri_id \
                     ORDER BY ar.ts IS NULL, ar.ts DESC, ar.id DESC \
                 ) AS rn \
                 FROM attendance_records ar \
                 WHERE ar.santri_id IS NOT NULL \
             ) \
             WHERE rn = 1",
        )
        .bind::<BigInt, _>(refreshed_at)
        .execute(conn)
    }
}

impl Store {
    pub async fn refresh_aggregate<A: Aggregate + 'static>(&self) -> Result<usize, StorageError> {
        let refreshed_at = now_millis();
        let rows = self
            .interact(move |conn| {
                conn.immediate_transaction(|conn| -> Result<usize, StorageError> {
                    Ok(A::refresh(conn, refreshed_at)?)
                })
            })
            .await?;
        info!(aggregate = A::NAME, rows, "aggregate refreshed");
        Ok(rows)
    }

    pub async fn refresh_latest_attendance(&self) -> Result<usize, StorageError> {
        self.refresh_aggregate::<LatestAttendance>().await
    }

    /// Snapshot contents as of the last refresh, ordered by student.
    pub async fn latest_attendance(&self) -> Result<Vec<LatestAttendanceRow>, StorageError> {
        self.interact(|conn| {
            Ok(mv_latest_attendance::table
                .order(mv_latest_attendance::santri_id.asc())
                .select(LatestAttendanceRow::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn latest_attendance_for(
        &self,
        santri_id: &str,
    ) -> Result<Option<LatestAttendanceRow>, StorageError> {
        let id = santri_id.to_string();
        self.interact(move |conn| {
            Ok(mv_latest_attendance::table
                .find(&id)
                .select(LatestAttendanceRow::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }
}
