use diesel::prelude::*;
use tracing::{debug, trace};

use super::models::{AttendanceRecord, AttendanceSession};
use super::schema::{attendance_records, attendance_sessions};
use super::{StorageError, Store};

impl Store {
    pub async fn open_attendance_session(
        &self,
        session: AttendanceSession,
    ) -> Result<(), StorageError> {
        debug!(session_key = %session.session_key, "open_attendance_session");
        self.interact(move |conn| {
            diesel::insert_into(attendance_sessions::table)
                .values(&session)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Stamp `ended_at` on a session that is still open.
    pub async fn close_attendance_session(
        &self,
        session_key: &str,
        ended_at: i64,
    ) -> Result<bool, StorageError> {
        let key = session_key.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(
                attendance_sessions::table
                    .find(&key)
                    .filter(attendance_sessions::ended_at.is_null()),
            )
            .set(attendance_sessions::ended_at.eq(Some(ended_at)))
            .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    pub async fn get_attendance_session(
        &self,
        session_key: &str,
    ) -> Result<Option<AttendanceSession>, StorageError> {
        let key = session_key.to_string();
        self.interact(move |conn| {
            Ok(attendance_sessions::table
                .find(&key)
                .select(AttendanceSession::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn delete_attendance_session(&self, session_key: &str) -> Result<bool, StorageError> {
        let key = session_key.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(attendance_sessions::table.find(&key)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    pub async fn record_attendance(&self, record: AttendanceRecord) -> Result<(), StorageError> {
        trace!(
            id = %record.id,
            santri_id = ?record.santri_id,
            ts = ?record.ts,
            "record_attendance"
        );
        self.interact(move |conn| {
            diesel::insert_into(attendance_records::table)
                .values(&record)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Import many records at once; all or nothing.
    pub async fn import_attendance(
        &self,
        records: Vec<AttendanceRecord>,
    ) -> Result<usize, StorageError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<usize, StorageError> {
                let mut inserted = 0;
                for record in &records {
                    inserted += diesel::insert_into(attendance_records::table)
                        .values(record)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await
    }

    pub async fn get_attendance_record(
        &self,
        id: &str,
    ) -> Result<Option<AttendanceRecord>, StorageError> {
        let id = id.to_string();
        self.interact(move |conn| {
            Ok(attendance_records::table
                .find(&id)
                .select(AttendanceRecord::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Newest first.
    pub async fn attendance_for_santri(
        &self,
        santri_id: &str,
        limit: i64,
    ) -> Result<Vec<AttendanceRecord>, StorageError> {
        let santri_id = santri_id.to_string();
        let limit = limit.clamp(1, 1000);
        self.interact(move |conn| {
            Ok(attendance_records::table
                .filter(attendance_records::santri_id.eq(&santri_id))
                .order((attendance_records::ts.desc(), attendance_records::id.desc()))
                .limit(limit)
                .select(AttendanceRecord::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Oldest first, as scanned.
    pub async fn attendance_for_session(
        &self,
        session_key: &str,
    ) -> Result<Vec<AttendanceRecord>, StorageError> {
        let key = session_key.to_string();
        self.interact(move |conn| {
            Ok(attendance_records::table
                .filter(attendance_records::session_key.eq(&key))
                .order((attendance_records::ts.asc(), attendance_records::id.asc()))
                .select(AttendanceRecord::as_select())
                .load(conn)?)
        })
        .await
    }
}
