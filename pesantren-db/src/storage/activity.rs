use diesel::prelude::*;
use tracing::{debug, trace};

use super::models::{AuditLog, NewAuditLog, NewNotification, Notification};
use super::schema::{audit_logs, notifications};
use super::{StorageError, Store};

impl Store {
    /// Queue a notification for delivery. Returns its id.
    pub async fn enqueue_notification(&self, item: NewNotification) -> Result<i64, StorageError> {
        trace!(target_uid = ?item.target_uid, kind = ?item.kind, "enqueue_notification");
        self.interact(move |conn| {
            Ok(diesel::insert_into(notifications::table)
                .values(&item)
                .returning(notifications::id)
                .get_result::<i64>(conn)?)
        })
        .await
    }

    pub async fn mark_notification_sent(
        &self,
        id: i64,
        sent_at: i64,
        status: &str,
    ) -> Result<bool, StorageError> {
        let status = status.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(notifications::table.find(id))
                .set((
                    notifications::sent_at.eq(Some(sent_at)),
                    notifications::status.eq(Some(status)),
                ))
                .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    /// Notifications addressed to `uid`, newest first.
    pub async fn notifications_for(&self, uid: &str) -> Result<Vec<Notification>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(notifications::table
                .filter(notifications::target_uid.eq(&uid))
                .order(notifications::id.desc())
                .select(Notification::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Undelivered notifications in queue order.
    pub async fn pending_notifications(&self, limit: i64) -> Result<Vec<Notification>, StorageError> {
        let limit = limit.clamp(1, 1000);
        self.interact(move |conn| {
            Ok(notifications::table
                .filter(notifications::sent_at.is_null())
                .order(notifications::id.asc())
                .limit(limit)
                .select(Notification::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Append an audit entry. Returns its id.
    pub async fn append_audit(&self, entry: NewAuditLog) -> Result<i64, StorageError> {
        debug!(
            action = ?entry.action,
            entity_type = ?entry.entity_type,
            entity_id = ?entry.entity_id,
            "audit"
        );
        self.interact(move |conn| {
            Ok(diesel::insert_into(audit_logs::table)
                .values(&entry)
                .returning(audit_logs::id)
                .get_result::<i64>(conn)?)
        })
        .await
    }

    /// Entries for one entity, oldest first.
    pub async fn audit_trail(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditLog>, StorageError> {
        let entity_type = entity_type.to_string();
        let entity_id = entity_id.to_string();
        self.interact(move |conn| {
            Ok(audit_logs::table
                .filter(audit_logs::entity_type.eq(&entity_type))
                .filter(audit_logs::entity_id.eq(&entity_id))
                .order((audit_logs::created_at.asc(), audit_logs::id.asc()))
                .select(AuditLog::as_select())
                .load(conn)?)
        })
        .await
    }
}
