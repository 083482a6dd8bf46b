use diesel::prelude::*;
use tracing::trace;

use super::models::{Class, ClassMember, Device, NewClassMember, RfidTag, Santri};
use super::schema::{class_members, classes, devices, rfid_tags, santri};
use super::{StorageError, Store};

impl Store {
    /// Insert or fully replace a student row keyed by `santri_id`.
    pub async fn upsert_santri(&self, student: Santri) -> Result<(), StorageError> {
        trace!(santri_id = %student.santri_id, "upsert_santri");
        self.interact(move |conn| {
            diesel::insert_into(santri::table)
                .values(&student)
                .on_conflict(santri::santri_id)
                .do_update()
                .set(&student)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_santri(&self, santri_id: &str) -> Result<Option<Santri>, StorageError> {
        let id = santri_id.to_string();
        self.interact(move |conn| {
            Ok(santri::table
                .find(&id)
                .select(Santri::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn list_santri_in_maskan(&self, maskan: &str) -> Result<Vec<Santri>, StorageError> {
        let maskan = maskan.to_string();
        self.interact(move |conn| {
            Ok(santri::table
                .filter(santri::maskan.eq(&maskan))
                .order((santri::room.asc(), santri::name.asc()))
                .select(Santri::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Class memberships are removed; attendance, bills, faults, leave, visits and
    /// RFID tags stay with their `santri_id` cleared.
    pub async fn delete_santri(&self, santri_id: &str) -> Result<bool, StorageError> {
        let id = santri_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(santri::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    pub async fn insert_class(&self, class: Class) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(classes::table)
                .values(&class)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn delete_class(&self, class_id: &str) -> Result<bool, StorageError> {
        let id = class_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(classes::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Returns the id of the new membership row.
    pub async fn add_class_member(
        &self,
        class_id: &str,
        santri_id: &str,
        joined_at: Option<i64>,
    ) -> Result<i64, StorageError> {
        let class_id = class_id.to_string();
        let santri_id = santri_id.to_string();
        self.interact(move |conn| {
            let row = NewClassMember {
                class_id: &class_id,
                santri_id: &santri_id,
                joined_at,
            };
            Ok(diesel::insert_into(class_members::table)
                .values(&row)
                .returning(class_members::id)
                .get_result::<i64>(conn)?)
        })
        .await
    }

    /// Close an open membership. Returns false when no open membership exists.
    pub async fn end_class_membership(
        &self,
        class_id: &str,
        santri_id: &str,
        left_at: i64,
    ) -> Result<bool, StorageError> {
        let class_id = class_id.to_string();
        let santri_id = santri_id.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(
                class_members::table
                    .filter(class_members::class_id.eq(&class_id))
                    .filter(class_members::santri_id.eq(&santri_id))
                    .filter(class_members::left_at.is_null()),
            )
            .set(class_members::left_at.eq(Some(left_at)))
            .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    pub async fn class_members(&self, class_id: &str) -> Result<Vec<ClassMember>, StorageError> {
        let class_id = class_id.to_string();
        self.interact(move |conn| {
            Ok(class_members::table
                .filter(class_members::class_id.eq(&class_id))
                .order(class_members::id.asc())
                .select(ClassMember::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn memberships_for_santri(
        &self,
        santri_id: &str,
    ) -> Result<Vec<ClassMember>, StorageError> {
        let santri_id = santri_id.to_string();
        self.interact(move |conn| {
            Ok(class_members::table
                .filter(class_members::santri_id.eq(&santri_id))
                .order(class_members::id.asc())
                .select(ClassMember::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn register_device(&self, device: Device) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(devices::table)
                .values(&device)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_device(&self, device_id: &str) -> Result<Option<Device>, StorageError> {
        let id = device_id.to_string();
        self.interact(move |conn| {
            Ok(devices::table
                .find(&id)
                .select(Device::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn delete_device(&self, device_id: &str) -> Result<bool, StorageError> {
        let id = device_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(devices::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Record a heartbeat from a reader.
    pub async fn touch_device(&self, device_id: &str, seen_at: i64) -> Result<bool, StorageError> {
        let id = device_id.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(devices::table.find(&id))
                .set(devices::last_seen.eq(Some(seen_at)))
                .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    pub async fn issue_rfid_tag(&self, tag: RfidTag) -> Result<(), StorageError> {
        trace!(uid = %tag.uid, santri_id = ?tag.santri_id, "issue_rfid_tag");
        self.interact(move |conn| {
            diesel::insert_into(rfid_tags::table)
                .values(&tag)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_rfid_tag(&self, uid: &str) -> Result<Option<RfidTag>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(rfid_tags::table
                .find(&uid)
                .select(RfidTag::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn revoke_rfid_tag(&self, uid: &str, revoked_at: i64) -> Result<bool, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(rfid_tags::table.find(&uid))
                .set(rfid_tags::revoked_at.eq(Some(revoked_at)))
                .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    pub async fn delete_rfid_tag(&self, uid: &str) -> Result<bool, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(rfid_tags::table.find(&uid)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// The student a scanned tag belongs to, ignoring revoked or unbound tags.
    pub async fn resolve_rfid(&self, uid: &str) -> Result<Option<Santri>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(rfid_tags::table
                .inner_join(santri::table)
                .filter(rfid_tags::uid.eq(&uid))
                .filter(rfid_tags::revoked_at.is_null())
                .select(Santri::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }
}
