use diesel::prelude::*;
use tracing::trace;

use super::models::{NewUserRole, Role, Session, User, UserRole};
use super::schema::{roles, sessions, user_roles, users};
use super::{StorageError, Store};

impl Store {
    /// Insert or fully replace a user row keyed by `uid`.
    pub async fn upsert_user(&self, user: User) -> Result<(), StorageError> {
        trace!(uid = %user.uid, "upsert_user");
        self.interact(move |conn| {
            diesel::insert_into(users::table)
                .values(&user)
                .on_conflict(users::uid)
                .do_update()
                .set(&user)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(users::table
                .find(&uid)
                .select(User::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Sessions, role assignments and notifications go with the user; authored
    /// content and attendance rows keep existing with the reference cleared.
    pub async fn delete_user(&self, uid: &str) -> Result<bool, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(users::table.find(&uid)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    pub async fn insert_role(&self, role: Role) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(roles::table)
                .values(&role)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn delete_role(&self, role_id: &str) -> Result<bool, StorageError> {
        let role_id = role_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(roles::table.find(&role_id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Returns the id of the new assignment row.
    pub async fn assign_role(
        &self,
        uid: &str,
        role_id: &str,
        assigned_at: Option<i64>,
    ) -> Result<i64, StorageError> {
        let uid = uid.to_string();
        let role_id = role_id.to_string();
        self.interact(move |conn| {
            let row = NewUserRole {
                uid: &uid,
                role_id: &role_id,
                assigned_at,
            };
            Ok(diesel::insert_into(user_roles::table)
                .values(&row)
                .returning(user_roles::id)
                .get_result::<i64>(conn)?)
        })
        .await
    }

    pub async fn user_role_assignments(&self, uid: &str) -> Result<Vec<UserRole>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(user_roles::table
                .filter(user_roles::uid.eq(&uid))
                .order(user_roles::id.asc())
                .select(UserRole::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn roles_for_user(&self, uid: &str) -> Result<Vec<Role>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(user_roles::table
                .inner_join(roles::table)
                .filter(user_roles::uid.eq(&uid))
                .order(roles::name.asc())
                .select(Role::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn create_session(&self, session: Session) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(sessions::table)
                .values(&session)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        let session_id = session_id.to_string();
        self.interact(move |conn| {
            Ok(sessions::table
                .find(&session_id)
                .select(Session::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn sessions_for_user(&self, uid: &str) -> Result<Vec<Session>, StorageError> {
        let uid = uid.to_string();
        self.interact(move |conn| {
            Ok(sessions::table
                .filter(sessions::uid.eq(&uid))
                .order(sessions::created_at.asc())
                .select(Session::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool, StorageError> {
        let session_id = session_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(sessions::table.find(&session_id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Drop sessions whose `expires_at` lies before `now_ms`. Sessions without
    /// an expiry are kept.
    pub async fn purge_expired_sessions(&self, now_ms: i64) -> Result<usize, StorageError> {
        self.interact(move |conn| {
            Ok(diesel::delete(sessions::table.filter(sessions::expires_at.lt(now_ms)))
                .execute(conn)?)
        })
        .await
    }
}
