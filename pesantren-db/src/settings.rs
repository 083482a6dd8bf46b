//! Key/value application settings with configured defaults.
//!
//! Rows in the `settings` table always win. A key without a row falls back to
//! the default supplied at construction, typically the `settings` map of
//! [`crate::config::AppConfig`]. Nothing is written until [`Settings::init`] or
//! [`Settings::set`] is called.

use std::collections::BTreeMap;

use diesel::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::storage::models::Setting;
use crate::storage::schema::settings;
use crate::storage::{Json, StorageError, Store, now_millis};

#[derive(Clone)]
pub struct Settings {
    store: Store,
    defaults: BTreeMap<String, Value>,
}

impl Settings {
    pub fn new(store: Store, defaults: BTreeMap<String, Value>) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> &BTreeMap<String, Value> {
        &self.defaults
    }

    /// Persist every default that has no row yet. Existing rows are left as
    /// they are. Returns the number of rows written.
    pub async fn init(&self) -> Result<usize, StorageError> {
        let defaults = self.defaults.clone();
        let now = now_millis();
        let written = self
            .store
            .interact(move |conn| {
                conn.immediate_transaction(|conn| -> Result<usize, StorageError> {
                    let mut written = 0;
                    for (key, value) in defaults {
                        let row = Setting {
                            key,
                            value: Some(Json(value)),
                            updated_at: Some(now),
                        };
                        written += diesel::insert_into(settings::table)
                            .values(&row)
                            .on_conflict_do_nothing()
                            .execute(conn)?;
                    }
                    Ok(written)
                })
            })
            .await?;
        info!(written, "settings initialized");
        Ok(written)
    }

    /// Stored value, else the default, else `None`. A row holding SQL NULL
    /// reads as JSON `null`.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        if let Some(row) = self.get_row(key).await? {
            return Ok(Some(row.value.map(|j| j.0).unwrap_or(Value::Null)));
        }
        Ok(self.defaults.get(key).cloned())
    }

    /// The stored row only, ignoring defaults.
    pub async fn get_row(&self, key: &str) -> Result<Option<Setting>, StorageError> {
        let key = key.to_string();
        self.store
            .interact(move |conn| {
                Ok(settings::table
                    .find(&key)
                    .select(Setting::as_select())
                    .first(conn)
                    .optional()?)
            })
            .await
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidInput("setting key is empty".into()));
        }
        debug!(%key, "settings set");
        let row = Setting {
            key: key.to_string(),
            value: Some(Json(value)),
            updated_at: Some(now_millis()),
        };
        self.store
            .interact(move |conn| {
                diesel::insert_into(settings::table)
                    .values(&row)
                    .on_conflict(settings::key)
                    .do_update()
                    .set((
                        settings::value.eq(row.value.clone()),
                        settings::updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)?;
                Ok(())
            })
            .await
    }

    /// Delete the row so the default applies again.
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let key = key.to_string();
        self.store
            .interact(move |conn| {
                let deleted = diesel::delete(settings::table.find(&key)).execute(conn)?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Stored rows ordered by key.
    pub async fn list(&self) -> Result<Vec<Setting>, StorageError> {
        self.store
            .interact(|conn| {
                Ok(settings::table
                    .order(settings::key.asc())
                    .select(Setting::as_select())
                    .load(conn)?)
            })
            .await
    }
}
