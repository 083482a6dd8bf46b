//! Table creation order and live schema introspection.
//!
//! [`TABLES`] mirrors the migration order: a table appears only after every
//! table its foreign keys point at. Teardown walks it backwards.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use serde::Serialize;

use super::{StorageError, Store};

pub const TABLES: &[&str] = &[
    "users",
    "roles",
    "user_roles",
    "sessions",
    "santri",
    "classes",
    "class_members",
    "devices",
    "rfid_tags",
    "attendance_sessions",
    "attendance_records",
    "agendas",
    "announcements",
    "notifications",
    "media",
    "pages",
    "news",
    "bills",
    "bill_items",
    "faults",
    "izin",
    "kunjungan",
    "audit_logs",
    "settings",
    "mv_latest_attendance",
];

/// Tables whose rows are owned by a parent and vanish with it.
pub const CASCADE_OWNED: &[&str] = &[
    "user_roles",
    "sessions",
    "class_members",
    "bill_items",
    "notifications",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, QueryableByName)]
pub struct ColumnInfo {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    #[diesel(column_name = type_)]
    #[serde(rename = "type")]
    pub sql_type: String,
    #[diesel(sql_type = Integer)]
    #[diesel(column_name = not_null)]
    pub not_null: i32,
    #[diesel(sql_type = Nullable<Text>)]
    #[diesel(column_name = dflt_value)]
    pub default_value: Option<String>,
    /// 1-based position within the primary key, 0 when not part of it.
    #[diesel(sql_type = Integer)]
    pub pk: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, QueryableByName)]
pub struct ForeignKeyInfo {
    #[diesel(sql_type = Text)]
    #[diesel(column_name = table_)]
    pub references: String,
    #[diesel(sql_type = Text)]
    #[diesel(column_name = from_)]
    pub column: String,
    #[diesel(sql_type = Nullable<Text>)]
    #[diesel(column_name = to_)]
    pub referenced_column: Option<String>,
    #[diesel(sql_type = Text)]
    pub on_delete: String,
}

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

fn known_table(table: &str) -> Result<&'static str, StorageError> {
    TABLES
        .iter()
        .copied()
        .find(|t| *t == table)
        .ok_or_else(|| StorageError::InvalidInput(format!("unknown table '{table}'")))
}

impl Store {
    /// Ordinary tables currently present, excluding SQLite and Diesel bookkeeping
    /// and FTS5 shadow tables.
    pub async fn list_tables(&self) -> Result<Vec<String>, StorageError> {
        self.interact(|conn| {
            let rows = diesel::sql_query(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' \
                   AND name NOT LIKE 'sqlite_%' \
                   AND name NOT LIKE '__diesel_%' \
                   AND name NOT LIKE '%_fts%' \
                 ORDER BY name",
            )
            .load::<TableName>(conn)?;
            Ok(rows.into_iter().map(|r| r.name).collect())
        })
        .await
    }

    pub async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>, StorageError> {
        let table = known_table(table)?;
        self.interact(move |conn| {
            Ok(diesel::sql_query(
                "SELECT name, type AS type_, \"notnull\" AS not_null, dflt_value, pk \
                 FROM pragma_table_info(?) ORDER BY cid",
            )
            .bind::<Text, _>(table)
            .load::<ColumnInfo>(conn)?)
        })
        .await
    }

    pub async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, StorageError> {
        let table = known_table(table)?;
        self.interact(move |conn| {
            Ok(diesel::sql_query(
                "SELECT \"table\" AS table_, \"from\" AS from_, \"to\" AS to_, on_delete \
                 FROM pragma_foreign_key_list(?) ORDER BY id, seq",
            )
            .bind::<Text, _>(table)
            .load::<ForeignKeyInfo>(conn)?)
        })
        .await
    }

    pub async fn row_count(&self, table: &str) -> Result<i64, StorageError> {
        let table = known_table(table)?;
        self.interact(move |conn| {
            let row = diesel::sql_query(format!("SELECT COUNT(*) AS n FROM {table}"))
                .get_result::<RowCount>(conn)?;
            Ok(row.n)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for t in TABLES {
            assert!(seen.insert(*t), "{t} listed twice");
        }
    }

    #[test]
    fn cascade_owned_tables_are_known() {
        for t in CASCADE_OWNED {
            assert!(known_table(t).is_ok(), "{t} missing from TABLES");
        }
        assert!(known_table("sqlite_master").is_err());
    }
}
