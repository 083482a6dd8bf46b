#![allow(dead_code)]

use pesantren_db::storage::Store;
use pesantren_db::storage::models::{Santri, User};
use tempfile::TempDir;

/// A migrated store backed by a database file that lives as long as the
/// returned directory.
pub async fn open_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let store = Store::connect_sqlite(path.to_str().unwrap())
        .await
        .expect("open store");
    (store, dir)
}

pub fn db_path(dir: &TempDir) -> String {
    dir.path().join("test.db").to_string_lossy().into_owned()
}

pub fn user(uid: &str) -> User {
    User {
        uid: uid.to_string(),
        display_name: Some(format!("User {uid}")),
        is_active: true,
        ..Default::default()
    }
}

pub fn santri(id: &str, name: &str) -> Santri {
    Santri {
        santri_id: id.to_string(),
        name: name.to_string(),
        maskan: Some("Maskan A".to_string()),
        room: Some("A-01".to_string()),
        ..Default::default()
    }
}
