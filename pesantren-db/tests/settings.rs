mod common;

use std::collections::BTreeMap;

use pesantren_db::settings::Settings;
use pesantren_db::storage::StorageError;
use serde_json::{Value, json};

fn defaults() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("site_name".to_string(), json!("Pondok Al-Hikmah")),
        ("attendance_grace_minutes".to_string(), json!(15)),
    ])
}

#[tokio::test]
async fn defaults_apply_when_no_row_exists() {
    let (store, _dir) = common::open_store().await;
    let settings = Settings::new(store, defaults());

    assert_eq!(
        settings.get("attendance_grace_minutes").await.unwrap(),
        Some(json!(15))
    );
    assert!(settings.get_row("attendance_grace_minutes").await.unwrap().is_none());
    assert_eq!(settings.get("unknown").await.unwrap(), None);
    assert!(settings.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn init_never_overwrites_existing_rows() {
    let (store, _dir) = common::open_store().await;
    let settings = Settings::new(store, defaults());

    settings.set("site_name", json!("Pesantren Baru")).await.unwrap();
    assert_eq!(settings.init().await.unwrap(), 1);
    assert_eq!(settings.init().await.unwrap(), 0);

    assert_eq!(
        settings.get("site_name").await.unwrap(),
        Some(json!("Pesantren Baru"))
    );
    let keys: Vec<String> = settings
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.key)
        .collect();
    assert_eq!(keys, ["attendance_grace_minutes", "site_name"]);
}

#[tokio::test]
async fn set_overwrites_and_stamps_update_time() {
    let (store, _dir) = common::open_store().await;
    let settings = Settings::new(store, BTreeMap::new());

    settings
        .set("jadwal", json!({"subuh": "04:30", "hari": ["senin", "kamis"]}))
        .await
        .unwrap();
    settings.set("jadwal", json!({"subuh": "04:15"})).await.unwrap();

    let row = settings.get_row("jadwal").await.unwrap().unwrap();
    assert_eq!(row.value.map(|v| v.0), Some(json!({"subuh": "04:15"})));
    assert!(row.updated_at.unwrap() > 0);

    assert!(matches!(
        settings.set("", json!(1)).await,
        Err(StorageError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn remove_restores_the_default() {
    let (store, _dir) = common::open_store().await;
    let settings = Settings::new(store, defaults());

    settings.set("site_name", json!("Sementara")).await.unwrap();
    assert!(settings.remove("site_name").await.unwrap());
    assert!(!settings.remove("site_name").await.unwrap());
    assert_eq!(
        settings.get("site_name").await.unwrap(),
        Some(json!("Pondok Al-Hikmah"))
    );
}

#[tokio::test]
async fn stored_null_shadows_the_default() {
    let (store, _dir) = common::open_store().await;
    let settings = Settings::new(store, defaults());

    settings.set("site_name", Value::Null).await.unwrap();
    assert_eq!(settings.get("site_name").await.unwrap(), Some(Value::Null));
}
