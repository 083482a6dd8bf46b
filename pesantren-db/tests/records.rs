mod common;

use diesel::prelude::*;
use diesel::sql_types::Text;
use pesantren_db::storage::billing::line_total;
use pesantren_db::storage::models::{
    Agenda, Announcement, AttendanceRecord, AttendanceSession, Bill, Device, Fault, Izin,
    Kunjungan, NewAuditLog, NewBillItem, NewNotification, RfidTag, Role, Session,
};
use pesantren_db::storage::{Document, Json, now_millis};
use serde_json::json;

#[tokio::test]
async fn documents_round_trip_unknown_keys() {
    let (store, _dir) = common::open_store().await;

    let mut student = common::santri("s-1", "Ahmad");
    student.parent_info = Some(
        Document::new()
            .with("ayah", "Hasan")
            .with("telepon", json!(["0812", "0813"])),
    );
    student.extra = Some(Document::new().with("legacy_key", json!({"nested": true})));
    store.upsert_santri(student.clone()).await.unwrap();
    assert_eq!(store.get_santri("s-1").await.unwrap(), Some(student.clone()));

    // Upsert replaces every column, clearing fields left as None
    student.extra = None;
    student.room = Some("B-02".into());
    store.upsert_santri(student.clone()).await.unwrap();
    let stored = store.get_santri("s-1").await.unwrap().unwrap();
    assert_eq!(stored.extra, None);
    assert_eq!(stored.room.as_deref(), Some("B-02"));

    let in_maskan = store.list_santri_in_maskan("Maskan A").await.unwrap();
    assert_eq!(in_maskan.len(), 1);
}

#[derive(QueryableByName)]
struct RawText {
    #[diesel(sql_type = Text)]
    value: String,
}

#[tokio::test]
async fn imported_non_object_documents_stay_readable() {
    let (store, dir) = common::open_store().await;
    store.upsert_santri(common::santri("s-1", "Ahmad")).await.unwrap();

    let mut conn = SqliteConnection::establish(&common::db_path(&dir)).unwrap();
    diesel::sql_query("UPDATE santri SET extra = '[1,2]', parent_info = '\"Hasan\"'")
        .execute(&mut conn)
        .unwrap();

    let mut student = store.get_santri("s-1").await.unwrap().unwrap();
    let extra = student.extra.clone().unwrap();
    assert_eq!(extra.get(Document::SCALAR_KEY), Some(&json!([1, 2])));
    assert_eq!(extra.to_value(), json!([1, 2]));
    assert_eq!(student.parent_info.as_ref().map(Document::to_value), Some(json!("Hasan")));

    // Written back in the shape it was read
    student.room = Some("C-03".into());
    store.upsert_santri(student).await.unwrap();
    let raw = diesel::sql_query("SELECT extra AS value FROM santri WHERE santri_id = 's-1'")
        .get_result::<RawText>(&mut conn)
        .unwrap();
    assert_eq!(raw.value, "[1,2]");
}

#[tokio::test]
async fn users_roles_and_sessions() {
    let (store, _dir) = common::open_store().await;

    let mut user = common::user("u-1");
    user.password_hash = Some("$2b$12$hash".into());
    user.metadata = Some(Document::new().with("source", "import"));
    store.upsert_user(user.clone()).await.unwrap();
    let stored = store.get_user("u-1").await.unwrap().unwrap();
    assert_eq!(stored, user);
    let public = serde_json::to_value(&stored).unwrap();
    assert!(public.get("password_hash").is_none());

    for (id, name) in [("wali", "Wali Santri"), ("admin", "Admin")] {
        store
            .insert_role(Role {
                role_id: id.into(),
                name: name.into(),
                permissions: Some(Json(json!(["read"]))),
                ..Default::default()
            })
            .await
            .unwrap();
        store.assign_role("u-1", id, Some(now_millis())).await.unwrap();
    }
    let names: Vec<String> = store
        .roles_for_user("u-1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["Admin", "Wali Santri"]);

    assert!(store.delete_role("admin").await.unwrap());
    assert_eq!(store.user_role_assignments("u-1").await.unwrap().len(), 1);

    for (id, expires) in [("old", Some(100)), ("live", Some(10_000)), ("forever", None)] {
        store
            .create_session(Session {
                session_id: id.into(),
                uid: Some("u-1".into()),
                created_at: Some(1),
                expires_at: expires,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    assert_eq!(store.purge_expired_sessions(5_000).await.unwrap(), 1);
    assert_eq!(store.sessions_for_user("u-1").await.unwrap().len(), 2);
    assert!(store.delete_session("live").await.unwrap());
}

#[tokio::test]
async fn rfid_resolution_ignores_revoked_tags() {
    let (store, _dir) = common::open_store().await;
    store.upsert_santri(common::santri("s-1", "Ahmad")).await.unwrap();
    store
        .issue_rfid_tag(RfidTag {
            uid: "04A1".into(),
            santri_id: Some("s-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .issue_rfid_tag(RfidTag {
            uid: "spare".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let who = store.resolve_rfid("04A1").await.unwrap().unwrap();
    assert_eq!(who.santri_id, "s-1");
    assert!(store.resolve_rfid("spare").await.unwrap().is_none());

    assert!(store.revoke_rfid_tag("04A1", 50).await.unwrap());
    assert!(store.resolve_rfid("04A1").await.unwrap().is_none());
    assert!(store.delete_rfid_tag("spare").await.unwrap());
}

#[tokio::test]
async fn class_membership_lifecycle() {
    let (store, _dir) = common::open_store().await;
    store.upsert_santri(common::santri("s-1", "Ahmad")).await.unwrap();
    store
        .insert_class(pesantren_db::storage::models::Class {
            class_id: "c-1".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let id = store.add_class_member("c-1", "s-1", Some(10)).await.unwrap();
    assert!(id > 0);
    assert!(store.end_class_membership("c-1", "s-1", 20).await.unwrap());
    assert!(!store.end_class_membership("c-1", "s-1", 30).await.unwrap());
    let members = store.memberships_for_santri("s-1").await.unwrap();
    assert_eq!(members[0].left_at, Some(20));

    assert!(store.delete_class("c-1").await.unwrap());
    assert!(store.memberships_for_santri("s-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn attendance_sessions_and_records() {
    let (store, _dir) = common::open_store().await;
    store.upsert_santri(common::santri("s-1", "Ahmad")).await.unwrap();
    store
        .register_device(Device {
            device_id: "gate-1".into(),
            location: Some("Gerbang Utama".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(store.touch_device("gate-1", 42).await.unwrap());
    assert_eq!(
        store.get_device("gate-1").await.unwrap().unwrap().last_seen,
        Some(42)
    );

    store
        .open_attendance_session(AttendanceSession {
            session_key: "subuh-2025-10-01".into(),
            started_at: Some(100),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(store.close_attendance_session("subuh-2025-10-01", 200).await.unwrap());
    assert!(!store.close_attendance_session("subuh-2025-10-01", 300).await.unwrap());

    let scan = |id: &str, ts: i64| AttendanceRecord {
        id: id.into(),
        session_key: Some("subuh-2025-10-01".into()),
        santri_id: Some("s-1".into()),
        device_id: Some("gate-1".into()),
        ts: Some(ts),
        ..Default::default()
    };
    assert_eq!(
        store
            .import_attendance(vec![scan("r-1", 110), scan("r-2", 120)])
            .await
            .unwrap(),
        2
    );

    // A duplicate id anywhere in the batch rolls back the whole import
    let err = store
        .import_attendance(vec![scan("r-3", 130), scan("r-1", 140)])
        .await
        .unwrap_err();
    assert!(err.constraint_kind().is_some());
    assert!(store.get_attendance_record("r-3").await.unwrap().is_none());

    let newest: Vec<String> = store
        .attendance_for_santri("s-1", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(newest, ["r-2", "r-1"]);
    assert_eq!(store.attendance_for_session("subuh-2025-10-01").await.unwrap()[0].id, "r-1");

    assert!(store.delete_device("gate-1").await.unwrap());
    assert!(store.delete_attendance_session("subuh-2025-10-01").await.unwrap());
    let kept = store.get_attendance_record("r-1").await.unwrap().unwrap();
    assert_eq!(kept.device_id, None);
    assert_eq!(kept.session_key, None);
    assert_eq!(store.import_attendance(Vec::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn billing_totals_and_status() {
    let (store, _dir) = common::open_store().await;
    store.upsert_santri(common::santri("s-1", "Ahmad")).await.unwrap();

    for period in ["2025-09", "2025-10"] {
        store
            .create_bill(
                Bill {
                    bill_id: format!("b-{period}"),
                    santri_id: Some("s-1".into()),
                    period: Some(period.into()),
                    status: Some("unpaid".into()),
                    ..Default::default()
                },
                vec![NewBillItem {
                    key_name: Some("spp".into()),
                    amount: Some(300_000),
                    discount: Some(50_000),
                    meta: Some(Document::new().with("beasiswa", true)),
                    ..Default::default()
                }],
            )
            .await
            .unwrap();
    }

    let bills = store.bills_for_santri("s-1").await.unwrap();
    assert_eq!(bills[0].period.as_deref(), Some("2025-10"));
    let items = store.bill_items("b-2025-10").await.unwrap();
    assert_eq!(line_total(&items[0]), 250_000);
    assert_eq!(items[0].meta.as_ref().and_then(|m| m.get("beasiswa")), Some(&json!(true)));

    assert!(store.set_bill_status("b-2025-10", "paid").await.unwrap());
    assert_eq!(
        store.get_bill("b-2025-10").await.unwrap().unwrap().status.as_deref(),
        Some("paid")
    );
}

#[tokio::test]
async fn discipline_leave_and_visits() {
    let (store, _dir) = common::open_store().await;
    store.upsert_santri(common::santri("s-1", "Ahmad")).await.unwrap();

    assert_eq!(store.total_poin("s-1").await.unwrap(), 0);
    for (id, poin) in [("f-1", Some(10)), ("f-2", Some(15)), ("f-3", None)] {
        store
            .record_fault(Fault {
                fault_id: id.into(),
                santri_id: Some("s-1".into()),
                poin,
                attachments: Some(Json(json!([{"url": "foto.jpg"}]))),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    assert_eq!(store.total_poin("s-1").await.unwrap(), 25);
    assert_eq!(store.faults_for_santri("s-1").await.unwrap().len(), 3);
    assert!(store.set_fault_status("f-1", "selesai").await.unwrap());

    store
        .file_izin(Izin {
            izin_id: "iz-1".into(),
            santri_id: Some("s-1".into()),
            planned_return_at: Some(1_000),
            penjemput: Some(Json(json!({"nama": "Hasan", "hubungan": "ayah"}))),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(store.overdue_izin(2_000).await.unwrap().len(), 1);
    assert!(store.overdue_izin(500).await.unwrap().is_empty());

    assert!(store.mark_izin_returned("iz-1", 1_500, Some("kembali")).await.unwrap());
    assert!(!store.mark_izin_returned("iz-1", 1_800, None).await.unwrap());
    let leave = store.get_izin("iz-1").await.unwrap().unwrap();
    assert_eq!(leave.actual_return_at, Some(1_500));
    assert_eq!(leave.status.as_deref(), Some("kembali"));
    assert!(store.overdue_izin(2_000).await.unwrap().is_empty());

    store
        .log_visit(Kunjungan {
            visit_id: "v-1".into(),
            santri_id: Some("s-1".into()),
            arrived_at: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(store.open_visits().await.unwrap().len(), 1);
    assert!(store.close_visit("v-1", 20).await.unwrap());
    assert!(!store.close_visit("v-1", 30).await.unwrap());
    assert!(store.open_visits().await.unwrap().is_empty());
}

#[tokio::test]
async fn calendar_and_announcements() {
    let (store, _dir) = common::open_store().await;

    for (id, start, end) in [
        ("before", 0, Some(50)),
        ("overlap", 80, Some(150)),
        ("inside", 120, None),
        ("after", 300, Some(400)),
    ] {
        store
            .insert_agenda(Agenda {
                agenda_id: id.into(),
                start_at: Some(start),
                end_at: end,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let ids: Vec<String> = store
        .agendas_between(100, 200)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.agenda_id)
        .collect();
    assert_eq!(ids, ["overlap", "inside"]);
    assert!(store.agendas_between(200, 100).await.unwrap().is_empty());

    for (id, start, end) in [("always", None, None), ("expired", Some(0), Some(10))] {
        store
            .insert_announcement(Announcement {
                announcement_id: id.into(),
                days: Some(Json(json!(["jumat"]))),
                tts_enabled: true,
                start_at: start,
                end_at: end,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let active = store.active_announcements(100).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].announcement_id, "always");
    assert!(active[0].tts_enabled);
    assert!(store.get_announcement("expired").await.unwrap().is_some());
}

#[tokio::test]
async fn notifications_and_audit_trail() {
    let (store, _dir) = common::open_store().await;
    store.upsert_user(common::user("u-1")).await.unwrap();

    let id = store
        .enqueue_notification(NewNotification {
            target_uid: Some("u-1".into()),
            kind: Some("tagihan".into()),
            payload: Some(Document::new().with("bill_id", "b-1")),
            status: Some("queued".into()),
            created_at: Some(1),
        })
        .await
        .unwrap();
    assert_eq!(store.pending_notifications(10).await.unwrap().len(), 1);
    assert!(store.mark_notification_sent(id, 5, "sent").await.unwrap());
    assert!(store.pending_notifications(10).await.unwrap().is_empty());
    let sent = store.notifications_for("u-1").await.unwrap();
    assert_eq!(sent[0].kind.as_deref(), Some("tagihan"));
    assert_eq!(sent[0].sent_at, Some(5));

    let before = now_millis();
    store
        .append_audit(NewAuditLog {
            uid: Some("u-1".into()),
            action: Some("bill.create".into()),
            entity_type: Some("bill".into()),
            entity_id: Some("b-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .append_audit(NewAuditLog {
            uid: Some("u-1".into()),
            action: Some("bill.pay".into()),
            entity_type: Some("bill".into()),
            entity_id: Some("b-1".into()),
            created_at: Some(before + 60_000),
            ..Default::default()
        })
        .await
        .unwrap();

    // Audit rows outlive the user they name
    store.delete_user("u-1").await.unwrap();
    let trail = store.audit_trail("bill", "b-1").await.unwrap();
    assert_eq!(trail.len(), 2);
    assert!(trail[0].created_at >= before - 1_000);
    assert_eq!(trail[1].action.as_deref(), Some("bill.pay"));
    assert_eq!(trail[0].uid.as_deref(), Some("u-1"));
}

#[tokio::test]
async fn cms_pages_and_news() {
    let (store, _dir) = common::open_store().await;

    let page = pesantren_db::storage::models::Page {
        page_id: "p-1".into(),
        slug: "sejarah".into(),
        title: Some("Sejarah Pondok".into()),
        content_json: Some(Json(json!({"blocks": []}))),
        ..Default::default()
    };
    store.upsert_page(page.clone()).await.unwrap();
    assert_eq!(store.get_page_by_slug("sejarah").await.unwrap(), Some(page));
    assert!(store.get_page_by_slug("lain").await.unwrap().is_none());

    for (id, published) in [("n-1", Some(10)), ("n-2", Some(20)), ("draft", None)] {
        store
            .upsert_news(pesantren_db::storage::models::News {
                news_id: id.into(),
                published_at: published,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let recent: Vec<String> = store
        .recent_news(10)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.news_id)
        .collect();
    assert_eq!(recent, ["n-2", "n-1"]);
    assert!(store.delete_news("draft").await.unwrap());
    assert!(store.get_media("none").await.unwrap().is_none());
}
