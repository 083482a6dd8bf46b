use crate::storage::document::{Document, Json};
use crate::storage::schema::{
    agendas, announcements, attendance_records, attendance_sessions, audit_logs, bill_items,
    bills, class_members, classes, devices, faults, izin, kunjungan, media, mv_latest_attendance,
    news, notifications, pages, rfid_tags, roles, santri, sessions, settings, user_roles, users,
};
use diesel::prelude::*;
use serde::Serialize;

// Accounts

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(primary_key(uid))]
#[diesel(treat_none_as_null = true)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub role_default: Option<String>,
    pub is_active: bool,
    pub metadata: Option<Document>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = roles)]
pub struct Role {
    pub role_id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<Json>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = user_roles)]
pub struct UserRole {
    pub id: i64,
    pub uid: String,
    pub role_id: String,
    pub assigned_at: Option<i64>,
}

#[derive(Insertable)]
#[diesel(table_name = user_roles)]
pub struct NewUserRole<'a> {
    pub uid: &'a str,
    pub role_id: &'a str,
    pub assigned_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub session_id: String,
    pub uid: Option<String>,
    pub ip_addr: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub meta: Option<Document>,
}

// Students and rosters

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = santri)]
#[diesel(primary_key(santri_id))]
#[diesel(treat_none_as_null = true)]
pub struct Santri {
    pub santri_id: String,
    pub name: String,
    pub nis: Option<String>,
    pub room: Option<String>,
    pub maskan: Option<String>,
    pub phone: Option<String>,
    pub parent_info: Option<Document>,
    pub extra: Option<Document>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = classes)]
pub struct Class {
    pub class_id: String,
    pub title: Option<String>,
    pub level: Option<String>,
    pub code: Option<String>,
    pub color: Option<String>,
    pub meta: Option<Document>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = class_members)]
pub struct ClassMember {
    pub id: i64,
    pub class_id: String,
    pub santri_id: String,
    pub joined_at: Option<i64>,
    pub left_at: Option<i64>,
}

#[derive(Insertable)]
#[diesel(table_name = class_members)]
pub struct NewClassMember<'a> {
    pub class_id: &'a str,
    pub santri_id: &'a str,
    pub joined_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = devices)]
pub struct Device {
    pub device_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub meta: Option<Document>,
    pub last_seen: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = rfid_tags)]
pub struct RfidTag {
    pub uid: String,
    pub santri_id: Option<String>,
    pub issued_at: Option<i64>,
    pub revoked_at: Option<i64>,
    pub meta: Option<Document>,
}

// Attendance

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = attendance_sessions)]
pub struct AttendanceSession {
    pub session_key: String,
    pub title: Option<String>,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub created_by: Option<String>,
    pub meta: Option<Document>,
}

/// One check-in. `name`, `kamar` and `maskan` are copied from the student at
/// scan time so the record still reads correctly after the student row changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = attendance_records)]
pub struct AttendanceRecord {
    pub id: String,
    pub session_key: Option<String>,
    pub santri_id: Option<String>,
    pub name: Option<String>,
    pub kamar: Option<String>,
    pub maskan: Option<String>,
    pub device_id: Option<String>,
    pub rfid_uid: Option<String>,
    pub recorded_by: Option<String>,
    pub ts: Option<i64>,
    pub status: Option<String>,
    pub meta: Option<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = mv_latest_attendance)]
pub struct LatestAttendance {
    pub santri_id: String,
    pub record_id: String,
    pub ts: Option<i64>,
    pub status: Option<String>,
    pub session_key: Option<String>,
    pub name: Option<String>,
    pub refreshed_at: i64,
}

// Calendar, broadcast and delivery

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = agendas)]
pub struct Agenda {
    pub agenda_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub start_iso: Option<String>,
    pub end_iso: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub thumb_url: Option<String>,
    pub meta: Option<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = announcements)]
pub struct Announcement {
    pub announcement_id: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub level: Option<String>,
    pub days: Option<Json>,
    pub times: Option<Json>,
    pub tts_enabled: bool,
    pub tts_voice: Option<String>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub created_by: Option<String>,
    pub created_at: Option<i64>,
    pub meta: Option<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: i64,
    pub target_uid: Option<String>,
    pub kind: Option<String>,
    pub payload: Option<Document>,
    pub sent_at: Option<i64>,
    pub status: Option<String>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub target_uid: Option<String>,
    pub kind: Option<String>,
    pub payload: Option<Document>,
    pub status: Option<String>,
    pub created_at: Option<i64>,
}

// CMS

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = media)]
pub struct Media {
    pub media_id: String,
    pub filename: Option<String>,
    pub url: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
    pub uploaded_by: Option<String>,
    pub uploaded_at: Option<i64>,
    pub meta: Option<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = pages)]
#[diesel(primary_key(page_id))]
#[diesel(treat_none_as_null = true)]
pub struct Page {
    pub page_id: String,
    pub slug: String,
    pub title: Option<String>,
    pub content_html: Option<String>,
    pub content_json: Option<Json>,
    pub excerpt: Option<String>,
    pub author_uid: Option<String>,
    pub published_at: Option<i64>,
    pub status: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub meta: Option<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = news)]
#[diesel(primary_key(news_id))]
#[diesel(treat_none_as_null = true)]
pub struct News {
    pub news_id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub cover_media_id: Option<String>,
    pub content_html: Option<String>,
    pub content_json: Option<Json>,
    pub excerpt: Option<String>,
    pub slug: Option<String>,
    pub published_at: Option<i64>,
    pub created_by: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub meta: Option<Document>,
}

// Billing

/// Amounts are integer minor units (rupiah carry no decimals in practice).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = bills)]
pub struct Bill {
    pub bill_id: String,
    pub santri_id: Option<String>,
    pub period: Option<String>,
    pub total: Option<i64>,
    pub status: Option<String>,
    pub metadata: Option<Document>,
    pub created_at: Option<i64>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = bill_items)]
pub struct BillItem {
    pub id: i64,
    pub bill_id: Option<String>,
    pub key_name: Option<String>,
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub original: Option<i64>,
    pub discount: Option<i64>,
    pub qty: i32,
    pub meta: Option<Document>,
}

/// Line item for [`Bill`]; `bill_id` is filled in by the store.
#[derive(Debug, Clone, Default)]
pub struct NewBillItem {
    pub key_name: Option<String>,
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub original: Option<i64>,
    pub discount: Option<i64>,
    /// `None` takes the column default of 1.
    pub qty: Option<i32>,
    pub meta: Option<Document>,
}

#[derive(Insertable)]
#[diesel(table_name = bill_items)]
pub(crate) struct BillItemRow<'a> {
    pub bill_id: &'a str,
    pub key_name: Option<&'a str>,
    pub title: Option<&'a str>,
    pub amount: Option<i64>,
    pub original: Option<i64>,
    pub discount: Option<i64>,
    pub qty: Option<i32>,
    pub meta: Option<&'a Document>,
}

// Discipline, leave and visits

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = faults)]
pub struct Fault {
    pub fault_id: String,
    pub santri_id: Option<String>,
    pub pelapor_uid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kategori: Option<String>,
    pub poin: Option<i32>,
    pub tindakan: Option<String>,
    pub status: Option<String>,
    pub tanggal: Option<i64>,
    pub attachments: Option<Json>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = izin)]
pub struct Izin {
    pub izin_id: String,
    pub santri_id: Option<String>,
    pub requester_uid: Option<String>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub requested_at: Option<i64>,
    pub planned_out_at: Option<i64>,
    pub planned_return_at: Option<i64>,
    pub actual_return_at: Option<i64>,
    pub status: Option<String>,
    pub penjemput: Option<Json>,
    pub meta: Option<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = kunjungan)]
pub struct Kunjungan {
    pub visit_id: String,
    pub santri_id: Option<String>,
    pub visitor_name: Option<String>,
    pub relation: Option<String>,
    pub arrived_at: Option<i64>,
    pub left_at: Option<i64>,
    pub purpose: Option<String>,
    pub created_at: Option<i64>,
    pub meta: Option<Document>,
}

// Audit and settings

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = audit_logs)]
pub struct AuditLog {
    pub id: i64,
    pub uid: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub payload: Option<Document>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct NewAuditLog {
    pub uid: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub payload: Option<Document>,
    /// `None` lets the database stamp the current epoch milliseconds.
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = settings)]
pub struct Setting {
    pub key: String,
    pub value: Option<Json>,
    pub updated_at: Option<i64>,
}
