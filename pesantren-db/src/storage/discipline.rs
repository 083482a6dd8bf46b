use diesel::dsl::sum;
use diesel::prelude::*;
use tracing::trace;

use super::models::{Fault, Izin, Kunjungan};
use super::schema::{faults, izin, kunjungan};
use super::{StorageError, Store};

impl Store {
    pub async fn record_fault(&self, fault: Fault) -> Result<(), StorageError> {
        trace!(fault_id = %fault.fault_id, santri_id = ?fault.santri_id, "record_fault");
        self.interact(move |conn| {
            diesel::insert_into(faults::table)
                .values(&fault)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_fault(&self, fault_id: &str) -> Result<Option<Fault>, StorageError> {
        let id = fault_id.to_string();
        self.interact(move |conn| {
            Ok(faults::table
                .find(&id)
                .select(Fault::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn faults_for_santri(&self, santri_id: &str) -> Result<Vec<Fault>, StorageError> {
        let id = santri_id.to_string();
        self.interact(move |conn| {
            Ok(faults::table
                .filter(faults::santri_id.eq(&id))
                .order(faults::tanggal.desc())
                .select(Fault::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Sum of `poin` over a student's faults; zero when there are none.
    pub async fn total_poin(&self, santri_id: &str) -> Result<i64, StorageError> {
        let id = santri_id.to_string();
        self.interact(move |conn| {
            let total: Option<i64> = faults::table
                .filter(faults::santri_id.eq(&id))
                .select(sum(faults::poin))
                .first(conn)?;
            Ok(total.unwrap_or(0))
        })
        .await
    }

    pub async fn set_fault_status(&self, fault_id: &str, status: &str) -> Result<bool, StorageError> {
        let id = fault_id.to_string();
        let status = status.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(faults::table.find(&id))
                .set(faults::status.eq(Some(status)))
                .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    pub async fn file_izin(&self, leave: Izin) -> Result<(), StorageError> {
        trace!(izin_id = %leave.izin_id, santri_id = ?leave.santri_id, "file_izin");
        self.interact(move |conn| {
            diesel::insert_into(izin::table)
                .values(&leave)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_izin(&self, izin_id: &str) -> Result<Option<Izin>, StorageError> {
        let id = izin_id.to_string();
        self.interact(move |conn| {
            Ok(izin::table
                .find(&id)
                .select(Izin::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Record the actual return. Only the first call takes effect.
    pub async fn mark_izin_returned(
        &self,
        izin_id: &str,
        returned_at: i64,
        status: Option<&str>,
    ) -> Result<bool, StorageError> {
        let id = izin_id.to_string();
        let status = status.map(|s| s.to_string());
        self.interact(move |conn| {
            let target = izin::table
                .find(&id)
                .filter(izin::actual_return_at.is_null());
            let updated = match status {
                Some(s) => diesel::update(target)
                    .set((
                        izin::actual_return_at.eq(Some(returned_at)),
                        izin::status.eq(Some(s)),
                    ))
                    .execute(conn)?,
                None => diesel::update(target)
                    .set(izin::actual_return_at.eq(Some(returned_at)))
                    .execute(conn)?,
            };
            Ok(updated > 0)
        })
        .await
    }

    /// Leave requests whose planned return is before `now_ms` and that have not
    /// come back yet, most overdue first.
    pub async fn overdue_izin(&self, now_ms: i64) -> Result<Vec<Izin>, StorageError> {
        self.interact(move |conn| {
            Ok(izin::table
                .filter(izin::actual_return_at.is_null())
                .filter(izin::planned_return_at.lt(now_ms))
                .order(izin::planned_return_at.asc())
                .select(Izin::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn log_visit(&self, visit: Kunjungan) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(kunjungan::table)
                .values(&visit)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_visit(&self, visit_id: &str) -> Result<Option<Kunjungan>, StorageError> {
        let id = visit_id.to_string();
        self.interact(move |conn| {
            Ok(kunjungan::table
                .find(&id)
                .select(Kunjungan::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn close_visit(&self, visit_id: &str, left_at: i64) -> Result<bool, StorageError> {
        let id = visit_id.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(
                kunjungan::table
                    .find(&id)
                    .filter(kunjungan::left_at.is_null()),
            )
            .set(kunjungan::left_at.eq(Some(left_at)))
            .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    /// Visitors currently on the premises.
    pub async fn open_visits(&self) -> Result<Vec<Kunjungan>, StorageError> {
        self.interact(|conn| {
            Ok(kunjungan::table
                .filter(kunjungan::left_at.is_null())
                .order(kunjungan::arrived_at.asc())
                .select(Kunjungan::as_select())
                .load(conn)?)
        })
        .await
    }
}
