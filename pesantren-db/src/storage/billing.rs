use diesel::prelude::*;
use tracing::debug;

use super::models::{Bill, BillItem, BillItemRow, NewBillItem};
use super::schema::{bill_items, bills};
use super::{StorageError, Store};

impl Store {
    /// Insert a bill together with its line items in one transaction.
    pub async fn create_bill(&self, bill: Bill, items: Vec<NewBillItem>) -> Result<(), StorageError> {
        debug!(bill_id = %bill.bill_id, items = items.len(), "create_bill");
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<(), StorageError> {
                diesel::insert_into(bills::table)
                    .values(&bill)
                    .execute(conn)?;
                for item in &items {
                    let row = BillItemRow {
                        bill_id: &bill.bill_id,
                        key_name: item.key_name.as_deref(),
                        title: item.title.as_deref(),
                        amount: item.amount,
                        original: item.original,
                        discount: item.discount,
                        qty: item.qty,
                        meta: item.meta.as_ref(),
                    };
                    diesel::insert_into(bill_items::table)
                        .values(&row)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    pub async fn get_bill(&self, bill_id: &str) -> Result<Option<Bill>, StorageError> {
        let id = bill_id.to_string();
        self.interact(move |conn| {
            Ok(bills::table
                .find(&id)
                .select(Bill::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn bill_items(&self, bill_id: &str) -> Result<Vec<BillItem>, StorageError> {
        let id = bill_id.to_string();
        self.interact(move |conn| {
            Ok(bill_items::table
                .filter(bill_items::bill_id.eq(&id))
                .order(bill_items::id.asc())
                .select(BillItem::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn bills_for_santri(&self, santri_id: &str) -> Result<Vec<Bill>, StorageError> {
        let id = santri_id.to_string();
        self.interact(move |conn| {
            Ok(bills::table
                .filter(bills::santri_id.eq(&id))
                .order(bills::period.desc())
                .select(Bill::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn set_bill_status(&self, bill_id: &str, status: &str) -> Result<bool, StorageError> {
        let id = bill_id.to_string();
        let status = status.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(bills::table.find(&id))
                .set(bills::status.eq(Some(status)))
                .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }

    /// Line items are deleted with the bill.
    pub async fn delete_bill(&self, bill_id: &str) -> Result<bool, StorageError> {
        let id = bill_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(bills::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }
}

/// Amount due for one line: `amount * qty - discount`, never below zero.
/// Missing amounts count as zero.
pub fn line_total(item: &BillItem) -> i64 {
    let gross = item.amount.unwrap_or(0).saturating_mul(i64::from(item.qty));
    gross.saturating_sub(item.discount.unwrap_or(0)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(amount: Option<i64>, qty: i32, discount: Option<i64>) -> BillItem {
        BillItem {
            id: 1,
            bill_id: Some("b1".into()),
            key_name: None,
            title: None,
            amount,
            original: amount,
            discount,
            qty,
            meta: None,
        }
    }

    #[test]
    fn line_total_applies_qty_and_discount() {
        assert_eq!(line_total(&item(Some(150_000), 2, Some(50_000))), 250_000);
        assert_eq!(line_total(&item(Some(10_000), 1, None)), 10_000);
    }

    #[test]
    fn line_total_clamps_at_zero() {
        assert_eq!(line_total(&item(Some(5_000), 1, Some(9_000))), 0);
        assert_eq!(line_total(&item(None, 3, None)), 0);
    }
}
