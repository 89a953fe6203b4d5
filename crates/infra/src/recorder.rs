//! Sales recorder: the append-only sales history.

use chrono::{DateTime, Utc};

use ezstock_inventory::{Price, Quantity};
use ezstock_sales::{SaleRecord, SalesSummary};

use crate::error::LedgerResult;
use crate::store::Store;

/// Result of a clear-history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    /// The operator did not confirm; history untouched.
    Declined,
    Cleared { removed: u64 },
}

/// Sales-history service.
///
/// Sales made through the ledger are written by its atomic sale commit;
/// `record` appends an entry on its own.
#[derive(Debug, Clone)]
pub struct SalesRecorder<S> {
    store: S,
}

impl<S> SalesRecorder<S>
where
    S: Store,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append one sale. Only field presence is checked.
    pub fn record(
        &self,
        product_name: &str,
        quantity_sold: Quantity,
        total_price: Price,
        date_sold: DateTime<Utc>,
    ) -> LedgerResult<SaleRecord> {
        let record = SaleRecord::new(product_name, quantity_sold, total_price, date_sold)?;
        self.store.append_sale(&record)?;
        tracing::info!(
            product_name = %record.product_name,
            quantity_sold = record.quantity_sold.get(),
            total_price = %record.total_price,
            "sale recorded"
        );
        Ok(record)
    }

    /// Full history, most recent first. Empty when nothing was sold.
    pub fn list(&self) -> LedgerResult<Vec<SaleRecord>> {
        Ok(self.store.list_sales()?)
    }

    /// Irreversibly delete the whole history once the operator confirmed.
    pub fn clear_all(&self, confirmed: bool) -> LedgerResult<Clearance> {
        if !confirmed {
            tracing::debug!("clear sales history declined");
            return Ok(Clearance::Declined);
        }
        let removed = self.store.clear_sales()?;
        tracing::info!(removed, "sales history cleared");
        Ok(Clearance::Cleared { removed })
    }

    /// Transactions, units and revenue over the current history.
    pub fn summary(&self) -> LedgerResult<SalesSummary> {
        let records = self.store.list_sales()?;
        Ok(SalesSummary::from_records(&records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use crate::error::LedgerError;
    use crate::store::InMemoryStore;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn recorder() -> SalesRecorder<InMemoryStore> {
        SalesRecorder::new(InMemoryStore::new())
    }

    #[test]
    fn empty_history_lists_as_empty() {
        assert!(recorder().list().unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first() {
        let recorder = recorder();
        let price = Price::parse("10").unwrap();
        recorder
            .record("Pen", Quantity::new(1), price, test_time())
            .unwrap();
        recorder
            .record("Ink", Quantity::new(2), price, test_time() + Duration::hours(1))
            .unwrap();

        let names: Vec<_> = recorder
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.product_name)
            .collect();
        assert_eq!(names, vec!["Ink", "Pen"]);
    }

    #[test]
    fn record_requires_fields() {
        let recorder = recorder();
        let err = recorder
            .record("", Quantity::new(1), Price::ZERO, test_time())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(recorder.list().unwrap().is_empty());
    }

    #[test]
    fn clear_all_requires_confirmation_and_is_idempotent() {
        let recorder = recorder();
        recorder
            .record("Pen", Quantity::new(1), Price::ZERO, test_time())
            .unwrap();

        assert_eq!(recorder.clear_all(false).unwrap(), Clearance::Declined);
        assert_eq!(recorder.list().unwrap().len(), 1);

        assert_eq!(
            recorder.clear_all(true).unwrap(),
            Clearance::Cleared { removed: 1 }
        );
        assert_eq!(
            recorder.clear_all(true).unwrap(),
            Clearance::Cleared { removed: 0 }
        );
        assert!(recorder.list().unwrap().is_empty());
    }

    #[test]
    fn summary_adds_up_history() {
        let recorder = recorder();
        recorder
            .record("Pen", Quantity::new(3), Price::parse("15").unwrap(), test_time())
            .unwrap();
        recorder
            .record("Ink", Quantity::new(1), Price::parse("2.5").unwrap(), test_time())
            .unwrap();

        let summary = recorder.summary().unwrap();
        assert_eq!(summary.transactions, 2);
        assert_eq!(summary.units_sold, 4);
        assert_eq!(summary.revenue, dec!(17.5));
    }
}
