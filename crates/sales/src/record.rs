use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ezstock_core::{DomainError, DomainResult};
use ezstock_inventory::{ItemSold, Price, Quantity};

/// One line of the sales history. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product_name: String,
    pub quantity_sold: Quantity,
    pub total_price: Price,
    pub date_sold: DateTime<Utc>,
}

impl SaleRecord {
    /// Build a record, checking only that the fields are present.
    pub fn new(
        product_name: impl Into<String>,
        quantity_sold: Quantity,
        total_price: Price,
        date_sold: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let product_name = product_name.into();
        if product_name.trim().is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if quantity_sold == Quantity::ZERO {
            return Err(DomainError::validation("quantity sold must be positive"));
        }
        Ok(Self {
            product_name,
            quantity_sold,
            total_price,
            date_sold,
        })
    }

    /// The history entry a successful sale produces.
    pub fn from_sold(sold: &ItemSold) -> Self {
        Self {
            product_name: sold.product_name.clone(),
            quantity_sold: sold.quantity,
            total_price: sold.total_price,
            date_sold: sold.occurred_at,
        }
    }
}

impl From<&ItemSold> for SaleRecord {
    fn from(sold: &ItemSold) -> Self {
        Self::from_sold(sold)
    }
}

/// Order records in insertion order (oldest first) into display order:
/// most recent `date_sold` first, later insertions first on ties.
pub fn newest_first(mut records: Vec<SaleRecord>) -> Vec<SaleRecord> {
    records.reverse();
    // Stable sort keeps the reversed insertion order for equal timestamps.
    records.sort_by(|a, b| b.date_sold.cmp(&a.date_sold));
    records
}

/// Aggregate figures over a sales history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub transactions: usize,
    pub units_sold: u64,
    pub revenue: Decimal,
}

impl SalesSummary {
    /// Fails instead of overflowing when revenue leaves the `Decimal` range.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a SaleRecord>,
    ) -> DomainResult<Self> {
        records
            .into_iter()
            .try_fold(SalesSummary::default(), |mut acc, r| {
                acc.transactions += 1;
                acc.units_sold += u64::from(r.quantity_sold.get());
                acc.revenue = acc
                    .revenue
                    .checked_add(r.total_price.amount())
                    .ok_or_else(|| DomainError::validation("sales revenue is out of range"))?;
                Ok::<_, DomainError>(acc)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use ezstock_core::ItemId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn record(name: &str, units: u32, at: DateTime<Utc>) -> SaleRecord {
        let quantity = Quantity::new(units);
        SaleRecord::new(name, quantity, Price::parse("1").unwrap().times(quantity).unwrap(), at).unwrap()
    }

    #[test]
    fn from_sold_copies_sale_figures() {
        let sold = ItemSold {
            item_id: ItemId::parse("1").unwrap(),
            product_name: "Stapler".to_string(),
            unit_price: Price::parse("120").unwrap(),
            quantity: Quantity::new(45),
            previous_quantity: Quantity::new(50),
            remaining: Quantity::new(5),
            total_price: Price::parse("5400").unwrap(),
            occurred_at: test_time(),
        };
        let rec = SaleRecord::from(&sold);
        assert_eq!(rec.product_name, "Stapler");
        assert_eq!(rec.quantity_sold.get(), 45);
        assert_eq!(rec.total_price.amount(), dec!(5400));
        assert_eq!(rec.date_sold, test_time());
    }

    #[test]
    fn new_requires_name_and_positive_quantity() {
        assert!(SaleRecord::new(" ", Quantity::new(1), Price::ZERO, test_time()).is_err());
        assert!(SaleRecord::new("Pen", Quantity::ZERO, Price::ZERO, test_time()).is_err());
        assert!(SaleRecord::new("Pen", Quantity::new(1), Price::ZERO, test_time()).is_ok());
    }

    #[test]
    fn newest_first_orders_by_date_then_latest_insertion() {
        let t0 = test_time();
        let t1 = t0 + Duration::minutes(5);
        let ordered = newest_first(vec![
            record("a", 1, t0),
            record("b", 1, t1),
            record("c", 1, t0),
        ]);
        let names: Vec<_> = ordered.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn summary_of_empty_history_is_zero() {
        assert_eq!(
            SalesSummary::from_records(&Vec::<SaleRecord>::new()).unwrap(),
            SalesSummary::default()
        );
    }

    #[test]
    fn summary_totals_units_and_revenue() {
        let records = vec![record("a", 2, test_time()), record("b", 3, test_time())];
        let summary = SalesSummary::from_records(&records).unwrap();
        assert_eq!(summary.transactions, 2);
        assert_eq!(summary.units_sold, 5);
        assert_eq!(summary.revenue, dec!(5));
    }

    #[test]
    fn summary_of_maximum_totals_is_exact() {
        let top = Price::parse("99999999999.9999").unwrap();
        let records: Vec<_> = (0..1_000)
            .map(|_| SaleRecord::new("Gem", Quantity::new(1), top, test_time()).unwrap())
            .collect();
        let summary = SalesSummary::from_records(&records).unwrap();
        assert_eq!(summary.revenue, dec!(99999999999999.9000));
        assert_eq!(summary.units_sold, 1_000);
    }

    proptest! {
        #[test]
        fn newest_first_is_sorted_descending(offsets in prop::collection::vec(0i64..1_000, 0..20)) {
            let records: Vec<_> = offsets
                .iter()
                .map(|m| record("x", 1, test_time() + Duration::minutes(*m)))
                .collect();
            let ordered = newest_first(records.clone());
            prop_assert_eq!(ordered.len(), records.len());
            prop_assert!(ordered.windows(2).all(|w| w[0].date_sold >= w[1].date_sold));
        }
    }
}
