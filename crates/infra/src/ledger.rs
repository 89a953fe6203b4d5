//! Inventory ledger: stock-item mutations over a [`Store`].
//!
//! Each public operation validates raw form input, decides the change with
//! the pure domain types from `ezstock-inventory`, and commits it with a
//! single store call. A rejected operation never writes.

use chrono::{DateTime, Utc};

use ezstock_core::{DomainError, Entity, ItemId};
use ezstock_events::Event;
use ezstock_inventory::{
    InventoryEvent, ItemAdded, ItemForm, ItemRemoved, ItemUpdated, Quantity, StockItem,
};
use ezstock_sales::SaleRecord;

use crate::error::{LedgerError, LedgerResult};
use crate::store::Store;

/// Source of "now" for timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The operator did not confirm; nothing was touched.
    Declined,
    Removed(StockItem),
}

/// Result of a successful sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOutcome {
    /// The item after the decrement.
    pub item: StockItem,
    /// The history entry written alongside the decrement.
    pub record: SaleRecord,
    pub remaining: Quantity,
    /// `remaining <= LOW_STOCK_THRESHOLD`, derived fresh for this sale.
    pub low_stock: bool,
}

/// One row of a ledger listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub item: StockItem,
    pub low_stock: bool,
}

/// Stock-item service.
#[derive(Debug, Clone)]
pub struct InventoryLedger<S> {
    store: S,
    clock: Clock,
}

impl<S> InventoryLedger<S>
where
    S: Store,
{
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Utc::now)
    }

    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a new item. The name is title-cased and `date_added` stamped now.
    pub fn add(&self, form: &ItemForm) -> LedgerResult<StockItem> {
        let draft = form.validate()?;
        let item = StockItem::create(draft, (self.clock)());

        self.store.insert_item(&item)?;

        self.emit(&InventoryEvent::ItemAdded(ItemAdded { item: item.clone() }));
        Ok(item)
    }

    /// Overwrite name, quantity, price and category of an existing item.
    pub fn update(&self, form: &ItemForm) -> LedgerResult<StockItem> {
        let draft = form.validate()?;
        let mut item = self
            .store
            .find_item(&draft.id)?
            .ok_or_else(|| not_found(&draft.id))?;

        item.revise(draft)?;
        if !self.store.update_item(&item)? {
            return Err(not_found(item.id()));
        }

        self.emit(&InventoryEvent::ItemUpdated(ItemUpdated {
            item: item.clone(),
            occurred_at: (self.clock)(),
        }));
        Ok(item)
    }

    /// Permanently remove an item, but only once the operator confirmed.
    pub fn delete(&self, id: &str, confirmed: bool) -> LedgerResult<Removal> {
        if !confirmed {
            tracing::debug!(item_id = id, "delete declined");
            return Ok(Removal::Declined);
        }

        let id = ItemId::parse(id)?;
        let item = self.store.find_item(&id)?.ok_or_else(|| not_found(&id))?;
        if !self.store.delete_item(&id)? {
            return Err(not_found(&id));
        }

        self.emit(&InventoryEvent::ItemRemoved(ItemRemoved {
            item_id: id,
            occurred_at: (self.clock)(),
        }));
        Ok(Removal::Removed(item))
    }

    /// Sell `quantity` units of the item whose id or name equals `id_or_name`.
    ///
    /// `id_or_name` is matched verbatim and `quantity` must be ASCII digits
    /// only. When several items match, the first one in insertion order wins.
    /// The decrement and the sales-history entry are committed together.
    pub fn sell(&self, id_or_name: &str, quantity: &str) -> LedgerResult<SaleOutcome> {
        if id_or_name.is_empty() {
            return Err(DomainError::validation("item id or name is required").into());
        }
        let quantity = Quantity::parse_digits(quantity)?;

        let mut item = self
            .store
            .find_by_id_or_name(id_or_name)?
            .ok_or_else(|| LedgerError::NotFound(format!("item '{id_or_name}'")))?;

        let sold = match item.sell(quantity, (self.clock)()) {
            Ok(sold) => sold,
            Err(err) => {
                tracing::warn!(item_id = %item.id(), requested = quantity.get(), available = item.quantity().get(), "sale rejected");
                return Err(err.into());
            }
        };
        let record = SaleRecord::from(&sold);

        self.store.commit_sale(&sold, &record)?;
        item.apply_sale(&sold);

        let low_stock = sold.is_low_stock();
        if low_stock {
            tracing::warn!(item_id = %item.id(), remaining = sold.remaining.get(), "low stock");
        }
        let remaining = sold.remaining;
        self.emit(&InventoryEvent::ItemSold(sold));

        Ok(SaleOutcome {
            item,
            record,
            remaining,
            low_stock,
        })
    }

    pub fn get(&self, id: &str) -> LedgerResult<StockItem> {
        let id = ItemId::parse(id)?;
        self.store.find_item(&id)?.ok_or_else(|| not_found(&id))
    }

    /// Every item in insertion order, each flagged against the low-stock threshold.
    pub fn list(&self) -> LedgerResult<Vec<StockLevel>> {
        let levels = self
            .store
            .list_items()?
            .into_iter()
            .map(|item| StockLevel {
                low_stock: item.is_low_stock(),
                item,
            })
            .collect();
        Ok(levels)
    }

    fn emit(&self, event: &InventoryEvent) {
        tracing::info!(
            event_type = event.event_type(),
            event_version = event.version(),
            occurred_at = %event.occurred_at(),
            "inventory event"
        );
    }
}

fn not_found(id: &ItemId) -> LedgerError {
    LedgerError::NotFound(format!("item {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::store::InMemoryStore;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn ledger() -> InventoryLedger<InMemoryStore> {
        InventoryLedger::with_clock(InMemoryStore::new(), fixed_clock)
    }

    fn stapler() -> ItemForm {
        ItemForm::new("1", "stapler", "50", "₱120.00", "Stationery")
    }

    #[test]
    fn add_returns_the_created_item() {
        let ledger = ledger();
        let item = ledger.add(&stapler()).unwrap();
        assert_eq!(item.name(), "Stapler");
        assert_eq!(item.date_added(), fixed_clock());
        assert_eq!(ledger.get("1").unwrap(), item);
    }

    #[test]
    fn add_with_duplicate_id_keeps_the_original() {
        let ledger = ledger();
        let original = ledger.add(&stapler()).unwrap();

        let err = ledger
            .add(&ItemForm::new("1", "glue", "3", "10", "Toys"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateKey(id) if id.as_str() == "1"));
        assert_eq!(ledger.get("1").unwrap(), original);
    }

    #[test]
    fn add_rejects_invalid_fields_without_writing() {
        let ledger = ledger();
        for form in [
            ItemForm::new("x1", "stapler", "50", "120", "Stationery"),
            ItemForm::new("1", "", "50", "120", "Stationery"),
            ItemForm::new("1", "stapler", "0", "120", "Stationery"),
            ItemForm::new("1", "stapler", "50", "-5", "Stationery"),
            ItemForm::new("1", "stapler", "50", "120", "Office"),
        ] {
            assert!(matches!(ledger.add(&form), Err(LedgerError::Validation(_))));
        }
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn update_overwrites_mutable_fields_only() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();

        let updated = ledger
            .update(&ItemForm::new("1", "big stapler", "8", "150.50", "Home & Living"))
            .unwrap();
        assert_eq!(updated.name(), "big stapler");
        assert_eq!(updated.quantity().get(), 8);
        assert_eq!(updated.price().amount(), dec!(150.50));
        assert_eq!(updated.date_added(), fixed_clock());
        assert_eq!(ledger.get("1").unwrap(), updated);
    }

    #[test]
    fn update_of_missing_item_is_not_found() {
        let ledger = ledger();
        let err = ledger.update(&stapler()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();

        assert_eq!(ledger.delete("1", false).unwrap(), Removal::Declined);
        assert!(ledger.get("1").is_ok());

        match ledger.delete("1", true).unwrap() {
            Removal::Removed(item) => assert_eq!(item.name(), "Stapler"),
            Removal::Declined => panic!("expected removal"),
        }
        assert!(matches!(ledger.get("1"), Err(LedgerError::NotFound(_))));
        assert!(matches!(ledger.delete("1", true), Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn sell_decrements_and_records_the_sale() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();

        let outcome = ledger.sell("1", "45").unwrap();
        assert_eq!(outcome.remaining.get(), 5);
        assert!(outcome.low_stock);
        assert_eq!(outcome.item.quantity().get(), 5);
        assert_eq!(outcome.record.product_name, "Stapler");
        assert_eq!(outcome.record.quantity_sold.get(), 45);
        assert_eq!(outcome.record.total_price.amount(), dec!(5400));
        assert_eq!(outcome.record.date_sold, fixed_clock());

        assert_eq!(ledger.get("1").unwrap().quantity().get(), 5);
        assert_eq!(ledger.store().list_sales().unwrap(), vec![outcome.record]);
    }

    #[test]
    fn sell_resolves_by_name() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();
        let outcome = ledger.sell("Stapler", "2").unwrap();
        assert_eq!(outcome.remaining.get(), 48);
        assert!(!outcome.low_stock);
    }

    #[test]
    fn sell_prefers_the_first_match() {
        let ledger = ledger();
        ledger.add(&ItemForm::new("7", "pen", "20", "5", "Stationery")).unwrap();
        ledger.add(&ItemForm::new("8", "7", "20", "9", "Stationery")).unwrap();

        let outcome = ledger.sell("7", "1").unwrap();
        assert_eq!(outcome.item.id().as_str(), "7");
        assert_eq!(ledger.get("8").unwrap().quantity().get(), 20);
    }

    #[test]
    fn overselling_changes_nothing() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();
        ledger.sell("1", "45").unwrap();

        let err = ledger.sell("1", "100").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock {
                requested: 100,
                available: 5
            }
        ));
        assert_eq!(ledger.get("1").unwrap().quantity().get(), 5);
        assert_eq!(ledger.store().list_sales().unwrap().len(), 1);
    }

    #[test]
    fn sell_validates_input_before_lookup() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();
        assert!(matches!(ledger.sell("", "1"), Err(LedgerError::Validation(_))));
        assert!(matches!(ledger.sell("1", "0"), Err(LedgerError::Validation(_))));
        assert!(matches!(ledger.sell("1", "two"), Err(LedgerError::Validation(_))));
        assert!(matches!(ledger.sell("99", "1"), Err(LedgerError::NotFound(_))));
        assert!(ledger.store().list_sales().unwrap().is_empty());
    }

    #[test]
    fn sell_quantity_must_be_bare_digits() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();
        for quantity in ["+5", " 5 ", "5 ", "-5"] {
            assert!(
                matches!(ledger.sell("1", quantity), Err(LedgerError::Validation(_))),
                "{quantity:?}"
            );
        }
        assert_eq!(ledger.get("1").unwrap().quantity().get(), 50);
        assert!(ledger.store().list_sales().unwrap().is_empty());
    }

    #[test]
    fn sell_matches_id_or_name_verbatim() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();
        assert!(matches!(ledger.sell(" 1", "1"), Err(LedgerError::NotFound(_))));
        assert!(matches!(ledger.sell("Stapler ", "1"), Err(LedgerError::NotFound(_))));
        assert!(matches!(ledger.sell(" ", "1"), Err(LedgerError::NotFound(_))));
        assert_eq!(ledger.sell("Stapler", "1").unwrap().remaining.get(), 49);
    }

    #[test]
    fn sale_total_out_of_range_is_rejected_without_writing() {
        let ledger = ledger();
        ledger
            .add(&ItemForm::new("1", "gem", "5", "99999999999.9999", "Toys"))
            .unwrap();
        assert!(matches!(ledger.sell("1", "2"), Err(LedgerError::Validation(_))));
        assert_eq!(ledger.get("1").unwrap().quantity().get(), 5);
        assert!(ledger.store().list_sales().unwrap().is_empty());
    }

    #[test]
    fn list_flags_low_stock_every_time() {
        let ledger = ledger();
        ledger.add(&stapler()).unwrap();
        ledger.add(&ItemForm::new("2", "glue", "10", "35", "Stationery")).unwrap();

        for _ in 0..2 {
            let flags: Vec<_> = ledger
                .list()
                .unwrap()
                .into_iter()
                .map(|level| (level.item.id().to_string(), level.low_stock))
                .collect();
            assert_eq!(
                flags,
                vec![("1".to_string(), false), ("2".to_string(), true)]
            );
        }
    }
}
