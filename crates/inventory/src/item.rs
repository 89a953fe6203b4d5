use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ezstock_core::{DomainError, DomainResult, Entity, ItemId};
use ezstock_events::Event;

use crate::category::Category;
use crate::values::{Price, Quantity, title_case};

/// Items at or below this many units are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Raw field values as typed into the item form (untrusted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub price: String,
    pub category: String,
}

impl ItemForm {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity: quantity.into(),
            price: price.into(),
            category: category.into(),
        }
    }

    /// Validate every field, reporting the first problem found.
    ///
    /// Blank fields are rejected before anything is parsed.
    pub fn validate(&self) -> DomainResult<ItemDraft> {
        let fields = [
            &self.id,
            &self.name,
            &self.quantity,
            &self.price,
            &self.category,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::validation("all fields are required"));
        }

        Ok(ItemDraft {
            id: ItemId::parse(&self.id)?,
            name: self.name.trim().to_string(),
            quantity: Quantity::parse_positive(&self.quantity)?,
            price: Price::parse(&self.price)?,
            category: self.category.parse()?,
        })
    }
}

/// Validated item fields, ready to create or revise a [`StockItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub id: ItemId,
    pub name: String,
    pub quantity: Quantity,
    pub price: Price,
    pub category: Category,
}

/// A stock item: one row of the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    id: ItemId,
    name: String,
    quantity: Quantity,
    price: Price,
    category: Category,
    date_added: DateTime<Utc>,
}

impl StockItem {
    /// Build a brand-new item from a draft. The name is title-cased.
    pub fn create(draft: ItemDraft, date_added: DateTime<Utc>) -> Self {
        Self {
            id: draft.id,
            name: title_case(&draft.name),
            quantity: draft.quantity,
            price: draft.price,
            category: draft.category,
            date_added,
        }
    }

    /// Rehydrate an item exactly as it was persisted.
    pub fn restore(
        id: ItemId,
        name: String,
        quantity: Quantity,
        price: Price,
        category: Category,
        date_added: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            quantity,
            price,
            category,
            date_added,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date_added(&self) -> DateTime<Utc> {
        self.date_added
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity.get() <= LOW_STOCK_THRESHOLD
    }

    /// Whether a sell lookup string refers to this item (id or exact name).
    pub fn matches(&self, id_or_name: &str) -> bool {
        self.id.as_str() == id_or_name || self.name == id_or_name
    }

    /// Overwrite the mutable fields. `id` and `date_added` never change.
    ///
    /// The name is taken as given (trimmed, not re-cased).
    pub fn revise(&mut self, draft: ItemDraft) -> DomainResult<()> {
        if draft.id != self.id {
            return Err(DomainError::validation("item id cannot be changed"));
        }
        self.name = draft.name;
        self.quantity = draft.quantity;
        self.price = draft.price;
        self.category = draft.category;
        Ok(())
    }

    /// Decide a sale of `quantity` units without mutating the item.
    ///
    /// State evolution happens in [`StockItem::apply_sale`].
    pub fn sell(&self, quantity: Quantity, occurred_at: DateTime<Utc>) -> DomainResult<ItemSold> {
        if quantity == Quantity::ZERO {
            return Err(DomainError::validation("quantity to sell must be positive"));
        }
        let remaining = self.quantity.checked_sub(quantity).ok_or_else(|| {
            DomainError::insufficient_stock(quantity.get(), self.quantity.get())
        })?;
        let total_price = self.price.times(quantity)?;

        Ok(ItemSold {
            item_id: self.id.clone(),
            product_name: self.name.clone(),
            unit_price: self.price,
            quantity,
            previous_quantity: self.quantity,
            remaining,
            total_price,
            occurred_at,
        })
    }

    /// Evolve the item from a sale previously decided by [`StockItem::sell`].
    pub fn apply_sale(&mut self, sold: &ItemSold) {
        self.quantity = sold.remaining;
    }
}

impl Entity for StockItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: StockItem,
}

/// Event: ItemUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item: StockItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemSold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSold {
    pub item_id: ItemId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: Quantity,
    /// Stock level the decision was made against.
    pub previous_quantity: Quantity,
    pub remaining: Quantity,
    pub total_price: Price,
    pub occurred_at: DateTime<Utc>,
}

impl ItemSold {
    pub fn is_low_stock(&self) -> bool {
        self.remaining.get() <= LOW_STOCK_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    ItemUpdated(ItemUpdated),
    ItemRemoved(ItemRemoved),
    ItemSold(ItemSold),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded(_) => "inventory.item.added",
            InventoryEvent::ItemUpdated(_) => "inventory.item.updated",
            InventoryEvent::ItemRemoved(_) => "inventory.item.removed",
            InventoryEvent::ItemSold(_) => "inventory.item.sold",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemAdded(e) => e.item.date_added,
            InventoryEvent::ItemUpdated(e) => e.occurred_at,
            InventoryEvent::ItemRemoved(e) => e.occurred_at,
            InventoryEvent::ItemSold(e) => e.occurred_at,
        }
    }
}
