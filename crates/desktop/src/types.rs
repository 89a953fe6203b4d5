//! Display types handed to the window layer.
//!
//! Everything here is already formatted for the screen: prices carry the
//! currency symbol and thousands separators, timestamps are plain
//! `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ezstock_core::Entity;
use ezstock_infra::StockLevel;
use ezstock_inventory::Price;
use ezstock_sales::SaleRecord;

pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message box shown to the operator after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Error, title, message)
    }

    fn with_level(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one command: an optional payload plus the notices to show.
///
/// `data` is `None` when the command failed or the operator declined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult<T> {
    pub data: Option<T>,
    pub notices: Vec<Notice>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T, notices: Vec<Notice>) -> Self {
        Self {
            data: Some(data),
            notices,
        }
    }

    pub fn failed(notice: Notice) -> Self {
        Self {
            data: None,
            notices: vec![notice],
        }
    }

    /// Nothing happened and nothing needs saying.
    pub fn declined() -> Self {
        Self {
            data: None,
            notices: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.notices.iter().any(|n| n.level == NoticeLevel::Error)
    }
}

/// Row highlight in the inventory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStyle {
    Normal,
    /// Red background, white text.
    LowStock,
}

/// One row of the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub category: String,
    pub date_added: String,
    pub low_stock: bool,
    pub style: RowStyle,
}

impl InventoryRow {
    pub fn from_level(level: &StockLevel, currency_symbol: &str) -> Self {
        let item = &level.item;
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            quantity: item.quantity().get(),
            price: format_money(currency_symbol, item.price()),
            category: item.category().as_str().to_string(),
            date_added: format_timestamp(item.date_added()),
            low_stock: level.low_stock,
            style: if level.low_stock {
                RowStyle::LowStock
            } else {
                RowStyle::Normal
            },
        }
    }
}

/// One row of the sales-history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRow {
    pub product_name: String,
    pub quantity_sold: u32,
    pub total_price: String,
    pub date_sold: String,
}

impl SalesRow {
    pub fn from_record(record: &SaleRecord, currency_symbol: &str) -> Self {
        Self {
            product_name: record.product_name.clone(),
            quantity_sold: record.quantity_sold.get(),
            total_price: format_money(currency_symbol, record.total_price),
            date_sold: format_timestamp(record.date_sold),
        }
    }
}

/// Payload of a successful sale: the item after the decrement and the
/// history entry written with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleReceipt {
    pub item: InventoryRow,
    pub sale: SalesRow,
}

/// `₱1234.5` → `"₱1,234.50"`.
pub fn format_money(symbol: &str, price: Price) -> String {
    format!("{symbol}{}", group_thousands(price.amount()))
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_TIME_FORMAT).to_string()
}

fn group_thousands(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}.{fraction}")
}
