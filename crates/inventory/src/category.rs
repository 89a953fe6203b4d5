use core::str::FromStr;

use serde::{Deserialize, Serialize};

use ezstock_core::DomainError;

/// Fixed set of product categories offered by the item form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Category {
    Food,
    BeautyProducts,
    Toys,
    Medicine,
    Clothing,
    Stationery,
    HomeAndLiving,
    ElectronicsAndGadgets,
}

impl Category {
    /// Every category, in the order the form lists them.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::BeautyProducts,
        Category::Toys,
        Category::Medicine,
        Category::Clothing,
        Category::Stationery,
        Category::HomeAndLiving,
        Category::ElectronicsAndGadgets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::BeautyProducts => "Beauty Products",
            Category::Toys => "Toys",
            Category::Medicine => "Medicine",
            Category::Clothing => "Clothing",
            Category::Stationery => "Stationery",
            Category::HomeAndLiving => "Home & Living",
            Category::ElectronicsAndGadgets => "Electronics & Gadgets",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .ok_or_else(|| DomainError::validation(format!("unknown category '{label}'")))
    }
}

impl TryFrom<String> for Category {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for &'static str {
    fn from(value: Category) -> Self {
        value.as_str()
    }
}
