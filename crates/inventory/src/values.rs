//! Value objects parsed from operator input.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ezstock_core::{DomainError, ValueObject};

/// Currency decoration accepted (and discarded) in price input.
const CURRENCY_SYMBOL: char = '₱';

/// Units of stock. Never negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl ValueObject for Quantity {}

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub fn new(units: u32) -> Self {
        Self(units)
    }

    /// Parse a sale quantity: ASCII digits only (no sign, no surrounding
    /// whitespace) and at least 1.
    pub fn parse_digits(raw: &str) -> Result<Self, DomainError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "quantity must contain digits only, got '{raw}'"
            )));
        }
        let units: u32 = raw
            .parse()
            .map_err(|_| DomainError::validation(format!("quantity {raw} is too large")))?;
        if units == 0 {
            return Err(DomainError::validation("quantity must be a positive number"));
        }
        Ok(Self(units))
    }

    /// Parse a strictly positive whole number of units.
    pub fn parse_positive(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("quantity is required"));
        }
        let units: i64 = trimmed.parse().map_err(|_| {
            DomainError::validation(format!("quantity must be a whole number, got '{trimmed}'"))
        })?;
        if units <= 0 {
            return Err(DomainError::validation("quantity must be a positive number"));
        }
        let units = u32::try_from(units)
            .map_err(|_| DomainError::validation(format!("quantity {units} is too large")))?;
        Ok(Self(units))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Remaining stock after taking `units`, or `None` when that would go negative.
    pub fn checked_sub(self, units: Quantity) -> Option<Quantity> {
        self.0.checked_sub(units.0).map(Quantity)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Exclusive upper bound for any amount: 100 billion.
const PRICE_LIMIT: Decimal = Decimal::from_parts(0x4876_E800, 0x17, 0, false, 0);

/// Non-negative, currency-free amount.
///
/// At most [`Price::MAX_SCALE`] decimal places and below 100 billion, so
/// every price (unit or sale total) has at most 15 significant digits and
/// survives a round trip through an IEEE-754 double unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl ValueObject for Price {}

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Decimal places a price may carry.
    pub const MAX_SCALE: u32 = 4;

    /// Wrap an amount, rejecting negatives, excess precision and amounts of
    /// 100 billion or more.
    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if amount.normalize().scale() > Self::MAX_SCALE {
            return Err(DomainError::validation(format!(
                "price supports at most {} decimal places",
                Self::MAX_SCALE
            )));
        }
        if amount >= PRICE_LIMIT {
            return Err(DomainError::validation(format!(
                "amount must be below {PRICE_LIMIT}"
            )));
        }
        Ok(Self(amount))
    }

    /// Parse operator input such as `"₱1,250.50"` or `"99"`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != CURRENCY_SYMBOL && *c != ',')
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(DomainError::validation("price is required"));
        }
        let amount = Decimal::from_str(cleaned)
            .or_else(|_| Decimal::from_scientific(cleaned))
            .map_err(|_| {
                DomainError::validation(format!("price must be a number, got '{}'", raw.trim()))
            })?;
        Self::new(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Total for `quantity` units at this unit price. Fails when the total
    /// leaves the supported range.
    pub fn times(&self, quantity: Quantity) -> Result<Price, DomainError> {
        let total = self
            .0
            .checked_mul(Decimal::from(quantity.get()))
            .ok_or_else(|| DomainError::validation("sale total is out of range"))?;
        Self::new(total).map_err(|_| {
            DomainError::validation(format!("sale total {total} is out of range"))
        })
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Title-case a display name: the first letter of every alphabetic run is
/// upper-cased and the rest lower-cased (`"o'neil's pen"` -> `"O'Neil'S Pen"`).
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantity_requires_positive_whole_number() {
        assert_eq!(Quantity::parse_positive(" 50 ").unwrap().get(), 50);
        assert!(Quantity::parse_positive("0").is_err());
        assert!(Quantity::parse_positive("-3").is_err());
        assert!(Quantity::parse_positive("2.5").is_err());
        assert!(Quantity::parse_positive("ten").is_err());
        assert!(Quantity::parse_positive("").is_err());
        assert!(Quantity::parse_positive("99999999999").is_err());
    }

    #[test]
    fn quantity_checked_sub_never_goes_negative() {
        let five = Quantity::new(5);
        assert_eq!(five.checked_sub(Quantity::new(5)), Some(Quantity::ZERO));
        assert_eq!(five.checked_sub(Quantity::new(6)), None);
    }

    #[test]
    fn price_strips_currency_decoration() {
        assert_eq!(Price::parse("₱120.00").unwrap().amount(), dec!(120));
        assert_eq!(Price::parse(" ₱1,250.50 ").unwrap().amount(), dec!(1250.50));
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse("1e3").unwrap().amount(), dec!(1000));
    }

    #[test]
    fn price_rejects_garbage_and_negatives() {
        assert!(Price::parse("").is_err());
        assert!(Price::parse("₱").is_err());
        assert!(Price::parse("abc").is_err());
        assert!(Price::parse("-1.00").is_err());
    }

    #[test]
    fn price_display_uses_two_decimals() {
        assert_eq!(Price::parse("120").unwrap().to_string(), "120.00");
        assert_eq!(Price::parse("0.5").unwrap().to_string(), "0.50");
    }

    #[test]
    fn total_is_unit_price_times_quantity() {
        let total = Price::parse("120.00").unwrap().times(Quantity::new(45)).unwrap();
        assert_eq!(total.amount(), dec!(5400));
    }

    #[test]
    fn price_range_and_precision_are_bounded() {
        assert_eq!(
            Price::parse("99,999,999,999.9999").unwrap().amount(),
            dec!(99999999999.9999)
        );
        assert_eq!(Price::parse("0.0001").unwrap().amount(), dec!(0.0001));
        assert_eq!(Price::parse("1.50000").unwrap().amount(), dec!(1.5));

        assert!(Price::parse("100000000000").is_err());
        assert!(Price::parse("1e28").is_err());
        assert!(Price::parse("79228162514264337593543950335").is_err());
        assert!(Price::parse("0.123456789012345678").is_err());
    }

    #[test]
    fn totals_out_of_range_are_errors_not_panics() {
        let top = Price::parse("99999999999.9999").unwrap();
        assert!(top.times(Quantity::new(2)).is_err());
        assert!(top.times(Quantity::new(u32::MAX)).is_err());
        assert_eq!(top.times(Quantity::new(1)).unwrap(), top);
    }

    #[test]
    fn price_deserialization_enforces_the_same_bounds() {
        let ok: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(ok.amount(), dec!(12.5));
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
        assert!(serde_json::from_str::<Price>("\"1e28\"").is_err());
    }

    #[test]
    fn sale_quantity_accepts_digits_only() {
        assert_eq!(Quantity::parse_digits("45").unwrap().get(), 45);
        assert_eq!(Quantity::parse_digits("007").unwrap().get(), 7);
        for raw in ["", "+5", "-5", " 5 ", "5 ", "0", "2.5", "five", "99999999999"] {
            assert!(Quantity::parse_digits(raw).is_err(), "{raw:?}");
        }
    }

    #[test]
    fn title_case_matches_form_behaviour() {
        assert_eq!(title_case("stapler"), "Stapler");
        assert_eq!(title_case("RED pen"), "Red Pen");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("3m tape"), "3M Tape");
        assert_eq!(title_case(""), "");
    }

    proptest! {
        #[test]
        fn title_case_is_idempotent(raw in "[a-zA-Z0-9 '&-]{0,40}") {
            let once = title_case(&raw);
            prop_assert_eq!(title_case(&once), once.clone());
            prop_assert_eq!(once.chars().count(), raw.chars().count());
        }

        #[test]
        fn positive_integers_parse_as_quantities(units in 1u32..1_000_000) {
            prop_assert_eq!(Quantity::parse_positive(&units.to_string()).unwrap().get(), units);
        }
    }
}
