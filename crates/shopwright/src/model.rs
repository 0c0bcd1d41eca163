//! Storefront domain types: catalog, cart, purchase form, confirmation, profile.

use crate::result::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Tolerance used when comparing money amounts read from the page
pub const PRICE_TOLERANCE: f64 = 0.01;

/// Pattern the purchase confirmation must contain
pub const ORDER_CONFIRMATION_PATTERN: &str = r"Id: (\d+)";

/// Product category offered by the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Phones
    Phones,
    /// Laptops
    Laptops,
    /// Monitors
    Monitors,
}

impl Category {
    /// Every category, in navigation order
    pub const ALL: [Self; 3] = [Self::Phones, Self::Laptops, Self::Monitors];

    /// Link text shown in the category sidebar
    #[must_use]
    pub const fn link_text(&self) -> &'static str {
        match self {
            Self::Phones => "Phones",
            Self::Laptops => "Laptops",
            Self::Monitors => "Monitors",
        }
    }

    /// Parse a category name, ignoring case and surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnsupportedCategory`] for any other name
    pub fn parse(name: &str) -> ShopResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "phones" => Ok(Self::Phones),
            "laptops" => Ok(Self::Laptops),
            "monitors" => Ok(Self::Monitors),
            _ => Err(ShopError::UnsupportedCategory {
                name: name.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.link_text())
    }
}

impl std::str::FromStr for Category {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Category the product is listed under, `None` when it was reached
    /// without a category filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Product {
    /// Create a new product
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64, category: Category) -> Self {
        Self {
            name: name.into(),
            price,
            category: Some(category),
        }
    }

    /// Create a product whose category is not known
    #[must_use]
    pub fn uncategorized(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            category: None,
        }
    }
}

/// A product placed in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product
    pub product: Product,
    /// When the line was added
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Create a line stamped with the current time
    #[must_use]
    pub fn now(product: Product) -> Self {
        Self {
            product,
            added_at: Utc::now(),
        }
    }
}

/// Sum of line prices
#[must_use]
pub fn lines_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(|l| l.product.price).sum()
}

/// Compare two amounts within [`PRICE_TOLERANCE`]
#[must_use]
pub fn amounts_match(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < PRICE_TOLERANCE
}

/// Parse a price shown on the page, dropping currency symbols and labels.
///
/// `"$360 *includes tax"` parses as `360.0`.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Checkout form contents. Validity is decided by the site.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaseForm {
    /// Buyer name
    pub name: String,
    /// Country
    pub country: String,
    /// City
    pub city: String,
    /// Credit card number
    pub card_number: String,
    /// Card expiry month
    pub expiry_month: String,
    /// Card expiry year
    pub expiry_year: String,
}

impl PurchaseForm {
    /// Create a purchase form
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        city: impl Into<String>,
        card_number: impl Into<String>,
        expiry_month: impl Into<String>,
        expiry_year: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            city: city.into(),
            card_number: card_number.into(),
            expiry_month: expiry_month.into(),
            expiry_year: expiry_year.into(),
        }
    }

    /// Whether any field is left blank
    #[must_use]
    pub fn has_blank_fields(&self) -> bool {
        [
            &self.name,
            &self.country,
            &self.city,
            &self.card_number,
            &self.expiry_month,
            &self.expiry_year,
        ]
        .iter()
        .any(|f| f.trim().is_empty())
    }
}

fn confirmation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ORDER_CONFIRMATION_PATTERN).expect("static pattern is valid"))
}

/// Confirmation produced by a successful purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Numeric order identifier (0 when the pattern did not match)
    pub order_id: u64,
    /// Whether the message matched `Id: \d+`
    pub matched_pattern: bool,
    /// Confirmation text as shown
    pub message: String,
}

impl OrderConfirmation {
    /// Build a confirmation from the message shown by the site
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let order_id = confirmation_regex()
            .captures(&message)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok());
        Self {
            order_id: order_id.unwrap_or(0),
            matched_pattern: order_id.is_some(),
            message,
        }
    }
}

/// Field of the stored profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileField {
    /// `fullname`
    FullName,
    /// `email`
    Email,
}

impl ProfileField {
    /// JSON key used in the stored object
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::FullName => "fullname",
            Self::Email => "email",
        }
    }

    /// Parse a stored key name
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown fields
    pub fn parse(name: &str) -> ShopResult<Self> {
        match name {
            "fullname" => Ok(Self::FullName),
            "email" => Ok(Self::Email),
            other => Err(ShopError::config(format!("unknown profile field: {other}"))),
        }
    }
}

/// Profile persisted in browser-local storage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionProfile {
    /// Full name
    #[serde(rename = "fullname", default)]
    pub full_name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
}

impl SessionProfile {
    /// Create a profile
    #[must_use]
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
        }
    }

    /// Get a single field
    #[must_use]
    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::Email => &self.email,
        }
    }

    /// Replace a single field, keeping the other
    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        match field {
            ProfileField::FullName => self.full_name = value.into(),
            ProfileField::Email => self.email = value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod category_tests {
        use super::*;

        #[test]
        fn test_parse_ignores_case() {
            assert_eq!(Category::parse("phones").unwrap(), Category::Phones);
            assert_eq!(Category::parse(" LAPTOPS ").unwrap(), Category::Laptops);
            assert_eq!("Monitors".parse::<Category>().unwrap(), Category::Monitors);
        }

        #[test]
        fn test_parse_unknown_category() {
            let err = Category::parse("Tablets").unwrap_err();
            assert!(matches!(err, ShopError::UnsupportedCategory { ref name } if name == "Tablets"));
        }

        #[test]
        fn test_display_matches_link_text() {
            for c in Category::ALL {
                assert_eq!(c.to_string(), c.link_text());
            }
        }
    }

    mod product_tests {
        use super::*;

        #[test]
        fn test_uncategorized_product_omits_category() {
            let json = serde_json::to_value(Product::uncategorized("MacBook air", 700.0)).unwrap();
            assert!(json.get("category").is_none());
            let back: Product = serde_json::from_value(json).unwrap();
            assert_eq!(back.category, None);
        }
    }

    mod price_tests {
        use super::*;

        #[test]
        fn test_parse_price_strips_labels() {
            assert_eq!(parse_price("$360 *includes tax"), Some(360.0));
            assert_eq!(parse_price(" 790 "), Some(790.0));
            assert_eq!(parse_price("12.50"), Some(12.5));
        }

        #[test]
        fn test_parse_price_rejects_garbage() {
            assert_eq!(parse_price(""), None);
            assert_eq!(parse_price("free"), None);
            assert_eq!(parse_price("1.2.3"), None);
        }

        #[test]
        fn test_lines_total() {
            let lines = vec![
                CartLine::now(Product::new("a", 360.0, Category::Phones)),
                CartLine::now(Product::new("b", 650.0, Category::Phones)),
            ];
            assert!(amounts_match(lines_total(&lines), 1010.0));
            assert!(amounts_match(lines_total(&[]), 0.0));
        }

        #[test]
        fn test_amounts_match_tolerance() {
            assert!(amounts_match(100.0, 100.009));
            assert!(!amounts_match(100.0, 100.02));
        }

        proptest! {
            #[test]
            fn prop_integer_prices_parse(n in 0u32..100_000) {
                prop_assert_eq!(parse_price(&format!("${n}")), Some(f64::from(n)));
            }
        }
    }

    mod confirmation_tests {
        use super::*;

        #[test]
        fn test_confirmation_with_id() {
            let c = OrderConfirmation::from_message(
                "Id: 8675309\nAmount: 360 USD\nCard Number: 4111111111111111",
            );
            assert!(c.matched_pattern);
            assert_eq!(c.order_id, 8_675_309);
        }

        #[test]
        fn test_confirmation_without_id() {
            let c = OrderConfirmation::from_message("Thank you for your purchase!");
            assert!(!c.matched_pattern);
            assert_eq!(c.order_id, 0);
        }

        proptest! {
            #[test]
            fn prop_any_id_is_extracted(id in 0u64..1_000_000_000, amount in 0u32..10_000) {
                let c = OrderConfirmation::from_message(format!("Id: {id}\nAmount: {amount} USD"));
                prop_assert!(c.matched_pattern);
                prop_assert_eq!(c.order_id, id);
            }
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn test_blank_fields() {
            let full = PurchaseForm::new("n", "c", "ci", "4111", "12", "2030");
            assert!(!full.has_blank_fields());
            let mut partial = full;
            partial.name = String::new();
            assert!(partial.has_blank_fields());
        }
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn test_profile_json_keys() {
            let p = SessionProfile::new("Admin User", "admin@example.com");
            let json = serde_json::to_string(&p).unwrap();
            assert!(json.contains("\"fullname\""));
            assert!(json.contains("\"email\""));
        }

        #[test]
        fn test_profile_missing_field_defaults_empty() {
            let p: SessionProfile = serde_json::from_str(r#"{"fullname":"X"}"#).unwrap();
            assert_eq!(p.full_name, "X");
            assert_eq!(p.email, "");
        }

        #[test]
        fn test_set_field_preserves_other() {
            let mut p = SessionProfile::new("A", "a@x");
            p.set_field(ProfileField::FullName, "B");
            assert_eq!(p.field(ProfileField::FullName), "B");
            assert_eq!(p.field(ProfileField::Email), "a@x");
        }

        #[test]
        fn test_profile_field_parse() {
            assert_eq!(ProfileField::parse("email").unwrap(), ProfileField::Email);
            assert!(ProfileField::parse("phone").is_err());
        }

        proptest! {
            #[test]
            fn prop_profile_json_round_trip(name in "\\PC{0,40}", email in "\\PC{0,40}") {
                let p = SessionProfile::new(name, email);
                let back: SessionProfile =
                    serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
                prop_assert_eq!(back, p);
            }
        }
    }
}
