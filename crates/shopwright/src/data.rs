//! Scenario data for the demo storefront.

use crate::model::{Category, PurchaseForm, SessionProfile};

/// Login credentials
pub mod credentials {
    /// Username expected to exist on the site
    pub const VALID_USERNAME: &str = "admin";
    /// Password for [`VALID_USERNAME`]
    pub const VALID_PASSWORD: &str = "admin";
    /// Username that does not exist
    pub const INVALID_USERNAME: &str = "wronguser";
    /// Password that does not match anything
    pub const INVALID_PASSWORD: &str = "wrongpass";
}

/// Category names as they appear on the site
pub mod categories {
    use super::Category;

    /// Categories every scenario expects to find
    pub const EXPECTED: [Category; 3] = Category::ALL;
    /// Phones
    pub const PHONES: &str = "Phones";
    /// Laptops
    pub const LAPTOPS: &str = "Laptops";
    /// Monitors
    pub const MONITORS: &str = "Monitors";
}

/// Product names used by the purchase scenarios
pub mod products {
    /// Samsung galaxy s6 (Phones)
    pub const SAMSUNG_GALAXY_S6: &str = "Samsung galaxy s6";
    /// Nexus 6 (Phones)
    pub const NEXUS_6: &str = "Nexus 6";
    /// Iphone 6 32gb (Phones)
    pub const IPHONE_6_32GB: &str = "Iphone 6 32gb";
    /// Sony vaio i5 (Laptops)
    pub const SONY_VAIO_I5: &str = "Sony vaio i5";
    /// MacBook air (Laptops)
    pub const MACBOOK_AIR: &str = "MacBook air";
}

/// Profile values and storage key
pub mod profile {
    /// Initial full name
    pub const INITIAL_FULLNAME: &str = "Admin User";
    /// Initial email
    pub const INITIAL_EMAIL: &str = "admin@example.com";
    /// Full name after update
    pub const UPDATED_FULLNAME: &str = "Admin User Updated";
    /// Email after update
    pub const UPDATED_EMAIL: &str = "admin.updated@example.com";
    /// Local-storage key holding the profile JSON
    pub const PROFILE_KEY: &str = "dmz_profile";
    /// Name with accents and punctuation
    pub const SPECIAL_FULLNAME: &str = "João O'Connor-Smith";
    /// Email with plus-addressing and a hyphenated domain
    pub const SPECIAL_EMAIL: &str = "test+tag@example-domain.com";
}

/// Messages shown by the site
pub mod messages {
    /// Add-to-cart acknowledgement
    pub const PRODUCT_ADDED: &str = "Product added";
    /// Login alert for an unknown user
    pub const USER_DOES_NOT_EXIST: &str = "User does not exist.";
    /// Login alert for a bad password
    pub const WRONG_PASSWORD: &str = "Wrong password.";
    /// Confirmation pattern
    pub const ORDER_CONFIRMATION_PATTERN: &str = crate::model::ORDER_CONFIRMATION_PATTERN;
}

/// Relative page paths
pub mod paths {
    /// Cart page
    pub const CART: &str = "cart.html";
    /// Home page
    pub const INDEX: &str = "index.html";
}

/// Well-formed purchase form
#[must_use]
pub fn default_purchase_form() -> PurchaseForm {
    PurchaseForm::new(
        "Diego QA",
        "Colombia",
        "Bogotá",
        "4111111111111111",
        "12",
        "2030",
    )
}

/// Purchase form with the name left blank
#[must_use]
pub fn incomplete_purchase_form() -> PurchaseForm {
    PurchaseForm {
        name: String::new(),
        ..default_purchase_form()
    }
}

/// Initial profile
#[must_use]
pub fn initial_profile() -> SessionProfile {
    SessionProfile::new(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL)
}

/// Updated profile
#[must_use]
pub fn updated_profile() -> SessionProfile {
    SessionProfile::new(profile::UPDATED_FULLNAME, profile::UPDATED_EMAIL)
}
