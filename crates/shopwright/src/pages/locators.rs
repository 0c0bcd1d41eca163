//! Locator table for the demo storefront.
//!
//! Page objects and the simulated backend both read from here, so a selector
//! changes in exactly one place.

use crate::locator::Locator;
use crate::model::Category;

/// Navigation bar and product grid
pub mod home {
    use super::{Category, Locator};

    /// Store logo linking back to the index page
    #[must_use]
    pub fn home_link() -> Locator {
        Locator::id("home link", "nava")
    }

    /// "Log in" entry in the navigation bar
    #[must_use]
    pub fn login_button() -> Locator {
        Locator::id("login button", "login2")
    }

    /// "Welcome <user>" label shown after login
    #[must_use]
    pub fn welcome_user() -> Locator {
        Locator::id("welcome user", "nameofuser")
    }

    /// "Cart" entry in the navigation bar
    #[must_use]
    pub fn cart_link() -> Locator {
        Locator::id("cart link", "cartur")
    }

    /// Every category link in the sidebar
    #[must_use]
    pub fn category_links() -> Locator {
        Locator::css("category links", "#itemc")
    }

    /// Sidebar link for one category
    #[must_use]
    pub fn category_link(category: Category) -> Locator {
        Locator::link_text(format!("{category} category"), category.link_text())
    }

    /// Product cards in the grid
    #[must_use]
    pub fn product_cards() -> Locator {
        Locator::css("product cards", ".card")
    }

    /// Product title links in the grid
    #[must_use]
    pub fn product_links() -> Locator {
        Locator::css("product links", ".card-title a")
    }

    /// Product title link containing `name`
    #[must_use]
    pub fn product_link(name: &str) -> Locator {
        product_links().with_text(name)
    }
}

/// Login modal
pub mod login {
    use super::Locator;

    /// Modal container
    #[must_use]
    pub fn modal() -> Locator {
        Locator::id("login modal", "logInModal")
    }

    /// Username input
    #[must_use]
    pub fn username() -> Locator {
        Locator::id("login username", "loginusername")
    }

    /// Password input
    #[must_use]
    pub fn password() -> Locator {
        Locator::id("login password", "loginpassword")
    }

    /// Submit button
    #[must_use]
    pub fn submit() -> Locator {
        Locator::xpath("login submit", "//button[text()='Log in']")
    }

    /// Close button
    #[must_use]
    pub fn close() -> Locator {
        Locator::xpath("login close", "//div[@id='logInModal']//button[text()='Close']")
    }
}

/// Product detail page
pub mod product {
    use super::Locator;

    /// Product name heading
    #[must_use]
    pub fn name() -> Locator {
        Locator::css("product name", ".name")
    }

    /// Price line
    #[must_use]
    pub fn price() -> Locator {
        Locator::css("product price", ".price-container")
    }

    /// Description paragraph
    #[must_use]
    pub fn description() -> Locator {
        Locator::css("product description", "#more-information p")
    }

    /// "Add to cart" button
    #[must_use]
    pub fn add_to_cart() -> Locator {
        Locator::xpath("add to cart", "//a[contains(@onclick,'addToCart')]")
    }
}

/// Cart page
pub mod cart {
    use super::Locator;

    /// One row per cart line
    #[must_use]
    pub fn rows() -> Locator {
        Locator::css("cart rows", "#tbodyid .success")
    }

    /// Title cell of each row
    #[must_use]
    pub fn titles() -> Locator {
        Locator::css("cart titles", "#tbodyid .success td:nth-child(2)")
    }

    /// Price cell of each row
    #[must_use]
    pub fn prices() -> Locator {
        Locator::css("cart prices", "#tbodyid .success td:nth-child(3)")
    }

    /// "Delete" link of each row
    #[must_use]
    pub fn delete_links() -> Locator {
        Locator::xpath("cart delete links", "//a[text()='Delete']")
    }

    /// Displayed total
    #[must_use]
    pub fn total() -> Locator {
        Locator::id("cart total", "totalp")
    }

    /// "Place Order" button
    #[must_use]
    pub fn place_order() -> Locator {
        Locator::xpath("place order", "//button[text()='Place Order']")
    }
}

/// Order modal on the cart page
pub mod order {
    use super::Locator;

    /// Modal container
    #[must_use]
    pub fn modal() -> Locator {
        Locator::id("order modal", "orderModal")
    }

    /// Name input
    #[must_use]
    pub fn name() -> Locator {
        Locator::id("order name", "name")
    }

    /// Country input
    #[must_use]
    pub fn country() -> Locator {
        Locator::id("order country", "country")
    }

    /// City input
    #[must_use]
    pub fn city() -> Locator {
        Locator::id("order city", "city")
    }

    /// Credit card input
    #[must_use]
    pub fn card() -> Locator {
        Locator::id("order card", "card")
    }

    /// Expiry month input
    #[must_use]
    pub fn month() -> Locator {
        Locator::id("order month", "month")
    }

    /// Expiry year input
    #[must_use]
    pub fn year() -> Locator {
        Locator::id("order year", "year")
    }

    /// "Purchase" button
    #[must_use]
    pub fn purchase() -> Locator {
        Locator::xpath("purchase button", "//button[text()='Purchase']")
    }

    /// Close button
    #[must_use]
    pub fn close() -> Locator {
        Locator::xpath("order close", "//div[@id='orderModal']//button[text()='Close']")
    }
}

/// Purchase confirmation dialog
pub mod confirmation {
    use super::Locator;

    /// Dialog while shown
    #[must_use]
    pub fn dialog() -> Locator {
        Locator::css("confirmation dialog", ".sweet-alert.showSweetAlert.visible")
    }

    /// Dialog title
    #[must_use]
    pub fn title() -> Locator {
        Locator::css("confirmation title", ".sweet-alert h2")
    }

    /// Order details text
    #[must_use]
    pub fn message() -> Locator {
        Locator::css("confirmation message", ".sweet-alert .lead")
    }

    /// "OK" button
    #[must_use]
    pub fn ok() -> Locator {
        Locator::xpath("confirmation ok", "//button[text()='OK']")
    }
}
