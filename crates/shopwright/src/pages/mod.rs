//! Page objects for the demo storefront.
//!
//! Each page object is a plain struct holding a [`SessionContext`]; locators
//! come from [`locators`] and are resolved on every access.

pub mod cart;
pub mod home;
pub mod locators;
pub mod login;
pub mod page_object;
pub mod product;
pub mod profile;

pub use cart::{CartPage, OrderModal};
pub use home::HomePage;
pub use login::{LoginOutcome, LoginPage};
pub use page_object::PageObject;
pub use product::ProductPage;
pub use profile::ProfileStore;

pub use crate::session::SessionContext;
