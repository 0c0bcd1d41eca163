//! Built-in scenarios for the demo storefront.
//!
//! Grouped by feature the way reports show them: Category, Purchase,
//! Extended cart, Login and Profile. Every scenario starts on the home page
//! of a fresh session.

use crate::data::{self, credentials, products, profile};
use crate::model::{Category, ProfileField};
use crate::pages::{CartPage, HomePage, LoginOutcome, ProfileStore};
use crate::result::{ShopError, ShopResult};
use crate::scenario::{FnScenario, Scenario, ScenarioFn, ScenarioMeta, Severity};
use crate::session::SessionContext;
use crate::state::CheckoutFlow;
use crate::workflow::{CheckoutWorkflow, PurchasePlan};
use futures::future::BoxFuture;
use std::collections::BTreeSet;
use std::sync::Arc;

const EPIC: &str = "Demoblaze";

fn ensure(condition: bool, message: impl Into<String>) -> ShopResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ShopError::assertion(message))
    }
}

/// Pass only when `result` failed with the error `expected` accepts
fn expect_failure<T: std::fmt::Debug>(
    result: ShopResult<T>,
    what: &str,
    expected: impl Fn(&ShopError) -> bool,
) -> ShopResult<()> {
    match result {
        Err(e) if expected(&e) => {
            tracing::info!(error = %e, "{what} failed as expected");
            Ok(())
        }
        Err(e) => Err(e),
        Ok(value) => Err(ShopError::assertion(format!(
            "{what} should have failed, got {value:?}"
        ))),
    }
}

fn scenario(name: &str, feature: &str, severity: Severity, body: ScenarioFn) -> Arc<dyn Scenario> {
    Arc::new(FnScenario::new(
        name,
        ScenarioMeta::new(EPIC, feature, severity),
        body,
    ))
}

/// Every built-in scenario, in report order
#[must_use]
pub fn builtin() -> Vec<Arc<dyn Scenario>> {
    vec![
        scenario("every_category_has_products", "Category", Severity::Critical, category::every_category_has_products),
        scenario("categories_are_disjoint", "Category", Severity::Normal, category::categories_are_disjoint),
        scenario("category_count_is_stable", "Category", Severity::Normal, category::category_count_is_stable),
        scenario("unsupported_category_is_rejected", "Category", Severity::Minor, category::unsupported_category_is_rejected),
        scenario("category_links_are_displayed", "Category", Severity::Normal, category::category_links_are_displayed),
        scenario("purchase_samsung_galaxy_s6", "Purchase", Severity::Blocker, purchase::purchase_samsung_galaxy_s6),
        scenario("empty_cart_cannot_check_out", "Purchase", Severity::Critical, purchase::empty_cart_cannot_check_out),
        scenario("cart_total_matches_lines", "Purchase", Severity::Critical, purchase::cart_total_matches_lines),
        scenario("incomplete_form_is_handled", "Purchase", Severity::Normal, purchase::incomplete_form_is_handled),
        scenario("repeated_additions_accumulate", "Extended Cart", Severity::Normal, extended::repeated_additions_accumulate),
        scenario("direct_cart_url_is_empty", "Extended Cart", Severity::Normal, extended::direct_cart_url_is_empty),
        scenario("valid_login", "Login", Severity::Critical, login::valid_login),
        scenario("invalid_login_is_rejected", "Login", Severity::Normal, login::invalid_login_is_rejected),
        scenario("profile_set_and_get", "Profile", Severity::Normal, profile_store::set_and_get),
        scenario("profile_update", "Profile", Severity::Normal, profile_store::update),
        scenario("profile_partial_update", "Profile", Severity::Minor, profile_store::partial_update),
        scenario("profile_clear", "Profile", Severity::Minor, profile_store::clear),
        scenario("profile_survives_reload", "Profile", Severity::Normal, profile_store::survives_reload),
    ]
}

// ============================================================================
// Category
// ============================================================================

mod category {
    use super::*;

    pub fn every_category_has_products(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            for category in data::categories::EXPECTED {
                home.select_category(category).await?;
                let count = home.product_count().await?;
                ensure(count >= 1, format!("{category} shows no products"))?;
            }
            Ok(())
        })
    }

    pub fn categories_are_disjoint(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            let mut listed: Vec<(Category, BTreeSet<String>)> = Vec::new();
            for category in Category::ALL {
                home.select_category(category).await?;
                let names = home.product_names().await?.into_iter().collect();
                listed.push((category, names));
            }
            for (i, (a, names_a)) in listed.iter().enumerate() {
                for (b, names_b) in &listed[i + 1..] {
                    let shared: Vec<_> = names_a.intersection(names_b).collect();
                    ensure(
                        shared.is_empty(),
                        format!("{a} and {b} share products: {shared:?}"),
                    )?;
                }
            }
            Ok(())
        })
    }

    pub fn category_count_is_stable(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            home.select_category(Category::Phones).await?;
            let before = home.product_count().await?;
            home.select_category(Category::Laptops).await?;
            home.go_home().await?;
            home.select_category(Category::Phones).await?;
            let after = home.product_count().await?;
            ensure(
                before == after,
                format!("Phones showed {before} products, then {after}"),
            )
        })
    }

    pub fn unsupported_category_is_rejected(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            expect_failure(
                home.select_category_named("Tablets").await,
                "selecting Tablets",
                |e| matches!(e, ShopError::UnsupportedCategory { .. }),
            )
        })
    }

    pub fn category_links_are_displayed(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            for category in data::categories::EXPECTED {
                ensure(
                    home.is_category_displayed(category).await?,
                    format!("{category} link not displayed"),
                )?;
            }
            Ok(())
        })
    }
}

// ============================================================================
// Purchase
// ============================================================================

mod purchase {
    use super::*;

    pub fn purchase_samsung_galaxy_s6(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let report = CheckoutWorkflow::new(ctx.clone())
                .run(&PurchasePlan::single(Category::Phones, products::SAMSUNG_GALAXY_S6))
                .await?;
            ensure(report.cart_item_count >= 1, "cart was empty before checkout")?;
            ensure(
                report.confirmation.matched_pattern,
                "confirmation has no order id",
            )
        })
    }

    pub fn empty_cart_cannot_check_out(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let mut flow = CheckoutFlow::new(ctx.clone());
            let cart = flow.go_to_cart().await?;
            ensure(!cart.has_items().await?, "fresh session has cart items")?;
            expect_failure(flow.place_order().await, "placing an empty order", |e| {
                matches!(e, ShopError::ModalNotShown)
            })
        })
    }

    pub fn cart_total_matches_lines(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let mut flow = CheckoutFlow::new(ctx.clone());
            let plan = PurchasePlan::new(data::default_purchase_form())
                .with_line(Category::Phones, products::NEXUS_6, 1)
                .with_line(Category::Laptops, products::SONY_VAIO_I5, 1);
            CheckoutWorkflow::new(ctx.clone())
                .fill_cart(&mut flow, &plan)
                .await?;
            let cart = flow.go_to_cart().await?;
            let count = cart.wait_for_cart().await?;
            ensure(count >= 2, format!("cart holds {count} lines, expected 2"))?;
            let expected = cart.expected_total().await?;
            let shown = cart.total_price().await?;
            ensure(
                cart.validate_total().await?,
                format!("cart total {shown} does not match line sum {expected}"),
            )
        })
    }

    pub fn incomplete_form_is_handled(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let mut flow = CheckoutFlow::new(ctx.clone());
            CheckoutWorkflow::new(ctx.clone())
                .fill_cart(&mut flow, &PurchasePlan::single(Category::Phones, products::SAMSUNG_GALAXY_S6))
                .await?;
            flow.go_to_cart().await?;
            flow.place_order().await?;
            match flow.submit(&data::incomplete_purchase_form()).await {
                Ok(confirmation) => {
                    tracing::info!(message = %confirmation.message, "incomplete form accepted");
                }
                Err(ShopError::ConfirmationMissing) => {
                    tracing::info!("incomplete form rejected");
                }
                Err(e) => return Err(e),
            }
            Ok(())
        })
    }
}

// ============================================================================
// Extended cart
// ============================================================================

mod extended {
    use super::*;

    const REPEATS: usize = 3;

    pub fn repeated_additions_accumulate(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let mut flow = CheckoutFlow::new(ctx.clone());
            let plan = PurchasePlan::new(data::default_purchase_form()).with_line(
                Category::Phones,
                products::NEXUS_6,
                REPEATS,
            );
            CheckoutWorkflow::new(ctx.clone())
                .fill_cart(&mut flow, &plan)
                .await?;
            let cart = flow.go_to_cart().await?;
            let count = cart.wait_for_cart().await?;
            ensure(
                count >= REPEATS,
                format!("cart holds {count} lines after {REPEATS} additions"),
            )?;
            ensure(cart.validate_total().await?, "cart total does not match lines")
        })
    }

    pub fn direct_cart_url_is_empty(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let cart = CartPage::open(ctx.clone()).await?;
            ensure(!cart.has_items().await?, "direct cart shows items")?;
            ensure(cart.item_count().await? == 0, "direct cart counts items")?;
            expect_failure(
                CheckoutWorkflow::new(ctx.clone())
                    .checkout_direct(&data::default_purchase_form())
                    .await,
                "checking out a direct empty cart",
                |e| matches!(e, ShopError::ModalNotShown),
            )
        })
    }
}

// ============================================================================
// Login
// ============================================================================

mod login {
    use super::*;

    pub fn valid_login(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            let outcome = home
                .open_login()
                .await?
                .login(credentials::VALID_USERNAME, credentials::VALID_PASSWORD)
                .await?;
            ensure(
                outcome.is_accepted(),
                format!("login rejected: {:?}", outcome.rejection()),
            )?;
            ensure(home.is_user_logged_in().await?, "welcome label missing")?;
            let welcome = home.welcome_text().await?;
            ensure(
                welcome.contains(credentials::VALID_USERNAME),
                format!("welcome label reads '{welcome}'"),
            )
        })
    }

    pub fn invalid_login_is_rejected(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let home = HomePage::new(ctx.clone());
            let login = home.open_login().await?;
            let outcome = login
                .login(credentials::INVALID_USERNAME, credentials::INVALID_PASSWORD)
                .await?;
            match outcome {
                LoginOutcome::Rejected(alert) => {
                    tracing::info!(%alert, "invalid login rejected");
                }
                LoginOutcome::Accepted => {
                    return Err(ShopError::assertion("invalid credentials were accepted"));
                }
            }
            login.close().await?;
            ensure(home.welcome_text().await?.is_empty(), "someone is logged in")
        })
    }
}

// ============================================================================
// Profile
// ============================================================================

mod profile_store {
    use super::*;

    pub fn set_and_get(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let store = ProfileStore::new(ctx.clone());
            store.set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL).await?;
            let stored = store.get().await?;
            ensure(
                stored == Some(data::initial_profile()),
                format!("stored profile is {stored:?}"),
            )
        })
    }

    pub fn update(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let store = ProfileStore::new(ctx.clone());
            store.set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL).await?;
            store.update(profile::UPDATED_FULLNAME, profile::UPDATED_EMAIL).await?;
            ensure(
                store.verify(profile::UPDATED_FULLNAME, profile::UPDATED_EMAIL).await?,
                "update not visible",
            )
        })
    }

    pub fn partial_update(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let store = ProfileStore::new(ctx.clone());
            store.set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL).await?;
            store
                .partial_update(ProfileField::FullName, profile::UPDATED_FULLNAME)
                .await?;
            ensure(
                store.verify(profile::UPDATED_FULLNAME, profile::INITIAL_EMAIL).await?,
                "partial update changed the wrong field",
            )
        })
    }

    pub fn clear(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let store = ProfileStore::new(ctx.clone());
            store.set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL).await?;
            store.clear().await?;
            ensure(!store.exists().await?, "profile still stored after clear")
        })
    }

    pub fn survives_reload(ctx: &SessionContext) -> BoxFuture<'_, ShopResult<()>> {
        Box::pin(async move {
            let store = ProfileStore::new(ctx.clone());
            store.set(profile::SPECIAL_FULLNAME, profile::SPECIAL_EMAIL).await?;
            store.reload().await?;
            ensure(
                store.verify(profile::SPECIAL_FULLNAME, profile::SPECIAL_EMAIL).await?,
                "profile lost on reload",
            )
        })
    }
}
