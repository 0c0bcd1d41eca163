//! Cart page and the order modal it opens.

use super::locators::{cart, confirmation, order};
use super::PageObject;
use crate::locator::Locator;
use crate::model::{amounts_match, parse_price, OrderConfirmation, PurchaseForm};
use crate::result::{ShopError, ShopResult};
use crate::session::SessionContext;
use crate::wait::WaitPolicy;
use std::time::Duration;

/// Upper bound on how long an empty-looking cart is given to fill in
const CART_GRACE: Duration = Duration::from_secs(2);

/// Cart page (`cart.html`)
#[derive(Debug, Clone)]
pub struct CartPage {
    ctx: SessionContext,
}

impl PageObject for CartPage {
    fn page_name(&self) -> &'static str {
        "cart"
    }

    fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn ready_marker(&self) -> Locator {
        cart::place_order()
    }

    fn url_fragment(&self) -> Option<&'static str> {
        Some(crate::data::paths::CART)
    }
}

impl CartPage {
    /// Bind to a session showing the cart
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Open the cart by URL
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails or the page never loads
    pub async fn open(ctx: SessionContext) -> ShopResult<Self> {
        let page = Self::new(ctx);
        let url = page.ctx.config().cart_url();
        page.ctx.session().open(&url).await?;
        page.wait_until_loaded().await?;
        tracing::info!(%url, "cart opened");
        Ok(page)
    }

    fn grace(&self) -> WaitPolicy {
        let policy = self.ctx.wait();
        policy.with_timeout(policy.timeout().min(CART_GRACE))
    }

    /// Whether the cart shows at least one line, allowing a short grace
    /// period for the table to render
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn has_items(&self) -> ShopResult<bool> {
        let ctx = &self.ctx;
        let rows = &cart::rows();
        self.grace()
            .holds_within("cart rows", move || async move { ctx.exists(rows).await })
            .await
    }

    /// Number of cart lines
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn item_count(&self) -> ShopResult<usize> {
        if !self.has_items().await? {
            return Ok(0);
        }
        let count = self.ctx.session().find_all(cart::rows().selector()).await?.len();
        tracing::debug!(count, "cart item count");
        Ok(count)
    }

    /// Wait (full timeout) until the cart shows at least one line
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the cart stays empty
    pub async fn wait_for_cart(&self) -> ShopResult<usize> {
        Ok(self.ctx.wait_present(&cart::rows()).await?.len())
    }

    /// Product names of the cart lines, in insertion order
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn item_names(&self) -> ShopResult<Vec<String>> {
        if !self.has_items().await? {
            return Ok(Vec::new());
        }
        self.ctx.texts_of_all(&cart::titles()).await
    }

    /// Prices of the cart lines; unreadable cells are skipped
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn item_prices(&self) -> ShopResult<Vec<f64>> {
        if !self.has_items().await? {
            return Ok(Vec::new());
        }
        let mut prices = Vec::new();
        for text in self.ctx.texts_of_all(&cart::prices()).await? {
            match parse_price(&text) {
                Some(price) => prices.push(price),
                None => tracing::warn!(%text, "unreadable cart price"),
            }
        }
        Ok(prices)
    }

    /// Displayed total, `0.0` when it is blank or unreadable
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn total_price(&self) -> ShopResult<f64> {
        let ctx = &self.ctx;
        let total = &cart::total();
        let text = self
            .grace()
            .until("cart total", move || async move {
                let text = ctx.texts_of_all(total).await?.into_iter().next().unwrap_or_default();
                Ok::<_, ShopError>((!text.trim().is_empty()).then_some(text))
            })
            .await;
        match text {
            Ok(text) => Ok(parse_price(&text).unwrap_or_else(|| {
                tracing::warn!(%text, "unreadable cart total");
                0.0
            })),
            Err(e) if e.is_timeout() => {
                tracing::warn!("cart total not shown");
                Ok(0.0)
            }
            Err(e) => Err(e),
        }
    }

    /// Sum of the line prices
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn expected_total(&self) -> ShopResult<f64> {
        Ok(self.item_prices().await?.iter().sum())
    }

    /// Whether the displayed total equals the sum of line prices within 0.01
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn validate_total(&self) -> ShopResult<bool> {
        let expected = self.expected_total().await?;
        let actual = self.total_price().await?;
        let valid = amounts_match(actual, expected);
        if valid {
            tracing::info!(actual, expected, "cart total validated");
        } else {
            tracing::warn!(actual, expected, "cart total mismatch");
        }
        Ok(valid)
    }

    /// Delete the earliest-added line and wait for the table to shrink
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ElementNotFound`] on an empty cart, or
    /// [`ShopError::TimedOut`] if the line never disappears
    pub async fn delete_first_item(&self) -> ShopResult<()> {
        let before = self.item_count().await?;
        if before == 0 {
            return Err(ShopError::ElementNotFound {
                locator: cart::delete_links().to_string(),
            });
        }
        self.ctx.click(&cart::delete_links()).await?;

        let ctx = &self.ctx;
        let rows = &cart::rows();
        let target = before - 1;
        ctx.wait()
            .until_true("cart line removal", move || async move {
                let count = ctx.session().find_all(rows.selector()).await?.len();
                Ok::<_, ShopError>(count == target)
            })
            .await?;
        tracing::info!(remaining = target, "cart line deleted");
        Ok(())
    }

    /// Click "Place Order" and wait for the order modal
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ModalNotShown`] if the modal never appears, which
    /// is what an empty cart produces
    pub async fn place_order(&self) -> ShopResult<OrderModal> {
        self.ctx.click(&cart::place_order()).await?;
        let modal = OrderModal::new(self.ctx.clone());
        match modal.wait_until_loaded().await {
            Ok(()) => {
                tracing::info!("order modal shown");
                Ok(modal)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("order modal did not appear");
                Err(ShopError::ModalNotShown)
            }
            Err(e) => Err(e),
        }
    }
}

/// What the site showed after "Purchase"
enum PurchaseAnswer {
    Confirmed,
    Alert(String),
}

/// Order modal opened by "Place Order"
#[derive(Debug, Clone)]
pub struct OrderModal {
    ctx: SessionContext,
}

impl PageObject for OrderModal {
    fn page_name(&self) -> &'static str {
        "order modal"
    }

    fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn ready_marker(&self) -> Locator {
        order::name()
    }
}

impl OrderModal {
    /// Bind to a session whose order modal is (about to be) open
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Type every field of `form` into the modal
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if an input never shows
    pub async fn fill_order_form(&self, form: &PurchaseForm) -> ShopResult<()> {
        let fields = [
            (order::name(), &form.name),
            (order::country(), &form.country),
            (order::city(), &form.city),
            (order::card(), &form.card_number),
            (order::month(), &form.expiry_month),
            (order::year(), &form.expiry_year),
        ];
        for (locator, value) in &fields {
            self.ctx.type_into(locator, value).await?;
        }
        tracing::debug!(blank_fields = form.has_blank_fields(), "order form filled");
        Ok(())
    }

    /// Click "Purchase"
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the button never becomes clickable
    pub async fn click_purchase(&self) -> ShopResult<()> {
        self.ctx.click(&order::purchase()).await
    }

    /// Fill the form, purchase, and read the confirmation.
    ///
    /// When the site answers with an alert instead (incomplete form), the
    /// alert is accepted and the purchase counts as unconfirmed.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ConfirmationMissing`] if no confirmation shows
    pub async fn submit(&self, form: &PurchaseForm) -> ShopResult<OrderConfirmation> {
        self.fill_order_form(form).await?;
        self.click_purchase().await?;

        let ctx = &self.ctx;
        let dialog = &confirmation::dialog();
        let answer = ctx
            .wait()
            .until("purchase confirmation", move || async move {
                if let Some(text) = ctx.session().alert_text().await? {
                    return Ok(Some(PurchaseAnswer::Alert(text)));
                }
                let shown = ctx.visible_now(dialog).await?;
                Ok::<_, ShopError>(shown.then_some(PurchaseAnswer::Confirmed))
            })
            .await;

        match answer {
            Ok(PurchaseAnswer::Confirmed) => {
                let confirmation = OrderConfirmation::from_message(self.confirmation_message().await?);
                tracing::info!(
                    order_id = confirmation.order_id,
                    matched = confirmation.matched_pattern,
                    "purchase confirmed"
                );
                Ok(confirmation)
            }
            Ok(PurchaseAnswer::Alert(text)) => {
                self.ctx.session().accept_alert().await?;
                tracing::warn!(alert = %text, "purchase answered with alert");
                Err(ShopError::ConfirmationMissing)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("purchase confirmation never appeared");
                Err(ShopError::ConfirmationMissing)
            }
            Err(e) => Err(e),
        }
    }

    /// Order details text of the confirmation dialog
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the dialog is not showing
    pub async fn confirmation_message(&self) -> ShopResult<String> {
        self.ctx.text_of(&confirmation::message()).await
    }

    /// Dismiss the confirmation dialog with "OK"
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the dialog stays up
    pub async fn click_ok(&self) -> ShopResult<()> {
        self.ctx.click(&confirmation::ok()).await?;
        self.ctx.wait_hidden(&confirmation::dialog()).await
    }

    /// Submit the form and dismiss the confirmation
    ///
    /// # Errors
    ///
    /// Same as [`OrderModal::submit`]
    pub async fn complete_purchase(&self, form: &PurchaseForm) -> ShopResult<OrderConfirmation> {
        let confirmation = self.submit(form).await?;
        self.click_ok().await?;
        Ok(confirmation)
    }

    /// Whether the modal is showing
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn is_open(&self) -> ShopResult<bool> {
        self.is_loaded().await
    }

    /// Close the modal without purchasing
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the modal stays open
    pub async fn close(&self) -> ShopResult<()> {
        self.ctx.click(&order::close()).await?;
        self.ctx.wait_hidden(&order::name()).await
    }
}
