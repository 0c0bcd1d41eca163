//! End-to-end purchase built on [`CheckoutFlow`].
//!
//! Home → CategoryView → ProductDetail → add to cart (repeated per plan line)
//! → Cart → OrderModal → Confirmed, checking at the cart that the line count
//! covers the plan and the total matches the line prices, and at the end that
//! the confirmation carries an order id.

use crate::data;
use crate::model::{amounts_match, Category, OrderConfirmation, PurchaseForm};
use crate::result::{ShopError, ShopResult};
use crate::session::SessionContext;
use crate::state::{CheckoutFlow, PageState, TransitionRecord};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One product to buy, possibly several times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLine {
    /// Category to browse
    pub category: Category,
    /// Product name (substring of the product link)
    pub product: String,
    /// How many times to add it
    pub quantity: usize,
}

/// What to buy and with which form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    /// Products, in the order they are added
    pub lines: Vec<PlanLine>,
    /// Checkout form
    pub form: PurchaseForm,
}

impl PurchasePlan {
    /// Empty plan with the given form
    #[must_use]
    pub const fn new(form: PurchaseForm) -> Self {
        Self {
            lines: Vec::new(),
            form,
        }
    }

    /// Buy one product with the default form
    #[must_use]
    pub fn single(category: Category, product: impl Into<String>) -> Self {
        Self::new(data::default_purchase_form()).with_line(category, product, 1)
    }

    /// Add a line
    #[must_use]
    pub fn with_line(mut self, category: Category, product: impl Into<String>, quantity: usize) -> Self {
        self.lines.push(PlanLine {
            category,
            product: product.into(),
            quantity,
        });
        self
    }

    /// Total number of add-to-cart actions
    #[must_use]
    pub fn total_quantity(&self) -> usize {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Outcome of a completed purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReport {
    /// Confirmation read from the site
    pub confirmation: OrderConfirmation,
    /// Cart lines seen before checkout
    pub cart_item_count: usize,
    /// Displayed cart total
    pub cart_total: f64,
    /// Sum of the displayed line prices
    pub expected_total: f64,
    /// Transitions taken
    pub transitions: Vec<TransitionRecord>,
    /// Wall time of the whole purchase
    pub duration: Duration,
}

/// Runs a [`PurchasePlan`] against one session
#[derive(Debug, Clone)]
pub struct CheckoutWorkflow {
    ctx: SessionContext,
}

impl CheckoutWorkflow {
    /// Bind to a session
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Add every plan line to the cart, leaving the flow on the home page
    ///
    /// # Errors
    ///
    /// Propagates category, product and acknowledgement failures
    pub async fn fill_cart(&self, flow: &mut CheckoutFlow, plan: &PurchasePlan) -> ShopResult<()> {
        for line in &plan.lines {
            for n in 0..line.quantity {
                if flow.state() != &PageState::CategoryView(line.category) {
                    if flow.state() != &PageState::Home {
                        flow.navigate_home().await?;
                    }
                    flow.select_category(line.category).await?;
                }
                flow.select_product(&line.product).await?;
                flow.add_to_cart().await?;
                tracing::debug!(product = %line.product, n = n + 1, of = line.quantity, "added");
                flow.navigate_home().await?;
            }
        }
        Ok(())
    }

    /// Run the whole purchase and validate it
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::AssertionFailed`] when a cart or confirmation
    /// check fails, and flow errors ([`ShopError::ModalNotShown`],
    /// [`ShopError::ConfirmationMissing`], ...) unchanged
    #[tracing::instrument(skip_all, fields(lines = plan.lines.len(), quantity = plan.total_quantity()))]
    pub async fn run(&self, plan: &PurchasePlan) -> ShopResult<CheckoutReport> {
        let start = Instant::now();
        let mut flow = CheckoutFlow::start(self.ctx.clone()).await?;
        self.fill_cart(&mut flow, plan).await?;

        let cart = flow.go_to_cart().await?;
        let cart_item_count = cart.item_count().await?;
        let wanted = plan.total_quantity();
        if cart_item_count < wanted {
            return Err(ShopError::assertion(format!(
                "cart holds {cart_item_count} lines, expected at least {wanted}"
            )));
        }

        let expected_total = cart.expected_total().await?;
        let cart_total = cart.total_price().await?;
        if cart_item_count > 0 && !amounts_match(cart_total, expected_total) {
            return Err(ShopError::assertion(format!(
                "cart total {cart_total} does not match line sum {expected_total}"
            )));
        }

        flow.place_order().await?;
        let confirmation = flow.submit(&plan.form).await?;
        if !confirmation.matched_pattern {
            return Err(ShopError::assertion(format!(
                "confirmation does not match {}: {}",
                data::messages::ORDER_CONFIRMATION_PATTERN,
                confirmation.message
            )));
        }

        tracing::info!(
            order_id = confirmation.order_id,
            cart_item_count,
            cart_total,
            "purchase completed"
        );
        Ok(CheckoutReport {
            confirmation,
            cart_item_count,
            cart_total,
            expected_total,
            transitions: flow.transitions().to_vec(),
            duration: start.elapsed(),
        })
    }

    /// Open the cart by URL without adding anything, then try to check out.
    ///
    /// Returns the number of lines found before the attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ModalNotShown`] when the cart is empty
    pub async fn checkout_direct(&self, form: &PurchaseForm) -> ShopResult<usize> {
        let mut flow = CheckoutFlow::new(self.ctx.clone());
        let cart = flow.open_cart().await?;
        let count = cart.item_count().await?;
        flow.place_order().await?;
        flow.submit(form).await?;
        Ok(count)
    }
}
