//! Product detail page.

use super::locators::product;
use super::PageObject;
use crate::data::messages;
use crate::locator::Locator;
use crate::model::parse_price;
use crate::result::{ShopError, ShopResult};
use crate::session::SessionContext;

/// Detail page of one product
#[derive(Debug, Clone)]
pub struct ProductPage {
    ctx: SessionContext,
}

impl PageObject for ProductPage {
    fn page_name(&self) -> &'static str {
        "product"
    }

    fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn ready_marker(&self) -> Locator {
        product::name()
    }

    fn url_fragment(&self) -> Option<&'static str> {
        Some("prod.html")
    }
}

impl ProductPage {
    /// Bind to a session showing a product page
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Product name heading
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the heading never shows
    pub async fn name(&self) -> ShopResult<String> {
        self.ctx.text_of(&product::name()).await
    }

    /// Price line as shown, e.g. `$360 *includes tax`
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the price never shows
    pub async fn price_text(&self) -> ShopResult<String> {
        self.ctx.text_of(&product::price()).await
    }

    /// Numeric price, `None` when the text cannot be parsed
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the price never shows
    pub async fn price(&self) -> ShopResult<Option<f64>> {
        let text = self.price_text().await?;
        let price = parse_price(&text);
        tracing::debug!(%text, ?price, "product price");
        Ok(price)
    }

    /// Description paragraph, empty when the page has none
    ///
    /// # Errors
    ///
    /// Propagates session failures other than a missing element
    pub async fn description(&self) -> ShopResult<String> {
        match self.ctx.text_of(&product::description()).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_timeout() => {
                tracing::warn!("product description missing");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the product heading is showing
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn is_displayed(&self) -> ShopResult<bool> {
        self.is_loaded().await
    }

    /// Click "Add to cart", then accept the acknowledgement alert.
    ///
    /// Returns the acknowledgement text.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnexpectedAcknowledgement`] if the alert does not
    /// say "Product added" (the alert is still accepted), or
    /// [`ShopError::TimedOut`] if no alert shows
    pub async fn add_to_cart(&self) -> ShopResult<String> {
        self.ctx.click(&product::add_to_cart()).await?;
        let text = self.ctx.wait_alert().await?;
        self.ctx.session().accept_alert().await?;
        if !text.contains(messages::PRODUCT_ADDED) {
            tracing::warn!(%text, "unexpected add-to-cart acknowledgement");
            return Err(ShopError::UnexpectedAcknowledgement { text });
        }
        tracing::info!("product added to cart");
        Ok(text)
    }
}
