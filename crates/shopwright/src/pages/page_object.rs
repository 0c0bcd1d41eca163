//! Page object trait.

use crate::locator::Locator;
use crate::result::ShopResult;
use crate::session::SessionContext;
use async_trait::async_trait;

/// A page (or modal) of the storefront.
///
/// Implementors name the element whose visibility means the page is ready;
/// loading and readiness checks are derived from it.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Page name for logs
    fn page_name(&self) -> &'static str;

    /// Session the page is bound to
    fn context(&self) -> &SessionContext;

    /// Element that is visible once the page is usable
    fn ready_marker(&self) -> Locator;

    /// Path fragment of the page URL, if the page has its own URL
    fn url_fragment(&self) -> Option<&'static str> {
        None
    }

    /// Whether the page is ready right now
    async fn is_loaded(&self) -> ShopResult<bool> {
        self.context().visible_now(&self.ready_marker()).await
    }

    /// Wait until the page is ready
    async fn wait_until_loaded(&self) -> ShopResult<()> {
        self.context().wait_visible(&self.ready_marker()).await?;
        tracing::debug!(page = self.page_name(), "page loaded");
        Ok(())
    }

    /// Whether the browser is currently on this page's URL
    async fn is_current(&self) -> ShopResult<bool> {
        match self.url_fragment() {
            Some(fragment) => Ok(self.context().session().current_url().await?.contains(fragment)),
            None => self.is_loaded().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::pages::{CartPage, HomePage};
    use crate::session::{SessionHandle, SimulatedStorefront};
    use std::sync::Arc;

    fn context() -> SessionContext {
        let config = SuiteConfig::default()
            .with_base_url("https://demo.test/")
            .with_timeout_seconds(1)
            .with_poll_interval_ms(5);
        let session: SessionHandle = Arc::new(SimulatedStorefront::new(&config));
        SessionContext::new(session, Arc::new(config))
    }

    #[tokio::test]
    async fn test_not_loaded_before_navigation() {
        let home = HomePage::new(context());
        assert!(!home.is_loaded().await.unwrap());
        assert_eq!(home.page_name(), "home");
    }

    #[tokio::test]
    async fn test_cart_is_current_by_url() {
        let ctx = context();
        let cart = CartPage::open(ctx.clone()).await.unwrap();
        assert!(cart.is_current().await.unwrap());
        ctx.session().open("https://demo.test/").await.unwrap();
        assert!(!cart.is_current().await.unwrap());
    }
}
