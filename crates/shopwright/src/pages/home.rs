//! Home page: navigation bar, category sidebar and product grid.

use super::locators::home;
use super::{CartPage, LoginPage, PageObject, ProductPage};
use crate::locator::Locator;
use crate::model::Category;
use crate::result::{ShopError, ShopResult};
use crate::session::SessionContext;
use std::sync::Mutex;
use std::time::Duration;

/// Upper bound on how long the grid is given to replace the cards shown
/// before a category click
const GRID_CHANGE_GRACE: Duration = Duration::from_secs(2);

/// Storefront landing page
#[derive(Debug, Clone)]
pub struct HomePage {
    ctx: SessionContext,
}

impl PageObject for HomePage {
    fn page_name(&self) -> &'static str {
        "home"
    }

    fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn ready_marker(&self) -> Locator {
        home::login_button()
    }
}

impl HomePage {
    /// Bind to a session without navigating
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Navigate to the base URL and wait for the page
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails or the page never loads
    pub async fn open(ctx: SessionContext) -> ShopResult<Self> {
        let page = Self::new(ctx);
        let url = page.ctx.config().base_url.clone();
        page.ctx.session().open(&url).await?;
        page.wait_until_loaded().await?;
        tracing::info!(%url, "home page opened");
        Ok(page)
    }

    /// Open the login modal
    ///
    /// # Errors
    ///
    /// Returns error if the modal never shows
    pub async fn open_login(&self) -> ShopResult<LoginPage> {
        self.ctx.click(&home::login_button()).await?;
        let login = LoginPage::new(self.ctx.clone());
        login.wait_until_loaded().await?;
        Ok(login)
    }

    /// Whether a user is logged in (waits for the welcome label)
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn is_user_logged_in(&self) -> ShopResult<bool> {
        let ctx = &self.ctx;
        let welcome = &home::welcome_user();
        ctx.wait()
            .holds_within("welcome label", move || async move {
                if !ctx.visible_now(welcome).await? {
                    return Ok::<_, ShopError>(false);
                }
                let text = ctx.text_of(welcome).await?;
                Ok(text.starts_with("Welcome"))
            })
            .await
    }

    /// Text of the welcome label, empty when nobody is logged in
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn welcome_text(&self) -> ShopResult<String> {
        let welcome = home::welcome_user();
        if self.ctx.visible_now(&welcome).await? {
            self.ctx.text_of(&welcome).await
        } else {
            Ok(String::new())
        }
    }

    /// Category names listed in the sidebar
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn category_names(&self) -> ShopResult<Vec<String>> {
        self.ctx.texts_of_all(&home::category_links()).await
    }

    /// Whether the sidebar shows `category`
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn is_category_displayed(&self, category: Category) -> ShopResult<bool> {
        self.ctx.visible_now(&home::category_link(category)).await
    }

    /// Filter the grid by category
    ///
    /// # Errors
    ///
    /// Returns error if the category link is missing or the grid never fills
    pub async fn select_category(&self, category: Category) -> ShopResult<()> {
        let before = self.ctx.texts_of_all(&home::product_links()).await?;
        self.ctx.click(&home::category_link(category)).await?;
        self.wait_for_grid_change(&before).await?;
        let count = self.settled_product_names().await?.len();
        tracing::info!(%category, count, "category selected");
        Ok(())
    }

    /// Filter the grid by category name
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnsupportedCategory`] for names outside the catalog
    pub async fn select_category_named(&self, name: &str) -> ShopResult<Category> {
        let category = Category::parse(name)?;
        self.select_category(category).await?;
        Ok(category)
    }

    /// Product names in the grid once it stops changing
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the grid stays empty
    pub async fn product_names(&self) -> ShopResult<Vec<String>> {
        self.settled_product_names().await
    }

    /// Number of product cards in the grid
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the grid stays empty
    pub async fn product_count(&self) -> ShopResult<usize> {
        Ok(self.settled_product_names().await?.len())
    }

    /// Open the detail page of the first product whose name contains `name`
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ProductNotFound`] if no link matches
    pub async fn select_product(&self, name: &str) -> ShopResult<ProductPage> {
        let link = home::product_link(name);
        match self.ctx.click(&link).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                tracing::warn!(product = name, "product link not found");
                return Err(ShopError::ProductNotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        let page = ProductPage::new(self.ctx.clone());
        page.wait_until_loaded().await?;
        tracing::info!(product = name, "product selected");
        Ok(page)
    }

    /// Go to the cart through the navigation bar
    ///
    /// # Errors
    ///
    /// Returns error if the cart page never loads
    pub async fn go_to_cart(&self) -> ShopResult<CartPage> {
        self.ctx.click(&home::cart_link()).await?;
        let cart = CartPage::new(self.ctx.clone());
        cart.wait_until_loaded().await?;
        Ok(cart)
    }

    /// Go back to the home page through the logo link
    ///
    /// # Errors
    ///
    /// Returns error if the page never loads
    pub async fn go_home(&self) -> ShopResult<()> {
        self.ctx.click(&home::home_link()).await?;
        self.wait_until_loaded().await
    }

    /// Wait for the grid to stop showing `before`. The site keeps the old
    /// cards until its category request returns; re-selecting the shown
    /// category never changes them, so this gives up after a short grace.
    async fn wait_for_grid_change(&self, before: &[String]) -> ShopResult<()> {
        if before.is_empty() {
            return Ok(());
        }
        let ctx = &self.ctx;
        let links = &home::product_links();
        let policy = ctx.wait();
        let changed = policy
            .with_timeout(policy.timeout().min(GRID_CHANGE_GRACE))
            .holds_within("product grid to change", move || async move {
                Ok::<_, ShopError>(ctx.texts_of_all(links).await? != before)
            })
            .await?;
        if !changed {
            tracing::debug!("product grid unchanged after category click");
        }
        Ok(())
    }

    /// Poll the grid until two consecutive reads agree and are non-empty.
    async fn settled_product_names(&self) -> ShopResult<Vec<String>> {
        let ctx = &self.ctx;
        let links = &home::product_links();
        let previous: &Mutex<Option<Vec<String>>> = &Mutex::new(None);
        ctx.wait()
            .until("product grid to settle", move || async move {
                let names = ctx.texts_of_all(links).await?;
                let mut last = previous
                    .lock()
                    .map_err(|_| ShopError::session("grid poll state poisoned"))?;
                let settled = !names.is_empty() && last.as_ref() == Some(&names);
                *last = Some(names.clone());
                Ok::<_, ShopError>(settled.then_some(names))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::session::{SessionHandle, SimulatedStorefront, StorefrontFaults};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn context_with(storefront: SimulatedStorefront, config: SuiteConfig) -> SessionContext {
        let session: SessionHandle = Arc::new(storefront);
        SessionContext::new(session, Arc::new(config))
    }

    fn config() -> SuiteConfig {
        SuiteConfig::default()
            .with_base_url("https://demo.test/")
            .with_timeout_seconds(1)
            .with_poll_interval_ms(5)
    }

    async fn home() -> HomePage {
        let config = config();
        HomePage::open(context_with(SimulatedStorefront::new(&config), config))
            .await
            .unwrap()
    }

    mod category_tests {
        use super::*;

        #[tokio::test]
        async fn test_every_category_is_listed() {
            let home = home().await;
            for c in Category::ALL {
                assert!(home.is_category_displayed(c).await.unwrap());
            }
            assert_eq!(
                home.category_names().await.unwrap(),
                vec!["Phones", "Laptops", "Monitors"]
            );
        }

        #[tokio::test]
        async fn test_categories_are_disjoint() {
            let home = home().await;
            let mut seen: Vec<HashSet<String>> = Vec::new();
            for c in Category::ALL {
                home.select_category(c).await.unwrap();
                let names: HashSet<String> = home.product_names().await.unwrap().into_iter().collect();
                assert!(!names.is_empty());
                for other in &seen {
                    assert!(names.is_disjoint(other));
                }
                seen.push(names);
            }
        }

        #[tokio::test]
        async fn test_unknown_category_name() {
            let home = home().await;
            let err = home.select_category_named("Tablets").await.unwrap_err();
            assert!(matches!(err, ShopError::UnsupportedCategory { .. }));
        }

        #[tokio::test]
        async fn test_grid_waits_for_render_delay() {
            let config = config();
            let storefront = SimulatedStorefront::new(&config).with_render_delay(Duration::from_millis(30));
            let home = HomePage::open(context_with(storefront, config)).await.unwrap();
            home.select_category(Category::Laptops).await.unwrap();
            assert_eq!(home.product_count().await.unwrap(), 6);
        }

        #[tokio::test]
        async fn test_stale_grid_is_not_read_as_new_category() {
            let config = config();
            let storefront = SimulatedStorefront::new(&config)
                .with_render_delay(Duration::from_millis(150))
                .with_stale_grid();
            let home = HomePage::open(context_with(storefront, config)).await.unwrap();
            home.select_category(Category::Phones).await.unwrap();
            home.select_category(Category::Laptops).await.unwrap();

            let laptops: HashSet<String> = crate::session::simulated::catalog()
                .into_iter()
                .filter(|p| p.category == Some(Category::Laptops))
                .map(|p| p.name)
                .collect();
            let shown: HashSet<String> = home.product_names().await.unwrap().into_iter().collect();
            assert_eq!(shown, laptops);
        }

        #[tokio::test]
        async fn test_reselecting_shown_category() {
            let home = home().await;
            home.select_category(Category::Monitors).await.unwrap();
            let before = home.product_count().await.unwrap();
            home.select_category(Category::Monitors).await.unwrap();
            assert_eq!(home.product_count().await.unwrap(), before);
        }
    }

    mod product_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_product_by_substring() {
            let home = home().await;
            let product = home.select_product("galaxy s6").await.unwrap();
            assert_eq!(product.name().await.unwrap(), "Samsung galaxy s6");
        }

        #[tokio::test]
        async fn test_missing_product() {
            let home = home().await;
            let err = home.select_product("Pixel 9").await.unwrap_err();
            assert!(matches!(err, ShopError::ProductNotFound { ref name } if name == "Pixel 9"));
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_nobody_logged_in_initially() {
            let home = home().await;
            assert!(!home.is_user_logged_in().await.unwrap());
            assert_eq!(home.welcome_text().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_rejected_login_fault() {
            let config = config();
            let storefront = SimulatedStorefront::new(&config).with_faults(StorefrontFaults {
                reject_logins: true,
                ..StorefrontFaults::default()
            });
            let home = HomePage::open(context_with(storefront, config)).await.unwrap();
            let login = home.open_login().await.unwrap();
            let outcome = login.login("admin", "admin").await.unwrap();
            assert!(!outcome.is_accepted());
        }
    }
}
