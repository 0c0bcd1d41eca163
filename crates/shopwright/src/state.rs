//! Checkout state machine.
//!
//! [`CheckoutFlow`] tracks which page the session is on and only runs an
//! action when the current [`PageState`] allows it. Illegal actions fail with
//! [`ShopError::InvalidTransition`] before anything is sent to the browser.

use crate::locator::Locator;
use crate::model::{CartLine, Category, OrderConfirmation, Product, PurchaseForm};
use crate::pages::locators::home;
use crate::pages::{CartPage, HomePage, LoginOutcome, LoginPage, OrderModal, PageObject, ProductPage};
use crate::result::{ShopError, ShopResult};
use crate::session::SessionContext;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Navigational state of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageState {
    /// Landing page, no category filter
    Home,
    /// Login modal open over the home page
    LoginModal,
    /// Product grid filtered by category
    CategoryView(Category),
    /// Detail page of the named product
    ProductDetail(String),
    /// Cart page
    Cart,
    /// Order modal open over the cart
    OrderModal,
    /// Purchase confirmation showing
    Confirmed,
}

impl PageState {
    /// Whether `action` may run from this state
    #[must_use]
    pub const fn allows(&self, action: Action) -> bool {
        match action {
            Action::OpenLogin | Action::SelectCategory | Action::SelectProduct => {
                matches!(self, Self::Home | Self::CategoryView(_))
            }
            Action::Login | Action::CloseLogin => matches!(self, Self::LoginModal),
            Action::AddToCart => matches!(self, Self::ProductDetail(_)),
            Action::GoToCart => matches!(
                self,
                Self::Home | Self::CategoryView(_) | Self::ProductDetail(_)
            ),
            Action::PlaceOrder => matches!(self, Self::Cart),
            Action::Submit | Action::CloseOrder => matches!(self, Self::OrderModal),
            Action::Acknowledge => matches!(self, Self::Confirmed),
            Action::OpenCart | Action::NavigateHome => true,
        }
    }

    /// Whether the flow has reached a successful end
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl std::fmt::Display for PageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::LoginModal => write!(f, "LoginModal"),
            Self::CategoryView(c) => write!(f, "CategoryView({c})"),
            Self::ProductDetail(p) => write!(f, "ProductDetail({p})"),
            Self::Cart => write!(f, "Cart"),
            Self::OrderModal => write!(f, "OrderModal"),
            Self::Confirmed => write!(f, "Confirmed"),
        }
    }
}

/// Actions the flow can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Open the login modal
    OpenLogin,
    /// Submit credentials
    Login,
    /// Close the login modal
    CloseLogin,
    /// Filter the grid by category
    SelectCategory,
    /// Open a product detail page
    SelectProduct,
    /// Add the shown product to the cart
    AddToCart,
    /// Go to the cart through the navigation bar
    GoToCart,
    /// Open the cart by URL
    OpenCart,
    /// Open the order modal
    PlaceOrder,
    /// Submit the purchase form
    Submit,
    /// Close the order modal
    CloseOrder,
    /// Dismiss the purchase confirmation
    Acknowledge,
    /// Open the base URL
    NavigateHome,
}

impl Action {
    /// Name used in errors and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenLogin => "open_login",
            Self::Login => "login",
            Self::CloseLogin => "close_login",
            Self::SelectCategory => "select_category",
            Self::SelectProduct => "select_product",
            Self::AddToCart => "add_to_cart",
            Self::GoToCart => "go_to_cart",
            Self::OpenCart => "open_cart",
            Self::PlaceOrder => "place_order",
            Self::Submit => "submit",
            Self::CloseOrder => "close_order",
            Self::Acknowledge => "acknowledge",
            Self::NavigateHome => "navigate_home",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One executed transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the action
    pub from: PageState,
    /// Action taken
    pub action: Action,
    /// State after the action
    pub to: PageState,
    /// Time spent in the action
    pub duration: Duration,
}

/// Session-bound checkout state machine
#[derive(Debug)]
pub struct CheckoutFlow {
    ctx: SessionContext,
    state: PageState,
    added: Vec<CartLine>,
    transitions: Vec<TransitionRecord>,
}

impl CheckoutFlow {
    /// Bind to a session already showing the home page
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            state: PageState::Home,
            added: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Open the base URL and start in [`PageState::Home`]
    ///
    /// # Errors
    ///
    /// Returns error if the home page never loads
    pub async fn start(ctx: SessionContext) -> ShopResult<Self> {
        HomePage::open(ctx.clone()).await?;
        Ok(Self::new(ctx))
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &PageState {
        &self.state
    }

    /// Session context
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Products successfully added during this flow, oldest first
    #[must_use]
    pub fn added_lines(&self) -> &[CartLine] {
        &self.added
    }

    /// Executed transitions, oldest first
    #[must_use]
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    fn ensure(&self, action: Action) -> ShopResult<Instant> {
        if self.state.allows(action) {
            Ok(Instant::now())
        } else {
            tracing::warn!(state = %self.state, %action, "invalid transition");
            Err(ShopError::InvalidTransition {
                from: self.state.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn enter(&mut self, action: Action, to: PageState, started: Instant) {
        tracing::info!(from = %self.state, %action, to = %to, "transition");
        let from = std::mem::replace(&mut self.state, to.clone());
        self.transitions.push(TransitionRecord {
            from,
            action,
            to,
            duration: started.elapsed(),
        });
    }

    /// Category view the current product was opened from
    fn opened_from(&self) -> Option<Category> {
        self.transitions
            .iter()
            .rev()
            .find(|t| t.action == Action::SelectProduct)
            .and_then(|t| match t.from {
                PageState::CategoryView(c) => Some(c),
                _ => None,
            })
    }

    fn home(&self) -> HomePage {
        HomePage::new(self.ctx.clone())
    }

    /// Open the login modal
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside Home/CategoryView
    pub async fn open_login(&mut self) -> ShopResult<()> {
        let started = self.ensure(Action::OpenLogin)?;
        self.home().open_login().await?;
        self.enter(Action::OpenLogin, PageState::LoginModal, started);
        Ok(())
    }

    /// Submit credentials; an accepted login returns to Home, a rejected one
    /// stays in the modal
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside LoginModal
    pub async fn login(&mut self, username: &str, password: &str) -> ShopResult<LoginOutcome> {
        let started = self.ensure(Action::Login)?;
        let outcome = LoginPage::new(self.ctx.clone()).login(username, password).await?;
        let to = if outcome.is_accepted() {
            PageState::Home
        } else {
            PageState::LoginModal
        };
        self.enter(Action::Login, to, started);
        Ok(outcome)
    }

    /// Close the login modal
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside LoginModal
    pub async fn close_login(&mut self) -> ShopResult<()> {
        let started = self.ensure(Action::CloseLogin)?;
        LoginPage::new(self.ctx.clone()).close().await?;
        self.enter(Action::CloseLogin, PageState::Home, started);
        Ok(())
    }

    /// Filter the grid by category
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside Home/CategoryView
    pub async fn select_category(&mut self, category: Category) -> ShopResult<()> {
        let started = self.ensure(Action::SelectCategory)?;
        self.home().select_category(category).await?;
        self.enter(Action::SelectCategory, PageState::CategoryView(category), started);
        Ok(())
    }

    /// Filter the grid by category name
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnsupportedCategory`] for names outside the
    /// catalog, before touching the browser
    pub async fn select_category_named(&mut self, name: &str) -> ShopResult<Category> {
        self.ensure(Action::SelectCategory)?;
        let category = Category::parse(name)?;
        self.select_category(category).await?;
        Ok(category)
    }

    /// Open the first product whose link contains `name`
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ProductNotFound`] if no link matches
    pub async fn select_product(&mut self, name: &str) -> ShopResult<ProductPage> {
        let started = self.ensure(Action::SelectProduct)?;
        let page = self.home().select_product(name).await?;
        let shown = page.name().await?;
        self.enter(Action::SelectProduct, PageState::ProductDetail(shown), started);
        Ok(page)
    }

    /// Add the shown product to the cart
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnexpectedAcknowledgement`] if the site's answer
    /// is not "Product added"
    pub async fn add_to_cart(&mut self) -> ShopResult<()> {
        let started = self.ensure(Action::AddToCart)?;
        let page = ProductPage::new(self.ctx.clone());
        let name = page.name().await?;
        let price = page.price().await?.unwrap_or_default();
        page.add_to_cart().await?;

        let product = match self.opened_from() {
            Some(category) => Product::new(name.clone(), price, category),
            None => Product::uncategorized(name.clone(), price),
        };
        self.added.push(CartLine::now(product));
        self.enter(Action::AddToCart, PageState::ProductDetail(name), started);
        Ok(())
    }

    /// Go to the cart through the navigation bar
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] from the modals or the
    /// confirmation
    pub async fn go_to_cart(&mut self) -> ShopResult<CartPage> {
        let started = self.ensure(Action::GoToCart)?;
        let cart = self.home().go_to_cart().await?;
        self.enter(Action::GoToCart, PageState::Cart, started);
        Ok(cart)
    }

    /// Open the cart by URL, from any state
    ///
    /// # Errors
    ///
    /// Returns error if the cart page never loads
    pub async fn open_cart(&mut self) -> ShopResult<CartPage> {
        let started = self.ensure(Action::OpenCart)?;
        let cart = CartPage::open(self.ctx.clone()).await?;
        self.enter(Action::OpenCart, PageState::Cart, started);
        Ok(cart)
    }

    /// Cart page for queries while in [`PageState::Cart`]
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside Cart
    pub fn cart(&self) -> ShopResult<CartPage> {
        if self.state == PageState::Cart {
            Ok(CartPage::new(self.ctx.clone()))
        } else {
            Err(ShopError::InvalidTransition {
                from: self.state.to_string(),
                action: "inspect_cart".to_string(),
            })
        }
    }

    /// Open the order modal; stays in Cart on failure
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ModalNotShown`] when the cart is empty
    pub async fn place_order(&mut self) -> ShopResult<OrderModal> {
        let started = self.ensure(Action::PlaceOrder)?;
        let modal = CartPage::new(self.ctx.clone()).place_order().await?;
        self.enter(Action::PlaceOrder, PageState::OrderModal, started);
        Ok(modal)
    }

    /// Submit the purchase form; stays in OrderModal on failure
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ConfirmationMissing`] if no confirmation shows
    pub async fn submit(&mut self, form: &PurchaseForm) -> ShopResult<OrderConfirmation> {
        let started = self.ensure(Action::Submit)?;
        let confirmation = OrderModal::new(self.ctx.clone()).submit(form).await?;
        self.added.clear();
        self.enter(Action::Submit, PageState::Confirmed, started);
        Ok(confirmation)
    }

    /// Close the order modal without purchasing
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside OrderModal
    pub async fn close_order(&mut self) -> ShopResult<()> {
        let started = self.ensure(Action::CloseOrder)?;
        OrderModal::new(self.ctx.clone()).close().await?;
        self.enter(Action::CloseOrder, PageState::Cart, started);
        Ok(())
    }

    /// Dismiss the confirmation; the site returns to the home page
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::InvalidTransition`] outside Confirmed
    pub async fn acknowledge(&mut self) -> ShopResult<()> {
        let started = self.ensure(Action::Acknowledge)?;
        OrderModal::new(self.ctx.clone()).click_ok().await?;
        self.home().wait_until_loaded().await?;
        self.enter(Action::Acknowledge, PageState::Home, started);
        Ok(())
    }

    /// Open the base URL, from any state
    ///
    /// # Errors
    ///
    /// Returns error if the home page never loads
    pub async fn navigate_home(&mut self) -> ShopResult<()> {
        let started = self.ensure(Action::NavigateHome)?;
        HomePage::open(self.ctx.clone()).await?;
        self.enter(Action::NavigateHome, PageState::Home, started);
        Ok(())
    }

    /// Whether the navigation bar shows a logged-in user
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn is_logged_in(&self) -> ShopResult<bool> {
        let welcome: Locator = home::welcome_user();
        self.ctx.visible_now(&welcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::data::{self, credentials, products};
    use crate::session::{SessionHandle, SimulatedStorefront};
    use std::sync::Arc;

    fn context() -> (Arc<SimulatedStorefront>, SessionContext) {
        let config = SuiteConfig::default()
            .with_base_url("https://demo.test/")
            .with_timeout_seconds(1)
            .with_poll_interval_ms(5);
        let storefront = Arc::new(SimulatedStorefront::new(&config));
        let session: SessionHandle = storefront.clone();
        (storefront, SessionContext::new(session, Arc::new(config)))
    }

    mod table_tests {
        use super::*;

        #[test]
        fn test_home_allows_browsing_only() {
            let s = PageState::Home;
            assert!(s.allows(Action::SelectCategory));
            assert!(s.allows(Action::SelectProduct));
            assert!(s.allows(Action::GoToCart));
            assert!(!s.allows(Action::AddToCart));
            assert!(!s.allows(Action::PlaceOrder));
            assert!(!s.allows(Action::Submit));
        }

        #[test]
        fn test_navigation_is_always_allowed() {
            let states = [
                PageState::Home,
                PageState::LoginModal,
                PageState::CategoryView(Category::Monitors),
                PageState::ProductDetail("x".to_string()),
                PageState::Cart,
                PageState::OrderModal,
                PageState::Confirmed,
            ];
            for s in &states {
                assert!(s.allows(Action::NavigateHome), "{s}");
                assert!(s.allows(Action::OpenCart), "{s}");
            }
        }

        #[test]
        fn test_only_confirmed_is_terminal() {
            assert!(PageState::Confirmed.is_terminal());
            assert!(!PageState::Cart.is_terminal());
        }

        #[test]
        fn test_display() {
            assert_eq!(
                PageState::CategoryView(Category::Laptops).to_string(),
                "CategoryView(Laptops)"
            );
            assert_eq!(Action::PlaceOrder.to_string(), "place_order");
        }
    }

    mod flow_tests {
        use super::*;

        #[tokio::test]
        async fn test_invalid_transition_touches_nothing() {
            let (storefront, ctx) = context();
            let mut flow = CheckoutFlow::new(ctx);
            let calls_before = storefront.history().len();
            let err = flow.place_order().await.unwrap_err();
            assert!(matches!(
                err,
                ShopError::InvalidTransition { ref from, ref action } if from == "Home" && action == "place_order"
            ));
            assert_eq!(storefront.history().len(), calls_before);
            assert_eq!(flow.state(), &PageState::Home);
        }

        #[tokio::test]
        async fn test_full_checkout() {
            let (storefront, ctx) = context();
            let mut flow = CheckoutFlow::start(ctx).await.unwrap();
            flow.select_category(Category::Phones).await.unwrap();
            flow.select_product(products::SAMSUNG_GALAXY_S6).await.unwrap();
            assert_eq!(
                flow.state(),
                &PageState::ProductDetail(products::SAMSUNG_GALAXY_S6.to_string())
            );
            flow.add_to_cart().await.unwrap();
            assert_eq!(flow.added_lines().len(), 1);
            assert_eq!(flow.added_lines()[0].product.category, Some(Category::Phones));

            let cart = flow.go_to_cart().await.unwrap();
            assert!(cart.validate_total().await.unwrap());
            flow.place_order().await.unwrap();
            let confirmation = flow.submit(&data::default_purchase_form()).await.unwrap();
            assert!(confirmation.matched_pattern);
            assert!(flow.state().is_terminal());

            flow.acknowledge().await.unwrap();
            assert_eq!(flow.state(), &PageState::Home);
            assert!(storefront.cart_lines().is_empty());
            assert_eq!(flow.transitions().len(), 7);
        }

        #[tokio::test]
        async fn test_product_opened_from_home_has_no_category() {
            let (storefront, ctx) = context();
            let mut flow = CheckoutFlow::start(ctx).await.unwrap();
            flow.select_product(products::MACBOOK_AIR).await.unwrap();
            flow.add_to_cart().await.unwrap();

            assert_eq!(flow.added_lines()[0].product.category, None);
            assert_eq!(
                storefront.cart_lines()[0].product.category,
                Some(Category::Laptops)
            );
        }

        #[tokio::test]
        async fn test_navigate_home_forgets_category() {
            let (_, ctx) = context();
            let mut flow = CheckoutFlow::start(ctx).await.unwrap();
            flow.select_category(Category::Phones).await.unwrap();
            flow.select_product(products::NEXUS_6).await.unwrap();
            flow.add_to_cart().await.unwrap();
            flow.navigate_home().await.unwrap();
            flow.select_product(products::MACBOOK_AIR).await.unwrap();
            flow.add_to_cart().await.unwrap();

            let categories: Vec<_> = flow
                .added_lines()
                .iter()
                .map(|l| l.product.category)
                .collect();
            assert_eq!(categories, vec![Some(Category::Phones), None]);
        }

        #[tokio::test]
        async fn test_unsupported_category_keeps_state() {
            let (_, ctx) = context();
            let mut flow = CheckoutFlow::start(ctx).await.unwrap();
            let err = flow.select_category_named("Tablets").await.unwrap_err();
            assert!(matches!(err, ShopError::UnsupportedCategory { .. }));
            assert_eq!(flow.state(), &PageState::Home);
        }

        #[tokio::test]
        async fn test_empty_cart_place_order_stays_in_cart() {
            let (_, ctx) = context();
            let mut flow = CheckoutFlow::start(ctx).await.unwrap();
            flow.open_cart().await.unwrap();
            assert!(!flow.cart().unwrap().has_items().await.unwrap());
            let err = flow.place_order().await.unwrap_err();
            assert!(matches!(err, ShopError::ModalNotShown));
            assert_eq!(flow.state(), &PageState::Cart);
        }

        #[tokio::test]
        async fn test_login_round_trip() {
            let (_, ctx) = context();
            let mut flow = CheckoutFlow::start(ctx).await.unwrap();
            flow.open_login().await.unwrap();
            let outcome = flow
                .login(credentials::VALID_USERNAME, credentials::INVALID_PASSWORD)
                .await
                .unwrap();
            assert!(!outcome.is_accepted());
            assert_eq!(flow.state(), &PageState::LoginModal);
            let outcome = flow
                .login(credentials::VALID_USERNAME, credentials::VALID_PASSWORD)
                .await
                .unwrap();
            assert!(outcome.is_accepted());
            assert_eq!(flow.state(), &PageState::Home);
            assert!(flow.is_logged_in().await.unwrap());
        }

        #[tokio::test]
        async fn test_cart_outside_cart_state() {
            let (_, ctx) = context();
            let flow = CheckoutFlow::new(ctx);
            assert!(matches!(
                flow.cart().unwrap_err(),
                ShopError::InvalidTransition { .. }
            ));
        }
    }
}
