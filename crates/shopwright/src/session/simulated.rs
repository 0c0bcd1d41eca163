//! In-memory model of the demo storefront.
//!
//! Resolves the same locators the page objects use against a small model of
//! the site: catalog, server-side cart, login modal, order modal, purchase
//! confirmation, JavaScript alerts and local storage. Every call is recorded
//! so tests can assert on the interaction sequence.

use super::{BrowserSession, ElementHandle, Screenshot, SessionFactory, SessionHandle};
use crate::config::SuiteConfig;
use crate::data::{messages, paths};
use crate::locator::Selector;
use crate::model::{lines_total, CartLine, Category, Product};
use crate::pages::locators;
use crate::result::{ShopError, ShopResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Catalog served by the storefront: name, price, category
const CATALOG: [(&str, f64, Category); 15] = [
    ("Samsung galaxy s6", 360.0, Category::Phones),
    ("Nokia lumia 1520", 820.0, Category::Phones),
    ("Nexus 6", 650.0, Category::Phones),
    ("Samsung galaxy s7", 800.0, Category::Phones),
    ("Iphone 6 32gb", 790.0, Category::Phones),
    ("Sony xperia z5", 320.0, Category::Phones),
    ("HTC One M9", 700.0, Category::Phones),
    ("Sony vaio i5", 790.0, Category::Laptops),
    ("Sony vaio i7", 790.0, Category::Laptops),
    ("MacBook air", 700.0, Category::Laptops),
    ("Dell i7 8gb", 700.0, Category::Laptops),
    ("2017 Dell 15.6 Inch", 700.0, Category::Laptops),
    ("MacBook Pro", 1100.0, Category::Laptops),
    ("Apple monitor 24", 400.0, Category::Monitors),
    ("ASUS Full HD", 230.0, Category::Monitors),
];

/// Registered accounts: username, password
const USERS: [(&str, &str); 1] = [("admin", "admin")];

const PURCHASE_INCOMPLETE: &str = "Please fill out Name and Creditcard.";
const LOGIN_INCOMPLETE: &str = "Please fill out Username and Password.";
const PURCHASE_TITLE: &str = "Thank you for your purchase!";
const FIRST_ORDER_ID: u64 = 7_315_402;

/// 1x1 white PNG
const BLANK_PNG: [u8; 69] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xde, 0x00, 0x00, 0x00, 0x0c, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8,
    0xff, 0xff, 0x3f, 0x00, 0x05, 0xfe, 0x02, 0xfe, 0x0d, 0xef, 0x46, 0xb8, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Every product the storefront lists
#[must_use]
pub fn catalog() -> Vec<Product> {
    CATALOG
        .iter()
        .map(|(name, price, category)| Product::new(*name, *price, *category))
        .collect()
}

/// Deliberate misbehaviour, for exercising failure paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontFaults {
    /// Acknowledge add-to-cart with this text instead of "Product added."
    /// (and do not add the line)
    pub unexpected_acknowledgement: Option<String>,
    /// Accept purchases without ever showing the confirmation dialog
    pub suppress_confirmation: bool,
    /// Amount added to the displayed cart total
    pub total_skew: f64,
    /// Reject every login with "Wrong password."
    pub reject_logins: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Home { filter: Option<Category> },
    Product(Option<usize>),
    Cart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderField {
    Name,
    Country,
    City,
    Card,
    Month,
    Year,
}

impl OrderField {
    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    HomeLink,
    LoginButton,
    WelcomeUser,
    CartLink,
    CategoryLink(Category),
    ProductCard(usize),
    ProductLink(usize),
    LoginModal,
    LoginUsername,
    LoginPassword,
    LoginSubmit,
    LoginClose,
    ProductName,
    ProductPrice,
    ProductDescription,
    AddToCart,
    CartRow(usize),
    CartTitle(usize),
    CartPrice(usize),
    DeleteLink(usize),
    CartTotal,
    PlaceOrder,
    OrderModal,
    OrderInput(OrderField),
    Purchase,
    OrderClose,
    ConfirmationDialog,
    ConfirmationTitle,
    ConfirmationMessage,
    ConfirmationOk,
}

/// What a selector asks for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Query {
    One(Node),
    CategoryLinks,
    ProductCards,
    ProductLinks,
    ProductLinksContaining(String),
    CartRows,
    CartTitles,
    CartPrices,
    DeleteLinks,
}

fn routes() -> Vec<(Selector, Query)> {
    use locators::{cart, confirmation, home, login, order, product};

    let one = |l: crate::locator::Locator, n: Node| (l.selector().clone(), Query::One(n));
    let mut table = vec![
        one(home::home_link(), Node::HomeLink),
        one(home::login_button(), Node::LoginButton),
        one(home::welcome_user(), Node::WelcomeUser),
        one(home::cart_link(), Node::CartLink),
        (home::category_links().selector().clone(), Query::CategoryLinks),
        (home::product_cards().selector().clone(), Query::ProductCards),
        (home::product_links().selector().clone(), Query::ProductLinks),
        one(login::modal(), Node::LoginModal),
        one(login::username(), Node::LoginUsername),
        one(login::password(), Node::LoginPassword),
        one(login::submit(), Node::LoginSubmit),
        one(login::close(), Node::LoginClose),
        one(product::name(), Node::ProductName),
        one(product::price(), Node::ProductPrice),
        one(product::description(), Node::ProductDescription),
        one(product::add_to_cart(), Node::AddToCart),
        (cart::rows().selector().clone(), Query::CartRows),
        (cart::titles().selector().clone(), Query::CartTitles),
        (cart::prices().selector().clone(), Query::CartPrices),
        (cart::delete_links().selector().clone(), Query::DeleteLinks),
        one(cart::total(), Node::CartTotal),
        one(cart::place_order(), Node::PlaceOrder),
        one(order::modal(), Node::OrderModal),
        one(order::name(), Node::OrderInput(OrderField::Name)),
        one(order::country(), Node::OrderInput(OrderField::Country)),
        one(order::city(), Node::OrderInput(OrderField::City)),
        one(order::card(), Node::OrderInput(OrderField::Card)),
        one(order::month(), Node::OrderInput(OrderField::Month)),
        one(order::year(), Node::OrderInput(OrderField::Year)),
        one(order::purchase(), Node::Purchase),
        one(order::close(), Node::OrderClose),
        one(confirmation::dialog(), Node::ConfirmationDialog),
        one(confirmation::title(), Node::ConfirmationTitle),
        one(confirmation::message(), Node::ConfirmationMessage),
        one(confirmation::ok(), Node::ConfirmationOk),
    ];
    for category in Category::ALL {
        table.push(one(home::category_link(category), Node::CategoryLink(category)));
    }
    table
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

fn description(index: usize) -> String {
    let (name, _, category) = CATALOG[index];
    match category {
        Category::Phones => format!("{name}: unlocked smartphone, ships with charger."),
        Category::Laptops => format!("{name}: notebook with one-year warranty."),
        Category::Monitors => format!("{name}: LED display with HDMI input."),
    }
}

#[derive(Debug)]
struct State {
    url: Option<String>,
    view: View,
    history: Vec<String>,
    ready_at: Instant,
    login_open: bool,
    login_fields: [String; 2],
    logged_in: Option<String>,
    order_open: bool,
    order_fields: [String; 6],
    confirmation: Option<String>,
    alerts: VecDeque<String>,
    cart: Vec<CartLine>,
    /// Grid kept on screen while a category filter renders
    stale_filter: Option<Option<Category>>,
    local_storage: BTreeMap<String, String>,
    next_order_id: u64,
    script_results: VecDeque<serde_json::Value>,
    calls: Vec<String>,
    closed: bool,
}

impl State {
    fn new() -> Self {
        Self {
            url: None,
            view: View::Home { filter: None },
            history: Vec::new(),
            ready_at: Instant::now(),
            login_open: false,
            login_fields: Default::default(),
            logged_in: None,
            order_open: false,
            order_fields: Default::default(),
            confirmation: None,
            alerts: VecDeque::new(),
            cart: Vec::new(),
            stale_filter: None,
            local_storage: BTreeMap::new(),
            next_order_id: FIRST_ORDER_ID,
            script_results: VecDeque::new(),
            calls: Vec::new(),
            closed: false,
        }
    }

    fn ready(&self) -> bool {
        Instant::now() >= self.ready_at
    }

    fn visible_products(&self) -> Vec<usize> {
        match self.view {
            View::Home { filter } if self.ready() => products_in(filter),
            View::Home { .. } => self.stale_filter.map(products_in).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn cart_rows(&self) -> usize {
        if self.view == View::Cart && self.ready() {
            self.cart.len()
        } else {
            0
        }
    }
}

fn products_in(filter: Option<Category>) -> Vec<usize> {
    CATALOG
        .iter()
        .enumerate()
        .filter(|(_, (_, _, c))| filter.map_or(true, |f| f == *c))
        .map(|(i, _)| i)
        .collect()
}

/// Simulated browser session against an in-memory storefront
#[derive(Debug)]
pub struct SimulatedStorefront {
    config: SuiteConfig,
    faults: StorefrontFaults,
    render_delay: Duration,
    stale_grid: bool,
    routes: Vec<(Selector, Query)>,
    state: Mutex<State>,
}

impl SimulatedStorefront {
    /// Create a storefront served under `config.base_url`
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            config: config.clone(),
            faults: StorefrontFaults::default(),
            render_delay: Duration::ZERO,
            stale_grid: false,
            routes: routes(),
            state: Mutex::new(State::new()),
        }
    }

    /// Inject faults
    #[must_use]
    pub fn with_faults(mut self, faults: StorefrontFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Delay before dynamic content (product grid, product details, cart
    /// rows) appears after each navigation
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Keep the previous grid on screen while a category filter renders,
    /// the way the live site does until its request returns
    #[must_use]
    pub const fn with_stale_grid(mut self) -> Self {
        self.stale_grid = true;
        self
    }

    /// Queue a value for the next `execute_script` call
    ///
    /// # Errors
    ///
    /// Returns error if the state lock is poisoned
    pub fn push_script_result(&self, value: serde_json::Value) -> ShopResult<()> {
        self.lock()?.script_results.push_back(value);
        Ok(())
    }

    /// Recorded calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(prefix))
    }

    /// Whether `quit` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().map(|s| s.closed).unwrap_or(true)
    }

    /// Server-side cart contents
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.lock().map(|s| s.cart.clone()).unwrap_or_default()
    }

    /// Logged-in username, if any
    #[must_use]
    pub fn logged_in_user(&self) -> Option<String> {
        self.lock().ok().and_then(|s| s.logged_in.clone())
    }

    fn lock(&self) -> ShopResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ShopError::session("simulated storefront state poisoned"))
    }

    /// Lock the state of a live session and record the call
    fn live(&self, call: String) -> ShopResult<MutexGuard<'_, State>> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(ShopError::session("session already closed"));
        }
        state.calls.push(call);
        Ok(state)
    }

    fn classify(&self, selector: &Selector) -> Option<Query> {
        if let Selector::CssWithText { css, text } = selector {
            if locators::home::product_links().selector() == &Selector::Css(css.clone()) {
                return Some(Query::ProductLinksContaining(text.clone()));
            }
        }
        self.routes
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, q)| q.clone())
    }

    fn present(state: &State, node: Node) -> bool {
        if state.url.is_none() {
            return false;
        }
        match node {
            Node::HomeLink
            | Node::LoginButton
            | Node::WelcomeUser
            | Node::CartLink
            | Node::LoginModal
            | Node::LoginUsername
            | Node::LoginPassword
            | Node::LoginSubmit
            | Node::LoginClose => true,
            Node::CategoryLink(_) => matches!(state.view, View::Home { .. }),
            Node::ProductCard(i) | Node::ProductLink(i) => state.visible_products().contains(&i),
            Node::ProductName | Node::ProductPrice | Node::ProductDescription | Node::AddToCart => {
                matches!(state.view, View::Product(Some(_))) && state.ready()
            }
            Node::CartRow(i) | Node::CartTitle(i) | Node::CartPrice(i) | Node::DeleteLink(i) => {
                i < state.cart_rows()
            }
            Node::CartTotal
            | Node::PlaceOrder
            | Node::OrderModal
            | Node::OrderInput(_)
            | Node::Purchase
            | Node::OrderClose => state.view == View::Cart,
            Node::ConfirmationDialog
            | Node::ConfirmationTitle
            | Node::ConfirmationMessage
            | Node::ConfirmationOk => state.confirmation.is_some(),
        }
    }

    fn nodes(state: &State, query: &Query) -> Vec<Node> {
        let nodes: Vec<Node> = match query {
            Query::One(node) => vec![*node],
            Query::CategoryLinks => Category::ALL.iter().map(|c| Node::CategoryLink(*c)).collect(),
            Query::ProductCards => state.visible_products().into_iter().map(Node::ProductCard).collect(),
            Query::ProductLinks => state.visible_products().into_iter().map(Node::ProductLink).collect(),
            Query::ProductLinksContaining(text) => state
                .visible_products()
                .into_iter()
                .filter(|i| CATALOG[*i].0.contains(text.as_str()))
                .map(Node::ProductLink)
                .collect(),
            Query::CartRows => (0..state.cart_rows()).map(Node::CartRow).collect(),
            Query::CartTitles => (0..state.cart_rows()).map(Node::CartTitle).collect(),
            Query::CartPrices => (0..state.cart_rows()).map(Node::CartPrice).collect(),
            Query::DeleteLinks => (0..state.cart_rows()).map(Node::DeleteLink).collect(),
        };
        nodes.into_iter().filter(|n| Self::present(state, *n)).collect()
    }

    fn resolve(&self, state: &State, element: &ElementHandle) -> ShopResult<Node> {
        self.classify(&element.selector)
            .and_then(|q| Self::nodes(state, &q).get(element.index).copied())
            .ok_or_else(|| ShopError::ElementNotFound {
                locator: element.to_string(),
            })
    }

    fn displayed(state: &State, node: Node) -> bool {
        match node {
            Node::WelcomeUser => state.logged_in.is_some(),
            Node::LoginModal
            | Node::LoginUsername
            | Node::LoginPassword
            | Node::LoginSubmit
            | Node::LoginClose => state.login_open,
            Node::OrderModal
            | Node::OrderInput(_)
            | Node::Purchase
            | Node::OrderClose => state.order_open,
            _ => true,
        }
    }

    fn displayed_total(&self, state: &State) -> String {
        if state.cart.is_empty() {
            String::new()
        } else {
            format_amount(lines_total(&state.cart) + self.faults.total_skew)
        }
    }

    fn node_text(&self, state: &State, node: Node) -> String {
        match node {
            Node::HomeLink => "PRODUCT STORE".to_string(),
            Node::LoginButton => "Log in".to_string(),
            Node::WelcomeUser => state
                .logged_in
                .as_ref()
                .map(|u| format!("Welcome {u}"))
                .unwrap_or_default(),
            Node::CartLink => "Cart".to_string(),
            Node::CategoryLink(c) => c.link_text().to_string(),
            Node::ProductCard(i) => {
                let (name, price, _) = CATALOG[i];
                format!("{name}\n${}\n{}", format_amount(price), description(i))
            }
            Node::ProductLink(i) => CATALOG[i].0.to_string(),
            Node::LoginModal => "Log in".to_string(),
            Node::LoginUsername => state.login_fields[0].clone(),
            Node::LoginPassword => state.login_fields[1].clone(),
            Node::LoginSubmit => "Log in".to_string(),
            Node::LoginClose | Node::OrderClose => "Close".to_string(),
            Node::ProductName => self.current_product(state).map(|i| CATALOG[i].0.to_string()).unwrap_or_default(),
            Node::ProductPrice => self
                .current_product(state)
                .map(|i| format!("${} *includes tax", format_amount(CATALOG[i].1)))
                .unwrap_or_default(),
            Node::ProductDescription => self.current_product(state).map(description).unwrap_or_default(),
            Node::AddToCart => "Add to cart".to_string(),
            Node::CartRow(i) => state.cart.get(i).map_or_else(String::new, |l| {
                format!("{} {} Delete", l.product.name, format_amount(l.product.price))
            }),
            Node::CartTitle(i) => state.cart.get(i).map(|l| l.product.name.clone()).unwrap_or_default(),
            Node::CartPrice(i) => state
                .cart
                .get(i)
                .map(|l| format_amount(l.product.price))
                .unwrap_or_default(),
            Node::DeleteLink(_) => "Delete".to_string(),
            Node::CartTotal => self.displayed_total(state),
            Node::PlaceOrder => "Place Order".to_string(),
            Node::OrderModal => "Place order".to_string(),
            Node::OrderInput(f) => state.order_fields[f.slot()].clone(),
            Node::Purchase => "Purchase".to_string(),
            Node::ConfirmationDialog => format!(
                "{PURCHASE_TITLE}\n{}\nOK",
                state.confirmation.clone().unwrap_or_default()
            ),
            Node::ConfirmationTitle => PURCHASE_TITLE.to_string(),
            Node::ConfirmationMessage => state.confirmation.clone().unwrap_or_default(),
            Node::ConfirmationOk => "OK".to_string(),
        }
    }

    fn current_product(&self, state: &State) -> Option<usize> {
        match state.view {
            View::Product(i) => i,
            _ => None,
        }
    }

    fn route(&self, url: &str) -> View {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        if path.ends_with(paths::CART) {
            View::Cart
        } else if path.ends_with("prod.html") {
            let id = url
                .split_once("idp_=")
                .and_then(|(_, rest)| rest.split('&').next())
                .and_then(|v| v.parse::<usize>().ok());
            View::Product(id.and_then(|i| i.checked_sub(1)).filter(|i| *i < CATALOG.len()))
        } else {
            View::Home { filter: None }
        }
    }

    fn navigate(&self, state: &mut State, url: &str, push_history: bool) {
        if push_history {
            if let Some(previous) = state.url.take() {
                state.history.push(previous);
            }
        }
        state.url = Some(url.to_string());
        state.view = self.route(url);
        state.stale_filter = None;
        state.login_open = false;
        state.order_open = false;
        state.confirmation = None;
        state.alerts.clear();
        state.ready_at = Instant::now() + self.render_delay;
        tracing::trace!(url, view = ?state.view, "simulated navigation");
    }

    fn login(&self, state: &mut State) {
        let [user, pass] = state.login_fields.clone();
        let alert = if user.trim().is_empty() || pass.is_empty() {
            Some(LOGIN_INCOMPLETE.to_string())
        } else if self.faults.reject_logins {
            Some(messages::WRONG_PASSWORD.to_string())
        } else {
            match USERS.iter().find(|(u, _)| *u == user) {
                None => Some(messages::USER_DOES_NOT_EXIST.to_string()),
                Some((_, p)) if *p != pass => Some(messages::WRONG_PASSWORD.to_string()),
                Some(_) => None,
            }
        };
        match alert {
            Some(text) => state.alerts.push_back(text),
            None => {
                state.logged_in = Some(user);
                state.login_open = false;
            }
        }
    }

    fn add_to_cart(&self, state: &mut State) {
        let Some(index) = self.current_product(state) else {
            return;
        };
        if let Some(text) = &self.faults.unexpected_acknowledgement {
            state.alerts.push_back(text.clone());
            return;
        }
        let (name, price, category) = CATALOG[index];
        state.cart.push(CartLine::now(Product::new(name, price, category)));
        state.alerts.push_back(format!("{}.", messages::PRODUCT_ADDED));
    }

    fn purchase(&self, state: &mut State) {
        let name = state.order_fields[OrderField::Name.slot()].clone();
        let card = state.order_fields[OrderField::Card.slot()].clone();
        if name.trim().is_empty() || card.trim().is_empty() {
            state.alerts.push_back(PURCHASE_INCOMPLETE.to_string());
            return;
        }
        let id = state.next_order_id;
        state.next_order_id += 1;
        let message = format!(
            "Id: {id}\nAmount: {} USD\nCard Number: {card}\nName: {name}\nDate: {}",
            self.displayed_total(state),
            chrono::Utc::now().format("%-d/%-m/%Y"),
        );
        state.order_open = false;
        state.cart.clear();
        state.order_fields = Default::default();
        if !self.faults.suppress_confirmation {
            state.confirmation = Some(message);
        }
    }

    fn activate(&self, state: &mut State, node: Node) {
        match node {
            Node::HomeLink => {
                let url = self.config.index_url();
                self.navigate(state, &url, true);
            }
            Node::CartLink => {
                let url = self.config.cart_url();
                self.navigate(state, &url, true);
            }
            Node::LoginButton => {
                state.login_fields = Default::default();
                state.login_open = true;
            }
            Node::CategoryLink(category) => {
                let shown = match state.view {
                    View::Home { filter } if state.ready() => Some(filter),
                    View::Home { .. } => state.stale_filter,
                    View::Product(_) | View::Cart => None,
                };
                state.stale_filter = if self.stale_grid { shown } else { None };
                state.view = View::Home {
                    filter: Some(category),
                };
                state.ready_at = Instant::now() + self.render_delay;
            }
            Node::ProductLink(i) => {
                let url = self.config.url_for(&format!("prod.html?idp_={}", i + 1));
                self.navigate(state, &url, true);
            }
            Node::LoginSubmit => self.login(state),
            Node::LoginClose => state.login_open = false,
            Node::AddToCart => self.add_to_cart(state),
            Node::DeleteLink(i) => {
                if i < state.cart.len() {
                    state.cart.remove(i);
                    state.ready_at = Instant::now() + self.render_delay;
                }
            }
            Node::PlaceOrder => {
                if !state.cart.is_empty() {
                    state.order_open = true;
                }
            }
            Node::Purchase => self.purchase(state),
            Node::OrderClose => state.order_open = false,
            Node::ConfirmationOk => {
                let url = self.config.index_url();
                self.navigate(state, &url, true);
            }
            _ => {}
        }
    }

    fn check_no_alert(state: &State) -> ShopResult<()> {
        match state.alerts.front() {
            Some(text) => Err(ShopError::session(format!("unexpected alert open: {text}"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BrowserSession for SimulatedStorefront {
    fn backend(&self) -> &'static str {
        "simulated"
    }

    async fn open(&self, url: &str) -> ShopResult<()> {
        let mut state = self.live(format!("open:{url}"))?;
        self.navigate(&mut state, url, true);
        Ok(())
    }

    async fn back(&self) -> ShopResult<()> {
        let mut state = self.live("back".to_string())?;
        if let Some(previous) = state.history.pop() {
            self.navigate(&mut state, &previous, false);
        }
        Ok(())
    }

    async fn refresh(&self) -> ShopResult<()> {
        let mut state = self.live("refresh".to_string())?;
        if let Some(url) = state.url.clone() {
            self.navigate(&mut state, &url, false);
        }
        Ok(())
    }

    async fn current_url(&self) -> ShopResult<String> {
        let state = self.live("current_url".to_string())?;
        Ok(state.url.clone().unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn find_all(&self, selector: &Selector) -> ShopResult<Vec<ElementHandle>> {
        let state = self.live(format!("find_all:{selector}"))?;
        let count = self
            .classify(selector)
            .map_or(0, |q| Self::nodes(&state, &q).len());
        Ok((0..count)
            .map(|i| ElementHandle::new(selector.clone(), i))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> ShopResult<()> {
        let mut state = self.live(format!("click:{element}"))?;
        Self::check_no_alert(&state)?;
        let node = self.resolve(&state, element)?;
        if !Self::displayed(&state, node) {
            return Err(ShopError::session(format!("element not interactable: {element}")));
        }
        self.activate(&mut state, node);
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ShopResult<()> {
        let mut state = self.live(format!("type:{element}"))?;
        Self::check_no_alert(&state)?;
        let node = self.resolve(&state, element)?;
        if !Self::displayed(&state, node) {
            return Err(ShopError::session(format!("element not interactable: {element}")));
        }
        match node {
            Node::LoginUsername => state.login_fields[0] = text.to_string(),
            Node::LoginPassword => state.login_fields[1] = text.to_string(),
            Node::OrderInput(field) => state.order_fields[field.slot()] = text.to_string(),
            _ => return Err(ShopError::session(format!("element not editable: {element}"))),
        }
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> ShopResult<String> {
        let state = self.live(format!("text:{element}"))?;
        let node = self.resolve(&state, element)?;
        Ok(self.node_text(&state, node))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ShopResult<bool> {
        let state = self.live(format!("is_displayed:{element}"))?;
        Ok(self
            .resolve(&state, element)
            .is_ok_and(|node| Self::displayed(&state, node)))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> ShopResult<bool> {
        let state = self.live(format!("is_enabled:{element}"))?;
        Ok(self.resolve(&state, element).is_ok())
    }

    async fn execute_script(&self, script: &str) -> ShopResult<serde_json::Value> {
        let mut state = self.live(format!("execute_script:{script}"))?;
        Ok(state
            .script_results
            .pop_front()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn screenshot(&self) -> ShopResult<Screenshot> {
        let _state = self.live("screenshot".to_string())?;
        Ok(Screenshot::new(BLANK_PNG.to_vec()))
    }

    async fn alert_text(&self) -> ShopResult<Option<String>> {
        let state = self.live("alert_text".to_string())?;
        Ok(state.alerts.front().cloned())
    }

    async fn accept_alert(&self) -> ShopResult<()> {
        let mut state = self.live("accept_alert".to_string())?;
        state
            .alerts
            .pop_front()
            .map(|_| ())
            .ok_or_else(|| ShopError::session("no alert open"))
    }

    async fn dismiss_alert(&self) -> ShopResult<()> {
        let mut state = self.live("dismiss_alert".to_string())?;
        state
            .alerts
            .pop_front()
            .map(|_| ())
            .ok_or_else(|| ShopError::session("no alert open"))
    }

    async fn quit(&self) -> ShopResult<()> {
        let mut state = self.lock()?;
        state.calls.push("quit".to_string());
        state.closed = true;
        Ok(())
    }

    async fn local_storage_get(&self, key: &str) -> ShopResult<Option<String>> {
        let state = self.live(format!("local_storage_get:{key}"))?;
        Ok(state.local_storage.get(key).cloned())
    }

    async fn local_storage_set(&self, key: &str, value: &str) -> ShopResult<()> {
        let mut state = self.live(format!("local_storage_set:{key}"))?;
        state.local_storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn local_storage_remove(&self, key: &str) -> ShopResult<()> {
        let mut state = self.live(format!("local_storage_remove:{key}"))?;
        state.local_storage.remove(key);
        Ok(())
    }
}

/// Factory handing out a fresh [`SimulatedStorefront`] per scenario attempt
#[derive(Debug, Default)]
pub struct SimulatedFactory {
    faults: StorefrontFaults,
    render_delay: Duration,
    stale_grid: bool,
    created: Mutex<Vec<Arc<SimulatedStorefront>>>,
}

impl SimulatedFactory {
    /// Create a factory for well-behaved storefronts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject faults into every created storefront
    #[must_use]
    pub fn with_faults(mut self, faults: StorefrontFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Render delay for every created storefront
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Keep stale grids on screen in every created storefront
    #[must_use]
    pub const fn with_stale_grid(mut self) -> Self {
        self.stale_grid = true;
        self
    }

    /// Every storefront created so far
    #[must_use]
    pub fn created(&self) -> Vec<Arc<SimulatedStorefront>> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SessionFactory for SimulatedFactory {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn create(&self, config: &SuiteConfig) -> ShopResult<SessionHandle> {
        let mut storefront = SimulatedStorefront::new(config)
            .with_faults(self.faults.clone())
            .with_render_delay(self.render_delay);
        if self.stale_grid {
            storefront = storefront.with_stale_grid();
        }
        let storefront = Arc::new(storefront);
        self.created
            .lock()
            .map_err(|_| ShopError::session("simulated factory registry poisoned"))?
            .push(Arc::clone(&storefront));
        tracing::debug!(base_url = %config.base_url, "simulated storefront created");
        Ok(storefront)
    }
}
