//! Browser session abstraction.
//!
//! Every page object talks to the browser through [`BrowserSession`]. Two
//! backends implement it:
//!
//! - [`ChromiumSession`](chromium::ChromiumSession): real Chromium over CDP
//!   (feature `browser`)
//! - [`SimulatedStorefront`]: in-memory model of the demo storefront, used by
//!   tests and `--driver simulated`
//!
//! A session is owned by exactly one scenario. It is handed to page objects
//! through a [`SessionContext`] instead of living in any global.

#[cfg(feature = "browser")]
pub mod chromium;
pub mod simulated;

pub use simulated::{SimulatedFactory, SimulatedStorefront, StorefrontFaults};

use crate::config::SuiteConfig;
use crate::locator::{js_string, Locator, Selector};
use crate::result::{ShopError, ShopResult};
use crate::wait::WaitPolicy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Lazily resolved reference to one element.
///
/// Holds the selector and the match index, never a live node; every
/// operation resolves it again against the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Selector the element was found with
    pub selector: Selector,
    /// Position among the selector's matches
    pub index: usize,
}

impl ElementHandle {
    /// Create a handle
    #[must_use]
    pub const fn new(selector: Selector, index: usize) -> Self {
        Self { selector, index }
    }

    /// JavaScript expression evaluating to the element (or `undefined`)
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("({})[{}]", self.selector.to_query_all(), self.index)
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// When the screenshot was taken
    pub taken_at: DateTime<Utc>,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            taken_at: Utc::now(),
        }
    }

    /// Size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Whether any image data was captured
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Browser session used by page objects.
///
/// Methods take `&self`; backends guard their own state so one handle can be
/// shared between the page objects of a single scenario.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Backend name for logs and reports
    fn backend(&self) -> &'static str;

    /// Load a URL
    async fn open(&self, url: &str) -> ShopResult<()>;

    /// Go back in history
    async fn back(&self) -> ShopResult<()>;

    /// Reload the current page
    async fn refresh(&self) -> ShopResult<()>;

    /// Current URL
    async fn current_url(&self) -> ShopResult<String>;

    /// Every element matching `selector`, in document order
    async fn find_all(&self, selector: &Selector) -> ShopResult<Vec<ElementHandle>>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> ShopResult<()>;

    /// Clear an input and type into it
    async fn type_text(&self, element: &ElementHandle, text: &str) -> ShopResult<()>;

    /// Visible text of an element
    async fn text(&self, element: &ElementHandle) -> ShopResult<String>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> ShopResult<bool>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self, element: &ElementHandle) -> ShopResult<bool>;

    /// Evaluate a JavaScript expression in the page
    async fn execute_script(&self, script: &str) -> ShopResult<serde_json::Value>;

    /// Capture the viewport as PNG
    async fn screenshot(&self) -> ShopResult<Screenshot>;

    /// Text of the oldest open JavaScript alert, if any
    async fn alert_text(&self) -> ShopResult<Option<String>>;

    /// Accept the oldest open alert
    async fn accept_alert(&self) -> ShopResult<()>;

    /// Dismiss the oldest open alert
    async fn dismiss_alert(&self) -> ShopResult<()>;

    /// Release the browser. Called exactly once, on every exit path.
    async fn quit(&self) -> ShopResult<()>;

    /// First element matching `locator`
    async fn find_element(&self, locator: &Locator) -> ShopResult<ElementHandle> {
        self.find_all(locator.selector())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ShopError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    /// Read a local-storage entry
    async fn local_storage_get(&self, key: &str) -> ShopResult<Option<String>> {
        let value = self
            .execute_script(&format!("window.localStorage.getItem({})", js_string(key)))
            .await?;
        Ok(value.as_str().map(ToString::to_string))
    }

    /// Write a local-storage entry
    async fn local_storage_set(&self, key: &str, value: &str) -> ShopResult<()> {
        self.execute_script(&format!(
            "window.localStorage.setItem({}, {})",
            js_string(key),
            js_string(value)
        ))
        .await?;
        Ok(())
    }

    /// Remove a local-storage entry
    async fn local_storage_remove(&self, key: &str) -> ShopResult<()> {
        self.execute_script(&format!("window.localStorage.removeItem({})", js_string(key)))
            .await?;
        Ok(())
    }
}

/// Shared handle to a scenario's session
pub type SessionHandle = Arc<dyn BrowserSession>;

/// Creates one fresh session per scenario attempt
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Backend name
    fn name(&self) -> &'static str;

    /// Start a new session
    async fn create(&self, config: &SuiteConfig) -> ShopResult<SessionHandle>;
}

/// Everything a page object needs: the session plus the run configuration
#[derive(Clone)]
pub struct SessionContext {
    session: SessionHandle,
    config: Arc<SuiteConfig>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("backend", &self.session.backend())
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl SessionContext {
    /// Create a context
    #[must_use]
    pub fn new(session: SessionHandle, config: Arc<SuiteConfig>) -> Self {
        Self { session, config }
    }

    /// The browser session
    #[must_use]
    pub fn session(&self) -> &dyn BrowserSession {
        self.session.as_ref()
    }

    /// Shared session handle
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        Arc::clone(&self.session)
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Wait policy from the configuration
    #[must_use]
    pub fn wait(&self) -> WaitPolicy {
        self.config.wait_policy()
    }

    /// Whether any element matches `locator` right now
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn exists(&self, locator: &Locator) -> ShopResult<bool> {
        Ok(!self.session.find_all(locator.selector()).await?.is_empty())
    }

    /// Whether the first match of `locator` is visible right now
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn visible_now(&self, locator: &Locator) -> ShopResult<bool> {
        match self.session.find_all(locator.selector()).await?.first() {
            Some(el) => self.session.is_displayed(el).await,
            None => Ok(false),
        }
    }

    /// Wait until `locator` resolves to a visible element
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if it never becomes visible
    pub async fn wait_visible(&self, locator: &Locator) -> ShopResult<ElementHandle> {
        let what = format!("{locator} to be visible");
        self.wait()
            .until(&what, move || async move {
                if let Some(el) = self.session.find_all(locator.selector()).await?.into_iter().next() {
                    if self.session.is_displayed(&el).await? {
                        return Ok(Some(el));
                    }
                }
                Ok::<_, ShopError>(None)
            })
            .await
    }

    /// Wait until `locator` resolves to a visible, enabled element
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if it never becomes clickable
    pub async fn wait_clickable(&self, locator: &Locator) -> ShopResult<ElementHandle> {
        let what = format!("{locator} to be clickable");
        self.wait()
            .until(&what, move || async move {
                if let Some(el) = self.session.find_all(locator.selector()).await?.into_iter().next() {
                    if self.session.is_displayed(&el).await? && self.session.is_enabled(&el).await? {
                        return Ok(Some(el));
                    }
                }
                Ok::<_, ShopError>(None)
            })
            .await
    }

    /// Wait until `locator` is hidden or gone
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if it stays visible
    pub async fn wait_hidden(&self, locator: &Locator) -> ShopResult<()> {
        let what = format!("{locator} to be hidden");
        self.wait()
            .until_true(&what, move || async move {
                Ok::<_, ShopError>(!self.visible_now(locator).await?)
            })
            .await
    }

    /// Wait until at least one element matches `locator`
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if nothing ever matches
    pub async fn wait_present(&self, locator: &Locator) -> ShopResult<Vec<ElementHandle>> {
        let what = format!("{locator} to be present");
        self.wait()
            .until(&what, move || async move {
                let found = self.session.find_all(locator.selector()).await?;
                Ok::<_, ShopError>((!found.is_empty()).then_some(found))
            })
            .await
    }

    /// Wait until an alert is open and return its text
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if no alert opens
    pub async fn wait_alert(&self) -> ShopResult<String> {
        self.wait()
            .until("alert to be present", move || self.session.alert_text())
            .await
    }

    /// Wait for clickability, then click
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] or session failures
    pub async fn click(&self, locator: &Locator) -> ShopResult<()> {
        let el = self.wait_clickable(locator).await?;
        tracing::debug!(%locator, "click");
        self.session.click(&el).await
    }

    /// Wait for visibility, then clear and type
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] or session failures
    pub async fn type_into(&self, locator: &Locator, text: &str) -> ShopResult<()> {
        let el = self.wait_visible(locator).await?;
        tracing::debug!(%locator, "type");
        self.session.type_text(&el, text).await
    }

    /// Wait for visibility, then read text
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] or session failures
    pub async fn text_of(&self, locator: &Locator) -> ShopResult<String> {
        let el = self.wait_visible(locator).await?;
        self.session.text(&el).await
    }

    /// Text of every element matching `locator`, without waiting
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn texts_of_all(&self, locator: &Locator) -> ShopResult<Vec<String>> {
        let mut texts = Vec::new();
        for el in self.session.find_all(locator.selector()).await? {
            texts.push(self.session.text(&el).await?);
        }
        Ok(texts)
    }
}
