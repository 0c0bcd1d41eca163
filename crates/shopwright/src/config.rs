//! Suite configuration.
//!
//! Built once at startup and passed by reference to every collaborator that
//! needs it. Loaded from a flat YAML map or from dotted `key=value`
//! properties; anything missing falls back to the documented defaults.

use crate::result::{ShopError, ShopResult};
use crate::wait::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default storefront URL
pub const DEFAULT_BASE_URL: &str = "https://www.demoblaze.com/";

/// Default browser kind
pub const DEFAULT_BROWSER: &str = "chrome";

/// Default wait timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Default polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Browser kind requested by the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowserKind {
    /// Google Chrome / Chromium
    Chrome,
    /// Microsoft Edge
    Edge,
    /// Mozilla Firefox
    Firefox,
}

impl BrowserKind {
    /// Parse a browser name
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnsupportedBrowser`] for unknown names
    pub fn parse(name: &str) -> ShopResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "edge" => Ok(Self::Edge),
            "firefox" => Ok(Self::Firefox),
            _ => Err(ShopError::UnsupportedBrowser {
                name: name.to_string(),
            }),
        }
    }

    /// Whether a session backend can drive this browser. Only Chrome is
    /// launched; Edge and Firefox are recognised but rejected at launch.
    #[must_use]
    pub const fn is_drivable(&self) -> bool {
        matches!(self, Self::Chrome)
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Storefront root URL
    pub base_url: String,
    /// Browser kind (`chrome`, `edge`, `firefox`)
    pub browser: String,
    /// Run without a visible window
    pub headless: bool,
    /// Wait timeout in seconds
    pub timeout_seconds: u64,
    /// Wait polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Extra attempts for a failing scenario
    pub retry_count: u32,
    /// Navigation timeout in seconds
    pub page_load_timeout_seconds: u64,
    /// Where failure screenshots go
    pub screenshot_dir: PathBuf,
    /// Where run reports go
    pub report_dir: PathBuf,
    /// Capture a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
    /// Keep running after a failed scenario
    pub continue_on_failure: bool,
    /// Scenarios run concurrently, one session each
    pub thread_count: usize,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Chromium executable override
    pub executable_path: Option<String>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: DEFAULT_BROWSER.to_string(),
            headless: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            retry_count: 0,
            page_load_timeout_seconds: 30,
            screenshot_dir: PathBuf::from("reports/screenshots"),
            report_dir: PathBuf::from("reports"),
            screenshot_on_failure: true,
            continue_on_failure: true,
            thread_count: 1,
            viewport_width: 1920,
            viewport_height: 1080,
            executable_path: None,
        }
    }
}

impl SuiteConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat YAML map
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or the result fails validation
    pub fn from_yaml_str(yaml: &str) -> ShopResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> ShopResult<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Self::from_yaml_str(&text)
    }

    /// Build from dotted properties (`base.url`, `retry.count`, ...).
    ///
    /// Unknown keys are ignored; unparsable values fall back to the default
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the result fails validation
    pub fn from_properties(props: &BTreeMap<String, String>) -> ShopResult<Self> {
        let defaults = Self::default();
        let get = |key: &str| props.get(key).map(|v| v.trim().to_string());

        let config = Self {
            base_url: get("base.url").unwrap_or(defaults.base_url),
            browser: get("browser").unwrap_or(defaults.browser),
            headless: parse_or(props, "headless", defaults.headless),
            timeout_seconds: parse_or(props, "timeout", defaults.timeout_seconds),
            poll_interval_ms: parse_or(props, "poll.interval", defaults.poll_interval_ms),
            retry_count: parse_or(props, "retry.count", defaults.retry_count),
            page_load_timeout_seconds: parse_or(
                props,
                "page.load.timeout",
                defaults.page_load_timeout_seconds,
            ),
            screenshot_dir: get("screenshot.path").map_or(defaults.screenshot_dir, PathBuf::from),
            report_dir: get("reports.path").map_or(defaults.report_dir, PathBuf::from),
            screenshot_on_failure: parse_or(
                props,
                "screenshot.on.failure",
                defaults.screenshot_on_failure,
            ),
            continue_on_failure: parse_or(
                props,
                "continue.on.failure",
                defaults.continue_on_failure,
            ),
            thread_count: parse_or(props, "thread.count", defaults.thread_count),
            viewport_width: defaults.viewport_width,
            viewport_height: defaults.viewport_height,
            executable_path: get("browser.path"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run can work with
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Config`] describing the first problem found
    pub fn validate(&self) -> ShopResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ShopError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(ShopError::config("timeout_seconds must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ShopError::config("poll_interval_ms must be at least 1"));
        }
        if self.thread_count == 0 {
            return Err(ShopError::config("thread_count must be at least 1"));
        }
        BrowserKind::parse(&self.browser)?;
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set browser kind
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set wait timeout in seconds
    #[must_use]
    pub const fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set poll interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set retry count
    #[must_use]
    pub const fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count = retries;
        self
    }

    /// Set concurrent scenario count
    #[must_use]
    pub const fn with_thread_count(mut self, threads: usize) -> Self {
        self.thread_count = threads;
        self
    }

    /// Set report directory
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Set whether to keep going after a failure
    #[must_use]
    pub const fn with_continue_on_failure(mut self, keep_going: bool) -> Self {
        self.continue_on_failure = keep_going;
        self
    }

    /// Parsed browser kind
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnsupportedBrowser`] for unknown names
    pub fn browser_kind(&self) -> ShopResult<BrowserKind> {
        BrowserKind::parse(&self.browser)
    }

    /// Wait timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Wait policy derived from the timeout and poll interval
    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.timeout_seconds),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    /// Resolve a page path against the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Cart page URL
    #[must_use]
    pub fn cart_url(&self) -> String {
        self.url_for(crate::data::paths::CART)
    }

    /// Home page URL
    #[must_use]
    pub fn index_url(&self) -> String {
        self.url_for(crate::data::paths::INDEX)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ShopResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

fn parse_or<T>(props: &BTreeMap<String, String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Debug,
{
    match props.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, ?default, "could not parse property, using default");
            default
        }),
    }
}
