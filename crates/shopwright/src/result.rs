//! Result and error types for Shopwright.

use thiserror::Error;

/// Result type for Shopwright operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ShopError {
    /// Category outside the storefront catalog
    #[error("Category not supported: {name}")]
    UnsupportedCategory {
        /// Category name as requested
        name: String,
    },

    /// No product link contains the requested name
    #[error("Product not found: {name}")]
    ProductNotFound {
        /// Product name as requested
        name: String,
    },

    /// Order modal never appeared (cart might be empty)
    #[error("Order modal did not appear - cart might be empty")]
    ModalNotShown,

    /// Add-to-cart acknowledgement did not contain the expected text
    #[error("Unexpected acknowledgement: {text}")]
    UnexpectedAcknowledgement {
        /// Acknowledgement text actually shown
        text: String,
    },

    /// Wait exceeded its timeout
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    TimedOut {
        /// What was being waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Purchase submitted but no confirmation text observed
    #[error("Purchase confirmation did not appear")]
    ConfirmationMissing,

    /// Action not allowed from the current page state
    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition {
        /// State the flow was in
        from: String,
        /// Attempted action
        action: String,
    },

    /// Element lookup failed
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// Browser could not be started
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Browser kind not supported by the available backends
    #[error("Browser not supported: {name}")]
    UnsupportedBrowser {
        /// Requested browser kind
        name: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation failed
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot capture failed
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Generic session failure
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ShopError {
    /// Create a timeout error
    #[must_use]
    pub fn timed_out(waited_for: impl Into<String>, ms: u64) -> Self {
        Self::TimedOut {
            waited_for: waited_for.into(),
            ms,
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Check if this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Check if this is one of the storefront flow failures a scenario may
    /// legitimately expect (as opposed to infrastructure failures).
    #[must_use]
    pub const fn is_expected_flow_failure(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCategory { .. }
                | Self::ProductNotFound { .. }
                | Self::ModalNotShown
                | Self::UnexpectedAcknowledgement { .. }
                | Self::TimedOut { .. }
                | Self::ConfirmationMissing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_not_shown_mentions_empty_cart() {
        let err = ShopError::ModalNotShown;
        assert!(err.to_string().contains("cart might be empty"));
    }

    #[test]
    fn test_timeout_helpers() {
        let err = ShopError::timed_out("order modal", 10_000);
        assert!(err.is_timeout());
        assert!(err.to_string().contains("10000ms"));
        assert!(err.to_string().contains("order modal"));
    }

    #[test]
    fn test_expected_flow_failures() {
        assert!(ShopError::ModalNotShown.is_expected_flow_failure());
        assert!(ShopError::ConfirmationMissing.is_expected_flow_failure());
        assert!(ShopError::ProductNotFound {
            name: "x".to_string()
        }
        .is_expected_flow_failure());
        assert!(!ShopError::session("gone").is_expected_flow_failure());
        assert!(!ShopError::config("bad").is_expected_flow_failure());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ShopError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
