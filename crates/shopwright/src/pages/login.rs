//! Login modal.

use super::locators::{home, login};
use super::PageObject;
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use crate::session::SessionContext;

/// How the site answered a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Welcome label appeared
    Accepted,
    /// The site raised an alert with this text
    Rejected(String),
}

impl LoginOutcome {
    /// Whether the login went through
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Alert text of a rejected login
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Accepted => None,
            Self::Rejected(text) => Some(text),
        }
    }
}

/// Login modal opened from the navigation bar
#[derive(Debug, Clone)]
pub struct LoginPage {
    ctx: SessionContext,
}

impl PageObject for LoginPage {
    fn page_name(&self) -> &'static str {
        "login"
    }

    fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn ready_marker(&self) -> Locator {
        login::username()
    }
}

impl LoginPage {
    /// Bind to a session whose login modal is (about to be) open
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Fill the credentials, submit, and wait for the site's answer.
    ///
    /// A rejection alert is accepted before returning, leaving the modal open.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if neither an alert nor the welcome
    /// label shows up
    pub async fn login(&self, username: &str, password: &str) -> ShopResult<LoginOutcome> {
        self.ctx.type_into(&login::username(), username).await?;
        self.ctx.type_into(&login::password(), password).await?;
        self.ctx.click(&login::submit()).await?;

        let ctx = &self.ctx;
        let welcome = &home::welcome_user();
        let outcome = ctx
            .wait()
            .until("login answer", move || async move {
                if let Some(text) = ctx.session().alert_text().await? {
                    return Ok(Some(LoginOutcome::Rejected(text)));
                }
                let accepted = ctx.visible_now(welcome).await?;
                Ok::<_, ShopError>(accepted.then_some(LoginOutcome::Accepted))
            })
            .await?;

        match &outcome {
            LoginOutcome::Accepted => tracing::info!(username, "logged in"),
            LoginOutcome::Rejected(text) => {
                self.ctx.session().accept_alert().await?;
                tracing::info!(username, alert = %text, "login rejected");
            }
        }
        Ok(outcome)
    }

    /// Whether the modal is showing
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn is_open(&self) -> ShopResult<bool> {
        self.is_loaded().await
    }

    /// Close the modal without logging in
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] if the modal stays open
    pub async fn close(&self) -> ShopResult<()> {
        self.ctx.click(&login::close()).await?;
        self.ctx.wait_hidden(&login::username()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::data::{credentials, messages};
    use crate::pages::HomePage;
    use crate::session::{SessionHandle, SimulatedStorefront};
    use std::sync::Arc;

    async fn login_page() -> (HomePage, LoginPage) {
        let config = SuiteConfig::default()
            .with_base_url("https://demo.test/")
            .with_timeout_seconds(1)
            .with_poll_interval_ms(5);
        let session: SessionHandle = Arc::new(SimulatedStorefront::new(&config));
        let home = HomePage::open(SessionContext::new(session, Arc::new(config)))
            .await
            .unwrap();
        let login = home.open_login().await.unwrap();
        (home, login)
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let (home, login) = login_page().await;
        let outcome = login
            .login(credentials::VALID_USERNAME, credentials::VALID_PASSWORD)
            .await
            .unwrap();
        assert!(outcome.is_accepted());
        assert!(home.is_user_logged_in().await.unwrap());
        assert_eq!(home.welcome_text().await.unwrap(), "Welcome admin");
        assert!(!login.is_open().await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (home, login) = login_page().await;
        let outcome = login
            .login(credentials::INVALID_USERNAME, credentials::INVALID_PASSWORD)
            .await
            .unwrap();
        assert_eq!(outcome.rejection(), Some(messages::USER_DOES_NOT_EXIST));
        assert!(login.is_open().await.unwrap());
        assert!(!home.is_user_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_password_then_close() {
        let (_, login) = login_page().await;
        let outcome = login
            .login(credentials::VALID_USERNAME, credentials::INVALID_PASSWORD)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected(messages::WRONG_PASSWORD.to_string()));
        login.close().await.unwrap();
        assert!(!login.is_open().await.unwrap());
    }
}
