//! Chromium backend over the Chrome `DevTools` Protocol.
//!
//! Element operations run as JavaScript against the selector's match list, so
//! every call resolves the element afresh. Native dialogs are replaced by a
//! shim installed on every new document that queues their messages in
//! `window.__shopwright_alerts`; the alert methods read and drain that queue.

#![allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]

use super::{BrowserSession, ElementHandle, Screenshot, SessionFactory, SessionHandle};
use crate::config::SuiteConfig;
use crate::locator::Selector;
use crate::result::{ShopError, ShopResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const ALERT_SHIM: &str = r"(() => {
  if (window.__shopwright_alerts) { return; }
  window.__shopwright_alerts = [];
  const remember = (message) => { window.__shopwright_alerts.push(String(message)); };
  window.alert = (message) => { remember(message); };
  window.confirm = (message) => { remember(message); return true; };
})();";

/// Browser session backed by a real Chromium instance
#[derive(Debug)]
pub struct ChromiumSession {
    browser: Mutex<Option<CdpBrowser>>,
    page: Arc<Mutex<CdpPage>>,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumSession {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::UnsupportedBrowser`] for any browser other than
    /// Chrome/Chromium and [`ShopError::BrowserLaunch`] if the process cannot start
    pub async fn launch(config: &SuiteConfig) -> ShopResult<Self> {
        let kind = config.browser_kind()?;
        if !kind.is_drivable() {
            return Err(ShopError::UnsupportedBrowser {
                name: config.browser.clone(),
            });
        }

        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(Duration::from_secs(config.page_load_timeout_seconds))
            .no_sandbox();

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ShopError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ShopError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ShopError::session(e.to_string()))?;
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(ALERT_SHIM))
            .await
            .map_err(|e| ShopError::script(e.to_string()))?;
        page.evaluate(ALERT_SHIM)
            .await
            .map_err(|e| ShopError::script(e.to_string()))?;

        tracing::info!(headless = config.headless, "chromium launched");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page: Arc::new(Mutex::new(page)),
            handle,
        })
    }

    async fn eval(&self, script: &str) -> ShopResult<serde_json::Value> {
        let page = self.page.lock().await;
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| ShopError::script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn eval_on(&self, element: &ElementHandle, body: &str) -> ShopResult<serde_json::Value> {
        self.eval(&format!(
            "(() => {{ const el = {}; if (!el) {{ return null; }} {body} }})()",
            element.to_query()
        ))
        .await
    }

    async fn eval_required(&self, element: &ElementHandle, body: &str) -> ShopResult<serde_json::Value> {
        let value = self.eval_on(element, body).await?;
        if value.is_null() {
            return Err(ShopError::ElementNotFound {
                locator: element.to_string(),
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    fn backend(&self) -> &'static str {
        "chromium"
    }

    async fn open(&self, url: &str) -> ShopResult<()> {
        let page = self.page.lock().await;
        page.goto(url).await.map_err(|e| ShopError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(url, "navigated");
        Ok(())
    }

    async fn back(&self) -> ShopResult<()> {
        self.eval("history.back()").await?;
        Ok(())
    }

    async fn refresh(&self) -> ShopResult<()> {
        let page = self.page.lock().await;
        page.reload().await.map_err(|e| ShopError::Navigation {
            url: "<reload>".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn current_url(&self) -> ShopResult<String> {
        let page = self.page.lock().await;
        let url = page
            .url()
            .await
            .map_err(|e| ShopError::session(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn find_all(&self, selector: &Selector) -> ShopResult<Vec<ElementHandle>> {
        let count = self
            .eval(&selector.to_count_query())
            .await?
            .as_u64()
            .unwrap_or(0);
        Ok((0..count as usize)
            .map(|i| ElementHandle::new(selector.clone(), i))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> ShopResult<()> {
        self.eval_required(
            element,
            "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ShopResult<()> {
        let body = format!(
            "el.focus(); el.value = {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;",
            crate::locator::js_string(text)
        );
        self.eval_required(element, &body).await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> ShopResult<String> {
        let value = self
            .eval_required(element, "return el.innerText ?? el.textContent ?? '';")
            .await?;
        Ok(value.as_str().unwrap_or_default().trim().to_string())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ShopResult<bool> {
        let value = self
            .eval_on(
                element,
                "const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
                 return s.display !== 'none' && s.visibility !== 'hidden' \
                 && s.opacity !== '0' && r.width > 0 && r.height > 0;",
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> ShopResult<bool> {
        let value = self.eval_on(element, "return !el.disabled;").await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn execute_script(&self, script: &str) -> ShopResult<serde_json::Value> {
        self.eval(script).await
    }

    async fn screenshot(&self) -> ShopResult<Screenshot> {
        let page = self.page.lock().await;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = page
            .execute(params)
            .await
            .map_err(|e| ShopError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ShopError::Screenshot {
                message: e.to_string(),
            })?;
        Ok(Screenshot::new(data))
    }

    async fn alert_text(&self) -> ShopResult<Option<String>> {
        let value = self
            .eval("(window.__shopwright_alerts || [])[0] ?? null")
            .await?;
        Ok(value.as_str().map(ToString::to_string))
    }

    async fn accept_alert(&self) -> ShopResult<()> {
        let drained = self
            .eval("(window.__shopwright_alerts || []).shift() !== undefined")
            .await?;
        if drained.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(ShopError::session("no alert open"))
        }
    }

    async fn dismiss_alert(&self) -> ShopResult<()> {
        self.accept_alert().await
    }

    async fn quit(&self) -> ShopResult<()> {
        let mut slot = self.browser.lock().await;
        let closed = match slot.take() {
            Some(mut browser) => match browser.close().await {
                Ok(_) => {
                    let _ = browser.wait().await;
                    Ok(())
                }
                Err(e) => Err(ShopError::session(e.to_string())),
            },
            None => Ok(()),
        };
        stop_handler(closed, &self.handle)?;
        tracing::info!("chromium closed");
        Ok(())
    }
}

/// Stop the CDP handler task whatever the outcome of closing the browser
fn stop_handler(closed: ShopResult<()>, handler: &tokio::task::JoinHandle<()>) -> ShopResult<()> {
    handler.abort();
    if let Err(ref e) = closed {
        tracing::warn!(error = %e, "chromium did not close cleanly");
    }
    closed
}

/// Factory launching one Chromium per scenario attempt
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumFactory;

#[async_trait]
impl SessionFactory for ChromiumFactory {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn create(&self, config: &SuiteConfig) -> ShopResult<SessionHandle> {
        Ok(Arc::new(ChromiumSession::launch(config).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_firefox_is_rejected_before_launch() {
        let config = SuiteConfig::default().with_browser("firefox");
        let err = ChromiumSession::launch(&config).await.unwrap_err();
        assert!(matches!(err, ShopError::UnsupportedBrowser { ref name } if name == "firefox"));
    }

    #[tokio::test]
    async fn test_edge_is_rejected_before_launch() {
        let config = SuiteConfig::default().with_browser("edge");
        let err = ChromiumSession::launch(&config).await.unwrap_err();
        assert!(matches!(err, ShopError::UnsupportedBrowser { ref name } if name == "edge"));
    }

    #[tokio::test]
    async fn test_handler_stops_when_close_fails() {
        let handler = tokio::spawn(std::future::pending::<()>());
        let result = stop_handler(Err(ShopError::session("close failed")), &handler);
        assert!(matches!(result, Err(ShopError::Session { .. })));
        assert!(handler.await.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_alert_shim_is_idempotent() {
        assert!(ALERT_SHIM.contains("if (window.__shopwright_alerts) { return; }"));
    }
}
