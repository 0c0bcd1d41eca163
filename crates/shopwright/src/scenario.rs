//! Scenarios and the runner that executes them.
//!
//! Each attempt of a scenario gets its own session from a [`SessionFactory`],
//! starts on the home page and always ends with `quit()`, whether the body
//! returned, failed or panicked. Failed attempts are retried up to
//! `retry_count` times; the last failure is reported with a screenshot.

use crate::config::SuiteConfig;
use crate::pages::HomePage;
use crate::reporter::{save_screenshot, Reporter, ScenarioEvent};
use crate::result::ShopResult;
use crate::session::{SessionContext, SessionFactory};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Impact of a scenario failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Severity {
    /// Blocks all use of the store
    Blocker,
    /// Breaks a core flow
    Critical,
    /// Regular defect
    #[default]
    Normal,
    /// Cosmetic or workaround available
    Minor,
    /// Barely noticeable
    Trivial,
}

impl Severity {
    /// Lowercase name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Report grouping of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    /// Top-level grouping
    pub epic: String,
    /// Feature under test
    pub feature: String,
    /// Impact of a failure
    pub severity: Severity,
}

impl ScenarioMeta {
    /// Create metadata
    #[must_use]
    pub fn new(epic: impl Into<String>, feature: impl Into<String>, severity: Severity) -> Self {
        Self {
            epic: epic.into(),
            feature: feature.into(),
            severity,
        }
    }
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self::new("Storefront", "General", Severity::Normal)
    }
}

/// A named, self-contained interaction with the store
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique name
    fn name(&self) -> &str;

    /// Report grouping
    fn meta(&self) -> ScenarioMeta;

    /// Run against a session that is already on the home page
    async fn run(&self, ctx: &SessionContext) -> ShopResult<()>;
}

/// Scenario body as a plain async function
pub type ScenarioFn = for<'a> fn(&'a SessionContext) -> BoxFuture<'a, ShopResult<()>>;

/// [`Scenario`] backed by a function pointer
pub struct FnScenario {
    name: String,
    meta: ScenarioMeta,
    body: ScenarioFn,
}

impl FnScenario {
    /// Create a scenario
    #[must_use]
    pub fn new(name: impl Into<String>, meta: ScenarioMeta, body: ScenarioFn) -> Self {
        Self {
            name: name.into(),
            meta,
            body,
        }
    }
}

impl std::fmt::Debug for FnScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnScenario")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Scenario for FnScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn meta(&self) -> ScenarioMeta {
        self.meta.clone()
    }

    async fn run(&self, ctx: &SessionContext) -> ShopResult<()> {
        (self.body)(ctx).await
    }
}

/// Whether `scenario` matches a case-insensitive name/feature filter
#[must_use]
pub fn matches_filter(scenario: &dyn Scenario, filter: Option<&str>) -> bool {
    let Some(filter) = filter.map(str::to_lowercase) else {
        return true;
    };
    scenario.name().to_lowercase().contains(&filter)
        || scenario.meta().feature.to_lowercase().contains(&filter)
}

/// Counts from one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Scenarios that were started
    pub executed: usize,
    /// Scenarios not run (filtered or after a stop)
    pub skipped: usize,
    /// Whether a failure stopped scheduling
    pub stopped_early: bool,
}

struct AttemptFailure {
    error: String,
    screenshot: Option<PathBuf>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Runs scenarios with bounded concurrency, one session per attempt
pub struct ScenarioRunner {
    config: Arc<SuiteConfig>,
    factory: Arc<dyn SessionFactory>,
    filter: Option<String>,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("backend", &self.factory.name())
            .field("threads", &self.config.thread_count)
            .field("retries", &self.config.retry_count)
            .field("filter", &self.filter)
            .finish()
    }
}

impl ScenarioRunner {
    /// Create a runner
    #[must_use]
    pub fn new(config: SuiteConfig, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
            filter: None,
        }
    }

    /// Only run scenarios whose name or feature contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run every scenario, feeding events into `reporter`
    pub async fn run(&self, scenarios: &[Arc<dyn Scenario>], reporter: &mut Reporter) -> RunSummary {
        self.run_with(scenarios, reporter, |_| {}).await
    }

    /// Like [`ScenarioRunner::run`], showing each event to `observer` before
    /// the reporter sees it
    pub async fn run_with(
        &self,
        scenarios: &[Arc<dyn Scenario>],
        reporter: &mut Reporter,
        mut observer: impl FnMut(&ScenarioEvent),
    ) -> RunSummary {
        reporter.start();
        let mut summary = RunSummary::default();

        let (selected, excluded): (Vec<_>, Vec<_>) = scenarios
            .iter()
            .partition(|s| matches_filter(s.as_ref(), self.filter.as_deref()));
        for scenario in excluded {
            summary.skipped += 1;
            let event = ScenarioEvent::Skipped {
                name: scenario.name().to_string(),
                meta: scenario.meta(),
                reason: "excluded by filter".to_string(),
            };
            observer(&event);
            let _ = reporter.handle(event);
        }

        let threads = self.config.thread_count.max(1);
        tracing::info!(
            selected = selected.len(),
            threads,
            backend = self.factory.name(),
            "suite started"
        );

        let stop = AtomicBool::new(false);
        let mut results = stream::iter(selected)
            .map(|scenario| self.run_one(scenario.as_ref(), &stop))
            .buffer_unordered(threads);

        while let Some(events) = results.next().await {
            for event in events {
                match &event {
                    ScenarioEvent::Started { .. } => summary.executed += 1,
                    ScenarioEvent::Skipped { .. } => summary.skipped += 1,
                    _ => {}
                }
                observer(&event);
                if reporter.handle(event).is_err() && !stop.swap(true, Ordering::SeqCst) {
                    tracing::warn!("stopping after first failure");
                    summary.stopped_early = true;
                }
            }
        }

        tracing::info!(summary = %reporter.summary(), "suite finished");
        summary
    }

    /// Run one scenario with retries and return its events
    #[tracing::instrument(skip_all, fields(scenario = scenario.name()))]
    pub async fn run_one(&self, scenario: &dyn Scenario, stop: &AtomicBool) -> Vec<ScenarioEvent> {
        let name = scenario.name().to_string();
        let meta = scenario.meta();
        if stop.load(Ordering::SeqCst) {
            return vec![ScenarioEvent::Skipped {
                name,
                meta,
                reason: "stopped after earlier failure".to_string(),
            }];
        }

        let mut events = vec![ScenarioEvent::Started {
            name: name.clone(),
            meta,
        }];
        let start = Instant::now();
        let max_attempts = self.config.retry_count.saturating_add(1);
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            match self.attempt(scenario).await {
                Ok(()) => {
                    events.push(ScenarioEvent::Passed {
                        name,
                        duration: start.elapsed(),
                        attempts: attempt,
                    });
                    return events;
                }
                Err(failure) => {
                    if attempt < max_attempts {
                        tracing::warn!(attempt, error = %failure.error, "attempt failed, retrying");
                    }
                    last_failure = Some((attempt, failure));
                }
            }
        }

        let (attempts, failure) = last_failure.unwrap_or_else(|| {
            (
                0,
                AttemptFailure {
                    error: "no attempt made".to_string(),
                    screenshot: None,
                },
            )
        });
        events.push(ScenarioEvent::Failed {
            name,
            duration: start.elapsed(),
            attempts,
            error: failure.error,
            screenshot: failure.screenshot,
        });
        events
    }

    async fn attempt(&self, scenario: &dyn Scenario) -> Result<(), AttemptFailure> {
        let session = self
            .factory
            .create(&self.config)
            .await
            .map_err(|e| AttemptFailure {
                error: e.to_string(),
                screenshot: None,
            })?;
        let ctx = SessionContext::new(Arc::clone(&session), Arc::clone(&self.config));

        let body = async {
            HomePage::open(ctx.clone()).await?;
            scenario.run(&ctx).await
        };
        let outcome = match AssertUnwindSafe(body).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(format!("scenario panicked: {}", panic_message(payload.as_ref()))),
        };

        let screenshot = match &outcome {
            Err(_) if self.config.screenshot_on_failure => self.capture(&ctx, scenario).await,
            _ => None,
        };

        if let Err(e) = session.quit().await {
            tracing::warn!(error = %e, "session quit failed");
        }

        outcome.map_err(|error| AttemptFailure { error, screenshot })
    }

    async fn capture(&self, ctx: &SessionContext, scenario: &dyn Scenario) -> Option<PathBuf> {
        let shot = match ctx.session().screenshot().await {
            Ok(shot) if shot.is_valid() => shot,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failure screenshot not taken");
                return None;
            }
        };
        match save_screenshot(&self.config.screenshot_dir, &scenario.meta(), scenario.name(), &shot) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "failure screenshot not saved");
                None
            }
        }
    }
}
