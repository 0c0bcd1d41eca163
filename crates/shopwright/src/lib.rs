//! Shopwright: page objects and checkout flows for the Demoblaze storefront
//!
//! Browser tests are built in layers:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  suite / scenario      built-in scenarios, runner, retries   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  workflow / state      CheckoutFlow state machine, plans     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  pages                 Home, Login, Product, Cart, Profile   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  session / wait        BrowserSession (Chromium, simulated)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every scenario owns one session; page objects receive it explicitly
//! through a [`SessionContext`]. Results flow into a [`Reporter`] that writes
//! HTML, JUnit and JSON reports.

#![warn(missing_docs)]

pub mod config;
pub mod data;
pub mod locator;
pub mod model;
pub mod pages;
pub mod reporter;
pub mod result;
pub mod scenario;
pub mod session;
pub mod state;
pub mod suite;
pub mod wait;
pub mod workflow;

pub use config::{BrowserKind, SuiteConfig};
pub use locator::{Locator, Selector};
pub use model::{
    Category, CartLine, OrderConfirmation, Product, ProfileField, PurchaseForm, SessionProfile,
};
pub use pages::{
    CartPage, HomePage, LoginOutcome, LoginPage, OrderModal, PageObject, ProductPage,
    ProfileStore,
};
pub use reporter::{
    FailureMode, ReportFormat, Reporter, ScenarioEvent, ScenarioRecord, ScenarioStatus,
};
pub use result::{ShopError, ShopResult};
pub use scenario::{FnScenario, RunSummary, Scenario, ScenarioMeta, ScenarioRunner, Severity};
#[cfg(feature = "browser")]
pub use session::chromium::{ChromiumFactory, ChromiumSession};
pub use session::{
    BrowserSession, SessionContext, SessionFactory, SessionHandle, SimulatedFactory,
    SimulatedStorefront, StorefrontFaults,
};
pub use state::{Action, CheckoutFlow, PageState, TransitionRecord};
pub use wait::WaitPolicy;
pub use workflow::{CheckoutReport, CheckoutWorkflow, PlanLine, PurchasePlan};

/// Prelude for writing scenarios
pub mod prelude {
    pub use super::data;
    pub use super::{
        BrowserSession, CartPage, Category, CheckoutFlow, CheckoutWorkflow, HomePage,
        LoginOutcome, PageObject, PageState, PurchaseForm, PurchasePlan, Reporter, Scenario,
        ScenarioMeta, ScenarioRunner, SessionContext, SessionFactory, Severity, ShopError,
        ShopResult, SimulatedFactory, SuiteConfig,
    };
}
