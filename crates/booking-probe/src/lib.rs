//! Booking Probe: end-to-end browser scenarios for the Shady Meadows B&B
//! booking site.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────┐   ┌─────────────┐
//! │ Scenario  │──►│ Page objects │──►│ Session  │──►│ PageDriver  │
//! │ catalog   │   │ + calendar   │   │ auto-wait│   │ cdp | sim   │
//! └───────────┘   └──────────────┘   └──────────┘   └─────────────┘
//!       │
//!       ▼
//! ┌───────────┐   ┌──────────────────────────────┐
//! │ Runner    │──►│ Listeners: log, HTML + JUnit │
//! └───────────┘   └──────────────────────────────┘
//! ```
//!
//! Scenarios drive the site only through [`HomePage`], [`ReservationPage`]
//! and [`CalendarNavigator`]. Each scenario gets its own [`Session`]: a real
//! Chromium over CDP (`browser` feature) or the in-process
//! [`sim::SimulatedSite`].

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Artifact naming and writing
pub mod artifacts;
mod assertion;
/// Calendar widget navigation
pub mod calendar;
/// The scenario catalog
pub mod catalog;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod cdp;
mod config;
/// Site constants and test data
pub mod constants;
/// Date helpers
pub mod dates;
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod locator;
mod page_object;
/// Page objects for the booking site
pub mod pages;
#[allow(clippy::format_push_string, clippy::cast_precision_loss)]
mod reporter;
mod result;
/// Scenario execution and listeners
pub mod runner;
mod scenario;
mod session;
/// In-process model of the booking site
pub mod sim;
mod wait;

pub use assertion::{AlertSet, Assertion, AssertionResult};
pub use calendar::{CalendarNavigator, DayCell, Direction};
pub use catalog::catalog;
#[cfg(feature = "browser")]
pub use cdp::{CdpDriver, ChromiumSessions};
pub use config::{
    BrowserSettings, CalendarSettings, OutputSettings, SuiteConfig, Timeouts, BASE_URL_ENV,
    DEFAULT_CONFIG_FILE,
};
pub use constants::{GuestDetails, RoomType};
pub use driver::{ElementSnapshot, PageDriver, Screenshot};
pub use locator::{Locator, LocatorOptions, Matchable, Position, Selector, TextFilter};
pub use page_object::{query_params, url_path, PageObject, UrlMatcher};
pub use pages::{HomePage, ReservationPage};
pub use reporter::{render_html, render_junit, HtmlReportListener, FRAMEWORK};
pub use result::{ProbeError, ProbeResult};
pub use runner::{
    LoggingListener, ScenarioListener, ScenarioOutcome, ScenarioRunner, ScenarioStatus,
    SessionFactory, SimulatedSessions, SuiteInfo, SuiteReport,
};
pub use scenario::{Group, Scenario, ScenarioFn, Selection};
pub use session::Session;
pub use wait::{poll_until, ElementState, LoadState, WaitOptions};

/// Everything a scenario author needs
pub mod prelude {
    pub use super::assertion::*;
    #[cfg(feature = "browser")]
    pub use super::cdp::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::locator::Locator;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::runner::*;
    pub use super::scenario::*;
    pub use super::session::*;
    pub use super::wait::{poll_until, ElementState, LoadState, WaitOptions};
    pub use super::{catalog, CalendarNavigator, GuestDetails, HtmlReportListener, RoomType};
}
