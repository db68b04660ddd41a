//! Session - one scenario's exclusive handle on a page.
//!
//! A `Session` wraps a [`PageDriver`] and adds the behaviour every page
//! object relies on: actions auto-wait for a visible target, strict
//! locators reject ambiguous matches, and reads wait for the element to be
//! attached before returning its text.

use crate::config::SuiteConfig;
use crate::driver::{ElementSnapshot, PageDriver, Screenshot};
use crate::locator::{Locator, DEFAULT_TIMEOUT_MS};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, ElementState, LoadState, WaitOptions};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-scenario page handle
pub struct Session {
    driver: Box<dyn PageDriver>,
    config: Arc<SuiteConfig>,
    scenario: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("scenario", &self.scenario)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a driver for the named scenario
    #[must_use]
    pub fn new(
        driver: Box<dyn PageDriver>,
        config: Arc<SuiteConfig>,
        scenario: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            config,
            scenario: scenario.into(),
        }
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Scenario this session belongs to
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Wait options for `locator`: its own timeout when customised, else the
    /// configured element timeout
    fn wait_options(&self, locator: &Locator, timeout: Option<Duration>) -> WaitOptions {
        let base = self.config.timeouts.element_wait();
        let custom = locator.options().timeout;
        match timeout {
            Some(t) => base.with_timeout(t.as_millis() as u64),
            None if custom != Duration::from_millis(DEFAULT_TIMEOUT_MS) => {
                base.with_timeout(custom.as_millis() as u64)
            }
            None => base,
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate and wait for `until`, bounded by the navigation timeout
    pub async fn goto(&self, url: &str, until: LoadState) -> ProbeResult<()> {
        let limit = self.config.timeouts.navigation_wait().timeout();
        tracing::debug!(scenario = %self.scenario, url, %until, "navigate");
        match tokio::time::timeout(limit, self.driver.navigate(url, until)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::NavigationError {
                url: url.to_string(),
                message: format!("no {until} within {}ms", limit.as_millis()),
            }),
        }
    }

    /// Current page URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    // ------------------------------------------------------------------
    // Waiting
    // ------------------------------------------------------------------

    /// Wait until `locator` reaches `state`; returns the matches at that moment
    pub async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Option<Duration>,
    ) -> ProbeResult<Vec<ElementSnapshot>> {
        let options = self.wait_options(locator, timeout);
        let what = format!("{locator} to be {state}");
        let driver = self.driver.as_ref();
        let result = poll_until(what, options, move || async move {
            let found = driver.query(locator).await?;
            let visible = found.iter().filter(|e| e.visible).count();
            Ok(state.is_satisfied(found.len(), visible).then_some(found))
        })
        .await;

        match result {
            Err(ProbeError::Timeout { ms, .. })
                if matches!(state, ElementState::Visible | ElementState::Attached) =>
            {
                Err(ProbeError::ElementNotFound {
                    selector: locator.to_string(),
                    ms,
                })
            }
            other => other,
        }
    }

    /// Wait until the first match's text differs from `previous`; returns
    /// the new text
    pub async fn wait_for_text_change(
        &self,
        locator: &Locator,
        previous: &str,
        timeout: Option<Duration>,
    ) -> ProbeResult<String> {
        let options = self.wait_options(locator, timeout);
        let what = format!("{locator} to change from '{previous}'");
        let driver = self.driver.as_ref();
        poll_until(what, options, move || async move {
            let found = driver.query(locator).await?;
            Ok(found
                .first()
                .map(|e| e.inner_text.trim().to_string())
                .filter(|text| text != previous.trim()))
        })
        .await
    }

    /// Wait for a visible target and enforce strictness
    async fn actionable(&self, locator: &Locator) -> ProbeResult<ElementSnapshot> {
        let mut found = self.wait_for(locator, ElementState::Visible, None).await?;
        Self::single(locator, &mut found)
    }

    /// Wait for an attached target and enforce strictness
    async fn readable(&self, locator: &Locator) -> ProbeResult<ElementSnapshot> {
        let mut found = self.wait_for(locator, ElementState::Attached, None).await?;
        Self::single(locator, &mut found)
    }

    fn single(
        locator: &Locator,
        found: &mut Vec<ElementSnapshot>,
    ) -> ProbeResult<ElementSnapshot> {
        if locator.options().strict && found.len() > 1 {
            return Err(ProbeError::StrictModeViolation {
                selector: locator.to_string(),
                count: found.len(),
            });
        }
        if found.is_empty() {
            return Err(ProbeError::ElementNotFound {
                selector: locator.to_string(),
                ms: 0,
            });
        }
        Ok(found.swap_remove(0))
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Click the element once it is visible
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let _ = self.actionable(locator).await?;
        tracing::debug!(scenario = %self.scenario, target = %locator, "click");
        self.driver.click(locator).await
    }

    /// Replace the element's value once it is visible
    pub async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let _ = self.actionable(locator).await?;
        tracing::debug!(scenario = %self.scenario, target = %locator, value, "fill");
        self.driver.fill(locator, value).await
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Rendered text of the single matching element
    pub async fn inner_text(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.readable(locator).await?.inner_text)
    }

    /// Raw text content of the single matching element
    pub async fn text_content(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.readable(locator).await?.text_content)
    }

    /// Value of the single matching form control
    pub async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.readable(locator).await?;
        element.value.ok_or_else(|| ProbeError::page(format!("{locator} is not a form control")))
    }

    /// Attribute of the single matching element
    pub async fn attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        let element = self.readable(locator).await?;
        Ok(element.attribute(name).map(str::to_string))
    }

    /// Rendered text of every current match, without waiting
    pub async fn all_inner_texts(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        Ok(self
            .driver
            .query(locator)
            .await?
            .into_iter()
            .map(|e| e.inner_text)
            .collect())
    }

    /// Snapshots of every current match, without waiting
    pub async fn all(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        self.driver.query(locator).await
    }

    /// Number of current matches
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(self.driver.query(locator).await?.len())
    }

    /// Whether any current match is visible
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.driver.query(locator).await?.iter().any(|e| e.visible))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Full-page screenshot
    pub async fn screenshot(&self) -> ProbeResult<Screenshot> {
        self.driver.screenshot().await
    }

    /// Release the driver
    pub async fn close(&self) -> ProbeResult<()> {
        self.driver.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedSite;

    fn fast_config() -> Arc<SuiteConfig> {
        let mut config = SuiteConfig::default().with_base_url("https://sim.test/");
        config.timeouts.element_ms = 100;
        config.timeouts.poll_ms = 5;
        Arc::new(config)
    }

    fn session() -> Session {
        Session::new(Box::new(SimulatedSite::new()), fast_config(), "session_tests")
    }

    mod wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_element_is_element_not_found() {
            let session = session();
            session.goto("https://sim.test/", LoadState::DomContentLoaded).await.unwrap();
            let err = session.click(&Locator::new("button#nope")).await.unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { ms: 100, .. }));
        }

        #[tokio::test]
        async fn test_detached_wait_times_out_as_timeout() {
            let session = session();
            session.goto("https://sim.test/", LoadState::DomContentLoaded).await.unwrap();
            let err = session
                .wait_for(&Locator::new("a.navbar-brand"), ElementState::Detached, None)
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_explicit_timeout_overrides_config() {
            let session = session();
            session.goto("https://sim.test/", LoadState::DomContentLoaded).await.unwrap();
            let err = session
                .wait_for(
                    &Locator::new("div.room-card"),
                    ElementState::Visible,
                    Some(Duration::from_millis(20)),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { ms: 20, .. }));
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_strict_mode_rejects_multiple_matches() {
            let session = session();
            session.goto("https://sim.test/", LoadState::DomContentLoaded).await.unwrap();
            let inputs = Locator::new("div.col-md-6 input");
            let err = session.fill(&inputs, "x").await.unwrap_err();
            assert!(matches!(err, ProbeError::StrictModeViolation { count: 2, .. }));
        }

        #[tokio::test]
        async fn test_fill_then_read_back() {
            let session = session();
            session.goto("https://sim.test/", LoadState::DomContentLoaded).await.unwrap();
            let check_in = Locator::new("div.col-md-6:has(label[for='checkin']) input");
            session.fill(&check_in, "01/12/2026").await.unwrap();
            assert_eq!(session.input_value(&check_in).await.unwrap(), "01/12/2026");
            assert_eq!(session.count(&check_in).await.unwrap(), 1);
            assert!(session.is_visible(&check_in).await.unwrap());
        }

        #[tokio::test]
        async fn test_current_url_and_header() {
            let session = session();
            session.goto("https://sim.test/", LoadState::Load).await.unwrap();
            assert_eq!(session.current_url().await.unwrap(), "https://sim.test/");
            let header = session.inner_text(&Locator::new("a.navbar-brand")).await.unwrap();
            assert_eq!(header, "Shady Meadows B&B");
        }
    }
}
