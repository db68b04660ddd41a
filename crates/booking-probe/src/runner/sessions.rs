//! Session factories: one fresh, isolated session per scenario.

use crate::config::SuiteConfig;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::sim::SimulatedSite;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Opens a session for each scenario
#[async_trait]
pub trait SessionFactory: Send + Sync + fmt::Debug {
    /// Backend description for reports
    fn mode(&self) -> String;

    /// Open a new session owned by `scenario`
    async fn open(&self, scenario: &str, config: Arc<SuiteConfig>) -> ProbeResult<Session>;
}

type SiteMaker = dyn Fn() -> SimulatedSite + Send + Sync;

/// Sessions backed by an in-process [`SimulatedSite`]
#[derive(Clone)]
pub struct SimulatedSessions {
    make: Arc<SiteMaker>,
}

impl fmt::Debug for SimulatedSessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedSessions").finish_non_exhaustive()
    }
}

impl Default for SimulatedSessions {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSessions {
    /// A default site per session
    #[must_use]
    pub fn new() -> Self {
        Self::with_site(SimulatedSite::new)
    }

    /// A site built by `make` per session
    #[must_use]
    pub fn with_site(make: impl Fn() -> SimulatedSite + Send + Sync + 'static) -> Self {
        Self {
            make: Arc::new(make),
        }
    }
}

#[async_trait]
impl SessionFactory for SimulatedSessions {
    fn mode(&self) -> String {
        "simulated".to_string()
    }

    async fn open(&self, scenario: &str, config: Arc<SuiteConfig>) -> ProbeResult<Session> {
        Ok(Session::new(Box::new((self.make)()), config, scenario))
    }
}
