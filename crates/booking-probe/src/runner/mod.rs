//! Scenario runner.
//!
//! Each selected scenario runs in its own tokio task with its own session;
//! a semaphore bounds how many run at once. Tasks report back over a
//! channel and by their join result, and only the runner task touches the
//! listeners, so listener state is never shared between scenarios.

mod listener;
mod sessions;

pub use listener::{
    LoggingListener, ScenarioListener, ScenarioOutcome, ScenarioStatus, SuiteInfo, SuiteReport,
};
pub use sessions::{SessionFactory, SimulatedSessions};

use crate::artifacts::save_screenshot;
use crate::config::SuiteConfig;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, Selection};
use chrono::Local;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use uuid::Uuid;

/// Runs a catalog of scenarios against sessions from a [`SessionFactory`]
#[derive(Debug)]
pub struct ScenarioRunner {
    config: Arc<SuiteConfig>,
    factory: Arc<dyn SessionFactory>,
    selection: Selection,
    listeners: Vec<Box<dyn ScenarioListener>>,
}

impl ScenarioRunner {
    /// Runner for `config`, opening sessions with `factory`
    #[must_use]
    pub fn new(config: SuiteConfig, factory: impl SessionFactory + 'static) -> Self {
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
            selection: Selection::all(),
            listeners: Vec::new(),
        }
    }

    /// Restrict which scenarios run
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Add a listener
    #[must_use]
    pub fn with_listener(mut self, listener: impl ScenarioListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Add a boxed listener
    pub fn add_listener(&mut self, listener: Box<dyn ScenarioListener>) {
        self.listeners.push(listener);
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run the selected scenarios of `catalog`; the report lists outcomes
    /// in catalog order
    pub async fn run(&mut self, catalog: &[Scenario]) -> ProbeResult<SuiteReport> {
        self.config.validate()?;
        let selected = self.selection.apply(catalog);
        let info = SuiteInfo {
            run_id: Uuid::new_v4(),
            base_url: self.config.base_url.clone(),
            browser_mode: self.factory.mode(),
            scenario_count: selected.len(),
            started_at: Local::now(),
        };
        for listener in &mut self.listeners {
            listener.on_suite_start(&info)?;
        }

        let clock = Instant::now();
        let permits = Arc::new(Semaphore::new(self.config.jobs.max(1)));
        let (events, mut started) = mpsc::unbounded_channel::<Scenario>();
        let mut tasks = JoinSet::new();
        for (index, scenario) in selected.iter().copied().enumerate() {
            let permits = Arc::clone(&permits);
            let config = Arc::clone(&self.config);
            let factory = Arc::clone(&self.factory);
            let events = events.clone();
            let _ = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let started_at = Local::now();
                let outcome = AssertUnwindSafe(run_scenario(scenario, config, factory, &events))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        let error = ProbeError::page(format!(
                            "scenario task panicked: {}",
                            panic_message(panic.as_ref())
                        ));
                        ScenarioOutcome::failed(&scenario, started_at, &error)
                    });
                (index, outcome)
            });
        }
        drop(events);

        let mut outcomes: Vec<(usize, ScenarioOutcome)> = Vec::with_capacity(selected.len());
        let mut aborted = Vec::new();
        loop {
            tokio::select! {
                biased;
                Some(scenario) = started.recv() => {
                    for listener in &mut self.listeners {
                        listener.on_scenario_start(&scenario)?;
                    }
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, outcome))) => {
                        for listener in &mut self.listeners {
                            listener.on_scenario_finish(&outcome)?;
                        }
                        outcomes.push((index, outcome));
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "scenario task aborted");
                        aborted.push(e.to_string());
                    }
                    None => break,
                },
            }
        }
        if !aborted.is_empty() {
            let error = ProbeError::page(format!("scenario task aborted: {}", aborted.join("; ")));
            for (index, scenario) in selected.iter().enumerate() {
                if outcomes.iter().any(|(i, _)| *i == index) {
                    continue;
                }
                let outcome = ScenarioOutcome::failed(scenario, Local::now(), &error);
                for listener in &mut self.listeners {
                    listener.on_scenario_finish(&outcome)?;
                }
                outcomes.push((index, outcome));
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let report = SuiteReport {
            info,
            outcomes: outcomes.into_iter().map(|(_, o)| o).collect(),
            duration: clock.elapsed(),
        };
        for listener in &mut self.listeners {
            listener.on_suite_finish(&report)?;
        }
        Ok(report)
    }
}

/// Open a session, run the body under the scenario timeout, capture a
/// screenshot on failure and always close the session
async fn run_scenario(
    scenario: Scenario,
    config: Arc<SuiteConfig>,
    factory: Arc<dyn SessionFactory>,
    events: &mpsc::UnboundedSender<Scenario>,
) -> ScenarioOutcome {
    let started_at = Local::now();
    let clock = Instant::now();
    let session = match factory.open(scenario.id, Arc::clone(&config)).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(scenario = scenario.id, error = %e, "no session");
            return ScenarioOutcome::skipped(&scenario, started_at, &e)
                .with_duration(clock.elapsed());
        }
    };
    let _ = events.send(scenario);

    let limit = Duration::from_millis(config.timeouts.scenario_ms);
    let body = AssertUnwindSafe(scenario.run(&session)).catch_unwind();
    let result = match tokio::time::timeout(limit, body).await {
        Ok(Ok(result)) => result,
        Ok(Err(panic)) => Err(ProbeError::page(format!(
            "scenario panicked: {}",
            panic_message(panic.as_ref())
        ))),
        Err(_) => Err(ProbeError::Timeout {
            what: format!("scenario {}", scenario.id),
            ms: config.timeouts.scenario_ms,
        }),
    };

    let mut outcome = match result {
        Ok(()) => ScenarioOutcome::passed(&scenario, started_at),
        Err(e) => {
            let outcome = ScenarioOutcome::failed(&scenario, started_at, &e);
            match save_screenshot(&session, &config.output.screenshot_dir).await {
                Ok(path) => outcome.with_screenshot(path),
                Err(shot_error) => {
                    tracing::warn!(scenario = scenario.id, error = %shot_error, "screenshot failed");
                    outcome
                }
            }
        }
    };

    if let Err(e) = session.close().await {
        tracing::warn!(scenario = scenario.id, error = %e, "session close failed");
    }
    outcome.duration = clock.elapsed();
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
