//! Scenario definitions: one independent test case each.

use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Body of a scenario, driving the site through a borrowed session
pub type ScenarioFn = for<'a> fn(&'a Session) -> BoxFuture<'a, ProbeResult<()>>;

/// Category a scenario is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Fast checks that the site is up
    Smoke,
    /// Full-flow checks
    Regression,
    /// Availability search
    Search,
    /// Reservation and guest form
    Booking,
    /// Month calendar
    Calendar,
}

impl Group {
    /// All groups
    pub const ALL: [Self; 5] = [
        Self::Smoke,
        Self::Regression,
        Self::Search,
        Self::Booking,
        Self::Calendar,
    ];

    /// Display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "Smoke",
            Self::Regression => "Regression",
            Self::Search => "Search",
            Self::Booking => "Booking",
            Self::Calendar => "Calendar",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProbeError::config(format!("unknown group '{s}'")))
    }
}

/// One test case in the catalog
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Stable identifier (`TC_...`)
    pub id: &'static str,
    /// Report title
    pub description: &'static str,
    /// Report categories
    pub groups: &'static [Group],
    body: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(
        id: &'static str,
        description: &'static str,
        groups: &'static [Group],
        body: ScenarioFn,
    ) -> Self {
        Self {
            id,
            description,
            groups,
            body,
        }
    }

    /// Run the body against `session`
    pub fn run<'a>(&self, session: &'a Session) -> BoxFuture<'a, ProbeResult<()>> {
        (self.body)(session)
    }

    /// Whether the scenario carries `group`
    #[must_use]
    pub fn in_group(&self, group: Group) -> bool {
        self.groups.contains(&group)
    }

    /// Whether the id contains `filter`, ignoring case
    #[must_use]
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.id.to_lowercase().contains(&filter.to_lowercase())
    }
}

/// Selects which scenarios of a catalog run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Id substrings; any match selects
    pub filters: Vec<String>,
    /// Groups; any match selects
    pub groups: Vec<Group>,
}

impl Selection {
    /// Everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an id filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Add a group
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Whether `scenario` is selected; empty criteria select everything
    #[must_use]
    pub fn accepts(&self, scenario: &Scenario) -> bool {
        let by_id = self.filters.is_empty() || self.filters.iter().any(|f| scenario.matches_filter(f));
        let by_group = self.groups.is_empty() || self.groups.iter().any(|g| scenario.in_group(*g));
        by_id && by_group
    }

    /// Selected scenarios of `catalog`, in catalog order
    #[must_use]
    pub fn apply(&self, catalog: &[Scenario]) -> Vec<Scenario> {
        catalog.iter().filter(|s| self.accepts(s)).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Session) -> BoxFuture<'_, ProbeResult<()>> {
        Box::pin(async { Ok(()) })
    }

    const SMOKE: Scenario = Scenario::new("TC_Alpha", "alpha", &[Group::Smoke], noop);
    const BOOKING: Scenario =
        Scenario::new("TC_Beta_Booking", "beta", &[Group::Regression, Group::Booking], noop);

    #[test]
    fn test_group_parse() {
        assert_eq!("smoke".parse::<Group>().unwrap(), Group::Smoke);
        assert_eq!(" Calendar ".parse::<Group>().unwrap(), Group::Calendar);
        assert!("nightly".parse::<Group>().is_err());
        assert_eq!(Group::Regression.to_string(), "Regression");
    }

    #[test]
    fn test_selection_by_filter_and_group() {
        let catalog = [SMOKE, BOOKING];
        assert_eq!(Selection::all().apply(&catalog).len(), 2);

        let ids: Vec<_> = Selection::all()
            .with_filter("booking")
            .apply(&catalog)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["TC_Beta_Booking"]);

        let smoke = Selection::all().with_group(Group::Smoke).apply(&catalog);
        assert_eq!(smoke.len(), 1);
        assert_eq!(smoke[0].id, "TC_Alpha");

        assert!(Selection::all()
            .with_filter("alpha")
            .with_group(Group::Booking)
            .apply(&catalog)
            .is_empty());
    }

    #[test]
    fn test_debug_omits_body() {
        let text = format!("{SMOKE:?}");
        assert!(text.contains("TC_Alpha"));
        assert!(text.contains(".."));
    }
}
