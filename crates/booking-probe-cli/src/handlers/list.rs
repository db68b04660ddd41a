//! List command handler

use crate::commands::{ListArgs, ListFormat};
use crate::error::CliResult;
use booking_probe::{catalog, Group, Scenario};
use serde::Serialize;

/// A catalog entry as printed by `list --format json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioEntry {
    /// Scenario id
    pub id: String,
    /// Scenario description
    pub description: String,
    /// Report categories
    pub groups: Vec<Group>,
}

impl From<&Scenario> for ScenarioEntry {
    fn from(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id.to_string(),
            description: scenario.description.to_string(),
            groups: scenario.groups.to_vec(),
        }
    }
}

fn text_line(entry: &ScenarioEntry) -> String {
    let groups: Vec<&str> = entry.groups.iter().map(|g| g.as_str()).collect();
    format!("{:<34} [{}] {}", entry.id, groups.join(", "), entry.description)
}

/// Render the selected part of the catalog
pub fn execute_list(args: &ListArgs) -> CliResult<String> {
    let entries: Vec<ScenarioEntry> = args
        .select
        .selection()
        .apply(&catalog())
        .iter()
        .map(ScenarioEntry::from)
        .collect();
    Ok(match args.format {
        ListFormat::Text => entries.iter().map(text_line).collect::<Vec<_>>().join("\n"),
        ListFormat::Json => serde_json::to_string_pretty(&entries)?,
    })
}
