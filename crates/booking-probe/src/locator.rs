//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a description of *how* to find elements, never a cached
//! handle. Every query re-resolves it against the live page, because the
//! booking site re-renders the calendar and form on every interaction.
//!
//! # Design
//!
//! - **Chained scopes**: `card.locator("a")` searches only inside `card`
//! - **Text filters**: `has_text`, `has_not_text`, `text_is`
//! - **Positions**: `first`, `last`, `nth`
//! - **One semantics, two engines**: [`Locator::select`] applies filters in
//!   Rust (used by the simulated site), [`Locator::to_collector_js`] compiles
//!   the same chain to JavaScript (used by the CDP driver).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Base selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "div.room-card")
    Css(String),
    /// ARIA role with an accessible name (e.g., button "Check Availability")
    Role {
        /// ARIA role
        role: String,
        /// Accessible name, matched case-insensitively as a substring
        name: String,
    },
    /// Form control associated with a label text
    Label(String),
    /// Innermost element containing the text
    Text(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Create a label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// JavaScript function body `(root) => Element[]` for this selector
    fn to_js_resolver(&self) -> String {
        match self {
            Self::Css(css) => {
                format!("(root) => Array.from(root.querySelectorAll({}))", js_str(css))
            }
            Self::Role { role, name } => format!(
                "(root) => Array.from(root.querySelectorAll({})).filter(e => \
                 __norm(e.getAttribute('aria-label') || e.textContent || e.value).toLowerCase().includes({}))",
                js_str(role_css(role)),
                js_str(&name.to_lowercase())
            ),
            Self::Label(text) => format!(
                "(root) => {{ const t = {}; \
                 const viaLabel = Array.from(root.querySelectorAll('label')) \
                   .filter(l => __norm(l.textContent).toLowerCase().includes(t)) \
                   .map(l => l.control || (l.htmlFor ? document.getElementById(l.htmlFor) : null)) \
                   .filter(Boolean); \
                 const viaAria = Array.from(root.querySelectorAll('[aria-label]')) \
                   .filter(e => __norm(e.getAttribute('aria-label')).toLowerCase().includes(t)); \
                 return Array.from(new Set([...viaLabel, ...viaAria])); }}",
                js_str(&text.to_lowercase())
            ),
            Self::Text(text) => format!(
                "(root) => {{ const t = {}; \
                 return Array.from(root.querySelectorAll('*')) \
                   .filter(e => __norm(e.textContent).toLowerCase().includes(t)) \
                   .filter(e => !Array.from(e.children).some(c => __norm(c.textContent).toLowerCase().includes(t))); }}",
                js_str(&text.to_lowercase())
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::Role { role, name } => write!(f, "role={role}[name=\"{name}\"]"),
            Self::Label(text) => write!(f, "label=\"{text}\""),
            Self::Text(text) => write!(f, "text=\"{text}\""),
        }
    }
}

/// CSS that approximates the elements carrying an implicit ARIA role
fn role_css(role: &str) -> &str {
    match role {
        "button" => "button, [role=button], input[type=button], input[type=submit]",
        "link" => "a[href], [role=link]",
        "textbox" => "input:not([type]), input[type=text], input[type=email], input[type=tel], textarea, [role=textbox]",
        "heading" => "h1, h2, h3, h4, h5, h6, [role=heading]",
        other => other,
    }
}

/// Text filter applied after the base selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextFilter {
    /// Keep elements whose text contains the value (case-insensitive)
    HasText(String),
    /// Drop elements whose text contains the value (case-insensitive)
    HasNotText(String),
    /// Keep elements whose whitespace-normalized text equals the value
    TextIs(String),
}

impl TextFilter {
    /// Whether an element with this text passes the filter
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        let text = normalize_whitespace(text);
        match self {
            Self::HasText(needle) => contains_ignore_case(&text, needle),
            Self::HasNotText(needle) => !contains_ignore_case(&text, needle),
            Self::TextIs(exact) => text == normalize_whitespace(exact),
        }
    }

    fn to_js_predicate(&self) -> String {
        match self {
            Self::HasText(needle) => format!(
                "e => __norm(e.textContent).toLowerCase().includes({})",
                js_str(&normalize_whitespace(needle).to_lowercase())
            ),
            Self::HasNotText(needle) => format!(
                "e => !__norm(e.textContent).toLowerCase().includes({})",
                js_str(&normalize_whitespace(needle).to_lowercase())
            ),
            Self::TextIs(exact) => format!(
                "e => __norm(e.textContent) === {}",
                js_str(&normalize_whitespace(exact))
            ),
        }
    }
}

/// Positional pick applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// First match
    First,
    /// Last match
    Last,
    /// Zero-based index
    Nth(usize),
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Whether actions require a single match
    pub strict: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            strict: true,
        }
    }
}

/// Anything a locator can filter by text
pub trait Matchable {
    /// Text content used by text filters
    fn match_text(&self) -> &str;
}

impl Matchable for String {
    fn match_text(&self) -> &str {
        self
    }
}

impl Matchable for &str {
    fn match_text(&self) -> &str {
        self
    }
}

/// A locator for finding elements on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    filters: Vec<TextFilter>,
    position: Option<Position>,
    parent: Option<Box<Locator>>,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(css: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(css.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            filters: Vec::new(),
            position: None,
            parent: None,
            options: LocatorOptions::default(),
        }
    }

    /// Locate by ARIA role and accessible name
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_selector(Selector::role(role, name))
    }

    /// Locate a form control by its label
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::label(text))
    }

    /// Locate the innermost element containing a text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// CSS child locator scoped to the elements this locator resolves to
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Self {
        self.scope(Self::new(css))
    }

    /// Scope an arbitrary locator to the elements this locator resolves to
    #[must_use]
    pub fn scope(&self, mut child: Self) -> Self {
        child.options = self.options.clone();
        child.parent = Some(Box::new(match child.parent.take() {
            // Re-root an already scoped child under this locator
            Some(inner) => self.scope(*inner),
            None => self.clone(),
        }));
        child
    }

    /// Restrict this locator to the elements `parent` resolves to
    #[must_use]
    pub fn within(self, parent: &Self) -> Self {
        parent.scope(self)
    }

    /// Keep only elements containing `text`
    #[must_use]
    pub fn has_text(mut self, text: impl Into<String>) -> Self {
        self.filters.push(TextFilter::HasText(text.into()));
        self
    }

    /// Drop elements containing `text`
    #[must_use]
    pub fn has_not_text(mut self, text: impl Into<String>) -> Self {
        self.filters.push(TextFilter::HasNotText(text.into()));
        self
    }

    /// Keep only elements whose text is exactly `text`
    #[must_use]
    pub fn text_is(mut self, text: impl Into<String>) -> Self {
        self.filters.push(TextFilter::TextIs(text.into()));
        self
    }

    /// Pick the first match
    #[must_use]
    pub fn first(mut self) -> Self {
        self.position = Some(Position::First);
        self
    }

    /// Pick the last match
    #[must_use]
    pub fn last(mut self) -> Self {
        self.position = Some(Position::Last);
        self
    }

    /// Pick the match at `index`
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.position = Some(Position::Nth(index));
        self
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Disable strict mode (allow multiple matches for actions)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Get the base selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the text filters
    #[must_use]
    pub fn filters(&self) -> &[TextFilter] {
        &self.filters
    }

    /// Get the positional pick
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    /// Get the enclosing scope, if any
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Apply this locator's filters and position to already-resolved
    /// candidates (base selector and scope are the caller's concern)
    #[must_use]
    pub fn select<T: Matchable>(&self, candidates: Vec<T>) -> Vec<T> {
        let mut matched: Vec<T> = candidates
            .into_iter()
            .filter(|c| self.filters.iter().all(|f| f.accepts(c.match_text())))
            .collect();

        match self.position {
            None => matched,
            Some(Position::First) => {
                matched.truncate(1);
                matched
            }
            Some(Position::Last) => matched.pop().into_iter().collect(),
            Some(Position::Nth(i)) => {
                if i < matched.len() {
                    vec![matched.swap_remove(i)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Compile the full chain to a JavaScript expression evaluating to an
    /// `Element[]`
    #[must_use]
    pub fn to_collector_js(&self) -> String {
        let mut chain: Vec<&Self> = Vec::new();
        let mut cursor = Some(self);
        while let Some(loc) = cursor {
            chain.push(loc);
            cursor = loc.parent();
        }
        chain.reverse();

        let mut js = String::from(
            "(() => { const __norm = s => String(s == null ? '' : s).replace(/\\s+/g, ' ').trim(); \
             let els = [document];",
        );
        for loc in chain {
            js.push_str(&format!(
                " els = [...new Set(els.flatMap({}))];",
                loc.selector.to_js_resolver()
            ));
            for filter in &loc.filters {
                js.push_str(&format!(" els = els.filter({});", filter.to_js_predicate()));
            }
            match loc.position {
                None => {}
                Some(Position::First) => js.push_str(" els = els.slice(0, 1);"),
                Some(Position::Last) => js.push_str(" els = els.slice(-1);"),
                Some(Position::Nth(i)) => js.push_str(&format!(" els = els.slice({i}, {});", i + 1)),
            }
        }
        js.push_str(" return els; })()");
        js
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        for filter in &self.filters {
            match filter {
                TextFilter::HasText(t) => write!(f, ":has-text(\"{t}\")")?,
                TextFilter::HasNotText(t) => write!(f, ":not(:has-text(\"{t}\"))")?,
                TextFilter::TextIs(t) => write!(f, ":text-is(\"{t}\")")?,
            }
        }
        match self.position {
            None => Ok(()),
            Some(Position::First) => write!(f, " >> nth=0"),
            Some(Position::Last) => write!(f, " >> nth=-1"),
            Some(Position::Nth(i)) => write!(f, " >> nth={i}"),
        }
    }
}

/// Collapse runs of whitespace and trim
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring test used for role names and text filters
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&normalize_whitespace(needle).to_lowercase())
}

fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod filter_tests {
        use super::*;

        #[test]
        fn test_has_text_is_case_insensitive() {
            assert!(TextFilter::HasText("double".into()).accepts("Double Room £150"));
            assert!(!TextFilter::HasText("suite".into()).accepts("Double Room"));
        }

        #[test]
        fn test_has_not_text() {
            let f = TextFilter::HasNotText("Selected".into());
            assert!(!f.accepts("Selected"));
            assert!(f.accepts("Unavailable"));
        }

        #[test]
        fn test_text_is_normalizes_whitespace() {
            let f = TextFilter::TextIs("Reserve Now".into());
            assert!(f.accepts("  Reserve \n Now "));
            assert!(!f.accepts("Reserve Now!"));
        }

        #[test]
        fn test_text_is_does_not_match_prefix_days() {
            let f = TextFilter::TextIs("1".into());
            assert!(f.accepts("1"));
            assert!(!f.accepts("11"));
            assert!(!f.accepts("21"));
        }
    }

    mod select_tests {
        use super::*;

        fn cells() -> Vec<&'static str> {
            vec!["30", "31", "1", "2", "11", "21"]
        }

        #[test]
        fn test_select_without_position_keeps_all_matches() {
            let loc = Locator::new(".rbc-date-cell").has_text("1");
            assert_eq!(loc.select(cells()), vec!["31", "1", "11", "21"]);
        }

        #[test]
        fn test_select_first_last_nth() {
            let loc = Locator::new(".rbc-date-cell");
            assert_eq!(loc.clone().first().select(cells()), vec!["30"]);
            assert_eq!(loc.clone().last().select(cells()), vec!["21"]);
            assert_eq!(loc.clone().nth(2).select(cells()), vec!["1"]);
            assert!(loc.nth(99).select(cells()).is_empty());
        }

        #[test]
        fn test_filters_apply_before_position() {
            let loc = Locator::new(".rbc-date-cell").text_is("1").first();
            assert_eq!(loc.select(cells()), vec!["1"]);
        }
    }

    mod scope_tests {
        use super::*;

        #[test]
        fn test_child_locator_keeps_parent() {
            let card = Locator::new("div.room-card").has_text("Double");
            let link = card.scope(Locator::role("link", "Book now"));
            assert_eq!(link.parent(), Some(&card));
            assert_eq!(link.selector(), &Selector::role("link", "Book now"));
        }

        #[test]
        fn test_within_is_scope_from_the_child_side() {
            let card = Locator::new("div.room-card").has_text("Suite");
            let title = Locator::new("h5.card-title").within(&card);
            assert_eq!(title, card.locator("h5.card-title"));
        }

        #[test]
        fn test_rescoping_a_scoped_child() {
            let body = Locator::new("div.card-body").has_text("Total");
            let span = Locator::new("div.fw-bold").locator("span");
            let scoped = body.scope(span);
            let mid = scoped.parent().unwrap();
            assert_eq!(mid.selector(), &Selector::css("div.fw-bold"));
            assert_eq!(mid.parent(), Some(&body));
        }

        #[test]
        fn test_display() {
            let loc = Locator::new("div.card-body")
                .has_text("Total")
                .locator("div.fw-bold span")
                .last();
            assert_eq!(
                loc.to_string(),
                "div.card-body:has-text(\"Total\") >> div.fw-bold span >> nth=-1"
            );
        }
    }

    mod js_tests {
        use super::*;

        #[test]
        fn test_collector_js_contains_chain_in_order() {
            let loc = Locator::new("div.room-card")
                .has_text("Double")
                .scope(Locator::role("link", "Book now"));
            let js = loc.to_collector_js();
            let card = js.find("div.room-card").unwrap();
            let link = js.find("book now").unwrap();
            assert!(card < link);
            assert!(js.starts_with("(() =>"));
            assert!(js.ends_with("return els; })()"));
        }

        #[test]
        fn test_collector_js_escapes_quotes() {
            let loc = Locator::new("div.rbc-event-content[title='Selected']").first();
            let js = loc.to_collector_js();
            assert!(js.contains("\"div.rbc-event-content[title='Selected']\""));
            assert!(js.contains("els.slice(0, 1)"));
        }

        #[test]
        fn test_nth_compiles_to_slice() {
            let js = Locator::new(".rbc-date-cell").nth(3).to_collector_js();
            assert!(js.contains("els.slice(3, 4)"));
        }
    }

    #[test]
    fn test_options_propagate_to_children() {
        let parent = Locator::new("form").with_timeout(Duration::from_millis(100));
        let child = parent.locator("input");
        assert_eq!(child.options().timeout, Duration::from_millis(100));
    }
}
