//! Page Object Model support.
//!
//! A page object borrows the scenario's [`Session`] and owns the locators
//! for one page. The trait supplies the shared "am I on this page, is it
//! ready" checks; each page adds its own actions and reads.

use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::ElementState;
use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Trait for page objects representing one page of the booking site.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Path pattern that matches this page (e.g., "/", "/reservation/:room")
    fn url_pattern(&self) -> &str;

    /// Element whose visibility means the page is ready
    fn ready_marker(&self) -> &Locator;

    /// Session the page drives
    fn session(&self) -> &Session;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Wait until the ready marker is visible
    async fn wait_until_loaded(&self) -> ProbeResult<()> {
        let _ = self
            .session()
            .wait_for(self.ready_marker(), ElementState::Visible, None)
            .await?;
        tracing::debug!(page = self.page_name(), "loaded");
        Ok(())
    }

    /// Whether the ready marker is visible right now
    async fn is_loaded(&self) -> ProbeResult<bool> {
        self.session().is_visible(self.ready_marker()).await
    }

    /// Whether the current URL matches [`Self::url_pattern`]
    async fn is_current(&self) -> ProbeResult<bool> {
        let url = self.session().current_url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(&url))
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

fn origin_regex() -> Option<&'static Regex> {
    static ORIGIN: OnceLock<Option<Regex>> = OnceLock::new();
    ORIGIN
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^/?#]*").ok())
        .as_ref()
}

/// Path of a URL without origin, query or fragment
#[must_use]
pub fn url_path(url: &str) -> &str {
    let without_origin = origin_regex()
        .and_then(|re| re.find(url))
        .map_or(url, |m| &url[m.end()..]);
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}

/// Query parameters of a URL, in key order
#[must_use]
pub fn query_params(url: &str) -> BTreeMap<String, String> {
    let Some((_, query)) = url.split_once('?') else {
        return BTreeMap::new();
    };
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k.to_string(), v.to_string())
        })
        .collect()
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/reservation`
    /// - Wildcards: `/reservation/*`
    /// - Named parameters: `/reservation/:room`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    fn path_segments(url: &str) -> Vec<&str> {
        url_path(url).split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Check if a URL (absolute or path-only) matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments = Self::path_segments(url);

        // wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit.as_str() == *actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract path parameters from a URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> BTreeMap<String, String> {
        self.segments
            .iter()
            .zip(Self::path_segments(url))
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
