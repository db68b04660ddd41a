//! PageDriver - the seam to the browser-automation runtime.
//!
//! Drivers implement a small set of raw primitives: navigate, resolve a
//! locator into element snapshots, click, fill, screenshot, close.
//! Auto-waiting, strictness and read-back helpers live one level up in
//! [`crate::session::Session`], so every driver gets identical semantics.
//!
//! # Implementations
//!
//! - `CdpDriver` - real Chromium over CDP (`browser` feature)
//! - [`crate::sim::SimulatedSite`] - in-process model of the booking site

use crate::locator::{Locator, Matchable};
use crate::result::ProbeResult;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::SystemTime;

/// Point-in-time view of one resolved element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag: String,
    /// Rendered text (`innerText`)
    pub inner_text: String,
    /// Raw text (`textContent`)
    pub text_content: String,
    /// Form control value, when the element has one
    pub value: Option<String>,
    /// Attributes by name
    pub attributes: BTreeMap<String, String>,
    /// Whether the element has a rendered, non-empty box
    pub visible: bool,
}

impl ElementSnapshot {
    /// Create a visible snapshot with the given tag and text
    #[must_use]
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            tag: tag.into(),
            inner_text: text.clone(),
            text_content: text,
            value: None,
            attributes: BTreeMap::new(),
            visible: true,
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the control value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Read an attribute
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the `class` attribute contains `class_name` as a whole token
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == class_name))
    }
}

impl Matchable for ElementSnapshot {
    fn match_text(&self) -> &str {
        &self.text_content
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot has data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync + Debug {
    /// Navigate to URL and wait for `until`
    async fn navigate(&self, url: &str, until: LoadState) -> ProbeResult<()>;

    /// Current page URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Resolve a locator to snapshots of every matching element, in
    /// document order
    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>>;

    /// Click the first element the locator resolves to
    async fn click(&self, locator: &Locator) -> ProbeResult<()>;

    /// Replace the value of the first element the locator resolves to
    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> ProbeResult<Screenshot>;

    /// Release the browser resources held by this driver
    async fn close(&self) -> ProbeResult<()>;
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for std::sync::Arc<T> {
    async fn navigate(&self, url: &str, until: LoadState) -> ProbeResult<()> {
        (**self).navigate(url, until).await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        (**self).current_url().await
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        (**self).query(locator).await
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        (**self).click(locator).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        (**self).fill(locator, value).await
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        (**self).screenshot().await
    }

    async fn close(&self) -> ProbeResult<()> {
        (**self).close().await
    }
}
