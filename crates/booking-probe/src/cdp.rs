//! Chromium driver over the DevTools protocol (`browser` feature).
//!
//! Each session launches its own browser, so scenarios never share cookies
//! or storage. Locators are compiled to a JavaScript collector and run in
//! the page; snapshots come back as JSON.

use crate::config::{BrowserSettings, SuiteConfig};
use crate::driver::{ElementSnapshot, PageDriver, Screenshot};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::runner::SessionFactory;
use crate::session::Session;
use crate::wait::{poll_until, LoadState, WaitOptions};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

fn page_error(e: impl std::fmt::Display) -> ProbeError {
    ProbeError::page(e.to_string())
}

/// Chromium reports a missing executable as a detection failure
fn launch_error(message: String) -> ProbeError {
    if message.contains("detect") {
        ProbeError::BrowserNotFound
    } else {
        ProbeError::BrowserLaunchError { message }
    }
}

/// Wrap a collector so the script yields snapshots of every match
fn snapshot_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const els = {}; return els.map(e => {{ \
           const r = e.getClientRects(); const s = getComputedStyle(e); \
           return {{ \
             tag: e.tagName.toLowerCase(), \
             inner_text: typeof e.innerText === 'string' ? e.innerText : '', \
             text_content: e.textContent || '', \
             value: ('value' in e && typeof e.value === 'string') ? e.value : null, \
             attributes: Object.fromEntries(Array.from(e.attributes).map(a => [a.name, a.value])), \
             visible: r.length > 0 && s.visibility !== 'hidden' && s.display !== 'none' \
           }}; }}); }})()",
        locator.to_collector_js()
    )
}

/// Click the first match; yields whether there was one
fn click_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const e = {}[0]; if (!e) return false; \
           e.scrollIntoView({{ block: 'center' }}); e.click(); return true; }})()",
        locator.to_collector_js()
    )
}

/// Set the first match's value through the native setter, so framework
/// listeners see the change; yields whether there was a form control
fn fill_script(locator: &Locator, value: &str) -> ProbeResult<String> {
    let value = serde_json::to_string(value)?;
    Ok(format!(
        "(() => {{ const e = {}[0]; if (!e || !('value' in e)) return false; \
           e.focus(); \
           const proto = e instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
           const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
           if (desc && desc.set) {{ desc.set.call(e, {value}); }} else {{ e.value = {value}; }} \
           e.dispatchEvent(new Event('input', {{ bubbles: true }})); \
           e.dispatchEvent(new Event('change', {{ bubbles: true }})); \
           e.blur(); return true; }})()",
        locator.to_collector_js()
    ))
}

/// Chromium page driven over CDP
#[derive(Debug)]
pub struct CdpDriver {
    browser: Mutex<Option<CdpBrowser>>,
    page: CdpPage,
    handler: JoinHandle<()>,
    navigation: WaitOptions,
}

impl CdpDriver {
    /// Launch a browser with `settings` and open a blank page
    pub async fn launch(settings: &BrowserSettings, navigation: WaitOptions) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder().window_size(settings.viewport_width, settings.viewport_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(launch_error)?;
        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| launch_error(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(page_error)?;
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
            navigation,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(page_error)?
            .into_value()
            .map_err(page_error)
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn navigate(&self, url: &str, until: LoadState) -> ProbeResult<()> {
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| ProbeError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let this = self;
        let accepted = until.ready_states();
        poll_until(format!("{url} to reach {until}"), self.navigation, move || async move {
            let state: String = this.eval("document.readyState".to_string()).await?;
            Ok(accepted.contains(&state.as_str()).then_some(()))
        })
        .await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(page_error)?
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        self.eval(snapshot_script(locator)).await
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        if self.eval::<bool>(click_script(locator)).await? {
            Ok(())
        } else {
            Err(ProbeError::ElementNotFound {
                selector: locator.to_string(),
                ms: 0,
            })
        }
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        if self.eval::<bool>(fill_script(locator, value)?).await? {
            Ok(())
        } else {
            Err(ProbeError::page(format!("{locator} is not a form control")))
        }
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .capture_beyond_viewport(true)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::ScreenshotError {
                message: e.to_string(),
            })?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| ProbeError::ScreenshotError {
                message: e.to_string(),
            })?;
        Ok(Screenshot::new(data))
    }

    async fn close(&self) -> ProbeResult<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        let closed = browser.close().await.map(|_| ()).map_err(page_error);
        let _ = browser.wait().await;
        self.handler.abort();
        closed
    }
}

/// One fresh Chromium per scenario
#[derive(Debug, Clone, Copy)]
pub struct ChromiumSessions {
    headless: bool,
}

impl ChromiumSessions {
    /// Factory for browsers launched with `settings`
    #[must_use]
    pub const fn new(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
        }
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessions {
    fn mode(&self) -> String {
        let window = if self.headless { "headless" } else { "headed" };
        format!("chromium ({window})")
    }

    async fn open(&self, scenario: &str, config: Arc<SuiteConfig>) -> ProbeResult<Session> {
        let driver = CdpDriver::launch(&config.browser, config.timeouts.navigation_wait()).await?;
        tracing::debug!(scenario, headless = config.browser.headless, "browser launched");
        Ok(Session::new(Box::new(driver), config, scenario))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_script_embeds_collector() {
        let locator = Locator::new("div.rbc-date-cell");
        let script = snapshot_script(&locator);
        assert!(script.contains(&locator.to_collector_js()));
        assert!(script.contains("text_content"));
    }

    #[test]
    fn test_launch_error_detects_missing_browser() {
        let err = launch_error("Could not auto detect a chrome executable".to_string());
        assert!(matches!(err, ProbeError::BrowserNotFound));
        let err = launch_error("spawn failed".to_string());
        assert!(matches!(err, ProbeError::BrowserLaunchError { .. }));
    }

    #[test]
    fn test_mode_names_window() {
        let headed = BrowserSettings {
            headless: false,
            ..BrowserSettings::default()
        };
        assert_eq!(ChromiumSessions::new(&headed).mode(), "chromium (headed)");
        assert_eq!(
            ChromiumSessions::new(&BrowserSettings::default()).mode(),
            "chromium (headless)"
        );
    }

    #[test]
    fn test_fill_script_quotes_value() {
        let script = fill_script(&Locator::label("Firstname"), "O'Brien \"Jr\"").unwrap();
        assert!(script.contains(r#""O'Brien \"Jr\"""#));
    }
}
