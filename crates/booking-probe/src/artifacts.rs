//! Artifact naming and writing: failure screenshots and report files.

use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use chrono::{DateTime, Local};
use std::path::{Component, Path, PathBuf};

/// Timestamp format used in artifact names (`yyyyMMdd_HHmmss`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `yyyyMMdd_HHmmss` for `at`
#[must_use]
pub fn timestamp_slug(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `<dir>/<yyyyMMdd_HHmmss>_<scenario>.png`
#[must_use]
pub fn screenshot_path(dir: &Path, scenario: &str, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{scenario}.png", timestamp_slug(at)))
}

/// `<dir>/BookingReport_<yyyyMMdd_HHmmss>.html`
#[must_use]
pub fn report_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("BookingReport_{}.html", timestamp_slug(at)))
}

/// Take a full-page screenshot and write it under `dir`
pub async fn save_screenshot(session: &Session, dir: &Path) -> ProbeResult<PathBuf> {
    let shot = session.screenshot().await?;
    if !shot.is_valid() {
        return Err(ProbeError::ScreenshotError {
            message: "driver returned an empty image".to_string(),
        });
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = screenshot_path(dir, session.scenario(), Local::now());
    tokio::fs::write(&path, &shot.data).await?;
    tracing::info!(scenario = session.scenario(), path = %path.display(), "screenshot saved");
    Ok(path)
}

/// Path of `target` as seen from directory `base`, for links inside a
/// report. Both paths must be of the same kind (both relative or both
/// absolute); otherwise `target` is returned unchanged.
#[must_use]
pub fn relative_to(base: &Path, target: &Path) -> PathBuf {
    if base.is_absolute() != target.is_absolute() {
        return target.to_path_buf();
    }
    let base: Vec<Component<'_>> = base.components().filter(|c| *c != Component::CurDir).collect();
    let target: Vec<Component<'_>> = target.components().filter(|c| *c != Component::CurDir).collect();
    let common = base
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &target[common..] {
        out.push(component.as_os_str());
    }
    out
}

/// Report links always use forward slashes
#[must_use]
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
