//! Month-view calendar navigation and day availability.
//!
//! The reservation page shows one month at a time. To inspect a date the
//! navigator pages Back/Next until the toolbar label names the target
//! month, then reads the day cell. Cell state is re-read on every call and
//! never cached, since each page click re-renders the grid.

use crate::dates::{last_day_of_month, month_label, parse_month_label};
use crate::driver::ElementSnapshot;
use crate::locator::{contains_ignore_case, Locator};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::ElementState;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Next-month button
pub const NEXT_BUTTON: &str = ".rbc-toolbar button:last-child";
/// Previous-month button
pub const BACK_BUTTON: &str = ".rbc-toolbar .rbc-btn-group:first-child button:first-child";
/// Month label
pub const MONTH_LABEL: &str = ".rbc-toolbar-label";
/// Day cells
pub const DATE_CELLS: &str = ".rbc-date-cell";
/// Events inside a day cell
pub const EVENTS: &str = ".rbc-event";
/// Class marking cells of adjacent months
pub const OFF_RANGE_CLASS: &str = "rbc-off-range";
/// Event text marking the user's own selection
pub const SELECTED_MARKER: &str = "Selected";

/// One calendar day as read from the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    /// Day-of-month text
    pub day_text: String,
    /// Cell belongs to an adjacent month
    pub off_range: bool,
    /// Texts of the cell's events
    pub event_labels: Vec<String>,
}

impl DayCell {
    /// Events that are bookings rather than the current selection
    pub fn booked_events(&self) -> impl Iterator<Item = &str> {
        self.event_labels
            .iter()
            .map(String::as_str)
            .filter(|label| !contains_ignore_case(label, SELECTED_MARKER))
    }

    /// In range and carrying no booking
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.off_range && self.booked_events().next().is_none()
    }
}

/// Leading day number of a cell's text (`"05\nUnavailable"` is 5)
#[must_use]
pub fn day_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Index of the cell showing `day`, preferring one in the displayed month
#[must_use]
pub fn pick_cell(cells: &[ElementSnapshot], day: u32) -> Option<usize> {
    let mut matching = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| day_number(&cell.inner_text) == Some(day));
    let first = matching.next()?;
    if !first.1.has_class(OFF_RANGE_CLASS) {
        return Some(first.0);
    }
    matching
        .find(|(_, cell)| !cell.has_class(OFF_RANGE_CLASS))
        .map_or(Some(first.0), |(i, _)| Some(i))
}

/// Which way to page the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Later month
    Next,
    /// Earlier month
    Back,
}

/// Next if `target` falls after the shown month, Back otherwise
pub fn page_direction(shown_label: &str, target: NaiveDate) -> ProbeResult<Direction> {
    let shown = parse_month_label(shown_label)?;
    Ok(if target > last_day_of_month(shown) {
        Direction::Next
    } else {
        Direction::Back
    })
}

/// Drives the reservation page's calendar through a [`Session`]
#[derive(Debug)]
pub struct CalendarNavigator<'a> {
    session: &'a Session,
    max_steps: usize,
    next: Locator,
    back: Locator,
    label: Locator,
    cells: Locator,
}

impl<'a> CalendarNavigator<'a> {
    /// Navigator bounded by the configured step limit
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            max_steps: session.config().calendar.max_steps,
            next: Locator::new(NEXT_BUTTON),
            back: Locator::new(BACK_BUTTON),
            label: Locator::new(MONTH_LABEL),
            cells: Locator::new(DATE_CELLS),
        }
    }

    /// Override the step limit
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Step limit
    #[must_use]
    pub const fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Label currently shown in the toolbar
    pub async fn shown_label(&self) -> ProbeResult<String> {
        Ok(self.session.inner_text(&self.label).await?.trim().to_string())
    }

    /// Page until the toolbar shows `target`'s month
    pub async fn navigate_to_month(&self, target: NaiveDate) -> ProbeResult<()> {
        let need = month_label(target);
        let _ = self
            .session
            .wait_for(&self.label, ElementState::Visible, None)
            .await?;
        let mut showing = self.shown_label().await?;

        for _ in 0..self.max_steps {
            tracing::debug!(%showing, %need, "calendar");
            if showing == need {
                return Ok(());
            }
            let button = match page_direction(&showing, target)? {
                Direction::Next => &self.next,
                Direction::Back => &self.back,
            };
            self.session.click(button).await?;
            showing = self
                .session
                .wait_for_text_change(&self.label, &showing, None)
                .await?;
        }

        tracing::debug!(%showing, %need, "calendar");
        if showing == need {
            Ok(())
        } else {
            Err(ProbeError::CalendarNavigation {
                target: need,
                reached: showing,
                steps: self.max_steps,
            })
        }
    }

    /// Read the cell for `date` on the displayed month
    pub async fn day_cell(&self, date: NaiveDate) -> ProbeResult<Option<DayCell>> {
        let Some((index, cell)) = self.find_cell(date).await? else {
            return Ok(None);
        };
        let events = self.cells.clone().nth(index).locator(EVENTS);
        let event_labels = self
            .session
            .all_inner_texts(&events)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect();
        Ok(Some(DayCell {
            day_text: date.day().to_string(),
            off_range: cell.has_class(OFF_RANGE_CLASS),
            event_labels,
        }))
    }

    async fn find_cell(&self, date: NaiveDate) -> ProbeResult<Option<(usize, ElementSnapshot)>> {
        let mut cells = self
            .session
            .wait_for(&self.cells, ElementState::Attached, None)
            .await?;
        Ok(pick_cell(&cells, date.day()).map(|i| (i, cells.swap_remove(i))))
    }

    /// Whether `date` is bookable on the displayed month
    pub async fn is_day_available(&self, date: NaiveDate) -> ProbeResult<bool> {
        Ok(self
            .day_cell(date)
            .await?
            .is_some_and(|cell| cell.is_available()))
    }

    /// Click the cell for `date` on the displayed month
    pub async fn select_date(&self, date: NaiveDate) -> ProbeResult<()> {
        let (index, _) = self.find_cell(date).await?.ok_or_else(|| {
            ProbeError::ElementNotFound {
                selector: format!("{} day {}", self.cells, date.day()),
                ms: 0,
            }
        })?;
        self.session.click(&self.cells.clone().nth(index)).await
    }

    /// First candidate whose day is available, navigating to each in turn
    pub async fn find_first_available_date(
        &self,
        candidates: &[NaiveDate],
    ) -> ProbeResult<NaiveDate> {
        for &candidate in candidates {
            self.navigate_to_month(candidate).await?;
            if self.is_day_available(candidate).await? {
                tracing::debug!(date = %candidate, "available");
                return Ok(candidate);
            }
        }
        Err(ProbeError::NoAvailableDate {
            probed: candidates.len(),
        })
    }
}
