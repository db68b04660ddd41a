//! Date helpers for the search form and the availability calendar.
//!
//! The calendar scan walks a fixed table of future offsets in a random
//! order, so repeated runs spread bookings over the season instead of
//! colliding on the same night.

use crate::constants::{DATE_FORMAT, ISO_DATE_FORMAT, MONTH_LABEL_FORMAT};
use crate::result::{ProbeError, ProbeResult};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

/// First candidate offset in days
pub const CANDIDATE_MIN_OFFSET_DAYS: i64 = 30;
/// Last candidate offset in days (inclusive)
pub const CANDIDATE_MAX_OFFSET_DAYS: i64 = 180;
/// Gap between candidate offsets
pub const CANDIDATE_STEP_DAYS: usize = 3;

/// Range of [`random_future_date`] offsets
pub const RANDOM_OFFSET_DAYS: std::ops::RangeInclusive<i64> = 30..=120;

/// Today's local date
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Candidate offsets: 30, 33, ..., 180
pub fn candidate_offsets() -> impl Iterator<Item = i64> {
    (CANDIDATE_MIN_OFFSET_DAYS..=CANDIDATE_MAX_OFFSET_DAYS).step_by(CANDIDATE_STEP_DAYS)
}

/// Candidate dates after `today`, in ascending order
#[must_use]
pub fn future_candidates(today: NaiveDate) -> Vec<NaiveDate> {
    candidate_offsets()
        .map(|days| today + Duration::days(days))
        .collect()
}

/// Candidate dates after `today`, shuffled with `rng`
#[must_use]
pub fn shuffled_future_dates_with<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Vec<NaiveDate> {
    let mut dates = future_candidates(today);
    dates.shuffle(rng);
    dates
}

/// Candidate dates after today, shuffled per call
#[must_use]
pub fn shuffled_future_dates() -> Vec<NaiveDate> {
    shuffled_future_dates_with(today(), &mut rand::thread_rng())
}

/// A date 30 to 120 days after `today`
#[must_use]
pub fn random_future_date_from<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> NaiveDate {
    today + Duration::days(rng.gen_range(RANDOM_OFFSET_DAYS))
}

/// A date 30 to 120 days from now
#[must_use]
pub fn random_future_date() -> NaiveDate {
    random_future_date_from(today(), &mut rand::thread_rng())
}

/// `dd/MM/yyyy`, as the search form expects
#[must_use]
pub fn format_display(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `yyyy-MM-dd`, as the reservation URL and confirmation use
#[must_use]
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parse a `yyyy-MM-dd` date
pub fn parse_iso(text: &str) -> ProbeResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), ISO_DATE_FORMAT)
        .map_err(|e| ProbeError::page(format!("invalid ISO date '{text}': {e}")))
}

/// Calendar toolbar label for the month containing `date`, e.g. `March 2027`
#[must_use]
pub fn month_label(date: NaiveDate) -> String {
    date.format(MONTH_LABEL_FORMAT).to_string()
}

/// First day of the month a toolbar label names
pub fn parse_month_label(label: &str) -> ProbeResult<NaiveDate> {
    let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&format!("1 {normalized}"), "%d %B %Y").map_err(|_| {
        ProbeError::InvalidMonthLabel {
            label: label.to_string(),
        }
    })
}

/// First day of the month containing `date`
#[must_use]
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`
#[must_use]
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Number of nights between check-in and check-out
#[must_use]
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}
