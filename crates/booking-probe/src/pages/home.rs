//! Landing page: header, availability search and room cards.

use crate::constants::{BOOK_NOW_BUTTON_TEXT, CHECK_AVAILABILITY_BUTTON_TEXT};
use crate::dates::format_display;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{ElementState, LoadState};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Header brand link
const HEADER: &str = "a.navbar-brand";
/// Check-in input, found through its label's column
const CHECK_IN_INPUT: &str = "div.col-md-6:has(label[for='checkin']) input";
/// Check-out input, found through its label's column
const CHECK_OUT_INPUT: &str = "div.col-md-6:has(label[for='checkout']) input";
/// Search result card
const ROOM_CARD: &str = "div.room-card";
/// Title inside a room card
const ROOM_TITLE: &str = "h5.card-title";

/// The site's home page
#[derive(Debug)]
pub struct HomePage<'a> {
    session: &'a Session,
    header: Locator,
    check_in: Locator,
    check_out: Locator,
    check_availability: Locator,
    room_cards: Locator,
    room_titles: Locator,
}

impl<'a> HomePage<'a> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            header: Locator::new(HEADER),
            check_in: Locator::new(CHECK_IN_INPUT),
            check_out: Locator::new(CHECK_OUT_INPUT),
            check_availability: Locator::role("button", CHECK_AVAILABILITY_BUTTON_TEXT),
            room_cards: Locator::new(ROOM_CARD),
            room_titles: Locator::new(ROOM_CARD).locator(ROOM_TITLE),
        }
    }

    /// Load `url` and wait for the header
    pub async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.session.goto(url, LoadState::DomContentLoaded).await?;
        self.wait_until_loaded().await
    }

    /// Header text, trimmed
    pub async fn header_text(&self) -> ProbeResult<String> {
        Ok(self.session.inner_text(&self.header).await?.trim().to_string())
    }

    /// Whether the header is visible
    pub async fn is_page_loaded(&self) -> ProbeResult<bool> {
        self.is_loaded().await
    }

    /// Type the check-in date as `dd/MM/yyyy`
    pub async fn enter_check_in(&self, date: NaiveDate) -> ProbeResult<()> {
        self.session.fill(&self.check_in, &format_display(date)).await
    }

    /// Type the check-out date as `dd/MM/yyyy`
    pub async fn enter_check_out(&self, date: NaiveDate) -> ProbeResult<()> {
        self.session.fill(&self.check_out, &format_display(date)).await
    }

    /// Value currently in the check-in input
    pub async fn check_in_date(&self) -> ProbeResult<String> {
        self.session.input_value(&self.check_in).await
    }

    /// Value currently in the check-out input
    pub async fn check_out_date(&self) -> ProbeResult<String> {
        self.session.input_value(&self.check_out).await
    }

    /// Run the search and wait for the first room card
    pub async fn click_check_availability(&self) -> ProbeResult<()> {
        self.session.click(&self.check_availability).await?;
        let _ = self
            .session
            .wait_for(&self.room_cards.clone().first(), ElementState::Visible, None)
            .await?;
        Ok(())
    }

    /// Titles of the listed room cards, in page order
    pub async fn available_rooms(&self) -> ProbeResult<Vec<String>> {
        let _ = self
            .session
            .wait_for(&self.room_titles.clone().first(), ElementState::Visible, None)
            .await?;
        Ok(self
            .session
            .all_inner_texts(&self.room_titles)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect())
    }

    /// Follow "Book now" on the card whose text contains `room`
    pub async fn click_book_now_for_room(&self, room: &str) -> ProbeResult<()> {
        let card = self.room_cards.clone().has_text(room);
        let book_now = Locator::role("link", BOOK_NOW_BUTTON_TEXT).within(&card);
        tracing::info!(scenario = self.session.scenario(), room, "book now");
        self.session.click(&book_now).await
    }
}

#[async_trait]
impl PageObject for HomePage<'_> {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn ready_marker(&self) -> &Locator {
        &self.header
    }

    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &str {
        "HomePage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::constants::HOME_PAGE_HEADER;
    use crate::result::ProbeError;
    use crate::sim::SimulatedSite;
    use std::sync::Arc;
    use std::time::Duration;

    const BASE: &str = "https://sim.test/";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(site: SimulatedSite) -> Session {
        let mut config = SuiteConfig::default().with_base_url(BASE);
        config.timeouts.element_ms = 200;
        config.timeouts.poll_ms = 2;
        Session::new(Box::new(site), Arc::new(config), "home_tests")
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_header_and_loaded() {
            let session = session(SimulatedSite::new());
            let home = HomePage::new(&session);
            home.navigate(BASE).await.unwrap();
            assert_eq!(home.header_text().await.unwrap(), HOME_PAGE_HEADER);
            assert!(home.is_page_loaded().await.unwrap());
            assert!(home.is_current().await.unwrap());
        }

        #[tokio::test]
        async fn test_not_loaded_before_navigation() {
            let session = session(SimulatedSite::new());
            let home = HomePage::new(&session);
            assert!(!home.is_page_loaded().await.unwrap());
        }
    }

    mod search_tests {
        use super::*;

        #[tokio::test]
        async fn test_dates_read_back_as_written() {
            let session = session(SimulatedSite::new());
            let home = HomePage::new(&session);
            home.navigate(BASE).await.unwrap();
            home.enter_check_in(ymd(2027, 1, 5)).await.unwrap();
            home.enter_check_out(ymd(2027, 1, 9)).await.unwrap();
            assert_eq!(home.check_in_date().await.unwrap(), "05/01/2027");
            assert_eq!(home.check_out_date().await.unwrap(), "09/01/2027");
        }

        #[tokio::test]
        async fn test_search_lists_three_rooms_after_latency() {
            let site = SimulatedSite::builder()
                .latency(Duration::from_millis(20))
                .build();
            let session = session(site);
            let home = HomePage::new(&session);
            home.navigate(BASE).await.unwrap();
            home.enter_check_in(ymd(2027, 1, 5)).await.unwrap();
            home.enter_check_out(ymd(2027, 1, 9)).await.unwrap();
            home.click_check_availability().await.unwrap();
            assert_eq!(home.available_rooms().await.unwrap(), vec!["Single", "Double", "Suite"]);
        }

        #[tokio::test]
        async fn test_rooms_missing_without_search() {
            let session = session(SimulatedSite::new());
            let home = HomePage::new(&session);
            home.navigate(BASE).await.unwrap();
            let err = home.available_rooms().await.unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_book_now_opens_that_room() {
            let session = session(SimulatedSite::new());
            let home = HomePage::new(&session);
            home.navigate(BASE).await.unwrap();
            home.enter_check_in(ymd(2027, 1, 5)).await.unwrap();
            home.enter_check_out(ymd(2027, 1, 9)).await.unwrap();
            home.click_check_availability().await.unwrap();
            home.click_book_now_for_room("Double").await.unwrap();
            let url = session.current_url().await.unwrap();
            assert!(url.contains("/reservation/2"), "{url}");
            assert!(url.contains("checkin=2027-01-05"), "{url}");
            assert!(!home.is_current().await.unwrap());
        }
    }
}
