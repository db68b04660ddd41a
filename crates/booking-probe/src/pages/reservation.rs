//! Reservation page: room title, availability calendar, price summary,
//! guest form and the confirmation that replaces it.

use crate::calendar::{CalendarNavigator, MONTH_LABEL};
use crate::constants::{GuestDetails, RoomType, RESERVE_NOW_BUTTON_TEXT, RETURN_HOME_TEXT};
use crate::dates::parse_iso;
use crate::locator::Locator;
use crate::page_object::{query_params, PageObject, UrlMatcher};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::ElementState;
use async_trait::async_trait;
use chrono::NaiveDate;

const URL_PATTERN: &str = "/reservation/:room";

/// Page object for `/reservation/{room}`
#[derive(Debug)]
pub struct ReservationPage<'a> {
    session: &'a Session,
    title: Locator,
    month_label: Locator,
    selected_event: Locator,
    total_price: Locator,
    reserve: Locator,
    first_name: Locator,
    last_name: Locator,
    email: Locator,
    phone: Locator,
    reserve_now: Locator,
    alerts: Locator,
    confirmation: Locator,
    confirmation_dates: Locator,
    return_home: Locator,
}

impl<'a> ReservationPage<'a> {
    /// Page object over `session`
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            title: Locator::new("h1.fw-bold"),
            month_label: Locator::new(MONTH_LABEL),
            selected_event: Locator::new("div.rbc-event-content[title='Selected']").first(),
            total_price: Locator::new("div.card-body")
                .has_text("Total")
                .locator("div.fw-bold span")
                .last(),
            reserve: Locator::new("button#doReservation"),
            first_name: Locator::label("Firstname"),
            last_name: Locator::label("Lastname"),
            email: Locator::label("Email"),
            phone: Locator::label("Phone"),
            reserve_now: Locator::new("button").text_is(RESERVE_NOW_BUTTON_TEXT),
            alerts: Locator::new("div.alert li"),
            confirmation: Locator::new("h2.card-title.mb-3"),
            confirmation_dates: Locator::new("p.pt-2").first(),
            return_home: Locator::new("a.btn").has_text(RETURN_HOME_TEXT),
        }
    }

    /// Calendar navigator bound to this page's session
    #[must_use]
    pub fn calendar(&self) -> CalendarNavigator<'a> {
        CalendarNavigator::new(self.session)
    }

    /// Wait for the room title and the calendar
    pub async fn wait_for_reservation_page_to_load(&self) -> ProbeResult<()> {
        self.wait_until_loaded().await?;
        let _ = self
            .session
            .wait_for(&self.month_label, ElementState::Visible, None)
            .await?;
        Ok(())
    }

    /// Room title heading, trimmed
    pub async fn reservation_room_title(&self) -> ProbeResult<String> {
        Ok(self.session.inner_text(&self.title).await?.trim().to_string())
    }

    /// Room type named by the URL path
    pub async fn room(&self) -> ProbeResult<RoomType> {
        let url = self.session.current_url().await?;
        UrlMatcher::new(URL_PATTERN)
            .extract_params(&url)
            .get("room")
            .and_then(|id| id.parse().ok())
            .and_then(RoomType::from_room_id)
            .ok_or_else(|| ProbeError::page(format!("no room in {url}")))
    }

    /// Amount shown on the summary's "Total" row
    pub async fn total_price(&self) -> ProbeResult<String> {
        Ok(self.session.inner_text(&self.total_price).await?.trim().to_string())
    }

    /// Whether a "Selected" event is shown on the calendar
    pub async fn verify_selection_is_reflected(&self) -> ProbeResult<bool> {
        match self
            .session
            .wait_for(&self.selected_event, ElementState::Visible, None)
            .await
        {
            Ok(_) => Ok(true),
            Err(ProbeError::ElementNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check-in and check-out carried in the URL query
    pub async fn booked_range_from_url(&self) -> ProbeResult<(NaiveDate, NaiveDate)> {
        let url = self.session.current_url().await?;
        let params = query_params(&url);
        let read = |key: &str| {
            params
                .get(key)
                .ok_or_else(|| ProbeError::page(format!("no {key} in {url}")))
                .and_then(|value| parse_iso(value))
        };
        Ok((read("checkin")?, read("checkout")?))
    }

    // ------------------------------------------------------------------
    // Calendar
    // ------------------------------------------------------------------

    /// Page the calendar to `date`'s month
    pub async fn navigate_calendar_to_month(&self, date: NaiveDate) -> ProbeResult<()> {
        self.calendar().navigate_to_month(date).await
    }

    /// Whether `date` is bookable on the displayed month
    pub async fn is_day_available(&self, date: NaiveDate) -> ProbeResult<bool> {
        self.calendar().is_day_available(date).await
    }

    /// Click `date` on the displayed month
    pub async fn select_calendar_date(&self, date: NaiveDate) -> ProbeResult<()> {
        self.calendar().select_date(date).await
    }

    /// First bookable date among `candidates`
    pub async fn find_first_available_date(
        &self,
        candidates: &[NaiveDate],
    ) -> ProbeResult<NaiveDate> {
        self.calendar().find_first_available_date(candidates).await
    }

    // ------------------------------------------------------------------
    // Guest form
    // ------------------------------------------------------------------

    /// Open the guest form
    pub async fn click_reserve_button(&self) -> ProbeResult<()> {
        self.session.click(&self.reserve).await
    }

    /// Type the first name
    pub async fn enter_first_name(&self, value: &str) -> ProbeResult<()> {
        self.session.fill(&self.first_name, value).await
    }

    /// Type the last name
    pub async fn enter_last_name(&self, value: &str) -> ProbeResult<()> {
        self.session.fill(&self.last_name, value).await
    }

    /// Type the email
    pub async fn enter_email(&self, value: &str) -> ProbeResult<()> {
        self.session.fill(&self.email, value).await
    }

    /// Type the phone number
    pub async fn enter_phone_number(&self, value: &str) -> ProbeResult<()> {
        self.session.fill(&self.phone, value).await
    }

    /// Fill all four guest fields
    pub async fn fill_guest_form(&self, guest: &GuestDetails) -> ProbeResult<()> {
        self.enter_first_name(&guest.first_name).await?;
        self.enter_last_name(&guest.last_name).await?;
        self.enter_email(&guest.email).await?;
        self.enter_phone_number(&guest.phone).await
    }

    /// Submit the guest form
    pub async fn click_reserve_now(&self) -> ProbeResult<()> {
        self.session.click(&self.reserve_now).await
    }

    /// Validation messages in page order, once at least one is shown
    pub async fn alert_messages(&self) -> ProbeResult<Vec<String>> {
        let _ = self
            .session
            .wait_for(&self.alerts.clone().first(), ElementState::Visible, None)
            .await?;
        Ok(self
            .session
            .all_inner_texts(&self.alerts)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect())
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    /// Confirmation heading, once "Return home" is shown
    pub async fn booking_confirmation_message(&self) -> ProbeResult<String> {
        let _ = self
            .session
            .wait_for(&self.return_home, ElementState::Visible, None)
            .await?;
        Ok(self.session.inner_text(&self.confirmation).await?.trim().to_string())
    }

    /// Confirmed range as `"<check-in> - <check-out>"`
    pub async fn confirmation_dates(&self) -> ProbeResult<String> {
        Ok(self
            .session
            .inner_text(&self.confirmation_dates)
            .await?
            .trim()
            .to_string())
    }

    /// Leave the confirmation for the home page
    pub async fn click_return_to_home(&self) -> ProbeResult<()> {
        self.session.click(&self.return_home).await
    }
}

#[async_trait]
impl PageObject for ReservationPage<'_> {
    fn url_pattern(&self) -> &str {
        URL_PATTERN
    }

    fn ready_marker(&self) -> &Locator {
        &self.title
    }

    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &str {
        "ReservationPage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::constants::{
        expected_total, ALERT_PHONE_SIZE, BOOKING_CONFIRMED_MESSAGE, DOUBLE_ROOM_TITLE,
        EMPTY_FORM_ALERTS, INVALID_PHONE_TOO_LONG,
    };
    use crate::sim::SimulatedSite;
    use crate::wait::LoadState;
    use std::sync::Arc;

    const URL: &str = "https://sim.test/reservation/2?checkin=2027-03-05&checkout=2027-03-09";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn site() -> Arc<SimulatedSite> {
        Arc::new(SimulatedSite::builder().today(ymd(2026, 10, 17)).build())
    }

    async fn open(site: Arc<SimulatedSite>) -> Session {
        let mut config = SuiteConfig::default().with_base_url("https://sim.test/");
        config.timeouts.element_ms = 200;
        config.timeouts.poll_ms = 2;
        let session = Session::new(Box::new(site), Arc::new(config), "reservation_tests");
        session.goto(URL, LoadState::DomContentLoaded).await.unwrap();
        session
    }

    mod summary_tests {
        use super::*;

        #[tokio::test]
        async fn test_title_total_and_url_range() {
            let session = open(site()).await;
            let page = ReservationPage::new(&session);
            page.wait_for_reservation_page_to_load().await.unwrap();
            assert!(page.is_current().await.unwrap());
            assert_eq!(page.reservation_room_title().await.unwrap(), DOUBLE_ROOM_TITLE);
            assert_eq!(page.room().await.unwrap(), RoomType::Double);
            let total = page.total_price().await.unwrap();
            assert!(total.contains(&expected_total(RoomType::Double, 4).to_string()), "{total}");
            assert_eq!(page.calendar().shown_label().await.unwrap(), "October 2026");
            page.navigate_calendar_to_month(ymd(2027, 3, 5)).await.unwrap();
            assert!(page.verify_selection_is_reflected().await.unwrap());
            assert_eq!(
                page.booked_range_from_url().await.unwrap(),
                (ymd(2027, 3, 5), ymd(2027, 3, 9))
            );
        }

        #[tokio::test]
        async fn test_selection_hidden_until_calendar_reaches_it() {
            let session = open(site()).await;
            let page = ReservationPage::new(&session);
            page.wait_for_reservation_page_to_load().await.unwrap();
            assert!(!page.verify_selection_is_reflected().await.unwrap());
            page.navigate_calendar_to_month(ymd(2027, 3, 5)).await.unwrap();
            assert!(page.verify_selection_is_reflected().await.unwrap());
        }

        #[tokio::test]
        async fn test_no_selection_without_dates() {
            let site = site();
            let mut config = SuiteConfig::default();
            config.timeouts.element_ms = 50;
            config.timeouts.poll_ms = 2;
            let session = Session::new(Box::new(site), Arc::new(config), "no_dates");
            session
                .goto("https://sim.test/reservation/1", LoadState::Load)
                .await
                .unwrap();
            let page = ReservationPage::new(&session);
            assert!(!page.verify_selection_is_reflected().await.unwrap());
            assert!(matches!(
                page.booked_range_from_url().await.unwrap_err(),
                ProbeError::PageError { .. }
            ));
        }
    }

    mod calendar_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_first_available_day() {
            let site = Arc::new(
                SimulatedSite::builder()
                    .today(ymd(2026, 10, 17))
                    .booked([ymd(2027, 4, 10)])
                    .build(),
            );
            let session = open(site).await;
            let page = ReservationPage::new(&session);
            let candidates = [ymd(2027, 4, 10), ymd(2027, 4, 13)];
            let found = page.find_first_available_date(&candidates).await.unwrap();
            assert_eq!(found, ymd(2027, 4, 13));
            page.select_calendar_date(found).await.unwrap();
            assert!(page.is_day_available(found).await.unwrap());
            assert!(!page.is_day_available(ymd(2027, 4, 10)).await.unwrap());
            page.navigate_calendar_to_month(ymd(2027, 3, 1)).await.unwrap();
            assert_eq!(page.calendar().shown_label().await.unwrap(), "March 2027");
        }
    }

    mod guest_form_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_submit_shows_every_alert() {
            let session = open(site()).await;
            let page = ReservationPage::new(&session);
            page.click_reserve_button().await.unwrap();
            page.click_reserve_now().await.unwrap();
            let mut alerts = page.alert_messages().await.unwrap();
            let mut expected: Vec<String> = EMPTY_FORM_ALERTS.iter().map(|s| (*s).to_string()).collect();
            alerts.sort();
            expected.sort();
            assert_eq!(alerts, expected);
        }

        #[tokio::test]
        async fn test_oversized_phone_leaves_phone_alert() {
            let session = open(site()).await;
            let page = ReservationPage::new(&session);
            page.click_reserve_button().await.unwrap();
            page.fill_guest_form(&GuestDetails::fixture().with_phone(INVALID_PHONE_TOO_LONG))
                .await
                .unwrap();
            page.click_reserve_now().await.unwrap();
            assert_eq!(page.alert_messages().await.unwrap(), vec![ALERT_PHONE_SIZE]);
        }

        #[tokio::test]
        async fn test_valid_guest_confirms_booking() {
            let site = site();
            let session = open(site.clone()).await;
            let page = ReservationPage::new(&session);
            page.click_reserve_button().await.unwrap();
            page.fill_guest_form(&GuestDetails::fixture()).await.unwrap();
            page.click_reserve_now().await.unwrap();
            assert_eq!(
                page.booking_confirmation_message().await.unwrap(),
                BOOKING_CONFIRMED_MESSAGE
            );
            assert_eq!(page.confirmation_dates().await.unwrap(), "2027-03-05 - 2027-03-09");
            assert_eq!(site.booked_nights().unwrap().len(), 4);
            page.click_return_to_home().await.unwrap();
            assert_eq!(session.current_url().await.unwrap(), "https://sim.test/");
        }
    }
}
