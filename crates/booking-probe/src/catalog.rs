//! The booking-site scenario catalog.

use crate::assertion::{AlertSet, Assertion};
use crate::constants::{
    expected_total, GuestDetails, RoomType, ALERT_EMAIL_BLANK, ALERT_FIRSTNAME_BLANK,
    ALERT_FIRSTNAME_SIZE, ALERT_LASTNAME_BLANK, ALERT_LASTNAME_SIZE, ALERT_PHONE_BLANK,
    ALERT_PHONE_SIZE, BOOKING_CONFIRMED_MESSAGE, DEFAULT_STAY_NIGHTS, DOUBLE_ROOM_TITLE,
    EMPTY_FORM_ALERTS, GUEST_EMAIL, GUEST_FIRST_NAME, GUEST_LAST_NAME, HOME_PAGE_HEADER,
    INVALID_PHONE_TOO_LONG,
};
use crate::dates::{self, format_display, format_iso, month_label};
use crate::page_object::PageObject;
use crate::pages::{HomePage, ReservationPage};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Group, Scenario};
use crate::session::Session;
use crate::wait::LoadState;
use chrono::{Days, NaiveDate};
use futures::future::BoxFuture;

/// Every scenario, in report order
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "TC_Home_Page_Loads",
            "Home page loads with the B&B header",
            &[Group::Smoke],
            home_page_loads,
        ),
        Scenario::new(
            "TC_Search_Lists_Rooms",
            "Availability search keeps the dates and lists every room",
            &[Group::Smoke, Group::Search],
            search_lists_rooms,
        ),
        Scenario::new(
            "TC_Book_Room_Success",
            "Book a double room for four nights",
            &[Group::Regression, Group::Booking],
            book_room_success,
        ),
        Scenario::new(
            "TC_Book_Room_Form_Validation",
            "Guest form reports and clears validation alerts field by field",
            &[Group::Regression, Group::Booking],
            book_room_form_validation,
        ),
        Scenario::new(
            "TC_Book_Room_Oversized_Phone",
            "Oversized phone number is the only rejected field",
            &[Group::Regression, Group::Booking],
            book_room_oversized_phone,
        ),
        Scenario::new(
            "TC_Calendar_Availability_Search",
            "Calendar finds and selects the first free candidate date",
            &[Group::Regression, Group::Calendar],
            calendar_availability_search,
        ),
    ]
}

/// `base` joined with an absolute `path`
fn site_url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

/// Check-out date `nights` after `check_in`
fn stay_end(check_in: NaiveDate, nights: u32) -> ProbeResult<NaiveDate> {
    check_in
        .checked_add_days(Days::new(u64::from(nights)))
        .ok_or_else(|| ProbeError::assertion(format!("no date {nights} nights after {check_in}")))
}

/// Search from the home page and follow `room`'s "Book now"
async fn open_reservation(
    session: &Session,
    room: RoomType,
    check_in: NaiveDate,
    nights: u32,
) -> ProbeResult<(NaiveDate, NaiveDate)> {
    let check_out = stay_end(check_in, nights)?;
    let home = HomePage::new(session);
    home.navigate(&session.config().base_url).await?;
    home.enter_check_in(check_in).await?;
    home.enter_check_out(check_out).await?;
    home.click_check_availability().await?;
    home.click_book_now_for_room(room.card_label()).await?;
    ReservationPage::new(session)
        .wait_for_reservation_page_to_load()
        .await?;
    tracing::debug!(%check_in, %check_out, %room, "reservation opened");
    Ok((check_in, check_out))
}

fn home_page_loads(session: &Session) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(session);
        home.navigate(&session.config().base_url).await?;
        Assertion::is_true(home.is_page_loaded().await?, "header not visible").check()?;
        Assertion::equals(HOME_PAGE_HEADER, home.header_text().await?.as_str())
            .context("header")
            .check()
    })
}

fn search_lists_rooms(session: &Session) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let check_in = dates::random_future_date();
        let check_out = stay_end(check_in, DEFAULT_STAY_NIGHTS)?;
        let home = HomePage::new(session);
        home.navigate(&session.config().base_url).await?;

        home.enter_check_in(check_in).await?;
        home.enter_check_out(check_out).await?;
        Assertion::equals(&format_display(check_in), &home.check_in_date().await?)
            .context("check-in read-back")
            .check()?;
        Assertion::equals(&format_display(check_out), &home.check_out_date().await?)
            .context("check-out read-back")
            .check()?;

        home.click_check_availability().await?;
        let rooms = home.available_rooms().await?;
        let expected: Vec<String> = RoomType::ALL
            .iter()
            .map(|r| r.card_label().to_string())
            .collect();
        Assertion::equals(&expected, &rooms).context("room titles").check()
    })
}

fn book_room_success(session: &Session) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let room = RoomType::Double;
        let (check_in, check_out) =
            open_reservation(session, room, dates::random_future_date(), DEFAULT_STAY_NIGHTS)
                .await?;
        let page = ReservationPage::new(session);
        page.navigate_calendar_to_month(check_in).await?;

        Assertion::equals(DOUBLE_ROOM_TITLE, page.reservation_room_title().await?.as_str())
            .context("room title")
            .check()?;
        Assertion::is_true(
            page.verify_selection_is_reflected().await?,
            "selected nights not shown on the calendar",
        )
        .check()?;
        Assertion::equals(&(check_in, check_out), &page.booked_range_from_url().await?)
            .context("dates in URL")
            .check()?;
        let total = expected_total(room, DEFAULT_STAY_NIGHTS).to_string();
        Assertion::contains(&page.total_price().await?, &total)
            .context("total price")
            .check()?;

        page.click_reserve_button().await?;
        page.fill_guest_form(&GuestDetails::fixture()).await?;
        page.click_reserve_now().await?;

        Assertion::equals(BOOKING_CONFIRMED_MESSAGE, page.booking_confirmation_message().await?.as_str())
            .context("confirmation")
            .check()?;
        let range = format!("{} - {}", format_iso(check_in), format_iso(check_out));
        Assertion::equals(&range, &page.confirmation_dates().await?)
            .context("confirmed dates")
            .check()
    })
}

/// Submit the form; the shown alerts must include `expected` and no
/// longer repeat any of the `cleared` messages
async fn expect_alerts(
    page: &ReservationPage<'_>,
    expected: &AlertSet,
    cleared: &[&str],
    step: &str,
) -> ProbeResult<()> {
    page.click_reserve_now().await?;
    let shown: AlertSet = page.alert_messages().await?.into_iter().collect();
    Assertion::includes_alerts(expected, &shown).context(step).check()?;
    Assertion::alerts_cleared(expected, &shown, cleared)
        .context(step)
        .check()
}

fn book_room_form_validation(session: &Session) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let _ = open_reservation(
            session,
            RoomType::Double,
            dates::random_future_date(),
            DEFAULT_STAY_NIGHTS,
        )
        .await?;
        let page = ReservationPage::new(session);
        page.click_reserve_button().await?;

        let mut expected: AlertSet = EMPTY_FORM_ALERTS.into_iter().collect();
        expect_alerts(&page, &expected, &[], "empty form").await?;

        page.enter_first_name(GUEST_FIRST_NAME).await?;
        let cleared = [ALERT_FIRSTNAME_BLANK, ALERT_FIRSTNAME_SIZE];
        expected = expected.without(&cleared);
        expect_alerts(&page, &expected, &cleared, "after first name").await?;

        page.enter_last_name(GUEST_LAST_NAME).await?;
        let cleared = [ALERT_LASTNAME_BLANK, ALERT_LASTNAME_SIZE];
        expected = expected.without(&cleared);
        expect_alerts(&page, &expected, &cleared, "after last name").await?;

        page.enter_email(GUEST_EMAIL).await?;
        expected = expected.without(&[ALERT_EMAIL_BLANK]);
        expect_alerts(&page, &expected, &[ALERT_EMAIL_BLANK], "after email").await?;

        page.enter_phone_number(INVALID_PHONE_TOO_LONG).await?;
        expected = expected.without(&[ALERT_PHONE_BLANK]);
        expect_alerts(&page, &expected, &[ALERT_PHONE_BLANK], "after oversized phone").await
    })
}

fn book_room_oversized_phone(session: &Session) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let _ = open_reservation(
            session,
            RoomType::Double,
            dates::random_future_date(),
            DEFAULT_STAY_NIGHTS,
        )
        .await?;
        let page = ReservationPage::new(session);
        page.click_reserve_button().await?;
        page.fill_guest_form(&GuestDetails::fixture().with_phone(INVALID_PHONE_TOO_LONG))
            .await?;
        page.click_reserve_now().await?;
        let shown: AlertSet = page.alert_messages().await?.into_iter().collect();
        let expected: AlertSet = [ALERT_PHONE_SIZE].into_iter().collect();
        Assertion::same_alerts(&expected, &shown)
            .context("alerts")
            .check()
    })
}

fn calendar_availability_search(session: &Session) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let room = RoomType::Double;
        let url = site_url(
            &session.config().base_url,
            &format!("/reservation/{}", room.room_id()),
        );
        session.goto(&url, LoadState::DomContentLoaded).await?;
        let page = ReservationPage::new(session);
        page.wait_for_reservation_page_to_load().await?;
        Assertion::is_true(page.is_current().await?, "not on a reservation page").check()?;

        let candidates = dates::shuffled_future_dates();
        let date = page.find_first_available_date(&candidates).await?;
        tracing::info!(scenario = session.scenario(), %date, "first available date");
        page.select_calendar_date(date).await?;

        Assertion::equals(&month_label(date), &page.calendar().shown_label().await?)
            .context("calendar month")
            .check()?;
        Assertion::is_true(
            page.is_day_available(date).await?,
            "selected day no longer reported available",
        )
        .check()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let scenarios = catalog();
        let ids: BTreeSet<_> = scenarios.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), scenarios.len());
        assert_eq!(scenarios.len(), 6);
        assert!(scenarios.iter().all(|s| s.id.starts_with("TC_")));
    }

    #[test]
    fn test_catalog_groups() {
        let scenarios = catalog();
        let smoke: Vec<_> = scenarios
            .iter()
            .filter(|s| s.in_group(Group::Smoke))
            .map(|s| s.id)
            .collect();
        assert_eq!(smoke, vec!["TC_Home_Page_Loads", "TC_Search_Lists_Rooms"]);
        assert_eq!(
            scenarios.iter().filter(|s| s.in_group(Group::Booking)).count(),
            3
        );
    }

    #[test]
    fn test_site_url() {
        assert_eq!(site_url("https://x.test/", "/reservation/2"), "https://x.test/reservation/2");
        assert_eq!(site_url("https://x.test", "/"), "https://x.test/");
    }

    #[test]
    fn test_progressive_alerts_end_at_phone_size() {
        let all: AlertSet = EMPTY_FORM_ALERTS.into_iter().collect();
        let after_first = all.without(&[ALERT_FIRSTNAME_BLANK, ALERT_FIRSTNAME_SIZE]);
        let after_last = after_first.without(&[ALERT_LASTNAME_BLANK, ALERT_LASTNAME_SIZE]);
        let after_email = after_last.without(&[ALERT_EMAIL_BLANK]);
        let after_phone = after_email.without(&[ALERT_PHONE_BLANK]);
        assert_eq!(
            [all.len(), after_first.len(), after_last.len(), after_email.len(), after_phone.len()],
            [7, 5, 3, 2, 1]
        );
        assert_eq!(after_phone, [ALERT_PHONE_SIZE].into_iter().collect());
    }
}
