//! SimulatedSite - in-process model of the booking site.
//!
//! Every query renders the current page state into a fresh [`Dom`] with
//! the same markup contract as the live site, so page objects and the
//! calendar navigator run unchanged against it.

use super::dom::{Action, Dom, Field, Node, NodeId};
use crate::constants::{
    GuestDetails, RoomType, ALERT_DATES_CONFLICT, ALERT_EMAIL_BLANK, ALERT_EMAIL_FORMAT,
    ALERT_FIRSTNAME_BLANK, ALERT_FIRSTNAME_SIZE, ALERT_LASTNAME_BLANK, ALERT_LASTNAME_SIZE,
    ALERT_PHONE_BLANK, ALERT_PHONE_SIZE, BOOKING_CONFIRMED_MESSAGE, BOOK_NOW_BUTTON_TEXT,
    CHECK_AVAILABILITY_BUTTON_TEXT, CLEANING_FEE, DATE_FORMAT, HOME_PAGE_HEADER,
    RESERVE_NOW_BUTTON_TEXT, RETURN_HOME_TEXT, SELECTED_EVENT_LABEL, SERVICE_FEE,
};
use crate::dates::{self, first_day_of_month, last_day_of_month, month_label};
use crate::driver::{ElementSnapshot, PageDriver, Screenshot};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Event label for nights that are already taken
pub const UNAVAILABLE_EVENT_LABEL: &str = "Unavailable";

/// 1×1 transparent PNG returned as the simulated screenshot
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Home,
    Reservation,
    Confirmation,
}

#[derive(Debug, Default)]
struct HomeState {
    check_in: String,
    check_out: String,
    search: Option<(NaiveDate, NaiveDate)>,
    results_ready_at: Option<Instant>,
}

#[derive(Debug)]
struct ReservationState {
    room: RoomType,
    shown_month: NaiveDate,
    pending_month: Option<(Instant, NaiveDate)>,
    selection: Option<(NaiveDate, NaiveDate)>,
    form_open: bool,
    guest: GuestDetails,
    alerts: Vec<String>,
}

#[derive(Debug)]
struct SiteState {
    page: Page,
    origin: String,
    url: String,
    home: HomeState,
    reservation: Option<ReservationState>,
    booked: BTreeSet<NaiveDate>,
    fully_booked: bool,
    today: NaiveDate,
    latency: Duration,
    calendar_clicks: usize,
    closed: bool,
}

impl SiteState {
    fn is_booked(&self, date: NaiveDate) -> bool {
        self.fully_booked || self.booked.contains(&date)
    }

    /// Apply renders whose latency has elapsed
    fn settle(&mut self) {
        let now = Instant::now();
        if let Some(res) = self.reservation.as_mut() {
            if let Some((at, month)) = res.pending_month {
                if now >= at {
                    res.shown_month = month;
                    res.pending_month = None;
                }
            }
        }
    }
}

/// Builder for [`SimulatedSite`]
#[derive(Debug, Clone)]
pub struct SimulatedSiteBuilder {
    today: NaiveDate,
    booked: BTreeSet<NaiveDate>,
    fully_booked: bool,
    latency: Duration,
}

impl Default for SimulatedSiteBuilder {
    fn default() -> Self {
        Self {
            today: dates::today(),
            booked: BTreeSet::new(),
            fully_booked: false,
            latency: Duration::ZERO,
        }
    }
}

impl SimulatedSiteBuilder {
    /// Date the site treats as today
    #[must_use]
    pub const fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Mark nights as already booked
    #[must_use]
    pub fn booked(mut self, nights: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.booked.extend(nights);
        self
    }

    /// Mark every night as booked
    #[must_use]
    pub const fn fully_booked(mut self) -> Self {
        self.fully_booked = true;
        self
    }

    /// Delay before search results and calendar pages render
    #[must_use]
    pub const fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build the site, parked on `about:blank`
    #[must_use]
    pub fn build(self) -> SimulatedSite {
        SimulatedSite {
            state: Mutex::new(SiteState {
                page: Page::Blank,
                origin: String::new(),
                url: "about:blank".to_string(),
                home: HomeState::default(),
                reservation: None,
                booked: self.booked,
                fully_booked: self.fully_booked,
                today: self.today,
                latency: self.latency,
                calendar_clicks: 0,
                closed: false,
            }),
        }
    }
}

/// In-process booking site implementing [`PageDriver`]
#[derive(Debug)]
pub struct SimulatedSite {
    state: Mutex<SiteState>,
}

impl Default for SimulatedSite {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSite {
    /// Site with no bookings and today's date
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a site
    #[must_use]
    pub fn builder() -> SimulatedSiteBuilder {
        SimulatedSiteBuilder::default()
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, SiteState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProbeError::page("simulated site state poisoned"))?;
        if state.closed {
            return Err(ProbeError::page("page has been closed"));
        }
        Ok(state)
    }

    /// Calendar Back/Next clicks since the site was built
    pub fn calendar_clicks(&self) -> ProbeResult<usize> {
        Ok(self.lock()?.calendar_clicks)
    }

    /// Nights booked so far, including ones made through the guest form
    pub fn booked_nights(&self) -> ProbeResult<Vec<NaiveDate>> {
        Ok(self.lock()?.booked.iter().copied().collect())
    }

    /// Month the reservation calendar currently shows
    pub fn shown_month(&self) -> ProbeResult<Option<NaiveDate>> {
        let mut state = self.lock()?;
        state.settle();
        Ok(state.reservation.as_ref().map(|r| r.shown_month))
    }

    fn render_current(&self) -> ProbeResult<Dom> {
        let mut state = self.lock()?;
        state.settle();
        Ok(render(&state))
    }
}

// ----------------------------------------------------------------------
// Navigation and actions
// ----------------------------------------------------------------------

/// Split `scheme://host/path?query` into origin, path and query
fn split_url(url: &str) -> Option<(String, String, String)> {
    let scheme_end = url.find("://")? + 3;
    let path_start = url[scheme_end..].find('/').map_or(url.len(), |i| scheme_end + i);
    let origin = url[..path_start].to_string();
    let rest = &url[path_start..];
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    let path = if path.is_empty() { "/" } else { path };
    Some((origin, path.to_string(), query.to_string()))
}

fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

fn open_url(state: &mut SiteState, url: &str) -> ProbeResult<()> {
    if url == "about:blank" {
        state.page = Page::Blank;
        state.url = url.to_string();
        return Ok(());
    }
    let (origin, path, query) = split_url(url).ok_or_else(|| ProbeError::NavigationError {
        url: url.to_string(),
        message: "not an absolute URL".to_string(),
    })?;
    state.origin = origin;
    state.url = url.to_string();

    if let Some(id) = path.strip_prefix("/reservation/") {
        let room = id
            .trim_end_matches('/')
            .parse::<u32>()
            .ok()
            .and_then(RoomType::from_room_id)
            .ok_or_else(|| ProbeError::NavigationError {
                url: url.to_string(),
                message: "404 room not found".to_string(),
            })?;
        let check_in = query_param(&query, "checkin").and_then(|d| dates::parse_iso(d).ok());
        let check_out = query_param(&query, "checkout").and_then(|d| dates::parse_iso(d).ok());
        let selection = match (check_in, check_out) {
            (Some(a), Some(b)) if a < b => Some((a, b)),
            _ => None,
        };
        let shown = first_day_of_month(state.today);
        state.page = Page::Reservation;
        state.reservation = Some(ReservationState {
            room,
            shown_month: shown,
            pending_month: None,
            selection,
            form_open: false,
            guest: GuestDetails::default(),
            alerts: Vec::new(),
        });
    } else {
        state.page = Page::Home;
        state.home = HomeState::default();
        state.reservation = None;
    }
    Ok(())
}

fn page_calendar(state: &mut SiteState, forward: bool) {
    let latency = state.latency;
    state.calendar_clicks += 1;
    let Some(res) = state.reservation.as_mut() else {
        return;
    };
    let base = res.pending_month.map_or(res.shown_month, |(_, m)| m);
    let next = if forward {
        base.checked_add_months(Months::new(1))
    } else {
        base.checked_sub_months(Months::new(1))
    };
    let Some(next) = next else {
        return;
    };
    if latency.is_zero() {
        res.shown_month = next;
    } else {
        res.pending_month = Some((Instant::now() + latency, next));
    }
}

/// Server-side bean validation of the guest form
fn guest_alerts(guest: &GuestDetails) -> Vec<&'static str> {
    let mut alerts = Vec::new();
    let len = |s: &str| s.chars().count();
    if guest.first_name.trim().is_empty() {
        alerts.push(ALERT_FIRSTNAME_BLANK);
    }
    if !(3..=18).contains(&len(&guest.first_name)) {
        alerts.push(ALERT_FIRSTNAME_SIZE);
    }
    if guest.last_name.trim().is_empty() {
        alerts.push(ALERT_LASTNAME_BLANK);
    }
    if !(3..=30).contains(&len(&guest.last_name)) {
        alerts.push(ALERT_LASTNAME_SIZE);
    }
    if guest.email.trim().is_empty() {
        alerts.push(ALERT_EMAIL_BLANK);
    } else if !is_well_formed_email(&guest.email) {
        alerts.push(ALERT_EMAIL_FORMAT);
    }
    if guest.phone.trim().is_empty() {
        alerts.push(ALERT_PHONE_BLANK);
    }
    if !(11..=21).contains(&len(&guest.phone)) {
        alerts.push(ALERT_PHONE_SIZE);
    }
    alerts
}

fn is_well_formed_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
        }
        None => false,
    }
}

fn submit_guest_form(state: &mut SiteState) {
    let Some(res) = state.reservation.as_ref() else {
        return;
    };
    let mut alerts: Vec<String> = guest_alerts(&res.guest).into_iter().map(str::to_string).collect();
    let selection = res.selection;
    if alerts.is_empty() {
        let conflict = match selection {
            Some((start, end)) => start
                .iter_days()
                .take_while(|d| *d < end)
                .any(|d| state.is_booked(d)),
            None => true,
        };
        if conflict {
            alerts.push(ALERT_DATES_CONFLICT.to_string());
        }
    }
    // The live API reports violations in no stable order
    alerts.sort();

    if alerts.is_empty() {
        if let Some((start, end)) = selection {
            state.booked.extend(start.iter_days().take_while(|d| *d < end));
        }
        state.page = Page::Confirmation;
    }
    if let Some(res) = state.reservation.as_mut() {
        res.alerts = alerts;
    }
}

fn perform(state: &mut SiteState, action: Action) -> ProbeResult<()> {
    match action {
        Action::Navigate(href) => {
            let url = if href.starts_with('/') {
                format!("{}{href}", state.origin)
            } else {
                href
            };
            open_url(state, &url)?;
        }
        Action::CheckAvailability => {
            let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok();
            state.home.search = match (parse(&state.home.check_in), parse(&state.home.check_out)) {
                (Some(a), Some(b)) if a < b => Some((a, b)),
                _ => None,
            };
            state.home.results_ready_at = Some(Instant::now() + state.latency);
        }
        Action::CalendarBack => page_calendar(state, false),
        Action::CalendarNext => page_calendar(state, true),
        Action::SelectDay(date) => {
            if let Some(res) = state.reservation.as_mut() {
                res.selection = date.checked_add_days(Days::new(1)).map(|end| (date, end));
            }
        }
        Action::OpenGuestForm => {
            if let Some(res) = state.reservation.as_mut() {
                res.form_open = true;
            }
        }
        Action::CancelGuestForm => {
            if let Some(res) = state.reservation.as_mut() {
                res.form_open = false;
                res.alerts.clear();
            }
        }
        Action::SubmitGuestForm => submit_guest_form(state),
    }
    Ok(())
}

fn write_field(state: &mut SiteState, field: Field, value: &str) {
    let value = value.to_string();
    match field {
        Field::CheckIn => state.home.check_in = value,
        Field::CheckOut => state.home.check_out = value,
        guest_field => {
            if let Some(res) = state.reservation.as_mut() {
                match guest_field {
                    Field::FirstName => res.guest.first_name = value,
                    Field::LastName => res.guest.last_name = value,
                    Field::Email => res.guest.email = value,
                    Field::Phone => res.guest.phone = value,
                    Field::CheckIn | Field::CheckOut => {}
                }
            }
        }
    }
}

// ----------------------------------------------------------------------
// Rendering
// ----------------------------------------------------------------------

fn render(state: &SiteState) -> Dom {
    let mut dom = Dom::new();
    if state.page == Page::Blank {
        let _ = dom.push(None, Node::el("body"));
        return dom;
    }
    let body = dom.push(None, Node::el("body"));
    render_navbar(&mut dom, body);
    match (state.page, state.reservation.as_ref()) {
        (Page::Reservation, Some(res)) => render_reservation(&mut dom, body, state, res),
        (Page::Confirmation, Some(res)) => render_confirmation(&mut dom, body, res),
        _ => render_home(&mut dom, body, state),
    }
    dom
}

fn render_navbar(dom: &mut Dom, body: NodeId) {
    let nav = dom.push(Some(body), Node::el("nav.navbar.navbar-expand-lg"));
    let container = dom.push(Some(nav), Node::el("div.container"));
    let _ = dom.push(
        Some(container),
        Node::el("a.navbar-brand")
            .attr("href", "/")
            .text(HOME_PAGE_HEADER)
            .on_click(Action::Navigate("/".to_string())),
    );
}

fn render_home(dom: &mut Dom, body: NodeId, state: &SiteState) {
    let section = dom.push(Some(body), Node::el("section#booking"));
    let card_body = dom.push(Some(section), Node::el("div.card-body"));
    let _ = dom.push(
        Some(card_body),
        Node::el("h3.card-title").text("Check Availability & Book Your Stay"),
    );
    let row = dom.push(Some(card_body), Node::el("div.row"));
    for (id, text, field, value) in [
        ("checkin", "Check In", Field::CheckIn, &state.home.check_in),
        ("checkout", "Check Out", Field::CheckOut, &state.home.check_out),
    ] {
        let col = dom.push(Some(row), Node::el("div.col-md-6"));
        let _ = dom.push(Some(col), Node::el("label.form-label").attr("for", id).text(text));
        let wrapper = dom.push(Some(col), Node::el("div.react-datepicker-wrapper"));
        let _ = dom.push(
            Some(wrapper),
            Node::el("input.form-control")
                .attr("type", "text")
                .attr("id", id)
                .bind(field, value),
        );
    }
    let _ = dom.push(
        Some(card_body),
        Node::el("button.btn.btn-primary.w-100")
            .attr("type", "button")
            .text(CHECK_AVAILABILITY_BUTTON_TEXT)
            .on_click(Action::CheckAvailability),
    );

    let rooms = dom.push(Some(body), Node::el("section#rooms"));
    let grid = dom.push(Some(rooms), Node::el("div.row"));
    let ready = state
        .home
        .results_ready_at
        .is_some_and(|at| Instant::now() >= at);
    if !ready {
        return;
    }
    let query = state.home.search.map_or_else(String::new, |(a, b)| {
        format!("?checkin={}&checkout={}", dates::format_iso(a), dates::format_iso(b))
    });
    for room in RoomType::ALL {
        let col = dom.push(Some(grid), Node::el("div.col-md-6.col-lg-4"));
        let card = dom.push(Some(col), Node::el("div.card.h-100.shadow-sm.room-card"));
        let inner = dom.push(Some(card), Node::el("div.card-body"));
        let _ = dom.push(Some(inner), Node::el("h5.card-title").text(room.card_label()));
        let _ = dom.push(
            Some(inner),
            Node::el("p.card-text").text(format!("A comfortable {} room.", room.card_label().to_lowercase())),
        );
        let footer = dom.push(Some(card), Node::el("div.card-footer"));
        let price = dom.push(
            Some(footer),
            Node::el("div.fw-bold.fs-5").text(format!("£{}", room.price_per_night())),
        );
        let _ = dom.push(Some(price), Node::el("small").text(" per night"));
        let href = format!("/reservation/{}{query}", room.room_id());
        let _ = dom.push(
            Some(footer),
            Node::el("a.btn.btn-primary")
                .attr("href", href.clone())
                .text(BOOK_NOW_BUTTON_TEXT)
                .on_click(Action::Navigate(href)),
        );
    }
}

fn render_reservation(dom: &mut Dom, body: NodeId, state: &SiteState, res: &ReservationState) {
    let container = dom.push(Some(body), Node::el("div.container"));
    let _ = dom.push(Some(container), Node::el("h1.fw-bold").text(res.room.title()));
    let card = dom.push(Some(container), Node::el("div.card.booking-card"));
    let card_body = dom.push(Some(card), Node::el("div.card-body"));
    let _ = dom.push(Some(card_body), Node::el("h2.card-title").text("Book This Room"));

    render_calendar(dom, card_body, state, res);

    let nights = res
        .selection
        .map_or(0, |(a, b)| dates::nights_between(a, b).max(0) as u32);
    let nightly = res.room.price_per_night();
    let summary = dom.push(Some(card_body), Node::el("div.mt-4"));
    for (label, amount) in [
        (format!("£{nightly} x {nights} nights"), nightly * nights),
        ("Cleaning fee".to_string(), CLEANING_FEE),
        ("Service fee".to_string(), SERVICE_FEE),
    ] {
        let line = dom.push(Some(summary), Node::el("div.d-flex.justify-content-between"));
        let _ = dom.push(Some(line), Node::el("span").text(label));
        let _ = dom.push(Some(line), Node::el("span").text(format!("£{amount}")));
    }
    let total = dom.push(
        Some(summary),
        Node::el("div.d-flex.justify-content-between.fw-bold"),
    );
    let _ = dom.push(Some(total), Node::el("span").text("Total"));
    let _ = dom.push(
        Some(total),
        Node::el("span").text(format!("£{}", nightly * nights + CLEANING_FEE + SERVICE_FEE)),
    );

    if res.form_open {
        let form = dom.push(Some(card_body), Node::el("form.booking-form"));
        for (placeholder, field, value) in [
            ("Firstname", Field::FirstName, &res.guest.first_name),
            ("Lastname", Field::LastName, &res.guest.last_name),
            ("Email", Field::Email, &res.guest.email),
            ("Phone", Field::Phone, &res.guest.phone),
        ] {
            let group = dom.push(Some(form), Node::el("div.input-group.mb-3"));
            let _ = dom.push(
                Some(group),
                Node::el("input.form-control")
                    .attr("type", "text")
                    .attr("aria-label", placeholder)
                    .attr("placeholder", placeholder)
                    .bind(field, value),
            );
        }
        let _ = dom.push(
            Some(form),
            Node::el("button.btn.btn-primary.w-100.mb-3")
                .attr("type", "button")
                .text(RESERVE_NOW_BUTTON_TEXT)
                .on_click(Action::SubmitGuestForm),
        );
        let _ = dom.push(
            Some(form),
            Node::el("button.btn.btn-secondary.w-100")
                .attr("type", "button")
                .text("Cancel")
                .on_click(Action::CancelGuestForm),
        );
        if !res.alerts.is_empty() {
            let alert = dom.push(Some(form), Node::el("div.alert.alert-danger"));
            let list = dom.push(Some(alert), Node::el("ul"));
            for message in &res.alerts {
                let _ = dom.push(Some(list), Node::el("li").text(message.clone()));
            }
        }
    } else {
        let _ = dom.push(
            Some(card_body),
            Node::el("button#doReservation.btn.btn-primary.w-100")
                .attr("type", "button")
                .text(RESERVE_NOW_BUTTON_TEXT)
                .on_click(Action::OpenGuestForm),
        );
    }
}

fn render_calendar(dom: &mut Dom, parent: NodeId, state: &SiteState, res: &ReservationState) {
    let calendar = dom.push(Some(parent), Node::el("div.rbc-calendar"));
    let toolbar = dom.push(Some(calendar), Node::el("div.rbc-toolbar"));
    let group = dom.push(Some(toolbar), Node::el("span.rbc-btn-group"));
    let _ = dom.push(
        Some(group),
        Node::el("button").attr("type", "button").text("Back").on_click(Action::CalendarBack),
    );
    let _ = dom.push(
        Some(group),
        Node::el("button").attr("type", "button").text("Next").on_click(Action::CalendarNext),
    );
    let _ = dom.push(
        Some(toolbar),
        Node::el("span.rbc-toolbar-label").text(month_label(res.shown_month)),
    );

    let view = dom.push(Some(calendar), Node::el("div.rbc-month-view"));
    let first = res.shown_month;
    let last = last_day_of_month(first);
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = u64::from(6 - last.weekday().num_days_from_sunday());
    let (Some(start), Some(end)) = (
        first.checked_sub_days(Days::new(lead)),
        last.checked_add_days(Days::new(trail)),
    ) else {
        return;
    };

    let mut row = None;
    for (i, day) in start.iter_days().take_while(|d| *d <= end).enumerate() {
        if i % 7 == 0 {
            row = Some(dom.push(Some(view), Node::el("div.rbc-month-row")));
        }
        let mut class = "rbc-date-cell".to_string();
        if day.month() != first.month() {
            class.push_str(" rbc-off-range");
        }
        if day == state.today {
            class.push_str(" rbc-now");
        }
        let cell = dom.push(
            row,
            Node::el("div").attr("class", class).on_click(Action::SelectDay(day)),
        );
        let _ = dom.push(
            Some(cell),
            Node::el("button.rbc-button-link").text(format!("{:02}", day.day())),
        );
        if state.is_booked(day) {
            event(dom, cell, UNAVAILABLE_EVENT_LABEL);
        }
        if res.selection.is_some_and(|(a, b)| day >= a && day < b) {
            event(dom, cell, SELECTED_EVENT_LABEL);
        }
    }
}

fn event(dom: &mut Dom, cell: NodeId, label: &str) {
    let ev = dom.push(Some(cell), Node::el("div.rbc-event"));
    let _ = dom.push(
        Some(ev),
        Node::el("div.rbc-event-content").attr("title", label).text(label),
    );
}

fn render_confirmation(dom: &mut Dom, body: NodeId, res: &ReservationState) {
    let container = dom.push(Some(body), Node::el("div.container"));
    let card = dom.push(Some(container), Node::el("div.card"));
    let card_body = dom.push(Some(card), Node::el("div.card-body.text-center"));
    let _ = dom.push(
        Some(card_body),
        Node::el("h2.card-title.mb-3").text(BOOKING_CONFIRMED_MESSAGE),
    );
    let _ = dom.push(
        Some(card_body),
        Node::el("p").text("Your booking has been confirmed for the following dates:"),
    );
    let dates_text = res.selection.map_or_else(String::new, |(a, b)| {
        format!("{} - {}", dates::format_iso(a), dates::format_iso(b))
    });
    let _ = dom.push(Some(card_body), Node::el("p.pt-2").text(dates_text));
    let _ = dom.push(
        Some(card_body),
        Node::el("a.btn.btn-primary")
            .attr("href", "/")
            .text(RETURN_HOME_TEXT)
            .on_click(Action::Navigate("/".to_string())),
    );
}

// ----------------------------------------------------------------------
// Driver seam
// ----------------------------------------------------------------------

impl SimulatedSite {
    fn first_match(&self, locator: &Locator) -> ProbeResult<(Dom, NodeId)> {
        let dom = self.render_current()?;
        let id = dom
            .resolve(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: locator.to_string(),
                ms: 0,
            })?;
        Ok((dom, id))
    }
}

#[async_trait]
impl PageDriver for SimulatedSite {
    async fn navigate(&self, url: &str, _until: LoadState) -> ProbeResult<()> {
        let mut state = self.lock()?;
        open_url(&mut state, url)
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock()?.url.clone())
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        let dom = self.render_current()?;
        Ok(dom
            .resolve(locator)?
            .into_iter()
            .map(|id| dom.snapshot(id))
            .collect())
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let (dom, id) = self.first_match(locator)?;
        // Clicks bubble to the nearest ancestor with a handler
        let action = std::iter::successors(Some(id), |&n| dom.parent(n))
            .find_map(|n| dom.node(n).action.clone());
        match action {
            Some(action) => {
                let mut state = self.lock()?;
                perform(&mut state, action)
            }
            None => Ok(()),
        }
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let (dom, id) = self.first_match(locator)?;
        let field = dom.node(id).field.ok_or_else(|| {
            ProbeError::page(format!("{locator} is not an <input>, <textarea> or <select>"))
        })?;
        let mut state = self.lock()?;
        write_field(&mut state, field, value);
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        drop(self.lock()?);
        Ok(Screenshot::new(BLANK_PNG.to_vec()))
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProbeError::page("simulated site state poisoned"))?;
        state.closed = true;
        Ok(())
    }
}
