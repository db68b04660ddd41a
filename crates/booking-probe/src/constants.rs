//! Expected values the scenarios assert against.
//!
//! If the site changes pricing or copy, only this module needs updating.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------- URLs ----------

/// Entry page of the site under test
pub const HOME_PAGE_URL: &str = "https://automationintesting.online/";

// ---------- Pricing ----------

/// Single room nightly rate
pub const SINGLE_ROOM_PRICE_PER_NIGHT: u32 = 100;
/// Double room nightly rate
pub const DOUBLE_ROOM_PRICE_PER_NIGHT: u32 = 150;
/// Suite nightly rate
pub const SUITE_ROOM_PRICE_PER_NIGHT: u32 = 200;
/// Flat cleaning fee per booking
pub const CLEANING_FEE: u32 = 25;
/// Flat service fee per booking
pub const SERVICE_FEE: u32 = 15;

/// Nights booked by the booking scenarios
pub const DEFAULT_STAY_NIGHTS: u32 = 4;

// ---------- Guest details ----------

/// Guest first name
pub const GUEST_FIRST_NAME: &str = "John";
/// Guest last name
pub const GUEST_LAST_NAME: &str = "Doe";
/// Guest email
pub const GUEST_EMAIL: &str = "JohnDoe@cba.com";
/// Guest phone
pub const GUEST_PHONE: &str = "56345678910";

// ---------- Invalid data ----------

/// 31-character phone number, over the 21-character limit
pub const INVALID_PHONE_TOO_LONG: &str = "5634567891010291029102910291029";

// ---------- Expected UI text ----------

/// Navbar brand text
pub const HOME_PAGE_HEADER: &str = "Shady Meadows B&B";
/// Confirmation heading
pub const BOOKING_CONFIRMED_MESSAGE: &str = "Booking Confirmed";
/// Reservation title for the double room
pub const DOUBLE_ROOM_TITLE: &str = "Double Room";
/// Accessible name of the search button
pub const CHECK_AVAILABILITY_BUTTON_TEXT: &str = "Check Availability";
/// Accessible name of a room card's booking link
pub const BOOK_NOW_BUTTON_TEXT: &str = "Book now";
/// Text of the guest-form submit button
pub const RESERVE_NOW_BUTTON_TEXT: &str = "Reserve Now";
/// Text of the confirmation page's home link
pub const RETURN_HOME_TEXT: &str = "Return home";
/// Event label the calendar shows for the user's own selection
pub const SELECTED_EVENT_LABEL: &str = "Selected";

// ---------- Date formats (chrono) ----------

/// Search form format (`dd/MM/yyyy`)
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Confirmation and URL format (`yyyy-MM-dd`)
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
/// Calendar month label format (`MMMM yyyy`)
pub const MONTH_LABEL_FORMAT: &str = "%B %Y";

// ---------- Validation alert messages ----------

/// First name missing
pub const ALERT_FIRSTNAME_BLANK: &str = "Firstname should not be blank";
/// First name length outside 3..=18
pub const ALERT_FIRSTNAME_SIZE: &str = "size must be between 3 and 18";
/// Last name missing
pub const ALERT_LASTNAME_BLANK: &str = "Lastname should not be blank";
/// Last name length outside 3..=30
pub const ALERT_LASTNAME_SIZE: &str = "size must be between 3 and 30";
/// Email missing
pub const ALERT_EMAIL_BLANK: &str = "must not be empty";
/// Email present but malformed
pub const ALERT_EMAIL_FORMAT: &str = "must be a well-formed email address";
/// Phone missing
pub const ALERT_PHONE_BLANK: &str = "must not be empty";
/// Phone length outside 11..=21
pub const ALERT_PHONE_SIZE: &str = "size must be between 11 and 21";

/// Valid guest details but the nights overlap an existing booking
pub const ALERT_DATES_CONFLICT: &str = "The room dates are either invalid or are already booked for one or more of the dates that you have selected.";

/// Alerts shown for an entirely empty guest form
pub const EMPTY_FORM_ALERTS: [&str; 7] = [
    ALERT_FIRSTNAME_BLANK,
    ALERT_FIRSTNAME_SIZE,
    ALERT_LASTNAME_BLANK,
    ALERT_LASTNAME_SIZE,
    ALERT_EMAIL_BLANK,
    ALERT_PHONE_BLANK,
    ALERT_PHONE_SIZE,
];

/// Bookable room types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Single room
    Single,
    /// Double room
    Double,
    /// Suite
    Suite,
}

impl RoomType {
    /// Every room type in listing order
    pub const ALL: [Self; 3] = [Self::Single, Self::Double, Self::Suite];

    /// Name shown on the search-result card
    #[must_use]
    pub const fn card_label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Suite => "Suite",
        }
    }

    /// Title shown on the reservation page
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Single => "Single Room",
            Self::Double => DOUBLE_ROOM_TITLE,
            Self::Suite => "Suite Room",
        }
    }

    /// Nightly rate
    #[must_use]
    pub const fn price_per_night(self) -> u32 {
        match self {
            Self::Single => SINGLE_ROOM_PRICE_PER_NIGHT,
            Self::Double => DOUBLE_ROOM_PRICE_PER_NIGHT,
            Self::Suite => SUITE_ROOM_PRICE_PER_NIGHT,
        }
    }

    /// Path segment the site uses in `/reservation/{id}`
    #[must_use]
    pub const fn room_id(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Suite => 3,
        }
    }

    /// Look up a room by its card label
    #[must_use]
    pub fn from_card_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.card_label().eq_ignore_ascii_case(label.trim()))
    }

    /// Look up a room by its reservation path id
    #[must_use]
    pub fn from_room_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.room_id() == id)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.card_label())
    }
}

/// Total the site must show for a stay: nightly rate × nights plus the
/// flat cleaning and service fees
#[must_use]
pub const fn expected_total(room: RoomType, nights: u32) -> u32 {
    room.price_per_night() * nights + CLEANING_FEE + SERVICE_FEE
}

/// Guest details entered on the reservation form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuestDetails {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email
    pub email: String,
    /// Phone
    pub phone: String,
}

impl GuestDetails {
    /// The standard guest fixture
    #[must_use]
    pub fn fixture() -> Self {
        Self {
            first_name: GUEST_FIRST_NAME.to_string(),
            last_name: GUEST_LAST_NAME.to_string(),
            email: GUEST_EMAIL.to_string(),
            phone: GUEST_PHONE.to_string(),
        }
    }

    /// Replace the phone number
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_room_four_nights_total() {
        assert_eq!(expected_total(RoomType::Double, 4), 640);
        assert_eq!(expected_total(RoomType::Single, 1), 140);
        assert_eq!(expected_total(RoomType::Suite, 0), 40);
    }

    #[test]
    fn test_invalid_phone_is_31_chars() {
        assert_eq!(INVALID_PHONE_TOO_LONG.len(), 31);
        assert!(INVALID_PHONE_TOO_LONG.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_guest_phone_within_limits() {
        assert!((11..=21).contains(&GUEST_PHONE.len()));
    }

    #[test]
    fn test_room_lookup() {
        assert_eq!(RoomType::from_card_label(" double "), Some(RoomType::Double));
        assert_eq!(RoomType::from_card_label("Penthouse"), None);
        assert_eq!(RoomType::from_room_id(3), Some(RoomType::Suite));
        assert_eq!(RoomType::Double.title(), "Double Room");
        assert_eq!(RoomType::Suite.to_string(), "Suite");
    }

    #[test]
    fn test_empty_form_alerts_has_duplicate_empty_message() {
        let empties = EMPTY_FORM_ALERTS
            .iter()
            .filter(|a| **a == "must not be empty")
            .count();
        assert_eq!(empties, 2);
    }

    #[test]
    fn test_fixture() {
        let guest = GuestDetails::fixture().with_phone(INVALID_PHONE_TOO_LONG);
        assert_eq!(guest.first_name, "John");
        assert_eq!(guest.phone.len(), 31);
    }
}
