//! Page objects for the booking site.
//!
//! Each page object borrows the scenario's [`crate::session::Session`] and
//! owns the locators for one page. There is exactly one page object per
//! page; scenarios compose them in order.

mod home;
mod reservation;

pub use home::HomePage;
pub use reservation::ReservationPage;
