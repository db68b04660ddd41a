//! Offline stand-in for the booking site.
//!
//! [`SimulatedSite`] implements [`crate::driver::PageDriver`] over an arena
//! DOM rendered from in-memory state: room search, reservation calendar
//! with booked and selected nights, server-side guest validation and the
//! confirmation page.

pub mod dom;
mod site;

pub use dom::{Action, Dom, Field, Node, NodeId};
pub use site::{SimulatedSite, SimulatedSiteBuilder, UNAVAILABLE_EVENT_LABEL};
