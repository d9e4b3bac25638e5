//! ICS export.
//!
//! Produces the RFC 5545 subset needed for "add to calendar" downloads.

mod generate;

pub use generate::{generate_ics, generate_ics_in};
