//! slotcheck - business hours and appointment slot validation
//!
//! Answers whether an instant falls inside a configured opening window in a
//! business timezone and lists the bookable slots for a day.

pub mod cli;
pub mod config;
pub mod instant;
pub mod shared;
pub mod time_of_day;
pub mod validator;
pub mod zone;

pub use config::{BusinessHoursConfig, ConfigUpdate};
pub use instant::AsInstant;
pub use time_of_day::TimeOfDay;
pub use validator::{BookingRejection, BusinessHoursValidator, TimeSlot};
