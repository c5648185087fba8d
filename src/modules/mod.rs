//! Intent sets registered on the conversation client at startup.
//!
//! - common.rs: greeting, fallback, OTP, password reset, ticketing, journey, escalation
//! - covid_screen.rs: optional screening questionnaire
//! - appointment_booking.rs: optional calendar booking
//! - custom.rs: this deployment's own intents

pub mod appointment_booking;
pub mod common;
pub mod covid_screen;
pub mod custom;

pub use appointment_booking::register_module_appointment_booking;
pub use common::register_common_modules;
pub use covid_screen::register_module_covid_screen;
pub use custom::register_custom_intents;
