//! Transactional email: message builders and the log-backed mailer.

pub mod log;
pub mod templates;

pub use log::LogMailer;
