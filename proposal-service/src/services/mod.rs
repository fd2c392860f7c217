//! Infrastructure services for proposal-service.

mod database;
mod mailer;
pub mod metrics;

pub use database::Database;
pub use mailer::{Mailer, MailerConfig};
pub use metrics::get_metrics;
