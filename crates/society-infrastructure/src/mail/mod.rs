//! Outbound email adapters

pub mod log_mailer;
pub mod smtp_mailer;
pub mod templates;

pub use log_mailer::LogMailer;
pub use smtp_mailer::SmtpMailer;
pub use templates::{MailTemplates, RenderedMail};
