//! Mailer used when SMTP is disabled: writes the message to the log instead.

use async_trait::async_trait;
use tracing::{debug, info};

use society_core::domain::OtpPurpose;
use society_core::error::DomainError;
use society_core::notifications::{InviteMessage, Mailer};
use society_shared::utils::mask_email;

use super::templates::MailTemplates;

pub struct LogMailer {
    templates: MailTemplates,
}

impl LogMailer {
    pub fn new(templates: MailTemplates) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, code: &str, purpose: OtpPurpose) -> Result<(), DomainError> {
        let mail = self.templates.otp(code, purpose)?;
        info!(purpose = purpose.as_str(), "Mail disabled; OTP for {} not sent", mask_email(to));
        debug!(subject = %mail.subject, code, "OTP mail body rendered");
        Ok(())
    }

    async fn send_invite(&self, to: &str, message: &InviteMessage) -> Result<(), DomainError> {
        let mail = self.templates.invite(message)?;
        info!(
            subject = %mail.subject,
            link = %message.invite_link,
            "Mail disabled; invite for {} not sent",
            mask_email(to)
        );
        Ok(())
    }
}
