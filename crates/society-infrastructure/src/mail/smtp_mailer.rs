// ============================================================================
// Society Infrastructure - SMTP Mailer
// File: crates/society-infrastructure/src/mail/smtp_mailer.rs
// ============================================================================

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use society_core::domain::OtpPurpose;
use society_core::error::DomainError;
use society_core::notifications::{InviteMessage, Mailer};
use society_shared::config::MailSettings;
use society_shared::utils::mask_email;

use super::templates::{MailTemplates, RenderedMail};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    templates: MailTemplates,
}

impl SmtpMailer {
    /// STARTTLS relay when credentials are configured, plain SMTP otherwise
    /// (local catchers such as MailHog).
    pub fn new(settings: &MailSettings, templates: MailTemplates) -> Result<Self, DomainError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| DomainError::ValidationError(format!("invalid mail.from: {}", e)))?;

        let transport = if settings.username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
                .port(settings.smtp_port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
                .map_err(|e| DomainError::DeliveryFailed(e.to_string()))?
                .port(settings.smtp_port)
                .credentials(Credentials::new(settings.username.clone(), settings.password.clone()))
                .build()
        };

        Ok(Self {
            transport,
            from,
            templates,
        })
    }

    async fn deliver(&self, to: &str, mail: RenderedMail) -> Result<(), DomainError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|e| DomainError::ValidationError(format!("invalid recipient: {}", e)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            error!("SMTP delivery to {} failed: {}", mask_email(to), e);
            DomainError::DeliveryFailed(e.to_string())
        })?;
        info!("Email sent to {}", mask_email(to));
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, to: &str, code: &str, purpose: OtpPurpose) -> Result<(), DomainError> {
        let mail = self.templates.otp(code, purpose)?;
        self.deliver(to, mail).await
    }

    async fn send_invite(&self, to: &str, message: &InviteMessage) -> Result<(), DomainError> {
        let mail = self.templates.invite(message)?;
        self.deliver(to, mail).await
    }
}
