//! Handlebars email bodies

use handlebars::Handlebars;
use serde_json::json;

use society_core::domain::OtpPurpose;
use society_core::error::DomainError;
use society_core::notifications::InviteMessage;

const OTP_TEMPLATE: &str = r#"<div style="font-family: sans-serif">
  <h2>{{heading}}</h2>
  <p>Your verification code is:</p>
  <p style="font-size: 28px; letter-spacing: 6px"><strong>{{code}}</strong></p>
  <p>It expires in {{expires_in_seconds}} seconds. If you did not request it, ignore this email.</p>
</div>"#;

const INVITE_TEMPLATE: &str = r#"<div style="font-family: sans-serif">
  <h2>You're invited to {{property_name}}</h2>
  <p>You have been invited to join as a <strong>{{role}}</strong>.</p>
  <p><a href="{{invite_link}}">Complete your registration</a></p>
  <p>This link expires in {{expires_in_minutes}} minutes.</p>
</div>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
}

pub struct MailTemplates {
    registry: Handlebars<'static>,
    otp_ttl_seconds: i64,
}

impl MailTemplates {
    pub fn new(otp_ttl_seconds: i64) -> Result<Self, DomainError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string("otp", OTP_TEMPLATE)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        registry
            .register_template_string("invite", INVITE_TEMPLATE)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        Ok(Self {
            registry,
            otp_ttl_seconds,
        })
    }

    pub fn otp(&self, code: &str, purpose: OtpPurpose) -> Result<RenderedMail, DomainError> {
        let (subject, heading) = match purpose {
            OtpPurpose::AdminRegistration => ("Verify your society admin account", "Admin registration"),
            OtpPurpose::InviteRegistration => ("Verify your email to accept the invite", "Accept your invitation"),
        };
        let html = self
            .registry
            .render(
                "otp",
                &json!({
                    "heading": heading,
                    "code": code,
                    "expires_in_seconds": self.otp_ttl_seconds,
                }),
            )
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        Ok(RenderedMail {
            subject: subject.to_string(),
            html,
        })
    }

    pub fn invite(&self, message: &InviteMessage) -> Result<RenderedMail, DomainError> {
        let html = self
            .registry
            .render(
                "invite",
                &json!({
                    "property_name": message.property_name,
                    "role": message.role.as_str(),
                    "invite_link": message.invite_link,
                    "expires_in_minutes": message.expires_in_minutes,
                }),
            )
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        Ok(RenderedMail {
            subject: format!("Invitation to join {}", message.property_name),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use society_core::domain::InviteRole;

    #[test]
    fn test_otp_subject_follows_purpose() {
        let templates = MailTemplates::new(60).unwrap();
        let admin = templates.otp("123456", OtpPurpose::AdminRegistration).unwrap();
        let invite = templates.otp("123456", OtpPurpose::InviteRegistration).unwrap();
        assert_ne!(admin.subject, invite.subject);
        assert!(admin.html.contains("123456"));
        assert!(admin.html.contains("60 seconds"));
    }

    #[test]
    fn test_invite_body_links_token() {
        let templates = MailTemplates::new(60).unwrap();
        let mail = templates
            .invite(&InviteMessage {
                invite_link: "http://localhost:5173/register?token=abc".into(),
                role: InviteRole::Guard,
                property_name: "Palm Villas".into(),
                expires_in_minutes: 15,
            })
            .unwrap();
        assert_eq!(mail.subject, "Invitation to join Palm Villas");
        assert!(mail.html.contains("register?token=abc"));
        assert!(mail.html.contains("guard"));
    }
}
