// ============================================================================
// Society Core - Registration Orchestrator
// File: crates/society-core/src/services/registration.rs
// ============================================================================
//! End-to-end onboarding: invite issuance, OTP request, and account creation.
//!
//! An invite registration moves `FormPending -> OtpRequested -> OtpVerified ->
//! AccountCreated`; any error is terminal for that attempt. Role, unit, and
//! property always come from the decoded invite token, never from the form.

use std::sync::Arc;

use society_security::PasswordService;
use society_shared::utils::{mask_email, normalize_email};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Account, HousingType, InviteRecord, InviteRole, OtpPurpose, Property, Role};
use crate::error::DomainError;
use crate::notifications::{InviteMessage, Mailer};
use crate::repositories::{AccountRepository, PropertyRepository};
use crate::services::invite_ledger::InviteLedger;
use crate::services::invite_token::{InviteClaims, InviteTokenCodec};
use crate::services::otp_ledger::OtpLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    FormPending,
    OtpRequested,
    OtpVerified,
    AccountCreated,
}

/// Invite acceptance form.
#[derive(Debug, Clone)]
pub struct InviteAcceptance {
    pub token: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub phone: Option<String>,
    pub otp: String,
}

/// Admin sign-up form; creates the admin and the property together.
#[derive(Debug, Clone)]
pub struct AdminRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub society_name: String,
    pub society_address: String,
    pub housing_type: HousingType,
    pub otp: String,
}

#[derive(Debug, Clone)]
pub struct IssuedInvite {
    pub record: InviteRecord,
    pub token: String,
    pub invite_link: String,
    pub expires_in_minutes: i64,
}

pub struct RegistrationOrchestrator {
    otp_ledger: Arc<OtpLedger>,
    codec: Arc<InviteTokenCodec>,
    invites: Arc<InviteLedger>,
    account_repo: Arc<dyn AccountRepository>,
    property_repo: Arc<dyn PropertyRepository>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl RegistrationOrchestrator {
    pub fn new(
        otp_ledger: Arc<OtpLedger>,
        codec: Arc<InviteTokenCodec>,
        invites: Arc<InviteLedger>,
        account_repo: Arc<dyn AccountRepository>,
        property_repo: Arc<dyn PropertyRepository>,
        mailer: Arc<dyn Mailer>,
        frontend_url: String,
    ) -> Self {
        Self {
            otp_ledger,
            codec,
            invites,
            account_repo,
            property_repo,
            mailer,
            frontend_url,
        }
    }

    fn normalized(email: &str) -> Result<String, DomainError> {
        normalize_email(email).ok_or_else(|| DomainError::ValidationError("Valid email is required".into()))
    }

    async fn ensure_no_account(&self, email: &str) -> Result<(), DomainError> {
        if self.account_repo.find_by_email(email).await?.is_some() {
            warn!("Registration blocked: account exists for {}", mask_email(email));
            return Err(DomainError::AccountExists(email.to_string()));
        }
        Ok(())
    }

    /// Issue and send are one step: when delivery fails the code is revoked so
    /// no entry exists that the user could never receive.
    async fn deliver_otp(&self, email: &str, purpose: OtpPurpose) -> Result<(), DomainError> {
        let code = self.otp_ledger.issue(email, purpose).await?;
        if let Err(e) = self.mailer.send_otp(email, &code, purpose).await {
            error!("OTP delivery to {} failed: {}", mask_email(email), e);
            if let Err(revoke_err) = self.otp_ledger.revoke(email, purpose).await {
                error!("Failed to revoke undelivered OTP: {}", revoke_err);
            }
            return Err(match e {
                DomainError::DeliveryFailed(_) => e,
                other => DomainError::DeliveryFailed(other.to_string()),
            });
        }
        Ok(())
    }

    fn decode_for(&self, token: &str, email: &str) -> Result<InviteClaims, DomainError> {
        let claims = self.codec.decode(token)?;
        if claims.email != email {
            return Err(DomainError::EmailMismatch);
        }
        Ok(claims)
    }

    // ------------------------------------------------------------------------
    // Invites
    // ------------------------------------------------------------------------

    /// Records an invite and mints its link. The invitation email is best
    /// effort; the link is returned either way.
    pub async fn issue_invite(
        &self,
        property_id: &Uuid,
        admin_id: &Uuid,
        email: &str,
        role: InviteRole,
        target_unit: Option<&str>,
    ) -> Result<IssuedInvite, DomainError> {
        let record = self
            .invites
            .create_invite(property_id, admin_id, email, role, target_unit)
            .await?;

        let token = self.codec.encode(&InviteClaims {
            role: record.role,
            property_id: *property_id,
            email: record.email.clone(),
            target_unit: record.target_unit.clone(),
        })?;
        let invite_link = format!(
            "{}/register?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        );
        let expires_in_minutes = self.codec.ttl().num_minutes();

        let property_name = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_default();
        let message = InviteMessage {
            invite_link: invite_link.clone(),
            role: record.role,
            property_name,
            expires_in_minutes,
        };
        if let Err(e) = self.mailer.send_invite(&record.email, &message).await {
            warn!("Invite email to {} not sent: {}", mask_email(&record.email), e);
        }

        Ok(IssuedInvite {
            record,
            token,
            invite_link,
            expires_in_minutes,
        })
    }

    /// `FormPending -> OtpRequested` for an invitee.
    pub async fn request_invite_otp(&self, token: &str, email: &str) -> Result<String, DomainError> {
        let email = Self::normalized(email)?;
        let claims = self.decode_for(token, &email).map_err(|e| {
            warn!("Invite OTP refused for {}: {}", mask_email(&email), e);
            e
        })?;
        self.ensure_no_account(&email).await?;
        self.deliver_otp(&email, OtpPurpose::InviteRegistration).await?;

        info!(
            stage = ?RegistrationStage::OtpRequested,
            property_id = %claims.property_id,
            "Invite OTP sent to {}",
            mask_email(&email)
        );
        Ok(email)
    }

    /// `OtpRequested -> OtpVerified -> AccountCreated`.
    pub async fn complete_registration(&self, input: InviteAcceptance) -> Result<Account, DomainError> {
        let mut stage = RegistrationStage::FormPending;
        match self.try_complete(input, &mut stage).await {
            Ok(account) => Ok(account),
            Err(e) => {
                warn!(stage = ?stage, code = e.code(), "Invite registration failed: {}", e);
                Err(e)
            }
        }
    }

    async fn try_complete(
        &self,
        input: InviteAcceptance,
        stage: &mut RegistrationStage,
    ) -> Result<Account, DomainError> {
        let email = Self::normalized(&input.email)?;

        // 1. Claims come from the token only
        let claims = self.decode_for(&input.token, &email)?;
        PasswordService::check_strength(&input.password)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        *stage = RegistrationStage::OtpRequested;

        // 2. Fail on a consumed invite or existing account before spending the code
        self.invites
            .find_outstanding(&claims.property_id, &email, claims.role)
            .await?;
        self.ensure_no_account(&email).await?;

        // 3. Proof of email control
        self.otp_ledger
            .verify(&email, OtpPurpose::InviteRegistration, &input.otp)
            .await?;
        *stage = RegistrationStage::OtpVerified;

        // 4. Create the account from token claims
        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let assigned_unit = match claims.role {
            InviteRole::Tenant => claims.target_unit.clone(),
            InviteRole::Guard => None,
        };
        let account = Account::new(
            input.name,
            email.clone(),
            claims.role.into(),
            password_hash,
            Some(claims.property_id),
            assigned_unit,
        )?
        .with_phone(input.phone);
        let created = self.account_repo.create(&account).await?;

        // 5. Mark the invite used; undo the account if that write fails
        if let Err(e) = self
            .invites
            .consume(&claims.property_id, &email, claims.role)
            .await
        {
            error!("Invite consume failed after account {} was created: {}", created.id, e);
            if let Err(delete_err) = self.account_repo.delete(&created.id).await {
                error!("Failed to remove orphaned account {}: {}", created.id, delete_err);
            }
            return Err(e);
        }
        *stage = RegistrationStage::AccountCreated;

        info!(
            stage = ?stage,
            account_id = %created.id,
            role = created.role.as_str(),
            "Registered {}",
            mask_email(&email)
        );
        Ok(created)
    }

    // ------------------------------------------------------------------------
    // Admin onboarding
    // ------------------------------------------------------------------------

    pub async fn request_admin_otp(&self, email: &str) -> Result<String, DomainError> {
        let email = Self::normalized(email)?;
        self.ensure_no_account(&email).await?;
        self.deliver_otp(&email, OtpPurpose::AdminRegistration).await?;
        info!("Admin OTP sent to {}", mask_email(&email));
        Ok(email)
    }

    pub async fn register_admin(&self, input: AdminRegistration) -> Result<(Account, Property), DomainError> {
        let email = Self::normalized(&input.email)?;
        PasswordService::check_strength(&input.password)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        self.ensure_no_account(&email).await?;

        // Build both aggregates first so validation errors do not burn the code.
        let mut account = Account::new(input.name, email.clone(), Role::Admin, String::new(), None, None)?
            .with_phone(input.phone);
        let property = Property::new(input.society_name, input.society_address, input.housing_type, account.id)?;

        self.otp_ledger
            .verify(&email, OtpPurpose::AdminRegistration, &input.otp)
            .await?;

        account.password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        account.property_id = Some(property.id);

        let created = self.account_repo.create(&account).await?;
        let stored = match self.property_repo.create(&property).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Property creation failed for admin {}: {}", created.id, e);
                if let Err(delete_err) = self.account_repo.delete(&created.id).await {
                    error!("Failed to remove orphaned admin {}: {}", created.id, delete_err);
                }
                return Err(e);
            }
        };

        info!("Admin {} registered property {}", mask_email(&email), stored.id);
        Ok((created, stored))
    }
}
