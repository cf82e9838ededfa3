// ============================================================================
// Society Core - Authentication Service
// File: crates/society-core/src/services/auth_service.rs
// ============================================================================
//! Login and session tokens for admins, tenants, and guards

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use society_security::{JwtService, PasswordService};
use society_shared::constants::TOKEN_TYPE_ACCESS;
use society_shared::utils::mask_email;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Account, Role};
use crate::error::DomainError;
use crate::repositories::AccountRepository;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: Role,
    pub email: String,
    #[serde(default)]
    pub property_id: Option<Uuid>,
}

impl SessionClaims {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), DomainError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    pub fn property(&self) -> Result<Uuid, DomainError> {
        self.property_id.ok_or(DomainError::PropertyNotFound)
    }
}

/// Authentication service for handling user login flows
pub struct AuthService {
    account_repo: Arc<dyn AccountRepository>,
    jwt: Arc<JwtService>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(account_repo: Arc<dyn AccountRepository>, jwt: Arc<JwtService>, session_ttl: Duration) -> Self {
        Self {
            account_repo,
            jwt,
            session_ttl,
        }
    }

    pub fn issue_session(&self, account: &Account) -> Result<String, DomainError> {
        let claims = SessionClaims {
            sub: account.id,
            role: account.role,
            email: account.email.clone(),
            property_id: account.property_id,
        };
        self.jwt
            .issue(TOKEN_TYPE_ACCESS, claims, self.session_ttl)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = email.trim().to_lowercase();
        info!("Login attempt for email: {}", mask_email(&email));

        // 1. Find account by email
        let account = self.account_repo.find_by_email(&email).await?
            .ok_or_else(|| {
                warn!("Login failed: email not found: {}", mask_email(&email));
                DomainError::InvalidCredentials
            })?;

        // 2. Check if account can login
        if !account.can_login() {
            warn!("Login failed: account deactivated: {}", mask_email(&email));
            return Err(DomainError::AccountInactive);
        }

        // 3. Verify password
        let password_valid = PasswordService::verify(password, &account.password_hash)
            .map_err(|_e| DomainError::InvalidCredentials)?;

        if !password_valid {
            warn!("Login failed: invalid password for: {}", mask_email(&email));
            return Err(DomainError::InvalidCredentials);
        }

        // 4. Issue session token
        let token = self.issue_session(&account)?;

        // 5. Update last login
        let mut updated = account.clone();
        updated.record_login();

        if let Err(e) = self.account_repo.update(&updated).await {
            error!("Failed to update last login: {}", e);
            // Don't fail login for this
        }

        info!("Login successful for: {}", mask_email(&email));

        Ok(LoginResult {
            account: updated,
            token,
        })
    }

    /// Validates a session token and returns its claims.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims, DomainError> {
        self.jwt
            .verify::<SessionClaims>(token, TOKEN_TYPE_ACCESS)
            .map(|signed| signed.claims)
            .map_err(|e| {
                warn!("Session rejected: {}", e);
                DomainError::InvalidCredentials
            })
    }

    pub async fn current_account(&self, claims: &SessionClaims) -> Result<Account, DomainError> {
        let account = self
            .account_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(DomainError::AccountNotFound)?;
        if !account.can_login() {
            return Err(DomainError::AccountInactive);
        }
        Ok(account)
    }
}

/// Result of successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub account: Account,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryAccountRepository;
    use society_shared::SystemClock;

    async fn service_with(password: &str, active: bool) -> AuthService {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let mut account = Account::new(
            "Meera".into(),
            "meera@x.com".into(),
            Role::Admin,
            PasswordService::hash(password).unwrap(),
            Some(Uuid::new_v4()),
            None,
        )
        .unwrap();
        account.is_active = active;
        repo.create(&account).await.unwrap();
        let jwt = Arc::new(JwtService::new("session-secret", Arc::new(SystemClock)));
        AuthService::new(repo, jwt, Duration::days(7))
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let auth = service_with("secret123", true).await;
        let result = auth.login("Meera@x.com", "secret123").await.unwrap();
        assert!(result.account.last_login.is_some());

        let claims = auth.authenticate(&result.token).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.email, "meera@x.com");
        assert!(claims.require_role(&[Role::Admin]).is_ok());
        assert!(matches!(claims.require_role(&[Role::Guard]), Err(DomainError::Forbidden)));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let auth = service_with("secret123", true).await;
        let result = auth.login("meera@x.com", "secret124").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_inactive_account() {
        let auth = service_with("secret123", false).await;
        let result = auth.login("meera@x.com", "secret123").await;
        assert!(matches!(result, Err(DomainError::AccountInactive)));
    }

    #[tokio::test]
    async fn test_garbage_session_rejected() {
        let auth = service_with("secret123", true).await;
        assert!(matches!(auth.authenticate("garbage"), Err(DomainError::InvalidCredentials)));
    }
}
