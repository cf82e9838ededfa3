//! Domain errors

use society_security::JwtError;
use thiserror::Error;

/// Why a one-time code was not accepted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpFailure {
    #[error("OTP expired or not found")]
    NotFound,

    #[error("OTP has expired")]
    Expired,

    #[error("Too many failed attempts. Please request a new OTP.")]
    TooManyAttempts,

    #[error("Invalid OTP")]
    Mismatch,
}

impl OtpFailure {
    pub fn code(&self) -> &'static str {
        match self {
            OtpFailure::NotFound => "OTP_NOT_FOUND",
            OtpFailure::Expired => "OTP_EXPIRED",
            OtpFailure::TooManyAttempts => "OTP_TOO_MANY_ATTEMPTS",
            OtpFailure::Mismatch => "OTP_MISMATCH",
        }
    }
}

/// Coarse classification callers use to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    NotFound,
    Transient,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unit number is required for tenants")]
    UnitRequired,

    #[error("Unit {0} does not exist in this property")]
    UnknownUnit(String),

    #[error("Unit identifier {0} is produced by more than one structure")]
    DuplicateUnitId(String),

    #[error("Structure {0} does not match the property housing type")]
    HousingTypeMismatch(String),

    #[error("Enrollment must be completed first")]
    EnrollmentIncomplete,

    #[error("User with this email already exists: {0}")]
    AccountExists(String),

    #[error("User with this email has already been invited: {0}")]
    AlreadyInvited(String),

    #[error("Unit {0} is already taken")]
    UnitTaken(String),

    #[error("Invalid invite token: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Email does not match the invite")]
    EmailMismatch,

    #[error("{0}")]
    Otp(#[from] OtpFailure),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    #[error("Invalid invite or user already registered")]
    NoSuchInvite,

    #[error("Property not found")]
    PropertyNotFound,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Property was modified concurrently")]
    ConcurrentModification,

    #[error("Failed to send email: {0}")]
    DeliveryFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ValidationError(_)
            | DomainError::UnitRequired
            | DomainError::UnknownUnit(_)
            | DomainError::DuplicateUnitId(_)
            | DomainError::HousingTypeMismatch(_)
            | DomainError::EnrollmentIncomplete => ErrorKind::Validation,
            DomainError::AccountExists(_)
            | DomainError::AlreadyInvited(_)
            | DomainError::UnitTaken(_)
            | DomainError::ConcurrentModification => ErrorKind::Conflict,
            DomainError::InvalidToken(_)
            | DomainError::EmailMismatch
            | DomainError::Otp(_)
            | DomainError::InvalidCredentials
            | DomainError::AccountInactive
            | DomainError::Forbidden => ErrorKind::Auth,
            DomainError::NoSuchInvite
            | DomainError::PropertyNotFound
            | DomainError::AccountNotFound => ErrorKind::NotFound,
            DomainError::DeliveryFailed(_)
            | DomainError::DatabaseError(_)
            | DomainError::CacheError(_) => ErrorKind::Transient,
            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::ValidationError(_) => "VALIDATION_ERROR",
            DomainError::UnitRequired => "UNIT_REQUIRED",
            DomainError::UnknownUnit(_) => "UNKNOWN_UNIT",
            DomainError::DuplicateUnitId(_) => "DUPLICATE_UNIT_ID",
            DomainError::HousingTypeMismatch(_) => "HOUSING_TYPE_MISMATCH",
            DomainError::EnrollmentIncomplete => "ENROLLMENT_INCOMPLETE",
            DomainError::AccountExists(_) => "ACCOUNT_EXISTS",
            DomainError::AlreadyInvited(_) => "ALREADY_INVITED",
            DomainError::UnitTaken(_) => "UNIT_TAKEN",
            DomainError::InvalidToken(JwtError::TokenExpired) => "INVITE_TOKEN_EXPIRED",
            DomainError::InvalidToken(JwtError::WrongType { .. }) => "INVITE_TOKEN_WRONG_TYPE",
            DomainError::InvalidToken(_) => "INVALID_TOKEN",
            DomainError::EmailMismatch => "EMAIL_MISMATCH",
            DomainError::Otp(failure) => failure.code(),
            DomainError::InvalidCredentials => "INVALID_CREDENTIALS",
            DomainError::AccountInactive => "ACCOUNT_INACTIVE",
            DomainError::Forbidden => "FORBIDDEN",
            DomainError::NoSuchInvite => "NO_SUCH_INVITE",
            DomainError::PropertyNotFound => "PROPERTY_NOT_FOUND",
            DomainError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            DomainError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            DomainError::DeliveryFailed(_) => "DELIVERY_FAILED",
            DomainError::DatabaseError(_) => "DATABASE_ERROR",
            DomainError::CacheError(_) => "CACHE_ERROR",
            DomainError::PasswordHashError(_) => "PASSWORD_HASH_ERROR",
            DomainError::TokenGenerationError(_) => "TOKEN_GENERATION_ERROR",
            DomainError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// OTP-step failures keep the client on the code entry screen.
    pub fn is_otp(&self) -> bool {
        matches!(self, DomainError::Otp(_))
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient || matches!(self, DomainError::ConcurrentModification)
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_reasons_have_distinct_codes() {
        let expired = DomainError::InvalidToken(JwtError::TokenExpired);
        let wrong = DomainError::InvalidToken(JwtError::WrongType {
            expected: "invite".into(),
            found: "access".into(),
        });
        let bad = DomainError::InvalidToken(JwtError::BadSignature);
        assert_eq!(expired.code(), "INVITE_TOKEN_EXPIRED");
        assert_eq!(wrong.code(), "INVITE_TOKEN_WRONG_TYPE");
        assert_eq!(bad.code(), "INVALID_TOKEN");
        assert_eq!(expired.kind(), ErrorKind::Auth);
    }

    #[test]
    fn test_otp_errors_are_tagged() {
        let err = DomainError::from(OtpFailure::Mismatch);
        assert!(err.is_otp());
        assert_eq!(err.code(), "OTP_MISMATCH");
        assert!(!DomainError::NoSuchInvite.is_otp());
    }

    #[test]
    fn test_delivery_failure_is_retryable() {
        assert!(DomainError::DeliveryFailed("smtp down".into()).is_retryable());
        assert!(!DomainError::AlreadyInvited("x@y.com".into()).is_retryable());
    }
}
