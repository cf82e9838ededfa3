pub mod auth_service;
pub mod enrollment;
pub mod invite_ledger;
pub mod invite_token;
pub mod otp_ledger;
pub mod registration;
pub mod unit_inventory;

pub use auth_service::{AuthService, LoginResult, SessionClaims};
pub use enrollment::{EnrollmentInput, EnrollmentService};
pub use invite_ledger::InviteLedger;
pub use invite_token::{InviteClaims, InviteTokenCodec};
pub use otp_ledger::{OtpLedger, OtpPolicy, Verified};
pub use registration::{
    AdminRegistration, InviteAcceptance, IssuedInvite, RegistrationOrchestrator, RegistrationStage,
};
pub use unit_inventory::UnitInventoryService;
