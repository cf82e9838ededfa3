use std::sync::Arc;

use society_core::services::{
    AuthService, EnrollmentService, InviteLedger, RegistrationOrchestrator, UnitInventoryService,
};

use crate::rate_limit::OtpRateLimiter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub registration: Arc<RegistrationOrchestrator>,
    pub invites: Arc<InviteLedger>,
    pub inventory: Arc<UnitInventoryService>,
    pub enrollment: Arc<EnrollmentService>,
    pub otp_limiter: Arc<OtpRateLimiter>,
}
