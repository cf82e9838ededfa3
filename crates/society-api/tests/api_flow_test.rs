// File: crates/society-api/tests/api_flow_test.rs
//
// Router-level onboarding flow over in-memory adapters.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use parking_lot::Mutex;
use serde_json::{json, Value};
use society_api::{build_router, AppState, OtpRateLimiter};
use society_core::notifications::{InviteMessage, Mailer};
use society_core::repositories::{InMemoryAccountRepository, InMemoryOtpStore, InMemoryPropertyRepository};
use society_core::services::{
    AuthService, EnrollmentService, InviteLedger, InviteTokenCodec, OtpLedger, OtpPolicy,
    RegistrationOrchestrator, UnitInventoryService,
};
use society_core::{DomainError, OtpPurpose};
use society_security::JwtService;
use society_shared::SystemClock;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingMailer {
    codes: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    fn code_for(&self, email: &str) -> String {
        self.codes
            .lock()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .expect("no code sent")
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, to: &str, code: &str, _purpose: OtpPurpose) -> Result<(), DomainError> {
        self.codes.lock().push((to.to_string(), code.to_string()));
        Ok(())
    }

    async fn send_invite(&self, _to: &str, _message: &InviteMessage) -> Result<(), DomainError> {
        Ok(())
    }
}

fn app(otp_requests_per_minute: u32) -> (Router, Arc<RecordingMailer>) {
    let clock = Arc::new(SystemClock);
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let properties = Arc::new(InMemoryPropertyRepository::new());
    let mailer = Arc::new(RecordingMailer::default());
    let jwt = Arc::new(JwtService::new("api-test-secret", clock.clone()));

    let invites = Arc::new(InviteLedger::new(properties.clone(), accounts.clone(), clock.clone()));
    let registration = Arc::new(RegistrationOrchestrator::new(
        Arc::new(OtpLedger::new(Arc::new(InMemoryOtpStore::new()), clock, OtpPolicy::default())),
        Arc::new(InviteTokenCodec::with_default_ttl(jwt.clone())),
        invites.clone(),
        accounts.clone(),
        properties.clone(),
        mailer.clone(),
        "http://localhost:5173".into(),
    ));

    let state = AppState {
        auth: Arc::new(AuthService::new(accounts.clone(), jwt, Duration::days(7))),
        registration,
        invites,
        inventory: Arc::new(UnitInventoryService::new(properties.clone(), accounts)),
        enrollment: Arc::new(EnrollmentService::new(properties)),
        otp_limiter: Arc::new(OtpRateLimiter::per_minute(otp_requests_per_minute)),
    };
    (build_router(state), mailer)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register_admin(app: &Router, mailer: &RecordingMailer) -> String {
    let (status, _) = call(
        app,
        Method::POST,
        "/api/auth/request-admin-otp",
        None,
        Some(json!({ "email": "admin@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register-admin",
        None,
        Some(json!({
            "name": "Admin",
            "email": "admin@x.com",
            "password": "admin123",
            "confirmPassword": "admin123",
            "societyName": "Palm Villas",
            "societyAddress": "22 Coast Road",
            "housingType": "villa",
            "otp": mailer.code_for("admin@x.com"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_villa_onboarding_over_http() {
    let (app, mailer) = app(5);
    let admin = register_admin(&app, &mailer).await;

    let (status, body) = call(&app, Method::GET, "/api/admin/available-units", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ENROLLMENT_INCOMPLETE");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/admin/complete-enrollment",
        Some(&admin),
        Some(json!({
            "structures": [{ "kind": "wing", "name": "A", "unit_prefix": "A", "units_per_wing": 3 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, "/api/admin/available-units", Some(&admin), None).await;
    let values: Vec<&str> = body["data"]["units"]
        .as_array()
        .unwrap()
        .iter()
        .map(|unit| unit["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["A01", "A02", "A03"]);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/invites/generate",
        Some(&admin),
        Some(json!({ "role": "tenant", "email": "tenant@x.com", "apartmentNumber": "A02" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let invite_token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["inviteLink"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:5173/register?token="));

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/invites/request-invite-otp",
        None,
        Some(json!({ "token": invite_token, "email": "tenant@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = mailer.code_for("tenant@x.com");
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let accept = |otp: &str| {
        json!({
            "token": invite_token,
            "name": "Tenant",
            "email": "tenant@x.com",
            "password": "tenant123",
            "confirmPassword": "tenant123",
            "otp": otp,
        })
    };

    let (status, body) = call(&app, Method::POST, "/api/invites/accept", None, Some(accept(wrong))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OTP_MISMATCH");
    assert_eq!(body["error"]["field"], "otp");

    let (status, body) = call(&app, Method::POST, "/api/invites/accept", None, Some(accept(&code))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["user"]["assignedUnit"], "A02");
    assert_eq!(body["data"]["user"]["role"], "tenant");

    let (status, body) = call(&app, Method::POST, "/api/invites/accept", None, Some(accept(&code))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_SUCH_INVITE");
    assert_eq!(body["error"]["field"], "form");

    let (_, body) = call(&app, Method::GET, "/api/admin/occupied-units", Some(&admin), None).await;
    assert_eq!(body["data"]["units"][0]["value"], "A02");
}

#[tokio::test]
async fn test_session_required_for_admin_routes() {
    let (app, _) = app(5);
    let (status, body) = call(&app, Method::GET, "/api/admin/property", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = call(&app, Method::GET, "/api/admin/property", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mismatched_passwords_rejected_before_registration() {
    let (app, _) = app(5);
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/invites/accept",
        None,
        Some(json!({
            "token": "whatever",
            "name": "Tenant",
            "email": "tenant@x.com",
            "password": "tenant123",
            "confirmPassword": "tenant124",
            "otp": "123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "form");
}

#[tokio::test]
async fn test_otp_requests_are_throttled_per_email() {
    let (app, _) = app(1);
    let request = || Some(json!({ "email": "owner@x.com" }));

    let (status, _) = call(&app, Method::POST, "/api/auth/request-admin-otp", None, request()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::POST, "/api/auth/request-admin-otp", None, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(5);
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
