use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use society_api::{build_router, AppState, OtpRateLimiter};
use society_core::notifications::Mailer;
use society_core::repositories::{AccountRepository, InMemoryOtpStore, OtpStore, PropertyRepository};
use society_core::services::{
    AuthService, EnrollmentService, InviteLedger, InviteTokenCodec, OtpLedger, OtpPolicy,
    RegistrationOrchestrator, UnitInventoryService,
};
use society_infrastructure::{
    create_pool, create_redis_pool, run_migrations, LogMailer, MailTemplates, PgAccountRepository,
    PgPropertyRepository, RedisOtpStore, SmtpMailer,
};
use society_security::JwtService;
use society_shared::config::{AppConfig, OtpStoreKind};
use society_shared::telemetry::init_telemetry;
use society_shared::{Clock, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration; a missing signing secret stops here
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes the file writer on exit
    let _log_guard = init_telemetry(&config.logging)?;
    info!("{} starting ({})", config.app.name, config.app.env);

    // Connect to Database
    let pool = create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    run_migrations(&pool).await.context("Failed to run migrations")?;
    info!("Database connection established.");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let accounts: Arc<dyn AccountRepository> = Arc::new(PgAccountRepository::new(pool.clone()));
    let properties: Arc<dyn PropertyRepository> = Arc::new(PgPropertyRepository::new(pool));

    let otp_store: Arc<dyn OtpStore> = match config.otp.store {
        OtpStoreKind::Memory => Arc::new(InMemoryOtpStore::new()),
        OtpStoreKind::Redis => {
            let redis = create_redis_pool(&config.redis.url, config.redis.max_connections)
                .context("Failed to create Redis pool")?;
            info!("OTP entries kept in Redis");
            Arc::new(RedisOtpStore::new(redis))
        }
    };

    let templates = MailTemplates::new(config.otp.ttl_seconds)?;
    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(SmtpMailer::new(&config.mail, templates)?)
    } else {
        warn!("Mail delivery disabled; messages are only logged");
        Arc::new(LogMailer::new(templates))
    };

    // Services
    let jwt = Arc::new(JwtService::new(&config.jwt.secret, clock.clone()));
    let otp_ledger = Arc::new(OtpLedger::new(
        otp_store,
        clock.clone(),
        OtpPolicy {
            ttl: chrono::Duration::seconds(config.otp.ttl_seconds),
            max_attempts: config.otp.max_attempts,
        },
    ));
    let invites = Arc::new(InviteLedger::new(properties.clone(), accounts.clone(), clock));
    let registration = Arc::new(RegistrationOrchestrator::new(
        otp_ledger.clone(),
        Arc::new(InviteTokenCodec::new(
            jwt.clone(),
            chrono::Duration::seconds(config.jwt.invite_token_expiry),
        )),
        invites.clone(),
        accounts.clone(),
        properties.clone(),
        mailer,
        config.app.frontend_url.clone(),
    ));
    let otp_limiter = Arc::new(OtpRateLimiter::per_minute(config.otp.requests_per_minute));

    let state = AppState {
        auth: Arc::new(AuthService::new(
            accounts.clone(),
            jwt,
            chrono::Duration::seconds(config.jwt.access_token_expiry),
        )),
        registration,
        invites,
        inventory: Arc::new(UnitInventoryService::new(properties.clone(), accounts)),
        enrollment: Arc::new(EnrollmentService::new(properties)),
        otp_limiter: otp_limiter.clone(),
    };

    // Advisory cleanup; lookups already reject expired codes
    let sweep_every = Duration::from_secs(config.otp.sweep_interval_seconds.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = otp_ledger.sweep().await {
                error!("OTP sweep failed: {}", e);
            }
            otp_limiter.retain_recent();
        }
    });

    let origin: HeaderValue = config
        .app
        .frontend_url
        .parse()
        .context("app.frontend_url is not a valid origin")?;
    let app = build_router(state).layer(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
