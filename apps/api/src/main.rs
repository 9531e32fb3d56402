//! Bloom Connect API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use bloomconnect_application::{
    AuditService, AuthEventService, AuthService, ClientService, DeviceInvitationService,
    EmailService, FeatureFlagService, NotificationService, OrganizationRepository,
    OrganizationService, RateLimitRule, RateLimitService, StaffRepository, StaffService,
};
use bloomconnect_core::AppError;
use bloomconnect_infrastructure::{
    Argon2PasswordHasher, ConsoleEmailService, PostgresAuditLogRepository, PostgresAuditRepository,
    PostgresAuthEventRepository, PostgresClientRepository, PostgresDeviceInvitationRepository,
    PostgresFeatureFlagRepository, PostgresNotificationRepository, PostgresOrganizationRepository,
    PostgresRateLimitRepository, PostgresStaffRepository, PostgresTrustedDeviceRepository,
    SmtpEmailConfig, SmtpEmailService,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let session_secret = required_env("SESSION_SECRET")?;

    if session_secret.len() < 32 {
        return Err(AppError::Validation(
            "SESSION_SECRET must be at least 32 characters".to_owned(),
        ));
    }

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let email_provider = env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "console".to_owned());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    // Audit plumbing shared by every mutating service.
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let audit_log_repository = Arc::new(PostgresAuditLogRepository::new(pool.clone()));
    let audit_service = AuditService::new(audit_repository, audit_log_repository);

    let auth_event_repository = Arc::new(PostgresAuthEventRepository::new(pool.clone()));
    let auth_event_service = AuthEventService::new(auth_event_repository);

    let staff_repository: Arc<dyn StaffRepository> =
        Arc::new(PostgresStaffRepository::new(pool.clone()));
    let organization_repository: Arc<dyn OrganizationRepository> =
        Arc::new(PostgresOrganizationRepository::new(pool.clone()));
    let trusted_device_repository = Arc::new(PostgresTrustedDeviceRepository::new(pool.clone()));
    let password_hasher = Arc::new(Argon2PasswordHasher::new());

    let auth_service = AuthService::new(
        staff_repository.clone(),
        organization_repository.clone(),
        trusted_device_repository.clone(),
        password_hasher.clone(),
        auth_event_service.clone(),
        audit_service.clone(),
    );

    let staff_service = StaffService::new(
        staff_repository.clone(),
        trusted_device_repository.clone(),
        audit_service.clone(),
    );

    let client_repository = Arc::new(PostgresClientRepository::new(pool.clone()));
    let client_service = ClientService::new(client_repository, audit_service.clone());

    let organization_service =
        OrganizationService::new(organization_repository.clone(), audit_service.clone());

    let invitation_repository = Arc::new(PostgresDeviceInvitationRepository::new(pool.clone()));
    let device_invitation_service = DeviceInvitationService::new(
        invitation_repository,
        trusted_device_repository,
        staff_repository.clone(),
        password_hasher,
        audit_service.clone(),
    );

    let email_service: Arc<dyn EmailService> = match email_provider.as_str() {
        "smtp" => {
            let smtp_port = required_non_empty_env("SMTP_PORT")?
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;

            let smtp_config = SmtpEmailConfig {
                host: required_non_empty_env("SMTP_HOST")?,
                port: smtp_port,
                username: required_non_empty_env("SMTP_USERNAME")?,
                password: required_non_empty_env("SMTP_PASSWORD")?,
                from_address: required_non_empty_env("SMTP_FROM_ADDRESS")?,
            };
            Arc::new(SmtpEmailService::new(smtp_config))
        }
        "console" => Arc::new(ConsoleEmailService::new()),
        _ => {
            return Err(AppError::Validation(format!(
                "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{email_provider}'"
            )));
        }
    };

    let notification_repository = Arc::new(PostgresNotificationRepository::new(pool.clone()));
    let notification_service = NotificationService::new(
        notification_repository,
        staff_repository.clone(),
        email_service,
        audit_service.clone(),
    );

    let feature_flag_repository = Arc::new(PostgresFeatureFlagRepository::new(pool.clone()));
    let feature_flag_service =
        FeatureFlagService::new(feature_flag_repository, audit_service.clone());

    let rate_limit_repository = Arc::new(PostgresRateLimitRepository::new(pool.clone()));
    let rate_limit_service = RateLimitService::new(rate_limit_repository);

    let app_state = AppState {
        auth_service,
        staff_service,
        client_service,
        organization_service,
        device_invitation_service,
        notification_service,
        feature_flag_service,
        audit_service,
        auth_event_service,
        rate_limit_service,
        staff_repository,
        organization_repository,
        frontend_url: frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/route-decision", get(auth::route_decision_handler))
        .route("/api/profile/password", put(auth::change_password_handler))
        .route(
            "/api/staff",
            get(handlers::staff::list_staff_handler).post(handlers::staff::provision_staff_handler),
        )
        .route(
            "/api/staff/{staff_id}",
            get(handlers::staff::get_staff_handler)
                .put(handlers::staff::update_staff_handler)
                .delete(handlers::staff::retire_staff_handler),
        )
        .route(
            "/api/clients",
            get(handlers::clients::list_clients_handler)
                .post(handlers::clients::create_client_handler),
        )
        .route(
            "/api/clients/{client_id}",
            get(handlers::clients::get_client_handler)
                .put(handlers::clients::update_client_handler)
                .delete(handlers::clients::delete_client_handler),
        )
        .route(
            "/api/organizations/current",
            get(handlers::organizations::current_organization_handler),
        )
        .route(
            "/api/organizations/current/apps",
            put(handlers::organizations::update_contracted_apps_handler),
        )
        .route(
            "/api/organizations",
            get(handlers::organizations::list_organizations_handler)
                .post(handlers::organizations::onboard_organization_handler),
        )
        .route(
            "/api/organizations/{organization_id}/plan",
            put(handlers::organizations::change_plan_handler),
        )
        .route(
            "/api/organizations/{organization_id}",
            delete(handlers::organizations::deactivate_organization_handler),
        )
        .route("/api/devices", get(handlers::devices::list_devices_handler))
        .route(
            "/api/devices/invitations",
            get(handlers::devices::list_invitations_handler)
                .post(handlers::devices::create_invitation_handler),
        )
        .route(
            "/api/devices/{device_id}",
            delete(handlers::devices::revoke_device_handler),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications_handler)
                .post(handlers::notifications::publish_notification_handler),
        )
        .route(
            "/api/notifications/{notification_id}",
            delete(handlers::notifications::delete_notification_handler),
        )
        .route("/api/flags", get(handlers::flags::list_flags_handler))
        .route(
            "/api/flags/{feature_id}",
            get(handlers::flags::feature_enabled_handler).put(handlers::flags::set_flag_handler),
        )
        .route(
            "/api/audit-log",
            get(handlers::audit::list_audit_log_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    // Rate limit rules (OWASP Credential Stuffing Prevention).
    // Login and device login: 10 attempts per IP per 15 minutes.
    let login_rate_rule = RateLimitRule::new("login", 10, 15 * 60);
    // Invitation validation and redemption: 10 attempts per IP per hour.
    let invitation_rate_rule = RateLimitRule::new("invitation_redeem", 10, 60 * 60);

    // Rate-limited auth routes: password and device login.
    let login_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/device-login", post(auth::device_login_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(login_rate_rule));

    // Rate-limited auth routes: device invitation redemption.
    let invitation_routes = Router::new()
        .route(
            "/auth/invitations/validate",
            post(auth::validate_invitation_handler),
        )
        .route(
            "/auth/invitations/redeem",
            post(auth::redeem_invitation_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(invitation_rate_rule));

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(login_routes)
        .merge(invitation_routes)
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "bloomconnect-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
