//! # API REST
//!
//! REST API for the paediatric care service.
//!
//! Handles:
//! - HTTP endpoints with axum, one handler module per collection
//! - OpenAPI/Swagger documentation
//! - Cross-cutting middleware: correlation ids, audit, rate limiting, security headers,
//!   response minimisation and input sanitisation
//! - Rendering of every error as a FHIR `OperationOutcome`
//!
//! Business rules live in `paeds-core`; request and response shapes in `api-shared`.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod state;

pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use handlers::{appointments, observations, patients, reference, system};
use openapi::ApiDoc;

/// Build the application router with its full middleware stack.
pub fn router(state: AppState) -> Router {
    let limiter = state.limiter.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let cors_origins = state.config.cors_origins.clone();

    Router::new()
        .route("/health", get(system::health))
        .route("/metadata", get(system::metadata))
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/:id",
            get(patients::read_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/observations",
            get(observations::list_observations).post(observations::create_observation),
        )
        .route(
            "/observations/:id",
            get(observations::read_observation)
                .put(observations::update_observation)
                .delete(observations::delete_observation),
        )
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/:id",
            get(appointments::read_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            "/appointments/:id/cancel",
            post(appointments::cancel_appointment),
        )
        .route(
            "/reference/vital-signs",
            get(reference::vital_sign_reference),
        )
        .route(
            "/reference/appointment-types",
            get(reference::appointment_types),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        // Layers run outermost-last: request id wraps everything, sanitisation sits next to
        // the handlers.
        .layer(axum::middleware::from_fn_with_state(
            max_body_bytes,
            middleware::sanitise_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::minimise_middleware))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::audit_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::cors(&cors_origins))
}

/// Serve the API on `config.addr` until Ctrl-C or SIGTERM.
///
/// # Errors
/// Returns an error if:
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.addr.clone();
    let app = router(AppState::new(config));

    tracing::info!("-- Starting Paeds FHIR API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("-- Paeds FHIR API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
