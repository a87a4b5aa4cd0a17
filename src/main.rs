use api_rest::{LogFormat, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the paediatric FHIR API
///
/// Loads `.env`, reads the server settings from the environment, sets up logging in the
/// requested format and serves the REST API until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if a setting is malformed, the logging directives fail to parse, or the
/// listener cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    let filter = EnvFilter::from_default_env()
        .add_directive("api_rest=info".parse()?)
        .add_directive("paeds_core=info".parse()?)
        .add_directive("audit=info".parse()?);

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    tracing::info!(
        "++ Rate limit {} requests per {:?}, body limit {} bytes",
        config.rate_limit_requests,
        config.rate_limit_window,
        config.max_body_bytes
    );

    api_rest::run(config).await
}
