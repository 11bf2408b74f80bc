use std::error::Error;

use ai_llm_service::telemetry;
use tracing_subscriber::{
    EnvFilter, Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // `.env` is optional; real deployments set the environment directly.
    let dotenv = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The completion client logs through its own layer.
    let app_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| !telemetry::is_own_target(meta.target())));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(app_layer)
        .with(telemetry::layer())
        .init();

    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    api::start().await?;

    Ok(())
}
