use anyhow::Result;
use tracing_subscriber::EnvFilter;

use weather_proxy::{Config, web};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        version = weather_proxy::VERSION,
        upstream = %config.nws_base_url,
        "starting weather proxy"
    );

    web::run(config).await
}
