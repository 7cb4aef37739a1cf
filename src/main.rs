use std::sync::Arc;

use caballus_booking::config::Config;
use caballus_booking::engine::Engine;
use caballus_booking::error::Error;
use caballus_booking::server::serve;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let engine = Engine::connect(&config).await?;

    serve(Arc::new(engine), config.listen_addr).await
}
