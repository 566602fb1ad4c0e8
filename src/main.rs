use tracing_subscriber::EnvFilter;

use wicket::Server;
use wicket::config::Config;
use wicket::demo::build_app;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let app = build_app(&config);
    Server::bind(&config.addr())?.serve(app).await?;
    Ok(())
}
