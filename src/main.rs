use anyhow::Result;
use clap::Parser;
use gift_cart::{cli::{Args, CliApp}, utils::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_env()?;

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "🛒 Gift cart starting ({} environment, gift threshold {})",
        config.environment,
        config.gift_threshold
    );

    let app = CliApp::new(config).map_err(|e| {
        tracing::error!("Failed to start: {}", e);
        e
    })?;
    app.run(args).await?;

    tracing::info!("🛒 Gift cart stopped");
    Ok(())
}
