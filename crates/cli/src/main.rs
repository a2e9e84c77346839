use anyhow::Context;
use clap::{Parser, Subcommand};
use shopfront_app::bootstrap;
use shopfront_app::modules::products::{sample_products, DocumentProductStore, ProductStore};
use shopfront_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "shopfront", version, about = "Shopfront product catalogue API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server until interrupted
    Serve,
    /// Replace all products with the sample catalogue
    Seed,
    /// Print the resolved configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load Shopfront settings")?;

    match cli.command {
        Command::Serve => {
            shopfront_telemetry::init(&settings.telemetry)?;
            tracing::info!(environment = %settings.environment, "shopfront serve starting");
            bootstrap::serve(settings, shopfront_http::shutdown_signal()).await
        }
        Command::Seed => {
            shopfront_telemetry::init(&settings.telemetry)?;
            seed(&settings).await
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings.redacted())?;
            println!("{rendered}");
            Ok(())
        }
    }
}

async fn seed(settings: &Settings) -> anyhow::Result<()> {
    let database = bootstrap::connect_database(&settings.database).await?;
    if !database.is_connected() {
        anyhow::bail!("cannot seed: database is not connected");
    }

    let registry = bootstrap::build_registry(settings, &database);
    bootstrap::prepare(&registry, settings, &database).await?;

    let store = DocumentProductStore::new(database.clone());
    let seeded = store
        .replace_all(sample_products())
        .await
        .context("failed to seed sample products");

    registry.stop_all().await?;
    database.close().await;

    let count = seeded?.len();
    tracing::info!(count, "sample products seeded");
    println!("seeded {count} sample products");
    Ok(())
}
