//! Startup sequence shared by the root binary and `shopfront serve`.

use std::future::Future;

use anyhow::Context;
use shopfront_db::{Database, DbError};
use shopfront_kernel::{
    settings::{DatabaseSettings, Settings, StartupPolicy},
    InitCtx, ModuleRegistry,
};

use crate::modules;

/// Load settings, install telemetry and serve until interrupted.
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Shopfront settings")?;
    shopfront_telemetry::init(&settings.telemetry).context("failed to initialise telemetry")?;

    tracing::info!(
        environment = %settings.environment,
        database_configured = settings.database.url.is_some(),
        "shopfront bootstrap starting"
    );

    serve(settings, shopfront_http::shutdown_signal()).await
}

/// Connect, prepare modules, then serve until `shutdown` resolves.
pub async fn serve<S>(settings: Settings, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let database = connect_database(&settings.database).await?;
    let registry = build_registry(&settings, &database);
    prepare(&registry, &settings, &database).await?;

    let served = shopfront_http::start_server(&registry, &settings, &database, shutdown).await;

    if let Err(err) = registry.stop_all().await {
        tracing::warn!(error = %err, "module shutdown reported an error");
    }
    database.close().await;

    served
}

/// Open the database according to the configured startup policy. Under
/// [`StartupPolicy::DegradeAndServe`] a failure yields a disconnected handle.
pub async fn connect_database(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let attempt = match settings.connect_options() {
        Some(options) => Database::connect(&options).await,
        None => Err(DbError::MissingUrl),
    };

    match (attempt, settings.startup_policy) {
        (Ok(database), _) => Ok(database),
        (Err(err), StartupPolicy::FailFast) => {
            Err(anyhow::Error::new(err).context("database connection failed"))
        }
        (Err(err), StartupPolicy::DegradeAndServe) => {
            tracing::warn!(
                error = %err,
                "database unavailable; serving with a disconnected database"
            );
            Ok(Database::disconnected())
        }
    }
}

pub fn build_registry(settings: &Settings, database: &Database) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, database);
    registry
}

/// Init modules, apply their migrations when connected, then start them.
pub async fn prepare(
    registry: &ModuleRegistry,
    settings: &Settings,
    database: &Database,
) -> anyhow::Result<()> {
    let ctx = InitCtx { settings, database };
    registry.init_all(&ctx).await?;

    if database.is_connected() {
        let migrations = registry.collect_migrations();
        match database.apply_migrations(&migrations).await {
            Ok(applied) => tracing::info!(applied, "migrations complete"),
            Err(err) if settings.database.startup_policy == StartupPolicy::FailFast => {
                return Err(anyhow::Error::new(err).context("database migration failed"));
            }
            Err(err) => tracing::warn!(error = %err, "database migration failed; continuing"),
        }
    }

    registry.start_all(&ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_settings(url: Option<&str>, policy: StartupPolicy) -> DatabaseSettings {
        DatabaseSettings {
            url: url.map(str::to_string),
            startup_policy: policy,
            ..DatabaseSettings::default()
        }
    }

    #[tokio::test]
    async fn missing_url_degrades_to_disconnected() {
        let database = connect_database(&database_settings(None, StartupPolicy::DegradeAndServe))
            .await
            .unwrap();
        assert!(!database.is_connected());
    }

    #[tokio::test]
    async fn missing_url_fails_fast_when_configured() {
        let result = connect_database(&database_settings(None, StartupPolicy::FailFast)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unsupported_url_fails_fast_when_configured() {
        let settings = database_settings(Some("mongodb://localhost/shop"), StartupPolicy::FailFast);
        let err = connect_database(&settings).await.unwrap_err();
        assert!(format!("{err:#}").contains("mongodb"));
    }

    #[tokio::test]
    async fn prepare_migrates_connected_database() {
        let settings = Settings {
            database: database_settings(Some("sqlite::memory:"), StartupPolicy::FailFast),
            ..Settings::default()
        };
        let database = connect_database(&settings.database).await.unwrap();
        let registry = build_registry(&settings, &database);

        prepare(&registry, &settings, &database).await.unwrap();

        let products = database
            .collection::<modules::products::NewProduct>("products")
            .unwrap();
        assert_eq!(products.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn prepare_skips_migrations_when_disconnected() {
        let settings = Settings::default();
        let database = Database::disconnected();
        let registry = build_registry(&settings, &database);
        assert!(prepare(&registry, &settings, &database).await.is_ok());
    }
}
