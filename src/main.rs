//! occi-backends - fixture cache warm-up
//!
//! Builds the adapter set for the configured provider, which loads every
//! fixture set into the shared cache, and reports what was loaded. Run it
//! before starting OCCI server processes that share the same cache.

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use occi_backends::api::BackendApi;
use occi_backends::backends::{create_backends, BackendContext, DelegatedUser};
use occi_backends::cache::create_cache;
use occi_backends::config::Config;
use occi_backends::fixtures::FixtureKind;
use occi_backends::metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // JSON output for structured logging, RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    metrics::init_metrics().context("Failed to register metrics")?;

    info!(
        provider = config.backend.provider.name(),
        fixtures_dir = ?config.backend.fixtures_dir,
        external_cache = config.cache.url.is_some(),
        "Starting fixture warm-up"
    );

    let cache = create_cache(&config).context("Failed to create fixture cache")?;
    let ctx = BackendContext::new(&config, DelegatedUser::default(), cache);

    let api = BackendApi::new(
        create_backends(ctx.clone())
            .await
            .context("Failed to initialize backend adapters")?,
    );
    info!(provider = api.provider().name(), "Backend adapters initialized");

    // OpenNebula reads from the cloud itself, there is nothing to warm up
    if config.backend.uses_fixtures() {
        let store = ctx.fixture_store();
        for kind in FixtureKind::ALL {
            let set = store.read(kind).await?;
            info!(kind = %kind, count = set.len(), key = %store.cache_key(kind), "Fixture set cached");
        }
    }

    debug!(metrics = %metrics::render(), "Warm-up metrics");
    info!("Fixture warm-up complete");
    Ok(())
}
