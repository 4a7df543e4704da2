use anyhow::{Context, Result};
use portfolio_i18n::config::Config;
use portfolio_i18n::i18n::{
    BundleSource, DictionaryStore, DirectorySource, EmbeddedSource, FallbackResolver,
    LocaleRegistry, StructuralValidator,
};
use portfolio_i18n::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portfolio_i18n=info".parse()?),
        )
        .init();

    info!("Starting portfolio i18n server");

    let config = Config::from_env()?;

    let source: Arc<dyn BundleSource> = match &config.locales_dir {
        Some(dir) => Arc::new(DirectorySource::new(dir)),
        None => Arc::new(EmbeddedSource),
    };
    info!("Serving bundles from {}", source.describe());

    let store = Arc::new(DictionaryStore::new(LocaleRegistry::builtin(), source));

    // Missing default bundle is a deployment error: refuse to start
    let resolver = FallbackResolver::new(Arc::clone(&store))
        .await
        .context("Default locale dictionary could not be loaded")?;

    if config.validate_on_startup {
        let summary = StructuralValidator::validate_store(&store).await?;
        if summary.is_clean() {
            info!("✓ All locale bundles match the reference structure");
        } else {
            warn!("Locale bundles drifted from the reference:\n{}", summary);
        }
    }

    let app = server::router(AppState::new(Arc::new(resolver), config.secure_cookies));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
