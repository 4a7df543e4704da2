//! Locale bundle validator - checks every bundle against the reference (English) structure
//!
//! Usage:
//!   cargo run --bin validate-locales            # Validate LOCALES_DIR (defaults to ./locales)
//!   cargo run --bin validate-locales -- <DIR>   # Validate bundles in DIR
//!
//! Prints one report per locale and exits with status 1 if any locale has
//! missing or extra key paths, or failed to load.

use anyhow::{Context, Result};
use portfolio_i18n::i18n::{DictionaryStore, DirectorySource, LocaleRegistry, StructuralValidator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("validate_locales=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("LOCALES_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("locales"));

    info!("Validating locale bundles in {}", dir.display());

    let store = DictionaryStore::new(
        LocaleRegistry::builtin(),
        Arc::new(DirectorySource::new(&dir)),
    );
    let summary = StructuralValidator::validate_store(&store)
        .await
        .with_context(|| format!("Reference bundle missing from {}", dir.display()))?;

    print!("{}", summary);

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        let failing: Vec<&str> = summary.failing().iter().map(|l| l.code()).collect();
        eprintln!("Failing locales: {}", failing.join(", "));
        Ok(ExitCode::FAILURE)
    }
}
