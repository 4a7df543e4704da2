//! Where translation bundles come from.
//!
//! A [`BundleSource`] returns the raw JSON text for a locale. Parsing and
//! caching are the store's job, so sources stay trivial.

use crate::i18n::Locale;
use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A provider of raw bundle text, keyed by locale.
pub trait BundleSource: Send + Sync {
    /// Fetch the JSON text of `locale`'s bundle.
    fn load(&self, locale: Locale) -> BoxFuture<'_, Result<String>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// One `<code>.json` file per locale in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the bundle file for a locale.
    pub fn bundle_path(&self, locale: Locale) -> PathBuf {
        self.dir.join(format!("{}.json", locale.code()))
    }
}

impl BundleSource for DirectorySource {
    fn load(&self, locale: Locale) -> BoxFuture<'_, Result<String>> {
        let path = self.bundle_path(locale);
        Box::pin(async move {
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read bundle {}", path.display()))
        })
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Bundles compiled into the binary from `locales/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

const EMBEDDED_BUNDLES: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("es", include_str!("../../locales/es.json")),
    ("pt", include_str!("../../locales/pt.json")),
    ("de", include_str!("../../locales/de.json")),
    ("it", include_str!("../../locales/it.json")),
];

impl BundleSource for EmbeddedSource {
    fn load(&self, locale: Locale) -> BoxFuture<'_, Result<String>> {
        let found = EMBEDDED_BUNDLES
            .iter()
            .find(|(code, _)| *code == locale.code())
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| anyhow!("No embedded bundle for '{}'", locale));
        Box::pin(async move { found })
    }

    fn describe(&self) -> String {
        "embedded bundles".to_string()
    }
}

/// In-memory bundles, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bundles: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the bundle text for a locale code.
    pub fn with_bundle(mut self, code: &str, json: impl Into<String>) -> Self {
        self.bundles.insert(code.to_string(), json.into());
        self
    }
}

impl BundleSource for MemorySource {
    fn load(&self, locale: Locale) -> BoxFuture<'_, Result<String>> {
        let found = self
            .bundles
            .get(locale.code())
            .cloned()
            .ok_or_else(|| anyhow!("No in-memory bundle for '{}'", locale));
        Box::pin(async move { found })
    }

    fn describe(&self) -> String {
        format!("{} in-memory bundle(s)", self.bundles.len())
    }
}
