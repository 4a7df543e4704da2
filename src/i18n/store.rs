//! Dictionary store: locale → parsed, cached bundle.
//!
//! Each supported locale owns one async [`OnceCell`], so the first request for
//! a locale parses its bundle exactly once even when many tasks ask at the
//! same time; everyone else awaits that load and shares the resulting `Arc`.
//! A failed load is cached too: a broken bundle is read once per process and
//! later queries get the same error back.

use crate::i18n::{BundleSource, Dictionary, I18nError, I18nMetrics, Locale, LocaleRegistry};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub struct DictionaryStore {
    registry: Arc<LocaleRegistry>,
    source: Arc<dyn BundleSource>,
    cells: HashMap<Locale, OnceCell<Result<Arc<Dictionary>, I18nError>>>,
    metrics: Arc<I18nMetrics>,
}

impl DictionaryStore {
    /// Create a store with one empty cache slot per supported locale.
    pub fn new(registry: Arc<LocaleRegistry>, source: Arc<dyn BundleSource>) -> Self {
        let cells = registry
            .supported()
            .into_iter()
            .map(|locale| (locale, OnceCell::new()))
            .collect();

        Self {
            registry,
            source,
            cells,
            metrics: Arc::new(I18nMetrics::new()),
        }
    }

    /// Registry deciding which locales this store serves.
    pub fn registry(&self) -> &Arc<LocaleRegistry> {
        &self.registry
    }

    /// Load and cache counters, shared with the fallback resolver.
    pub fn metrics(&self) -> &Arc<I18nMetrics> {
        &self.metrics
    }

    /// Dictionary for `locale`, loading it on first use.
    ///
    /// Repeat calls return the same `Arc` without re-parsing. A failed load
    /// is remembered and returned again without touching the source.
    pub async fn get(&self, locale: Locale) -> Result<Arc<Dictionary>, I18nError> {
        let cell = self
            .cells
            .get(&locale)
            .ok_or_else(|| I18nError::UnsupportedLocale(locale.code().to_string()))?;

        if let Some(Ok(dictionary)) = cell.get() {
            self.metrics.record_cache_hit();
            return Ok(Arc::clone(dictionary));
        }

        cell.get_or_init(|| self.load(locale)).await.clone()
    }

    /// Like [`get`](Self::get), for a raw locale code.
    pub async fn get_code(&self, code: &str) -> Result<Arc<Dictionary>, I18nError> {
        let locale = self
            .registry
            .lookup(code)
            .ok_or_else(|| I18nError::UnsupportedLocale(code.to_string()))?;
        self.get(locale).await
    }

    /// Whether `locale`'s bundle is already resident.
    pub fn is_loaded(&self, locale: Locale) -> bool {
        matches!(
            self.cells.get(&locale).and_then(|cell| cell.get()),
            Some(Ok(_))
        )
    }

    /// Whether loading `locale`'s bundle was attempted and failed.
    pub fn has_failed(&self, locale: Locale) -> bool {
        matches!(
            self.cells.get(&locale).and_then(|cell| cell.get()),
            Some(Err(_))
        )
    }

    /// Load every supported locale concurrently. Returns the failures.
    pub async fn preload_all(&self) -> Vec<(Locale, I18nError)> {
        let locales = self.registry.supported();
        let results = join_all(locales.iter().map(|locale| self.get(*locale))).await;

        let failures: Vec<(Locale, I18nError)> = locales
            .into_iter()
            .zip(results)
            .filter_map(|(locale, result)| result.err().map(|e| (locale, e)))
            .collect();

        info!(
            "Preloaded {} of {} locale bundles from {}",
            self.registry.supported().len() - failures.len(),
            self.registry.supported().len(),
            self.source.describe()
        );
        failures
    }

    async fn load(&self, locale: Locale) -> Result<Arc<Dictionary>, I18nError> {
        debug!(locale = %locale, "Loading dictionary");

        let text = self.source.load(locale).await.map_err(|e| {
            self.metrics.record_load_failure();
            warn!(locale = %locale, "Failed to read bundle: {:#}", e);
            I18nError::DictionaryLoad {
                locale: locale.code().to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        let dictionary = Dictionary::from_json(&text).map_err(|e| {
            self.metrics.record_load_failure();
            warn!(locale = %locale, "Failed to parse bundle: {}", e);
            I18nError::DictionaryLoad {
                locale: locale.code().to_string(),
                reason: e.to_string(),
            }
        })?;

        self.metrics.record_load();
        info!(
            locale = %locale,
            keys = dictionary.root().len(),
            "Loaded dictionary"
        );
        Ok(Arc::new(dictionary))
    }
}
