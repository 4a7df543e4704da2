//! Fallback resolution: a usable dictionary for every locale, every key.
//!
//! Two levels:
//! - whole bundle: walk the locale's fallback chain until the store yields a
//!   bundle. The chain always ends at the default locale, whose bundle is
//!   loaded when the resolver is built.
//! - per key: served locale → default locale → caller-supplied literal.

use crate::i18n::{Dictionary, DictionaryStore, I18nError, I18nMetrics, Locale, Node};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

pub struct FallbackResolver {
    store: Arc<DictionaryStore>,
    default_locale: Locale,
    default: Arc<Dictionary>,
    /// Requested locales whose bundle fallback has already been logged
    reported: Mutex<HashSet<Locale>>,
}

impl FallbackResolver {
    /// Build a resolver, loading the default locale's bundle up front.
    ///
    /// Fails with [`I18nError::DefaultLocaleUnavailable`] if that bundle cannot
    /// be loaded; callers should treat this as fatal.
    pub async fn new(store: Arc<DictionaryStore>) -> Result<Self, I18nError> {
        let default_locale = store.registry().default_locale();
        let default = store.get(default_locale).await.map_err(|e| {
            error!(locale = %default_locale, "Default locale bundle unavailable: {}", e);
            I18nError::DefaultLocaleUnavailable {
                locale: default_locale.code().to_string(),
                reason: e.to_string(),
            }
        })?;

        info!(locale = %default_locale, "Default dictionary ready");
        Ok(Self {
            store,
            default_locale,
            default,
            reported: Mutex::new(HashSet::new()),
        })
    }

    /// Store the resolver reads bundles from.
    pub fn store(&self) -> &Arc<DictionaryStore> {
        &self.store
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn default_dictionary(&self) -> &Arc<Dictionary> {
        &self.default
    }

    /// Best available dictionary for `locale`. Never fails.
    pub async fn resolve(&self, locale: Locale) -> ResolvedDictionary {
        let chain = self.store.registry().fallback_chain(locale);

        for candidate in chain {
            if candidate == self.default_locale {
                break;
            }
            match self.store.get(candidate).await {
                Ok(dictionary) => {
                    if candidate != locale {
                        self.note_bundle_fallback(locale, candidate);
                    }
                    return self.resolved(locale, candidate, dictionary);
                }
                Err(e) => {
                    debug!(locale = %candidate, "Bundle unavailable, trying next: {}", e);
                }
            }
        }

        if locale != self.default_locale {
            self.note_bundle_fallback(locale, self.default_locale);
        }
        self.resolved(locale, self.default_locale, Arc::clone(&self.default))
    }

    /// Count a bundle fallback; warn only the first time for each locale.
    fn note_bundle_fallback(&self, requested: Locale, served: Locale) {
        self.store.metrics().record_bundle_fallback();
        if self.first_report(requested) {
            warn!(requested = %requested, served = %served, "Serving fallback bundle");
        } else {
            debug!(requested = %requested, served = %served, "Serving fallback bundle");
        }
    }

    fn first_report(&self, locale: Locale) -> bool {
        self.reported
            .lock()
            .map(|mut reported| reported.insert(locale))
            .unwrap_or(true)
    }

    fn resolved(
        &self,
        requested: Locale,
        served: Locale,
        dictionary: Arc<Dictionary>,
    ) -> ResolvedDictionary {
        ResolvedDictionary {
            requested,
            served,
            dictionary,
            default_locale: self.default_locale,
            default: Arc::clone(&self.default),
            metrics: Arc::clone(self.store.metrics()),
        }
    }
}

/// A dictionary ready for presentation code, with per-key fallback.
#[derive(Debug, Clone)]
pub struct ResolvedDictionary {
    requested: Locale,
    served: Locale,
    dictionary: Arc<Dictionary>,
    default_locale: Locale,
    default: Arc<Dictionary>,
    metrics: Arc<I18nMetrics>,
}

impl ResolvedDictionary {
    /// The locale the caller asked for.
    pub fn requested(&self) -> Locale {
        self.requested
    }

    /// The locale whose bundle is actually being served.
    pub fn served(&self) -> Locale {
        self.served
    }

    /// Whether the whole bundle came from another locale.
    pub fn is_fallback(&self) -> bool {
        self.requested != self.served
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Node at `path`: served bundle first, then the default bundle.
    pub fn value(&self, path: &str) -> Option<&Node> {
        self.lookup(path, |_| true)
    }

    /// Text at `path`, falling back to the default bundle and then `literal`.
    pub fn text<'a>(&'a self, path: &str, literal: &'a str) -> &'a str {
        match self.lookup(path, |node| node.as_text().is_some()) {
            Some(node) => node.as_text().unwrap_or(literal),
            None => {
                self.metrics.record_literal_fallback();
                debug!(path, locale = %self.served, "Missing translation, using literal");
                literal
            }
        }
    }

    /// Texts of the list at `path`, falling back to the default bundle and
    /// then to an empty list.
    pub fn text_list(&self, path: &str) -> Vec<&str> {
        match self.lookup(path, |node| node.as_list().is_some()) {
            Some(node) => node.texts(),
            None => {
                self.metrics.record_literal_fallback();
                Vec::new()
            }
        }
    }

    /// The served bundle with every missing key path filled from the default.
    pub fn merged(&self) -> Dictionary {
        if self.served == self.default_locale {
            return (*self.dictionary).clone();
        }
        self.dictionary.filled_from(&self.default)
    }

    fn lookup(&self, path: &str, accept: impl Fn(&Node) -> bool) -> Option<&Node> {
        if let Some(node) = self.dictionary.get(path).filter(|&n| accept(n)) {
            return Some(node);
        }
        if self.served == self.default_locale {
            return None;
        }

        let node = self.default.get(path).filter(|&n| accept(n))?;
        self.metrics.record_key_fallback();
        debug!(path, locale = %self.served, "Missing translation, using default locale");
        Some(node)
    }
}
