//! Locale registry: single source of truth for the site's supported locales.
//!
//! The registry is static configuration. It is validated once on construction
//! (exactly one default, unique codes, well-formed fallback chains) and is
//! immutable afterwards. The built-in registry for the site is available via
//! [`LocaleRegistry::builtin`]; tests and tools can build their own with
//! [`LocaleRegistry::new`].

use crate::i18n::{I18nError, Locale};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Configuration for a supported locale.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleConfig {
    /// Short code used in URLs, cookies and bundle file names (e.g. "es")
    pub code: &'static str,

    /// Region-qualified tag used for SEO alternates (e.g. "es-MX")
    pub tag: &'static str,

    /// English name of the locale (e.g. "Spanish")
    pub name: &'static str,

    /// Native name of the locale (e.g. "Español")
    pub native_name: &'static str,

    /// Whether this is the default locale (exactly one must be true)
    pub is_default: bool,

    /// Whether this locale is served
    pub enabled: bool,

    /// Locales to try, in order, before the default when this locale's bundle
    /// is unavailable. The locale itself and the default are implied.
    #[serde(skip)]
    pub fallback: &'static [&'static str],
}

/// An SEO alternate link for one locale variant of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternate {
    /// `hreflang` value ("x-default" for the default entry)
    pub hreflang: &'static str,

    /// Path prefix for this variant (e.g. "/es")
    pub prefix: String,
}

/// Registry of supported locales.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
    default_index: usize,
}

static BUILTIN: OnceLock<Arc<LocaleRegistry>> = OnceLock::new();

impl LocaleRegistry {
    /// Build and validate a registry from locale configurations.
    pub fn new(locales: Vec<LocaleConfig>) -> Result<Self, I18nError> {
        let defaults: Vec<usize> = locales
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_default)
            .map(|(i, _)| i)
            .collect();

        let default_index = match defaults.as_slice() {
            [] => return Err(I18nError::InvalidRegistry("no default locale".into())),
            [index] => *index,
            _ => {
                return Err(I18nError::InvalidRegistry(
                    "multiple default locales".into(),
                ))
            }
        };

        if !locales[default_index].enabled {
            return Err(I18nError::InvalidRegistry(format!(
                "default locale '{}' is disabled",
                locales[default_index].code
            )));
        }

        if !locales[default_index].fallback.is_empty() {
            return Err(I18nError::InvalidRegistry(format!(
                "default locale '{}' cannot have a fallback chain",
                locales[default_index].code
            )));
        }

        let mut seen = HashSet::new();
        for config in &locales {
            if config.code.is_empty() || config.code != config.code.to_ascii_lowercase() {
                return Err(I18nError::InvalidRegistry(format!(
                    "locale code '{}' must be non-empty lowercase",
                    config.code
                )));
            }
            if !seen.insert(config.code) {
                return Err(I18nError::InvalidRegistry(format!(
                    "duplicate locale code '{}'",
                    config.code
                )));
            }
        }

        for config in &locales {
            for step in config.fallback {
                let target = locales.iter().find(|l| l.code == *step);
                match target {
                    Some(t) if t.enabled => {}
                    Some(_) => {
                        return Err(I18nError::InvalidRegistry(format!(
                            "fallback chain of '{}' references disabled locale '{}'",
                            config.code, step
                        )))
                    }
                    None => {
                        return Err(I18nError::InvalidRegistry(format!(
                            "fallback chain of '{}' references unknown locale '{}'",
                            config.code, step
                        )))
                    }
                }
            }
        }

        Ok(Self {
            locales,
            default_index,
        })
    }

    /// The site's built-in registry.
    pub fn builtin() -> Arc<LocaleRegistry> {
        let registry = BUILTIN.get_or_init(|| {
            let registry =
                LocaleRegistry::new(builtin_locales()).expect("built-in locale table is valid");
            Arc::new(registry)
        });
        Arc::clone(registry)
    }

    /// The default locale: structural reference and final fallback target.
    pub fn default_locale(&self) -> Locale {
        Locale::new(self.locales[self.default_index].code)
    }

    /// Configuration for a locale code, including disabled ones.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|l| l.code == code)
    }

    /// Configuration for a supported locale.
    pub fn config(&self, locale: Locale) -> Option<&LocaleConfig> {
        self.get_by_code(locale.code()).filter(|l| l.enabled)
    }

    /// All supported locales in registry order.
    pub fn supported(&self) -> Vec<Locale> {
        self.enabled().map(|l| Locale::new(l.code)).collect()
    }

    /// Supported locales other than the default.
    pub fn non_default(&self) -> Vec<Locale> {
        self.enabled()
            .filter(|l| !l.is_default)
            .map(|l| Locale::new(l.code))
            .collect()
    }

    /// Whether the raw string is exactly a supported locale code.
    pub fn is_supported(&self, raw: &str) -> bool {
        self.lookup(raw).is_some()
    }

    /// Exact lookup of a supported locale code.
    pub fn lookup(&self, raw: &str) -> Option<Locale> {
        self.enabled()
            .find(|l| l.code == raw)
            .map(|l| Locale::new(l.code))
    }

    /// Map a raw language tag to a supported locale, if any mapping exists.
    ///
    /// Matching is case-insensitive and accepts `_` as a subtag separator.
    /// Tried in order: exact code, exact region tag, primary language subtag.
    pub fn try_normalize(&self, raw: &str) -> Option<Locale> {
        let normalized = raw.trim().replace('_', "-").to_ascii_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(l) = self.enabled().find(|l| l.code == normalized) {
            return Some(Locale::new(l.code));
        }

        if let Some(l) = self
            .enabled()
            .find(|l| l.tag.eq_ignore_ascii_case(&normalized))
        {
            return Some(Locale::new(l.code));
        }

        let primary = normalized.split('-').next().unwrap_or_default();
        self.enabled()
            .find(|l| {
                primary_subtag(l.code) == primary
                    || primary_subtag(l.tag).eq_ignore_ascii_case(primary)
            })
            .map(|l| Locale::new(l.code))
    }

    /// Map a raw language tag to a supported locale, or the default locale.
    pub fn normalize(&self, raw: &str) -> Locale {
        self.try_normalize(raw).unwrap_or_else(|| {
            debug!(raw, "Unsupported locale requested, using default");
            self.default_locale()
        })
    }

    /// Ordered locales to try for `locale`: itself, its configured chain,
    /// then the default. Duplicates are removed.
    pub fn fallback_chain(&self, locale: Locale) -> Vec<Locale> {
        let mut chain = vec![locale];
        if let Some(config) = self.config(locale) {
            for step in config.fallback {
                if let Some(next) = self.lookup(step) {
                    if !chain.contains(&next) {
                        chain.push(next);
                    }
                }
            }
        }
        let default = self.default_locale();
        if !chain.contains(&default) {
            chain.push(default);
        }
        chain
    }

    /// Region tag for a locale, used for `hreflang` and `lang` attributes.
    pub fn tag(&self, locale: Locale) -> &'static str {
        self.config(locale).map(|c| c.tag).unwrap_or(locale.code())
    }

    /// SEO alternates for every supported locale, plus `x-default`.
    pub fn alternates(&self) -> Vec<Alternate> {
        let mut alternates: Vec<Alternate> = self
            .enabled()
            .map(|l| Alternate {
                hreflang: l.tag,
                prefix: format!("/{}", l.code),
            })
            .collect();
        alternates.push(Alternate {
            hreflang: "x-default",
            prefix: format!("/{}", self.default_locale().code()),
        });
        alternates
    }

    /// All locale configurations, including disabled ones.
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    fn enabled(&self) -> impl Iterator<Item = &LocaleConfig> {
        self.locales.iter().filter(|l| l.enabled)
    }
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// The site's locale table. English is the reference bundle.
fn builtin_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            tag: "en-US",
            name: "English",
            native_name: "English",
            is_default: true,
            enabled: true,
            fallback: &[],
        },
        LocaleConfig {
            code: "es",
            tag: "es-MX",
            name: "Spanish",
            native_name: "Español",
            is_default: false,
            enabled: true,
            fallback: &[],
        },
        LocaleConfig {
            code: "pt",
            tag: "pt-BR",
            name: "Portuguese",
            native_name: "Português",
            is_default: false,
            enabled: true,
            fallback: &["es"],
        },
        LocaleConfig {
            code: "de",
            tag: "de-DE",
            name: "German",
            native_name: "Deutsch",
            is_default: false,
            enabled: true,
            fallback: &[],
        },
        LocaleConfig {
            code: "it",
            tag: "it-IT",
            name: "Italian",
            native_name: "Italiano",
            is_default: false,
            enabled: true,
            fallback: &["es"],
        },
    ]
}
