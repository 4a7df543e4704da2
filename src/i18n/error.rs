//! Error types for locale resolution and dictionary loading.

use thiserror::Error;

/// Errors produced by the i18n subsystem.
///
/// Most of these are recovered locally (unsupported locales become the default
/// locale, load failures walk the fallback chain). Only
/// [`I18nError::DefaultLocaleUnavailable`] is meant to abort startup, and
/// [`I18nError::StructuralMismatch`] is a CI gate rather than a runtime error.
#[derive(Debug, Clone, Error)]
pub enum I18nError {
    /// A locale outside the registry's supported set was requested.
    #[error("locale '{0}' is not supported")]
    UnsupportedLocale(String),

    /// The bundle for a locale could not be read or parsed.
    #[error("failed to load dictionary for '{locale}': {reason}")]
    DictionaryLoad { locale: String, reason: String },

    /// The default locale's bundle could not be loaded. Fatal.
    #[error("default locale '{locale}' dictionary is unavailable: {reason}")]
    DefaultLocaleUnavailable { locale: String, reason: String },

    /// One or more locales drifted from the reference key structure.
    #[error("structural mismatch in {} locale(s): {}", failing.len(), failing.join(", "))]
    StructuralMismatch { failing: Vec<String> },

    /// A key path string could not be parsed.
    #[error("invalid key path '{0}'")]
    InvalidKeyPath(String),

    /// The locale registry configuration is inconsistent.
    #[error("invalid locale registry: {0}")]
    InvalidRegistry(String),
}
