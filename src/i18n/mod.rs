//! Internationalization (i18n) for the portfolio site.
//!
//! All locale negotiation, bundle loading, fallback and structural validation
//! lives here. Presentation code asks for "the locale for this request" or
//! "the dictionary for locale X" and always gets an answer.
//!
//! # Architecture
//!
//! - `registry`: single source of truth for supported locales and fallback chains
//! - `locale`: validated `Locale` values handed out by the registry
//! - `matcher`: path / cookie / `Accept-Language` negotiation
//! - `dictionary`: typed bundle tree and `KeyPath` lookups
//! - `source`: where bundle text comes from (directory, embedded, memory)
//! - `store`: load-once cache of parsed bundles
//! - `fallback`: whole-bundle and per-key fallback
//! - `validator`: key-path drift detection against the default bundle
//! - `metrics`: load and fallback counters
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_i18n::i18n::{DictionaryStore, EmbeddedSource, FallbackResolver, LocaleRegistry};
//!
//! let store = Arc::new(DictionaryStore::new(LocaleRegistry::builtin(), Arc::new(EmbeddedSource)));
//! let resolver = FallbackResolver::new(store).await?;
//! let page = resolver.resolve(locale).await;
//! let title = page.text("hero.title", "Hello");
//! ```

mod dictionary;
mod error;
mod fallback;
mod locale;
mod matcher;
mod metrics;
mod registry;
mod source;
mod store;
mod validator;

pub use dictionary::{Dictionary, KeyPath, Node};
pub use error::I18nError;
pub use fallback::{FallbackResolver, ResolvedDictionary};
pub use locale::Locale;
pub use matcher::{
    parse_accept_language, LanguagePreference, LocaleMatch, LocaleMatcher, LocaleSignals,
    MatchSource,
};
pub use metrics::{I18nMetrics, MetricsReport};
pub use registry::{Alternate, LocaleConfig, LocaleRegistry};
pub use source::{BundleSource, DirectorySource, EmbeddedSource, MemorySource};
pub use store::DictionaryStore;
pub use validator::{leaf_paths, StructuralValidator, ValidationReport, ValidationSummary};
