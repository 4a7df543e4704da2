//! Locale type: a validated member of a locale registry.
//!
//! A `Locale` can only be obtained from a [`LocaleRegistry`], which guarantees
//! that every value in circulation names a supported, enabled locale.
//!
//! [`LocaleRegistry`]: crate::i18n::LocaleRegistry

use serde::{Serialize, Serializer};
use std::fmt;

/// A supported locale, identified by its short URL code (e.g. "en", "es").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    /// Only the registry hands these out.
    pub(crate) const fn new(code: &'static str) -> Self {
        Self { code }
    }

    /// The locale code used in URL paths, cookies and bundle file names.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
