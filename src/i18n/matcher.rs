//! Locale negotiation for inbound requests.
//!
//! Precedence, highest first:
//! 1. explicit URL path segment naming a supported locale
//! 2. stored preference cookie naming a supported locale
//! 3. `Accept-Language`, highest quality first, ties in header order
//! 4. the registry's default locale

use crate::i18n::{Locale, LocaleRegistry};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

static LANGUAGE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// One entry of a parsed `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
    pub tag: String,
    pub quality: f32,
}

/// Where a negotiated locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Path,
    Cookie,
    Header,
    Default,
}

/// Raw locale hints carried by a request. All optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleSignals<'a> {
    pub path_segment: Option<&'a str>,
    pub cookie: Option<&'a str>,
    pub accept_language: Option<&'a str>,
}

/// Outcome of negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleMatch {
    pub locale: Locale,
    pub source: MatchSource,
    /// The locale the stored cookie already names, if it was valid.
    pub stored: Option<Locale>,
}

impl LocaleMatch {
    /// Whether the caller should persist this locale as the client's preference.
    ///
    /// Path-pinned locales are never persisted, nor are locales the cookie
    /// already holds.
    pub fn should_persist(&self) -> bool {
        self.source != MatchSource::Path && self.stored != Some(self.locale)
    }
}

/// Resolves request signals to exactly one supported locale.
#[derive(Debug, Clone)]
pub struct LocaleMatcher {
    registry: Arc<LocaleRegistry>,
}

impl LocaleMatcher {
    pub fn new(registry: Arc<LocaleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    /// Negotiate a locale. Never fails.
    pub fn resolve(&self, signals: &LocaleSignals<'_>) -> LocaleMatch {
        let stored = signals
            .cookie
            .and_then(|value| self.registry.lookup(value.trim()));

        if let Some(locale) = signals
            .path_segment
            .and_then(|segment| self.registry.lookup(segment))
        {
            return LocaleMatch {
                locale,
                source: MatchSource::Path,
                stored,
            };
        }

        if let Some(locale) = stored {
            return LocaleMatch {
                locale,
                source: MatchSource::Cookie,
                stored,
            };
        }

        if let Some(locale) = signals
            .accept_language
            .and_then(|header| self.match_header(header))
        {
            return LocaleMatch {
                locale,
                source: MatchSource::Header,
                stored,
            };
        }

        LocaleMatch {
            locale: self.registry.default_locale(),
            source: MatchSource::Default,
            stored,
        }
    }

    /// Best supported locale for an `Accept-Language` header, if any.
    pub fn match_header(&self, header: &str) -> Option<Locale> {
        parse_accept_language(header)
            .iter()
            .find_map(|pref| self.registry.try_normalize(&pref.tag))
    }
}

/// Parse an `Accept-Language` header into preferences, best first.
///
/// Entries with a malformed or out-of-range `q`, `q=0`, the `*` wildcard, or
/// a syntactically invalid tag are dropped. Equal weights keep header order.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
    let tag_regex = LANGUAGE_TAG_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{1,8}(?:[-_][A-Za-z0-9]{1,8})*$").expect("valid language tag regex")
    });

    let mut preferences: Vec<LanguagePreference> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if !tag_regex.is_match(tag) {
                return None;
            }

            let mut quality = 1.0_f32;
            for param in parts {
                let param = param.trim();
                let Some((name, value)) = param.split_once('=') else {
                    continue;
                };
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?;
                }
            }

            if !(0.0..=1.0).contains(&quality) || quality == 0.0 {
                return None;
            }

            Some(LanguagePreference {
                tag: tag.to_string(),
                quality,
            })
        })
        .collect();

    // sort_by is stable, so ties keep their original order
    preferences.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocaleConfig;
    use proptest::prelude::*;

    fn matcher() -> LocaleMatcher {
        LocaleMatcher::new(LocaleRegistry::builtin())
    }

    fn spanish_and_english() -> LocaleMatcher {
        let registry = LocaleRegistry::new(vec![
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
        ])
        .unwrap();
        LocaleMatcher::new(Arc::new(registry))
    }

    // ==================== Header Parsing Tests ====================

    #[test]
    fn test_parse_orders_by_quality() {
        let prefs = parse_accept_language("en;q=0.5, es-MX;q=0.9, de");
        let tags: Vec<_> = prefs.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["de", "es-MX", "en"]);
    }

    #[test]
    fn test_parse_ties_keep_header_order() {
        let prefs = parse_accept_language("pt;q=0.8,it;q=0.8,de;q=0.8");
        let tags: Vec<_> = prefs.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["pt", "it", "de"]);
    }

    #[test]
    fn test_parse_default_quality_is_one() {
        let prefs = parse_accept_language("es");
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].quality, 1.0);
    }

    #[test]
    fn test_parse_drops_invalid_entries() {
        let prefs = parse_accept_language("*, en;q=abc, de;q=1.5, it;q=0, pt;q=0.3, !!");
        let tags: Vec<_> = prefs.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["pt"]);
    }

    #[test]
    fn test_parse_empty_header() {
        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language(" , ,").is_empty());
    }

    #[test]
    fn test_parse_uppercase_q_and_spaces() {
        let prefs = parse_accept_language("en ; Q = 0.4 , es");
        let tags: Vec<_> = prefs.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["es", "en"]);
        assert!((prefs[1].quality - 0.4).abs() < f32::EPSILON);
    }

    // ==================== Precedence Tests ====================

    #[test]
    fn test_path_segment_overrides_cookie_and_header() {
        let result = matcher().resolve(&LocaleSignals {
            path_segment: Some("en"),
            cookie: Some("pt"),
            accept_language: Some("es"),
        });
        assert_eq!(result.locale.code(), "en");
        assert_eq!(result.source, MatchSource::Path);
        assert!(!result.should_persist());
    }

    #[test]
    fn test_cookie_beats_header() {
        let result = matcher().resolve(&LocaleSignals {
            path_segment: Some("about"),
            cookie: Some("pt"),
            accept_language: Some("es"),
        });
        assert_eq!(result.locale.code(), "pt");
        assert_eq!(result.source, MatchSource::Cookie);
        assert!(!result.should_persist());
    }

    #[test]
    fn test_invalid_cookie_is_ignored() {
        let result = matcher().resolve(&LocaleSignals {
            path_segment: None,
            cookie: Some("klingon"),
            accept_language: Some("de-AT,en;q=0.2"),
        });
        assert_eq!(result.locale.code(), "de");
        assert_eq!(result.source, MatchSource::Header);
        assert!(result.should_persist());
    }

    #[test]
    fn test_header_respects_quality_weights() {
        let result = spanish_and_english().resolve(&LocaleSignals {
            accept_language: Some("es-MX;q=0.9,en;q=0.5"),
            ..Default::default()
        });
        assert_eq!(result.locale.code(), "es");
        assert_eq!(result.source, MatchSource::Header);
    }

    #[test]
    fn test_header_skips_unsupported_tags() {
        let result = matcher().resolve(&LocaleSignals {
            accept_language: Some("fr-FR,fr;q=0.9,it;q=0.7,en;q=0.5"),
            ..Default::default()
        });
        assert_eq!(result.locale.code(), "it");
    }

    #[test]
    fn test_unsupported_header_falls_to_default() {
        let result = matcher().resolve(&LocaleSignals {
            accept_language: Some("fr;q=1.0"),
            ..Default::default()
        });
        assert_eq!(result.locale.code(), "en");
        assert_eq!(result.source, MatchSource::Default);
        assert!(result.should_persist());
    }

    #[test]
    fn test_no_signals_returns_default() {
        let result = matcher().resolve(&LocaleSignals::default());
        assert_eq!(result.locale, LocaleRegistry::builtin().default_locale());
        assert_eq!(result.source, MatchSource::Default);
    }

    #[test]
    fn test_region_path_segment_does_not_pin() {
        // Only exact codes pin a locale; "es-MX" in the path is just content.
        let result = matcher().resolve(&LocaleSignals {
            path_segment: Some("es-MX"),
            ..Default::default()
        });
        assert_eq!(result.source, MatchSource::Default);
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_resolve_always_returns_supported_locale(
            path in proptest::option::of("[a-zA-Z-]{0,8}"),
            cookie in proptest::option::of("[a-zA-Z-]{0,8}"),
            header in proptest::option::of("[a-zA-Z0-9,;=.* -]{0,40}"),
        ) {
            let matcher = matcher();
            let result = matcher.resolve(&LocaleSignals {
                path_segment: path.as_deref(),
                cookie: cookie.as_deref(),
                accept_language: header.as_deref(),
            });
            prop_assert!(matcher.registry().is_supported(result.locale.code()));
        }

        #[test]
        fn prop_parsed_preferences_are_sorted(header in "[a-z]{2}(;q=0\\.[0-9])?(,[a-z]{2}(;q=0\\.[0-9])?){0,6}") {
            let prefs = parse_accept_language(&header);
            for pair in prefs.windows(2) {
                prop_assert!(pair[0].quality >= pair[1].quality);
            }
        }
    }
}
