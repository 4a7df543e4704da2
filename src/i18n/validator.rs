//! Structural validation of translation bundles.
//!
//! Every non-default locale's bundle must expose exactly the key paths of the
//! default (reference) bundle. Paths are collected down to leaves, where text
//! and lists are leaves and an empty object is a leaf too. List contents are
//! content, not structure, so differing list lengths never fail validation.

use crate::i18n::{Dictionary, DictionaryStore, I18nError, KeyPath, Locale, Node};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{info, warn};

/// Every leaf key path in a dictionary.
pub fn leaf_paths(dictionary: &Dictionary) -> BTreeSet<KeyPath> {
    let mut paths = BTreeSet::new();
    collect_paths(&KeyPath::root(), dictionary.root(), &mut paths);
    paths
}

fn collect_paths(prefix: &KeyPath, children: &BTreeMap<String, Node>, out: &mut BTreeSet<KeyPath>) {
    for (key, node) in children {
        let path = prefix.join(key);
        match node {
            Node::Branch(grandchildren) if !grandchildren.is_empty() => {
                collect_paths(&path, grandchildren, out)
            }
            _ => {
                out.insert(path);
            }
        }
    }
}

/// Result of comparing one locale's bundle against the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub locale: Locale,

    /// In the reference, absent from this locale
    pub missing: BTreeSet<KeyPath>,

    /// In this locale, absent from the reference
    pub extra: BTreeSet<KeyPath>,

    /// Set when the bundle could not be loaded at all
    pub load_error: Option<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.load_error.is_none()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.load_error {
            return writeln!(f, "✗ {}: bundle failed to load: {}", self.locale, error);
        }
        if self.is_clean() {
            return writeln!(f, "✓ {}: matches reference", self.locale);
        }

        writeln!(
            f,
            "✗ {}: {} missing, {} extra",
            self.locale,
            self.missing.len(),
            self.extra.len()
        )?;
        for path in &self.missing {
            writeln!(f, "    missing: {}", path)?;
        }
        for path in &self.extra {
            writeln!(f, "    extra:   {}", path)?;
        }
        Ok(())
    }
}

/// Reports for every non-default locale.
#[derive(Debug, Clone)]
pub struct ValidationSummary {
    pub reference: Locale,
    pub reports: Vec<ValidationReport>,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(ValidationReport::is_clean)
    }

    pub fn failing(&self) -> Vec<Locale> {
        self.reports
            .iter()
            .filter(|r| !r.is_clean())
            .map(|r| r.locale)
            .collect()
    }

    /// `Err(StructuralMismatch)` if any locale drifted.
    pub fn into_result(self) -> Result<Self, I18nError> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(I18nError::StructuralMismatch {
                failing: self
                    .failing()
                    .iter()
                    .map(|l| l.code().to_string())
                    .collect(),
            })
        }
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reference locale: {}", self.reference)?;
        for report in &self.reports {
            write!(f, "{}", report)?;
        }
        let failing = self.failing();
        if failing.is_empty() {
            writeln!(f, "All {} locale(s) match the reference", self.reports.len())
        } else {
            writeln!(
                f,
                "{} of {} locale(s) drifted from the reference",
                failing.len(),
                self.reports.len()
            )
        }
    }
}

/// Compares bundle key structure across locales.
pub struct StructuralValidator;

impl StructuralValidator {
    /// Compare one target bundle against the reference bundle.
    pub fn compare(locale: Locale, reference: &Dictionary, target: &Dictionary) -> ValidationReport {
        let reference_paths = leaf_paths(reference);
        let target_paths = leaf_paths(target);

        ValidationReport {
            locale,
            missing: reference_paths.difference(&target_paths).cloned().collect(),
            extra: target_paths.difference(&reference_paths).cloned().collect(),
            load_error: None,
        }
    }

    /// Validate every non-default locale in the store against the default.
    ///
    /// Fails only if the reference bundle itself cannot be loaded. Target
    /// bundles that fail to load produce a failing report.
    pub async fn validate_store(store: &DictionaryStore) -> Result<ValidationSummary, I18nError> {
        let registry = store.registry();
        let reference_locale = registry.default_locale();
        let reference = store.get(reference_locale).await.map_err(|e| {
            I18nError::DefaultLocaleUnavailable {
                locale: reference_locale.code().to_string(),
                reason: e.to_string(),
            }
        })?;

        let targets = registry.non_default();
        let loaded = join_all(targets.iter().map(|locale| store.get(*locale))).await;

        let reports: Vec<ValidationReport> = targets
            .into_iter()
            .zip(loaded)
            .map(|(locale, result)| match result {
                Ok(target) => Self::compare(locale, &reference, &target),
                Err(e) => ValidationReport {
                    locale,
                    missing: BTreeSet::new(),
                    extra: BTreeSet::new(),
                    load_error: Some(e.to_string()),
                },
            })
            .collect();

        for report in &reports {
            if report.is_clean() {
                info!(locale = %report.locale, "Bundle matches reference structure");
            } else {
                warn!(
                    locale = %report.locale,
                    missing = report.missing.len(),
                    extra = report.extra.len(),
                    "Bundle drifted from reference structure"
                );
            }
        }

        Ok(ValidationSummary {
            reference: reference_locale,
            reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{EmbeddedSource, LocaleRegistry, MemorySource};
    use std::sync::Arc;

    fn dict(json: &str) -> Dictionary {
        Dictionary::from_json(json).unwrap()
    }

    fn es() -> Locale {
        LocaleRegistry::builtin().lookup("es").unwrap()
    }

    fn paths(report_paths: &BTreeSet<KeyPath>) -> Vec<String> {
        report_paths.iter().map(|p| p.to_string()).collect()
    }

    const REFERENCE: &str = r#"{
        "a": { "b": { "c": "deep", "d": "sibling" } },
        "hero": { "title": "Hi", "highlights": ["one", "two"] },
        "experience": [ { "role": "Dev" }, { "role": "Lead" } ]
    }"#;

    // ==================== Path Extraction Tests ====================

    #[test]
    fn test_leaf_paths_descend_to_leaves() {
        let all = paths(&leaf_paths(&dict(REFERENCE)));
        assert_eq!(
            all,
            vec!["a.b.c", "a.b.d", "experience", "hero.highlights", "hero.title"]
        );
    }

    #[test]
    fn test_leaf_paths_empty_object_is_leaf() {
        let all = paths(&leaf_paths(&dict(r#"{"seo": {"pages": {}}}"#)));
        assert_eq!(all, vec!["seo.pages"]);
    }

    #[test]
    fn test_leaf_paths_empty_dictionary() {
        assert!(leaf_paths(&dict("{}")).is_empty());
    }

    // ==================== Comparison Tests ====================

    #[test]
    fn test_identical_structures_are_clean() {
        let report = StructuralValidator::compare(es(), &dict(REFERENCE), &dict(REFERENCE));
        assert!(report.missing.is_empty());
        assert!(report.extra.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_single_path() {
        let target = r#"{
            "a": { "b": { "d": "hermano" } },
            "hero": { "title": "Hola", "highlights": ["uno", "dos"] },
            "experience": [ { "role": "Dev" }, { "role": "Lead" } ]
        }"#;
        let report = StructuralValidator::compare(es(), &dict(REFERENCE), &dict(target));
        assert_eq!(paths(&report.missing), vec!["a.b.c"]);
        assert!(report.extra.is_empty());
    }

    #[test]
    fn test_extra_single_path() {
        let target = r#"{
            "a": { "b": { "c": "x", "d": "y" } },
            "hero": { "title": "Hola", "highlights": [] },
            "experience": [],
            "x": { "y": "extra" }
        }"#;
        let report = StructuralValidator::compare(es(), &dict(REFERENCE), &dict(target));
        assert!(report.missing.is_empty());
        assert_eq!(paths(&report.extra), vec!["x.y"]);
    }

    #[test]
    fn test_list_length_is_not_structural() {
        let target = r#"{
            "a": { "b": { "c": "x", "d": "y" } },
            "hero": { "title": "Hola", "highlights": ["uno", "dos", "tres", "cuatro"] },
            "experience": [ { "role": "Dev" } ]
        }"#;
        let report = StructuralValidator::compare(es(), &dict(REFERENCE), &dict(target));
        assert!(report.is_clean());
    }

    #[test]
    fn test_leaf_replaced_by_branch_reports_both_sides() {
        let target = r#"{
            "a": { "b": "flattened" },
            "hero": { "title": "Hola", "highlights": [] },
            "experience": []
        }"#;
        let report = StructuralValidator::compare(es(), &dict(REFERENCE), &dict(target));
        assert_eq!(paths(&report.missing), vec!["a.b.c", "a.b.d"]);
        assert_eq!(paths(&report.extra), vec!["a.b"]);
    }

    #[test]
    fn test_report_display_lists_every_path() {
        let report = StructuralValidator::compare(
            es(),
            &dict(r#"{"a": "1", "b": "2"}"#),
            &dict(r#"{"c": "3"}"#),
        );
        let text = report.to_string();
        assert!(text.contains("✗ es: 2 missing, 1 extra"));
        assert!(text.contains("missing: a"));
        assert!(text.contains("missing: b"));
        assert!(text.contains("extra:   c"));
    }

    // ==================== Store Validation Tests ====================

    #[tokio::test]
    async fn test_embedded_bundles_match_reference() {
        let store = DictionaryStore::new(LocaleRegistry::builtin(), Arc::new(EmbeddedSource));
        let summary = StructuralValidator::validate_store(&store).await.unwrap();

        assert_eq!(summary.reference.code(), "en");
        assert_eq!(summary.reports.len(), 4);
        assert!(summary.is_clean(), "{}", summary);
        assert!(summary.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_validate_store_flags_drift_and_load_failures() {
        let source = MemorySource::new()
            .with_bundle("en", r#"{"hero": {"title": "Hi"}, "nav": {"home": "Home"}}"#)
            .with_bundle("es", r#"{"hero": {"title": "Hola"}, "nav": {"home": "Inicio"}}"#)
            .with_bundle("pt", r#"{"hero": {"title": "Olá"}}"#)
            .with_bundle("de", r#"{"hero": {"title": "Hallo"}, "nav": {"home": "Start"}}"#)
            .with_bundle("it", "not json");
        let store = DictionaryStore::new(LocaleRegistry::builtin(), Arc::new(source));

        let summary = StructuralValidator::validate_store(&store).await.unwrap();
        let failing: Vec<_> = summary.failing().iter().map(|l| l.code()).collect();
        assert_eq!(failing, vec!["pt", "it"]);

        let pt = summary.reports.iter().find(|r| r.locale.code() == "pt").unwrap();
        assert_eq!(paths(&pt.missing), vec!["nav.home"]);

        let text = summary.to_string();
        assert!(text.contains("bundle failed to load"));
        assert!(text.contains("2 of 4 locale(s) drifted"));

        let err = summary.into_result().unwrap_err();
        assert!(matches!(err, I18nError::StructuralMismatch { ref failing } if failing.len() == 2));
    }

    #[tokio::test]
    async fn test_validate_store_requires_reference() {
        let source = MemorySource::new().with_bundle("es", "{}");
        let store = DictionaryStore::new(LocaleRegistry::builtin(), Arc::new(source));
        let err = StructuralValidator::validate_store(&store).await.unwrap_err();
        assert!(matches!(err, I18nError::DefaultLocaleUnavailable { .. }));
    }
}
