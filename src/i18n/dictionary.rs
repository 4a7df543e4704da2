//! Typed translation bundles.
//!
//! A [`Dictionary`] is a read-only tree of [`Node`]s parsed from one locale's
//! JSON bundle. Values are addressed with dot-separated [`KeyPath`]s such as
//! `hero.title` or `seo.pages.projects.title`.

use crate::i18n::I18nError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One value in a translation bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// A translated string.
    Text(String),
    /// An ordered list (highlights, experience entries). Opaque for structure.
    List(Vec<Node>),
    /// Named children.
    Branch(BTreeMap<String, Node>),
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Branch(children) => Some(children),
            _ => None,
        }
    }

    /// Texts of a list node, skipping non-text items.
    pub fn texts(&self) -> Vec<&str> {
        self.as_list()
            .map(|items| items.iter().filter_map(Node::as_text).collect())
            .unwrap_or_default()
    }
}

impl TryFrom<Value> for Node {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Node::Text(text)),
            Value::Number(n) => Ok(Node::Text(n.to_string())),
            Value::Bool(b) => Ok(Node::Text(b.to_string())),
            Value::Array(items) => items
                .into_iter()
                .map(Node::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Node::List),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| {
                    if key.is_empty() || key.contains('.') {
                        return Err(format!(
                            "invalid key '{}': keys must be non-empty and contain no '.'",
                            key
                        ));
                    }
                    Node::try_from(value)
                        .map(|node| (key.clone(), node))
                        .map_err(|e| format!("{}: {}", key, e))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Node::Branch),
            Value::Null => Err("null is not a valid translation value".to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Node::try_from(value).map_err(D::Error::custom)
    }
}

/// A dot-separated address of one entry in a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// A child path one level deeper.
    pub fn join(&self, key: &str) -> KeyPath {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        KeyPath { segments }
    }

    pub(crate) fn root() -> KeyPath {
        KeyPath {
            segments: Vec::new(),
        }
    }
}

impl FromStr for KeyPath {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if s.is_empty() || segments.iter().any(|seg| seg.is_empty()) {
            return Err(I18nError::InvalidKeyPath(s.to_string()));
        }
        Ok(KeyPath { segments })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// One locale's translation bundle. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Dictionary {
    root: BTreeMap<String, Node>,
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Node::deserialize(deserializer)? {
            Node::Branch(root) => Ok(Dictionary { root }),
            _ => Err(D::Error::custom("bundle root must be a JSON object")),
        }
    }
}

impl Dictionary {
    /// Parse a JSON bundle. The document root must be an object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn root(&self) -> &BTreeMap<String, Node> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Total lookup: the node at `path`, or `None` if any segment is absent
    /// or crosses a non-branch node.
    pub fn get_path(&self, path: &KeyPath) -> Option<&Node> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.root.get(first)?;
        for segment in rest {
            node = node.as_branch()?.get(segment)?;
        }
        Some(node)
    }

    /// Lookup by dotted string. Malformed paths resolve to `None`.
    pub fn get(&self, path: &str) -> Option<&Node> {
        path.parse::<KeyPath>()
            .ok()
            .and_then(|path| self.get_path(&path))
    }

    /// Text at `path`, if it is a text leaf.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Node::as_text)
    }

    /// Copy of this dictionary with every key path missing here filled in
    /// from `reference`. Where the two disagree on branch vs leaf, the
    /// reference's shape wins so that all reference paths stay readable.
    pub fn filled_from(&self, reference: &Dictionary) -> Dictionary {
        Dictionary {
            root: merge_branch(&self.root, &reference.root),
        }
    }
}

impl From<BTreeMap<String, Node>> for Dictionary {
    fn from(root: BTreeMap<String, Node>) -> Self {
        Self { root }
    }
}

fn merge_branch(
    target: &BTreeMap<String, Node>,
    reference: &BTreeMap<String, Node>,
) -> BTreeMap<String, Node> {
    let mut merged = target.clone();
    for (key, ref_node) in reference {
        let filled = match (target.get(key), ref_node) {
            (None, _) => ref_node.clone(),
            (Some(Node::Branch(t)), Node::Branch(r)) => Node::Branch(merge_branch(t, r)),
            (Some(_), Node::Branch(_)) => ref_node.clone(),
            (Some(Node::Branch(_)), _) => ref_node.clone(),
            (Some(existing), _) => existing.clone(),
        };
        merged.insert(key.clone(), filled);
    }
    merged
}
