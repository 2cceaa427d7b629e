use serde::Serialize;
use std::collections::BTreeMap;

/// Children of an element, keyed by tag
pub type Mapping = BTreeMap<String, Value>;

/// A decoded XML node
///
/// Any given field may come back as a single value or as a sequence,
/// depending on how many times the engine repeated the tag. Use
/// [`Value::items`] when a list is expected either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Leaf element; `None` when the element had no text
    Scalar(Option<String>),

    /// Element with child elements
    Map(Mapping),

    /// Tag repeated under one parent, in document order
    Sequence(Vec<Value>),
}

impl Value {
    /// Looks up a child by tag. Only maps have children.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Follows a chain of tags from this node
    ///
    /// # Example
    ///
    /// ```
    /// use hapy::xml::decode_document;
    ///
    /// let doc = decode_document(b"<job><shortName>foo</shortName></job>").unwrap();
    /// let name = doc.pointer(&["job", "shortName"]).and_then(|v| v.as_text());
    /// assert_eq!(name, Some("foo"));
    /// ```
    pub fn pointer(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Returns the text of a non-empty leaf
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Scalar(Some(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// True for a leaf with no text
    pub fn is_empty_scalar(&self) -> bool {
        matches!(self, Self::Scalar(None))
    }

    /// Views this node as a list regardless of its shape
    ///
    /// A sequence yields its elements, an empty leaf yields nothing, and
    /// anything else yields itself as the only element.
    pub fn items(&self) -> Vec<&Value> {
        match self {
            Self::Sequence(items) => items.iter().collect(),
            Self::Scalar(None) => Vec::new(),
            other => vec![other],
        }
    }

    /// Adds `value` under `tag`, promoting a repeated tag to a sequence
    pub(crate) fn insert_child(map: &mut Mapping, tag: String, value: Value) {
        match map.get_mut(&tag) {
            None => {
                map.insert(tag, value);
            }
            Some(Self::Sequence(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Self::Sequence(Vec::with_capacity(2)));
                if let Self::Sequence(items) = existing {
                    items.push(first);
                    items.push(value);
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Scalar(Some(text.to_string()))
    }
}
