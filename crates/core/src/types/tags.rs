//! Free-form item tags.
//!
//! Older item documents store `tags` as a single comma-separated string,
//! newer ones as a list. [`Tags`] accepts either shape on read and always
//! writes a list.

use core::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Normalized list of tags: trimmed, no empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Build from any list of strings, dropping blank entries.
    #[must_use]
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tags.into_iter()
                .map(|t| t.as_ref().trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Parse the legacy comma-separated form.
    #[must_use]
    pub fn from_comma_separated(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive equality against an already lower-cased needle.
    #[must_use]
    pub fn contains_exact(&self, lowercase: &str) -> bool {
        self.0.iter().any(|t| t.to_lowercase() == lowercase)
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

struct TagsVisitor;

impl<'de> Visitor<'de> for TagsVisitor {
    type Value = Tags;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a comma-separated string or a list of strings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Tags, E> {
        Ok(Tags::from_comma_separated(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Tags, E> {
        Ok(Tags::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Tags, E> {
        Ok(Tags::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Tags, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Tags, A::Error> {
        // Non-string entries are skipped rather than failing the document.
        let mut out = Vec::new();
        while let Some(value) = seq.next_element::<serde_json::Value>()? {
            if let serde_json::Value::String(s) = value {
                out.push(s);
            }
        }
        Ok(Tags::new(out))
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TagsVisitor)
    }
}
