//! Response header map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::HEADER_SET_COOKIE;

/// Ordered response headers.
///
/// Names keep the spelling they were first received with; lookups are ASCII
/// case-insensitive. A repeated header replaces the earlier value, except
/// `Set-Cookie` whose values are joined with a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HeaderInput", into = "IndexMap<String, String>")]
pub struct Headers {
    entries: IndexMap<String, String>,
}

/// Accepted wire shapes: a JSON object or a list of `[name, value]` pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderInput {
    Map(IndexMap<String, String>),
    Pairs(Vec<(String, String)>),
}

impl From<HeaderInput> for Headers {
    fn from(input: HeaderInput) -> Self {
        match input {
            HeaderInput::Map(map) => map.into_iter().collect(),
            HeaderInput::Pairs(pairs) => pairs.into_iter().collect(),
        }
    }
}

impl From<Headers> for IndexMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers.entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, applying the last-wins / cookie-join merge.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => {
                let existing = &mut self.entries[index];
                if name.eq_ignore_ascii_case(HEADER_SET_COOKIE) {
                    existing.push('\n');
                    existing.push_str(&value);
                } else {
                    *existing = value;
                }
            }
            None => {
                self.entries.insert(name, value);
            }
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .keys()
            .position(|key| key.eq_ignore_ascii_case(name))
    }
}
