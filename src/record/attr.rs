use std::fmt;
use thiserror::Error;

/// Splits GTF attribute text on `;`, ignoring separators inside quotes.
#[inline(always)]
fn split_unquoted(line: &str) -> Result<Vec<&str>, AttrParseError> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(8);
    let mut in_quotes = false;
    let mut begin = 0;

    for (idx, byte) in bytes.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b';' if !in_quotes => {
                fields.push(&line[begin..idx]);
                begin = idx + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(AttrParseError::UnterminatedQuote(line.to_string()));
    }

    let tail = &line[begin..];
    if !tail.trim().is_empty() {
        fields.push(tail);
    }

    Ok(fields)
}

/// Ordered key/value store backing the ninth GTF column.
///
/// Keys are unique; re-inserting a key overwrites its value in place so the
/// original position is kept. Iteration follows first-insertion order, which
/// is also the serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeStore {
    entries: Vec<(String, String)>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Parses a GTF attribute column (`key "value"; key2 "value2";`).
    ///
    /// Unquoted values (`level 2;`) are accepted. Duplicated keys keep the
    /// last value at the position of the first occurrence.
    pub fn parse(line: &str) -> Result<Self, AttrParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(AttrParseError::Empty);
        }

        let fields = split_unquoted(line)?;
        let mut store = Self::with_capacity(fields.len());

        for field in fields {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }

            let (key, value) = field
                .split_once(|c: char| c.is_ascii_whitespace())
                .ok_or_else(|| AttrParseError::MissingValue(field.to_string()))?;

            let value = value.trim();
            let value = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                &value[1..value.len() - 1]
            } else {
                value
            };

            store.insert(key, value);
        }

        Ok(store)
    }

    #[inline(always)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
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
}

impl fmt::Display for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, (key, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key} \"{value}\";")?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut store = AttributeStore::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttrParseError {
    #[error("Empty attribute column")]
    Empty,

    #[error("Attribute without value: {0}")]
    MissingValue(String),

    #[error("Unterminated quote in: {0}")]
    UnterminatedQuote(String),
}
