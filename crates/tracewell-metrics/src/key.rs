//! Cache keys for instrument identities.

use std::fmt;

/// Delimiter placed between the metric name and each label name.
pub const KEY_DELIMITER: &str = "||";

/// Key identifying an instrument vector inside a [`VectorCache`](crate::VectorCache).
///
/// Built by joining the metric name and the label names, in order, with
/// [`KEY_DELIMITER`]. Label order is part of the identity.
///
/// The encoding is not injective: a name that itself contains the delimiter
/// can produce the same key as a different name/label split, e.g.
/// `("a", ["b", "c"])` and `("a||b", ["c"])`. Such identities share one entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a metric name and its ordered label names.
    pub fn new(name: &str, label_names: &[&str]) -> Self {
        let capacity = name.len()
            + label_names
                .iter()
                .map(|label| label.len() + KEY_DELIMITER.len())
                .sum::<usize>();

        let mut key = String::with_capacity(capacity);
        key.push_str(name);
        for label in label_names {
            key.push_str(KEY_DELIMITER);
            key.push_str(label);
        }
        Self(key)
    }

    /// The encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
