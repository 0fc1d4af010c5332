//! Ordered key/value info strings
//!
//! Backs the replicated serverinfo, the local (never replicated) localinfo
//! and each client's userinfo. The serialized form is `\key\value` pairs and
//! its total length is capped per store.

use crate::game::constants::info::{MAX_INFO_KEY, PRINT_KEY_WIDTH, STAR_PREFIX};

/// Errors from writing an info store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InfoError {
    #[error("Star variables cannot be changed: {0}")]
    ReservedKey(String),
    #[error("Can't use keys or values with a \\ or \"")]
    InvalidCharacters,
    #[error("Keys and values must be < 64 characters")]
    TooLong,
    #[error("Info string length exceeded ({size} > {max})")]
    Overflow { size: usize, max: usize },
}

/// Ordered key/value table with a serialized size bound
#[derive(Debug, Clone)]
pub struct InfoStore {
    entries: Vec<(String, String)>,
    max_size: usize,
}

impl InfoStore {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, or the empty string
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Length of the `\key\value...` serialization
    pub fn serialized_len(&self) -> usize {
        self.entries
            .iter()
            .map(|(k, v)| pair_len(k, v))
            .sum()
    }

    /// Operator write. Star keys are refused.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), InfoError> {
        if key.starts_with(STAR_PREFIX) {
            return Err(InfoError::ReservedKey(key.to_string()));
        }
        self.write(key, value)
    }

    /// System write, the only way to set a star key
    pub fn set_star(&mut self, key: &str, value: &str) -> Result<(), InfoError> {
        self.write(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// An empty value removes the key. On error the store is untouched.
    fn write(&mut self, key: &str, value: &str) -> Result<(), InfoError> {
        if [key, value]
            .iter()
            .any(|s| s.contains('\\') || s.contains('"'))
        {
            return Err(InfoError::InvalidCharacters);
        }
        if key.len() >= MAX_INFO_KEY || value.len() >= MAX_INFO_KEY {
            return Err(InfoError::TooLong);
        }

        if value.is_empty() {
            self.remove(key);
            return Ok(());
        }

        let existing = self.get(key).map(|v| pair_len(key, v)).unwrap_or(0);
        let size = self.serialized_len() - existing + pair_len(key, value);
        if size > self.max_size {
            return Err(InfoError::Overflow {
                size,
                max: self.max_size,
            });
        }

        self.remove(key);
        self.entries.push((key.to_string(), value.to_string()));
        Ok(())
    }

    /// Wire form, e.g. `\hostname\qw\maxclients\8`
    pub fn to_info_string(&self) -> String {
        let mut out = String::with_capacity(self.serialized_len());
        for (k, v) in &self.entries {
            out.push('\\');
            out.push_str(k);
            out.push('\\');
            out.push_str(v);
        }
        out
    }

    /// Console listing, one padded key per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.entries {
            out.push_str(&format!("{:<width$}{}\n", k, v, width = PRINT_KEY_WIDTH));
        }
        out
    }
}

fn pair_len(key: &str, value: &str) -> usize {
    key.len() + value.len() + 2
}
