//! Attribute keys and key normalization
//!
//! Every access boundary (get, set, constructor overrides, membership)
//! funnels through [`KeyProbe`], the single normalization step from any
//! accepted spelling to a canonical key string.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::errors::{RecordError, RecordResult};
use crate::value::Value;

/// Canonical attribute key.
///
/// Keys have symbol shape: a leading ASCII letter or underscore, ASCII
/// alphanumeric or underscore characters after that, and at most one trailing
/// `?` or `!`. Declaration rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Key(Box<str>);

impl Key {
    /// Creates a key, validating symbol shape.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidName` if the name is empty or contains
    /// characters outside the symbol shape.
    pub fn new(name: impl AsRef<str>) -> RecordResult<Self> {
        let name = name.as_ref();
        match symbol_shape_error(name) {
            None => Ok(Key(name.into())),
            Some(reason) => Err(RecordError::InvalidName {
                name: name.to_string(),
                reason,
            }),
        }
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns why `name` is not symbol-shaped, or `None` if it is.
fn symbol_shape_error(name: &str) -> Option<&'static str> {
    let body = name.strip_suffix(['?', '!']).unwrap_or(name);
    let mut chars = body.chars();
    match chars.next() {
        None => return Some("name must not be empty"),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        None
    } else {
        Some("name may only contain letters, digits, and underscores")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Allows map lookup by &str without allocating.
impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A value that may normalize to a key string.
///
/// String-like probes (symbol or string spelling) normalize to `Some`;
/// anything non-textual normalizes to `None`, which membership queries treat
/// as "not a key" rather than an error.
pub trait KeyProbe {
    /// Returns the canonical key string, or `None` for non-textual probes
    fn key_str(&self) -> Option<&str>;
}

impl KeyProbe for str {
    fn key_str(&self) -> Option<&str> {
        Some(self)
    }
}

impl KeyProbe for String {
    fn key_str(&self) -> Option<&str> {
        Some(self)
    }
}

impl KeyProbe for Key {
    fn key_str(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl KeyProbe for Value {
    fn key_str(&self) -> Option<&str> {
        self.as_str()
    }
}

impl<T: KeyProbe + ?Sized> KeyProbe for &T {
    fn key_str(&self) -> Option<&str> {
        (**self).key_str()
    }
}
