//! Slug derivation and collision resolution for projects.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens. Colliding slugs gain a numeric suffix:
//! `my-robot`, `my-robot-2`, `my-robot-3`, and so on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors raised when constructing a [`Slug`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacters,
}

/// URL-safe project identifier derived from the title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`] from raw input.
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if value.is_empty() || value.trim() != value {
            return Err(SlugError::Empty);
        }
        let valid = value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !valid {
            return Err(SlugError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Derive a base slug from a free-form title.
    ///
    /// Non-alphanumeric runs collapse to single hyphens; leading and trailing
    /// hyphens are stripped. Titles with no usable characters yield
    /// `"untitled"`.
    ///
    /// # Examples
    /// ```
    /// use cyberodyssey_backend::domain::slug::Slug;
    ///
    /// assert_eq!(Slug::from_title("My Robot!  Mk II").as_str(), "my-robot-mk-ii");
    /// assert_eq!(Slug::from_title("???").as_str(), "untitled");
    /// ```
    pub fn from_title(title: &str) -> Self {
        let mut out = String::with_capacity(title.len());
        let mut pending_hyphen = false;
        for ch in title.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }
        if out.is_empty() {
            out.push_str("untitled");
        }
        Self(out)
    }

    /// Append a numeric collision suffix.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    /// Pick the first slug derived from `self` that is not already taken.
    ///
    /// Returns `self` when free, otherwise `self-2`, `self-3`, … with the
    /// smallest free suffix.
    pub fn resolve_collisions(&self, taken: &[String]) -> Self {
        if !taken.iter().any(|existing| existing == &self.0) {
            return self.clone();
        }
        let mut n = 2;
        loop {
            let candidate = self.with_suffix(n);
            if !taken.iter().any(|existing| existing == candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Borrow the underlying slug text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
