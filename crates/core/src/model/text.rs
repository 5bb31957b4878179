use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("text cannot be empty")]
    Empty,
}

/// Trimmed, non-empty text tagged with the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text<K>(String, std::marker::PhantomData<K>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleKind;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtistKind;

pub type Title = Text<TitleKind>;
pub type Artist = Text<ArtistKind>;

impl<K> Text<K> {
    /// Trim `s` and keep it if anything is left.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if nothing but whitespace was given.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = trim_blank(s.as_ref());
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_string(), std::marker::PhantomData))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<K> std::fmt::Display for Text<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<K> Serialize for Text<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Strip the C-locale blank set (space, `\t`, `\n`, `\v`, `\f`, `\r`) from both ends.
pub(crate) fn trim_blank(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
}

/// ASCII-only lowercase; every other byte is left as is.
pub(crate) fn fold(s: &str) -> String {
    s.to_ascii_lowercase()
}
