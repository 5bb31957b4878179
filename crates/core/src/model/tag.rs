use serde::Serialize;
use thiserror::Error;

use crate::model::text::{fold, trim_blank};

/// Validated tag name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Create a validated tag name.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TagError> {
        let trimmed = trim_blank(value.as_ref());
        if trimmed.is_empty() {
            return Err(TagError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as used for comparisons: ASCII letters lowercased.
    #[must_use]
    pub fn folded(&self) -> String {
        fold(&self.0)
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tags attached to a song.
///
/// Keeps insertion order and the casing the tag was first added with, while
/// refusing a second tag that only differs in ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList(Vec<TagName>);

impl TagList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag unless an equal one (ignoring case) is already present.
    ///
    /// # Errors
    ///
    /// `TagError::EmptyName` for blank input, `TagError::Duplicate` if the
    /// folded name is taken.
    pub fn try_add(&mut self, raw: &str) -> Result<&TagName, TagError> {
        let name = TagName::new(raw)?;
        if self.position(&name.folded()).is_some() {
            return Err(TagError::Duplicate(name.0));
        }
        self.0.push(name);
        let last = self.0.len() - 1;
        Ok(&self.0[last])
    }

    /// Remove the tag matching `raw` (trimmed, case-insensitive).
    ///
    /// # Errors
    ///
    /// `TagError::NotFound` if nothing matches, blank input included.
    pub fn try_remove(&mut self, raw: &str) -> Result<TagName, TagError> {
        let needle = fold(trim_blank(raw));
        match self.position(&needle) {
            Some(index) => Ok(self.0.remove(index)),
            None => Err(TagError::NotFound(trim_blank(raw).to_string())),
        }
    }

    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        self.position(&fold(trim_blank(raw))).is_some()
    }

    /// True if `folded_needle` occurs inside the folded form of any tag.
    pub(crate) fn any_contains(&self, folded_needle: &str) -> bool {
        self.0.iter().any(|tag| tag.folded().contains(folded_needle))
    }

    fn position(&self, folded: &str) -> Option<usize> {
        self.0.iter().position(|tag| tag.folded() == folded)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagName> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[TagName] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TagList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a TagName;
    type IntoIter = std::slice::Iter<'a, TagName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Tag edits that were refused. The message is the advisory shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    #[error("[提示] 空标签已忽略")]
    EmptyName,

    #[error("[提示] 标签已存在（忽略大小写）")]
    Duplicate(String),

    #[error("[提示] 未找到该标签")]
    NotFound(String),
}
