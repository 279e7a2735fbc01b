//! Slug generation for book folders and URLs.
//!
//! Two transforms live here and they are intentionally different:
//! [`generate_slug`] is the canonical one used by migration, while
//! [`derive_legacy_slug`] is a mechanical rewrite of a folder name applied
//! only when a record carries no stored slug.

use super::folder::BOOK_FOLDER_SUFFIX;
use std::fmt;

/// Longest slug produced by [`generate_slug`], in bytes.
pub const MAX_SLUG_LEN: usize = 80;

/// Slug used when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "untitled";

/// Generate the canonical slug for a book title.
///
/// Non-Latin scripts are transliterated to ASCII first, then the result is
/// lowercased with runs of whitespace, `-` and `_` collapsed into a single
/// hyphen. Any other character is dropped. Applying it to its own output is
/// a no-op.
pub fn generate_slug(title: &str) -> String {
    let ascii = deunicode::deunicode(title);

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        // Keep whole words: cut at the last hyphen unless byte 80 is one.
        let cut = if slug.as_bytes()[MAX_SLUG_LEN] == b'-' {
            MAX_SLUG_LEN
        } else {
            slug[..MAX_SLUG_LEN].rfind('-').unwrap_or(MAX_SLUG_LEN)
        };
        slug.truncate(cut);
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Derive a slug from a legacy folder name.
///
/// Strips the storage suffix, lowercases, and turns spaces and underscores
/// into hyphens. Nothing else is normalized.
pub fn derive_legacy_slug(folder_name: &str) -> String {
    let base = folder_name
        .strip_suffix(BOOK_FOLDER_SUFFIX)
        .unwrap_or(folder_name);

    base.to_lowercase().replace([' ', '_'], "-")
}

/// The slug a book answers to, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectiveSlug {
    /// Read from the record's `slug` field.
    Stored(String),
    /// Derived from the folder name because the record has none.
    Derived(String),
}

impl EffectiveSlug {
    /// Compute the effective slug for a record stored in `folder_name`.
    pub fn resolve(stored: Option<&str>, folder_name: &str) -> Self {
        match stored {
            Some(slug) if !slug.is_empty() => EffectiveSlug::Stored(slug.to_string()),
            _ => EffectiveSlug::Derived(derive_legacy_slug(folder_name)),
        }
    }

    /// The slug value.
    pub fn as_str(&self) -> &str {
        match self {
            EffectiveSlug::Stored(s) | EffectiveSlug::Derived(s) => s,
        }
    }

    /// Whether the value came from the record itself.
    pub fn is_stored(&self) -> bool {
        matches!(self, EffectiveSlug::Stored(_))
    }
}

impl fmt::Display for EffectiveSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
