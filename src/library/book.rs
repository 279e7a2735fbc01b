//! Book record model.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive metadata for a book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Book title.
    pub title: String,

    /// Authors in display order (may be empty).
    #[serde(default)]
    pub authors: Vec<String>,

    /// Language code (e.g., "en", "zh").
    #[serde(default)]
    pub language: Option<String>,

    /// Book description or summary.
    #[serde(default)]
    pub description: Option<String>,

    /// Publisher name.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Publication date as found in the source.
    #[serde(default)]
    pub date: Option<String>,

    /// ISBN, UUID and other identifiers.
    #[serde(default)]
    pub identifiers: Vec<String>,

    /// Subject/genre tags.
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// One entry of the spine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterContent {
    /// Manifest id of the chapter document.
    #[serde(default)]
    pub id: String,

    /// Source href of the chapter document.
    #[serde(default)]
    pub href: String,

    /// Chapter title.
    #[serde(default)]
    pub title: String,

    /// Rendered HTML body. Images are referenced as `images/<name>`.
    pub content: String,

    /// Plain text of the chapter.
    #[serde(default)]
    pub text: String,

    /// Position recorded at ingestion.
    #[serde(default)]
    pub order: usize,
}

/// Table of contents entry. Display only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TocEntry {
    /// Entry label.
    pub title: String,

    /// Full href, possibly with anchor.
    #[serde(default)]
    pub href: String,

    /// Href of the target document.
    #[serde(default)]
    pub file_href: String,

    /// Anchor within the target document.
    #[serde(default)]
    pub anchor: String,

    /// Nested entries.
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

/// A processed book record as persisted in `book.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    /// Canonical identifier. Absent or empty on legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Descriptive metadata.
    pub metadata: BookMetadata,

    /// Chapters in reading order.
    #[serde(default)]
    pub spine: Vec<ChapterContent>,

    /// Table of contents.
    #[serde(default)]
    pub toc: Vec<TocEntry>,

    /// Original image href -> stored file name under `images/`.
    #[serde(default)]
    pub images: BTreeMap<String, String>,

    /// Source document file name.
    #[serde(default)]
    pub source_file: Option<String>,

    /// When the record was produced.
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,

    /// Record format version.
    #[serde(default)]
    pub version: Option<String>,
}

impl Book {
    /// Stored slug, treating an empty string as absent.
    pub fn stored_slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }

    /// Get display name for authors.
    pub fn authors_display(&self) -> String {
        if self.metadata.authors.is_empty() {
            "Unknown Author".to_string()
        } else {
            self.metadata.authors.join(", ")
        }
    }

    /// Number of chapters in the spine.
    pub fn chapter_count(&self) -> usize {
        self.spine.len()
    }

    /// Chapter at a spine position.
    pub fn chapter_at(&self, index: usize) -> Result<&ChapterContent> {
        self.spine.get(index).ok_or(AppError::ChapterOutOfRange {
            index,
            len: self.spine.len(),
        })
    }

    /// Index of the previous chapter, if any.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        if index > 0 && index < self.spine.len() {
            Some(index - 1)
        } else {
            None
        }
    }

    /// Index of the next chapter, if any.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        index.checked_add(1).filter(|&next| next < self.spine.len())
    }
}
