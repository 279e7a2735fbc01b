//! Directory-backed book store.

use super::book::Book;
use super::cache::RecordCache;
use super::folder::{self, IMAGES_DIR};
use super::slug::EffectiveSlug;
use crate::error::{AppError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A book resolved from disk, together with the folder that holds it.
#[derive(Debug, Clone)]
pub struct ResolvedBook {
    /// Folder name under the store root.
    pub folder: String,
    /// Slug the book answers to.
    pub slug: EffectiveSlug,
    /// Decoded record.
    pub book: Arc<Book>,
}

/// Book folders under a single root directory.
pub struct BookStore {
    root: PathBuf,
    cache: RecordCache<Book>,
}

impl BookStore {
    /// Create a store over `root` with an LRU cache of `cache_capacity` records.
    pub fn new(root: impl Into<PathBuf>, cache_capacity: usize) -> Self {
        Self {
            root: root.into(),
            cache: RecordCache::new(cache_capacity),
        }
    }

    /// Record cache in front of [`BookStore::load`].
    pub fn cache(&self) -> &RecordCache<Book> {
        &self.cache
    }

    /// Drop all cached records, e.g. after records changed on disk.
    pub fn clear_cache(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        tracing::info!(dropped, "Cleared record cache");
    }

    /// Absolute path of a folder under the root.
    pub fn folder_path(&self, folder_name: &str) -> PathBuf {
        self.root.join(folder_name)
    }

    /// List book folders in lexical order.
    ///
    /// Only immediate children named `*_data` that contain a record file are
    /// returned. An unreadable root yields an empty list.
    pub fn list_book_folders(&self) -> Vec<String> {
        walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| folder::has_book_suffix(name))
            .filter(|name| folder::record_path(&self.folder_path(name)).is_file())
            .collect()
    }

    /// Load a record through the cache.
    ///
    /// Decode and I/O failures are logged and reported as `None` so one bad
    /// record never hides the others.
    pub fn load(&self, folder_name: &str) -> Option<Arc<Book>> {
        if let Some(book) = self.cache.get(folder_name) {
            return Some(book);
        }

        match self.read_record(folder_name) {
            Ok(book) => {
                let book = Arc::new(book);
                self.cache.insert(folder_name, Arc::clone(&book));
                Some(book)
            }
            Err(AppError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(folder = %folder_name, error = %e, "Failed to load book record");
                None
            }
        }
    }

    /// Read and decode a record directly from disk, bypassing the cache.
    pub fn read_record(&self, folder_name: &str) -> Result<Book> {
        let path = folder::record_path(&self.folder_path(folder_name));
        if !path.is_file() {
            return Err(AppError::NotFound(format!(
                "No record in folder: {}",
                folder_name
            )));
        }

        let reader = BufReader::new(File::open(&path)?);
        serde_json::from_reader(reader).map_err(|source| AppError::CorruptRecord {
            folder: folder_name.to_string(),
            source,
        })
    }

    /// Persist a record into a folder, replacing the existing file.
    ///
    /// The record is written to a sibling temp file, then renamed into place.
    pub fn write_record(&self, folder_name: &str, book: &Book) -> Result<()> {
        let dir = self.folder_path(folder_name);
        let path = folder::record_path(&dir);
        let tmp = dir.join(format!("{}.tmp", folder::RECORD_FILE));

        let written = Self::write_json(&tmp, book)
            .and_then(|()| fs::rename(&tmp, &path).map_err(AppError::from));

        if written.is_err()
            && tmp.exists()
            && let Err(e) = fs::remove_file(&tmp)
        {
            tracing::warn!(path = %tmp.display(), error = %e, "Failed to remove temp record");
        }

        written
    }

    fn write_json(path: &Path, book: &Book) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, book)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Slug a loaded record answers to.
    pub fn effective_slug(book: &Book, folder_name: &str) -> EffectiveSlug {
        EffectiveSlug::resolve(book.stored_slug(), folder_name)
    }

    /// Every loadable book in listing order.
    pub fn list_books(&self) -> Vec<ResolvedBook> {
        self.list_book_folders()
            .into_iter()
            .filter_map(|folder| {
                let book = self.load(&folder)?;
                let slug = Self::effective_slug(&book, &folder);
                Some(ResolvedBook { folder, slug, book })
            })
            .collect()
    }

    /// Find the first folder, in listing order, whose effective slug matches.
    pub fn resolve_by_slug(&self, slug: &str) -> Option<ResolvedBook> {
        self.list_book_folders().into_iter().find_map(|folder| {
            let book = self.load(&folder)?;
            let effective = Self::effective_slug(&book, &folder);
            (effective.as_str() == slug).then(|| ResolvedBook {
                folder,
                slug: effective,
                book,
            })
        })
    }

    /// Like [`BookStore::resolve_by_slug`] but with a `NotFound` error.
    pub fn require_by_slug(&self, slug: &str) -> Result<ResolvedBook> {
        self.resolve_by_slug(slug)
            .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", slug)))
    }

    /// Path of an image belonging to the book with `slug`.
    ///
    /// `image_name` must be a bare file name; anything with a directory
    /// component is rejected.
    pub fn resolve_image(&self, slug: &str, image_name: &str) -> Result<PathBuf> {
        let safe_name = folder::sanitize_image_name(image_name).ok_or_else(|| {
            tracing::warn!(slug = %slug, image = %image_name, "Rejected unsafe image name");
            AppError::NotFound(format!("Image not found: {}", image_name))
        })?;

        let resolved = self.require_by_slug(slug)?;
        let path = self
            .folder_path(&resolved.folder)
            .join(IMAGES_DIR)
            .join(safe_name);

        if path.is_file() {
            Ok(path)
        } else {
            Err(AppError::NotFound(format!("Image not found: {}", safe_name)))
        }
    }
}
