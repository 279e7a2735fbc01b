//! On-disk layout of a book folder.

use std::path::{Component, Path, PathBuf};

/// Suffix every book folder name ends with.
pub const BOOK_FOLDER_SUFFIX: &str = "_data";

/// Record file inside a book folder.
pub const RECORD_FILE: &str = "book.json";

/// Image subdirectory inside a book folder.
pub const IMAGES_DIR: &str = "images";

/// Folder name for a slug.
pub fn folder_name_for(slug: &str) -> String {
    format!("{}{}", slug, BOOK_FOLDER_SUFFIX)
}

/// Whether a directory entry name follows the book folder naming rule.
pub fn has_book_suffix(name: &str) -> bool {
    name.ends_with(BOOK_FOLDER_SUFFIX)
}

/// Path of the record file inside a folder.
pub fn record_path(folder: &Path) -> PathBuf {
    folder.join(RECORD_FILE)
}

/// Reduce an image name to a bare file name.
///
/// Returns `None` for anything that is not exactly one normal path
/// component: separators, `..`, `.`, absolute paths and empty names are all
/// rejected.
pub fn sanitize_image_name(name: &str) -> Option<&str> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return None;
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Some(name),
        _ => None,
    }
}
