//! HTTP request handlers.

use crate::error::{AppError, Result};
use crate::library::{Book, ResolvedBook};
use crate::server::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tokio_util::io::ReaderStream;

const PAGE_STYLE: &str = r#"
        body { font-family: Georgia, serif; margin: 0; color: #222; }
        a { color: #0066cc; text-decoration: none; }
        .library { max-width: 720px; margin: 2rem auto; padding: 0 1rem; }
        .book { padding: 0.75rem 0; border-bottom: 1px solid #eee; }
        .meta { color: #666; font-size: 0.9rem; }
        .layout { display: flex; }
        nav.toc { width: 260px; height: 100vh; overflow-y: auto; background: #f7f7f7; padding: 1rem; box-sizing: border-box; position: sticky; top: 0; }
        nav.toc a.current { font-weight: bold; }
        main { flex: 1; max-width: 760px; margin: 0 auto; padding: 2rem 1rem; line-height: 1.6; }
        main img { max-width: 100%; }
        .pager { display: flex; justify-content: space-between; margin: 2rem 0; }
"#;

/// Escape text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// WEB PAGES
// ============================================================================

/// Library page listing every loadable book.
pub async fn library_view(State(state): State<AppState>) -> Html<String> {
    let books = state.store().list_books();
    let title = escape_html(&state.config.server.title);

    let mut items = String::new();
    for resolved in &books {
        let book = &resolved.book;
        let _ = write!(
            items,
            r#"<div class="book"><a href="/read/{slug}">{title}</a><div class="meta">{authors} &middot; {chapters} chapters</div></div>"#,
            slug = urlencoding::encode(resolved.slug.as_str()),
            title = escape_html(&book.metadata.title),
            authors = escape_html(&book.authors_display()),
            chapters = book.chapter_count(),
        );
    }

    if books.is_empty() {
        items.push_str("<p>No books found.</p>");
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <div class="library">
        <h1>{title}</h1>
        {items}
    </div>
</body>
</html>"#,
        title = title,
        style = PAGE_STYLE,
        items = items,
    ))
}

/// Reader query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReaderQuery {
    /// Hide the chapter sidebar.
    #[serde(default)]
    pub noindex: bool,
}

/// Redirect to the first chapter of a book.
pub async fn read_first_chapter(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ReaderQuery>,
) -> Result<Redirect> {
    let resolved = state.store().require_by_slug(&slug)?;
    let mut target = format!("/read/{}/0", urlencoding::encode(resolved.slug.as_str()));
    if params.noindex {
        target.push_str("?noindex=true");
    }
    Ok(Redirect::to(&target))
}

/// Chapter reader page.
pub async fn read_chapter(
    State(state): State<AppState>,
    Path((slug, index)): Path<(String, i64)>,
    Query(params): Query<ReaderQuery>,
) -> Result<Html<String>> {
    let resolved = state.store().require_by_slug(&slug)?;
    let index = usize::try_from(index)
        .map_err(|_| AppError::NotFound(format!("Chapter not found: {}", index)))?;
    Ok(Html(render_chapter(&resolved, index, params.noindex)?))
}

/// Render one chapter with navigation.
fn render_chapter(resolved: &ResolvedBook, index: usize, noindex: bool) -> Result<String> {
    let book: &Book = &resolved.book;
    let chapter = book.chapter_at(index)?;
    let slug = urlencoding::encode(resolved.slug.as_str());
    let query = if noindex { "?noindex=true" } else { "" };

    let link = |i: usize, label: &str| format!(r#"<a href="/read/{slug}/{i}{query}">{label}</a>"#);

    let prev = book
        .previous_index(index)
        .map(|i| link(i, "&larr; Previous"))
        .unwrap_or_default();
    let next = book
        .next_index(index)
        .map(|i| link(i, "Next &rarr;"))
        .unwrap_or_default();

    let sidebar = if noindex {
        String::new()
    } else {
        let mut nav = String::from(r#"<nav class="toc"><a href="/">&larr; Library</a><ol>"#);
        for (i, entry) in book.spine.iter().enumerate() {
            let label = if entry.title.is_empty() {
                format!("Chapter {}", i + 1)
            } else {
                escape_html(&entry.title)
            };
            let class = if i == index { r#" class="current""# } else { "" };
            let _ = write!(nav, r#"<li><a{class} href="/read/{slug}/{i}">{label}</a></li>"#);
        }
        nav.push_str("</ol></nav>");
        nav
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <div class="layout">
        {sidebar}
        <main>
            <div class="pager"><span>{prev}</span><span>{next}</span></div>
            {content}
            <div class="pager"><span>{prev}</span><span>{next}</span></div>
        </main>
    </div>
</body>
</html>"#,
        title = escape_html(&book.metadata.title),
        style = PAGE_STYLE,
        sidebar = sidebar,
        prev = prev,
        next = next,
        content = chapter.content,
    ))
}

// ============================================================================
// IMAGES
// ============================================================================

/// Guess an image MIME type from its file name.
pub(crate) fn image_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Serve an image from a book's `images/` directory.
pub async fn serve_image(
    State(state): State<AppState>,
    Path((slug, image_name)): Path<(String, String)>,
) -> Result<Response<Body>> {
    let path = state.store().resolve_image(&slug, &image_name)?;

    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image_mime_type(&image_name))
        .header(header::CONTENT_LENGTH, length)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

// ============================================================================
// API
// ============================================================================

/// Library entry for the JSON listing.
#[derive(Debug, Serialize)]
pub struct LibraryEntry {
    /// Slug the book answers to.
    pub slug: String,
    /// Whether the slug is stored in the record or derived from the folder.
    pub slug_stored: bool,
    /// Folder name under the library root.
    pub folder: String,
    /// Book title.
    pub title: String,
    /// Authors.
    pub authors: Vec<String>,
    /// Number of chapters.
    pub chapters: usize,
    /// Language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Library listing response.
#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    /// Books in listing order.
    pub books: Vec<LibraryEntry>,
    /// Total count.
    pub total: usize,
}

/// API: full library listing.
pub async fn api_library(State(state): State<AppState>) -> Json<LibraryResponse> {
    let books: Vec<LibraryEntry> = state
        .store()
        .list_books()
        .into_iter()
        .map(|resolved| LibraryEntry {
            slug: resolved.slug.as_str().to_string(),
            slug_stored: resolved.slug.is_stored(),
            folder: resolved.folder,
            title: resolved.book.metadata.title.clone(),
            authors: resolved.book.metadata.authors.clone(),
            chapters: resolved.book.chapter_count(),
            language: resolved.book.metadata.language.clone(),
        })
        .collect();

    let total = books.len();
    Json(LibraryResponse { books, total })
}

/// Cache clear response.
#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    /// Entries dropped.
    pub dropped: usize,
}

/// API: drop every cached record.
pub async fn api_clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let dropped = state.store().cache().len();
    state.store().clear_cache();
    Json(CacheClearResponse { dropped })
}
