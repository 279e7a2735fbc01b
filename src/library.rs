//! Book records on disk: model, slugs, store, cache and migration.

pub mod book;
pub mod cache;
pub mod folder;
pub mod migrate;
pub mod slug;
pub mod store;

pub use book::{Book, BookMetadata, ChapterContent, TocEntry};
pub use cache::{DEFAULT_CACHE_CAPACITY, RecordCache};
pub use migrate::{MigrationAction, MigrationPlan, MigrationReport, PlanEntry};
pub use slug::{EffectiveSlug, derive_legacy_slug, generate_slug};
pub use store::{BookStore, ResolvedBook};
