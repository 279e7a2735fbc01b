//! Slug migration: rename book folders to their canonical slug.
//!
//! Planning classifies every record; execution renames folders and rewrites
//! the stored slug. Execution never starts while any conflict is present.

use super::folder;
use super::slug::generate_slug;
use super::store::BookStore;
use crate::error::{AppError, Result};
use std::collections::HashSet;
use std::fs;
use std::io;

/// What migration will do with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationAction {
    /// Folder already carries the canonical slug.
    Unchanged,
    /// Folder can be renamed to the canonical slug.
    Rename,
    /// Target folder is taken; needs manual resolution.
    Conflict,
}

/// One classified record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Current folder name.
    pub folder: String,
    /// Book title the slug is computed from.
    pub title: String,
    /// Canonical slug for the title.
    pub target_slug: String,
    /// Folder name for `target_slug`.
    pub target_folder: String,
    /// Classification.
    pub action: MigrationAction,
}

/// Classification of every readable record under a store root.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    /// Entries in listing order.
    pub entries: Vec<PlanEntry>,
}

impl MigrationPlan {
    /// Build a plan from the current directory listing.
    ///
    /// Records are read straight from disk. A target is a conflict when a
    /// folder already exists there or an earlier entry of this plan claims it.
    pub fn build(store: &BookStore) -> Self {
        let mut claimed: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for folder_name in store.list_book_folders() {
            let book = match store.read_record(&folder_name) {
                Ok(book) => book,
                Err(e) => {
                    tracing::warn!(folder = %folder_name, error = %e, "Skipping unreadable record");
                    continue;
                }
            };

            let title = book.metadata.title.clone();
            let target_slug = generate_slug(&title);
            let target_folder = folder::folder_name_for(&target_slug);

            let action = if target_folder == folder_name {
                MigrationAction::Unchanged
            } else if claimed.contains(&target_folder)
                || store.folder_path(&target_folder).exists()
            {
                MigrationAction::Conflict
            } else {
                MigrationAction::Rename
            };

            if action != MigrationAction::Conflict {
                claimed.insert(target_folder.clone());
            }

            entries.push(PlanEntry {
                folder: folder_name,
                title,
                target_slug,
                target_folder,
                action,
            });
        }

        Self { entries }
    }

    fn with_action(&self, action: MigrationAction) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(move |e| e.action == action)
    }

    /// Records already at their canonical folder.
    pub fn unchanged(&self) -> impl Iterator<Item = &PlanEntry> {
        self.with_action(MigrationAction::Unchanged)
    }

    /// Records eligible for renaming.
    pub fn renames(&self) -> impl Iterator<Item = &PlanEntry> {
        self.with_action(MigrationAction::Rename)
    }

    /// Records whose target is taken.
    pub fn conflicts(&self) -> impl Iterator<Item = &PlanEntry> {
        self.with_action(MigrationAction::Conflict)
    }

    /// Number of conflicting entries.
    pub fn conflict_count(&self) -> usize {
        self.conflicts().count()
    }

    /// Number of renamable entries.
    pub fn rename_count(&self) -> usize {
        self.renames().count()
    }

    /// Whether execution may proceed and has something to do.
    pub fn is_executable(&self) -> bool {
        self.conflict_count() == 0 && self.rename_count() > 0
    }
}

/// Per-entry failure during execution.
#[derive(Debug, Clone)]
pub struct MigrationFailure {
    /// Folder the entry started from.
    pub folder: String,
    /// Error message.
    pub error: String,
}

/// Outcome of an execution run.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Entries attempted.
    pub attempted: usize,
    /// `(old folder, new folder)` for each success.
    pub migrated: Vec<(String, String)>,
    /// Entries that failed.
    pub failures: Vec<MigrationFailure>,
}

impl MigrationReport {
    /// Number of successful entries.
    pub fn succeeded(&self) -> usize {
        self.migrated.len()
    }

    /// `Err(PartialMigration)` when any entry failed.
    pub fn into_result(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(AppError::PartialMigration {
                succeeded: self.succeeded(),
                attempted: self.attempted,
            })
        }
    }
}

/// Apply the renames of a confirmed plan.
///
/// Conflicts are re-checked against the current directory listing before any
/// rename. Each entry then succeeds or fails on its own.
pub fn execute(store: &BookStore, plan: &MigrationPlan) -> Result<MigrationReport> {
    let planned_conflicts = plan.conflict_count();
    if planned_conflicts > 0 {
        return Err(AppError::Conflict(planned_conflicts));
    }

    let current = MigrationPlan::build(store);
    let current_conflicts = current.conflict_count();
    if current_conflicts > 0 {
        tracing::warn!(
            conflicts = current_conflicts,
            "Directory changed since planning, refusing to migrate"
        );
        return Err(AppError::Conflict(current_conflicts));
    }

    let mut report = MigrationReport::default();

    for entry in plan.renames() {
        report.attempted += 1;

        match migrate_entry(store, entry) {
            Ok(()) => {
                tracing::info!(
                    from = %entry.folder,
                    to = %entry.target_folder,
                    title = %entry.title,
                    "Migrated book folder"
                );
                report
                    .migrated
                    .push((entry.folder.clone(), entry.target_folder.clone()));
            }
            Err(e) => {
                tracing::error!(folder = %entry.folder, error = %e, "Migration failed");
                report.failures.push(MigrationFailure {
                    folder: entry.folder.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    if report.attempted > 0 {
        store.clear_cache();
    }

    tracing::info!(
        succeeded = report.succeeded(),
        attempted = report.attempted,
        "Migration finished"
    );

    Ok(report)
}

/// Rename one folder and stamp the new slug into its record.
fn migrate_entry(store: &BookStore, entry: &PlanEntry) -> Result<()> {
    let from = store.folder_path(&entry.folder);
    let to = store.folder_path(&entry.target_folder);

    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("target folder already exists: {}", entry.target_folder),
        )
        .into());
    }

    fs::rename(&from, &to)?;

    let mut book = store.read_record(&entry.target_folder)?;
    book.slug = Some(entry.target_slug.clone());
    store.write_record(&entry.target_folder, &book)?;

    Ok(())
}
