//! Multi-step repository workflows.
//!
//! Each workflow is a free function over `&dyn Forge` so handlers can run it
//! against the real GitHub client and tests can run it against a mock.
//! Workflows that loop over items record per-item failures and carry on;
//! the rest stop at the first upstream failure.

/// Move and rename as copy-then-delete.
pub mod mover;

/// Copy every file of one repository branch into another.
pub mod sync;

/// Directory deletion by rewriting the branch tree.
pub mod tree;

/// Concurrent batch upload.
pub mod upload;

pub use mover::{
    EntryKind, MoveBatch, MoveEntryOutcome, MoveEntryRequest, MoveItem,
    MoveReport, move_batch, move_entry,
};
pub use sync::{SyncOperation, SyncSummary, sync_tree};
pub use tree::{DeleteDirectoryRequest, delete_directory, prune_tree};
pub use upload::{
    UploadBatch, UploadFile, UploadReport, UploadResult, UploadSummary,
    upload_batch,
};

#[cfg(test)]
mod tests;
