//! Graph persistence.
//!
//! The engine never saves on its own; hosts hand a closed (or open) graph
//! to a [`GraphStore`]. History is not persisted.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::graph::{Graph, GraphSummary};
use thiserror::Error;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Graph not found: {0}")]
    NotFound(Uuid),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend keeping graphs by id.
pub trait GraphStore: Send + Sync {
    /// Save a graph and clear its dirty flag.
    fn save(&self, graph: &mut Graph) -> StorageResult<()>;

    /// Load a graph with empty history.
    fn load(&self, id: Uuid) -> StorageResult<Graph>;

    /// Delete a graph. Deleting a missing graph is not an error.
    fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// Summaries of every stored graph, most recently modified first.
    fn list(&self) -> StorageResult<Vec<GraphSummary>>;

    /// Check if a graph exists.
    fn exists(&self, id: Uuid) -> StorageResult<bool>;
}

fn sort_recent_first(summaries: &mut [GraphSummary]) {
    summaries.sort_by(|a, b| b.modified.cmp(&a.modified));
}
