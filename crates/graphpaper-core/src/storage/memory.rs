//! In-memory storage implementation.

use super::{GraphStore, StorageError, StorageResult, sort_recent_first};
use crate::graph::{Graph, GraphSummary};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    graphs: RwLock<HashMap<Uuid, Graph>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl GraphStore for MemoryStore {
    fn save(&self, graph: &mut Graph) -> StorageResult<()> {
        let mut graphs = self.graphs.write().map_err(lock_error)?;
        let mut stored = graph.clone();
        stored.history_mut().clear();
        stored.dirty = false;
        graphs.insert(graph.id, stored);
        graph.dirty = false;
        Ok(())
    }

    fn load(&self, id: Uuid) -> StorageResult<Graph> {
        let graphs = self.graphs.read().map_err(lock_error)?;
        graphs.get(&id).cloned().ok_or(StorageError::NotFound(id))
    }

    fn delete(&self, id: Uuid) -> StorageResult<()> {
        let mut graphs = self.graphs.write().map_err(lock_error)?;
        graphs.remove(&id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<GraphSummary>> {
        let graphs = self.graphs.read().map_err(lock_error)?;
        let mut summaries: Vec<_> = graphs.values().map(Graph::summary).collect();
        sort_recent_first(&mut summaries);
        Ok(summaries)
    }

    fn exists(&self, id: Uuid) -> StorageResult<bool> {
        let graphs = self.graphs.read().map_err(lock_error)?;
        Ok(graphs.contains_key(&id))
    }
}
