//! File-based storage: one JSON document per graph.

use super::{GraphStore, StorageError, StorageResult, sort_recent_first};
use crate::graph::{Graph, GraphSummary};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores graphs as pretty-printed JSON files in a directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store in `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/graphpaper/graphs/`
    /// On Windows: `%LOCALAPPDATA%\graphpaper\graphs\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("graphpaper").join("graphs"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn graph_path(&self, id: Uuid) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    fn read(path: &Path) -> StorageResult<Graph> {
        let json = fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Graph::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

impl GraphStore for FileStore {
    fn save(&self, graph: &mut Graph) -> StorageResult<()> {
        let path = self.graph_path(graph.id);
        let json = graph
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        graph.dirty = false;
        log::info!("Saved graph {} to {}", graph.id, path.display());
        Ok(())
    }

    fn load(&self, id: Uuid) -> StorageResult<Graph> {
        let path = self.graph_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id));
        }
        Self::read(&path)
    }

    fn delete(&self, id: Uuid) -> StorageResult<()> {
        let path = self.graph_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<GraphSummary>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read(&path) {
                Ok(graph) => summaries.push(graph.summary()),
                Err(e) => log::warn!("Skipping unreadable graph file: {}", e),
            }
        }
        sort_recent_first(&mut summaries);
        Ok(summaries)
    }

    fn exists(&self, id: Uuid) -> StorageResult<bool> {
        Ok(self.graph_path(id).exists())
    }
}
