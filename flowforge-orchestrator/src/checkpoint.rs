//! ABOUTME: Pluggable checkpoint sink (§4.6, §6): persists `State` snapshots keyed by execution_id
//! ABOUTME: Ships in-memory (default/test) and file-backed (durability) implementations

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::state::State;

/// Narrow persistence contract the controller writes through after every
/// node (§4.6 "Checkpointing"). Kept deliberately small so new backends
/// (a database, object storage) are a single `impl` away.
pub trait CheckpointSink: Send + Sync {
    fn save(&self, execution_id: &str, snapshot: &State);
    fn load(&self, execution_id: &str) -> Option<State>;
}

/// Default sink: an in-process map behind a `parking_lot::Mutex`. State does
/// not survive process restart; suitable for tests and single-process runs.
#[derive(Default)]
pub struct InMemoryCheckpointSink {
    snapshots: Mutex<HashMap<String, State>>,
}

impl InMemoryCheckpointSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointSink for InMemoryCheckpointSink {
    fn save(&self, execution_id: &str, snapshot: &State) {
        self.snapshots
            .lock()
            .insert(execution_id.to_string(), snapshot.clone());
    }

    fn load(&self, execution_id: &str) -> Option<State> {
        self.snapshots.lock().get(execution_id).cloned()
    }
}

/// File-backed sink: one JSON file per `execution_id` under `directory`.
/// Used when a run must survive a process restart (§4.6).
pub struct FileCheckpointSink {
    directory: PathBuf,
}

impl FileCheckpointSink {
    /// Construct the sink, creating `directory` if it does not exist yet.
    pub fn new(directory: impl Into<PathBuf>) -> std::io::Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    fn path_for(&self, execution_id: &str) -> PathBuf {
        self.directory.join(format!("{execution_id}.json"))
    }
}

impl CheckpointSink for FileCheckpointSink {
    fn save(&self, execution_id: &str, snapshot: &State) {
        let path = self.path_for(execution_id);
        match serde_json::to_vec_pretty(snapshot) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&path, bytes) {
                    tracing::error!(error = %e, path = %path.display(), "failed to write checkpoint");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize checkpoint snapshot"),
        }
    }

    fn load(&self, execution_id: &str) -> Option<State> {
        let path = self.path_for(execution_id);
        let bytes = std::fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}
