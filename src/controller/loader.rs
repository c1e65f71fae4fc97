use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use tracing::{debug, info, warn};

use crate::error::{Result, ViewerError};
use crate::model::{parse_obj, MeshData};

/// A finished background load, addressed by scene slot.
#[derive(Debug)]
pub struct LoadedMesh {
    pub slot: usize,
    pub mesh: MeshData,
}

type LoadResult = (usize, String, Result<MeshData>);

/// Reads and parses meshes on worker threads.
///
/// Results come back over a channel that the render thread drains once per
/// frame with [`MeshLoader::poll`]; nothing is shared between threads. A
/// worker that finishes after the loader is dropped has its result discarded.
pub struct MeshLoader {
    result_tx: mpsc::Sender<LoadResult>,
    result_rx: mpsc::Receiver<LoadResult>,
    pending: usize,
}

impl Default for MeshLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { result_tx: tx, result_rx: rx, pending: 0 }
    }

    /// Loads an OBJ file from disk into `slot`.
    pub fn request(&mut self, slot: usize, path: &Path) -> Result<()> {
        let path: PathBuf = path.to_path_buf();
        let label = path.display().to_string();
        self.request_with(slot, label, move || load_obj_file(&path))
    }

    /// Runs an arbitrary mesh producer in the background.
    pub fn request_with<F>(&mut self, slot: usize, label: String, load: F) -> Result<()>
    where
        F: FnOnce() -> Result<MeshData> + Send + 'static,
    {
        let tx = self.result_tx.clone();
        let thread_label = label.clone();
        thread::Builder::new()
            .name(format!("mesh-loader-{slot}"))
            .spawn(move || {
                let result = load();
                // receiver gone means the viewer shut down
                let _ = tx.send((slot, thread_label, result));
            })
            .map_err(ViewerError::ThreadSpawn)?;
        self.pending += 1;
        debug!(slot, %label, "mesh load requested");
        Ok(())
    }

    /// Drain every result completed since the last call. Failures are logged
    /// and dropped; their slots stay empty.
    pub fn poll(&mut self) -> Vec<LoadedMesh> {
        let mut loaded = Vec::new();
        while let Ok((slot, label, result)) = self.result_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            match result {
                Ok(mesh) => {
                    info!(
                        slot,
                        %label,
                        vertices = mesh.positions.len(),
                        edges = mesh.edge_count(),
                        "mesh loaded"
                    );
                    loaded.push(LoadedMesh { slot, mesh });
                }
                Err(e) => warn!(slot, %label, "mesh load failed: {e}"),
            }
        }
        loaded
    }

    /// Requests still running.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

fn load_obj_file(path: &Path) -> Result<MeshData> {
    let source = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(&source).map_err(|source| ViewerError::Mesh {
        label: path.display().to_string(),
        source,
    })
}
