//! Model geometry loading.
//!
//! Loading is the one asynchronous boundary of the show: a spawn issues a
//! request, and the vertex buffer arrives on a later render tick through
//! [`GeometrySource::poll`]. Until then no instance exists for that spawn.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::effect::SpawnTicket;
use crate::error::FireworksError;

/// Shared, immutable vertex positions for one model.
pub type Geometry = Arc<[Vec3]>;

/// A resolved load request.
#[derive(Debug)]
pub struct LoadedGeometry {
    /// The spawn this load belongs to.
    pub ticket: SpawnTicket,
    /// Vertex positions, or why they could not be produced.
    pub result: Result<Geometry, FireworksError>,
}

/// Something that can turn model identifiers into vertex positions.
pub trait GeometrySource {
    /// Start loading the ticket's model.
    fn request(&mut self, ticket: SpawnTicket);

    /// Collect every load that finished since the last poll. Never blocks.
    fn poll(&mut self) -> Vec<LoadedGeometry>;
}

// ── In-memory source ─────────────────────────────────────────────────────

/// Synchronous source backed by a map of preloaded geometry.
///
/// Requests resolve on the next [`poll`](GeometrySource::poll).
#[derive(Debug, Default)]
pub struct InMemorySource {
    models: FxHashMap<String, Geometry>,
    ready: Vec<LoadedGeometry>,
}

impl InMemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register geometry under a model id.
    pub fn insert(&mut self, model: impl Into<String>, vertices: Vec<Vec3>) {
        let _ = self.models.insert(model.into(), vertices.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_model(
        mut self,
        model: impl Into<String>,
        vertices: Vec<Vec3>,
    ) -> Self {
        self.insert(model, vertices);
        self
    }
}

impl GeometrySource for InMemorySource {
    fn request(&mut self, ticket: SpawnTicket) {
        let result = self.models.get(&ticket.model).cloned().ok_or_else(|| {
            FireworksError::LoadFailure {
                model: ticket.model.clone(),
                reason: "unknown model".into(),
            }
        });
        self.ready.push(LoadedGeometry { ticket, result });
    }

    fn poll(&mut self) -> Vec<LoadedGeometry> {
        std::mem::take(&mut self.ready)
    }
}

// ── Threaded glTF loader ─────────────────────────────────────────────────

/// Decodes glTF/GLB files on a background thread.
///
/// Model ids are file paths, resolved against `root`. Decoded geometry is
/// cached per model id so repeated spawns skip the file.
pub struct ThreadedLoader {
    requests: Option<Sender<SpawnTicket>>,
    results: Receiver<LoadedGeometry>,
    // Requests the worker never received; reported as failures on poll.
    undelivered: Vec<LoadedGeometry>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedLoader {
    /// Start the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::Io`] if the thread cannot be spawned.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FireworksError> {
        let root = root.into();
        let (request_tx, request_rx) = mpsc::channel::<SpawnTicket>();
        let (result_tx, result_rx) = mpsc::channel::<LoadedGeometry>();

        let worker = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || Self::run(&root, &request_rx, &result_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            undelivered: Vec::new(),
            worker: Some(worker),
        })
    }

    fn run(
        root: &Path,
        requests: &Receiver<SpawnTicket>,
        results: &Sender<LoadedGeometry>,
    ) {
        let mut cache: FxHashMap<String, Geometry> = FxHashMap::default();

        while let Ok(ticket) = requests.recv() {
            let result = if let Some(geometry) = cache.get(&ticket.model) {
                Ok(Arc::clone(geometry))
            } else {
                let path = root.join(&ticket.model);
                load_positions(&path, &ticket.model).map(|positions| {
                    let geometry: Geometry = positions.into();
                    log::info!(
                        "loaded '{}' ({} vertices)",
                        ticket.model,
                        geometry.len()
                    );
                    let _ = cache
                        .insert(ticket.model.clone(), Arc::clone(&geometry));
                    geometry
                })
            };

            if results.send(LoadedGeometry { ticket, result }).is_err() {
                break;
            }
        }
        log::debug!("model loader shutting down");
    }
}

impl GeometrySource for ThreadedLoader {
    fn request(&mut self, ticket: SpawnTicket) {
        let ticket = match &self.requests {
            Some(requests) => match requests.send(ticket) {
                Ok(()) => return,
                Err(mpsc::SendError(ticket)) => ticket,
            },
            None => ticket,
        };
        log::warn!("model loader is gone; failing '{}'", ticket.model);
        let result = Err(FireworksError::LoadFailure {
            model: ticket.model.clone(),
            reason: "loader thread is not running".into(),
        });
        self.undelivered.push(LoadedGeometry { ticket, result });
    }

    fn poll(&mut self) -> Vec<LoadedGeometry> {
        let mut loaded = std::mem::take(&mut self.undelivered);
        loaded.extend(self.results.try_iter());
        loaded
    }
}

impl Drop for ThreadedLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("model loader thread panicked");
            }
        }
    }
}

/// Read every mesh primitive's `POSITION` attribute from a glTF/GLB file,
/// concatenated in document order.
///
/// A file with no positions yields an empty vector; the sampler turns that
/// into [`FireworksError::EmptyGeometry`].
///
/// # Errors
///
/// Returns [`FireworksError::LoadFailure`] if the file cannot be read or
/// parsed.
pub fn load_positions(
    path: &Path,
    model: &str,
) -> Result<Vec<Vec3>, FireworksError> {
    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| FireworksError::LoadFailure {
            model: model.to_owned(),
            reason: e.to_string(),
        })?;

    let mut positions = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader =
                primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            if let Some(iter) = reader.read_positions() {
                positions.extend(iter.map(Vec3::from_array));
            }
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    /// Two meshes: a triangle at the origin and a single point at (5, 5, 5).
    const TWO_MESH_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{
    "byteLength": 48,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAACgQAAAoEAAAKBA"
  }],
  "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 48 }],
  "accessors": [
    {
      "bufferView": 0, "byteOffset": 0, "componentType": 5126,
      "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0]
    },
    {
      "bufferView": 0, "byteOffset": 36, "componentType": 5126,
      "count": 1, "type": "VEC3", "min": [5, 5, 5], "max": [5, 5, 5]
    }
  ],
  "meshes": [
    { "primitives": [{ "attributes": { "POSITION": 0 }, "mode": 4 }] },
    { "primitives": [{ "attributes": { "POSITION": 1 }, "mode": 0 }] }
  ]
}"#;

    fn ticket(id: u64, model: &str) -> SpawnTicket {
        SpawnTicket {
            id,
            model: model.into(),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("fireworks-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn wait_for(loader: &mut ThreadedLoader) -> Vec<LoadedGeometry> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut loaded = Vec::new();
        while loaded.is_empty() && Instant::now() < deadline {
            loaded = loader.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
        loaded
    }

    #[test]
    fn in_memory_resolves_on_poll() {
        let mut source =
            InMemorySource::new().with_model("tri", vec![Vec3::X, Vec3::Y, Vec3::Z]);

        source.request(ticket(0, "tri"));
        source.request(ticket(1, "missing"));

        let loaded = source.poll();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].result.as_ref().unwrap().len(), 3);
        assert!(matches!(
            loaded[1].result,
            Err(FireworksError::LoadFailure { .. })
        ));
        assert!(source.poll().is_empty());
    }

    #[test]
    fn threaded_loader_reports_missing_files() {
        let mut loader = ThreadedLoader::new("/nonexistent-model-root").unwrap();
        loader.request(ticket(7, "nope.glb"));

        let loaded = wait_for(&mut loader);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].ticket.id, 7);
        assert!(matches!(
            loaded[0].result,
            Err(FireworksError::LoadFailure { ref model, .. }) if model == "nope.glb"
        ));
    }

    #[test]
    fn unreadable_file_is_a_load_failure() {
        let err = load_positions(Path::new("/definitely/not/here.glb"), "here")
            .unwrap_err();
        assert!(err.is_spawn_local());
    }

    #[test]
    fn positions_concatenate_across_meshes() {
        let dir = scratch_dir("two-mesh");
        let path = dir.join("two_mesh.gltf");
        std::fs::write(&path, TWO_MESH_GLTF).unwrap();

        let positions = load_positions(&path, "two_mesh.gltf").unwrap();
        assert_eq!(
            positions,
            [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::splat(5.0)]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn repeated_models_come_from_the_cache() {
        let dir = scratch_dir("cache");
        let path = dir.join("cached.gltf");
        std::fs::write(&path, TWO_MESH_GLTF).unwrap();
        let mut loader = ThreadedLoader::new(&dir).unwrap();

        loader.request(ticket(1, "cached.gltf"));
        let first = wait_for(&mut loader);
        assert_eq!(first[0].result.as_ref().unwrap().len(), 4);

        std::fs::remove_file(&path).unwrap();
        loader.request(ticket(2, "cached.gltf"));
        let second = wait_for(&mut loader);
        assert_eq!(second[0].ticket.id, 2);
        let geometry = second[0].result.as_ref().unwrap();
        assert!(Arc::ptr_eq(geometry, first[0].result.as_ref().unwrap()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn requests_after_the_worker_stops_still_resolve() {
        let mut loader = ThreadedLoader::new("/nonexistent-model-root").unwrap();
        drop(loader.requests.take());

        loader.request(ticket(3, "late.glb"));
        let loaded = loader.poll();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].ticket.id, 3);
        assert!(matches!(
            loaded[0].result,
            Err(FireworksError::LoadFailure { ref model, .. }) if model == "late.glb"
        ));
        assert!(loader.poll().is_empty());
    }
}
