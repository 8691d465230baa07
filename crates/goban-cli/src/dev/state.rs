//! Shared state for the development server.
//!
//! Build status, the last good bundle and the connected reload clients.
//! Guarded by `parking_lot` locks; no lock is held across an await.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use goban_bundler::Artifact;
use goban_config::DevServerSettings;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::dev::DevEvent;

/// Events queued per reload client before it counts as stalled.
const CLIENT_QUEUE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    NotStarted,
    InProgress { started_at: Instant },
    Success { duration_ms: u64 },
    Failed { error: String },
}

impl BuildStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BuildStatus::NotStarted => "not-started",
            BuildStatus::InProgress { .. } => "building",
            BuildStatus::Success { .. } => "success",
            BuildStatus::Failed { .. } => "failed",
        }
    }
}

/// The last successful web bundle, keyed by URL path (`/goban.js`).
#[derive(Debug, Clone, Default)]
pub struct BundleCache {
    files: HashMap<String, (Vec<u8>, String)>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_artifacts(artifacts: &[Artifact]) -> Self {
        let mut cache = Self::new();
        for artifact in artifacts {
            cache.insert(
                format!("/{}", artifact.file_name),
                artifact.contents.clone(),
                artifact.content_type().to_string(),
            );
        }
        cache
    }

    pub fn insert(&mut self, path: String, content: Vec<u8>, content_type: String) {
        self.files.insert(path, (content, content_type));
    }

    pub fn get(&self, path: &str) -> Option<&(Vec<u8>, String)> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Cached paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }
}

/// What the server-side render passthrough attaches to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildContext {
    pub status: &'static str,
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub artifacts: Vec<String>,
}

pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

pub struct DevServerState {
    pub status: RwLock<BuildStatus>,
    pub cache: RwLock<BundleCache>,
    pub clients: ClientRegistry,
    next_client_id: RwLock<usize>,
    /// Bumped on every successful build.
    generation: RwLock<u64>,
    pub settings: DevServerSettings,
    root: PathBuf,
}

pub type SharedState = Arc<DevServerState>;

impl DevServerState {
    pub fn new(root: PathBuf, settings: DevServerSettings) -> Self {
        Self {
            status: RwLock::new(BuildStatus::NotStarted),
            cache: RwLock::new(BundleCache::new()),
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
            generation: RwLock::new(0),
            settings,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn start_build(&self) {
        *self.status.write() = BuildStatus::InProgress {
            started_at: Instant::now(),
        };
    }

    /// Record a successful build and swap in its bundle.
    pub fn complete_build(&self, duration_ms: u64, cache: BundleCache) {
        *self.cache.write() = cache;
        *self.generation.write() += 1;
        *self.status.write() = BuildStatus::Success { duration_ms };
    }

    /// Record a failed build. The cached bundle is left as is.
    pub fn fail_build(&self, error: String) {
        *self.status.write() = BuildStatus::Failed { error };
    }

    pub fn get_status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.read()
    }

    pub fn get_cached_file(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.cache.read().get(path).cloned()
    }

    pub fn build_context(&self) -> BuildContext {
        let status = self.get_status();
        BuildContext {
            status: status.label(),
            generation: self.generation(),
            duration_ms: match status {
                BuildStatus::Success { duration_ms } => Some(duration_ms),
                _ => None,
            },
            error: status.error().map(str::to_string),
            artifacts: self.cache.read().paths(),
        }
    }

    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(CLIENT_QUEUE);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Send `event` to every client without waiting. A client whose queue is
    /// full or closed is dropped; its page reconnects and catches up.
    pub fn broadcast(&self, event: &DevEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
        let clients = self.clients.read().clone();

        let mut gone = Vec::new();
        for (id, tx) in clients {
            match tx.try_send(json.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(client = id, "reload client stalled, dropping");
                    gone.push(id);
                }
                Err(TrySendError::Closed(_)) => gone.push(id),
            }
        }
        for id in gone {
            self.unregister_client(id);
        }
    }
}
