//! Development server for the web target.
//!
//! - [`server`] serves the last good bundle, the static directories and a
//!   reload channel over HTTP
//! - [`watcher`] turns file system events under `src/` into [`FileChange`]s
//! - [`rebuild`] runs at most one rebuild at a time and folds changes that
//!   arrive mid-build into a single follow-up
//! - [`builder`] performs one rebuild and publishes the result

pub mod builder;
pub mod rebuild;
pub mod server;
pub mod state;
pub mod watcher;

pub use builder::DevBuilder;
pub use rebuild::{Rebuild, RebuildLoop};
pub use server::DevServer;
pub use state::{BuildContext, BuildStatus, BundleCache, DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher};

use serde::{Deserialize, Serialize};

/// Events pushed to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    BuildStarted,
    /// The new bundle is on disk and in the cache; clients reload.
    BuildCompleted { duration_ms: u64 },
    /// The previous bundle is still being served.
    BuildFailed { error: String },
}
