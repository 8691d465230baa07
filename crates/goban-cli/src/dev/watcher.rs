//! File system watcher for the dev loop.
//!
//! Watches the source tree recursively and forwards relevant changes. No
//! debouncing happens here; the rebuild loop folds bursts together.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// Directories under the project root whose changes never trigger a rebuild.
pub const DEFAULT_IGNORES: &[&str] = &["node_modules", "lib", "node"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: &Path) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path.to_path_buf())),
            EventKind::Modify(_) => Some(FileChange::Modified(path.to_path_buf())),
            EventKind::Remove(_) => Some(FileChange::Removed(path.to_path_buf())),
            _ => None,
        }
    }
}

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    watched: PathBuf,
}

impl FileWatcher {
    /// Watch `watched` (normally `<root>/src`). Paths are filtered relative
    /// to `root`.
    ///
    /// When the channel is full a change is dropped: a rebuild is already
    /// pending and will pick it up.
    pub fn new(
        watched: PathBuf,
        root: PathBuf,
        ignore_patterns: Vec<String>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !watched.is_dir() {
            return Err(CliError::FileNotFound(watched));
        }

        let (tx, rx) = mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "file watcher error");
                    return;
                }
            };
            for path in &event.paths {
                if Self::should_ignore(path, &root, &ignore_patterns) {
                    continue;
                }
                if let Some(change) = FileChange::from_event(&event.kind, path) {
                    tracing::debug!(path = %path.display(), "source changed");
                    let _ = tx.try_send(change);
                }
            }
        })?;

        watcher.watch(&watched, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                watched,
            },
            rx,
        ))
    }

    /// Ignore anything outside `root`, under an ignored directory, hidden,
    /// or an editor temp file.
    pub fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        let Ok(rel_path) = path.strip_prefix(root) else {
            return true;
        };

        let mut components = rel_path.components().peekable();
        if let Some(first) = components.peek() {
            let first = first.as_os_str().to_string_lossy();
            if ignore_patterns.iter().any(|p| *p == first) {
                return true;
            }
        }

        for component in rel_path.components() {
            let name = component.as_os_str().to_string_lossy();
            if name.starts_with('.') && name != "." && name != ".." {
                return true;
            }
            if name == "node_modules" {
                return true;
            }
        }

        let name = rel_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.ends_with('~') || name.ends_with(".swp") || name.ends_with(".tmp")
    }

    pub fn watched(&self) -> &Path {
        &self.watched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignores() -> Vec<String> {
        DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_source_files_are_watched() {
        let root = PathBuf::from("/goban");
        let path = PathBuf::from("/goban/src/engine/GoEngine.ts");
        assert!(!FileWatcher::should_ignore(&path, &root, &ignores()));
    }

    #[test]
    fn test_output_and_dependency_dirs_are_ignored() {
        let root = PathBuf::from("/goban");
        for path in [
            "/goban/lib/goban.js",
            "/goban/node/engine.js",
            "/goban/node_modules/react/index.js",
            "/goban/src/node_modules/x.js",
        ] {
            assert!(
                FileWatcher::should_ignore(Path::new(path), &root, &ignores()),
                "{path}"
            );
        }
    }

    #[test]
    fn test_hidden_and_temp_files_are_ignored() {
        let root = PathBuf::from("/goban");
        assert!(FileWatcher::should_ignore(Path::new("/goban/src/.index.ts.swp"), &root, &[]));
        assert!(FileWatcher::should_ignore(Path::new("/goban/src/index.ts~"), &root, &[]));
        assert!(FileWatcher::should_ignore(Path::new("/goban/.git/HEAD"), &root, &[]));
    }

    #[test]
    fn test_outside_root_is_ignored() {
        let root = PathBuf::from("/goban");
        assert!(FileWatcher::should_ignore(Path::new("/other/src/a.ts"), &root, &[]));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = FileWatcher::new(
            PathBuf::from("/definitely/not/here/src"),
            PathBuf::from("/definitely/not/here"),
            ignores(),
        );
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[test]
    fn test_change_kinds() {
        let path = Path::new("/goban/src/test.tsx");
        let created = FileChange::from_event(&EventKind::Create(notify::event::CreateKind::File), path);
        assert_eq!(created, Some(FileChange::Created(path.to_path_buf())));
        assert_eq!(FileChange::from_event(&EventKind::Any, path), None);
    }
}
