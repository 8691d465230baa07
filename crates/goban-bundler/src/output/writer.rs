//! All-or-nothing artifact writes.
//!
//! Every file of every target in one build is staged as `<name>.tmp` next to
//! its destination, then renamed into place. If staging fails, the staged
//! files are removed. If a rename fails partway, the files already renamed
//! are rolled back to their previous contents. Either way a previously
//! written build stays intact.
//!
//! Each destination is normalized with `path_clean` and must stay inside its
//! output directory.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::{Artifact, Error, Result};

/// Write several targets' artifacts as one atomic batch.
///
/// ```no_run
/// use goban_bundler::{Artifact, output::write_targets};
/// use std::path::PathBuf;
///
/// # fn example() -> goban_bundler::Result<()> {
/// let web = vec![Artifact::new("goban.min.js", "...")];
/// let node = vec![Artifact::new("engine.js", "...")];
/// write_targets(&[
///     (PathBuf::from("lib"), web.as_slice()),
///     (PathBuf::from("node"), node.as_slice()),
/// ])?;
/// # Ok(())
/// # }
/// ```
pub fn write_targets(targets: &[(PathBuf, &[Artifact])]) -> Result<()> {
    let mut operations = Vec::new();

    for (dir, artifacts) in targets {
        let dir = validate_and_normalize_dir(dir)?;
        fs::create_dir_all(&dir).map_err(|e| {
            Error::WriteFailure(format!(
                "Failed to create output directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        for artifact in artifacts.iter() {
            let target_path = validate_output_path(&dir, &artifact.file_name)?;
            operations.push((target_path, artifact.contents.as_slice()));
        }
    }

    write_files_atomic(&operations)?;
    tracing::debug!(files = operations.len(), "wrote artifacts");
    Ok(())
}

fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();

    let absolute = if cleaned.is_absolute() {
        cleaned
    } else {
        std::env::current_dir()
            .map_err(|e| {
                Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
            })?
            .join(&cleaned)
            .clean()
    };

    Ok(absolute)
}

/// Resolve `filename` under `base_dir`, rejecting anything that escapes it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Empty filename".to_string()));
    }
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// `target` with `.<suffix>` appended to its full file name.
fn sibling_path(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    target.with_file_name(name)
}

/// A file moved into place, and where its predecessor was parked.
struct Committed {
    target: PathBuf,
    backup: Option<PathBuf>,
}

/// Stage every file, then rename them all into place.
///
/// An existing destination is parked as `<name>.bak` before its replacement
/// lands. If any rename fails, the files already moved are taken back out
/// and the parked ones restored.
fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = sibling_path(target_path, "tmp");
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    let mut committed = Vec::with_capacity(temp_files.len());
    for (temp_path, target_path) in &temp_files {
        if let Err(e) = commit_one(temp_path, target_path, &mut committed) {
            rollback(&committed);
            cleanup_temp_files(&temp_files);
            return Err(e);
        }
    }

    for entry in &committed {
        if let Some(backup) = &entry.backup {
            if let Err(e) = fs::remove_file(backup) {
                tracing::warn!(path = %backup.display(), error = %e, "failed to remove backup");
            }
        }
    }

    Ok(())
}

fn commit_one(temp_path: &Path, target_path: &Path, committed: &mut Vec<Committed>) -> Result<()> {
    let backup = if target_path.is_file() {
        let backup = sibling_path(target_path, "bak");
        fs::rename(target_path, &backup).map_err(|e| {
            Error::WriteFailure(format!(
                "Failed to set aside '{}': {}",
                target_path.display(),
                e
            ))
        })?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(temp_path, target_path) {
        if let Some(backup) = &backup {
            restore(backup, target_path);
        }
        return Err(Error::WriteFailure(format!(
            "Failed to rename '{}' to '{}': {}",
            temp_path.display(),
            target_path.display(),
            e
        )));
    }

    committed.push(Committed {
        target: target_path.to_path_buf(),
        backup,
    });
    Ok(())
}

/// Undo committed renames, newest first. Best effort; we are already failing.
fn rollback(committed: &[Committed]) {
    for entry in committed.iter().rev() {
        match &entry.backup {
            Some(backup) => restore(backup, &entry.target),
            None => {
                if let Err(e) = fs::remove_file(&entry.target) {
                    tracing::warn!(
                        path = %entry.target.display(),
                        error = %e,
                        "failed to remove partially written file"
                    );
                }
            }
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = fs::rename(backup, target) {
        tracing::warn!(
            path = %target.display(),
            backup = %backup.display(),
            error = %e,
            "failed to restore previous file"
        );
    }
}

/// Best effort; we are already failing.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}
