//! Recursive discovery of input files.

use crate::error::EtlError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Returns the absolute paths of every file under `root` whose extension is
/// `extension`, at any depth.
///
/// Entries are visited sorted by file name within each directory, so the
/// order is the same on every run. Hidden files (leading `.`) are not
/// matched, hidden directories are still descended into. A root with no
/// matching files yields an empty list.
pub fn find_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, EtlError> {
    let root = root
        .canonicalize()
        .map_err(|e| EtlError::file_system(root, e))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root.as_path()).to_path_buf();
            EtlError::file_system(&path, e.into())
        })?;

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && matches_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    debug!(
        "Discovered {} .{} files under {}",
        files.len(),
        extension,
        root.display()
    );
    Ok(files)
}

fn matches_extension(path: &Path, extension: &str) -> bool {
    let is_hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(true);
    !is_hidden && path.extension().and_then(|e| e.to_str()) == Some(extension)
}
