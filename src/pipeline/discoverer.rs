use crate::error::PipelineError;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Walks `root`'s immediate children, collapsing single-child wrapper folders (mod distributions
/// are commonly zipped with an extra enclosing directory, so a folder with no files and exactly
/// one subdirectory is replaced by that subdirectory, repeatedly, until it stops matching).
///
/// A missing or unreadable root is fatal; an individual unreadable child is skipped and logged.
pub fn discover_mod_folders(root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(root)
        .map_err(|e| PipelineError::RootUnreadable(root.to_path_buf(), e))?;

    let mut folders = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry under '{}': {}", root.display(), e);
                continue;
            }
        };

        let path = entry.path();
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => folders.push(unwrap_single_child(&path)),
            Ok(_) => continue,
            Err(e) => {
                warn!("skipping entry with unreadable file type '{}': {}", path.display(), e);
                continue;
            }
        }
    }
    Ok(folders)
}

/// While `dir` contains no files and exactly one subdirectory, descends into it.
fn unwrap_single_child(dir: &Path) -> PathBuf {
    let mut current = dir.to_path_buf();
    loop {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(_) => return current,
        };

        let mut subdirs = Vec::new();
        let mut has_files = false;
        let mut read_error = false;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => {
                    read_error = true;
                    break;
                }
            };
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => subdirs.push(entry.path()),
                Ok(_) => has_files = true,
                Err(_) => {
                    read_error = true;
                    break;
                }
            }
        }

        if read_error || has_files || subdirs.len() != 1 {
            return current;
        }
        current = subdirs.into_iter().next().expect("checked len == 1 above");
    }
}
