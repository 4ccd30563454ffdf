//! Config file discovery and whole-file I/O.
//!
//! Each [`SearchPath`] resolves to a single directory, which is checked for
//! `{dir}/{file_name}`. The search runs from the **highest-priority end** of the
//! list and stops at the first regular file found. Missing files are skipped;
//! other I/O errors (permissions, a directory where a file should be) are
//! propagated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::InimapError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Find the highest-priority config file across `search_paths`.
pub fn find_config_file(
    search_paths: &[SearchPath],
    file_name: &str,
    app_name: &str,
) -> Result<Option<PathBuf>, InimapError> {
    for sp in search_paths.iter().rev() {
        let Some(dir) = resolve_search_path(sp, app_name) else {
            continue;
        };
        let path = dir.join(file_name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => return Ok(Some(path)),
            Ok(_) => return Err(InimapError::NotAFile { path }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(InimapError::io(path, e)),
        }
    }
    Ok(None)
}

/// Resolve the persist path for `config set`.
pub fn resolve_persist_path(
    persist: &SearchPath,
    file_name: &str,
    app_name: &str,
) -> Result<PathBuf, InimapError> {
    resolve_search_path(persist, app_name)
        .map(|dir| dir.join(file_name))
        .ok_or(InimapError::NoPersistPath)
}

fn ensure_regular_file(path: &Path) -> Result<(), InimapError> {
    let meta = fs::metadata(path).map_err(|e| InimapError::io(path, e))?;
    if meta.is_file() {
        Ok(())
    } else {
        Err(InimapError::NotAFile {
            path: path.to_path_buf(),
        })
    }
}

/// Read a whole file. The path must name an existing regular file.
pub fn read_regular_file(path: &Path) -> Result<String, InimapError> {
    ensure_regular_file(path)?;
    fs::read_to_string(path).map_err(|e| InimapError::io(path, e))
}

/// Replace the contents of an existing regular file. Never creates one.
pub fn overwrite_regular_file(path: &Path, contents: &str) -> Result<(), InimapError> {
    ensure_regular_file(path)?;
    fs::write(path, contents).map_err(|e| InimapError::io(path, e))
}

/// Write a file, creating it and any missing parent directories.
pub fn write_creating_dirs(path: &Path, contents: &str) -> Result<(), InimapError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| InimapError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| InimapError::io(path, e))
}
