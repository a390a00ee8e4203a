//! JSON persistence helpers shared by the map stores.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapStoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid level {}: {reason}", .path.display())]
    InvalidLevel { path: PathBuf, reason: String },
}

impl MapStoreError {
    /// True when the file simply does not exist yet.
    pub fn is_missing(&self) -> bool {
        matches!(self, MapStoreError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MapStoreError> {
    let text = fs::read_to_string(path).map_err(|source| MapStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| MapStoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` to `path`, through a temp file and a rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), MapStoreError> {
    let io_err = |source| MapStoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| MapStoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

/// Unify path separators to `/`.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_file_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<BTreeMap<String, String>>(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let mut value = BTreeMap::new();
        value.insert("키".to_string(), "값".to_string());
        write_json_atomic(&path, &value).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("값"));
        let back: BTreeMap<String, String> = read_json(&path).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json::<BTreeMap<String, String>>(&path).unwrap_err();
        assert!(matches!(err, MapStoreError::Json { .. }));
        assert!(!err.is_missing());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(r"assets\tiles\1-1.png"), "assets/tiles/1-1.png");
    }
}
