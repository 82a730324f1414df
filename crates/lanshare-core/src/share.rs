// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Share resolution
//
// A share is resolved exactly once at startup; nothing about it changes
// while the server runs.

use crate::path;
use crate::types::{ServeError, ShareKind};
use std::path::PathBuf;

/// The single file or directory exposed by one running instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    /// Cleaned filesystem path of the shared target
    pub target_path: PathBuf,
    /// Public URL name; empty for directories
    pub resource_name: String,
    /// File or directory
    pub kind: ShareKind,
    /// Byte length at startup (0 for directories)
    pub size: u64,
}

impl Share {
    /// Resolve a user-supplied path into a share
    pub fn resolve(raw: &str) -> Result<Self, ServeError> {
        let cleaned = path::clean(raw);
        let mut resource_name = path::base(&cleaned);

        let metadata = std::fs::metadata(&cleaned)
            .map_err(|e| ServeError::InvalidPath(format!("{}: {}", cleaned, e)))?;

        let file_type = metadata.file_type();
        let (kind, size) = if file_type.is_file() {
            if resource_name == "." || resource_name == ".." || resource_name == "/" {
                return Err(ServeError::InvalidPath(format!(
                    "{}: cannot derive a file name",
                    cleaned
                )));
            }
            (ShareKind::File, metadata.len())
        } else if file_type.is_dir() {
            resource_name.clear();
            (ShareKind::Directory, 0)
        } else {
            return Err(ServeError::UnsupportedFileType(cleaned));
        };

        tracing::debug!(
            "Resolved {} share {} as /{}",
            kind.label(),
            cleaned,
            resource_name
        );

        Ok(Self {
            target_path: PathBuf::from(cleaned),
            resource_name,
            kind,
            size,
        })
    }

    /// URL path under which the share is reachable
    pub fn url_path(&self) -> String {
        format!("/{}", self.resource_name)
    }

    pub fn is_file(&self) -> bool {
        self.kind == ShareKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.pdf");
        fs::write(&file, vec![7u8; 1024]).unwrap();

        let share = Share::resolve(file.to_str().unwrap()).unwrap();
        assert_eq!(share.kind, ShareKind::File);
        assert_eq!(share.resource_name, "report.pdf");
        assert_eq!(share.size, 1024);
        assert_eq!(share.url_path(), "/report.pdf");
    }

    #[test]
    fn test_resolve_cleans_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();

        let raw = format!("{}/sub/../notes.txt", dir.path().display());
        let share = Share::resolve(&raw).unwrap();
        assert_eq!(share.target_path, dir.path().join("notes.txt"));
        assert_eq!(share.resource_name, "notes.txt");
    }

    #[test]
    fn test_resolve_directory_has_empty_resource() {
        let dir = TempDir::new().unwrap();
        let raw = format!("{}/", dir.path().display());

        let share = Share::resolve(&raw).unwrap();
        assert_eq!(share.kind, ShareKind::Directory);
        assert_eq!(share.resource_name, "");
        assert_eq!(share.url_path(), "/");
        assert!(!share.is_file());
    }

    #[test]
    fn test_resolve_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = Share::resolve(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ServeError::InvalidPath(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_special_files() {
        let err = Share::resolve("/dev/null").unwrap_err();
        assert!(matches!(err, ServeError::UnsupportedFileType(_)));
    }
}
