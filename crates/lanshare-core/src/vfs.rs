// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Virtual filesystems
//
// The file server only knows how to "open by virtual path". Two variants
// exist: a real directory tree, and a single bound file that refuses every
// other name.

use crate::path;
use crate::types::ServeError;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Failure to open a virtual path
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The name is not one this filesystem will ever serve
    #[error("invalid request")]
    InvalidRequest,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            // Interior NUL bytes and similar names that can never exist on disk
            ErrorKind::NotFound | ErrorKind::InvalidInput => FsError::NotFound,
            _ => FsError::Io(err),
        }
    }
}

/// One line of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Result of opening a virtual path
#[derive(Debug)]
pub enum Node {
    File { file: File, len: u64, name: String },
    Dir(Vec<ListingEntry>),
}

/// Open-by-virtual-path capability consumed by the file server
pub trait ShareFs: Send + Sync + 'static {
    /// Open `name`, a '/'-rooted path as taken from the request URL
    fn open(&self, name: &str) -> Result<Node, FsError>;
}

/// Page served in place of a listing when a directory contains it
pub const INDEX_PAGE: &str = "index.html";

/// A real directory tree
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ShareFs for DirFs {
    fn open(&self, name: &str) -> Result<Node, FsError> {
        // Rooting before cleaning means ".." can never climb above the root
        let cleaned = path::clean(&format!("/{}", name));
        let relative = cleaned.trim_start_matches('/');
        let full = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        };

        let metadata = fs::metadata(&full)?;
        if metadata.is_dir() {
            // Without the trailing slash the caller redirects first
            if name.ends_with('/') {
                let index = full.join(INDEX_PAGE);
                if fs::metadata(&index).map(|m| m.is_file()).unwrap_or(false) {
                    return open_file(&index, INDEX_PAGE.to_string());
                }
            }
            return Ok(Node::Dir(read_listing(&full)?));
        }

        open_file(&full, path::base(&cleaned))
    }
}

fn open_file(full: &Path, name: String) -> Result<Node, FsError> {
    let file = File::open(full)?;
    let len = file.metadata()?.len();
    Ok(Node::File { file, len, name })
}

fn read_listing(dir: &Path) -> Result<Vec<ListingEntry>, FsError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        // Follow symlinks so linked directories list with a trailing slash
        let is_dir = fs::metadata(entry.path())
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(ListingEntry { name, is_dir });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Exactly one real file, reachable under exactly one virtual path.
///
/// The virtual path is `/` followed by the cleaned bound path (with any
/// leading `/` removed, so absolute bound paths work too). A request matches
/// only if it is already in cleaned form and equal byte for byte; anything
/// else, including traversal sequences that would clean to the same name,
/// fails with [`FsError::InvalidRequest`].
#[derive(Debug, Clone)]
pub struct BoundFile {
    real_path: PathBuf,
    virtual_path: String,
}

impl BoundFile {
    pub fn new(bound: &str) -> Self {
        let cleaned = path::clean(bound);
        let virtual_path = format!("/{}", cleaned.trim_start_matches('/'));
        Self {
            real_path: PathBuf::from(cleaned),
            virtual_path,
        }
    }

    /// The only name this filesystem answers to
    pub fn virtual_path(&self) -> &str {
        &self.virtual_path
    }

    pub fn real_path(&self) -> &Path {
        &self.real_path
    }

    /// Startup check that the bound file can actually be downloaded.
    ///
    /// Fails when the virtual path is not in cleaned form (a bound path
    /// starting with `..` yields `/../name`, which no request can match) or
    /// when the target is missing or not a regular file.
    pub fn check_servable(&self) -> Result<(), ServeError> {
        if !path::is_clean(&self.virtual_path) {
            return Err(ServeError::InvalidPath(format!(
                "{} climbs above the served root and could never be requested",
                self.real_path.display()
            )));
        }

        let metadata = fs::metadata(&self.real_path).map_err(|e| {
            ServeError::InvalidPath(format!("{}: {}", self.real_path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(ServeError::UnsupportedFileType(format!(
                "{} is not a regular file",
                self.real_path.display()
            )));
        }
        Ok(())
    }
}

impl ShareFs for BoundFile {
    fn open(&self, name: &str) -> Result<Node, FsError> {
        if !path::is_clean(name) || name != self.virtual_path {
            return Err(FsError::InvalidRequest);
        }

        let file = File::open(&self.real_path).map_err(FsError::Io)?;
        let metadata = file.metadata().map_err(FsError::Io)?;
        if !metadata.is_file() {
            return Err(FsError::InvalidRequest);
        }

        Ok(Node::File {
            file,
            len: metadata.len(),
            name: path::base(&self.virtual_path),
        })
    }
}
