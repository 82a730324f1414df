// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Request serving logic shared by the command-line tools
//
// This crate provides:
// - Share resolution (file vs directory, public resource name)
// - The bounded single-file download handler and its counter
// - Virtual filesystems: a directory tree and a single bound file
// - The generic file server and the serve loop
// - Read-only settings and share URL presentation

pub mod counter;
pub mod error;
pub mod network;
pub mod path;
pub mod server;
pub mod settings;
pub mod share;
pub mod types;
pub mod vfs;

// Re-export commonly used items
pub use counter::{DownloadCounter, Remaining, ShutdownSignal};
pub use error::HttpError;
pub use server::{bounded_file_router, fs_router, serve, share_router, FileShareState};
pub use settings::SettingsStore;
pub use share::Share;
pub use types::{ServeError, ServeSettings, ShareKind};
pub use vfs::{BoundFile, DirFs, FsError, ShareFs};
