// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Type definitions

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Default port for the HTTP listener
pub const DEFAULT_PORT: u16 = 8080;

/// What a share exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    File,
    Directory,
}

impl ShareKind {
    /// Human readable label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Server settings (read-only, command-line flags take precedence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServeSettings {
    /// Port for the HTTP listener (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address to bind the listener to (default: all IPv4 interfaces)
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// Copy the share URL to the clipboard on startup
    #[serde(default = "default_true")]
    pub copy_to_clipboard: bool,
    /// Look up the outbound IP for the displayed URL
    #[serde(default = "default_true")]
    pub show_outbound_ip: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_true() -> bool {
    true
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            copy_to_clipboard: true,
            show_outbound_ip: true,
        }
    }
}

/// Error types for startup and serving
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid download count: {0}")]
    InvalidCount(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("File I/O error: {0}")]
    FileIo(String),
}
