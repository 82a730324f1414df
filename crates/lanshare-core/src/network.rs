// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Share URL presentation
//
// Only used to tell the user where the share lives. Nothing here is fatal.

use crate::types::{ServeError, ServeSettings};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

/// The local IP other machines on the network would reach us at
pub fn outbound_ip() -> IpAddr {
    match local_ip_address::local_ip() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::warn!("Could not determine outbound IP, using loopback: {}", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Build the URL shown to the user
pub fn share_url(ip: IpAddr, port: u16, resource: &str) -> String {
    match ip {
        IpAddr::V4(v4) => format!("http://{}:{}/{}", v4, port, resource),
        IpAddr::V6(v6) => format!("http://[{}]:{}/{}", v6, port, resource),
    }
}

/// Put the share URL on the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<(), ServeError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ServeError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ServeError::Clipboard(e.to_string()))
}

/// Log where the share is reachable and copy the URL if enabled. Returns the URL.
pub fn announce_share(
    settings: &ServeSettings,
    target: &Path,
    port: u16,
    resource: &str,
) -> String {
    let ip = if settings.show_outbound_ip {
        outbound_ip()
    } else {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    };
    let url = share_url(ip, port, resource);
    tracing::info!("Serving {} at {}", target.display(), url);

    if settings.copy_to_clipboard {
        if let Err(e) = copy_to_clipboard(&url) {
            tracing::warn!("Failed to copy URL to clipboard: {}", e);
        }
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_share_url_v4() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(
            share_url(ip, 8080, "report.pdf"),
            "http://192.168.1.20:8080/report.pdf"
        );
        assert_eq!(share_url(ip, 9000, ""), "http://192.168.1.20:9000/");
    }

    #[test]
    fn test_share_url_v6_is_bracketed() {
        let ip = IpAddr::V6(Ipv6Addr::LOCALHOST);
        assert_eq!(share_url(ip, 8080, "a.txt"), "http://[::1]:8080/a.txt");
    }

    #[test]
    fn test_announce_without_lookup_or_clipboard() {
        let settings = ServeSettings {
            copy_to_clipboard: false,
            show_outbound_ip: false,
            ..ServeSettings::default()
        };
        let url = announce_share(&settings, Path::new("docs/report.pdf"), 8081, "report.pdf");
        assert_eq!(url, "http://127.0.0.1:8081/report.pdf");
    }
}
