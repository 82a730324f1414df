// SPDX-License-Identifier: AGPL-3.0
// Lanshare - Temporary HTTP server to share local files
//
// A single file is served under its own name, optionally a limited number
// of times; a directory is served with listings.

use clap::Parser;
use lanshare_core::{
    network, server, share_router, Remaining, SettingsStore, Share, ShutdownSignal,
};
use std::net::{IpAddr, SocketAddr};

#[derive(Parser, Debug)]
#[command(version, about = "Temporary HTTP server to share local files")]
struct Args {
    /// File or directory to serve
    #[arg(default_value = ".")]
    file: String,

    /// Port number to listen on [default: 8080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Limit the number of allowed GET to <COUNT> (-1 for unlimited)
    #[arg(short, long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Address to bind the listener to [default: 0.0.0.0]
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Do not copy the share URL to the clipboard
    #[arg(long)]
    no_clipboard: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lanshare=info".parse()?)
                .add_directive("lanshare_core=info".parse()?),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut settings = SettingsStore::load()?.get();
    if args.no_clipboard {
        settings.copy_to_clipboard = false;
    }
    let port = args.port.unwrap_or(settings.port);
    let bind = args.bind.unwrap_or(settings.bind_address);

    let share = Share::resolve(&args.file)?;
    let remaining = match args.count {
        Some(count) => Remaining::from_count(count)?,
        None => Remaining::Unlimited,
    };
    if !share.is_file() && remaining != Remaining::Unlimited {
        tracing::warn!("Download count only applies to single files, ignoring it");
    }

    let shutdown = ShutdownSignal::new();
    let app = share_router(&share, remaining, shutdown.clone());

    let listener = server::bind(SocketAddr::new(bind, port)).await?;
    let local_port = listener.local_addr()?.port();
    network::announce_share(
        &settings,
        &share.target_path,
        local_port,
        &share.resource_name,
    );
    if share.is_file() {
        tracing::info!("Downloads allowed: {}", remaining);
    }

    server::shutdown_on_ctrl_c(shutdown.clone());
    server::serve(listener, app, shutdown).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["lanshare"]);
        assert_eq!(args.file, ".");
        assert_eq!(args.port, None);
        assert_eq!(args.count, None);
        assert!(!args.no_clipboard);
    }

    #[test]
    fn test_args_accept_unlimited_count() {
        let args = Args::parse_from(["lanshare", "-c", "-1", "-p", "9000", "report.pdf"]);
        assert_eq!(args.file, "report.pdf");
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.count, Some(-1));
    }
}
