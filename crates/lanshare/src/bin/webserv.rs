// SPDX-License-Identifier: AGPL-3.0
// Lanshare Webserv - Legacy single-file / directory server
//
// Serves either a directory tree or exactly one bound file through the
// generic file server. No download limit.

use clap::Parser;
use lanshare_core::{fs_router, network, server, BoundFile, DirFs, SettingsStore, ShutdownSignal};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "Temporary http server to serve files")]
struct Args {
    /// Serve the given directory
    #[arg(short, long, default_value = "./", conflicts_with = "file")]
    dir: String,

    /// Serve the given file
    #[arg(short, long)]
    file: Option<String>,

    /// Port number to listen on [default: 8080]
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lanshare_webserv=info".parse()?)
                .add_directive("lanshare_core=info".parse()?),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let settings = SettingsStore::load()?.get();
    let port = args.port.unwrap_or(settings.port);

    let (app, target, resource) = match &args.file {
        Some(file) => {
            let bound = BoundFile::new(file);
            bound.check_servable()?;
            let resource = bound.virtual_path().trim_start_matches('/').to_string();
            let target = bound.real_path().to_path_buf();
            (fs_router(Arc::new(bound)), target, resource)
        }
        None => {
            let dir = DirFs::new(&args.dir);
            let target = dir.root().to_path_buf();
            if !target.is_dir() {
                anyhow::bail!("{}: not a directory", target.display());
            }
            (fs_router(Arc::new(dir)), target, String::new())
        }
    };

    let listener = server::bind(SocketAddr::new(settings.bind_address, port)).await?;
    let local_port = listener.local_addr()?.port();
    network::announce_share(&settings, &target, local_port, &resource);

    let shutdown = ShutdownSignal::new();
    server::shutdown_on_ctrl_c(shutdown.clone());
    server::serve(listener, app, shutdown).await?;

    Ok(())
}
