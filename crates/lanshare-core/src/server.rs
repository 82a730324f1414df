// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - HTTP server
//
// Two request paths exist: the bounded single-file download handler, and a
// generic file server over any ShareFs (a directory tree or one bound file).
// Both run behind axum; the serve loop stops when the ShutdownSignal fires.

use crate::counter::{DownloadCounter, Remaining, ShutdownSignal};
use crate::error::HttpError;
use crate::share::Share;
use crate::types::{ServeError, ShareKind};
use crate::vfs::{DirFs, ListingEntry, Node, ShareFs};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;

/// Characters escaped in listing hrefs
const HREF_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// State for the bounded single-file handler
pub struct FileShareState {
    /// The shared file
    pub share: Share,
    /// Remaining downloads, guarded for the check-and-consume sequence
    pub counter: DownloadCounter,
    /// Fired once the last permitted download starts
    pub shutdown: ShutdownSignal,
}

impl FileShareState {
    pub fn new(share: Share, remaining: Remaining, shutdown: ShutdownSignal) -> Self {
        Self {
            share,
            counter: DownloadCounter::new(remaining),
            shutdown,
        }
    }
}

/// Router serving one file a bounded number of times
pub fn bounded_file_router(state: Arc<FileShareState>) -> Router {
    Router::new()
        .fallback(download_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Router serving whatever a ShareFs exposes
pub fn fs_router<F: ShareFs>(fs: Arc<F>) -> Router {
    Router::new()
        .fallback(fs_handler::<F>)
        .with_state(fs)
        .layer(TraceLayer::new_for_http())
}

/// Router for a resolved share: bounded handler for files, directory tree otherwise
pub fn share_router(share: &Share, remaining: Remaining, shutdown: ShutdownSignal) -> Router {
    match share.kind {
        ShareKind::File => {
            let state = FileShareState::new(share.clone(), remaining, shutdown);
            bounded_file_router(Arc::new(state))
        }
        ShareKind::Directory => fs_router(Arc::new(DirFs::new(&share.target_path))),
    }
}

fn client_label(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown client".to_string())
}

fn decoded_path(request: &Request) -> String {
    let raw = request.uri().path();
    percent_decode_str(raw).decode_utf8_lossy().to_string()
}

fn check_method(method: &Method) -> Result<(), HttpError> {
    if method == Method::GET || method == Method::HEAD {
        Ok(())
    } else {
        Err(HttpError::MethodNotAllowed)
    }
}

fn header_value(value: String) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_bytes(value.as_bytes()).map_err(|_| HttpError::InvalidHeader(value))
}

/// Headers marking the body as a binary attachment that must not be cached
fn download_headers(share: &Share) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        HeaderName::from_static("content-transfer-encoding"),
        HeaderValue::from_static("binary"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(format!("attachment; filename={}", share.resource_name))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(share.size));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("private"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    Ok(headers)
}

/// Bounded single-file download handler
async fn download_handler(
    State(state): State<Arc<FileShareState>>,
    request: Request,
) -> Result<Response, HttpError> {
    let client = client_label(&request);
    let path = decoded_path(&request);

    if path != state.share.url_path() {
        tracing::info!("Connection from {} requesting {}", client, path);
        return Err(HttpError::NotFound);
    }

    // Held until the download is committed so exhaustion is seen exactly once
    let mut remaining = state.counter.lock().await;

    match remaining.after_this() {
        Some(left) => tracing::info!(
            "Connection from {} requesting {}, {} remaining GET",
            client,
            path,
            left
        ),
        None => tracing::info!("Connection from {} requesting {}", client, path),
    }

    check_method(request.method())?;

    // The last download already started; the listener is closing
    if remaining.is_exhausted() {
        return Err(HttpError::NotFound);
    }

    let file = tokio::fs::File::open(&state.share.target_path)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to open {}: {}",
                state.share.target_path.display(),
                e
            );
            HttpError::Io(e)
        })?;

    let headers = download_headers(&state.share)?;
    let is_head = request.method() == Method::HEAD;
    let last = !is_head && remaining.consume();
    drop(remaining);

    if last {
        tracing::info!("Download limit reached, shutting down after this response");
        state.shutdown.request();
    }

    let body = if is_head {
        Body::empty()
    } else {
        Body::from_stream(ReaderStream::new(file))
    };

    Ok((StatusCode::OK, headers, body).into_response())
}

/// Generic file server over a ShareFs
async fn fs_handler<F: ShareFs>(
    State(fs): State<Arc<F>>,
    request: Request,
) -> Result<Response, HttpError> {
    let client = client_label(&request);
    let path = decoded_path(&request);
    tracing::info!("Connection from {} requesting {}", client, path);

    check_method(request.method())?;
    let is_head = request.method() == Method::HEAD;

    let name = path.clone();
    let node = tokio::task::spawn_blocking(move || fs.open(&name))
        .await
        .map_err(std::io::Error::other)??;

    match node {
        Node::File { file, len, name } => {
            let mime = mime_guess::from_path(&name).first_or_octet_stream();
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, header_value(mime.to_string())?);
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));

            let body = if is_head {
                Body::empty()
            } else {
                Body::from_stream(ReaderStream::new(tokio::fs::File::from_std(file)))
            };
            Ok((StatusCode::OK, headers, body).into_response())
        }
        Node::Dir(entries) => {
            if !path.ends_with('/') {
                let location = format!("{}/", request.uri().path());
                return Ok((
                    StatusCode::MOVED_PERMANENTLY,
                    [(header::LOCATION, header_value(location)?)],
                )
                    .into_response());
            }

            let html = render_listing(&entries);
            let body = if is_head {
                Body::empty()
            } else {
                Body::from(html)
            };
            Ok((
                StatusCode::OK,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                )],
                body,
            )
                .into_response())
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render a directory listing as a bare `<pre>` block of links
pub fn render_listing(entries: &[ListingEntry]) -> String {
    let mut html = String::from("<pre>\n");
    for entry in entries {
        let mut name = entry.name.clone();
        if entry.is_dir {
            name.push('/');
        }
        let href = utf8_percent_encode(&name, HREF_ESCAPE).to_string();
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            href,
            escape_html(&name)
        ));
    }
    html.push_str("</pre>\n");
    html
}

/// Bind the listener
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServeError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServeError::Network(format!("Failed to bind to {}: {}", addr, e)))
}

/// Request shutdown when the process receives Ctrl-C
pub fn shutdown_on_ctrl_c(shutdown: ShutdownSignal) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupted, shutting down");
                shutdown.request();
            }
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}

/// Serve until shutdown is requested, then drain in-flight responses
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: ShutdownSignal,
) -> Result<(), ServeError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on {}", addr);
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.requested().await })
    .await
    .map_err(|e| ServeError::Network(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}
