// src/server/static_files.rs

//! Static file server for the build directory, with an SSE endpoint for
//! live reload.
//!
//! Deliberately small: GET only, one response per connection. Note that
//! pipelines write destination files in place, so a request racing a
//! build may observe partially written output; that is accepted here just
//! as it was in the original.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::server::reload::ReloadHub;

/// Path browsers subscribe to for reload events.
pub const EVENTS_PATH: &str = "/__assetpipe/events";

/// Handle to a running server.
#[derive(Debug)]
pub struct ServerHandle {
    /// Actual bound address (useful when the configured port was 0 in
    /// tests).
    pub addr: std::net::SocketAddr,
}

/// Bind and start serving `root`. Binds loopback only when `online` is
/// false.
pub async fn spawn_server(
    root: PathBuf,
    port: u16,
    online: bool,
    hub: ReloadHub,
) -> Result<ServerHandle> {
    let host = if online { "0.0.0.0" } else { "127.0.0.1" };
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding live-reload server on {host}:{port}"))?;
    let addr = listener.local_addr()?;

    info!(%addr, root = ?root, "live-reload server listening");

    tokio::spawn(async move {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    continue;
                }
            };
            debug!(%peer, "connection accepted");

            let root = root.clone();
            let hub = hub.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, &root, hub).await {
                    debug!(error = %err, "connection error");
                }
            });
        }
    });

    Ok(ServerHandle { addr })
}

async fn handle_connection(stream: TcpStream, root: &Path, hub: ReloadHub) -> Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    // Drain headers; nothing in them changes our answer.
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();

    let mut stream = reader.into_inner();

    if method != "GET" {
        write_simple(&mut stream, 405, "method not allowed").await?;
        return Ok(());
    }

    let path = target.split('?').next().unwrap_or(target);

    if path == EVENTS_PATH {
        return serve_events(stream, hub).await;
    }

    match resolve(root, path) {
        Some(file) => serve_file(&mut stream, &file).await,
        None => write_simple(&mut stream, 404, "not found").await,
    }
}

/// Map a request path onto the build tree. Rejects traversal; directories
/// fall back to their `index.html`.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.split('/').any(|seg| seg == "..") {
        return None;
    }

    let mut file = root.join(trimmed);
    if file.is_dir() || trimmed.is_empty() {
        file = file.join("index.html");
    }

    file.is_file().then_some(file)
}

async fn serve_file(stream: &mut TcpStream, file: &Path) -> Result<()> {
    let body = tokio::fs::read(file).await?;
    let mime = content_type(file);

    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {mime}\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(&body).await?;
    stream.flush().await?;
    Ok(())
}

/// Server-sent events: one `reload` event per notification, held open
/// until the client goes away.
async fn serve_events(mut stream: TcpStream, hub: ReloadHub) -> Result<()> {
    let mut rx = hub.subscribe();

    let header = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-store\r\nConnection: keep-alive\r\n\r\n";
    stream.write_all(header.as_bytes()).await?;
    stream.flush().await?;

    loop {
        match rx.recv().await {
            Ok(()) => {
                if stream
                    .write_all(b"event: reload\ndata: changed\n\n")
                    .await
                    .is_err()
                {
                    break;
                }
                stream.flush().await?;
            }
            // Lagged just means we missed some notifications; one reload
            // covers them all.
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }

    Ok(())
}

async fn write_simple(stream: &mut TcpStream, status: u16, reason: &str) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reason}",
        reason.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json" | "map") => "application/json; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "hi").unwrap();
        assert!(resolve(dir.path(), "/../secret").is_none());
        assert!(resolve(dir.path(), "/a/../../b").is_none());
    }

    #[test]
    fn resolve_falls_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "hi").unwrap();
        let file = resolve(dir.path(), "/").unwrap();
        assert!(file.ends_with("index.html"));
    }

    #[test]
    fn content_types_cover_build_artifacts() {
        assert_eq!(
            content_type(Path::new("style.min.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(
            content_type(Path::new("app.min.js.map")),
            "application/json; charset=utf-8"
        );
    }
}
