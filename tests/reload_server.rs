use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

use assetpipe::config::ConfigFile;
use assetpipe::engine::{PipelineKind, Runtime, RuntimeEvent, TaskContext};
use assetpipe::server::{EVENTS_PATH, ReloadHub, spawn_server};

type TestResult = Result<(), Box<dyn Error>>;

/// Read from the stream until the buffer contains `needle`.
async fn read_until(stream: &mut TcpStream, needle: &str) -> TestResult {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = timeout(Duration::from_secs(5), stream.read(&mut chunk)).await??;
        if n == 0 {
            return Err(format!("stream closed before {needle:?} arrived").into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if String::from_utf8_lossy(&buf).contains(needle) {
            return Ok(());
        }
    }
}

/// Send a raw request and collect the full response of a
/// `Connection: close` endpoint.
async fn request(addr: std::net::SocketAddr, raw: &str) -> Result<String, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(raw.as_bytes()).await?;

    let mut buf = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await??;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn get(addr: std::net::SocketAddr, path: &str) -> Result<String, Box<dyn Error>> {
    request(addr, &format!("GET {path} HTTP/1.1\r\nHost: test\r\n\r\n")).await
}

#[tokio::test]
async fn serves_build_files_with_no_store() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("index.html"), "<h1>ok</h1>")?;

    let hub = ReloadHub::new();
    let server = spawn_server(dir.path().to_path_buf(), 0, false, hub).await?;

    let response = get(server.addr, "/").await?;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains("Cache-Control: no-store"));
    assert!(response.contains("<h1>ok</h1>"));

    Ok(())
}

#[tokio::test]
async fn missing_files_get_404() -> TestResult {
    let dir = tempfile::tempdir()?;
    let server = spawn_server(dir.path().to_path_buf(), 0, false, ReloadHub::new()).await?;

    let response = get(server.addr, "/nope.js").await?;
    assert!(response.starts_with("HTTP/1.1 404"));

    Ok(())
}

#[tokio::test]
async fn traversal_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("index.html"), "hi")?;
    let server = spawn_server(dir.path().to_path_buf(), 0, false, ReloadHub::new()).await?;

    let response = get(server.addr, "/../outside.txt").await?;
    assert!(response.starts_with("HTTP/1.1 404"));

    Ok(())
}

#[tokio::test]
async fn non_get_requests_are_refused() -> TestResult {
    let dir = tempfile::tempdir()?;
    let server = spawn_server(dir.path().to_path_buf(), 0, false, ReloadHub::new()).await?;

    let response = request(server.addr, "POST / HTTP/1.1\r\nHost: test\r\n\r\n").await?;
    assert!(response.starts_with("HTTP/1.1 405"));

    Ok(())
}

#[tokio::test]
async fn sse_clients_see_reload_events() -> TestResult {
    let dir = tempfile::tempdir()?;
    let hub = ReloadHub::new();
    let server = spawn_server(dir.path().to_path_buf(), 0, false, hub.clone()).await?;

    let mut stream = TcpStream::connect(server.addr).await?;
    stream
        .write_all(format!("GET {EVENTS_PATH} HTTP/1.1\r\nHost: test\r\n\r\n").as_bytes())
        .await?;

    // The header is written after the server subscribes, so once it
    // arrives a notification cannot be missed.
    read_until(&mut stream, "text/event-stream").await?;

    hub.notify();
    read_until(&mut stream, "event: reload").await?;

    Ok(())
}

/// The resident composition behind `default`: server up, runtime loop
/// reacting to triggers, shutdown on request.
#[tokio::test]
async fn resident_runtime_serves_builds_and_shuts_down() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("dev/assets/js"))?;
    std::fs::write(dir.path().join("dev/assets/js/app.js"), "const a = 1;\n")?;

    let mut cfg = ConfigFile::default();
    cfg.project.dev_dir = dir.path().join("dev").display().to_string();
    cfg.project.build_dir = dir.path().join("build").display().to_string();
    std::fs::create_dir_all(&cfg.project.build_dir)?;

    let hub = ReloadHub::new();
    let ctx = Arc::new(TaskContext::new(cfg, hub.clone()));

    let server = spawn_server(ctx.paths.build_dir.clone(), 0, false, hub.clone()).await?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let runtime = Runtime::new(Arc::clone(&ctx), rt_rx, rt_tx.clone());
    let runtime_task = tokio::spawn(runtime.run());

    // A watch trigger rebuilds scripts and notifies the reload channel.
    let mut reload_rx = hub.subscribe();
    rt_tx
        .send(RuntimeEvent::PipelineTriggered {
            kind: PipelineKind::Scripts,
        })
        .await?;
    timeout(Duration::from_secs(5), reload_rx.recv()).await??;

    // The server answers with the freshly built artifact while the
    // runtime is resident.
    let response = get(server.addr, "/js/app.min.js").await?;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains("var a=1;"));

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    timeout(Duration::from_secs(5), runtime_task).await???;

    Ok(())
}
