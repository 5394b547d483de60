//! Shared helpers for integration tests.
//!
//! Provides a fake renderer made of two halves:
//! - a shell script that stands in for the browser process and records its
//!   pid once launched
//! - an in-process server answering `GET /json` and the WebSocket upgrade on
//!   one listener, scripted per test

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use headless_pdf::transport::Deadline;
use headless_pdf::transport::frame::{self, Opcode};
use headless_pdf::transport::handshake::expected_accept;
use headless_pdf::{Exporter, RendererOptions};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

/// URL the fake page target reports once loaded.
pub const PAGE_URL: &str = "http://127.0.0.1:9/doc";

/// Target id of the fake page.
pub const TARGET_ID: &str = "C0FFEE";

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Fake Renderer Binary
// ============================================================================

/// Writes the stand-in renderer script once per test process.
///
/// The script looks for `--pid-file=PATH`, writes its pid there and then
/// becomes `sleep`, so the recorded pid stays valid.
pub fn renderer_script() -> &'static Path {
    static SCRIPT: OnceLock<PathBuf> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        let path = Path::new(env!("CARGO_TARGET_TMPDIR"))
            .join(format!("fake-renderer-{}.sh", std::process::id()));

        let mut file = fs::File::create(&path).expect("create script");
        file.write_all(
            b"#!/bin/sh\n\
              for arg in \"$@\"; do\n\
              \x20 case \"$arg\" in\n\
              \x20   --pid-file=*) target=\"${arg#--pid-file=}\"; echo $$ > \"$target.tmp\"; mv \"$target.tmp\" \"$target\" ;;\n\
              \x20 esac\n\
              done\n\
              exec sleep 30\n",
        )
        .expect("write script");
        file.sync_all().expect("sync script");
        drop(file);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    })
}

// ============================================================================
// Process Inspection
// ============================================================================

/// `true` while `/proc/<pid>` exists and is not a zombie.
pub fn is_running(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit(") ")
            .next()
            .is_some_and(|rest| !rest.starts_with('Z')),
        Err(_) => false,
    }
}

/// Waits up to `timeout` for `pid` to stop running.
pub async fn wait_until_stopped(pid: u32, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !is_running(pid)
}

// ============================================================================
// Scripted Behaviour
// ============================================================================

/// How the fake renderer behaves once launched.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answer the capture command with these PDF bytes.
    Pdf(Vec<u8>),
    /// Answer with an error object.
    RemoteError { code: i64, message: String },
    /// Answer with an empty `data` field.
    EmptyPdf,
    /// Answer with a result lacking `data`.
    MissingData,
    /// Accept the capture command and never answer.
    Silent,
    /// Reject the WebSocket upgrade with 403.
    RejectHandshake,
    /// Only ever list a blank page.
    NeverReady,
}

// ============================================================================
// FakeRenderer
// ============================================================================

/// Fake debug endpoint plus the files the stand-in process writes.
pub struct FakeRenderer {
    port: u16,
    dir: TempDir,
    task: JoinHandle<()>,
}

impl FakeRenderer {
    /// Starts the endpoint on a free port.
    pub async fn start(behavior: Behavior) -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let dir = TempDir::new().expect("temp dir");
        let pid_file = dir.path().join("renderer.pid");

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let behavior = behavior.clone();
                let pid_file = pid_file.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, port, &pid_file, &behavior).await;
                });
            }
        });

        Self { port, dir, task }
    }

    /// Port of the fake debug endpoint.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// File the stand-in process writes its pid to.
    pub fn pid_file(&self) -> PathBuf {
        self.dir.path().join("renderer.pid")
    }

    /// Pid recorded by the stand-in process, if it was launched.
    pub fn pid(&self) -> Option<u32> {
        fs::read_to_string(self.pid_file())
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    /// Output path inside this renderer's temp dir.
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("out.pdf")
    }

    /// Exporter wired to this endpoint with test-friendly timings.
    pub fn exporter(&self, ready_timeout: Duration) -> Exporter {
        Exporter::builder()
            .binary(renderer_script())
            .options(RendererOptions::bare().with_arg(format!(
                "--pid-file={}",
                self.pid_file().display()
            )))
            .debug_port(self.port)
            .poll_interval(Duration::from_millis(50))
            .ready_timeout(ready_timeout)
            .settle_delay(Duration::ZERO)
            .discovery_timeout(Duration::from_secs(1))
            .connect_timeout(Duration::from_secs(2))
            .terminate_grace(Duration::from_secs(2))
            .build()
            .expect("build exporter")
    }
}

impl Drop for FakeRenderer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Server
// ============================================================================

async fn serve(
    stream: TcpStream,
    port: u16,
    pid_file: &Path,
    behavior: &Behavior,
) -> std::io::Result<()> {
    let mut stream = BufReader::new(stream);

    let mut request_line = String::new();
    stream.read_line(&mut request_line).await?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    let mut key = None;
    loop {
        let mut line = String::new();
        if stream.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("sec-websocket-key")
        {
            key = Some(value.trim().to_string());
        }
    }

    if path == "/json" || path == "/json/list" {
        return serve_targets(stream.get_mut(), port, pid_file, behavior).await;
    }

    if path.starts_with("/devtools/page/") {
        if matches!(behavior, Behavior::RejectHandshake) {
            stream
                .get_mut()
                .write_all(b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n")
                .await?;
            return Ok(());
        }
        let accept = expected_accept(key.as_deref().unwrap_or_default());
        let response = format!(
            "HTTP/1.1 101 Switching Protocols\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Accept: {accept}\r\n\r\n"
        );
        stream.get_mut().write_all(response.as_bytes()).await?;
        return serve_websocket(stream, behavior).await;
    }

    stream
        .get_mut()
        .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n")
        .await
}

async fn serve_targets(
    stream: &mut TcpStream,
    port: u16,
    pid_file: &Path,
    behavior: &Behavior,
) -> std::io::Result<()> {
    // Not "listening" until the stand-in process has started.
    if !pid_file.exists() {
        return stream
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await;
    }

    let url = if matches!(behavior, Behavior::NeverReady) {
        "about:blank"
    } else {
        PAGE_URL
    };
    let body = json!([
        {
            "id": "SW1",
            "type": "service_worker",
            "url": "http://127.0.0.1:9/sw.js"
        },
        {
            "description": "",
            "id": TARGET_ID,
            "title": "doc",
            "type": "page",
            "url": url,
            "webSocketDebuggerUrl": format!("ws://127.0.0.1:{port}/devtools/page/{TARGET_ID}")
        }
    ])
    .to_string();

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await
}

async fn serve_websocket(
    mut stream: BufReader<TcpStream>,
    behavior: &Behavior,
) -> std::io::Result<()> {
    loop {
        let deadline = Deadline::after(Duration::from_secs(30));
        let Ok(frame) = frame::decode(&mut stream, &deadline).await else {
            return Ok(());
        };
        match frame.opcode {
            Opcode::Text => {}
            Opcode::Close => return Ok(()),
            // Pongs answering our pings.
            Opcode::Binary | Opcode::Ping | Opcode::Pong => continue,
        }

        let request: Value = serde_json::from_slice(&frame.payload).unwrap_or_default();
        let id = request["id"].clone();

        // Unrelated traffic first: an event and a ping.
        write_server_frame(
            stream.get_mut(),
            Opcode::Text,
            json!({"method": "Page.lifecycleEvent", "params": {"name": "load"}})
                .to_string()
                .as_bytes(),
        )
        .await?;
        write_server_frame(stream.get_mut(), Opcode::Ping, b"keepalive").await?;

        let reply = match behavior {
            Behavior::Pdf(bytes) => {
                json!({"id": id, "result": {"data": Base64Standard.encode(bytes)}})
            }
            Behavior::RemoteError { code, message } => {
                json!({"id": id, "error": {"code": code, "message": message}})
            }
            Behavior::EmptyPdf => json!({"id": id, "result": {"data": ""}}),
            Behavior::MissingData => json!({"id": id, "result": {"stream": "handle-1"}}),
            Behavior::Silent => continue,
            Behavior::RejectHandshake | Behavior::NeverReady => return Ok(()),
        };

        write_server_frame(stream.get_mut(), Opcode::Text, reply.to_string().as_bytes()).await?;
    }
}

/// Writes one unmasked server frame.
pub async fn write_server_frame(
    stream: &mut TcpStream,
    opcode: Opcode,
    payload: &[u8],
) -> std::io::Result<()> {
    let mut out = vec![0x80 | opcode.as_u8()];
    match payload.len() {
        len if len < 126 => out.push(len as u8),
        len if len <= usize::from(u16::MAX) => {
            out.push(126);
            out.extend_from_slice(&(len as u16).to_be_bytes());
        }
        len => {
            out.push(127);
            out.extend_from_slice(&(len as u64).to_be_bytes());
        }
    }
    out.extend_from_slice(payload);
    stream.write_all(&out).await?;
    stream.flush().await
}
