use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

const SESSION_BODY: &str = r#"{"session":{"_owner":"user-1","key":"key-1"}}"#;
const TIMING_BODY: &str = r#"{"tag":"ping","time":1}"#;

/// Request lines (`METHOD target`) the server has answered.
pub type SeenRequests = Arc<Mutex<Vec<String>>>;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    seen: SeenRequests,
}

impl ServerHandle {
    /// Snapshot of the request lines seen so far.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler thread panicked while recording.
    pub fn seen(&self) -> Result<Vec<String>, String> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .map_err(|err| format!("seen lock poisoned: {}", err))
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server that signs in any user and answers every
/// other request with a timing fragment.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let seen: SeenRequests = Arc::new(Mutex::new(Vec::new()));
    let server_seen = Arc::clone(&seen);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let seen = Arc::clone(&server_seen);
                    thread::spawn(move || handle_client(stream, &seen));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            seen,
        },
    ))
}

/// An address nothing listens on.
///
/// # Errors
///
/// Returns an error if a probe listener cannot be bound.
pub fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind probe listener failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("probe addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

/// Reads one request; returns its request line.
fn read_request(stream: &TcpStream) -> Option<String> {
    if stream.set_nonblocking(false).is_err() {
        return None;
    }
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        let read = reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if read == 0 || header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok()?;
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    Some(format!("{} {}", method, target))
}

fn handle_client(mut stream: TcpStream, seen: &SeenRequests) {
    let Some(request) = read_request(&stream) else {
        return;
    };
    let body = if request.starts_with("POST /v1/auth/signin") {
        SESSION_BODY
    } else {
        TIMING_BODY
    };
    if let Ok(mut seen) = seen.lock() {
        seen.push(request);
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `hammer` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_hammer<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = hammer_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("HAMMER_LOG")
        .output()
        .map_err(|err| format!("run hammer failed: {}", err))
}

fn hammer_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_hammer").map_or_else(
        || Err("CARGO_BIN_EXE_hammer missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
