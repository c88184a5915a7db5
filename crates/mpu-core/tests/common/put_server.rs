//! Minimal HTTP/1.1 server that accepts PUT for integration tests.
//!
//! Stores each request body under its path and answers 200 with an `ETag`.
//! Paths can be scripted to answer with error statuses first (503, 403).

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct State {
    /// Statuses to return, in order, before a path is accepted.
    script: HashMap<String, Vec<u16>>,
    bodies: HashMap<String, Vec<u8>>,
    requests: HashMap<String, u32>,
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct PutServer {
    base_url: String,
    state: Arc<Mutex<State>>,
}

impl PutServer {
    /// Full URL for `path` (without a leading slash).
    pub fn url(&self, path: &str) -> url::Url {
        url::Url::parse(&format!("{}{}", self.base_url, path)).unwrap()
    }

    /// Answer the next requests to `/path` with `statuses` before accepting it.
    pub fn script(&self, path: &str, statuses: &[u16]) {
        self.state
            .lock()
            .unwrap()
            .script
            .insert(format!("/{}", path), statuses.to_vec());
    }

    /// Body stored for `/path`, if a PUT to it succeeded.
    pub fn body(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().bodies.get(&format!("/{}", path)).cloned()
    }

    /// Requests seen for `/path`, including scripted failures.
    pub fn requests(&self, path: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .requests
            .get(&format!("/{}", path))
            .copied()
            .unwrap_or(0)
    }
}

/// ETag the server returns for an accepted body at `path`.
pub fn etag_for(path: &str, len: usize) -> String {
    format!("\"{}-{}\"", path.trim_start_matches('/').replace('/', "-"), len)
}

/// Starts the server in a background thread on an ephemeral port.
pub fn start() -> PutServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State::default()));
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    PutServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };
    let head = match std::str::from_utf8(&buf[..header_end]) {
        Ok(s) => s.to_string(),
        Err(_) => return,
    };
    let (method, path, content_length) = parse_head(&head);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }

    if !method.eq_ignore_ascii_case("PUT") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    let scripted = {
        let mut st = state.lock().unwrap();
        *st.requests.entry(path.clone()).or_default() += 1;
        st.script
            .get_mut(&path)
            .and_then(|v| (!v.is_empty()).then(|| v.remove(0)))
    };
    let response = match scripted {
        Some(status) => format!(
            "HTTP/1.1 {} Scripted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        ),
        None => {
            let etag = etag_for(&path, body.len());
            state.lock().unwrap().bodies.insert(path, body);
            format!(
                "HTTP/1.1 200 OK\r\nETag: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                etag
            )
        }
    };
    let _ = stream.write_all(response.as_bytes());
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Returns (method, path, Content-Length).
fn parse_head(head: &str) -> (String, String, usize) {
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("").to_string();
    let target = request_line.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();
    let mut content_length = 0;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    (method, path, content_length)
}
