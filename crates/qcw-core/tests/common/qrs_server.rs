//! Minimal HTTP/1.1 server imitating the QRS endpoints the warmer calls.
//!
//! Records every request (method, target, headers, body) and serves canned
//! JSON. Like the real QRS it answers 403 when the `xrfkey` query parameter
//! and the `X-Qlik-Xrfkey` header disagree. One request per connection.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct QrsServerOptions {
    /// `/qrs/about` answers 503.
    pub fail_probe: bool,
    /// Requests impersonating one of these user ids answer 500.
    pub fail_users: Vec<String>,
    /// Sleep before answering each request.
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.target.split_once('?')?;
        query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Target with the per-connection `xrfkey` parameter removed.
    pub fn target_without_xrfkey(&self) -> String {
        let (path, query) = match self.target.split_once('?') {
            Some(pq) => pq,
            None => return self.target.clone(),
        };
        let rest: Vec<&str> = query
            .split('&')
            .filter(|kv| !kv.starts_with("xrfkey="))
            .collect();
        if rest.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, rest.join("&"))
        }
    }
}

pub struct QrsServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl QrsServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests made while impersonating `user_id`.
    pub fn requests_for(&self, user_id: &str) -> Vec<RecordedRequest> {
        let needle = format!("UserId={}", user_id);
        self.requests()
            .into_iter()
            .filter(|r| r.header("X-Qlik-User").map_or(false, |h| h.ends_with(&needle)))
            .collect()
    }
}

pub fn start() -> QrsServer {
    start_with_options(QrsServerOptions::default())
}

pub fn start_with_options(opts: QrsServerOptions) -> QrsServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let recorded = Arc::clone(&recorded);
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &recorded, &opts));
        }
    });
    QrsServer {
        url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, recorded: &Mutex<Vec<RecordedRequest>>, opts: &QrsServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    recorded.lock().unwrap().push(request.clone());

    if let Some(delay) = opts.delay {
        thread::sleep(delay);
    }

    let (status, body) = respond(&request, opts);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn respond(request: &RecordedRequest, opts: &QrsServerOptions) -> (&'static str, String) {
    let key_header = request.header("X-Qlik-Xrfkey");
    if key_header.is_none() || key_header != request.query_param("xrfkey") {
        return ("403 Forbidden", String::new());
    }
    let user = request.header("X-Qlik-User").unwrap_or("");
    if opts
        .fail_users
        .iter()
        .any(|u| user.ends_with(&format!("UserId={}", u)))
    {
        return ("500 Internal Server Error", r#"{"error":"boom"}"#.to_string());
    }
    match (request.method.as_str(), request.path()) {
        ("GET", "/qrs/about") if opts.fail_probe => ("503 Service Unavailable", String::new()),
        ("GET", "/qrs/about") => (
            "200 OK",
            r#"{"buildVersion":"24.1.0","buildDate":"1/1/2024","schemaPath":"About"}"#.to_string(),
        ),
        ("GET", "/qrs/app/count") => ("200 OK", r#"{"value":3}"#.to_string()),
        ("POST", "/qrs/App/table") => (
            "200 OK",
            r#"{"columnNames":["id","name"],"rows":[["1","Sales"],["2","Finance"]]}"#.to_string(),
        ),
        ("POST", "/qrs/systemrule/security/resetcache") => ("200 OK", String::new()),
        _ => ("404 Not Found", String::new()),
    }
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
