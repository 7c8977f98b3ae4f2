//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of routes (path + query → status, content type,
//! body) and counts hits per route. A route can also answer with a redirect.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// When set, answer with this `Location` instead of a body.
    pub location: Option<String>,
}

impl Route {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/json; charset=utf-8",
            body: body.as_bytes().to_vec(),
            location: None,
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.as_bytes().to_vec(),
            location: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
            location: None,
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 302,
            content_type: "text/plain",
            body: Vec::new(),
            location: Some(to.to_string()),
        }
    }
}

/// A running server: base URL plus per-route hit counters.
pub struct TestServer {
    pub base: String,
    hits: Arc<HashMap<String, AtomicUsize>>,
}

impl TestServer {
    /// Absolute URL for a route path such as `/ajax/user/1?full=1`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .get(path)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

/// Starts a server in a background thread. Unknown paths get 404. The
/// server runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base = format!("http://127.0.0.1:{}", port);

    let hits: Arc<HashMap<String, AtomicUsize>> = Arc::new(
        routes
            .iter()
            .map(|(path, _)| (path.to_string(), AtomicUsize::new(0)))
            .collect(),
    );
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| (path.to_string(), route))
            .collect(),
    );

    {
        let hits = Arc::clone(&hits);
        let base = base.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&hits);
                let base = base.clone();
                thread::spawn(move || handle(stream, &routes, &hits, &base));
            }
        });
    }

    TestServer { base, hits }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &HashMap<String, AtomicUsize>,
    base: &str,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let Some(target) = request_target(request) else {
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
        return;
    };

    let Some(route) = routes.get(target) else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return;
    };
    if let Some(counter) = hits.get(target) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    let location = match &route.location {
        Some(to) if to.starts_with('/') => format!("Location: {}{}\r\n", base, to),
        Some(to) => format!("Location: {}\r\n", to),
        None => String::new(),
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.content_type,
        route.body.len(),
        location
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&route.body);
}

/// Path and query of a `GET` request line.
fn request_target(request: &str) -> Option<&str> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    parts.next()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        410 => "Gone",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
