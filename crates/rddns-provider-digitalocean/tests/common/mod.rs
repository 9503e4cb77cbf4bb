//! Local HTTP stub standing in for the DigitalOcean API
//!
//! Each stub listens on an ephemeral loopback port and answers every request
//! through a responder closure. Requests are recorded in arrival order.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    /// Path and query, e.g. `/domains/example.com/records?per_page=200`
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// A running stub API
pub struct StubApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubApi {
    /// Start a stub; the responder gets each request and the stub's base URL
    /// and returns the status code and JSON body to send back.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&StubRequest, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let responder = Arc::new(responder);
        let log = requests.clone();
        let url = base_url.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let responder = responder.clone();
                let log = log.clone();
                let url = url.clone();
                tokio::spawn(async move {
                    serve_connection(socket, move |request| {
                        let response = responder(request, &url);
                        log.lock().unwrap().push(request.clone());
                        response
                    })
                    .await;
                });
            }
        });

        Self { base_url, requests }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    respond: impl Fn(&StubRequest) -> (u16, String),
) {
    while let Some(request) = read_request(&mut socket).await {
        let (status, body) = respond(&request);
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            status,
            reason(status),
            body.len(),
            body
        );
        if socket.write_all(response.as_bytes()).await.is_err() {
            break;
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<StubRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().ok()?,
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).into_owned();

    Some(StubRequest {
        method,
        target,
        authorization,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// JSON body of one DigitalOcean record
pub fn record_json(id: u64, record_type: &str, name: &str, data: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "type": record_type,
        "name": name,
        "data": data,
        "priority": null,
        "port": null,
        "ttl": 1800,
        "weight": null,
        "flags": null,
        "tag": null
    })
}
