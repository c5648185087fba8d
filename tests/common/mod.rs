//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Start a mock HTTP backend on an ephemeral port.
///
/// `respond` maps each request to a status code and body; every request is
/// recorded in the returned log.
pub async fn start_mock_backend<F>(respond: F) -> (SocketAddr, Arc<Mutex<Vec<Recorded>>>)
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let server_log = log.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let log = server_log.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                let _ = read_request(socket, log, respond).await;
            });
        }
    });

    (addr, log)
}

async fn read_request<F>(
    mut socket: TcpStream,
    log: Arc<Mutex<Vec<Recorded>>>,
    respond: Arc<F>,
) -> Option<()>
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let recorded = Recorded {
        method,
        target,
        headers,
        body,
    };
    let (status, response_body) = respond(&recorded);
    log.lock().unwrap().push(recorded);

    let status_text = match status {
        200 => "200 OK",
        201 => "201 Created",
        404 => "404 Not Found",
        422 => "422 Unprocessable Entity",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        response_body.len(),
        response_body
    );
    socket.write_all(response.as_bytes()).await.ok()?;
    socket.shutdown().await.ok()?;
    Some(())
}

/// A Dialogflow ES webhook body.
pub fn webhook_body(action: &str, payload: Value, contexts: Value) -> Value {
    serde_json::json!({
        "responseId": "resp-1",
        "session": "projects/demo/agent/sessions/session-1",
        "queryResult": {
            "queryText": "hello",
            "action": action,
            "parameters": {},
            "allRequiredParamsPresent": true,
            "fulfillmentText": "Platform text.",
            "outputContexts": contexts,
            "languageCode": "en"
        },
        "originalDetectIntentRequest": {
            "source": "webex",
            "payload": payload
        }
    })
}

/// POST a JSON body to `/`.
pub fn webhook_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Session parameters from the `session-vars` context of a response body.
pub fn session_vars(body: &Value) -> &Value {
    body["outputContexts"]
        .as_array()
        .and_then(|contexts| {
            contexts.iter().find(|c| {
                c["name"]
                    .as_str()
                    .is_some_and(|n| n.ends_with("/contexts/session-vars"))
            })
        })
        .map(|c| &c["parameters"])
        .unwrap()
}
