#![allow(dead_code)]

use chatrelay::config::Settings;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub auth_header: String,
    pub content_type: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is json")
    }
}

/// Reply from a mock route: status code and JSON body.
pub type MockReply = (u16, String);

pub fn ok(body: &str) -> MockReply {
    (200, body.to_string())
}

/// Single-threaded HTTP/1.1 server answering a fixed number of requests,
/// one connection each.
pub struct MockHttpServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockHttpServer {
    pub fn start<F>(expected_requests: usize, responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_for_thread = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            for _ in 0..expected_requests {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

                let mut request_line = String::new();
                reader
                    .read_line(&mut request_line)
                    .expect("read request line");
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or("GET").to_string();
                let path = parts.next().unwrap_or("/").to_string();

                let mut auth_header = String::new();
                let mut content_type = String::new();
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("read header");
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    let lower = line.to_ascii_lowercase();
                    let value = || {
                        line.split_once(':')
                            .map(|(_, v)| v.trim().to_string())
                            .unwrap_or_default()
                    };
                    if lower.starts_with("authorization:") {
                        auth_header = value();
                    }
                    if lower.starts_with("content-type:") {
                        content_type = value();
                    }
                    if lower.starts_with("content-length:") {
                        content_length = value().parse::<usize>().unwrap_or(0);
                    }
                }

                let mut body = vec![0_u8; content_length];
                if content_length > 0 {
                    reader.read_exact(&mut body).expect("read body");
                }
                let request = RecordedRequest {
                    method,
                    path,
                    auth_header,
                    content_type,
                    body: String::from_utf8_lossy(&body).to_string(),
                };

                let (status, response_body) = responder(&request);
                requests_for_thread
                    .lock()
                    .expect("lock requests")
                    .push(request);
                let response = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response_body.len(),
                    response_body
                );
                stream
                    .write_all(response.as_bytes())
                    .expect("write response");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle: Some(handle),
        }
    }

    pub fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("join mock server");
        }
        self.requests.lock().expect("lock requests").clone()
    }
}

pub fn test_settings(base_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.backend.base_url = base_url.to_string();
    settings.backend.token = "sk-test".to_string();
    settings.backend.model = "llama3".to_string();
    settings.polling.interval_ms = 1;
    settings.environment.timezone = "UTC".to_string();
    settings
}

/// Chat state as the backend returns it when polled.
pub fn chat_state(assistant_id: &str, content: &str) -> String {
    serde_json::json!([{
        "id": "chat-1",
        "title": "t",
        "models": ["llama3"],
        "messages": [],
        "history": {
            "current_id": assistant_id,
            "messages": {
                assistant_id: {
                    "id": assistant_id,
                    "role": "assistant",
                    "content": content,
                    "timestamp": 1
                }
            }
        }
    }])
    .to_string()
}
