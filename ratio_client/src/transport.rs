//! HTTP transport: abstraction over `ureq` / stubs (for testing).

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::SubmitError;

/// Sends one JSON body and returns the response text.
///
/// Implementations must map a non-success status to
/// [`SubmitError::Http`] and a request that never completed to
/// [`SubmitError::Network`].
pub trait Transport: Send {
    fn post_json(&self, url: &Url, body: &str) -> Result<String, SubmitError>;
}

// ── ureq backend ──────────────────────────────────────────────────────────

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .build();
        UreqTransport { agent }
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &Url, body: &str) -> Result<String, SubmitError> {
        let response = self.agent
            .post(url.as_str())
            .set("Content-Type", "application/json")
            .send_string(body);

        match response {
            Ok(resp) => {
                debug!(status = resp.status(), "ratio service answered");
                resp.into_string()
                    .map_err(|e| SubmitError::Network(e.to_string()))
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(SubmitError::Http { status, body })
            }
            Err(ureq::Error::Transport(t)) => Err(SubmitError::Network(t.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Serve exactly one request with a canned response; the join handle
    /// yields the raw request text.
    fn serve_once(status_line: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = Url::parse(&format!(
            "http://{}/calculate-ratio", listener.local_addr().unwrap()
        )).unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line, body.len(), body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (url, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 { break; }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length { break; }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn success_returns_body_verbatim() {
        let (url, server) = serve_once("200 OK", "ratio: 1.42");
        let t = UreqTransport::new(Duration::from_secs(5));
        let text = t.post_json(&url, r#"{"landmarks":[]}"#).unwrap();
        assert_eq!(text, "ratio: 1.42");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /calculate-ratio"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"landmarks":[]}"#));
    }

    #[test]
    fn server_error_maps_to_http_error() {
        let (url, server) = serve_once("500 Internal Server Error", "boom");
        let t = UreqTransport::new(Duration::from_secs(5));
        match t.post_json(&url, "{}") {
            Err(SubmitError::Http { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Http error, got {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_maps_to_network_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let url = Url::parse(&format!("http://{}/calculate-ratio", addr)).unwrap();
        let t = UreqTransport::new(Duration::from_secs(2));
        let err = t.post_json(&url, "{}").unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)), "got {:?}", err);
        assert_eq!(err.status(), None);
    }
}
