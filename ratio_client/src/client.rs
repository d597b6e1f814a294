//! SubmissionClient: serializes a payload and posts it to the endpoint.

use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::error::SubmitError;
use crate::payload::SubmissionPayload;
use crate::transport::{Transport, UreqTransport};

/// Default endpoint; a local development server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001/calculate-ratio";

/// Parse and validate a ratio-service endpoint (absolute http/https URL).
pub fn parse_endpoint(raw: &str) -> Result<Url, SubmitError> {
    let url = Url::parse(raw.trim()).map_err(|e| SubmitError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SubmitError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{}`", other),
        }),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SubmissionClient
// ════════════════════════════════════════════════════════════════════════════

pub struct SubmissionClient<T: Transport = UreqTransport> {
    endpoint:  Url,
    transport: T,
}

impl SubmissionClient<UreqTransport> {
    /// Client backed by `ureq` with the given request timeout.
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        SubmissionClient {
            endpoint,
            transport: UreqTransport::new(timeout),
        }
    }
}

impl<T: Transport> SubmissionClient<T> {
    pub fn with_transport(endpoint: Url, transport: T) -> Self {
        SubmissionClient { endpoint, transport }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Post `payload` and return the service's response text verbatim.
    pub fn submit(&self, payload: &SubmissionPayload) -> Result<String, SubmitError> {
        let body = payload.to_json()?;
        debug!(payload = %body, "submission body");
        info!(samples = payload.len(), endpoint = %self.endpoint, "submitting landmarks");

        match self.transport.post_json(&self.endpoint, &body) {
            Ok(text) => {
                info!(bytes = text.len(), "ratio service accepted submission");
                Ok(text)
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::LandmarkSample;
    use std::sync::{Arc, Mutex};

    /// Records request bodies and replays a fixed outcome.
    struct StubTransport {
        seen:    Arc<Mutex<Vec<(String, String)>>>,
        outcome: fn() -> Result<String, SubmitError>,
    }

    impl Transport for StubTransport {
        fn post_json(&self, url: &Url, body: &str) -> Result<String, SubmitError> {
            self.seen.lock().unwrap().push((url.to_string(), body.to_string()));
            (self.outcome)()
        }
    }

    fn client(outcome: fn() -> Result<String, SubmitError>)
        -> (SubmissionClient<StubTransport>, Arc<Mutex<Vec<(String, String)>>>)
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = StubTransport { seen: Arc::clone(&seen), outcome };
        let url = parse_endpoint(DEFAULT_ENDPOINT).unwrap();
        (SubmissionClient::with_transport(url, transport), seen)
    }

    #[test]
    fn submit_posts_serialized_payload() {
        let (c, seen) = client(|| Ok("ratio=0.87".to_string()));
        let payload = SubmissionPayload::new(vec![LandmarkSample([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])]);

        assert_eq!(c.submit(&payload).unwrap(), "ratio=0.87");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, DEFAULT_ENDPOINT);
        assert_eq!(seen[0].1, r#"{"landmarks":[[1.0,2.0,3.0,4.0,5.0,6.0]]}"#);
    }

    #[test]
    fn http_error_passes_through_with_status() {
        let (c, _) = client(|| Err(SubmitError::Http { status: 500, body: String::new() }));
        let err = c.submit(&SubmissionPayload::default()).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_error_passes_through() {
        let (c, _) = client(|| Err(SubmitError::Network("connection refused".into())));
        let err = c.submit(&SubmissionPayload::default()).unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
    }

    #[test]
    fn endpoint_must_be_http() {
        assert!(parse_endpoint("https://ratio.example.org/calculate-ratio").is_ok());
        assert!(matches!(
            parse_endpoint("ftp://example.org/x"),
            Err(SubmitError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(SubmitError::InvalidEndpoint { .. })
        ));
    }
}
