//! Background submission thread.
//!
//! Payloads are posted off the capture thread so a slow or unreachable
//! ratio service never stalls frame processing.  Outcomes come back over a
//! channel and are drained by the app once per tick.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use ratio_client::{SubmissionClient, SubmissionPayload, SubmitError, Transport};
use tracing::{debug, error};

// ════════════════════════════════════════════════════════════════════════════
// Messages
// ════════════════════════════════════════════════════════════════════════════

enum SubmitCommand {
    Submit(SubmissionPayload),
    Quit,
}

/// Result of one submission, sent back to the app.
#[derive(Debug)]
pub struct SubmissionOutcome {
    /// Number of samples that were posted.
    pub samples: usize,
    pub result:  Result<String, SubmitError>,
}

// ════════════════════════════════════════════════════════════════════════════
// Submitter
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the submission thread.
pub struct Submitter {
    cmd_tx:     Sender<SubmitCommand>,
    outcome_rx: Receiver<SubmissionOutcome>,
    worker:     Option<JoinHandle<()>>,
    pending:    usize,
}

impl Submitter {
    /// Spawn the thread; `client` is moved into it.
    pub fn spawn<T>(client: SubmissionClient<T>) -> Self
    where
        T: Transport + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SubmitCommand>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<SubmissionOutcome>();

        let worker = thread::spawn(move || submit_thread(client, cmd_rx, outcome_tx));

        Submitter { cmd_tx, outcome_rx, worker: Some(worker), pending: 0 }
    }

    /// Queue a payload.  The payload is owned by the thread from here on.
    pub fn submit(&mut self, payload: SubmissionPayload) {
        let samples = payload.len();
        if self.cmd_tx.send(SubmitCommand::Submit(payload)).is_err() {
            error!(samples, "submission thread is gone; payload dropped");
            return;
        }
        self.pending += 1;
    }

    /// Drain any finished submissions (non-blocking).
    pub fn drain_outcomes(&mut self) -> Vec<SubmissionOutcome> {
        let mut out = Vec::new();
        while let Ok(o) = self.outcome_rx.try_recv() { out.push(o); }
        self.pending = self.pending.saturating_sub(out.len());
        out
    }

    /// Submissions queued or in progress.
    pub fn pending(&self) -> usize { self.pending }

    /// Let queued submissions finish, then join the thread.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else { return };
        let _ = self.cmd_tx.send(SubmitCommand::Quit);
        if worker.join().is_err() {
            error!("submission thread panicked");
        }
    }
}

impl Drop for Submitter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn submit_thread<T: Transport>(
    client:     SubmissionClient<T>,
    cmd_rx:     Receiver<SubmitCommand>,
    outcome_tx: Sender<SubmissionOutcome>,
) {
    debug!(endpoint = %client.endpoint(), "submission thread running");
    for cmd in cmd_rx {
        match cmd {
            SubmitCommand::Submit(payload) => {
                let result = client.submit(&payload);
                let outcome = SubmissionOutcome { samples: payload.len(), result };
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
            SubmitCommand::Quit => break,
        }
    }
    debug!("submission thread stopped");
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::{LandmarkSample, Point3D};
    use ratio_client::parse_endpoint;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use url::Url;

    /// Records request bodies; answers from a fixed status.
    struct StubTransport {
        status: u16,
        bodies: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for StubTransport {
        fn post_json(&self, _url: &Url, body: &str) -> Result<String, SubmitError> {
            self.bodies.lock().unwrap().push(body.to_string());
            match self.status {
                200 => Ok("Ratio: 0.5".to_string()),
                s   => Err(SubmitError::Http { status: s, body: "nope".into() }),
            }
        }
    }

    fn submitter(status: u16) -> (Submitter, Arc<Mutex<Vec<String>>>) {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let transport = StubTransport { status, bodies: Arc::clone(&bodies) };
        let endpoint = parse_endpoint("http://localhost:3001/calculate-ratio").unwrap();
        (Submitter::spawn(SubmissionClient::with_transport(endpoint, transport)), bodies)
    }

    fn payload(n: usize) -> SubmissionPayload {
        let samples = (0..n)
            .map(|i| {
                let v = i as f64;
                LandmarkSample::new(Point3D::new(v, v, v), Point3D::new(v, v, v))
            })
            .collect();
        SubmissionPayload::new(samples)
    }

    fn wait_for(s: &mut Submitter, n: usize) -> Vec<SubmissionOutcome> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut out = Vec::new();
        while out.len() < n && Instant::now() < deadline {
            out.extend(s.drain_outcomes());
            thread::sleep(Duration::from_millis(1));
        }
        out
    }

    #[test]
    fn outcomes_arrive_in_submission_order() {
        let (mut s, bodies) = submitter(200);
        s.submit(payload(2));
        s.submit(payload(5));
        assert_eq!(s.pending(), 2);

        let outcomes = wait_for(&mut s, 2);
        assert_eq!(outcomes.iter().map(|o| o.samples).collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(outcomes[0].result.as_deref().unwrap(), "Ratio: 0.5");
        assert_eq!(s.pending(), 0);
        assert_eq!(bodies.lock().unwrap().len(), 2);
    }

    #[test]
    fn http_errors_come_back_as_outcomes() {
        let (mut s, _) = submitter(500);
        s.submit(payload(1));
        let outcomes = wait_for(&mut s, 1);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].result.as_ref().unwrap_err().status(), Some(500));
    }

    #[test]
    fn shutdown_finishes_queued_work() {
        let (mut s, bodies) = submitter(200);
        s.submit(payload(3));
        s.shutdown();
        assert_eq!(bodies.lock().unwrap().len(), 1);
        s.shutdown();
    }

    #[test]
    fn body_is_the_landmark_json() {
        let (mut s, bodies) = submitter(200);
        s.submit(payload(1));
        wait_for(&mut s, 1);
        let body = bodies.lock().unwrap()[0].clone();
        assert_eq!(body, r#"{"landmarks":[[0.0,0.0,0.0,0.0,0.0,0.0]]}"#);
    }
}
