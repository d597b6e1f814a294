//! # ratio_client
//!
//! Packages a recorded sequence of [`LandmarkSample`]s and posts it to the
//! ratio-computation service.
//!
//! ## Wire format
//!
//! ```text
//! POST <endpoint>
//! Content-Type: application/json
//!
//! { "landmarks": [[tx, ty, tz, px, py, pz], ...] }
//! ```
//!
//! The response body is opaque text and is handed back verbatim.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ratio_client::{parse_endpoint, SubmissionClient, SubmissionPayload};
//!
//! let endpoint = parse_endpoint("http://localhost:3001/calculate-ratio").unwrap();
//! let client = SubmissionClient::new(endpoint, Duration::from_secs(10));
//! let text = client.submit(&SubmissionPayload::default()).unwrap();
//! println!("{}", text);
//! ```
//!
//! [`LandmarkSample`]: hand_pose::LandmarkSample

pub mod payload;
pub mod error;
pub mod transport;
pub mod client;

pub use payload::SubmissionPayload;
pub use error::SubmitError;
pub use transport::{Transport, UreqTransport};
pub use client::{parse_endpoint, SubmissionClient, DEFAULT_ENDPOINT};
