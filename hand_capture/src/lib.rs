//! # hand_capture
//!
//! Guided hand-span capture.  A capture loop feeds camera frames through a
//! pose estimator one at a time; every result is gated on the thumb/pinky
//! pixel span and, while a recording runs, appended to the session.  On
//! stop the samples are posted to the ratio service in the background and
//! the response is shown verbatim.
//!
//! ## Threads
//!
//! | Thread | Owns | Talks to |
//! |---|---|---|
//! | main | `App`, `RecordingController`, window or console | everything, via channels |
//! | estimation worker | the `PoseEstimator` | capture loop (one frame in flight) |
//! | submission | `SubmissionClient` | app (outcomes drained each tick) |
//! | console (headless) | stdin | app commands, simulator inputs |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: a keyboard-driven simulated hand
//!   stands in for camera and model.
//! * `leap`: **Hardware mode**: hand joints from a LeapMotion controller
//!   via LeapC.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `R` | Start recording |
//! | `S` | Stop recording and submit |
//! | `H` | Show / hide the simulated hand |
//! | `Up` / `Down` | Widen / narrow the simulated span |
//! | `Left` / `Right` | Move the simulated hand |
//! | `F` | Flip handedness |
//! | `Q` / `Esc` | Quit |

pub mod source;
pub mod capture;
pub mod submitter;
pub mod config;
pub mod console;
pub mod visualizer;
pub mod app;

#[cfg(feature = "leap")]
pub mod leap;

pub use app::{run, App, UiCommand};
pub use capture::{CaptureLoop, LoopStats, TickOutcome};
pub use config::{AppConfig, Cli, ConfigError};
pub use source::{Camera, CaptureError, EstimationError, PoseEstimator};
pub use submitter::{SubmissionOutcome, Submitter};
