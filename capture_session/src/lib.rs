//! # capture_session
//!
//! The recording state machine behind a guided hand-span capture.
//!
//! A [`RecordingController`] owns exactly one [`RecordingSession`] for its
//! whole lifetime.  The session is either `Idle` or `Recording`; frames
//! only reach the [`LandmarkBuffer`] while recording.
//!
//! ## Transitions
//!
//! | From | Trigger | To | Effect |
//! |---|---|---|---|
//! | Idle | `start()` | Recording | `RecordingStarted` |
//! | Recording | frame with any hand | Recording | sample appended |
//! | Recording | frame with no hand | Idle | buffer discarded, `RecordingAborted` |
//! | Recording | `stop()` | Idle | payload returned, buffer cleared, `RecordingStopped` |
//! | Idle | `stop()` | Idle | nothing |
//! | Idle | frame | Idle | gate only |
//!
//! The controller never performs I/O.  Notifications are queued as
//! [`SessionEvent`]s and drained by whatever sits at the boundary.

pub mod buffer;
pub mod session;
pub mod event;
pub mod controller;

pub use buffer::LandmarkBuffer;
pub use session::{RecordingSession, RecordingState, SessionSnapshot};
pub use event::{AbortReason, SessionEvent};
pub use controller::{ControllerError, RecordingController};
