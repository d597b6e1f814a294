//! Top-level application state machine.
//!
//! `App` owns the `RecordingController`, the `CaptureLoop` and the
//! `Submitter`.  It processes `UiCommand`s, runs one capture step per
//! frame, and turns controller events into the status line.

use std::io::{self, BufReader};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context};
use capture_session::{RecordingController, SessionEvent, SessionSnapshot};
use hand_pose::HandObservation;
use ratio_client::SubmissionClient;
use tracing::{info, warn};

use crate::capture::{CaptureLoop, LoopStats, TickOutcome};
use crate::config::AppConfig;
use crate::console::spawn_console;
use crate::source::{Camera, SimInput};
use crate::submitter::Submitter;
use crate::visualizer::Visualizer;

/// User intent from the window or the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Start,
    Stop,
    Quit,
}

const READY: &str = "Ready: press R (or type `start`) to record";

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App<C: Camera> {
    controller:  RecordingController,
    capture:     CaptureLoop<C>,
    submitter:   Submitter,

    // ── display ───────────────────────────────────────────────────────────
    pub status:  String,
    last_result: Option<String>,

    quit:        bool,
}

impl<C: Camera> App<C> {
    pub fn new(capture: CaptureLoop<C>, submitter: Submitter) -> Self {
        App {
            controller:  RecordingController::new(),
            capture,
            submitter,
            status:      READY.to_string(),
            last_result: None,
            quit:        false,
        }
    }

    // ── process one UiCommand ─────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::Start => {
                match self.controller.start() {
                    Ok(()) => self.capture.mark_start(),
                    Err(e) => self.status = format!("Cannot start: {}", e),
                }
            }
            UiCommand::Stop => match self.controller.stop() {
                Some(payload) => self.submitter.submit(payload),
                None => self.status = "Not recording".to_string(),
            },
            UiCommand::Quit => self.quit = true,
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// Run one capture step, collect finished submissions, and return the
    /// controller events they produced.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if self.capture.tick(&mut self.controller) == TickOutcome::Stopped && !self.quit {
            self.status = "Hand tracking stopped".to_string();
        }

        for outcome in self.submitter.drain_outcomes() {
            self.controller.record_submission(outcome.result);
        }

        let events = self.controller.drain_events();
        for event in &events {
            self.apply_event(event);
        }
        events
    }

    fn apply_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::GateChanged(_) => return,
            SessionEvent::RecordingStarted => {
                self.status = "Recording: keep your hand in view, press S to stop".to_string();
            }
            SessionEvent::RecordingAborted { reason, discarded } => {
                self.status = format!("Recording aborted: {} ({} samples discarded)", reason.message(), discarded);
            }
            SessionEvent::RecordingStopped { samples } => {
                self.status = format!("Submitting {} samples...", samples);
            }
            SessionEvent::SubmissionSucceeded { response } => {
                let text = response.trim().to_string();
                self.status = format!("Result: {}", text);
                self.last_result = Some(text);
            }
            SessionEvent::SubmissionFailed { error, .. } => {
                self.status = format!("Submission failed: {}", error);
                self.last_result = Some(format!("Error: {}", error));
            }
        }
        info!(status = %self.status, "status");
    }

    /// Stop capture first so no frame lands after teardown begins, then
    /// let pending submissions finish.
    pub fn shutdown(&mut self) {
        self.capture.shutdown();
        self.submitter.shutdown();
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn snapshot(&self)    -> SessionSnapshot          { self.controller.snapshot() }
    pub fn controller(&self)  -> &RecordingController     { &self.controller }
    pub fn last_result(&self) -> Option<&str>             { self.last_result.as_deref() }
    pub fn should_quit(&self) -> bool                     { self.quit }
    pub fn is_capturing(&self) -> bool                    { self.capture.is_running() }
    pub fn capture_stats(&self) -> LoopStats              { self.capture.stats() }

    pub fn last_observation(&self) -> Option<&HandObservation> {
        self.capture.last_observation()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Builds the capture source (simulation by default, LeapMotion with
/// `--features leap`), the submission thread, and either the window or
/// the stdin console, then drives everything at `cfg.fps`.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let client = SubmissionClient::new(cfg.endpoint.clone(), cfg.timeout);
    let submitter = Submitter::spawn(client);

    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(not(feature = "leap"))]
    let capture = {
        use crate::source::{SimCamera, SimEstimator};
        let camera = SimCamera::new(sim_rx, cfg.frame_width, cfg.frame_height);
        CaptureLoop::spawn(camera, || Ok(SimEstimator))
    };

    #[cfg(feature = "leap")]
    let capture = {
        use crate::leap::{LeapCamera, LeapEstimator};
        drop(sim_rx);
        let (w, h) = (cfg.frame_width, cfg.frame_height);
        CaptureLoop::spawn(LeapCamera, move || LeapEstimator::open(w, h))
    };

    let mut app = App::new(capture, submitter);
    let result = if cfg.headless {
        run_headless(&mut app, sim_tx, &cfg)
    } else {
        run_windowed(&mut app, sim_tx, &cfg)
    };
    app.shutdown();
    result
}

fn run_windowed<C: Camera>(app: &mut App<C>, sim_tx: Sender<SimInput>, cfg: &AppConfig) -> anyhow::Result<()> {
    let mut vis = Visualizer::new(sim_tx, cfg).context("opening status window")?;

    while vis.is_open() {
        // 1. Window keys → commands (simulator keys go straight to the camera)
        for cmd in vis.poll_input() {
            app.handle_command(cmd);
        }
        if app.should_quit() { break; }

        // 2. Capture step + submissions
        app.tick();
        if !app.is_capturing() {
            bail!("hand tracking stopped; see log for details");
        }

        // 3. Render
        let snapshot = app.snapshot();
        vis.render(&snapshot, app.last_observation(), &app.status, app.last_result());
    }
    Ok(())
}

fn run_headless<C: Camera>(app: &mut App<C>, sim_tx: Sender<SimInput>, cfg: &AppConfig) -> anyhow::Result<()> {
    let ui_rx: Receiver<UiCommand> = spawn_console(BufReader::new(io::stdin()), sim_tx);
    let interval = cfg.frame_interval();

    println!("  Commands: start | stop | hand on|off | span <px> | move <dx> <dy> | flip | quit");
    println!("  {}", app.status);

    let mut last_gate = app.snapshot().last_gate;
    loop {
        let frame_start = Instant::now();

        loop {
            match ui_rx.try_recv() {
                Ok(cmd) => app.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    app.handle_command(UiCommand::Quit);
                    break;
                }
            }
        }
        if app.should_quit() { break; }

        for event in app.tick() {
            match event {
                SessionEvent::GateChanged(gate) if gate != last_gate => {
                    last_gate = gate;
                    println!("  [{}] {}", gate.label(), gate.hint());
                }
                SessionEvent::GateChanged(_) => {}
                _ => println!("  {}", app.status),
            }
        }
        if !app.is_capturing() {
            bail!("hand tracking stopped; see log for details");
        }

        let spent = frame_start.elapsed();
        if spent < interval {
            thread::sleep(interval - spent);
        } else {
            warn!(?spent, "frame overran its budget");
        }
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
