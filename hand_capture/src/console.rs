//! Headless console: line commands from stdin instead of window keys.
//!
//! ```text
//! start            begin recording
//! stop             end recording and submit
//! hand on|off      show / hide the simulated hand
//! span <px>        set the simulated thumb-pinky span
//! move <dx> <dy>   shift the simulated hand
//! flip             switch left / right hand
//! quit             exit
//! ```

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use crate::app::UiCommand;
use crate::source::SimInput;

#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    BadArgument { command: &'static str, expected: &'static str },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleCommand {
    Ui(UiCommand),
    Sim(SimInput),
}

/// Parse one console line.  Blank lines are `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else { return Ok(None) };
    let args: Vec<&str> = words.collect();

    let cmd = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("start", [])            => ConsoleCommand::Ui(UiCommand::Start),
        ("stop", [])             => ConsoleCommand::Ui(UiCommand::Stop),
        ("quit" | "exit", [])    => ConsoleCommand::Ui(UiCommand::Quit),
        ("hand", ["on"])         => ConsoleCommand::Sim(SimInput::SetHandPresent(true)),
        ("hand", ["off"])        => ConsoleCommand::Sim(SimInput::SetHandPresent(false)),
        ("hand", _)              => return Err(ConsoleError::BadArgument { command: "hand", expected: "`on` or `off`" }),
        ("span", [px])           => match px.parse::<f64>() {
            Ok(v) if v.is_finite() => ConsoleCommand::Sim(SimInput::SetSpan(v)),
            _ => return Err(ConsoleError::BadArgument { command: "span", expected: "a pixel distance" }),
        },
        ("span", _)              => return Err(ConsoleError::BadArgument { command: "span", expected: "a pixel distance" }),
        ("move", [dx, dy])       => match (dx.parse::<f64>(), dy.parse::<f64>()) {
            (Ok(dx), Ok(dy)) if dx.is_finite() && dy.is_finite() => ConsoleCommand::Sim(SimInput::Move { dx, dy }),
            _ => return Err(ConsoleError::BadArgument { command: "move", expected: "two pixel offsets" }),
        },
        ("move", _)              => return Err(ConsoleError::BadArgument { command: "move", expected: "two pixel offsets" }),
        ("flip", [])             => ConsoleCommand::Sim(SimInput::FlipHand),
        _                        => return Err(ConsoleError::Unknown(line.trim().to_string())),
    };
    Ok(Some(cmd))
}

/// Spawn the reader thread.  Simulator inputs go straight to `sim_tx`; app
/// commands come back on the returned channel.  End of input reads as
/// `quit`.
pub fn spawn_console<R>(reader: R, sim_tx: Sender<SimInput>) -> Receiver<UiCommand>
where
    R: BufRead + Send + 'static,
{
    let (ui_tx, ui_rx) = mpsc::channel::<UiCommand>();
    thread::spawn(move || console_thread(reader, sim_tx, ui_tx));
    ui_rx
}

fn console_thread<R: BufRead>(reader: R, sim_tx: Sender<SimInput>, ui_tx: Sender<UiCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => {
                warn!(error = %e, "console read failed");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(ConsoleCommand::Ui(cmd))) => {
                let quit = cmd == UiCommand::Quit;
                if ui_tx.send(cmd).is_err() || quit {
                    return;
                }
            }
            Ok(Some(ConsoleCommand::Sim(input))) => {
                if sim_tx.send(input).is_err() {
                    debug!("no simulator attached; input ignored");
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("  {}", e),
        }
    }
    let _ = ui_tx.send(UiCommand::Quit);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
