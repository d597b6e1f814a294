//! Software-rendered status window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  GATE BAND: OK / TOO CLOSE / TOO FAR / NO HAND + hint    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────── frame preview ───────────────┐  ● REC   │
//! │  │   keypoints, thumb ●━━━━━━━━━━● pinky       │  n smp   │
//! │  └─────────────────────────────────────────────┘          │
//! │  samples / completed / aborted                            │
//! │  last result                                              │
//! │  status bar                                               │
//! │  key legend                                               │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use capture_session::SessionSnapshot;
use hand_pose::{GateState, HandObservation, Point2D};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use thiserror::Error;
use tracing::warn;

use crate::app::UiCommand;
use crate::config::AppConfig;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 720;
pub const WIN_H:     usize = 600;
const BAND_H:        usize = 56;
const PREVIEW_X:     usize = 20;
const PREVIEW_Y:     usize = BAND_H + 16;
const PREVIEW_W:     usize = 560;
const PREVIEW_H:     usize = 420;
const SIDE_X:        usize = PREVIEW_X + PREVIEW_W + 20;
const INFO_Y:        usize = PREVIEW_Y + PREVIEW_H + 14;
const STATUS_Y:      usize = WIN_H - 40;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const PREVIEW_BG:    u32   = 0xFF10101C;
const TEXT_BG:       u32   = 0xFF0F3460;
const JOINT_COLOR:   u32   = 0xFF7FB3D5;
const TIP_COLOR:     u32   = 0xFFFFD700;  // thumb / pinky
const REC_COLOR:     u32   = 0xFFE74C3C;

const SPAN_STEP_PX:  f64   = 4.0;
const MOVE_STEP_PX:  f64   = 6.0;

#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("could not open window: {0}")]
    Window(String),
}

pub fn gate_color(gate: GateState) -> u32 {
    match gate {
        GateState::NoHand   => 0xFF555566,
        GateState::TooClose => 0xFFC0392B,
        GateState::TooFar   => 0xFFE67E22,
        GateState::Ok       => 0xFF27AE60,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    sim_tx:  Sender<SimInput>,
    frame_w: u32,
    frame_h: u32,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, cfg: &AppConfig) -> Result<Self, VisualizerError> {
        let mut window = Window::new(
            "Hand Capture: thumb/pinky span",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| VisualizerError::Window(e.to_string()))?;

        window.set_target_fps(cfg.fps as usize);

        Ok(Visualizer {
            window,
            canvas:  Canvas::new(WIN_W, WIN_H, BG_COLOR),
            sim_tx,
            frame_w: cfg.frame_width,
            frame_h: cfg.frame_height,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard: simulator keys go straight to the camera, the rest
    /// come back as commands.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(UiCommand::Quit);
            return cmds;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);
        let sim = |input: SimInput| { let _ = self.sim_tx.send(input); };

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            cmds.push(UiCommand::Quit);
            return cmds;
        }
        if one_shot(Key::R) { cmds.push(UiCommand::Start); }
        if one_shot(Key::S) { cmds.push(UiCommand::Stop);  }

        if one_shot(Key::H) { sim(SimInput::ToggleHand); }
        if one_shot(Key::F) { sim(SimInput::FlipHand);   }
        if held(Key::Up)    { sim(SimInput::AdjustSpan( SPAN_STEP_PX)); }
        if held(Key::Down)  { sim(SimInput::AdjustSpan(-SPAN_STEP_PX)); }
        if held(Key::Left)  { sim(SimInput::Move { dx: -MOVE_STEP_PX, dy: 0.0 }); }
        if held(Key::Right) { sim(SimInput::Move { dx:  MOVE_STEP_PX, dy: 0.0 }); }

        cmds
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        snapshot:    &SessionSnapshot,
        observation: Option<&HandObservation>,
        status:      &str,
        last_result: Option<&str>,
    ) {
        let c = &mut self.canvas;
        c.clear(BG_COLOR);

        // ── Gate band ─────────────────────────────────────────────────────
        let gate = snapshot.last_gate;
        c.fill_rect(0, 0, WIN_W, BAND_H, gate_color(gate));
        c.draw_text(gate.label(), 16, 10, 4, 0xFFFFFFFF);
        c.draw_text(gate.hint(),  16, 38, 2, 0xFFF0F0F0);

        // ── Frame preview ─────────────────────────────────────────────────
        c.fill_rect(PREVIEW_X, PREVIEW_Y, PREVIEW_W, PREVIEW_H, PREVIEW_BG);
        c.draw_border(PREVIEW_X, PREVIEW_Y, PREVIEW_W, PREVIEW_H, 0xFF333355);
        if let Some(obs) = observation {
            let map = PreviewMap::new(self.frame_w, self.frame_h);
            for p in obs.keypoints.iter() {
                let (x, y) = map.to_window(*p);
                c.fill_rect(x.saturating_sub(1), y.saturating_sub(1), 3, 3, JOINT_COLOR);
            }
            let (tx, ty) = map.to_window(obs.thumb_tip());
            let (px, py) = map.to_window(obs.pinky_tip());
            c.draw_line(tx, ty, px, py, gate_color(gate));
            c.fill_rect(tx.saturating_sub(3), ty.saturating_sub(3), 7, 7, TIP_COLOR);
            c.fill_rect(px.saturating_sub(3), py.saturating_sub(3), 7, 7, TIP_COLOR);
            let span = format!("{:.0} px  {}", obs.span_px(), obs.handedness.as_str());
            c.draw_text(&span, PREVIEW_X + 8, PREVIEW_Y + PREVIEW_H - 18, 2, 0xFFCCCCCC);
        }

        // ── Recording indicator ───────────────────────────────────────────
        if snapshot.is_recording() {
            c.fill_circle(SIDE_X + 12, PREVIEW_Y + 14, 9, REC_COLOR);
            c.draw_text("REC", SIDE_X + 28, PREVIEW_Y + 7, 3, REC_COLOR);
        } else {
            c.draw_text("IDLE", SIDE_X, PREVIEW_Y + 7, 3, 0xFF888888);
        }
        c.draw_text(&format!("{}", snapshot.samples), SIDE_X, PREVIEW_Y + 40, 4, 0xFFEEEEEE);
        c.draw_text("samples", SIDE_X, PREVIEW_Y + 66, 2, 0xFF888888);

        // ── Session totals and last result ────────────────────────────────
        let totals = format!("completed: {}   aborted: {}", snapshot.completed, snapshot.aborted);
        c.draw_text(&totals, PREVIEW_X, INFO_Y, 2, 0xFFAAAAAA);
        if let Some(result) = last_result {
            c.draw_text(&format!("last result: {}", result), PREVIEW_X, INFO_Y + 18, 2, TIP_COLOR);
        }

        // ── Status bar ────────────────────────────────────────────────────
        c.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        c.draw_text(status, 10, STATUS_Y + 8, 2, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        c.draw_text(
            "R=record  S=stop  H=hand  Up/Down=span  Left/Right=move  F=flip  Q=quit",
            10, WIN_H - 12, 1, 0xFF888888,
        );

        if let Err(e) = self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H) {
            warn!(error = %e, "window update failed");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PreviewMap: frame pixels → window pixels
// ════════════════════════════════════════════════════════════════════════════

/// Uniform scale that fits the frame inside the preview box, centred.
#[derive(Clone, Copy, Debug)]
struct PreviewMap {
    scale: f64,
    ox:    f64,
    oy:    f64,
}

impl PreviewMap {
    fn new(frame_w: u32, frame_h: u32) -> Self {
        let (fw, fh) = (frame_w.max(1) as f64, frame_h.max(1) as f64);
        let scale = (PREVIEW_W as f64 / fw).min(PREVIEW_H as f64 / fh);
        PreviewMap {
            scale,
            ox: PREVIEW_X as f64 + (PREVIEW_W as f64 - fw * scale) / 2.0,
            oy: PREVIEW_Y as f64 + (PREVIEW_H as f64 - fh * scale) / 2.0,
        }
    }

    /// Clamped to the preview box.
    fn to_window(&self, p: Point2D) -> (usize, usize) {
        let x = (self.ox + p.x * self.scale).clamp(PREVIEW_X as f64, (PREVIEW_X + PREVIEW_W - 1) as f64);
        let y = (self.oy + p.y * self.scale).clamp(PREVIEW_Y as f64, (PREVIEW_Y + PREVIEW_H - 1) as f64);
        (x as usize, y as usize)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas: primitive drawing into an ARGB buffer
// ════════════════════════════════════════════════════════════════════════════

struct Canvas {
    buf: Vec<u32>,
    w:   usize,
    h:   usize,
}

impl Canvas {
    fn new(w: usize, h: usize, color: u32) -> Self {
        Canvas { buf: vec![color; w * h], w, h }
    }

    fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    /// Bresenham, two pixels thick.
    fn draw_line(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, color: u32) {
        let (mut x, mut y) = (x0 as isize, y0 as isize);
        let (x1, y1) = (x1 as isize, y1 as isize);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x as usize, y as usize, color);
            self.set_pixel(x as usize + 1, y as usize, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn fill_circle(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        let r2 = (r * r) as isize;
        for dy in -(r as isize)..=r as isize {
            for dx in -(r as isize)..=r as isize {
                if dx * dx + dy * dy <= r2 {
                    let (x, y) = (cx as isize + dx, cy as isize + dy);
                    if x >= 0 && y >= 0 {
                        self.set_pixel(x as usize, y as usize, color);
                    }
                }
            }
        }
    }

    /// 3×5 bitmap font, each glyph pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let advance = 4 * scale; // 3 wide + 1 gap
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > self.w { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += advance;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '`' | '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_gate_state_has_its_own_colour() {
        let colours = [GateState::NoHand, GateState::TooClose, GateState::TooFar, GateState::Ok]
            .map(gate_color);
        for i in 0..colours.len() {
            for j in i + 1..colours.len() {
                assert_ne!(colours[i], colours[j]);
            }
        }
    }

    #[test]
    fn preview_keeps_aspect_and_centres() {
        let map = PreviewMap::new(640, 480);
        assert_eq!(map.to_window(Point2D::new(0.0, 0.0)), (PREVIEW_X, PREVIEW_Y));
        // 640x480 at 0.875 is exactly 560x420, the whole box
        assert_eq!(map.to_window(Point2D::new(320.0, 240.0)), (PREVIEW_X + 280, PREVIEW_Y + 210));
    }

    #[test]
    fn preview_clamps_points_outside_the_frame() {
        let map = PreviewMap::new(640, 480);
        let (x, y) = map.to_window(Point2D::new(-500.0, 5_000.0));
        assert_eq!(x, PREVIEW_X);
        assert_eq!(y, PREVIEW_Y + PREVIEW_H - 1);
    }

    #[test]
    fn line_reaches_both_endpoints() {
        let mut c = Canvas::new(50, 50, 0);
        c.draw_line(2, 40, 45, 3, 7);
        assert_eq!(c.buf[40 * 50 + 2], 7);
        assert_eq!(c.buf[3 * 50 + 45], 7);
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(10, 10, 0);
        c.fill_rect(8, 8, 20, 20, 1);
        c.draw_border(5, 5, 20, 20, 2);
        c.fill_circle(0, 0, 4, 3);
        c.draw_text("clipped text", 6, 6, 3, 4);
        assert_eq!(c.buf.len(), 100);
        assert_eq!(c.buf[9 * 10 + 9], 1);
        assert_eq!(c.buf[0], 3);
    }

    #[test]
    fn scaled_text_fills_blocks() {
        let mut c = Canvas::new(20, 20, 0);
        c.draw_text("1", 0, 0, 2, 9);
        // top row of '1' is 0b010: middle column only
        assert_eq!(c.buf[0], 0);
        assert_eq!(c.buf[2], 9);
        assert_eq!(c.buf[3], 9);
        assert_eq!(c.buf[20 + 3], 9);
    }

    #[test]
    fn font_covers_the_legend() {
        let fallback = char_glyph('\u{1}');
        for ch in "R=record S=stop Q=quit (Left/Right) 0123456789".chars() {
            if ch == ' ' { continue; }
            assert_ne!(char_glyph(ch), fallback, "missing glyph for {:?}", ch);
        }
    }
}
