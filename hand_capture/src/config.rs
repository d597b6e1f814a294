//! Command-line configuration.

use std::time::Duration;

use clap::Parser;
use ratio_client::{parse_endpoint, DEFAULT_ENDPOINT};
use thiserror::Error;
use url::Url;

pub const DEFAULT_LOG_FILTER: &str = "hand_capture=info,capture_session=info,ratio_client=info";

const MIN_FPS: u32 = 1;
const MAX_FPS: u32 = 240;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint `{url}`: {reason}")]
    Endpoint { url: String, reason: String },
    #[error("frame size must be non-zero (got {width}x{height})")]
    FrameSize { width: u32, height: u32 },
    #[error("timeout must be at least one second")]
    Timeout,
}

// ════════════════════════════════════════════════════════════════════════════
// Cli
// ════════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hand_capture",
    about = "Guided hand-span capture: record thumb/pinky landmarks and submit them for a ratio"
)]
pub struct Cli {
    /// Ratio-computation endpoint
    #[arg(long, env = "RATIO_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Submission timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Capture loop rate (clamped to 1–240)
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Simulated frame width in pixels
    #[arg(long, default_value_t = 640)]
    pub frame_width: u32,

    /// Simulated frame height in pixels
    #[arg(long, default_value_t = 480)]
    pub frame_height: u32,

    /// Read commands from stdin instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    pub log: String,
}

impl Cli {
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let endpoint = parse_endpoint(&self.endpoint).map_err(|e| ConfigError::Endpoint {
            url:    self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::FrameSize { width: self.frame_width, height: self.frame_height });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }
        Ok(AppConfig {
            endpoint,
            timeout:      Duration::from_secs(self.timeout_secs),
            fps:          self.fps.clamp(MIN_FPS, MAX_FPS),
            frame_width:  self.frame_width,
            frame_height: self.frame_height,
            headless:     self.headless,
            log:          self.log,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Validated configuration for the full application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub endpoint:     Url,
    pub timeout:      Duration,
    pub fps:          u32,
    pub frame_width:  u32,
    pub frame_height: u32,
    pub headless:     bool,
    pub log:          String,
}

impl AppConfig {
    /// Time budget for one loop iteration.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1) as u64)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            endpoint:     Url::parse(DEFAULT_ENDPOINT).expect("DEFAULT_ENDPOINT is a valid URL"),
            timeout:      Duration::from_secs(10),
            fps:          60,
            frame_width:  640,
            frame_height: 480,
            headless:     false,
            log:          DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["hand_capture"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_app_config_default() {
        let mut cli = parse(&[]);
        // RATIO_ENDPOINT may be set in the environment
        cli.endpoint = DEFAULT_ENDPOINT.to_string();
        assert_eq!(cli.into_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn fps_is_clamped() {
        assert_eq!(parse(&["--fps", "0"]).into_config().unwrap().fps, 1);
        assert_eq!(parse(&["--fps", "1000"]).into_config().unwrap().fps, 240);
        assert_eq!(parse(&["--fps", "30"]).into_config().unwrap().fps, 30);
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let err = parse(&["--endpoint", "ftp://example.com/x"]).into_config().unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint { .. }));
        let err = parse(&["--endpoint", "not a url"]).into_config().unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint { .. }));
    }

    #[test]
    fn zero_frame_size_is_rejected() {
        let err = parse(&["--frame-width", "0"]).into_config().unwrap_err();
        assert!(matches!(err, ConfigError::FrameSize { width: 0, height: 480 }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse(&["--timeout-secs", "0"]).into_config().unwrap_err();
        assert!(matches!(err, ConfigError::Timeout));
    }

    #[test]
    fn headless_flag_and_custom_endpoint() {
        let cfg = parse(&["--headless", "--endpoint", "https://ratio.example/calc"])
            .into_config()
            .unwrap();
        assert!(cfg.headless);
        assert_eq!(cfg.endpoint.as_str(), "https://ratio.example/calc");
    }

    #[test]
    fn frame_interval_follows_fps() {
        let cfg = AppConfig { fps: 50, ..AppConfig::default() };
        assert_eq!(cfg.frame_interval(), Duration::from_millis(20));
    }
}
