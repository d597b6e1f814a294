//! hand_capture: interactive entry point.

use clap::Parser;
use hand_capture::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.into_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.log)),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hand Capture: guided thumb/pinky span recorder        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!("  Ratio service: {}", cfg.endpoint);
    println!();

    if !cfg.headless {
        println!("  Opening status window…");
        println!();
    }

    run(cfg)
}
