//! ratio_submit: post a saved landmark payload to the ratio service.

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ratio_client::{parse_endpoint, SubmissionClient, SubmissionPayload, SubmitError, DEFAULT_ENDPOINT};

#[derive(Parser, Debug)]
#[command(name = "ratio_submit", about = "Submit a landmark payload JSON file to the ratio service")]
struct Cli {
    /// Payload file (`{"landmarks": [[...6 values...], ...]}`); `-` reads stdin
    payload: PathBuf,

    /// Ratio-computation endpoint
    #[arg(long, env = "RATIO_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratio_client=info".into()),
        )
        .init();

    let text = if cli.payload.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.payload)
            .with_context(|| format!("reading {}", cli.payload.display()))?
    };

    let payload = SubmissionPayload::from_json(&text).context("payload is not valid landmark JSON")?;
    let endpoint = parse_endpoint(&cli.endpoint)?;

    println!();
    println!("  Submitting {} samples to {}", payload.len(), endpoint);
    println!();

    let client = SubmissionClient::new(endpoint, Duration::from_secs(cli.timeout_secs.max(1)));
    match client.submit(&payload) {
        Ok(result) => {
            println!("{}", result);
            Ok(())
        }
        Err(SubmitError::Http { status, body }) => {
            anyhow::bail!("service returned HTTP {}: {}", status, body.trim())
        }
        Err(e) => Err(e.into()),
    }
}
