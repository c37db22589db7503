use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "uptrack", version, about = "Track simulated upload tasks until they finish")]
pub struct Args {
    /// Files to submit, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Config file to use instead of ~/.uptrack/config.toml or ./config.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also accept image/* files.
    #[arg(long)]
    pub allow_images: bool,

    /// Probe interval in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Seed for reproducible outcomes.
    #[arg(long)]
    pub seed: Option<u64>,

    /// MIME type for every file instead of guessing from the extension.
    #[arg(long)]
    pub mime: Option<String>,

    /// Cancel the task with this display name right after submission.
    /// Can be specified multiple times.
    #[arg(long = "cancel", action = clap::ArgAction::Append)]
    pub cancel: Vec<String>,

    /// Print events as JSON lines.
    #[arg(long)]
    pub json: bool,
}
