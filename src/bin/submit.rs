use anyhow::{Context, Result};
use clap::Parser;
use netgate::intake::{InlinePayload, RequestInput, SubmittedForm, DEFAULT_UPLOAD_FIELD};
use netgate::{build_gateway, CallerContext, Config};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "netgate-submit")]
#[command(about = "Submit a network construction job without going through HTTP")]
struct Args {
    /// Job kind: standard or provider
    kind: String,

    /// Network file to upload into the caller's folder
    #[arg(short, long, conflicts_with = "network", required_unless_present = "network")]
    file: Option<PathBuf>,

    /// JSON file holding an inline network description
    #[arg(short, long)]
    network: Option<PathBuf>,

    #[arg(short, long, default_value_t = netgate::intake::DEFAULT_THRESHOLD)]
    threshold: f64,

    #[arg(long)]
    calibration: bool,

    #[arg(long)]
    directed: bool,

    /// Caller id; selects the storage folder
    #[arg(short, long, default_value = netgate::caller::ANONYMOUS_CALLER)]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    log::info!("Configuration loaded successfully");

    let input = match (&args.file, &args.network) {
        (Some(path), _) => {
            let content = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let form = SubmittedForm::new()
                .with_file(DEFAULT_UPLOAD_FIELD, filename, content)
                .with_text("threshold", args.threshold.to_string())
                .with_text("calibration", args.calibration.to_string())
                .with_text("directed", args.directed.to_string());
            RequestInput::Form(form)
        }
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let network = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            RequestInput::Payload(InlinePayload {
                network: Some(network),
                threshold: Some(args.threshold),
                calibration: Some(args.calibration),
                directed: Some(args.directed),
            })
        }
        (None, None) => anyhow::bail!("Supply --file or --network"),
    };

    let gateway = build_gateway(&config).await?;
    let caller = CallerContext::new(args.user.as_str(), config.storage_root());
    let request_id = Uuid::new_v4().to_string();

    let accepted = gateway
        .submit(&args.kind, input, &caller, &request_id)
        .await
        .with_context(|| format!("Submission of {} job failed", args.kind))?;

    println!("Operation-Location: {}", accepted.operation_location());
    Ok(())
}
