//! Upload an audio library to the gateway
//!
//! Walks a directory and uploads every `.wav`, `.mp3`, `.m4a` and `.cue` file
//! to `<prefix>/<relative path>`.
//!
//! Run with: cargo run --example upload_audio -- ./music --prefix audio

use clap::Parser;
use objgate_client::{upload_directory, Config, GatewayClient};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "upload_audio")]
#[command(about = "Upload a directory of audio files to an objgate gateway")]
struct Args {
    /// Directory to upload
    dir: PathBuf,

    /// Key prefix
    #[arg(long, default_value = "audio")]
    prefix: String,

    /// Gateway endpoint
    #[arg(long, env = "OBJGATE_ENDPOINT", default_value = "http://localhost:8787")]
    endpoint: String,

    /// Bearer token
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = Config::new(args.endpoint);
    if let Some(token) = args.auth_token {
        config = config.with_token(token);
    }
    let client = GatewayClient::new(config)?;

    println!("📤 Uploading {} ...", args.dir.display());
    let summary = upload_directory(&client, &args.dir, &args.prefix).await?;

    for file in &summary.uploaded {
        println!("   ✅ {} ({} bytes)", file.key, file.size);
    }
    for (path, reason) in &summary.failed {
        println!("   ❌ {}: {}", path.display(), reason);
    }
    println!(
        "\n{} uploaded, {} failed, {} bytes total",
        summary.uploaded.len(),
        summary.failed.len(),
        summary.total_bytes()
    );

    if !summary.failed.is_empty() {
        anyhow::bail!("{} uploads failed", summary.failed.len());
    }
    Ok(())
}
