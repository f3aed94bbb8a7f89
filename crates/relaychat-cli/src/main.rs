use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use relaychat_cli::app;

#[derive(Parser)]
#[command(name = "relaychat")]
#[command(about = "relaychat - chat with a question-answering service through a CORS relay")]
#[command(version)]
struct Cli {
    /// Send a single prompt, print the answer and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Relay URL to post queries to
    #[arg(long)]
    relay_url: Option<String>,

    /// Directory holding the saved conversations
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep conversations in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Write the effective settings (including overrides) to the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = relaychat_core::Settings::load();

    if let Some(url) = cli.relay_url {
        settings.relay.url = url;
    }
    if let Some(dir) = cli.data_dir {
        settings.storage.data_dir = Some(dir);
    }

    if cli.save_config {
        settings.save()?;
        println!("Saved settings to {}", relaychat_core::Settings::config_path().display());
    }

    let session = app::build_session(&settings, cli.ephemeral)?;

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&session, &prompt).await?;
    } else {
        app::run_repl(&session).await?;
    }

    Ok(())
}
