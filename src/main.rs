//! subhd - search subhd.com for subtitles and download the matching archive

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subhd::cli::{Args, Commands};
use subhd::client::SubhdClient;
use subhd::config::Config;
use subhd::error::SubhdError;
use subhd::subtitle::{save_archive, subtitle_path_for, SearchCandidate};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("subhd.toml").exists() {
                info!("Found subhd.toml in current directory, loading...");
                Config::from_file("subhd.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Search { keyword, raw, json } => {
            let client = SubhdClient::new(&config)?;

            let spinner = spinner(format!("Searching subhd.com for {}", keyword))?;
            let candidates = client.search(&keyword, !raw).await;
            spinner.finish_and_clear();
            let candidates = candidates?;

            if json {
                println!("{}", serde_json::to_string_pretty(&candidates).map_err(SubhdError::Json)?);
            } else {
                print_candidates(&candidates);
            }
        }
        Commands::Download { id, output } => {
            let client = SubhdClient::new(&config)?;

            let spinner = spinner(format!("Downloading subtitle {}", id))?;
            let result = client.download(id).await;
            spinner.finish_and_clear();
            let result = result?;

            let output = output.unwrap_or_else(|| config.download.output_dir.join(id.to_string()));
            let written = save_archive(&result, &output).await?;
            println!("Saved {} archive ({} bytes) to {}", result.archive_type, result.payload.len(), written.display());
        }
        Commands::Fetch { video, pick, output_dir } => {
            let client = SubhdClient::new(&config)?;
            let filename = video.to_string_lossy().to_string();

            let spinner = spinner(format!("Searching subtitles for {}", filename))?;
            let candidates = client.search(&filename, true).await;
            spinner.finish_and_clear();

            let downloadable: Vec<SearchCandidate> = candidates?
                .into_iter()
                .filter(|c| c.numeric_id().is_some())
                .collect();
            let candidate = downloadable
                .get(pick)
                .ok_or_else(|| SubhdError::NoCandidates(filename.clone()))?;
            info!(
                "Picked candidate {} of {}: {}",
                pick + 1,
                downloadable.len(),
                candidate.title.as_deref().unwrap_or("<untitled>")
            );

            let spinner = self::spinner(format!("Downloading {}", candidate.title.as_deref().unwrap_or("subtitle")))?;
            let result = client.download_candidate(candidate).await;
            spinner.finish_and_clear();
            let result = result?;

            let output = subtitle_path_for(&video, output_dir.as_deref(), result.archive_type);
            let written = save_archive(&result, &output).await?;
            println!("Saved {} archive to {}", result.archive_type, written.display());
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subhd").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "subhd.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subhd.log").display());

    Ok(())
}

fn spinner(message: String) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn print_candidates(candidates: &[SearchCandidate]) {
    if candidates.is_empty() {
        println!("No subtitles found.");
        return;
    }

    println!("\n{:<4} {:<10} {:<8} {:<40} {}", "#", "ID", "Format", "Title", "Version");
    println!("{}", "-".repeat(100));
    for (index, candidate) in candidates.iter().enumerate() {
        println!("{:<4} {:<10} {:<8} {:<40} {}",
            index,
            candidate.id.as_deref().unwrap_or("-"),
            candidate.format.as_deref().unwrap_or("-"),
            candidate.title.as_deref().unwrap_or("-"),
            candidate.version.as_deref().unwrap_or("-"),
        );
    }
}
