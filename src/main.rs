use anyhow::Result;
use clap::{Arg, Command};
use clipmaster::config::Config;
use clipmaster::export::write_csv;
use clipmaster::menu::Menu;
use clipmaster::probe::FfprobeProber;
use clipmaster::naming::NamingConvention;
use clipmaster::registry::ClipRegistry;
use clipmaster::rename::rename_to_canonical;
use clipmaster::resolver::TypeResolver;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("clipmaster=info,warn")
        .init();

    let matches = Command::new("ClipMaster")
        .version("0.1.0")
        .author("kijeong")
        .about("Classroom recording clip classification and merging")
        .arg(
            Arg::new("video-dir")
                .short('d')
                .long("video-dir")
                .value_name("DIR")
                .help("Directory containing downloaded recording fragments")
                .required(true),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .value_name("FILE")
                .help("Export the classified registry to CSV and exit"),
        )
        .arg(
            Arg::new("rename")
                .long("rename")
                .help("Rename raw captures to the canonical convention and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let video_dir = PathBuf::from(matches.get_one::<String>("video-dir").unwrap());
    if !video_dir.is_dir() {
        error!("Input directory does not exist: {}", video_dir.display());
        return Err(anyhow::anyhow!("Input directory not found"));
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default().with_env_overrides()
    });
    config.validate()?;

    info!("🚀 ClipMaster starting");
    info!("📁 Input directory: {}", video_dir.display());

    // non-interactive utility modes
    if matches.get_one::<String>("csv").is_some() || matches.get_flag("rename") {
        let naming = NamingConvention::new(&config.naming, &config.scan.media_extension);
        let resolver = TypeResolver::from_config(&config.rooms);
        let prober = FfprobeProber::new(Duration::from_secs(config.scan.probe_timeout_secs));
        let registry = ClipRegistry::build(&video_dir, &naming, &resolver, &prober).await?;

        if let Some(csv_path) = matches.get_one::<String>("csv") {
            let rows = write_csv(&registry, &PathBuf::from(csv_path)).await?;
            info!("📊 Exported {} rows to {}", rows, csv_path);
        }

        if matches.get_flag("rename") {
            let report = rename_to_canonical(&registry, &naming).await;
            info!(
                "🏷️ Renamed {}, skipped {}, failed {}",
                report.renamed, report.skipped, report.failed
            );
        }

        return Ok(());
    }

    Menu::new(config, video_dir).run().await
}
