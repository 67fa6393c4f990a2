use std::{error::Error, num::NonZeroUsize, path::PathBuf};

use clap::Parser;
use f1replay::{
    ExportConfig, ExportError, ExportOptions, SessionProvider, build_bundle,
    session::{CachedSessionProvider, FileSessionProvider, SessionCache},
    write_bundle,
};
use log::{LevelFilter, error, info, warn};

const DEFAULT_YEAR: u16 = 2025;
const DEFAULT_ROUND: u32 = 12;

/// Export a recorded race session as a JSON payload for the web race replay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Championship year
    #[arg(default_value_t = DEFAULT_YEAR)]
    year: u16,

    /// Round number within the championship
    #[arg(default_value_t = DEFAULT_ROUND)]
    round: u32,

    /// Output file, overwritten if it exists
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep one frame out of every N synchronized frames
    #[arg(short, long)]
    sample_rate: Option<NonZeroUsize>,

    /// Directory holding recorded session files
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Directory for the session cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Do not read or write the session cache
    #[arg(long)]
    no_cache: bool,

    /// Remove every cached session before loading
    #[arg(long)]
    clear_cache: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Persist the effective settings as the default config
    #[arg(long)]
    save_config: bool,
}

impl Args {
    fn apply_to(&self, mut config: ExportConfig) -> ExportConfig {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(session_dir) = &self.session_dir {
            config.session_dir = session_dir.clone();
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = Some(cache_dir.clone());
        }
        if self.no_cache {
            config.cache_enabled = false;
        }
        config
    }

    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }
}

fn session_cache(config: &ExportConfig, clear: bool) -> SessionCache {
    let Some(cache_dir) = config.resolved_cache_dir() else {
        warn!("Could not find a cache directory, session cache disabled");
        return SessionCache::new(PathBuf::new());
    };
    let mut cache = SessionCache::new(cache_dir);
    if clear {
        match cache.clear() {
            Ok(()) => info!("Cleared session cache"),
            Err(e) => warn!("Could not clear session cache: {}", e),
        }
    }
    if config.cache_enabled {
        if let Err(e) = cache.enable() {
            warn!("Session cache disabled: {}", e);
        }
    }
    cache
}

fn export(args: &Args) -> Result<(), ExportError> {
    let config = match ExportConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            ExportConfig::default()
        }
    };
    let config = args.apply_to(config);
    if args.save_config {
        let path = config.save()?;
        info!("Saved config to {:?}", path);
    }

    // The cache is enabled before the first load so this run can use it
    let mut provider = CachedSessionProvider::new(
        FileSessionProvider::new(config.session_dir.clone()),
        session_cache(&config, args.clear_cache),
    );
    let session = provider.load_session(args.year, args.round)?;
    info!(
        "Loaded session: {} - {}",
        session.event.name, session.event.round
    );

    let bundle = build_bundle(
        &session,
        &config.color_resolver(),
        ExportOptions {
            year: args.year,
            sample_rate: config.sample_rate,
        },
    );
    let bytes = write_bundle(&config.output, &bundle)?;

    info!(
        "Exported {} frames to {:?}",
        bundle.metadata.total_frames, config.output
    );
    info!("   File size: {:.2} KB", bytes as f64 / 1024.);
    info!("   Drivers: {}", bundle.drivers.len());
    info!("   Track points: {}", bundle.track.len());
    Ok(())
}

fn main() {
    let args = Args::parse();
    colog::default_builder()
        .filter_level(args.log_level())
        .init();

    if let Err(e) = export(&args) {
        error!("Export failed: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            error!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
