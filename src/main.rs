//! # Prefine - Main Entry Point
//!
//! Punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Merge della configurazione (file + flag espliciti) e validazione
//! - Collegamento di Ctrl-C al canale di stop della scansione
//! - Output (progress bar, testo o JSON) e codice di uscita
//!
//! ## Codici di uscita:
//! - `0`: run completata senza errori
//! - `1`: run completata con almeno un file fallito
//! - `130`: Ctrl-C dopo la scansione; i file già avviati vengono completati
//! - non-zero via `anyhow`: configurazione non valida o scansione fallita
//!
//! ## Esempio di utilizzo:
//! ```bash
//! prefine ./public -q 80 --max-width 1600 -e "*.tmp,node_modules" -w 4
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prefine::{
    file_manager::FileManager,
    json_output::{JsonConfig, JsonMessage},
    Concurrency, MediaOptimizer, OptimizationReport, Settings, StopSignal, TransformerRegistry,
};

#[derive(Parser)]
#[command(name = "prefine", version)]
#[command(about = "Optimize images in place: resize, recompress and replace only when smaller")]
struct Args {
    /// Directory to scan [default: .]
    path: Option<PathBuf>,

    /// Verbose logging and per-file output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - report what would be processed without touching files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Only process files whose name matches one of these globs (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    include: Vec<String>,

    /// Skip files whose name matches a glob or whose path contains the pattern
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Descend into subdirectories [default: true]
    #[arg(short, long, action = ArgAction::Set, value_name = "BOOL")]
    recursive: Option<bool>,

    /// JPEG quality (1-100) [default: 85]
    #[arg(short, long)]
    quality: Option<u8>,

    /// Maximum image width [default: 1920]
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum image height [default: 1080]
    #[arg(long)]
    max_height: Option<u32>,

    /// Number of files processed at once (default: one task per file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Load settings from a JSON file; explicit flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the effective settings to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Emit one JSON event per line on stdout instead of a progress bar
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Apply explicitly passed flags on top of the loaded settings
    fn merge_into(&self, mut settings: Settings) -> Settings {
        if let Some(path) = &self.path {
            settings.scan.root_path = path.clone();
        }
        if !self.include.is_empty() {
            settings.scan.include = self.include.clone();
        }
        if !self.exclude.is_empty() {
            settings.scan.exclude = self.exclude.clone();
        }
        if let Some(recursive) = self.recursive {
            settings.scan.recursive = recursive;
        }
        if let Some(quality) = self.quality {
            settings.optimize.quality = quality;
        }
        if let Some(max_width) = self.max_width {
            settings.optimize.max_width = max_width;
        }
        if let Some(max_height) = self.max_height {
            settings.optimize.max_height = max_height;
        }
        if self.workers.is_some() {
            settings.workers = self.workers;
        }
        settings.optimize.dry_run |= self.dry_run;
        settings.optimize.verbose |= self.verbose;
        settings
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for results and JSON events
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_report(report: &OptimizationReport, verbose: bool) {
    for result in &report.results {
        let path = result.file.path.display();
        match &result.error {
            Some(error) => println!("Error processing {}: {}", path, error),
            None if verbose && result.was_optimized() => println!(
                "Optimized {}: saved {} ({:.1}%)",
                path,
                FileManager::format_size(result.savings),
                result.savings_percent()
            ),
            None if verbose => println!("Unchanged {}", path),
            None => {}
        }
    }

    println!("{}", report.format_summary());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    let loaded = match &args.config {
        Some(path) => Settings::from_file(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let settings = args.merge_into(loaded);
    settings.validate()?;

    if let Some(path) = &args.save_config {
        settings.save_to_file(path).await?;
        info!("Saved settings to {}", path.display());
    }

    let optimizer = MediaOptimizer::new(TransformerRegistry::standard(), settings.optimize.clone())?
        .with_concurrency(Concurrency::from_workers(settings.workers)?)?
        .with_progress(!args.json && !settings.optimize.verbose);

    let stop = StopSignal::new();
    let stop_receiver = stop.subscribe();
    let signal = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        if signal.request_stop() {
            warn!("Interrupt received, stopping scan");
        } else {
            warn!("Interrupt received, finishing files in progress (Ctrl-C again to abort)");
        }

        // A second interrupt skips temp file cleanup
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Aborting");
            std::process::exit(130);
        }
    });

    let start = Instant::now();
    let files = match optimizer.scan(&settings.scan, Some(stop_receiver)).await {
        Ok(files) => files,
        Err(e) => {
            if args.json {
                JsonMessage::error("Failed to scan files".to_string(), Some(e.to_string())).emit();
            }
            return Err(e).with_context(|| {
                format!("Failed to scan {}", settings.scan.root_path.display())
            });
        }
    };

    if args.json {
        JsonMessage::start(
            settings.scan.root_path.clone(),
            files.len(),
            JsonConfig::new(&settings.optimize, settings.workers),
        )
        .emit();
    }

    let mut report = optimizer.run(files).await;
    report.duration = start.elapsed();

    if args.json {
        for result in &report.results {
            JsonMessage::file_complete(result).emit();
        }
        JsonMessage::complete(&report).emit();
    } else {
        print_report(&report, settings.optimize.verbose);
    }

    if stop.is_interrupted() {
        std::process::exit(130);
    }

    if report.failed_files > 0 {
        std::process::exit(1);
    }

    Ok(())
}
