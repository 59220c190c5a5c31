use clap::{Parser, Subcommand};
use emoji_dataset::config::{self, DatasetConfig};
use emoji_dataset::fetch::HttpFetcher;
use emoji_dataset::{output, process};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emoji-dataset")]
#[command(about = "Build a labelled emoji image dataset from a JSON manifest")]
#[command(long_about = "\
Build a labelled emoji image dataset from a JSON manifest

Every manifest entry is downloaded once. The original bytes are kept in the
raw directory; a copy flattened onto white goes to the emoji directory as a
numbered image with its label beside it.

Layout:

  emojisPruned.json        # [{\"link\": ..., \"name\": ..., \"processed\": ...}, ...]
  raw/
  └── <name>.png           # exactly as downloaded
  emoji/
  ├── img1.png             # manifest entry 1, on white
  ├── img1.txt             # its \"processed\" label
  └── ...

Runs resume: entries up to the highest imgN.png on disk are skipped, so
appending to the manifest and running again only fetches the new entries.

Run 'emoji-dataset gen-config' to generate a documented emoji-dataset.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: emoji-dataset.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest file
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Directory for untouched downloads
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,

    /// Directory for numbered image/label pairs
    #[arg(long, global = true)]
    emoji_dir: Option<PathBuf>,

    /// Parallel downloads (default: CPU cores)
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Download everything past the resume point (the default)
    Run,
    /// Show the resume point and pending work without downloading
    Status,
    /// Print a stock emoji-dataset.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let settings = resolve_config(&cli)?;
            let fetcher = HttpFetcher::new(&settings.fetch.http_options())?;
            let options = process::RunOptions {
                workers: config::effective_workers(&settings.processing),
                repair_labels: settings.processing.repair_labels,
            };

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_process_event(&event);
                }
            });
            let result = process::run(
                &fetcher,
                &settings.layout(),
                &settings.manifest,
                &options,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let summary = result?;
            output::print_run_summary(&summary);
        }
        Command::Status => {
            let settings = resolve_config(&cli)?;
            let report = process::status(&settings.layout(), &settings.manifest)?;
            output::print_status(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file, then apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<DatasetConfig, config::ConfigError> {
    let mut settings = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_config_or_default(Path::new(config::DEFAULT_CONFIG_FILE))?,
    };
    if let Some(manifest) = &cli.manifest {
        settings.manifest = manifest.clone();
    }
    if let Some(raw_dir) = &cli.raw_dir {
        settings.raw_dir = raw_dir.clone();
    }
    if let Some(emoji_dir) = &cli.emoji_dir {
        settings.emoji_dir = emoji_dir.clone();
    }
    if cli.workers.is_some() {
        settings.processing.max_workers = cli.workers;
    }
    settings.validate()?;
    Ok(settings)
}
