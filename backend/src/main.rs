//! Autoclean CLI - Fetch a shared CSV and resolve its missing values
//!
//! # Main Commands
//!
//! ```bash
//! autoclean clean <LINK>                        # Download, ask per column, write cleaned_data.csv
//! autoclean clean <LINK> --strategy age=mean    # Preset strategies, no questions for those columns
//! autoclean clean --input data.csv -o -         # Clean a local file to stdout
//! autoclean serve                               # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! autoclean inspect <LINK>                      # Summary and preview, no cleaning
//! autoclean resolve <LINK>                      # Print the direct download URL
//! autoclean normalize ratio 0.25 0.5            # Run a value normalizer
//! ```

use autoclean::{
    clean_file, clean_link, inspect_file, inspect_link, render_preview, resolve_link, CleanOptions,
    CleanResult, Inspection, PresetStrategies, PromptStrategies, Settings, Strategy, StrategyProvider,
};
use autoclean::{clean_thousands_and_units, convert_ratio, is_not_numeric, replace_symbol, Cell};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "autoclean")]
#[command(about = "Download a shared CSV and handle its missing values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: link → download → resolve missing values → CSV
    Clean {
        /// Shareable link to the CSV
        link: Option<String>,

        /// Read a local CSV instead of downloading
        #[arg(short, long, conflicts_with = "link")]
        input: Option<PathBuf>,

        /// Strategy for one column, as COLUMN=STRATEGY (repeatable)
        #[arg(short, long = "strategy", value_name = "COL=STRATEGY")]
        strategies: Vec<String>,

        /// Strategy for columns without one
        #[arg(long)]
        default_strategy: Option<Strategy>,

        /// JSON file mapping column names to strategies
        #[arg(long = "strategies", value_name = "FILE")]
        strategies_file: Option<PathBuf>,

        /// Fail instead of asking when a column has no strategy
        #[arg(long)]
        no_prompt: bool,

        /// Output file, `-` for stdout
        #[arg(short, long, default_value = "cleaned_data.csv")]
        output: PathBuf,

        /// Number of preview rows (default: AUTOCLEAN_PREVIEW_ROWS or 5)
        #[arg(long)]
        preview_rows: Option<usize>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Show dataset info, preview and columns needing a strategy
    Inspect {
        /// Shareable link to the CSV
        link: Option<String>,

        /// Read a local CSV instead of downloading
        #[arg(short, long, conflicts_with = "link")]
        input: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Print the direct download URL for a shareable link
    Resolve {
        link: String,
    },

    /// Apply a value normalizer to each argument
    Normalize {
        #[arg(value_enum)]
        kind: NormalizerKind,

        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: AUTOCLEAN_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NormalizerKind {
    /// Ratio → percentage
    Ratio,
    /// Strip a trailing percent sign
    Symbol,
    /// Report whether the value is non-numeric
    Numeric,
    /// Strip thousands separators and unit placeholders
    Thousands,
}

/// Where the data comes from.
enum Source {
    Link(String),
    File(PathBuf),
}

impl Source {
    fn pick(link: Option<String>, input: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        match (link, input) {
            (_, Some(path)) => Ok(Source::File(path)),
            (Some(link), None) => Ok(Source::Link(link)),
            (None, None) => Err("a link or --input FILE is required".into()),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match Settings::from_env() {
        Ok(settings) => run(cli, settings).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Clean {
            link,
            input,
            strategies,
            default_strategy,
            strategies_file,
            no_prompt,
            output,
            preview_rows,
            delimiter,
        } => {
            let source = Source::pick(link, input)?;
            let mut options = CleanOptions::from(&settings);
            options.delimiter = delimiter;
            if let Some(n) = preview_rows {
                options.preview_rows = n;
            }

            let presets = build_presets(strategies_file.as_deref(), &strategies, default_strategy)?;
            let result = if no_prompt {
                let mut presets = presets;
                run_clean(&source, &mut presets, &options).await?
            } else {
                let stdin = io::stdin();
                let mut prompt = PromptStrategies::new(presets, stdin.lock(), io::stderr());
                run_clean(&source, &mut prompt, &options).await?
            };

            report_clean(&result, options.preview_rows);
            write_output(&result.csv, &output)
        }

        Commands::Inspect { link, input, delimiter } => {
            let mut options = CleanOptions::from(&settings);
            options.delimiter = delimiter;

            let inspection = match Source::pick(link, input)? {
                Source::Link(link) => inspect_link(&link, &options).await?,
                Source::File(path) => inspect_file(&path, &options)?,
            };
            print_inspection(&inspection);
            Ok(())
        }

        Commands::Resolve { link } => {
            let resolved = resolve_link(&link)?;
            eprintln!("   File ID: {}", resolved.file_id);
            println!("{}", resolved.download_url);
            Ok(())
        }

        Commands::Normalize { kind, values } => {
            for value in &values {
                println!("{}", normalize_value(kind, value));
            }
            Ok(())
        }

        Commands::Serve { port } => {
            let port = port.unwrap_or(settings.port);
            autoclean::server::start_server(port, CleanOptions::from(&settings)).await?;
            Ok(())
        }
    }
}

/// Strategy file first, `--strategy` flags on top.
fn build_presets(
    file: Option<&Path>,
    assignments: &[String],
    default: Option<Strategy>,
) -> Result<PresetStrategies, Box<dyn std::error::Error>> {
    let base = match file {
        Some(path) => PresetStrategies::from_json_file(path)?,
        None => PresetStrategies::new(),
    };
    let flags = PresetStrategies::from_assignments(assignments)?.with_default(default);

    Ok(base.merge(flags))
}

async fn run_clean<P: StrategyProvider>(
    source: &Source,
    provider: &mut P,
    options: &CleanOptions,
) -> Result<CleanResult, Box<dyn std::error::Error>> {
    let result = match source {
        Source::Link(link) => clean_link(link, provider, options).await?,
        Source::File(path) => clean_file(path, provider, options)?,
    };
    Ok(result)
}

fn report_clean(result: &CleanResult, preview_rows: usize) {
    eprintln!("\n📊 Before:\n{}", result.info);
    eprintln!("\n📊 After:\n{}", result.cleaned_info);
    eprintln!("\n👀 Preview:\n{}", render_preview(&result.dataset, preview_rows));
}

fn print_inspection(inspection: &Inspection) {
    if let Some(ref source) = inspection.source {
        eprintln!("🔗 {}", source.download_url);
    }
    println!("{}", inspection.info);
    println!();
    for row in &inspection.preview {
        println!("{}", row.join(" | "));
    }

    if inspection.pending.is_empty() {
        println!("\n✅ No missing values in numeric columns");
    } else {
        println!("\n⚠️  Columns needing a strategy:");
        for p in &inspection.pending {
            println!("   {} ({} missing)", p.column, p.missing);
        }
    }
}

fn normalize_value(kind: NormalizerKind, value: &str) -> String {
    let cell = Cell::text(value);
    match kind {
        NormalizerKind::Ratio => convert_ratio(&cell).to_text(),
        NormalizerKind::Symbol => replace_symbol(&cell),
        NormalizerKind::Numeric => is_not_numeric(&cell).to_string(),
        NormalizerKind::Thousands => clean_thousands_and_units(&cell).to_text(),
    }
}

fn write_output(content: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.as_os_str() == "-" {
        print!("{}", content);
    } else {
        fs::write(path, content)?;
        eprintln!("💾 Output written to: {}", path.display());
    }
    Ok(())
}
