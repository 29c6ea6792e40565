mod input_discovery;

use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use scripture_backend::book_codes::known_book_codes;
use scripture_backend::{logger, extract_file_to_dir, ExtractOptions, ExtractStats};
use scripture_backend::{DEFAULT_OUTPUT_DIR, DEFAULT_SEARCH_DIRS};

use input_discovery::find_input;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scripture verse extraction CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level: silent, error, warn, info or debug.
    /// Overrides the LOG_LEVEL environment variable.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract verses from an OSIS document into per-chapter JSON files
    Extract {
        /// Path to the OSIS XML document.
        /// If not provided, the download directories are searched for one.
        #[arg(long, value_name = "FILE_PATH", env = "SCRIPTURE_INPUT")]
        input: Option<PathBuf>,

        /// Directory to write `<book>/<NN>.json` files into
        #[arg(long, value_name = "DIRECTORY_PATH", env = "SCRIPTURE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Write plain words without `{H1234}` lexical keys
        #[arg(long, default_value_t = false, env = "SCRIPTURE_NO_LEXICAL")]
        no_lexical: bool,

        /// Also write chapters that contain no verses
        #[arg(long, default_value_t = false, env = "SCRIPTURE_EMIT_EMPTY_CHAPTERS")]
        emit_empty_chapters: bool,

        /// Don't write index.json
        #[arg(long, default_value_t = false)]
        no_index: bool,

        /// Write JSON without indentation
        #[arg(long, default_value_t = false)]
        compact: bool,
    },

    /// List the known book codes and their output names
    Books,
}

fn resolve_input(input: Option<PathBuf>) -> Result<PathBuf> {
    match input {
        Some(path) => {
            if !path.is_file() {
                return Err(anyhow!("Input file does not exist: {:?}", path));
            }
            Ok(path)
        }
        None => find_input(DEFAULT_SEARCH_DIRS).ok_or_else(|| {
            anyhow!(
                "No .xml or .osis file found in {:?}. Use --input or set SCRIPTURE_INPUT.",
                DEFAULT_SEARCH_DIRS
            )
        }),
    }
}

fn extract(input: &Path, output_dir: &Path, options: &ExtractOptions) -> Result<ExtractStats> {
    let (out_path, stats) = extract_file_to_dir(input, output_dir, options)
        .with_context(|| format!("Failed to extract {:?}", input))?;

    println!("Wrote {:?}", out_path);
    print_stats(&stats);
    Ok(stats)
}

fn print_stats(stats: &ExtractStats) {
    println!("Verses:   {}", stats.verses_emitted);
    println!("Chapters: {}", stats.chapters_emitted);
    if stats.empty_chapters_suppressed > 0 {
        println!("Empty chapters suppressed: {}", stats.empty_chapters_suppressed);
    }
    if stats.skipped_signals() > 0 {
        println!(
            "Skipped: {} unknown book, {} malformed id, {} unmatched end, {} duplicate start",
            stats.unknown_book_signals,
            stats.malformed_ids,
            stats.unmatched_verse_ends,
            stats.duplicate_verse_starts
        );
    }
}

fn print_books() {
    for (code, slug) in known_book_codes() {
        println!("{}\t{}", code, slug);
    }
}

fn main() {
    // The .env file may define SCRIPTURE_* variables, picked up by clap via `env = ...`
    if dotenv().is_err() {
        println!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        if !logger::set_log_level_str(level) {
            eprintln!("Error: Invalid log level: {}", level);
            exit(1);
        }
    }
    logger::init();

    let command_result = match cli.command {
        Commands::Extract { input, output_dir, no_lexical, emit_empty_chapters, no_index, compact } => {
            let options = ExtractOptions {
                annotate_lexical: !no_lexical,
                emit_empty_chapters,
                write_index: !no_index,
                pretty: !compact,
            };

            resolve_input(input)
                .and_then(|input| extract(&input, &output_dir, &options))
                .map(|_| ())
        }

        Commands::Books => {
            print_books();
            Ok(())
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
