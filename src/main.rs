//! # Inkcraft CLI
//!
//! Command-line interface for analysing ESC/P captures.
//!
//! ## Usage
//!
//! ```bash
//! # Print command statistics for a JSON capture
//! inkcraft parse dtg_usb_capture_20240501_120000.json
//!
//! # Also export the decoded commands
//! inkcraft parse capture.json -o capture_parsed.json
//!
//! # Parse a raw binary dump with a custom command table
//! inkcraft parse --raw job.prn --table my_commands.json
//!
//! # Dump the built-in table as a starting point for extending it
//! inkcraft table > my_commands.json
//! ```

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use inkcraft::{
    Aggregator, CommandTable, InkcraftError, Tokenizer, capture, report, tokenizer::ParsedPacket,
};

/// Inkcraft - ESC/P capture analysis for DTG printers
#[derive(Parser, Debug)]
#[command(name = "inkcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a capture file and print command statistics
    Parse {
        /// JSON capture file (or raw dump with --raw)
        input: PathBuf,

        /// Save decoded commands and statistics as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Treat the input as one raw binary packet
        #[arg(long)]
        raw: bool,

        /// Command table JSON file (defaults to the built-in ESC/P table)
        #[arg(long, value_name = "FILE")]
        table: Option<PathBuf>,
    },

    /// Print the command table as JSON
    Table {
        /// Command table JSON file to validate and print
        #[arg(long, value_name = "FILE")]
        table: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), InkcraftError> {
    match command {
        Commands::Parse {
            input,
            output,
            raw,
            table,
        } => {
            let tokenizer = Tokenizer::new(load_table(table.as_deref())?);

            if !input.is_file() {
                return Err(InkcraftError::Capture(format!(
                    "input file '{}' not found",
                    input.display()
                )));
            }

            let (packets, stats) = parse_capture(&tokenizer, &input, raw)?;

            println!();
            print!("{}", report::render_statistics(&stats, tokenizer.table()));

            if let Some(path) = output {
                let doc = report::ExportDocument::build(&packets, &stats)?;
                doc.save(&path)?;
                println!("Parsed data saved to {}", path.display());
            }
        }
        Commands::Table { table } => {
            let table = load_table(table.as_deref())?;
            println!("{}", table.to_json()?);
        }
    }

    Ok(())
}

fn load_table(path: Option<&Path>) -> Result<CommandTable, InkcraftError> {
    match path {
        Some(path) => CommandTable::from_json(&fs::read_to_string(path)?),
        None => Ok(CommandTable::escp()),
    }
}

/// Decode every packet of a capture, skipping the malformed ones.
///
/// Packets are tokenized in parallel and aggregated in capture order.
fn parse_capture(
    tokenizer: &Tokenizer,
    input: &Path,
    raw: bool,
) -> Result<(Vec<ParsedPacket>, Aggregator), InkcraftError> {
    let results = capture::read_file(input, raw)?;
    let total = results.len();

    let packets: Vec<_> = results
        .into_iter()
        .filter_map(|result| match result {
            Ok(packet) => Some(packet),
            Err(e) => {
                warn!("skipping packet: {}", e);
                None
            }
        })
        .collect();
    debug!(total, decodable = packets.len(), "read capture");

    let parsed: Vec<ParsedPacket> = packets
        .into_par_iter()
        .map(|packet| tokenizer.parse_packet(packet))
        .collect();

    let mut stats = Aggregator::new();
    for packet in &parsed {
        stats.record_packet(packet);
    }

    Ok((parsed, stats))
}
