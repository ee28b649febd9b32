use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean CSV exports and audit the result", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean one or more CSV files (or directories of them) and audit each result
    Clean(CleanArgs),
    /// Show sanitized headers and inferred column types for a CSV file
    Profile(ProfileArgs),
    /// Audit an already-cleaned CSV file against its original
    Audit(AuditArgs),
}

/// Options shared by every command that reads CSV input.
#[derive(Debug, Args)]
pub struct ReadOptions {
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML file overriding profiling, date and audit thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of values to sample per column when inferring types (0 means full scan)
    #[arg(long = "sample-rows")]
    pub sample_rows: Option<usize>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Input CSV files or directories containing them
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// Directory for cleaned files (defaults to `cleaned_csvs` beside the input)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Directory for the run log (defaults to `logs` beside the input)
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,
    /// Also write a machine-readable JSON report to this path
    #[arg(long = "report-json")]
    pub report_json: Option<PathBuf>,
    #[command(flatten)]
    pub read: ReadOptions,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Input CSV file to profile
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub read: ReadOptions,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// The untouched source file
    #[arg(long)]
    pub original: PathBuf,
    /// The cleaned file to certify
    #[arg(long)]
    pub cleaned: PathBuf,
    #[command(flatten)]
    pub read: ReadOptions,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
