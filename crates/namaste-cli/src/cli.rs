//! CLI argument definitions for the terminology engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "namaste",
    version,
    about = "NAMASTE to ICD-11 terminology engine",
    long_about = "Ingest NAMASTE traditional medicine terminology exports and\n\
                  resolve them against ICD-11 (Traditional Medicine Module 2 and\n\
                  biomedicine).\n\n\
                  Live WHO ICD-11 API resolution is enabled by setting\n\
                  ICD_CLIENT_ID and ICD_CLIENT_SECRET; without credentials the\n\
                  engine resolves from the bundled fallback table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the NAMASTE CSV export to load.
    #[arg(long = "input", value_name = "CSV", global = true)]
    pub input: Option<PathBuf>,

    /// On-disk code cache surviving between invocations.
    #[arg(long = "cache-file", value_name = "PATH", global = true, env = "NAMASTE_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a CSV export and report accepted/rejected row counts.
    Ingest,

    /// Search the loaded terminology.
    Search(SearchArgs),

    /// Translate a native code to its ICD-11 codes.
    Translate(TranslateArgs),

    /// Expand the terminology against an optional text filter.
    Expand(ExpandArgs),

    /// Print record counts for the loaded terminology.
    Summary,

    /// Print the CodeSystem document.
    Codesystem(OutputArgs),

    /// Print the NAMASTE to ICD-11 ConceptMap document.
    Conceptmap(OutputArgs),

    /// Generate both documents into a directory.
    Generate(GenerateArgs),
}

#[derive(Parser)]
pub struct OutputArgs {
    /// Write to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// The search text.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results.
    #[arg(long = "limit", default_value_t = 10)]
    pub limit: usize,

    /// Minimum confidence (0-100).
    #[arg(long = "threshold", default_value_t = 60)]
    pub threshold: u8,
}

#[derive(Parser)]
pub struct TranslateArgs {
    /// The native NAMASTE code.
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Source system of the code; only the native system is supported.
    #[arg(long = "system", default_value = "namaste")]
    pub system: String,
}

#[derive(Parser)]
pub struct ExpandArgs {
    /// Text filter; omit for the full listing.
    #[arg(value_name = "FILTER")]
    pub filter: Option<String>,

    /// Maximum number of entries in the expansion.
    #[arg(long = "count", default_value_t = 10)]
    pub count: usize,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Directory the documents are written to.
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}
