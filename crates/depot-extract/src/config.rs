//! Command-line configuration.
//!
//! Every path can also come from a `DEPOT_EXTRACT_*` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use depot_extract::{Cli, Command};
//!
//! let cli = Cli::from_args();
//! if let Command::Extract(args) = &cli.command {
//!     args.validate().expect("Invalid configuration");
//!     println!("Extracting into {}", args.output.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use depot_formats::index::IndexLayout;

use crate::error::ConfigError;

/// Top-level arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "depot-extract",
    about = "Inspect and extract depot archives",
    version
)]
pub struct Cli {
    /// Action to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }
}

/// Available actions.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the parsed manifest as JSON
    List(ListArgs),
    /// Print the parsed index as JSON
    Index(IndexArgs),
    /// Decode every manifest file onto disk
    Extract(ExtractArgs),
}

/// Segment table layout of the index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LayoutArg {
    /// Table bounded by its byte length
    #[default]
    Bounded,
    /// Pair count derived from the byte length
    Counted,
}

impl From<LayoutArg> for IndexLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Bounded => Self::Bounded,
            LayoutArg::Counted => Self::Counted,
        }
    }
}

/// Arguments for `list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Manifest file
    #[arg(long, env = "DEPOT_EXTRACT_MANIFEST")]
    pub manifest: PathBuf,

    /// Strip characters Windows rejects from item names
    #[arg(long)]
    pub sanitize_names: bool,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `index`.
#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Index file
    #[arg(long, env = "DEPOT_EXTRACT_INDEX")]
    pub index: PathBuf,

    /// Segment table layout
    #[arg(long, value_enum, env = "DEPOT_EXTRACT_LAYOUT", default_value_t)]
    pub layout: LayoutArg,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `extract`.
#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Index file
    #[arg(long, env = "DEPOT_EXTRACT_INDEX")]
    pub index: PathBuf,

    /// Manifest file
    #[arg(long, env = "DEPOT_EXTRACT_MANIFEST")]
    pub manifest: PathBuf,

    /// Data blob holding the encoded segments
    #[arg(long, env = "DEPOT_EXTRACT_DATA")]
    pub data: PathBuf,

    /// Key file, `{"keys": {"<depot id>": "<hex key>"}}`
    #[arg(long, env = "DEPOT_EXTRACT_KEYS")]
    pub keys: Option<PathBuf>,

    /// Output directory
    #[arg(
        short,
        long,
        env = "DEPOT_EXTRACT_OUTPUT",
        default_value = "./extracted"
    )]
    pub output: PathBuf,

    /// Segment table layout
    #[arg(long, value_enum, env = "DEPOT_EXTRACT_LAYOUT", default_value_t)]
    pub layout: LayoutArg,

    /// Log failing files and continue with the rest
    #[arg(long)]
    pub keep_going: bool,

    /// Strip characters Windows rejects from item names (always on for Windows)
    #[arg(long)]
    pub sanitize_names: bool,
}

impl ExtractArgs {
    /// Whether item names are sanitized on this platform.
    #[must_use]
    pub fn sanitize_names(&self) -> bool {
        self.sanitize_names || cfg!(windows)
    }

    /// Check that every input file exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingInput` for the first missing input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_file("index", &self.index)?;
        require_file("manifest", &self.manifest)?;
        require_file("data", &self.data)?;
        if let Some(keys) = &self.keys {
            require_file("keys", keys)?;
        }
        Ok(())
    }
}

impl ListArgs {
    /// Whether item names are sanitized on this platform.
    #[must_use]
    pub fn sanitize_names(&self) -> bool {
        self.sanitize_names || cfg!(windows)
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingInput {
            what,
            path: path.to_path_buf(),
        })
    }
}
