//! Command-line front end for depot archives.
//!
//! Wires the index and manifest parsers, the key file and the data blob
//! together:
//!
//! - `list` prints the manifest as JSON
//! - `index` prints the index as JSON
//! - `extract` writes every manifest item below an output directory

#![warn(missing_docs)]

mod blob;
mod config;
mod error;
mod extract;

pub use blob::DataBlob;
pub use config::{Cli, Command, ExtractArgs, IndexArgs, LayoutArg, ListArgs};
pub use error::{ConfigError, ExtractError, ExtractResult};
pub use extract::{ExtractSummary, Extractor, relative_path};

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use depot_crypto::DepotKeyStore;
use depot_formats::index::{DepotIndex, IndexLayout, IndexParser};
use depot_formats::manifest::{Manifest, ManifestParser, sanitize_file_name};
use serde::Serialize;
use tracing::info;

/// Run one command, writing JSON output to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::List(args) => {
            let manifest = load_manifest(&args.manifest, args.sanitize_names())?;
            write_json(out, &manifest, args.pretty)
        }
        Command::Index(args) => {
            let index = load_index(&args.index, args.layout.into())?;
            write_json(out, &index, args.pretty)
        }
        Command::Extract(args) => {
            let summary = extract(args)?;
            if !summary.failed.is_empty() {
                bail!("{} files could not be extracted", summary.failed.len());
            }
            Ok(())
        }
    }
}

/// Extract a depot as configured by `args`.
///
/// With `keep_going` set, failing items are listed in the summary instead
/// of aborting the run.
pub fn extract(args: &ExtractArgs) -> Result<ExtractSummary> {
    args.validate()?;

    let index = load_index(&args.index, args.layout.into())?;
    let manifest = load_manifest(&args.manifest, args.sanitize_names())?;
    let keys = match &args.keys {
        Some(path) => load_keys(path)?,
        None => DepotKeyStore::new(),
    };
    let blob = DataBlob::open(&args.data)
        .with_context(|| format!("Failed to open data blob {}", args.data.display()))?;

    info!(
        "Extracting depot {} ({} items, {} index records) into {}",
        manifest.depot_id(),
        manifest.items.len(),
        index.len(),
        args.output.display()
    );

    let summary = Extractor::new(&manifest, &index, &keys, &blob)
        .keep_going(args.keep_going)
        .run(&args.output)
        .context("Extraction failed")?;

    info!(
        "Extracted {} files ({} bytes) and {} directories",
        summary.files, summary.bytes, summary.directories
    );
    Ok(summary)
}

fn load_index(path: &Path, layout: IndexLayout) -> Result<DepotIndex> {
    let file =
        File::open(path).with_context(|| format!("Failed to open index {}", path.display()))?;
    IndexParser::new()
        .with_layout(layout)
        .parse(BufReader::new(file))
        .with_context(|| format!("Failed to parse index {}", path.display()))
}

fn load_manifest(path: &Path, sanitize: bool) -> Result<Manifest> {
    let file =
        File::open(path).with_context(|| format!("Failed to open manifest {}", path.display()))?;
    let parser = if sanitize {
        ManifestParser::new().with_sanitizer(sanitize_file_name)
    } else {
        ManifestParser::new()
    };
    parser
        .parse(BufReader::new(file))
        .with_context(|| format!("Failed to parse manifest {}", path.display()))
}

fn load_keys(path: &Path) -> Result<DepotKeyStore> {
    let file =
        File::open(path).with_context(|| format!("Failed to open key file {}", path.display()))?;
    DepotKeyStore::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load key file {}", path.display()))
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
