//! Write the OpenAPI document as JSON to stdout or a file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::path::PathBuf;

use clap::Parser;
use spinwheel::doc::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "openapi-dump",
    about = "Export the spin wheel OpenAPI document",
    version
)]
struct CliArgs {
    /// Destination file. Prints to stdout when omitted.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit compact JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,
}

fn main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let doc = ApiDoc::openapi();
    let json = if args.compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
    .map_err(io::Error::other)?;

    match args.output {
        Some(path) => std::fs::write(path, json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
