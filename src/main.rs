use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use fcsdf::{ChannelNaming, FcsFile, ReaderOptions};
use log::{LevelFilter, info};
use polars::prelude::DataFrame;
use polars_io::SerWriter;
use polars_io::prelude::{CsvWriter, ParquetWriter};

mod cli;

/// Initializes the logger; `RUST_LOG` overrides the level from `-v`.
fn init_log(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;

    match extension.as_deref() {
        Some("parquet" | "pq") => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        Some("csv") => {
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
        _ => bail!(
            "cannot infer output format of {}; use .parquet, .pq or .csv",
            path.display()
        ),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_log(cli.verbose);

    match cli.command {
        cli::Commands::Convert {
            input_file,
            out_file,
            sample,
            long_names,
            scale,
            compensate,
            integers,
            strict,
        } => {
            let options = ReaderOptions::builder()
                .naming(if long_names {
                    ChannelNaming::Long
                } else {
                    ChannelNaming::Short
                })
                .scale(scale)
                .compensate(compensate)
                .cast_to_int(integers)
                .strict(strict)
                .build();

            let file = FcsFile::open_with(&input_file, options.strict)
                .with_context(|| format!("reading {}", input_file.display()))?;
            let mut df = file
                .to_dataframe(sample, &options)
                .with_context(|| format!("dataset {} of {}", sample, input_file.display()))?;
            info!(
                "writing {} events x {} parameters to {}",
                df.height(),
                df.width(),
                out_file.display()
            );
            write_frame(&mut df, &out_file)?;
        }

        cli::Commands::Info {
            input_file,
            sample,
            summary,
        } => {
            let file = FcsFile::open(&input_file)
                .with_context(|| format!("reading {}", input_file.display()))?;

            if summary {
                print!("{}", file.summary());
                return Ok(());
            }

            let json = match sample {
                Some(index) => serde_json::to_string_pretty(&file.dataset(index)?.metadata())?,
                None => {
                    let all: Vec<_> = file.datasets().iter().map(|d| d.metadata()).collect();
                    serde_json::to_string_pretty(&all)?
                }
            };
            println!("{}", json);
        }
    }
    Ok(())
}
