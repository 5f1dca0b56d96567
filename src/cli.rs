use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Read Flow Cytometry Standard files")]
#[command(propagate_version = true)]
pub struct Cli {
    // Verbosity, repeat for more
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the events of one dataset to a .parquet or .csv file
    Convert {
        #[arg(help = "Input FCS file")]
        input_file: PathBuf,

        // Output file, format chosen by extension
        #[arg(short = 'o', long = "output", required = true)]
        out_file: PathBuf,

        // Zero-based dataset index
        #[arg(short = 's', long = "sample", default_value_t = 0)]
        sample: usize,

        // Name columns by $PnS instead of $PnN
        #[arg(long = "long-names", default_value_t = false)]
        long_names: bool,

        // Convert channel values to linear scale
        #[arg(long = "scale", default_value_t = false)]
        scale: bool,

        // Apply the spillover matrix
        #[arg(long = "compensate", default_value_t = false)]
        compensate: bool,

        // Cast all columns to Int64
        #[arg(long = "integers", default_value_t = false)]
        integers: bool,

        // Fail on inconsistent offsets instead of warning
        #[arg(long = "strict", default_value_t = false)]
        strict: bool,
    },

    /// Print dataset metadata as JSON
    Info {
        #[arg(help = "Input FCS file")]
        input_file: PathBuf,

        // Only this dataset; all datasets when absent
        #[arg(short = 's', long = "sample")]
        sample: Option<usize>,

        // Plain text overview instead of JSON
        #[arg(long = "summary", default_value_t = false)]
        summary: bool,
    },
}
