//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hgslim: reduce a HomoloGene XML build to a set of species
#[derive(Parser)]
#[command(name = "hgslim")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Options shared by every command that runs the filter.
#[derive(clap::Args)]
pub struct FilterArgs {
    /// HomoloGene XML input (.xml, .xml.gz, or - for stdin)
    #[arg(short, long, value_name = "INPUT")]
    pub input: PathBuf,

    /// NCBI Taxonomy IDs of the species to keep
    #[arg(short, long = "tax-ids", value_name = "ID", num_args = 1..)]
    pub tax_ids: Vec<String>,

    /// Tab-separated file whose first column lists Taxonomy IDs
    #[arg(long, value_name = "TSV")]
    pub tax_id_file: Option<PathBuf>,

    /// JSON filter configuration (schema, layout, thresholds)
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Fail on records with missing fields instead of dropping them
    #[arg(long)]
    pub strict: bool,

    /// Minimum number of matching genes for a group to be kept
    #[arg(long, value_name = "N")]
    pub min_genes: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the homology groups relevant to the given species
    Filter {
        #[command(flatten)]
        args: FilterArgs,

        /// Output XML path
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Also write a JSON run summary with input provenance
        #[arg(long, value_name = "JSON")]
        summary: Option<PathBuf>,
    },

    /// Report what a filter run would keep, without writing XML
    Summarize {
        #[command(flatten)]
        args: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
