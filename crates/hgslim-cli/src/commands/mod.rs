//! CLI command implementations.

pub mod filter;
pub mod summarize;

use std::io::BufReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use hgslim::{FilterConfig, MissingFieldPolicy, RecordFilter, RecordStream, SourceReader, TaxonSet};

use crate::cli::FilterArgs;

/// The stream type every command consumes.
pub type Records = RecordStream<BufReader<SourceReader>>;

/// Resolve the taxon set from flags and the optional TSV file.
pub fn taxon_set(args: &FilterArgs) -> hgslim::Result<TaxonSet> {
    let mut taxa = TaxonSet::new(&args.tax_ids);
    if let Some(path) = &args.tax_id_file {
        taxa = taxa.union(TaxonSet::from_tsv(path)?);
    }

    if taxa.is_empty() {
        eprintln!(
            "{}",
            "Warning: no Taxonomy IDs given, the output will contain no groups".yellow()
        );
    }
    Ok(taxa)
}

/// Load the config file, then let flags override it.
pub fn filter_config(args: &FilterArgs) -> hgslim::Result<FilterConfig> {
    let mut config = match &args.config {
        Some(path) => FilterConfig::load(path)?,
        None => FilterConfig::default(),
    };

    if let Some(min_genes) = args.min_genes {
        config = config.with_min_genes(min_genes);
    }
    if args.strict {
        config = config.with_missing_fields(MissingFieldPolicy::Strict);
    }
    config.validate()?;
    tracing::debug!(min_genes = config.min_genes, policy = ?config.missing_fields, "filter configuration");
    Ok(config)
}

/// Open the input and wrap it in a record stream.
pub fn open_records(args: &FilterArgs, taxa: TaxonSet, config: &FilterConfig) -> hgslim::Result<Records> {
    let source = SourceReader::open(&args.input)?;
    let filter = RecordFilter::with_config(taxa, config);
    Ok(RecordStream::new(BufReader::new(source), filter))
}

/// Flag set by Ctrl-C.
pub fn interrupt_flag() -> Result<Arc<AtomicBool>, Box<dyn std::error::Error>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })?;
    Ok(flag)
}
