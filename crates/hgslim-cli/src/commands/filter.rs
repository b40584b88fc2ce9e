//! Filter command - write the groups relevant to a set of species.

use std::path::PathBuf;

use colored::Colorize;
use hgslim::{cancellable, write_document_to_path};

use super::{filter_config, interrupt_flag, open_records, taxon_set};
use crate::cli::FilterArgs;

pub fn run(
    args: FilterArgs,
    output: PathBuf,
    summary_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let taxa = taxon_set(&args)?;
    let config = filter_config(&args)?;

    println!(
        "{} {}",
        "* Parsing".cyan().bold(),
        args.input.display().to_string().white()
    );
    println!(
        "{}",
        "* Extracting relevant XML elements for the following Tax IDs:"
            .cyan()
            .bold()
    );
    for id in taxa.iter() {
        println!("\t- {}", id);
    }
    println!(
        "{} {}",
        "* Writing extracted XML to:".cyan().bold(),
        output.display().to_string().white()
    );

    let taxa_list: Vec<String> = taxa.iter().map(str::to_string).collect();
    let mut records = open_records(&args, taxa, &config)?;
    let interrupted = interrupt_flag()?;

    let written = write_document_to_path(
        &output,
        &config.layout,
        cancellable(records.by_ref(), &interrupted),
    )?;

    let summary = records.summary();
    println!(
        "Kept {} of {} homology groups ({} genes, {} stats)",
        written.to_string().white().bold(),
        summary.records_seen,
        summary.genes_kept.to_string().green(),
        summary.stats_kept.to_string().green()
    );

    if let Some(path) = summary_path {
        let report = serde_json::json!({
            "source": records.get_ref().get_ref().metadata(),
            "output": output,
            "taxa": taxa_list,
            "min_genes": config.min_genes,
            "missing_fields": config.missing_fields,
            "summary": summary,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        println!(
            "{} {}",
            "Summary saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}
