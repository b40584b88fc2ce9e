//! Summarize command - run the filter and report counts without writing XML.

use colored::Colorize;

use super::{filter_config, open_records, taxon_set};
use crate::cli::FilterArgs;

pub fn run(args: FilterArgs, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let taxa = taxon_set(&args)?;
    let config = filter_config(&args)?;
    let taxa_list: Vec<String> = taxa.iter().map(str::to_string).collect();

    let mut records = open_records(&args, taxa, &config)?;
    for record in records.by_ref() {
        record?;
    }

    let summary = records.summary();
    let source = records.get_ref().get_ref().metadata();

    if json_output {
        let report = serde_json::json!({
            "source": source,
            "taxa": taxa_list,
            "min_genes": config.min_genes,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Summary for".cyan().bold(),
        source.file.white()
    );
    println!("  {} ({} bytes)", source.hash, source.size_bytes);
    println!("  Tax IDs: {}", taxa_list.join(", "));
    println!();

    println!("{}", "Groups:".yellow().bold());
    println!("  Seen:      {}", summary.records_seen.to_string().white());
    println!("  Kept:      {}", summary.records_kept.to_string().green());
    println!("  Discarded: {}", summary.records_discarded.to_string().red());
    println!();

    println!("{}", "Genes:".yellow().bold());
    println!("  Kept:    {}", summary.genes_kept.to_string().green());
    println!("  Dropped: {}", summary.genes_dropped.to_string().red());
    println!();

    println!("{}", "Stats:".yellow().bold());
    println!("  Kept:    {}", summary.stats_kept.to_string().green());
    println!("  Dropped: {}", summary.stats_dropped.to_string().red());

    Ok(())
}
