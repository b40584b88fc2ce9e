//! Per-record filtering: genes by species, stats by surviving proteins.
//!
//! A [`RecordFilter`] owns everything needed to simplify one record: the tag
//! names, the taxon set, the survival threshold and the missing-field policy.
//! Each stage classifies the items of a list first and removes the rejected
//! ones afterwards, so no list is mutated while it is being read.

mod genes;
mod record;
mod stats;

use crate::config::{FilterConfig, MissingFieldPolicy, Schema};
use crate::error::{HgError, Result};
use crate::taxa::TaxonSet;
use crate::tree::Node;

pub use record::RecordCounts;

/// Simplifies records against a set of species identifiers.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    schema: Schema,
    taxa: TaxonSet,
    min_genes: usize,
    policy: MissingFieldPolicy,
}

impl RecordFilter {
    /// Create a filter for HomoloGene records with default settings.
    pub fn new(taxa: TaxonSet) -> Self {
        Self::with_config(taxa, &FilterConfig::default())
    }

    /// Create a filter with custom configuration.
    pub fn with_config(taxa: TaxonSet, config: &FilterConfig) -> Self {
        Self {
            schema: config.schema.clone(),
            taxa,
            min_genes: config.min_genes,
            policy: config.missing_fields,
        }
    }

    /// The species identifiers genes are matched against.
    pub fn taxa(&self) -> &TaxonSet {
        &self.taxa
    }

    /// The tag names this filter reads.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Apply the missing-field policy to an absent `field` of `record`.
    fn missing(&self, record: &Node, field: &str) -> Result<()> {
        match self.policy {
            MissingFieldPolicy::Drop => {
                tracing::trace!(record = %record_label(record), field, "missing field, dropping item");
                Ok(())
            }
            MissingFieldPolicy::Strict => Err(HgError::MissingField {
                record: record_label(record),
                field: field.to_string(),
            }),
        }
    }
}

/// Short description of a record for diagnostics.
///
/// HomoloGene records lead with their group id (`HG-Entry_hg-id`), so the
/// first child carrying text identifies the record.
pub(crate) fn record_label(record: &Node) -> String {
    record
        .children
        .iter()
        .find_map(|c| c.text.as_deref())
        .map(|t| format!("{} {}", record.name, t))
        .unwrap_or_else(|| record.name.clone())
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Record builders shared by the filter tests.

    use crate::tree::Node;

    pub fn gene(taxid: &str, gi: &str) -> Node {
        Node::new("HG-Gene")
            .with_child(Node::new("HG-Gene_geneid").with_text(format!("g{}", gi)))
            .with_child(Node::new("HG-Gene_taxid").with_text(taxid))
            .with_child(Node::new("HG-Gene_prot-gi").with_text(gi))
            .with_child(Node::new("HG-Gene_domains").with_child(Node::new("HG-Domain")))
            .with_child(Node::new("HG-Gene_location").with_child(Node::new("HG-Location")))
    }

    pub fn stat(gi1: &str, gi2: &str) -> Node {
        Node::new("HG-Stats")
            .with_child(Node::new("HG-Stats_gi1").with_text(gi1))
            .with_child(Node::new("HG-Stats_gi2").with_text(gi2))
            .with_child(Node::new("HG-Stats_nuc-change").with_text("0.1"))
    }

    pub fn record(id: &str, genes: Vec<Node>, stats: Vec<Node>) -> Node {
        let mut gene_list = Node::new("HG-Entry_genes");
        gene_list.children = genes;
        let mut stat_list = Node::new("HG-Entry_distances");
        stat_list.children = stats;

        Node::new("HG-Entry")
            .with_child(Node::new("HG-Entry_hg-id").with_text(id))
            .with_child(Node::new("HG-Entry_cr-date").with_child(Node::new("Date")))
            .with_child(Node::new("HG-Entry_up-date").with_child(Node::new("Date")))
            .with_child(gene_list)
            .with_child(stat_list)
            .with_child(Node::new("HG-Entry_commentaries"))
    }

    /// Scenario record: human, mouse and fly genes with all pairwise stats.
    pub fn three_species(id: &str) -> Node {
        record(
            id,
            vec![gene("9606", "11"), gene("10090", "22"), gene("7227", "33")],
            vec![stat("11", "22"), stat("11", "33"), stat("22", "33")],
        )
    }
}
