//! Gene filtering by species identifier.

use crate::error::Result;
use crate::tree::Node;

use super::RecordFilter;

impl RecordFilter {
    /// Remove genes whose species is not in the taxon set.
    ///
    /// Kept genes lose their auxiliary fields (domains, location). Returns the
    /// protein identifiers of the kept genes in document order, one per kept
    /// gene. A record without a gene list has no genes.
    pub fn filter_genes(&self, record: &mut Node) -> Result<Vec<String>> {
        let schema = &self.schema;

        let Some(genes) = record.child(&schema.genes) else {
            self.missing(record, &schema.genes)?;
            return Ok(Vec::new());
        };

        let mut keep = Vec::with_capacity(genes.children.len());
        let mut protein_ids = Vec::new();
        for gene in &genes.children {
            let Some(taxid) = gene.child_text(&schema.gene_taxid) else {
                self.missing(record, &schema.gene_taxid)?;
                keep.push(false);
                continue;
            };
            if !self.taxa.contains(taxid) {
                keep.push(false);
                continue;
            }
            match gene.child_text(&schema.gene_protein) {
                Some(gi) => {
                    protein_ids.push(gi.to_string());
                    keep.push(true);
                }
                None => {
                    self.missing(record, &schema.gene_protein)?;
                    keep.push(false);
                }
            }
        }

        if let Some(genes) = record.child_mut(&schema.genes) {
            let mut flags = keep.into_iter();
            genes.children.retain(|_| flags.next().unwrap_or(false));
            for gene in &mut genes.children {
                gene.remove_named_children(&schema.gene_auxiliary);
            }
        }

        Ok(protein_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::config::{FilterConfig, MissingFieldPolicy};
    use crate::error::HgError;
    use crate::taxa::TaxonSet;

    fn taxids(record: &Node) -> Vec<&str> {
        record
            .child("HG-Entry_genes")
            .map(|g| {
                g.children
                    .iter()
                    .filter_map(|gene| gene.child_text("HG-Gene_taxid"))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_keeps_matching_genes_in_order() {
        let filter = RecordFilter::new(TaxonSet::new(["10090", "9606"]));
        let mut record = three_species("1");

        let ids = filter.filter_genes(&mut record).unwrap();

        assert_eq!(ids, vec!["11", "22"]);
        assert_eq!(taxids(&record), vec!["9606", "10090"]);
    }

    #[test]
    fn test_strips_auxiliary_fields_from_kept_genes() {
        let filter = RecordFilter::new(TaxonSet::new(["9606"]));
        let mut record = three_species("1");
        filter.filter_genes(&mut record).unwrap();

        let genes = record.child("HG-Entry_genes").unwrap();
        assert_eq!(genes.children.len(), 1);
        let gene = &genes.children[0];
        assert!(gene.child("HG-Gene_domains").is_none());
        assert!(gene.child("HG-Gene_location").is_none());
        assert_eq!(gene.child_text("HG-Gene_geneid"), Some("g11"));
    }

    #[test]
    fn test_no_matches_returns_empty() {
        let filter = RecordFilter::new(TaxonSet::new(["7955"]));
        let mut record = three_species("1");

        assert!(filter.filter_genes(&mut record).unwrap().is_empty());
        assert!(taxids(&record).is_empty());
    }

    #[test]
    fn test_missing_gene_list_is_empty_under_drop() {
        let filter = RecordFilter::new(TaxonSet::new(["9606"]));
        let mut record = Node::new("HG-Entry").with_child(Node::new("HG-Entry_hg-id").with_text("5"));

        assert!(filter.filter_genes(&mut record).unwrap().is_empty());
    }

    #[test]
    fn test_gene_without_taxid_is_dropped() {
        let filter = RecordFilter::new(TaxonSet::new(["9606"]));
        let mut bare = gene("9606", "44");
        bare.remove_named_children(&["HG-Gene_taxid"]);
        let mut record = record("1", vec![gene("9606", "11"), bare], vec![]);

        assert_eq!(filter.filter_genes(&mut record).unwrap(), vec!["11"]);
        assert_eq!(record.child("HG-Entry_genes").unwrap().children.len(), 1);
    }

    #[test]
    fn test_matching_gene_without_protein_is_dropped() {
        let filter = RecordFilter::new(TaxonSet::new(["9606"]));
        let mut bare = gene("9606", "44");
        bare.remove_named_children(&["HG-Gene_prot-gi"]);
        let mut record = record("1", vec![bare, gene("9606", "11")], vec![]);

        assert_eq!(filter.filter_genes(&mut record).unwrap(), vec!["11"]);
        assert_eq!(taxids(&record), vec!["9606"]);
    }

    #[test]
    fn test_strict_policy_fails_on_missing_taxid() {
        let config = FilterConfig::default().with_missing_fields(MissingFieldPolicy::Strict);
        let filter = RecordFilter::with_config(TaxonSet::new(["9606"]), &config);
        let mut bare = gene("9606", "44");
        bare.remove_named_children(&["HG-Gene_taxid"]);
        let mut record = record("3", vec![bare], vec![]);

        let err = filter.filter_genes(&mut record).unwrap_err();
        assert!(matches!(err, HgError::MissingField { ref field, .. } if field == "HG-Gene_taxid"));
    }

    #[test]
    fn test_strict_policy_ignores_missing_protein_of_rejected_gene() {
        let config = FilterConfig::default().with_missing_fields(MissingFieldPolicy::Strict);
        let filter = RecordFilter::with_config(TaxonSet::new(["9606"]), &config);
        let mut fly = gene("7227", "33");
        fly.remove_named_children(&["HG-Gene_prot-gi"]);
        let mut record = record("3", vec![gene("9606", "11"), fly], vec![]);

        assert_eq!(filter.filter_genes(&mut record).unwrap(), vec!["11"]);
    }

    #[test]
    fn test_strict_policy_fails_on_missing_gene_list() {
        let config = FilterConfig::default().with_missing_fields(MissingFieldPolicy::Strict);
        let filter = RecordFilter::with_config(TaxonSet::new(["9606"]), &config);
        let mut record = record("8", vec![], vec![]);
        record.remove_named_children(&["HG-Entry_genes"]);

        let err = filter.filter_genes(&mut record).unwrap_err();
        match err {
            HgError::MissingField { record, field } => {
                assert_eq!(record, "HG-Entry 8");
                assert_eq!(field, "HG-Entry_genes");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
