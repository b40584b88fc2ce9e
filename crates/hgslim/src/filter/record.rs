//! Whole-record simplification and the survival decision.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::Node;

use super::RecordFilter;

/// Item counts for one simplified record.
///
/// Stats are only counted for records that survive the gene threshold;
/// a discarded record is not filtered past its genes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub genes_kept: usize,
    pub genes_dropped: usize,
    pub stats_kept: usize,
    pub stats_dropped: usize,
}

impl RecordFilter {
    /// Simplify one record, returning it if enough genes survive.
    ///
    /// Genes are filtered first, then the record-level auxiliary fields are
    /// removed whatever the outcome, then the gene threshold decides survival.
    /// Only surviving records have their stats filtered.
    pub fn simplify(&self, record: Node) -> Result<Option<Node>> {
        self.simplify_counted(record).map(|(record, _)| record)
    }

    /// [`simplify`](Self::simplify), also reporting what was removed.
    pub fn simplify_counted(&self, mut record: Node) -> Result<(Option<Node>, RecordCounts)> {
        let genes_before = list_len(&record, &self.schema.genes);
        let protein_ids = self.filter_genes(&mut record)?;

        record.remove_named_children(&self.schema.record_auxiliary);

        let mut counts = RecordCounts {
            genes_kept: protein_ids.len(),
            genes_dropped: genes_before.saturating_sub(protein_ids.len()),
            ..Default::default()
        };

        if protein_ids.len() < self.min_genes {
            return Ok((None, counts));
        }

        let stats_before = list_len(&record, &self.schema.stats);
        self.filter_stats(&mut record, &protein_ids)?;
        counts.stats_kept = list_len(&record, &self.schema.stats);
        counts.stats_dropped = stats_before.saturating_sub(counts.stats_kept);

        Ok((Some(record), counts))
    }
}

fn list_len(record: &Node, list: &str) -> usize {
    record.child(list).map_or(0, |l| l.children.len())
}
