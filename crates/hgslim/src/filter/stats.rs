//! Pairwise statistics filtering by surviving protein identifiers.

use std::collections::HashSet;

use crate::error::Result;
use crate::tree::Node;

use super::RecordFilter;

impl RecordFilter {
    /// Remove stats that reference a protein outside `kept_protein_ids`.
    ///
    /// A stat survives only when both of its references name kept proteins.
    /// The order of `kept_protein_ids` does not matter.
    pub fn filter_stats(&self, record: &mut Node, kept_protein_ids: &[String]) -> Result<()> {
        let schema = &self.schema;

        let Some(stats) = record.child(&schema.stats) else {
            return self.missing(record, &schema.stats);
        };

        let members: HashSet<&str> = kept_protein_ids.iter().map(String::as_str).collect();
        let mut keep = Vec::with_capacity(stats.children.len());
        for stat in &stats.children {
            let refs = (
                stat.child_text(&schema.stat_gi1),
                stat.child_text(&schema.stat_gi2),
            );
            let valid = match refs {
                (Some(gi1), Some(gi2)) => members.contains(gi1) && members.contains(gi2),
                (None, _) => {
                    self.missing(record, &schema.stat_gi1)?;
                    false
                }
                (_, None) => {
                    self.missing(record, &schema.stat_gi2)?;
                    false
                }
            };
            keep.push(valid);
        }

        if let Some(stats) = record.child_mut(&schema.stats) {
            let mut flags = keep.into_iter();
            stats.children.retain(|_| flags.next().unwrap_or(false));
        }

        Ok(())
    }
}
