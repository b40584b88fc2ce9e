//! Filter configuration: tag names, pruning lists, thresholds and output layout.
//!
//! The defaults describe the NCBI HomoloGene XML build. Every field can be
//! overridden from a JSON file, where missing keys fall back to the defaults:
//!
//! ```json
//! {
//!   "min_genes": 3,
//!   "missing_fields": "strict",
//!   "schema": { "gene_auxiliary": ["HG-Gene_domains"] }
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HgError, Result};

/// Document header written before the first record.
pub const HOMOLOGENE_HEADER: &str = "<?xml version=\"1.0\"?>
<!DOCTYPE HG-EntrySet PUBLIC \"-//NCBI//HomoloGene/EN\" \"HomoloGene.dtd\">
<HG-EntrySet>
  <HG-EntrySet_entries>
";

/// Document footer written after the last record.
pub const HOMOLOGENE_FOOTER: &str = "
  </HG-EntrySet_entries>
</HG-EntrySet>
";

/// What to do when a gene or stat lacks a field the filter reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Treat the item as a non-member and remove it.
    #[default]
    Drop,
    /// Abort the run with [`HgError::MissingField`].
    Strict,
}

/// Tag names of the record shape being filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Tag of one record (homology group).
    pub record: String,
    /// Tag of the record's gene list.
    pub genes: String,
    /// Tag of the record's pairwise statistics list.
    pub stats: String,
    /// Species identifier field of a gene.
    pub gene_taxid: String,
    /// Protein identifier field of a gene.
    pub gene_protein: String,
    /// First protein reference of a stat.
    pub stat_gi1: String,
    /// Second protein reference of a stat.
    pub stat_gi2: String,
    /// Fields removed from every kept gene.
    pub gene_auxiliary: Vec<String>,
    /// Fields removed from every record.
    pub record_auxiliary: Vec<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            record: "HG-Entry".to_string(),
            genes: "HG-Entry_genes".to_string(),
            stats: "HG-Entry_distances".to_string(),
            gene_taxid: "HG-Gene_taxid".to_string(),
            gene_protein: "HG-Gene_prot-gi".to_string(),
            stat_gi1: "HG-Stats_gi1".to_string(),
            stat_gi2: "HG-Stats_gi2".to_string(),
            gene_auxiliary: vec![
                "HG-Gene_domains".to_string(),
                "HG-Gene_location".to_string(),
            ],
            record_auxiliary: vec![
                "HG-Entry_cr-date".to_string(),
                "HG-Entry_up-date".to_string(),
                "HG-Entry_commentaries".to_string(),
            ],
        }
    }
}

/// Fixed text surrounding the serialized records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLayout {
    /// Written once before any record.
    pub header: String,
    /// Written once after the last record.
    pub footer: String,
    /// Prefix of every record block.
    pub record_indent: String,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            header: HOMOLOGENE_HEADER.to_string(),
            footer: HOMOLOGENE_FOOTER.to_string(),
            record_indent: "    ".to_string(),
        }
    }
}

/// Configuration for a filter run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Tag names of the input.
    pub schema: Schema,
    /// Output document framing.
    pub layout: DocumentLayout,
    /// Minimum surviving genes for a record to be emitted.
    pub min_genes: usize,
    /// Handling of absent gene/stat fields.
    pub missing_fields: MissingFieldPolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            schema: Schema::default(),
            layout: DocumentLayout::default(),
            min_genes: 2,
            missing_fields: MissingFieldPolicy::default(),
        }
    }
}

impl FilterConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Keys absent from the file keep their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| HgError::io(path, e))?;
        let config: FilterConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the survival threshold.
    pub fn with_min_genes(mut self, min_genes: usize) -> Self {
        self.min_genes = min_genes;
        self
    }

    /// Set the missing-field policy.
    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    /// Check that the configuration can drive a filter run.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("record", &self.schema.record),
            ("genes", &self.schema.genes),
            ("stats", &self.schema.stats),
            ("gene_taxid", &self.schema.gene_taxid),
            ("gene_protein", &self.schema.gene_protein),
            ("stat_gi1", &self.schema.stat_gi1),
            ("stat_gi2", &self.schema.stat_gi2),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(HgError::Config(format!("schema.{} must not be empty", key)));
            }
        }
        if self.min_genes == 0 {
            return Err(HgError::Config("min_genes must be at least 1".to_string()));
        }
        Ok(())
    }
}
