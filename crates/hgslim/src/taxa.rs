//! Species identifier sets.
//!
//! A [`TaxonSet`] holds the NCBI Taxonomy IDs whose genes survive filtering.
//! Membership is a hash lookup; iteration follows the order in which the
//! caller supplied the IDs.

use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{HgError, Result};

/// An immutable, insertion-ordered set of species identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonSet {
    ids: IndexSet<String>,
}

impl TaxonSet {
    /// Build a set from identifier strings.
    ///
    /// Surrounding whitespace is trimmed and blank entries are skipped.
    /// Duplicates keep their first position.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = ids
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { ids }
    }

    /// Read identifiers from the first column of a tab-separated file.
    ///
    /// Lines starting with `#` are comments. Extra columns (e.g. a species
    /// name next to the taxid) are ignored.
    pub fn from_tsv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HgError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "taxon list not found"),
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_path(path)?;

        let mut ids = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(first) = record.get(0) {
                ids.push(first.to_string());
            }
        }
        Ok(Self::new(ids))
    }

    /// Combine two sets, keeping `self`'s order first.
    pub fn union(mut self, other: TaxonSet) -> Self {
        self.ids.extend(other.ids);
        self
    }

    /// Whether `id` is in the set.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TaxonSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
