//! hgslim: species filter for HomoloGene XML builds.
//!
//! hgslim streams a HomoloGene build and writes a smaller document that only
//! contains the homology groups relevant to a set of NCBI Taxonomy IDs.
//!
//! # Core Principles
//!
//! - **Streaming**: one record is resident at a time; the input is never
//!   loaded whole
//! - **Closed records**: every kept stat references two kept genes
//! - **All or nothing output**: a failed run never leaves a truncated document
//!
//! # Example
//!
//! ```no_run
//! use std::io::BufReader;
//!
//! use hgslim::{DocumentLayout, RecordFilter, RecordStream, SourceReader, TaxonSet};
//!
//! let taxa = TaxonSet::new(["9606", "10090"]);
//! let input = BufReader::new(SourceReader::open("homologene.xml.gz")?);
//! let mut records = RecordStream::new(input, RecordFilter::new(taxa));
//!
//! let written = hgslim::write_document_to_path(
//!     "homologene.human_mouse.xml",
//!     &DocumentLayout::default(),
//!     records.by_ref(),
//! )?;
//! println!("{} of {} groups kept", written, records.summary().records_seen);
//! # Ok::<(), hgslim::HgError>(())
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod input;
pub mod stream;
pub mod taxa;
pub mod tree;
pub mod writer;

pub use config::{DocumentLayout, FilterConfig, MissingFieldPolicy, Schema};
pub use error::{HgError, Result};
pub use filter::{RecordCounts, RecordFilter};
pub use input::{SourceMetadata, SourceReader};
pub use stream::{FilterSummary, RecordStream, cancellable};
pub use taxa::TaxonSet;
pub use tree::Node;
pub use writer::{write_document, write_document_to_path};
