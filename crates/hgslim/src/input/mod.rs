//! Input sources and provenance.

mod source;

pub use source::{HashingReader, SourceMetadata, SourceReader};
