//! Output document assembly.
//!
//! The header and footer are fixed text from [`DocumentLayout`]; each record
//! in between is serialized as one indented, newline-terminated block.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::DocumentLayout;
use crate::error::{HgError, Result};
use crate::tree::Node;

/// Write a complete document to `sink`.
///
/// Returns the number of records written. If a record fails, the error is
/// returned as soon as it is pulled and the footer is not written, so the
/// sink never ends with a document that looks complete.
pub fn write_document<W, I>(sink: &mut W, layout: &DocumentLayout, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<Node>>,
{
    sink.write_all(layout.header.as_bytes())?;

    let mut written = 0;
    for record in records {
        let record = record?;
        sink.write_all(layout.record_indent.as_bytes())?;
        sink.write_all(record.to_xml(&layout.record_indent).as_bytes())?;
        sink.write_all(b"\n")?;
        written += 1;
    }

    sink.write_all(layout.footer.as_bytes())?;
    sink.flush()?;
    Ok(written)
}

/// Write a complete document to `path`, replacing it only on success.
///
/// The document is written to a temporary file next to `path` and renamed
/// into place after the footer is flushed. On any error the temporary file
/// is removed and `path` is left untouched.
pub fn write_document_to_path<I>(
    path: impl AsRef<Path>,
    layout: &DocumentLayout,
    records: I,
) -> Result<usize>
where
    I: IntoIterator<Item = Result<Node>>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(|e| HgError::io(dir, e))?;
    let mut writer = BufWriter::new(temp);
    let written = write_document(&mut writer, layout, records)?;

    let temp = writer
        .into_inner()
        .map_err(|e| HgError::io(path, e.into_error()))?;
    temp.as_file().sync_all().map_err(|e| HgError::io(path, e))?;
    temp.persist(path).map_err(|e| HgError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), records = written, "output persisted");
    Ok(written)
}
