//! Streaming record extraction.
//!
//! [`RecordStream`] pulls events from an incremental XML reader and only
//! builds a tree while it is inside a record. Everything around the records
//! (the root element, the entry-list wrapper) is tracked as a nesting depth
//! and never stored. When a record closes it is simplified and either handed
//! to the consumer or dropped, so at most one record is resident at a time.
//!
//! ```text
//! <HG-EntrySet>                 depth only
//!   <HG-EntrySet_entries>       depth only
//!     <HG-Entry>                ─┐
//!       <HG-Entry_genes> …      ─┤ built as a Node, simplified on close
//!     </HG-Entry>               ─┘
//! ```

use std::fmt::Display;
use std::io::BufRead;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::error::{HgError, Result};
use crate::filter::{RecordCounts, RecordFilter, record_label};
use crate::tree::Node;

/// Running totals for one pass over the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    /// Records completed by the parser.
    pub records_seen: usize,
    /// Records that survived simplification.
    pub records_kept: usize,
    /// Records below the gene threshold.
    pub records_discarded: usize,
    /// Genes left in kept and discarded records.
    pub genes_kept: usize,
    /// Genes removed by species.
    pub genes_dropped: usize,
    /// Stats left in kept records.
    pub stats_kept: usize,
    /// Stats removed from kept records.
    pub stats_dropped: usize,
}

impl FilterSummary {
    fn record(&mut self, counts: RecordCounts, kept: bool) {
        self.records_seen += 1;
        if kept {
            self.records_kept += 1;
        } else {
            self.records_discarded += 1;
        }
        self.genes_kept += counts.genes_kept;
        self.genes_dropped += counts.genes_dropped;
        self.stats_kept += counts.stats_kept;
        self.stats_dropped += counts.stats_dropped;
    }
}

/// One parser event reduced to what the driver acts on.
enum Step {
    /// An element opened; carries the node when it is inside a record.
    Open(Option<Node>),
    /// A self-closing element; carries the node when it is inside a record.
    Leaf(Option<Node>),
    Close,
    Text(String),
    Skip,
    Eof,
}

/// Lazy, single-pass sequence of simplified records.
///
/// Yields records in document order. After the first error the stream is
/// exhausted. Dropping the stream stops reading the input.
pub struct RecordStream<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    filter: RecordFilter,
    /// Open elements of the record being built, outermost first.
    open: Vec<Node>,
    depth: usize,
    /// A top-level element has been opened.
    root_opened: bool,
    /// The top-level element has been closed; only whitespace and
    /// comments may follow.
    root_closed: bool,
    summary: FilterSummary,
    finished: bool,
}

impl<R: BufRead> RecordStream<R> {
    /// Stream records from `input`, simplifying each with `filter`.
    pub fn new(input: R, filter: RecordFilter) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);

        Self {
            reader,
            buf: Vec::new(),
            filter,
            open: Vec::new(),
            depth: 0,
            root_opened: false,
            root_closed: false,
            summary: FilterSummary::default(),
            finished: false,
        }
    }

    /// Totals for the records processed so far.
    pub fn summary(&self) -> FilterSummary {
        self.summary
    }

    /// The underlying input.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// The filter applied to each record.
    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    /// Advance to the next record that survives simplification.
    ///
    /// Returns `Ok(None)` at the end of a complete document, or for a
    /// zero-byte input. Anything else without exactly one root element is
    /// an error.
    pub fn next_record(&mut self) -> Result<Option<Node>> {
        loop {
            match self.read_step()? {
                Step::Open(node) => {
                    self.enter_element()?;
                    self.depth += 1;
                    if let Some(node) = node {
                        self.open.push(node);
                    }
                }
                Step::Leaf(node) => {
                    self.enter_element()?;
                    if self.depth == 0 {
                        self.root_closed = true;
                    }
                    if let Some(node) = node {
                        if let Some(record) = self.attach(node)? {
                            return Ok(Some(record));
                        }
                    }
                }
                Step::Skip => {}
                Step::Close => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        self.root_closed = true;
                    }
                    if let Some(node) = self.open.pop() {
                        if let Some(record) = self.attach(node)? {
                            return Ok(Some(record));
                        }
                    }
                }
                Step::Text(text) => {
                    if let Some(current) = self.open.last_mut() {
                        current.append_text(&text);
                    }
                }
                Step::Eof => {
                    if self.depth > 0 {
                        return Err(HgError::TruncatedInput { depth: self.depth });
                    }
                    let position = self.reader.buffer_position() as u64;
                    if !self.root_opened && position > 0 {
                        return Err(xml_error(position, "no root element"));
                    }
                    return Ok(None);
                }
            }
        }
    }

    /// Reject a second top-level element.
    fn enter_element(&mut self) -> Result<()> {
        if self.depth == 0 {
            if self.root_closed {
                let position = self.reader.buffer_position() as u64;
                return Err(xml_error(position, "content after the root element"));
            }
            self.root_opened = true;
        }
        Ok(())
    }

    fn read_step(&mut self) -> Result<Step> {
        self.buf.clear();
        let capturing = !self.open.is_empty();
        let top_level = self.depth == 0;
        let record_tag = self.filter.schema().record.as_bytes();

        let event = match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => event,
            Err(e) => return Err(xml_error(self.reader.buffer_position() as u64, e)),
        };
        let position = self.reader.buffer_position() as u64;

        let step = match event {
            Event::Start(e) => {
                if capturing || e.name().as_ref() == record_tag {
                    Step::Open(Some(element(&e, position)?))
                } else {
                    Step::Open(None)
                }
            }
            Event::Empty(e) => {
                if capturing || e.name().as_ref() == record_tag {
                    Step::Leaf(Some(element(&e, position)?))
                } else {
                    Step::Leaf(None)
                }
            }
            Event::End(_) => Step::Close,
            Event::Text(e) if capturing => {
                let text = e.unescape().map_err(|err| xml_error(position, err))?;
                Step::Text(text.into_owned())
            }
            Event::CData(e) if capturing => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|err| xml_error(position, err))?;
                Step::Text(text)
            }
            Event::Text(e) if top_level && e.iter().any(|b| !b.is_ascii_whitespace()) => {
                return Err(xml_error(position, "text outside the root element"));
            }
            Event::CData(_) if top_level => {
                return Err(xml_error(position, "CDATA outside the root element"));
            }
            Event::Eof => Step::Eof,
            _ => Step::Skip,
        };
        Ok(step)
    }

    /// Attach a finished element to its parent, or complete the record.
    fn attach(&mut self, node: Node) -> Result<Option<Node>> {
        match self.open.last_mut() {
            Some(parent) => {
                parent.push_child(node);
                Ok(None)
            }
            None => self.complete_record(node),
        }
    }

    fn complete_record(&mut self, record: Node) -> Result<Option<Node>> {
        let label = record_label(&record);
        let (kept, counts) = self.filter.simplify_counted(record)?;
        self.summary.record(counts, kept.is_some());

        if kept.is_some() {
            tracing::debug!(
                record = %label,
                genes = counts.genes_kept,
                stats = counts.stats_kept,
                "record kept"
            );
        } else {
            tracing::trace!(record = %label, genes = counts.genes_kept, "record discarded");
        }
        Ok(kept)
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                tracing::info!(
                    seen = self.summary.records_seen,
                    kept = self.summary.records_kept,
                    "input exhausted"
                );
                None
            }
            Err(e) => {
                self.finished = true;
                self.open.clear();
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for RecordStream<R> {}

/// Stop pulling records once `cancel` is set.
///
/// The flag is checked before each record is requested, so no input is read
/// after cancellation. A cancelled sequence ends with one
/// [`HgError::Interrupted`] item, which makes a consumer such as
/// [`write_document`](crate::writer::write_document) abandon the output.
pub fn cancellable<'a, I>(records: I, cancel: &'a AtomicBool) -> impl Iterator<Item = Result<Node>> + 'a
where
    I: Iterator<Item = Result<Node>> + 'a,
{
    let mut records = records;
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        if cancel.load(Ordering::SeqCst) {
            done = true;
            tracing::warn!("cancelled, no further records will be read");
            return Some(Err(HgError::Interrupted));
        }
        records.next()
    })
}

/// Build an element (name and attributes) from a start tag.
fn element(start: &BytesStart<'_>, position: u64) -> Result<Node> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| xml_error(position, e))?
        .to_string();
    let mut node = Node::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(position, e))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| xml_error(position, e))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(position, e))?
            .into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn xml_error(position: u64, err: impl Display) -> HgError {
    HgError::Xml {
        position,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HashingReader;
    use crate::taxa::TaxonSet;
    use std::io::BufReader;

    const DOC: &str = r#"<?xml version="1.0"?>
<!DOCTYPE HG-EntrySet PUBLIC "-//NCBI//HomoloGene/EN" "HomoloGene.dtd">
<HG-EntrySet>
  <HG-EntrySet_entries>
    <HG-Entry>
      <HG-Entry_hg-id>3</HG-Entry_hg-id>
      <HG-Entry_caption>ABCB1 &amp; friends</HG-Entry_caption>
      <HG-Entry_genes>
        <HG-Gene>
          <HG-Gene_taxid>9606</HG-Gene_taxid>
          <HG-Gene_prot-gi>11</HG-Gene_prot-gi>
          <HG-Gene_location><Maps><Maps_display-str>7q21.12</Maps_display-str></Maps></HG-Gene_location>
        </HG-Gene>
        <HG-Gene>
          <HG-Gene_taxid>10090</HG-Gene_taxid>
          <HG-Gene_prot-gi>22</HG-Gene_prot-gi>
        </HG-Gene>
      </HG-Entry_genes>
      <HG-Entry_distances>
        <HG-Stats>
          <HG-Stats_gi1>11</HG-Stats_gi1>
          <HG-Stats_gi2>22</HG-Stats_gi2>
        </HG-Stats>
      </HG-Entry_distances>
    </HG-Entry>
    <HG-Entry>
      <HG-Entry_hg-id>5</HG-Entry_hg-id>
      <HG-Entry_genes>
        <HG-Gene>
          <HG-Gene_taxid>9606</HG-Gene_taxid>
          <HG-Gene_prot-gi>55</HG-Gene_prot-gi>
        </HG-Gene>
      </HG-Entry_genes>
      <HG-Entry_distances/>
    </HG-Entry>
  </HG-EntrySet_entries>
</HG-EntrySet>
"#;

    fn stream<'a>(doc: &'a str, taxa: &[&str]) -> RecordStream<&'a [u8]> {
        RecordStream::new(doc.as_bytes(), RecordFilter::new(TaxonSet::new(taxa)))
    }

    #[test]
    fn test_yields_surviving_records() {
        let mut records = stream(DOC, &["9606", "10090"]);

        let first = records.next().unwrap().unwrap();
        assert_eq!(first.child_text("HG-Entry_hg-id"), Some("3"));
        assert_eq!(first.child_text("HG-Entry_caption"), Some("ABCB1 & friends"));
        let genes = first.child("HG-Entry_genes").unwrap();
        assert_eq!(genes.children.len(), 2);
        assert!(genes.children[0].child("HG-Gene_location").is_none());

        assert!(records.next().is_none());
        assert!(records.next().is_none());

        let summary = records.summary();
        assert_eq!(summary.records_seen, 2);
        assert_eq!(summary.records_kept, 1);
        assert_eq!(summary.records_discarded, 1);
        assert_eq!(summary.stats_kept, 1);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mut records = stream("", &["9606"]);
        assert!(records.next().is_none());
        assert_eq!(records.summary(), FilterSummary::default());
    }

    #[test]
    fn test_empty_record_element() {
        let doc = "<HG-EntrySet><HG-Entry/></HG-EntrySet>";
        let mut records = stream(doc, &["9606"]);
        assert!(records.next().is_none());
        assert_eq!(records.summary().records_discarded, 1);
    }

    #[test]
    fn test_attributes_and_cdata_are_kept() {
        let doc = r#"<HG-EntrySet><HG-Entry source="ncbi &amp; co">
            <HG-Entry_caption><![CDATA[a<b]]></HG-Entry_caption>
            <HG-Entry_genes>
              <HG-Gene><HG-Gene_taxid>1</HG-Gene_taxid><HG-Gene_prot-gi>1</HG-Gene_prot-gi></HG-Gene>
              <HG-Gene><HG-Gene_taxid>1</HG-Gene_taxid><HG-Gene_prot-gi>2</HG-Gene_prot-gi></HG-Gene>
            </HG-Entry_genes>
        </HG-Entry></HG-EntrySet>"#;

        let record = stream(doc, &["1"]).next().unwrap().unwrap();
        assert_eq!(
            record.attributes,
            vec![("source".to_string(), "ncbi & co".to_string())]
        );
        assert_eq!(record.child_text("HG-Entry_caption"), Some("a<b"));
    }

    #[test]
    fn test_mismatched_tags_are_an_error() {
        let doc = "<HG-EntrySet><HG-Entry><HG-Entry_genes></HG-Entry></HG-EntrySet>";
        let mut records = stream(doc, &["9606"]);

        assert!(matches!(records.next(), Some(Err(HgError::Xml { .. }))));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let doc = "<HG-EntrySet><HG-EntrySet_entries><HG-Entry><HG-Entry_hg-id>1</HG-Entry_hg-id>";
        let mut records = stream(doc, &["9606"]);

        let err = records.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            HgError::TruncatedInput { .. } | HgError::Xml { .. }
        ));
    }

    #[test]
    fn test_cancellable_stops_before_next_record() {
        let cancel = AtomicBool::new(false);
        let mut records = stream(DOC, &["9606", "10090"]);
        let mut guarded = cancellable(records.by_ref(), &cancel);

        assert!(guarded.next().unwrap().is_ok());
        cancel.store(true, Ordering::SeqCst);
        assert!(matches!(guarded.next(), Some(Err(HgError::Interrupted))));
        assert!(guarded.next().is_none());
        drop(guarded);

        // The second record was never parsed.
        assert_eq!(records.summary().records_seen, 1);
    }

    #[test]
    fn test_stops_at_first_record_without_reading_rest() {
        let doc = DOC.replace("</HG-EntrySet>", "<oops");
        let input = BufReader::with_capacity(16, HashingReader::new(doc.as_bytes()));
        let mut records = RecordStream::new(input, RecordFilter::new(TaxonSet::new(["9606", "10090"])));

        assert!(records.next().unwrap().is_ok());

        // The second record and the broken tail were never pulled in.
        assert_eq!(records.summary().records_seen, 1);
        let consumed = records.get_ref().get_ref().bytes_read();
        assert!(consumed < DOC.find("<HG-Gene_prot-gi>55").unwrap() as u64);
    }

    fn expect_xml_error(doc: &str) {
        let mut records = stream(doc, &["9606"]);
        let result = records.next();
        assert!(
            matches!(result, Some(Err(HgError::Xml { .. }))),
            "expected an XML error for {:?}, got {:?}",
            doc,
            result
        );
        assert!(records.next().is_none());
    }

    #[test]
    fn test_plain_text_is_an_error() {
        expect_xml_error("this is not xml at all\n");
    }

    #[test]
    fn test_binary_input_is_an_error() {
        let gzip_header = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];
        let mut records = RecordStream::new(&gzip_header[..], RecordFilter::new(TaxonSet::new(["9606"])));
        assert!(matches!(records.next(), Some(Err(HgError::Xml { .. }))));
    }

    #[test]
    fn test_declaration_without_root_is_an_error() {
        expect_xml_error("<?xml version=\"1.0\"?>\n<!-- nothing here -->\n");
    }

    #[test]
    fn test_whitespace_only_is_an_error() {
        expect_xml_error("  \n\n");
    }

    #[test]
    fn test_second_top_level_element_is_an_error() {
        expect_xml_error("<a/><b/>");
        expect_xml_error("<HG-EntrySet></HG-EntrySet><HG-EntrySet></HG-EntrySet>");
    }

    #[test]
    fn test_text_after_root_is_an_error() {
        expect_xml_error("<HG-EntrySet/>trailing");
    }

    #[test]
    fn test_whitespace_and_comments_after_root_are_fine() {
        let mut records = stream("<HG-EntrySet/>\n<!-- end -->\n", &["9606"]);
        assert!(records.next().is_none());
    }
}
