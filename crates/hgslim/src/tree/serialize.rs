//! XML serialization of pruned record trees.

use quick_xml::escape::escape;

use super::node::Node;

/// Indentation added per nesting level.
pub const INDENT_STEP: &str = "  ";

impl Node {
    /// Serialize this subtree as indented XML.
    ///
    /// The first line is not indented; every following line is prefixed with
    /// `base_indent` plus [`INDENT_STEP`] per nesting level, so the caller
    /// positions the whole block by writing `base_indent` before it. No
    /// trailing newline is produced.
    pub fn to_xml(&self, base_indent: &str) -> String {
        let mut out = String::new();
        self.write_element(&mut out, base_indent, 0);
        out
    }

    fn write_element(&self, out: &mut String, base_indent: &str, depth: usize) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        if let Some(text) = text {
            out.push_str(&escape(text));
        }

        if !self.children.is_empty() {
            for child in &self.children {
                out.push('\n');
                push_indent(out, base_indent, depth + 1);
                child.write_element(out, base_indent, depth + 1);
            }
            out.push('\n');
            push_indent(out, base_indent, depth);
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn push_indent(out: &mut String, base_indent: &str, depth: usize) {
    out.push_str(base_indent);
    for _ in 0..depth {
        out.push_str(INDENT_STEP);
    }
}
