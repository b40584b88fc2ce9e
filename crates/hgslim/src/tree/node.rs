//! Owned, mutable XML element tree.

/// An XML element with exclusively owned children.
///
/// Only the pieces a HomoloGene record carries are kept: the tag name,
/// attributes in document order, leaf text, and child elements in document
/// order. Comments, processing instructions and inter-element whitespace are
/// not represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Tag name, including any namespace prefix as written.
    pub name: String,
    /// Attributes as (name, unescaped value) pairs.
    pub attributes: Vec<(String, String)>,
    /// Unescaped text content, if any.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element in place.
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Append text, joining with any text already present.
    ///
    /// The parser may report one logical text run as several events
    /// (e.g. text split by a CDATA section).
    pub fn append_text(&mut self, text: &str) {
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// First direct child with the given tag.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First direct child with the given tag, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given tag.
    ///
    /// Returns `None` when the child is absent or has no text.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    /// Remove every direct child whose tag is one of `names`.
    ///
    /// Names with no matching child are ignored, so calling this twice is
    /// the same as calling it once.
    pub fn remove_named_children<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            let name = name.as_ref();
            self.children.retain(|c| c.name != name);
        }
    }
}
