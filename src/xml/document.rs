use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use crate::error::XmlError;

use super::parser;

/// Stable index of a node within its [`Document`] arena.
///
/// A `NodeId` stays valid for as long as the document it was produced
/// from is not replaced; documents are append-only, so ids are never
/// invalidated by further edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node is: an element with a name and attributes, or a run of
/// character data.
#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

/// One slot in the document arena.
#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An in-memory tree of element, attribute, and text content.
///
/// Nodes live in a contiguous arena addressed by [`NodeId`]; the arena
/// is append-only, so ids are stable. The document supports parsing
/// from markup text, programmatic construction, attribute and text
/// access, and serialization back to markup.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Document {
    /// Creates an empty document with no root element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document with a root element of the given name.
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut doc = Self::new();
        let root = doc.create_element(name);
        doc.root = Some(root);
        doc
    }

    /// Parses markup text into a document.
    ///
    /// # Errors
    ///
    /// Returns an [`XmlError`] carrying the byte offset where parsing
    /// stopped if the text is not well-formed.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        parser::parse(source)
    }

    /// The root element, if the document has one.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Creates a detached element node.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            name: name.into(),
            attributes: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Appends a detached node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent or if `parent` is a text
    /// node.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.nodes[child.0].parent.is_none(),
            "node already has a parent"
        );
        assert!(self.is_element(parent), "text nodes cannot have children");

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Whether `id` is an element node.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// An element's name, or `""` for a text node.
    pub fn name(&self, id: NodeId) -> &str {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => name,
            NodeKind::Text(_) => "",
        }
    }

    /// An attribute's value, or `""` when absent or on a text node.
    pub fn attribute(&self, id: NodeId, name: &str) -> &str {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| value.as_str())
                .unwrap_or(""),
            NodeKind::Text(_) => "",
        }
    }

    /// All attributes of an element, in document order.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes,
            NodeKind::Text(_) => &[],
        }
    }

    /// Sets an attribute, replacing the value if the name exists.
    ///
    /// # Panics
    ///
    /// Panics if `id` is a text node.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind else {
            panic!("text nodes have no attributes");
        };

        let name = name.into();
        let value = value.into();

        if let Some(slot) = attributes.iter_mut().find(|(attr, _)| *attr == name) {
            slot.1 = value;
        } else {
            attributes.push((name, value));
        }
    }

    /// A node's children, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// A node's parent, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// The text content of a node.
    ///
    /// For a text node, its character data; for an element, the
    /// concatenation of all descendant text in document order.
    pub fn text(&self, id: NodeId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in &self.nodes[id.0].children {
            match &self.nodes[child.0].kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { .. } => self.collect_text(child, out),
            }
        }
    }

    /// All element nodes of the document in preorder (document order).
    pub(crate) fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_elements(root, &mut out);
        }
        out
    }

    /// Strict element descendants of `id` in preorder.
    pub(crate) fn element_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in &self.nodes[id.0].children {
            if self.is_element(child) {
                self.collect_elements(child, &mut out);
            }
        }
        out
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in &self.nodes[id.0].children {
            if self.is_element(child) {
                self.collect_elements(child, out);
            }
        }
    }

    /// Finds the first node in `nodes` whose attribute `name` equals
    /// `value`.
    pub fn find_by_attribute(&self, nodes: &[NodeId], name: &str, value: &str) -> Option<NodeId> {
        nodes
            .iter()
            .copied()
            .find(|&id| self.attribute(id, name) == value)
    }

    /// Serializes the document to markup text with an XML declaration.
    ///
    /// Round-trip property: parsing the output reproduces the
    /// document's queryable content.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
        if let Some(root) = self.root {
            self.write_node(root, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => escape_into(text, out),
            NodeKind::Element { name, attributes } => {
                let _ = write!(out, "<{name}");
                for (attr, value) in attributes {
                    let _ = write!(out, " {attr}=\"");
                    escape_into(value, out);
                    out.push('"');
                }

                let children = &self.nodes[id.0].children;
                if children.is_empty() {
                    out.push_str(" />");
                    return;
                }

                out.push('>');
                for &child in children {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{name}>");
            }
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }
}

/// Escapes the five predefined entities into `out`.
fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}

/// A cloneable handle to a caller-owned document.
///
/// The handle carries the document's own lock: every read or write for
/// a given document goes through this one lock, keyed to the document's
/// identity rather than to any task instance. Cloning the handle shares
/// the same document and the same lock.
#[derive(Clone, Default)]
pub struct SharedDocument {
    inner: Arc<Mutex<Document>>,
}

impl SharedDocument {
    /// Creates a handle around an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing document.
    pub fn from_document(document: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    /// Reads the document under its lock.
    pub fn with<R>(&self, read: impl FnOnce(&Document) -> R) -> R {
        let doc = match self.inner.lock() {
            Ok(doc) => doc,
            Err(poisoned) => poisoned.into_inner(),
        };
        read(&doc)
    }

    /// Mutates the document under its lock.
    pub fn with_mut<R>(&self, edit: impl FnOnce(&mut Document) -> R) -> R {
        let mut doc = match self.inner.lock() {
            Ok(doc) => doc,
            Err(poisoned) => poisoned.into_inner(),
        };
        edit(&mut doc)
    }

    /// Replaces the document wholesale, under its lock.
    pub fn replace(&self, document: Document) {
        self.with_mut(|doc| *doc = document);
    }
}
