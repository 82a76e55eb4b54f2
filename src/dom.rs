//! # Document Tree
//!
//! A mutable, arena-backed HTML tree. Documents are parsed with `html5ever`
//! into an `RcDom` and then flattened into a `Vec` of nodes addressed by
//! [`NodeId`], which keeps tree edits (prepending, detaching, replacing
//! text) free of shared ownership.
//!
//! Serialization follows the HTML fragment serialization algorithm, so a
//! document parsed from a serialized tree serializes to the same text.

use std::fmt::Write as _;

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Index of a node inside its [`Document`].
pub type NodeId = usize;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame",
    "hr", "img", "input", "keygen", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is serialized without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
    "noscript",
];

/// A single attribute, with its serialized (possibly prefixed) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, e.g. `href` or `xlink:href`.
    pub name: String,
    /// Attribute value, unescaped.
    pub value: String,
}

/// An element's tag name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local tag name in lower case.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// A `<!DOCTYPE>` declaration.
    Doctype {
        /// Declared name, usually `html`.
        name: String,
        /// Public identifier.
        public_id: String,
        /// System identifier.
        system_id: String,
    },
    /// An element.
    Element(Element),
    /// A text node.
    Text(String),
    /// A comment.
    Comment(String),
}

/// A node and its links.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node payload.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parses a complete HTML document.
    ///
    /// Parsing never fails: like a browser, the parser recovers from any
    /// malformed input.
    ///
    /// ```
    /// use keycloakify_ftl::dom::Document;
    ///
    /// let document = Document::parse("<title>Hi</title>");
    /// assert_eq!(
    ///     document.serialize(),
    ///     "<html><head><title>Hi</title></head><body></body></html>"
    /// );
    /// ```
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .one(html);

        let mut document = Document {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        };
        for child in dom.document.children.borrow().iter() {
            document.import(child, 0);
        }
        document
    }

    fn import(&mut self, handle: &Handle, parent: NodeId) {
        let kind = match &handle.data {
            NodeData::Document => return,
            NodeData::ProcessingInstruction { .. } => return,
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => NodeKind::Doctype {
                name: name.to_string(),
                public_id: public_id.to_string(),
                system_id: system_id.to_string(),
            },
            NodeData::Text { contents } => {
                NodeKind::Text(contents.borrow().to_string())
            }
            NodeData::Comment { contents } => {
                NodeKind::Comment(contents.to_string())
            }
            NodeData::Element { name, attrs, .. } => {
                NodeKind::Element(Element {
                    name: name.local.to_string(),
                    attrs: attrs
                        .borrow()
                        .iter()
                        .map(|attr| Attribute {
                            name: match &attr.name.prefix {
                                Some(prefix) => {
                                    format!("{}:{}", prefix, attr.name.local)
                                }
                                None => attr.name.local.to_string(),
                            },
                            value: attr.value.to_string(),
                        })
                        .collect(),
                })
            }
        };

        let id = self.push(kind);
        self.attach(parent, id, false);

        for child in handle.children.borrow().iter() {
            self.import(child, id);
        }
        // <template> content lives in a separate fragment.
        if let NodeData::Element {
            template_contents, ..
        } = &handle.data
        {
            if let Some(contents) = template_contents.borrow().as_ref() {
                for child in contents.children.borrow().iter() {
                    self.import(child, id);
                }
            }
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, first: bool) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        let children = &mut self.nodes[parent].children;
        if first {
            children.insert(0, child);
        } else {
            children.push(child);
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Returns a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Returns the children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Returns the parent of a node, `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Returns the tag name of an element node.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element(element) => Some(&element.name),
            _ => None,
        }
    }

    /// Returns every attached element with the given tag name, in document order.
    pub fn elements_by_name(&self, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.element_name(id) == Some(name) {
                found.push(id);
            }
            stack.extend(self.nodes[id].children.iter().rev());
        }
        found
    }

    /// Returns the first attached element with the given tag name.
    pub fn first_element_by_name(&self, name: &str) -> Option<NodeId> {
        self.elements_by_name(name).into_iter().next()
    }

    /// Returns an attribute value of an element node.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element(element) => element
                .attrs
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.as_str()),
            _ => None,
        }
    }

    /// Sets an attribute on an element node, keeping its position if present.
    ///
    /// Returns `false` if the node is not an element.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let NodeKind::Element(element) = &mut self.nodes[id].kind else {
            return false;
        };
        match element.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => element.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
        true
    }

    /// Returns the text of a node whose children are all text nodes.
    ///
    /// `None` when any child is not text.
    pub fn raw_text(&self, id: NodeId) -> Option<String> {
        let mut text = String::new();
        for &child in &self.nodes[id].children {
            match &self.nodes[child].kind {
                NodeKind::Text(contents) => text.push_str(contents),
                _ => return None,
            }
        }
        Some(text)
    }

    /// Replaces the children of a node with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in self.nodes[id].children.clone() {
            self.detach(child);
        }
        let text = self.create_text(text);
        self.append_child(id, text);
    }

    /// Creates a detached element.
    pub fn create_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        self.push(NodeKind::Element(Element {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Inserts `child` as the first child of `parent`, detaching it first.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, true);
    }

    /// Inserts `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, false);
    }

    /// Removes a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&child| child != id);
        }
    }

    /// Returns the siblings following a node, in document order.
    pub fn next_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.nodes[id].parent else {
            return Vec::new();
        };
        let siblings = &self.nodes[parent].children;
        match siblings.iter().position(|&child| child == id) {
            Some(index) => siblings[index + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Returns `true` if the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Serializes the document.
    pub fn serialize(&self) -> String {
        self.serialize_with_slot(None).0
    }

    /// Serializes the document, leaving out the `slot` node.
    ///
    /// Returns the text before and after the slot, or `None` if the slot is
    /// not attached to the tree. The split position comes from the tree, so
    /// text elsewhere in the document cannot be mistaken for the slot.
    pub fn serialize_around(&self, slot: NodeId) -> Option<(String, String)> {
        match self.serialize_with_slot(Some(slot)) {
            (mut before, Some(at)) => {
                let after = before.split_off(at);
                Some((before, after))
            }
            (_, None) => None,
        }
    }

    fn serialize_with_slot(
        &self,
        slot: Option<NodeId>,
    ) -> (String, Option<usize>) {
        let mut out = String::new();
        let mut split = None;
        for &child in &self.nodes[self.root()].children {
            self.serialize_node(child, slot, &mut split, &mut out);
        }
        (out, split)
    }

    fn serialize_node(
        &self,
        id: NodeId,
        slot: Option<NodeId>,
        split: &mut Option<usize>,
        out: &mut String,
    ) {
        if slot == Some(id) {
            *split = Some(out.len());
            return;
        }
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Document => {
                for &child in &node.children {
                    self.serialize_node(child, slot, split, out);
                }
            }
            NodeKind::Doctype { name, .. } => {
                _ = write!(out, "<!DOCTYPE {}>", name);
            }
            NodeKind::Comment(contents) => {
                _ = write!(out, "<!--{}-->", contents);
            }
            NodeKind::Text(contents) => {
                let raw = node
                    .parent
                    .and_then(|parent| self.element_name(parent))
                    .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
                if raw {
                    out.push_str(contents);
                } else {
                    escape_into(contents, false, out);
                }
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for attr in &element.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    return;
                }
                if matches!(
                    element.name.as_str(),
                    "pre" | "textarea" | "listing"
                ) && self.starts_with_newline(id)
                {
                    out.push('\n');
                }
                for &child in &node.children {
                    self.serialize_node(child, slot, split, out);
                }
                _ = write!(out, "</{}>", element.name);
            }
        }
    }

    fn starts_with_newline(&self, id: NodeId) -> bool {
        self.nodes[id].children.first().is_some_and(|&first| {
            matches!(&self.nodes[first].kind, NodeKind::Text(text) if text.starts_with('\n'))
        })
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
