//! In-memory host page.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Ids are never reused,
//! so a stale id held by the registry can be detected with [`Document::contains`]
//! instead of silently pointing at a new node.

use crate::error::{ClockError, ClockResult};
use roxmltree::Node as XmlNode;
use std::collections::HashMap;

/// `data-*` attributes of one element, keyed by full attribute name.
pub type DataAttributes = HashMap<String, String>;

/// Synthetic root tag used to wrap host markup (allows several top-level siblings)
const WRAPPER: &str = "__clock_page__";

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Fragment,
    Element(Element),
    Text(String),
    /// Markup emitted verbatim (inline SVG).
    Raw(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only its root fragment.
    pub fn new() -> Self {
        Document {
            nodes: vec![Some(Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Fragment,
            })],
            root: NodeId(0),
        }
    }

    /// Parse well-formed XHTML markup. Several top-level elements are allowed.
    pub fn parse(markup: &str) -> ClockResult<Document> {
        let wrapped = format!("<{0}>{1}</{0}>", WRAPPER, markup);
        let xml = roxmltree::Document::parse(&wrapped)?;
        let mut doc = Document::new();
        let root = doc.root;
        for child in xml.root_element().children() {
            doc.import_xml(root, child)?;
        }
        Ok(doc)
    }

    fn import_xml(&mut self, parent: NodeId, node: XmlNode) -> ClockResult<()> {
        if node.is_element() {
            let mut element = Element::new(node.tag_name().name());
            for attr in node.attributes() {
                element.set_attribute(attr.name(), attr.value());
            }
            let id = self.push(parent, NodeKind::Element(element))?;
            for child in node.children() {
                self.import_xml(id, child)?;
            }
        } else if node.is_text() {
            if let Some(text) = node.text() {
                self.push(parent, NodeKind::Text(text.to_string()))?;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of nodes currently attached, root included.
    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|n| n.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> ClockResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(|n| n.as_mut())
            .ok_or(ClockError::NodeNotFound { node: id })
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(e)) => Some(e),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> ClockResult<&mut Element> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(e) => Ok(e),
            _ => Err(ClockError::NotAnElement { node: id }),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> ClockResult<NodeId> {
        let id = NodeId(self.nodes.len());
        self.node_mut(parent)?.children.push(id);
        self.nodes.push(Some(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        }));
        Ok(id)
    }

    /// Append a new element under `parent`.
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> ClockResult<NodeId> {
        self.push(parent, NodeKind::Element(Element::new(tag)))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> ClockResult<NodeId> {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    pub fn append_raw(&mut self, parent: NodeId, markup: &str) -> ClockResult<NodeId> {
        self.push(parent, NodeKind::Raw(markup.to_string()))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> ClockResult<()> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).map(|e| e.has_class(class)).unwrap_or(false)
    }

    /// Collect `data-*` attributes.
    pub fn data_attributes(&self, id: NodeId) -> DataAttributes {
        let mut data = HashMap::new();
        if let Some(element) = self.element(id) {
            for (name, value) in element.attributes() {
                if name.starts_with("data-") {
                    data.insert(name.to_string(), value.to_string());
                }
            }
        }
        data
    }

    /// Replace the text of a node. A lone text child is rewritten in place, so
    /// repeated calls do not allocate new nodes.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> ClockResult<()> {
        let children = self.node_mut(id)?.children.clone();
        if let [only] = children.as_slice() {
            if let NodeKind::Text(existing) = &mut self.node_mut(*only)?.kind {
                if existing != text {
                    existing.clear();
                    existing.push_str(text);
                }
                return Ok(());
            }
        }
        self.clear_children(id)?;
        self.append_text(id, text)?;
        Ok(())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut s = String::new();
        for n in self.descendants(id) {
            if let Some(NodeKind::Text(t)) = self.kind(n) {
                s.push_str(t);
            }
        }
        s
    }

    /// Drop every child subtree of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> ClockResult<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.free_subtree(child);
        }
        Ok(())
    }

    /// Detach `id` from its parent and drop its subtree.
    pub fn remove(&mut self, id: NodeId) -> ClockResult<()> {
        if id == self.root {
            return self.clear_children(id);
        }
        let parent = self.node_mut(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        self.free_subtree(id);
        Ok(())
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(n.0).and_then(|slot| slot.take()) {
                stack.extend(node.children);
            }
        }
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.node(n) {
                out.push(n);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Elements carrying `class` at or below `root`, in document order.
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    pub fn first_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    /// Markup of the node itself and its subtree. For the root, its children.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Markup of the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Fragment => {
                for child in &node.children {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Text(t) => out.push_str(&escape_html(t)),
            NodeKind::Raw(markup) => out.push_str(markup),
            NodeKind::Element(e) => {
                out.push_str(&format!("<{}", e.tag));
                for (name, value) in e.attributes() {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                out.push('>');
                if VOID_TAGS.contains(&e.tag.as_str()) && node.children.is_empty() {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", e.tag));
            }
        }
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
