//! Node handles and node payloads.

use std::fmt;

/// Generation-checked handle to a node in a [`DomTree`](crate::DomTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}", self.index, self.generation)
    }
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in insertion order; names are lowercase.
    pub attributes: Vec<(String, String)>,
    /// Explicitly assigned value property.
    pub value: Option<String>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            value: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn element(data: ElementData) -> Self {
        Self {
            data: NodeData::Element(data),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: NodeData::Text(data.into()),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }
}

/// Whether a `contenteditable` attribute value enables editing.
pub(crate) fn editable_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "true" | "plaintext-only" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Tags rendered as blocks by `inner_text`.
pub(crate) fn is_block_tag(tag: &str) -> bool {
    matches!(tag, "div" | "p" | "li" | "pre" | "blockquote")
}
