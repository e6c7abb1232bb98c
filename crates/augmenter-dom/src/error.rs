//! Document model errors.

use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node {0} is no longer part of the document")]
    StaleNode(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is not a text node")]
    NotAText(NodeId),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
