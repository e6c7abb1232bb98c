//! Interaction events.

use std::fmt;

use crate::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Input,
    KeyUp,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Input => write!(f, "input"),
            InteractionKind::KeyUp => write!(f, "keyup"),
        }
    }
}

/// An `input` or `keyup` event, as seen by a document-level listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub target: NodeId,
    /// Lowercase tag of the target at dispatch time.
    pub target_tag: String,
    /// Whether the target had editing enabled at dispatch time.
    pub target_editable: bool,
}
