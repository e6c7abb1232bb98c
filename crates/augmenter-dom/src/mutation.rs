//! Mutation records and observer filters.

use crate::node::NodeId;
use crate::tree::DomTree;

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children of `target` were added and/or removed.
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// An attribute of `target` was set or removed.
    Attributes {
        name: String,
        old_value: Option<String>,
    },
    /// The data of text node `target` changed.
    CharacterData { old_value: String },
}

/// A single document change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            kind: MutationKind::ChildList { added, removed },
        }
    }

    pub fn attributes(target: NodeId, name: impl Into<String>, old_value: Option<String>) -> Self {
        Self {
            target,
            kind: MutationKind::Attributes {
                name: name.into(),
                old_value,
            },
        }
    }

    pub fn character_data(target: NodeId, old_value: impl Into<String>) -> Self {
        Self {
            target,
            kind: MutationKind::CharacterData {
                old_value: old_value.into(),
            },
        }
    }

    pub fn is_child_list(&self) -> bool {
        matches!(self.kind, MutationKind::ChildList { .. })
    }

    pub fn is_character_data(&self) -> bool {
        matches!(self.kind, MutationKind::CharacterData { .. })
    }

    /// Attribute name for attribute records.
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attributes { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Which records an observer wants to receive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    /// Restrict attribute records to these names. `None` accepts all.
    pub attribute_filter: Option<Vec<String>>,
    pub character_data: bool,
    /// Also observe every descendant of the target.
    pub subtree: bool,
}

impl MutationObserverInit {
    /// Whether `record` is visible to an observer registered on `observed`.
    pub fn accepts(&self, tree: &DomTree, observed: NodeId, record: &MutationRecord) -> bool {
        let in_scope = record.target == observed
            || (self.subtree && tree.is_inclusive_ancestor(observed, record.target));
        if !in_scope {
            return false;
        }

        match &record.kind {
            MutationKind::ChildList { .. } => self.child_list,
            MutationKind::Attributes { name, .. } => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|filter| filter.iter().any(|f| f.eq_ignore_ascii_case(name)))
            }
            MutationKind::CharacterData { .. } => self.character_data,
        }
    }
}
