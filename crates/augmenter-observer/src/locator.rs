//! Element locator.
//!
//! Finds the host page's editable input by trying an ordered list of
//! selector rules. A match only counts if it passes the editable-surface
//! guard, and every match of a rule is tried before moving to the next one.

use augmenter_dom::{DomTree, NodeId, Selector};
use augmenter_protocols::ElementKind;
use tracing::trace;

use crate::error::ObserverError;

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;

/// Weak reference to the tracked element plus its kind.
///
/// Holds no ownership; [`ElementLocator::verify`] must pass before the node
/// is trusted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedElement {
    pub node: NodeId,
    pub kind: ElementKind,
}

/// Stateless, rule-driven locator.
#[derive(Debug, Clone)]
pub struct ElementLocator {
    rules: Vec<Selector>,
}

impl ElementLocator {
    pub fn new(rules: Vec<Selector>) -> Self {
        Self { rules }
    }

    /// Parse rules from selector strings, most specific first.
    pub fn from_selectors<S: AsRef<str>>(selectors: &[S]) -> Result<Self, ObserverError> {
        let rules = selectors
            .iter()
            .map(|s| Selector::parse(s.as_ref()).map_err(ObserverError::InvalidRule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[Selector] {
        &self.rules
    }

    /// Find the editable input, or `None` when the page currently has none.
    pub fn locate(&self, tree: &DomTree) -> Option<LocatedElement> {
        let document = tree.document();
        for rule in &self.rules {
            for node in tree.query_selector_all(document, rule) {
                if let Some(kind) = Self::classify(tree, node) {
                    trace!(rule = %rule, node = %node, kind = %kind, "Located input");
                    return Some(LocatedElement { node, kind });
                }
            }
        }
        None
    }

    /// Editable-surface guard.
    ///
    /// `textarea` and text-like `input`s are plain-text fields; elements with
    /// editing switched on are rich-edit regions. Disabled or hidden elements
    /// never qualify.
    pub fn classify(tree: &DomTree, node: NodeId) -> Option<ElementKind> {
        let tag = tree.tag(node)?;
        if tree.has_attribute(node, "disabled")
            || tree.attribute(node, "aria-hidden") == Some("true")
        {
            return None;
        }

        match tag {
            "textarea" => return Some(ElementKind::PlainTextField),
            "input" => {
                let text_like = tree
                    .attribute(node, "type")
                    .is_none_or(|t| matches!(t.to_ascii_lowercase().as_str(), "text" | "search" | ""));
                return text_like.then_some(ElementKind::PlainTextField);
            }
            _ => {}
        }

        match tree.attribute(node, "contenteditable") {
            Some(v) if matches!(v.to_ascii_lowercase().as_str(), "" | "true" | "plaintext-only") => {
                Some(ElementKind::RichEditRegion)
            }
            _ => None,
        }
    }

    /// Whether a previously located element is still usable as is.
    pub fn verify(tree: &DomTree, located: &LocatedElement) -> bool {
        tree.is_connected(located.node) && Self::classify(tree, located.node) == Some(located.kind)
    }
}

impl Default for ElementLocator {
    fn default() -> Self {
        let selectors = augmenter_config::default_selectors();
        let rules = selectors
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .collect();
        Self::new(rules)
    }
}
