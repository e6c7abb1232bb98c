//! Arena document tree.

use crate::error::DomError;
use crate::mutation::MutationRecord;
use crate::node::{ElementData, Node, NodeData, NodeId, editable_flag, is_block_tag};
use crate::selector::Selector;

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;

/// Tag of the document node every tree is rooted at.
pub const DOCUMENT_TAG: &str = "#document";

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed document tree.
///
/// Mutating methods append [`MutationRecord`]s to an internal queue that
/// [`DomTree::take_records`] drains; [`DomTree::set_value`] is the one
/// mutation that records nothing, like a direct property assignment.
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    records: Vec<MutationRecord>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node.
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            records: Vec::new(),
        };
        tree.root = tree.alloc(Node::element(ElementData::new(DOCUMENT_TAG)));
        tree
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the document included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    // ---- arena ----

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        }
    }

    fn release(&mut self, id: NodeId) {
        for node_id in self.subtree(id) {
            if let Some(slot) = self.slots.get_mut(node_id.index()) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(node_id.index() as u32);
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::StaleNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        self.node(id)?.as_element().ok_or(DomError::NotAnElement(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(e) => Ok(e),
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    // ---- inspection ----

    /// Whether `id` still refers to a node of this tree.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Whether `id` is alive and reachable from the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_alive(id) && self.is_inclusive_ancestor(self.root, id)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(|n| &n.data), Ok(NodeData::Text(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok().and_then(|e| e.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Attributes in insertion order.
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        self.element(id)
            .map(|e| e.attributes.clone())
            .unwrap_or_default()
    }

    /// Value property of a form field.
    ///
    /// An explicitly assigned value wins; otherwise a `textarea` reports its
    /// text content and an `input` its `value` attribute. Other elements have
    /// no value property.
    pub fn value(&self, id: NodeId) -> Option<String> {
        let element = self.element(id).ok()?;
        if let Some(value) = &element.value {
            return Some(value.clone());
        }
        match element.tag.as_str() {
            "textarea" => Some(self.text_content(id)),
            "input" => Some(element.attribute("value").unwrap_or_default().to_string()),
            _ => None,
        }
    }

    /// The explicitly assigned value property, if any.
    pub fn assigned_value(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().and_then(|e| e.value.as_deref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return self.is_alive(id);
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether editing is enabled on `id`, honoring inheritance from
    /// ancestors the way `isContentEditable` does.
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(flag) = self.attribute(node, "contenteditable").and_then(editable_flag) {
                return flag;
            }
            current = self.parent(node);
        }
        false
    }

    /// `id` and all its descendants in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Ok(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Concatenated data of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| match self.node(n).map(|node| &node.data) {
                Ok(NodeData::Text(t)) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Rendered text: `<br>` becomes a line break and block children are
    /// separated by line breaks. Trailing breaks are dropped.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_inner_text(id, &mut out);
        out.trim_end_matches('\n').to_string()
    }

    fn collect_inner_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(e) => {
                if e.tag == "br" {
                    out.push('\n');
                    return;
                }
                let block = is_block_tag(&e.tag);
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for child in &node.children {
                    self.collect_inner_text(*child, out);
                }
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }

    /// Elements below `root` matching `selector`, in document order.
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    pub fn query_selector(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .find(|id| selector.matches(self, *id))
    }

    // ---- construction ----

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(ElementData::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(Node::text(data))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let mut data = ElementData::new(tag);
        data.attributes = attributes
            .iter()
            .map(|(n, v)| (n.to_ascii_lowercase(), v.to_string()))
            .collect();
        let id = self.alloc(Node::element(data));
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, data: impl Into<String>) -> Result<NodeId, DomError> {
        let id = self.create_text(data);
        self.append_child(parent, id)?;
        Ok(id)
    }

    // ---- mutation ----

    /// Drain recorded mutations.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        if child == self.root {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be inserted".to_string(),
            ));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{} is an ancestor of {}",
                child, parent
            )));
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> Result<(), DomError> {
        let Some(old_parent) = self.node(child)?.parent else {
            return Ok(());
        };
        self.node_mut(old_parent)?.children.retain(|c| *c != child);
        self.node_mut(child)?.parent = None;
        self.records
            .push(MutationRecord::child_list(old_parent, vec![], vec![child]));
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.records
            .push(MutationRecord::child_list(parent, vec![child], vec![]));
        Ok(())
    }

    /// Insert `child` before `reference`, which must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{} is not a child of {}",
                reference, parent
            )));
        }
        self.detach(child)?;
        let node = self.node_mut(parent)?;
        let position = node
            .children
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(node.children.len());
        node.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        self.records
            .push(MutationRecord::child_list(parent, vec![child], vec![]));
        Ok(())
    }

    /// Remove `id` and its subtree. Every handle into the subtree goes stale.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be removed".to_string(),
            ));
        }
        self.detach(id)?;
        self.release(id);
        Ok(())
    }

    /// Replace attached node `old` with `new` at the same position.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.node(old)?.parent.ok_or_else(|| {
            DomError::HierarchyRequest(format!("{} has no parent to replace it in", old))
        })?;
        if old == new {
            return Ok(());
        }
        self.check_insertable(parent, new)?;
        if self.node(new)?.parent.is_some() {
            self.detach(new)?;
        }

        let node = self.node_mut(parent)?;
        if let Some(position) = node.children.iter().position(|c| *c == old) {
            node.children[position] = new;
        }
        self.node_mut(new)?.parent = Some(parent);
        self.node_mut(old)?.parent = None;
        self.records
            .push(MutationRecord::child_list(parent, vec![new], vec![old]));
        self.release(old);
        Ok(())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(id)?;
        let old_value = match element.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => Some(std::mem::replace(v, value.to_string())),
            None => {
                element.attributes.push((name.clone(), value.to_string()));
                None
            }
        };
        self.records
            .push(MutationRecord::attributes(id, name, old_value));
        Ok(())
    }

    /// Remove an attribute. Removing an absent attribute records nothing.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(id)?;
        let Some(position) = element.attributes.iter().position(|(n, _)| *n == name) else {
            return Ok(());
        };
        let (_, old_value) = element.attributes.remove(position);
        self.records
            .push(MutationRecord::attributes(id, name, Some(old_value)));
        Ok(())
    }

    /// Replace the data of a text node.
    pub fn set_text(&mut self, id: NodeId, data: &str) -> Result<(), DomError> {
        let node = self.node_mut(id)?;
        let NodeData::Text(current) = &mut node.data else {
            return Err(DomError::NotAText(id));
        };
        let old_value = std::mem::replace(current, data.to_string());
        self.records
            .push(MutationRecord::character_data(id, old_value));
        Ok(())
    }

    /// Replace all children of an element with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, data: &str) -> Result<(), DomError> {
        let removed = std::mem::take(&mut self.element_node_mut(id)?.children);
        for child in &removed {
            if let Ok(node) = self.node_mut(*child) {
                node.parent = None;
            }
            self.release(*child);
        }

        let mut added = Vec::new();
        if !data.is_empty() {
            let text = self.create_text(data);
            self.node_mut(text)?.parent = Some(id);
            self.node_mut(id)?.children.push(text);
            added.push(text);
        }

        if !added.is_empty() || !removed.is_empty() {
            self.records
                .push(MutationRecord::child_list(id, added, removed));
        }
        Ok(())
    }

    fn element_node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.element(id)?;
        self.node_mut(id)
    }

    /// Assign the value property. Records no mutation.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.value = Some(value.to_string());
        Ok(())
    }

    /// Drop an assigned value so the field falls back to its markup.
    pub fn clear_value(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element_mut(id)?.value = None;
        Ok(())
    }

    // ---- crate-internal helpers for snapshots ----

    pub(crate) fn alloc_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(Node::element(data))
    }

    /// Attach without recording; only for freshly built detached subtrees.
    pub(crate) fn attach_silently(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub(crate) fn text_data(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|n| &n.data) {
            Ok(NodeData::Text(t)) => Some(t),
            _ => None,
        }
    }
}
