//! Serializable page snapshots and in-place reconciliation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DomError;
use crate::node::{ElementData, NodeId};
use crate::tree::DomTree;

/// Tag used for text nodes in snapshots.
pub const TEXT_TAG: &str = "#text";

/// Serialized node.
///
/// Text nodes use `{"tag": "#text", "text": "..."}`. On elements, `text`
/// is shorthand for a single text child and is ignored when `children` is
/// not empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            value: None,
            text: None,
            children: Vec::new(),
        }
    }

    pub fn text_node(data: impl Into<String>) -> Self {
        Self {
            text: Some(data.into()),
            ..Self::element(TEXT_TAG)
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: NodeSnapshot) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    /// Children with the `text` shorthand expanded.
    fn child_nodes(&self) -> Vec<NodeSnapshot> {
        if self.is_text() {
            return Vec::new();
        }
        match (&self.text, self.children.is_empty()) {
            (Some(text), true) if !text.is_empty() => vec![NodeSnapshot::text_node(text.clone())],
            _ => self.children.clone(),
        }
    }
}

/// A whole page: optional URL plus the root element below the document node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub root: NodeSnapshot,
}

impl PageSnapshot {
    pub fn new(root: NodeSnapshot) -> Self {
        Self { url: None, root }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, DomError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DomError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DomError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl DomTree {
    /// Build a tree whose document node holds `root`.
    pub fn from_snapshot(root: &NodeSnapshot) -> Result<Self, DomError> {
        let mut tree = DomTree::new();
        let built = tree.build(root)?;
        tree.attach_silently(tree.document(), built)?;
        Ok(tree)
    }

    /// Serialize the subtree rooted at `id`.
    pub fn to_snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        if let Some(data) = self.text_data(id) {
            return Some(NodeSnapshot::text_node(data));
        }
        let tag = self.tag(id)?;
        Some(NodeSnapshot {
            tag: tag.to_string(),
            attributes: self.attributes(id).into_iter().collect(),
            value: self.assigned_value(id).map(str::to_string),
            text: None,
            children: self
                .children(id)
                .iter()
                .filter_map(|c| self.to_snapshot(*c))
                .collect(),
        })
    }

    /// Build a detached subtree without recording mutations.
    fn build(&mut self, snapshot: &NodeSnapshot) -> Result<NodeId, DomError> {
        if snapshot.is_text() {
            return Ok(self.create_text(snapshot.text.clone().unwrap_or_default()));
        }

        let mut data = ElementData::new(&snapshot.tag);
        data.attributes = snapshot
            .attributes
            .iter()
            .map(|(n, v)| (n.to_ascii_lowercase(), v.clone()))
            .collect();
        data.value = snapshot.value.clone();
        let id = self.alloc_element(data);

        for child in snapshot.child_nodes() {
            let child_id = self.build(&child)?;
            self.attach_silently(id, child_id)?;
        }
        Ok(id)
    }

    /// Bring the document in line with `root`.
    ///
    /// Nodes whose kind and tag match are updated in place (attributes,
    /// value, text data). Where the shape differs the subtree is replaced,
    /// so the new nodes get new identities and child-list records.
    pub fn reconcile(&mut self, root: &NodeSnapshot) -> Result<(), DomError> {
        let document = self.document();
        let children = self.children(document).to_vec();
        if let [only] = children.as_slice() {
            return self.reconcile_node(*only, root);
        }
        for child in children {
            self.remove(child)?;
        }
        let built = self.build(root)?;
        self.append_child(document, built)
    }

    fn reconcile_node(&mut self, id: NodeId, snapshot: &NodeSnapshot) -> Result<(), DomError> {
        let same_shape = if snapshot.is_text() {
            self.is_text(id)
        } else {
            self.tag(id)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(&snapshot.tag))
        };
        if !same_shape {
            let built = self.build(snapshot)?;
            return self.replace_with(id, built);
        }

        if snapshot.is_text() {
            let data = snapshot.text.as_deref().unwrap_or_default();
            if self.text_data(id) != Some(data) {
                self.set_text(id, data)?;
            }
            return Ok(());
        }

        self.reconcile_attributes(id, &snapshot.attributes)?;
        match &snapshot.value {
            Some(value) => {
                if self.assigned_value(id) != Some(value.as_str()) {
                    self.set_value(id, value)?;
                }
            }
            None => {
                if self.assigned_value(id).is_some() {
                    self.clear_value(id)?;
                }
            }
        }

        let wanted = snapshot.child_nodes();
        let children = self.children(id).to_vec();
        if children.len() == wanted.len() {
            for (child, node) in children.into_iter().zip(wanted.iter()) {
                self.reconcile_node(child, node)?;
            }
        } else {
            for child in children {
                self.remove(child)?;
            }
            for node in &wanted {
                let built = self.build(node)?;
                self.append_child(id, built)?;
            }
        }
        Ok(())
    }

    fn reconcile_attributes(
        &mut self,
        id: NodeId,
        wanted: &BTreeMap<String, String>,
    ) -> Result<(), DomError> {
        for (name, value) in wanted {
            if self.attribute(id, name) != Some(value.as_str()) {
                self.set_attribute(id, name, value)?;
            }
        }
        let stale: Vec<String> = self
            .attributes(id)
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !wanted.keys().any(|k| k.eq_ignore_ascii_case(name)))
            .collect();
        for name in stale {
            self.remove_attribute(id, &name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    fn chat_page(text: &str) -> NodeSnapshot {
        NodeSnapshot::element("body").with_child(
            NodeSnapshot::element("main").with_child(
                NodeSnapshot::element("textarea")
                    .with_attr("id", "prompt-textarea")
                    .with_value(text),
            ),
        )
    }

    fn find_prompt(tree: &DomTree) -> NodeId {
        let selector = Selector::parse("#prompt-textarea").unwrap();
        tree.query_selector(tree.document(), &selector).unwrap()
    }

    #[test]
    fn test_parse_page_json() {
        let json = r#"{
            "url": "https://chat.example.com/",
            "root": {
                "tag": "body",
                "children": [
                    {"tag": "div", "attributes": {"contenteditable": "true"}, "text": "hi"}
                ]
            }
        }"#;
        let page = PageSnapshot::from_json(json).unwrap();
        assert_eq!(page.url.as_deref(), Some("https://chat.example.com/"));
        let tree = DomTree::from_snapshot(&page.root).unwrap();
        let editable = tree
            .query_selector(tree.document(), &Selector::parse("div").unwrap())
            .unwrap();
        assert_eq!(tree.text_content(editable), "hi");
    }

    #[test]
    fn test_build_records_nothing() {
        let mut tree = DomTree::from_snapshot(&chat_page("hello")).unwrap();
        assert!(tree.take_records().is_empty());
        assert_eq!(tree.value(find_prompt(&tree)).as_deref(), Some("hello"));
    }

    #[test]
    fn test_to_snapshot_roundtrip_shape() {
        let original = chat_page("draft");
        let tree = DomTree::from_snapshot(&original).unwrap();
        let body = tree.children(tree.document())[0];
        assert_eq!(tree.to_snapshot(body).unwrap(), original);
    }

    #[test]
    fn test_reconcile_same_shape_keeps_identity() {
        let mut tree = DomTree::from_snapshot(&chat_page("one")).unwrap();
        let before = find_prompt(&tree);

        tree.reconcile(&chat_page("two")).unwrap();

        assert!(tree.is_alive(before));
        assert_eq!(tree.value(before).as_deref(), Some("two"));
        // Value assignment is not a DOM mutation.
        assert!(tree.take_records().is_empty());
    }

    #[test]
    fn test_reconcile_without_value_matches_fresh_load() {
        let without_value = || {
            NodeSnapshot::element("body").with_child(
                NodeSnapshot::element("main").with_child(
                    NodeSnapshot::element("textarea").with_attr("id", "prompt-textarea"),
                ),
            )
        };
        let mut tree = DomTree::from_snapshot(&chat_page("hello")).unwrap();
        let prompt = find_prompt(&tree);

        tree.reconcile(&without_value()).unwrap();

        let fresh = DomTree::from_snapshot(&without_value()).unwrap();
        assert!(tree.is_alive(prompt));
        assert_eq!(tree.assigned_value(prompt), None);
        assert_eq!(tree.value(prompt), fresh.value(find_prompt(&fresh)));
        assert_eq!(tree.value(prompt).as_deref(), Some(""));
    }

    #[test]
    fn test_reconcile_attribute_changes_recorded() {
        let mut tree = DomTree::from_snapshot(&chat_page("x")).unwrap();
        let prompt = find_prompt(&tree);
        let updated = NodeSnapshot::element("body").with_child(
            NodeSnapshot::element("main").with_child(
                NodeSnapshot::element("textarea")
                    .with_attr("id", "prompt-textarea")
                    .with_attr("placeholder", "Message")
                    .with_value("x"),
            ),
        );

        tree.reconcile(&updated).unwrap();

        let records = tree.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, prompt);
        assert_eq!(records[0].attribute_name(), Some("placeholder"));
    }

    #[test]
    fn test_reconcile_shape_change_replaces_subtree() {
        let mut tree = DomTree::from_snapshot(&chat_page("old")).unwrap();
        let before = find_prompt(&tree);
        let rerendered = NodeSnapshot::element("body").with_child(
            NodeSnapshot::element("main").with_child(
                NodeSnapshot::element("div")
                    .with_attr("id", "prompt-textarea")
                    .with_attr("contenteditable", "true")
                    .with_text("new"),
            ),
        );

        tree.reconcile(&rerendered).unwrap();

        assert!(!tree.is_alive(before));
        let after = find_prompt(&tree);
        assert_ne!(before, after);
        assert_eq!(tree.inner_text(after), "new");
        assert!(tree.take_records().iter().any(|r| r.is_child_list()));
    }

    #[test]
    fn test_reconcile_text_change_is_character_data() {
        let page = |t: &str| NodeSnapshot::element("body").with_child(NodeSnapshot::element("p").with_text(t));
        let mut tree = DomTree::from_snapshot(&page("a")).unwrap();

        tree.reconcile(&page("b")).unwrap();

        let records = tree.take_records();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_character_data());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        let snapshot = PageSnapshot::new(chat_page("file")).with_url("https://host.test/");
        std::fs::write(&path, snapshot.to_json().unwrap()).unwrap();

        let loaded = PageSnapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }
}
