//! Text extractor.

use augmenter_dom::DomTree;
use augmenter_protocols::ElementKind;

use crate::locator::LocatedElement;

/// Reads the current text of a located element.
pub struct TextExtractor;

impl TextExtractor {
    /// Current text of `located`, or an empty string when it has none or is
    /// no longer in the document.
    ///
    /// Plain-text fields report their value property. Rich-edit regions
    /// report their text content, falling back to rendered text when the
    /// text content is empty.
    pub fn extract(tree: &DomTree, located: &LocatedElement) -> String {
        if !tree.is_connected(located.node) {
            return String::new();
        }

        match located.kind {
            ElementKind::PlainTextField => tree.value(located.node).unwrap_or_default(),
            ElementKind::RichEditRegion => {
                let text = tree.text_content(located.node);
                if text.is_empty() {
                    tree.inner_text(located.node)
                } else {
                    text
                }
            }
        }
    }
}
