//! The document adapter: what the navigator needs from a live tree.
//!
//! The navigator never inspects node internals. Everything it knows about a
//! node comes through [`Document`], so the same engine runs over the in-memory
//! [`HtmlDocument`](crate::dom::HtmlDocument) or over a browser DOM bridged
//! from elsewhere.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use crate::dom::SelectorSet;

/// Read-only view of a live, hierarchical document.
pub trait Document {
    /// Opaque node handle. Handles to removed nodes stop resolving: they are
    /// invisible and never equal a handle to a node created later.
    type Node: Copy + Eq + Hash + Debug + 'static;

    /// The whole-document root.
    fn root(&self) -> Self::Node;

    /// Elements strictly below `root` matching any selector, in document order.
    fn select(&self, root: Self::Node, selectors: &SelectorSet) -> Vec<Self::Node>;

    /// Whether `node` matches any selector in the set.
    fn matches(&self, node: Self::Node, selectors: &SelectorSet) -> bool;

    /// Every element strictly below `root`, in document order.
    fn descendants(&self, root: Self::Node) -> Vec<Self::Node>;

    /// Rendered and occupying a non-empty box.
    fn is_visible(&self, node: Self::Node) -> bool;

    /// Rendered text, whitespace-collapsed and trimmed. Empty when hidden.
    fn text(&self, node: Self::Node) -> String;

    /// All descendant text regardless of visibility, whitespace-collapsed.
    fn text_content(&self, node: Self::Node) -> String;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Lowercase tag name of an element.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn next_sibling_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Border box, when the node is laid out.
    fn bounds(&self, node: Self::Node) -> Option<Rect>;

    /// Relative document position of two nodes.
    fn compare_order(&self, a: Self::Node, b: Self::Node) -> Ordering;

    /// Whether `node` is `ancestor` itself or one of its descendants.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool;

    /// Key identifying the rendered region of a node.
    fn visual_key(&self, node: Self::Node) -> Option<VisualKey> {
        self.bounds(node).map(|r| r.visual_key())
    }
}

/// Source of structural-change notifications.
pub trait ChangeFeed {
    /// Number of structural changes since the previous call; resets the count.
    fn take_changes(&mut self) -> usize;
}

/// A layout box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn visual_key(&self) -> VisualKey {
        VisualKey {
            top: self.top.round() as i64,
            left: self.left.round() as i64,
            width: self.width.round() as i64,
            height: self.height.round() as i64,
        }
    }
}

/// Rounded box, used to collapse candidates that render the same region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualKey {
    pub top: i64,
    pub left: i64,
    pub width: i64,
    pub height: i64,
}
