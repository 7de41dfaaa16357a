//! In-memory document adapter over a parsed HTML tree.

use std::cmp::Ordering;

use html5ever::{LocalName, QualName, ns};

use super::arena::{Dom, NodeData, NodeId};
use super::inline_style::InlineVisibility;
use super::parse_html;
use super::role_map::{Flow, element_flow};
use super::selector::SelectorSet;
use crate::document::{ChangeFeed, Document, Rect};
use crate::util::{collapse_whitespace, decode_text, declared_encoding};

/// A parsed HTML page that can be mutated and navigated.
///
/// Layout is a single line of character cells: rendered text is laid out in
/// document order with whitespace collapsed, and block-level elements start a
/// new word. An element's box spans its first to its last rendered character,
/// so elements that render exactly the same text share a box.
pub struct HtmlDocument {
    dom: Dom,
    layout: Layout,
    changes: usize,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        Self::from_dom(parse_html(html))
    }

    /// Parse page bytes, detecting the encoding.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let html = decode_text(bytes, declared_encoding(bytes));
        Self::parse(&html)
    }

    pub fn from_dom(dom: Dom) -> Self {
        let layout = Layout::compute(&dom);
        Self {
            dom,
            layout,
            changes: 0,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The `body` element, if the page has one.
    pub fn body(&self) -> Option<NodeId> {
        self.dom.find_by_tag("body")
    }

    /// Parse `html` and append the resulting nodes to `parent`.
    ///
    /// Returns the appended top-level nodes.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Vec<NodeId> {
        let fragment = parse_html(html);
        let Some(body) = fragment.find_by_tag("body") else {
            return Vec::new();
        };
        let appended = fragment
            .children(body)
            .map(|child| self.dom.import_subtree(&fragment, child, parent))
            .filter(|id| id.is_some())
            .collect();
        self.changed();
        appended
    }

    /// Detach `node` and its subtree. Handles into it stop resolving.
    pub fn remove(&mut self, node: NodeId) {
        self.dom.detach(node);
        self.dom.free_subtree(node);
        self.changed();
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let qname = QualName::new(None, ns!(), LocalName::from(name));
        self.dom.set_attr(node, qname, value.to_string());
        self.changed();
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if self.dom.remove_attr(node, name) {
            self.changed();
        }
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.discard_children(node);
        let text_node = self.dom.create_text(text.to_string());
        self.dom.append(node, text_node);
        self.changed();
    }

    /// Replace the whole body with freshly parsed content.
    ///
    /// Handles into the old body stop resolving; their slots are reused.
    pub fn replace_body(&mut self, html: &str) {
        let Some(body) = self.body() else {
            return;
        };
        self.discard_children(body);
        self.append_html(body, html);
    }

    /// Like [`replace_body`](Self::replace_body), for undecoded page bytes.
    pub fn replace_body_bytes(&mut self, bytes: &[u8]) {
        let html = decode_text(bytes, declared_encoding(bytes));
        self.replace_body(&html);
    }

    fn discard_children(&mut self, node: NodeId) {
        let children: Vec<_> = self.dom.children(node).collect();
        for child in children {
            self.dom.detach(child);
            self.dom.free_subtree(child);
        }
    }

    fn changed(&mut self) {
        self.changes += 1;
        self.layout = Layout::compute(&self.dom);
    }
}

impl ChangeFeed for HtmlDocument {
    fn take_changes(&mut self) -> usize {
        std::mem::take(&mut self.changes)
    }
}

impl Document for HtmlDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.dom.document()
    }

    fn select(&self, root: NodeId, selectors: &SelectorSet) -> Vec<NodeId> {
        selectors.select(&self.dom, root)
    }

    fn matches(&self, node: NodeId, selectors: &SelectorSet) -> bool {
        selectors.matches(&self.dom, node)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.dom
            .subtree(root)
            .skip(1)
            .filter(|&id| self.dom.is_element(id))
            .collect()
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.span(node).is_some()
    }

    fn text(&self, node: NodeId) -> String {
        self.span(node)
            .map(|span| self.layout.flow[span.start..span.end].to_string())
            .unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> String {
        let raw: String = self
            .dom
            .subtree(node)
            .filter_map(|id| self.dom.text_content(id))
            .collect();
        collapse_whitespace(&raw)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.dom.get_attr(node, name)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.dom.element_name(node).map(|n| n.as_ref())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.get_by_id(id)
    }

    fn next_sibling_element(&self, node: NodeId) -> Option<NodeId> {
        self.dom.next_sibling_element(node)
    }

    fn bounds(&self, node: NodeId) -> Option<Rect> {
        self.span(node)
            .map(|span| Rect::new(0.0, span.column as f64, span.columns as f64, 1.0))
    }

    fn compare_order(&self, a: NodeId, b: NodeId) -> Ordering {
        self.order(a).cmp(&self.order(b))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.dom.contains(ancestor, node)
    }
}

impl HtmlDocument {
    fn span(&self, node: NodeId) -> Option<Span> {
        self.dom.slot(node).and_then(|slot| self.layout.span(slot))
    }

    fn order(&self, node: NodeId) -> u32 {
        self.dom
            .slot(node)
            .map_or(u32::MAX, |slot| self.layout.order(slot))
    }
}

/// Rendered range of an element within the text flow.
#[derive(Debug, Clone, Copy)]
struct Span {
    /// Byte range into `Layout::flow`.
    start: usize,
    end: usize,
    /// Character column and width.
    column: usize,
    columns: usize,
}

#[derive(Debug, Default)]
struct Layout {
    flow: String,
    spans: Vec<Option<Span>>,
    /// Pre-order element index; `u32::MAX` for detached nodes.
    order: Vec<u32>,
}

impl Layout {
    fn compute(dom: &Dom) -> Self {
        let mut builder = LayoutBuilder {
            dom,
            layout: Layout {
                flow: String::new(),
                spans: vec![None; dom.len()],
                order: vec![u32::MAX; dom.len()],
            },
            chars: 0,
            pending_space: false,
            next_order: 0,
        };
        builder.run(dom.document());
        builder.layout
    }

    fn span(&self, slot: usize) -> Option<Span> {
        self.spans.get(slot).copied().flatten()
    }

    fn order(&self, slot: usize) -> u32 {
        self.order.get(slot).copied().unwrap_or(u32::MAX)
    }
}

/// Pending work for the layout walk. An element's span is closed by its
/// `Exit` frame once all of its children have been laid out.
enum Frame {
    Enter(NodeId, bool),
    Exit {
        id: NodeId,
        block: bool,
        hidden: bool,
        start: (usize, usize),
    },
}

struct LayoutBuilder<'a> {
    dom: &'a Dom,
    layout: Layout,
    chars: usize,
    pending_space: bool,
    next_order: u32,
}

impl LayoutBuilder<'_> {
    fn run(&mut self, root: NodeId) {
        let mut stack = vec![Frame::Enter(root, false)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id, hidden) => self.enter(id, hidden, &mut stack),
                Frame::Exit {
                    id,
                    block,
                    hidden,
                    start,
                } => {
                    if block {
                        self.pending_space = true;
                    }
                    if !hidden {
                        self.layout.spans[id.index()] = self.span_from(start);
                    }
                }
            }
        }
    }

    fn enter(&mut self, id: NodeId, hidden: bool, stack: &mut Vec<Frame>) {
        let dom = self.dom;
        let Some(node) = dom.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => push_children(dom, id, hidden, stack),
            NodeData::Text(text) if !hidden => self.push_text(text),
            NodeData::Element { name, .. } => {
                self.layout.order[id.index()] = self.next_order;
                self.next_order += 1;

                let flow = element_flow(name.local.as_ref());
                let hidden = hidden || flow == Flow::Hidden || self.hides(id);
                let block = flow == Flow::Block;

                if block {
                    self.pending_space = true;
                }
                stack.push(Frame::Exit {
                    id,
                    block,
                    hidden,
                    start: (self.layout.flow.len(), self.chars),
                });
                push_children(dom, id, hidden, stack);
            }
            _ => {}
        }
    }

    fn hides(&self, id: NodeId) -> bool {
        self.dom.get_attr(id, "hidden").is_some()
            || self
                .dom
                .get_attr(id, "style")
                .is_some_and(|style| InlineVisibility::parse(style).hides())
    }

    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && !self.layout.flow.is_empty() {
                self.layout.flow.push(' ');
                self.chars += 1;
            }
            self.pending_space = false;
            self.layout.flow.push(c);
            self.chars += 1;
        }
    }

    fn span_from(&self, (mut start, mut column): (usize, usize)) -> Option<Span> {
        let end = self.layout.flow.len();
        // A separating space emitted after entry belongs to the previous word.
        if self.layout.flow[start..end].starts_with(' ') {
            start += 1;
            column += 1;
        }
        (start < end).then(|| Span {
            start,
            end,
            column,
            columns: self.chars - column,
        })
    }
}

fn push_children(dom: &Dom, id: NodeId, hidden: bool, stack: &mut Vec<Frame>) {
    let children: Vec<_> = dom.children(id).collect();
    stack.extend(children.into_iter().rev().map(|child| Frame::Enter(child, hidden)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html)
    }

    fn by_id(doc: &HtmlDocument, id: &str) -> NodeId {
        doc.element_by_id(id).unwrap_or_else(|| panic!("no #{id}"))
    }

    #[test]
    fn test_text_is_collapsed_and_block_separated() {
        let d = doc("<div id='d'><p>Hello\n   <b>big</b>world</p><p>again</p></div>");
        assert_eq!(d.text(by_id(&d, "d")), "Hello bigworld again");
    }

    #[test]
    fn test_hidden_subtrees_are_invisible() {
        let d = doc(concat!(
            "<p id='a' hidden>one</p>",
            "<div style='display:none'><p id='b'>two</p></div>",
            "<p id='c' style='visibility: hidden'>three</p>",
            "<p id='d'>four</p>",
            "<script id='e'>var x = 1;</script>",
        ));
        for id in ["a", "b", "c", "e"] {
            assert!(!d.is_visible(by_id(&d, id)), "#{id} should be hidden");
            assert_eq!(d.text(by_id(&d, id)), "");
        }
        assert!(d.is_visible(by_id(&d, "d")));
        assert_eq!(d.text(d.body().unwrap()), "four");
    }

    #[test]
    fn test_text_content_ignores_visibility() {
        let d = doc("<div id='d' hidden>  secret <b>name</b> </div>");
        assert_eq!(d.text(by_id(&d, "d")), "");
        assert_eq!(d.text_content(by_id(&d, "d")), "secret name");
    }

    #[test]
    fn test_empty_elements_have_no_box() {
        let d = doc("<div id='empty'>   </div><p>x</p>");
        assert!(!d.is_visible(by_id(&d, "empty")));
        assert!(d.bounds(by_id(&d, "empty")).is_none());
    }

    #[test]
    fn test_wrappers_share_visual_key() {
        let d = doc("<p>before</p><article id='outer'><div id='inner'>same text</div></article>");
        let outer = d.visual_key(by_id(&d, "outer"));
        let inner = d.visual_key(by_id(&d, "inner"));
        assert!(outer.is_some());
        assert_eq!(outer, inner);
    }

    #[test]
    fn test_siblings_have_distinct_boxes() {
        let d = doc("<p id='a'>same</p><p id='b'>same</p>");
        assert_ne!(d.visual_key(by_id(&d, "a")), d.visual_key(by_id(&d, "b")));
    }

    #[test]
    fn test_compare_order_is_preorder() {
        let d = doc("<div id='a'><p id='b'>x</p></div><p id='c'>y</p>");
        let (a, b, c) = (by_id(&d, "a"), by_id(&d, "b"), by_id(&d, "c"));
        assert_eq!(d.compare_order(a, b), Ordering::Less);
        assert_eq!(d.compare_order(c, b), Ordering::Greater);
        assert_eq!(d.compare_order(b, b), Ordering::Equal);
    }

    #[test]
    fn test_contains() {
        let d = doc("<div id='a'><p id='b'>x</p></div><p id='c'>y</p>");
        let (a, b, c) = (by_id(&d, "a"), by_id(&d, "b"), by_id(&d, "c"));
        assert!(d.contains(a, b));
        assert!(d.contains(a, a));
        assert!(!d.contains(b, a));
        assert!(!d.contains(a, c));
    }

    #[test]
    fn test_mutations_count_changes_and_relayout() {
        let mut d = doc("<main id='m'><p>first</p></main>");
        assert_eq!(d.take_changes(), 0);

        let main = by_id(&d, "m");
        let added = d.append_html(main, "<p id='n'>second</p><p>third</p>");
        assert_eq!(added.len(), 2);
        d.set_attribute(added[1], "hidden", "");
        assert_eq!(d.take_changes(), 2);
        assert_eq!(d.take_changes(), 0);

        assert_eq!(d.text(main), "first second");
        assert!(d.is_visible(by_id(&d, "n")));
    }

    #[test]
    fn test_removed_nodes_become_invisible() {
        let mut d = doc("<p id='a'>gone soon</p><p>stays</p>");
        let a = by_id(&d, "a");
        d.remove(a);
        assert!(!d.is_visible(a));
        assert_eq!(d.element_by_id("a"), None);
        assert_eq!(d.take_changes(), 1);
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let mut d = doc("<main id='m'><p id='old'>old</p></main>");
        let old = by_id(&d, "old");
        d.remove(old);
        let added = d.append_html(by_id(&d, "m"), "<p id='new'>new</p>");
        assert!(!d.is_visible(old));
        assert_eq!(d.text(old), "");
        assert_eq!(d.tag_name(old), None);
        assert_ne!(old, added[0]);
        assert_eq!(d.text(added[0]), "new");
    }

    #[test]
    fn test_set_text_and_replace_body() {
        let mut d = doc("<h1 id='h'>Old</h1>");
        let h = by_id(&d, "h");
        d.set_text(h, "New title");
        assert_eq!(d.text(h), "New title");

        d.replace_body("<p id='p'>Fresh</p>");
        assert!(!d.is_visible(h));
        assert_eq!(d.text(by_id(&d, "p")), "Fresh");
        assert_eq!(d.take_changes(), 2);
    }

    #[test]
    fn test_repeated_reloads_keep_arena_bounded() {
        let page = "<header>h</header><main><h1>T</h1><p>a</p><p>b</p></main><footer>f</footer>";
        let mut d = doc(page);
        d.replace_body(page);
        let settled = d.dom().len();
        for _ in 0..100 {
            d.replace_body(page);
        }
        assert_eq!(d.dom().len(), settled);
        assert_eq!(d.dom().attached_len(), doc(page).dom().attached_len());
    }

    #[test]
    fn test_deeply_nested_page_lays_out() {
        let depth = 20_000;
        let html = format!(
            "{}<p id='leaf'>x</p>{}",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let d = doc(&html);
        let leaf = by_id(&d, "leaf");
        assert_eq!(d.text(leaf), "x");
        assert_eq!(d.text(d.body().unwrap()), "x");
        assert!(d.contains(d.body().unwrap(), leaf));
    }

    #[test]
    fn test_append_deeply_nested_fragment() {
        let mut d = doc("<main id='m'></main>");
        let depth = 20_000;
        let html = format!(
            "{}<span id='deep'>tail</span>{}",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        d.append_html(by_id(&d, "m"), &html);
        assert_eq!(d.text(by_id(&d, "deep")), "tail");
    }

    #[test]
    fn test_from_bytes_honours_meta_charset() {
        let d = HtmlDocument::from_bytes(b"<meta charset=\"windows-1252\"><p id='p'>caf\xE9</p>");
        assert_eq!(d.text(by_id(&d, "p")), "café");
    }
}
