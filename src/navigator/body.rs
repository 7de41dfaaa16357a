//! Body mode: stepping through the content under one heading.
//!
//! A heading's body runs from the heading to the next heading of the same or
//! a shallower level. Deeper sub-headings stay inside the body, but heading
//! nodes themselves are never body items, and neither is a container that
//! holds the closing heading.

use std::fmt::Debug;
use std::hash::Hash;

use super::Navigator;
use crate::document::Document;
use crate::effects::Effects;
use crate::outline::{Category, Classifiers, HeadingLevel, OutlineEntry};
use crate::util::truncate_chars;

/// Body items and the position within them. Active while `items` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyState<N> {
    items: Vec<OutlineEntry<N>>,
    index: usize,
}

impl<N> Default for BodyState<N> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }
}

impl<N> BodyState<N> {
    pub fn is_active(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn items(&self) -> &[OutlineEntry<N>] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&OutlineEntry<N>> {
        self.items.get(self.index)
    }

    pub(crate) fn reset(&mut self) {
        self.items.clear();
        self.index = 0;
    }
}

/// Content nodes belonging to `headings[index]`, in document order.
///
/// Falls back to the heading's next sibling element when the walk finds
/// nothing. Never returns the heading itself or any other heading.
pub fn collect_body<D: Document>(
    doc: &D,
    classifiers: &Classifiers,
    headings: &[OutlineEntry<D::Node>],
    index: usize,
) -> Vec<OutlineEntry<D::Node>> {
    let Some(current) = headings.get(index) else {
        return Vec::new();
    };
    let level = current.level.unwrap_or(HeadingLevel::UNLEVELED);
    let stop = headings[index + 1..]
        .iter()
        .find(|h| h.level.unwrap_or(HeadingLevel::UNLEVELED) <= level)
        .map(|h| h.node);
    let cap = classifiers.body_max_chars();

    let mut items = Vec::new();
    let mut in_range = false;
    for node in doc.descendants(doc.root()) {
        if node == current.node {
            in_range = true;
            continue;
        }
        if Some(node) == stop {
            break;
        }
        if !in_range || classifiers.is_heading(doc, node) || !classifiers.is_body_block(doc, node) {
            continue;
        }
        if let Some(stop) = stop
            && doc.contains(node, stop)
        {
            continue;
        }
        if !doc.is_visible(node) {
            continue;
        }
        let text = doc.text(node);
        if !text.is_empty() {
            items.push(OutlineEntry::new(node, truncate_chars(&text, cap)));
        }
    }

    if items.is_empty()
        && let Some(sibling) = doc.next_sibling_element(current.node)
        && doc.is_visible(sibling)
        && !classifiers.is_heading(doc, sibling)
    {
        let text = doc.text(sibling);
        if !text.is_empty() {
            items.push(OutlineEntry::new(sibling, truncate_chars(&text, cap)));
        }
    }
    items
}

impl<N> Navigator<N>
where
    N: Copy + Eq + Hash + Debug + 'static,
{
    /// Enter body mode for the current heading, or advance within it.
    ///
    /// Advancing past the last item leaves body mode and returns to the
    /// heading.
    pub fn body_command<D: Document<Node = N>>(&mut self, doc: &D, fx: &mut Effects<N>) {
        let headings = self.outline.list(Category::Heading);
        if headings.is_empty() {
            self.say(fx, "No headings available for body.");
            return;
        }

        if !self.body.is_active() {
            let index = self.cursors.get(Category::Heading);
            let items = collect_body(doc, &self.classifiers, headings, index);
            if items.is_empty() {
                self.say(fx, "No body content for this heading.");
                return;
            }
            self.body = BodyState { items, index: 0 };
            self.announce_body_item(fx);
            return;
        }

        if self.body.index + 1 >= self.body.items.len() {
            self.body.reset();
            let heading = self
                .outline
                .get(Category::Heading, self.cursors.get(Category::Heading))
                .map(|h| h.node);
            if let Some(node) = heading {
                fx.reveal(node);
            }
            self.say(fx, "End of body. Back to headings.");
            return;
        }

        self.body.index += 1;
        self.announce_body_item(fx);
    }

    fn announce_body_item(&mut self, fx: &mut Effects<N>) {
        let Some(item) = self.body.current() else {
            return;
        };
        let (node, label) = (item.node, item.label.clone());
        let text = format!(
            "Body item {} of {}: {label}",
            self.body.index + 1,
            self.body.items.len()
        );
        fx.reveal(node);
        self.say(fx, &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavConfig;
    use crate::dom::{HtmlDocument, NodeId};
    use crate::effects::{FocusTracker, LiveRegion};
    use crate::outline::Direction;

    struct Fixture {
        doc: HtmlDocument,
        nav: Navigator<NodeId>,
        fx: Effects<NodeId>,
        region: LiveRegion,
        focus: FocusTracker<NodeId>,
    }

    fn fixture(html: &str) -> Fixture {
        let doc = HtmlDocument::parse(html);
        let mut nav = Navigator::new(&NavConfig::default()).unwrap();
        nav.rebuild(&doc);
        let region = LiveRegion::new();
        let focus = FocusTracker::new();
        let fx = Effects::recording(region.clone(), focus.clone());
        Fixture {
            doc,
            nav,
            fx,
            region,
            focus,
        }
    }

    impl Fixture {
        fn body(&mut self) -> String {
            self.nav.body_command(&self.doc, &mut self.fx);
            self.region.last().unwrap_or_default()
        }

        fn collect(&self, index: usize) -> Vec<NodeId> {
            collect_body(
                &self.doc,
                &self.nav.classifiers,
                self.nav.outline().list(Category::Heading),
                index,
            )
            .into_iter()
            .map(|e| e.node)
            .collect()
        }

        fn ids(&self, ids: &[&str]) -> Vec<NodeId> {
            ids.iter()
                .map(|id| self.doc.element_by_id(id).unwrap())
                .collect()
        }
    }

    const SECTIONS: &str = concat!(
        "<h1 id='a'>A</h1><p id='p1'>one</p>",
        "<h2 id='b'>B</h2><p id='p2'>two</p>",
        "<h1 id='c'>C</h1><p id='p3'>three</p>",
    );

    #[test]
    fn test_body_bounded_by_same_or_higher_level() {
        let f = fixture(SECTIONS);
        assert_eq!(f.collect(0), f.ids(&["p1", "p2"]));
        assert_eq!(f.collect(1), f.ids(&["p2"]));
        assert_eq!(f.collect(2), f.ids(&["p3"]));
    }

    #[test]
    fn test_body_excludes_section_wrapping_next_heading() {
        let mut f = fixture(concat!(
            "<section id='s1'><h2 id='a'>A</h2><p id='pa'>pa</p></section>",
            "<section id='s2'><h2 id='b'>B</h2><p id='pb'>pb</p></section>",
        ));
        assert_eq!(f.collect(0), f.ids(&["pa"]));
        assert_eq!(f.body(), "Body item 1 of 1: pa");
        assert_eq!(f.body(), "End of body. Back to headings.");
    }

    #[test]
    fn test_body_keeps_wrapper_of_deeper_heading() {
        let f = fixture(concat!(
            "<h2 id='a'>A</h2>",
            "<section id='s'><h3>Sub</h3><p id='p'>inner</p></section>",
            "<h2 id='b'>B</h2>",
        ));
        assert_eq!(f.collect(0), f.ids(&["s", "p"]));
    }

    #[test]
    fn test_body_out_of_range_is_empty() {
        let f = fixture(SECTIONS);
        assert!(f.collect(3).is_empty());
    }

    #[test]
    fn test_body_skips_hidden_and_empty_blocks() {
        let f = fixture(concat!(
            "<h1 id='a'>A</h1>",
            "<p hidden>secret</p><div style='display:none'><p>gone</p></div>",
            "<p>  </p><p id='p'>kept</p>",
        ));
        assert_eq!(f.collect(0), f.ids(&["p"]));
    }

    #[test]
    fn test_body_includes_nested_blocks() {
        let f = fixture("<h2 id='h'>H</h2><div id='d'><p id='x'>x</p><p id='y'>y</p></div>");
        assert_eq!(f.collect(0), f.ids(&["d", "x", "y"]));
    }

    #[test]
    fn test_body_label_truncated_to_160_chars() {
        let long = "w".repeat(400);
        let f = fixture(&format!("<h1>H</h1><p>{long}</p>"));
        let entries = collect_body(
            &f.doc,
            &f.nav.classifiers,
            f.nav.outline().list(Category::Heading),
            0,
        );
        assert_eq!(entries[0].label.chars().count(), 160);
    }

    #[test]
    fn test_body_fallback_sibling() {
        // Inline-only content is not a body block, so the sibling fallback applies.
        let f = fixture("<h1 id='h'>H</h1><span id='s'>inline note</span>");
        assert_eq!(f.collect(0), f.ids(&["s"]));
    }

    #[test]
    fn test_body_fallback_never_returns_heading() {
        let f = fixture("<h1>First</h1><h2>Second</h2>");
        assert!(f.collect(0).is_empty());
    }

    #[test]
    fn test_body_command_walks_and_returns() {
        let mut f = fixture(SECTIONS);
        assert_eq!(f.body(), "Body item 1 of 2: one");
        assert!(f.nav.body().is_active());
        assert_eq!(f.body(), "Body item 2 of 2: two");
        assert_eq!(f.body(), "End of body. Back to headings.");
        assert!(!f.nav.body().is_active());
        assert_eq!(f.focus.focused(), f.doc.element_by_id("a"));
        assert_eq!(f.body(), "Body item 1 of 2: one");
    }

    #[test]
    fn test_body_command_without_headings() {
        let mut f = fixture("<p>no headings</p>");
        assert_eq!(f.body(), "No headings available for body.");
    }

    #[test]
    fn test_body_command_without_content() {
        let mut f = fixture("<h1>Lonely</h1>");
        assert_eq!(f.body(), "No body content for this heading.");
        assert!(!f.nav.body().is_active());
    }

    #[test]
    fn test_heading_move_cancels_body() {
        let mut f = fixture(SECTIONS);
        f.body();
        f.nav
            .move_cursor(&f.doc, &mut f.fx, Category::Heading, Direction::Next);
        assert!(!f.nav.body().is_active());
        assert_eq!(f.body(), "Body item 1 of 1: two");
    }

    #[test]
    fn test_rebuild_resets_body_and_keeps_heading_cursor() {
        let mut f = fixture(SECTIONS);
        f.nav
            .move_cursor(&f.doc, &mut f.fx, Category::Heading, Direction::Next);
        f.body();
        assert!(f.nav.body().is_active());

        f.nav.rebuild(&f.doc);
        assert!(!f.nav.body().is_active());
        assert_eq!(f.nav.cursor(Category::Heading), 1);
    }

    #[test]
    fn test_read_current_reads_full_body_item() {
        let long = "z".repeat(200);
        let mut f = fixture(&format!("<h1>H</h1><p>{long}</p>"));
        f.body();
        f.nav.read_current(&f.doc, &mut f.fx);
        assert_eq!(f.region.last().unwrap().len(), 200);
    }
}
