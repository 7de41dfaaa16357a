//! Narrowing headings and topics to one subtree.

use std::fmt::Debug;
use std::hash::Hash;

use super::Navigator;
use crate::document::Document;
use crate::effects::Effects;
use crate::outline::Category;

impl<N> Navigator<N>
where
    N: Copy + Eq + Hash + Debug + 'static,
{
    /// Restrict headings and topics to `node` and announce `preface`
    /// followed by the scope trailer.
    pub fn set_scope<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        fx: &mut Effects<N>,
        node: N,
        preface: &str,
    ) {
        self.scope = Some(node);
        self.outline.rescope(doc, &self.classifiers, node);
        self.cursors.reset(Category::Heading);
        self.cursors.reset(Category::Topic);
        self.body.reset();
        tracing::debug!(
            headings = self.outline.len(Category::Heading),
            topics = self.outline.len(Category::Topic),
            "scope set to {node:?}"
        );

        fx.reveal(node);
        let text = format!("{preface} {}", self.messages.scope_trailer);
        self.say(fx, text.trim_end());
    }

    /// Return to whole-document navigation.
    pub fn clear_scope<D: Document<Node = N>>(&mut self, doc: &D, fx: &mut Effects<N>) {
        self.scope = None;
        self.rebuild(doc);
        self.say(fx, "Scope cleared. Headings and topics now cover the whole page.");
    }

    /// Make the last response current and scope to it.
    pub fn scope_to_latest_response<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        fx: &mut Effects<N>,
    ) {
        let count = self.outline.len(Category::Response);
        let Some(last) = count.checked_sub(1) else {
            self.say(fx, "No assistant responses found on this page.");
            return;
        };
        self.cursors.set(Category::Response, last);
        let Some(node) = self.outline.get(Category::Response, last).map(|e| e.node) else {
            return;
        };
        let preface = format!("Scoped to latest response ({count} of {count}).");
        self.set_scope(doc, fx, node, &preface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavConfig;
    use crate::dom::{HtmlDocument, NodeId};
    use crate::effects::{FocusTracker, LiveRegion};
    use crate::outline::Direction;

    const LONG: &str = "A long enough assistant answer to be treated as a response.";

    fn response(id: &str, inner: &str) -> String {
        format!("<div data-message-author-role='assistant' id='{id}'>{inner}<p>{LONG}</p></div>")
    }

    fn setup(html: &str) -> (HtmlDocument, Navigator<NodeId>, Effects<NodeId>, LiveRegion) {
        let doc = HtmlDocument::parse(html);
        let mut nav = Navigator::new(&NavConfig::default()).unwrap();
        nav.rebuild(&doc);
        let region = LiveRegion::new();
        let fx = Effects::recording(region.clone(), FocusTracker::new());
        (doc, nav, fx, region)
    }

    fn heading_labels(nav: &Navigator<NodeId>) -> Vec<String> {
        nav.outline()
            .list(Category::Heading)
            .iter()
            .map(|e| e.label.clone())
            .collect()
    }

    #[test]
    fn test_set_scope_narrows_headings_and_topics() {
        let html = format!(
            "<h1>Out one</h1><h2>Out two</h2>{}",
            response("r", "<h2>In one</h2><h3>In two</h3><h3>In three</h3><article>inner topic</article>")
        );
        let (doc, mut nav, mut fx, region) = setup(&html);
        nav.move_cursor(&doc, &mut fx, Category::Heading, Direction::Next);
        assert_eq!(nav.cursor(Category::Heading), 1);

        let r = doc.element_by_id("r").unwrap();
        nav.set_scope(&doc, &mut fx, r, "Scoped.");

        assert_eq!(heading_labels(&nav), vec!["In one", "In two", "In three"]);
        assert_eq!(nav.cursor(Category::Heading), 0);
        assert_eq!(nav.outline().len(Category::Topic), 1);
        assert_eq!(nav.outline().len(Category::Response), 1);
        assert_eq!(
            region.last().as_deref(),
            Some("Scoped. Headings and topics limited to this response. Press Alt Shift C to clear scope.")
        );
    }

    #[test]
    fn test_scope_survives_rebuild() {
        let html = format!("<h1>Out</h1>{}", response("r", "<h2>In</h2>"));
        let (doc, mut nav, mut fx, _) = setup(&html);
        let r = doc.element_by_id("r").unwrap();
        nav.set_scope(&doc, &mut fx, r, "Scoped.");
        nav.rebuild(&doc);
        assert_eq!(heading_labels(&nav), vec!["In"]);
        assert!(nav.is_scoped());
    }

    #[test]
    fn test_clear_scope_restores_whole_page() {
        let html = format!("<h1>Out</h1>{}", response("r", "<h2>In</h2>"));
        let (doc, mut nav, mut fx, region) = setup(&html);
        let r = doc.element_by_id("r").unwrap();
        nav.set_scope(&doc, &mut fx, r, "Scoped.");
        nav.clear_scope(&doc, &mut fx);

        assert!(!nav.is_scoped());
        assert_eq!(heading_labels(&nav), vec!["Out", "In"]);
        assert_eq!(
            region.last().as_deref(),
            Some("Scope cleared. Headings and topics now cover the whole page.")
        );
    }

    #[test]
    fn test_scope_to_latest_response() {
        let html: String = ["a", "b", "c", "d"]
            .iter()
            .map(|id| response(id, &format!("<h2>Heading {id}</h2>")))
            .collect();
        let (doc, mut nav, mut fx, region) = setup(&html);
        nav.scope_to_latest_response(&doc, &mut fx);

        assert_eq!(nav.cursor(Category::Response), 3);
        assert_eq!(nav.scope(), doc.element_by_id("d"));
        assert!(region.last().unwrap().contains("4 of 4"));
        assert_eq!(heading_labels(&nav), vec!["Heading d"]);
    }

    #[test]
    fn test_scope_to_latest_without_responses() {
        let (doc, mut nav, mut fx, region) = setup("<h1>Nothing here</h1>");
        nav.scope_to_latest_response(&doc, &mut fx);
        assert!(!nav.is_scoped());
        assert_eq!(
            region.last().as_deref(),
            Some("No assistant responses found on this page.")
        );
    }

    #[test]
    fn test_response_move_scopes_to_response() {
        let html = format!("{}{}", response("a", "<h2>First</h2>"), response("b", "<h2>Second</h2>"));
        let (doc, mut nav, mut fx, region) = setup(&html);
        nav.move_cursor(&doc, &mut fx, Category::Response, Direction::Next);

        let history = region.history();
        let n = history.len();
        assert!(history[n - 2].starts_with("response 2 of 2: "));
        assert!(history[n - 1].starts_with("Scoped to response 2 of 2."));
        assert_eq!(nav.scope(), doc.element_by_id("b"));
        assert_eq!(heading_labels(&nav), vec!["Second"]);
    }
}
