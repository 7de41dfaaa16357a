//! The four classifiers.
//!
//! Each maps a subtree to an ordered list of `(node, label)` entries. They are
//! pure: for a given tree snapshot they always return the same list.

use std::collections::HashSet;

use super::{HeadingLevel, OutlineEntry};
use crate::config::{LabelConfig, NavConfig};
use crate::document::Document;
use crate::dom::{SelectorSet, heading_rank};
use crate::error::Result;
use crate::util::{collapse_whitespace, truncate_chars};

/// Compiled classification criteria.
#[derive(Debug, Clone)]
pub struct Classifiers {
    landmark: SelectorSet,
    heading: SelectorSet,
    topic: SelectorSet,
    response: SelectorSet,
    body: SelectorSet,
    nested_heading: SelectorSet,
    response_title: SelectorSet,
    response_min_chars: usize,
    labels: LabelConfig,
}

impl Classifiers {
    /// Compile the selector lists of `config`.
    pub fn new(config: &NavConfig) -> Result<Self> {
        let classify = &config.classify;
        Ok(Self {
            landmark: SelectorSet::from_parts(&classify.landmark_selectors)?,
            heading: SelectorSet::from_parts(&classify.heading_selectors)?,
            topic: SelectorSet::from_parts(&classify.topic_selectors)?,
            response: SelectorSet::from_parts(&classify.response_selectors)?,
            body: SelectorSet::from_parts(&classify.body_selectors)?,
            nested_heading: SelectorSet::parse("h1, h2, h3, h4, h5, h6")?,
            response_title: SelectorSet::parse("h1, h2, h3")?,
            response_min_chars: classify.response_min_chars,
            labels: config.labels.clone(),
        })
    }

    /// Structural regions of the whole document.
    pub fn landmarks<D: Document>(&self, doc: &D) -> Vec<OutlineEntry<D::Node>> {
        doc.select(doc.root(), &self.landmark)
            .into_iter()
            .filter(|&node| doc.is_visible(node))
            .map(|node| {
                let label = aria_label(doc, node)
                    .or_else(|| labelled_by(doc, node))
                    .unwrap_or_else(|| tag_label(doc, node, "landmark"));
                OutlineEntry::new(node, label)
            })
            .collect()
    }

    /// Headings under `root`, with their levels.
    pub fn headings<D: Document>(&self, doc: &D, root: D::Node) -> Vec<OutlineEntry<D::Node>> {
        doc.select(root, &self.heading)
            .into_iter()
            .filter(|&node| doc.is_visible(node))
            .map(|node| {
                let text = doc.text(node);
                let label = if text.is_empty() {
                    tag_label(doc, node, "heading")
                } else {
                    text
                };
                OutlineEntry::heading(node, label, self.level_of(doc, node))
            })
            .collect()
    }

    /// Block-like content units under `root`.
    pub fn topics<D: Document>(&self, doc: &D, root: D::Node) -> Vec<OutlineEntry<D::Node>> {
        let mut seen = HashSet::new();
        doc.select(root, &self.topic)
            .into_iter()
            .filter(|&node| doc.is_visible(node))
            .filter(|&node| first_in_region(doc, node, &mut seen))
            .map(|node| {
                let label = aria_label(doc, node)
                    .or_else(|| nested_text(doc, node, &self.nested_heading))
                    .or_else(|| {
                        let text = doc.text(node);
                        (!text.is_empty())
                            .then(|| truncate_chars(&text, self.labels.topic_max_chars).to_string())
                    })
                    .unwrap_or_else(|| self.labels.topic_fallback.clone());
                OutlineEntry::new(node, label)
            })
            .collect()
    }

    /// Assistant turns of the whole document, in document order.
    pub fn responses<D: Document>(&self, doc: &D) -> Vec<OutlineEntry<D::Node>> {
        let mut seen = HashSet::new();
        let mut entries: Vec<_> = doc
            .select(doc.root(), &self.response)
            .into_iter()
            .filter(|&node| doc.is_visible(node))
            .filter_map(|node| {
                let text = doc.text(node);
                if text.chars().count() < self.response_min_chars {
                    return None;
                }
                if !first_in_region(doc, node, &mut seen) {
                    return None;
                }
                let label = aria_label(doc, node)
                    .or_else(|| nested_text(doc, node, &self.response_title))
                    .unwrap_or_else(|| {
                        truncate_chars(&text, self.labels.response_max_chars).to_string()
                    });
                Some(OutlineEntry::new(node, label))
            })
            .collect();
        entries.sort_by(|a, b| doc.compare_order(a.node, b.node));
        entries
    }

    /// Whether `node` counts as a heading.
    pub fn is_heading<D: Document>(&self, doc: &D, node: D::Node) -> bool {
        doc.matches(node, &self.heading)
    }

    /// Whether body mode may stop on `node`.
    pub fn is_body_block<D: Document>(&self, doc: &D, node: D::Node) -> bool {
        doc.matches(node, &self.body)
    }

    pub fn body_max_chars(&self) -> usize {
        self.labels.body_max_chars
    }

    /// Rank from the tag, else from `aria-level` on `role="heading"`, else unleveled.
    pub fn level_of<D: Document>(&self, doc: &D, node: D::Node) -> HeadingLevel {
        if let Some(rank) = doc.tag_name(node).and_then(heading_rank) {
            return HeadingLevel::new(rank).unwrap_or(HeadingLevel::UNLEVELED);
        }
        if doc.attribute(node, "role") == Some("heading") {
            return doc
                .attribute(node, "aria-level")
                .and_then(|v| v.trim().parse::<u8>().ok())
                .and_then(HeadingLevel::new)
                .unwrap_or(HeadingLevel::UNLEVELED);
        }
        HeadingLevel::UNLEVELED
    }
}

/// Records the node's rendered region; false when an earlier candidate had it.
fn first_in_region<D: Document>(
    doc: &D,
    node: D::Node,
    seen: &mut HashSet<crate::document::VisualKey>,
) -> bool {
    match doc.visual_key(node) {
        Some(key) => seen.insert(key),
        None => true,
    }
}

fn aria_label<D: Document>(doc: &D, node: D::Node) -> Option<String> {
    doc.attribute(node, "aria-label")
        .map(collapse_whitespace)
        .filter(|label| !label.is_empty())
}

/// Accessible name from `aria-labelledby`, which may list several ids.
fn labelled_by<D: Document>(doc: &D, node: D::Node) -> Option<String> {
    let ids = doc.attribute(node, "aria-labelledby")?;
    let label = ids
        .split_whitespace()
        .filter_map(|id| doc.element_by_id(id))
        .map(|target| doc.text_content(target))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!label.is_empty()).then_some(label)
}

fn nested_text<D: Document>(doc: &D, node: D::Node, selectors: &SelectorSet) -> Option<String> {
    let first = doc.select(node, selectors).into_iter().next()?;
    let text = doc.text_content(first);
    (!text.is_empty()).then_some(text)
}

fn tag_label<D: Document>(doc: &D, node: D::Node, fallback: &str) -> String {
    doc.tag_name(node)
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{HtmlDocument, NodeId};

    fn classifiers() -> Classifiers {
        Classifiers::new(&NavConfig::default()).unwrap()
    }

    fn labels(entries: &[OutlineEntry<NodeId>]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    fn by_id(doc: &HtmlDocument, id: &str) -> NodeId {
        doc.element_by_id(id).unwrap()
    }

    const LONG: &str = "This answer is long enough to count as a real assistant response.";

    #[test]
    fn test_landmark_labels() {
        let doc = HtmlDocument::parse(concat!(
            "<nav aria-label='Primary'>links</nav>",
            "<span id='t1'>Side</span><span id='t2'>bar</span>",
            "<aside aria-labelledby='t1 t2'>extra</aside>",
            "<main>content</main>",
            "<div role='search'>find</div>",
        ));
        let entries = classifiers().landmarks(&doc);
        assert_eq!(labels(&entries), vec!["Primary", "Side bar", "main", "div"]);
    }

    #[test]
    fn test_labelled_by_reads_hidden_text() {
        let doc = HtmlDocument::parse(
            "<span id='lbl' hidden>Secret name</span><section role='region' aria-labelledby='lbl'>x</section>",
        );
        let entries = classifiers().landmarks(&doc);
        assert_eq!(labels(&entries), vec!["Secret name"]);
    }

    #[test]
    fn test_invisible_landmarks_are_skipped() {
        let doc = HtmlDocument::parse("<header hidden>top</header><footer></footer><main>m</main>");
        let entries = classifiers().landmarks(&doc);
        assert_eq!(labels(&entries), vec!["main"]);
    }

    #[test]
    fn test_heading_levels_and_labels() {
        let doc = HtmlDocument::parse(concat!(
            "<h1>Title</h1>",
            "<h3>  Spaced   out  </h3>",
            "<div role='heading' aria-level='2'>Aria two</div>",
            "<div role='heading'>No level</div>",
            "<h2 style='display:none'>Hidden</h2>",
        ));
        let c = classifiers();
        let entries = c.headings(&doc, doc.root());
        assert_eq!(labels(&entries), vec!["Title", "Spaced out", "Aria two", "No level"]);
        let levels: Vec<_> = entries.iter().map(|e| e.level.unwrap().get()).collect();
        assert_eq!(levels, vec![1, 3, 2, 7]);
    }

    #[test]
    fn test_headings_restricted_to_root() {
        let doc = HtmlDocument::parse("<h1>Out</h1><section id='s'><h2>In</h2></section>");
        let entries = classifiers().headings(&doc, by_id(&doc, "s"));
        assert_eq!(labels(&entries), vec!["In"]);
    }

    #[test]
    fn test_topic_label_preference() {
        let doc = HtmlDocument::parse(concat!(
            "<article aria-label='Labelled'>one</article>",
            "<div class='card'><h4>Card title</h4><p>details</p></div>",
            "<li role='listitem'>plain list text</li>",
        ));
        let entries = classifiers().topics(&doc, doc.root());
        assert_eq!(labels(&entries), vec!["Labelled", "Card title", "plain list text"]);
    }

    #[test]
    fn test_topic_label_truncated_to_120_chars() {
        let text = "x".repeat(300);
        let doc = HtmlDocument::parse(&format!("<article>{text}</article>"));
        let entries = classifiers().topics(&doc, doc.root());
        assert_eq!(entries[0].label.chars().count(), 120);
    }

    #[test]
    fn test_topics_deduplicated_by_region() {
        let doc = HtmlDocument::parse(concat!(
            "<article id='a'><div class='card' id='b'>Same region text</div></article>",
            "<div class='card' id='c'>Other card</div>",
        ));
        let entries = classifiers().topics(&doc, doc.root());
        let nodes: Vec<_> = entries.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![by_id(&doc, "a"), by_id(&doc, "c")]);
    }

    #[test]
    fn test_responses_filter_short_and_dedup() {
        let doc = HtmlDocument::parse(&format!(
            concat!(
                "<div data-message-author-role='assistant'>ok</div>",
                "<article id='a'><div data-message-author-role='assistant'>{long}</div></article>",
                "<div data-testid='bot-reply' id='b'><h2>Answer</h2>{long}</div>",
            ),
            long = LONG
        ));
        let entries = classifiers().responses(&doc);
        let nodes: Vec<_> = entries.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![by_id(&doc, "a"), by_id(&doc, "b")]);
        assert_eq!(entries[1].label, "Answer");
        assert_eq!(entries[0].label, LONG);
    }

    #[test]
    fn test_responses_case_insensitive_aria_hint() {
        let doc = HtmlDocument::parse(&format!(
            "<section aria-label='ASSISTANT message'>{LONG}</section>"
        ));
        let entries = classifiers().responses(&doc);
        assert_eq!(labels(&entries), vec!["ASSISTANT message"]);
    }

    #[test]
    fn test_no_matches_is_empty_list() {
        let doc = HtmlDocument::parse("<p>nothing to see</p>");
        let c = classifiers();
        assert!(c.landmarks(&doc).is_empty());
        assert!(c.headings(&doc, doc.root()).is_empty());
        assert!(c.topics(&doc, doc.root()).is_empty());
        assert!(c.responses(&doc).is_empty());
    }

    #[test]
    fn test_custom_selectors() {
        let mut config = NavConfig::default();
        config.classify.topic_selectors = vec![".post".to_string()];
        let c = Classifiers::new(&config).unwrap();

        let doc = HtmlDocument::parse("<article>ignored</article><div class='post'>kept</div>");
        assert_eq!(labels(&c.topics(&doc, doc.root())), vec!["kept"]);
    }

    #[test]
    fn test_bad_selector_in_config_fails() {
        let mut config = NavConfig::default();
        config.classify.heading_selectors = vec!["h1 >>".to_string()];
        assert!(Classifiers::new(&config).is_err());
    }
}
