//! Compiled CSS selector lists used as classification criteria.

use cssparser::{Parser, ParserInput};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::arena::{Dom, NodeId};
use super::element_ref::{ElementRef, NavSelectors};
use crate::error::{Error, Result};

/// A comma-separated selector list, e.g. `main, nav, [role="region"]`.
///
/// Attribute selectors support the `i` flag (`[aria-label*="assistant" i]`).
#[derive(Debug, Clone)]
pub struct SelectorSet {
    source: String,
    selectors: Vec<Selector<NavSelectors>>,
}

impl SelectorSet {
    /// Parse a selector list.
    pub fn parse(css: &str) -> Result<Self> {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let list = SelectorList::parse(&NavSelectors, &mut parser, ParseRelative::No).map_err(
            |err| Error::Selector {
                selector: css.to_string(),
                reason: format!("{:?}", err.kind),
            },
        )?;

        Ok(Self {
            source: css.to_string(),
            selectors: list.slice().to_vec(),
        })
    }

    /// Join several selectors into one list.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self> {
        let joined = parts
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() {
            return Ok(Self {
                source: String::new(),
                selectors: Vec::new(),
            });
        }
        Self::parse(&joined)
    }

    /// The selector list as CSS text, for adapters that match natively.
    pub fn as_css(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// True when any selector in the list matches `node`.
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        if !dom.is_element(node) {
            return false;
        }
        let mut caches = SelectorCaches::default();
        self.matches_with_caches(ElementRef::new(dom, node), &mut caches)
    }

    /// All elements strictly below `root` matching the list, in document order.
    pub fn select(&self, dom: &Dom, root: NodeId) -> Vec<NodeId> {
        if self.selectors.is_empty() {
            return Vec::new();
        }
        let mut caches = SelectorCaches::default();
        dom.subtree(root)
            .skip(1)
            .filter(|&id| dom.is_element(id))
            .filter(|&id| self.matches_with_caches(ElementRef::new(dom, id), &mut caches))
            .collect()
    }

    fn matches_with_caches(&self, elem: ElementRef<'_>, caches: &mut SelectorCaches) -> bool {
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        self.selectors.iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }
}
