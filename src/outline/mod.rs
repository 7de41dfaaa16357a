//! Category lists extracted from a document.
//!
//! An [`Outline`] holds one ordered, deduplicated list per [`Category`]. It is
//! pure derived state: every rebuild replaces all lists wholesale.

mod classify;
mod cursor;

pub use classify::Classifiers;
pub use cursor::{CursorSet, Direction};

use std::fmt;

use crate::document::Document;

/// The four navigable kinds of item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Landmark,
    Heading,
    Topic,
    Response,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Landmark,
        Category::Heading,
        Category::Topic,
        Category::Response,
    ];

    /// Singular name used in announcements.
    pub fn name(self) -> &'static str {
        match self {
            Category::Landmark => "landmark",
            Category::Heading => "heading",
            Category::Topic => "topic",
            Category::Response => "response",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Category::Landmark => "landmarks",
            Category::Heading => "headings",
            Category::Topic => "topics",
            Category::Response => "responses",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Heading rank. Lower numbers are more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Rank of headings that carry no level; below `h6`.
    pub const UNLEVELED: HeadingLevel = HeadingLevel(7);

    /// A level in `1..=6`.
    pub fn new(level: u8) -> Option<Self> {
        (1..=6).contains(&level).then_some(HeadingLevel(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_leveled(self) -> bool {
        self != Self::UNLEVELED
    }
}

/// One navigable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry<N> {
    pub node: N,
    /// Never empty.
    pub label: String,
    /// Set for headings only.
    pub level: Option<HeadingLevel>,
}

impl<N> OutlineEntry<N> {
    pub fn new(node: N, label: impl Into<String>) -> Self {
        Self {
            node,
            label: label.into(),
            level: None,
        }
    }

    pub fn heading(node: N, label: impl Into<String>, level: HeadingLevel) -> Self {
        Self {
            node,
            label: label.into(),
            level: Some(level),
        }
    }
}

/// The four category lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline<N> {
    lists: [Vec<OutlineEntry<N>>; 4],
}

impl<N> Default for Outline<N> {
    fn default() -> Self {
        Self {
            lists: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        }
    }
}

impl<N: Copy> Outline<N> {
    /// Classify the whole document. Headings and topics are restricted to
    /// `scope` when one is given; landmarks and responses never are.
    pub fn build<D>(doc: &D, classifiers: &Classifiers, scope: Option<N>) -> Self
    where
        D: Document<Node = N>,
    {
        let root = doc.root();
        let mut outline = Self::default();
        outline.lists[Category::Landmark.index()] = classifiers.landmarks(doc);
        outline.lists[Category::Response.index()] = classifiers.responses(doc);
        outline.rescope(doc, classifiers, scope.unwrap_or(root));
        outline
    }

    /// Recompute only the scoped categories against `root`.
    pub fn rescope<D>(&mut self, doc: &D, classifiers: &Classifiers, root: N)
    where
        D: Document<Node = N>,
    {
        self.lists[Category::Heading.index()] = classifiers.headings(doc, root);
        self.lists[Category::Topic.index()] = classifiers.topics(doc, root);
    }

    pub fn list(&self, category: Category) -> &[OutlineEntry<N>] {
        &self.lists[category.index()]
    }

    pub fn len(&self, category: Category) -> usize {
        self.lists[category.index()].len()
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.lists[category.index()].is_empty()
    }

    pub fn get(&self, category: Category, index: usize) -> Option<&OutlineEntry<N>> {
        self.lists[category.index()].get(index)
    }
}
