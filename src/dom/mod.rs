//! HTML tree: parsing, selector matching and the in-memory document adapter.

mod arena;
mod document;
mod element_ref;
mod inline_style;
mod role_map;
mod selector;
mod tree_sink;

pub use arena::{Attribute, Dom, DomNode, NodeData, NodeId};
pub use document::HtmlDocument;
pub use element_ref::{ElementRef, NavSelectors};
pub use inline_style::InlineVisibility;
pub use role_map::{Flow, element_flow, heading_rank};
pub use selector::SelectorSet;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DomSink;

/// Parse an HTML document (or fragment, which gets an implied `html`/`body`).
pub fn parse_html(html: &str) -> Dom {
    let sink = DomSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
