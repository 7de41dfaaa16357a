//! Maps HTML element names to how they take part in rendering.

/// How an element participates in the text flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Never rendered, together with everything inside it.
    Hidden,
    /// Starts and ends a line of its own.
    Block,
    /// Flows with surrounding text.
    Inline,
}

/// Classify an element by tag name.
pub fn element_flow(tag: &str) -> Flow {
    match tag {
        // Document metadata and inert content
        "head" | "title" | "meta" | "link" | "base" | "script" | "style" | "template"
        | "noscript" => Flow::Hidden,

        // Inline elements
        "a" | "span" | "em" | "i" | "cite" | "var" | "dfn" | "strong" | "b" | "code" | "kbd"
        | "samp" | "tt" | "sup" | "sub" | "u" | "ins" | "s" | "strike" | "del" | "small"
        | "mark" | "abbr" | "time" | "q" | "label" | "output" | "data" | "ruby" | "rt"
        | "rp" | "bdi" | "bdo" | "wbr" | "img" | "button" | "input" | "select"
        | "textarea" => Flow::Inline,

        // Everything else breaks the line: div, p, li, headings, tables, sectioning
        _ => Flow::Block,
    }
}

/// Heading rank of an `h1`..`h6` tag.
pub fn heading_rank(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
