//! Reading visibility out of `style="..."` attributes.

use cssparser::{
    AtRuleParser, DeclarationParser, ParseError, Parser, ParserInput, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser,
};

/// The parts of an inline style that decide whether an element is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineVisibility {
    pub display_none: bool,
    pub visibility_hidden: bool,
}

impl InlineVisibility {
    /// Parse an inline style declaration block. Unknown properties are ignored.
    pub fn parse(style: &str) -> Self {
        let mut input = ParserInput::new(style);
        let mut parser = Parser::new(&mut input);
        let mut visibility = InlineVisibility::default();
        let mut decl_parser = VisibilityParser {
            visibility: &mut visibility,
        };

        for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
            // Lenient, like browsers.
            let _ = result;
        }
        visibility
    }

    pub fn hides(&self) -> bool {
        self.display_none || self.visibility_hidden
    }
}

struct VisibilityParser<'a> {
    visibility: &'a mut InlineVisibility,
}

impl<'i> DeclarationParser<'i> for VisibilityParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let keyword = input.expect_ident_cloned()?;
        if name.eq_ignore_ascii_case("display") {
            self.visibility.display_none = keyword.eq_ignore_ascii_case("none");
        } else if name.eq_ignore_ascii_case("visibility") {
            self.visibility.visibility_hidden =
                keyword.eq_ignore_ascii_case("hidden") || keyword.eq_ignore_ascii_case("collapse");
        }
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for VisibilityParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for VisibilityParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (), ()> for VisibilityParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_none() {
        let v = InlineVisibility::parse("color: red; display: none");
        assert!(v.display_none);
        assert!(v.hides());
    }

    #[test]
    fn test_visibility_hidden_case_insensitive() {
        assert!(InlineVisibility::parse("VISIBILITY: Hidden").hides());
    }

    #[test]
    fn test_visible_styles() {
        assert!(!InlineVisibility::parse("display: block; visibility: visible").hides());
        assert!(!InlineVisibility::parse("").hides());
        assert!(!InlineVisibility::parse("display: ;").hides());
    }

    #[test]
    fn test_later_declaration_wins() {
        assert!(!InlineVisibility::parse("display: none; display: flex").hides());
    }
}
