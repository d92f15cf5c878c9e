use tree_sitter::{Parser, Tree};

use crate::parse::errors::ParserError;

/// Tree-sitter parser wrapper for Ruby source code.
pub struct RubyParser {
    parser: Parser,
}

impl RubyParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        let ts_lang: tree_sitter::Language = tree_sitter_ruby::LANGUAGE.into();
        parser
            .set_language(&ts_lang)
            .map_err(|_| ParserError::LanguageSet)?;
        Ok(Self { parser })
    }

    /// Parse source text into a tree-sitter tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParserError> {
        self.parser
            .parse(source, None)
            .ok_or(ParserError::ParseFailed)
    }

    /// Parse source text and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, ParserError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// True when the tree contains any ERROR or missing nodes.
    pub fn has_errors(&self) -> bool {
        has_error_nodes(self.tree.root_node())
    }

    /// All ERROR nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }
}

/// Location of an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

fn has_error_nodes(node: tree_sitter::Node<'_>) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }
    if !node.has_error() {
        return false;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_error_nodes(child) {
            return true;
        }
    }
    false
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ruby() {
        let mut parser = RubyParser::new().unwrap();
        let parsed = parser
            .parse_with_source("def foo\n  1 + 1\nend\n")
            .unwrap();
        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "program");
    }

    #[test]
    fn parse_unterminated_def() {
        let mut parser = RubyParser::new().unwrap();
        let parsed = parser.parse_with_source("def foo\n  1 + 1\n").unwrap();
        assert!(parsed.has_errors());
    }

    #[test]
    fn parse_stray_end() {
        let mut parser = RubyParser::new().unwrap();
        let parsed = parser.parse_with_source("puts 1\nend\n").unwrap();
        assert!(parsed.has_errors());
        assert!(!parsed.error_nodes().is_empty());
    }
}
