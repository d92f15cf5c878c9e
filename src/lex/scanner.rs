//! Per-line pair-marker scanner.
//!
//! Produces the open/close events one logical source line contributes to
//! a [`LexPairDiff`](crate::lex::LexPairDiff). Multi-line constructs
//! (heredoc bodies, block comments) must already be normalized by the
//! cleaner; the scanner still recognizes heredoc *openers* so an
//! unterminated heredoc surfaces as a pending open.

use crate::lex::kind::{PairKind, PairToken};

/// Words that open a keyword block regardless of expression position.
const HARD_OPENERS: [(&str, PairKind); 5] = [
    ("def", PairKind::DefEnd),
    ("class", PairKind::ClassEnd),
    ("module", PairKind::ModuleEnd),
    ("begin", PairKind::BeginEnd),
    ("case", PairKind::CaseEnd),
];

/// Words that open a keyword block only in statement position;
/// in trailing (modifier) position they guard the expression before them.
const CONDITIONAL_OPENERS: [(&str, PairKind); 4] = [
    ("if", PairKind::IfEnd),
    ("unless", PairKind::IfEnd),
    ("while", PairKind::DoEnd),
    ("until", PairKind::DoEnd),
];

/// Words after which the next token is back in statement position.
const STATEMENT_INTRODUCERS: [&str; 8] = [
    "then", "do", "else", "elsif", "when", "in", "rescue", "ensure",
];

/// Tokenize one logical line into pair events.
pub fn tokenize(line: &str) -> Vec<PairToken> {
    Scanner::new(line).run()
}

struct Scanner<'a> {
    rest: &'a str,
    tokens: Vec<PairToken>,
    /// Keyword kinds opened earlier on this same line, so an `end` on the
    /// line can name its opener. Cross-line `end`s cannot.
    open_keywords: Vec<PairKind>,
    /// True while the next word would start a new statement.
    statement_start: bool,
    /// A `while`/`until`/`for` was seen on this line, making a later
    /// bare `do` part of the loop header rather than a new block.
    saw_loop_header: bool,
    /// The previous significant character, for `.class`-style guards.
    prev_char: Option<char>,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            rest: line,
            tokens: Vec::new(),
            open_keywords: Vec::new(),
            statement_start: true,
            saw_loop_header: false,
            prev_char: None,
        }
    }

    fn run(mut self) -> Vec<PairToken> {
        while let Some(c) = self.rest.chars().next() {
            match c {
                '#' => break,
                '"' | '\'' | '`' => self.scan_string(c),
                '(' => self.punct(PairToken::open(PairKind::Paren), c, true),
                ')' => self.punct(PairToken::close(PairKind::Paren), c, false),
                '[' => self.punct(PairToken::open(PairKind::Bracket), c, true),
                ']' => self.punct(PairToken::close(PairKind::Bracket), c, false),
                '{' => self.punct(PairToken::open(PairKind::Brace), c, true),
                '}' => self.punct(PairToken::close(PairKind::Brace), c, false),
                '<' if self.heredoc_open() => {}
                c if is_word_start(c) => self.scan_word(),
                c => {
                    self.advance(c.len_utf8());
                    if !c.is_whitespace() {
                        self.statement_start = matches!(c, ';' | '=' | ',' | '|' | '&');
                        self.prev_char = Some(c);
                    }
                }
            }
        }
        self.tokens
    }

    fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
    }

    fn punct(&mut self, token: PairToken, c: char, reopens_statement: bool) {
        self.tokens.push(token);
        self.statement_start = reopens_statement;
        self.prev_char = Some(c);
        self.advance(1);
    }

    /// Consume a quoted string, emitting a balanced pair when terminated
    /// and a lone open when the quote runs off the end of the line.
    fn scan_string(&mut self, quote: char) {
        self.tokens.push(PairToken::open(PairKind::StringLit));
        self.advance(1);
        let mut escaped = false;
        while let Some(c) = self.rest.chars().next() {
            self.advance(c.len_utf8());
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                self.tokens.push(PairToken::close(PairKind::StringLit));
                self.statement_start = false;
                self.prev_char = Some(quote);
                return;
            }
        }
        // Unterminated on this line.
    }

    /// Recognize `<<ID`, `<<-ID`, `<<~ID` and quoted variants. Returns
    /// false for shift expressions like `a << b`.
    fn heredoc_open(&mut self) -> bool {
        let bytes = self.rest.as_bytes();
        if bytes.len() < 3 || bytes[1] != b'<' {
            return false;
        }
        let mut idx = 2;
        if bytes[idx] == b'-' || bytes[idx] == b'~' {
            idx += 1;
        }
        let Some(&first) = bytes.get(idx) else {
            return false;
        };
        let quoted = first == b'\'' || first == b'"';
        if quoted {
            idx += 1;
        }
        match bytes.get(idx) {
            Some(&c) if is_word_start(c as char) => {}
            _ => return false,
        }
        while let Some(&c) = bytes.get(idx) {
            if is_word_continue(c as char) {
                idx += 1;
            } else {
                break;
            }
        }
        if quoted {
            idx += 1; // closing quote of the delimiter
        }
        self.tokens.push(PairToken::open(PairKind::Heredoc));
        self.statement_start = false;
        self.prev_char = Some('<');
        self.advance(idx.min(self.rest.len()));
        true
    }

    fn scan_word(&mut self) {
        let word_len = self
            .rest
            .find(|c: char| !is_word_continue(c))
            .unwrap_or(self.rest.len());
        let word = &self.rest[..word_len];
        let after_dot = matches!(self.prev_char, Some('.') | Some(':'));
        let at_statement = self.statement_start;
        self.advance(word_len);
        self.prev_char = word.chars().last();

        if word == "end" && !after_dot {
            // A bare end cannot name its opener; any keyword kind lands
            // in the same balance group.
            let kind = self.open_keywords.pop().unwrap_or(PairKind::DoEnd);
            self.tokens.push(PairToken::close(kind));
            self.statement_start = false;
            return;
        }

        if !after_dot {
            if let Some(kind) = hard_opener(word) {
                self.open_keyword(kind);
                return;
            }
            if word == "do" {
                if self.saw_loop_header {
                    self.statement_start = true;
                } else {
                    self.open_keyword(PairKind::DoEnd);
                }
                return;
            }
            if word == "for" {
                self.saw_loop_header = true;
                self.open_keyword(PairKind::DoEnd);
                return;
            }
            if let Some(kind) = conditional_opener(word) {
                if matches!(word, "while" | "until") {
                    self.saw_loop_header = true;
                }
                if at_statement {
                    self.open_keyword(kind);
                } else {
                    // Modifier position guards the expression before it.
                    self.statement_start = true;
                }
                return;
            }
        }

        self.statement_start = STATEMENT_INTRODUCERS.contains(&word);
    }

    fn open_keyword(&mut self, kind: PairKind) {
        self.tokens.push(PairToken::open(kind));
        self.open_keywords.push(kind);
        self.statement_start = true;
    }
}

fn hard_opener(word: &str) -> Option<PairKind> {
    HARD_OPENERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, kind)| kind)
}

fn conditional_opener(word: &str) -> Option<PairKind> {
    CONDITIONAL_OPENERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, kind)| kind)
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::diff::LexPairDiff;
    use crate::lex::kind::{Leaning, PairSide};

    fn diff(line: &str) -> LexPairDiff {
        let mut d = LexPairDiff::new_empty();
        for token in tokenize(line) {
            assert!(d.record(token));
        }
        d
    }

    #[test]
    fn def_line_leans_left() {
        assert_eq!(diff("def on_args_add(arguments, argument)").leaning(), Leaning::Left);
    }

    #[test]
    fn bare_end_leans_right() {
        assert_eq!(diff("end").leaning(), Leaning::Right);
        assert_eq!(diff("   end").leaning(), Leaning::Right);
    }

    #[test]
    fn single_line_def_is_balanced() {
        assert!(diff("def foo; 1; end").balanced());
    }

    #[test]
    fn end_on_line_closes_its_own_opener_kind() {
        let tokens = tokenize("def foo; end");
        let close = tokens
            .iter()
            .find(|t| t.side == PairSide::Close)
            .expect("close event");
        assert_eq!(close.kind, PairKind::DefEnd);
    }

    #[test]
    fn modifier_if_is_not_an_opener() {
        assert!(diff("return if arguments.empty?").balanced());
        assert!(diff("x += 1 while x < 3").balanced());
    }

    #[test]
    fn statement_if_is_an_opener() {
        assert_eq!(diff("if arguments.parts.empty?").leaning(), Leaning::Left);
        assert_eq!(diff("x = if cond").leaning(), Leaning::Left);
    }

    #[test]
    fn while_with_do_counts_once() {
        assert_eq!(diff("while x < 3 do").leaning(), Leaning::Left);
    }

    #[test]
    fn block_do_is_an_opener() {
        assert_eq!(diff("items.each do |item|").leaning(), Leaning::Left);
    }

    #[test]
    fn strings_hide_their_contents() {
        assert!(diff("print \"end if def (\"").balanced());
        assert!(diff("name = 'do'").balanced());
    }

    #[test]
    fn unterminated_string_leans_left() {
        assert_eq!(diff("puts \"oops").leaning(), Leaning::Left);
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        assert!(diff(r#"puts "a\"b""#).balanced());
    }

    #[test]
    fn comment_tail_is_ignored() {
        assert!(diff("x = 1 # end end end").balanced());
    }

    #[test]
    fn method_named_class_is_not_an_opener() {
        assert!(diff("puts foo.class").balanced());
        assert!(diff("array.begin").balanced());
    }

    #[test]
    fn heredoc_opener_is_pending() {
        assert_eq!(diff("body = <<~HTML").leaning(), Leaning::Left);
        assert_eq!(diff("body = <<-'EOS'").leaning(), Leaning::Left);
    }

    #[test]
    fn shift_is_not_a_heredoc() {
        assert!(diff("total << part").balanced());
    }

    #[test]
    fn balanced_brackets() {
        assert!(diff("Args.new(parts: [argument])").balanced());
        assert_eq!(diff("h = {").leaning(), Leaning::Left);
    }

    #[test]
    fn else_and_when_are_neutral() {
        assert!(diff("else").balanced());
        assert!(diff("when :foo then bar").balanced());
    }
}
