//! Source cleaning pre-pass.
//!
//! Hides the constructs that would confuse line-by-line lexing while
//! preserving line count and numbering: comment tails are blanked,
//! heredoc bodies and terminators are blanked and marked hidden (the
//! opener token is replaced by an empty string placeholder), and
//! trailing-backslash continuations are joined into their head line.
//!
//! Downstream stages lex and reparse the `sanitized` text; user-facing
//! reports quote the `original` text.

/// One physical source line after cleaning.
#[derive(Debug, Clone)]
pub struct CleanedLine {
    /// Raw line text including its trailing newline.
    pub original: String,
    /// Text the lexer and reference parser see for this line.
    pub sanitized: String,
    /// True for lines folded away entirely (heredoc bodies, heredoc
    /// terminators, continuation tails).
    pub hidden: bool,
}

/// Clean a whole source string into per-line records.
pub fn clean_source(source: &str) -> Vec<CleanedLine> {
    let mut lines: Vec<CleanedLine> = split_keep_newline(source)
        .map(|raw| CleanedLine {
            original: raw.to_string(),
            sanitized: strip_comment(raw),
            hidden: false,
        })
        .collect();

    fold_heredocs(&mut lines);
    join_continuations(&mut lines);
    lines
}

fn split_keep_newline(source: &str) -> impl Iterator<Item = &str> {
    source.split_inclusive('\n')
}

/// Blank a `#` comment tail, leaving string contents alone.
fn strip_comment(line: &str) -> String {
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match in_string {
            Some(quote) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    in_string = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => in_string = Some(c),
                '#' => {
                    let mut kept = line[..idx].to_string();
                    if line.ends_with('\n') {
                        kept.push('\n');
                    }
                    return kept;
                }
                _ => {}
            },
        }
    }
    line.to_string()
}

struct HeredocOpen {
    /// Byte range of the `<<~ID` token within the sanitized line.
    token: std::ops::Range<usize>,
    id: String,
    /// `<<-` / `<<~` terminators may be indented.
    indented: bool,
}

/// Collapse every terminated heredoc: replace the opener token with an
/// empty string placeholder and hide body plus terminator lines.
/// Unterminated heredocs are left in place so the pending open surfaces
/// in the lexical balance.
fn fold_heredocs(lines: &mut [CleanedLine]) {
    let mut idx = 0;
    while idx < lines.len() {
        let openers = heredoc_openers(&lines[idx].sanitized);
        let mut body_start = idx + 1;
        // Rewrite back-to-front so token ranges stay valid.
        let mut replacements: Vec<std::ops::Range<usize>> = Vec::new();
        for opener in &openers {
            let Some(term) = find_terminator(lines, body_start, opener) else {
                continue;
            };
            for body in lines.iter_mut().take(term + 1).skip(body_start) {
                body.sanitized = terminal_newline(&body.original);
                body.hidden = true;
            }
            replacements.push(opener.token.clone());
            body_start = term + 1;
        }
        for range in replacements.into_iter().rev() {
            lines[idx].sanitized.replace_range(range, "\"\"");
        }
        idx = body_start.max(idx + 1);
    }
}

fn terminal_newline(original: &str) -> String {
    if original.ends_with('\n') {
        "\n".to_string()
    } else {
        String::new()
    }
}

fn find_terminator(lines: &[CleanedLine], from: usize, opener: &HeredocOpen) -> Option<usize> {
    lines[from..].iter().position(|line| {
        let text = line.original.trim_end_matches(['\n', '\r']);
        if opener.indented {
            text.trim_start() == opener.id
        } else {
            text == opener.id
        }
    }).map(|offset| from + offset)
}

/// Scan a sanitized line for heredoc opener tokens, skipping strings.
fn heredoc_openers(line: &str) -> Vec<HeredocOpen> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    let mut in_string: Option<u8> = None;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'"' | b'\'' | b'`' => {
                in_string = Some(c);
                i += 1;
            }
            b'<' if bytes.get(i + 1) == Some(&b'<') => {
                if let Some((open, next)) = parse_heredoc_token(line, i) {
                    found.push(open);
                    i = next;
                } else {
                    i += 2;
                }
            }
            _ => i += 1,
        }
    }
    found
}

/// Parse one `<<ID` / `<<-ID` / `<<~ID` token (quoted delimiters
/// allowed) starting at `start`. Returns the opener and the scan resume
/// offset, or `None` for a shift expression.
fn parse_heredoc_token(line: &str, start: usize) -> Option<(HeredocOpen, usize)> {
    let bytes = line.as_bytes();
    let mut idx = start + 2;
    let mut indented = false;
    if matches!(bytes.get(idx), Some(b'-') | Some(b'~')) {
        indented = true;
        idx += 1;
    }
    let quote = match bytes.get(idx) {
        Some(&q @ (b'\'' | b'"')) => {
            idx += 1;
            Some(q)
        }
        _ => None,
    };
    let id_start = idx;
    match bytes.get(idx) {
        Some(&c) if (c as char).is_ascii_alphabetic() || c == b'_' => {}
        _ => return None,
    }
    while let Some(&c) = bytes.get(idx) {
        if (c as char).is_ascii_alphanumeric() || c == b'_' {
            idx += 1;
        } else {
            break;
        }
    }
    let id = line[id_start..idx].to_string();
    if let Some(q) = quote {
        if bytes.get(idx) != Some(&q) {
            return None;
        }
        idx += 1;
    }
    Some((
        HeredocOpen {
            token: start..idx,
            id,
            indented,
        },
        idx,
    ))
}

/// Join `line \`-continued lines into their head line's sanitized text;
/// the tail lines become hidden blanks.
fn join_continuations(lines: &mut [CleanedLine]) {
    let mut idx = 0;
    while idx < lines.len() {
        let mut tail = idx + 1;
        while continues(&lines[idx]) && tail < lines.len() {
            let tail_sanitized = std::mem::take(&mut lines[tail].sanitized);
            lines[tail].sanitized = terminal_newline(&lines[tail].original);
            lines[tail].hidden = true;

            let head = &mut lines[idx].sanitized;
            let trimmed = head.trim_end_matches(['\n', '\r']).trim_end_matches('\\');
            let mut joined = trimmed.to_string();
            joined.push_str(tail_sanitized.trim_start());
            *head = joined;
            tail += 1;
        }
        idx = tail;
    }
}

fn continues(line: &CleanedLine) -> bool {
    !line.hidden && continues_text(&line.sanitized)
}

fn continues_text(text: &str) -> bool {
    text.trim_end_matches(['\n', '\r']).ends_with('\\')
}
