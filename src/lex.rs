//! Cursor-based lexical primitives.
//!
//! All routines are nesting-aware (curly, paren, square, angle) and, where a
//! balanced span is read, string-literal-aware. None of them panic: every
//! loop is bounded by the text length and an unterminated construct simply
//! extends to the end of the input.

/// Default word break set: structural punctuation at zero nesting depth.
pub const WORD_BREAK: &str = " \n\r(){}.,;+-*/=@!|&:~\\";

/// Default skip set for leading separators.
pub const WHITESPACE: &str = " \n\r";

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn in_set(set: &str, c: u8) -> bool {
    set.as_bytes().contains(&c)
}

/// Read a word: skip leading `skips`, then accumulate until a `breaks`
/// character is seen while all four nesting depths are zero. Break
/// characters nested inside `(...)`, `[...]`, `<...>` or `{...}` are
/// absorbed into the word. The caret is left on the break character.
pub fn read_word(text: &str, caret: &mut usize, breaks: &str, skips: &str) -> String {
    let b = text.as_bytes();
    let len = b.len();
    if *caret > len {
        *caret = len;
    }

    while *caret < len && in_set(skips, b[*caret]) {
        *caret += 1;
    }

    let begin = *caret;
    let (mut parens, mut squares, mut angles, mut curlies) = (0i32, 0i32, 0i32, 0i32);

    while *caret < len {
        let c = b[*caret];
        if curlies == 0 && parens == 0 && squares == 0 && angles == 0 && in_set(breaks, c) {
            break;
        }
        match c {
            b'{' => curlies += 1,
            b'}' => curlies -= 1,
            b'(' => parens += 1,
            b')' => parens -= 1,
            b'[' => squares += 1,
            b']' => squares -= 1,
            b'<' => angles += 1,
            b'>' => angles -= 1,
            _ => {}
        }
        *caret += 1;
    }

    lossy(&b[begin..*caret])
}

/// Read a balanced `{...}` block starting at or after the caret.
///
/// If a `;` is found before any `{`, the statement span up to the `;` is
/// returned and the caret is left on the `;`. Otherwise the span from the
/// caret through the matching `}` is returned — the close only counts when
/// all four nesting counters are zero outside a string literal.
pub fn read_block(text: &str, caret: &mut usize) -> String {
    let b = text.as_bytes();
    let len = b.len();
    if *caret > len {
        *caret = len;
    }
    let begin = *caret;

    while *caret < len {
        if b[*caret] == b'{' {
            break;
        }
        if b[*caret] == b';' {
            return lossy(&b[begin..*caret]);
        }
        *caret += 1;
    }
    if *caret >= len {
        return lossy(&b[begin..len]);
    }

    *caret += 1;
    let (mut curlies, mut parens, mut squares, mut angles) = (1i32, 0i32, 0i32, 0i32);
    let mut in_string = false;
    let mut complete = false;

    while *caret < len && !complete {
        let c = b[*caret];
        if in_string {
            if c == b'"' && b[*caret - 1] != b'\\' {
                in_string = false;
            }
            *caret += 1;
            continue;
        }
        match c {
            b'{' => curlies += 1,
            b'}' => {
                curlies -= 1;
                if curlies == 0 && parens == 0 && squares == 0 && angles == 0 {
                    complete = true;
                }
            }
            b'(' => parens += 1,
            b')' => parens -= 1,
            b'[' => squares += 1,
            b']' => squares -= 1,
            b'<' => angles += 1,
            b'>' => angles -= 1,
            b'"' => in_string = true,
            _ => {}
        }
        *caret += 1;
    }

    lossy(&b[begin..(*caret).min(len)])
}

/// Read a balanced `(...)` span, the `(`/`)` counterpart of [`read_block`].
/// One leading `(` and one trailing `)` are stripped from the result.
pub fn read_braces(text: &str, caret: &mut usize) -> String {
    let b = text.as_bytes();
    let len = b.len();
    if *caret > len {
        *caret = len;
    }
    let begin = *caret;

    while *caret < len {
        if b[*caret] == b'(' {
            break;
        }
        if b[*caret] == b';' {
            return lossy(&b[begin..*caret]);
        }
        *caret += 1;
    }
    if *caret >= len {
        return lossy(&b[begin..len]);
    }

    *caret += 1;
    let (mut parens, mut curlies, mut squares, mut angles) = (1i32, 0i32, 0i32, 0i32);
    let mut in_string = false;
    let mut complete = false;

    while *caret < len && !complete {
        let c = b[*caret];
        if in_string {
            if c == b'"' && b[*caret - 1] != b'\\' {
                in_string = false;
            }
            *caret += 1;
            continue;
        }
        match c {
            b'{' => curlies += 1,
            b'}' => curlies -= 1,
            b'[' => squares += 1,
            b']' => squares -= 1,
            b'<' => angles += 1,
            b'>' => angles -= 1,
            b'(' => parens += 1,
            b')' => {
                parens -= 1;
                if curlies == 0 && parens == 0 && squares == 0 && angles == 0 {
                    complete = true;
                }
            }
            b'"' => in_string = true,
            _ => {}
        }
        *caret += 1;
    }

    let mut res: &[u8] = &b[begin..(*caret).min(len)];
    if let Some((&b')', rest)) = res.split_last() {
        res = rest;
    }
    if let Some((&b'(', rest)) = res.split_first() {
        res = rest;
    }
    lossy(res)
}

/// First character at or after `pos` that is not in `skips`; `'\0'` if none.
pub fn next_symbol(text: &str, pos: usize, skips: &str) -> char {
    let b = text.as_bytes();
    let mut i = pos.min(b.len());
    while i < b.len() {
        if !in_set(skips, b[i]) {
            return b[i] as char;
        }
        i += 1;
    }
    '\0'
}

/// Split on `delim`, but only where all four nesting counters are zero, so
/// commas inside template argument or parameter lists do not split.
pub fn split_args(text: &str, delim: char) -> Vec<String> {
    let b = text.as_bytes();
    let d = delim as u8;
    let (mut parens, mut squares, mut angles, mut curlies) = (0i32, 0i32, 0i32, 0i32);
    let mut pieces = Vec::new();
    let mut last = 0;

    for (i, &c) in b.iter().enumerate() {
        match c {
            b'{' => curlies += 1,
            b'}' => curlies -= 1,
            b'(' => parens += 1,
            b')' => parens -= 1,
            b'<' => angles += 1,
            b'>' => angles -= 1,
            b'[' => squares += 1,
            b']' => squares -= 1,
            _ => {}
        }
        if c == d && parens == 0 && squares == 0 && angles == 0 && curlies == 0 {
            pieces.push(lossy(&b[last..i]));
            last = i + 1;
        }
    }
    pieces.push(lossy(&b[last..]));
    pieces
}

/// Remove `//`-to-end-of-line and `/*...*/` runs.
pub fn strip_comments(text: &str) -> String {
    let b = text.as_bytes();
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    while i < b.len() {
        if b[i] == b'/' && i + 1 < b.len() && b[i + 1] == b'/' {
            while i < b.len() && b[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if b[i] == b'/' && i + 1 < b.len() && b[i + 1] == b'*' {
            i += 2;
            while i < b.len() && !(b[i - 1] == b'*' && b[i] == b'/') {
                i += 1;
            }
            i += 1;
            continue;
        }
        out.push(b[i]);
        i += 1;
    }
    lossy(&out)
}

/// Trim any of `chars` from both ends.
pub fn trim<'a>(s: &'a str, chars: &str) -> &'a str {
    s.trim_matches(|c: char| chars.contains(c))
}

/// Zero-based line number of the byte offset `caret` within `text`.
pub fn line_number(text: &str, caret: usize) -> usize {
    let end = caret.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&c| c == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_stops_at_break() {
        let mut caret = 0;
        let w = read_word("int x;", &mut caret, WORD_BREAK, WHITESPACE);
        assert_eq!(w, "int");
        assert_eq!(caret, 3);
    }

    #[test]
    fn word_skips_leading_whitespace() {
        let mut caret = 0;
        let w = read_word("  \n  Widget ", &mut caret, WORD_BREAK, WHITESPACE);
        assert_eq!(w, "Widget");
    }

    #[test]
    fn word_absorbs_nested_breaks() {
        // The comma and spaces inside <...> must not terminate the word.
        let mut caret = 0;
        let w = read_word("Map<int, float> rest", &mut caret, " \n\r", WHITESPACE);
        assert_eq!(w, "Map<int, float>");
    }

    #[test]
    fn block_returns_statement_before_brace() {
        let mut caret = 0;
        let span = read_block("int x = 1; { body }", &mut caret);
        assert_eq!(span, "int x = 1");
        // Caret left on the ';' for the caller's separator skipping.
        assert_eq!(&"int x = 1; { body }"[caret..caret + 1], ";");
    }

    #[test]
    fn block_matches_nested_braces() {
        let mut caret = 0;
        let text = "{ a { b } c } tail";
        let span = read_block(text, &mut caret);
        assert_eq!(span, "{ a { b } c }");
    }

    #[test]
    fn block_ignores_braces_in_string_literals() {
        let mut caret = 0;
        let text = r#"{ s = "}}{"; x = 1; } tail"#;
        let span = read_block(text, &mut caret);
        assert_eq!(span, r#"{ s = "}}{"; x = 1; }"#);
    }

    #[test]
    fn block_honors_escaped_quote() {
        let mut caret = 0;
        let text = r#"{ s = "a\"}"; } tail"#;
        let span = read_block(text, &mut caret);
        assert_eq!(span, r#"{ s = "a\"}"; }"#);
    }

    #[test]
    fn unterminated_block_extends_to_end() {
        let mut caret = 0;
        let text = "{ never closed";
        let span = read_block(text, &mut caret);
        assert_eq!(span, text);
        assert_eq!(caret, text.len());
    }

    #[test]
    fn braces_strip_outer_parens() {
        let mut caret = 0;
        let inner = read_braces("(int a, float b) const", &mut caret);
        assert_eq!(inner, "int a, float b");
    }

    #[test]
    fn braces_keep_nested_parens() {
        let mut caret = 0;
        let inner = read_braces("(f(a), g(b)) rest", &mut caret);
        assert_eq!(inner, "f(a), g(b)");
    }

    #[test]
    fn braces_stop_at_semicolon_without_parens() {
        let mut caret = 0;
        let inner = read_braces("no parens here; (later)", &mut caret);
        assert_eq!(inner, "no parens here");
    }

    #[test]
    fn next_symbol_skips_and_reports() {
        assert_eq!(next_symbol("  \n\t x", 0, " \n\r\t"), 'x');
        assert_eq!(next_symbol("   ", 0, " \n\r\t"), '\0');
    }

    #[test]
    fn split_ignores_nested_delimiters() {
        let pieces = split_args("Map<int, float> a, Func(b, c) d, e", ',');
        assert_eq!(
            pieces,
            vec!["Map<int, float> a", " Func(b, c) d", " e"]
        );
    }

    #[test]
    fn strip_comments_removes_both_styles() {
        let out = strip_comments("A, // note\nB = 2, /* gap */ C");
        assert_eq!(out, "A, \nB = 2,  C");
    }

    #[test]
    fn line_number_counts_newlines() {
        let text = "a\nb\nc";
        assert_eq!(line_number(text, 0), 0);
        assert_eq!(line_number(text, 3), 1);
        assert_eq!(line_number(text, text.len()), 2);
        // Clamped past the end.
        assert_eq!(line_number(text, 100), 2);
    }
}
