//! Structural scanner — keyword dispatch table plus recursive section loop.
//!
//! A single pass over the section text: separators are skipped, the keyword
//! table is tried in registration order (first literal-prefix match wins),
//! and anything else is read as one balanced block and classified as a
//! function or variable declaration. Namespace and class bodies recurse
//! through the same loop with a fresh visibility state.

pub mod decl;

use crate::lex::{self, read_block, read_braces, read_word, split_args, trim};
use crate::model::*;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Separator characters skipped by the section loop.
const SKIP: &str = " \r\n\t;";

/// Base-class entry: `[virtual] [access] [virtual] Name`.
static RE_BASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(virtual\s+)?(?:(public|protected|private)\s+)?(virtual\s+)?(.+)$").unwrap()
});

type Handler = fn(&SyntaxParser, &mut Section, &mut usize, &mut Visibility);

/// One keyword-table entry. The applicability flags are carried for every
/// registration but the scan loop does not consult them; prefix match order
/// alone decides.
struct KeywordParser {
    keyword: &'static str,
    handler: Handler,
    #[allow(dead_code)]
    in_class: bool,
    #[allow(dead_code)]
    in_namespace: bool,
    /// Require a non-identifier character after the keyword before the
    /// entry is accepted. Derived at registration: on for keywords ending
    /// in an identifier character, off for `#`-prefixed ones so that `#if`
    /// also swallows `#ifdef`/`#ifndef`.
    word_boundary: bool,
}

/// The scanner. The keyword table is built once at construction and is
/// read-only afterwards, so one instance can parse any number of files.
pub struct SyntaxParser {
    parsers: Vec<KeywordParser>,
}

impl Default for SyntaxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxParser {
    pub fn new() -> Self {
        let mut parsers: Vec<KeywordParser> = Vec::new();
        let mut add = |keyword: &'static str, handler: Handler, in_class: bool, in_namespace: bool| {
            parsers.push(KeywordParser {
                keyword,
                handler,
                in_class,
                in_namespace,
                word_boundary: needs_word_boundary(keyword),
            });
        };

        // Registration order is the match order. `namespace` is registered
        // twice with differing applicability flags but the same handler;
        // both entries are kept as-is (see DESIGN.md).
        add("namespace", Self::parse_namespace, false, true);
        add("namespace", Self::parse_namespace, true, true);
        add("//", Self::parse_line_comment, true, true);
        add("/*", Self::parse_block_comment, true, true);
        add("#pragma", Self::parse_pragma, false, true);
        add("#include", Self::parse_include, false, true);
        add("#define", Self::parse_define, true, true);
        add("#if", Self::parse_if_macros, true, true);
        add("meta class", Self::parse_meta_class, true, true);
        add("class", Self::parse_class, true, true);
        add("struct", Self::parse_struct, true, true);
        add("template", Self::parse_template, true, true);
        add("typedef", Self::parse_typedef, true, true);
        add("enum", Self::parse_enum, true, true);
        add("using", Self::parse_using, true, true);
        add("public:", Self::parse_public_section, true, false);
        add("private:", Self::parse_private_section, true, false);
        add("protected:", Self::parse_protected_section, true, false);
        add("friend", Self::parse_friend, true, false);
        add("ATTRIBUTE_COMMENT_DEFINITION", Self::parse_attribute_comment_def, true, false);
        add("ATTRIBUTE_SHORT_DEFINITION", Self::parse_attribute_short_def, true, false);
        add("ATTRIBUTES", Self::parse_attributes, true, false);

        SyntaxParser { parsers }
    }

    /// Read and scan a file from disk, capturing its modification time.
    pub fn parse_file(&self, path: &Path) -> Result<SourceFile> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
        Ok(self.parse_source(path, &text, modified))
    }

    /// Scan source text already in memory. Pure: no I/O, deterministic.
    pub fn parse_source(&self, path: &Path, text: &str, modified: Option<std::time::SystemTime>) -> SourceFile {
        let mut root = Section::new(SectionKind::FileRoot);
        self.parse_section(&mut root, text, Visibility::Public);
        SourceFile {
            path: path.to_path_buf(),
            modified,
            text: text.to_string(),
            root,
        }
    }

    /// The recursive core loop over one section's text.
    fn parse_section(&self, section: &mut Section, source: &str, visibility: Visibility) {
        section.text = source.to_string();
        section.length = source.len();

        let mut vis = visibility;
        let mut caret = 0usize;

        while caret < section.text.len() {
            if SKIP.as_bytes().contains(&section.text.as_bytes()[caret]) {
                caret += 1;
                continue;
            }

            let mut handled = false;
            for parser in &self.parsers {
                if keyword_matches(&section.text, caret, parser) {
                    (parser.handler)(self, section, &mut caret, &mut vis);
                    handled = true;
                    break;
                }
            }
            if handled {
                continue;
            }

            let block_begin = caret;
            let block = read_block(&section.text, &mut caret);
            let span = trim(&block, " \r\t\n{}").to_string();

            if span.is_empty() {
                caret += 1;
                continue;
            }

            let line = lex::line_number(&section.text, caret);
            if decl::is_function(&span) {
                let mut func = decl::parse_function(&span, vis, block_begin, caret);
                func.line = line;
                section.functions.push(func);
            } else {
                let mut var = decl::parse_variable(&span, vis, block_begin, caret);
                var.line = line;
                section.variables.push(var);
            }
        }
    }

    // -- Keyword handlers ---------------------------------------------------

    fn parse_namespace(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "namespace".len();

        let name = read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE);
        let block = read_block(&section.text, caret);
        let body = trim(&block, "{} \r\t\n").to_string();

        let full_name = qualify(section.full_name(), &name);
        let mut child = Section::new(SectionKind::Namespace { name, full_name });
        child.begin = begin;
        child.line = lex::line_number(&section.text, begin);

        self.parse_section(&mut child, &body, Visibility::Public);
        section.sections.push(child);
    }

    fn parse_line_comment(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "//".len();

        let bytes_len = section.text.len();
        let mut text = String::new();
        let mut tmp = *caret;
        let mut first = true;

        // Merge consecutive `//` lines (separated only by blanks on the
        // next line) into one comment record.
        loop {
            *caret = tmp;
            if !first {
                *caret += 2;
                text.push('\n');
            }
            let buff = read_word(&section.text, caret, "\n", "");
            text.push_str(trim(&buff, " \r"));

            tmp = *caret + 1;
            while tmp < bytes_len
                && matches!(section.text.as_bytes()[tmp], b' ' | b'\r' | b'\t' | b';')
            {
                tmp += 1;
            }
            first = false;

            if !(tmp + 1 < bytes_len
                && section.text.as_bytes()[tmp] == b'/'
                && section.text.as_bytes()[tmp + 1] == b'/')
            {
                break;
            }
        }
        *caret = tmp.min(bytes_len);

        let line = lex::line_number(&section.text, *caret);
        section.comments.push(Comment {
            text,
            begin,
            length: *caret - begin,
            line,
        });
    }

    fn parse_block_comment(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "/*".len();

        let end = section.text[*caret..]
            .find("*/")
            .map(|p| *caret + p)
            .unwrap_or(section.text.len());
        let text = trim(&section.text[begin + 2..end], " \r\t\n").to_string();
        let line = lex::line_number(&section.text, begin);

        *caret = (end + 2).min(section.text.len());
        section.comments.push(Comment {
            text,
            begin,
            length: *caret - begin,
            line,
        });
    }

    fn parse_pragma(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "#pragma".len();
        read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE);
    }

    fn parse_include(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "#include".len();
        read_word(&section.text, caret, "\n", lex::WHITESPACE);
    }

    fn parse_define(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "#define".len();
        read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE);
        read_word(&section.text, caret, "\n", lex::WHITESPACE);
    }

    /// Skip a `#if`-family conditional region. The skip runs to the first
    /// textual `#endif` — nested regions are not tracked, so an inner
    /// `#endif` terminates the skip early. Known inaccuracy, kept.
    fn parse_if_macros(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "#if".len();

        match section.text[(*caret).min(section.text.len())..].find("#endif") {
            Some(p) => *caret += p + "#endif".len(),
            None => *caret = section.text.len(),
        }
    }

    fn parse_meta_class(&self, section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        let begin = *caret;
        *caret += "meta class".len();
        self.class_or_struct(section, caret, *vis, begin, true, true, None);
    }

    fn parse_class(&self, section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        let begin = *caret;
        *caret += "class".len();
        self.class_or_struct(section, caret, *vis, begin, true, false, None);
    }

    fn parse_struct(&self, section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        let begin = *caret;
        *caret += "struct".len();
        self.class_or_struct(section, caret, *vis, begin, false, false, None);
    }

    #[allow(clippy::too_many_arguments)]
    fn class_or_struct(
        &self,
        section: &mut Section,
        caret: &mut usize,
        vis: Visibility,
        begin: usize,
        is_class: bool,
        is_meta: bool,
        templates: Option<String>,
    ) {
        let name = read_word(&section.text, caret, " \n\t\r:;/", lex::WHITESPACE);
        let after = trim(
            &read_word(&section.text, caret, ";{/", lex::WHITESPACE),
            " :\r\n\t",
        )
        .to_string();

        let mut info = ClassInfo {
            full_name: qualify(section.full_name(), &name),
            name,
            is_class,
            is_meta,
            visibility: vis,
            templates,
            bases: Vec::new(),
            comment_def: None,
            short_def: None,
        };

        if !after.is_empty() {
            for base in split_args(&after, ',') {
                let base = trim(&base, " \r\n\t");
                if let Some(caps) = RE_BASE.captures(base) {
                    let visibility = match caps.get(2).map(|m| m.as_str()) {
                        Some("public") => Visibility::Public,
                        Some("protected") => Visibility::Protected,
                        _ => Visibility::Private,
                    };
                    info.bases.push(BaseClass {
                        name: caps[4].trim().to_string(),
                        visibility,
                        is_virtual: caps.get(1).is_some() || caps.get(3).is_some(),
                    });
                }
            }
        }

        // A trailing comment between the head and the body.
        if *caret < section.text.len() && section.text.as_bytes()[*caret] == b'/' {
            read_word(&section.text, caret, "\n", lex::WHITESPACE);
            read_word(&section.text, caret, ";{/", lex::WHITESPACE);
        }

        // No body means a forward declaration: nothing to record.
        if *caret < section.text.len() && section.text.as_bytes()[*caret] == b'{' {
            let block = read_block(&section.text, caret);
            let body = trim(&block, "{} \n\r\t").to_string();

            let mut child = Section::new(SectionKind::Class(info));
            child.begin = begin;
            child.line = lex::line_number(&section.text, begin);

            self.parse_section(&mut child, &body, Visibility::Public);
            section.sections.push(child);
        }
    }

    fn parse_template(&self, section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        *caret += "template".len();
        let data_len = section.text.len();

        while *caret < data_len && section.text.as_bytes()[*caret] != b'<' {
            *caret += 1;
        }
        if *caret >= data_len {
            return;
        }
        *caret += 1;

        let begin = *caret;
        let mut depth = 1i32;
        while *caret < data_len {
            match section.text.as_bytes()[*caret] {
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            *caret += 1;
        }
        let params = section.text[begin..(*caret).min(data_len)].to_string();

        let mut tmp = *caret + 1;
        let block = read_block(&section.text, &mut tmp);
        let block = trim(&block, " \n\r\t").to_string();

        let search_from = (*caret + 1).min(data_len);

        if block.starts_with("class") {
            if let Some(p) = section.text[search_from..].find("class") {
                let kw_begin = search_from + p;
                *caret = kw_begin + "class".len();
                self.class_or_struct(section, caret, *vis, kw_begin, true, false, Some(params));
            } else {
                *caret = tmp;
            }
        } else if block.starts_with("struct") {
            if let Some(p) = section.text[search_from..].find("struct") {
                let kw_begin = search_from + p;
                *caret = kw_begin + "struct".len();
                self.class_or_struct(section, caret, *vis, kw_begin, false, false, Some(params));
            } else {
                *caret = tmp;
            }
        } else if block.starts_with("meta class") {
            if let Some(p) = section.text[search_from..].find("meta class") {
                let kw_begin = search_from + p;
                *caret = kw_begin + "meta class".len();
                self.class_or_struct(section, caret, *vis, kw_begin, true, true, Some(params));
            } else {
                *caret = tmp;
            }
        } else if block.starts_with("friend") {
            if let Some(p) = section.text[search_from..].find("friend") {
                *caret = search_from + p;
                self.parse_friend(section, caret, vis);
            } else {
                *caret = tmp;
            }
        } else if decl::is_function(&block) {
            let mut func = decl::parse_function(&block, *vis, 0, block.len());
            func.templates = Some(params);
            func.line = lex::line_number(&section.text, *caret);
            section.functions.push(func);
            *caret = tmp;
        } else {
            *caret = tmp;
        }
    }

    fn parse_typedef(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "typedef".len();

        let span = trim(
            &read_word(&section.text, caret, ";", lex::WHITESPACE),
            " \r\n\t",
        )
        .to_string();

        let (target, alias) = match span.rfind(' ') {
            Some(pos) => (
                trim(&span[..pos], " \r\t\n").to_string(),
                trim(&span[pos + 1..], " \r\t\n;").to_string(),
            ),
            None => (String::new(), span.clone()),
        };
        let target = match target.strip_prefix("typename ") {
            Some(rest) => rest.to_string(),
            None => target,
        };

        section.typedefs.push(Typedef {
            alias,
            target,
            begin,
            length: *caret - begin,
            line: lex::line_number(&section.text, *caret),
            text: section.text[begin..(*caret).min(section.text.len())].to_string(),
        });
    }

    fn parse_enum(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "enum".len();

        let mut name = read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE);
        if name == "class" {
            name = read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE);
        }

        let block = read_block(&section.text, caret);
        let body = lex::strip_comments(trim(&block, " {}\r\t\n"));

        let mut entries = Vec::new();
        for piece in split_args(&body, ',') {
            let piece = trim(&piece, " \n\t\r");
            if piece.is_empty() {
                continue;
            }
            match piece.find('=') {
                Some(pos) => entries.push((
                    trim(&piece[..pos], " \n\t\r").to_string(),
                    trim(&piece[pos + 1..], " \n\t\r").to_string(),
                )),
                None => entries.push((piece.to_string(), String::new())),
            }
        }

        section.enums.push(EnumDecl {
            name,
            entries,
            begin,
            length: *caret - begin,
            line: lex::line_number(&section.text, *caret),
            text: section.text[begin..(*caret).min(section.text.len())].to_string(),
        });
    }

    fn parse_using(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "using".len();

        // First word is the `namespace` keyword, second the target.
        read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE);
        let name = trim(
            &read_word(&section.text, caret, lex::WORD_BREAK, lex::WHITESPACE),
            " \r\n;",
        )
        .to_string();

        section.usings.push(UsingNamespace {
            name,
            begin,
            length: *caret - begin,
            line: lex::line_number(&section.text, *caret),
        });
    }

    fn parse_public_section(&self, _section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        *caret += "public:".len();
        *vis = Visibility::Public;
    }

    fn parse_private_section(&self, _section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        *caret += "private:".len();
        *vis = Visibility::Private;
    }

    fn parse_protected_section(&self, _section: &mut Section, caret: &mut usize, vis: &mut Visibility) {
        *caret += "protected:".len();
        *vis = Visibility::Protected;
    }

    fn parse_friend(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "friend".len();
        read_word(&section.text, caret, " \n\r\t", lex::WHITESPACE);
        read_word(&section.text, caret, " \n\r\t", lex::WHITESPACE);
    }

    fn parse_attribute_comment_def(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "ATTRIBUTE_COMMENT_DEFINITION".len();
        self.marker_string_payload(section, caret, true);
    }

    fn parse_attribute_short_def(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        *caret += "ATTRIBUTE_SHORT_DEFINITION".len();
        self.marker_string_payload(section, caret, false);
    }

    /// Capture a quote-delimited marker payload and attach it to the
    /// enclosing class; at non-class scope the payload is discarded.
    fn marker_string_payload(&self, section: &mut Section, caret: &mut usize, comment: bool) {
        let from = (*caret).min(section.text.len());
        let start = match section.text[from..].find('"') {
            Some(p) => from + p + 1,
            None => {
                *caret = next_statement_end(&section.text, from);
                return;
            }
        };
        let end = section.text[start..]
            .find('"')
            .map(|p| start + p)
            .unwrap_or(section.text.len());
        let payload = section.text[start..end].to_string();

        if let SectionKind::Class(info) = &mut section.kind {
            if comment {
                info.comment_def = Some(payload);
            } else {
                info.short_def = Some(payload);
            }
        }

        *caret = next_statement_end(&section.text, end);
    }

    fn parse_attributes(&self, section: &mut Section, caret: &mut usize, _vis: &mut Visibility) {
        let begin = *caret;
        *caret += "ATTRIBUTES".len();

        let braces = trim(&read_braces(&section.text, caret), " \n\r\t()").to_string();
        let attributes: Vec<String> = split_args(&braces, ',')
            .iter()
            .map(|a| trim(a, " \n\r\t,").to_string())
            .filter(|a| !a.is_empty())
            .collect();

        let from = (*caret).min(section.text.len());
        *caret = section.text[from..]
            .find(';')
            .map(|p| from + p)
            .unwrap_or(section.text.len());

        section.attributes.push(AttributeBlock {
            attributes,
            begin,
            length: *caret - begin,
            line: lex::line_number(&section.text, *caret),
        });
    }
}

/// Compose a parent-qualified name; an empty parent omits the separator.
fn qualify(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", parent, name)
    }
}

/// Offset just past the next `;` at or after `from`, or end of text.
fn next_statement_end(text: &str, from: usize) -> usize {
    let from = from.min(text.len());
    text[from..]
        .find(';')
        .map(|p| from + p + 1)
        .unwrap_or(text.len())
}

fn needs_word_boundary(keyword: &str) -> bool {
    !keyword.starts_with('#')
        && keyword
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_ident_byte(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}

fn keyword_matches(text: &str, caret: usize, parser: &KeywordParser) -> bool {
    let bytes = text.as_bytes();
    let keyword = parser.keyword.as_bytes();
    if caret + keyword.len() > bytes.len() {
        return false;
    }
    if &bytes[caret..caret + keyword.len()] != keyword {
        return false;
    }
    if parser.word_boundary {
        match bytes.get(caret + keyword.len()) {
            Some(&c) => !is_ident_byte(c),
            None => true,
        }
    } else {
        true
    }
}
