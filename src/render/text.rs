//! Text renderer — a human-readable outline of the declaration tree.
//!
//! One declaration per line, indented by scope depth. Line numbers are shown
//! 1-based, the way editors display them.

use crate::model::*;
use crate::render::Renderer;

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, file: &SourceFile) -> String {
        let mut out = String::new();
        out.push_str(&format!("file {}\n", file.path.display()));
        render_section(&mut out, &file.root, 0);
        out
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_section(out: &mut String, section: &Section, depth: usize) {
    for using in &section.usings {
        indent(out, depth);
        out.push_str(&format!("using namespace {}\n", using.name));
    }

    for attrs in &section.attributes {
        indent(out, depth);
        out.push_str(&format!("attributes: {}\n", attrs.attributes.join(", ")));
    }

    for e in &section.enums {
        indent(out, depth);
        out.push_str(&format!("enum {}: {}\n", e.name, format_entries(&e.entries)));
    }

    for td in &section.typedefs {
        indent(out, depth);
        out.push_str(&format!("typedef {} = {}\n", td.alias, td.target));
    }

    for var in &section.variables {
        indent(out, depth);
        out.push_str(&format!("{}\n", format_variable(var)));
    }

    for func in &section.functions {
        indent(out, depth);
        out.push_str(&format!("{}\n", format_function(func)));
    }

    for child in &section.sections {
        indent(out, depth);
        match &child.kind {
            SectionKind::FileRoot => {}
            SectionKind::Namespace { full_name, .. } => {
                out.push_str(&format!("namespace {} (line {})\n", full_name, child.line + 1));
            }
            SectionKind::Class(info) => {
                out.push_str(&format!("{} (line {})\n", format_class_head(info), child.line + 1));
                if info.short_def.is_some() || info.comment_def.is_some() {
                    indent(out, depth + 1);
                    if let Some(short) = &info.short_def {
                        out.push_str(&format!("[{}] ", short));
                    }
                    out.push_str(info.comment_def.as_deref().unwrap_or(""));
                    out.push('\n');
                }
            }
        }
        render_section(out, child, depth + 1);
    }
}

fn format_class_head(info: &ClassInfo) -> String {
    let mut head = String::new();
    if let Some(params) = &info.templates {
        head.push_str(&format!("template<{}> ", params));
    }
    head.push_str(match (info.is_meta, info.is_class) {
        (true, _) => "meta class",
        (false, true) => "class",
        (false, false) => "struct",
    });
    head.push(' ');
    head.push_str(&info.full_name);

    if !info.bases.is_empty() {
        let bases: Vec<String> = info
            .bases
            .iter()
            .map(|b| {
                let mut s = String::new();
                if b.is_virtual {
                    s.push_str("virtual ");
                }
                s.push_str(b.visibility.as_str());
                s.push(' ');
                s.push_str(&b.name);
                s
            })
            .collect();
        head.push_str(&format!(" : {}", bases.join(", ")));
    }
    head
}

fn format_entries(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                name.clone()
            } else {
                format!("{} = {}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_variable(var: &Variable) -> String {
    let mut s = String::new();
    if var.is_static {
        s.push_str("static ");
    }
    if var.var_type.is_const {
        s.push_str("const ");
    }
    s.push_str(&format!(
        "{} {} ({})",
        var.var_type.name,
        var.name,
        var.visibility.as_str()
    ));
    s
}

fn format_function(func: &Function) -> String {
    let mut s = String::new();
    if let Some(params) = &func.templates {
        s.push_str(&format!("template<{}> ", params));
    }
    if func.is_static {
        s.push_str("static ");
    }
    if func.is_virtual {
        s.push_str("virtual ");
    }
    if func.return_type.is_const {
        s.push_str("const ");
    }
    let params: Vec<String> = func
        .parameters
        .iter()
        .map(|p| {
            if p.name.is_empty() {
                p.var_type.name.clone()
            } else {
                format!("{} {}", p.var_type.name, p.name)
            }
        })
        .collect();
    s.push_str(&format!(
        "{} {}({})",
        func.return_type.name,
        func.name,
        params.join(", ")
    ));
    if func.is_const {
        s.push_str(" const");
    }
    s.push_str(&format!(" ({})", func.visibility.as_str()));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxParser;
    use std::path::Path;

    fn render(text: &str) -> String {
        let file = SyntaxParser::new().parse_source(Path::new("test.h"), text, None);
        TextRenderer.render(&file)
    }

    #[test]
    fn outline_shows_scopes_and_members() {
        let out = render(
            "namespace ui {\nclass Widget : public Object {\npublic:\nvirtual void Draw();\nprivate:\nString mName;\n};\n}",
        );
        assert!(out.starts_with("file test.h\n"));
        assert!(out.contains("namespace ui (line 1)"));
        // Nested lines are relative to the enclosing scope's body text.
        assert!(out.contains("class ui::Widget : public Object (line 1)"));
        assert!(out.contains("virtual void Draw() (public)"));
        assert!(out.contains("String mName (private)"));
    }

    #[test]
    fn enum_and_typedef_lines() {
        let out = render("enum class State { Idle, Hovered = 2 };\ntypedef Vector<int> Ints;");
        assert!(out.contains("enum State: Idle, Hovered = 2"));
        assert!(out.contains("typedef Ints = Vector<int>"));
    }

    #[test]
    fn const_method_marker() {
        let out = render("class A { int Depth() const; };");
        assert!(out.contains("int Depth() const (public)"));
    }
}
