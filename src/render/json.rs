//! JSON renderer — structured output for the downstream code generator.
//!
//! Serializes the declaration tree directly; the section hierarchy is
//! emitted recursively with the same shape at every level.

use crate::model::*;
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, file: &SourceFile) -> String {
        let mut out = String::new();
        out.push_str("{\n");
        out.push_str(&format!(
            "  \"file\": \"{}\",\n",
            json_escape(&file.path.display().to_string())
        ));
        out.push_str("  \"root\": ");
        write_section(&mut out, &file.root, 1);
        out.push('\n');
        out.push_str("}\n");
        out
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn pad(depth: usize) -> String {
    "  ".repeat(depth)
}

fn write_section(out: &mut String, section: &Section, depth: usize) {
    let p = pad(depth);
    let pi = pad(depth + 1);
    out.push_str("{\n");

    match &section.kind {
        SectionKind::FileRoot => {
            out.push_str(&format!("{}\"kind\": \"file\",\n", pi));
        }
        SectionKind::Namespace { name, full_name } => {
            out.push_str(&format!("{}\"kind\": \"namespace\",\n", pi));
            out.push_str(&format!("{}\"name\": \"{}\",\n", pi, json_escape(name)));
            out.push_str(&format!(
                "{}\"full_name\": \"{}\",\n",
                pi,
                json_escape(full_name)
            ));
        }
        SectionKind::Class(info) => {
            let kind = if !info.is_class { "struct" } else { "class" };
            out.push_str(&format!("{}\"kind\": \"{}\",\n", pi, kind));
            out.push_str(&format!("{}\"name\": \"{}\",\n", pi, json_escape(&info.name)));
            out.push_str(&format!(
                "{}\"full_name\": \"{}\",\n",
                pi,
                json_escape(&info.full_name)
            ));
            if info.is_meta {
                out.push_str(&format!("{}\"meta\": true,\n", pi));
            }
            out.push_str(&format!(
                "{}\"visibility\": \"{}\",\n",
                pi,
                info.visibility.as_str()
            ));
            if let Some(params) = &info.templates {
                out.push_str(&format!(
                    "{}\"templates\": \"{}\",\n",
                    pi,
                    json_escape(params)
                ));
            }
            if let Some(short) = &info.short_def {
                out.push_str(&format!(
                    "{}\"short_definition\": \"{}\",\n",
                    pi,
                    json_escape(short)
                ));
            }
            if let Some(comment) = &info.comment_def {
                out.push_str(&format!(
                    "{}\"comment_definition\": \"{}\",\n",
                    pi,
                    json_escape(comment)
                ));
            }
            if !info.bases.is_empty() {
                out.push_str(&format!("{}\"bases\": [\n", pi));
                for (i, base) in info.bases.iter().enumerate() {
                    let comma = if i < info.bases.len() - 1 { "," } else { "" };
                    out.push_str(&format!(
                        "{}  {{ \"name\": \"{}\", \"visibility\": \"{}\", \"virtual\": {} }}{}\n",
                        pi,
                        json_escape(&base.name),
                        base.visibility.as_str(),
                        base.is_virtual,
                        comma
                    ));
                }
                out.push_str(&format!("{}],\n", pi));
            }
        }
    }
    out.push_str(&format!("{}\"line\": {},\n", pi, section.line + 1));

    if !section.usings.is_empty() {
        out.push_str(&format!("{}\"usings\": [", pi));
        for (i, using) in section.usings.iter().enumerate() {
            let comma = if i < section.usings.len() - 1 { ", " } else { "" };
            out.push_str(&format!("\"{}\"{}", json_escape(&using.name), comma));
        }
        out.push_str("],\n");
    }

    if !section.attributes.is_empty() {
        out.push_str(&format!("{}\"attributes\": [", pi));
        let all: Vec<String> = section
            .attributes
            .iter()
            .flat_map(|a| a.attributes.iter())
            .map(|a| format!("\"{}\"", json_escape(a)))
            .collect();
        out.push_str(&all.join(", "));
        out.push_str("],\n");
    }

    if !section.comments.is_empty() {
        out.push_str(&format!("{}\"comments\": [\n", pi));
        for (i, c) in section.comments.iter().enumerate() {
            let comma = if i < section.comments.len() - 1 { "," } else { "" };
            out.push_str(&format!(
                "{}  {{ \"text\": \"{}\", \"line\": {}, \"span\": [{}, {}] }}{}\n",
                pi,
                json_escape(&c.text),
                c.line + 1,
                c.begin,
                c.length,
                comma
            ));
        }
        out.push_str(&format!("{}],\n", pi));
    }

    if !section.enums.is_empty() {
        out.push_str(&format!("{}\"enums\": [\n", pi));
        for (i, e) in section.enums.iter().enumerate() {
            write_enum(out, e, depth + 2);
            out.push_str(if i < section.enums.len() - 1 { ",\n" } else { "\n" });
        }
        out.push_str(&format!("{}],\n", pi));
    }

    if !section.typedefs.is_empty() {
        out.push_str(&format!("{}\"typedefs\": [\n", pi));
        for (i, td) in section.typedefs.iter().enumerate() {
            let comma = if i < section.typedefs.len() - 1 { "," } else { "" };
            out.push_str(&format!(
                "{}  {{ \"alias\": \"{}\", \"target\": \"{}\", \"line\": {}, \"span\": [{}, {}] }}{}\n",
                pi,
                json_escape(&td.alias),
                json_escape(&td.target),
                td.line + 1,
                td.begin,
                td.length,
                comma
            ));
        }
        out.push_str(&format!("{}],\n", pi));
    }

    if !section.variables.is_empty() {
        out.push_str(&format!("{}\"variables\": [\n", pi));
        for (i, var) in section.variables.iter().enumerate() {
            write_variable(out, var, depth + 2, true);
            out.push_str(if i < section.variables.len() - 1 { ",\n" } else { "\n" });
        }
        out.push_str(&format!("{}],\n", pi));
    }

    if !section.functions.is_empty() {
        out.push_str(&format!("{}\"functions\": [\n", pi));
        for (i, func) in section.functions.iter().enumerate() {
            write_function(out, func, depth + 2);
            out.push_str(if i < section.functions.len() - 1 { ",\n" } else { "\n" });
        }
        out.push_str(&format!("{}],\n", pi));
    }

    if !section.sections.is_empty() {
        out.push_str(&format!("{}\"sections\": [\n", pi));
        for (i, child) in section.sections.iter().enumerate() {
            out.push_str(&pad(depth + 2));
            write_section(out, child, depth + 2);
            out.push_str(if i < section.sections.len() - 1 { ",\n" } else { "\n" });
        }
        out.push_str(&format!("{}],\n", pi));
    }

    // Remove trailing comma from last field, touching only the tail.
    while out.ends_with([',', '\n', ' ']) {
        out.pop();
    }
    out.push('\n');
    out.push_str(&format!("{}}}", p));
}

fn write_enum(out: &mut String, e: &EnumDecl, depth: usize) {
    let p = pad(depth);
    out.push_str(&format!("{}{{ \"name\": \"{}\", \"entries\": [", p, json_escape(&e.name)));
    for (i, (name, value)) in e.entries.iter().enumerate() {
        let comma = if i < e.entries.len() - 1 { ", " } else { "" };
        if value.is_empty() {
            out.push_str(&format!("{{ \"name\": \"{}\" }}{}", json_escape(name), comma));
        } else {
            out.push_str(&format!(
                "{{ \"name\": \"{}\", \"value\": \"{}\" }}{}",
                json_escape(name),
                json_escape(value),
                comma
            ));
        }
    }
    out.push_str(&format!(
        "], \"line\": {}, \"span\": [{}, {}] }}",
        e.line + 1,
        e.begin,
        e.length
    ));
}

fn write_type(type_ref: &TypeRef) -> String {
    let mut s = format!("\"type\": \"{}\"", json_escape(&type_ref.name));
    if type_ref.is_const {
        s.push_str(", \"const\": true");
    }
    if type_ref.is_pointer {
        s.push_str(", \"pointer\": true");
    }
    if type_ref.is_reference {
        s.push_str(", \"reference\": true");
    }
    s
}

fn write_variable(out: &mut String, var: &Variable, depth: usize, with_meta: bool) {
    let p = pad(depth);
    out.push_str(&format!(
        "{}{{ \"name\": \"{}\", {}",
        p,
        json_escape(&var.name),
        write_type(&var.var_type)
    ));
    if var.is_static {
        out.push_str(", \"static\": true");
    }
    if with_meta {
        out.push_str(&format!(
            ", \"visibility\": \"{}\", \"line\": {}, \"span\": [{}, {}]",
            var.visibility.as_str(),
            var.line + 1,
            var.begin,
            var.length
        ));
    }
    out.push_str(" }");
}

fn write_function(out: &mut String, func: &Function, depth: usize) {
    let p = pad(depth);
    let pi = pad(depth + 1);
    out.push_str(&format!("{}{{\n", p));
    out.push_str(&format!("{}\"name\": \"{}\",\n", pi, json_escape(&func.name)));
    out.push_str(&format!("{}\"returns\": {{ {} }},\n", pi, write_type(&func.return_type)));

    if func.is_static {
        out.push_str(&format!("{}\"static\": true,\n", pi));
    }
    if func.is_virtual {
        out.push_str(&format!("{}\"virtual\": true,\n", pi));
    }
    if func.is_const {
        out.push_str(&format!("{}\"const\": true,\n", pi));
    }
    if let Some(params) = &func.templates {
        out.push_str(&format!("{}\"templates\": \"{}\",\n", pi, json_escape(params)));
    }

    if !func.parameters.is_empty() {
        out.push_str(&format!("{}\"parameters\": [\n", pi));
        for (i, param) in func.parameters.iter().enumerate() {
            write_variable(out, param, depth + 2, false);
            out.push_str(if i < func.parameters.len() - 1 { ",\n" } else { "\n" });
        }
        out.push_str(&format!("{}],\n", pi));
    }

    out.push_str(&format!(
        "{}\"visibility\": \"{}\",\n",
        pi,
        func.visibility.as_str()
    ));
    out.push_str(&format!("{}\"line\": {},\n", pi, func.line + 1));
    out.push_str(&format!(
        "{}\"span\": [{}, {}]\n",
        pi, func.begin, func.length
    ));
    out.push_str(&format!("{}}}", p));
}

fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxParser;
    use std::path::Path;

    fn render(text: &str) -> String {
        let file = SyntaxParser::new().parse_source(Path::new("test.h"), text, None);
        JsonRenderer.render(&file)
    }

    #[test]
    fn tree_shape() {
        let out = render("namespace ui { class Widget : public Object { public: int x; }; }");
        assert!(out.contains("\"kind\": \"namespace\""));
        assert!(out.contains("\"full_name\": \"ui::Widget\""));
        assert!(out.contains("\"bases\": ["));
        assert!(out.contains("\"visibility\": \"public\""));
    }

    #[test]
    fn escapes_backslashes_in_payloads() {
        let out = render("class A {\nATTRIBUTE_COMMENT_DEFINITION(\"a\\b\");\n};");
        assert!(out.contains("\"comment_definition\": \"a\\\\b\""));
    }

    #[test]
    fn control_characters_are_escaped() {
        let out = render("/* bell \u{7} */\nint x;");
        assert!(out.contains("bell \\u0007"));
    }

    #[test]
    fn no_trailing_comma_before_close() {
        let out = render("int x;");
        assert!(!out.contains(",\n}"));
        assert!(!out.contains(",\n  }"));
    }

    #[test]
    fn nested_sections_close_without_trailing_commas() {
        let out = render(
            "namespace a { namespace b { class C : public D { public: int x; void F(); }; } }",
        );
        // No `}` or `]` anywhere may directly follow a comma.
        let mut prev = ' ';
        for c in out.chars() {
            if c == '}' || c == ']' {
                assert_ne!(prev, ',', "dangling comma before a closer:\n{}", out);
            }
            if !c.is_whitespace() {
                prev = c;
            }
        }
    }
}
