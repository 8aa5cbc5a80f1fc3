//! Declaration-tree data model — structural, not semantic.
//!
//! Everything here is a lexical record of what the scanner saw: type names
//! stay textual, byte spans are relative to the owning section's text, and
//! the tree is built once and never mutated afterwards.

use std::path::PathBuf;
use std::time::SystemTime;

/// Access level in effect for a declaration inside a class/struct body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }
}

/// Textual type descriptor. The name keeps whatever the source said
/// (including `*`/`&` suffixes); the flags are lexical observations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeRef {
    pub name: String,
    pub is_pointer: bool,
    pub is_reference: bool,
    pub is_const: bool,
}

/// One entry of a class inheritance list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClass {
    pub name: String,
    /// Inherited access; private when the source names none.
    pub visibility: Visibility,
    pub is_virtual: bool,
}

/// A variable declaration — also used for function parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variable {
    pub name: String,
    pub var_type: TypeRef,
    pub is_static: bool,
    pub visibility: Visibility,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
    /// Raw declaration text as captured.
    pub text: String,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Function {
    pub name: String,
    pub return_type: TypeRef,
    pub parameters: Vec<Variable>,
    pub is_static: bool,
    pub is_virtual: bool,
    /// Trailing `const` qualifier on the declaration.
    pub is_const: bool,
    /// Template parameter text when declared via `template <...>`.
    pub templates: Option<String>,
    pub visibility: Visibility,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
    pub text: String,
}

/// An enum declaration. Entries keep declaration order; the value string is
/// empty when no explicit `= expr` was given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumDecl {
    pub name: String,
    pub entries: Vec<(String, String)>,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
    pub text: String,
}

/// A `typedef TYPE NAME;` alias.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Typedef {
    pub alias: String,
    pub target: String,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
    pub text: String,
}

/// A captured comment. Consecutive `//` lines are merged into one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    pub text: String,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
}

/// Attribute names captured from an `ATTRIBUTES(...)` marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeBlock {
    pub attributes: Vec<String>,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
}

/// A `using namespace N;` directive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsingNamespace {
    pub name: String,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
}

/// Class/struct payload of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    /// Parent-qualified name, `::`-separated.
    pub full_name: String,
    /// `class` (or `meta class`) as opposed to `struct`.
    pub is_class: bool,
    pub is_meta: bool,
    /// The class's own access level in its enclosing scope.
    pub visibility: Visibility,
    pub templates: Option<String>,
    pub bases: Vec<BaseClass>,
    /// Payload of an `ATTRIBUTE_COMMENT_DEFINITION("...")` marker.
    pub comment_def: Option<String>,
    /// Payload of an `ATTRIBUTE_SHORT_DEFINITION("...")` marker.
    pub short_def: Option<String>,
}

/// What kind of scope a section is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    FileRoot,
    Namespace { name: String, full_name: String },
    Class(ClassInfo),
}

/// A scanned scope: the file root, a namespace body, or a class/struct body.
///
/// `begin`/`length` are relative to the parent section's text (`begin` points
/// at the keyword that opened the scope, `length` is the body text length).
/// Sections own their children and declarations outright; there are no
/// parent back-pointers — qualified names are computed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub begin: usize,
    pub length: usize,
    pub line: usize,
    /// The section's own body text.
    pub text: String,
    pub sections: Vec<Section>,
    pub functions: Vec<Function>,
    pub variables: Vec<Variable>,
    pub enums: Vec<EnumDecl>,
    pub typedefs: Vec<Typedef>,
    pub comments: Vec<Comment>,
    pub attributes: Vec<AttributeBlock>,
    pub usings: Vec<UsingNamespace>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Section {
            kind,
            begin: 0,
            length: 0,
            line: 0,
            text: String::new(),
            sections: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            enums: Vec::new(),
            typedefs: Vec::new(),
            comments: Vec::new(),
            attributes: Vec::new(),
            usings: Vec::new(),
        }
    }

    /// Qualified name of this scope; empty for the file root.
    pub fn full_name(&self) -> &str {
        match &self.kind {
            SectionKind::FileRoot => "",
            SectionKind::Namespace { full_name, .. } => full_name,
            SectionKind::Class(info) => &info.full_name,
        }
    }
}

/// One fully scanned source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub text: String,
    pub root: Section,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_defaults_to_public() {
        assert_eq!(Visibility::default(), Visibility::Public);
        assert_eq!(Variable::default().visibility, Visibility::Public);
    }

    #[test]
    fn full_name_per_kind() {
        let root = Section::new(SectionKind::FileRoot);
        assert_eq!(root.full_name(), "");

        let ns = Section::new(SectionKind::Namespace {
            name: "ui".into(),
            full_name: "o2::ui".into(),
        });
        assert_eq!(ns.full_name(), "o2::ui");
    }
}
