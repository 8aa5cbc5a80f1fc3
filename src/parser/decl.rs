//! Function-vs-variable classification and declaration builders.
//!
//! Purely lexical: a candidate span is inspected word by word and a
//! best-effort structural guess is made. Misclassification is possible on
//! macro-heavy declarations and is silent by design — every span produces a
//! well-formed node either way.

use crate::lex::{self, next_symbol, read_braces, read_word, split_args, trim};
use crate::model::{Function, Variable, Visibility};

/// Break set for declaration words: whitespace plus grouping characters.
const DECL_BREAK: &str = " \n\r(){}[]";

const WS: &str = " \n\r";

/// Decide whether a declaration span is a function.
///
/// Leading `virtual`/`static`/`typename`/`inline` qualifiers are stripped
/// first. A span whose first significant character after the leading word is
/// `(` is call-shaped (constructor-style function) unless the parenthesized
/// content carries a top-level `:` — that shape is a member-pointer binding,
/// i.e. a function-pointer variable — with `std` bindings exempted.
pub fn is_function(data: &str) -> bool {
    let mut caret = 0;
    let mut first = read_word(data, &mut caret, DECL_BREAK, WS);
    if first.is_empty() {
        return false;
    }

    for qualifier in ["virtual", "static", "typename", "inline"] {
        if first == qualifier {
            first = read_word(data, &mut caret, DECL_BREAK, WS);
        }
    }

    if next_symbol(data, caret, " \n\r\t") == '(' {
        let braces = read_braces(data, &mut caret);
        let braces = trim(&braces, " \n\t\r()");

        let mut tmp = 0;
        let _ = read_word(braces, &mut tmp, lex::WORD_BREAK, WS);

        let mut is_fn = next_symbol(braces, tmp, " \n\r\t") != ':';
        if !is_fn && braces.starts_with("std") {
            is_fn = true;
        }
        is_fn
    } else {
        if first == "const" {
            read_word(data, &mut caret, DECL_BREAK, WS);
        }

        let name = read_word(data, &mut caret, DECL_BREAK, WS);
        if name == "operator" {
            read_word(data, &mut caret, " \n\r(){}", WS);
        }

        next_symbol(data, caret, " \n\r\t") == '('
    }
}

/// Build a [`Variable`] record from a declaration span.
///
/// Recognizes the function-pointer form `TYPE (CLS::*NAME)(PARAMS)` and
/// folds it into a single synthesized type descriptor string.
pub fn parse_variable(data: &str, visibility: Visibility, begin: usize, end: usize) -> Variable {
    let mut var = Variable {
        visibility,
        begin,
        length: end.saturating_sub(begin),
        text: data.to_string(),
        ..Default::default()
    };

    let mut caret = 0;
    let mut type_word = read_word(data, &mut caret, DECL_BREAK, WS);

    if type_word == "static" {
        var.is_static = true;
        type_word = read_word(data, &mut caret, DECL_BREAK, WS);
    }
    if type_word == "const" {
        var.var_type.is_const = true;
        type_word = read_word(data, &mut caret, DECL_BREAK, WS);
    }

    if type_word.ends_with('&') {
        var.var_type.is_reference = true;
    }
    if type_word.ends_with('*') {
        var.var_type.is_pointer = true;
    }
    var.var_type.name = type_word;

    if next_symbol(data, caret, " \n\r\t") == '(' {
        let braces = trim(&read_braces(data, &mut caret), " \r\t()").to_string();
        let params = trim(&read_braces(data, &mut caret), " \r\t()").to_string();

        let mut tmp = 0;
        let class_word = read_word(&braces, &mut tmp, lex::WORD_BREAK, WS);
        // Skip the "::*" between the class word and the variable name. The
        // offset is a byte count and may split a multibyte character on
        // garbage input, so slice bytes and rebuild lossily.
        let name_start = (tmp + 3).min(braces.len());
        var.name = String::from_utf8_lossy(&braces.as_bytes()[name_start..]).into_owned();
        var.var_type.name = format!("{} ({}*)({})", var.var_type.name, class_word, params);
    } else {
        var.name = read_word(data, &mut caret, DECL_BREAK, WS);
    }

    var
}

/// Build a [`Function`] record from a declaration span.
pub fn parse_function(data: &str, visibility: Visibility, begin: usize, end: usize) -> Function {
    let mut func = Function {
        visibility,
        begin,
        length: end.saturating_sub(begin),
        text: data.to_string(),
        ..Default::default()
    };

    let mut caret = 0;
    let mut type_word = read_word(data, &mut caret, DECL_BREAK, WS);

    if type_word == "virtual" {
        func.is_virtual = true;
        type_word = read_word(data, &mut caret, DECL_BREAK, WS);
    }
    if type_word == "static" {
        func.is_static = true;
        type_word = read_word(data, &mut caret, DECL_BREAK, WS);
    }
    for qualifier in ["inline", "typename", "explicit"] {
        if type_word == qualifier {
            type_word = read_word(data, &mut caret, DECL_BREAK, WS);
        }
    }

    if type_word == "operator" {
        let symbol = read_word(data, &mut caret, DECL_BREAK, WS);
        func.name = format!("{}{}", type_word, symbol);
        func.return_type.name = "void".into();
    } else if next_symbol(data, caret, " \n\r\t") == '(' {
        // Constructor-style: the leading word is the name itself.
        func.name = type_word;
        func.return_type.name = "void".into();
    } else {
        if type_word == "const" {
            func.return_type.is_const = true;
            type_word = read_word(data, &mut caret, DECL_BREAK, WS);
        }
        if type_word.ends_with('&') {
            func.return_type.is_reference = true;
        }
        if type_word.ends_with('*') {
            func.return_type.is_pointer = true;
        }
        func.return_type.name = type_word;

        func.name = read_word(data, &mut caret, DECL_BREAK, WS);
        if func.name == "operator" {
            let symbol = read_word(data, &mut caret, " \n\r(){}", WS);
            func.name = format!("{} {}", func.name, symbol);
        }
    }

    let params_str = trim(&read_braces(data, &mut caret), " \n\r\t").to_string();
    let after = read_word(data, &mut caret, lex::WORD_BREAK, WS);
    if after == "const" {
        func.is_const = true;
    }

    if !params_str.is_empty() {
        for param in split_args(&params_str, ',') {
            let param = trim(&param, " \r\n\t");
            if param.is_empty() {
                continue;
            }
            func.parameters
                .push(parse_variable(param, Visibility::Public, begin, end));
        }
    }

    func
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_function() {
        assert!(is_function("void Foo(int a)"));
        let f = parse_function("void Foo(int a)", Visibility::Public, 0, 15);
        assert_eq!(f.name, "Foo");
        assert_eq!(f.return_type.name, "void");
        assert_eq!(f.parameters.len(), 1);
        assert_eq!(f.parameters[0].name, "a");
        assert_eq!(f.parameters[0].var_type.name, "int");
    }

    #[test]
    fn plain_variable() {
        assert!(!is_function("int x"));
        let v = parse_variable("int x", Visibility::Public, 0, 5);
        assert_eq!(v.name, "x");
        assert_eq!(v.var_type.name, "int");
        assert!(!v.is_static);
        assert!(!v.var_type.is_const);
    }

    #[test]
    fn static_const_variable() {
        let v = parse_variable("static const float mScale = 1.0f", Visibility::Private, 0, 0);
        assert!(v.is_static);
        assert!(v.var_type.is_const);
        assert_eq!(v.var_type.name, "float");
        assert_eq!(v.name, "mScale");
        assert_eq!(v.visibility, Visibility::Private);
    }

    #[test]
    fn pointer_and_reference_types() {
        let v = parse_variable("Widget* mOwner", Visibility::Public, 0, 0);
        assert!(v.var_type.is_pointer);
        assert_eq!(v.var_type.name, "Widget*");

        let f = parse_function("String& Name()", Visibility::Public, 0, 0);
        assert!(f.return_type.is_reference);
        assert_eq!(f.name, "Name");
    }

    #[test]
    fn constructor_is_function() {
        assert!(is_function("Widget()"));
        let f = parse_function("Widget()", Visibility::Public, 0, 8);
        assert_eq!(f.name, "Widget");
        assert_eq!(f.return_type.name, "void");
        assert!(f.parameters.is_empty());
    }

    #[test]
    fn member_pointer_is_variable() {
        let data = "void (Widget::*mCallback)(int)";
        assert!(!is_function(data));
        let v = parse_variable(data, Visibility::Public, 0, data.len());
        assert_eq!(v.name, "mCallback");
        assert_eq!(v.var_type.name, "void (Widget*)(int)");
    }

    #[test]
    fn member_pointer_with_multibyte_text_does_not_panic() {
        // The "::*" skip lands mid-character here; the name degrades
        // lossily instead of aborting.
        let data = "int (X:aéx)(y)";
        assert!(!is_function(data));
        let v = parse_variable(data, Visibility::Public, 0, data.len());
        assert_eq!(v.var_type.name, "int (X*)(y)");
    }

    #[test]
    fn virtual_and_static_flags() {
        let f = parse_function("virtual void Draw()", Visibility::Public, 0, 0);
        assert!(f.is_virtual);
        assert!(!f.is_static);

        let f = parse_function("static int Count()", Visibility::Public, 0, 0);
        assert!(f.is_static);
        assert_eq!(f.return_type.name, "int");
    }

    #[test]
    fn const_method_flag() {
        let f = parse_function("int Depth() const", Visibility::Public, 0, 0);
        assert!(f.is_const);
        assert!(!f.return_type.is_const);
    }

    #[test]
    fn operator_name_absorbs_symbol() {
        // `=` is not a declaration break character, so the symbol fuses
        // directly onto the word.
        assert!(is_function("bool operator==(const Widget& other)"));
        let f = parse_function("bool operator==(const Widget& other)", Visibility::Public, 0, 0);
        assert_eq!(f.name, "operator==");
        assert_eq!(f.parameters.len(), 1);
        assert!(f.parameters[0].var_type.is_reference);
        assert!(f.parameters[0].var_type.is_const);
    }

    #[test]
    fn spaced_operator_name_appends_symbol() {
        let f = parse_function("bool operator ==(const Widget& other)", Visibility::Public, 0, 0);
        assert_eq!(f.name, "operator ==");
    }

    #[test]
    fn qualifier_stripping_order() {
        assert!(is_function("static inline void Tick()"));
        assert!(is_function("virtual const String& Name()"));
    }

    #[test]
    fn empty_span_is_not_function() {
        assert!(!is_function(""));
        assert!(!is_function("   "));
    }
}
