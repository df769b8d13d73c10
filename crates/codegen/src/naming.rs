//! Identifier derivation for generated items

use proc_macro2::{Ident, Span};

/// Strict and reserved keywords usable as raw identifiers
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers either
const FORBIDDEN: &[&str] = &["_", "crate", "self", "Self", "super"];

/// `camelCase` / `PascalCase` / `snake_case` -> `snake_case`
///
/// Acronyms stay together: `HTTPServer` -> `http_server`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `BarService` -> `BAR_SERVICE`
pub fn to_upper_snake_case(name: &str) -> String {
    to_snake_case(name).to_uppercase()
}

/// Rust identifier for `name`, raw when it is a keyword
///
/// Returns `None` when no identifier can represent the name.
pub fn ident(name: &str) -> Option<Ident> {
    if FORBIDDEN.contains(&name) {
        return None;
    }
    if KEYWORDS.contains(&name) {
        return Some(Ident::new_raw(name, Span::call_site()));
    }
    syn::parse_str::<Ident>(name).ok()
}

/// Whether `name` is usable verbatim as a type name (trait, struct)
pub fn is_type_ident(name: &str) -> bool {
    !KEYWORDS.contains(&name) && ident(name).is_some()
}

pub fn emitter_name(trait_name: &str) -> String {
    format!("{trait_name}Emitter")
}

pub fn dispatcher_name(trait_name: &str) -> String {
    format!("{trait_name}Dispatcher")
}

pub fn table_name(trait_name: &str) -> String {
    format!("__{}_DISPATCH_TABLE", to_upper_snake_case(trait_name))
}

/// Shared prefix of the invoker functions of one contract
pub fn invoker_prefix(trait_name: &str) -> String {
    format!("__{}_invoke", to_snake_case(trait_name))
}

pub fn invoker_name(trait_name: &str, method_id: u32) -> String {
    format!("{}_{method_id}", invoker_prefix(trait_name))
}
