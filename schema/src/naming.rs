//! Name validation and derived names (plurals, tables, columns).

use regex_lite::Regex;
use std::sync::OnceLock;

fn node_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid node name pattern"))
}

fn field_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("valid field name pattern"))
}

/// PascalCase, e.g. `ArticleTag`.
pub(crate) fn is_valid_node_name(name: &str) -> bool {
    node_name_pattern().is_match(name)
}

/// camelCase, e.g. `createdAt`. Underscores are reserved for filter suffixes.
pub(crate) fn is_valid_field_name(name: &str) -> bool {
    field_name_pattern().is_match(name)
}

/// `createdAt` -> `created_at`, `ArticleTags` -> `article_tags`.
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `ArticleTag` -> `articleTag`.
pub(crate) fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English-ish default plural: `Category` -> `Categories`, `Box` -> `Boxes`.
pub(crate) fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{}ies", stem);
        }
    }
    if lower.ends_with('s') || lower.ends_with('x') || lower.ends_with("ch") || lower.ends_with("sh")
    {
        return format!("{}es", name);
    }
    format!("{}s", name)
}
