//! Abstract syntax tree for selection fragments.

/// Source location of a syntax element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// A named fragment: `fragment ArticleTeaser on Article { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub name: Option<String>,
    /// Node name after `on`, if given.
    pub type_condition: Option<String>,
    pub selection_set: SelectionSet,
}

/// A brace-delimited list of fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionSet {
    pub fields: Vec<Field>,
    pub span: Span,
}

/// One requested field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    /// Arguments in source order, values converted to JSON.
    pub arguments: serde_json::Map<String, serde_json::Value>,
    pub selection_set: Option<SelectionSet>,
    pub span: Span,
}

impl Field {
    /// The key this field's value is returned under.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
