//! Name classification for Go's case-based visibility rule
//!
//! A name is exported when its first character is an uppercase letter. The
//! keywords and the predeclared identifiers of the universe block are never
//! promoted, wherever they appear.

/// Go keywords
pub const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

/// Identifiers predeclared in the universe block: types, constants, the zero
/// value and built-in functions
pub const PREDECLARED: &[&str] = &[
    // types
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error",
    "float32", "float64", "int", "int8", "int16", "int32", "int64", "rune",
    "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
    // constants
    "true", "false", "iota",
    // zero value
    "nil",
    // functions
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag",
    "len", "make", "max", "min", "new", "panic", "print", "println", "real",
    "recover",
];

/// How a name behaves under the visibility rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameClass {
    /// Language keyword
    Keyword,
    /// Predeclared identifier (`int`, `len`, `nil`, ...)
    Predeclared,
    /// Already starts with an uppercase letter
    Exported,
    /// Starts with a lowercase letter that has an uppercase form
    Renameable,
    /// Empty, blank, or starting with a character that has no case
    Uncased,
}

impl NameClass {
    /// Check if a name of this class may be promoted
    pub fn is_renameable(self) -> bool {
        self == NameClass::Renameable
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NameClass::Keyword => "keyword",
            NameClass::Predeclared => "predeclared",
            NameClass::Exported => "exported",
            NameClass::Renameable => "renameable",
            NameClass::Uncased => "uncased",
        }
    }
}

impl std::fmt::Display for NameClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff `name` is a keyword or a predeclared identifier
pub fn is_reserved(name: &str) -> bool {
    KEYWORDS.contains(&name) || PREDECLARED.contains(&name)
}

/// True iff the first character is lowercase and uppercasing it yields an
/// uppercase letter. Ignores reserved names; used for member names (fields,
/// methods) which live outside the universe block.
pub fn starts_lowercase(name: &str) -> bool {
    match name.chars().next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().all(char::is_uppercase),
        _ => false,
    }
}

/// Classify a package-scope name
pub fn classify(name: &str) -> NameClass {
    if KEYWORDS.contains(&name) {
        return NameClass::Keyword;
    }
    if PREDECLARED.contains(&name) {
        return NameClass::Predeclared;
    }
    match name.chars().next() {
        Some(first) if first.is_uppercase() => NameClass::Exported,
        Some(_) if starts_lowercase(name) => NameClass::Renameable,
        _ => NameClass::Uncased,
    }
}

/// Uppercase the first character, leaving the rest untouched
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
