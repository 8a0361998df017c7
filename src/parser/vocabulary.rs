//! Fixed SQL vocabulary and token classification
//!
//! Classification is informational: the tokenizer never consults it, and
//! the section splitter only uses the section keyword and enclosure sets.

use std::collections::HashSet;

use lazy_static::lazy_static;

// ============================================================================
// Word Lists
// ============================================================================

/// Keywords that open a query section
pub const SECTION_KEYWORDS: &[&str] = &[
    "alter", "create", "drop", "select", "delete", "insert", "update", "from", "where", "group",
    "having", "order", "limit", "set", "values", "union",
];

/// Section names that begin a statement
pub const STATEMENT_VERBS: &[&str] = &[
    "alter", "create", "drop", "select", "delete", "insert", "update",
];

/// Operators, longest first within each shared prefix
pub const OPERATORS: &[&str] = &[
    "<=>", "<>", ">=", "<=", "==", "!=", "<<", ">>", "||", "&&", "=", "<", ">", "!", "|", "&",
    "-", "+", "*", "/", "%", "~", "^", "?",
];

const TYPES: &[&str] = &[
    "bigint", "binary", "bit", "blob", "bool", "boolean", "char", "date", "datetime", "decimal",
    "double", "enum", "float", "int", "integer", "json", "longblob", "longtext", "mediumblob",
    "mediumint", "mediumtext", "numeric", "real", "set", "smallint", "text", "time",
    "timestamp", "tinyblob", "tinyint", "tinytext", "varbinary", "varchar", "year",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "xor", "not", "&&", "||"];

const FUNCTIONS: &[&str] = &[
    "abs", "avg", "cast", "ceil", "ceiling", "char_length", "coalesce", "concat", "concat_ws",
    "convert", "count", "curdate", "current_date", "current_time", "current_timestamp",
    "date_add", "date_format", "date_sub", "datediff", "day", "floor", "format",
    "from_unixtime", "greatest", "group_concat", "hour", "if", "ifnull", "instr", "isnull",
    "lcase", "least", "left", "length", "locate", "lower", "lpad", "ltrim", "max", "md5", "min",
    "minute", "mod", "month", "now", "nullif", "pow", "power", "rand", "replace", "right",
    "round", "rpad", "rtrim", "second", "sha1", "sqrt", "substr", "substring", "sum", "trim",
    "truncate", "ucase", "unix_timestamp", "upper", "uuid", "week", "year",
];

const RESERVED: &[&str] = &[
    "add", "all", "alter", "analyze", "and", "as", "asc", "between", "by", "case", "check",
    "collate", "column", "constraint", "create", "cross", "database", "default", "delete",
    "desc", "distinct", "drop", "else", "end", "exists", "explain", "false", "for", "foreign",
    "from", "full", "group", "having", "if", "ignore", "in", "index", "inner", "insert",
    "interval", "into", "is", "join", "key", "left", "like", "limit", "natural", "not", "null",
    "offset", "on", "or", "order", "outer", "primary", "references", "regexp", "rename",
    "replace", "right", "select", "set", "table", "then", "to", "true", "union", "unique",
    "update", "using", "values", "when", "where", "with", "xor",
];

/// Opening enclosures, paired by position with `CLOSING_ENCLOSURES`
pub const OPENING_ENCLOSURES: &[&str] = &["{", "("];
pub const CLOSING_ENCLOSURES: &[&str] = &["}", ")"];

const PUNCTUATION: &[&str] = &["[", "]", "(", ")", "{", "}", ",", ";", "`", "."];

lazy_static! {
    static ref SECTION_SET: HashSet<&'static str> = SECTION_KEYWORDS.iter().copied().collect();
    static ref OPERATOR_SET: HashSet<&'static str> = OPERATORS.iter().copied().collect();
    static ref TYPE_SET: HashSet<&'static str> = TYPES.iter().copied().collect();
    static ref CONJUNCTION_SET: HashSet<&'static str> = CONJUNCTIONS.iter().copied().collect();
    static ref FUNCTION_SET: HashSet<&'static str> = FUNCTIONS.iter().copied().collect();
    static ref RESERVED_SET: HashSet<&'static str> = RESERVED.iter().copied().collect();
    static ref PUNCTUATION_SET: HashSet<&'static str> = PUNCTUATION.iter().copied().collect();
}

// ============================================================================
// Membership Tests
// ============================================================================

pub fn is_section_keyword(word: &str) -> bool {
    SECTION_SET.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_statement_verb(word: &str) -> bool {
    STATEMENT_VERBS.contains(&word.to_ascii_lowercase().as_str())
}

/// Operators are matched case-sensitively
pub fn is_operator(text: &str) -> bool {
    OPERATOR_SET.contains(text)
}

pub fn is_type(word: &str) -> bool {
    TYPE_SET.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_conjunction(word: &str) -> bool {
    CONJUNCTION_SET.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_function(word: &str) -> bool {
    FUNCTION_SET.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED_SET.contains(word.to_ascii_lowercase().as_str())
}

/// Index of the enclosure pair `text` opens, if any
pub fn opening_index(text: &str) -> Option<usize> {
    OPENING_ENCLOSURES.iter().position(|&open| open == text)
}

/// Index of the enclosure pair `text` closes, if any
pub fn closing_index(text: &str) -> Option<usize> {
    CLOSING_ENCLOSURES.iter().position(|&close| close == text)
}

// ============================================================================
// Classification
// ============================================================================

bitflags::bitflags! {
    /// Vocabulary classes a token text belongs to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TokenClass: u16 {
        const OPERATOR    = 0x0001;
        const RESERVED    = 0x0002;
        const TYPE        = 0x0004;
        const FUNCTION    = 0x0008;
        const CONJUNCTION = 0x0010;
        const SECTION     = 0x0020;
        const OPEN        = 0x0040;
        const CLOSE       = 0x0080;
        const COMMENT     = 0x0100;
        const STRING      = 0x0200;
        const WHITESPACE  = 0x0400;
        const PUNCTUATION = 0x0800;
        /// Identifier, number, placeholder or dotted name
        const WORD        = 0x1000;
    }
}

/// Classify a token text by membership tests; a word can carry several
/// classes at once (`set` is a section keyword, a type and reserved).
pub fn classify(text: &str) -> TokenClass {
    let mut class = TokenClass::empty();
    let Some(first) = text.chars().next() else {
        return class;
    };

    if text.starts_with("--") || text.starts_with('#') || text.starts_with("/*") {
        return TokenClass::COMMENT;
    }
    if first == '\'' || first == '"' {
        return TokenClass::STRING;
    }
    if first.is_whitespace() {
        return TokenClass::WHITESPACE;
    }

    if is_operator(text) {
        class |= TokenClass::OPERATOR;
    }
    if is_conjunction(text) {
        class |= TokenClass::CONJUNCTION;
    }
    if PUNCTUATION_SET.contains(text) {
        class |= TokenClass::PUNCTUATION;
    }
    if opening_index(text).is_some() {
        class |= TokenClass::OPEN;
    }
    if closing_index(text).is_some() {
        class |= TokenClass::CLOSE;
    }
    if !class.is_empty() {
        return class;
    }

    class |= TokenClass::WORD;
    if is_reserved(text) {
        class |= TokenClass::RESERVED;
    }
    if is_type(text) {
        class |= TokenClass::TYPE;
    }
    if is_function(text) {
        class |= TokenClass::FUNCTION;
    }
    if is_section_keyword(text) {
        class |= TokenClass::SECTION;
    }
    class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_sets_are_case_insensitive() {
        assert!(is_section_keyword("WHERE"));
        assert!(is_section_keyword("Limit"));
        assert!(!is_section_keyword("join"));
        assert!(is_reserved("Distinct"));
        assert!(is_type("VARCHAR"));
        assert!(is_function("Count"));
        assert!(is_conjunction("AND"));
    }

    #[test]
    fn test_operator_set_is_case_sensitive() {
        assert!(is_operator("<=>"));
        assert!(is_operator("&&"));
        assert!(!is_operator("AND"));
    }

    #[test]
    fn test_enclosure_pairs() {
        assert_eq!(opening_index("("), closing_index(")"));
        assert_eq!(opening_index("{"), closing_index("}"));
        assert_ne!(opening_index("("), closing_index("}"));
        assert_eq!(opening_index("["), None);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("-- note"), TokenClass::COMMENT);
        assert_eq!(classify("'abc'"), TokenClass::STRING);
        assert_eq!(classify("  "), TokenClass::WHITESPACE);
        assert_eq!(
            classify("("),
            TokenClass::PUNCTUATION | TokenClass::OPEN
        );
        assert_eq!(
            classify("||"),
            TokenClass::OPERATOR | TokenClass::CONJUNCTION
        );
        assert_eq!(classify("users.id"), TokenClass::WORD);

        let set = classify("SET");
        assert!(set.contains(TokenClass::SECTION));
        assert!(set.contains(TokenClass::TYPE));
        assert!(set.contains(TokenClass::RESERVED));

        assert!(classify("count").contains(TokenClass::FUNCTION));
        assert_eq!(classify(""), TokenClass::empty());
    }
}
