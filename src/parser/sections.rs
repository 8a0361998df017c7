//! Query section splitting
//!
//! Groups the tokens of a statement into named sections keyed by the
//! keyword that introduces them. Parenthesized and braced spans are
//! captured whole and never scanned for section keywords, so a subquery's
//! `WHERE` stays inside the outer section that contains it.

use crate::config::ParseConfig;
use crate::error::{Error, ErrorCode, Result};
use crate::parser::tokenizer::{tokenize, TokenStream};
use crate::parser::vocabulary::{
    closing_index, is_section_keyword, is_statement_verb, opening_index, CLOSING_ENCLOSURES,
    OPENING_ENCLOSURES,
};
use crate::trace::Tracer;

/// Projection substituted for the `select` section by the count queries
pub const COUNT_PROJECTION: &str = "SELECT COUNT(1) AS count ";

// ============================================================================
// Section Map
// ============================================================================

/// Section name to accumulated SQL text, in first-appearance order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    sections: Vec<(String, String)>,
}

impl SectionMap {
    fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|(n, _)| n == name)
    }

    fn append(&mut self, name: &str, text: &str) {
        match self.position(name) {
            Some(idx) => self.sections[idx].1.push_str(text),
            None => self.sections.push((name.to_string(), text.to_string())),
        }
    }

    /// Text recorded for a section; names are matched case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.position(&name).map(|idx| self.sections[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All sections in recorded order
    pub fn all(&self) -> &[(String, String)] {
        &self.sections
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn select(&self) -> Option<&str> {
        self.get("select")
    }

    pub fn from(&self) -> Option<&str> {
        self.get("from")
    }

    pub fn where_clause(&self) -> Option<&str> {
        self.get("where")
    }

    pub fn group(&self) -> Option<&str> {
        self.get("group")
    }

    pub fn order(&self) -> Option<&str> {
        self.get("order")
    }

    pub fn limit(&self) -> Option<&str> {
        self.get("limit")
    }

    /// The statement verb, when the first section is one
    pub fn verb(&self) -> Option<&str> {
        self.sections
            .first()
            .map(|(n, _)| n.as_str())
            .filter(|n| is_statement_verb(n))
    }

    /// All sections concatenated; equals the (collapsed) input
    pub fn to_sql(&self) -> String {
        self.sections.iter().map(|(_, t)| t.as_str()).collect()
    }

    /// Row-counting variant of the query, without its `limit` section
    pub fn count_query(&self) -> String {
        self.build_count(false)
    }

    /// Row-counting variant of the query that keeps its `limit` section
    pub fn limited_count_query(&self) -> String {
        self.build_count(true)
    }

    fn build_count(&self, keep_limit: bool) -> String {
        self.sections
            .iter()
            .filter(|(n, _)| keep_limit || n != "limit")
            .map(|(n, t)| if n == "select" { COUNT_PROJECTION } else { t.as_str() })
            .collect()
    }
}

impl std::fmt::Display for SectionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (_, text) in &self.sections {
            f.write_str(text)?;
        }
        Ok(())
    }
}

// ============================================================================
// Section Parser
// ============================================================================

/// Splits statements into sections under a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct SectionParser {
    config: ParseConfig,
    tracer: Tracer,
}

impl SectionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self {
            config,
            tracer: Tracer::new(),
        }
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Split `sql` into its sections
    pub fn parse(&self, sql: &str) -> Result<SectionMap> {
        let result = self.split(sql);
        if let Err(ref err) = result {
            self.tracer.trace_error(err);
        }
        result
    }

    fn split(&self, sql: &str) -> Result<SectionMap> {
        let stream = tokenize(sql, self.config.collapse_whitespace)?;
        self.tracer.trace_tokenize(stream.source(), stream.len());

        let mut map = SectionMap::default();
        let Some(first) = stream.get(0) else {
            return Ok(map);
        };
        let mut current = first.to_lowercase();

        let mut i = 0;
        while let Some(token) = stream.get(i) {
            if let Some(pair) = opening_index(token) {
                let (span, consumed) = self.capture_enclosure(&stream, i, pair, 1)?;
                self.record(&mut map, &current, &span, i);
                i += consumed;
                continue;
            }
            // A closer with no opener is an ordinary token here
            let lower = token.to_lowercase();
            if is_section_keyword(&lower) && !map.contains(&lower) {
                current = lower;
            }
            self.record(&mut map, &current, token, i);
            i += 1;
        }

        Ok(map)
    }

    fn record(&self, map: &mut SectionMap, section: &str, text: &str, index: usize) {
        if !map.contains(section) {
            self.tracer.trace_section(section, index);
        }
        map.append(section, text);
    }

    /// Capture the enclosure opened at token `start` through its matching
    /// closer. Returns the span text and the number of tokens consumed.
    fn capture_enclosure(
        &self,
        stream: &TokenStream<'_>,
        start: usize,
        pair: usize,
        depth: usize,
    ) -> Result<(String, usize)> {
        let opened_at = stream.tokens()[start].start;
        let max_depth = self.config.effective_max_depth();
        if depth > max_depth {
            return Err(Error::with_message(
                ErrorCode::RecursionLimitExceeded,
                format!("nesting deeper than {} levels", max_depth),
            )
            .at(opened_at));
        }

        let mut span = String::from(OPENING_ENCLOSURES[pair]);
        let mut i = start + 1;
        while let Some(token) = stream.get(i) {
            if let Some(inner) = opening_index(token) {
                let (nested, consumed) = self.capture_enclosure(stream, i, inner, depth + 1)?;
                span.push_str(&nested);
                i += consumed;
                continue;
            }
            // Only this pair's closer ends the span; any other closer is text
            if closing_index(token) == Some(pair) {
                span.push_str(CLOSING_ENCLOSURES[pair]);
                return Ok((span, i + 1 - start));
            }
            span.push_str(token);
            i += 1;
        }

        Err(Error::with_message(
            ErrorCode::UnbalancedEnclosure,
            format!(
                "'{}' at offset {} is never closed",
                OPENING_ENCLOSURES[pair], opened_at
            ),
        )
        .at(opened_at))
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Split a SQL statement into sections using the default configuration
pub fn parse_sections(sql: &str) -> Result<SectionMap> {
    SectionParser::new().parse(sql)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_DEPTH_LIMIT;

    fn sections(sql: &str) -> Vec<(String, String)> {
        parse_sections(sql).unwrap().all().to_vec()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_sections() {
        assert_eq!(
            sections("SELECT a, b FROM t WHERE a = 1 ORDER BY b LIMIT 5"),
            pairs(&[
                ("select", "SELECT a, b "),
                ("from", "FROM t "),
                ("where", "WHERE a = 1 "),
                ("order", "ORDER BY b "),
                ("limit", "LIMIT 5"),
            ])
        );
    }

    #[test]
    fn test_subquery_is_opaque() {
        let map = parse_sections("SELECT * FROM t WHERE id IN (SELECT id FROM t2 WHERE x=1)")
            .unwrap();
        assert_eq!(map.select(), Some("SELECT * "));
        assert_eq!(map.from(), Some("FROM t "));
        assert_eq!(
            map.where_clause(),
            Some("WHERE id IN (SELECT id FROM t2 WHERE x=1)")
        );
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_function_call_stays_in_select() {
        let map = parse_sections("select count(distinct a), {fn now()} from t").unwrap();
        assert_eq!(map.select(), Some("select count(distinct a), {fn now()} "));
        assert_eq!(map.from(), Some("from t"));
    }

    #[test]
    fn test_repeated_keyword_appends_to_current() {
        assert_eq!(
            sections("SELECT a FROM t UNION SELECT b FROM u"),
            pairs(&[
                ("select", "SELECT a "),
                ("from", "FROM t "),
                ("union", "UNION SELECT b FROM u"),
            ])
        );
    }

    #[test]
    fn test_unknown_first_token_names_default_section() {
        let map = parse_sections("SHOW TABLES").unwrap();
        assert_eq!(map.get("show"), Some("SHOW TABLES"));
        assert_eq!(map.verb(), None);
        assert_eq!(map.select(), None);
    }

    #[test]
    fn test_update_sections() {
        let map = parse_sections("UPDATE t SET a = (b + 1) WHERE id = ?").unwrap();
        assert_eq!(map.verb(), Some("update"));
        assert_eq!(map.get("UPDATE"), Some("UPDATE t "));
        assert_eq!(map.get("set"), Some("SET a = (b + 1) "));
        assert_eq!(map.where_clause(), Some("WHERE id = ?"));
    }

    #[test]
    fn test_unbalanced_open() {
        let err = parse_sections("SELECT * FROM (t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnbalancedEnclosure);
        assert_eq!(err.offset, Some(14));
    }

    #[test]
    fn test_stray_closer_is_ordinary_text() {
        assert_eq!(
            sections("SELECT a) FROM t"),
            pairs(&[("select", "SELECT a) "), ("from", "FROM t")])
        );
    }

    #[test]
    fn test_other_pair_closer_does_not_end_span() {
        assert_eq!(
            sections("SELECT (a} WHERE b) FROM t"),
            pairs(&[("select", "SELECT (a} WHERE b) "), ("from", "FROM t")])
        );
        let err = parse_sections("SELECT (a} FROM t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnbalancedEnclosure);
    }

    #[test]
    fn test_recursion_limit() {
        let parser = SectionParser::with_config(ParseConfig::default().with_max_depth(2));
        assert!(parser.parse("SELECT ((1))").is_ok());
        let err = parser.parse("SELECT (((1)))").unwrap_err();
        assert_eq!(err.code, ErrorCode::RecursionLimitExceeded);
    }

    #[test]
    fn test_deep_nesting_fails_cleanly() {
        let sql = format!("SELECT {}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse_sections(&sql).unwrap_err();
        assert_eq!(err.code, ErrorCode::RecursionLimitExceeded);
    }

    #[test]
    fn test_huge_configured_depth_is_capped() {
        let sql = format!("SELECT {}1", "(".repeat(2_000_000));

        let parser = SectionParser::with_config(ParseConfig::default().with_max_depth(usize::MAX));
        let err = parser.parse(&sql).unwrap_err();
        assert_eq!(err.code, ErrorCode::RecursionLimitExceeded);

        let parser = SectionParser::with_config(ParseConfig {
            max_depth: usize::MAX,
            collapse_whitespace: true,
        });
        let err = parser.parse(&sql).unwrap_err();
        assert_eq!(err.code, ErrorCode::RecursionLimitExceeded);
        assert_eq!(
            err.message.as_deref(),
            Some(format!("nesting deeper than {} levels", MAX_DEPTH_LIMIT).as_str())
        );
    }

    #[test]
    fn test_count_query() {
        let map = parse_sections("SELECT a FROM t LIMIT 10").unwrap();
        assert_eq!(map.count_query(), "SELECT COUNT(1) AS count FROM t ");
        assert_eq!(
            map.limited_count_query(),
            "SELECT COUNT(1) AS count FROM t LIMIT 10"
        );
    }

    #[test]
    fn test_empty_input() {
        let map = parse_sections("   ").unwrap();
        assert!(map.is_empty());
        assert_eq!(map.limit(), None);
        assert_eq!(map.to_sql(), "");
    }

    #[test]
    fn test_malformed_input_propagates() {
        let err = parse_sections("SELECT 'open").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);
    }
}
