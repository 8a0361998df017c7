//! Lossless tokenization properties over a corpus of statements

use sqlsplit::{collapse_whitespace, parse_sections, tokenize, untokenize};

const CORPUS: &[&str] = &[
    "SELECT a,b FROM t WHERE a=1",
    "SELECT * FROM t WHERE id IN (SELECT id FROM t2 WHERE x=1)",
    "  select   u.*,  count(*) as n\n\tfrom users u\n  left join orders o on o.user_id = u.id\n group by u.id  ",
    "INSERT INTO `log` (`msg`, `at`) VALUES ('it''s', NOW())",
    "UPDATE t SET name = \"a \\\" b\" WHERE id <=> :id # trailing note",
    "DELETE FROM t WHERE a <> 1 && b != 2 || c >= 3 /* why */ AND d << 2",
    "SELECT {fn concat(a, b)} FROM t ORDER BY 1 DESC LIMIT 10, 20",
    "CREATE TABLE t (id INT, name VARCHAR(20), note TEXT DEFAULT '')",
    "SELECT @var := 1, db.schema.t.col FROM dual; ",
    "-- leading comment\nSELECT 1",
    "SELECT x FROM t WHERE y = ? AND z IN (1, (2), ((3)))",
    "SELECT 'naïve', \"日本\" FROM t",
];

#[test]
fn test_round_trip_without_collapse() {
    for sql in CORPUS {
        let stream = tokenize(sql, false).unwrap();
        assert_eq!(untokenize(stream.texts()), *sql, "round trip of {:?}", sql);
    }
}

#[test]
fn test_round_trip_with_collapse() {
    for sql in CORPUS {
        let stream = tokenize(sql, true).unwrap();
        assert_eq!(
            untokenize(stream.texts()),
            collapse_whitespace(sql),
            "collapsed round trip of {:?}",
            sql
        );
    }
}

#[test]
fn test_tokens_are_contiguous() {
    for sql in CORPUS {
        let stream = tokenize(sql, false).unwrap();
        let mut expected_start = 0;
        for token in stream.tokens() {
            assert_eq!(token.start, expected_start);
            assert!(!token.is_empty());
            expected_start = token.end;
        }
        assert_eq!(expected_start, sql.len());
    }
}

#[test]
fn test_tokenize_is_deterministic() {
    for sql in CORPUS {
        assert_eq!(tokenize(sql, true).unwrap(), tokenize(sql, true).unwrap());
        assert_eq!(parse_sections(sql).unwrap(), parse_sections(sql).unwrap());
    }
}

#[test]
fn test_sections_reproduce_collapsed_input() {
    for sql in CORPUS {
        let map = parse_sections(sql).unwrap();
        assert_eq!(map.to_sql(), collapse_whitespace(sql), "sections of {:?}", sql);
        assert_eq!(map.to_string(), map.to_sql());
    }
}

#[test]
fn test_enclosures_balance_in_every_section() {
    for sql in CORPUS {
        let map = parse_sections(sql).unwrap();
        for (name, text) in map.iter() {
            let stream = tokenize(text, false).unwrap();
            let mut stack = Vec::new();
            for token in stream.texts() {
                match token {
                    "(" | "{" => stack.push(token),
                    ")" => assert_eq!(stack.pop(), Some("("), "section {}", name),
                    "}" => assert_eq!(stack.pop(), Some("{"), "section {}", name),
                    _ => {}
                }
            }
            assert!(stack.is_empty(), "section {} of {:?}", name, sql);
        }
    }
}
