//! Pattern predicates for the Fortran subset we harvest.
//!
//! Every heuristic that recognises a piece of source text lives here as a
//! small named predicate or extractor so it can be tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Comment marker of free-form Fortran
pub const COMMENT_MARKER: char = '!';

/// Continuation marker of free-form Fortran
pub const CONTINUATION_MARKER: char = '&';

/// Separator between the type spec and the name list of a declaration
pub const DECLARATION_SEPARATOR: &str = "::";

static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*!").unwrap());

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());

static PROCEDURE_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*contains\b").unwrap());

/// `! ### name` or `! ### name(...)`, nothing else on the line
static DOC_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*!\s*###\s*([^\s(]+)(\(.*\))?\s*$").unwrap());

/// Any comment whose text starts with `#`
static HEADER_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*!\s*#").unwrap());

/// Intrinsic type keyword opening a type spec, as a whole word
static TYPE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(logical|character|integer|double\s+precision|real)\b").unwrap()
});

static DIMENSION_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdimension\s*\(").unwrap());

static INTEGER_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

static REAL_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eEdD][+-]?\d+)?(_\w+)?$").unwrap()
});

pub fn is_comment(line: &str) -> bool {
    COMMENT_LINE.is_match(line)
}

pub fn is_blank(line: &str) -> bool {
    BLANK_LINE.is_match(line)
}

/// Executable content: anything that is neither blank nor a comment
pub fn is_code(line: &str) -> bool {
    !is_blank(line) && !is_comment(line)
}

pub fn has_continuation(line: &str) -> bool {
    line.trim_end().ends_with(CONTINUATION_MARKER)
}

/// Drops the trailing continuation marker and the whitespace around it
pub fn strip_continuation(line: &str) -> &str {
    let trimmed = line.trim_end();
    trimmed
        .strip_suffix(CONTINUATION_MARKER)
        .unwrap_or(trimmed)
        .trim_end()
}

/// Drops the optional leading `&` of a continued line
pub fn strip_leading_continuation(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed
        .strip_prefix(CONTINUATION_MARKER)
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

/// Declarations cannot appear after `contains`
pub fn begins_procedure_body(line: &str) -> bool {
    PROCEDURE_BODY.is_match(line)
}

/// Cuts an inline comment, ignoring `!` inside quoted strings
pub fn strip_inline_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (idx, ch) in line.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, COMMENT_MARKER) => return &line[..idx],
            (None, _) => {}
        }
    }
    line
}

pub fn has_quote(literal: &str) -> bool {
    literal.contains('\'') || literal.contains('"')
}

pub fn is_integer_literal(literal: &str) -> bool {
    INTEGER_LITERAL.is_match(literal)
}

pub fn is_real_literal(literal: &str) -> bool {
    REAL_LITERAL.is_match(literal)
}

/// A decimal point or an exponent marker in either spelling
pub fn looks_real(literal: &str) -> bool {
    literal
        .chars()
        .any(|c| matches!(c, '.' | 'e' | 'E' | 'd' | 'D'))
}

/// Name of the parameter documented by a `### name` header line
pub fn doc_header_name(line: &str) -> Option<&str> {
    DOC_HEADER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Header matcher for one specific parameter name, case-insensitive
pub fn doc_header_for(name: &str) -> Regex {
    let pattern = format!(r"(?i)^\s*!\s*###\s*{}(\(.*\))?\s*$", regex::escape(name));
    Regex::new(&pattern).expect("escaped header pattern is valid")
}

pub fn is_header_like(line: &str) -> bool {
    HEADER_LIKE.is_match(line)
}

/// Documentation body line: blank, or a comment that does not start a header
pub fn is_doc_body(line: &str) -> bool {
    is_blank(line) || (is_comment(line) && !is_header_like(line))
}

/// Splits `name(1,2)` into `("name", Some("(1,2)"))`
pub fn split_parenthetical_suffix(target: &str) -> (&str, Option<&str>) {
    match target.find('(') {
        Some(open) => {
            let close = matching_paren(target, open).unwrap_or(target.len());
            let end = (close + 1).min(target.len());
            (target[..open].trim_end(), Some(&target[open..end]))
        }
        None => (target, None),
    }
}

/// Leading intrinsic type keyword of a type spec, lowercased with single spaces
pub fn type_keyword(type_spec: &str) -> Option<String> {
    let keyword = TYPE_KEYWORD.captures(type_spec)?.get(1)?;
    Some(
        keyword
            .as_str()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase(),
    )
}

/// Argument list of a `dimension(...)` attribute in a type spec
pub fn dimension_attribute(type_spec: &str) -> Option<&str> {
    let keyword = DIMENSION_KEYWORD.find(type_spec)?;
    let open = keyword.end() - 1;
    let close = matching_paren(type_spec, open)?;
    Some(&type_spec[open + 1..close])
}

/// Commas outside of nested parentheses
pub fn count_top_level_commas(text: &str) -> usize {
    let mut depth = 0usize;
    let mut commas = 0;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => commas += 1,
            _ => {}
        }
    }
    commas
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_and_blank() {
        assert!(is_comment("   ! a comment"));
        assert!(!is_comment("x = 1 ! trailing"));
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank("  x"));
        assert!(is_code("  x = 1"));
        assert!(!is_code("  ! x = 1"));
    }

    #[test]
    fn test_continuation() {
        assert!(has_continuation("x = 1 &   "));
        assert!(!has_continuation("x = 1"));
        assert_eq!(strip_continuation("x = 1 &  "), "x = 1");
        assert_eq!(strip_leading_continuation("   & + 2"), "+ 2");
    }

    #[test]
    fn test_inline_comment_respects_quotes() {
        assert_eq!(strip_inline_comment("x = 1 ! one"), "x = 1 ");
        assert_eq!(strip_inline_comment("s = 'hi!' ! c"), "s = 'hi!' ");
        assert_eq!(strip_inline_comment("s = \"a!b\""), "s = \"a!b\"");
    }

    #[test]
    fn test_procedure_body() {
        assert!(begins_procedure_body("contains"));
        assert!(begins_procedure_body("   CONTAINS"));
        assert!(!begins_procedure_body("logical :: contains_h"));
    }

    #[test]
    fn test_doc_header() {
        assert_eq!(doc_header_name("! ### initial_mass"), Some("initial_mass"));
        assert_eq!(doc_header_name("!###xa_lim(:)"), Some("xa_lim"));
        assert_eq!(doc_header_name("! ### two words"), None);
        assert_eq!(doc_header_name("! ## not a header"), None);

        let header = doc_header_for("initial_mass");
        assert!(header.is_match("   ! ### Initial_Mass  "));
        assert!(header.is_match("! ###initial_mass(1)"));
        assert!(!header.is_match("! ### initial_mass_limit"));
    }

    #[test]
    fn test_doc_body() {
        assert!(is_doc_body(""));
        assert!(is_doc_body("   ! some text"));
        assert!(!is_doc_body("   ! ### other"));
        assert!(!is_doc_body("x = 1"));
    }

    #[test]
    fn test_suffix_and_dimension() {
        assert_eq!(split_parenthetical_suffix("a(2,3)"), ("a", Some("(2,3)")));
        assert_eq!(split_parenthetical_suffix("b"), ("b", None));
        assert_eq!(
            dimension_attribute("real(dp), dimension(max_n, 3)"),
            Some("max_n, 3")
        );
        assert_eq!(dimension_attribute("integer, DIMENSION(f(1), 2)"), Some("f(1), 2"));
        assert_eq!(dimension_attribute("real(dp)"), None);
        assert_eq!(count_top_level_commas("f(1,2), 2"), 1);
    }

    #[test]
    fn test_type_keyword_is_anchored() {
        assert_eq!(type_keyword("  LOGICAL"), Some("logical".to_string()));
        assert_eq!(type_keyword("double   Precision"), Some("double precision".to_string()));
        assert_eq!(type_keyword("character(len=logical_len)"), Some("character".to_string()));
        assert_eq!(type_keyword("type(real_pair)"), None);
        assert_eq!(type_keyword("realistic"), None);
    }

    #[test]
    fn test_literal_shapes() {
        assert!(is_integer_literal("-007"));
        assert!(!is_integer_literal("+7"));
        assert!(is_real_literal("1.5d3"));
        assert!(is_real_literal(".5"));
        assert!(is_real_literal("1.0_dp"));
        assert!(!is_real_literal("1.2.3"));
        assert!(looks_real("1d-2"));
        assert!(!looks_real("42"));
    }
}
