//! Literal classifier: infers the type of a default value from its text.

use crate::catalog::record::ParamValue;

use super::patterns::{has_quote, is_integer_literal, is_real_literal, looks_real};

const TRUE_SPELLINGS: [&str; 2] = [".true.", ".t."];
const FALSE_SPELLINGS: [&str; 2] = [".false.", ".f."];

/// Result of classifying one literal
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub value: ParamValue,
    /// True when the type could not be inferred and the text was kept as-is
    pub fallback: bool,
}

impl Classification {
    fn inferred(value: ParamValue) -> Self {
        Self {
            value,
            fallback: false,
        }
    }

    fn fallback(literal: &str) -> Self {
        Self {
            value: ParamValue::Str(literal.to_string()),
            fallback: true,
        }
    }
}

/// Classifies a trimmed literal. Never fails: unknown shapes become strings
/// with `fallback` set so the caller can report them.
pub fn classify_literal(literal: &str) -> Classification {
    let lower = literal.to_lowercase();

    if TRUE_SPELLINGS.contains(&lower.as_str()) {
        return Classification::inferred(ParamValue::Bool(true));
    }
    if FALSE_SPELLINGS.contains(&lower.as_str()) {
        return Classification::inferred(ParamValue::Bool(false));
    }

    if has_quote(literal) {
        return Classification::inferred(ParamValue::Str(literal.to_string()));
    }

    if looks_real(literal) {
        return match parse_real(literal) {
            Some(x) => Classification::inferred(ParamValue::Float(x)),
            None => Classification::fallback(literal),
        };
    }

    if is_integer_literal(literal) {
        return match literal.parse::<i64>() {
            Ok(i) => Classification::inferred(ParamValue::Int(i)),
            Err(_) => Classification::fallback(literal),
        };
    }

    Classification::fallback(literal)
}

/// Parses a Fortran real literal, normalising the `d` exponent to `e` and
/// dropping a `_kind` suffix
pub fn parse_real(literal: &str) -> Option<f64> {
    if !is_real_literal(literal) {
        return None;
    }
    let body = literal.split('_').next().unwrap_or(literal);
    body.replace(|c: char| c == 'd' || c == 'D', "e").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(literal: &str) -> ParamValue {
        classify_literal(literal).value
    }

    #[test]
    fn test_booleans() {
        assert_eq!(value(".true."), ParamValue::Bool(true));
        assert_eq!(value(".TRUE."), ParamValue::Bool(true));
        assert_eq!(value(".False."), ParamValue::Bool(false));
        assert_eq!(value(".f."), ParamValue::Bool(false));
    }

    #[test]
    fn test_quoted_text_is_string() {
        assert_eq!(value("'3.14'"), ParamValue::Str("'3.14'".into()));
        assert_eq!(value("\"abc\""), ParamValue::Str("\"abc\"".into()));
        assert!(!classify_literal("''").fallback);
    }

    #[test]
    fn test_reals() {
        assert_eq!(value("2.0d0"), ParamValue::Float(2.0));
        assert_eq!(value("1.5D3"), value("1.5E3"));
        assert_eq!(value("1.5D3"), ParamValue::Float(1500.0));
        assert_eq!(value("-1d-2"), ParamValue::Float(-0.01));
        assert_eq!(value("1.0_dp"), ParamValue::Float(1.0));
        assert_eq!(value(".5"), ParamValue::Float(0.5));
        assert_eq!(value("3."), ParamValue::Float(3.0));
    }

    #[test]
    fn test_integers() {
        assert_eq!(value("-007"), ParamValue::Int(-7));
        assert_eq!(value("42"), ParamValue::Int(42));
    }

    #[test]
    fn test_fallbacks() {
        let c = classify_literal("huge_number");
        assert!(c.fallback);
        assert_eq!(c.value, ParamValue::Str("huge_number".into()));

        assert!(classify_literal("1.2.3").fallback);
        assert!(classify_literal("99999999999999999999999").fallback);
        assert!(classify_literal("").fallback);
    }
}
