//! Declaration parser: harvests `type :: name-list` statements.

use tracing::{debug, warn};

use super::lines::CleanedSource;
use super::patterns::{
    begins_procedure_body, count_top_level_commas, dimension_attribute,
    split_parenthetical_suffix, type_keyword, DECLARATION_SEPARATOR,
};
use crate::catalog::record::{Dtype, ParameterRecord};
use crate::core::{CatalogResult, Diagnostic, DiagnosticCollector, SourceLocation};

/// Stands in for commas inside parentheses while the name list is split
const INDEX_COMMA: char = '\u{1f}';

/// Dtype named by a type spec such as `real(dp), dimension(3)`
pub fn dtype_of(type_spec: &str) -> Option<Dtype> {
    match type_keyword(type_spec)?.as_str() {
        "logical" => Some(Dtype::Bool),
        "character" => Some(Dtype::Str),
        "integer" => Some(Dtype::Int),
        "double precision" | "real" => Some(Dtype::Float),
        _ => None,
    }
}

/// Replaces commas nested in parentheses with a sentinel
pub fn mask_nested_commas(name_list: &str) -> String {
    let mut depth = 0usize;
    name_list
        .chars()
        .map(|ch| match ch {
            '(' => {
                depth += 1;
                ch
            }
            ')' => {
                depth = depth.saturating_sub(1);
                ch
            }
            ',' if depth > 0 => INDEX_COMMA,
            _ => ch,
        })
        .collect()
}

/// Splits `a(2,3), b, c(1)` into `["a(2,3)", "b", "c(1)"]`
pub fn split_name_list(name_list: &str) -> Vec<String> {
    mask_nested_commas(name_list)
        .split(',')
        .map(|piece| piece.replace(INDEX_COMMA, ",").trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// A name from a declaration with its rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredName {
    pub name: String,
    pub dim: usize,
}

/// Resolves one split piece into a bare name and its rank.
///
/// The piece's own index list wins over the `dimension(...)` attribute of the
/// type spec; without either the parameter is a scalar.
pub fn resolve_name(piece: &str, type_dim: Option<usize>) -> DeclaredName {
    let declarator = strip_initializer(piece).trim();
    let (base, suffix) = split_parenthetical_suffix(declarator);

    let dim = match suffix {
        Some(suffix) => count_top_level_commas(suffix_inner(suffix)) + 1,
        None => type_dim.unwrap_or(0),
    };

    // `name*len` is the old character length spelling
    let name = base.split('*').next().unwrap_or(base).trim().to_string();
    DeclaredName { name, dim }
}

/// All names of one declaration's name list, with ranks resolved
pub fn declared_names(type_spec: &str, name_list: &str) -> Vec<DeclaredName> {
    let type_dim = dimension_attribute(type_spec).map(|args| count_top_level_commas(args) + 1);
    split_name_list(name_list)
        .iter()
        .map(|piece| resolve_name(piece, type_dim))
        .filter(|declared| !declared.name.is_empty())
        .collect()
}

fn suffix_inner(suffix: &str) -> &str {
    let inner = suffix.strip_prefix('(').unwrap_or(suffix);
    inner.strip_suffix(')').unwrap_or(inner)
}

fn strip_initializer(piece: &str) -> &str {
    let mut depth = 0usize;
    for (idx, ch) in piece.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return &piece[..idx],
            _ => {}
        }
    }
    piece
}

/// Parses the definitions source of one group into declared records.
///
/// Scanning stops at `contains`. Unknown type keywords fall back to `Str`
/// with a warning. A dangling continuation aborts the whole file.
pub fn parse_declarations<S: AsRef<str>>(
    raw_lines: &[S],
    group: &str,
    source: &str,
    diagnostics: &mut DiagnosticCollector,
) -> CatalogResult<Vec<ParameterRecord>> {
    let cleaned = CleanedSource::from_lines(raw_lines);
    let mut records = Vec::new();

    for line in cleaned.logical_lines() {
        let line = line?;
        if begins_procedure_body(&line.text) {
            break;
        }
        let Some((type_spec, name_list)) = line.text.split_once(DECLARATION_SEPARATOR) else {
            continue;
        };
        let type_spec = type_spec.trim();

        let dtype = match dtype_of(type_spec) {
            Some(dtype) => dtype,
            None => {
                warn!("Unrecognised type '{}' in {}; treating as str", type_spec, source);
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "unrecognised type '{}', declared names kept as str",
                        type_spec
                    ))
                    .with_group(group)
                    .with_location(SourceLocation::new(source, Some(line.first_line))),
                );
                Dtype::Str
            }
        };

        for declared in declared_names(type_spec, name_list) {
            debug!("Declared {} {} (dim {}) in {}", dtype, declared.name, declared.dim, group);
            records.push(ParameterRecord::declared(declared.name, dtype, declared.dim, group));
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::{ParamValue, UNORDERED};
    use crate::core::CatalogError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_name_list() {
        let names = declared_names("real(dp)", "a(2,3), b, c(1)");
        let (names, dims): (Vec<_>, Vec<_>) = names.into_iter().map(|d| (d.name, d.dim)).unzip();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(dims, vec![2, 0, 1]);
    }

    #[test]
    fn test_resplitting_is_stable() {
        let once = split_name_list("a(2,3), b, c(1)");
        let twice: Vec<String> = once.iter().flat_map(|piece| split_name_list(piece)).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dimension_attribute() {
        let names = declared_names("real(dp), dimension(max_nz, 2)", "grid, other(5)");
        assert_eq!(
            names,
            vec![
                DeclaredName { name: "grid".into(), dim: 2 },
                DeclaredName { name: "other".into(), dim: 1 },
            ]
        );
    }

    #[test]
    fn test_nested_index_expressions() {
        let names = declared_names("integer", "lims(f(1,2), 3), n = 4, s*8");
        assert_eq!(
            names,
            vec![
                DeclaredName { name: "lims".into(), dim: 2 },
                DeclaredName { name: "n".into(), dim: 0 },
                DeclaredName { name: "s".into(), dim: 0 },
            ]
        );
    }

    #[test]
    fn test_dtype_keywords() {
        assert_eq!(dtype_of("logical"), Some(Dtype::Bool));
        assert_eq!(dtype_of("character (len=strlen)"), Some(Dtype::Str));
        assert_eq!(dtype_of("INTEGER"), Some(Dtype::Int));
        assert_eq!(dtype_of("real(dp), dimension(3)"), Some(Dtype::Float));
        assert_eq!(dtype_of("double precision"), Some(Dtype::Float));
        assert_eq!(dtype_of("type(star_info)"), None);
    }

    #[test]
    fn test_dtype_keyword_must_lead_the_spec() {
        assert_eq!(dtype_of("character(len=logical_len)"), Some(Dtype::Str));
        assert_eq!(dtype_of("double   precision"), Some(Dtype::Float));
        assert_eq!(dtype_of("type(real_pair)"), None);

        let source = ["type(real_pair) :: p"];
        let mut diagnostics = DiagnosticCollector::new();
        let records = parse_declarations(&source, "controls", "x.inc", &mut diagnostics).unwrap();
        assert_eq!(records[0].dtype(), Dtype::Str);
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_parse_declarations() {
        let source = [
            "! controls for the star",
            "logical :: use_Ledoux_criterion ! inline",
            "real(dp) :: mixing_length_alpha, &",
            "   alpha_semiconvection",
            "integer, dimension(2) :: pair",
            "namelist /controls/ mixing_length_alpha",
            "contains",
            "logical :: after_contains",
        ];
        let mut diagnostics = DiagnosticCollector::new();
        let records = parse_declarations(&source, "controls", "star_controls.inc", &mut diagnostics)
            .unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["use_Ledoux_criterion", "mixing_length_alpha", "alpha_semiconvection", "pair"]
        );
        assert!(records.iter().all(|r| r.order == UNORDERED && r.doc.is_empty()));
        assert_eq!(records[0].default, ParamValue::Bool(false));
        assert_eq!(records[1].default, ParamValue::Float(0.0));
        assert_eq!(records[3].dim, 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_type_falls_back_to_str() {
        let source = ["type(star_info) :: s"];
        let mut diagnostics = DiagnosticCollector::new();
        let records = parse_declarations(&source, "star_job", "x.inc", &mut diagnostics).unwrap();
        assert_eq!(records[0].dtype(), Dtype::Str);
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_malformed_continuation_aborts() {
        let source = ["logical :: a", "real(dp) :: b, &"];
        let mut diagnostics = DiagnosticCollector::new();
        let result = parse_declarations(&source, "g", "x.inc", &mut diagnostics);
        assert!(matches!(
            result,
            Err(CatalogError::MalformedContinuation { line: 2 })
        ));
    }
}
