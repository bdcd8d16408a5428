//! Property tests for literal typing, name-list splitting and line reassembly.

use inlist_catalog::catalog::{CatalogRow, ParameterRecord};
use inlist_catalog::parser::declarations::split_name_list;
use inlist_catalog::parser::{classify_literal, full_line};
use inlist_catalog::ParamValue;
use proptest::prelude::*;

proptest! {
    #[test]
    fn boolean_spellings_in_any_case(word in "\\.[tT][rR][uU][eE]\\.|\\.[tT]\\.") {
        let c = classify_literal(&word);
        prop_assert_eq!(c.value, ParamValue::Bool(true));
        prop_assert!(!c.fallback);
    }

    #[test]
    fn false_spellings_in_any_case(word in "\\.[fF][aA][lL][sS][eE]\\.|\\.[fF]\\.") {
        prop_assert_eq!(classify_literal(&word).value, ParamValue::Bool(false));
    }

    #[test]
    fn quoted_text_stays_verbatim(before in "[a-z0-9 .]{0,8}", after in "[a-z0-9 .]{0,8}", quote in "['\"]") {
        let literal = format!("{}{}{}", before, quote, after);
        prop_assert_eq!(classify_literal(&literal).value, ParamValue::Str(literal.clone()));
    }

    #[test]
    fn integer_literals(literal in "-?[0-9]{1,15}") {
        let expected: i64 = literal.parse().unwrap();
        prop_assert_eq!(classify_literal(&literal).value, ParamValue::Int(expected));
    }

    #[test]
    fn d_and_e_exponents_agree(mantissa in "[0-9]{1,4}\\.[0-9]{1,4}", exponent in "[+-]?[0-9]{1,2}") {
        let with_d = classify_literal(&format!("{}d{}", mantissa, exponent));
        let with_e = classify_literal(&format!("{}E{}", mantissa, exponent));
        prop_assert!(matches!(with_d.value, ParamValue::Float(_)));
        prop_assert_eq!(with_d.value, with_e.value);
    }

    #[test]
    fn splitting_never_breaks_index_lists(
        names in prop::collection::vec("[a-z][a-z_]{0,6}", 1..5),
        dims in prop::collection::vec(0usize..4, 1..5),
    ) {
        let pieces: Vec<String> = names
            .iter()
            .zip(dims.iter().cycle())
            .map(|(name, &dim)| match dim {
                0 => name.clone(),
                n => format!("{}({})", name, vec!["2"; n].join(",")),
            })
            .collect();
        let split = split_name_list(&pieces.join(", "));
        prop_assert_eq!(split, pieces);
    }

    #[test]
    fn continuation_joins_two_lines(head in "[a-z][a-z0-9 =]{0,10}[a-z0-9]", tail in "[a-z0-9+][a-z0-9 +]{0,10}") {
        let lines = vec![format!("{} &", head), tail.clone()];
        let line = full_line(&lines, 0).unwrap();
        prop_assert_eq!(line.text, format!("{} {}", head, tail.trim()));
        prop_assert_eq!(line.consumed, 2);
    }

    #[test]
    fn rows_round_trip(value in prop_oneof![
        any::<bool>().prop_map(ParamValue::Bool),
        any::<i64>().prop_map(ParamValue::Int),
        (-1.0e300f64..1.0e300).prop_map(ParamValue::Float),
        "'[a-z ]{0,10}'".prop_map(ParamValue::Str),
    ]) {
        let record = ParameterRecord::new("p", value, 0, 3, "controls", "! ### p");
        let row: CatalogRow = record.to_row();
        prop_assert_eq!(ParameterRecord::from_row(row).unwrap(), record);
    }
}

#[test]
fn continuation_example() {
    let line = full_line(&["x = 1 &", "+ 2"], 0).unwrap();
    assert_eq!(line.text, "x = 1 + 2");
    assert_eq!(line.consumed, 2);
}
