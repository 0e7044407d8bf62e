//! Cell value normalization.
//!
//! Every normalized field goes through [`normalize_cell`]; the tabular null
//! marker (including NA text such as `N/A`) becomes the empty string,
//! anything else its text form.

use cmdi_model::CellValue;

/// Converts a cell to text, returning the empty string for "no data".
pub fn normalize_cell(cell: &CellValue) -> String {
    if cell.is_null() {
        String::new()
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use cmdi_model::NA_TOKENS;

    use super::*;

    #[test]
    fn empty_cell_is_empty_string() {
        assert_eq!(normalize_cell(&CellValue::Empty), "");
    }

    #[test]
    fn formula_error_is_empty_string() {
        assert_eq!(normalize_cell(&CellValue::Error("#REF!".to_string())), "");
    }

    #[test]
    fn nan_is_empty_string() {
        assert_eq!(normalize_cell(&CellValue::Float(f64::NAN)), "");
    }

    #[test]
    fn text_is_kept_verbatim() {
        assert_eq!(normalize_cell(&CellValue::from(" Kraków ")), " Kraków ");
    }

    #[test]
    fn numbers_and_dates_render() {
        assert_eq!(normalize_cell(&CellValue::Float(1920.0)), "1920");
        assert_eq!(normalize_cell(&CellValue::Int(7)), "7");
        assert_eq!(normalize_cell(&CellValue::Bool(true)), "true");
        let date = NaiveDate::from_ymd_opt(1834, 6, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            normalize_cell(&CellValue::DateTime(date)),
            "1834-06-28 00:00:00"
        );
    }

    #[test]
    fn na_text_is_empty_string() {
        assert_eq!(normalize_cell(&CellValue::from("N/A")), "");
        assert_eq!(normalize_cell(&CellValue::from("NULL")), "");
        assert_eq!(normalize_cell(&CellValue::from("NAP")), "NAP");
    }

    proptest! {
        #[test]
        fn text_cells_pass_through(text in ".*") {
            prop_assume!(!NA_TOKENS.contains(&text.as_str()));
            prop_assert_eq!(normalize_cell(&CellValue::Text(text.clone())), text);
        }

        #[test]
        fn finite_floats_never_empty(value in proptest::num::f64::NORMAL) {
            prop_assert!(!normalize_cell(&CellValue::Float(value)).is_empty());
        }
    }
}
