//! Single-field normalizers. Every function maps one raw cell to one cleaned
//! value (or, for the table-wide helpers, applies such a mapping to each
//! cell) and keeps no state between calls.

pub mod classify;
pub mod fields;
pub mod numeric;

pub use classify::{
    LTM_EBITDA_COLUMN, LTM_REVENUE_COLUMN, TargetColumnMap, TargetRule, find_target_column,
    is_cad_currency,
};
pub use fields::{
    ColumnType, NULL_TOKENS, clean_dash_text, clean_phone, cleanse_column_names, modernize_nulls,
    parse_date, update_data_types,
};
pub use numeric::{clean_numeric_value, extract_text_content};
