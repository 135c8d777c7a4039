use serde::{Deserialize, Serialize};

use crate::finsheet::tools::model::CellValue;

/// Canonical column receiving values annotated as last-twelve-months.
pub const LTM_EBITDA_COLUMN: &str = "LTM EBITDA";
/// Canonical column receiving values annotated as trailing-twelve-months.
pub const LTM_REVENUE_COLUMN: &str = "LTM Revenue";

const CAD_MARKERS: [&str; 2] = ["cad", "c$"];

/// Returns `true` when the cell text carries a Canadian dollar marker.
pub fn is_cad_currency(value: &CellValue) -> bool {
    match value {
        CellValue::Text(text) => {
            let lowered = text.to_lowercase();
            CAD_MARKERS.iter().any(|marker| lowered.contains(marker))
        }
        CellValue::Missing | CellValue::Number(_) => false,
    }
}

/// Keyword to canonical column association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    pub keyword: String,
    pub column: String,
}

impl TargetRule {
    pub fn new(keyword: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            column: column.into(),
        }
    }
}

/// Ordered keyword rules resolving extracted text to a destination column.
/// Matching is a case-insensitive substring test and the first rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetColumnMap {
    rules: Vec<TargetRule>,
}

impl Default for TargetColumnMap {
    fn default() -> Self {
        Self {
            rules: vec![
                TargetRule::new("ltm", LTM_EBITDA_COLUMN),
                TargetRule::new("ttm", LTM_REVENUE_COLUMN),
            ],
        }
    }
}

impl TargetColumnMap {
    pub fn new(rules: Vec<TargetRule>) -> Self {
        Self { rules }
    }

    pub fn resolve(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.column.as_str())
    }
}

/// Resolves `text` against the default `ltm` / `ttm` rules.
pub fn find_target_column(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    if lowered.contains("ltm") {
        Some(LTM_EBITDA_COLUMN)
    } else if lowered.contains("ttm") {
        Some(LTM_REVENUE_COLUMN)
    } else {
        None
    }
}
