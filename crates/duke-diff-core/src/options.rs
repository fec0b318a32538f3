//! Comparison toggles

/// Selects which comparison dimensions a run performs.
///
/// Every flag is independent; no flag implies another and any combination
/// is valid. The sheet-level stage (added/removed sheets and visibility)
/// always runs regardless of these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ComparisonOptions {
    /// Compare resolved cell value text ("Value" records)
    pub compare_values: bool,
    /// Compare formula source ("Formula" records)
    pub compare_formulas: bool,
    /// Scan sheets that are hidden or very hidden on either side
    pub include_hidden_sheets: bool,
    /// Compare zero-based sheet positions ("SheetOrderIndex" records)
    pub compare_sheet_order: bool,
    /// Compare used ranges ("UsedRange" records)
    pub compare_used_range: bool,
    /// Compare data validation rules ("DataValidation" records)
    pub compare_validations: bool,
    /// Compare conditional formatting blocks ("ConditionalFormatting" records)
    pub compare_conditional_formats: bool,
    /// Compare hidden rows and columns ("HiddenRows"/"HiddenColumns" records)
    pub compare_hidden_rows_cols: bool,
    /// Compare style index and number format ("StyleIndex"/"NumberFormat" records)
    pub compare_cell_format: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            compare_values: true,
            compare_formulas: true,
            include_hidden_sheets: true,
            compare_sheet_order: true,
            compare_used_range: true,
            compare_validations: true,
            compare_conditional_formats: false,
            compare_hidden_rows_cols: false,
            compare_cell_format: false,
        }
    }
}

impl ComparisonOptions {
    /// Every flag enabled
    pub fn all() -> Self {
        Self {
            compare_values: true,
            compare_formulas: true,
            include_hidden_sheets: true,
            compare_sheet_order: true,
            compare_used_range: true,
            compare_validations: true,
            compare_conditional_formats: true,
            compare_hidden_rows_cols: true,
            compare_cell_format: true,
        }
    }

    /// Every flag disabled
    pub fn none() -> Self {
        Self {
            compare_values: false,
            compare_formulas: false,
            include_hidden_sheets: false,
            compare_sheet_order: false,
            compare_used_range: false,
            compare_validations: false,
            compare_conditional_formats: false,
            compare_hidden_rows_cols: false,
            compare_cell_format: false,
        }
    }

    pub fn with_values(mut self, on: bool) -> Self {
        self.compare_values = on;
        self
    }

    pub fn with_formulas(mut self, on: bool) -> Self {
        self.compare_formulas = on;
        self
    }

    pub fn with_hidden_sheets(mut self, on: bool) -> Self {
        self.include_hidden_sheets = on;
        self
    }

    pub fn with_sheet_order(mut self, on: bool) -> Self {
        self.compare_sheet_order = on;
        self
    }

    pub fn with_used_range(mut self, on: bool) -> Self {
        self.compare_used_range = on;
        self
    }

    pub fn with_validations(mut self, on: bool) -> Self {
        self.compare_validations = on;
        self
    }

    pub fn with_conditional_formats(mut self, on: bool) -> Self {
        self.compare_conditional_formats = on;
        self
    }

    pub fn with_hidden_rows_cols(mut self, on: bool) -> Self {
        self.compare_hidden_rows_cols = on;
        self
    }

    pub fn with_cell_format(mut self, on: bool) -> Self {
        self.compare_cell_format = on;
        self
    }

    /// Whether any cell-level dimension is enabled.
    ///
    /// When this is false the cell stage does not run at all, so no "Cell"
    /// added/removed records are produced either.
    pub fn compares_cells(&self) -> bool {
        self.compare_values || self.compare_formulas || self.compare_cell_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let o = ComparisonOptions::default();
        assert!(o.compare_values);
        assert!(o.compare_formulas);
        assert!(o.include_hidden_sheets);
        assert!(o.compare_sheet_order);
        assert!(o.compare_used_range);
        assert!(o.compare_validations);
        assert!(!o.compare_conditional_formats);
        assert!(!o.compare_hidden_rows_cols);
        assert!(!o.compare_cell_format);
    }

    #[test]
    fn builders_touch_one_flag() {
        let o = ComparisonOptions::none().with_formulas(true);
        assert_eq!(
            o,
            ComparisonOptions {
                compare_formulas: true,
                ..ComparisonOptions::none()
            }
        );
        assert!(o.compares_cells());
        assert!(!ComparisonOptions::none().compares_cells());
    }

    #[test]
    fn cell_stage_needs_one_cell_dimension() {
        let no_text = ComparisonOptions::default()
            .with_values(false)
            .with_formulas(false);
        assert!(!no_text.compares_cells());
        assert!(no_text.with_cell_format(true).compares_cells());
        assert!(ComparisonOptions::none().with_values(true).compares_cells());
    }
}
