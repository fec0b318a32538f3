//! The document-reading seam consumed by the comparison engine.
//!
//! A reader opens a workbook once, exposes its sheet list in native order,
//! and materializes per-sheet payloads on demand. Everything here is plain
//! data; readers decide how to fill it.

use std::fmt;

use crate::error::SourceResult;

/// Effective visibility of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Visible,
    Hidden,
    VeryHidden,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Visible => "Visible",
            Visibility::Hidden => "Hidden",
            Visibility::VeryHidden => "VeryHidden",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a workbook's sheet list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDescriptor {
    /// Tab name, unique within a workbook when compared case-insensitively
    pub name: String,
    /// The workbook's own sheet id (opaque)
    pub stable_id: String,
    /// Handle the reader uses to locate the sheet content (opaque)
    pub relationship_handle: String,
    pub hidden: bool,
    pub very_hidden: bool,
}

impl SheetDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stable_id: String::new(),
            relationship_handle: String::new(),
            hidden: false,
            very_hidden: false,
        }
    }

    /// Very hidden wins over hidden when both flags are set
    pub fn visibility(&self) -> Visibility {
        if self.very_hidden {
            Visibility::VeryHidden
        } else if self.hidden {
            Visibility::Hidden
        } else {
            Visibility::Visible
        }
    }

    /// Hidden in either sense
    pub fn is_hidden(&self) -> bool {
        self.hidden || self.very_hidden
    }

    /// Case-folded name used for matching sheets across workbooks
    pub fn key(&self) -> String {
        fold_case(&self.name)
    }
}

/// Case folding used for every case-insensitive key in the engine
pub fn fold_case(s: &str) -> String {
    s.to_uppercase()
}

/// One `<c>`-like cell entry as the reader found it, before any resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    /// Address as written in the document (e.g. "B7")
    pub address: String,
    /// Literal or cached value text; a shared-string index when
    /// `data_type` is `"s"`
    pub value: Option<String>,
    /// Formula source without a leading `=`
    pub formula: Option<String>,
    pub style_index: Option<u32>,
    /// Data-type tag (`"s"`, `"inlineStr"`, `"str"`, `"b"`, `"e"`, `"n"`)
    pub data_type: Option<String>,
}

impl RawCell {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn with_style(mut self, style_index: u32) -> Self {
        self.style_index = Some(style_index);
        self
    }

    pub fn with_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }
}

/// One data validation rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRule {
    /// Space separated target references
    pub sqref: String,
    pub rule_type: Option<String>,
    pub operator: Option<String>,
    pub formula1: Option<String>,
    pub formula2: Option<String>,
}

impl ValidationRule {
    /// Canonical `[sqref|type|operator|formula1|formula2]` rendering
    pub fn canonical(&self) -> String {
        format!(
            "[{}|{}|{}|{}|{}]",
            self.sqref,
            self.rule_type.as_deref().unwrap_or(""),
            self.operator.as_deref().unwrap_or(""),
            self.formula1.as_deref().unwrap_or(""),
            self.formula2.as_deref().unwrap_or(""),
        )
    }
}

/// An inclusive, 1-based range of hidden columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiddenColumnRange {
    pub min: u32,
    pub max: u32,
}

impl HiddenColumnRange {
    /// The `min-max` token used for comparison
    pub fn token(&self) -> String {
        format!("{}-{}", self.min, self.max)
    }
}

/// Everything the engine needs from one sheet.
///
/// Readers default absent parts to empty rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetData {
    /// Cells in document order
    pub cells: Vec<RawCell>,
    /// Declared dimension reference (e.g. "A1:D20"), if the document has one
    pub dimension: Option<String>,
    /// Validation rules in document order
    pub validations: Vec<ValidationRule>,
    /// Serialized conditional formatting blocks in document order
    pub conditional_formats: Vec<String>,
    pub hidden_columns: Vec<HiddenColumnRange>,
    /// 1-based indices of hidden rows
    pub hidden_rows: Vec<u32>,
}

/// A read-only view of one opened workbook
pub trait WorkbookSource {
    /// Sheet descriptors in native workbook order
    fn sheets(&self) -> &[SheetDescriptor];

    /// Materialize the payload of one sheet
    fn load_sheet(&mut self, sheet: &SheetDescriptor) -> SourceResult<SheetData>;

    /// Entry of the shared-string table
    fn shared_string(&self, index: usize) -> Option<&str>;

    /// Scan the style table for the number format code of a style index.
    ///
    /// This is uncached; callers that resolve many cells should memoize.
    fn number_format_for_style(&self, style_index: u32) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn very_hidden_takes_precedence() {
        let mut sheet = SheetDescriptor::new("Data");
        assert_eq!(sheet.visibility(), Visibility::Visible);
        sheet.hidden = true;
        assert_eq!(sheet.visibility(), Visibility::Hidden);
        sheet.very_hidden = true;
        assert_eq!(sheet.visibility(), Visibility::VeryHidden);
        assert!(sheet.is_hidden());
    }

    #[test]
    fn validation_canonical_form() {
        let rule = ValidationRule {
            sqref: "A1:A10".into(),
            rule_type: Some("whole".into()),
            operator: Some("between".into()),
            formula1: Some("1".into()),
            formula2: Some("10".into()),
        };
        assert_eq!(rule.canonical(), "[A1:A10|whole|between|1|10]");
        assert_eq!(ValidationRule::default().canonical(), "[||||]");
    }

    #[test]
    fn sheet_keys_ignore_case() {
        assert_eq!(
            SheetDescriptor::new("Sheet1").key(),
            SheetDescriptor::new("sHEET1").key()
        );
    }
}
