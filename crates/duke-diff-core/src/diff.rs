//! Diff records and the comparison result container

use std::collections::BTreeMap;
use std::fmt;

/// Category tags naming the comparison dimension that produced a record.
pub mod category {
    pub const SHEET: &str = "Sheet";
    pub const SHEET_VISIBILITY: &str = "SheetVisibility";
    pub const SHEET_ORDER_INDEX: &str = "SheetOrderIndex";
    pub const CELL: &str = "Cell";
    pub const VALUE: &str = "Value";
    pub const FORMULA: &str = "Formula";
    pub const STYLE_INDEX: &str = "StyleIndex";
    pub const NUMBER_FORMAT: &str = "NumberFormat";
    pub const USED_RANGE: &str = "UsedRange";
    pub const DATA_VALIDATION: &str = "DataValidation";
    pub const CONDITIONAL_FORMATTING: &str = "ConditionalFormatting";
    pub const HIDDEN_COLUMNS: &str = "HiddenColumns";
    pub const HIDDEN_ROWS: &str = "HiddenRows";
}

/// Rendered states for sheet presence records
const PRESENT: &str = "Present";
const MISSING: &str = "Missing";

/// What happened to the compared item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Added => "Added",
            DiffKind::Removed => "Removed",
            DiffKind::Modified => "Modified",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic difference between two workbooks.
///
/// `sheet` is empty for workbook-level records and `address` is empty for
/// anything that is not a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffRecord {
    pub sheet: String,
    pub address: String,
    pub kind: DiffKind,
    pub category: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl DiffRecord {
    pub fn new(
        sheet: impl Into<String>,
        address: impl Into<String>,
        kind: DiffKind,
        category: impl Into<String>,
        before: Option<String>,
        after: Option<String>,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            address: address.into(),
            kind,
            category: category.into(),
            before,
            after,
        }
    }

    /// A sheet that exists only in the newer workbook
    pub fn sheet_added(sheet: impl Into<String>) -> Self {
        Self::new(
            sheet,
            "",
            DiffKind::Added,
            category::SHEET,
            Some(MISSING.to_string()),
            Some(PRESENT.to_string()),
        )
    }

    /// A sheet that exists only in the older workbook
    pub fn sheet_removed(sheet: impl Into<String>) -> Self {
        Self::new(
            sheet,
            "",
            DiffKind::Removed,
            category::SHEET,
            Some(PRESENT.to_string()),
            Some(MISSING.to_string()),
        )
    }

    /// A non-cell property of a sheet that differs on both sides
    pub fn sheet_modified(
        sheet: impl Into<String>,
        category: impl Into<String>,
        before: Option<String>,
        after: Option<String>,
    ) -> Self {
        Self::new(sheet, "", DiffKind::Modified, category, before, after)
    }

    /// A cell present only in the newer workbook
    pub fn cell_added(
        sheet: impl Into<String>,
        address: impl Into<String>,
        summary: Option<String>,
    ) -> Self {
        Self::new(sheet, address, DiffKind::Added, category::CELL, None, summary)
    }

    /// A cell present only in the older workbook
    pub fn cell_removed(
        sheet: impl Into<String>,
        address: impl Into<String>,
        summary: Option<String>,
    ) -> Self {
        Self::new(sheet, address, DiffKind::Removed, category::CELL, summary, None)
    }

    /// One differing dimension of a cell present on both sides
    pub fn cell_modified(
        sheet: impl Into<String>,
        address: impl Into<String>,
        category: impl Into<String>,
        before: Option<String>,
        after: Option<String>,
    ) -> Self {
        Self::new(sheet, address, DiffKind::Modified, category, before, after)
    }

    /// `Sheet!A1`, `Sheet`, or empty, depending on which parts are set
    pub fn location(&self) -> String {
        match (self.sheet.is_empty(), self.address.is_empty()) {
            (false, false) => format!("{}!{}", self.sheet, self.address),
            (false, true) => self.sheet.clone(),
            (true, false) => self.address.clone(),
            (true, true) => String::new(),
        }
    }
}

impl fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {} -> {}",
            self.kind,
            self.category,
            self.location(),
            self.before.as_deref().unwrap_or("(none)"),
            self.after.as_deref().unwrap_or("(none)"),
        )
    }
}

/// Added/removed/modified tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffCounts {
    fn record(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::Added => self.added += 1,
            DiffKind::Removed => self.removed += 1,
            DiffKind::Modified => self.modified += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Per-sheet tallies; workbook-level records group under an empty name
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetSummary {
    pub sheet: String,
    pub counts: DiffCounts,
}

/// The ordered output of one comparison run.
///
/// Records are only ever appended; once a run hands the result back it
/// is not mutated further.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonResult {
    records: Vec<DiffRecord>,
}

impl ComparisonResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DiffRecord) {
        self.records.push(record);
    }

    pub fn extend<I: IntoIterator<Item = DiffRecord>>(&mut self, records: I) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DiffRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose category matches exactly
    pub fn filter_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiffRecord> + 'a {
        self.records.iter().filter(move |r| r.category == category)
    }

    /// Overall tallies
    pub fn counts(&self) -> DiffCounts {
        let mut counts = DiffCounts::default();
        for record in &self.records {
            counts.record(record.kind);
        }
        counts
    }

    /// Group by sheet name and count by kind, ordered by sheet name
    pub fn summary(&self) -> Vec<SheetSummary> {
        let mut by_sheet: BTreeMap<&str, DiffCounts> = BTreeMap::new();
        for record in &self.records {
            by_sheet
                .entry(record.sheet.as_str())
                .or_default()
                .record(record.kind);
        }

        by_sheet
            .into_iter()
            .map(|(sheet, counts)| SheetSummary {
                sheet: sheet.to_string(),
                counts,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ComparisonResult {
    type Item = &'a DiffRecord;
    type IntoIter = std::slice::Iter<'a, DiffRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<DiffRecord> for ComparisonResult {
    fn from_iter<I: IntoIterator<Item = DiffRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
