//! Sheet-level comparisons: presence, visibility, order and per-sheet
//! structure (used range, validations, conditional formats, hidden rows
//! and columns)

use std::collections::BTreeMap;

use duke_diff_core::{
    category, CellAddress, CellRange, ComparisonOptions, DiffRecord, SheetData, SheetDescriptor,
};

use crate::union::{union_by_key, Presence};

/// A sheet present in both workbooks
#[derive(Debug, Clone)]
pub(crate) struct SheetPair {
    pub before: SheetDescriptor,
    pub after: SheetDescriptor,
}

impl SheetPair {
    /// Records carry the older workbook's spelling of the name
    pub fn name(&self) -> &str {
        &self.before.name
    }

    pub fn either_hidden(&self) -> bool {
        self.before.is_hidden() || self.after.is_hidden()
    }
}

fn keyed(sheets: &[SheetDescriptor]) -> BTreeMap<String, SheetDescriptor> {
    let mut map = BTreeMap::new();
    for sheet in sheets {
        if map.insert(sheet.key(), sheet.clone()).is_some() {
            log::warn!("sheet name '{}' appears twice ignoring case", sheet.name);
        }
    }
    map
}

/// Match sheets by case-folded name.
///
/// Emits added/removed and visibility records in folded-name order and
/// returns the pairs present on both sides, in the same order.
pub(crate) fn match_sheets(
    before: &[SheetDescriptor],
    after: &[SheetDescriptor],
    out: &mut Vec<DiffRecord>,
) -> Vec<SheetPair> {
    let before = keyed(before);
    let after = keyed(after);
    let mut pairs = Vec::new();

    for (_, presence) in union_by_key(&before, &after) {
        match presence {
            Presence::Left(old) => out.push(DiffRecord::sheet_removed(&old.name)),
            Presence::Right(new) => out.push(DiffRecord::sheet_added(&new.name)),
            Presence::Both(old, new) => {
                if old.hidden != new.hidden || old.very_hidden != new.very_hidden {
                    out.push(DiffRecord::sheet_modified(
                        &old.name,
                        category::SHEET_VISIBILITY,
                        Some(old.visibility().to_string()),
                        Some(new.visibility().to_string()),
                    ));
                }
                pairs.push(SheetPair {
                    before: old.clone(),
                    after: new.clone(),
                });
            }
        }
    }

    pairs
}

/// Report sheets whose zero-based position moved, walking the older
/// workbook's native order
pub(crate) fn diff_sheet_order(
    before: &[SheetDescriptor],
    after: &[SheetDescriptor],
    out: &mut Vec<DiffRecord>,
) {
    for (old_index, sheet) in before.iter().enumerate() {
        let key = sheet.key();
        let new_index = match after.iter().position(|s| s.key() == key) {
            Some(index) => index,
            None => continue,
        };
        if new_index != old_index {
            out.push(DiffRecord::sheet_modified(
                &sheet.name,
                category::SHEET_ORDER_INDEX,
                Some(old_index.to_string()),
                Some(new_index.to_string()),
            ));
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// The declared dimension, or a range from A1 covering every cell with a
/// value or formula. Empty when neither exists.
pub(crate) fn used_range(data: &SheetData) -> String {
    if let Some(dimension) = data.dimension.as_deref().map(str::trim) {
        if !dimension.is_empty() {
            return dimension.to_string();
        }
    }

    let positions = data
        .cells
        .iter()
        .filter(|c| c.value.is_some() || c.formula.is_some())
        .filter_map(|c| CellAddress::parse(&c.address).ok());

    CellRange::covering_from_origin(positions)
        .map(|range| range.to_a1_string())
        .unwrap_or_default()
}

fn validation_text(data: &SheetData) -> String {
    data.validations.iter().map(|v| v.canonical()).collect()
}

fn hidden_column_tokens(data: &SheetData) -> Vec<String> {
    let mut tokens: Vec<String> = data.hidden_columns.iter().map(|c| c.token()).collect();
    tokens.sort();
    tokens
}

fn hidden_row_numbers(data: &SheetData) -> Vec<u32> {
    let mut rows = data.hidden_rows.clone();
    rows.sort_unstable();
    rows
}

fn join<T: ToString>(items: &[T], sep: &str) -> Option<String> {
    non_empty(
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(sep),
    )
}

/// Structure records for one sheet, in a fixed order: used range,
/// validations, conditional formats, hidden columns, hidden rows
pub(crate) fn diff_sheet_structure(
    sheet: &str,
    before: &SheetData,
    after: &SheetData,
    options: &ComparisonOptions,
    out: &mut Vec<DiffRecord>,
) {
    if options.compare_used_range {
        let (old, new) = (used_range(before), used_range(after));
        if old != new {
            out.push(DiffRecord::sheet_modified(
                sheet,
                category::USED_RANGE,
                non_empty(old),
                non_empty(new),
            ));
        }
    }

    if options.compare_validations {
        let (old, new) = (validation_text(before), validation_text(after));
        if old != new {
            out.push(DiffRecord::sheet_modified(
                sheet,
                category::DATA_VALIDATION,
                non_empty(old),
                non_empty(new),
            ));
        }
    }

    if options.compare_conditional_formats
        && before.conditional_formats != after.conditional_formats
    {
        out.push(DiffRecord::sheet_modified(
            sheet,
            category::CONDITIONAL_FORMATTING,
            join(&before.conditional_formats, "\n"),
            join(&after.conditional_formats, "\n"),
        ));
    }

    if options.compare_hidden_rows_cols {
        let (old, new) = (hidden_column_tokens(before), hidden_column_tokens(after));
        if old != new {
            out.push(DiffRecord::sheet_modified(
                sheet,
                category::HIDDEN_COLUMNS,
                join(&old, ","),
                join(&new, ","),
            ));
        }

        let (old, new) = (hidden_row_numbers(before), hidden_row_numbers(after));
        if old != new {
            out.push(DiffRecord::sheet_modified(
                sheet,
                category::HIDDEN_ROWS,
                join(&old, ","),
                join(&new, ","),
            ));
        }
    }
}
