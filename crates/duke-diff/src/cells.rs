//! Cell snapshots and the cell-level diff

use std::collections::BTreeMap;

use duke_diff_core::{
    category, CellAddress, ComparisonOptions, DiffRecord, RawCell, WorkbookSource,
};

use crate::number_format::NumberFormatResolver;
use crate::union::{union_by_key, Presence};

/// Resolved state of one cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellRecord {
    /// Displayed text with shared strings resolved
    pub value_text: Option<String>,
    /// Formula source without a leading `=`
    pub formula_text: Option<String>,
    pub style_index: Option<u32>,
    /// Only resolved when format comparison is on
    pub number_format_code: Option<String>,
}

impl CellRecord {
    pub fn has_content(&self) -> bool {
        self.value_text.is_some() || self.formula_text.is_some()
    }

    /// One-line rendering used for added/removed cells.
    ///
    /// Joins the enabled dimensions with ` | `; `None` when nothing enabled
    /// has anything to show. Empty value or formula text counts as nothing.
    pub fn summary(&self, options: &ComparisonOptions) -> Option<String> {
        let mut parts = Vec::new();
        if options.compare_formulas {
            if let Some(formula) = self.formula_text.as_deref().filter(|f| !f.is_empty()) {
                parts.push(format!("={}", formula));
            }
        }
        if options.compare_values {
            if let Some(value) = self.value_text.as_deref().filter(|v| !v.is_empty()) {
                parts.push(value.to_string());
            }
        }
        if options.compare_cell_format {
            parts.push(format!(
                "style:{} nf:{}",
                self.style_index.map(|s| s.to_string()).unwrap_or_default(),
                self.number_format_code.as_deref().unwrap_or("")
            ));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }
}

/// Every retained cell of one sheet, keyed by upper-case A1 address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSnapshot {
    cells: BTreeMap<String, CellRecord>,
}

impl CellSnapshot {
    /// Resolve a sheet's raw cells against its workbook.
    ///
    /// A cell is kept when it has a value or a formula, or when format
    /// comparison is on and it carries a style. Repeated addresses keep the
    /// last occurrence.
    pub fn build<S>(
        cells: &[RawCell],
        source: &S,
        formats: &mut NumberFormatResolver,
        options: &ComparisonOptions,
    ) -> Self
    where
        S: WorkbookSource + ?Sized,
    {
        let mut snapshot = BTreeMap::new();

        for raw in cells {
            if raw.address.is_empty() {
                log::debug!("skipping cell without an address");
                continue;
            }

            let record = CellRecord {
                value_text: resolve_value(raw, source),
                formula_text: raw.formula.clone(),
                style_index: raw.style_index,
                number_format_code: match (options.compare_cell_format, raw.style_index) {
                    (true, Some(style)) => formats.resolve(source, style),
                    _ => None,
                },
            };

            let keep = record.has_content()
                || (options.compare_cell_format && record.style_index.is_some());
            if !keep {
                continue;
            }

            let key = CellAddress::normalize(&raw.address);
            if snapshot.insert(key, record).is_some() {
                log::warn!("duplicate cell address {}; keeping the last one", raw.address);
            }
        }

        Self { cells: snapshot }
    }

    pub fn get(&self, address: &str) -> Option<&CellRecord> {
        self.cells.get(&CellAddress::normalize(address))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Addresses in ascending key order
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

fn resolve_value<S>(raw: &RawCell, source: &S) -> Option<String>
where
    S: WorkbookSource + ?Sized,
{
    let value = raw.value.as_ref()?;
    if raw.data_type.as_deref() == Some("s") {
        let resolved = value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| source.shared_string(index));
        return match resolved {
            Some(text) => Some(text.to_string()),
            None => {
                log::warn!("unresolved shared string '{}' at {}", value, raw.address);
                Some(value.clone())
            }
        };
    }
    Some(value.clone())
}

fn differs(before: Option<&str>, after: Option<&str>) -> bool {
    before.unwrap_or("") != after.unwrap_or("")
}

/// Append the cell-level records for one sheet, in address order.
///
/// Within a single address, modified dimensions come out as value, formula,
/// style index, then number format.
pub fn diff_cells(
    sheet: &str,
    before: &CellSnapshot,
    after: &CellSnapshot,
    options: &ComparisonOptions,
    out: &mut Vec<DiffRecord>,
) {
    for (address, presence) in union_by_key(&before.cells, &after.cells) {
        match presence {
            Presence::Left(old) => {
                out.push(DiffRecord::cell_removed(sheet, address, old.summary(options)));
            }
            Presence::Right(new) => {
                out.push(DiffRecord::cell_added(sheet, address, new.summary(options)));
            }
            Presence::Both(old, new) => {
                if options.compare_values
                    && differs(old.value_text.as_deref(), new.value_text.as_deref())
                {
                    out.push(DiffRecord::cell_modified(
                        sheet,
                        address,
                        category::VALUE,
                        old.value_text.clone(),
                        new.value_text.clone(),
                    ));
                }
                if options.compare_formulas
                    && differs(old.formula_text.as_deref(), new.formula_text.as_deref())
                {
                    out.push(DiffRecord::cell_modified(
                        sheet,
                        address,
                        category::FORMULA,
                        old.formula_text.clone(),
                        new.formula_text.clone(),
                    ));
                }
                if options.compare_cell_format {
                    if old.style_index != new.style_index {
                        out.push(DiffRecord::cell_modified(
                            sheet,
                            address,
                            category::STYLE_INDEX,
                            old.style_index.map(|s| s.to_string()),
                            new.style_index.map(|s| s.to_string()),
                        ));
                    }
                    if differs(
                        old.number_format_code.as_deref(),
                        new.number_format_code.as_deref(),
                    ) {
                        out.push(DiffRecord::cell_modified(
                            sheet,
                            address,
                            category::NUMBER_FORMAT,
                            old.number_format_code.clone(),
                            new.number_format_code.clone(),
                        ));
                    }
                }
            }
        }
    }
}
