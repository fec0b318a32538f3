//! The comparison driver

use std::path::Path;

use duke_diff_core::{
    CancelToken, ComparisonOptions, ComparisonResult, ProgressSink, WorkbookSource,
};
use duke_diff_xlsx::XlsxWorkbook;

use crate::cells::{diff_cells, CellSnapshot};
use crate::error::{ComparisonError, ComparisonOutcome};
use crate::number_format::NumberFormatResolver;
use crate::sheets::{diff_sheet_order, diff_sheet_structure, match_sheets, SheetPair};

/// Forwards to the caller's sink, never letting the percentage go backwards
struct Progress<'a> {
    sink: &'a dyn ProgressSink,
    last: u8,
}

impl<'a> Progress<'a> {
    fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: 0 }
    }

    fn report(&mut self, percent: u8, message: &str) {
        let percent = percent.clamp(self.last, 100);
        self.last = percent;
        self.sink.report(percent, message);
    }
}

/// Percentage reported when entering sheet `index` of `total`
fn sheet_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 10;
    }
    (10 + index * 85 / total).min(95) as u8
}

fn check_cancelled(cancel: &CancelToken) -> ComparisonOutcome<()> {
    if cancel.is_cancelled() {
        log::info!("comparison cancelled");
        Err(ComparisonError::Cancelled)
    } else {
        Ok(())
    }
}

/// Compares two workbooks under a fixed set of options.
///
/// # Example
///
/// ```rust
/// use duke_diff::DiffEngine;
/// use duke_diff_core::{
///     CancelToken, ComparisonOptions, MemoryWorkbook, NoProgress, RawCell, SheetData,
/// };
///
/// let cells = |v: &str| SheetData {
///     cells: vec![RawCell::new("A1").with_value(v)],
///     ..SheetData::default()
/// };
/// let mut old = MemoryWorkbook::new().with_sheet("Sheet1", cells("5"));
/// let mut new = MemoryWorkbook::new().with_sheet("Sheet1", cells("7"));
///
/// let engine = DiffEngine::new(ComparisonOptions::default());
/// let result = engine
///     .compare_sources(&mut old, &mut new, &NoProgress, &CancelToken::new())
///     .unwrap();
///
/// assert_eq!(result.len(), 1);
/// assert_eq!(result.records()[0].category, "Value");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine {
    options: ComparisonOptions,
}

impl DiffEngine {
    pub fn new(options: ComparisonOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ComparisonOptions {
        &self.options
    }

    /// Open two workbook files and compare them
    pub fn compare_files<P, Q>(
        &self,
        path_a: P,
        path_b: Q,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> ComparisonOutcome<ComparisonResult>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        check_cancelled(cancel)?;

        let mut before = open_workbook(path_a.as_ref())?;
        let mut after = open_workbook(path_b.as_ref())?;

        self.compare_sources(&mut before, &mut after, progress, cancel)
    }

    /// Compare two already-open workbooks.
    ///
    /// Records come out in this order: sheet presence and visibility (by
    /// case-folded name), sheet order (by the older workbook's order), then
    /// for each sheet present in both its structure records followed by its
    /// cell records in address order.
    ///
    /// Sheets are matched case-insensitively. A sheet present on both sides
    /// is reported under the older workbook's spelling of its name, so
    /// swapping the inputs can change the case of `sheet` on its records.
    pub fn compare_sources<A, B>(
        &self,
        before: &mut A,
        after: &mut B,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> ComparisonOutcome<ComparisonResult>
    where
        A: WorkbookSource + ?Sized,
        B: WorkbookSource + ?Sized,
    {
        let mut progress = Progress::new(progress);
        check_cancelled(cancel)?;
        progress.report(1, "Opened workbooks");

        let sheets_before = before.sheets().to_vec();
        let sheets_after = after.sheets().to_vec();
        let mut records = Vec::new();

        let pairs = match_sheets(&sheets_before, &sheets_after, &mut records);
        progress.report(5, "Compared sheet lists");

        if self.options.compare_sheet_order {
            diff_sheet_order(&sheets_before, &sheets_after, &mut records);
        }

        let visited: Vec<&SheetPair> = pairs
            .iter()
            .filter(|pair| {
                let skip = !self.options.include_hidden_sheets && pair.either_hidden();
                if skip {
                    log::debug!("skipping hidden sheet '{}'", pair.name());
                }
                !skip
            })
            .collect();

        let total = visited.len();
        let mut formats_before = NumberFormatResolver::new();
        let mut formats_after = NumberFormatResolver::new();

        for (index, pair) in visited.iter().enumerate() {
            check_cancelled(cancel)?;
            progress.report(
                sheet_percent(index, total),
                &format!("Comparing '{}' ({}/{})", pair.name(), index + 1, total),
            );

            let data_before = before.load_sheet(&pair.before)?;
            let data_after = after.load_sheet(&pair.after)?;

            diff_sheet_structure(
                pair.name(),
                &data_before,
                &data_after,
                &self.options,
                &mut records,
            );

            if self.options.compares_cells() {
                let cells_before = CellSnapshot::build(
                    &data_before.cells,
                    &*before,
                    &mut formats_before,
                    &self.options,
                );
                let cells_after = CellSnapshot::build(
                    &data_after.cells,
                    &*after,
                    &mut formats_after,
                    &self.options,
                );
                diff_cells(
                    pair.name(),
                    &cells_before,
                    &cells_after,
                    &self.options,
                    &mut records,
                );
            }
        }

        progress.report(100, "Comparison complete");
        log::debug!(
            "compared {} sheet(s), {} difference(s)",
            total,
            records.len()
        );

        Ok(records.into_iter().collect())
    }
}

fn open_workbook(path: &Path) -> ComparisonOutcome<XlsxWorkbook> {
    log::debug!("opening {}", path.display());
    XlsxWorkbook::open(path).map_err(|err| err.into_source_error(path).into())
}

/// Compare the workbooks at `path_a` (older) and `path_b` (newer).
///
/// Fails with [`ComparisonError::Cancelled`] as soon as `cancel` is observed
/// set; no partial result is returned.
pub fn compare<P, Q>(
    path_a: P,
    path_b: Q,
    options: &ComparisonOptions,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ComparisonOutcome<ComparisonResult>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    DiffEngine::new(*options).compare_files(path_a, path_b, progress, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_diff_core::{
        DiffKind, DiffRecord, MemoryWorkbook, NoProgress, RawCell, SheetData, SheetDescriptor,
    };
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn sheet(cells: &[(&str, &str)]) -> SheetData {
        SheetData {
            cells: cells
                .iter()
                .map(|(addr, value)| RawCell::new(*addr).with_value(*value))
                .collect(),
            ..SheetData::default()
        }
    }

    fn hidden(name: &str) -> SheetDescriptor {
        let mut descriptor = SheetDescriptor::new(name);
        descriptor.hidden = true;
        descriptor
    }

    fn run(
        before: &mut MemoryWorkbook,
        after: &mut MemoryWorkbook,
        options: ComparisonOptions,
    ) -> ComparisonResult {
        DiffEngine::new(options)
            .compare_sources(before, after, &NoProgress, &CancelToken::new())
            .unwrap()
    }

    #[test]
    fn sheet_added_and_removed() {
        let mut a = MemoryWorkbook::new()
            .with_sheet("Sheet1", SheetData::default())
            .with_sheet("Sheet2", SheetData::default());
        let mut b = MemoryWorkbook::new()
            .with_sheet("Sheet1", SheetData::default())
            .with_sheet("Sheet3", SheetData::default());

        let result = run(&mut a, &mut b, ComparisonOptions::default());
        assert_eq!(
            result.records(),
            &[
                DiffRecord::sheet_removed("Sheet2"),
                DiffRecord::sheet_added("Sheet3"),
            ]
        );
    }

    #[test]
    fn structure_precedes_cells() {
        let mut a = MemoryWorkbook::new().with_sheet("S", sheet(&[("A1", "1")]));
        let mut b = MemoryWorkbook::new().with_sheet("S", sheet(&[("A1", "2"), ("C3", "x")]));

        let result = run(&mut a, &mut b, ComparisonOptions::default());
        let categories: Vec<&str> = result.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["UsedRange", "Value", "Cell"]);
    }

    #[test]
    fn hidden_sheets_are_skipped_unless_included() {
        let mut a = MemoryWorkbook::new().with_descriptor(hidden("Calc"), sheet(&[("A1", "1")]));
        let mut b = MemoryWorkbook::new().with_descriptor(hidden("Calc"), sheet(&[("A1", "2")]));

        let excluded = ComparisonOptions::default().with_hidden_sheets(false);
        assert!(run(&mut a, &mut b, excluded).is_empty());

        let included = run(&mut a, &mut b, ComparisonOptions::default());
        assert_eq!(included.len(), 1);
        assert_eq!(included.records()[0].kind, DiffKind::Modified);
    }

    #[test]
    fn visibility_change_reported_even_when_content_skipped() {
        let mut a = MemoryWorkbook::new().with_sheet("Calc", sheet(&[("A1", "1")]));
        let mut b = MemoryWorkbook::new().with_descriptor(hidden("Calc"), sheet(&[("A1", "2")]));

        let result = run(
            &mut a,
            &mut b,
            ComparisonOptions::default().with_hidden_sheets(false),
        );
        assert_eq!(
            result.records(),
            &[DiffRecord::sheet_modified(
                "Calc",
                "SheetVisibility",
                Some("Visible".into()),
                Some("Hidden".into()),
            )]
        );
    }

    #[test]
    fn cell_stage_off_without_cell_dimensions() {
        let mut a = MemoryWorkbook::new().with_sheet("S", sheet(&[("A1", "1")]));
        let mut b = MemoryWorkbook::new().with_sheet("S", sheet(&[("B2", "1")]));

        let options = ComparisonOptions::default()
            .with_values(false)
            .with_formulas(false)
            .with_used_range(false);
        assert!(run(&mut a, &mut b, options).is_empty());
    }

    #[test]
    fn values_off_drops_cell_records_only_with_other_cell_dimensions_off() {
        let mut a = MemoryWorkbook::new().with_sheet("S", sheet(&[("A1", "1")]));
        let mut b = MemoryWorkbook::new().with_sheet("S", sheet(&[("A1", "1"), ("B2", "x")]));
        let base = ComparisonOptions::none().with_values(true);

        let with_values = run(&mut a, &mut b, base);
        assert_eq!(
            with_values.records(),
            &[DiffRecord::cell_added("S", "B2", Some("x".into()))]
        );

        assert!(run(&mut a, &mut b, base.with_values(false)).is_empty());

        let formulas_only = run(&mut a, &mut b, base.with_values(false).with_formulas(true));
        assert_eq!(
            formulas_only.records(),
            &[DiffRecord::cell_added("S", "B2", None)]
        );
    }

    #[test]
    fn records_use_the_older_workbooks_sheet_spelling() {
        let mut a = MemoryWorkbook::new()
            .with_sheet("Data", sheet(&[("A1", "1")]))
            .with_sheet("Notes", SheetData::default());
        let mut b = MemoryWorkbook::new()
            .with_sheet("Notes", SheetData::default())
            .with_sheet("DATA", sheet(&[("A1", "2")]));
        let options = ComparisonOptions::default().with_used_range(false);

        let forward = run(&mut a, &mut b, options);
        let backward = run(&mut b, &mut a, options);
        assert!(forward.iter().any(|r| r.sheet == "Data" && r.category == "SheetOrderIndex"));
        assert!(forward.iter().any(|r| r.sheet == "Data" && r.category == "Value"));
        assert!(backward.iter().any(|r| r.sheet == "DATA" && r.category == "SheetOrderIndex"));
        assert!(forward.iter().all(|r| r.sheet != "DATA"));
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let mut a = MemoryWorkbook::new()
            .with_sheet("One", SheetData::default())
            .with_sheet("Two", SheetData::default())
            .with_sheet("Three", SheetData::default());
        let mut b = a.clone();

        let seen = RefCell::new(Vec::new());
        let sink = |percent: u8, message: &str| {
            seen.borrow_mut().push((percent, message.to_string()));
        };

        DiffEngine::default()
            .compare_sources(&mut a, &mut b, &sink, &CancelToken::new())
            .unwrap();

        let seen = seen.into_inner();
        let percents: Vec<u8> = seen.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![1, 5, 10, 38, 66, 100]);
        assert_eq!(seen[3].1, "Comparing 'Two' (2/3)");
    }

    #[test]
    fn cancel_before_start() {
        let mut a = MemoryWorkbook::new().with_sheet("S", SheetData::default());
        let mut b = a.clone();
        let cancel = CancelToken::new();
        cancel.cancel();

        let calls = RefCell::new(0);
        let sink = |_: u8, _: &str| *calls.borrow_mut() += 1;

        let err = DiffEngine::default()
            .compare_sources(&mut a, &mut b, &sink, &cancel)
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(calls.into_inner(), 0);
    }

    #[test]
    fn cancel_during_sheet_loop() {
        let mut a = MemoryWorkbook::new()
            .with_sheet("One", sheet(&[("A1", "1")]))
            .with_sheet("Two", sheet(&[("A1", "1")]));
        let mut b = MemoryWorkbook::new()
            .with_sheet("One", sheet(&[("A1", "2")]))
            .with_sheet("Two", sheet(&[("A1", "2")]));

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let sink = move |percent: u8, _: &str| {
            if percent >= 10 {
                trigger.cancel();
            }
        };

        let err = DiffEngine::default()
            .compare_sources(&mut a, &mut b, &sink, &cancel)
            .unwrap_err();
        assert!(matches!(err, ComparisonError::Cancelled));
    }

    #[test]
    fn sheet_percent_spreads_over_the_loop() {
        assert_eq!(sheet_percent(0, 0), 10);
        assert_eq!(sheet_percent(0, 1), 10);
        assert_eq!(sheet_percent(1, 2), 52);
        assert_eq!(sheet_percent(99, 100), 94);
    }
}
