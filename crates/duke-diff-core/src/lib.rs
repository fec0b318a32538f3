//! # duke-diff-core
//!
//! Core data structures for the duke-diff workbook comparison engine.
//!
//! This crate has no I/O of its own. It provides:
//! - [`ComparisonOptions`] - The toggles selecting which comparison dimensions run
//! - [`DiffRecord`] and [`ComparisonResult`] - The output of a comparison
//! - [`ProgressSink`] and [`CancelToken`] - The progress/cancellation channel
//! - [`WorkbookSource`] - The seam a document reader implements so the engine can
//!   consume it (sheet descriptors, per-sheet payloads, shared strings, styles)
//! - [`MemoryWorkbook`] - A `WorkbookSource` built in memory
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//!
//! ## Example
//!
//! ```rust
//! use duke_diff_core::{ComparisonOptions, DiffKind, DiffRecord, ComparisonResult};
//!
//! let options = ComparisonOptions::default().with_cell_format(true);
//! assert!(options.compare_values);
//!
//! let mut result = ComparisonResult::new();
//! result.push(DiffRecord::sheet_added("Summary"));
//! assert_eq!(result.counts().added, 1);
//! assert_eq!(result.records()[0].kind, DiffKind::Added);
//! ```

pub mod address;
pub mod diff;
pub mod error;
pub mod memory;
pub mod options;
pub mod progress;
pub mod source;

pub use address::{CellAddress, CellRange};
pub use diff::{category, ComparisonResult, DiffCounts, DiffKind, DiffRecord, SheetSummary};
pub use error::{Error, Result, SourceError, SourceResult};
pub use memory::MemoryWorkbook;
pub use options::ComparisonOptions;
pub use progress::{CancelToken, NoProgress, ProgressSink};
pub use source::{
    fold_case, HiddenColumnRange, RawCell, SheetData, SheetDescriptor, ValidationRule, Visibility,
    WorkbookSource,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
