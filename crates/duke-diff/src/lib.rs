//! # duke-diff
//!
//! Compares two spreadsheet workbooks and reports their differences as a
//! flat, deterministically ordered list of [`DiffRecord`]s.
//!
//! A comparison covers sheet presence and visibility, sheet order, and for
//! every sheet present in both workbooks its used range, data validations,
//! conditional formatting, hidden rows and columns, and cells (value,
//! formula, style index, number format). Each dimension can be switched off
//! through [`ComparisonOptions`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duke_diff::{compare, CancelToken, ComparisonOptions, NoProgress};
//!
//! let options = ComparisonOptions::default();
//! let result = compare("old.xlsx", "new.xlsx", &options, &NoProgress, &CancelToken::new())?;
//!
//! for record in &result {
//!     println!("{}", record);
//! }
//! # Ok::<(), duke_diff::ComparisonError>(())
//! ```
//!
//! ## Background comparisons
//!
//! ```rust,no_run
//! use duke_diff::{spawn_comparison, ComparisonOptions};
//!
//! let job = spawn_comparison("old.xlsx", "new.xlsx", ComparisonOptions::all(), |pct: u8, msg: &str| {
//!     eprintln!("{:3}% {}", pct, msg);
//! });
//! // job.cancel() stops it at the next sheet boundary
//! let result = job.join()?;
//! # Ok::<(), duke_diff::ComparisonError>(())
//! ```

mod cells;
mod engine;
mod error;
mod job;
mod number_format;
mod sheets;
mod union;

pub use cells::{CellRecord, CellSnapshot};
pub use engine::{compare, DiffEngine};
pub use error::{ComparisonError, ComparisonOutcome};
pub use job::{spawn_comparison, ComparisonJob};
pub use number_format::NumberFormatResolver;

pub use duke_diff_core::{
    category, CancelToken, ComparisonOptions, ComparisonResult, DiffCounts, DiffKind, DiffRecord,
    NoProgress, ProgressSink, SheetSummary, WorkbookSource,
};
