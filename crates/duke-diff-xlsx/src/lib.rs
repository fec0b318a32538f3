//! # duke-diff-xlsx
//!
//! XLSX (Office Open XML) reader for duke-diff.
//!
//! [`XlsxWorkbook`] opens a package once, reads the sheet list, shared strings
//! and style table eagerly, and parses individual worksheets on demand through
//! the [`WorkbookSource`](duke_diff_core::WorkbookSource) trait.
//! [`PackageWriter`] produces minimal packages, mainly for fixtures.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxWorkbook;
pub use writer::PackageWriter;
