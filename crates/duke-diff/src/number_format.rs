//! Style index to number-format code resolution

use ahash::AHashMap;
use duke_diff_core::WorkbookSource;

/// Memoizing resolver for one workbook.
///
/// A resolver is created per comparison run and per side, so nothing is
/// shared between concurrent comparisons.
#[derive(Debug, Default)]
pub struct NumberFormatResolver {
    cache: AHashMap<u32, Option<String>>,
}

impl NumberFormatResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number-format code for a style index, or `None` if the workbook has
    /// no style table or the index is out of range
    pub fn resolve<S>(&mut self, source: &S, style_index: u32) -> Option<String>
    where
        S: WorkbookSource + ?Sized,
    {
        self.cache
            .entry(style_index)
            .or_insert_with(|| source.number_format_for_style(style_index))
            .clone()
    }

    /// Number of distinct style indexes looked up so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
