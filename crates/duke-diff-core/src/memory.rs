//! In-memory workbook source
//!
//! Lets callers (and tests) feed the comparison engine without a file on
//! disk. Sheets are kept in insertion order, which becomes the workbook's
//! sheet order.

use std::collections::HashMap;

use crate::error::SourceResult;
use crate::source::{SheetData, SheetDescriptor, WorkbookSource};

/// A workbook held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetDescriptor>,
    payloads: Vec<SheetData>,
    shared_strings: Vec<String>,
    number_formats: HashMap<u32, String>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visible sheet
    pub fn with_sheet(self, name: impl Into<String>, data: SheetData) -> Self {
        self.with_descriptor(SheetDescriptor::new(name), data)
    }

    /// Append a sheet with an explicit descriptor (for hidden sheets)
    pub fn with_descriptor(mut self, mut descriptor: SheetDescriptor, data: SheetData) -> Self {
        let position = self.sheets.len() + 1;
        if descriptor.stable_id.is_empty() {
            descriptor.stable_id = position.to_string();
        }
        if descriptor.relationship_handle.is_empty() {
            descriptor.relationship_handle = format!("rId{}", position);
        }
        self.sheets.push(descriptor);
        self.payloads.push(data);
        self
    }

    pub fn with_shared_strings<I, S>(mut self, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_strings = strings.into_iter().map(Into::into).collect();
        self
    }

    /// Register the number-format code a style index resolves to
    pub fn with_number_format(mut self, style_index: u32, code: impl Into<String>) -> Self {
        self.number_formats.insert(style_index, code.into());
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheets(&self) -> &[SheetDescriptor] {
        &self.sheets
    }

    fn load_sheet(&mut self, sheet: &SheetDescriptor) -> SourceResult<SheetData> {
        // An unknown handle reads as an empty sheet, like a dangling relationship
        Ok(self
            .sheets
            .iter()
            .position(|s| s.relationship_handle == sheet.relationship_handle)
            .and_then(|i| self.payloads.get(i).cloned())
            .unwrap_or_default())
    }

    fn shared_string(&self, index: usize) -> Option<&str> {
        self.shared_strings.get(index).map(String::as_str)
    }

    fn number_format_for_style(&self, style_index: u32) -> Option<String> {
        self.number_formats.get(&style_index).cloned()
    }
}
