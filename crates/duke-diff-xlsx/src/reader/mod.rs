//! XLSX reader

mod worksheet;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_styles_xml, StyleTable};
use duke_diff_core::{SheetData, SheetDescriptor, SourceError, SourceResult, WorkbookSource};

pub(crate) use worksheet::read_worksheet_xml;

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

pub(crate) fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// An opened XLSX package.
///
/// The sheet list, shared strings, and style table are read when the package
/// is opened; worksheets are parsed when [`WorkbookSource::load_sheet`] asks
/// for them. The archive is only ever read.
pub struct XlsxWorkbook<R = BufReader<File>> {
    archive: zip::ZipArchive<R>,
    label: String,
    sheets: Vec<SheetDescriptor>,
    /// Relationship id -> part path inside the archive
    part_paths: HashMap<String, String>,
    shared_strings: Vec<String>,
    styles: StyleTable,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Open a workbook from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path.display().to_string())
    }
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Open a workbook from a reader; `label` names it in log and error messages
    pub fn from_reader(reader: R, label: impl Into<String>) -> XlsxResult<Self> {
        let label = label.into();
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let sheets = Self::read_workbook_xml(&mut archive)?;
        let part_paths = Self::read_workbook_rels(&mut archive)?;
        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;

        log::debug!(
            "opened {}: {} sheets, {} shared strings, {} cell styles",
            label,
            sheets.len(),
            shared_strings.len(),
            styles.style_count()
        );

        Ok(Self {
            archive,
            label,
            sheets,
            part_paths,
            shared_strings,
            styles,
        })
    }

    /// Label given when the workbook was opened (usually its path)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parse one worksheet part.
    ///
    /// A sheet whose relationship or part cannot be found yields an empty
    /// payload instead of an error.
    pub fn read_sheet(&mut self, sheet: &SheetDescriptor) -> XlsxResult<SheetData> {
        let path = match self.part_paths.get(&sheet.relationship_handle) {
            Some(path) => path.clone(),
            None => {
                log::warn!(
                    "{}: sheet '{}' has no part for relationship '{}'",
                    self.label,
                    sheet.name,
                    sheet.relationship_handle
                );
                return Ok(SheetData::default());
            }
        };

        let mut file = match self.archive.by_name(&path) {
            Ok(f) => f,
            Err(_) => {
                log::warn!("{}: sheet part '{}' is missing", self.label, path);
                return Ok(SheetData::default());
            }
        };

        let mut xml = String::new();
        file.read_to_string(&mut xml)?;
        read_worksheet_xml(&xml)
    }

    /// Read workbook.xml to get the ordered sheet list
    fn read_workbook_xml(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<SheetDescriptor>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut saw_sheet_list = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheets" => {
                    saw_sheet_list = true;
                }
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut descriptor = SheetDescriptor::new(String::new());
                    let mut has_name = false;

                    for attr in e.attributes().flatten() {
                        let value = match attr.unescape_value() {
                            Ok(value) => value,
                            Err(_) => continue,
                        };
                        match attr.key.as_ref() {
                            b"name" => {
                                descriptor.name = value.to_string();
                                has_name = true;
                            }
                            b"sheetId" => descriptor.stable_id = value.to_string(),
                            b"state" => match &*value {
                                "hidden" => descriptor.hidden = true,
                                "veryHidden" => descriptor.very_hidden = true,
                                _ => {}
                            },
                            // r:id, whatever prefix the relationships namespace got
                            key if key.ends_with(b":id") => {
                                descriptor.relationship_handle = value.to_string();
                            }
                            _ => {}
                        }
                    }

                    if has_name {
                        sheets.push(descriptor);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !saw_sheet_list {
            return Err(XlsxError::MissingPart("sheet list in xl/workbook.xml".into()));
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet part paths
    fn read_workbook_rels(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = match archive.by_name("xl/_rels/workbook.xml.rels") {
            Ok(f) => f,
            Err(_) => return Ok(HashMap::new()),
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target)) = (id, target) {
                        // Target is relative to xl/ folder unless absolute
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        rels.insert(id, full_path);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the shared strings table
    fn read_shared_strings(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs carry reading hints, not cell text
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles(archive: &mut zip::ZipArchive<R>) -> XlsxResult<StyleTable> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(StyleTable::default()),
        }
    }
}

impl<R: Read + Seek> WorkbookSource for XlsxWorkbook<R> {
    fn sheets(&self) -> &[SheetDescriptor] {
        &self.sheets
    }

    fn load_sheet(&mut self, sheet: &SheetDescriptor) -> SourceResult<SheetData> {
        self.read_sheet(sheet).map_err(|e| {
            SourceError::malformed(format!("{}: sheet '{}': {}", self.label, sheet.name, e))
        })
    }

    fn shared_string(&self, index: usize) -> Option<&str> {
        self.shared_strings.get(index).map(String::as_str)
    }

    fn number_format_for_style(&self, style_index: u32) -> Option<String> {
        self.styles.number_format_code(style_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_excel_escapes() {
        assert_eq!(decode_excel_escapes("plain"), "plain");
        assert_eq!(decode_excel_escapes("a_x000d__x000a_b"), "a\r\nb");
        assert_eq!(decode_excel_escapes("_x005f_x0041_"), "_x0041_");
        assert_eq!(decode_excel_escapes("_x00G1_"), "_x00G1_");
        assert_eq!(decode_excel_escapes("tail_x12"), "tail_x12");
    }

    #[test]
    fn truthy_attribute_values() {
        assert!(is_true("1"));
        assert!(is_true("TRUE"));
        assert!(!is_true("0"));
    }
}
