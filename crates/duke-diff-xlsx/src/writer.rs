//! Minimal XLSX package writer
//!
//! Writes just enough of a package for [`XlsxWorkbook`](crate::XlsxWorkbook)
//! to read it back: content types, relationships, the sheet list, optional
//! shared strings and styles, and caller-supplied worksheet bodies.

use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    state: Option<&'static str>,
    body: String,
}

/// Builder for small XLSX packages.
///
/// Sheet bodies are the inner XML of `<worksheet>`, e.g.
/// `<sheetData><row r="1"><c r="A1"><v>5</v></c></row></sheetData>`.
#[derive(Debug, Clone, Default)]
pub struct PackageWriter {
    sheets: Vec<SheetEntry>,
    shared_strings: Option<Vec<String>>,
    styles_xml: Option<String>,
}

impl PackageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visible sheet
    pub fn sheet(self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.push_sheet(name.into(), None, body.into())
    }

    /// Append a sheet with `state="hidden"`
    pub fn hidden_sheet(self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.push_sheet(name.into(), Some("hidden"), body.into())
    }

    /// Append a sheet with `state="veryHidden"`
    pub fn very_hidden_sheet(self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.push_sheet(name.into(), Some("veryHidden"), body.into())
    }

    /// Write `xl/sharedStrings.xml` with these entries
    pub fn shared_strings<I, S>(mut self, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_strings = Some(strings.into_iter().map(Into::into).collect());
        self
    }

    /// Write `xl/styles.xml` verbatim
    pub fn styles(mut self, styles_xml: impl Into<String>) -> Self {
        self.styles_xml = Some(styles_xml.into());
        self
    }

    fn push_sheet(mut self, name: String, state: Option<&'static str>, body: String) -> Self {
        self.sheets.push(SheetEntry { name, state, body });
        self
    }

    /// Write the package to a file path
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        self.write(file)
    }

    /// Write the package into memory
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        zip.start_file("[Content_Types].xml", file_options())?;
        zip.write_all(self.content_types().as_bytes())?;

        zip.start_file("_rels/.rels", file_options())?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
                REL_NS
            )
            .as_bytes(),
        )?;

        zip.start_file("xl/workbook.xml", file_options())?;
        zip.write_all(self.workbook_xml().as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", file_options())?;
        zip.write_all(self.workbook_rels().as_bytes())?;

        if let Some(strings) = &self.shared_strings {
            zip.start_file("xl/sharedStrings.xml", file_options())?;
            let mut xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
                MAIN_NS,
                strings.len(),
                strings.len()
            );
            for s in strings {
                xml.push_str(&format!(
                    r#"<si><t xml:space="preserve">{}</t></si>"#,
                    escape_xml(s)
                ));
            }
            xml.push_str("</sst>");
            zip.write_all(xml.as_bytes())?;
        }

        if let Some(styles) = &self.styles_xml {
            zip.start_file("xl/styles.xml", file_options())?;
            zip.write_all(styles.as_bytes())?;
        }

        for (i, sheet) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), file_options())?;
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}" xmlns:r="{}">{}</worksheet>"#,
                    MAIN_NS, REL_NS, sheet.body
                )
                .as_bytes(),
            )?;
        }

        zip.finish()?;
        Ok(())
    }

    fn content_types(&self) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for i in 0..self.sheets.len() {
            content.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }
        content.push_str("</Types>");
        content
    }

    fn workbook_xml(&self) -> String {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}"><sheets>"#,
            MAIN_NS, REL_NS
        );
        for (i, sheet) in self.sheets.iter().enumerate() {
            let state = sheet
                .state
                .map(|s| format!(r#" state="{}""#, s))
                .unwrap_or_default();
            content.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                i + 1,
                state,
                i + 1
            ));
        }
        content.push_str("</sheets></workbook>");
        content
    }

    fn workbook_rels(&self) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 0..self.sheets.len() {
            content.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                REL_NS,
                i + 1
            ));
        }
        content.push_str("</Relationships>");
        content
    }
}

fn file_options() -> zip::write::SimpleFileOptions {
    zip::write::SimpleFileOptions::default()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
