//! End-to-end tests: write a package with `PackageWriter`, read it back with
//! `XlsxWorkbook` through the `WorkbookSource` seam.

use std::io::{Cursor, Write};

use duke_diff_core::{HiddenColumnRange, RawCell, SheetDescriptor, WorkbookSource};
use duke_diff_xlsx::{PackageWriter, XlsxError, XlsxWorkbook};
use pretty_assertions::assert_eq;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.0%"/></numFmts>
  <cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="4"/></cellXfs>
</styleSheet>"#;

fn open(bytes: Vec<u8>) -> XlsxWorkbook<Cursor<Vec<u8>>> {
    XlsxWorkbook::from_reader(Cursor::new(bytes), "memory").unwrap()
}

#[test]
fn test_sheet_list_and_visibility() {
    let bytes = PackageWriter::new()
        .sheet("Summary", "<sheetData/>")
        .hidden_sheet("Lookup", "<sheetData/>")
        .very_hidden_sheet("Secret", "<sheetData/>")
        .to_bytes()
        .unwrap();

    let wb = open(bytes);
    let sheets = wb.sheets();
    assert_eq!(sheets.len(), 3);

    assert_eq!(sheets[0].name, "Summary");
    assert_eq!(sheets[0].stable_id, "1");
    assert_eq!(sheets[0].relationship_handle, "rId1");
    assert!(!sheets[0].hidden && !sheets[0].very_hidden);

    assert_eq!(sheets[1].name, "Lookup");
    assert!(sheets[1].hidden);
    assert!(!sheets[1].very_hidden);

    assert_eq!(sheets[2].name, "Secret");
    assert!(sheets[2].very_hidden);
}

#[test]
fn test_sheet_names_are_unescaped() {
    let bytes = PackageWriter::new()
        .sheet("P&L <2024>", "<sheetData/>")
        .to_bytes()
        .unwrap();
    let wb = open(bytes);
    assert_eq!(wb.sheets()[0].name, "P&L <2024>");
}

#[test]
fn test_shared_strings_and_cells() {
    let body = r#"<dimension ref="A1:B2"/><sheetData>
        <row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" s="1"><v>0.25</v></c></row>
        <row r="2"><c r="A2"><f>B1*2</f><v>0.5</v></c><c r="B2" t="str"><f>"a"&amp;"b"</f><v>ab</v></c></row>
    </sheetData>"#;
    let bytes = PackageWriter::new()
        .sheet("Data", body)
        .shared_strings(["first", "  padded  "])
        .styles(STYLES)
        .to_bytes()
        .unwrap();

    let mut wb = open(bytes);
    assert_eq!(wb.shared_string(0), Some("first"));
    assert_eq!(wb.shared_string(1), Some("  padded  "));
    assert_eq!(wb.shared_string(2), None);

    let sheet = wb.sheets()[0].clone();
    let data = wb.load_sheet(&sheet).unwrap();
    assert_eq!(data.dimension.as_deref(), Some("A1:B2"));
    assert_eq!(
        data.cells,
        vec![
            RawCell::new("A1").with_value("1").with_type("s"),
            RawCell::new("B1").with_value("0.25").with_style(1),
            RawCell::new("A2").with_value("0.5").with_formula("B1*2"),
            RawCell::new("B2")
                .with_value("ab")
                .with_formula("\"a\"&\"b\"")
                .with_type("str"),
        ]
    );
}

#[test]
fn test_number_format_lookup() {
    let bytes = PackageWriter::new()
        .sheet("Data", "<sheetData/>")
        .styles(STYLES)
        .to_bytes()
        .unwrap();
    let wb = open(bytes);
    assert_eq!(wb.number_format_for_style(0).as_deref(), Some("General"));
    assert_eq!(wb.number_format_for_style(1).as_deref(), Some("0.0%"));
    assert_eq!(wb.number_format_for_style(2).as_deref(), Some("#,##0.00"));
    assert_eq!(wb.number_format_for_style(3), None);
}

#[test]
fn test_missing_styles_resolve_to_none() {
    let bytes = PackageWriter::new()
        .sheet("Data", "<sheetData/>")
        .to_bytes()
        .unwrap();
    let wb = open(bytes);
    assert_eq!(wb.number_format_for_style(0), None);
}

#[test]
fn test_hidden_rows_and_columns() {
    let body = r#"<cols><col min="3" max="4" hidden="1"/><col min="1" max="1" hidden="0"/></cols>
        <sheetData><row r="5" hidden="1"/><row r="2" hidden="1"><c r="A2"><v>1</v></c></row></sheetData>"#;
    let bytes = PackageWriter::new().sheet("S", body).to_bytes().unwrap();
    let mut wb = open(bytes);
    let sheet = wb.sheets()[0].clone();
    let data = wb.load_sheet(&sheet).unwrap();
    assert_eq!(data.hidden_columns, vec![HiddenColumnRange { min: 3, max: 4 }]);
    // document order; the engine sorts
    assert_eq!(data.hidden_rows, vec![5, 2]);
}

#[test]
fn test_unknown_relationship_yields_empty_sheet() {
    let bytes = PackageWriter::new()
        .sheet("S", "<sheetData/>")
        .to_bytes()
        .unwrap();
    let mut wb = open(bytes);
    let mut ghost = SheetDescriptor::new("Ghost");
    ghost.relationship_handle = "rId99".into();
    let data = wb.load_sheet(&ghost).unwrap();
    assert!(data.cells.is_empty());
}

#[test]
fn test_not_a_zip_is_open_failure() {
    let err = XlsxWorkbook::from_reader(Cursor::new(b"plain text".to_vec()), "bad")
        .err()
        .unwrap();
    assert!(err.is_open_failure(), "got {err}");
}

#[test]
fn test_missing_content_types_is_open_failure() {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"hi").unwrap();
        zip.finish().unwrap();
    }
    let err = XlsxWorkbook::from_reader(Cursor::new(buf), "bad").err().unwrap();
    assert!(matches!(err, XlsxError::InvalidFormat(_)));
}

#[test]
fn test_missing_workbook_part_is_malformed() {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        zip.start_file("[Content_Types].xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.finish().unwrap();
    }
    let err = XlsxWorkbook::from_reader(Cursor::new(buf), "bad").err().unwrap();
    assert!(matches!(err, XlsxError::MissingPart(_)));
    assert!(!err.is_open_failure());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = XlsxWorkbook::open(dir.path().join("nope.xlsx")).err().unwrap();
    assert!(matches!(err, XlsxError::Io(_)));
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    PackageWriter::new()
        .sheet("One", r#"<sheetData><row r="1"><c r="A1"><v>5</v></c></row></sheetData>"#)
        .write_file(&path)
        .unwrap();

    let mut wb = XlsxWorkbook::open(&path).unwrap();
    assert_eq!(wb.label(), path.display().to_string());
    let sheet = wb.sheets()[0].clone();
    let data = wb.load_sheet(&sheet).unwrap();
    assert_eq!(data.cells, vec![RawCell::new("A1").with_value("5")]);
}
