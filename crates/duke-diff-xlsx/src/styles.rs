//! XLSX styles (styles.xml) number-format table

use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// The parts of styles.xml needed to resolve a cell's number format.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct StyleTable {
    /// `numFmtId` of each `cellXfs/xf`, indexed by style index
    cell_xf_formats: Vec<u32>,
    /// Custom `numFmts` entries in document order
    custom_formats: Vec<(u32, String)>,
}

impl StyleTable {
    /// Number format code for a cell style index.
    ///
    /// Custom formats shadow built-in ones with the same id. Unknown
    /// style indices and unknown format ids resolve to `None`.
    pub(crate) fn number_format_code(&self, style_index: u32) -> Option<String> {
        let num_fmt_id = *self.cell_xf_formats.get(style_index as usize)?;

        self.custom_formats
            .iter()
            .find(|(id, _)| *id == num_fmt_id)
            .map(|(_, code)| code.clone())
            .or_else(|| builtin_format_code(num_fmt_id).map(str::to_string))
    }

    pub(crate) fn style_count(&self) -> usize {
        self.cell_xf_formats.len()
    }
}

/// Built-in number format codes by id
pub(crate) fn builtin_format_code(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

fn num_fmt_id_attr(e: &BytesStart<'_>) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| attr.unescape_value().ok()?.parse().ok())
        .unwrap_or(0)
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<StyleTable> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut table = StyleTable::default();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => table.cell_xf_formats.push(num_fmt_id_attr(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"xf" if in_cell_xfs => table.cell_xf_formats.push(num_fmt_id_attr(&e)),
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        table.custom_formats.push((id, code));
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(table)
}
