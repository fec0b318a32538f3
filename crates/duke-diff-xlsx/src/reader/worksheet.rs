//! Worksheet part parsing

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{decode_excel_escapes, is_true};
use crate::error::{XlsxError, XlsxResult};
use duke_diff_core::{HiddenColumnRange, RawCell, SheetData, ValidationRule};

/// Value of a single attribute, unescaped
fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

fn cell_from_attrs(e: &BytesStart<'_>) -> RawCell {
    let mut cell = RawCell::default();
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                cell.address = attr
                    .unescape_value()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
            }
            b"t" => {
                cell.data_type = attr.unescape_value().ok().map(|s| s.to_string());
            }
            b"s" => {
                cell.style_index = attr.unescape_value().ok().and_then(|s| s.parse().ok());
            }
            _ => {}
        }
    }
    cell
}

fn validation_from_attrs(e: &BytesStart<'_>) -> ValidationRule {
    ValidationRule {
        sqref: attr_value(e, b"sqref").unwrap_or_default(),
        rule_type: attr_value(e, b"type"),
        operator: attr_value(e, b"operator"),
        formula1: None,
        formula2: None,
    }
}

fn hidden_row(e: &BytesStart<'_>) -> Option<u32> {
    let hidden = attr_value(e, b"hidden").map_or(false, |s| is_true(&s));
    if !hidden {
        return None;
    }
    attr_value(e, b"r").and_then(|s| s.parse().ok())
}

fn hidden_columns(e: &BytesStart<'_>) -> Option<HiddenColumnRange> {
    let hidden = attr_value(e, b"hidden").map_or(false, |s| is_true(&s));
    if !hidden {
        return None;
    }
    let min = attr_value(e, b"min").and_then(|s| s.parse().ok())?;
    let max = attr_value(e, b"max").and_then(|s| s.parse().ok()).unwrap_or(min);
    Some(HiddenColumnRange { min, max })
}

/// Text element a run of character data belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    InlineText,
    Formula1,
    Formula2,
}

/// Parse a worksheet part into the payload the engine compares.
///
/// Every `<conditionalFormatting>` element is kept verbatim, sliced out of
/// `xml` by byte position, so comparisons see exactly what was written.
pub(crate) fn read_worksheet_xml(xml: &str) -> XlsxResult<SheetData> {
    let mut xml_reader = Reader::from_str(xml);

    let mut data = SheetData::default();

    let mut current_cell: Option<RawCell> = None;
    let mut current_validation: Option<ValidationRule> = None;
    let mut target = TextTarget::None;
    let mut in_inline_str = false;
    let mut in_phonetic = false;
    let mut cf_start: Option<usize> = None;

    loop {
        let event_start = xml_reader.buffer_position();
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"dimension" => data.dimension = attr_value(&e, b"ref"),
                b"row" => data.hidden_rows.extend(hidden_row(&e)),
                b"col" => data.hidden_columns.extend(hidden_columns(&e)),
                b"c" => current_cell = Some(cell_from_attrs(&e)),
                b"v" if current_cell.is_some() => target = TextTarget::Value,
                b"f" if current_cell.is_some() => target = TextTarget::Formula,
                b"is" if current_cell.is_some() => in_inline_str = true,
                b"rPh" if in_inline_str => in_phonetic = true,
                b"t" if in_inline_str && !in_phonetic => target = TextTarget::InlineText,
                b"dataValidation" => current_validation = Some(validation_from_attrs(&e)),
                b"formula1" if current_validation.is_some() => target = TextTarget::Formula1,
                b"formula2" if current_validation.is_some() => target = TextTarget::Formula2,
                b"conditionalFormatting" => cf_start = Some(event_start),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"dimension" => data.dimension = attr_value(&e, b"ref"),
                b"row" => data.hidden_rows.extend(hidden_row(&e)),
                b"col" => data.hidden_columns.extend(hidden_columns(&e)),
                // Empty cell element (may still carry a style)
                b"c" => data.cells.push(cell_from_attrs(&e)),
                b"dataValidation" => data.validations.push(validation_from_attrs(&e)),
                b"conditionalFormatting" => {
                    if let Some(raw) = xml.get(event_start..xml_reader.buffer_position()) {
                        data.conditional_formats.push(raw.trim().to_string());
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"c" => {
                    if let Some(cell) = current_cell.take() {
                        data.cells.push(cell);
                    }
                    target = TextTarget::None;
                    in_inline_str = false;
                }
                b"v" | b"f" | b"t" | b"formula1" | b"formula2" => target = TextTarget::None,
                b"is" => in_inline_str = false,
                b"rPh" => in_phonetic = false,
                b"dataValidation" => {
                    if let Some(rule) = current_validation.take() {
                        data.validations.push(rule);
                    }
                    target = TextTarget::None;
                }
                b"conditionalFormatting" => {
                    if let Some(start) = cf_start.take() {
                        if let Some(raw) = xml.get(start..xml_reader.buffer_position()) {
                            data.conditional_formats.push(raw.trim().to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) if target != TextTarget::None => {
                let text = e
                    .unescape()
                    .map_err(|err| XlsxError::Parse(format!("bad text: {}", err)))?;
                append_text(target, &text, &mut current_cell, &mut current_validation);
            }
            Ok(Event::CData(e)) if target != TextTarget::None => {
                let text = String::from_utf8_lossy(&e);
                append_text(target, &text, &mut current_cell, &mut current_validation);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
    }

    for cell in &mut data.cells {
        if matches!(cell.data_type.as_deref(), Some("inlineStr") | Some("str")) {
            if let Some(value) = cell.value.as_mut() {
                *value = decode_excel_escapes(value);
            }
        }
        // A shared-formula follower has an empty <f>; it carries no source text.
        if cell.formula.as_deref() == Some("") {
            cell.formula = None;
        }
    }

    Ok(data)
}

fn append_text(
    target: TextTarget,
    text: &str,
    cell: &mut Option<RawCell>,
    validation: &mut Option<ValidationRule>,
) {
    fn push(slot: &mut Option<String>, text: &str) {
        slot.get_or_insert_with(String::new).push_str(text);
    }

    match target {
        TextTarget::Value | TextTarget::InlineText => {
            if let Some(cell) = cell.as_mut() {
                push(&mut cell.value, text);
            }
        }
        TextTarget::Formula => {
            if let Some(cell) = cell.as_mut() {
                push(&mut cell.formula, text);
            }
        }
        TextTarget::Formula1 => {
            if let Some(rule) = validation.as_mut() {
                push(&mut rule.formula1, text);
            }
        }
        TextTarget::Formula2 => {
            if let Some(rule) = validation.as_mut() {
                push(&mut rule.formula2, text);
            }
        }
        TextTarget::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1:C3"/>
  <cols>
    <col min="2" max="3" width="0" hidden="1"/>
    <col min="5" max="5" width="12" customWidth="1"/>
  </cols>
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1"><f>SUM(1,2)</f><v>3</v></c>
      <c r="C1" s="2"/>
    </row>
    <row r="2" hidden="1">
      <c r="A2" t="inlineStr"><is><r><t>Hello</t></r><r><t xml:space="preserve"> World</t></r></is></c>
      <c r="B2"><f t="shared" si="0"/><v>4</v></c>
    </row>
    <row r="3" hidden="true"/>
  </sheetData>
  <conditionalFormatting sqref="A1:A3"><cfRule type="cellIs" dxfId="0" priority="1" operator="greaterThan"><formula>5</formula></cfRule></conditionalFormatting>
  <dataValidations count="2">
    <dataValidation type="whole" operator="between" sqref="A1:A3"><formula1>1</formula1><formula2>10</formula2></dataValidation>
    <dataValidation type="list" sqref="B1"><formula1>"a,b"</formula1></dataValidation>
  </dataValidations>
</worksheet>"#;

    #[test]
    fn reads_cells() {
        let data = read_worksheet_xml(SHEET).unwrap();
        assert_eq!(data.cells.len(), 5);

        assert_eq!(
            data.cells[0],
            RawCell::new("A1").with_value("0").with_type("s")
        );
        assert_eq!(
            data.cells[1],
            RawCell::new("B1").with_value("3").with_formula("SUM(1,2)")
        );
        assert_eq!(data.cells[2], RawCell::new("C1").with_style(2));
        assert_eq!(
            data.cells[3],
            RawCell::new("A2")
                .with_value("Hello World")
                .with_type("inlineStr")
        );
        assert_eq!(data.cells[4], RawCell::new("B2").with_value("4"));
    }

    #[test]
    fn reads_sheet_structure() {
        let data = read_worksheet_xml(SHEET).unwrap();
        assert_eq!(data.dimension.as_deref(), Some("A1:C3"));
        assert_eq!(data.hidden_rows, vec![2, 3]);
        assert_eq!(data.hidden_columns, vec![HiddenColumnRange { min: 2, max: 3 }]);
    }

    #[test]
    fn reads_validations_in_order() {
        let data = read_worksheet_xml(SHEET).unwrap();
        let canonical: Vec<String> = data.validations.iter().map(|v| v.canonical()).collect();
        assert_eq!(
            canonical,
            vec![
                "[A1:A3|whole|between|1|10]".to_string(),
                "[B1|list||\"a,b\"|]".to_string(),
            ]
        );
    }

    #[test]
    fn keeps_conditional_formatting_verbatim() {
        let data = read_worksheet_xml(SHEET).unwrap();
        assert_eq!(
            data.conditional_formats,
            vec![r#"<conditionalFormatting sqref="A1:A3"><cfRule type="cellIs" dxfId="0" priority="1" operator="greaterThan"><formula>5</formula></cfRule></conditionalFormatting>"#.to_string()]
        );
    }

    #[test]
    fn malformed_sheet_fails() {
        assert!(read_worksheet_xml("<worksheet><sheetData><row></sheetData>").is_err());
    }

    #[test]
    fn empty_sheet_yields_empty_payload() {
        let data = read_worksheet_xml("<worksheet/>").unwrap();
        assert_eq!(data, SheetData::default());
    }
}
