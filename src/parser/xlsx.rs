//! Tabular-workbook adapter built on calamine.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use chrono::NaiveDateTime;

use super::{FormatAdapter, ParseOptions};
use crate::error::Result;
use crate::model::{DocumentContent, FormatKind, Section, TableBlock};

/// Adapter for `.xlsx` and `.xls` workbooks. One section per non-empty sheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxAdapter;

impl XlsxAdapter {
    /// Create a new workbook adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for XlsxAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::TabularWorkbook
    }

    fn name(&self) -> &str {
        "xlsx"
    }

    fn parse_bytes(
        &self,
        data: &[u8],
        title: &str,
        source_path: &str,
        _options: &ParseOptions,
    ) -> Result<DocumentContent> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;
        let mut content = DocumentContent::new(title, source_path, self.kind());

        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            match sheet_section(&name, &range) {
                Some(section) => content.push_section_unchecked(section),
                None => log::debug!("{}: sheet {} is empty", title, name),
            }
        }

        Ok(content)
    }
}

/// Section for one sheet, or `None` when no row has a value.
///
/// Every kept row goes into `rows`; the header row is not split off. Rows
/// start at column A, so columns before the used range become empty cells.
pub(crate) fn sheet_section(name: &str, range: &Range<Data>) -> Option<Section> {
    let lead = range.start().map_or(0, |(_, col)| col as usize);
    let rows: Vec<Vec<String>> = range
        .rows()
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            std::iter::repeat(String::new())
                .take(lead)
                .chain(row.iter().map(cell_text))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return None;
    }

    let mut section = Section::new(format!("工作表: {}", name));
    section.add_table(TableBlock::headerless(rows));
    Some(section)
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached cell value as text.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(datetime_text)
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn datetime_text(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ooxml::build_package;
    use calamine::CellErrorType;

    fn range(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), value.clone());
            }
        }
        range
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(30.0)), "30");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "True");
        assert_eq!(cell_text(&Data::Bool(false)), "False");
        assert_eq!(cell_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2024-01-05T10:00:00".into())),
            "2024-01-05T10:00:00"
        );
    }

    #[test]
    fn test_datetime_text() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(datetime_text(dt), "2024-01-05 09:30:00");
    }

    #[test]
    fn test_sheet_section_keeps_all_rows() {
        let range = range(&[
            &[Data::String("Name".into()), Data::String("Age".into())],
            &[Data::Empty, Data::Empty],
            &[Data::String("Bob".into()), Data::Float(30.0)],
        ]);
        let section = sheet_section("Sheet1", &range).unwrap();

        assert_eq!(section.heading, "工作表: Sheet1");
        assert!(section.text_content.is_empty());
        assert_eq!(section.tables.len(), 1);
        let table = &section.tables[0];
        assert!(table.headers.is_empty());
        assert_eq!(
            table.rows,
            vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Bob".to_string(), "30".to_string()],
            ]
        );
    }

    #[test]
    fn test_leading_empty_columns_kept() {
        let mut range = Range::new((1, 2), (1, 3));
        range.set_value((1, 2), Data::String("Name".into()));
        range.set_value((1, 3), Data::Int(3));
        let section = sheet_section("Offset", &range).unwrap();

        assert_eq!(
            section.tables[0].rows,
            vec![vec![
                String::new(),
                String::new(),
                "Name".to_string(),
                "3".to_string()
            ]]
        );
    }

    #[test]
    fn test_empty_sheet_has_no_section() {
        let range = range(&[&[Data::Empty]]);
        assert!(sheet_section("Blank", &range).is_none());
        assert!(sheet_section("Blank", &Range::<Data>::empty()).is_none());
    }

    fn workbook_bytes() -> Vec<u8> {
        let content_types = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;
        let root_rels = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;
        let workbook = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;
        let workbook_rels = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;
        let sheet = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="inlineStr"><is><t>Name</t></is></c><c r="B1" t="inlineStr"><is><t>Age</t></is></c></row>
    <row r="2"><c r="A2" t="inlineStr"><is><t>Bob</t></is></c><c r="B2"><v>30</v></c></row>
  </sheetData>
</worksheet>"#;
        build_package(&[
            ("[Content_Types].xml", content_types),
            ("_rels/.rels", root_rels),
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", workbook_rels),
            ("xl/worksheets/sheet1.xml", sheet),
        ])
    }

    #[test]
    fn test_parse_workbook() {
        let data = workbook_bytes();
        let doc = XlsxAdapter::new()
            .parse_bytes(&data, "people", "people.xlsx", &ParseOptions::default())
            .unwrap();

        assert_eq!(doc.kind, FormatKind::TabularWorkbook);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, "工作表: Sheet1");
        assert_eq!(
            doc.sections[0].tables[0].rows,
            vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Bob".to_string(), "30".to_string()],
            ]
        );
    }

    #[test]
    fn test_corrupt_workbook_fails() {
        let result = XlsxAdapter::new().parse_bytes(
            b"not a workbook",
            "bad",
            "bad.xlsx",
            &ParseOptions::default(),
        );
        assert!(result.is_err());
    }
}
