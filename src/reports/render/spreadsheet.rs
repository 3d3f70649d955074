//! Tabular output as a CSV workbook: each sheet is a `[Name]` marker line
//! followed by a header row and its data rows.

use crate::reports::error::ReportError;
use crate::reports::model::Report;

use super::{detail_table, summary_rows, OutputFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_report(report: &Report) -> Self {
        let table = detail_table(&report.details);
        let primary = Sheet {
            name: report.title.clone(),
            headers: table.headers.iter().map(|h| h.to_string()).collect(),
            rows: table.rows,
        };
        let summary = Sheet {
            name: "Summary".to_string(),
            headers: vec!["Metric".to_string(), "Value".to_string()],
            rows: summary_rows(report)
                .into_iter()
                .map(|(metric, value)| vec![metric, value])
                .collect(),
        };
        Self {
            sheets: vec![primary, summary],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for sheet in &self.sheets {
            writer.write_record([format!("[{}]", sheet.name)])?;
            writer.write_record(&sheet.headers)?;
            for row in &sheet.rows {
                writer.write_record(row)?;
            }
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    /// Inverse of [`Workbook::to_csv`].
    pub fn from_csv(bytes: &[u8]) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut sheets: Vec<Sheet> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cells: Vec<String> = record.iter().map(str::to_string).collect();
            let marker = match cells.as_slice() {
                [only] => only
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .map(str::to_string),
                _ => None,
            };
            match (marker, sheets.last_mut()) {
                (Some(name), _) => sheets.push(Sheet {
                    name,
                    headers: Vec::new(),
                    rows: Vec::new(),
                }),
                (None, Some(sheet)) if sheet.headers.is_empty() => sheet.headers = cells,
                (None, Some(sheet)) => sheet.rows.push(cells),
                (None, None) => {}
            }
        }
        Ok(Self { sheets })
    }
}

pub fn render_spreadsheet(report: &Report) -> Result<Vec<u8>, ReportError> {
    Workbook::from_report(report).to_csv().map_err(|e| {
        log::error!("Failed to write {} report workbook: {}", report.report_type, e);
        ReportError::render(OutputFormat::Spreadsheet, e.to_string())
    })
}
