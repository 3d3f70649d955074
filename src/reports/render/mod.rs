//! Output adapters. Every renderer consumes a finished [`Report`] and only
//! formats what is already in it.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::database::models::StringEnum;
use crate::reports::error::ReportError;
use crate::reports::model::{Details, Report, ReportType};

mod document;
mod spreadsheet;
mod structured;

pub use document::render_document;
pub use spreadsheet::{render_spreadsheet, Sheet, Workbook};
pub use structured::render_structured;

/// Placeholder for optional values that are absent.
pub const MISSING: &str = "N/A";

pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Structured,
    Document,
    Spreadsheet,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Structured => "structured-data",
            OutputFormat::Document => "printable-document",
            OutputFormat::Spreadsheet => "spreadsheet",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Structured => "application/json",
            OutputFormat::Document => "text/plain; charset=utf-8",
            OutputFormat::Spreadsheet => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Structured => "json",
            OutputFormat::Document => "txt",
            OutputFormat::Spreadsheet => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" | "structured" | "structured-data" => Ok(OutputFormat::Structured),
            "pdf" | "document" | "printable-document" => Ok(OutputFormat::Document),
            "excel" | "xlsx" | "csv" | "spreadsheet" => Ok(OutputFormat::Spreadsheet),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedOutput {
    Structured(serde_json::Value),
    File(RenderedFile),
}

/// `<reporttype>_report_<unix-millis>.<ext>`
pub fn suggested_filename(
    report_type: ReportType,
    generated_at: DateTime<Utc>,
    format: OutputFormat,
) -> String {
    format!(
        "{}_report_{}.{}",
        report_type,
        generated_at.timestamp_millis(),
        format.extension()
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    rows_per_page: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl Renderer {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn render(&self, report: &Report, format: OutputFormat) -> Result<RenderedOutput, ReportError> {
        log::debug!(
            "Rendering {} report ({} records) as {}",
            report.report_type,
            report.total_records,
            format
        );
        let bytes = match format {
            OutputFormat::Structured => return render_structured(report).map(RenderedOutput::Structured),
            OutputFormat::Document => render_document(report, self.rows_per_page)?,
            OutputFormat::Spreadsheet => render_spreadsheet(report)?,
        };
        Ok(RenderedOutput::File(RenderedFile {
            bytes,
            content_type: format.content_type(),
            filename: suggested_filename(report.report_type, report.generated_at, format),
        }))
    }
}

/// Detail records flattened to display strings under fixed column headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

fn text(value: Option<impl ToString>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn status<S: StringEnum>(value: Option<S>) -> String {
    value.map_or_else(|| MISSING.to_string(), |s| s.as_str().to_string())
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn time(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| MISSING.to_string(), |t| t.format("%H:%M").to_string())
}

fn decimal(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn detail_table(details: &Details) -> Table {
    match details {
        Details::Attendance(rows) => Table {
            headers: vec![
                "Date", "Staff", "Department", "Status", "Check In", "Check Out", "Hours", "Remarks",
            ],
            rows: rows
                .iter()
                .map(|r| {
                    vec![
                        day(r.date),
                        text(r.staff_name.as_ref()),
                        text(r.department.as_ref()),
                        status(r.status),
                        time(r.check_in_time),
                        time(r.check_out_time),
                        r.hours_worked.map_or_else(|| MISSING.to_string(), decimal),
                        text(r.remarks.as_ref()),
                    ]
                })
                .collect(),
        },
        Details::Leaves(rows) => Table {
            headers: vec![
                "Staff", "Department", "Leave Type", "Start", "End", "Days", "Status", "Applied",
            ],
            rows: rows
                .iter()
                .map(|l| {
                    vec![
                        text(l.staff_name.as_ref()),
                        text(l.department.as_ref()),
                        status(l.leave_type),
                        day(l.start_date),
                        day(l.end_date),
                        l.number_of_days.to_string(),
                        status(l.status),
                        day(l.created_at.date_naive()),
                    ]
                })
                .collect(),
        },
        Details::Cases(rows) => Table {
            headers: vec![
                "Date", "Staff", "Department", "Infraction", "Status", "Sanction",
            ],
            rows: rows
                .iter()
                .map(|c| {
                    vec![
                        day(c.date_of_infraction),
                        text(c.staff_name.as_ref()),
                        text(c.department.as_ref()),
                        status(c.infraction_type),
                        status(c.status),
                        text(c.sanction.as_ref()),
                    ]
                })
                .collect(),
        },
        Details::Performance(rows) => Table {
            headers: vec![
                "Staff", "Department", "Records", "Present", "Attendance %", "Leaves",
                "Open Cases", "Score",
            ],
            rows: rows
                .iter()
                .map(|p| {
                    vec![
                        p.staff_name.clone(),
                        text(p.department.as_ref()),
                        p.attendance_records.to_string(),
                        p.present_days.to_string(),
                        decimal(p.attendance_rate),
                        p.leave_applications.to_string(),
                        p.open_cases.to_string(),
                        decimal(p.score),
                    ]
                })
                .collect(),
        },
        Details::Departments(rows) => Table {
            headers: vec![
                "Department", "Staff", "Active", "Attendance", "Attendance %", "Leaves", "Cases",
            ],
            rows: rows
                .iter()
                .map(|d| {
                    vec![
                        d.department.clone(),
                        d.staff_count.to_string(),
                        d.active_staff.to_string(),
                        d.attendance.total.to_string(),
                        decimal(d.attendance_rate),
                        d.leaves.total.to_string(),
                        d.cases.total.to_string(),
                    ]
                })
                .collect(),
        },
        Details::Balances(rows) => Table {
            headers: vec!["Staff", "Department", "Leave Type", "Total", "Taken", "Remaining"],
            rows: rows
                .iter()
                .map(|b| {
                    vec![
                        b.staff_name.clone(),
                        text(b.department.as_ref()),
                        b.leave_type.as_str().to_string(),
                        b.total.to_string(),
                        b.taken.to_string(),
                        b.remaining.to_string(),
                    ]
                })
                .collect(),
        },
    }
}

/// `(metric, value)` pairs for every statistic and trend point, labelled
/// `<block>: <metric>`.
pub fn summary_rows(report: &Report) -> Vec<(String, String)> {
    let stats = report.statistics.iter().flat_map(|block| {
        block
            .stats
            .iter()
            .map(move |s| (format!("{}: {}", block.name, s.metric), s.value.to_string()))
    });
    let trends = report.trends.iter().flat_map(|series| {
        series.points.iter().map(move |p| {
            let value = match p.rate {
                Some(rate) => format!("{} ({}%)", p.count, decimal(rate)),
                None => p.count.to_string(),
            };
            (format!("Trend {}: {}", series.name, p.label), value)
        })
    });
    stats.chain(trends).collect()
}
