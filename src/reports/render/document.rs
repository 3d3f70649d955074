//! Paginated plain-text document. Page one carries the header block and the
//! statistics; detail rows follow, `rows_per_page` to a page, with the column
//! header repeated on each page. Pages are separated by a form feed.

use std::fmt::Write;

use crate::reports::error::ReportError;
use crate::reports::model::Report;

use super::{detail_table, OutputFormat, Table};

const PAGE_BREAK: char = '\u{000C}';
const RULE_WIDTH: usize = 72;

pub fn render_document(report: &Report, rows_per_page: usize) -> Result<Vec<u8>, ReportError> {
    let rows_per_page = rows_per_page.max(1);
    let table = detail_table(&report.details);
    let widths = column_widths(&table);

    let mut pages = vec![front_page(report).map_err(fmt_failure)?];
    if table.rows.is_empty() {
        let mut page = page_heading(report);
        page.push_str("No records.\n");
        pages.push(page);
    } else {
        for chunk in table.rows.chunks(rows_per_page) {
            let mut page = page_heading(report);
            page.push_str(&table_line(&table.headers, &widths));
            page.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len()));
            page.push('\n');
            for row in chunk {
                page.push_str(&table_line(row, &widths));
            }
            pages.push(page);
        }
    }

    let total = pages.len();
    let mut out = String::new();
    for (i, page) in pages.into_iter().enumerate() {
        if i > 0 {
            out.push(PAGE_BREAK);
        }
        out.push_str(&page);
        writeln!(out, "\n{:>width$}", format!("Page {} of {}", i + 1, total), width = RULE_WIDTH)
            .map_err(fmt_failure)?;
    }
    Ok(out.into_bytes())
}

fn fmt_failure(e: std::fmt::Error) -> ReportError {
    ReportError::render(OutputFormat::Document, e.to_string())
}

fn front_page(report: &Report) -> Result<String, std::fmt::Error> {
    let mut page = String::new();
    writeln!(page, "{}", report.title)?;
    writeln!(page, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(page, "Period:        {}", report.period.label)?;
    writeln!(
        page,
        "Generated:     {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(page, "Total records: {}", report.total_records)?;
    writeln!(page)?;

    let label_width = report
        .statistics
        .iter()
        .flat_map(|b| b.stats.iter().map(|s| s.metric.chars().count()))
        .max()
        .unwrap_or(0);

    writeln!(page, "STATISTICS")?;
    for block in &report.statistics {
        writeln!(page)?;
        writeln!(page, "{}", block.name)?;
        for stat in &block.stats {
            writeln!(page, "  {:<width$}  {}", stat.metric, stat.value, width = label_width)?;
        }
    }

    for series in &report.trends {
        writeln!(page)?;
        writeln!(page, "Trend: {}", series.name)?;
        for point in &series.points {
            match point.rate {
                Some(rate) => writeln!(page, "  {:<14}  {:>6}  {:>7.2}%", point.label, point.count, rate)?,
                None => writeln!(page, "  {:<14}  {:>6}", point.label, point.count)?,
            }
        }
    }
    Ok(page)
}

fn page_heading(report: &Report) -> String {
    format!(
        "{} ({})\n{}\n",
        report.title,
        report.period.label,
        "=".repeat(RULE_WIDTH)
    )
}

fn column_widths(table: &Table) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn table_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}
