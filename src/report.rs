/*!
 * Reporting functionality for dir-to-md
 *
 * Renders the console summary printed after a run using the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::stats::Stats;

/// Number of failures listed before the table is cut off
const MAX_FAILURE_ROWS: usize = 10;

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Time taken by the run
    pub duration: Duration,
    /// Counters collected during the run
    pub stats: Stats,
}

impl ScanReport {
    /// Build a report from a finished run's statistics
    pub fn new(output_file: impl Into<String>, stats: Stats) -> Self {
        Self {
            output_file: output_file.into(),
            duration: stats.elapsed(),
            stats,
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_report(report));
    }

    fn styled(mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let stats = &report.stats;
        let rows = vec![
            SummaryRow {
                key: "📂 Output File",
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time",
                value: format!("{:.2}s", report.duration.as_secs_f64()),
            },
            SummaryRow {
                key: "📁 Directories",
                value: self.format_number(stats.total_dirs),
            },
            SummaryRow {
                key: "📄 Files",
                value: self.format_number(stats.total_files),
            },
            SummaryRow {
                key: "📝 Text Files",
                value: self.format_number(stats.text_files),
            },
            SummaryRow {
                key: "🔄 Converted Files",
                value: self.format_number(stats.converted_files),
            },
            SummaryRow {
                key: "⚠️ Failed Files",
                value: self.format_number(stats.failed_files),
            },
            SummaryRow {
                key: "🚫 Ignored Paths",
                value: self.format_number(stats.ignored_paths),
            },
        ];

        Self::styled(Table::new(rows))
    }

    fn create_failures_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FailureRow {
            #[tabled(rename = "Path")]
            path: String,

            #[tabled(rename = "Reason")]
            reason: String,
        }

        let rows: Vec<FailureRow> = report
            .stats
            .failures
            .iter()
            .take(MAX_FAILURE_ROWS)
            .map(|(path, reason)| FailureRow {
                path: path.clone(),
                reason: reason.clone(),
            })
            .collect();

        Self::styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary = format!(
            "✅  DONE\n{}",
            self.create_summary_table(report)
        );

        let failures = &report.stats.failures;
        if failures.is_empty() {
            return summary;
        }

        let title = if failures.len() > MAX_FAILURE_ROWS {
            format!("⚠️  FIRST {} OF {} FAILURES", MAX_FAILURE_ROWS, failures.len())
        } else {
            "⚠️  FAILURES".to_string()
        };

        format!(
            "{}\n{}\n\n{}",
            title,
            self.create_failures_table(report),
            summary
        )
    }
}
