use crate::error::CliError;
use engine_core::report::JobReport;
use std::path::Path;

fn report_json(report: &JobReport) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&report.snapshot())?)
}

pub async fn write_report(report: &JobReport, path: &Path) -> Result<(), CliError> {
    tokio::fs::write(path, report_json(report)?).await?;
    Ok(())
}

/// Prints the report to stdout, or to stderr when stdout carries the records.
pub fn print_report(report: &JobReport, as_json: bool, to_stderr: bool) -> Result<(), CliError> {
    let rendered = if as_json {
        report_json(report)?
    } else {
        report.to_string()
    };

    if to_stderr {
        eprintln!("{rendered}");
    } else {
        println!("{rendered}");
    }
    Ok(())
}
