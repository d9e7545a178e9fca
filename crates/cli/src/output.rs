use crate::error::CliError;
use engine_runtime::report::RunReport;
use std::path::Path;

fn generate_report_json(report: &RunReport) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

pub async fn write_report(report: &RunReport, path: &Path) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report(report: &RunReport) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    println!("{report_json}");
    Ok(())
}

/// Writes preview CSV to a file, or to stdout when no path is given.
pub async fn write_preview(csv: &[u8], path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => tokio::fs::write(path, csv).await?,
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(csv)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
