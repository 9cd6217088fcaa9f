//! External CSV producers and outage counting.

use csv::ReaderBuilder;
use std::path::Path;
use tokio::process::Command;

use super::BatchError;
use crate::report::table::CSV_DELIMITER;

/// Run `command` through `sh -c` in `cwd`; success is a zero exit status.
pub async fn run_command(command: &str, cwd: &Path) -> Result<(), BatchError> {
    log::info!("Running: {}", command);

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|source| BatchError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(BatchError::CommandFailed {
            command: command.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        log::debug!("{}", stdout.trim());
    }

    Ok(())
}

/// Number of body rows in an outage CSV; one row per silent camera.
pub fn count_outages(csv_path: &Path) -> Result<usize, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)?;

    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}
