use std::io::Read;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::header::USER_AGENT;

use crate::error::{DashboardError, Result};
use crate::types::AccessRecord;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Download and decode the access log. Transport failures and non-2xx
/// statuses surface as `Fetch`; decode failures as `Load`.
pub async fn fetch_records(
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<Vec<AccessRecord>> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let body = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    parse_records(body.as_ref())
}

/// Decode a local copy of the access log, for offline use.
pub fn read_records_from_path(path: &Path) -> Result<Vec<AccessRecord>> {
    let content = std::fs::read(path).map_err(|source| DashboardError::FetchFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(content.as_slice())
}

/// Decode headerless CSV rows into records, preserving input order.
///
/// The wire format is four unnamed fields per row, `time,user,member,status`,
/// with `time` in `YYYY-MM-DD HH:MM:SS` exactly. Fails on the first malformed
/// row with its 1-based row number; a partially loaded dataset is never
/// returned.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<AccessRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in csv_reader.records().enumerate() {
        let line = i + 1;
        let row = row.map_err(|e| DashboardError::load(line, e.to_string()))?;

        if row.len() != 4 {
            return Err(DashboardError::load(
                line,
                format!("expected 4 fields (time, user, member, status), got {}", row.len()),
            ));
        }

        let timestamp = NaiveDateTime::parse_from_str(&row[0], TIMESTAMP_FORMAT).map_err(|e| {
            DashboardError::load(line, format!("bad timestamp '{}': {e}", &row[0]))
        })?;

        records.push(AccessRecord {
            timestamp,
            user: row[1].to_string(),
            member: row[2].to_string(),
            status: row[3].to_string(),
        });
    }

    Ok(records)
}
