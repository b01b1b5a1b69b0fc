use anyhow::{Context, Result};
use powerball_db::rusqlite::Connection;
use std::path::Path;

use powerball_db::db::insert_row;
use powerball_db::parse::{parse_fields, FIELD_DELIMITER};

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Load a `|`-separated corpus. Bad lines are logged and counted, never fatal.
/// Every valid line is stored, repeated rows included; lines of a file that
/// was already imported count as `skipped`.
pub fn import_corpus(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let source = std::fs::canonicalize(path)
        .with_context(|| format!("Cannot open {:?}", path))?
        .display()
        .to_string();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER as u8)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("read error on line {}: {}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };
        let line_no = record
            .position()
            .map(|p| p.line())
            .unwrap_or(result.total_records as u64);
        let fields: Vec<&str> = record.iter().collect();
        match parse_fields(&fields) {
            Ok(row) => match insert_row(&tx, &source, line_no, &row) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    log::warn!("insert failed on line {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("skipping line {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Commit failed")?;
    log::info!(
        "imported {:?}: {} inserted, {} already stored, {} errors",
        path,
        result.inserted,
        result.skipped,
        result.errors
    );
    Ok(result)
}
