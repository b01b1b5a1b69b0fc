use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{DrawRecord, TrainingRow};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draw_rows (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    source    TEXT NOT NULL,
    line_no   INTEGER NOT NULL,
    input_1   REAL NOT NULL,
    input_2   REAL NOT NULL,
    input_3   REAL NOT NULL,
    input_4   REAL NOT NULL,
    input_5   REAL NOT NULL,
    input_6   REAL NOT NULL,
    main_1    INTEGER NOT NULL,
    main_2    INTEGER NOT NULL,
    main_3    INTEGER NOT NULL,
    main_4    INTEGER NOT NULL,
    main_5    INTEGER NOT NULL,
    bonus     INTEGER NOT NULL,
    UNIQUE (source, line_no)
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("powerball.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Migration failed")?;
    Ok(())
}

/// Store the row read from `line_no` of `source`.
///
/// Rows are keyed by their origin, not their content: repeated rows of a
/// corpus are all kept, while importing the same file twice adds nothing.
/// Returns false when that source line is already stored.
pub fn insert_row(conn: &Connection, source: &str, line_no: u64, row: &TrainingRow) -> Result<bool> {
    let mains = row.draw.mains();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draw_rows (source, line_no, input_1, input_2, input_3, input_4, input_5, input_6, main_1, main_2, main_3, main_4, main_5, bonus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            source,
            line_no as i64,
            row.inputs[0],
            row.inputs[1],
            row.inputs[2],
            row.inputs[3],
            row.inputs[4],
            row.inputs[5],
            mains[0],
            mains[1],
            mains[2],
            mains[3],
            mains[4],
            row.draw.bonus(),
        ],
    ).context("Insert failed")?;
    Ok(changed > 0)
}

const SELECT_ROWS: &str =
    "SELECT input_1, input_2, input_3, input_4, input_5, input_6, main_1, main_2, main_3, main_4, main_5, bonus
     FROM draw_rows";

/// Rows in import order, oldest first.
pub fn fetch_rows(conn: &Connection, limit: u32) -> Result<Vec<TrainingRow>> {
    query_rows(conn, &format!("{SELECT_ROWS} ORDER BY id ASC LIMIT ?1"), limit)
}

/// Most recently imported rows, newest first.
pub fn fetch_last_rows(conn: &Connection, limit: u32) -> Result<Vec<TrainingRow>> {
    query_rows(conn, &format!("{SELECT_ROWS} ORDER BY id DESC LIMIT ?1"), limit)
}

fn query_rows(conn: &Connection, sql: &str, limit: u32) -> Result<Vec<TrainingRow>> {
    let mut stmt = conn.prepare(sql)?;
    let raw = stmt.query_map([limit], |row| {
        Ok((
            [
                row.get::<_, f64>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
            ],
            [
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, i64>(8)?,
                row.get::<_, i64>(9)?,
                row.get::<_, i64>(10)?,
            ],
            row.get::<_, i64>(11)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(inputs, mains, bonus)| {
            let draw = DrawRecord::new(mains, bonus)
                .context("Corrupt row in database")?;
            Ok(TrainingRow { inputs, draw })
        })
        .collect()
}

pub fn count_rows(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draw_rows", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = memory_db();
        assert_eq!(count_rows(&conn).unwrap(), 0);

        insert_row(&conn, "a.txt", 1, &parse_line("1|2|3|4|5|6|7|14|21|35|49|9").unwrap()).unwrap();
        assert_eq!(count_rows(&conn).unwrap(), 1);
    }

    #[test]
    fn test_repeated_rows_kept() {
        let conn = memory_db();

        let row = parse_line("1|2|3|4|5|6|7|14|21|35|49|9").unwrap();
        assert!(insert_row(&conn, "a.txt", 1, &row).unwrap());
        assert!(insert_row(&conn, "a.txt", 2, &row).unwrap());
        assert!(insert_row(&conn, "b.txt", 1, &row).unwrap());
        assert_eq!(count_rows(&conn).unwrap(), 3);
        assert!(fetch_rows(&conn, 10).unwrap().iter().all(|r| *r == row));
    }

    #[test]
    fn test_same_source_line_ignored() {
        let conn = memory_db();

        let row = parse_line("1|2|3|4|5|6|7|14|21|35|49|9").unwrap();
        assert!(insert_row(&conn, "a.txt", 1, &row).unwrap());
        assert!(!insert_row(&conn, "a.txt", 1, &row).unwrap());
        assert_eq!(count_rows(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order_and_limit() {
        let conn = memory_db();

        insert_row(&conn, "a.txt", 1, &parse_line("1|2|3|4|5|6|7|14|21|35|49|9").unwrap()).unwrap();
        insert_row(&conn, "a.txt", 2, &parse_line("7|14|21|35|49|9|1|2|3|4|5|6").unwrap()).unwrap();
        insert_row(&conn, "a.txt", 3, &parse_line("1|2|3|4|5|6|10|20|30|40|50|26").unwrap()).unwrap();

        let rows = fetch_rows(&conn, 10).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].draw.bonus(), 9);
        assert_eq!(rows[1].inputs[0], 7.0);
        assert_eq!(rows[2].draw.mains(), &[10, 20, 30, 40, 50]);

        assert_eq!(fetch_rows(&conn, 2).unwrap().len(), 2);

        let last = fetch_last_rows(&conn, 2).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].draw.bonus(), 26);
        assert_eq!(last[1].inputs[0], 7.0);
    }

    #[test]
    fn test_open_db_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.db");
        let conn = open_db(&path).unwrap();
        migrate(&conn).unwrap();
        assert!(path.exists());
    }
}
