mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::display::{display_import_summary, display_rows};
use powerball_db::db::{count_rows, db_path, fetch_last_rows, migrate, open_db};
use powerball_db::models::DrawRecord;
use powerball_db::rusqlite::Connection;
use powerball_nn::display::display_outcome;
use powerball_nn::prize;

#[derive(Parser)]
#[command(name = "powerball", about = "Powerball corpus tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a `|`-separated corpus file
    Import {
        #[arg(short, long, default_value = "data/powerball.txt")]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the most recently imported rows
    List {
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Score a pick against a draw
    Score {
        /// Five mains then the Powerball
        #[arg(long, num_args = 6, required = true)]
        pick: Vec<i64>,
        /// Five mains then the Powerball
        #[arg(long, num_args = 6, required = true)]
        draw: Vec<i64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Score { pick, draw } => cmd_score(&pick, &draw),
    }
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_corpus(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_rows(conn)? == 0 {
        println!("Empty database. Run `powerball import` first.");
        return Ok(());
    }
    let rows = fetch_last_rows(conn, last)?;
    display_rows(&rows);
    Ok(())
}

fn to_draw(numbers: &[i64], what: &str) -> Result<DrawRecord> {
    if numbers.len() != 6 {
        bail!("{what} needs 5 mains and a Powerball, got {} numbers", numbers.len());
    }
    let draw = DrawRecord::new(
        [numbers[0], numbers[1], numbers[2], numbers[3], numbers[4]],
        numbers[5],
    )
    .with_context(|| format!("Invalid {what}"))?;
    Ok(draw)
}

fn cmd_score(pick: &[i64], draw: &[i64]) -> Result<()> {
    let pick = to_draw(pick, "pick")?;
    let draw = to_draw(draw, "draw")?;
    println!("Pick: {pick}");
    println!("Draw: {draw}");
    display_outcome(&prize::evaluate(&pick, &draw));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_score() {
        let cli = Cli::try_parse_from([
            "powerball", "score", "--pick", "7", "14", "21", "35", "49", "9", "--draw", "49",
            "35", "21", "14", "7", "9",
        ])
        .unwrap();
        match cli.command {
            Command::Score { pick, draw } => {
                let pick = to_draw(&pick, "pick").unwrap();
                let draw = to_draw(&draw, "draw").unwrap();
                assert_eq!(prize::score(&pick, &draw), prize::JACKPOT);
            }
            _ => panic!("expected score"),
        }
    }

    #[test]
    fn test_score_rejects_wrong_count() {
        assert!(Cli::try_parse_from(["powerball", "score", "--pick", "1", "2", "--draw", "1"])
            .is_err());
    }

    #[test]
    fn test_invalid_draw_rejected() {
        assert!(to_draw(&[1, 2, 3, 4, 70, 1], "pick").is_err());
        assert!(to_draw(&[1, 2, 3, 4, 5, 27], "pick").is_err());
        assert!(to_draw(&[1, 1, 3, 4, 5, 2], "pick").is_err());
        assert!(to_draw(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12], "pick").is_err());
    }
}
