use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::import::ImportResult;
use powerball_db::models::TrainingRow;

pub fn display_rows(rows: &[TrainingRow]) {
    if rows.is_empty() {
        println!("No rows to show.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Inputs", "Mains", "PB"]);

    for row in rows {
        let inputs = row
            .inputs
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let mains = row
            .draw
            .mains()
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");

        table.add_row(vec![
            Cell::new(inputs),
            Cell::new(mains),
            Cell::new(format!("{:2}", row.draw.bonus())),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import complete:");
    println!("  Lines read        : {}", result.total_records);
    println!("  Inserted          : {}", result.inserted);
    println!("  Already stored    : {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors            : {}", result.errors);
    }
}
