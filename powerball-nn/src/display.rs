use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use powerball_db::models::Pool;

use crate::config::{NetworkConfig, TrainingReport};
use crate::metrics::{random_baseline, PrizeSummary};
use crate::prize::{Outcome, PRIZE_TABLE};
use crate::training::{Evaluation, Prediction};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_features(features: &[f64]) -> String {
    features
        .iter()
        .map(|v| format!("{}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_config(config: &NetworkConfig) {
    println!(
        "  hidden_layers={:?}, learning_rate={}, max_error={}, max_iterations={}",
        config.hidden_layers, config.learning_rate, config.max_error, config.max_iterations
    );
    println!(
        "  normalization={:?}, train_ratio={}, seed={}",
        config.normalization, config.train_ratio, config.seed
    );
}

pub fn display_training_report(report: &TrainingReport) {
    println!("\n== Training ==\n");
    let status = if report.converged {
        "error target reached"
    } else {
        "iteration cap reached"
    };
    println!("Completed in {} iterations ({status})", report.iterations);
    println!("Total network error: {:.6}", report.final_error);
    if let Some(first) = report.error_history.first() {
        println!("Initial error:       {:.6}", first);
    }
    println!("Training time: {} ms", report.train_time_ms);
}

pub fn display_evaluation(evaluation: &Evaluation, limit: usize) {
    println!("\n== Evaluation ({} examples) ==\n", evaluation.results.len());

    let mut table = new_table();
    table.set_header(vec!["#", "Features", "Pick", "Draw", "Match", "Prize"]);

    for (i, r) in evaluation.results.iter().take(limit).enumerate() {
        match &r.outcome {
            Ok((pick, outcome)) => {
                let color = if outcome.prize > 0 { Color::Green } else { Color::White };
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(format_features(&r.features)),
                    Cell::new(pick.to_string()),
                    Cell::new(r.actual.to_string()),
                    Cell::new(outcome.label()).fg(color),
                    Cell::new(outcome.prize).fg(color),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(format_features(&r.features)),
                    Cell::new(format!("error: {e}")).fg(Color::Red),
                    Cell::new(r.actual.to_string()),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }
    println!("{table}");

    if evaluation.results.len() > limit {
        println!("({} more rows not shown)", evaluation.results.len() - limit);
    }
}

pub fn display_summary(summary: &PrizeSummary) {
    println!("\n== Summary ==\n");

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value", "Random baseline"]);
    table.add_row(vec![
        Cell::new("Evaluated"),
        Cell::new(summary.evaluated),
        Cell::new(""),
    ]);
    if summary.failed > 0 {
        table.add_row(vec![
            Cell::new("Failed").fg(Color::Red),
            Cell::new(summary.failed).fg(Color::Red),
            Cell::new(""),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total prize"),
        Cell::new(summary.total_prize),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Average prize"),
        Cell::new(format!("{:.4}", summary.average_prize())),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Main hit rate"),
        Cell::new(format!("{:.4}", summary.main_hit_rate())),
        Cell::new(format!("{:.4}", random_baseline(Pool::Mains))),
    ]);
    table.add_row(vec![
        Cell::new("Bonus hit rate"),
        Cell::new(format!("{:.4}", summary.bonus_hit_rate())),
        Cell::new(format!("{:.4}", random_baseline(Pool::Bonus))),
    ]);
    println!("{table}");

    let mut tiers = new_table();
    tiers.set_header(vec!["Matches", "Count", "PB count", "Prize", "PB prize"]);
    for (m, counts) in summary.tiers.iter().enumerate() {
        tiers.add_row(vec![
            Cell::new(m),
            Cell::new(counts[0]),
            Cell::new(counts[1]),
            Cell::new(PRIZE_TABLE[m][0]),
            Cell::new(PRIZE_TABLE[m][1]),
        ]);
    }
    println!("{tiers}");
}

pub fn display_prediction(prediction: &Prediction) {
    println!("\n== Prediction ==\n");
    println!("Pick: {}", prediction.pick);

    println!("\n-- Top {} mains --", prediction.mains.len());
    let mut table = new_table();
    table.set_header(vec!["#", "Score"]);
    for (rank, r) in prediction.mains.iter().enumerate() {
        let color = if rank < Pool::Mains.pick_count() { Color::Green } else { Color::White };
        table.add_row(vec![
            Cell::new(format!("{:2}", r.number)).fg(color),
            Cell::new(format!("{:.4}", r.score)).fg(color),
        ]);
    }
    println!("{table}");

    println!("\n-- Top {} bonus --", prediction.bonus.len());
    let mut table = new_table();
    table.set_header(vec!["PB", "Score"]);
    for (rank, r) in prediction.bonus.iter().enumerate() {
        let color = if rank < Pool::Bonus.pick_count() { Color::Yellow } else { Color::White };
        table.add_row(vec![
            Cell::new(format!("{:2}", r.number)).fg(color),
            Cell::new(format!("{:.4}", r.score)).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_outcome(outcome: &Outcome) {
    println!(
        "Matches: {}  Bonus: {}  Prize: {}",
        outcome.matches,
        if outcome.bonus_matched { "yes" } else { "no" },
        outcome.prize
    );
}
