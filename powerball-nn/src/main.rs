use std::path::Path;

use anyhow::{bail, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use powerball_db::db;
use powerball_db::models::{TrainingRow, INPUT_COUNT};

use powerball_nn::config::{parse_topology, NetworkConfig, Normalization};
use powerball_nn::display;
use powerball_nn::training::{self, TrainedModel};

#[derive(Parser)]
#[command(name = "powerball-nn", about = "Multilayer perceptron for Powerball draws")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a network on the stored rows and score it on the held-out part
    Train {
        /// Hidden layer widths, comma separated
        #[arg(long, default_value = "12,12,20")]
        hidden: String,
        #[arg(long, default_value = "0.5")]
        learning_rate: f64,
        #[arg(long, default_value = "0.001")]
        max_error: f64,
        #[arg(long, default_value = "2500")]
        max_iterations: usize,
        #[arg(long, default_value = "max")]
        normalization: Normalization,
        #[arg(long, default_value = "0.6")]
        train_ratio: f64,
        /// Shuffle and weight seed (defaults to today's date)
        #[arg(long)]
        seed: Option<u64>,
        /// Rows of the evaluation table to print
        #[arg(long, default_value = "20")]
        show: usize,
        #[arg(long)]
        save: Option<String>,
    },
    /// Score a saved model against every stored row
    Evaluate {
        #[arg(short, long, default_value = "powerball_model.json")]
        model: String,
        #[arg(long, default_value = "20")]
        show: usize,
    },
    /// Predict the next draw from six feature values
    Predict {
        #[arg(short, long, default_value = "powerball_model.json")]
        model: String,
        #[arg(num_args = INPUT_COUNT, required = true, allow_negative_numbers = true)]
        features: Vec<f64>,
    },
}

fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

fn load_rows() -> Result<Vec<TrainingRow>> {
    let db_path = db::db_path();
    let conn = db::open_db(&db_path)?;
    db::migrate(&conn)?;

    let row_count = db::count_rows(&conn)?;
    if row_count == 0 {
        bail!("No rows in the database. Import a corpus first with `powerball import`.");
    }
    let rows = db::fetch_rows(&conn, row_count)?;
    println!("{} rows loaded", rows.len());
    Ok(rows)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            hidden,
            learning_rate,
            max_error,
            max_iterations,
            normalization,
            train_ratio,
            seed,
            show,
            save,
        } => {
            let config = NetworkConfig {
                hidden_layers: parse_topology(&hidden)?,
                learning_rate,
                max_error,
                max_iterations,
                normalization,
                train_ratio,
                seed: seed.unwrap_or_else(date_seed),
            };
            config.validate()?;
            let rows = load_rows()?;

            println!("Training perceptron...");
            display::display_config(&config);

            let pb = ProgressBar::new(config.max_iterations as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("=> "),
            );
            let output = training::train(&rows, &config, &mut |_, error| {
                pb.inc(1);
                pb.set_message(format!("error {error:.6}"));
            })?;
            pb.finish_and_clear();

            display::display_training_report(&output.report);
            let evaluation = training::evaluate(&output.model.network, &output.test);
            display::display_evaluation(&evaluation, show);
            display::display_summary(&evaluation.summary);

            if let Some(path) = save {
                output.model.save(Path::new(&path))?;
                println!("\nModel saved to {path}");
            }
        }
        Command::Evaluate { model, show } => {
            let model = TrainedModel::load(Path::new(&model))?;
            let rows = load_rows()?;
            let examples = model.examples(&rows);
            let evaluation = training::evaluate(&model.network, &examples);
            display::display_evaluation(&evaluation, show);
            display::display_summary(&evaluation.summary);
        }
        Command::Predict { model, features } => {
            let features: [f64; INPUT_COUNT] = match features.as_slice().try_into() {
                Ok(f) => f,
                Err(_) => bail!("expected {INPUT_COUNT} feature values, got {}", features.len()),
            };
            let model = TrainedModel::load(Path::new(&model))?;
            let prediction = training::predict(&model, features)?;
            display::display_prediction(&prediction);
        }
    }

    Ok(())
}
