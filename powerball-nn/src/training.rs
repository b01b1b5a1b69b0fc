use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use powerball_db::models::{DrawRecord, Pool, TrainingRow, INPUT_COUNT};

use crate::config::{NetworkConfig, Normalization, TrainingReport};
use crate::decoding::{decode, ranked, DecodeError, Ranked};
use crate::encoding::{encode_input, encode_target, Normalizer, INPUT_DIM, OUTPUT_DIM};
use crate::metrics::PrizeSummary;
use crate::network::{LearningRule, Perceptron, Sample, TrainableModel};
use crate::prize::{evaluate as evaluate_pick, Outcome};

/// A corpus row together with its (normalized) model-space sample.
#[derive(Debug, Clone)]
pub struct Example {
    pub row: TrainingRow,
    pub sample: Sample,
}

pub struct Dataset {
    pub normalizer: Normalizer,
    pub examples: Vec<Example>,
}

pub struct DataSplit {
    pub train: Vec<Example>,
    pub test: Vec<Example>,
}

impl Dataset {
    /// Encode every row; the normalizer is fitted on all rows before any split.
    pub fn from_rows(rows: &[TrainingRow], normalization: Normalization) -> Self {
        let inputs: Vec<Array1<f64>> = rows.iter().map(encode_input).collect();
        let normalizer = Normalizer::fit(normalization, &inputs);
        let examples = build_examples(rows, &normalizer);
        Self { normalizer, examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.examples.shuffle(&mut rng);
    }

    /// Disjoint train/test partition; `train_ratio` of the rows go to training.
    pub fn split(self, train_ratio: f64) -> Result<DataSplit> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            bail!("train ratio must lie in (0, 1), got {train_ratio}");
        }
        let n = self.examples.len();
        let train_len = (n as f64 * train_ratio).round() as usize;
        if train_len == 0 || train_len == n {
            bail!("{n} rows cannot be split {train_ratio}/{}", 1.0 - train_ratio);
        }
        let mut train = self.examples;
        let test = train.split_off(train_len);
        Ok(DataSplit { train, test })
    }
}

fn build_examples(rows: &[TrainingRow], normalizer: &Normalizer) -> Vec<Example> {
    rows.iter()
        .map(|row| Example {
            row: row.clone(),
            sample: Sample {
                input: normalizer.apply(&encode_input(row)),
                target: encode_target(&row.draw),
            },
        })
        .collect()
}

/// Everything needed to reproduce predictions: settings, input scaling, weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub config: NetworkConfig,
    pub normalizer: Normalizer,
    pub network: Perceptron,
}

impl TrainedModel {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write model to {:?}", path))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read model {:?}", path))?;
        let mut model: TrainedModel = serde_json::from_str(&json)
            .with_context(|| format!("Invalid model JSON in {:?}", path))?;
        model
            .config
            .validate()
            .with_context(|| format!("Invalid config in model {:?}", path))?;
        model
            .network
            .check_shapes()
            .with_context(|| format!("Inconsistent network in model {:?}", path))?;
        model
            .normalizer
            .validate()
            .with_context(|| format!("Invalid normalizer in model {:?}", path))?;
        model.network.rule = LearningRule::from(&model.config);
        if model.network.input_dim() != INPUT_DIM || model.network.output_dim() != OUTPUT_DIM {
            bail!(
                "model {:?} maps {} -> {}, expected {INPUT_DIM} -> {OUTPUT_DIM}",
                path,
                model.network.input_dim(),
                model.network.output_dim()
            );
        }
        Ok(model)
    }

    /// Encode rows with this model's normalizer.
    pub fn examples(&self, rows: &[TrainingRow]) -> Vec<Example> {
        build_examples(rows, &self.normalizer)
    }
}

pub struct TrainingOutput {
    pub model: TrainedModel,
    pub report: TrainingReport,
    pub test: Vec<Example>,
}

/// Encode, shuffle, split and fit. The held-out part is returned for evaluation.
pub fn train(
    rows: &[TrainingRow],
    config: &NetworkConfig,
    on_iteration: &mut dyn FnMut(usize, f64),
) -> Result<TrainingOutput> {
    config.validate()?;
    if rows.is_empty() {
        bail!("no training rows");
    }

    let mut dataset = Dataset::from_rows(rows, config.normalization);
    dataset.shuffle(config.seed);
    let normalizer = dataset.normalizer.clone();
    let split = dataset.split(config.train_ratio)?;
    log::info!(
        "dataset: {} rows, {} train / {} test",
        rows.len(),
        split.train.len(),
        split.test.len()
    );

    let mut topology = vec![INPUT_DIM];
    topology.extend(&config.hidden_layers);
    topology.push(OUTPUT_DIM);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut network = Perceptron::new(&topology, LearningRule::from(config), &mut rng)?;

    let samples: Vec<Sample> = split.train.iter().map(|e| e.sample.clone()).collect();
    let report = network.fit(&samples, on_iteration)?;
    log::info!(
        "training stopped after {} iterations, error {:.6} (converged: {})",
        report.iterations,
        report.final_error,
        report.converged
    );

    Ok(TrainingOutput {
        model: TrainedModel {
            config: config.clone(),
            normalizer,
            network,
        },
        report,
        test: split.test,
    })
}

/// Per-example evaluation record.
#[derive(Debug, Clone)]
pub struct ExampleResult {
    pub features: [f64; INPUT_COUNT],
    pub actual: DrawRecord,
    pub outcome: Result<(DrawRecord, Outcome), DecodeError>,
}

impl ExampleResult {
    fn summary(&self) -> PrizeSummary {
        match &self.outcome {
            Ok((_, outcome)) => PrizeSummary::from_outcome(outcome),
            Err(_) => PrizeSummary::failure(),
        }
    }
}

pub struct Evaluation {
    pub results: Vec<ExampleResult>,
    pub summary: PrizeSummary,
}

/// Infer, decode and score every example in parallel.
pub fn evaluate<M: TrainableModel>(model: &M, examples: &[Example]) -> Evaluation {
    let results: Vec<ExampleResult> = examples
        .par_iter()
        .map(|example| {
            let output = model.infer(&example.sample.input).to_vec();
            let outcome = decode(&output).map(|pick| {
                let outcome = evaluate_pick(&pick, &example.row.draw);
                (pick, outcome)
            });
            if let Err(e) = &outcome {
                log::warn!("skipping example {}: {}", example.row.to_line(), e);
            }
            ExampleResult {
                features: example.row.inputs,
                actual: example.row.draw,
                outcome,
            }
        })
        .collect();

    let summary = results
        .par_iter()
        .map(ExampleResult::summary)
        .reduce(PrizeSummary::default, PrizeSummary::merge);

    Evaluation { results, summary }
}

pub struct Prediction {
    pub pick: DrawRecord,
    pub mains: Vec<Ranked>,
    pub bonus: Vec<Ranked>,
}

/// Decode a pick for the draw that follows `features`.
pub fn predict(model: &TrainedModel, features: [f64; INPUT_COUNT]) -> Result<Prediction> {
    let input = model.normalizer.apply(&Array1::from_vec(features.to_vec()));
    let output = model.network.infer(&input).to_vec();
    Ok(Prediction {
        pick: decode(&output)?,
        mains: ranked(&output, Pool::Mains, 15)?,
        bonus: ranked(&output, Pool::Bonus, 6)?,
    })
}
