use std::time::Instant;

use anyhow::{anyhow, bail, Result};
use ndarray::{Array1, Array2};
use rand::distr::Uniform;
use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};

use crate::config::{NetworkConfig, TrainingReport};

/// One training pair in model space.
#[derive(Debug, Clone)]
pub struct Sample {
    pub input: Array1<f64>,
    pub target: Array1<f64>,
}

/// What the pipeline needs from a model: fixed-width inference and a fitting
/// pass that reports its error after every iteration.
pub trait TrainableModel: Send + Sync {
    fn input_dim(&self) -> usize;
    fn output_dim(&self) -> usize;
    fn infer(&self, input: &Array1<f64>) -> Array1<f64>;
    fn fit(
        &mut self,
        samples: &[Sample],
        on_iteration: &mut dyn FnMut(usize, f64),
    ) -> Result<TrainingReport>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Layer {
    /// [outputs, inputs]
    weights: Array2<f64>,
    bias: Array1<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRule {
    pub learning_rate: f64,
    pub max_error: f64,
    pub max_iterations: usize,
}

impl Default for LearningRule {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for LearningRule {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            max_error: config.max_error,
            max_iterations: config.max_iterations,
        }
    }
}

/// Fully connected sigmoid network trained by online back-propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perceptron {
    layers: Vec<Layer>,
    /// Not persisted; rebuilt from the owning config when a model is loaded.
    #[serde(skip)]
    pub rule: LearningRule,
}

impl Perceptron {
    /// `topology` lists every layer width, input first and output last.
    pub fn new(topology: &[usize], rule: LearningRule, rng: &mut impl Rng) -> Result<Self> {
        if topology.len() < 2 {
            bail!("topology needs at least an input and an output layer");
        }
        if topology.contains(&0) {
            bail!("empty layer in topology {:?}", topology);
        }
        let dist = Uniform::new(-0.5, 0.5).map_err(|e| anyhow!("weight range: {e}"))?;
        let layers = topology
            .windows(2)
            .map(|w| Layer {
                weights: Array2::from_shape_fn((w[1], w[0]), |_| rng.sample(dist)),
                bias: Array1::from_shape_fn(w[1], |_| rng.sample(dist)),
            })
            .collect();
        Ok(Self { layers, rule })
    }

    pub fn topology(&self) -> Vec<usize> {
        let mut t = vec![self.input_dim()];
        t.extend(self.layers.iter().map(|l| l.bias.len()));
        t
    }

    /// Every layer must be non-empty, have one bias per weight row and take
    /// as many inputs as the previous layer has outputs.
    pub fn check_shapes(&self) -> Result<()> {
        if self.layers.is_empty() {
            bail!("network has no layers");
        }
        for (i, layer) in self.layers.iter().enumerate() {
            let (rows, cols) = layer.weights.dim();
            if rows == 0 || cols == 0 {
                bail!("layer {i} is empty ({rows}x{cols})");
            }
            if rows != layer.bias.len() {
                bail!("layer {i} has {rows} weight rows but {} biases", layer.bias.len());
            }
            if i > 0 {
                let prev = self.layers[i - 1].bias.len();
                if cols != prev {
                    bail!("layer {i} takes {cols} inputs, layer {} gives {prev}", i - 1);
                }
            }
        }
        Ok(())
    }

    /// Activations of every layer, the input included.
    fn forward(&self, input: &Array1<f64>) -> Vec<Array1<f64>> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.clone());
        for layer in &self.layers {
            let prev = &activations[activations.len() - 1];
            let z = layer.weights.dot(prev) + &layer.bias;
            activations.push(z.mapv(sigmoid));
        }
        activations
    }

    /// One online update; returns the sample error before the update.
    fn backpropagate(&mut self, sample: &Sample) -> f64 {
        let activations = self.forward(&sample.input);
        let output = &activations[activations.len() - 1];
        let diff = output - &sample.target;
        let error = 0.5 * diff.dot(&diff);

        let mut delta = &diff * &output.mapv(|a| a * (1.0 - a));
        let lr = self.rule.learning_rate;
        for l in (0..self.layers.len()).rev() {
            let prev = &activations[l];
            // propagate before this layer's weights change
            let next_delta = if l > 0 {
                Some(self.layers[l].weights.t().dot(&delta) * &prev.mapv(|a| a * (1.0 - a)))
            } else {
                None
            };
            let layer = &mut self.layers[l];
            layer.weights.scaled_add(-lr, &outer(&delta, prev));
            layer.bias.scaled_add(-lr, &delta);
            if let Some(d) = next_delta {
                delta = d;
            }
        }
        error
    }
}

impl TrainableModel for Perceptron {
    fn input_dim(&self) -> usize {
        self.layers.first().map(|l| l.weights.ncols()).unwrap_or(0)
    }

    fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.bias.len()).unwrap_or(0)
    }

    fn infer(&self, input: &Array1<f64>) -> Array1<f64> {
        self.forward(input).pop().unwrap_or_else(|| input.clone())
    }

    fn fit(
        &mut self,
        samples: &[Sample],
        on_iteration: &mut dyn FnMut(usize, f64),
    ) -> Result<TrainingReport> {
        if samples.is_empty() {
            bail!("cannot train on an empty dataset");
        }
        let (n_in, n_out) = (self.input_dim(), self.output_dim());
        if let Some(bad) = samples
            .iter()
            .position(|s| s.input.len() != n_in || s.target.len() != n_out)
        {
            bail!(
                "sample {bad} has shape {}->{}, network expects {n_in}->{n_out}",
                samples[bad].input.len(),
                samples[bad].target.len()
            );
        }

        let start = Instant::now();
        let mut error_history = Vec::with_capacity(self.rule.max_iterations.min(10_000));
        let mut converged = false;
        let mut error = f64::INFINITY;

        for iteration in 1..=self.rule.max_iterations {
            let total: f64 = samples.iter().map(|s| self.backpropagate(s)).sum();
            error = total / samples.len() as f64;
            error_history.push(error);
            on_iteration(iteration, error);
            if iteration % 100 == 0 {
                log::debug!("iteration {iteration}: error {error:.6}");
            }
            if error <= self.rule.max_error {
                converged = true;
                break;
            }
        }

        Ok(TrainingReport {
            iterations: error_history.len(),
            final_error: error,
            error_history,
            converged,
            train_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}
