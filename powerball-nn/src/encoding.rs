use anyhow::{bail, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use powerball_db::models::{DrawRecord, ParseError, Pool, TrainingRow, INPUT_COUNT};

use crate::config::Normalization;

/// Width of a feature vector: 5 mains + bonus of the previous draw.
pub const INPUT_DIM: usize = INPUT_COUNT;
/// Width of a target/output vector: 69 main slots then 26 bonus slots.
pub const OUTPUT_DIM: usize = 95;

/// Slot of `number` inside a target vector, checked against the pool range.
/// Mains map to `n-1`, bonus numbers to `68+b`.
pub fn target_index(pool: Pool, number: i64) -> Result<usize, ParseError> {
    if !pool.contains(number) {
        return Err(ParseError::OutOfRange { pool, value: number });
    }
    Ok(slot(pool, number as u8))
}

fn slot(pool: Pool, number: u8) -> usize {
    pool.offset() + (number as usize - 1)
}

/// The six input columns, copied verbatim.
pub fn encode_input(row: &TrainingRow) -> Array1<f64> {
    Array1::from_vec(row.inputs.to_vec())
}

/// Multi-hot target: five ones in `[0,69)`, one in `[69,95)`.
pub fn encode_target(draw: &DrawRecord) -> Array1<f64> {
    let mut v = Array1::zeros(OUTPUT_DIM);
    for pool in [Pool::Mains, Pool::Bonus] {
        for &n in draw.numbers_from(pool) {
            let i = slot(pool, n);
            debug_assert!(i >= pool.offset() && i < pool.offset() + pool.size());
            v[i] = 1.0;
        }
    }
    v
}

/// Per-column scaling fitted over a whole dataset and stored with the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub kind: Normalization,
    pub scale: Vec<f64>,
}

impl Normalizer {
    pub fn identity() -> Self {
        Self {
            kind: Normalization::None,
            scale: vec![1.0; INPUT_DIM],
        }
    }

    pub fn fit(kind: Normalization, inputs: &[Array1<f64>]) -> Self {
        match kind {
            Normalization::None => Self::identity(),
            Normalization::Max => {
                let mut scale = vec![0.0f64; INPUT_DIM];
                for x in inputs {
                    for (s, &v) in scale.iter_mut().zip(x.iter()) {
                        *s = s.max(v.abs());
                    }
                }
                // an all-zero column is left as is
                for s in &mut scale {
                    if *s == 0.0 {
                        *s = 1.0;
                    }
                }
                Self { kind, scale }
            }
        }
    }

    /// One finite, non-zero divisor per input column.
    pub fn validate(&self) -> Result<()> {
        if self.scale.len() != INPUT_DIM {
            bail!("normalizer has {} columns, expected {INPUT_DIM}", self.scale.len());
        }
        if let Some((i, s)) = self
            .scale
            .iter()
            .enumerate()
            .find(|&(_, &s)| !s.is_finite() || s == 0.0)
        {
            bail!("normalizer column {i} has invalid scale {s}");
        }
        Ok(())
    }

    pub fn apply(&self, input: &Array1<f64>) -> Array1<f64> {
        let mut out = input.clone();
        for (v, &s) in out.iter_mut().zip(self.scale.iter()) {
            *v /= s;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerball_db::parse::parse_line;

    fn test_row() -> TrainingRow {
        parse_line("1|2|3|4|5|6|7|14|21|35|49|9").unwrap()
    }

    #[test]
    fn test_input_copied_verbatim() {
        let v = encode_input(&test_row());
        assert_eq!(v.len(), INPUT_DIM);
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_target_dimension_and_sum() {
        let t = encode_target(&test_row().draw);
        assert_eq!(t.len(), OUTPUT_DIM);
        assert!((t.slice(ndarray::s![..69]).sum() - 5.0).abs() < 1e-12);
        assert!((t.slice(ndarray::s![69..]).sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_correct_indices() {
        let t = encode_target(&test_row().draw);
        let ones: Vec<usize> = t
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 1.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(ones, vec![6, 13, 20, 34, 48, 77]);
        assert!(t.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_target_extremes() {
        let draw = DrawRecord::new([1, 2, 3, 4, 69], 26).unwrap();
        let t = encode_target(&draw);
        assert_eq!(t[0], 1.0);
        assert_eq!(t[68], 1.0);
        assert_eq!(t[94], 1.0);
        let draw = DrawRecord::new([1, 2, 3, 4, 5], 1).unwrap();
        assert_eq!(encode_target(&draw)[69], 1.0);
    }

    #[test]
    fn test_index_bijection() {
        let mains: Vec<usize> = (1..=69)
            .map(|n| target_index(Pool::Mains, n).unwrap())
            .collect();
        assert_eq!(mains, (0..69).collect::<Vec<_>>());

        let bonus: Vec<usize> = (1..=26)
            .map(|b| target_index(Pool::Bonus, b).unwrap())
            .collect();
        assert_eq!(bonus, (69..95).collect::<Vec<_>>());
        for b in 1..=26i64 {
            assert_eq!(target_index(Pool::Bonus, b).unwrap(), 68 + b as usize);
        }
    }

    #[test]
    fn test_index_out_of_range() {
        assert!(target_index(Pool::Mains, 0).is_err());
        assert_eq!(
            target_index(Pool::Mains, 70),
            Err(ParseError::OutOfRange { pool: Pool::Mains, value: 70 })
        );
        assert!(target_index(Pool::Bonus, 27).is_err());
    }

    #[test]
    fn test_max_normalizer() {
        let inputs = vec![
            Array1::from_vec(vec![10.0, 2.0, 0.0, 4.0, 5.0, 13.0]),
            Array1::from_vec(vec![20.0, 1.0, 0.0, 8.0, 5.0, 26.0]),
        ];
        let norm = Normalizer::fit(Normalization::Max, &inputs);
        assert_eq!(norm.scale, vec![20.0, 2.0, 1.0, 8.0, 5.0, 26.0]);
        let out = norm.apply(&inputs[0]);
        assert_eq!(out.to_vec(), vec![0.5, 1.0, 0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_identity_normalizer() {
        let input = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let norm = Normalizer::fit(Normalization::None, &[input.clone()]);
        assert_eq!(norm.apply(&input), input);
    }

    #[test]
    fn test_normalizer_validate() {
        assert!(Normalizer::identity().validate().is_ok());

        let short = Normalizer { kind: Normalization::Max, scale: vec![2.0] };
        assert!(short.validate().is_err());

        let mut zero = Normalizer::identity();
        zero.scale[0] = 0.0;
        assert!(zero.validate().is_err());

        let mut infinite = Normalizer::identity();
        infinite.scale[5] = f64::INFINITY;
        assert!(infinite.validate().is_err());

        let mut nan = Normalizer::identity();
        nan.scale[2] = f64::NAN;
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_fitted_normalizer_is_valid() {
        let inputs = vec![Array1::from_vec(vec![0.0, -3.0, 2.0, 0.0, 1.0, 5.0])];
        assert!(Normalizer::fit(Normalization::Max, &inputs).validate().is_ok());
    }
}
