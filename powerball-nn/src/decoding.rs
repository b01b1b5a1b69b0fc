//! Output vector → pick.
//!
//! Selection works on positions: one left-to-right pass keeps the best `k`
//! `(score, index)` pairs in a small buffer sorted by descending score. A
//! candidate only displaces an entry it beats strictly, so among equal scores
//! the lower index always ranks first and no index can be picked twice.

use thiserror::Error;

use powerball_db::models::{DrawRecord, ParseError, Pool};

use crate::encoding::OUTPUT_DIM;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("output vector has {found} values, expected {expected}")]
    WrongLength { expected: usize, found: usize },
    #[error("decoded numbers do not form a valid draw: {0}")]
    InvalidDraw(#[from] ParseError),
}

/// A number and the score the model gave it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub number: u8,
    pub score: f64,
}

// NaN ranks below every real score.
fn rank_key(v: f64) -> f64 {
    if v.is_nan() {
        f64::NEG_INFINITY
    } else {
        v
    }
}

/// Indices of the `k` largest values, best first; ties go to the lower index.
pub fn top_k(values: &[f64], k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
    for (i, &raw) in values.iter().enumerate() {
        let v = rank_key(raw);
        if best.len() == k && v <= best[k - 1].0 {
            continue;
        }
        let pos = best.iter().position(|&(b, _)| v > b).unwrap_or(best.len());
        best.insert(pos, (v, i));
        best.truncate(k);
    }
    best.into_iter().map(|(_, i)| i).collect()
}

/// The `k` best numbers of `pool` with their raw scores.
pub fn ranked(output: &[f64], pool: Pool, k: usize) -> Result<Vec<Ranked>, DecodeError> {
    check_length(output)?;
    let range = &output[pool.offset()..pool.offset() + pool.size()];
    Ok(top_k(range, k)
        .into_iter()
        .map(|i| Ranked {
            number: (i + 1) as u8,
            score: range[i],
        })
        .collect())
}

/// Top-5 mains and top-1 bonus of a 95-wide output vector.
pub fn decode(output: &[f64]) -> Result<DrawRecord, DecodeError> {
    let mains = ranked(output, Pool::Mains, Pool::Mains.pick_count())?;
    let bonus = ranked(output, Pool::Bonus, Pool::Bonus.pick_count())?;

    let mut picked = [0i64; 5];
    for (slot, r) in picked.iter_mut().zip(mains.iter()) {
        *slot = r.number as i64;
    }
    let bonus = bonus.first().map(|r| r.number as i64).unwrap_or(0);
    Ok(DrawRecord::new(picked, bonus)?)
}

fn check_length(output: &[f64]) -> Result<(), DecodeError> {
    if output.len() != OUTPUT_DIM {
        return Err(DecodeError::WrongLength {
            expected: OUTPUT_DIM,
            found: output.len(),
        });
    }
    Ok(())
}
