use serde::{Deserialize, Serialize};

use powerball_db::models::Pool;

use crate::prize::{Outcome, PrizeAmount};

/// Aggregate over an evaluation set.
///
/// `merge` is associative and commutative, so partial summaries built on
/// different threads combine to the same totals in any order. Failed examples
/// are counted apart and never contribute to the prize average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrizeSummary {
    pub evaluated: usize,
    pub failed: usize,
    pub total_prize: PrizeAmount,
    pub main_hits: usize,
    pub bonus_hits: usize,
    /// `[match_count][bonus_matched as usize]`
    pub tiers: [[usize; 2]; 6],
}

impl PrizeSummary {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        let mut s = Self::default();
        s.record(outcome);
        s
    }

    pub fn failure() -> Self {
        Self {
            failed: 1,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        self.evaluated += 1;
        self.total_prize += outcome.prize;
        self.main_hits += outcome.matches;
        self.bonus_hits += outcome.bonus_matched as usize;
        self.tiers[outcome.matches][outcome.bonus_matched as usize] += 1;
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.evaluated += other.evaluated;
        self.failed += other.failed;
        self.total_prize += other.total_prize;
        self.main_hits += other.main_hits;
        self.bonus_hits += other.bonus_hits;
        for (row, other_row) in self.tiers.iter_mut().zip(other.tiers.iter()) {
            for (c, o) in row.iter_mut().zip(other_row.iter()) {
                *c += o;
            }
        }
        self
    }

    pub fn average_prize(&self) -> f64 {
        if self.evaluated == 0 {
            return 0.0;
        }
        self.total_prize as f64 / self.evaluated as f64
    }

    /// Average fraction of the 5 drawn mains found in the pick.
    pub fn main_hit_rate(&self) -> f64 {
        if self.evaluated == 0 {
            return 0.0;
        }
        self.main_hits as f64 / (self.evaluated * Pool::Mains.pick_count()) as f64
    }

    pub fn bonus_hit_rate(&self) -> f64 {
        if self.evaluated == 0 {
            return 0.0;
        }
        self.bonus_hits as f64 / self.evaluated as f64
    }
}

/// Expected hit rate of a uniformly random pick: pick_count / pool_size.
pub fn random_baseline(pool: Pool) -> f64 {
    pool.pick_count() as f64 / pool.size() as f64
}
