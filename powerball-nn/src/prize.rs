use serde::{Deserialize, Serialize};

use powerball_db::models::{DrawRecord, Pool};

pub type PrizeAmount = u64;

pub const JACKPOT: PrizeAmount = 40_000_000;
pub const SECOND_PRIZE: PrizeAmount = 1_000_000;

/// Payout indexed by `[match_count][bonus_matched as usize]`.
pub const PRIZE_TABLE: [[PrizeAmount; 2]; 6] = [
    [0, 4],
    [0, 4],
    [0, 7],
    [7, 100],
    [100, 50_000],
    [SECOND_PRIZE, JACKPOT],
];

/// How a pick fared against a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub matches: usize,
    pub bonus_matched: bool,
    pub prize: PrizeAmount,
}

impl Outcome {
    pub fn label(&self) -> String {
        if self.bonus_matched {
            format!("{}+PB", self.matches)
        } else {
            format!("{}", self.matches)
        }
    }
}

pub fn prize_for(matches: usize, bonus_matched: bool) -> PrizeAmount {
    debug_assert!(matches <= Pool::Mains.pick_count(), "match count {matches} above 5");
    PRIZE_TABLE[matches][bonus_matched as usize]
}

pub fn evaluate(predicted: &DrawRecord, actual: &DrawRecord) -> Outcome {
    let matches = predicted.common_mains(actual);
    let bonus_matched = predicted.bonus() == actual.bonus();
    Outcome {
        matches,
        bonus_matched,
        prize: prize_for(matches, bonus_matched),
    }
}

pub fn score(predicted: &DrawRecord, actual: &DrawRecord) -> PrizeAmount {
    evaluate(predicted, actual).prize
}
