use thiserror::Error;

/// Columns of a corpus line: 6 input features then 6 labels.
pub const FIELD_COUNT: usize = 12;
/// 5 mains + bonus of the previous draw.
pub const INPUT_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    Mains,
    Bonus,
}

impl Pool {
    pub fn size(&self) -> usize {
        match self {
            Pool::Mains => 69,
            Pool::Bonus => 26,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Pool::Mains => 5,
            Pool::Bonus => 1,
        }
    }

    /// First slot of this pool inside a 95-wide target/output vector.
    pub fn offset(&self) -> usize {
        match self {
            Pool::Mains => 0,
            Pool::Bonus => Pool::Mains.size(),
        }
    }

    pub fn contains(&self, number: i64) -> bool {
        number >= 1 && number <= self.size() as i64
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pool::Mains => write!(f, "main"),
            Pool::Bonus => write!(f, "bonus"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCountMismatch { expected: usize, found: usize },
    #[error("field {index} is not a number: '{value}'")]
    NotANumber { index: usize, value: String },
    #[error("{pool} number {value} out of range (1-{max})", max = .pool.size())]
    OutOfRange { pool: Pool, value: i64 },
    #[error("duplicate main number {0}")]
    DuplicateMain(u8),
}

/// One draw: 5 distinct mains in `[1,69]` and a bonus in `[1,26]`.
///
/// Mains are kept in ascending order, so two records holding the same numbers
/// compare equal whatever order they were read or decoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawRecord {
    mains: [u8; 5],
    bonus: u8,
}

impl DrawRecord {
    pub fn new(mains: [i64; 5], bonus: i64) -> Result<Self, ParseError> {
        let mut checked = [0u8; 5];
        for (slot, &n) in checked.iter_mut().zip(mains.iter()) {
            if !Pool::Mains.contains(n) {
                return Err(ParseError::OutOfRange { pool: Pool::Mains, value: n });
            }
            *slot = n as u8;
        }
        if !Pool::Bonus.contains(bonus) {
            return Err(ParseError::OutOfRange { pool: Pool::Bonus, value: bonus });
        }
        checked.sort_unstable();
        if let Some(w) = checked.windows(2).find(|w| w[0] == w[1]) {
            return Err(ParseError::DuplicateMain(w[0]));
        }
        Ok(Self { mains: checked, bonus: bonus as u8 })
    }

    pub fn mains(&self) -> &[u8; 5] {
        &self.mains
    }

    pub fn bonus(&self) -> u8 {
        self.bonus
    }

    pub fn numbers_from(&self, pool: Pool) -> &[u8] {
        match pool {
            Pool::Mains => &self.mains,
            Pool::Bonus => std::slice::from_ref(&self.bonus),
        }
    }

    /// Number of mains shared with `other`.
    pub fn common_mains(&self, other: &DrawRecord) -> usize {
        self.mains.iter().filter(|n| other.mains.contains(n)).count()
    }
}

impl std::fmt::Display for DrawRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mains = self
            .mains
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");
        write!(f, "{} | PB {:2}", mains, self.bonus)
    }
}

/// A parsed corpus line: the raw input features and the draw they should predict.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub inputs: [f64; INPUT_COUNT],
    pub draw: DrawRecord,
}

impl TrainingRow {
    /// Canonical `|`-separated form.
    pub fn to_line(&self) -> String {
        let mut fields: Vec<String> = self.inputs.iter().map(|v| v.to_string()).collect();
        fields.extend(self.draw.mains.iter().map(|n| n.to_string()));
        fields.push(self.draw.bonus.to_string());
        fields.join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_record_ok() {
        assert!(DrawRecord::new([1, 2, 3, 4, 5], 1).is_ok());
        assert!(DrawRecord::new([69, 68, 67, 66, 65], 26).is_ok());
    }

    #[test]
    fn test_main_out_of_range() {
        assert_eq!(
            DrawRecord::new([0, 2, 3, 4, 5], 1),
            Err(ParseError::OutOfRange { pool: Pool::Mains, value: 0 })
        );
        assert_eq!(
            DrawRecord::new([1, 2, 3, 4, 70], 1),
            Err(ParseError::OutOfRange { pool: Pool::Mains, value: 70 })
        );
    }

    #[test]
    fn test_bonus_out_of_range() {
        assert!(DrawRecord::new([1, 2, 3, 4, 5], 0).is_err());
        assert_eq!(
            DrawRecord::new([1, 2, 3, 4, 5], 27),
            Err(ParseError::OutOfRange { pool: Pool::Bonus, value: 27 })
        );
    }

    #[test]
    fn test_duplicate_mains() {
        assert_eq!(
            DrawRecord::new([9, 1, 9, 4, 5], 3),
            Err(ParseError::DuplicateMain(9))
        );
    }

    #[test]
    fn test_mains_order_insensitive() {
        let a = DrawRecord::new([49, 7, 35, 14, 21], 9).unwrap();
        let b = DrawRecord::new([7, 14, 21, 35, 49], 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.mains(), &[7, 14, 21, 35, 49]);
    }

    #[test]
    fn test_common_mains() {
        let a = DrawRecord::new([1, 2, 3, 4, 5], 1).unwrap();
        let b = DrawRecord::new([4, 5, 6, 7, 1], 2).unwrap();
        assert_eq!(a.common_mains(&b), 3);
        assert_eq!(b.common_mains(&a), 3);
    }

    #[test]
    fn test_pool_layout() {
        assert_eq!(Pool::Mains.size() + Pool::Bonus.size(), 95);
        assert_eq!(Pool::Bonus.offset(), 69);
        assert_eq!(Pool::Mains.pick_count(), 5);
        assert_eq!(Pool::Bonus.pick_count(), 1);
    }

    #[test]
    fn test_numbers_from() {
        let draw = DrawRecord::new([10, 20, 30, 40, 50], 7).unwrap();
        assert_eq!(draw.numbers_from(Pool::Mains), &[10, 20, 30, 40, 50]);
        assert_eq!(draw.numbers_from(Pool::Bonus), &[7]);
    }

    #[test]
    fn test_to_line() {
        let row = TrainingRow {
            inputs: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            draw: DrawRecord::new([49, 7, 35, 14, 21], 9).unwrap(),
        };
        assert_eq!(row.to_line(), "1|2|3|4|5|6|7|14|21|35|49|9");
    }

    #[test]
    fn test_error_messages() {
        let err = ParseError::OutOfRange { pool: Pool::Mains, value: 70 };
        assert_eq!(err.to_string(), "main number 70 out of range (1-69)");
        let err = ParseError::FieldCountMismatch { expected: 12, found: 11 };
        assert_eq!(err.to_string(), "expected 12 fields, found 11");
    }
}
