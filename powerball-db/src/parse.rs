use crate::models::{DrawRecord, ParseError, TrainingRow, FIELD_COUNT, INPUT_COUNT};

/// Corpus field separator. Always split on the literal character.
pub const FIELD_DELIMITER: char = '|';

/// Parse one corpus line: 6 input columns then 5 mains and the bonus.
pub fn parse_line(line: &str) -> Result<TrainingRow, ParseError> {
    let fields: Vec<&str> = line.trim().split(FIELD_DELIMITER).collect();
    parse_fields(&fields)
}

/// Parse an already-split record (used by the CSV importer).
pub fn parse_fields<S: AsRef<str>>(fields: &[S]) -> Result<TrainingRow, ParseError> {
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCountMismatch {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let mut inputs = [0.0f64; INPUT_COUNT];
    for (i, slot) in inputs.iter_mut().enumerate() {
        *slot = parse_real(fields[i].as_ref(), i)?;
    }

    let mut labels = [0i64; FIELD_COUNT - INPUT_COUNT];
    for (j, slot) in labels.iter_mut().enumerate() {
        let index = INPUT_COUNT + j;
        *slot = parse_integer(fields[index].as_ref(), index)?;
    }

    let draw = DrawRecord::new(
        [labels[0], labels[1], labels[2], labels[3], labels[4]],
        labels[5],
    )?;

    Ok(TrainingRow { inputs, draw })
}

fn parse_real(raw: &str, index: usize) -> Result<f64, ParseError> {
    let s = raw.trim();
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::NotANumber { index, value: s.to_string() }),
    }
}

fn parse_integer(raw: &str, index: usize) -> Result<i64, ParseError> {
    let s = raw.trim();
    s.parse::<i64>()
        .map_err(|_| ParseError::NotANumber { index, value: s.to_string() })
}
