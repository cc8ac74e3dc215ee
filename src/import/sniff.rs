//! Header detection for uploaded CSV files.
//!
//! The first row is compared column by column against the rows that follow
//! it. A column whose values are consistently numeric, or consistently of one
//! length, votes for a header when the first-row cell breaks that pattern and
//! against one when it fits. Columns without a consistent pattern drop out.

/// Rows examined after the candidate header
const MAX_ROWS_CHECKED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Numeric,
    Length(usize),
}

impl CellKind {
    fn of(cell: &str) -> Self {
        if cell.trim().parse::<f64>().is_ok() {
            CellKind::Numeric
        } else {
            CellKind::Length(cell.chars().count())
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ColumnState {
    Unseen,
    Consistent(CellKind),
    Mixed,
}

/// Returns the longest prefix of `text` no larger than `max_bytes` that ends
/// on a char boundary.
pub fn sample(text: &str, max_bytes: usize) -> &str {
    let mut end = text.len().min(max_bytes);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Guesses whether the first row of a comma separated `sample` is a header.
pub fn has_header(sample: &str) -> bool {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes());
    let mut records = reader.records().filter_map(Result::ok);

    let Some(header) = records.next() else {
        return false;
    };
    if header.iter().all(str::is_empty) {
        return false;
    }

    let mut columns = vec![ColumnState::Unseen; header.len()];
    for record in records.take(MAX_ROWS_CHECKED) {
        if record.len() != header.len() {
            continue;
        }
        for (state, cell) in columns.iter_mut().zip(record.iter()) {
            let kind = CellKind::of(cell);
            *state = match *state {
                ColumnState::Unseen => ColumnState::Consistent(kind),
                ColumnState::Consistent(seen) if seen == kind => ColumnState::Consistent(seen),
                _ => ColumnState::Mixed,
            };
        }
    }

    let votes: i32 = columns
        .iter()
        .zip(header.iter())
        .map(|(state, cell)| match state {
            ColumnState::Mixed => 0,
            ColumnState::Unseen => 1,
            ColumnState::Consistent(CellKind::Numeric) => {
                if CellKind::of(cell) == CellKind::Numeric {
                    -1
                } else {
                    1
                }
            }
            ColumnState::Consistent(CellKind::Length(len)) => {
                if cell.chars().count() == *len {
                    -1
                } else {
                    1
                }
            }
        })
        .sum();

    votes > 0
}
