use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ShelfLayout;

/// Reasons a binder cannot sit where it was asked to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("shelf has no size")]
    NoSize,

    #[error("row required with column")]
    RowRequired,

    #[error("column required with row")]
    ColumnRequired,

    #[error("coordinate out of bounds: ({col}, {row}) on a {cols}x{rows} shelf")]
    OutOfBounds {
        col: i32,
        row: i32,
        cols: u32,
        rows: u32,
    },
}

/// A 1-based (column, row) cell on a grid shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub col: u32,
    pub row: u32,
}

/// Checks a binder's requested coordinate against its shelf.
///
/// Returns the validated coordinate, or `None` when the binder is left
/// unplaced. Two binders may share a coordinate; callers decide what to do
/// about occupancy.
pub fn validate_placement(
    layout: ShelfLayout,
    col: Option<i32>,
    row: Option<i32>,
) -> Result<Option<Coordinate>, PlacementError> {
    let Some((cols, rows)) = layout.grid() else {
        return match (col, row) {
            (None, None) => Ok(None),
            _ => Err(PlacementError::NoSize),
        };
    };

    let (col, row) = match (col, row) {
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(PlacementError::RowRequired),
        (None, Some(_)) => return Err(PlacementError::ColumnRequired),
        (Some(col), Some(row)) => (col, row),
    };

    let within = |value: i32, bound: u32| u32::try_from(value).map_or(false, |v| (1..=bound).contains(&v));
    if !within(col, cols) || !within(row, rows) {
        return Err(PlacementError::OutOfBounds {
            col,
            row,
            cols,
            rows,
        });
    }

    Ok(Some(Coordinate {
        col: col as u32,
        row: row as u32,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    const GRID: ShelfLayout = ShelfLayout::Grid { cols: 4, rows: 3 };
    const SEQUENCE: ShelfLayout = ShelfLayout::Sequence { nums: 10 };

    #[rstest]
    #[case(None, None, None)]
    #[case(Some(1), Some(1), Some(Coordinate { col: 1, row: 1 }))]
    #[case(Some(4), Some(3), Some(Coordinate { col: 4, row: 3 }))]
    fn accepts_valid_grid_placements(
        #[case] col: Option<i32>,
        #[case] row: Option<i32>,
        #[case] expected: Option<Coordinate>,
    ) {
        assert_eq!(validate_placement(GRID, col, row), Ok(expected));
    }

    #[rstest]
    #[case(Some(5), Some(1))]
    #[case(Some(5), Some(3))]
    #[case(Some(5), Some(99))]
    #[case(Some(0), Some(1))]
    #[case(Some(1), Some(4))]
    #[case(Some(-1), Some(1))]
    fn rejects_out_of_bounds(#[case] col: Option<i32>, #[case] row: Option<i32>) {
        assert_matches!(
            validate_placement(GRID, col, row),
            Err(PlacementError::OutOfBounds { cols: 4, rows: 3, .. })
        );
    }

    #[test]
    fn column_past_the_grid_fails_without_row() {
        assert_eq!(
            validate_placement(GRID, Some(5), None),
            Err(PlacementError::RowRequired)
        );
    }

    #[test]
    fn partial_coordinates_are_rejected() {
        assert_eq!(
            validate_placement(GRID, Some(2), None),
            Err(PlacementError::RowRequired)
        );
        assert_eq!(
            validate_placement(GRID, None, Some(2)),
            Err(PlacementError::ColumnRequired)
        );
    }

    #[rstest]
    #[case(Some(1), Some(1))]
    #[case(Some(1), None)]
    #[case(None, Some(1))]
    fn unsized_shelf_takes_no_coordinates(#[case] col: Option<i32>, #[case] row: Option<i32>) {
        assert_eq!(validate_placement(SEQUENCE, col, row), Err(PlacementError::NoSize));
    }

    #[test]
    fn unsized_shelf_accepts_unplaced_binder() {
        assert_eq!(validate_placement(SEQUENCE, None, None), Ok(None));
    }

    #[test]
    fn error_messages_read_naturally() {
        assert_eq!(PlacementError::NoSize.to_string(), "shelf has no size");
        assert!(PlacementError::OutOfBounds {
            col: 5,
            row: 1,
            cols: 4,
            rows: 3
        }
        .to_string()
        .starts_with("coordinate out of bounds"));
    }
}
