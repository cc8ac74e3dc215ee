use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on containers per shelf unless configured otherwise
pub const DEFAULT_MAX_CELLS: u32 = 64;

/// Errors raised while resolving or allocating a shelf layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{0}")]
    Configuration(String),

    #[error("shelf needs {cells} containers but at most {max} are allowed")]
    CapacityExceeded { cells: u64, max: u32 },
}

/// Resolved shape of a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShelfLayout {
    Grid { cols: u32, rows: u32 },
    Sequence { nums: u32 },
}

impl ShelfLayout {
    /// Resolves the stored shelf dimensions.
    ///
    /// Exactly one of {`cols` and `rows`, `nums`} must be set and every
    /// present dimension must be at least 1.
    pub fn from_dimensions(
        cols: Option<i32>,
        rows: Option<i32>,
        nums: Option<i32>,
    ) -> Result<Self, LayoutError> {
        match (cols, rows, nums) {
            (Some(cols), Some(rows), None) => Ok(Self::Grid {
                cols: positive("cols", cols)?,
                rows: positive("rows", rows)?,
            }),
            (None, None, Some(nums)) => Ok(Self::Sequence {
                nums: positive("nums", nums)?,
            }),
            (Some(_), None, _) => Err(LayoutError::Configuration(
                "rows required with cols".to_string(),
            )),
            (None, Some(_), _) => Err(LayoutError::Configuration(
                "cols required with rows".to_string(),
            )),
            (Some(_), Some(_), Some(_)) => Err(LayoutError::Configuration(
                "a shelf is sized either by cols and rows or by nums, not both".to_string(),
            )),
            (None, None, None) => Err(LayoutError::Configuration(
                "a shelf needs either cols and rows or nums".to_string(),
            )),
        }
    }

    /// Number of containers the layout holds
    pub fn cells(&self) -> u64 {
        match *self {
            Self::Grid { cols, rows } => u64::from(cols) * u64::from(rows),
            Self::Sequence { nums } => u64::from(nums),
        }
    }

    /// Grid bounds, `None` for sequence shelves
    pub fn grid(&self) -> Option<(u32, u32)> {
        match *self {
            Self::Grid { cols, rows } => Some((cols, rows)),
            Self::Sequence { .. } => None,
        }
    }
}

fn positive(field: &str, value: i32) -> Result<u32, LayoutError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| LayoutError::Configuration(format!("{} must be at least 1", field)))
}

/// One storage container to be created for a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerSlot {
    /// Running number, 1-based
    pub position: u32,
    pub col: Option<u32>,
    pub row: Option<u32>,
}

/// Produces one slot per cell of `layout`.
///
/// Grid slots are emitted column-major (col 1 rows 1..=R, then col 2, ...)
/// and numbered in that order; sequence slots are numbered 1..=nums.
pub fn allocate(layout: ShelfLayout, max_cells: u32) -> Result<Vec<ContainerSlot>, LayoutError> {
    let cells = layout.cells();
    if cells > u64::from(max_cells) {
        return Err(LayoutError::CapacityExceeded {
            cells,
            max: max_cells,
        });
    }

    let slots = match layout {
        ShelfLayout::Grid { cols, rows } => (1..=cols)
            .flat_map(|col| (1..=rows).map(move |row| (col, row)))
            .zip(1u32..)
            .map(|((col, row), position)| ContainerSlot {
                position,
                col: Some(col),
                row: Some(row),
            })
            .collect(),
        ShelfLayout::Sequence { nums } => (1..=nums)
            .map(|position| ContainerSlot {
                position,
                col: None,
                row: None,
            })
            .collect(),
    };

    Ok(slots)
}
