//! Shelf layout rules.
//!
//! A shelf is either a grid (`cols` x `rows`) or a plain sequence of
//! `nums` containers. [`allocator`] turns a layout into container slots and
//! [`placement`] checks binder coordinates against it. Both are pure and
//! know nothing about persistence.

pub mod allocator;
pub mod placement;

pub use allocator::{allocate, ContainerSlot, LayoutError, ShelfLayout, DEFAULT_MAX_CELLS};
pub use placement::{validate_placement, Coordinate, PlacementError};
