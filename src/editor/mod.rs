//! Text capture for the block being edited.
//!
//! Provides a rope-backed buffer with a char-indexed cursor, designed for
//! integration into the TEA architecture.

mod buffer;

pub use buffer::{Direction, EditorBuffer};
