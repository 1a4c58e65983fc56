//! Movement input: desktop keys and XR controllers mapped to one sample type.
//!
//! # Invariants
//! - The locomotion controller consumes `MoveInput` samples, never raw
//!   device events. Desktop and XR share the same movement logic.
//! - A jump trigger is an edge: one press yields exactly one jumping sample.

pub mod sample;

pub use sample::{InputState, MoveInput, MoveKey, MoveSource};
