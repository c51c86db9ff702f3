//! Systems - logic that operates on components

mod crafting;
mod residency;

pub use crafting::*;
pub use residency::*;
