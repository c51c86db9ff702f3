//! Component definitions for the colony simulation.
//!
//! Components are plain data. Anything that changes residency lives in
//! systems, never here.

mod buildings;
mod common;
mod people;

pub use buildings::*;
pub use common::*;
pub use people::*;
