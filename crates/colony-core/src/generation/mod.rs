//! Generation - procedural creation of colonies and citizens

mod colony;
mod names;

pub use colony::*;
pub use names::*;
