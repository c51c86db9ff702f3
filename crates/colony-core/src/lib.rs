//! Colony Core - Colony Residency Simulation
//!
//! A headless simulation of a colony of citizens living in capacity-bounded
//! homes and working in worker buildings.
//!
//! # Architecture
//!
//! - **Components**: Plain data (citizens, names, jobs, building kinds)
//! - **Colony**: Owns the ordered citizen roster and every building
//! - **Systems**: Logic that mutates components (residency, crafting rules)
//! - **Engine**: Drives the colony one tick at a time, two phases per tick
//!
//! Homes fill their vacancies from the roster on the trailing phase of every
//! tick. The home and the citizen each hold one side of the residency link;
//! only the residency system writes either side.
//!
//! # Example
//!
//! ```rust,no_run
//! use colony_core::prelude::*;
//! use colony_core::generation::GenerationParams;
//!
//! let mut engine = ColonyEngine::new(ColonyConfig::default());
//!
//! engine.generate(&GenerationParams::default());
//!
//! // Run for a while, then persist
//! engine.run(200);
//! let mut save = Vec::new();
//! engine.save(&mut save).unwrap();
//! ```

pub mod colony;
pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod persistence;
pub mod systems;
pub mod tick;
pub mod view;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::colony::{Building, Colony, ColonyError, Roster};
    pub use crate::components::*;
    pub use crate::config::ColonyConfig;
    pub use crate::engine::ColonyEngine;
    pub use crate::systems::Residency;
    pub use crate::tick::{TickEvent, TickPhase};
}
