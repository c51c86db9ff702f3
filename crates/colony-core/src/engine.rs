//! Simulation engine - main entry point for running a colony

use crate::colony::Colony;
use crate::config::ColonyConfig;
use crate::generation::{generate_colony, GenerationParams};
use crate::persistence::{self, SaveError};
use crate::tick::TickEvent;

/// Main simulation engine
pub struct ColonyEngine {
    /// The colony being simulated
    pub colony: Colony,
    /// Number of completed ticks
    tick: u64,
}

impl ColonyEngine {
    /// Create an engine around an empty colony
    pub fn new(config: ColonyConfig) -> Self {
        Self {
            colony: Colony::new(config),
            tick: 0,
        }
    }

    /// Wrap an existing colony
    pub fn with_colony(colony: Colony, tick: u64) -> Self {
        Self { colony, tick }
    }

    /// Replace the colony with a freshly generated one
    pub fn generate(&mut self, params: &GenerationParams) {
        let config = self.colony.config().clone();
        self.colony = generate_colony(config, params);
        self.tick = 0;
    }

    /// Advance one tick: the leading phase, then the trailing phase.
    /// Returns how many citizens found a home.
    pub fn step(&mut self) -> usize {
        let mut housed = self.colony.on_tick(TickEvent::start(self.tick));
        housed += self.colony.on_tick(TickEvent::end(self.tick));
        if housed > 0 {
            log::debug!("tick {}: {} citizens found a home", self.tick, housed);
        }
        self.tick += 1;
        housed
    }

    /// Advance several ticks
    pub fn run(&mut self, ticks: u64) -> usize {
        (0..ticks).map(|_| self.step()).sum()
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn citizen_count(&self) -> usize {
        self.colony.citizen_count()
    }

    pub fn homeless_count(&self) -> usize {
        self.colony.homeless_count()
    }

    pub fn housed_count(&self) -> usize {
        self.colony.housed_count()
    }

    pub fn building_count(&self) -> usize {
        self.colony.buildings().count()
    }

    /// Save the colony to a writer. Every building is clean afterwards.
    pub fn save<W: std::io::Write>(&mut self, writer: W) -> Result<(), SaveError> {
        persistence::save_colony(writer, &self.colony, self.tick)?;
        self.colony.mark_all_clean();
        Ok(())
    }

    /// Load a colony from a reader, keeping the current configuration
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let config = self.colony.config().clone();
        let loaded = persistence::load_colony(reader, config)?;

        self.colony = loaded.colony;
        self.tick = loaded.tick;
        Ok(())
    }
}

impl Default for ColonyEngine {
    fn default() -> Self {
        Self::new(ColonyConfig::default())
    }
}
