//! Colony generation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::names::generate_name;
use crate::colony::Colony;
use crate::components::BuildingKind;
use crate::config::ColonyConfig;

const WORKPLACE_KINDS: [BuildingKind; 3] = [
    BuildingKind::Sawmill,
    BuildingKind::Farm,
    BuildingKind::Warehouse,
];

/// Parameters for a generated colony
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub seed: u64,
    pub citizens: u32,
    pub homes: u32,
    /// Worker buildings, cycling sawmill, farm, warehouse
    pub workplaces: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            citizens: 24,
            homes: 8,
            workplaces: 3,
        }
    }
}

/// Generate a colony. Homes get random levels, roughly half the citizens
/// get a job, and everyone starts homeless.
pub fn generate_colony(config: ColonyConfig, params: &GenerationParams) -> Colony {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let max_home_level = config.home.max_level;
    let mut colony = Colony::new(config);

    for _ in 0..params.homes {
        let home = colony.construct(BuildingKind::Home);
        let level = rng.gen_range(1..=max_home_level.max(1));
        // the id was just handed out, so this cannot fail
        let _ = colony.set_building_level(home, level);
    }

    let workplaces: Vec<_> = (0..params.workplaces)
        .map(|i| colony.construct(WORKPLACE_KINDS[i as usize % WORKPLACE_KINDS.len()]))
        .collect();

    for _ in 0..params.citizens {
        let id = colony.spawn_citizen(generate_name(&mut rng));
        if !workplaces.is_empty() && rng.gen_bool(0.5) {
            let workplace = workplaces[rng.gen_range(0..workplaces.len())];
            let _ = colony.employ(id, workplace);
        }
    }

    log::info!(
        "generated colony: {} citizens, {} homes, {} workplaces (seed {})",
        params.citizens,
        params.homes,
        params.workplaces,
        params.seed
    );
    colony
}
