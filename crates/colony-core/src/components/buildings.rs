//! Building kinds and their static properties.

use super::people::Job;
use serde::{Deserialize, Serialize};

/// Max level for buildings that do not configure their own
pub const DEFAULT_MAX_BUILDING_LEVEL: u8 = 5;

/// Kinds of building a colony can construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Houses citizens
    Home,
    Sawmill,
    Farm,
    Warehouse,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Home,
        BuildingKind::Sawmill,
        BuildingKind::Farm,
        BuildingKind::Warehouse,
    ];

    /// Name of the schematic the building is placed from
    pub fn schematic_name(self) -> &'static str {
        match self {
            BuildingKind::Home => "Citizen",
            BuildingKind::Sawmill => "sawmill",
            BuildingKind::Farm => "farmer",
            BuildingKind::Warehouse => "warehouse",
        }
    }

    pub fn is_residential(self) -> bool {
        matches!(self, BuildingKind::Home)
    }

    /// Job created for citizens employed here
    pub fn worker_job(self) -> Option<Job> {
        match self {
            BuildingKind::Home => None,
            BuildingKind::Sawmill => Some(Job::Sawmill),
            BuildingKind::Farm => Some(Job::Farmer),
            BuildingKind::Warehouse => Some(Job::deliveryman()),
        }
    }

    /// Wire tag used in view packets
    pub fn tag(self) -> u8 {
        match self {
            BuildingKind::Home => 0,
            BuildingKind::Sawmill => 1,
            BuildingKind::Farm => 2,
            BuildingKind::Warehouse => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}
