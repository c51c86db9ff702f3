//! Save/Load functionality for persisting colony state
//!
//! Saves are JSON. Citizens are written without their home; each home writes
//! its own `residents` list and the back-references are rebuilt from those
//! lists on load. A home with no residents writes no `residents` field.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::colony::{Colony, Roster};
use crate::components::*;
use crate::config::ColonyConfig;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a colony
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyRecord {
    /// Save format version
    pub version: u32,
    /// Ticks completed when the save was written
    pub tick: u64,
    pub next_citizen_id: i32,
    pub next_building_id: u32,
    /// Citizens in roster order
    pub citizens: Vec<CitizenRecord>,
    /// Buildings in construction order
    pub buildings: Vec<BuildingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    pub id: CitizenId,
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: BuildingId,
    pub kind: BuildingKind,
    #[serde(default)]
    pub level: u8,
    /// Resident citizen ids; absent when the home is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residents: Option<Vec<i32>>,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Result of loading a colony
pub struct LoadedColony {
    pub colony: Colony,
    pub tick: u64,
}

impl ColonyRecord {
    /// Snapshot a colony
    pub fn capture(colony: &Colony, tick: u64) -> Self {
        let (next_citizen_id, next_building_id) = colony.next_ids();

        let citizens = colony
            .roster()
            .citizens()
            .map(|c| CitizenRecord {
                id: c.id(),
                name: c.name.clone(),
                job: c.job.clone(),
            })
            .collect();

        let buildings = colony
            .buildings()
            .map(|b| BuildingRecord {
                id: b.id(),
                kind: b.kind(),
                level: b.level(),
                residents: b.residency().and_then(|r| r.persist()),
            })
            .collect();

        Self {
            version: SAVE_VERSION,
            tick,
            next_citizen_id,
            next_building_id,
            citizens,
            buildings,
        }
    }

    /// Rebuild a colony. Resident ids that no longer resolve are dropped, and
    /// the id counters are raised past every id already in use.
    pub fn into_colony(self, config: ColonyConfig) -> Result<LoadedColony, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }

        let mut roster = Roster::new();
        for record in self.citizens {
            let mut citizen = Citizen::new(record.id, record.name);
            citizen.job = record.job;
            if !roster.add(citizen) {
                log::warn!("duplicate {} in save, keeping the first", record.id);
            }
        }

        let buildings = self
            .buildings
            .into_iter()
            .map(|b| (b.id, b.kind, b.level, b.residents))
            .collect();

        let colony = Colony::from_saved(
            config,
            roster,
            (self.next_citizen_id, self.next_building_id),
            buildings,
        );

        Ok(LoadedColony {
            colony,
            tick: self.tick,
        })
    }
}

/// Save the complete colony to a writer
pub fn save_colony<W: Write>(writer: W, colony: &Colony, tick: u64) -> Result<(), SaveError> {
    let record = ColonyRecord::capture(colony, tick);
    serde_json::to_writer(writer, &record)?;
    log::info!(
        "saved colony: {} citizens, {} buildings at tick {}",
        record.citizens.len(),
        record.buildings.len(),
        tick
    );
    Ok(())
}

/// Load a colony from a reader
pub fn load_colony<R: Read>(reader: R, config: ColonyConfig) -> Result<LoadedColony, SaveError> {
    let record: ColonyRecord = serde_json::from_reader(reader)?;
    let loaded = record.into_colony(config)?;
    log::info!(
        "loaded colony: {} citizens, {} buildings at tick {}",
        loaded.colony.citizen_count(),
        loaded.colony.buildings().count(),
        loaded.tick
    );
    Ok(loaded)
}
