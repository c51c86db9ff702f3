//! Colony state: the citizen roster and every building.
//!
//! The roster and the building list are separate fields so a home can hold
//! the roster mutably while it scans for homeless citizens.

use bytes::{Bytes, BytesMut};
use log::{debug, info};
use std::collections::HashMap;
use thiserror::Error;

use crate::components::*;
use crate::config::{ColonyConfig, HomeConfig};
use crate::systems::Residency;
use crate::tick::TickEvent;

/// Errors for colony commands that name something that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColonyError {
    #[error("unknown {0}")]
    UnknownCitizen(CitizenId),
    #[error("unknown {0}")]
    UnknownBuilding(BuildingId),
    #[error("{0} does not employ workers")]
    NotAWorkplace(BuildingId),
}

/// Colony-wide ordered collection of citizens.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    citizens: Vec<Citizen>,
    index: HashMap<CitizenId, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    pub fn contains(&self, id: CitizenId) -> bool {
        self.index.contains_key(&id)
    }

    /// All citizens in insertion order
    pub fn citizens(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.iter()
    }

    pub fn citizen(&self, id: CitizenId) -> Option<&Citizen> {
        self.index.get(&id).map(|&idx| &self.citizens[idx])
    }

    pub fn citizen_mut(&mut self, id: CitizenId) -> Option<&mut Citizen> {
        let idx = *self.index.get(&id)?;
        self.citizens.get_mut(idx)
    }

    pub fn homeless(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.iter().filter(|c| c.is_homeless())
    }

    /// Append a citizen. Returns false if the id is already taken.
    ///
    /// The citizen arrives homeless; homes pick them up on their next scan.
    pub fn add(&mut self, mut citizen: Citizen) -> bool {
        if self.index.contains_key(&citizen.id()) {
            return false;
        }
        citizen.set_home(None);
        self.index.insert(citizen.id(), self.citizens.len());
        self.citizens.push(citizen);
        true
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Citizen> {
        self.citizens.iter_mut()
    }

    /// Drop a citizen, keeping the order of everyone else.
    /// Callers must move the citizen out of their home first.
    pub(crate) fn remove(&mut self, id: CitizenId) -> Option<Citizen> {
        let idx = self.index.remove(&id)?;
        let citizen = self.citizens.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(citizen)
    }
}

/// A constructed building. Homes carry residency; worker buildings do not.
#[derive(Debug, Clone)]
pub struct Building {
    id: BuildingId,
    kind: BuildingKind,
    level: u8,
    max_level: u8,
    dirty: bool,
    residency: Option<Residency>,
}

impl Building {
    pub(crate) fn new(id: BuildingId, kind: BuildingKind, config: &ColonyConfig) -> Self {
        let (max_level, residency) = if kind.is_residential() {
            (
                config.home.max_level,
                Some(Residency::new(id, config.home.capacity_at(0), &config.residency)),
            )
        } else {
            (DEFAULT_MAX_BUILDING_LEVEL, None)
        };

        Self {
            id,
            kind,
            level: 0,
            max_level,
            dirty: false,
            residency,
        }
    }

    pub fn id(&self) -> BuildingId {
        self.id
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn schematic_name(&self) -> &'static str {
        self.kind.schematic_name()
    }

    pub fn residency(&self) -> Option<&Residency> {
        self.residency.as_ref()
    }

    /// How many citizens can live here (zero for worker buildings)
    pub fn capacity(&self) -> usize {
        self.residency.as_ref().map_or(0, Residency::capacity)
    }

    pub fn has_resident(&self, citizen: CitizenId) -> bool {
        self.residency
            .as_ref()
            .is_some_and(|r| r.has_resident(citizen))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.residency.as_ref().is_some_and(Residency::is_dirty)
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
        if let Some(residency) = &mut self.residency {
            residency.mark_clean();
        }
    }

    /// Write this building's view packet: header, then the resident block
    /// for homes.
    pub fn serialize_to_view(&self, buf: &mut impl bytes::BufMut) {
        buf.put_u8(self.kind.tag());
        buf.put_u32(self.id.0);
        buf.put_u8(self.level);
        if let Some(residency) = &self.residency {
            residency.serialize_for_view(buf);
        }
    }

    pub(crate) fn residency_mut(&mut self) -> Option<&mut Residency> {
        self.residency.as_mut()
    }

    pub(crate) fn set_level(&mut self, level: u8, home: &HomeConfig, roster: &mut Roster) -> u8 {
        let level = level.min(self.max_level);
        if level != self.level {
            self.level = level;
            self.dirty = true;
        }
        if let Some(residency) = &mut self.residency {
            residency.set_capacity(home.capacity_at(level), roster);
        }
        level
    }

    pub(crate) fn on_tick(&mut self, event: TickEvent, roster: &mut Roster) -> usize {
        match &mut self.residency {
            Some(residency) => residency.on_tick(event, roster),
            None => 0,
        }
    }

    pub(crate) fn on_destroyed(&mut self, roster: &mut Roster) {
        if let Some(residency) = &mut self.residency {
            residency.on_destroyed(roster);
        }
    }
}

/// A colony: its citizens, its buildings and the counters that name them
#[derive(Debug, Clone)]
pub struct Colony {
    config: ColonyConfig,
    roster: Roster,
    buildings: Vec<Building>,
    next_citizen_id: i32,
    next_building_id: u32,
    max_citizens: usize,
}

impl Colony {
    pub fn new(config: ColonyConfig) -> Self {
        Self {
            config,
            roster: Roster::new(),
            buildings: Vec::new(),
            next_citizen_id: 1,
            next_building_id: 1,
            max_citizens: 0,
        }
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn citizen(&self, id: CitizenId) -> Option<&Citizen> {
        self.roster.citizen(id)
    }

    /// Add a new homeless citizen to the end of the roster.
    ///
    /// Ids already taken (for example by citizens added straight to the
    /// roster) are skipped.
    pub fn spawn_citizen(&mut self, name: Name) -> CitizenId {
        while self.roster.contains(CitizenId(self.next_citizen_id)) {
            self.next_citizen_id += 1;
        }
        let id = CitizenId(self.next_citizen_id);
        self.next_citizen_id += 1;
        self.roster.add(Citizen::new(id, name));
        debug!("spawned {}", id);
        id
    }

    /// Remove a citizen from the colony, moving them out of their home first
    pub fn remove_citizen(&mut self, id: CitizenId) -> Result<Citizen, ColonyError> {
        let home = self
            .roster
            .citizen(id)
            .ok_or(ColonyError::UnknownCitizen(id))?
            .home();

        if let Some(home) = home {
            if let Some(residency) = self
                .buildings
                .iter_mut()
                .find(|b| b.id == home)
                .and_then(Building::residency_mut)
            {
                residency.remove_occupant(id, &mut self.roster);
            }
        }

        self.roster
            .remove(id)
            .ok_or(ColonyError::UnknownCitizen(id))
    }

    /// Give a citizen the job a workplace creates
    pub fn employ(&mut self, citizen: CitizenId, workplace: BuildingId) -> Result<Job, ColonyError> {
        let kind = self
            .building(workplace)
            .ok_or(ColonyError::UnknownBuilding(workplace))?
            .kind();
        let job = kind
            .worker_job()
            .ok_or(ColonyError::NotAWorkplace(workplace))?;
        let target = self
            .roster
            .citizen_mut(citizen)
            .ok_or(ColonyError::UnknownCitizen(citizen))?;
        target.job = Some(job.clone());
        debug!("{} now works as {}", citizen, job.name_key());
        Ok(job)
    }

    /// Construct a new building at level 0
    pub fn construct(&mut self, kind: BuildingKind) -> BuildingId {
        let id = BuildingId(self.next_building_id);
        self.next_building_id += 1;
        self.buildings.push(Building::new(id, kind, &self.config));
        info!("constructed {} ({})", id, kind.schematic_name());

        if kind.is_residential() {
            self.recalculate_max_citizens();
        }
        id
    }

    /// Tear a building down. Residents of a home become homeless.
    pub fn destroy(&mut self, id: BuildingId) -> Result<Building, ColonyError> {
        let pos = self
            .buildings
            .iter()
            .position(|b| b.id == id)
            .ok_or(ColonyError::UnknownBuilding(id))?;

        let mut building = self.buildings.remove(pos);
        building.on_destroyed(&mut self.roster);
        info!("destroyed {} ({})", id, building.schematic_name());

        if building.kind.is_residential() {
            self.recalculate_max_citizens();
        }
        Ok(building)
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Buildings in construction order
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn homes(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(|b| b.kind.is_residential())
    }

    /// The home a citizen lives in
    pub fn home_of(&self, citizen: CitizenId) -> Option<&Building> {
        let home = self.roster.citizen(citizen)?.home()?;
        self.building(home)
    }

    /// Set a building's level, clamped to its max. Returns the level applied.
    pub fn set_building_level(&mut self, id: BuildingId, level: u8) -> Result<u8, ColonyError> {
        let home_config = self.config.home.clone();
        let building = self
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(ColonyError::UnknownBuilding(id))?;

        let applied = building.set_level(level, &home_config, &mut self.roster);
        if building.kind.is_residential() {
            self.recalculate_max_citizens();
        }
        Ok(applied)
    }

    /// Total resident capacity over every home
    pub fn recalculate_max_citizens(&mut self) -> usize {
        self.max_citizens = self.homes().map(Building::capacity).sum();
        debug!("colony now houses up to {} citizens", self.max_citizens);
        self.max_citizens
    }

    pub fn max_citizens(&self) -> usize {
        self.max_citizens
    }

    /// Deliver one tick phase to every building in construction order.
    /// Returns how many citizens found a home.
    pub fn on_tick(&mut self, event: TickEvent) -> usize {
        let mut housed = 0;
        for building in &mut self.buildings {
            housed += building.on_tick(event, &mut self.roster);
        }
        housed
    }

    pub fn citizen_count(&self) -> usize {
        self.roster.len()
    }

    pub fn homeless_count(&self) -> usize {
        self.roster.homeless().count()
    }

    pub fn housed_count(&self) -> usize {
        self.roster.len() - self.homeless_count()
    }

    /// Buildings changed since they were last saved
    pub fn dirty_buildings(&self) -> Vec<BuildingId> {
        self.buildings
            .iter()
            .filter(|b| b.is_dirty())
            .map(|b| b.id)
            .collect()
    }

    pub fn mark_all_clean(&mut self) {
        for building in &mut self.buildings {
            building.mark_clean();
        }
    }

    /// Encode the view packet for one building
    pub fn view_packet(&self, id: BuildingId) -> Result<Bytes, ColonyError> {
        let building = self.building(id).ok_or(ColonyError::UnknownBuilding(id))?;
        let residents = building.residency().map_or(0, Residency::len);
        let mut buf = BytesMut::with_capacity(6 + 4 * (1 + residents));
        building.serialize_to_view(&mut buf);
        Ok(buf.freeze())
    }

    pub(crate) fn next_ids(&self) -> (i32, u32) {
        (self.next_citizen_id, self.next_building_id)
    }

    /// Rebuild a colony from saved parts. Homes resolve their residents
    /// against the roster as they are inserted.
    pub(crate) fn from_saved(
        config: ColonyConfig,
        roster: Roster,
        next_ids: (i32, u32),
        buildings: Vec<(BuildingId, BuildingKind, u8, Option<Vec<i32>>)>,
    ) -> Self {
        // Stale counters in a save must not hand out ids that are in use
        let next_citizen_id = roster
            .citizens()
            .map(|c| c.id().raw().saturating_add(1))
            .fold(next_ids.0, i32::max);
        let next_building_id = buildings
            .iter()
            .map(|(id, ..)| id.0.saturating_add(1))
            .fold(next_ids.1, u32::max);

        let mut colony = Self {
            config,
            roster,
            buildings: Vec::with_capacity(buildings.len()),
            next_citizen_id,
            next_building_id,
            max_citizens: 0,
        };

        let home_config = colony.config.home.clone();
        for (id, kind, level, residents) in buildings {
            let mut building = Building::new(id, kind, &colony.config);
            building.set_level(level, &home_config, &mut colony.roster);
            building.dirty = false;
            if let Some(residency) = building.residency_mut() {
                residency.restore(residents.as_deref(), &mut colony.roster);
            }
            colony.buildings.push(building);
        }

        colony.recalculate_max_citizens();
        colony
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(given: &str) -> Name {
        Name::new(given, "Tester")
    }

    #[test]
    fn test_roster_keeps_insertion_order_after_removal() {
        let mut roster = Roster::new();
        for i in [5, 3, 9, 1] {
            assert!(roster.add(Citizen::new(CitizenId(i), name("x"))));
        }
        roster.remove(CitizenId(3));

        let order: Vec<i32> = roster.citizens().map(|c| c.id().raw()).collect();
        assert_eq!(order, vec![5, 9, 1]);
        assert!(roster.citizen(CitizenId(1)).is_some());
        assert!(roster.citizen(CitizenId(3)).is_none());
    }

    #[test]
    fn test_roster_rejects_duplicate_ids() {
        let mut roster = Roster::new();
        assert!(roster.add(Citizen::new(CitizenId(1), name("a"))));
        assert!(!roster.add(Citizen::new(CitizenId(1), name("b"))));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.citizen(CitizenId(1)).unwrap().name.given, "a");
    }

    #[test]
    fn test_roster_add_clears_home() {
        let mut citizen = Citizen::new(CitizenId(1), name("a"));
        citizen.set_home(Some(BuildingId(7)));
        let mut roster = Roster::new();
        roster.add(citizen);
        assert!(roster.citizen(CitizenId(1)).unwrap().is_homeless());
    }

    #[test]
    fn test_ids_are_allocated_from_one() {
        let mut colony = Colony::new(ColonyConfig::default());
        assert_eq!(colony.spawn_citizen(name("a")), CitizenId(1));
        assert_eq!(colony.spawn_citizen(name("b")), CitizenId(2));
        assert_eq!(colony.construct(BuildingKind::Home), BuildingId(1));
    }

    #[test]
    fn test_spawn_skips_ids_already_in_the_roster() {
        let mut colony = Colony::new(ColonyConfig::default());
        colony
            .roster_mut()
            .add(Citizen::new(CitizenId(1), name("existing")));

        let spawned = colony.spawn_citizen(name("new"));

        assert_eq!(spawned, CitizenId(2));
        assert_eq!(colony.citizen_count(), 2);
        assert_eq!(colony.citizen(CitizenId(1)).unwrap().name.given, "existing");
        assert_eq!(colony.citizen(spawned).unwrap().name.given, "new");
    }

    #[test]
    fn test_max_citizens_tracks_homes() {
        let mut colony = Colony::new(ColonyConfig::default());
        assert_eq!(colony.max_citizens(), 0);

        let a = colony.construct(BuildingKind::Home);
        colony.construct(BuildingKind::Home);
        colony.construct(BuildingKind::Sawmill);
        assert_eq!(colony.max_citizens(), 4);

        colony.destroy(a).unwrap();
        assert_eq!(colony.max_citizens(), 2);
    }

    #[test]
    fn test_level_change_recalculates_capacity() {
        let mut config = ColonyConfig::default();
        config.home.capacity_per_level = 1;
        let mut colony = Colony::new(config);
        let home = colony.construct(BuildingKind::Home);

        assert_eq!(colony.set_building_level(home, 3), Ok(3));
        assert_eq!(colony.building(home).unwrap().capacity(), 5);
        assert_eq!(colony.max_citizens(), 5);

        // clamped to the home's max level
        assert_eq!(colony.set_building_level(home, 10), Ok(4));
        assert_eq!(colony.max_citizens(), 6);
    }

    #[test]
    fn test_huge_capacity_rule_does_not_overflow() {
        let mut config = ColonyConfig::default();
        config.home.capacity_per_level = u32::MAX;
        let mut colony = Colony::new(config);
        let home = colony.construct(BuildingKind::Home);
        colony.spawn_citizen(name("a"));

        assert_eq!(colony.set_building_level(home, 2), Ok(2));
        assert_eq!(colony.building(home).unwrap().capacity(), u32::MAX as usize);
        colony.on_tick(TickEvent::end(0));
        assert_eq!(colony.housed_count(), 1);
        assert_eq!(colony.view_packet(home).unwrap().len(), 6 + 4 + 4);
    }

    #[test]
    fn test_worker_buildings_have_their_own_max_level() {
        let mut colony = Colony::new(ColonyConfig::default());
        let mill = colony.construct(BuildingKind::Sawmill);
        assert_eq!(colony.set_building_level(mill, 9), Ok(DEFAULT_MAX_BUILDING_LEVEL));
        assert_eq!(colony.building(mill).unwrap().capacity(), 0);
    }

    #[test]
    fn test_remove_citizen_moves_them_out() {
        let mut colony = Colony::new(ColonyConfig::default());
        let home = colony.construct(BuildingKind::Home);
        let a = colony.spawn_citizen(name("a"));
        colony.on_tick(TickEvent::end(0));
        assert!(colony.building(home).unwrap().has_resident(a));

        let removed = colony.remove_citizen(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(removed.is_homeless());
        assert!(!colony.building(home).unwrap().has_resident(a));
        assert_eq!(
            colony.remove_citizen(a),
            Err(ColonyError::UnknownCitizen(a))
        );
    }

    #[test]
    fn test_destroy_home_leaves_residents_homeless() {
        let mut colony = Colony::new(ColonyConfig::default());
        let home = colony.construct(BuildingKind::Home);
        let a = colony.spawn_citizen(name("a"));
        let b = colony.spawn_citizen(name("b"));
        colony.on_tick(TickEvent::end(0));
        assert_eq!(colony.housed_count(), 2);

        colony.destroy(home).unwrap();

        assert!(colony.citizen(a).unwrap().is_homeless());
        assert!(colony.citizen(b).unwrap().is_homeless());
        assert!(colony.home_of(a).is_none());
        assert!(colony.destroy(home).is_err());
    }

    #[test]
    fn test_employ() {
        let mut colony = Colony::new(ColonyConfig::default());
        let farm = colony.construct(BuildingKind::Farm);
        let home = colony.construct(BuildingKind::Home);
        let a = colony.spawn_citizen(name("a"));

        assert_eq!(colony.employ(a, farm), Ok(Job::Farmer));
        assert_eq!(colony.citizen(a).unwrap().job, Some(Job::Farmer));
        assert_eq!(colony.employ(a, home), Err(ColonyError::NotAWorkplace(home)));
        assert_eq!(
            colony.employ(CitizenId(99), farm),
            Err(ColonyError::UnknownCitizen(CitizenId(99)))
        );
    }

    #[test]
    fn test_dirty_tracking() {
        let mut colony = Colony::new(ColonyConfig::default());
        let home = colony.construct(BuildingKind::Home);
        assert!(colony.dirty_buildings().is_empty());

        let a = colony.spawn_citizen(name("a"));
        colony.on_tick(TickEvent::end(0));
        assert_eq!(colony.dirty_buildings(), vec![home]);

        colony.mark_all_clean();
        colony.remove_citizen(a).unwrap();
        assert!(colony.dirty_buildings().is_empty());
    }

    #[test]
    fn test_view_packet_header() {
        let mut colony = Colony::new(ColonyConfig::default());
        let mill = colony.construct(BuildingKind::Sawmill);
        colony.set_building_level(mill, 2).unwrap();

        let packet = colony.view_packet(mill).unwrap();
        assert_eq!(&packet[..], &[1, 0, 0, 0, 1, 2]);
    }
}
