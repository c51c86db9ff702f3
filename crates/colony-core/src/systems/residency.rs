//! Residency system - which citizens live in which home
//!
//! A home keeps an ordered list of its residents and each citizen keeps a
//! back-reference to its home. Both sides are only ever written here, in the
//! same call, so they cannot drift apart:
//! - `fill_vacancies` moves homeless citizens in (roster order, first fit)
//! - `remove_occupant` moves one citizen out
//! - `on_destroyed` evicts everyone
//! - `restore` rebuilds the list from a save

use bytes::BufMut;
use log::{debug, warn};

use crate::colony::Roster;
use crate::components::{BuildingId, CitizenId};
use crate::config::ResidencyConfig;
use crate::tick::TickEvent;

/// Resident bookkeeping for one home
#[derive(Debug, Clone, PartialEq)]
pub struct Residency {
    owner: BuildingId,
    capacity: usize,
    occupants: Vec<CitizenId>,
    dirty: bool,
    mark_dirty_on_eviction: bool,
}

impl Residency {
    pub fn new(owner: BuildingId, capacity: usize, config: &ResidencyConfig) -> Self {
        Self {
            owner,
            capacity,
            occupants: Vec::new(),
            dirty: false,
            mark_dirty_on_eviction: config.mark_dirty_on_eviction,
        }
    }

    /// The home these residents belong to
    pub fn owner(&self) -> BuildingId {
        self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Residents in move-in order
    pub fn occupants(&self) -> &[CitizenId] {
        &self.occupants
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    pub fn vacancies(&self) -> usize {
        self.capacity.saturating_sub(self.occupants.len())
    }

    /// Whether the resident list changed since it was last persisted
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn has_resident(&self, citizen: CitizenId) -> bool {
        self.occupants.contains(&citizen)
    }

    /// Rebuild the resident list from persisted ids.
    ///
    /// `None` means the save had no resident field, which is the same as an
    /// empty home. Ids that no longer resolve to a citizen are dropped. This is
    /// a reload, not a change, so the home is not marked dirty.
    pub fn restore(&mut self, persisted: Option<&[i32]>, roster: &mut Roster) {
        self.release_all(roster);
        self.occupants.clear();

        let Some(ids) = persisted else {
            return;
        };

        for (idx, &raw) in ids.iter().enumerate() {
            if self.is_full() {
                warn!(
                    "{} saved {} residents but holds {}; dropping the rest",
                    self.owner,
                    ids.len(),
                    self.capacity
                );
                debug!("dropped residents: {:?}", &ids[idx..]);
                break;
            }

            let id = CitizenId(raw);
            let Some(citizen) = roster.citizen_mut(id) else {
                debug!("{} no longer exists, dropped from {}", id, self.owner);
                continue;
            };

            match citizen.home() {
                None => {}
                Some(home) if home == self.owner => {
                    debug!("{} listed twice in {}", id, self.owner);
                    continue;
                }
                Some(other) => {
                    warn!(
                        "{} restored into {} but already lives in {}; keeping {}",
                        id, self.owner, other, other
                    );
                    continue;
                }
            }

            citizen.set_home(Some(self.owner));
            self.occupants.push(id);
        }
    }

    /// Resident ids to persist, or `None` when the home is empty.
    ///
    /// An empty home writes no field at all; older saves rely on a missing
    /// field meaning zero residents.
    pub fn persist(&self) -> Option<Vec<i32>> {
        if self.occupants.is_empty() {
            return None;
        }
        Some(self.occupants.iter().map(|id| id.raw()).collect())
    }

    /// Per-tick hook. Scans for homeless citizens on the trailing phase only,
    /// and only while there is room. Returns how many moved in.
    pub fn on_tick(&mut self, event: TickEvent, roster: &mut Roster) -> usize {
        if !event.is_end() {
            return 0;
        }

        if self.occupants.len() < self.capacity {
            self.fill_vacancies(roster)
        } else {
            0
        }
    }

    /// Move homeless citizens in, in roster order, until the home is full.
    ///
    /// One pass over the roster. Returns how many moved in.
    pub fn fill_vacancies(&mut self, roster: &mut Roster) -> usize {
        let mut assigned = 0;

        for citizen in roster.iter_mut() {
            if self.occupants.len() >= self.capacity {
                break;
            }

            if citizen.is_homeless() {
                citizen.set_home(Some(self.owner));
                self.occupants.push(citizen.id());
                self.dirty = true;
                assigned += 1;
                debug!("{} moved into {}", citizen.id(), self.owner);
            }
        }

        assigned
    }

    /// Move a citizen out. Does nothing if they do not live here.
    pub fn remove_occupant(&mut self, citizen: CitizenId, roster: &mut Roster) -> bool {
        let Some(pos) = self.occupants.iter().position(|&id| id == citizen) else {
            return false;
        };

        self.occupants.remove(pos);
        self.clear_back_reference(citizen, roster);
        if self.mark_dirty_on_eviction {
            self.dirty = true;
        }
        debug!("{} moved out of {}", citizen, self.owner);
        true
    }

    /// Evict every resident because the home is being torn down.
    pub fn on_destroyed(&mut self, roster: &mut Roster) {
        let evicted = self.release_all(roster);
        self.occupants.clear();

        if evicted > 0 && self.mark_dirty_on_eviction {
            self.dirty = true;
        }
        debug!("{} destroyed, evicted {} residents", self.owner, evicted);
    }

    /// Write the resident block of a view packet: count, then each id.
    pub fn serialize_for_view(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.occupants.len() as i32);
        for id in &self.occupants {
            buf.put_i32(id.raw());
        }
    }

    /// Change capacity after a level change. Latest arrivals leave first if
    /// the home shrank below its resident count.
    pub(crate) fn set_capacity(&mut self, capacity: usize, roster: &mut Roster) {
        self.capacity = capacity;

        if self.occupants.len() > capacity {
            warn!(
                "{} shrank to {} residents, evicting {}",
                self.owner,
                capacity,
                self.occupants.len() - capacity
            );
            while self.occupants.len() > capacity {
                if let Some(id) = self.occupants.pop() {
                    self.clear_back_reference(id, roster);
                }
            }
            if self.mark_dirty_on_eviction {
                self.dirty = true;
            }
        }
    }

    /// Clear the back-reference of every current resident. The list itself is
    /// left to the caller.
    fn release_all(&self, roster: &mut Roster) -> usize {
        for &id in &self.occupants {
            self.clear_back_reference(id, roster);
        }
        self.occupants.len()
    }

    fn clear_back_reference(&self, id: CitizenId, roster: &mut Roster) {
        if let Some(citizen) = roster.citizen_mut(id) {
            if citizen.home() == Some(self.owner) {
                citizen.set_home(None);
            }
        }
    }
}
