//! Read-only building replicas decoded from view packets.
//!
//! Packet layout (big-endian):
//! - `u8`  building kind tag
//! - `u32` building id
//! - `u8`  level
//! - homes only: `i32` resident count N, then N × `i32` citizen id
//!
//! A replica holds ids only, never citizen data, and is rebuilt from scratch
//! on every packet.

use bytes::Buf;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::components::{BuildingId, BuildingKind, CitizenId};

/// Errors decoding a view packet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("view packet truncated: needed {needed} more bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },
    #[error("unknown building kind tag {0}")]
    UnknownKind(u8),
    #[error("negative resident count {0}")]
    NegativeCount(i32),
}

/// Replica of a home's resident list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeView {
    residents: Vec<CitizenId>,
}

impl HomeView {
    pub fn residents(&self) -> &[CitizenId] {
        &self.residents
    }

    /// Replace the resident list with the block at the front of `buf`
    pub fn deserialize(&mut self, buf: &mut impl Buf) -> Result<(), ViewError> {
        self.residents.clear();

        let count = read_i32(buf)?;
        if count < 0 {
            return Err(ViewError::NegativeCount(count));
        }
        let count = count as usize;
        ensure(&*buf, count.saturating_mul(4))?;

        self.residents.reserve(count);
        for _ in 0..count {
            self.residents.push(CitizenId(buf.get_i32()));
        }
        Ok(())
    }
}

/// Replica of one building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingView {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub level: u8,
    pub home: Option<HomeView>,
}

impl BuildingView {
    pub fn deserialize(buf: &mut impl Buf) -> Result<Self, ViewError> {
        ensure(&*buf, 1 + 4 + 1)?;
        let tag = buf.get_u8();
        let kind = BuildingKind::from_tag(tag).ok_or(ViewError::UnknownKind(tag))?;
        let id = BuildingId(buf.get_u32());
        let level = buf.get_u8();

        let home = if kind.is_residential() {
            let mut home = HomeView::default();
            home.deserialize(buf)?;
            Some(home)
        } else {
            None
        };

        Ok(Self {
            id,
            kind,
            level,
            home,
        })
    }

    /// Resident ids, empty for worker buildings
    pub fn residents(&self) -> &[CitizenId] {
        match &self.home {
            Some(home) => home.residents(),
            None => &[],
        }
    }
}

/// Client-side set of building replicas
#[derive(Debug, Clone, Default)]
pub struct ColonyView {
    buildings: BTreeMap<BuildingId, BuildingView>,
}

impl ColonyView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a packet and replace the replica it describes
    pub fn apply(&mut self, mut packet: &[u8]) -> Result<BuildingId, ViewError> {
        let view = BuildingView::deserialize(&mut packet)?;
        let id = view.id;
        self.buildings.insert(id, view);
        Ok(id)
    }

    pub fn remove(&mut self, id: BuildingId) -> Option<BuildingView> {
        self.buildings.remove(&id)
    }

    pub fn building(&self, id: BuildingId) -> Option<&BuildingView> {
        self.buildings.get(&id)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &BuildingView> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

fn ensure(buf: &impl Buf, needed: usize) -> Result<(), ViewError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(ViewError::Truncated { needed, remaining });
    }
    Ok(())
}

fn read_i32(buf: &mut impl Buf) -> Result<i32, ViewError> {
    ensure(&*buf, 4)?;
    Ok(buf.get_i32())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::Colony;
    use crate::components::Name;
    use crate::config::ColonyConfig;
    use crate::tick::TickEvent;

    #[test]
    fn test_home_packet_decodes_residents_in_order() {
        let mut colony = Colony::new(ColonyConfig::default());
        let home = colony.construct(BuildingKind::Home);
        let a = colony.spawn_citizen(Name::new("A", "A"));
        let b = colony.spawn_citizen(Name::new("B", "B"));
        colony.on_tick(TickEvent::end(0));

        let mut view = ColonyView::new();
        let id = view.apply(&colony.view_packet(home).unwrap()).unwrap();

        assert_eq!(id, home);
        let replica = view.building(home).unwrap();
        assert_eq!(replica.kind, BuildingKind::Home);
        assert_eq!(replica.residents(), &[a, b]);
    }

    #[test]
    fn test_replica_is_rebuilt_not_appended() {
        let mut colony = Colony::new(ColonyConfig::default());
        let home = colony.construct(BuildingKind::Home);
        let a = colony.spawn_citizen(Name::new("A", "A"));
        let b = colony.spawn_citizen(Name::new("B", "B"));
        colony.on_tick(TickEvent::end(0));

        let mut view = ColonyView::new();
        view.apply(&colony.view_packet(home).unwrap()).unwrap();

        colony.remove_citizen(a).unwrap();
        view.apply(&colony.view_packet(home).unwrap()).unwrap();

        assert_eq!(view.building(home).unwrap().residents(), &[b]);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_home_view_deserialize_clears_first() {
        let mut home = HomeView {
            residents: vec![CitizenId(9)],
        };
        let mut packet: &[u8] = &[0, 0, 0, 1, 0, 0, 0, 4];
        home.deserialize(&mut packet).unwrap();
        assert_eq!(home.residents(), &[CitizenId(4)]);
    }

    #[test]
    fn test_worker_building_has_no_resident_block() {
        let packet: &[u8] = &[2, 0, 0, 0, 7, 3];
        let mut view = ColonyView::new();
        let id = view.apply(packet).unwrap();
        let replica = view.building(id).unwrap();
        assert_eq!(replica.kind, BuildingKind::Farm);
        assert_eq!(replica.level, 3);
        assert!(replica.home.is_none());
        assert!(replica.residents().is_empty());
    }

    #[test]
    fn test_truncated_packets_are_rejected() {
        let mut view = ColonyView::new();
        assert!(matches!(
            view.apply(&[0, 0, 0]),
            Err(ViewError::Truncated { .. })
        ));
        // claims two residents, carries one
        assert_eq!(
            view.apply(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 2, 0, 0, 0, 5]),
            Err(ViewError::Truncated {
                needed: 8,
                remaining: 4
            })
        );
        assert!(view.is_empty());
    }

    #[test]
    fn test_bad_tag_and_negative_count() {
        let mut view = ColonyView::new();
        assert_eq!(
            view.apply(&[9, 0, 0, 0, 1, 0]),
            Err(ViewError::UnknownKind(9))
        );
        assert_eq!(
            view.apply(&[0, 0, 0, 0, 1, 0, 0xff, 0xff, 0xff, 0xff]),
            Err(ViewError::NegativeCount(-1))
        );
    }
}
