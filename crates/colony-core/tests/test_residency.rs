//! Integration tests for home residency.
//!
//! Exercises: Roster → Residency (fill, tick, remove, destroy) → persistence
//! → view packets, through the public API only.

use colony_core::colony::{Colony, Roster};
use colony_core::components::{BuildingId, BuildingKind, Citizen, CitizenId, Name};
use colony_core::config::{ColonyConfig, ResidencyConfig};
use colony_core::engine::ColonyEngine;
use colony_core::generation::GenerationParams;
use colony_core::persistence::{load_colony, save_colony, ColonyRecord};
use colony_core::systems::Residency;
use colony_core::tick::TickEvent;
use colony_core::view::ColonyView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

fn roster(ids: &[i32]) -> Roster {
    let mut roster = Roster::new();
    for &id in ids {
        roster.add(Citizen::new(CitizenId(id), Name::new(format!("C{}", id), "Test")));
    }
    roster
}

fn home(id: u32, capacity: usize) -> Residency {
    Residency::new(BuildingId(id), capacity, &ResidencyConfig::default())
}

/// Check the residency invariants across every home in a colony
fn assert_consistent(colony: &Colony) {
    let mut seen = Vec::new();
    for building in colony.homes() {
        let residency = building.residency().unwrap();
        assert!(residency.len() <= residency.capacity());
        for &id in residency.occupants() {
            assert!(!seen.contains(&id), "{} housed twice", id);
            seen.push(id);
            assert_eq!(colony.citizen(id).unwrap().home(), Some(building.id()));
        }
    }
    for citizen in colony.roster().citizens() {
        match citizen.home() {
            Some(home) => assert!(colony.building(home).unwrap().has_resident(citizen.id())),
            None => assert!(!seen.contains(&citizen.id())),
        }
    }
}

// ── Assignment scenarios ───────────────────────────────────────────────

#[test]
fn first_fit_skips_citizens_housed_elsewhere() {
    let (a, b, c) = (CitizenId(1), CitizenId(2), CitizenId(3));
    let mut roster = roster(&[1, 2, 3]);

    let mut elsewhere = home(10, 1);
    elsewhere.restore(Some(&[b.raw()]), &mut roster);

    let mut house = home(1, 2);
    house.fill_vacancies(&mut roster);

    assert_eq!(house.occupants(), &[a, c]);
    assert_eq!(roster.citizen(b).unwrap().home(), Some(BuildingId(10)));
}

#[test]
fn full_home_ignores_the_tick() {
    let mut roster = roster(&[1, 2, 3]);
    let mut house = home(1, 2);
    house.restore(Some(&[1, 2]), &mut roster);

    let moved_in = house.on_tick(TickEvent::end(0), &mut roster);

    assert_eq!(moved_in, 0);
    assert_eq!(house.occupants(), &[CitizenId(1), CitizenId(2)]);
}

#[test]
fn fill_matches_min_of_capacity_and_homeless() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..200 {
        let size = rng.gen_range(0..12);
        let ids: Vec<i32> = (1..=size).collect();
        let mut roster = roster(&ids);

        // house a random subset elsewhere first
        let mut elsewhere = home(99, ids.len());
        let housed: Vec<i32> = ids.iter().copied().filter(|_| rng.gen_bool(0.3)).collect();
        elsewhere.restore(Some(&housed), &mut roster);
        let homeless = roster.homeless().count();

        let capacity = rng.gen_range(0..6);
        let mut house = home(1, capacity);
        house.fill_vacancies(&mut roster);

        assert_eq!(house.len(), capacity.min(homeless));
        for id in house.occupants() {
            assert!(!elsewhere.has_resident(*id));
        }
    }
}

#[test]
fn start_phase_never_assigns() {
    let mut roster = roster(&[1, 2]);
    let mut house = home(1, 2);
    for tick in 0..5 {
        house.on_tick(TickEvent::start(tick), &mut roster);
    }
    assert!(house.is_empty());
    assert_eq!(roster.homeless().count(), 2);
}

// ── Eviction and destruction ───────────────────────────────────────────

#[test]
fn removed_citizen_is_rehoused_by_the_next_scan_elsewhere() {
    let mut colony = Colony::new(ColonyConfig::default());
    let first = colony.construct(BuildingKind::Home);
    let ids: Vec<_> = (0..3)
        .map(|i| colony.spawn_citizen(Name::new(format!("N{}", i), "Test")))
        .collect();
    colony.on_tick(TickEvent::end(0));
    assert_eq!(colony.homeless_count(), 1);

    colony.destroy(first).unwrap();
    assert_eq!(colony.homeless_count(), 3);

    let second = colony.construct(BuildingKind::Home);
    colony.on_tick(TickEvent::end(1));
    assert_eq!(
        colony.building(second).unwrap().residency().unwrap().occupants(),
        &ids[..2]
    );
    assert_consistent(&colony);
}

#[test]
fn destroyed_home_clears_every_back_reference() {
    let mut roster = roster(&[1, 2, 3]);
    let mut house = home(1, 3);
    house.fill_vacancies(&mut roster);

    house.on_destroyed(&mut roster);

    assert_eq!(roster.homeless().count(), 3);
}

// ── Persistence and views ──────────────────────────────────────────────

#[test]
fn empty_home_persists_nothing_and_restores_empty() {
    let mut roster = roster(&[1]);
    let mut house = home(1, 2);
    let saved = house.persist();
    assert_eq!(saved, None);

    house.restore(saved.as_deref(), &mut roster);
    assert!(house.is_empty());
}

#[test]
fn generated_colony_survives_save_and_load() {
    let mut engine = ColonyEngine::default();
    engine.generate(&GenerationParams {
        seed: 77,
        citizens: 30,
        homes: 6,
        workplaces: 3,
    });
    engine.run(10);
    assert_consistent(&engine.colony);

    let mut buffer = Vec::new();
    save_colony(&mut buffer, &engine.colony, engine.tick()).unwrap();
    let reloaded = load_colony(&buffer[..], ColonyConfig::default())
        .unwrap()
        .colony;

    assert_consistent(&reloaded);
    assert_eq!(
        ColonyRecord::capture(&engine.colony, 0),
        ColonyRecord::capture(&reloaded, 0)
    );
}

#[test]
fn views_mirror_every_home() {
    let mut engine = ColonyEngine::default();
    engine.generate(&GenerationParams::default());
    engine.run(2);

    let mut view = ColonyView::new();
    for building in engine.colony.buildings() {
        view.apply(&engine.colony.view_packet(building.id()).unwrap())
            .unwrap();
    }

    assert_eq!(view.len(), engine.building_count());
    for building in engine.colony.buildings() {
        let replica = view.building(building.id()).unwrap();
        assert_eq!(replica.kind, building.kind());
        assert_eq!(replica.level, building.level());
        let expected = building
            .residency()
            .map(|r| r.occupants().to_vec())
            .unwrap_or_default();
        assert_eq!(replica.residents(), expected.as_slice());
    }
}

#[test]
fn many_ticks_keep_invariants_under_churn() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut engine = ColonyEngine::default();
    engine.generate(&GenerationParams {
        seed: 8,
        citizens: 20,
        homes: 5,
        workplaces: 1,
    });

    for _ in 0..100 {
        engine.step();
        assert_consistent(&engine.colony);

        match rng.gen_range(0..4) {
            0 => {
                let ids: Vec<_> = engine.colony.roster().citizens().map(|c| c.id()).collect();
                if !ids.is_empty() {
                    let victim = ids[rng.gen_range(0..ids.len())];
                    engine.colony.remove_citizen(victim).unwrap();
                }
            }
            1 => {
                engine.colony.spawn_citizen(Name::new("New", "Arrival"));
            }
            2 => {
                let homes: Vec<_> = engine.colony.homes().map(|h| h.id()).collect();
                if homes.len() > 1 {
                    engine.colony.destroy(homes[rng.gen_range(0..homes.len())]).unwrap();
                }
            }
            _ => {
                engine.colony.construct(BuildingKind::Home);
            }
        }
        assert_consistent(&engine.colony);
    }
}
