//! Colony Headless Simulation Harness
//!
//! Generates a colony from a seed, runs it, and checks residency invariants
//! end to end. Runs entirely in-process: no networking, no rendering.
//!
//! Usage:
//!   cargo run -p colony-simtest
//!   cargo run -p colony-simtest -- --verbose --seed 7 --ticks 500

use colony_core::colony::Colony;
use colony_core::components::{BuildingKind, CitizenId, Name};
use colony_core::config::ColonyConfig;
use colony_core::engine::ColonyEngine;
use colony_core::generation::GenerationParams;
use colony_core::systems::{sawmill_accepts, ItemStack, Recipe};
use colony_core::view::ColonyView;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    ticks: u64,
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .and_then(|v| v.parse::<u64>().ok())
    };

    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        seed: value_of("--seed").unwrap_or(42),
        ticks: value_of("--ticks").unwrap_or(200),
    }
}

fn main() {
    let options = parse_options();
    println!("=== Colony Simulation Harness ===");
    println!("seed {} / {} ticks\n", options.seed, options.ticks);

    let mut results = Vec::new();

    // 1. Generation and housing
    let mut engine = ColonyEngine::default();
    engine.generate(&GenerationParams {
        seed: options.seed,
        citizens: 40,
        homes: 12,
        workplaces: 4,
    });
    results.extend(validate_housing(&mut engine, options.ticks, options.verbose));

    // 2. Churn: departures, arrivals, demolition
    results.extend(validate_churn(&mut engine, options.verbose));

    // 3. Save/load round trip
    results.extend(validate_persistence(&mut engine));

    // 4. View packets
    results.extend(validate_views(&engine.colony));

    // 5. Sawmill recipe rules
    results.extend(validate_recipes(&ColonyConfig::default()));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Invariants ──────────────────────────────────────────────────────────

/// Every broken residency invariant, as readable strings
fn residency_violations(colony: &Colony) -> Vec<String> {
    let mut violations = Vec::new();
    let mut housed: Vec<CitizenId> = Vec::new();

    for home in colony.homes() {
        let Some(residency) = home.residency() else {
            violations.push(format!("{} has no residency", home.id()));
            continue;
        };
        if residency.len() > residency.capacity() {
            violations.push(format!(
                "{} holds {} of {}",
                home.id(),
                residency.len(),
                residency.capacity()
            ));
        }
        for &id in residency.occupants() {
            if housed.contains(&id) {
                violations.push(format!("{} listed in two homes", id));
            }
            housed.push(id);
            match colony.citizen(id) {
                Some(c) if c.home() == Some(home.id()) => {}
                Some(c) => violations.push(format!(
                    "{} listed in {} but points at {:?}",
                    id,
                    home.id(),
                    c.home()
                )),
                None => violations.push(format!("{} listed in {} but gone", id, home.id())),
            }
        }
    }

    for citizen in colony.roster().citizens() {
        if let Some(home) = citizen.home() {
            if !housed.contains(&citizen.id()) {
                violations.push(format!("{} points at {} but is not listed", citizen.id(), home));
            }
        }
    }

    violations
}

fn invariant_result(name: &str, colony: &Colony) -> TestResult {
    let violations = residency_violations(colony);
    TestResult {
        name: name.into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!(
                "{} housed, {} homeless",
                colony.housed_count(),
                colony.homeless_count()
            )
        } else {
            violations.join("; ")
        },
    }
}

// ── 1. Housing ──────────────────────────────────────────────────────────

fn validate_housing(engine: &mut ColonyEngine, ticks: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Housing ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "generation_everyone_homeless".into(),
        passed: engine.homeless_count() == engine.citizen_count(),
        detail: format!("{} citizens before the first tick", engine.citizen_count()),
    });

    engine.run(ticks);

    let capacity = engine.colony.max_citizens();
    let expected = capacity.min(engine.citizen_count());
    results.push(TestResult {
        name: "housing_fills_to_capacity".into(),
        passed: engine.housed_count() == expected,
        detail: format!(
            "housed {} (capacity {}, citizens {})",
            engine.housed_count(),
            capacity,
            engine.citizen_count()
        ),
    });

    results.push(invariant_result("housing_invariants", &engine.colony));

    // One more tick changes nothing once things settle
    let before: Vec<Vec<CitizenId>> = occupancy(&engine.colony);
    engine.step();
    results.push(TestResult {
        name: "housing_idempotent_tick".into(),
        passed: before == occupancy(&engine.colony),
        detail: "occupancy unchanged by an extra tick".into(),
    });

    if verbose {
        for home in engine.colony.homes() {
            let occupants = home.residency().map(|r| r.occupants().to_vec()).unwrap_or_default();
            println!("  {} L{}: {:?}", home.id(), home.level(), occupants);
        }
    }

    results
}

fn occupancy(colony: &Colony) -> Vec<Vec<CitizenId>> {
    colony
        .homes()
        .filter_map(|h| h.residency())
        .map(|r| r.occupants().to_vec())
        .collect()
}

// ── 2. Churn ────────────────────────────────────────────────────────────

fn validate_churn(engine: &mut ColonyEngine, verbose: bool) -> Vec<TestResult> {
    println!("--- Churn ---");
    let mut results = Vec::new();

    // A housed citizen leaves the colony
    let leaver = engine
        .colony
        .roster()
        .citizens()
        .find(|c| c.home().is_some())
        .map(|c| (c.id(), c.home()));
    if let Some((id, Some(home))) = leaver {
        let removed = engine.colony.remove_citizen(id);
        let still_listed = engine
            .colony
            .building(home)
            .is_some_and(|b| b.has_resident(id));
        results.push(TestResult {
            name: "churn_departure_moves_out".into(),
            passed: removed.is_ok() && !still_listed,
            detail: format!("{} left {}", id, home),
        });
    }

    // A home is torn down; its residents become homeless
    let target = engine
        .colony
        .homes()
        .find(|h| h.residency().is_some_and(|r| !r.is_empty()))
        .map(|h| (h.id(), h.residency().map(|r| r.occupants().to_vec()).unwrap_or_default()));
    if let Some((home, former)) = target {
        let destroyed = engine.colony.destroy(home).is_ok();
        let all_evicted = former
            .iter()
            .all(|id| engine.colony.citizen(*id).is_some_and(|c| c.is_homeless()));
        results.push(TestResult {
            name: "churn_demolition_evicts".into(),
            passed: destroyed && all_evicted,
            detail: format!("{} evicted {} residents", home, former.len()),
        });
    }

    // Arrivals and a new home, then let the colony settle
    for i in 0..5 {
        engine
            .colony
            .spawn_citizen(Name::new(format!("Arrival{}", i), "Newcomer"));
    }
    engine.colony.construct(BuildingKind::Home);
    engine.run(3);

    let expected = engine.colony.max_citizens().min(engine.citizen_count());
    results.push(TestResult {
        name: "churn_resettles".into(),
        passed: engine.housed_count() == expected,
        detail: format!("housed {} of expected {}", engine.housed_count(), expected),
    });
    results.push(invariant_result("churn_invariants", &engine.colony));

    if verbose {
        println!(
            "  after churn: {} citizens, {} homes",
            engine.citizen_count(),
            engine.colony.homes().count()
        );
    }

    results
}

// ── 3. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(engine: &mut ColonyEngine) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let before = occupancy(&engine.colony);
    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        results.push(TestResult {
            name: "persist_save".into(),
            passed: false,
            detail: format!("save failed: {}", e),
        });
        return results;
    }

    results.push(TestResult {
        name: "persist_save_marks_clean".into(),
        passed: engine.colony.dirty_buildings().is_empty(),
        detail: format!("{} bytes written", buffer.len()),
    });

    let mut reloaded = ColonyEngine::default();
    match reloaded.load(&buffer[..]) {
        Ok(()) => {
            results.push(TestResult {
                name: "persist_roundtrip_occupancy".into(),
                passed: occupancy(&reloaded.colony) == before,
                detail: format!("{} homes compared", before.len()),
            });
            results.push(TestResult {
                name: "persist_roundtrip_tick".into(),
                passed: reloaded.tick() == engine.tick(),
                detail: format!("tick {}", reloaded.tick()),
            });
            results.push(invariant_result("persist_invariants", &reloaded.colony));
        }
        Err(e) => results.push(TestResult {
            name: "persist_load".into(),
            passed: false,
            detail: format!("load failed: {}", e),
        }),
    }

    results
}

// ── 4. Views ────────────────────────────────────────────────────────────

fn validate_views(colony: &Colony) -> Vec<TestResult> {
    println!("--- Views ---");
    let mut view = ColonyView::new();
    let mut mismatches = Vec::new();

    for building in colony.buildings() {
        let decoded = colony
            .view_packet(building.id())
            .map_err(|e| e.to_string())
            .and_then(|packet| view.apply(&packet).map_err(|e| e.to_string()));
        if let Err(e) = decoded {
            mismatches.push(format!("{}: {}", building.id(), e));
            continue;
        }

        let expected = building
            .residency()
            .map(|r| r.occupants().to_vec())
            .unwrap_or_default();
        let replica = view.building(building.id());
        if replica.map(|v| v.residents().to_vec()) != Some(expected) {
            mismatches.push(format!("{} residents differ", building.id()));
        }
    }

    vec![TestResult {
        name: "view_replicas_match".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            format!("{} replicas", view.len())
        } else {
            mismatches.join("; ")
        },
    }]
}

// ── 5. Recipes ──────────────────────────────────────────────────────────

fn validate_recipes(config: &ColonyConfig) -> Vec<TestResult> {
    println!("--- Sawmill Recipes ---");
    let planks = || ItemStack::new("oak_planks", 1).with_tag("minecraft:planks");
    let slab = || ItemStack::new("oak_slab", 1).with_tag("minecraft:wooden_slabs");
    let iron = || ItemStack::new("iron_ingot", 1).with_tag("forge:ingots/iron");
    let recipe = |inputs: Vec<ItemStack>| Recipe {
        inputs,
        output: ItemStack::new("crafted", 1),
    };

    let cases = [
        ("recipe_all_planks", recipe(vec![planks(), planks()]), true),
        ("recipe_planks_uncounted", recipe(vec![planks(), iron()]), true),
        ("recipe_three_quarters", recipe(vec![slab(), slab(), slab(), iron()]), false),
        ("recipe_mostly_wood", recipe(vec![slab(), slab(), slab(), slab(), iron()]), true),
        ("recipe_no_wood", recipe(vec![iron(), iron()]), false),
    ];

    cases
        .into_iter()
        .map(|(name, r, expected)| {
            let accepted = sawmill_accepts(&r, &config.sawmill);
            TestResult {
                name: name.into(),
                passed: accepted == expected,
                detail: format!("accepted={} expected={}", accepted, expected),
            }
        })
        .collect()
}
