//! Small battle demonstration.
//!
//! Run with: cargo run --example skirmish_demo -- [seed]
//! Set `RUST_LOG=battlesim=debug` to follow deaths and launches.

use battlesim::{
    ArchetypeKind, BattleConfig, Fraction, HazardField, Scenario, SimRng, SimWorld, Status,
    TerrainGrid,
};
use tracing_subscriber::EnvFilter;

const SIZE: i32 = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("battlesim=info")),
        )
        .init();

    let seed = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()?
        .unwrap_or(7);

    println!("=== Battlesim - Skirmish Demo (seed {seed}) ===\n");

    // Terrain and mines come from their own generator so the battle
    // itself only depends on the world seed.
    let mut map_rng = SimRng::from_seed(seed.wrapping_add(1));
    let terrain = rolling_hills(&mut map_rng);
    let hazards = HazardField::scatter((0, 30), (SIZE, 50), 1, &mut map_rng);
    println!("Mine belt holds {} mines\n", hazards.total());

    let config = BattleConfig::with_size(SIZE, SIZE).with_seed(seed);
    let mut sim = SimWorld::with_environment(config, terrain, hazards)?;
    sim.place_scenario(&Scenario::small_battle(50, 6, 2))?;

    print_census(&mut sim);
    for _ in 0..10 {
        let summary = sim.run(50);
        println!("--- Tick {} ---", sim.current_tick());
        print_census(&mut sim);
        if summary.decided {
            break;
        }
    }

    let stats = sim.final_stats();
    println!("\n=== Final Stats ===\n");
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// A handful of smooth bumps, normalized to `[0, 1]`.
fn rolling_hills(rng: &mut SimRng) -> TerrainGrid {
    let hills: Vec<(f32, f32)> = (0..10 + rng.below(21))
        .map(|_| (rng.below(SIZE) as f32, rng.below(SIZE) as f32))
        .collect();
    let raw = TerrainGrid::from_fn(SIZE, SIZE, |x, y| {
        hills
            .iter()
            .map(|&(hx, hy)| {
                let d2 = (x as f32 - hx).powi(2) + (y as f32 - hy).powi(2);
                (-d2 / 200.0).exp()
            })
            .sum()
    });
    let peak = raw.elevations().iter().copied().fold(f32::MIN_POSITIVE, f32::max);
    TerrainGrid::from_fn(SIZE, SIZE, |x, y| raw.elevation_at((x, y)) / peak)
}

fn print_census(sim: &mut SimWorld) {
    let census = sim.census();
    for fraction in [Fraction::Ally, Fraction::Enemy] {
        let side: Vec<_> = census
            .iter()
            .filter(|unit| unit.fraction == fraction && unit.archetype != ArchetypeKind::Projectile)
            .collect();
        let count = |status: Status| side.iter().filter(|unit| unit.status == status).count();
        let health: f32 = side.iter().map(|unit| unit.health).sum();
        println!(
            "  {:<6} alive={:<3} wounded={:<3} dead={:<3} health={:.0}",
            fraction.as_str(),
            count(Status::Alive),
            count(Status::Wounded),
            count(Status::Dead),
            health
        );
    }
}
