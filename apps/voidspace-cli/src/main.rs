use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use glam::DVec2;
use tracing_subscriber::EnvFilter;
use voidspace_common::{EntityKind, SectorCoord};
use voidspace_kernel::{
    GENERATION_STEPS, GENERATOR_VERSION, Sector, SectorGenerator, Tunables, WorldSeed,
};
use voidspace_persist::ChangeStore;
use voidspace_stream::{KinematicSampler, StreamConfig, Universe};

#[derive(Parser)]
#[command(name = "voidspace-cli", about = "CLI tool for voidspace sector generation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Tunables YAML file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print generator version and step order
    Info,
    /// Generate one sector and print it
    Generate {
        /// World seed: an integer or any phrase
        #[arg(short, long, default_value = "42")]
        seed: String,
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        x: i32,
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        y: i32,
        /// Print the full sector as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check determinism and placement invariants for a sector
    Verify {
        #[arg(short, long, default_value = "42")]
        seed: String,
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        x: i32,
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        y: i32,
        /// Number of independent generator instances to compare
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
    /// Move a viewer across sectors and print streaming stats
    Walk {
        #[arg(short, long, default_value = "42")]
        seed: String,
        /// Number of one-sector steps along the diagonal
        #[arg(long, default_value = "8")]
        steps: u32,
    },
    /// Deplete asteroids of a sector and save the overlay to a store
    Deplete {
        #[arg(short, long, default_value = "42")]
        seed: String,
        /// Store directory
        #[arg(long)]
        store: PathBuf,
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        x: i32,
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        y: i32,
        /// How many asteroids to deplete
        #[arg(long, default_value = "1")]
        count: usize,
        /// Respawn time recorded with each depletion
        #[arg(long, default_value = "60000")]
        respawn_at: u64,
    },
}

fn parse_seed(raw: &str) -> WorldSeed {
    raw.parse::<u32>()
        .map(WorldSeed)
        .unwrap_or_else(|_| WorldSeed::from_phrase(raw))
}

fn load_tunables(path: Option<&PathBuf>) -> anyhow::Result<Tunables> {
    match path {
        Some(path) => Tunables::load(path)
            .with_context(|| format!("loading tunables from {}", path.display())),
        None => Ok(Tunables::default()),
    }
}

fn print_summary(sector: &Sector) {
    println!(
        "sector {} bounds=({:.0}, {:.0})..({:.0}, {:.0}) entities={}",
        sector.coord,
        sector.bounds.min.x,
        sector.bounds.min.y,
        sector.bounds.max.x,
        sector.bounds.max.y,
        sector.entity_count()
    );
    for star in &sector.stars {
        println!(
            "  {} {:?} at ({:.1}, {:.1}) size={:.1} mass={:.0}",
            star.id, star.color, star.position.x, star.position.y, star.size, star.mass
        );
    }
    for planet in &sector.planets {
        println!(
            "  {} {:?} around {} r={:.1} speed={:.6} resources={:?}",
            planet.id,
            planet.kind,
            planet.host_star,
            planet.orbit_radius,
            planet.orbit_speed,
            planet.resources
        );
    }
    for asteroid in &sector.asteroids {
        println!(
            "  {} at ({:.1}, {:.1}) size={:.1} resources={:?}",
            asteroid.id,
            asteroid.initial_position.x,
            asteroid.initial_position.y,
            asteroid.size,
            asteroid.resources
        );
    }
    for wormhole in &sector.wormholes {
        println!("  {} -> sector {}", wormhole.id, wormhole.destination);
    }
    for base in &sector.bases {
        println!(
            "  {} {} ({}) health={:.0}",
            base.id, base.archetype, base.faction, base.health
        );
    }
    for kind in EntityKind::ALL {
        let count = sector.report.get(kind);
        if count.skipped() > 0 {
            println!(
                "  skipped {} of {} {}",
                count.skipped(),
                count.requested,
                kind.as_str()
            );
        }
    }
}

/// Pairwise spacing and containment violations in a generated sector.
fn audit(sector: &Sector, spacing: f64) -> Vec<String> {
    let mut problems = Vec::new();
    let footprints = sector.footprints();
    for (i, (a, pa, sa)) in footprints.iter().enumerate() {
        for (b, pb, sb) in &footprints[i + 1..] {
            let gap = pa.distance(*pb);
            if gap + 1e-9 < sa + sb + spacing {
                problems.push(format!("{a} and {b} are {gap:.3} apart"));
            }
        }
    }
    let contained = sector
        .stars
        .iter()
        .map(|s| (&s.id, s.position, s.size))
        .chain(
            sector
                .asteroids
                .iter()
                .map(|a| (&a.id, a.initial_position, a.size)),
        )
        .chain(sector.wormholes.iter().map(|w| (&w.id, w.position, w.size)))
        .chain(sector.bases.iter().map(|b| (&b.id, b.position, b.size)));
    for (id, pos, size) in contained {
        if !sector.bounds.contains_footprint(pos, size) {
            problems.push(format!("{id} leaves the sector bounds"));
        }
    }
    problems
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let tunables = load_tunables(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("voidspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("generator: v{GENERATOR_VERSION}");
            println!("steps: {GENERATION_STEPS:?}");
            println!("sector size: {}", tunables.sector_size);
            let config = StreamConfig::default();
            println!(
                "stream: load radius {}, retain radius {}",
                config.load_radius, config.retain_radius
            );
        }
        Commands::Generate { seed, x, y, json } => {
            let generator = SectorGenerator::new(parse_seed(&seed), tunables)?;
            let sector = generator.generate(SectorCoord::new(x, y));
            if json {
                println!("{}", serde_json::to_string_pretty(&sector)?);
            } else {
                println!("seed={}", generator.seed());
                print_summary(&sector);
            }
        }
        Commands::Verify { seed, x, y, runs } => {
            let seed = parse_seed(&seed);
            let coord = SectorCoord::new(x, y);
            let spacing = tunables.min_object_spacing;
            let reference = SectorGenerator::new(seed, tunables.clone())?.generate(coord);
            println!(
                "Verify: seed={seed}, sector={coord}, runs={runs}, entities={}",
                reference.entity_count()
            );

            let mut mismatches = 0;
            for run in 0..runs {
                let generator = SectorGenerator::new(seed, tunables.clone())?;
                if generator.generate(coord) != reference {
                    println!("Run {run}: MISMATCH");
                    mismatches += 1;
                }
            }
            println!(
                "Determinism: {}",
                if mismatches == 0 { "OK" } else { "MISMATCH" }
            );

            let problems = audit(&reference, spacing);
            for problem in &problems {
                println!("  {problem}");
            }
            println!(
                "Placement: {}",
                if problems.is_empty() { "OK" } else { "VIOLATED" }
            );

            if mismatches > 0 || !problems.is_empty() {
                bail!("sector {coord} failed verification");
            }
        }
        Commands::Walk { seed, steps } => {
            let seed = parse_seed(&seed);
            let sector_size = tunables.sector_size;
            let mut universe = Universe::new(seed, tunables, StreamConfig::default())?;
            let sampler = KinematicSampler::default();
            tracing::info!(%seed, steps, "starting walk");
            println!("Walk: seed={seed}, steps={steps}");

            for step in 0..=steps {
                let offset = (step as f64 + 0.5) * sector_size;
                let position = DVec2::new(offset, offset);
                let stats = universe.update(position).clone();
                let visible = universe.visible_objects(position, sector_size, &sampler);
                println!(
                    "step {step}: sector={} generated={} evicted={} cached={} visible={} in {:?}",
                    stats
                        .current
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                    stats.generated.len(),
                    stats.evicted.len(),
                    stats.total_cached,
                    visible.len(),
                    stats.update_time
                );
            }
        }
        Commands::Deplete {
            seed,
            store,
            x,
            y,
            count,
            respawn_at,
        } => {
            let seed = parse_seed(&seed);
            let coord = SectorCoord::new(x, y);
            let mut store = ChangeStore::open(&store, seed)?;
            let changes = match store.load_latest() {
                Ok(changes) => changes,
                Err(voidspace_persist::StoreError::NoSaves) => Default::default(),
                Err(e) => return Err(e.into()),
            };

            let mut universe =
                Universe::new(seed, tunables, StreamConfig::default())?.with_changes(changes);
            let center = universe.streamer().grid().sector_center(coord);
            universe.update(center);
            let Some(sector) = universe.sector(coord) else {
                bail!("sector {coord} was not generated");
            };
            let targets: Vec<_> = sector
                .asteroids
                .iter()
                .map(|a| a.id.clone())
                .filter(|id| !universe.changes().is_depleted(id))
                .take(count)
                .collect();

            for id in &targets {
                universe.changes_mut().mark_depleted(id.clone(), respawn_at);
                println!("depleted {id} until {respawn_at}");
            }
            store.save(universe.changes())?;
            store.verify_integrity()?;
            tracing::info!(
                %coord,
                depleted = targets.len(),
                save = store.meta().save_count,
                "overlay saved"
            );

            let restored = store.load_latest()?;
            println!(
                "Saved {} depletions to {} (save #{}), integrity OK",
                restored.len(),
                store.root().display(),
                store.meta().save_count
            );
        }
    }

    Ok(())
}
