//! Sector generation.
//!
//! A sector is a pure function of `(seed, coord, tunables)`. Every random draw
//! comes from one per-sector stream, consumed by the steps in
//! [`GENERATION_STEPS`] in order. Reordering steps, or the draws inside a step,
//! changes every deployed world and must bump [`GENERATOR_VERSION`].

use glam::DVec2;
use voidspace_common::{EntityId, EntityKind, SectorCoord};

use crate::placement::{Footprint, PlacementSolver};
use crate::rng::{Mulberry32, WorldSeed, coord_hash};
use crate::sector::{
    Asteroid, Base, Planet, PlanetKind, Resource, Sector, Star, StarColor, Wormhole,
};
use crate::tunables::{ConfigError, Tunables};

/// Version of the step list and per-step draw order.
pub const GENERATOR_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    Stars,
    Planets,
    Asteroids,
    Wormhole,
    Bases,
}

/// The order in which a sector's stream is consumed.
pub const GENERATION_STEPS: [GenerationStep; 5] = [
    GenerationStep::Stars,
    GenerationStep::Planets,
    GenerationStep::Asteroids,
    GenerationStep::Wormhole,
    GenerationStep::Bases,
];

/// Angular speed of an orbit: proportional to the host's mass, inversely
/// proportional to the orbit radius.
pub fn orbit_speed(base_speed: f64, star_mass: f64, orbit_radius: f64) -> f64 {
    base_speed * (star_mass / orbit_radius)
}

/// Generates sectors for one world. Holds no mutable state, so distinct
/// sectors may be generated from different threads.
#[derive(Debug, Clone)]
pub struct SectorGenerator {
    seed: WorldSeed,
    tunables: Tunables,
    solver: PlacementSolver,
}

impl SectorGenerator {
    /// Validates the tunables once; generation itself cannot fail.
    pub fn new(seed: WorldSeed, tunables: Tunables) -> Result<Self, ConfigError> {
        tunables.validate()?;
        let solver =
            PlacementSolver::new(tunables.min_object_spacing, tunables.placement_max_attempts);
        Ok(Self {
            seed,
            tunables,
            solver,
        })
    }

    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn sector_size(&self) -> f64 {
        self.tunables.sector_size
    }

    /// Generate one sector.
    pub fn generate(&self, coord: SectorCoord) -> Sector {
        let _span = tracing::debug_span!("generate_sector", %coord).entered();

        let mut build = SectorBuild {
            generator: self,
            rng: Mulberry32::new(coord_hash(self.seed, coord.x, coord.y)),
            sector: Sector::new(coord, self.tunables.sector_size),
            footprints: Vec::new(),
        };
        for step in GENERATION_STEPS {
            match step {
                GenerationStep::Stars => build.stars(),
                GenerationStep::Planets => build.planets(),
                GenerationStep::Asteroids => build.asteroids(),
                GenerationStep::Wormhole => build.wormhole(),
                GenerationStep::Bases => build.bases(),
            }
        }

        let sector = build.sector;
        tracing::trace!(
            %coord,
            entities = sector.entity_count(),
            skipped = sector.report.total_skipped(),
            "sector generated"
        );
        sector
    }
}

/// Validate `tunables` and generate a single sector.
pub fn generate_sector(
    seed: WorldSeed,
    coord: SectorCoord,
    tunables: &Tunables,
) -> Result<Sector, ConfigError> {
    Ok(SectorGenerator::new(seed, tunables.clone())?.generate(coord))
}

/// Working state of one generation pass.
struct SectorBuild<'a> {
    generator: &'a SectorGenerator,
    rng: Mulberry32,
    sector: Sector,
    footprints: Vec<Footprint>,
}

impl SectorBuild<'_> {
    fn stars(&mut self) {
        let generator = self.generator;
        let t = &generator.tunables.stars;
        let coord = self.sector.coord;
        let n = self.rng.range_inclusive(t.count.min, t.count.max);
        self.sector.report.stars.requested = n;

        for _ in 0..n {
            let size = self.rng.range(t.size.min, t.size.max);
            let Some(position) = self.place(size) else {
                self.skipped(EntityKind::Star);
                continue;
            };
            let color = *self.rng.pick(&StarColor::PALETTE);
            let index = self.sector.stars.len() as u32;
            self.sector.stars.push(Star {
                id: EntityId::derive(coord, EntityKind::Star, index),
                position,
                size,
                color,
                mass: size * t.mass_per_size,
                gravity_radius: size * t.gravity_radius_per_size,
            });
            self.placed(position, size, EntityKind::Star);
        }
    }

    fn planets(&mut self) {
        let generator = self.generator;
        let t = &generator.tunables.planets;
        let coord = self.sector.coord;
        let hosts: Vec<(EntityId, DVec2, f64, f64)> = self
            .sector
            .stars
            .iter()
            .map(|s| (s.id.clone(), s.position, s.size, s.mass))
            .collect();

        for (host_id, centre, host_size, host_mass) in hosts {
            let m = self.rng.range_inclusive(t.per_star.min, t.per_star.max);
            self.sector.report.planets.requested += m;

            for _ in 0..m {
                let size = self.rng.range(t.size.min, t.size.max);
                let Some(slot) = generator.solver.try_place_orbit(
                    &mut self.rng,
                    &self.sector.bounds,
                    centre,
                    host_size,
                    size,
                    t.orbit_offset,
                    &self.footprints,
                ) else {
                    self.skipped(EntityKind::Planet);
                    continue;
                };
                let kind = *self.rng.pick(&PlanetKind::ALL);
                let resources = draw_resources(&mut self.rng, kind.resource_table());
                let index = self.sector.planets.len() as u32;
                self.sector.planets.push(Planet {
                    id: EntityId::derive(coord, EntityKind::Planet, index),
                    host_star: host_id.clone(),
                    position: slot.position,
                    size,
                    kind,
                    resources,
                    orbit_radius: slot.radius,
                    orbit_angle: slot.angle,
                    orbit_speed: orbit_speed(t.base_orbit_speed, host_mass, slot.radius),
                });
                self.placed(slot.position, size, EntityKind::Planet);
            }
        }
    }

    fn asteroids(&mut self) {
        let generator = self.generator;
        let t = &generator.tunables.asteroids;
        let coord = self.sector.coord;
        let k = self.rng.range_inclusive(t.count.min, t.count.max);
        self.sector.report.asteroids.requested = k;

        for _ in 0..k {
            let size = self.rng.range(t.size.min, t.size.max);
            let Some(position) = self.place(size) else {
                self.skipped(EntityKind::Asteroid);
                continue;
            };
            let heading = self.rng.angle();
            let speed = self.rng.range(t.speed.min, t.speed.max);
            let mut resources = vec![Resource::ASTEROID_COMMON];
            if self.rng.chance(t.rare_resource_chance) {
                resources.push(*self.rng.pick(&Resource::ASTEROID_RARE));
            }
            let index = self.sector.asteroids.len() as u32;
            self.sector.asteroids.push(Asteroid {
                id: EntityId::derive(coord, EntityKind::Asteroid, index),
                initial_position: position,
                initial_velocity: DVec2::new(heading.cos(), heading.sin()) * speed,
                size,
                resources,
                bounds: self.sector.bounds,
            });
            self.placed(position, size, EntityKind::Asteroid);
        }
    }

    fn wormhole(&mut self) {
        let generator = self.generator;
        let t = &generator.tunables.wormhole;
        let coord = self.sector.coord;
        if !self.rng.chance(t.spawn_chance) {
            return;
        }
        self.sector.report.wormholes.requested = 1;

        let Some(position) = self.place(t.size) else {
            self.skipped(EntityKind::Wormhole);
            return;
        };
        let jump = t.max_jump as i32;
        let span = t.max_jump * 2;
        let mut dx = self.rng.range_inclusive(0, span) as i32 - jump;
        let dy = self.rng.range_inclusive(0, span) as i32 - jump;
        if dx == 0 && dy == 0 {
            dx = 1;
        }
        self.sector.wormholes.push(Wormhole {
            id: EntityId::derive(coord, EntityKind::Wormhole, 0),
            position,
            size: t.size,
            destination: coord.offset(dx, dy),
        });
        self.placed(position, t.size, EntityKind::Wormhole);
    }

    fn bases(&mut self) {
        let coord = self.sector.coord;
        let generator = self.generator;
        for archetype in &generator.tunables.bases {
            if !self.rng.chance(archetype.spawn_chance) {
                continue;
            }
            self.sector.report.bases.requested += 1;

            let Some(position) = self.place(archetype.size) else {
                self.skipped(EntityKind::Base);
                continue;
            };
            let index = self.sector.bases.len() as u32;
            self.sector.bases.push(Base {
                id: EntityId::derive(coord, EntityKind::Base, index),
                archetype: archetype.name.clone(),
                position,
                size: archetype.size,
                faction: archetype.faction.clone(),
                health: archetype.health,
                aggro_range: archetype.aggro_range,
                patrol_radius: archetype.patrol_radius,
                max_ships: archetype.max_ships,
            });
            self.placed(position, archetype.size, EntityKind::Base);
        }
    }

    fn place(&mut self, size: f64) -> Option<DVec2> {
        self.generator.solver.try_place(
            &mut self.rng,
            &self.sector.bounds,
            size,
            &self.footprints,
        )
    }

    fn placed(&mut self, position: DVec2, size: f64, kind: EntityKind) {
        self.footprints.push(Footprint::new(position, size));
        self.sector.report.get_mut(kind).placed += 1;
    }

    fn skipped(&self, kind: EntityKind) {
        tracing::debug!(
            coord = %self.sector.coord,
            %kind,
            attempts = self.generator.solver.max_attempts(),
            "placement exhausted, skipping"
        );
    }
}

/// One or two distinct resources from `table`.
fn draw_resources(rng: &mut Mulberry32, table: &[Resource]) -> Vec<Resource> {
    let count = rng.range_inclusive(1, table.len().min(2) as u32);
    let first = *rng.pick(table);
    let mut resources = vec![first];
    if count == 2 {
        let rest: Vec<Resource> = table.iter().copied().filter(|r| *r != first).collect();
        resources.push(*rng.pick(&rest));
    }
    resources
}
