//! World Kernel: deterministic generation of sector contents.
//!
//! # Invariants
//! - A sector is a pure function of `(seed, coord, tunables)`.
//! - No two bodies in a sector are closer than `size_a + size_b + spacing`.
//! - Placement that runs out of attempts skips the body; it is never an error.

pub mod generator;
pub mod placement;
pub mod rng;
pub mod sector;
pub mod tunables;

pub use generator::{
    GENERATION_STEPS, GENERATOR_VERSION, GenerationStep, SectorGenerator, generate_sector,
    orbit_speed,
};
pub use placement::{Footprint, OrbitSlot, PlacementSolver};
pub use rng::{Mulberry32, WorldSeed, coord_hash};
pub use sector::{
    Asteroid, Base, Planet, PlanetKind, PlacementCount, PlacementReport, Resource, Sector, Star,
    StarColor, Wormhole,
};
pub use tunables::{
    AsteroidTunables, BaseArchetype, ConfigError, CountRange, MAX_WORMHOLE_JUMP, PlanetTunables,
    Span, StarTunables, Tunables, WormholeTunables,
};
