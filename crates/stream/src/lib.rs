//! Streaming: sector cache around a moving viewer, live positions, world facade.
//!
//! # Invariants
//! - After `update(p)` every sector within the load radius of `p` is cached.
//! - Cached sectors beyond the retain radius are evicted in the same update.
//! - Eviction loses nothing: a revisited sector regenerates identically and
//!   depletion lives in the overlay, not in the cache.

mod grid;
mod sampler;
mod streamer;
mod universe;

pub use grid::SectorGrid;
pub use sampler::{AsteroidSample, DriftState, KinematicSampler, PhysicsSampler};
pub use streamer::{
    MAX_LOAD_RADIUS, SectorStreamer, StreamConfig, StreamStats, Visible, VisibleAsteroid,
    VisibleObjects,
};
pub use universe::Universe;
