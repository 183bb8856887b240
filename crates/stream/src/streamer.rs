use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use voidspace_common::{EntityId, SectorCoord};
use voidspace_kernel::{
    Asteroid, Base, ConfigError, Planet, Sector, SectorGenerator, Star, Wormhole,
};
use voidspace_persist::WorldChanges;

use crate::grid::SectorGrid;
use crate::sampler::{DriftState, PhysicsSampler};

/// Streaming configuration: the generated neighbourhood and how far cached
/// sectors are kept before eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Chebyshev radius (in sectors) generated around the viewer. 1 → 3×3.
    pub load_radius: u32,
    /// Cached sectors farther than this from the viewer are evicted.
    pub retain_radius: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            load_radius: 1,
            retain_radius: 2,
        }
    }
}

/// Largest accepted `load_radius`. The loaded block is `(2r + 1)²` sectors.
pub const MAX_LOAD_RADIUS: u32 = 64;

impl StreamConfig {
    /// A retain radius smaller than the load radius would evict sectors
    /// the same update just generated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_radius > MAX_LOAD_RADIUS {
            return Err(ConfigError::AboveLimit {
                field: "stream.load_radius".into(),
                value: self.load_radius.into(),
                max: MAX_LOAD_RADIUS.into(),
            });
        }
        if self.retain_radius < self.load_radius {
            return Err(ConfigError::InvalidRange {
                field: "stream.load_radius..retain_radius".into(),
                min: self.load_radius as f64,
                max: self.retain_radius as f64,
            });
        }
        Ok(())
    }
}

/// Per-update streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub current: Option<SectorCoord>,
    pub generated: Vec<SectorCoord>,
    pub evicted: Vec<SectorCoord>,
    pub total_cached: usize,
    pub update_time: Duration,
}

/// A static entity in view.
#[derive(Debug, Clone, PartialEq)]
pub struct Visible<T> {
    pub entity: T,
    pub position: DVec2,
}

/// An asteroid in view, with its sampled drift state.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleAsteroid {
    pub entity: Asteroid,
    pub position: DVec2,
    pub state: DriftState,
    pub captured_by: Option<EntityId>,
}

/// Everything near a position, at live positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleObjects {
    pub stars: Vec<Visible<Star>>,
    pub planets: Vec<Visible<Planet>>,
    pub asteroids: Vec<VisibleAsteroid>,
    pub wormholes: Vec<Visible<Wormhole>>,
    pub bases: Vec<Visible<Base>>,
}

impl VisibleObjects {
    pub fn len(&self) -> usize {
        self.stars.len()
            + self.planets.len()
            + self.asteroids.len()
            + self.wormholes.len()
            + self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every object the overlay reports as depleted.
    pub fn retain_available(&mut self, changes: &WorldChanges) {
        self.stars.retain(|v| !changes.is_depleted(&v.entity.id));
        self.planets.retain(|v| !changes.is_depleted(&v.entity.id));
        self.asteroids.retain(|v| !changes.is_depleted(&v.entity.id));
        self.wormholes.retain(|v| !changes.is_depleted(&v.entity.id));
        self.bases.retain(|v| !changes.is_depleted(&v.entity.id));
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.stars
            .iter()
            .map(|v| &v.entity.id)
            .chain(self.planets.iter().map(|v| &v.entity.id))
            .chain(self.asteroids.iter().map(|v| &v.entity.id))
            .chain(self.wormholes.iter().map(|v| &v.entity.id))
            .chain(self.bases.iter().map(|v| &v.entity.id))
    }
}

/// Owns the sector cache around a moving viewer.
///
/// Writes happen only when the viewer crosses into a new neighbourhood, so the
/// cache is a plain map behind `&mut self`; one streamer per world instance.
pub struct SectorStreamer {
    generator: SectorGenerator,
    config: StreamConfig,
    grid: SectorGrid,
    sectors: HashMap<u64, Sector>,
    current: Option<SectorCoord>,
    stats: StreamStats,
}

impl SectorStreamer {
    pub fn new(generator: SectorGenerator, config: StreamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SectorGrid::new(generator.sector_size());
        Ok(Self {
            generator,
            config,
            grid,
            sectors: HashMap::new(),
            current: None,
            stats: StreamStats::default(),
        })
    }

    /// Generate the neighbourhood around `position` and evict sectors beyond
    /// the retain radius.
    pub fn update(&mut self, position: DVec2) -> &StreamStats {
        let _span = tracing::info_span!("stream_update").entered();
        let start = Instant::now();

        let center = self.grid.position_to_sector(position);

        let mut generated = Vec::new();
        for coord in self.grid.sectors_in_radius(center, self.config.load_radius) {
            if self.sectors.contains_key(&coord.pack()) {
                continue;
            }
            tracing::debug!(%coord, "generating sector");
            self.sectors.insert(coord.pack(), self.generator.generate(coord));
            generated.push(coord);
        }

        let retain = self.config.retain_radius;
        let mut evicted: Vec<SectorCoord> = self
            .sectors
            .keys()
            .map(|k| SectorCoord::unpack(*k))
            .filter(|c| c.chebyshev(center) > retain)
            .collect();
        evicted.sort();
        for coord in &evicted {
            tracing::debug!(%coord, "evicting sector");
            self.sectors.remove(&coord.pack());
        }

        self.current = Some(center);
        self.stats = StreamStats {
            current: Some(center),
            generated,
            evicted,
            total_cached: self.sectors.len(),
            update_time: start.elapsed(),
        };

        tracing::trace!(
            generated = self.stats.generated.len(),
            evicted = self.stats.evicted.len(),
            total = self.stats.total_cached,
            "stream update complete"
        );
        &self.stats
    }

    /// Entities of the neighbourhood whose footprint comes within
    /// `view_distance` of `position`. Planets and asteroids are placed by
    /// `sampler` at its current clocks; everything else is static.
    pub fn visible_objects(
        &mut self,
        position: DVec2,
        view_distance: f64,
        sampler: &impl PhysicsSampler,
    ) -> VisibleObjects {
        self.update(position);
        let center = self.grid.position_to_sector(position);
        let orbit_time = sampler.orbit_time();
        let physics_time = sampler.physics_time();
        let in_view = |at: DVec2, size: f64| at.distance(position) - size <= view_distance;

        let mut out = VisibleObjects::default();
        for coord in self.grid.sectors_in_radius(center, self.config.load_radius) {
            let Some(sector) = self.sectors.get(&coord.pack()) else {
                continue;
            };
            for star in &sector.stars {
                if in_view(star.position, star.size) {
                    out.stars.push(Visible {
                        entity: star.clone(),
                        position: star.position,
                    });
                }
            }
            for planet in &sector.planets {
                let Some(host) = sector.star(&planet.host_star) else {
                    continue;
                };
                let at = sampler.planet_position(planet, host, orbit_time);
                if in_view(at, planet.size) {
                    out.planets.push(Visible {
                        entity: planet.clone(),
                        position: at,
                    });
                }
            }
            for asteroid in &sector.asteroids {
                let sample = sampler.asteroid_position(asteroid, &sector.stars, physics_time);
                if in_view(sample.position, asteroid.size) {
                    out.asteroids.push(VisibleAsteroid {
                        entity: asteroid.clone(),
                        position: sample.position,
                        state: sample.state,
                        captured_by: sample.captured_by,
                    });
                }
            }
            for wormhole in &sector.wormholes {
                if in_view(wormhole.position, wormhole.size) {
                    out.wormholes.push(Visible {
                        entity: wormhole.clone(),
                        position: wormhole.position,
                    });
                }
            }
            for base in &sector.bases {
                if in_view(base.position, base.size) {
                    out.bases.push(Visible {
                        entity: base.clone(),
                        position: base.position,
                    });
                }
            }
        }
        out
    }

    pub fn sector(&self, coord: SectorCoord) -> Option<&Sector> {
        self.sectors.get(&coord.pack())
    }

    pub fn is_cached(&self, coord: SectorCoord) -> bool {
        self.sectors.contains_key(&coord.pack())
    }

    /// Cached coordinates in sorted order.
    pub fn cached_coords(&self) -> Vec<SectorCoord> {
        let mut coords: Vec<SectorCoord> =
            self.sectors.keys().map(|k| SectorCoord::unpack(*k)).collect();
        coords.sort();
        coords
    }

    pub fn cached_count(&self) -> usize {
        self.sectors.len()
    }

    /// Sector the viewer was in at the last update.
    pub fn current_sector(&self) -> Option<SectorCoord> {
        self.current
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn grid(&self) -> &SectorGrid {
        &self.grid
    }

    pub fn generator(&self) -> &SectorGenerator {
        &self.generator
    }
}
