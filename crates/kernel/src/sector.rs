use glam::DVec2;
use serde::{Deserialize, Serialize};
use voidspace_common::{EntityId, EntityKind, SectorBounds, SectorCoord};

/// Colour class of a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarColor {
    Red,
    Orange,
    Yellow,
    White,
    Blue,
}

impl StarColor {
    pub const PALETTE: [StarColor; 5] = [
        StarColor::Red,
        StarColor::Orange,
        StarColor::Yellow,
        StarColor::White,
        StarColor::Blue,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Iron,
    Copper,
    Silicon,
    Water,
    Helium3,
    Titanium,
    Gold,
    Platinum,
    Crystal,
}

impl Resource {
    /// Always present on an asteroid.
    pub const ASTEROID_COMMON: Resource = Resource::Iron;
    /// Candidates for an asteroid's optional second resource.
    pub const ASTEROID_RARE: [Resource; 3] =
        [Resource::Gold, Resource::Platinum, Resource::Crystal];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetKind {
    Rocky,
    Gas,
    Ice,
    Lava,
    Ocean,
}

impl PlanetKind {
    pub const ALL: [PlanetKind; 5] = [
        PlanetKind::Rocky,
        PlanetKind::Gas,
        PlanetKind::Ice,
        PlanetKind::Lava,
        PlanetKind::Ocean,
    ];

    /// Resources a planet of this kind can carry.
    pub fn resource_table(self) -> &'static [Resource] {
        match self {
            PlanetKind::Rocky => &[Resource::Iron, Resource::Copper, Resource::Silicon],
            PlanetKind::Gas => &[Resource::Helium3, Resource::Water],
            PlanetKind::Ice => &[Resource::Water, Resource::Silicon, Resource::Crystal],
            PlanetKind::Lava => &[Resource::Titanium, Resource::Iron, Resource::Gold],
            PlanetKind::Ocean => &[Resource::Water, Resource::Copper],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: EntityId,
    pub position: DVec2,
    pub size: f64,
    pub color: StarColor,
    pub mass: f64,
    pub gravity_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: EntityId,
    pub host_star: EntityId,
    /// Position at orbit time zero.
    pub position: DVec2,
    pub size: f64,
    pub kind: PlanetKind,
    pub resources: Vec<Resource>,
    pub orbit_radius: f64,
    /// Phase at orbit time zero, radians.
    pub orbit_angle: f64,
    /// Radians per unit of orbit time.
    pub orbit_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: EntityId,
    pub initial_position: DVec2,
    pub initial_velocity: DVec2,
    pub size: f64,
    pub resources: Vec<Resource>,
    /// Region the asteroid drifts within.
    pub bounds: SectorBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wormhole {
    pub id: EntityId,
    pub position: DVec2,
    pub size: f64,
    pub destination: SectorCoord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: EntityId,
    pub archetype: String,
    pub position: DVec2,
    pub size: f64,
    pub faction: String,
    pub health: f64,
    pub aggro_range: f64,
    pub patrol_radius: f64,
    pub max_ships: u32,
}

/// Requested versus placed counts for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCount {
    pub requested: u32,
    pub placed: u32,
}

impl PlacementCount {
    pub fn skipped(&self) -> u32 {
        self.requested - self.placed
    }
}

/// Per-kind placement outcome of one sector. A non-zero skip count means the
/// sector came out sparser than the tunables asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub stars: PlacementCount,
    pub planets: PlacementCount,
    pub asteroids: PlacementCount,
    pub wormholes: PlacementCount,
    pub bases: PlacementCount,
}

impl PlacementReport {
    pub fn get(&self, kind: EntityKind) -> PlacementCount {
        match kind {
            EntityKind::Star => self.stars,
            EntityKind::Planet => self.planets,
            EntityKind::Asteroid => self.asteroids,
            EntityKind::Wormhole => self.wormholes,
            EntityKind::Base => self.bases,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: EntityKind) -> &mut PlacementCount {
        match kind {
            EntityKind::Star => &mut self.stars,
            EntityKind::Planet => &mut self.planets,
            EntityKind::Asteroid => &mut self.asteroids,
            EntityKind::Wormhole => &mut self.wormholes,
            EntityKind::Base => &mut self.bases,
        }
    }

    pub fn total_skipped(&self) -> u32 {
        EntityKind::ALL.iter().map(|k| self.get(*k).skipped()).sum()
    }
}

/// Everything generated for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub coord: SectorCoord,
    pub bounds: SectorBounds,
    pub stars: Vec<Star>,
    pub planets: Vec<Planet>,
    pub asteroids: Vec<Asteroid>,
    pub wormholes: Vec<Wormhole>,
    pub bases: Vec<Base>,
    pub report: PlacementReport,
}

impl Sector {
    pub fn new(coord: SectorCoord, sector_size: f64) -> Self {
        Self {
            coord,
            bounds: coord.bounds(sector_size),
            stars: Vec::new(),
            planets: Vec::new(),
            asteroids: Vec::new(),
            wormholes: Vec::new(),
            bases: Vec::new(),
            report: PlacementReport::default(),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.stars.len()
            + self.planets.len()
            + self.asteroids.len()
            + self.wormholes.len()
            + self.bases.len()
    }

    pub fn star(&self, id: &EntityId) -> Option<&Star> {
        self.stars.iter().find(|s| &s.id == id)
    }

    /// `(id, generation-time position, size)` of every entity, in generation order.
    pub fn footprints(&self) -> Vec<(&EntityId, DVec2, f64)> {
        let stars = self.stars.iter().map(|s| (&s.id, s.position, s.size));
        let planets = self.planets.iter().map(|p| (&p.id, p.position, p.size));
        let asteroids = self
            .asteroids
            .iter()
            .map(|a| (&a.id, a.initial_position, a.size));
        let wormholes = self.wormholes.iter().map(|w| (&w.id, w.position, w.size));
        let bases = self.bases.iter().map(|b| (&b.id, b.position, b.size));
        stars
            .chain(planets)
            .chain(asteroids)
            .chain(wormholes)
            .chain(bases)
            .collect()
    }
}
