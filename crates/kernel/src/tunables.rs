//! Generation tunables.
//!
//! Loaded once at world-init and validated before any sector is generated.
//! Out-of-range values are rejected, never clamped.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field}: min {min} exceeds max {max}")]
    InvalidRange { field: String, min: f64, max: f64 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: String, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },
    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability { field: String, value: f64 },
    #[error("{field}: size {size} does not fit a sector of side {sector_size}")]
    TooLarge {
        field: String,
        size: f64,
        sector_size: f64,
    },
    #[error("{field} must be at most {max}, got {value}")]
    AboveLimit { field: String, value: u64, max: u64 },
    #[error("placement_max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("base archetype #{index} has an empty name")]
    EmptyArchetypeName { index: usize },
    #[error("duplicate base archetype name: {0}")]
    DuplicateArchetype(String),
}

/// Inclusive integer range, used for counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Half-open float range, used for sizes, distances and speeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarTunables {
    pub count: CountRange,
    pub size: Span,
    pub mass_per_size: f64,
    pub gravity_radius_per_size: f64,
}

impl Default for StarTunables {
    fn default() -> Self {
        Self {
            count: CountRange::new(1, 2),
            size: Span::new(80.0, 160.0),
            mass_per_size: 10.0,
            gravity_radius_per_size: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetTunables {
    pub per_star: CountRange,
    pub size: Span,
    /// Gap between the star's footprint (plus spacing) and the planet's.
    pub orbit_offset: Span,
    pub base_orbit_speed: f64,
}

impl Default for PlanetTunables {
    fn default() -> Self {
        Self {
            per_star: CountRange::new(0, 3),
            size: Span::new(20.0, 50.0),
            orbit_offset: Span::new(100.0, 900.0),
            base_orbit_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTunables {
    pub count: CountRange,
    pub size: Span,
    pub speed: Span,
    pub rare_resource_chance: f64,
}

impl Default for AsteroidTunables {
    fn default() -> Self {
        Self {
            count: CountRange::new(4, 10),
            size: Span::new(8.0, 24.0),
            speed: Span::new(5.0, 30.0),
            rare_resource_chance: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WormholeTunables {
    pub spawn_chance: f64,
    pub size: f64,
    /// Largest per-axis sector offset a wormhole can lead to.
    pub max_jump: u32,
}

impl Default for WormholeTunables {
    fn default() -> Self {
        Self {
            spawn_chance: 0.1,
            size: 40.0,
            max_jump: 10,
        }
    }
}

/// Largest accepted `wormhole.max_jump`: twice it must still fit an `i32`
/// sector offset.
pub const MAX_WORMHOLE_JUMP: u32 = i32::MAX as u32 / 2;

/// A faction base template. Everything except `spawn_chance` is copied onto
/// the spawned base unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseArchetype {
    pub name: String,
    pub faction: String,
    pub spawn_chance: f64,
    pub size: f64,
    pub health: f64,
    #[serde(default)]
    pub aggro_range: f64,
    #[serde(default)]
    pub patrol_radius: f64,
    #[serde(default)]
    pub max_ships: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub sector_size: f64,
    pub min_object_spacing: f64,
    pub placement_max_attempts: u32,
    pub stars: StarTunables,
    pub planets: PlanetTunables,
    pub asteroids: AsteroidTunables,
    pub wormhole: WormholeTunables,
    pub bases: Vec<BaseArchetype>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            sector_size: 5000.0,
            min_object_spacing: 20.0,
            placement_max_attempts: 30,
            stars: StarTunables::default(),
            planets: PlanetTunables::default(),
            asteroids: AsteroidTunables::default(),
            wormhole: WormholeTunables::default(),
            bases: vec![
                BaseArchetype {
                    name: "pirate_outpost".into(),
                    faction: "pirates".into(),
                    spawn_chance: 0.15,
                    size: 60.0,
                    health: 1500.0,
                    aggro_range: 800.0,
                    patrol_radius: 400.0,
                    max_ships: 4,
                },
                BaseArchetype {
                    name: "trade_station".into(),
                    faction: "traders".into(),
                    spawn_chance: 0.1,
                    size: 70.0,
                    health: 2500.0,
                    aggro_range: 0.0,
                    patrol_radius: 200.0,
                    max_ships: 2,
                },
            ],
        }
    }
}

impl Tunables {
    /// Parse and validate tunables from YAML. Missing fields take defaults.
    pub fn from_yaml_str(src: &str) -> Result<Self, ConfigError> {
        let tunables: Tunables = serde_yaml::from_str(src)?;
        tunables.validate()?;
        Ok(tunables)
    }

    /// Read, parse and validate a YAML tunables file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&src)
    }

    /// Reject anything that would make generation ill-defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("sector_size", self.sector_size)?;
        non_negative("min_object_spacing", self.min_object_spacing)?;
        if self.placement_max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let s = &self.stars;
        count_range("stars.count", s.count)?;
        self.body_span("stars.size", s.size)?;
        positive("stars.mass_per_size", s.mass_per_size)?;
        non_negative("stars.gravity_radius_per_size", s.gravity_radius_per_size)?;

        let p = &self.planets;
        count_range("planets.per_star", p.per_star)?;
        self.body_span("planets.size", p.size)?;
        span("planets.orbit_offset", p.orbit_offset)?;
        non_negative("planets.orbit_offset.min", p.orbit_offset.min)?;
        non_negative("planets.base_orbit_speed", p.base_orbit_speed)?;

        let a = &self.asteroids;
        count_range("asteroids.count", a.count)?;
        self.body_span("asteroids.size", a.size)?;
        span("asteroids.speed", a.speed)?;
        non_negative("asteroids.speed.min", a.speed.min)?;
        probability("asteroids.rare_resource_chance", a.rare_resource_chance)?;

        let w = &self.wormhole;
        probability("wormhole.spawn_chance", w.spawn_chance)?;
        self.body_size("wormhole.size", w.size)?;
        if w.max_jump > MAX_WORMHOLE_JUMP {
            return Err(ConfigError::AboveLimit {
                field: "wormhole.max_jump".into(),
                value: w.max_jump.into(),
                max: MAX_WORMHOLE_JUMP.into(),
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for (index, base) in self.bases.iter().enumerate() {
            if base.name.trim().is_empty() {
                return Err(ConfigError::EmptyArchetypeName { index });
            }
            if !seen.insert(base.name.as_str()) {
                return Err(ConfigError::DuplicateArchetype(base.name.clone()));
            }
            let field = |f: &str| format!("bases[{}].{f}", base.name);
            probability(&field("spawn_chance"), base.spawn_chance)?;
            self.body_size(&field("size"), base.size)?;
            positive(&field("health"), base.health)?;
            non_negative(&field("aggro_range"), base.aggro_range)?;
            non_negative(&field("patrol_radius"), base.patrol_radius)?;
        }
        Ok(())
    }

    fn body_span(&self, field: &str, s: Span) -> Result<(), ConfigError> {
        span(field, s)?;
        positive(&format!("{field}.min"), s.min)?;
        self.body_size(&format!("{field}.max"), s.max)
    }

    /// A body must be able to sit inside a sector with its whole footprint.
    fn body_size(&self, field: &str, size: f64) -> Result<(), ConfigError> {
        positive(field, size)?;
        if size * 2.0 > self.sector_size {
            return Err(ConfigError::TooLarge {
                field: field.to_owned(),
                size,
                sector_size: self.sector_size,
            });
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    // Written so NaN fails too.
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::NonPositive {
            field: field.to_owned(),
            value,
        });
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ConfigError::Negative {
            field: field.to_owned(),
            value,
        });
    }
    Ok(())
}

fn probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability {
            field: field.to_owned(),
            value,
        });
    }
    Ok(())
}

fn span(field: &str, s: Span) -> Result<(), ConfigError> {
    if !(s.min <= s.max) {
        return Err(ConfigError::InvalidRange {
            field: field.to_owned(),
            min: s.min,
            max: s.max,
        });
    }
    Ok(())
}

fn count_range(field: &str, r: CountRange) -> Result<(), ConfigError> {
    if r.min > r.max {
        return Err(ConfigError::InvalidRange {
            field: field.to_owned(),
            min: r.min as f64,
            max: r.max as f64,
        });
    }
    Ok(())
}
