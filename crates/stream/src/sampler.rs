//! Seam to the physics layer that turns generation-time parameters into live
//! positions.
//!
//! The real sampler lives with the game simulation. [`KinematicSampler`] is a
//! closed-form stand-in for tools and tests.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use voidspace_common::EntityId;
use voidspace_kernel::{Asteroid, Planet, Star};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftState {
    Drifting,
    Captured,
}

/// Live state of an asteroid at some physics time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidSample {
    pub position: DVec2,
    pub state: DriftState,
    pub captured_by: Option<EntityId>,
}

pub trait PhysicsSampler {
    /// Current orbit clock.
    fn orbit_time(&self) -> f64;

    /// Current drift clock.
    fn physics_time(&self) -> f64;

    fn planet_position(&self, planet: &Planet, host: &Star, orbit_time: f64) -> DVec2;

    fn asteroid_position(
        &self,
        asteroid: &Asteroid,
        sector_stars: &[Star],
        physics_time: f64,
    ) -> AsteroidSample;
}

/// Circular orbits and straight-line drift wrapped inside the asteroid's
/// sector. An asteroid that drifts into a star's gravity radius is reported
/// captured and held on that radius.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicSampler {
    pub orbit_time: f64,
    pub physics_time: f64,
}

impl KinematicSampler {
    pub fn at(orbit_time: f64, physics_time: f64) -> Self {
        Self {
            orbit_time,
            physics_time,
        }
    }
}

impl PhysicsSampler for KinematicSampler {
    fn orbit_time(&self) -> f64 {
        self.orbit_time
    }

    fn physics_time(&self) -> f64 {
        self.physics_time
    }

    fn planet_position(&self, planet: &Planet, host: &Star, orbit_time: f64) -> DVec2 {
        let angle = planet.orbit_angle + planet.orbit_speed * orbit_time;
        host.position + DVec2::new(angle.cos(), angle.sin()) * planet.orbit_radius
    }

    fn asteroid_position(
        &self,
        asteroid: &Asteroid,
        sector_stars: &[Star],
        physics_time: f64,
    ) -> AsteroidSample {
        let b = asteroid.bounds;
        let extent = b.size();
        let raw = asteroid.initial_position + asteroid.initial_velocity * physics_time - b.min;
        let position = b.min + DVec2::new(raw.x.rem_euclid(extent.x), raw.y.rem_euclid(extent.y));

        for star in sector_stars {
            let offset = position - star.position;
            if offset.length() < star.gravity_radius {
                let dir = offset.try_normalize().unwrap_or(DVec2::X);
                return AsteroidSample {
                    position: star.position + dir * star.gravity_radius,
                    state: DriftState::Captured,
                    captured_by: Some(star.id.clone()),
                };
            }
        }
        AsteroidSample {
            position,
            state: DriftState::Drifting,
            captured_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voidspace_common::{EntityKind, SectorCoord};
    use voidspace_kernel::{PlanetKind, Resource, StarColor};

    fn star(pos: DVec2, gravity_radius: f64) -> Star {
        Star {
            id: EntityId::derive(SectorCoord::new(0, 0), EntityKind::Star, 0),
            position: pos,
            size: 100.0,
            color: StarColor::Yellow,
            mass: 1000.0,
            gravity_radius,
        }
    }

    fn asteroid(pos: DVec2, vel: DVec2) -> Asteroid {
        Asteroid {
            id: EntityId::derive(SectorCoord::new(0, 0), EntityKind::Asteroid, 0),
            initial_position: pos,
            initial_velocity: vel,
            size: 10.0,
            resources: vec![Resource::Iron],
            bounds: SectorCoord::new(0, 0).bounds(1000.0),
        }
    }

    #[test]
    fn planet_at_time_zero_is_generation_position() {
        let host = star(DVec2::new(500.0, 500.0), 0.0);
        let angle = 0.7_f64;
        let planet = Planet {
            id: EntityId::from("0_0_planet_0"),
            host_star: host.id.clone(),
            position: host.position + DVec2::new(angle.cos(), angle.sin()) * 300.0,
            size: 20.0,
            kind: PlanetKind::Rocky,
            resources: vec![Resource::Iron],
            orbit_radius: 300.0,
            orbit_angle: angle,
            orbit_speed: 0.5,
        };
        let s = KinematicSampler::default();
        assert!(s.planet_position(&planet, &host, 0.0).distance(planet.position) < 1e-9);

        // Stays on the orbit as time advances.
        let later = s.planet_position(&planet, &host, 12.5);
        assert!((later.distance(host.position) - 300.0).abs() < 1e-9);
        assert!(later.distance(planet.position) > 1.0);
    }

    #[test]
    fn asteroid_drifts_and_wraps() {
        let a = asteroid(DVec2::new(900.0, 100.0), DVec2::new(50.0, 0.0));
        let s = KinematicSampler::default();

        let sample = s.asteroid_position(&a, &[], 1.0);
        assert_eq!(sample.state, DriftState::Drifting);
        assert!(sample.position.distance(DVec2::new(950.0, 100.0)) < 1e-9);

        let wrapped = s.asteroid_position(&a, &[], 4.0);
        assert!(wrapped.position.distance(DVec2::new(100.0, 100.0)) < 1e-9);
    }

    #[test]
    fn asteroid_inside_gravity_radius_is_captured() {
        let host = star(DVec2::new(500.0, 500.0), 200.0);
        let a = asteroid(DVec2::new(800.0, 500.0), DVec2::new(-100.0, 0.0));
        let s = KinematicSampler::default();

        let free = s.asteroid_position(&a, std::slice::from_ref(&host), 0.0);
        assert_eq!(free.state, DriftState::Drifting);
        assert_eq!(free.captured_by, None);

        let caught = s.asteroid_position(&a, std::slice::from_ref(&host), 2.0);
        assert_eq!(caught.state, DriftState::Captured);
        assert_eq!(caught.captured_by, Some(host.id.clone()));
        assert!((caught.position.distance(host.position) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn clocks_are_reported() {
        let s = KinematicSampler::at(3.0, 4.0);
        assert_eq!(s.orbit_time(), 3.0);
        assert_eq!(s.physics_time(), 4.0);
    }
}
