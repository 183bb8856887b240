//! Bounded-retry placement of circular footprints inside a sector.
//!
//! Attempts draw from the caller's per-sector stream, so the number of draws an
//! attempt consumes is part of the determinism contract: two draws per attempt
//! for [`PlacementSolver::try_place`], two for [`PlacementSolver::try_place_orbit`].

use glam::DVec2;
use voidspace_common::SectorBounds;

use crate::rng::Mulberry32;
use crate::tunables::Span;

/// An already placed body: centre plus radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub position: DVec2,
    pub size: f64,
}

impl Footprint {
    pub const fn new(position: DVec2, size: f64) -> Self {
        Self { position, size }
    }
}

/// Where an orbiting body ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSlot {
    pub position: DVec2,
    pub radius: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementSolver {
    spacing: f64,
    max_attempts: u32,
}

impl PlacementSolver {
    pub fn new(spacing: f64, max_attempts: u32) -> Self {
        Self {
            spacing,
            max_attempts,
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Find a spot anywhere in `bounds` that keeps the whole footprint inside
    /// and respects spacing against `existing`. `None` after `max_attempts`.
    pub fn try_place(
        &self,
        rng: &mut Mulberry32,
        bounds: &SectorBounds,
        size: f64,
        existing: &[Footprint],
    ) -> Option<DVec2> {
        let inner = bounds.shrink(size)?;
        for _ in 0..self.max_attempts {
            let x = rng.range(inner.min.x, inner.max.x);
            let y = rng.range(inner.min.y, inner.max.y);
            let candidate = DVec2::new(x, y);
            if self.is_clear(candidate, size, existing) {
                return Some(candidate);
            }
        }
        None
    }

    /// Find an orbit around `centre` for a body of `size`.
    ///
    /// The radius is measured from the host's edge plus spacing, so the host
    /// itself never blocks a slot; `offset` adds the randomised gap on top.
    #[allow(clippy::too_many_arguments)]
    pub fn try_place_orbit(
        &self,
        rng: &mut Mulberry32,
        bounds: &SectorBounds,
        centre: DVec2,
        host_size: f64,
        size: f64,
        offset: Span,
        existing: &[Footprint],
    ) -> Option<OrbitSlot> {
        for _ in 0..self.max_attempts {
            let gap = rng.range(offset.min, offset.max);
            let angle = rng.angle();
            let radius = host_size + size + self.spacing + gap;
            let position = centre + DVec2::new(angle.cos(), angle.sin()) * radius;
            if bounds.contains_footprint(position, size) && self.is_clear(position, size, existing)
            {
                return Some(OrbitSlot {
                    position,
                    radius,
                    angle,
                });
            }
        }
        None
    }

    /// True when a body at `candidate` keeps `spacing` from every footprint.
    pub fn is_clear(&self, candidate: DVec2, size: f64, existing: &[Footprint]) -> bool {
        existing
            .iter()
            .all(|other| candidate.distance(other.position) >= size + other.size + self.spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voidspace_common::SectorCoord;

    fn bounds(side: f64) -> SectorBounds {
        SectorCoord::new(0, 0).bounds(side)
    }

    #[test]
    fn placed_footprint_stays_inside() {
        let solver = PlacementSolver::new(20.0, 30);
        let b = bounds(1000.0);
        let mut rng = Mulberry32::new(7);
        for _ in 0..200 {
            let pos = solver.try_place(&mut rng, &b, 75.0, &[]).unwrap();
            assert!(b.contains_footprint(pos, 75.0));
        }
    }

    #[test]
    fn two_stars_keep_spacing() {
        // sizes 50 and 60 with spacing 20 must end up at least 130 apart.
        let solver = PlacementSolver::new(20.0, 30);
        let b = bounds(400.0);
        let mut placed_pairs = 0;
        for seed in 0..200 {
            let mut rng = Mulberry32::new(seed);
            let a = solver.try_place(&mut rng, &b, 50.0, &[]).unwrap();
            let existing = [Footprint::new(a, 50.0)];
            if let Some(c) = solver.try_place(&mut rng, &b, 60.0, &existing) {
                assert!(a.distance(c) >= 130.0, "seed {seed}: {}", a.distance(c));
                placed_pairs += 1;
            }
        }
        assert!(placed_pairs > 0);
    }

    #[test]
    fn exhaustion_reports_none() {
        // A 100-wide sector with one 40-radius body leaves no room for another.
        let solver = PlacementSolver::new(20.0, 50);
        let b = bounds(100.0);
        let existing = [Footprint::new(DVec2::new(50.0, 50.0), 40.0)];
        let mut rng = Mulberry32::new(1);
        assert!(solver.try_place(&mut rng, &b, 10.0, &existing).is_none());
    }

    #[test]
    fn body_wider_than_sector_is_never_placed() {
        let solver = PlacementSolver::new(0.0, 10);
        let mut rng = Mulberry32::new(1);
        assert!(solver.try_place(&mut rng, &bounds(100.0), 60.0, &[]).is_none());
    }

    #[test]
    fn attempts_consume_two_draws_each() {
        let solver = PlacementSolver::new(20.0, 4);
        let b = bounds(100.0);
        let existing = [Footprint::new(DVec2::new(50.0, 50.0), 40.0)];
        let mut rng = Mulberry32::new(3);
        assert!(solver.try_place(&mut rng, &b, 10.0, &existing).is_none());

        let mut reference = Mulberry32::new(3);
        for _ in 0..8 {
            reference.next_f64();
        }
        assert_eq!(rng.next_f64(), reference.next_f64());
    }

    #[test]
    fn orbit_slot_clears_host_and_stays_inside() {
        let solver = PlacementSolver::new(20.0, 30);
        let b = bounds(5000.0);
        let centre = DVec2::new(2500.0, 2500.0);
        let host = [Footprint::new(centre, 120.0)];
        let mut rng = Mulberry32::new(11);
        for _ in 0..100 {
            let slot = solver
                .try_place_orbit(&mut rng, &b, centre, 120.0, 30.0, Span::new(50.0, 400.0), &host)
                .unwrap();
            assert!(slot.radius >= 120.0 + 30.0 + 20.0 + 50.0);
            assert!(slot.radius < 120.0 + 30.0 + 20.0 + 400.0);
            assert!(b.contains_footprint(slot.position, 30.0));
            assert!((slot.position.distance(centre) - slot.radius).abs() < 1e-6);
        }
    }

    #[test]
    fn same_stream_same_position() {
        let solver = PlacementSolver::new(20.0, 30);
        let b = bounds(1000.0);
        let a = solver.try_place(&mut Mulberry32::new(42), &b, 30.0, &[]);
        let c = solver.try_place(&mut Mulberry32::new(42), &b, 30.0, &[]);
        assert_eq!(a, c);
    }
}
