use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer coordinate of a sector in the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorCoord {
    pub x: i32,
    pub y: i32,
}

impl SectorCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sector containing a world-space position for the given sector size.
    pub fn containing(pos: DVec2, sector_size: f64) -> Self {
        Self {
            x: (pos.x / sector_size).floor() as i32,
            y: (pos.y / sector_size).floor() as i32,
        }
    }

    /// Pack both coordinates into a single 64-bit key (x in the high half).
    pub const fn pack(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    /// Inverse of [`SectorCoord::pack`].
    pub const fn unpack(key: u64) -> Self {
        Self {
            x: (key >> 32) as u32 as i32,
            y: key as u32 as i32,
        }
    }

    /// Chebyshev (chessboard) distance in sectors.
    pub fn chebyshev(self, other: SectorCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// World-space square covered by this sector.
    pub fn bounds(self, sector_size: f64) -> SectorBounds {
        let min = DVec2::new(self.x as f64 * sector_size, self.y as f64 * sector_size);
        SectorBounds {
            min,
            max: min + DVec2::splat(sector_size),
        }
    }
}

impl fmt::Display for SectorCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

/// Axis-aligned world-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl SectorBounds {
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Bounds shrunk by `margin` on every edge. `None` if nothing is left.
    pub fn shrink(&self, margin: f64) -> Option<SectorBounds> {
        let min = self.min + DVec2::splat(margin);
        let max = self.max - DVec2::splat(margin);
        (min.x <= max.x && min.y <= max.y).then_some(SectorBounds { min, max })
    }

    /// True when a circle of radius `size` at `pos` lies fully inside.
    pub fn contains_footprint(&self, pos: DVec2, size: f64) -> bool {
        pos.x - size >= self.min.x
            && pos.x + size <= self.max.x
            && pos.y - size >= self.min.y
            && pos.y + size <= self.max.y
    }
}

/// The kinds of body the generator places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Star,
    Planet,
    Asteroid,
    Wormhole,
    Base,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Star,
        EntityKind::Planet,
        EntityKind::Asteroid,
        EntityKind::Wormhole,
        EntityKind::Base,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Star => "star",
            EntityKind::Planet => "planet",
            EntityKind::Asteroid => "asteroid",
            EntityKind::Wormhole => "wormhole",
            EntityKind::Base => "base",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a generated entity.
///
/// Derived only from the sector coordinate, the kind and the per-kind index,
/// so a regenerated sector yields the same ids and server-side change records
/// keep pointing at the right objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn derive(coord: SectorCoord, kind: EntityKind, index: u32) -> Self {
        Self(format!("{}_{}_{}_{}", coord.x, coord.y, kind.as_str(), index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_positions() {
        assert_eq!(
            SectorCoord::containing(DVec2::new(10.0, 10.0), 1000.0),
            SectorCoord::new(0, 0)
        );
        assert_eq!(
            SectorCoord::containing(DVec2::new(-1.0, 2500.0), 1000.0),
            SectorCoord::new(-1, 2)
        );
    }

    #[test]
    fn pack_unpack_keeps_sign() {
        for c in [
            SectorCoord::new(0, 0),
            SectorCoord::new(-1, 1),
            SectorCoord::new(i32::MIN, i32::MAX),
            SectorCoord::new(12345, -678),
        ] {
            assert_eq!(SectorCoord::unpack(c.pack()), c);
        }
        assert_ne!(
            SectorCoord::new(1, 0).pack(),
            SectorCoord::new(0, 1).pack()
        );
    }

    #[test]
    fn chebyshev_distance() {
        let a = SectorCoord::new(5, 5);
        assert_eq!(a.chebyshev(SectorCoord::new(9, 9)), 4);
        assert_eq!(a.chebyshev(SectorCoord::new(6, 3)), 2);
        assert_eq!(a.chebyshev(a), 0);
    }

    #[test]
    fn entity_id_format() {
        let id = EntityId::derive(SectorCoord::new(-2, 7), EntityKind::Asteroid, 3);
        assert_eq!(id.as_str(), "-2_7_asteroid_3");
        assert_eq!(SectorCoord::new(-2, 7).to_string(), "-2_7");
    }

    #[test]
    fn bounds_shrink_and_contain() {
        let b = SectorCoord::new(1, 0).bounds(100.0);
        assert_eq!(b.min, DVec2::new(100.0, 0.0));
        assert_eq!(b.max, DVec2::new(200.0, 100.0));

        let inner = b.shrink(10.0).unwrap();
        assert_eq!(inner.min, DVec2::new(110.0, 10.0));
        assert!(b.shrink(60.0).is_none());

        assert!(b.contains_footprint(DVec2::new(150.0, 50.0), 50.0));
        assert!(!b.contains_footprint(DVec2::new(150.0, 50.0), 50.1));
    }
}
