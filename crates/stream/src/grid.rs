use glam::DVec2;
use voidspace_common::SectorCoord;

/// Fixed-size square partitioning of world space into sectors.
#[derive(Debug, Clone, Copy)]
pub struct SectorGrid {
    sector_size: f64,
}

impl SectorGrid {
    /// Create a grid with the given sector side length.
    pub fn new(sector_size: f64) -> Self {
        assert!(sector_size > 0.0, "sector_size must be positive");
        Self { sector_size }
    }

    /// Sector side length used for this grid.
    pub fn sector_size(&self) -> f64 {
        self.sector_size
    }

    /// Convert a world position to the coordinate of the sector containing it.
    pub fn position_to_sector(&self, pos: DVec2) -> SectorCoord {
        SectorCoord::containing(pos, self.sector_size)
    }

    /// World-space centre of a sector.
    pub fn sector_center(&self, coord: SectorCoord) -> DVec2 {
        let b = coord.bounds(self.sector_size);
        (b.min + b.max) * 0.5
    }

    /// Every sector within a Chebyshev radius of `center`, row by row.
    pub fn sectors_in_radius(&self, center: SectorCoord, radius: u32) -> Vec<SectorCoord> {
        let side = 2 * radius as usize + 1;
        let r = radius as i32;
        let mut result = Vec::with_capacity(side * side);
        for dy in -r..=r {
            for dx in -r..=r {
                result.push(center.offset(dx, dy));
            }
        }
        result
    }
}
