//! Cartesian grid specifications for gridded radar products.
//!
//! A grid is an axis-aligned block of cells in a local east/north/up frame
//! whose origin is a geographic anchor point. Arrays built on a grid are
//! stored z-major: shape `(nz, ny, nx)` with the x index varying fastest.

use crate::GeoPoint;
use serde::{Deserialize, Serialize};

/// A position in the local Cartesian frame (meters east, north, up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn distance(&self, other: &Point3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Distance in the horizontal (x/y) plane only.
    #[inline]
    pub fn horizontal_distance(&self, other: &Point3) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Translate by another point treated as a displacement.
    #[inline]
    pub fn translate(&self, by: &Point3) -> Point3 {
        Point3::new(self.x + by.x, self.y + by.y, self.z + by.z)
    }

    /// Coordinates as `[x, y, z]`.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Number of cells along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridShape {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0 || self.nz == 0
    }
}

/// Cell spacing along each axis in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl GridSpacing {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Same spacing on every axis.
    pub fn uniform(d: f64) -> Self {
        Self::new(d, d, d)
    }
}

/// Index of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl CellIndex {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

/// Specification of a regular 3-D Cartesian grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Geographic location of the Cartesian origin.
    pub anchor: GeoPoint,
    /// Center of cell (0, 0, 0) relative to the anchor.
    pub offset: Point3,
    pub shape: GridShape,
    pub spacing: GridSpacing,
}

impl GridSpec {
    /// Create a new grid specification.
    pub fn new(anchor: GeoPoint, offset: Point3, shape: GridShape, spacing: GridSpacing) -> Self {
        Self {
            anchor,
            offset,
            shape,
            spacing,
        }
    }

    /// Build a grid from per-axis limits given in `(z, y, x)` order.
    ///
    /// Cell centers sit on the limits, so an axis with `n` cells spanning
    /// `(min, max)` has spacing `(max - min) / (n - 1)`. A single-cell axis
    /// gets unit spacing.
    pub fn from_limits(anchor: GeoPoint, shape: GridShape, limits: [(f64, f64); 3]) -> Self {
        let [(z_min, z_max), (y_min, y_max), (x_min, x_max)] = limits;
        let step = |min: f64, max: f64, n: usize| {
            if n > 1 {
                (max - min) / (n - 1) as f64
            } else {
                1.0
            }
        };

        Self {
            anchor,
            offset: Point3::new(x_min, y_min, z_min),
            shape,
            spacing: GridSpacing::new(
                step(x_min, x_max, shape.nx),
                step(y_min, y_max, shape.ny),
                step(z_min, z_max, shape.nz),
            ),
        }
    }

    /// Check that every axis has at least one cell and a positive, finite spacing.
    pub fn validate(&self) -> Result<(), String> {
        let counts = [
            ("nx", self.shape.nx),
            ("ny", self.shape.ny),
            ("nz", self.shape.nz),
        ];
        for (name, n) in counts {
            if n == 0 {
                return Err(format!("{name} must be > 0"));
            }
        }

        let spacings = [
            ("dx", self.spacing.dx),
            ("dy", self.spacing.dy),
            ("dz", self.spacing.dz),
        ];
        for (name, d) in spacings {
            if !(d.is_finite() && d > 0.0) {
                return Err(format!("{name} must be a positive finite spacing, got {d}"));
            }
        }

        if !self.offset.is_finite() {
            return Err(format!("grid offset must be finite, got {:?}", self.offset));
        }

        self.shape
            .nx
            .checked_mul(self.shape.ny)
            .and_then(|n| n.checked_mul(self.shape.nz))
            .ok_or_else(|| format!("grid shape {:?} overflows the cell count", self.shape))?;

        Ok(())
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Array shape in `(nz, ny, nx)` order.
    pub fn array_shape(&self) -> [usize; 3] {
        [self.shape.nz, self.shape.ny, self.shape.nx]
    }

    /// Flat offset of a cell in a z-major array.
    #[inline]
    pub fn flat_index(&self, cell: CellIndex) -> usize {
        (cell.z * self.shape.ny + cell.y) * self.shape.nx + cell.x
    }

    /// Inverse of [`GridSpec::flat_index`].
    #[inline]
    pub fn cell_index(&self, flat: usize) -> CellIndex {
        let x = flat % self.shape.nx;
        let rest = flat / self.shape.nx;
        CellIndex::new(x, rest % self.shape.ny, rest / self.shape.ny)
    }

    /// Center of a cell relative to the anchor.
    #[inline]
    pub fn cell_center(&self, cell: CellIndex) -> Point3 {
        Point3::new(
            self.offset.x + cell.x as f64 * self.spacing.dx,
            self.offset.y + cell.y as f64 * self.spacing.dy,
            self.offset.z + cell.z as f64 * self.spacing.dz,
        )
    }

    /// Cell center x coordinates.
    pub fn x_coords(&self) -> Vec<f64> {
        axis_coords(self.offset.x, self.spacing.dx, self.shape.nx)
    }

    /// Cell center y coordinates.
    pub fn y_coords(&self) -> Vec<f64> {
        axis_coords(self.offset.y, self.spacing.dy, self.shape.ny)
    }

    /// Cell center z coordinates.
    pub fn z_coords(&self) -> Vec<f64> {
        axis_coords(self.offset.z, self.spacing.dz, self.shape.nz)
    }

    /// Centers of the first and last cells.
    pub fn extent(&self) -> (Point3, Point3) {
        let last = CellIndex::new(
            self.shape.nx.saturating_sub(1),
            self.shape.ny.saturating_sub(1),
            self.shape.nz.saturating_sub(1),
        );
        (self.offset, self.cell_center(last))
    }
}

fn axis_coords(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> GridSpec {
        GridSpec::new(
            GeoPoint::new(36.0, -97.0, 300.0),
            Point3::new(-1000.0, -2000.0, 500.0),
            GridShape::new(3, 4, 2),
            GridSpacing::new(500.0, 1000.0, 250.0),
        )
    }

    #[test]
    fn test_flat_index_roundtrip() {
        let grid = spec();
        for flat in 0..grid.len() {
            let cell = grid.cell_index(flat);
            assert_eq!(grid.flat_index(cell), flat);
        }
        assert_eq!(grid.flat_index(CellIndex::new(1, 0, 0)), 1);
        assert_eq!(grid.flat_index(CellIndex::new(0, 1, 0)), 3);
        assert_eq!(grid.flat_index(CellIndex::new(0, 0, 1)), 12);
    }

    #[test]
    fn test_cell_center() {
        let grid = spec();
        let c = grid.cell_center(CellIndex::new(2, 3, 1));
        assert_eq!(c, Point3::new(0.0, 1000.0, 750.0));
        assert_eq!(grid.cell_center(CellIndex::new(0, 0, 0)), grid.offset);
    }

    #[test]
    fn test_from_limits() {
        let grid = GridSpec::from_limits(
            GeoPoint::new(0.0, 0.0, 0.0),
            GridShape::new(41, 21, 1),
            [(1000.0, 1000.0), (-10_000.0, 10_000.0), (-20_000.0, 20_000.0)],
        );
        assert_eq!(grid.spacing.dx, 1000.0);
        assert_eq!(grid.spacing.dy, 1000.0);
        assert_eq!(grid.spacing.dz, 1.0);
        assert!(grid.validate().is_ok());
        assert_eq!(grid.extent().1, Point3::new(20_000.0, 10_000.0, 1000.0));
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let mut grid = spec();
        grid.shape.ny = 0;
        let err = grid.validate().unwrap_err();
        assert!(err.contains("ny"));
    }

    #[test]
    fn test_validate_rejects_bad_spacing() {
        let mut grid = spec();
        grid.spacing.dz = 0.0;
        assert!(grid.validate().is_err());
        grid.spacing.dz = -5.0;
        assert!(grid.validate().is_err());
        grid.spacing.dz = f64::NAN;
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_axis_coords() {
        let grid = spec();
        assert_eq!(grid.x_coords(), vec![-1000.0, -500.0, 0.0]);
        assert_eq!(grid.z_coords(), vec![500.0, 750.0]);
        assert_eq!(grid.array_shape(), [2, 4, 3]);
    }
}
