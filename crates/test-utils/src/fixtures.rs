//! Common test fixtures for radar gridding tests.
//!
//! Pre-defined radar sites, grids and field names for common scenarios.

/// WSR-88D sites used across tests.
pub mod sites {
    use radar_common::GeoPoint;

    /// Oklahoma City, OK
    pub fn ktlx() -> GeoPoint {
        GeoPoint::new(35.3331, -97.2778, 370.0)
    }

    /// Tulsa, OK
    pub fn kinx() -> GeoPoint {
        GeoPoint::new(36.1750, -95.5644, 204.0)
    }
}

/// Common grid specifications for testing.
pub mod grids {
    use radar_common::{GeoPoint, GridShape, GridSpacing, GridSpec, Point3};

    /// 2 x 2 x 1 cells, 1 km spacing, cell (0, 0, 0) centered on `offset`.
    pub fn two_by_two(anchor: GeoPoint, offset: Point3) -> GridSpec {
        GridSpec::new(anchor, offset, GridShape::new(2, 2, 1), GridSpacing::uniform(1000.0))
    }

    /// 41 x 41 x 5 cells covering +/-20 km around the anchor, 0-2 km high.
    pub fn local(anchor: GeoPoint) -> GridSpec {
        GridSpec::from_limits(
            anchor,
            GridShape::new(41, 41, 5),
            [(0.0, 2_000.0), (-20_000.0, 20_000.0), (-20_000.0, 20_000.0)],
        )
    }

    /// 101 x 101 x 10 cells covering +/-100 km, 0-9 km high.
    pub fn regional(anchor: GeoPoint) -> GridSpec {
        GridSpec::from_limits(
            anchor,
            GridShape::new(101, 101, 10),
            [(0.0, 9_000.0), (-100_000.0, 100_000.0), (-100_000.0, 100_000.0)],
        )
    }

    /// A grid with zero cells along x.
    pub fn degenerate(anchor: GeoPoint) -> GridSpec {
        GridSpec::new(anchor, Point3::ORIGIN, GridShape::new(0, 4, 4), GridSpacing::uniform(1000.0))
    }
}

/// Common field names.
pub mod fields {
    pub const REFLECTIVITY: &str = "reflectivity";
    pub const VELOCITY: &str = "velocity";
}
