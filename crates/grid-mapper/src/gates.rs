//! Gate positions in the grid frame.
//!
//! Each radar volume is transformed once per mapping call: every gate's
//! antenna coordinates go through the beam model and are then translated by
//! the radar's offset from the grid anchor. Gates that can never contribute
//! (excluded by the caller's gate filter, above the top of the atmosphere,
//! or masked in every requested field) are dropped here so the spatial
//! index only holds useful points.

use crate::error::Result;
use projection::{AzimuthalEquidistant, BeamModel};
use radar_common::{FieldData, GeoPoint, GridSpec, Point3, RadarVolume};
use tracing::debug;

/// Offset of a radar antenna from the grid anchor, in grid coordinates.
///
/// Horizontal position uses an azimuthal equidistant projection about the
/// anchor; height is the altitude difference.
pub fn radar_offset(site: GeoPoint, anchor: GeoPoint) -> Result<Point3> {
    let proj = AzimuthalEquidistant::new(anchor.latitude, anchor.longitude)?;
    let (x, y) = proj.geo_to_xy(site.latitude, site.longitude)?;
    Ok(Point3::new(x, y, site.altitude - anchor.altitude))
}

/// Counts of gates dropped while building a [`GateCloud`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateCounts {
    pub total: usize,
    pub filtered: usize,
    pub above_toa: usize,
    pub masked: usize,
}

/// The indexable gates of one radar volume, positioned in the grid frame.
#[derive(Debug)]
pub struct GateCloud<'a> {
    origin: Point3,
    positions: Vec<[f64; 3]>,
    sources: Vec<usize>,
    fields: Vec<Option<&'a FieldData>>,
    counts: GateCounts,
}

impl<'a> GateCloud<'a> {
    /// Transform the gates of `volume` into the frame of `spec`.
    ///
    /// `fields` fixes the field slot order used by [`GateCloud::value`]. A
    /// field the volume lacks occupies its slot as `None`.
    pub fn build(
        volume: &'a RadarVolume,
        spec: &GridSpec,
        fields: &[String],
        beam: &BeamModel,
        top_of_atmosphere: f64,
    ) -> Result<Self> {
        let origin = radar_offset(volume.site(), spec.anchor)?;
        let slots: Vec<Option<&FieldData>> = fields.iter().map(|f| volume.field(f)).collect();

        let mut counts = GateCounts {
            total: volume.gate_count(),
            ..Default::default()
        };
        let mut positions = Vec::with_capacity(counts.total);
        let mut sources = Vec::with_capacity(counts.total);

        for gate in volume.gates() {
            if volume.is_excluded(gate.index) {
                counts.filtered += 1;
                continue;
            }
            if !slots.iter().flatten().any(|f| f.is_valid(gate.index)) {
                counts.masked += 1;
                continue;
            }

            let position = Point3::from(beam.antenna_to_cartesian(gate.range, gate.azimuth, gate.elevation))
                .translate(&origin)
                .to_array();
            if !position.iter().all(|c| c.is_finite()) {
                counts.masked += 1;
                continue;
            }
            if position[2] > top_of_atmosphere {
                counts.above_toa += 1;
                continue;
            }

            positions.push(position);
            sources.push(gate.index);
        }

        debug!(
            radar = volume.name(),
            total = counts.total,
            indexed = positions.len(),
            filtered = counts.filtered,
            above_toa = counts.above_toa,
            masked = counts.masked,
            "Transformed radar gates"
        );

        Ok(Self {
            origin,
            positions,
            sources,
            fields: slots,
            counts,
        })
    }

    /// Radar antenna position in the grid frame.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Positions of the kept gates; a gate's id is its position in this slice.
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn counts(&self) -> GateCounts {
        self.counts
    }

    /// Whether the volume has the field in `slot`.
    pub fn has_field(&self, slot: usize) -> bool {
        matches!(self.fields.get(slot), Some(Some(_)))
    }

    /// Valid value of field `slot` at kept gate `gate`.
    #[inline]
    pub fn value(&self, slot: usize, gate: usize) -> Option<f32> {
        let field = self.fields.get(slot).copied().flatten()?;
        field.value(self.sources[gate])
    }
}
