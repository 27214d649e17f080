//! The grid assembler: drives transform, index, ROI, aggregation and merge
//! over every cell of a grid.

use crate::aggregate::{aggregate, CellAggregate};
use crate::config::MappingConfig;
use crate::error::{GridMapperError, Result};
use crate::gates::GateCloud;
use crate::index::{Neighbor, SpatialIndex};
use crate::merge::{closest_radar, resolve, MergePolicy};
use crate::roi::RoiConfig;
use crate::types::{MappedGrid, MapperStats, MappingNotice, RadarOrigin};
use crate::weighting::Weighting;
use projection::BeamModel;
use radar_common::{CellIndex, GridSpec, Point3, RadarVolume};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Maps radar volumes onto Cartesian grids.
///
/// A mapper holds a validated [`MappingConfig`] and counters of the work it
/// has done. It keeps no per-call state, so one mapper can serve concurrent
/// calls.
pub struct GridMapper {
    config: MappingConfig,
    beam: BeamModel,
    mappings: AtomicU64,
    indexes_built: AtomicU64,
    cells_mapped: AtomicU64,
    gates_indexed: AtomicU64,
}

impl GridMapper {
    /// Create a mapper, validating the configuration.
    pub fn new(config: MappingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            beam: BeamModel::default(),
            mappings: AtomicU64::new(0),
            indexes_built: AtomicU64::new(0),
            cells_mapped: AtomicU64::new(0),
            gates_indexed: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Get mapper statistics.
    pub fn stats(&self) -> MapperStats {
        MapperStats {
            mappings: self.mappings.load(Ordering::Relaxed),
            indexes_built: self.indexes_built.load(Ordering::Relaxed),
            cells_mapped: self.cells_mapped.load(Ordering::Relaxed),
            gates_indexed: self.gates_indexed.load(Ordering::Relaxed),
        }
    }

    /// Map a single radar volume.
    pub fn map_radar<S: AsRef<str>>(
        &self,
        volume: &RadarVolume,
        spec: &GridSpec,
        fields: &[S],
    ) -> Result<MappedGrid> {
        self.map_to_grid(std::slice::from_ref(volume), spec, fields)
    }

    /// Map radar volumes onto `spec`, producing one array per requested field.
    ///
    /// The grid specification is checked before any gate is touched. No
    /// volumes (or no gates) yields an all-no-data grid with a
    /// [`MappingNotice::EmptyInput`]; a radar missing a field is skipped for
    /// that field and noted with [`MappingNotice::FieldNotFound`].
    pub fn map_to_grid<S: AsRef<str>>(
        &self,
        volumes: &[RadarVolume],
        spec: &GridSpec,
        fields: &[S],
    ) -> Result<MappedGrid> {
        let start = Instant::now();
        spec.validate().map_err(GridMapperError::invalid_grid_spec)?;

        let fields = unique_fields(fields);
        let len = spec.len();
        let nf = fields.len();
        let arena = len.checked_mul(nf).ok_or_else(|| {
            GridMapperError::invalid_grid_spec(format!(
                "{len} cells x {nf} fields overflows the output buffer"
            ))
        })?;
        let mut notices = Vec::new();

        let total_gates: usize = volumes.iter().map(RadarVolume::gate_count).sum();
        if total_gates == 0 {
            debug!(radars = volumes.len(), "No radar gates to map");
            notices.push(MappingNotice::EmptyInput);
        }

        let mut clouds = Vec::with_capacity(volumes.len());
        for volume in volumes {
            for field in &fields {
                if volume.field(field).is_none() {
                    debug!(radar = volume.name(), field = %field, "Field not found, radar skipped");
                    notices.push(MappingNotice::FieldNotFound {
                        radar: volume.name().to_string(),
                        field: field.clone(),
                    });
                }
            }
            clouds.push(GateCloud::build(
                volume,
                spec,
                &fields,
                &self.beam,
                self.config.top_of_atmosphere,
            )?);
        }

        let indexes: Vec<SpatialIndex> = clouds
            .iter()
            .map(|cloud| SpatialIndex::build(cloud.positions()))
            .collect();
        let gates_indexed: usize = indexes.iter().map(SpatialIndex::len).sum();
        self.indexes_built
            .fetch_add(indexes.len() as u64, Ordering::Relaxed);
        self.gates_indexed
            .fetch_add(gates_indexed as u64, Ordering::Relaxed);

        let origins: Vec<Point3> = clouds.iter().map(GateCloud::origin).collect();
        let ctx = RowContext {
            spec,
            roi: &self.config.roi,
            weighting: self.config.weighting,
            merge: self.config.merge,
            clouds: &clouds,
            indexes: &indexes,
            origins: &origins,
            nfields: fields.len(),
        };

        let nx = spec.shape.nx;

        let mut roi = vec![0.0f64; len];
        let mut cells = vec![CellAggregate::empty(0.0); arena];
        if self.config.parallel {
            roi.par_chunks_mut(nx)
                .enumerate()
                .for_each(|(row, out)| ctx.fill_roi_row(row, out));
            if nf > 0 {
                cells
                    .par_chunks_mut(nx * nf)
                    .enumerate()
                    .for_each_init(
                        || (Vec::<Neighbor>::new(), Vec::<CellAggregate>::new()),
                        |(neighbors, scratch), (row, out)| ctx.fill_row(row, out, neighbors, scratch),
                    );
            }
        } else {
            for (row, out) in roi.chunks_mut(nx).enumerate() {
                ctx.fill_roi_row(row, out);
            }
            if nf > 0 {
                let mut neighbors = Vec::new();
                let mut scratch = Vec::new();
                for (row, out) in cells.chunks_mut(nx * nf).enumerate() {
                    ctx.fill_row(row, out, &mut neighbors, &mut scratch);
                }
            }
        }

        let mut grid = MappedGrid::empty(spec.clone(), &fields, roi);
        for (slot, name) in fields.iter().enumerate() {
            if let Some(field) = grid.fields.get_mut(name) {
                for flat in 0..len {
                    field.set(flat, &cells[flat * nf + slot]);
                }
            }
        }
        grid.notices = notices;
        grid.radars = volumes
            .iter()
            .zip(&origins)
            .map(|(volume, origin)| RadarOrigin {
                name: volume.name().to_string(),
                origin: *origin,
                scan_time: volume.scan_time(),
            })
            .collect();

        self.cells_mapped.fetch_add(len as u64, Ordering::Relaxed);
        self.mappings.fetch_add(1, Ordering::Relaxed);

        info!(
            radars = volumes.len(),
            fields = nf,
            cells = len,
            gates = gates_indexed,
            weighting = %self.config.weighting,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Mapped radar gates to grid"
        );

        Ok(grid)
    }
}

/// Map radar volumes with the given ROI and weighting and the default merge
/// policy.
pub fn map_to_grid<S: AsRef<str>>(
    volumes: &[RadarVolume],
    spec: &GridSpec,
    fields: &[S],
    roi: RoiConfig,
    weighting: Weighting,
) -> Result<MappedGrid> {
    let config = MappingConfig::default()
        .with_roi(roi)
        .with_weighting(weighting)
        .with_merge(MergePolicy::default());
    GridMapper::new(config)?.map_to_grid(volumes, spec, fields)
}

fn unique_fields<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(fields.len());
    for field in fields {
        let field = field.as_ref();
        if !names.iter().any(|n| n == field) {
            names.push(field.to_string());
        }
    }
    names
}

/// Shared read-only inputs of the per-row computation.
struct RowContext<'a> {
    spec: &'a GridSpec,
    roi: &'a RoiConfig,
    weighting: Weighting,
    merge: MergePolicy,
    clouds: &'a [GateCloud<'a>],
    indexes: &'a [SpatialIndex],
    origins: &'a [Point3],
    nfields: usize,
}

impl RowContext<'_> {
    /// Cell index of x position 0 in z-major row `row`.
    #[inline]
    fn row_start(&self, row: usize) -> (usize, usize) {
        let ny = self.spec.shape.ny;
        (row % ny, row / ny)
    }

    /// ROI of the radar closest to each cell; with no radars the ROI is
    /// evaluated about the grid anchor.
    fn fill_roi_row(&self, row: usize, out: &mut [f64]) {
        let (y, z) = self.row_start(row);
        for (x, slot) in out.iter_mut().enumerate() {
            let center = self.spec.cell_center(CellIndex::new(x, y, z));
            let origin = closest_radar(self.origins, &center)
                .map_or(Point3::ORIGIN, |i| self.origins[i]);
            *slot = self.roi.radius(&center, &origin);
        }
    }

    /// Compute every field of one x-row. `out` holds `nx * nfields`
    /// aggregates, cell-major.
    fn fill_row(
        &self,
        row: usize,
        out: &mut [CellAggregate],
        neighbors: &mut Vec<Neighbor>,
        scratch: &mut Vec<CellAggregate>,
    ) {
        let (y, z) = self.row_start(row);
        let nf = self.nfields;
        let nr = self.clouds.len();

        for (x, cell_out) in out.chunks_mut(nf).enumerate() {
            let center = self.spec.cell_center(CellIndex::new(x, y, z));

            // scratch is field-major: the candidates of one field are contiguous
            scratch.clear();
            scratch.resize(nf * nr, CellAggregate::empty(0.0));

            for (r, (cloud, index)) in self.clouds.iter().zip(self.indexes).enumerate() {
                let roi = self.roi.radius(&center, &cloud.origin());
                index.query_radius_into(center.to_array(), roi, neighbors);

                for slot in 0..nf {
                    scratch[slot * nr + r] = if cloud.has_field(slot) {
                        aggregate(&self.weighting, roi, neighbors, |id| cloud.value(slot, id))
                    } else {
                        CellAggregate::empty(roi)
                    };
                }
            }

            for (slot, agg) in cell_out.iter_mut().enumerate() {
                *agg = resolve(self.merge, &self.weighting, &scratch[slot * nr..(slot + 1) * nr]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_common::{FieldData, GeoPoint, GridShape, GridSpacing, Sweep, NO_DATA};

    fn site() -> GeoPoint {
        GeoPoint::new(35.3331, -97.2778, 370.0)
    }

    fn volume() -> RadarVolume {
        let azimuths: Vec<f64> = (0..36).map(|i| i as f64 * 10.0).collect();
        let ranges: Vec<f64> = (1..=40).map(|i| i as f64 * 250.0).collect();
        let sweeps = vec![Sweep::ppi(0.5, &azimuths), Sweep::ppi(1.5, &azimuths)];
        let n = ranges.len() * azimuths.len() * 2;
        let values: Vec<f32> = (0..n).map(|i| (i % 40) as f32).collect();
        RadarVolume::new("KTLX", site(), ranges, sweeps)
            .unwrap()
            .with_field("reflectivity", FieldData::new(values))
            .unwrap()
    }

    fn spec() -> GridSpec {
        GridSpec::new(
            site(),
            Point3::new(-5000.0, -5000.0, 0.0),
            GridShape::new(11, 11, 2),
            GridSpacing::new(1000.0, 1000.0, 250.0),
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = MappingConfig::default().with_weighting(Weighting::InverseDistance { power: -2.0 });
        assert!(matches!(
            GridMapper::new(config),
            Err(GridMapperError::InvalidWeightingParameters(_))
        ));
    }

    #[test]
    fn test_new_rejects_overflowing_inverse_distance_power() {
        let config = MappingConfig::default().with_weighting(Weighting::InverseDistance { power: 120.0 });
        assert!(matches!(
            GridMapper::new(config),
            Err(GridMapperError::InvalidWeightingParameters(_))
        ));
    }

    #[test]
    fn test_output_buffer_overflow_is_invalid_spec() {
        let mapper = GridMapper::new(MappingConfig::default()).unwrap();
        // the cell count itself fits in usize, two fields per cell do not
        let huge = GridSpec::new(
            site(),
            Point3::ORIGIN,
            GridShape::new(usize::MAX / 2 + 1, 1, 1),
            GridSpacing::uniform(1000.0),
        );
        assert!(huge.validate().is_ok());

        let result = mapper.map_radar(&volume(), &huge, &["reflectivity", "velocity"]);
        assert!(matches!(result, Err(GridMapperError::InvalidGridSpec(_))));
        assert_eq!(mapper.stats().indexes_built, 0);
    }

    #[test]
    fn test_unique_fields() {
        assert_eq!(
            unique_fields(&["a", "b", "a", "c", "b"]),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_output_shape_and_stats() {
        let mapper = GridMapper::new(MappingConfig::default()).unwrap();
        let grid = mapper.map_radar(&volume(), &spec(), &["reflectivity"]).unwrap();

        let field = grid.field("reflectivity").unwrap();
        assert_eq!(field.len(), 11 * 11 * 2);
        assert_eq!(grid.roi.len(), 11 * 11 * 2);
        assert!(field.valid_count() > 0);
        assert!(grid.notices.is_empty());
        assert_eq!(grid.radars.len(), 1);
        assert_eq!(grid.radars[0].origin, Point3::ORIGIN);

        let stats = mapper.stats();
        assert_eq!(stats.mappings, 1);
        assert_eq!(stats.indexes_built, 1);
        assert_eq!(stats.cells_mapped, 242);
        assert_eq!(stats.gates_indexed, 40 * 36 * 2);
    }

    #[test]
    fn test_no_data_cells_have_zero_count() {
        let config = MappingConfig::default().with_roi(RoiConfig::constant(200.0));
        let mapper = GridMapper::new(config).unwrap();
        let grid = mapper.map_radar(&volume(), &spec(), &["reflectivity"]).unwrap();

        let field = grid.field("reflectivity").unwrap();
        for flat in 0..field.len() {
            if field.gate_count[flat] == 0 {
                assert_eq!(field.data[flat], NO_DATA);
            } else {
                assert_ne!(field.data[flat], NO_DATA);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let vol = volume();
        for weighting in [Weighting::BARNES, Weighting::Cressman, Weighting::Nearest] {
            let parallel = GridMapper::new(MappingConfig::default().with_weighting(weighting))
                .unwrap()
                .map_radar(&vol, &spec(), &["reflectivity"])
                .unwrap();
            let sequential = GridMapper::new(
                MappingConfig::default()
                    .with_weighting(weighting)
                    .with_parallel(false),
            )
            .unwrap()
            .map_radar(&vol, &spec(), &["reflectivity"])
            .unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn test_no_fields_still_reports_roi() {
        let mapper = GridMapper::new(MappingConfig::default()).unwrap();
        let fields: [&str; 0] = [];
        let grid = mapper.map_radar(&volume(), &spec(), &fields).unwrap();
        assert!(grid.fields.is_empty());
        assert!(grid.roi.iter().all(|&r| r >= 500.0));
    }
}
