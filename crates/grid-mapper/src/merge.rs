//! Combining the contributions of several radars.
//!
//! Per-cell resolution ([`resolve`]) is used both inside
//! [`GridMapper::map_to_grid`](crate::GridMapper::map_to_grid) and by
//! [`merge_grids`], so mapping radars together or separately and merging
//! afterwards gives the same values.

use crate::aggregate::CellAggregate;
use crate::error::{GridMapperError, Result};
use crate::types::{GridField, MappedGrid, RadarOrigin};
use crate::weighting::Weighting;
use radar_common::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How overlapping radar coverage is resolved per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The radar with the closest contributing gate supplies the cell.
    #[default]
    ClosestWins,
    /// Radars are blended, each weighted by its closest gate distance.
    Blend,
}

impl MergePolicy {
    /// Parse from string (case-insensitive), falling back to `ClosestWins`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "blend" | "weighted" => Self::Blend,
            _ => Self::ClosestWins,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClosestWins => "closest",
            Self::Blend => "blend",
        }
    }
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve one cell from per-radar aggregates given in radar input order.
///
/// Radars without data are ignored. With no data at all the result is empty
/// and carries the ROI of the first candidate.
pub fn resolve(policy: MergePolicy, weighting: &Weighting, candidates: &[CellAggregate]) -> CellAggregate {
    let closest = closest_with_data(candidates);

    let Some(closest) = closest else {
        return CellAggregate::empty(candidates.first().map_or(0.0, |c| c.roi));
    };

    let contributing = candidates.iter().filter(|c| c.has_data()).count();
    if policy == MergePolicy::ClosestWins || weighting.is_nearest() || contributing == 1 {
        return *closest;
    }
    blend(weighting, candidates, closest)
}

fn closest_with_data(candidates: &[CellAggregate]) -> Option<&CellAggregate> {
    let mut best: Option<&CellAggregate> = None;
    for c in candidates.iter().filter(|c| c.has_data()) {
        match best {
            Some(b) if c.nearest_distance >= b.nearest_distance => {}
            _ => best = Some(c),
        }
    }
    best
}

fn blend(weighting: &Weighting, candidates: &[CellAggregate], closest: &CellAggregate) -> CellAggregate {
    let mut weighted_sum = 0.0f64;
    let mut blend_weight = 0.0f64;
    let mut gate_count = 0u32;
    let mut weight_sum = 0.0f64;

    for c in candidates.iter().filter(|c| c.has_data()) {
        let w = weighting.weight(c.nearest_distance, c.roi);
        weighted_sum += w * c.value as f64;
        blend_weight += w;
        gate_count += c.gate_count;
        weight_sum += c.weight_sum;
    }

    if blend_weight <= 0.0 || !blend_weight.is_finite() {
        return CellAggregate::empty(closest.roi);
    }

    CellAggregate {
        value: (weighted_sum / blend_weight) as f32,
        gate_count,
        weight_sum,
        nearest_distance: closest.nearest_distance,
        roi: closest.roi,
    }
}

/// Index of the radar closest to `cell`; earlier radars win ties.
pub(crate) fn closest_radar(origins: &[Point3], cell: &Point3) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, origin) in origins.iter().enumerate() {
        let d = origin.distance_squared(cell);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Merge grids mapped separately (typically one per radar) on the same grid.
///
/// Every grid must share the same [`GridSpec`](radar_common::GridSpec) and
/// field set. The ROI diagnostic of each cell comes from the grid owning the
/// radar closest to that cell.
pub fn merge_grids(grids: &[MappedGrid], policy: MergePolicy, weighting: &Weighting) -> Result<MappedGrid> {
    let Some(first) = grids.first() else {
        return Err(GridMapperError::grid_mismatch("no grids to merge"));
    };

    for (i, grid) in grids.iter().enumerate() {
        if grid.roi.len() != grid.spec.len() || grid.fields.values().any(|f| f.len() != grid.spec.len()) {
            return Err(GridMapperError::grid_mismatch(format!(
                "grid {i} arrays do not match its {} cells",
                grid.spec.len()
            )));
        }
        if grid.spec != first.spec {
            return Err(GridMapperError::grid_mismatch(format!(
                "grid {i} has a different grid specification"
            )));
        }
        if !grid.field_names().eq(first.field_names()) {
            return Err(GridMapperError::grid_mismatch(format!(
                "grid {i} has fields {:?}, expected {:?}",
                grid.field_names().collect::<Vec<_>>(),
                first.field_names().collect::<Vec<_>>()
            )));
        }
    }

    let spec = &first.spec;
    let len = spec.len();

    // Pick, per cell, the grid that owns the closest radar.
    let roi: Vec<f64> = (0..len)
        .map(|flat| {
            let center = spec.cell_center(spec.cell_index(flat));
            let nearest_per_grid = grids.iter().map(|g| {
                g.radars
                    .iter()
                    .map(|r| r.origin.distance_squared(&center))
                    .fold(f64::INFINITY, f64::min)
            });
            let mut best = (0usize, f64::INFINITY);
            for (i, d) in nearest_per_grid.enumerate() {
                if d < best.1 {
                    best = (i, d);
                }
            }
            grids[best.0].roi[flat]
        })
        .collect();

    let mut fields = BTreeMap::new();
    let mut candidates = Vec::with_capacity(grids.len());
    for name in first.field_names() {
        let sources: Vec<&GridField> = grids.iter().filter_map(|g| g.field(name)).collect();
        let mut merged = GridField::empty(len);
        for flat in 0..len {
            candidates.clear();
            candidates.extend(
                sources
                    .iter()
                    .zip(grids)
                    .map(|(f, g)| f.aggregate_at(flat, g.roi[flat])),
            );
            let mut cell = resolve(policy, weighting, &candidates);
            cell.roi = roi[flat];
            merged.set(flat, &cell);
        }
        fields.insert(name.to_string(), merged);
    }

    let radars: Vec<RadarOrigin> = grids.iter().flat_map(|g| g.radars.iter().cloned()).collect();
    let mut notices = Vec::new();
    for notice in grids.iter().flat_map(|g| g.notices.iter()) {
        if !notices.contains(notice) {
            notices.push(notice.clone());
        }
    }

    debug!(
        grids = grids.len(),
        fields = fields.len(),
        cells = len,
        policy = %policy,
        "Merged grids"
    );

    Ok(MappedGrid {
        spec: spec.clone(),
        fields,
        roi,
        radars,
        notices,
    })
}
