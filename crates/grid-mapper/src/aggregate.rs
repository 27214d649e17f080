//! Combining the gates around one grid cell into a single value.

use crate::index::Neighbor;
use crate::weighting::Weighting;
use radar_common::NO_DATA;

/// Distances closer than this (meters) are ties for nearest-neighbour selection.
pub const NEAREST_TIE_TOLERANCE: f64 = 1.0e-6;

/// Result of aggregating one radar's gates for one field at one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellAggregate {
    /// Weighted value, or [`NO_DATA`] when nothing contributed.
    pub value: f32,
    /// Number of valid gates that contributed.
    pub gate_count: u32,
    /// Sum of the weights of contributing gates.
    pub weight_sum: f64,
    /// Distance to the closest contributing gate, infinite when empty.
    pub nearest_distance: f64,
    /// Radius of influence the neighbourhood was searched with.
    pub roi: f64,
}

impl CellAggregate {
    /// A cell with no contributing gates.
    pub fn empty(roi: f64) -> Self {
        Self {
            value: NO_DATA,
            gate_count: 0,
            weight_sum: 0.0,
            nearest_distance: f64::INFINITY,
            roi,
        }
    }

    pub fn has_data(&self) -> bool {
        self.gate_count > 0
    }
}

/// Aggregate the candidate gates of one cell for one field.
///
/// `value_of` returns the field value of a candidate gate, or `None` when it
/// is masked or the field is missing; such gates are skipped. A cell whose
/// valid gates all carry zero weight is reported as empty. If some gates
/// carry an infinite weight the cell takes their mean value.
pub fn aggregate<F>(weighting: &Weighting, roi: f64, neighbors: &[Neighbor], value_of: F) -> CellAggregate
where
    F: Fn(usize) -> Option<f32>,
{
    if weighting.is_nearest() {
        return nearest(roi, neighbors, value_of);
    }

    let mut weighted_sum = 0.0f64;
    let mut weight_sum = 0.0f64;
    let mut count = 0u32;
    let mut closest = f64::INFINITY;
    // gates whose weight overflowed; they outweigh every finite weight
    let mut unbounded_sum = 0.0f64;
    let mut unbounded = 0u32;

    for n in neighbors {
        let Some(v) = value_of(n.id) else {
            continue;
        };
        let w = weighting.weight(n.distance, roi);
        if w.is_infinite() {
            unbounded_sum += v as f64;
            unbounded += 1;
        } else {
            weighted_sum += w * v as f64;
            weight_sum += w;
        }
        count += 1;
        closest = closest.min(n.distance);
    }

    if unbounded > 0 {
        return CellAggregate {
            value: (unbounded_sum / unbounded as f64) as f32,
            gate_count: count,
            weight_sum: f64::INFINITY,
            nearest_distance: closest,
            roi,
        };
    }

    if count == 0 || weight_sum <= 0.0 || !weight_sum.is_finite() {
        return CellAggregate::empty(roi);
    }

    CellAggregate {
        value: (weighted_sum / weight_sum) as f32,
        gate_count: count,
        weight_sum,
        nearest_distance: closest,
        roi,
    }
}

/// Closest valid gate wins; gates within [`NEAREST_TIE_TOLERANCE`] of the
/// closest distance resolve to the lowest id.
fn nearest<F>(roi: f64, neighbors: &[Neighbor], value_of: F) -> CellAggregate
where
    F: Fn(usize) -> Option<f32>,
{
    let closest = neighbors
        .iter()
        .filter(|n| value_of(n.id).is_some())
        .map(|n| n.distance)
        .fold(f64::INFINITY, f64::min);
    if !closest.is_finite() {
        return CellAggregate::empty(roi);
    }

    let mut best: Option<(usize, f64, f32)> = None;
    for n in neighbors {
        if n.distance - closest > NEAREST_TIE_TOLERANCE {
            continue;
        }
        let Some(v) = value_of(n.id) else {
            continue;
        };
        if best.map_or(true, |(id, _, _)| n.id < id) {
            best = Some((n.id, n.distance, v));
        }
    }

    match best {
        Some((_, distance, value)) => CellAggregate {
            value,
            gate_count: 1,
            weight_sum: 1.0,
            nearest_distance: distance,
            roi,
        },
        None => CellAggregate::empty(roi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(list: &[(usize, f64)]) -> Vec<Neighbor> {
        list.iter()
            .map(|&(id, distance)| Neighbor { id, distance })
            .collect()
    }

    fn lookup(values: &[Option<f32>]) -> impl Fn(usize) -> Option<f32> + '_ {
        move |id| values.get(id).copied().flatten()
    }

    #[test]
    fn test_empty_neighbourhood() {
        let agg = aggregate(&Weighting::Cressman, 500.0, &[], |_| Some(1.0));
        assert_eq!(agg, CellAggregate::empty(500.0));
        assert_eq!(agg.value, NO_DATA);
        assert!(!agg.has_data());
    }

    #[test]
    fn test_all_masked_is_empty() {
        let values = [None, None];
        let n = neighbors(&[(0, 10.0), (1, 20.0)]);
        let agg = aggregate(&Weighting::BARNES, 500.0, &n, lookup(&values));
        assert_eq!(agg.gate_count, 0);
        assert_eq!(agg.value, NO_DATA);
    }

    #[test]
    fn test_weighted_mean() {
        let values = [Some(10.0), Some(20.0), None];
        let n = neighbors(&[(0, 0.0), (1, 500.0), (2, 10.0)]);
        let agg = aggregate(&Weighting::Cressman, 1000.0, &n, lookup(&values));
        // weights 1.0 and 0.6
        let expected = (10.0 * 1.0 + 20.0 * 0.6) / 1.6;
        assert!((agg.value as f64 - expected).abs() < 1e-5);
        assert_eq!(agg.gate_count, 2);
        assert!((agg.weight_sum - 1.6).abs() < 1e-12);
        assert_eq!(agg.nearest_distance, 0.0);
    }

    #[test]
    fn test_zero_weight_sum_is_empty() {
        // Cressman weight is exactly zero on the ROI boundary
        let values = [Some(42.0)];
        let n = neighbors(&[(0, 1000.0)]);
        let agg = aggregate(&Weighting::Cressman, 1000.0, &n, lookup(&values));
        assert_eq!(agg.value, NO_DATA);
        assert_eq!(agg.gate_count, 0);
    }

    #[test]
    fn test_duplicate_gate_does_not_change_value() {
        // gate 1 duplicates gate 0 in both position and value
        let values = [Some(12.5), Some(12.5)];
        let once = neighbors(&[(0, 120.0)]);
        let twice = neighbors(&[(0, 120.0), (1, 120.0)]);

        for w in [Weighting::Cressman, Weighting::InverseDistance { power: 2.0 }] {
            let single = aggregate(&w, 1000.0, &once, lookup(&values));
            let doubled = aggregate(&w, 1000.0, &twice, lookup(&values));
            assert_eq!(single.value, 12.5);
            assert_eq!(single.value, doubled.value);
            assert_eq!(doubled.gate_count, 2);
        }
    }

    #[test]
    fn test_nearest_single_gate_is_exact() {
        let values = [Some(17.123_456)];
        let n = neighbors(&[(0, 333.3)]);
        let agg = aggregate(&Weighting::Nearest, 500.0, &n, lookup(&values));
        assert_eq!(agg.value, 17.123_456);
        assert_eq!(agg.gate_count, 1);
        assert_eq!(agg.nearest_distance, 333.3);
    }

    #[test]
    fn test_nearest_skips_masked() {
        let values = [None, Some(2.0), Some(3.0)];
        let n = neighbors(&[(0, 1.0), (1, 50.0), (2, 20.0)]);
        let agg = aggregate(&Weighting::Nearest, 500.0, &n, lookup(&values));
        assert_eq!(agg.value, 3.0);
    }

    #[test]
    fn test_nearest_tie_breaks_on_lowest_id() {
        let values = [Some(0.0), Some(1.0), Some(2.0), Some(3.0)];
        // ids 3 and 1 are equidistant within tolerance; 1 wins in either order
        let forward = neighbors(&[(3, 100.0), (1, 100.0 + 1e-9), (2, 150.0)]);
        let backward = neighbors(&[(2, 150.0), (1, 100.0 + 1e-9), (3, 100.0)]);
        for n in [forward, backward] {
            let agg = aggregate(&Weighting::Nearest, 500.0, &n, lookup(&values));
            assert_eq!(agg.value, 1.0);
        }
    }

    #[test]
    fn test_nearest_tie_ignores_candidate_order() {
        let values = [Some(0.0), Some(1.0), Some(2.0)];
        // id 2 is closest; ids 0 and 1 lie within tolerance of it, but
        // id 0 is 1.8e-6 from id 2 and only within tolerance of id 1
        let a = (1, 100.0);
        let b = (0, 100.0 + 0.9e-6);
        let c = (2, 100.0 - 0.9e-6);
        let orders = [[a, b, c], [c, a, b], [b, c, a], [c, b, a], [a, c, b], [b, a, c]];
        for order in orders {
            let agg = aggregate(&Weighting::Nearest, 500.0, &neighbors(&order), lookup(&values));
            assert_eq!(agg.value, 1.0, "order {order:?}");
            assert_eq!(agg.nearest_distance, 100.0);
        }
    }

    #[test]
    fn test_unbounded_inverse_distance_weight() {
        // 1e-3^-120 overflows to infinity
        let steep = Weighting::InverseDistance { power: 120.0 };
        assert!(steep.weight(0.0, 500.0).is_infinite());

        let values = [Some(25.0), Some(5.0)];
        let on_center = neighbors(&[(0, 0.0)]);
        let agg = aggregate(&steep, 500.0, &on_center, lookup(&values));
        assert_eq!(agg.value, 25.0);
        assert_eq!(agg.gate_count, 1);
        assert!(agg.has_data());

        // the coincident gate dominates a finite-weight neighbour
        let mixed = neighbors(&[(1, 400.0), (0, 0.0)]);
        let agg = aggregate(&steep, 500.0, &mixed, lookup(&values));
        assert_eq!(agg.value, 25.0);
        assert_eq!(agg.gate_count, 2);
        assert_eq!(agg.nearest_distance, 0.0);
    }
}
