//! Spatial index over gate positions.
//!
//! A balanced 3-D kd-tree stored implicitly: the points are permuted so that
//! the node covering `points[lo..hi]` sits at the midpoint `lo + (hi - lo) / 2`,
//! with its left subtree below and right subtree above. Each node splits on
//! the axis with the widest spread of its subtree, which copes well with the
//! long thin point clouds produced by low-elevation radar sweeps.
//!
//! The index is immutable after [`SpatialIndex::build`] and is shared across
//! worker threads without synchronization.

/// A point found by a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the slice the index was built from.
    pub id: usize,
    /// Euclidean distance to the query center.
    pub distance: f64,
}

/// Immutable kd-tree supporting inclusive radius queries.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    points: Vec<[f64; 3]>,
    ids: Vec<usize>,
    axes: Vec<u8>,
}

impl SpatialIndex {
    /// Build an index over `points`; query results refer to slice positions.
    ///
    /// Expected O(n log n): each level does one linear-time median selection
    /// per node.
    pub fn build(points: &[[f64; 3]]) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut axes = vec![0u8; points.len()];
        build_subtree(points, &mut order, &mut axes);

        Self {
            points: order.iter().map(|&i| points[i]).collect(),
            ids: order,
            axes,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points with `distance <= radius` from `center`, in no particular order.
    pub fn query_radius(&self, center: [f64; 3], radius: f64) -> Vec<Neighbor> {
        let mut out = Vec::new();
        self.query_radius_into(center, radius, &mut out);
        out
    }

    /// Like [`SpatialIndex::query_radius`] but reuses `out`, which is cleared first.
    pub fn query_radius_into(&self, center: [f64; 3], radius: f64, out: &mut Vec<Neighbor>) {
        out.clear();
        if self.points.is_empty()
            || radius.is_nan()
            || radius < 0.0
            || !center.iter().all(|c| c.is_finite())
        {
            return;
        }
        self.search(0, self.points.len(), &center, radius * radius, out);
    }

    fn search(&self, lo: usize, hi: usize, center: &[f64; 3], r2: f64, out: &mut Vec<Neighbor>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let p = &self.points[mid];

        let d2 = distance_squared(p, center);
        if d2 <= r2 {
            out.push(Neighbor {
                id: self.ids[mid],
                distance: d2.sqrt(),
            });
        }

        let axis = self.axes[mid] as usize;
        let delta = center[axis] - p[axis];
        let cross = delta * delta <= r2;

        // Left subtree holds coordinates <= the split value, right >= it.
        if delta <= 0.0 {
            self.search(lo, mid, center, r2, out);
            if cross {
                self.search(mid + 1, hi, center, r2, out);
            }
        } else {
            self.search(mid + 1, hi, center, r2, out);
            if cross {
                self.search(lo, mid, center, r2, out);
            }
        }
    }
}

fn build_subtree(points: &[[f64; 3]], order: &mut [usize], axes: &mut [u8]) {
    if order.is_empty() {
        return;
    }

    let axis = widest_axis(points, order);
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));
    axes[mid] = axis as u8;

    let (left, rest) = order.split_at_mut(mid);
    let (left_axes, rest_axes) = axes.split_at_mut(mid);
    build_subtree(points, left, left_axes);
    build_subtree(points, &mut rest[1..], &mut rest_axes[1..]);
}

fn widest_axis(points: &[[f64; 3]], order: &[usize]) -> usize {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for &i in order {
        for axis in 0..3 {
            min[axis] = min[axis].min(points[i][axis]);
            max[axis] = max[axis].max(points[i][axis]);
        }
    }

    (0..3)
        .max_by(|&a, &b| (max[a] - min[a]).total_cmp(&(max[b] - min[b])))
        .unwrap_or(0)
}

#[inline]
fn distance_squared(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<[f64; 3]> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                [
                    rng.gen_range(-50_000.0..50_000.0),
                    rng.gen_range(-50_000.0..50_000.0),
                    rng.gen_range(0.0..5_000.0),
                ]
            })
            .collect()
    }

    fn brute_force(points: &[[f64; 3]], center: [f64; 3], radius: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| distance_squared(p, &center) <= radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

    fn sorted_ids(neighbors: &[Neighbor]) -> Vec<usize> {
        let mut ids: Vec<usize> = neighbors.iter().map(|n| n.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.query_radius([0.0, 0.0, 0.0], 1e9).is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let points = random_points(5_000, 7);
        let index = SpatialIndex::build(&points);
        assert_eq!(index.len(), points.len());

        let centers = random_points(200, 11);
        for (i, center) in centers.into_iter().enumerate() {
            let radius = 500.0 + (i as f64) * 40.0;
            let found = index.query_radius(center, radius);
            assert_eq!(sorted_ids(&found), brute_force(&points, center, radius));
        }
    }

    #[test]
    fn test_distances_reported() {
        let points = vec![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0], [0.0, 0.0, 12.0]];
        let index = SpatialIndex::build(&points);
        let mut found = index.query_radius([0.0, 0.0, 0.0], 10.0);
        found.sort_by_key(|n| n.id);
        assert_eq!(
            found,
            vec![
                Neighbor { id: 0, distance: 0.0 },
                Neighbor { id: 1, distance: 5.0 },
            ]
        );
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let points = vec![[100.0, 0.0, 0.0], [0.0, -100.0, 0.0], [0.0, 0.0, 100.000001]];
        let index = SpatialIndex::build(&points);
        let found = index.query_radius([0.0, 0.0, 0.0], 100.0);
        assert_eq!(sorted_ids(&found), vec![0, 1]);
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![[1.0, 1.0, 1.0]; 10];
        let index = SpatialIndex::build(&points);
        let found = index.query_radius([1.0, 1.0, 1.0], 0.0);
        assert_eq!(sorted_ids(&found), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_queries_return_nothing() {
        let index = SpatialIndex::build(&random_points(100, 3));
        assert!(index.query_radius([0.0, 0.0, 0.0], -1.0).is_empty());
        assert!(index.query_radius([0.0, 0.0, 0.0], f64::NAN).is_empty());
        assert!(index.query_radius([f64::NAN, 0.0, 0.0], 1e9).is_empty());
    }

    #[test]
    fn test_query_into_reuses_buffer() {
        let points = random_points(1_000, 5);
        let index = SpatialIndex::build(&points);
        let mut buf = Vec::new();
        index.query_radius_into([0.0, 0.0, 2_500.0], 10_000.0, &mut buf);
        let first = buf.len();
        index.query_radius_into([1e7, 1e7, 0.0], 10.0, &mut buf);
        assert!(first > 0);
        assert!(buf.is_empty());
    }
}
