//! Radius queries over atom positions: a k-d tree built over the outer
//! candidate set, queried once per inner atom.

use rayon::prelude::*;
use slog::{debug, Logger};

use crate::atom::{AtomPool, AtomSet};
use crate::config::Config;

#[inline]
fn distance_squared(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[derive(Debug)]
struct KdNode {
    point: usize,
    split_dim: usize,
    split_value: f64,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

/// Static k-d tree over a set of points. Query results are indices into the
/// point list the index was built from.
#[derive(Debug)]
pub struct SpatialIndex {
    root: Option<Box<KdNode>>,
    coords: Vec<[f64; 3]>,
}

impl SpatialIndex {
    pub fn new(coords: Vec<[f64; 3]>) -> Self {
        let mut indices: Vec<usize> = (0..coords.len()).collect();
        let root = Self::build(&coords, &mut indices, 0);
        Self { root, coords }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Median split, cycling through x, y, z with depth.
    fn build(coords: &[[f64; 3]], indices: &mut [usize], depth: usize) -> Option<Box<KdNode>> {
        if indices.is_empty() {
            return None;
        }
        let split_dim = depth % 3;
        indices.sort_unstable_by(|&a, &b| coords[a][split_dim].total_cmp(&coords[b][split_dim]));

        let median = indices.len() / 2;
        let point = indices[median];
        let (left, rest) = indices.split_at_mut(median);
        let right = &mut rest[1..];

        Some(Box::new(KdNode {
            point,
            split_dim,
            split_value: coords[point][split_dim],
            left: Self::build(coords, left, depth + 1),
            right: Self::build(coords, right, depth + 1),
        }))
    }

    /// Collect every point at distance `<= radius` from `target` into
    /// `result`, which is cleared first.
    pub fn query_radius_into(&self, target: &[f64; 3], radius: f64, result: &mut Vec<usize>) {
        result.clear();
        if let Some(root) = &self.root {
            self.query(root, target, radius * radius, result);
        }
    }

    fn query(&self, node: &KdNode, target: &[f64; 3], radius_sq: f64, result: &mut Vec<usize>) {
        if distance_squared(&self.coords[node.point], target) <= radius_sq {
            result.push(node.point);
        }

        let diff = target[node.split_dim] - node.split_value;
        let (near, far) = if diff < 0.0 {
            (&node.left, &node.right)
        } else {
            (&node.right, &node.left)
        };
        if let Some(near) = near {
            self.query(near, target, radius_sq, result);
        }
        if diff * diff <= radius_sq {
            if let Some(far) = far {
                self.query(far, target, radius_sq, result);
            }
        }
    }
}

/// Atoms of `outer` within `radius` of at least one atom of `inner`.
///
/// Nothing is selected (and no index is built) when `inner` is empty or the
/// radius is below [`Config::min_radius`].
pub fn within_radius(
    logger: &Logger,
    config: &Config,
    pool: &AtomPool,
    outer: &AtomSet,
    inner: &AtomSet,
    radius: f64,
) -> AtomSet {
    // written negated so that a NaN radius selects nothing
    if inner.is_empty() || outer.is_empty() || !(radius >= config.min_radius) {
        return AtomSet::new();
    }

    let outer: Vec<usize> = outer.iter().copied().collect();
    let index = SpatialIndex::new(outer.iter().map(|&i| pool.atom(i).position).collect());
    let queries: Vec<[f64; 3]> = inner.iter().map(|&i| pool.atom(i).position).collect();
    let capacity = config.neighbor_capacity(radius).min(index.len());
    let parallel = queries.len() >= config.parallel_threshold;

    debug!(logger, "spatial index built";
        "points" => index.len(), "queries" => queries.len(),
        "radius" => radius, "parallel" => parallel);

    let search = |(mut buffer, mut hits): (Vec<usize>, AtomSet), target: &[f64; 3]| {
        index.query_radius_into(target, radius, &mut buffer);
        hits.extend(buffer.iter().map(|&hit| outer[hit]));
        (buffer, hits)
    };

    if parallel {
        queries
            .par_iter()
            .fold(|| (Vec::with_capacity(capacity), AtomSet::new()), search)
            .map(|(_, hits)| hits)
            .reduce(AtomSet::new, |mut a, b| {
                a.extend(b);
                a
            })
    } else {
        queries
            .iter()
            .fold((Vec::with_capacity(capacity), AtomSet::new()), search)
            .1
    }
}

/// Atoms of `candidates` within `radius` of a fixed point.
pub fn in_sphere(
    config: &Config,
    pool: &AtomPool,
    candidates: &AtomSet,
    center: &[f64; 3],
    radius: f64,
) -> AtomSet {
    if !(radius >= config.min_radius) {
        return AtomSet::new();
    }
    let radius_sq = radius * radius;
    candidates
        .iter()
        .copied()
        .filter(|&i| distance_squared(&pool.atom(i).position, center) <= radius_sq)
        .collect()
}
