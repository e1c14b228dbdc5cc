// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f, FLOAT_MAX };
use crate::math::ray::Ray3f;

use std::cmp::Ordering;

#[derive(Clone)]
struct BVHNode {
    bounds: AABB,
    left: usize,
    right: usize,
    start: usize,
    count: usize,
}

impl BVHNode {
    fn leaf(bounds: AABB, start: usize, count: usize) -> Self {
        Self { bounds, left: 0, right: 0, start, count }
    }

    fn interior(bounds: AABB, left: usize, right: usize) -> Self {
        Self { bounds, left, right, start: 0, count: 0 }
    }

    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Bounding volume hierarchy over opaque primitives.
///
/// Only bounds and centroids are stored; primitive tests are delegated to
/// the caller through closures. Nodes split at the centroid median of the
/// widest axis. The tree is immutable once built.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>) -> Self {
        Self::with_max_leaf_size(prim_bounds, 1)
    }

    pub fn with_max_leaf_size(prim_bounds: Vec<AABB>, max_leaf_size: usize) -> Self {
        let prim_centroids = prim_bounds.iter().map(|b| b.center()).collect();
        let mut bvh = Self {
            indices: (0..prim_bounds.len()).collect(),
            nodes: Vec::with_capacity(2 * prim_bounds.len()),
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
        };

        if !bvh.indices.is_empty() {
            bvh.build(0, bvh.indices.len());
        }

        bvh
    }

    pub fn len(&self) -> usize {
        self.prim_bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prim_bounds.is_empty()
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| n.bounds).unwrap_or_default()
    }

    /// Nearest hit over all primitives. `hit_fn` returns the primitive's
    /// own hit record and its distance along the ray.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest: Option<(usize, T)> = None;
        let mut closest_t = FLOAT_MAX;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.ray_intersect(ray, closest_t) {
                continue;
            }

            if node.is_leaf() {
                for &prim_idx in &self.indices[node.start..node.start + node.count] {
                    if let Some((hit, t)) = hit_fn(prim_idx, ray) {
                        if t < closest_t {
                            closest_t = t;
                            closest = Some((prim_idx, hit));
                        }
                    }
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }

        closest
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_centroids[idx]);
        }

        let count = end - start;
        let node_idx = self.nodes.len();
        if count <= self.max_leaf_size {
            self.nodes.push(BVHNode::leaf(bounds, start, count));
            return node_idx;
        }

        let axis = centroid_bounds.max_extent();
        let centroids = &self.prim_centroids;
        self.indices[start..end].sort_by(|a, b| {
            centroids[*a][axis]
                .partial_cmp(&centroids[*b][axis])
                .unwrap_or(Ordering::Equal)
        });

        // Reserve the slot so the root stays at index 0.
        self.nodes.push(BVHNode::leaf(bounds, start, count));
        let mid = start + count / 2;
        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[node_idx] = BVHNode::interior(bounds, left, right);
        node_idx
    }
}
