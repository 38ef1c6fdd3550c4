//! Two-dimensional KD-tree over location coordinates
//!
//! Nodes live in a flat arena and refer to each other by slot. Construction
//! partitions a single permutation of location indices in place, selecting the
//! median of each index range by the level's axis, so no sub-lists are copied.
//!
//! Queries rank candidates by flat Euclidean distance in degree space (see
//! [`euclidean_degrees`]). That metric decides traversal order and pruning
//! only; callers that need real distances must recompute them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Write;

use crate::geo::euclidean_degrees;
use crate::model::{Axis, Location};

/// Errors raised by nearest-neighbor queries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KdTreeError {
    #[error("target '{id}' has non-finite coordinates ({latitude}, {longitude})")]
    NonFiniteTarget {
        id: String,
        latitude: f64,
        longitude: f64,
    },
}

/// A location found by a nearest-neighbor query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index into the slice the tree was built over
    pub index: usize,
    /// Euclidean distance in degrees (ordering heuristic, not kilometers)
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct KdNode {
    location: usize,
    axis: Axis,
    left: Option<u32>,
    right: Option<u32>,
}

/// Heap entry ordered by distance, then by location index so ties resolve
/// towards the earlier input position.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: the current worst candidate sits on top
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Balanced KD-tree borrowing the locations it indexes
#[derive(Debug)]
pub struct KdTree<'a> {
    locations: &'a [Location],
    nodes: Vec<KdNode>,
    root: Option<u32>,
}

impl<'a> KdTree<'a> {
    /// Build a tree over all `locations`
    ///
    /// Coincident points are kept as separate nodes.
    pub fn build(locations: &'a [Location]) -> Self {
        let mut order: Vec<usize> = (0..locations.len()).collect();
        let mut nodes = Vec::with_capacity(locations.len());
        let root = build_range(locations, &mut order, 0, &mut nodes);

        Self {
            locations,
            nodes,
            root,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree (0 when empty)
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.depth_from(root))
    }

    fn depth_from(&self, slot: u32) -> usize {
        let node = &self.nodes[slot as usize];
        let left = node.left.map_or(0, |l| self.depth_from(l));
        let right = node.right.map_or(0, |r| self.depth_from(r));
        1 + left.max(right)
    }

    /// Find up to `k` locations closest to `target`, nearest first
    ///
    /// The target itself (matched by id) is never returned. Asking for more
    /// neighbors than exist returns every other location.
    pub fn nearest(&self, target: &Location, k: usize) -> Result<Vec<Neighbor>, KdTreeError> {
        if !target.has_finite_coordinates() {
            return Err(KdTreeError::NonFiniteTarget {
                id: target.id().to_string(),
                latitude: target.latitude(),
                longitude: target.longitude(),
            });
        }

        let root = match self.root {
            Some(root) if k > 0 => root,
            _ => return Ok(Vec::new()),
        };

        let mut heap = BinaryHeap::with_capacity(k.min(self.nodes.len()) + 1);
        self.search(root, target, k, &mut heap);

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                index: c.index,
                distance: c.distance,
            })
            .collect())
    }

    fn search(&self, slot: u32, target: &Location, k: usize, heap: &mut BinaryHeap<Candidate>) {
        let node = self.nodes[slot as usize];
        let point = &self.locations[node.location];

        if point != target {
            heap.push(Candidate {
                distance: euclidean_degrees(target, point),
                index: node.location,
            });
            if heap.len() > k {
                heap.pop();
            }
        }

        let diff = target.coordinate(node.axis) - point.coordinate(node.axis);
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search(near, target, k, heap);
        }

        if let Some(far) = far {
            let crosses_plane = heap.peek().is_some_and(|worst| diff.abs() < worst.distance);
            if heap.len() < k || crosses_plane {
                self.search(far, target, k, heap);
            }
        }
    }

    /// Draw the tree, one node per line, left subtree first
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.render_node(root, "", false, &mut out);
        }
        out
    }

    fn render_node(&self, slot: u32, prefix: &str, is_left: bool, out: &mut String) {
        let node = &self.nodes[slot as usize];
        let location = &self.locations[node.location];
        let connector = if is_left { "├── " } else { "└── " };
        let _ = writeln!(
            out,
            "{prefix}{connector}{} ({:.4}, {:.4})",
            location.id(),
            location.latitude(),
            location.longitude()
        );

        let child_prefix = format!("{prefix}{}", if is_left { "│   " } else { "    " });
        if let Some(left) = node.left {
            self.render_node(left, &child_prefix, true, out);
        }
        if let Some(right) = node.right {
            self.render_node(right, &child_prefix, false, out);
        }
    }

    /// Check the ordering invariant of every node against its whole subtrees
    #[cfg(test)]
    fn check_invariant(&self) -> bool {
        self.nodes.iter().all(|node| {
            let split = self.locations[node.location].coordinate(node.axis);
            let left_ok = node.left.map_or(true, |l| {
                self.subtree_values(l, node.axis).iter().all(|&v| v <= split)
            });
            let right_ok = node.right.map_or(true, |r| {
                self.subtree_values(r, node.axis).iter().all(|&v| v >= split)
            });
            left_ok && right_ok
        })
    }

    #[cfg(test)]
    fn subtree_values(&self, slot: u32, axis: Axis) -> Vec<f64> {
        let node = &self.nodes[slot as usize];
        let mut values = vec![self.locations[node.location].coordinate(axis)];
        for child in [node.left, node.right].into_iter().flatten() {
            values.extend(self.subtree_values(child, axis));
        }
        values
    }
}

/// Recursively place the median of `order` as a node and build both halves
fn build_range(
    locations: &[Location],
    order: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<u32> {
    if order.is_empty() {
        return None;
    }

    let axis = Axis::for_depth(depth);
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        locations[a]
            .coordinate(axis)
            .total_cmp(&locations[b].coordinate(axis))
            .then_with(|| a.cmp(&b))
    });

    let slot = nodes.len() as u32;
    nodes.push(KdNode {
        location: order[mid],
        axis,
        left: None,
        right: None,
    });

    let (lower, rest) = order.split_at_mut(mid);
    let upper = &mut rest[1..];
    let left = build_range(locations, lower, depth + 1, nodes);
    let right = build_range(locations, upper, depth + 1, nodes);

    let node = &mut nodes[slot as usize];
    node.left = left;
    node.right = right;

    Some(slot)
}
