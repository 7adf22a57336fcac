// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate spaces: mapping scene coordinates into node-local ones.
//!
//! Touches arrive in scene coordinates. Hosts that want locations, translations
//! or velocities relative to a node supply a [`CoordinateSpace`] that knows each
//! node's node-to-scene transform. [`SceneSpace`] treats every node as sharing
//! the scene's coordinates; [`NodeTransforms`] stores explicit transforms.

use alloc::collections::BTreeMap;
use kurbo::{Affine, Point, Vec2};

/// Source of node-to-scene transforms.
pub trait CoordinateSpace<K> {
    /// Transform from `node`'s local coordinates to scene coordinates, or
    /// `None` if the node has no transform (identity).
    fn node_to_scene(&self, node: &K) -> Option<Affine>;

    /// Converts a scene-space point into `node`'s coordinates.
    fn point_in(&self, point: Point, node: &K) -> Point {
        match self.node_to_scene(node) {
            Some(tf) => tf.inverse() * point,
            None => point,
        }
    }

    /// Converts a scene-space vector into `node`'s coordinates.
    ///
    /// Only the linear part of the transform applies to vectors.
    fn vector_in(&self, vector: Vec2, node: &K) -> Vec2 {
        match self.node_to_scene(node) {
            Some(tf) => linear(tf.inverse(), vector),
            None => vector,
        }
    }

    /// Converts a vector in `node`'s coordinates into scene space.
    fn vector_to_scene(&self, vector: Vec2, node: &K) -> Vec2 {
        match self.node_to_scene(node) {
            Some(tf) => linear(tf, vector),
            None => vector,
        }
    }
}

fn linear(tf: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = tf.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

/// A space in which every node uses scene coordinates.
#[derive(Copy, Clone, Debug, Default)]
pub struct SceneSpace;

impl<K> CoordinateSpace<K> for SceneSpace {
    fn node_to_scene(&self, _node: &K) -> Option<Affine> {
        None
    }
}

/// Explicit per-node transforms. Nodes without an entry use scene coordinates.
#[derive(Clone, Debug)]
pub struct NodeTransforms<K> {
    transforms: BTreeMap<K, Affine>,
}

impl<K> Default for NodeTransforms<K> {
    fn default() -> Self {
        Self {
            transforms: BTreeMap::new(),
        }
    }
}

impl<K: Ord> NodeTransforms<K> {
    /// Creates an empty set of transforms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node-to-scene transform for `node`.
    pub fn set(&mut self, node: K, node_to_scene: Affine) {
        self.transforms.insert(node, node_to_scene);
    }

    /// Removes `node`'s transform, returning it if present.
    pub fn remove(&mut self, node: &K) -> Option<Affine> {
        self.transforms.remove(node)
    }
}

impl<K: Ord> CoordinateSpace<K> for NodeTransforms<K> {
    fn node_to_scene(&self, node: &K) -> Option<Affine> {
        self.transforms.get(node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_space_is_identity() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(CoordinateSpace::<u32>::point_in(&SceneSpace, p, &7), p);
        assert_eq!(
            CoordinateSpace::<u32>::vector_in(&SceneSpace, Vec2::new(1.0, 2.0), &7),
            Vec2::new(1.0, 2.0)
        );
    }

    #[test]
    fn translation_moves_points_but_not_vectors() {
        let mut space = NodeTransforms::new();
        space.set(1_u32, Affine::translate(Vec2::new(100.0, 50.0)));
        assert_eq!(
            space.point_in(Point::new(110.0, 60.0), &1),
            Point::new(10.0, 10.0)
        );
        assert_eq!(space.vector_in(Vec2::new(5.0, 5.0), &1), Vec2::new(5.0, 5.0));
        // Unknown node falls back to scene coordinates.
        assert_eq!(space.point_in(Point::new(1.0, 1.0), &2), Point::new(1.0, 1.0));
    }

    #[test]
    fn scale_applies_to_vectors() {
        let mut space = NodeTransforms::new();
        space.set(1_u32, Affine::scale(2.0));
        assert_eq!(space.vector_in(Vec2::new(8.0, -4.0), &1), Vec2::new(4.0, -2.0));
        assert_eq!(
            space.vector_to_scene(Vec2::new(4.0, -2.0), &1),
            Vec2::new(8.0, -4.0)
        );
        assert_eq!(space.remove(&1), Some(Affine::scale(2.0)));
        assert_eq!(space.vector_in(Vec2::new(8.0, -4.0), &1), Vec2::new(8.0, -4.0));
    }
}
