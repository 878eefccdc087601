//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over axis-aligned boxes, built once by median splits along a
//! randomly chosen axis and never modified afterwards.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use lumen_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use thiserror::Error;

/// Errors raised while building a BVH.
#[derive(Debug, Error)]
pub enum BvhError {
    #[error("cannot build a BVH over an empty object list")]
    Empty,

    #[error("object {index} has no bounding box and cannot be placed in a BVH")]
    Unbounded { index: usize },
}

type Entry = (Arc<dyn Hittable>, Aabb);

/// BVH node - either a branch with two subtrees or a leaf with one or two
/// primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node. A single primitive occupies both sides.
    Leaf {
        left: Arc<dyn Hittable>,
        right: Arc<dyn Hittable>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Build a BVH over `objects`, bounding moving geometry over `time`.
    ///
    /// Every object must report a bounding box; the first one that does not
    /// aborts the build.
    pub fn new(
        objects: Vec<Box<dyn Hittable>>,
        time: Interval,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BvhError> {
        let count = objects.len();
        let entries = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| {
                let bbox = object
                    .bounding_box(time)
                    .ok_or(BvhError::Unbounded { index })?;
                Ok((Arc::from(object), bbox))
            })
            .collect::<Result<Vec<Entry>, BvhError>>()?;

        let root = Self::build(entries, rng)?;
        log::info!("Built BVH over {} objects, depth {}", count, root.depth());
        Ok(root)
    }

    /// Recursive median split.
    fn build(mut entries: Vec<Entry>, rng: &mut dyn RngCore) -> Result<Self, BvhError> {
        let axis = rng.gen_range(0..3);
        entries.sort_by(|(_, a), (_, b)| {
            a.axis_interval(axis)
                .min
                .partial_cmp(&b.axis_interval(axis).min)
                .unwrap_or(Ordering::Equal)
        });

        let n = entries.len();
        if n > 2 {
            let right_entries = entries.split_off(n / 2);
            let left = Self::build(entries, rng)?;
            let right = Self::build(right_entries, rng)?;
            let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());
            return Ok(BvhNode::Branch {
                left: Box::new(left),
                right: Box::new(right),
                bbox,
            });
        }

        match <[Entry; 2]>::try_from(entries) {
            Ok([(left, left_box), (right, right_box)]) => Ok(BvhNode::Leaf {
                left,
                right,
                bbox: Aabb::surrounding(&left_box, &right_box),
            }),
            Err(mut rest) => {
                let (object, bbox) = rest.pop().ok_or(BvhError::Empty)?;
                Ok(BvhNode::Leaf {
                    left: Arc::clone(&object),
                    right: object,
                    bbox,
                })
            }
        }
    }

    /// Box surrounding everything under this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Number of levels, counting leaves as one.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of distinct primitives stored.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Leaf { left, right, .. } => {
                if Arc::ptr_eq(left, right) {
                    1
                } else {
                    2
                }
            }
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    /// Always false: a BVH holds at least one primitive.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Keep the hit nearer along the ray.
#[inline]
fn closer<'a>(a: Option<HitRecord<'a>>, b: Option<HitRecord<'a>>) -> Option<HitRecord<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox().hit(ray, ray_t) {
            return None;
        }

        match self {
            BvhNode::Leaf { left, right, .. } => {
                let hit_left = left.hit(ray, ray_t, rng);
                if Arc::ptr_eq(left, right) {
                    return hit_left;
                }
                closer(hit_left, right.hit(ray, ray_t, rng))
            }
            BvhNode::Branch { left, right, .. } => {
                closer(left.hit(ray, ray_t, rng), right.hit(ray, ray_t, rng))
            }
        }
    }

    fn bounding_box(&self, _time: Interval) -> Option<Aabb> {
        Some(self.bbox())
    }
}
