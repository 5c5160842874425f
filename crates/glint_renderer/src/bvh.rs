//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to their children by index. Each
//! node owns a contiguous range of the reordered object list; splitting a
//! node partitions its range in place around the midpoint of its longest
//! axis, so every object ends up in exactly one leaf.
//!
//! The hierarchy only knows about object bounds. Intersection calls back
//! into the owner through a closure with the object's original index.

use glint_math::{Aabb, DVec3, Interval, Ray};

/// Default maximum objects per leaf node before splitting.
pub const DEFAULT_LEAF_SIZE: usize = 1;

/// How internal nodes visit their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Left then right, with the right child limited to the closest hit so far.
    #[default]
    Unordered,
    /// Nearer child box first; the farther child is skipped when its entry
    /// distance is beyond the closest hit.
    NearestFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of a hierarchy built over no objects
    Empty,
    /// Objects `first..first + count` of the reordered list
    Leaf { first: usize, count: usize },
    /// Arena indices of the two children
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub kind: NodeKind,
}

/// Per-object record the hierarchy is built over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhObject {
    /// Index into the owner's object list
    pub index: usize,
    pub bounds: Aabb,
    pub centroid: DVec3,
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    objects: Vec<BvhObject>,
    leaf_size: usize,
}

impl Bvh {
    /// Build a hierarchy over the given object bounds.
    ///
    /// Nodes holding at most `leaf_size` objects stay leaves (a size of 0 is
    /// read as 1). A split that would leave one side empty also stops.
    pub fn build(bounds: &[Aabb], leaf_size: usize) -> Self {
        let objects: Vec<BvhObject> = bounds
            .iter()
            .enumerate()
            .map(|(index, b)| BvhObject {
                index,
                bounds: *b,
                centroid: b.centroid(),
            })
            .collect();

        let n = objects.len();
        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * n.max(1) - 1),
            objects,
            leaf_size: leaf_size.max(1),
        };

        if n == 0 {
            bvh.nodes.push(BvhNode {
                bounds: Aabb::EMPTY,
                kind: NodeKind::Empty,
            });
            return bvh;
        }

        bvh.nodes.push(BvhNode {
            bounds: Aabb::EMPTY,
            kind: NodeKind::Leaf { first: 0, count: n },
        });
        bvh.update_node_bounds(0);
        bvh.subdivide(0);

        log::debug!(
            "BVH built: {} objects, {} nodes, leaf size {}",
            n,
            bvh.nodes.len(),
            bvh.leaf_size
        );
        bvh
    }

    fn update_node_bounds(&mut self, idx: usize) {
        let NodeKind::Leaf { first, count } = self.nodes[idx].kind else {
            return;
        };
        let bounds = self.objects[first..first + count]
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounds));
        self.nodes[idx].bounds = bounds;
    }

    fn subdivide(&mut self, idx: usize) {
        let node = self.nodes[idx];
        let NodeKind::Leaf { first, count } = node.kind else {
            return;
        };
        if count <= self.leaf_size {
            return;
        }

        let axis = node.bounds.longest_axis();
        let split = node.bounds.min[axis] + node.bounds.extent()[axis] * 0.5;

        // Two-pointer partition: centroids strictly below the split go left
        let mut i = first;
        let mut j = first + count;
        while i < j {
            if self.objects[i].centroid[axis] < split {
                i += 1;
            } else {
                j -= 1;
                self.objects.swap(i, j);
            }
        }

        let left_count = i - first;
        if left_count == 0 || left_count == count {
            return;
        }

        let left = self.nodes.len();
        let right = left + 1;
        self.nodes.push(BvhNode {
            bounds: Aabb::EMPTY,
            kind: NodeKind::Leaf {
                first,
                count: left_count,
            },
        });
        self.nodes.push(BvhNode {
            bounds: Aabb::EMPTY,
            kind: NodeKind::Leaf {
                first: i,
                count: count - left_count,
            },
        });
        self.nodes[idx].kind = NodeKind::Internal { left, right };

        self.update_node_bounds(left);
        self.update_node_bounds(right);
        self.subdivide(left);
        self.subdivide(right);
    }

    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Objects in leaf order.
    pub fn objects(&self) -> &[BvhObject] {
        &self.objects
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn bounds(&self) -> Aabb {
        self.root().bounds
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Original indices of the objects held by a leaf node.
    pub fn leaf_objects(&self, node: &BvhNode) -> impl Iterator<Item = usize> + '_ {
        let range = match node.kind {
            NodeKind::Leaf { first, count } => first..first + count,
            _ => 0..0,
        };
        self.objects[range].iter().map(|o| o.index)
    }

    /// Find the closest object hit along `ray` within `ray_t`.
    ///
    /// `test` is called with an object index and the interval still worth
    /// searching. It must return `Some(t)` only for a hit inside that
    /// interval, having recorded whatever it needs. Intervals only shrink,
    /// so the last accepted hit is the closest one.
    pub fn intersect<F>(&self, ray: &Ray, ray_t: Interval, order: TraversalOrder, test: &mut F) -> Option<f64>
    where
        F: FnMut(usize, Interval) -> Option<f64>,
    {
        if self.is_empty() {
            return None;
        }
        match order {
            TraversalOrder::Unordered => self.intersect_unordered(0, ray, ray_t, test),
            TraversalOrder::NearestFirst => {
                let entry = self.nodes[0].bounds.intersect(ray)?.0;
                self.intersect_nearest(0, entry, ray, ray_t, test)
            }
        }
    }

    fn intersect_leaf<F>(&self, first: usize, count: usize, ray_t: Interval, test: &mut F) -> Option<f64>
    where
        F: FnMut(usize, Interval) -> Option<f64>,
    {
        let mut closest = None;
        let mut interval = ray_t;
        for object in &self.objects[first..first + count] {
            if let Some(t) = test(object.index, interval) {
                closest = Some(t);
                interval = interval.with_max(t);
            }
        }
        closest
    }

    fn intersect_unordered<F>(&self, idx: usize, ray: &Ray, ray_t: Interval, test: &mut F) -> Option<f64>
    where
        F: FnMut(usize, Interval) -> Option<f64>,
    {
        let node = &self.nodes[idx];
        if !node.bounds.hit(ray, ray_t) {
            return None;
        }

        match node.kind {
            NodeKind::Empty => None,
            NodeKind::Leaf { first, count } => self.intersect_leaf(first, count, ray_t, test),
            NodeKind::Internal { left, right } => {
                let hit_left = self.intersect_unordered(left, ray, ray_t, test);

                // Only check right up to closest hit
                let right_t = hit_left.map_or(ray_t, |t| ray_t.with_max(t));
                let hit_right = self.intersect_unordered(right, ray, right_t, test);

                hit_right.or(hit_left)
            }
        }
    }

    fn intersect_nearest<F>(
        &self,
        idx: usize,
        entry: f64,
        ray: &Ray,
        ray_t: Interval,
        test: &mut F,
    ) -> Option<f64>
    where
        F: FnMut(usize, Interval) -> Option<f64>,
    {
        if entry > ray_t.max {
            return None;
        }

        match self.nodes[idx].kind {
            NodeKind::Empty => None,
            NodeKind::Leaf { first, count } => self.intersect_leaf(first, count, ray_t, test),
            NodeKind::Internal { left, right } => {
                let left_entry = self.entry_distance(left, ray, ray_t);
                let right_entry = self.entry_distance(right, ray, ray_t);

                let mut children = [(left, left_entry), (right, right_entry)];
                if right_entry < left_entry {
                    children.swap(0, 1);
                }

                let mut closest = None;
                let mut interval = ray_t;
                for (child, child_entry) in children {
                    let Some(child_entry) = child_entry else {
                        continue;
                    };
                    if let Some(t) = self.intersect_nearest(child, child_entry, ray, interval, test) {
                        closest = Some(t);
                        interval = interval.with_max(t);
                    }
                }
                closest
            }
        }
    }

    /// Entry distance of a node's box, or `None` if the ray misses it within `ray_t`.
    fn entry_distance(&self, idx: usize, ray: &Ray, ray_t: Interval) -> Option<f64> {
        let bounds = &self.nodes[idx].bounds;
        if !bounds.hit(ray, ray_t) {
            return None;
        }
        bounds.intersect(ray).map(|(tmin, _)| tmin)
    }
}
