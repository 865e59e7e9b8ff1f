//! Quadtree spatial partitioning structure
//!
//! Efficiently divides 2D space into hierarchical regions for fast range
//! queries. Each node subdivides into 4 quadrants when its entry count
//! exceeds a threshold. An entry lives in the deepest node whose bounds
//! fully contain its box; boxes straddling a split line stay in the parent,
//! and boxes outside the world bounds stay in the root.

use crate::ecs::EntityId;
use crate::spatial::{Aabb, SpatialIndex, SpatialIndexError};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for quadtree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Maximum entries per node before subdivision
    pub max_entries_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f64,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_entries_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Entity stored in the quadtree with the box it was registered with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadtreeEntry {
    /// Registered entity
    pub id: EntityId,
    /// Box at registration time
    pub aabb: Aabb,
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadtreeNode {
    /// World-space bounds of this node
    pub bounds: Aabb,

    /// Entries stored at this node
    pub entries: Vec<QuadtreeEntry>,

    /// Child nodes (4 quadrants), None if this is a leaf
    pub children: Option<Box<[QuadtreeNode; 4]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl QuadtreeNode {
    /// Create a new leaf node
    pub const fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Quadrant (0-3) whose bounds fully contain `aabb`, if any
    ///
    /// Quadrant layout:
    /// 0: -X, -Y
    /// 1: +X, -Y
    /// 2: -X, +Y
    /// 3: +X, +Y
    fn quadrant_for(&self, aabb: &Aabb) -> Option<usize> {
        if !self.bounds.contains(aabb) {
            return None;
        }

        let center = self.bounds.center();
        let x_bit = if aabb.max_x() <= center.x {
            0
        } else if aabb.min_x() >= center.x {
            1
        } else {
            return None;
        };
        let y_bit = if aabb.max_y() <= center.y {
            0
        } else if aabb.min_y() >= center.y {
            1
        } else {
            return None;
        };

        Some((y_bit << 1) | x_bit)
    }

    /// Subdivide this node into 4 children and push down every entry that
    /// fits entirely inside one of them
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let center = self.bounds.center();
        let (min, max) = (self.bounds.min(), self.bounds.max());
        let depth = self.depth + 1;
        let z = self.bounds.min_z();

        let mut children = Box::new([
            Self::new(Aabb::new(min.x, min.y, z, center.x, center.y), depth),
            Self::new(Aabb::new(center.x, min.y, z, max.x, center.y), depth),
            Self::new(Aabb::new(min.x, center.y, z, center.x, max.y), depth),
            Self::new(Aabb::new(center.x, center.y, z, max.x, max.y), depth),
        ]);

        let entries = std::mem::take(&mut self.entries);
        for entry in entries {
            match self.quadrant_for(&entry.aabb) {
                Some(quadrant) => children[quadrant].entries.push(entry),
                None => self.entries.push(entry),
            }
        }

        self.children = Some(children);
    }

    /// Insert an entry into this node or the deepest child that contains it
    pub fn insert(&mut self, entry: QuadtreeEntry, config: &QuadtreeConfig) {
        if self.is_leaf() {
            let should_subdivide = self.entries.len() >= config.max_entries_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;

            if should_subdivide {
                trace!("Quadtree: subdividing node at depth {}", self.depth);
                self.subdivide();
            }
        }

        let quadrant = self.quadrant_for(&entry.aabb);
        match (quadrant, self.children.as_mut()) {
            (Some(quadrant), Some(children)) => children[quadrant].insert(entry, config),
            _ => self.entries.push(entry),
        }
    }

    /// Remove an entry, following the containment path of its box
    pub fn remove(&mut self, id: EntityId, aabb: &Aabb) -> bool {
        if let Some(index) = self.entries.iter().position(|e| e.id == id) {
            self.entries.swap_remove(index);
            return true;
        }

        let quadrant = self.quadrant_for(aabb);
        match (quadrant, self.children.as_mut()) {
            (Some(quadrant), Some(children)) => children[quadrant].remove(id, aabb),
            _ => false,
        }
    }

    /// Collect every entry whose box intersects `region`
    pub fn query_range(&self, region: &Aabb, results: &mut Vec<EntityId>) {
        results.extend(
            self.entries
                .iter()
                .filter(|entry| entry.aabb.intersects(region))
                .map(|entry| entry.id),
        );

        if let Some(ref children) = self.children {
            for child in children.iter() {
                // Children only hold boxes inside their bounds
                if child.bounds.intersects(region) {
                    child.query_range(region, results);
                }
            }
        }
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a Self>) {
        if self.is_leaf() {
            leaves.push(self);
        } else if let Some(ref children) = self.children {
            for child in children.iter() {
                child.get_all_leaves(leaves);
            }
        }
    }

    /// Deepest level reached below this node
    pub fn max_depth(&self) -> u32 {
        self.children.as_ref().map_or(self.depth, |children| {
            children.iter().map(Self::max_depth).max().unwrap_or(self.depth)
        })
    }

    /// Count total entries in this node and all children
    pub fn count_entries(&self) -> usize {
        let mut count = self.entries.len();

        if let Some(ref children) = self.children {
            for child in children.iter() {
                count += child.count_entries();
            }
        }

        count
    }
}

/// Quadtree-backed [`SpatialIndex`]
#[derive(Debug, Clone)]
pub struct Quadtree {
    /// Root node containing the entire world space
    pub root: QuadtreeNode,

    /// Configuration
    config: QuadtreeConfig,

    /// Registered box per entity; drives removal and membership checks
    locations: HashMap<EntityId, Aabb>,
}

impl Quadtree {
    /// Create a new quadtree with given world bounds
    pub fn new(world_bounds: Aabb, config: QuadtreeConfig) -> Self {
        Self {
            root: QuadtreeNode::new(world_bounds, 0),
            config,
            locations: HashMap::new(),
        }
    }

    /// Configuration the tree was built with
    pub const fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves(&self) -> Vec<&QuadtreeNode> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }

    /// Number of leaf nodes
    pub fn leaf_count(&self) -> usize {
        self.get_all_leaves().len()
    }

    /// Deepest subdivision level
    pub fn depth(&self) -> u32 {
        self.root.max_depth()
    }

    /// Get total entry count by walking the tree
    pub fn entity_count(&self) -> usize {
        self.root.count_entries()
    }
}

impl SpatialIndex for Quadtree {
    fn add(&mut self, entity: EntityId, aabb: Aabb) -> Result<(), SpatialIndexError> {
        if self.locations.contains_key(&entity) {
            return Err(SpatialIndexError::AlreadyPresent(entity));
        }

        self.root.insert(QuadtreeEntry { id: entity, aabb }, &self.config);
        self.locations.insert(entity, aabb);
        Ok(())
    }

    fn remove(&mut self, entity: EntityId) -> Result<(), SpatialIndexError> {
        let aabb = self
            .locations
            .remove(&entity)
            .ok_or(SpatialIndexError::NotPresent(entity))?;

        if self.root.remove(entity, &aabb) {
            Ok(())
        } else {
            Err(SpatialIndexError::NotPresent(entity))
        }
    }

    fn query_range(&self, region: &Aabb) -> Vec<EntityId> {
        let mut results = Vec::new();
        self.root.query_range(region, &mut results);
        results
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    fn aabb_of(&self, entity: EntityId) -> Option<Aabb> {
        self.locations.get(&entity).copied()
    }

    fn len(&self) -> usize {
        self.locations.len()
    }

    fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds, 0);
        self.locations.clear();
    }
}
