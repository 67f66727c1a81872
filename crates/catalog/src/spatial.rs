//! In-memory R*-tree over product bounding boxes.
//!
//! The persisted `bbox_index` table is the source of truth; this tree is
//! bulk-loaded from it when the store opens and kept in step with every
//! committed write. Envelopes hold the exact `f64` coordinates, so overlap
//! queries have neither false negatives nor false positives.

use eocat_core::{BoundingBox, ProductId};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// Entry stored inside the R-tree. Points are `[lat, lon]`.
#[derive(Debug, Clone)]
struct IndexedBox {
    product_id: ProductId,
    bbox: BoundingBox,
}

impl PartialEq for IndexedBox {
    fn eq(&self, other: &Self) -> bool {
        self.product_id == other.product_id
    }
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bbox)
    }
}

fn envelope_of(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [bbox.lat_min(), bbox.lon_min()],
        [bbox.lat_max(), bbox.lon_max()],
    )
}

/// Bounding-box index keyed by product id.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    tree: RTree<IndexedBox>,
    /// Cached entries for updates and removals
    entries: HashMap<ProductId, IndexedBox>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a balanced tree from existing entries. Later duplicates of a
    /// product id replace earlier ones.
    pub fn bulk_load(entries: impl IntoIterator<Item = (ProductId, BoundingBox)>) -> Self {
        let entries: HashMap<ProductId, IndexedBox> = entries
            .into_iter()
            .map(|(product_id, bbox)| (product_id, IndexedBox { product_id, bbox }))
            .collect();
        let tree = RTree::bulk_load(entries.values().cloned().collect());
        Self { tree, entries }
    }

    /// Insert or replace the box of a product.
    pub fn upsert(&mut self, product_id: ProductId, bbox: BoundingBox) {
        if let Some(existing) = self.entries.remove(&product_id) {
            self.tree.remove(&existing);
        }
        let entry = IndexedBox { product_id, bbox };
        self.tree.insert(entry.clone());
        self.entries.insert(product_id, entry);
    }

    /// Remove the box of a product. Returns whether one was indexed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        match self.entries.remove(&product_id) {
            Some(existing) => self.tree.remove(&existing).is_some(),
            None => false,
        }
    }

    /// Ids of all products whose box overlaps `query`, ascending.
    pub fn query(&self, query: &BoundingBox) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope_of(query))
            .map(|entry| entry.product_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, product_id: ProductId) -> Option<BoundingBox> {
        self.entries.get(&product_id).map(|entry| entry.bbox)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries.contains_key(&product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
