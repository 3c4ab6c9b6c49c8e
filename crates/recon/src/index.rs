use geo::{BoundingRect, Intersects, MultiPolygon};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::diagnostics::{Diagnostics, Entity, ReconWarning};
use crate::geometry::{self, Degeneracy};
use crate::model::{BoundaryCollection, Region};

type IndexedEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Bounding-box R-tree over a collection, used to prefilter intersection tests.
///
/// Regions with empty geometry or non-finite coordinates are left out of the
/// tree and reported once, when the index is built.
pub struct RegionIndex<'a> {
    collection: &'a BoundaryCollection,
    tree: RTree<IndexedEnvelope>,
}

impl<'a> RegionIndex<'a> {
    pub fn build(collection: &'a BoundaryCollection, diagnostics: &mut Diagnostics) -> Self {
        let mut entries = Vec::with_capacity(collection.len());
        for (i, region) in collection.regions().iter().enumerate() {
            let skip = if region.geometry.0.is_empty() {
                Some(Degeneracy::Empty)
            } else if !geometry::has_finite_coords(&region.geometry) {
                Some(Degeneracy::NonFiniteCoordinates)
            } else {
                None
            };
            if let Some(reason) = skip {
                diagnostics.push(ReconWarning::DegenerateGeometry {
                    entity: Entity::Region {
                        role: collection.role(),
                        id: region.id.clone(),
                    },
                    reason,
                });
                continue;
            }
            if let Some(rect) = region.geometry.bounding_rect() {
                let (min, max) = (rect.min(), rect.max());
                entries.push(GeomWithData::new(
                    Rectangle::from_corners([min.x, min.y], [max.x, max.y]),
                    i,
                ));
            }
        }
        log::debug!(
            "indexed {} of {} {} regions",
            entries.len(),
            collection.len(),
            collection.role()
        );
        Self {
            collection,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn collection(&self) -> &'a BoundaryCollection {
        self.collection
    }

    pub fn region(&self, index: usize) -> &'a Region {
        &self.collection.regions()[index]
    }

    /// Indices of regions whose geometry intersects `query`, in input order.
    pub fn intersecting(&self, query: &MultiPolygon<f64>) -> Vec<usize> {
        let Some(rect) = query.bounding_rect() else {
            return Vec::new();
        };
        let (min, max) = (rect.min(), rect.max());
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        hits.sort_unstable();
        hits.retain(|&i| self.region(i).geometry.intersects(query));
        hits
    }
}
