use crate::resource::{Resource, ResourceId};
use glam::DVec3;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type SurfacePoint = GeomWithData<[f64; 3], ResourceId>;

/// R*-tree over feeding-surface centres. Poses only change on an area-wide
/// reset, so the tree is rebuilt then and queried every fixed step.
#[derive(Clone, Debug)]
pub struct SurfaceIndex {
    tree: RTree<SurfacePoint>,
    max_surface_radius: f64,
}

impl Default for SurfaceIndex {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
            max_surface_radius: 0.0,
        }
    }
}

impl SurfaceIndex {
    /// Bulk-load (O(n log n)) from the area's resources.
    pub fn build(resources: &[Resource]) -> Self {
        let points = resources
            .iter()
            .enumerate()
            .map(|(idx, r)| GeomWithData::new(r.position().to_array(), ResourceId(idx)))
            .collect();
        let max_surface_radius = resources
            .iter()
            .map(Resource::surface_radius)
            .fold(0.0, f64::max);
        Self {
            tree: RTree::bulk_load(points),
            max_surface_radius,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Resources with an active surface that a sphere of `radius` around
    /// `center` overlaps, in ascending id order.
    pub fn overlapping(&self, resources: &[Resource], center: DVec3, radius: f64) -> Vec<ResourceId> {
        let reach = radius + self.max_surface_radius;
        let mut hits: Vec<ResourceId> = self
            .tree
            .locate_within_distance(center.to_array(), reach * reach)
            .map(|p| p.data)
            .filter(|id| {
                let r = &resources[id.0];
                r.surface_active() && r.position().distance(center) <= radius + r.surface_radius()
            })
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Whether any feeding surface, active or not, lies within `radius` of `point`.
    pub fn any_within(&self, resources: &[Resource], point: DVec3, radius: f64) -> bool {
        let reach = radius + self.max_surface_radius;
        self.tree
            .locate_within_distance(point.to_array(), reach * reach)
            .any(|p| {
                let r = &resources[p.data.0];
                r.position().distance(point) <= radius + r.surface_radius()
            })
    }
}
