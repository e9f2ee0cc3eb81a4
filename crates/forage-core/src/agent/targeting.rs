use super::ForagingAgent;
use crate::area::ResourceArea;
use crate::resource::Resource;

impl ForagingAgent {
    /// Has content and, when a height band is set, lies inside it.
    pub(super) fn is_candidate(&self, resource: &Resource) -> bool {
        resource.has_content()
            && self
                .config
                .height_band
                .map_or(true, |band| band.contains(resource.position().y))
    }

    /// Linear scan for the closest resource with content, measured from the
    /// mouth. An empty current target is dropped first; equal distances keep
    /// whichever was found first in scan order.
    pub fn update_nearest_resource(&mut self, area: &ResourceArea) {
        let mouth = self.mouth_position();
        if let Some(id) = self.nearest {
            if !self.is_candidate(area.resource(id)) {
                self.nearest = None;
            }
        }
        let mut best = self
            .nearest
            .map(|id| area.resource(id).position().distance(mouth));

        for (id, resource) in area.iter() {
            if !self.is_candidate(resource) {
                continue;
            }
            let distance = resource.position().distance(mouth);
            match best {
                Some(current) if distance >= current => {}
                _ => {
                    self.nearest = Some(id);
                    best = Some(distance);
                }
            }
        }
    }
}
