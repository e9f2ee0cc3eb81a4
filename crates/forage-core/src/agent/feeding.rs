use super::ForagingAgent;
use crate::area::ResourceArea;
use crate::resource::{ResourceId, SurfaceId};
use glam::DVec3;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// A trigger event between the agent's feeding collider and a feeding
/// surface, as reported by the physics host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub surface: SurfaceId,
    pub phase: ContactPhase,
    /// Closest point on the surface to the agent's mouth.
    pub closest_point: DVec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedOutcome {
    pub resource: ResourceId,
    pub amount: f64,
    pub reward: f32,
    pub depleted: bool,
}

/// Whether the mouth currently touches food. Enter and stay set it, exit
/// clears it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouthContact {
    touching: bool,
}

impl MouthContact {
    pub fn observe(&mut self, phase: ContactPhase) {
        self.touching = !matches!(phase, ContactPhase::Exit);
    }

    pub fn touching_food(&self) -> bool {
        self.touching
    }
}

impl ForagingAgent {
    /// Handles a contact on enter and on every stay step. Feeds only when the
    /// surface point is strictly within the beak-tip radius of the mouth.
    ///
    /// In training mode the alignment bonus measures the beak against the
    /// normal of the resource being fed, not the current target's. The two
    /// differ only when the agent feeds on something other than its target.
    pub fn on_contact(&mut self, area: &mut ResourceArea, contact: &Contact) -> Option<FeedOutcome> {
        self.mouth.observe(contact.phase);
        if contact.phase == ContactPhase::Exit {
            return None;
        }
        let mouth = self.mouth_position();
        if mouth.distance(contact.closest_point) >= self.feeding.beak_tip_radius {
            return None;
        }

        let id = area.resource_for(contact.surface);
        let amount = area.withdraw(id, self.feeding.feed_amount);
        self.episode_amount_obtained += amount;
        self.feed_events += 1;
        debug!(
            agent = self.index,
            resource = id.0,
            amount,
            total = self.episode_amount_obtained,
            "nectar obtained"
        );

        let mut reward = 0.0;
        if self.training_mode {
            let inward = -area.resource(id).up().normalize_or_zero();
            let alignment = self.forward().normalize_or_zero().dot(inward).clamp(0.0, 1.0);
            reward = (self.feeding.base_reward + self.feeding.alignment_bonus * alignment) as f32;
            self.add_reward(reward);
        }

        let depleted = !area.resource(id).has_content();
        if depleted {
            self.update_nearest_resource(area);
        }
        Some(FeedOutcome {
            resource: id,
            amount,
            reward,
            depleted,
        })
    }
}
