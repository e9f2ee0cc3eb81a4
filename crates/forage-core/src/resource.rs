use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::area::PlantId;
use crate::math::Transform;

/// Capacity of a full resource, in normalized units.
pub const FULL_CAPACITY: f64 = 1.0;

/// Identity of a feeding surface as reported by contact events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// Stable handle into a [`crate::area::ResourceArea`]'s resource list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub [f32; 3]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visual {
    Full,
    Empty,
}

/// Static description of a resource, independent of where it sits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub surface: SurfaceId,
    /// Radius of the spherical feeding surface.
    pub surface_radius: f64,
    pub full_color: Rgb,
    pub empty_color: Rgb,
    #[serde(default)]
    pub regrow_delay_seconds: Option<f64>,
}

impl ResourceSpec {
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            surface_radius: 0.05,
            full_color: Rgb([1.0, 0.0, 0.3]),
            empty_color: Rgb([0.5, 0.0, 1.0]),
            regrow_delay_seconds: None,
        }
    }

    pub fn with_regrow_delay(mut self, seconds: f64) -> Self {
        self.regrow_delay_seconds = Some(seconds);
        self
    }
}

/// A depletable food source. Capacity only changes through [`Resource::withdraw`]
/// and [`Resource::reset`].
#[derive(Clone, Debug)]
pub struct Resource {
    spec: ResourceSpec,
    capacity: f64,
    visual: Visual,
    plant: Option<PlantId>,
    /// Pose relative to the owning plant, or to the area root without one.
    local: Transform,
    world: Transform,
    /// Bumped on every reset; regrow timers carrying an older value are stale.
    pub(crate) generation: u32,
}

impl Resource {
    pub(crate) fn new(spec: ResourceSpec, plant: Option<PlantId>, local: Transform) -> Self {
        Self {
            spec,
            capacity: FULL_CAPACITY,
            visual: Visual::Full,
            plant,
            local,
            world: local,
            generation: 0,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.spec.surface
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn has_content(&self) -> bool {
        self.capacity > 0.0
    }

    /// An empty resource's feeding surface is disabled and produces no contacts.
    pub fn surface_active(&self) -> bool {
        self.has_content()
    }

    pub fn visual(&self) -> Visual {
        self.visual
    }

    pub fn color(&self) -> Rgb {
        match self.visual {
            Visual::Full => self.spec.full_color,
            Visual::Empty => self.spec.empty_color,
        }
    }

    pub fn plant(&self) -> Option<PlantId> {
        self.plant
    }

    pub fn local(&self) -> &Transform {
        &self.local
    }

    pub fn position(&self) -> DVec3 {
        self.world.translation
    }

    /// Outward normal of the feeding surface.
    pub fn up(&self) -> DVec3 {
        self.world.up()
    }

    pub fn surface_radius(&self) -> f64 {
        self.spec.surface_radius
    }

    pub fn regrow_delay_seconds(&self) -> Option<f64> {
        self.spec.regrow_delay_seconds
    }

    /// Closest point on the feeding surface to `point`; a point inside the
    /// surface is its own closest point.
    pub fn closest_point(&self, point: DVec3) -> DVec3 {
        let offset = point - self.position();
        let distance = offset.length();
        if distance <= self.spec.surface_radius {
            point
        } else {
            self.position() + offset * (self.spec.surface_radius / distance)
        }
    }

    pub(crate) fn set_world(&mut self, world: Transform) {
        self.world = world;
    }

    /// Takes up to `requested` from the resource and returns what was taken.
    ///
    /// The returned amount is clamped to what remained, but capacity is
    /// reduced by the full request before being floored at zero.
    pub fn withdraw(&mut self, requested: f64) -> f64 {
        let requested = if requested > 0.0 { requested } else { 0.0 };
        let taken = requested.clamp(0.0, self.capacity);
        self.capacity -= requested;
        if self.capacity <= 0.0 {
            self.capacity = 0.0;
            self.visual = Visual::Empty;
        }
        taken
    }

    pub fn reset(&mut self) {
        self.capacity = FULL_CAPACITY;
        self.visual = Visual::Full;
        self.generation = self.generation.wrapping_add(1);
    }
}
