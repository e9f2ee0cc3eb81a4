mod regrow;
pub mod scene;

pub use scene::{SceneNode, PLANT_TAG};

use crate::math::{euler_degrees, Transform};
use crate::resource::{Resource, ResourceId, ResourceSpec, SurfaceId};
use crate::spatial::SurfaceIndex;
use rand::Rng;
use regrow::RegrowSchedule;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Stable handle into a [`ResourceArea`]'s plant list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct PlantId(pub usize);

/// A grouping of resources that is re-oriented as a whole on area reset.
/// Plants may nest; an inner plant follows every re-orientation of the
/// plants above it.
#[derive(Clone, Debug)]
pub struct Plant {
    parent: Option<PlantId>,
    /// Fixed transform from the parent plant's frame (or the area root) to
    /// this plant's pivot, through any intermediate groups.
    offset: Transform,
    local: Transform,
    world: Transform,
}

impl Plant {
    pub fn parent(&self) -> Option<PlantId> {
        self.parent
    }

    pub fn world(&self) -> Transform {
        self.world
    }

    pub fn local(&self) -> &Transform {
        &self.local
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AreaError {
    #[error("feeding surface {0:?} registered twice")]
    DuplicateSurface(SurfaceId),
    #[error("plant {0:?} does not exist")]
    UnknownPlant(PlantId),
    #[error("area diameter must be finite and positive (got {0})")]
    InvalidDiameter(f64),
    #[error("fixed step must be finite and positive (got {0})")]
    InvalidFixedStep(f64),
}

/// Collects plants and resources in registration order, then freezes them
/// into a [`ResourceArea`].
#[derive(Clone, Debug, Default)]
pub struct AreaBuilder {
    plants: Vec<Plant>,
    resources: Vec<Resource>,
    surfaces: HashMap<SurfaceId, ResourceId>,
}

impl AreaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plant under `parent` (or the area root). A parent must be
    /// registered before its children.
    pub fn plant(
        &mut self,
        parent: Option<PlantId>,
        offset: Transform,
        local: Transform,
    ) -> Result<PlantId, AreaError> {
        if let Some(p) = parent {
            if p.0 >= self.plants.len() {
                return Err(AreaError::UnknownPlant(p));
            }
        }
        let id = PlantId(self.plants.len());
        self.plants.push(Plant {
            parent,
            offset,
            local,
            world: offset.mul_transform(&local),
        });
        Ok(id)
    }

    /// Registers a resource. `local` is relative to `plant` when given and
    /// to the area root otherwise.
    pub fn resource(
        &mut self,
        plant: Option<PlantId>,
        local: Transform,
        spec: ResourceSpec,
    ) -> Result<ResourceId, AreaError> {
        if let Some(p) = plant {
            if p.0 >= self.plants.len() {
                return Err(AreaError::UnknownPlant(p));
            }
        }
        if self.surfaces.contains_key(&spec.surface) {
            return Err(AreaError::DuplicateSurface(spec.surface));
        }
        let id = ResourceId(self.resources.len());
        self.surfaces.insert(spec.surface, id);
        self.resources.push(Resource::new(spec, plant, local));
        Ok(id)
    }

    pub fn build(self, diameter: f64, fixed_dt: f64) -> Result<ResourceArea, AreaError> {
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(AreaError::InvalidDiameter(diameter));
        }
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            return Err(AreaError::InvalidFixedStep(fixed_dt));
        }
        let mut area = ResourceArea {
            diameter,
            fixed_dt,
            plants: self.plants,
            resources: self.resources,
            surfaces: self.surfaces,
            surface_index: SurfaceIndex::default(),
            regrow: RegrowSchedule::default(),
            tick: 0,
            total_regrowths: 0,
        };
        area.refresh_poses();
        Ok(area)
    }
}

/// Owns every resource of a scene region. The resource list keeps its
/// registration order for the lifetime of the area.
#[derive(Clone, Debug)]
pub struct ResourceArea {
    diameter: f64,
    fixed_dt: f64,
    plants: Vec<Plant>,
    resources: Vec<Resource>,
    surfaces: HashMap<SurfaceId, ResourceId>,
    surface_index: SurfaceIndex,
    regrow: RegrowSchedule,
    tick: u64,
    total_regrowths: usize,
}

impl ResourceArea {
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.resources
            .iter()
            .enumerate()
            .map(|(idx, r)| (ResourceId(idx), r))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn surface_index(&self) -> &SurfaceIndex {
        &self.surface_index
    }

    /// Regrow timers that will still refill their resource. Timers
    /// cancelled by a manual reset are not counted.
    pub fn pending_regrowths(&self) -> usize {
        self.regrow
            .timers()
            .filter(|(id, generation)| {
                let resource = &self.resources[id.0];
                resource.generation == *generation && !resource.has_content()
            })
            .count()
    }

    pub fn total_regrowths(&self) -> usize {
        self.total_regrowths
    }

    pub fn remaining_capacity(&self) -> f64 {
        self.resources.iter().map(Resource::capacity).sum()
    }

    pub fn depleted_count(&self) -> usize {
        self.resources.iter().filter(|r| !r.has_content()).count()
    }

    /// Whether the first registered resource has run dry.
    pub fn first_depleted(&self) -> bool {
        self.resources.first().is_some_and(|r| !r.has_content())
    }

    pub fn try_resource_for(&self, surface: SurfaceId) -> Option<ResourceId> {
        self.surfaces.get(&surface).copied()
    }

    /// Resolves a feeding surface to its resource.
    ///
    /// # Panics
    /// If `surface` was never registered; that means the host reported a
    /// contact with a collider outside this area.
    pub fn resource_for(&self, surface: SurfaceId) -> ResourceId {
        self.try_resource_for(surface)
            .unwrap_or_else(|| panic!("feeding surface {surface:?} is not registered in this area"))
    }

    /// Withdraws from one resource, scheduling its regrowth when this call
    /// empties it.
    pub fn withdraw(&mut self, id: ResourceId, requested: f64) -> f64 {
        let tick = self.tick;
        let fixed_dt = self.fixed_dt;
        let resource = &mut self.resources[id.0];
        let had_content = resource.has_content();
        let taken = resource.withdraw(requested);
        if had_content && !resource.has_content() {
            debug!(resource = id.0, "resource depleted");
            if let Some(delay) = resource.regrow_delay_seconds() {
                let ticks = ((delay / fixed_dt).ceil() as u64).max(1);
                self.regrow
                    .schedule(id, resource.generation, tick.saturating_add(ticks));
            }
        }
        taken
    }

    /// Resets one resource and cancels its pending regrow timer.
    pub fn reset_resource(&mut self, id: ResourceId) {
        self.resources[id.0].reset();
    }

    /// Re-orients every plant (±5° pitch and roll, any yaw) and refills
    /// every resource.
    pub fn reset_all<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for plant in &mut self.plants {
            let pitch = rng.random_range(-5.0..5.0);
            let yaw = rng.random_range(-180.0..180.0);
            let roll = rng.random_range(-5.0..5.0);
            plant.local.rotation = euler_degrees(pitch, yaw, roll);
        }
        for resource in &mut self.resources {
            resource.reset();
        }
        self.regrow.clear();
        self.refresh_poses();
    }

    /// Advances the area clock one fixed step and fires due regrow timers.
    /// Returns how many resources regrew.
    pub fn on_fixed_step(&mut self) -> usize {
        self.tick = self.tick.saturating_add(1);
        let mut regrown = 0;
        for (id, generation) in self.regrow.pop_due(self.tick) {
            let resource = &mut self.resources[id.0];
            if resource.generation != generation || resource.has_content() {
                continue;
            }
            resource.reset();
            regrown += 1;
            debug!(resource = id.0, tick = self.tick, "resource regrew");
        }
        self.total_regrowths += regrown;
        regrown
    }

    fn refresh_poses(&mut self) {
        // Parents precede their children, so one pass in order suffices.
        for idx in 0..self.plants.len() {
            let base = match self.plants[idx].parent {
                Some(p) => self.plants[p.0].world.mul_transform(&self.plants[idx].offset),
                None => self.plants[idx].offset,
            };
            let plant = &mut self.plants[idx];
            plant.world = base.mul_transform(&plant.local);
        }
        for resource in &mut self.resources {
            let world = match resource.plant() {
                Some(p) => self.plants[p.0].world.mul_transform(resource.local()),
                None => *resource.local(),
            };
            resource.set_world(world);
        }
        self.surface_index = SurfaceIndex::build(&self.resources);
    }
}
