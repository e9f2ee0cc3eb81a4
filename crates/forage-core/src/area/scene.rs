use super::{AreaBuilder, AreaError, PlantId, ResourceArea};
use crate::math::Transform;
use crate::resource::ResourceSpec;
use serde::{Deserialize, Serialize};

/// Tag marking a node whose subtree is one plant.
pub const PLANT_TAG: &str = "plant";

/// Minimal scene-graph node a host can hand to [`ResourceArea::scan`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNode {
    pub name: String,
    pub tag: Option<String>,
    /// Relative to the parent node.
    pub transform: Transform,
    pub resource: Option<ResourceSpec>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            ..Self::default()
        }
    }

    pub fn plant(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            tag: Some(PLANT_TAG.to_string()),
            ..Self::new(name, transform)
        }
    }

    pub fn resource(name: impl Into<String>, transform: Transform, spec: ResourceSpec) -> Self {
        Self {
            resource: Some(spec),
            ..Self::new(name, transform)
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    fn is_plant(&self) -> bool {
        self.tag.as_deref() == Some(PLANT_TAG)
    }
}

struct ScanFrame {
    plant: Option<PlantId>,
    /// Transform relative to the innermost plant, or to the area root
    /// outside any plant.
    relative: Transform,
}

impl ResourceArea {
    /// Builds an area from the descendants of `root`, depth-first pre-order.
    ///
    /// A plant-tagged child is recorded and searched; a child carrying a
    /// resource is registered and not searched further; anything else is
    /// searched.
    pub fn scan(root: &SceneNode, diameter: f64, fixed_dt: f64) -> Result<Self, AreaError> {
        let mut builder = AreaBuilder::new();
        let frame = ScanFrame {
            plant: None,
            relative: root.transform,
        };
        scan_children(&mut builder, root, &frame)?;
        builder.build(diameter, fixed_dt)
    }
}

fn scan_children(
    builder: &mut AreaBuilder,
    parent: &SceneNode,
    frame: &ScanFrame,
) -> Result<(), AreaError> {
    for child in &parent.children {
        if child.is_plant() {
            let plant = builder.plant(frame.plant, frame.relative, child.transform)?;
            let inner = ScanFrame {
                plant: Some(plant),
                relative: Transform::IDENTITY,
            };
            scan_children(builder, child, &inner)?;
        } else if let Some(spec) = &child.resource {
            let local = frame.relative.mul_transform(&child.transform);
            builder.resource(frame.plant, local, spec.clone())?;
        } else {
            let inner = ScanFrame {
                plant: frame.plant,
                relative: frame.relative.mul_transform(&child.transform),
            };
            scan_children(builder, child, &inner)?;
        }
    }
    Ok(())
}
