use crate::area::SceneNode;
use crate::config::LayoutConfig;
use crate::math::{euler_degrees, Transform};
use crate::resource::{ResourceSpec, SurfaceId};
use glam::{DQuat, DVec3};
use rand::Rng;

/// Procedural meadow for headless runs: plants on a ring around the origin,
/// each carrying resources around its stem that face outward and upward.
/// Surface ids are assigned from 1 in generation order.
pub fn generate_scene<R: Rng + ?Sized>(layout: &LayoutConfig, rng: &mut R) -> SceneNode {
    let mut root = SceneNode::new("food", Transform::IDENTITY);
    let mut next_surface = 1u64;

    for plant_idx in 0..layout.plants {
        let heading = rng.random_range(-180.0..180.0);
        let radius = rng.random_range(layout.plant_radius.min..=layout.plant_radius.max);
        let position = euler_degrees(0.0, heading, 0.0) * DVec3::Z * radius;
        let mut plant = SceneNode::plant(
            format!("plant_{plant_idx}"),
            Transform::from_translation(position),
        );

        for resource_idx in 0..layout.resources_per_plant {
            let around = 360.0 * resource_idx as f64 / layout.resources_per_plant.max(1) as f64;
            let height = rng.random_range(layout.resource_height.min..=layout.resource_height.max);
            let offset = rng.random_range(layout.stem_offset.min..=layout.stem_offset.max);
            let facing = euler_degrees(0.0, around, 0.0);
            let tilt = DQuat::from_rotation_x(rng.random_range(30.0f64..75.0).to_radians());
            let spec = ResourceSpec {
                surface: SurfaceId(next_surface),
                surface_radius: layout.surface_radius,
                full_color: layout.full_color,
                empty_color: layout.empty_color,
                regrow_delay_seconds: layout.regrow_delay_seconds,
            };
            next_surface += 1;
            plant = plant.with_child(SceneNode::resource(
                format!("resource_{plant_idx}_{resource_idx}"),
                Transform::new(
                    DVec3::Y * height + facing * DVec3::Z * offset,
                    facing * tilt,
                ),
                spec,
            ));
        }
        root = root.with_child(plant);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::ResourceArea;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn generated_scene_scans_into_full_area() {
        let layout = LayoutConfig::default();
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let scene = generate_scene(&layout, &mut rng);
        let area = ResourceArea::scan(&scene, 20.0, 0.02).expect("unique surfaces");
        assert_eq!(area.plants().len(), layout.plants);
        assert_eq!(area.len(), layout.plants * layout.resources_per_plant);
        for resource in area.resources() {
            let p = resource.position();
            assert!(p.y >= layout.resource_height.min - 1e-9);
            assert!(p.y <= layout.resource_height.max + 1e-9);
            // Normals tilt outward from the stem but still point upward.
            assert!(resource.up().y > 0.0);
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let layout = LayoutConfig::default();
        let a = generate_scene(&layout, &mut ChaCha12Rng::seed_from_u64(1));
        let b = generate_scene(&layout, &mut ChaCha12Rng::seed_from_u64(1));
        assert_eq!(
            serde_json::to_string(&a).expect("serialize"),
            serde_json::to_string(&b).expect("serialize")
        );
    }
}
