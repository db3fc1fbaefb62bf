//! Accumulator integration
//!
//! Applies the corrections gathered this tick. Displacement is clipped to one
//! terrain cell per axis and applied one axis at a time against the terrain
//! test, so a large correction can neither tunnel through a wall nor lose the
//! axes that were not blocked.

use log::trace;

use crate::core::config::PhysicsConfig;
use crate::ecs::components::{Accumulators, PhysicsBody};
use crate::ecs::World;
use crate::foundation::math::utils::{clamp, clamp_components};
use crate::foundation::math::Vec3;
use crate::physics::collision::OctAxis;
use crate::terrain::{Blocked, TerrainQuery};

const REST_EPSILON: f32 = 1e-4;

/// Integrate the accumulators of every movable body that has any
///
/// Accumulators are consumed: they are empty again when this returns.
/// Returns the number of bodies that were integrated.
pub fn integrate(world: &mut World, terrain: &dyn TerrainQuery, config: &PhysicsConfig) -> usize {
    let mut integrated = 0;
    for (id, body) in world.iter_mut() {
        let acc = std::mem::take(&mut body.accumulators);
        if body.is_immovable() || acc.is_empty() {
            continue;
        }
        integrate_body(body, &acc, terrain, config);
        trace!("integrated {:?} to {:?}", id, body.position);
        integrated += 1;
    }
    integrated
}

fn integrate_body(body: &mut PhysicsBody, acc: &Accumulators, terrain: &dyn TerrainQuery, config: &PhysicsConfig) {
    let cell = config.terrain_cell_size;
    body.velocity += acc.velocity_delta;

    let displacement = clamp_components(acc.platform_delta + acc.collision_delta, cell);

    let horizontal = [
        (0, Blocked::along_x(displacement.x)),
        (1, Blocked::along_y(displacement.y)),
    ];
    for (axis, direction) in horizontal {
        let step = displacement[axis];
        if step == 0.0 {
            continue;
        }
        let mut tentative = body.position;
        tentative[axis] += step;
        if !terrain.blocked(tentative).contains(direction) {
            body.position = tentative;
        }
    }

    let mut step = displacement.z;
    if step != 0.0 {
        let mut tentative = body.position;
        tentative.z += step;
        let direction = if step < 0.0 { Blocked::NEG_Z } else { Blocked::POS_Z };
        if terrain.blocked(tentative).contains(direction) {
            step = 0.0;
        }
    }

    let model_bottom = body.collider.minimal.lo(OctAxis::Z);
    let bottom = body.position.z + model_bottom;
    let floor = terrain.floor_height(body.position);
    let elevation = acc.support_height.map_or(floor, |support| support.max(floor));

    let sunk = bottom + step < elevation;
    // Falling onto the surface this tick: land on it instead of passing through
    let landing = body.velocity.z < 0.0 && bottom + step + body.velocity.z < elevation;
    if (sunk || landing) && (elevation - bottom).abs() <= cell {
        body.position.z = elevation - model_bottom;
    } else if sunk || landing {
        body.position.z += clamp(elevation - bottom, -cell, cell);
    } else {
        body.position.z += clamp(step, -cell, cell);
    }

    let resting = body.position.z + model_bottom <= elevation + REST_EPSILON;
    if resting && body.velocity.z < 0.0 {
        body.velocity.z -= (1.0 + body.bounciness) * body.velocity.z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, CollisionFlags, Mass};
    use crate::ecs::EntityId;
    use crate::physics::collision::OctVolume;
    use crate::terrain::{Heightfield, OpenSpace};
    use approx::assert_relative_eq;

    fn crate_at(world: &mut World, at: Vec3) -> EntityId {
        world.spawn(PhysicsBody::new(
            at,
            Collider::new(OctVolume::cuboid(0.5, 0.5, 0.0, 1.0), CollisionFlags::CAN_COLLIDE),
        ))
    }

    #[test]
    fn test_displacement_is_clipped_per_axis() {
        let mut world = World::new();
        let id = crate_at(&mut world, Vec3::new(0.0, 0.0, 10.0));
        world.get_mut(id).unwrap().accumulators.collision_delta = Vec3::new(5.0, -0.25, 3.0);
        let config = PhysicsConfig::default();

        assert_eq!(integrate(&mut world, &OpenSpace, &config), 1);
        let body = world.get(id).unwrap();
        assert_relative_eq!(body.position, Vec3::new(1.0, -0.25, 11.0));
        assert!(body.accumulators.is_empty());
    }

    #[test]
    fn test_blocked_axis_rolls_back_alone() {
        let mut world = World::new();
        let id = crate_at(&mut world, Vec3::new(0.5, 0.5, 0.0));
        world.get_mut(id).unwrap().accumulators.collision_delta = Vec3::new(0.8, 0.3, 0.0);
        let wall = Heightfield::new(1.0, 0.0).with_column(1, 0, 5.0);

        integrate(&mut world, &wall, &PhysicsConfig::default());
        let body = world.get(id).unwrap();
        assert_relative_eq!(body.position.x, 0.5);
        assert_relative_eq!(body.position.y, 0.8);
    }

    #[test]
    fn test_support_clamps_and_reflects() {
        let mut world = World::new();
        let id = world.spawn(
            PhysicsBody::new(
                Vec3::new(0.0, 0.0, 0.8),
                Collider::new(OctVolume::cuboid(0.5, 0.5, 0.0, 1.0), CollisionFlags::character()),
            )
            .with_velocity(Vec3::new(0.0, 0.0, -0.4))
            .with_bounciness(0.5),
        );
        world.get_mut(id).unwrap().accumulators.support_at(1.0);

        integrate(&mut world, &OpenSpace, &PhysicsConfig::default());
        let body = world.get(id).unwrap();
        assert_relative_eq!(body.position.z, 1.0);
        assert_relative_eq!(body.velocity.z, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_immovable_and_idle_bodies_are_skipped() {
        let mut world = World::new();
        let idle = crate_at(&mut world, Vec3::zeros());
        let wall = world.spawn(
            PhysicsBody::new(
                Vec3::zeros(),
                Collider::new(OctVolume::cuboid(1.0, 1.0, 0.0, 1.0), CollisionFlags::CAN_COLLIDE),
            )
            .with_mass(Mass::Infinite),
        );
        world.get_mut(wall).unwrap().accumulators.collision_delta = Vec3::new(1.0, 0.0, 0.0);

        assert_eq!(integrate(&mut world, &OpenSpace, &PhysicsConfig::default()), 0);
        assert_eq!(world.get(wall).unwrap().position, Vec3::zeros());
        assert_eq!(world.get(idle).unwrap().position, Vec3::zeros());
        assert!(world.get(wall).unwrap().accumulators.is_empty());
    }
}
