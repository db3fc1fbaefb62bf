//! Collision Sandbox
//!
//! Headless scene driving the collision engine tick by tick:
//! - characters walking across a table and a moving lift
//! - loose crates scattered around that can be stacked and stood on
//! - a horse that one character climbs onto and later leaves
//!
//! Gravity, velocity integration and the dismount input live here; the
//! engine only resolves contacts.
//!
//! Usage: `sandbox [config.toml|config.ron]`

use std::cell::Cell;
use std::rc::Rc;

use collision_engine::core::config::ConfigError;
use collision_engine::foundation::logging;
use collision_engine::prelude::*;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

const DEFAULT_CONFIG: &str = "sandbox_app/sandbox.toml";
const TICKS: u64 = 240;
const GRAVITY: f32 = 0.05;
const LIFT_PERIOD: u64 = 60;
const DISMOUNT_TICK: u64 = 150;
const CRATE_COUNT: usize = 6;
const SEED: u64 = 7;

/// Errors that end the sandbox run
#[derive(Debug, Error)]
enum SandboxError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("world: {0}")]
    World(#[from] WorldError),
}

/// Handles of the interesting bodies in the scene
struct Scene {
    lift: EntityId,
    walker: EntityId,
    scout: EntityId,
    horse: EntityId,
}

fn character(at: Vec3, team: u8) -> PhysicsBody {
    PhysicsBody::new(
        at,
        Collider::new(OctVolume::chamfered(0.4, 0.4, 0.15, 0.0, 1.8), CollisionFlags::character()),
    )
    .with_team(Team(team))
    .with_bounciness(0.1)
}

fn build_scene(world: &mut World, rng: &mut StdRng) -> Scene {
    let scenery = Collider::new(OctVolume::cuboid(2.0, 2.0, 0.0, 1.0), CollisionFlags::scenery_platform());
    world.spawn(PhysicsBody::new(Vec3::new(6.0, 0.0, 0.0), scenery).with_mass(Mass::Infinite));

    let lift_collider = Collider::new(OctVolume::cuboid(1.5, 1.5, 0.0, 0.5), CollisionFlags::scenery_platform());
    let lift = world.spawn(
        PhysicsBody::new(Vec3::new(-6.0, 0.0, 0.0), lift_collider)
            .with_mass(Mass::Infinite)
            .with_velocity(Vec3::new(0.0, 0.05, 0.0)),
    );

    let crate_flags = CollisionFlags::CAN_COLLIDE | CollisionFlags::PLATFORM | CollisionFlags::USES_PLATFORMS;
    for _ in 0..CRATE_COUNT {
        let at = Vec3::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0), rng.gen_range(0.0..3.0));
        let size = rng.gen_range(0.3..0.6);
        world.spawn(
            PhysicsBody::new(at, Collider::new(OctVolume::cuboid(size, size, 0.0, size * 2.0), crate_flags))
                .with_mass(Mass::Finite(rng.gen_range(2.0..10.0)))
                .with_damping(0.2),
        );
    }

    world.spawn(character(Vec3::new(-6.0, 0.0, 0.5), 1));

    let mut scout = character(Vec3::new(9.0, 0.5, 0.0), 2).with_velocity(Vec3::new(-0.1, 0.0, 0.0));
    scout.alert.stealthed = true;
    let scout = world.spawn(scout);

    let horse = world.spawn(
        PhysicsBody::new(
            Vec3::new(0.0, 5.0, 0.0),
            Collider::new(
                OctVolume::cylinder(0.8, 0.0, 1.4),
                CollisionFlags::CAN_COLLIDE | CollisionFlags::MOUNT | CollisionFlags::USES_PLATFORMS,
            ),
        )
        .with_mass(Mass::Finite(8.0)),
    );
    // Starts in the saddle; mounted explicitly once the scene is built
    let walker = world.spawn(character(Vec3::new(0.1, 5.0, 1.4), 1));

    Scene {
        lift,
        walker,
        scout,
        horse,
    }
}

/// Forces and input that the collision engine does not own
fn drive(world: &mut World, scene: &Scene, tick: u64) {
    if tick > 0 && tick % LIFT_PERIOD == 0 {
        if let Some(lift) = world.get_mut(scene.lift) {
            lift.velocity = -lift.velocity;
        }
    }
    if tick == 60 {
        if let Some(horse) = world.get_mut(scene.horse) {
            horse.velocity = Vec3::new(0.05, -0.02, 0.0);
        }
    }
    for (_, body) in world.iter_mut() {
        if !body.is_immovable() && !body.attachment.is_mounted() {
            body.velocity.z -= GRAVITY;
        }
    }
}

/// Move every body by its velocity and keep it out of the ground
fn transform(world: &mut World, ground: &Heightfield) {
    for (_, body) in world.iter_mut() {
        body.position += body.velocity;
        if body.is_immovable() {
            continue;
        }
        let bottom = body.position.z + body.collider.minimal.lo(OctAxis::Z);
        let floor = ground.floor_height(body.position);
        if bottom < floor {
            body.position.z += floor - bottom;
            body.velocity.z = body.velocity.z.max(0.0);
        }
    }
}

fn register_handlers(events: &mut EventSystem, bumps: &Rc<Cell<usize>>) {
    events.register_handler(
        EventKind::Attached,
        Box::new(|event: &CollisionEvent| {
            info!("attached: {:?}", event);
            true
        }),
    );
    events.register_handler(
        EventKind::Detached,
        Box::new(|event: &CollisionEvent| {
            info!("detached: {:?}", event);
            true
        }),
    );
    events.register_handler(
        EventKind::StealthBroken,
        Box::new(|event: &CollisionEvent| {
            info!("spotted: {:?}", event);
            true
        }),
    );
    let counter = Rc::clone(bumps);
    events.register_handler(
        EventKind::Bumped,
        Box::new(move |_: &CollisionEvent| {
            counter.set(counter.get() + 1);
            false
        }),
    );
}

fn run() -> Result<(), SandboxError> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = SimulationConfig::load_or_default(&path)?;
    logging::init_with_level(&config.engine.log_level);
    config.validate()?;
    info!("Loaded configuration from {}", path);

    let ground = Heightfield::new(config.physics.terrain_cell_size, 0.0)
        .with_column(12, 0, 3.0)
        .with_column(12, 1, 3.0)
        .with_column(-12, 0, 3.0);

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut world = World::new();
    let scene = build_scene(&mut world, &mut rng);
    world.mount(scene.walker, scene.horse)?;

    let mut physics = CollisionSystem::from_config(&config);
    let mut events = EventSystem::new();
    let bumps = Rc::new(Cell::new(0));
    register_handlers(&mut events, &bumps);

    for tick in 0..TICKS {
        drive(&mut world, &scene, tick);
        if tick == DISMOUNT_TICK {
            let mount = physics.dismount(&mut world, scene.walker)?;
            info!("tick {}: walker leaves {:?}", tick, mount);
            if let Some(walker) = world.get_mut(scene.walker) {
                walker.velocity = Vec3::new(0.1, 0.0, 0.2);
            }
        }

        let report = physics.step(&mut world, &ground);
        if !report.events.is_empty() {
            info!(
                "tick {}: {} pairs, {} bumps, {} platform, {} mounts, {} detached",
                tick, report.pairs_tested, report.bumps, report.platform_attachments, report.mounts, report.detachments
            );
        }
        events.send_all(report.events);
        events.dispatch();

        transform(&mut world, &ground);
    }

    info!("{} ticks, {} bumps", physics.tick_count(), bumps.get());
    for (id, body) in world.iter() {
        info!(
            "{:?}: position ({:.2}, {:.2}, {:.2}) attachment {:?}",
            id, body.position.x, body.position.y, body.position.z, body.attachment
        );
    }
    if let Some(scout) = world.get(scene.scout) {
        info!("scout stealthed: {}, last bumped by {:?}", scout.alert.stealthed, scout.alert.last_bumped_by);
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("sandbox failed: {}", err);
        eprintln!("sandbox failed: {err}");
        std::process::exit(1);
    }
}
