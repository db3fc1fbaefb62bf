//! Per-tick collision driver
//!
//! The tick is split into phases that each finish for every entity before the
//! next one starts: clear, broad phase, narrow phase, apply, integrate. The
//! narrow phase only reads the world and produces an [`Outcome`] that the
//! apply phase writes into the accumulators.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use crate::core::config::{PhysicsConfig, SimulationConfig};
use crate::ecs::components::{Attachment, AttachmentKind, CollisionFlags, Team};
use crate::ecs::{EntityId, World, WorldError};
use crate::events::CollisionEvent;
use crate::foundation::math::Vec3;
use crate::physics::attachment::maintain_attachments;
use crate::physics::classify::{classify, detect, Interaction};
use crate::physics::impulse::{resolve, Resolution};
use crate::physics::integrator::integrate;
use crate::physics::platform::{pick_best, PlatformCandidate};
use crate::physics::BodyRef;
use crate::spatial::{SpatialGrid, SpatialQuery};
use crate::terrain::TerrainQuery;

/// Unordered pair of entities, stored with the smaller key first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// Smaller key
    pub entity_a: EntityId,
    /// Larger key
    pub entity_b: EntityId,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller key first)
    pub fn new(entity_a: EntityId, entity_b: EntityId) -> Self {
        if entity_a < entity_b {
            Self { entity_a, entity_b }
        } else {
            Self {
                entity_a: entity_b,
                entity_b: entity_a,
            }
        }
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Candidate pairs handed to the narrow phase
    pub pairs_tested: usize,
    /// Pairs that produced an AI-visible bump
    pub bumps: usize,
    /// New platform links made this tick
    pub platform_attachments: usize,
    /// New mount links made this tick
    pub mounts: usize,
    /// Links dropped this tick
    pub detachments: usize,
    /// Bodies whose accumulators were integrated
    pub integrated: usize,
    /// Everything observable that happened, in order
    pub events: Vec<CollisionEvent>,
}

/// Read-only results of the narrow phase
#[derive(Debug, Default)]
struct Outcome {
    resolutions: Vec<(CollisionPair, Resolution)>,
    mounts: Vec<(EntityId, EntityId)>,
    candidates: BTreeMap<EntityId, Vec<PlatformCandidate>>,
}

/// Collision system driving one tick at a time
pub struct CollisionSystem {
    config: PhysicsConfig,
    spatial_query: Box<dyn SpatialQuery>,
    pending_events: Vec<CollisionEvent>,
    tick: u64,
}

impl CollisionSystem {
    /// Create a collision system with the given spatial query implementation
    pub fn new(config: PhysicsConfig, spatial_query: Box<dyn SpatialQuery>) -> Self {
        Self {
            config,
            spatial_query,
            pending_events: Vec::new(),
            tick: 0,
        }
    }

    /// Create a collision system backed by a [`SpatialGrid`]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.physics.clone(), Box::new(SpatialGrid::new(&config.spatial)))
    }

    /// Physics tuning in use
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Number of completed ticks
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Explicit dismount action
    ///
    /// Starts the configured cooldown. The detachment shows up in the next
    /// tick's report.
    pub fn dismount(&mut self, world: &mut World, rider: EntityId) -> Result<EntityId, WorldError> {
        let mount = world.dismount(rider, self.config.dismount_cooldown_ticks)?;
        self.pending_events.push(CollisionEvent::Detached {
            rider,
            carrier: mount,
            kind: AttachmentKind::Mount,
        });
        Ok(mount)
    }

    /// Run one full tick over `world`
    pub fn step(&mut self, world: &mut World, terrain: &dyn TerrainQuery) -> TickReport {
        let mut report = TickReport {
            events: std::mem::take(&mut self.pending_events),
            ..TickReport::default()
        };
        report.detachments = report.events.len();

        let start_velocities = self.begin_tick(world, &mut report);
        let pairs = self.broad_phase(world);
        let outcome = self.narrow_phase(world, &pairs, &mut report);
        let bumps = self.apply(world, outcome, &mut report);
        report.integrated = integrate(world, terrain, &self.config);
        Self::apply_bump_effects(world, &bumps, &mut report);

        Self::end_tick(world, start_velocities);

        self.tick += 1;
        debug!(
            "tick {}: {} pairs, {} bumps, {} platform, {} mounts, {} detached, {} integrated",
            self.tick,
            report.pairs_tested,
            report.bumps,
            report.platform_attachments,
            report.mounts,
            report.detachments,
            report.integrated
        );
        report
    }

    /// Clear accumulators and drop broken links
    fn begin_tick(&self, world: &mut World, report: &mut TickReport) -> Vec<(EntityId, Vec3)> {
        let mut start_velocities = Vec::with_capacity(world.len());
        for (id, body) in world.iter_mut() {
            body.accumulators = Default::default();
            start_velocities.push((id, body.velocity));
        }

        for detachment in maintain_attachments(world, &self.config) {
            report.detachments += 1;
            report.events.push(CollisionEvent::Detached {
                rider: detachment.rider,
                carrier: detachment.carrier,
                kind: detachment.kind,
            });
        }
        start_velocities
    }

    /// Remember this tick's starting velocities and count down cooldowns
    ///
    /// A cooldown of `n` ticks is in force for the classification of exactly
    /// `n` ticks after the dismount.
    fn end_tick(world: &mut World, start_velocities: Vec<(EntityId, Vec3)>) {
        for (id, velocity) in start_velocities {
            let Some(body) = world.get_mut(id) else {
                continue;
            };
            body.previous_velocity = velocity;
            if let Some(cooldown) = body.cooldown.as_mut() {
                if !cooldown.tick() {
                    body.cooldown = None;
                }
            }
        }
    }

    /// Rebuild the spatial index and collect candidate pairs in key order
    fn broad_phase(&mut self, world: &World) -> BTreeSet<CollisionPair> {
        let margin = self.config.platform_tolerance;
        let footprints: Vec<_> = world
            .iter()
            .filter(|(_, body)| body.collider.has(CollisionFlags::CAN_COLLIDE))
            .map(|(id, body)| {
                let swept = body.full_volume().swept(body.velocity, 0.0, 1.0);
                (id, swept.footprint().expanded(margin), body.collider.has(CollisionFlags::SCENERY))
            })
            .collect();

        self.spatial_query.clear();
        for &(id, footprint, is_scenery) in &footprints {
            self.spatial_query.insert(id, footprint, is_scenery);
        }

        let mut pairs = BTreeSet::new();
        for &(id, footprint, is_scenery) in &footprints {
            // Scenery only meets scenery through a moving partner's query
            if is_scenery {
                continue;
            }
            for other in self.spatial_query.find(&footprint, true) {
                if other != id {
                    pairs.insert(CollisionPair::new(id, other));
                }
            }
        }
        pairs
    }

    /// Classify and resolve every pair against the unmodified world
    fn narrow_phase(&self, world: &World, pairs: &BTreeSet<CollisionPair>, report: &mut TickReport) -> Outcome {
        let mut outcome = Outcome::default();

        for &pair in pairs {
            let (Some(body_a), Some(body_b)) = (world.get(pair.entity_a), world.get(pair.entity_b)) else {
                continue;
            };
            let a = BodyRef::new(pair.entity_a, body_a);
            let b = BodyRef::new(pair.entity_b, body_b);
            report.pairs_tested += 1;

            let hit = match detect(a, b, &self.config) {
                Ok(hit) => hit,
                Err(reason) => {
                    trace!("{:?} / {:?} rejected: {:?}", a.id, b.id, reason);
                    continue;
                }
            };

            match classify(a, b, &hit, &self.config) {
                Interaction::Reject(reason) => trace!("{:?} / {:?} rejected: {:?}", a.id, b.id, reason),
                Interaction::Mount { rider, carrier } => outcome.mounts.push((rider, carrier)),
                Interaction::Platform(candidate) => {
                    outcome.candidates.entry(candidate.rider).or_default().push(candidate);
                }
                Interaction::Bump => {
                    if let Some(resolution) = resolve(a, b, &hit, &self.config) {
                        trace!(
                            "{:?} / {:?} resolved along {:?}, depth {:.3}",
                            a.id,
                            b.id,
                            resolution.contact.normal,
                            resolution.contact.depth
                        );
                        outcome.resolutions.push((pair, resolution));
                    }
                }
            }
        }
        outcome
    }

    /// Write narrow-phase results into the world; returns the bumping pairs
    fn apply(&self, world: &mut World, outcome: Outcome, report: &mut TickReport) -> Vec<CollisionPair> {
        let mut bumps = Vec::new();
        for (pair, resolution) in outcome.resolutions {
            for (id, correction) in [(pair.entity_a, resolution.a), (pair.entity_b, resolution.b)] {
                if let Some(body) = world.get_mut(id).filter(|body| !body.is_immovable()) {
                    body.accumulators.velocity_delta += correction.velocity;
                    body.accumulators.collision_delta += correction.position;
                }
            }
            if resolution.bump {
                bumps.push(pair);
            }
        }

        for (rider, carrier) in outcome.mounts {
            self.attach_mount(world, rider, carrier, report);
        }

        for candidates in outcome.candidates.into_values() {
            if let Some(best) = pick_best(candidates) {
                self.attach_platform(world, best, report);
            }
        }

        Self::follow_mounts(world);
        bumps
    }

    fn attach_mount(&self, world: &mut World, rider: EntityId, carrier: EntityId, report: &mut TickReport) {
        let free = world.get(carrier).is_some_and(|m| m.is_free_mount());
        let previous = match world.get(rider) {
            Some(body) if !body.attachment.is_mounted() => body.attachment.current(),
            _ => return,
        };
        if !free {
            return;
        }
        if let Err(err) = world.mount(rider, carrier) {
            debug!("mount of {:?} by {:?} skipped: {}", carrier, rider, err);
            return;
        }
        if let Some(Attachment { carrier: old, kind }) = previous {
            report.detachments += 1;
            report.events.push(CollisionEvent::Detached {
                rider,
                carrier: old,
                kind,
            });
        }
        report.mounts += 1;
        report.events.push(CollisionEvent::Attached {
            rider,
            carrier,
            kind: AttachmentKind::Mount,
        });
        debug!("{:?} mounted {:?}", rider, carrier);
    }

    fn attach_platform(&self, world: &mut World, candidate: PlatformCandidate, report: &mut TickReport) {
        let Some(body) = world.get_mut(candidate.rider) else {
            return;
        };
        // A mount made this tick takes precedence
        if body.attachment.is_mounted() {
            return;
        }

        body.accumulators.platform_delta += candidate.carrier_velocity;
        body.accumulators.support_at(candidate.height);

        if body.attachment.is_attached_to(candidate.carrier, AttachmentKind::Platform) {
            return;
        }
        if let Some(previous) = body.attachment.attach(Attachment::platform(candidate.carrier)) {
            report.detachments += 1;
            report.events.push(CollisionEvent::Detached {
                rider: candidate.rider,
                carrier: previous.carrier,
                kind: previous.kind,
            });
        }
        report.platform_attachments += 1;
        report.events.push(CollisionEvent::Attached {
            rider: candidate.rider,
            carrier: candidate.carrier,
            kind: AttachmentKind::Platform,
        });
        debug!("{:?} now rests on {:?}", candidate.rider, candidate.carrier);
    }

    /// Keep every mounted rider on its saddle
    fn follow_mounts(world: &mut World) {
        let links: Vec<(EntityId, EntityId)> = world
            .iter()
            .filter_map(|(id, body)| match body.attachment.current() {
                Some(Attachment {
                    carrier,
                    kind: AttachmentKind::Mount,
                }) => Some((id, carrier)),
                _ => None,
            })
            .collect();

        for (rider, mount) in links {
            let Some((rider_body, mount_body)) = world.get_pair_mut(rider, mount) else {
                continue;
            };
            let saddle = mount_body.full_volume();
            let seat = rider_body.minimal_volume();
            let offset = saddle.center() - seat.center();

            let acc = &mut rider_body.accumulators;
            acc.velocity_delta += mount_body.velocity - rider_body.velocity;
            acc.platform_delta += Vec3::new(offset.x, offset.y, saddle.top() - seat.bottom());
            acc.support_at(saddle.top());
        }
    }

    /// Alert notifications and stealth breaking for this tick's bumps
    fn apply_bump_effects(world: &mut World, bumps: &[CollisionPair], report: &mut TickReport) {
        for pair in bumps {
            let Some((a, b)) = world.get_pair_mut(pair.entity_a, pair.entity_b) else {
                continue;
            };
            a.alert.notify_bump(pair.entity_b);
            b.alert.notify_bump(pair.entity_a);
            report.bumps += 1;
            report.events.push(CollisionEvent::Bumped {
                a: pair.entity_a,
                b: pair.entity_b,
            });

            let shaded = a.collider.has(CollisionFlags::SHADE) || b.collider.has(CollisionFlags::SHADE);
            if Team::hostile(a.team, b.team) && !shaded {
                let broke_a = a.alert.break_stealth();
                let broke_b = b.alert.break_stealth();
                if broke_a || broke_b {
                    report.events.push(CollisionEvent::StealthBroken {
                        a: pair.entity_a,
                        b: pair.entity_b,
                    });
                }
            }
        }
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
