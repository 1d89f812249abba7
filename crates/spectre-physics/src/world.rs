// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The physics world and its fixed per-tick pipeline.

use std::collections::{BTreeMap, BTreeSet};

use spectre_geom::{Aabb, BroadPair, SweepAndPrune, Vec3};
use tracing::{debug, instrument, trace};

use crate::body::{Body, BodyId, BodyKind, CameraDesc, Footprint, ModelDesc, Presentation};
use crate::collider::{Collider, Contact, PairResponse};
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::ports::PresentationPort;
use crate::projectile::{Projectile, ProjectileHit, ProjectileId};
use crate::terrain::HeightField;

/// Depth of the slab tracked below a plane's walkable top.
pub const PLANE_THICKNESS: f32 = 0.5;
/// Half extent of a bullet body's cube.
pub const BULLET_HALF_EXTENT: f32 = 0.1;

/// A bullet that struck a body during the last tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BulletHit {
    /// The bullet, removed at the end of the tick.
    pub bullet: BodyId,
    /// What it struck.
    pub target: BodyId,
}

/// Owns every body, the broad phase, and the collider.
///
/// Bodies are stored by id and processed in id order, so a tick is a pure
/// function of the world state, the height field, and `dt`.
///
/// Tick pipeline:
/// 1. Advance projectiles against every non-camera body.
/// 2. For each body in id order: integrate forces, ground against terrain or
///    its resting plane, sync the bounding volume, run the broad phase, and
///    resolve pairs whose other member was already processed this tick.
///    Each unordered pair is resolved at most once per tick.
/// 3. Collect triggers, push poses to presentation, clear forces, decay and
///    snap velocities, and remove bullets that hit something.
#[derive(Debug)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: BTreeMap<BodyId, Body>,
    sweep: SweepAndPrune,
    collider: Collider,
    projectiles: Vec<Projectile>,
    triggers: Vec<BodyId>,
    hits: Vec<BulletHit>,
    projectile_hits: Vec<ProjectileHit>,
    next_body: u64,
    next_projectile: u64,
    ticks: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::build(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    /// Creates an empty world after validating `config`.
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        Self {
            collider: Collider::new(&config),
            config,
            bodies: BTreeMap::new(),
            sweep: SweepAndPrune::new(),
            projectiles: Vec::new(),
            triggers: Vec::new(),
            hits: Vec::new(),
            projectile_hits: Vec::new(),
            next_body: 1,
            next_projectile: 1,
            ticks: 0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Adds a model body.
    pub fn add_model(&mut self, desc: ModelDesc) -> Result<BodyId, PhysicsError> {
        if desc.is_dynamic && desc.is_static {
            return Err(PhysicsError::InvalidBody("a body cannot be both dynamic and static".to_owned()));
        }
        if desc.bounds.is_empty() {
            return Err(PhysicsError::InvalidBody("a model needs at least one local bound".to_owned()));
        }
        check_vec("position", desc.position)?;
        check_vec("velocity", desc.velocity)?;
        check_angles(desc.angles)?;
        check_scalar("height", desc.height)?;
        check_scalar("gravity scale", desc.gravity)?;
        if desc.bounds.iter().any(|b| !(b.min().is_finite() && b.max().is_finite())) {
            return Err(PhysicsError::NonFinite("local bound"));
        }
        check_mass(desc.is_dynamic, desc.mass)?;
        let id = self.allocate_body();
        let mut body = Body::new(id, BodyKind::Dynamic, desc.position, &desc.bounds)
            .ok_or_else(|| PhysicsError::InvalidBody("a model needs at least one local bound".to_owned()))?;
        (body.pitch, body.yaw, body.roll) = desc.angles;
        body.velocity = desc.velocity;
        body.is_dynamic = desc.is_dynamic;
        body.is_static = desc.is_static;
        body.is_trigger = desc.is_trigger;
        body.height = desc.height;
        body.mass = desc.mass;
        body.gravity = desc.gravity;
        body.presentation = desc.renderable.map(Presentation::Renderable);
        self.insert(body)
    }

    /// Adds a camera body with a cube volume around the camera position.
    pub fn add_camera(&mut self, desc: CameraDesc) -> Result<BodyId, PhysicsError> {
        if desc.is_dynamic && desc.is_static {
            return Err(PhysicsError::InvalidBody("a camera cannot be both dynamic and static".to_owned()));
        }
        check_vec("position", desc.position)?;
        check_scalar("height", desc.height.unwrap_or(self.config.camera_height))?;
        check_scalar("gravity scale", desc.gravity)?;
        check_mass(desc.is_dynamic, desc.mass)?;
        let id = self.allocate_body();
        let half = Vec3::splat(self.config.camera_half_extent);
        let mut body = Body::new(id, BodyKind::Camera, desc.position, &[Aabb::new(-half, half)])
            .ok_or_else(|| PhysicsError::InvalidBody("camera volume".to_owned()))?;
        body.is_dynamic = desc.is_dynamic;
        body.is_static = desc.is_static;
        body.is_trigger = desc.is_trigger;
        body.height = desc.height.unwrap_or(self.config.camera_height);
        body.mass = desc.mass;
        body.gravity = desc.gravity;
        body.presentation = Some(Presentation::Camera(desc.camera));
        self.insert(body)
    }

    /// Adds a static walkable plane whose top is at `position.y`, spanning
    /// `width` along X and `depth` along Z.
    pub fn add_plane(&mut self, position: Vec3, width: f32, depth: f32) -> Result<BodyId, PhysicsError> {
        if !(width.is_finite() && depth.is_finite() && width > 0.0 && depth > 0.0) {
            return Err(PhysicsError::InvalidBody(format!("plane size must be positive, got {width}x{depth}")));
        }
        check_vec("position", position)?;
        let footprint = Footprint { half_width: width * 0.5, half_depth: depth * 0.5, thickness: PLANE_THICKNESS };
        let local = Aabb::new(
            Vec3::new(-footprint.half_width, -PLANE_THICKNESS, -footprint.half_depth),
            Vec3::new(footprint.half_width, 0.0, footprint.half_depth),
        );
        let id = self.allocate_body();
        let mut body = Body::new(id, BodyKind::Plane, position, &[local])
            .ok_or_else(|| PhysicsError::InvalidBody("plane volume".to_owned()))?;
        body.is_static = true;
        body.footprint = Some(footprint);
        self.insert(body)
    }

    /// Adds a gravity-free bullet body. It is removed at the end of the
    /// first tick in which it overlaps a non-bullet.
    pub fn add_bullet(&mut self, position: Vec3, velocity: Vec3) -> Result<BodyId, PhysicsError> {
        check_vec("position", position)?;
        check_vec("velocity", velocity)?;
        let id = self.allocate_body();
        let half = Vec3::splat(BULLET_HALF_EXTENT);
        let mut body = Body::new(id, BodyKind::Bullet, position, &[Aabb::new(-half, half)])
            .ok_or_else(|| PhysicsError::InvalidBody("bullet volume".to_owned()))?;
        body.is_dynamic = true;
        body.gravity = 0.0;
        body.velocity = velocity;
        self.insert(body)
    }

    fn allocate_body(&mut self) -> BodyId {
        let id = BodyId::from_raw(self.next_body);
        self.next_body += 1;
        id
    }

    fn insert(&mut self, mut body: Body) -> Result<BodyId, PhysicsError> {
        body.sync_volume();
        body.dirty = false;
        self.sweep.add_object(body.id.raw(), &body.sweep_boxes())?;
        let id = body.id;
        debug!(%id, kind = ?body.kind, position = ?body.position, "body added");
        self.bodies.insert(id, body);
        Ok(id)
    }

    /// Removes a body, purging its broad-phase state and every reference
    /// other bodies hold to it.
    pub fn remove_object(&mut self, id: BodyId) -> Result<Body, PhysicsError> {
        let body = self.bodies.remove(&id).ok_or(PhysicsError::UnknownBody(id))?;
        let tracked = self.sweep.remove_object(id.raw());
        debug_assert!(tracked, "{id} was not in the broad phase");
        for other in self.bodies.values_mut() {
            if other.plane == Some(id) {
                other.plane = None;
                other.grounded = false;
            }
        }
        self.triggers.retain(|t| *t != id);
        debug!(%id, "body removed");
        Ok(body)
    }

    /// Adds `force` to the body's accumulator for the next tick.
    pub fn apply_force(&mut self, id: BodyId, force: Vec3) -> Result<(), PhysicsError> {
        check_vec("force", force)?;
        self.body_mut(id)?.force += force;
        Ok(())
    }

    /// Teleports a body and refreshes its volume and broad-phase entry.
    pub fn update_position(&mut self, id: BodyId, position: Vec3) -> Result<(), PhysicsError> {
        check_vec("position", position)?;
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::UnknownBody(id))?;
        body.position = position;
        refresh(&mut self.sweep, body)
    }

    /// Sets a body's orientation (degrees) and refreshes its volume and
    /// broad-phase entry.
    pub fn update_pyr(&mut self, id: BodyId, pitch: f32, yaw: f32, roll: f32) -> Result<(), PhysicsError> {
        check_angles((pitch, yaw, roll))?;
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::UnknownBody(id))?;
        (body.pitch, body.yaw, body.roll) = (pitch, yaw, roll);
        refresh(&mut self.sweep, body)
    }

    /// Fires a projectile from `origin` along `direction` at `speed`.
    ///
    /// A zero direction yields a stationary projectile that simply expires.
    pub fn fire_projectile(&mut self, origin: Vec3, direction: Vec3, speed: f32) -> ProjectileId {
        let id = ProjectileId::from_raw(self.next_projectile);
        self.next_projectile += 1;
        let velocity = direction.normalize() * speed;
        self.projectiles.push(Projectile::new(id, origin, velocity, self.config.projectile_lifetime));
        debug!(projectile = id.raw(), ?origin, ?velocity, "projectile fired");
        id
    }

    /// Trigger bodies within `trigger_padding` of `query`, in id order.
    pub fn get_triggers(&self, query: &Aabb) -> Vec<BodyId> {
        let padding = self.config.trigger_padding;
        self.bodies
            .values()
            .filter(|b| b.is_trigger && b.volume.aabb().inflate(padding).overlaps(query))
            .map(Body::id)
            .collect()
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Fails on a negative or non-finite `dt`, or when the height field has
    /// no sample under a grounded-capable body; the world is left
    /// mid-tick in that case and should not be ticked again.
    #[instrument(skip(self, terrain, presentation), fields(tick = self.ticks, bodies = self.bodies.len()))]
    pub fn tick(
        &mut self,
        dt: f32,
        terrain: &dyn HeightField,
        presentation: &mut dyn PresentationPort,
    ) -> Result<(), PhysicsError> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        self.triggers.clear();
        self.hits.clear();
        self.projectile_hits.clear();

        self.advance_projectiles(dt);

        let order: Vec<BodyId> = self.bodies.keys().copied().collect();
        let mut processed = BTreeSet::new();
        let mut resolved = BTreeSet::new();
        let mut contacts = Vec::new();
        for id in order {
            self.integrate(id, dt)?;
            self.ground(id, terrain)?;
            let body = self.bodies.get_mut(&id).ok_or(PhysicsError::UnknownBody(id))?;
            body.sync_volume();
            let pairs = self.collider.broad_collide(&mut self.sweep, body)?;
            processed.insert(id);
            let due: Vec<BroadPair> = pairs
                .into_iter()
                .filter(|pair| {
                    pair.other(id.raw()).is_some_and(|other| processed.contains(&BodyId::from_raw(other)))
                        && resolved.insert(*pair)
                })
                .collect();
            contacts.extend(self.collider.resolve_collisions(&due, &mut self.bodies));
        }

        let doomed = self.route(&contacts);
        self.collect_proximity_triggers();
        self.sync_presentation(presentation);
        self.cleanup();
        for bullet in doomed {
            self.remove_object(bullet)?;
        }
        self.ticks += 1;
        Ok(())
    }

    fn advance_projectiles(&mut self, dt: f32) {
        let substeps = self.config.projectile_substeps;
        let bodies = &self.bodies;
        let hits = &mut self.projectile_hits;
        self.projectiles.retain_mut(|p| {
            if let Some(hit) = p.advance(dt, substeps, bodies) {
                debug!(projectile = hit.projectile.raw(), target = %hit.target, "projectile hit");
                hits.push(hit);
                return false;
            }
            !p.expired()
        });
    }

    fn integrate(&mut self, id: BodyId, dt: f32) -> Result<(), PhysicsError> {
        let gravity = self.config.gravity;
        let damping = self.config.damping;
        let body = self.body_mut(id)?;
        if !body.is_dynamic {
            body.velocity = Vec3::ZERO;
            return Ok(());
        }
        let scale = if body.grounded { 0.0 } else { body.gravity };
        let accel = body.force / body.mass + Vec3::new(0.0, gravity * scale, 0.0);
        body.velocity = (body.velocity + accel * dt) * damping;
        body.position += body.velocity * dt;
        Ok(())
    }

    /// Clamps a movable body to the surface below it: its resting plane
    /// while it stays over the plane's footprint and height band, else the
    /// terrain.
    ///
    /// Any body at or below the floor is clamped and grounded, whichever way
    /// it is moving; only downward velocity is cancelled, so a body rising
    /// through the floor keeps climbing and leaves `grounded` once it clears
    /// the hysteresis band.
    fn ground(&mut self, id: BodyId, terrain: &dyn HeightField) -> Result<(), PhysicsError> {
        let hysteresis = self.config.ground_hysteresis;
        let body = self.bodies.get(&id).ok_or(PhysicsError::UnknownBody(id))?;
        if !body.is_dynamic || body.is_static || body.kind == BodyKind::Bullet {
            return Ok(());
        }
        let (x, z) = (body.position.x(), body.position.z());
        let foot = body.position.y() - body.height;
        let plane_top = body.plane.and_then(|plane_id| {
            let plane = self.bodies.get(&plane_id)?;
            let footprint = plane.footprint?;
            let top = plane.position.y();
            let in_band = foot >= top - footprint.thickness && foot <= top + hysteresis;
            (footprint.covers(plane.position, x, z) && in_band).then_some(top)
        });
        let left_plane = body.plane.is_some() && plane_top.is_none();
        let surface = match plane_top {
            Some(top) => top,
            None => terrain.height_at(x, z).ok_or(PhysicsError::HeightUnavailable { x, z })?,
        };

        let body = self.body_mut(id)?;
        if left_plane {
            trace!(%id, "left resting plane");
            body.plane = None;
            body.grounded = false;
        }
        let floor = surface + body.height;
        let y = body.position.y();
        if y <= floor {
            body.position = body.position.with_y(floor);
            if body.velocity.y() < 0.0 {
                body.velocity = body.velocity.with_y(0.0);
            }
            body.grounded = true;
        } else if y > floor + hysteresis {
            body.grounded = false;
        }
        Ok(())
    }

    /// Applies routed contacts; returns bullets to remove after the tick.
    fn route(&mut self, contacts: &[Contact]) -> Vec<BodyId> {
        let mut doomed = BTreeSet::new();
        for contact in contacts {
            match contact.response {
                PairResponse::Trigger { trigger, .. } => self.triggers.push(trigger),
                PairResponse::Ground { plane, body } => {
                    if let Some(body) = self.bodies.get_mut(&body) {
                        if body.plane.is_none() {
                            trace!(body = %body.id, %plane, "landed on plane");
                            body.plane = Some(plane);
                        }
                    }
                }
                PairResponse::Hit { bullet, target } => {
                    debug!(%bullet, %target, "bullet hit");
                    self.hits.push(BulletHit { bullet, target });
                    doomed.insert(bullet);
                }
                PairResponse::Impulse | PairResponse::Ignore => {}
            }
        }
        self.hits.sort_unstable();
        doomed.into_iter().collect()
    }

    fn collect_proximity_triggers(&mut self) {
        let padding = self.config.trigger_padding;
        let cameras: Vec<&Body> = self.bodies.values().filter(|b| b.is_camera()).collect();
        for trigger in self.bodies.values().filter(|b| b.is_trigger) {
            if cameras.iter().any(|cam| cam.id != trigger.id && trigger.volume.intersects(&cam.volume, padding)) {
                self.triggers.push(trigger.id);
            }
        }
        self.triggers.sort_unstable();
        self.triggers.dedup();
    }

    fn sync_presentation(&self, presentation: &mut dyn PresentationPort) {
        for body in self.bodies.values() {
            match body.presentation {
                Some(Presentation::Renderable(rid)) => presentation.set_renderable_pose(rid, &body.pose()),
                Some(Presentation::Camera(cid)) => presentation.set_camera_pose(cid, &body.pose()),
                None => {}
            }
        }
    }

    fn cleanup(&mut self) {
        let decay = self.config.decay;
        let epsilon = self.config.velocity_epsilon;
        for body in self.bodies.values_mut() {
            body.force = Vec3::ZERO;
            body.velocity = (body.velocity * decay).snap_to_zero(epsilon);
        }
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, PhysicsError> {
        self.bodies.get_mut(&id).ok_or(PhysicsError::UnknownBody(id))
    }

    /// Looks up a body.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Every body, in id order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` when the world has no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Live projectiles, in firing order.
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Triggers reported by the last tick, in id order.
    pub fn triggers(&self) -> &[BodyId] {
        &self.triggers
    }

    /// Bullet hits from the last tick.
    pub fn hits(&self) -> &[BulletHit] {
        &self.hits
    }

    /// Projectile hits from the last tick, in firing order.
    pub fn projectile_hits(&self) -> &[ProjectileHit] {
        &self.projectile_hits
    }

    /// Ticks completed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Broad-phase state, for diagnostics.
    pub fn sweep(&self) -> &SweepAndPrune {
        &self.sweep
    }
}

fn check_mass(dynamic: bool, mass: f32) -> Result<(), PhysicsError> {
    if dynamic && !(mass.is_finite() && mass > 0.0) {
        return Err(PhysicsError::InvalidMass(mass));
    }
    Ok(())
}

fn check_vec(what: &'static str, v: Vec3) -> Result<(), PhysicsError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::NonFinite(what))
    }
}

fn check_scalar(what: &'static str, v: f32) -> Result<(), PhysicsError> {
    check_vec(what, Vec3::splat(v))
}

fn check_angles((pitch, yaw, roll): (f32, f32, f32)) -> Result<(), PhysicsError> {
    check_vec("orientation", Vec3::new(pitch, yaw, roll))
}

fn refresh(sweep: &mut SweepAndPrune, body: &mut Body) -> Result<(), PhysicsError> {
    if body.sync_volume() {
        sweep.update_object(body.id.raw(), &body.sweep_boxes())?;
        body.dirty = false;
    }
    Ok(())
}
