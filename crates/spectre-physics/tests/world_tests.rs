// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Integration tests for the world tick pipeline.

use proptest::prelude::*;
use spectre_geom::{Aabb, Vec3};
use spectre_physics::{
    update, BodyId, BulletHit, CameraDesc, CameraId, FlatGround, Heightmap, ModelDesc, NullPresentation, PhysicsConfig,
    PhysicsError, PhysicsWorld, PoseRecorder, RenderableId, SimContext,
};

const DT: f32 = 1.0 / 60.0;

/// No gravity, no damping, no decay.
fn quiet() -> PhysicsConfig {
    PhysicsConfig { gravity: 0.0, damping: 1.0, decay: 1.0, ..PhysicsConfig::default() }
}

fn step(world: &mut PhysicsWorld, ground: f32) {
    world.tick(DT, &FlatGround(ground), &mut NullPresentation).expect("tick");
}

#[test]
fn head_on_cubes_exchange_velocity_once_and_separate() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let a = world.add_model(ModelDesc::cube(Vec3::ZERO, 0.5).velocity(Vec3::UNIT_X)).expect("a");
    let b = world.add_model(ModelDesc::cube(Vec3::new(3.0, 0.0, 0.0), 0.5)).expect("b");

    let mut collided_at = None;
    for tick in 0..200 {
        let pairs_before = world.sweep().true_collisions();
        assert!(pairs_before.is_empty(), "pair reported before contact at tick {tick}");
        step(&mut world, -100.0);
        if world.body(b).expect("b").velocity().x() > 0.5 {
            collided_at = Some(tick);
            break;
        }
    }
    let tick = collided_at.expect("bodies collided");
    assert!((110..=130).contains(&tick), "collided at tick {tick}");

    let (ba, bb) = (world.body(a).expect("a"), world.body(b).expect("b"));
    assert_eq!(ba.velocity(), Vec3::ZERO);
    assert!((bb.velocity().x() - 1.0).abs() < 1e-5);
    assert!(bb.position().x() - ba.position().x() > 1.0, "still interpenetrating");

    // The corrected poses are swept next tick and the pair disappears.
    step(&mut world, -100.0);
    assert!(world.sweep().true_collisions().is_empty());
    for _ in 0..60 {
        step(&mut world, -100.0);
    }
    assert_eq!(world.body(a).expect("a").velocity(), Vec3::ZERO);
    assert!((world.body(b).expect("b").velocity().x() - 1.0).abs() < 1e-5);
}

#[test]
fn overlapping_pair_is_resolved_once_per_tick() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let a = world.add_model(ModelDesc::cube(Vec3::ZERO, 0.5).velocity(Vec3::UNIT_X)).expect("a");
    let b = world.add_model(ModelDesc::cube(Vec3::new(0.99, 0.0, 0.0), 0.5).velocity(-Vec3::UNIT_X)).expect("b");
    step(&mut world, -100.0);
    // A second application would swap the velocities back.
    assert!((world.body(a).expect("a").velocity().x() + 1.0).abs() < 1e-5);
    assert!((world.body(b).expect("b").velocity().x() - 1.0).abs() < 1e-5);
}

#[test]
fn projectile_hits_thin_static_box_within_one_tick() {
    let mut world = PhysicsWorld::default();
    let bounds = Aabb::new(Vec3::new(-0.5, -1.0, -1.0), Vec3::new(0.5, 1.0, 1.0));
    let target = world
        .add_model(ModelDesc::new(Vec3::new(4.5, 10.0, 0.0), vec![bounds]).dynamic(false).fixed(true))
        .expect("target");
    let shot = world.fire_projectile(Vec3::new(0.0, 10.0, 0.0), Vec3::UNIT_X, 500.0);
    assert_eq!(world.projectiles().len(), 1);

    step(&mut world, 0.0);
    let hits = world.projectile_hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].projectile, shot);
    assert_eq!(hits[0].target, target);
    assert!((4.0..=5.0).contains(&hits[0].point.x()));
    assert!(world.projectiles().is_empty());
}

#[test]
fn projectile_expires_after_lifetime() {
    let config = PhysicsConfig { projectile_lifetime: 0.04, ..PhysicsConfig::default() };
    let mut world = PhysicsWorld::new(config).expect("config");
    world.fire_projectile(Vec3::ZERO, Vec3::UNIT_Y, 10.0);
    step(&mut world, -100.0);
    step(&mut world, -100.0);
    assert_eq!(world.projectiles().len(), 1);
    step(&mut world, -100.0);
    assert!(world.projectiles().is_empty());
    assert!(world.projectile_hits().is_empty());
}

fn drop_until_grounded(world: &mut PhysicsWorld, id: BodyId, ground: f32) {
    let mut ticks = 0;
    while !world.body(id).expect("body").grounded() {
        assert!(ticks < 600, "body never grounded");
        step(world, ground);
        ticks += 1;
    }
}

#[test]
fn grounded_body_at_rest_stays_put() {
    let mut world = PhysicsWorld::default();
    let id = world.add_model(ModelDesc::cube(Vec3::new(0.0, 5.0, 0.0), 0.5).height(0.5)).expect("add");
    drop_until_grounded(&mut world, id, 0.0);
    let body = world.body(id).expect("body");
    assert_eq!(body.position().y(), 0.5);
    assert_eq!(body.velocity().y(), 0.0);

    let before = body.position();
    step(&mut world, 0.0);
    let body = world.body(id).expect("body");
    assert_eq!(body.position(), before);
    assert!(body.grounded());
}

#[test]
fn grounding_has_hysteresis() {
    let mut world = PhysicsWorld::default();
    let id = world.add_model(ModelDesc::cube(Vec3::new(0.0, 0.5, 0.0), 0.5).height(0.5)).expect("add");
    step(&mut world, 0.0);
    assert!(world.body(id).expect("body").grounded());

    // Inside the band: still grounded.
    world.update_position(id, Vec3::new(0.0, 0.53, 0.0)).expect("nudge");
    step(&mut world, 0.0);
    assert!(world.body(id).expect("body").grounded());

    // Above the band: airborne, then falls back.
    world.update_position(id, Vec3::new(0.0, 1.5, 0.0)).expect("lift");
    step(&mut world, 0.0);
    assert!(!world.body(id).expect("body").grounded());
    drop_until_grounded(&mut world, id, 0.0);
    assert_eq!(world.body(id).expect("body").position().y(), 0.5);
}

#[test]
fn body_lands_on_plane_and_falls_off_its_edge() {
    let mut world = PhysicsWorld::default();
    let plane = world.add_plane(Vec3::new(0.0, 2.0, 0.0), 4.0, 4.0).expect("plane");
    let id = world.add_model(ModelDesc::cube(Vec3::new(0.0, 4.0, 0.0), 0.5).height(0.5)).expect("body");

    drop_until_grounded(&mut world, id, 0.0);
    let body = world.body(id).expect("body");
    assert_eq!(body.plane(), Some(plane));
    assert_eq!(body.position().y(), 2.5);
    assert_eq!(world.body(plane).expect("plane").position(), Vec3::new(0.0, 2.0, 0.0));

    world.update_position(id, Vec3::new(5.0, 2.5, 0.0)).expect("walk off");
    step(&mut world, 0.0);
    let body = world.body(id).expect("body");
    assert_eq!(body.plane(), None);
    assert!(!body.grounded());
    drop_until_grounded(&mut world, id, 0.0);
    assert_eq!(world.body(id).expect("body").position().y(), 0.5);
}

#[test]
fn removing_a_plane_releases_bodies_resting_on_it() {
    let mut world = PhysicsWorld::default();
    let plane = world.add_plane(Vec3::new(0.0, 2.0, 0.0), 4.0, 4.0).expect("plane");
    let id = world.add_model(ModelDesc::cube(Vec3::new(0.0, 3.0, 0.0), 0.5).height(0.5)).expect("body");
    drop_until_grounded(&mut world, id, 0.0);
    assert_eq!(world.body(id).expect("body").plane(), Some(plane));

    world.remove_object(plane).expect("remove");
    assert!(!world.sweep().contains(plane.raw()));
    let body = world.body(id).expect("body");
    assert_eq!(body.plane(), None);
    assert!(!body.grounded());
    drop_until_grounded(&mut world, id, 0.0);
    assert_eq!(world.body(id).expect("body").position().y(), 0.5);
}

#[test]
fn triggers_report_cameras_by_pair_and_padded_proximity() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let camera = world.add_camera(CameraDesc::new(CameraId(1), Vec3::ZERO)).expect("camera");
    let near = world
        .add_model(ModelDesc::cube(Vec3::new(5.55, 0.0, 0.0), 0.5).dynamic(false).trigger(true))
        .expect("near");
    let inside = world
        .add_model(ModelDesc::cube(Vec3::new(0.0, 0.0, 4.0), 0.5).dynamic(false).trigger(true))
        .expect("inside");
    let far = world
        .add_model(ModelDesc::cube(Vec3::new(20.0, 0.0, 0.0), 0.5).dynamic(false).trigger(true))
        .expect("far");
    // A trigger is not solid: this body passes through without response.
    let passer = world
        .add_model(ModelDesc::cube(Vec3::new(20.0, 0.0, 0.0), 0.5).velocity(Vec3::UNIT_X))
        .expect("passer");

    step(&mut world, -100.0);
    let mut expected = vec![near, inside];
    expected.sort();
    assert_eq!(world.triggers(), expected.as_slice());
    assert!(!world.triggers().contains(&far));
    assert_eq!(world.body(passer).expect("passer").velocity(), Vec3::UNIT_X);

    let view = world.body(camera).expect("camera").volume().aabb();
    assert_eq!(world.get_triggers(&view), expected);

    world.remove_object(near).expect("remove");
    assert_eq!(world.triggers(), &[inside]);
}

#[test]
fn camera_bodies_get_configured_volume_and_height() {
    let config = PhysicsConfig { camera_half_extent: 2.0, camera_height: 7.0, ..PhysicsConfig::default() };
    let mut world = PhysicsWorld::new(config).expect("config");
    let id = world
        .add_camera(CameraDesc::new(CameraId(3), Vec3::new(0.0, 12.0, 0.0)).dynamic(true))
        .expect("camera");
    let body = world.body(id).expect("camera");
    assert!(body.is_camera());
    assert_eq!(body.height(), 7.0);
    assert_eq!(body.volume().aabb().max().to_array(), [2.0, 14.0, 2.0]);
    drop_until_grounded(&mut world, id, 1.0);
    assert_eq!(world.body(id).expect("camera").position().y(), 8.0);
}

#[test]
fn bullet_body_hits_target_and_is_removed() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let target = world
        .add_model(ModelDesc::cube(Vec3::new(2.0, 0.0, 0.0), 0.5).dynamic(false).fixed(true))
        .expect("target");
    let bullet = world.add_bullet(Vec3::ZERO, Vec3::new(60.0, 0.0, 0.0)).expect("bullet");

    step(&mut world, -100.0);
    assert!(world.hits().is_empty());
    step(&mut world, -100.0);
    assert_eq!(world.hits(), &[BulletHit { bullet, target }]);
    assert!(world.body(bullet).is_none());
    assert!(!world.sweep().contains(bullet.raw()));
    assert!(world.sweep().is_consistent());
    assert_eq!(world.body(target).expect("target").position(), Vec3::new(2.0, 0.0, 0.0));

    step(&mut world, -100.0);
    assert!(world.hits().is_empty());
}

#[test]
fn multi_part_model_never_collides_with_itself() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let parts = vec![
        Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
        Aabb::new(Vec3::new(-0.5, 0.5, -0.5), Vec3::new(0.5, 2.0, 0.5)),
    ];
    let id = world.add_model(ModelDesc::new(Vec3::ZERO, parts).velocity(Vec3::UNIT_Z)).expect("add");
    assert_eq!(world.sweep().proxies(id.raw()).map(<[_]>::len), Some(2));
    step(&mut world, -100.0);
    assert!(world.sweep().true_collisions().is_empty());
    assert_eq!(world.body(id).expect("body").velocity(), Vec3::UNIT_Z);
}

#[test]
fn update_pushes_poses_to_presentation() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let model = world
        .add_model(ModelDesc::cube(Vec3::ZERO, 0.5).renderable(RenderableId(9)).velocity(Vec3::new(6.0, 0.0, 0.0)))
        .expect("model");
    world.add_camera(CameraDesc::new(CameraId(2), Vec3::new(0.0, 50.0, 0.0))).expect("camera");
    world.update_pyr(model, 10.0, 20.0, 30.0).expect("pyr");

    let mut ctx = SimContext::new(world, FlatGround(-100.0), PoseRecorder::new());
    update(&mut ctx, 0.5).expect("update");
    let pose = ctx.presentation.renderable(RenderableId(9)).expect("model pose");
    assert_eq!(pose.position, Vec3::new(3.0, 0.0, 0.0));
    assert_eq!((pose.pitch, pose.yaw, pose.roll), (10.0, 20.0, 30.0));
    assert_eq!(ctx.presentation.camera(CameraId(2)).expect("camera pose").position.y(), 50.0);
    assert_eq!(ctx.presentation.writes(), 2);
}

#[test]
fn missing_height_fails_the_tick() {
    let map = Heightmap::new(2, 1.0, (0.0, 0.0), vec![0.0; 4]).expect("heightmap");
    let mut world = PhysicsWorld::default();
    world.add_model(ModelDesc::cube(Vec3::new(10.0, 5.0, 10.0), 0.5)).expect("add");
    let mut ctx = SimContext::new(world, map, NullPresentation);
    let err = update(&mut ctx, DT);
    assert!(matches!(err, Err(PhysicsError::HeightUnavailable { .. })));
}

#[test]
fn body_follows_heightmap_slope() {
    let map = Heightmap::new(2, 10.0, (0.0, 0.0), vec![0.0, 10.0, 0.0, 10.0]).expect("heightmap");
    let mut world = PhysicsWorld::default();
    let id = world.add_model(ModelDesc::cube(Vec3::new(5.0, 20.0, 5.0), 0.5).height(0.5)).expect("add");
    let mut ctx = SimContext::new(world, map, NullPresentation);
    for _ in 0..600 {
        update(&mut ctx, DT).expect("update");
    }
    let body = ctx.world.body(id).expect("body");
    assert!(body.grounded());
    assert!((body.position().y() - 5.5).abs() < 1e-4);
}

#[test]
fn model_drives_through_a_camera_volume_untouched() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    world.add_camera(CameraDesc::new(CameraId(1), Vec3::ZERO)).expect("camera");
    let model = world
        .add_model(ModelDesc::cube(Vec3::new(5.2, 0.0, 0.0), 0.5).velocity(Vec3::new(-1.0, 0.0, 0.0)))
        .expect("model");
    for _ in 0..60 {
        step(&mut world, -100.0);
        assert_eq!(world.body(model).expect("model").velocity(), Vec3::new(-1.0, 0.0, 0.0));
    }
    let x = world.body(model).expect("model").position().x();
    assert!((x - 4.2).abs() < 1e-3, "x = {x}");
}

#[test]
fn non_finite_inputs_are_rejected_without_touching_the_world() {
    let mut world = PhysicsWorld::default();
    let id = world.add_model(ModelDesc::cube(Vec3::new(0.0, 1.0, 0.0), 0.5)).expect("model");
    let nan = Vec3::new(f32::NAN, 0.0, 0.0);
    let inf = Vec3::new(0.0, f32::INFINITY, 0.0);

    assert!(matches!(world.update_position(id, nan), Err(PhysicsError::NonFinite(_))));
    assert!(matches!(world.update_pyr(id, 0.0, f32::NAN, 0.0), Err(PhysicsError::NonFinite(_))));
    assert!(matches!(world.apply_force(id, inf), Err(PhysicsError::NonFinite(_))));
    assert!(matches!(world.add_model(ModelDesc::cube(nan, 0.5)), Err(PhysicsError::NonFinite(_))));
    assert!(matches!(
        world.add_model(ModelDesc::cube(Vec3::ZERO, 0.5).velocity(inf)),
        Err(PhysicsError::NonFinite(_))
    ));
    assert!(matches!(world.add_camera(CameraDesc::new(CameraId(1), nan)), Err(PhysicsError::NonFinite(_))));
    assert!(matches!(world.add_plane(nan, 2.0, 2.0), Err(PhysicsError::NonFinite(_))));
    assert!(matches!(world.add_bullet(Vec3::ZERO, inf), Err(PhysicsError::NonFinite(_))));

    assert_eq!(world.len(), 1);
    assert_eq!(world.body(id).expect("model").position(), Vec3::new(0.0, 1.0, 0.0));
    step(&mut world, 0.0);
    assert!(world.body(id).expect("model").position().is_finite());
}

#[test]
fn trigger_padding_is_the_largest_reported_gap() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let camera = world.add_camera(CameraDesc::new(CameraId(1), Vec3::ZERO)).expect("camera");
    // Camera reaches x = 5.0; this trigger starts at x = 5.15.
    world
        .add_model(ModelDesc::cube(Vec3::new(5.65, 0.0, 0.0), 0.5).dynamic(false).trigger(true))
        .expect("trigger");
    step(&mut world, -100.0);
    assert!(world.triggers().is_empty());
    let view = world.body(camera).expect("camera").volume().aabb();
    assert!(world.get_triggers(&view).is_empty());
}

#[test]
fn body_rising_through_the_floor_is_grounded_but_keeps_climbing() {
    let mut world = PhysicsWorld::new(quiet()).expect("config");
    let id = world
        .add_model(ModelDesc::cube(Vec3::new(0.0, -1.0, 0.0), 0.5).height(0.5).velocity(Vec3::new(0.0, 2.0, 0.0)))
        .expect("model");
    step(&mut world, 0.0);
    let body = world.body(id).expect("model");
    assert!(body.grounded());
    assert_eq!(body.position().y(), 0.5);
    assert_eq!(body.velocity().y(), 2.0);

    for _ in 0..3 {
        step(&mut world, 0.0);
    }
    let body = world.body(id).expect("model");
    assert!(body.position().y() > 0.55);
    assert!(!body.grounded());
}

proptest! {
    #[test]
    fn static_body_is_never_moved(
        movers in prop::collection::vec(
            (prop::array::uniform3(-3.0_f32..3.0), prop::array::uniform3(-5.0_f32..5.0)),
            1..8,
        )
    ) {
        let mut world = PhysicsWorld::new(quiet()).expect("config");
        let wall = world
            .add_model(ModelDesc::cube(Vec3::ZERO, 1.0).dynamic(false).fixed(true))
            .expect("wall");
        for (position, velocity) in movers {
            world
                .add_model(ModelDesc::cube(Vec3::from(position), 0.5).velocity(Vec3::from(velocity)))
                .expect("mover");
        }
        for _ in 0..20 {
            step(&mut world, -100.0);
        }
        let wall = world.body(wall).expect("wall");
        prop_assert_eq!(wall.position(), Vec3::ZERO);
        prop_assert_eq!(wall.velocity(), Vec3::ZERO);
        prop_assert!(world.sweep().is_consistent());
    }
}
