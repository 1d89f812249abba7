// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Presentation port: the only channel through which physics writes to
//! renderables and cameras.

use std::collections::BTreeMap;

use spectre_geom::Vec3;

use crate::body::{CameraId, RenderableId};

/// Final pose of a body for one tick. Angles are degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    /// World position of the body origin.
    pub position: Vec3,
    /// Rotation about X.
    pub pitch: f32,
    /// Rotation about Y.
    pub yaw: f32,
    /// Rotation about Z.
    pub roll: f32,
}

/// Presentation sync target.
///
/// Implementors receive one pose per presented body at the end of every
/// tick. Physics never reads presentation state back.
pub trait PresentationPort {
    /// Push the pose of the body that drives renderable `id`.
    fn set_renderable_pose(&mut self, id: RenderableId, pose: &Pose);

    /// Push the pose of the body that drives camera `id`.
    fn set_camera_pose(&mut self, id: CameraId, pose: &Pose);
}

/// Port that discards every write.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullPresentation;

impl PresentationPort for NullPresentation {
    fn set_renderable_pose(&mut self, _id: RenderableId, _pose: &Pose) {}

    fn set_camera_pose(&mut self, _id: CameraId, _pose: &Pose) {}
}

/// In-memory port that keeps the last pose written per target.
#[derive(Debug, Default, Clone)]
pub struct PoseRecorder {
    renderables: BTreeMap<RenderableId, Pose>,
    cameras: BTreeMap<CameraId, Pose>,
    writes: u64,
}

impl PoseRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last pose written for a renderable.
    pub fn renderable(&self, id: RenderableId) -> Option<&Pose> {
        self.renderables.get(&id)
    }

    /// Last pose written for a camera.
    pub fn camera(&self, id: CameraId) -> Option<&Pose> {
        self.cameras.get(&id)
    }

    /// Every renderable pose, in id order.
    pub fn renderables(&self) -> impl Iterator<Item = (&RenderableId, &Pose)> {
        self.renderables.iter()
    }

    /// Every camera pose, in id order.
    pub fn cameras(&self) -> impl Iterator<Item = (&CameraId, &Pose)> {
        self.cameras.iter()
    }

    /// Total writes received.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl PresentationPort for PoseRecorder {
    fn set_renderable_pose(&mut self, id: RenderableId, pose: &Pose) {
        self.renderables.insert(id, *pose);
        self.writes += 1;
    }

    fn set_camera_pose(&mut self, id: CameraId, pose: &Pose) {
        self.cameras.insert(id, *pose);
        self.writes += 1;
    }
}
