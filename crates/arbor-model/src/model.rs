//! Model definition: static description of a kinematic tree.

use crate::{ArborError, Data, Frame, FrameKind, Joint, JointKind, Result};
use arbor_math::{Inertia, Vec3, SE3, STANDARD_GRAVITY};
use std::ops::Range;
use tracing::{debug, warn};

/// Index of the universe joint and of its frame.
pub const WORLD_ID: usize = 0;

const WORLD_NAME: &str = "universe";

/// Static model of an articulated system.
///
/// Joint arrays are indexed `0..njoints()`. Joint 0 is the fixed universe
/// root and `parents[i] < i` holds for every other joint, so ascending index
/// order visits parents before children.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    /// Model name.
    pub name: String,
    /// Gravity vector in world frame.
    pub gravity: Vec3,
    /// Joint definitions.
    pub joints: Vec<Joint>,
    /// Joint names, unique.
    pub names: Vec<String>,
    /// Parent joint of each joint. The universe is its own parent.
    pub parents: Vec<usize>,
    /// Placement of each joint frame in its parent joint frame.
    pub placements: Vec<SE3>,
    /// Body inertia carried by each joint, in the joint frame.
    pub inertias: Vec<Inertia>,
    /// Offset of each joint in the configuration vector.
    pub idx_q: Vec<usize>,
    /// Offset of each joint in the tangent vector.
    pub idx_v: Vec<usize>,
    /// Frames. Frame 0 is the universe frame.
    pub frames: Vec<Frame>,
    /// Total configuration dimension.
    pub nq: usize,
    /// Total tangent dimension.
    pub nv: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self::empty()
    }
}

impl Model {
    /// Model holding only the universe joint and frame.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            gravity: Vec3::new(0.0, 0.0, -STANDARD_GRAVITY),
            joints: vec![Joint::new(JointKind::Fixed)],
            names: vec![WORLD_NAME.to_string()],
            parents: vec![WORLD_ID],
            placements: vec![SE3::identity()],
            inertias: vec![Inertia::zeros()],
            idx_q: vec![0],
            idx_v: vec![0],
            frames: vec![Frame::new(
                WORLD_NAME,
                WORLD_ID,
                WORLD_ID,
                SE3::identity(),
                FrameKind::Fixed,
            )],
            nq: 0,
            nv: 0,
        }
    }

    /// Number of joints, universe included.
    pub fn njoints(&self) -> usize {
        self.joints.len()
    }

    /// Number of frames, universe frame included.
    pub fn nframes(&self) -> usize {
        self.frames.len()
    }

    /// Id of the joint called `name`.
    pub fn joint_id(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Id of the first frame called `name`, optionally restricted to `kind`.
    pub fn frame_id(&self, name: &str, kind: Option<FrameKind>) -> Option<usize> {
        self.frames
            .iter()
            .position(|f| f.name == name && kind.map_or(true, |k| f.kind == k))
    }

    /// Configuration slice range of joint `i`.
    #[inline]
    pub fn q_range(&self, i: usize) -> Range<usize> {
        self.idx_q[i]..self.idx_q[i] + self.joints[i].nq()
    }

    /// Tangent slice range of joint `i`.
    #[inline]
    pub fn v_range(&self, i: usize) -> Range<usize> {
        self.idx_v[i]..self.idx_v[i] + self.joints[i].nv()
    }

    /// Allocate scratch data sized for this model.
    pub fn create_data(&self) -> Data {
        Data::new(self)
    }

    fn push_joint(&mut self, parent: usize, joint: Joint, placement: SE3, name: &str) -> Result<usize> {
        let id = self.njoints();
        if parent >= id {
            return Err(ArborError::InvalidJointIndex {
                index: parent,
                njoints: id,
            });
        }
        if self.joint_id(name).is_some() {
            return Err(ArborError::DuplicateJointName(name.to_string()));
        }
        joint.limits.check(joint.nq())?;

        self.idx_q.push(self.nq);
        self.idx_v.push(self.nv);
        self.nq += joint.nq();
        self.nv += joint.nv();
        self.joints.push(joint);
        self.names.push(name.to_string());
        self.parents.push(parent);
        self.placements.push(placement);
        self.inertias.push(Inertia::zeros());
        Ok(id)
    }

    fn push_frame(&mut self, frame: Frame, append_inertia: bool) -> Result<usize> {
        if frame.parent_joint >= self.njoints() {
            return Err(ArborError::InvalidJointIndex {
                index: frame.parent_joint,
                njoints: self.njoints(),
            });
        }
        if frame.parent_frame >= self.nframes() {
            return Err(ArborError::InvalidFrameIndex {
                index: frame.parent_frame,
                nframes: self.nframes(),
            });
        }
        if let Some(existing) = self.frame_id(&frame.name, Some(frame.kind)) {
            warn!(name = %frame.name, kind = ?frame.kind, id = existing, "frame already exists, keeping the existing one");
            return Ok(existing);
        }

        if append_inertia {
            let parent = frame.parent_joint;
            self.inertias[parent] += frame.inertia.se3_act(&frame.placement);
        }
        self.frames.push(frame);
        Ok(self.frames.len() - 1)
    }
}

/// Fluent builder for [`Model`].
///
/// Every joint gets a frame of kind [`FrameKind::Joint`] with the joint's
/// name. The first failing call is remembered and reported by
/// [`ModelBuilder::build`].
#[derive(Debug)]
pub struct ModelBuilder {
    model: Model,
    joint_frames: Vec<usize>,
    error: Option<ArborError>,
}

impl ModelBuilder {
    /// Start building a new model with standard gravity along -z.
    pub fn new() -> Self {
        Self {
            model: Model::empty(),
            joint_frames: vec![WORLD_ID],
            error: None,
        }
    }

    /// Set the model name.
    pub fn name(mut self, name: &str) -> Self {
        self.model.name = name.to_string();
        self
    }

    /// Set the gravity vector.
    pub fn gravity(mut self, g: Vec3) -> Self {
        self.model.gravity = g;
        self
    }

    fn record<T>(&mut self, res: Result<T>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                self.error.get_or_insert(e);
                None
            }
        }
    }

    /// Add a joint under `parent`, placed at `placement` in the parent joint frame.
    pub fn add_joint(
        mut self,
        name: &str,
        parent: usize,
        joint: impl Into<Joint>,
        placement: SE3,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let res = self.model.push_joint(parent, joint.into(), placement, name);
        if let Some(id) = self.record(res) {
            let frame = Frame::new(
                name,
                id,
                self.joint_frames[parent],
                SE3::identity(),
                FrameKind::Joint,
            );
            let res = self.model.push_frame(frame, false);
            if let Some(fid) = self.record(res) {
                self.joint_frames.push(fid);
            }
        }
        self
    }

    /// Add a joint and attach a body with `inertia` (in the joint frame).
    ///
    /// The body gets a [`FrameKind::Body`] frame with the same name.
    pub fn add_body(
        self,
        name: &str,
        parent: usize,
        joint: impl Into<Joint>,
        placement: SE3,
        inertia: Inertia,
    ) -> Self {
        let builder = self.add_joint(name, parent, joint, placement);
        if builder.error.is_some() {
            return builder;
        }
        let id = builder.model.njoints() - 1;
        let frame = Frame::new(
            name,
            id,
            builder.joint_frames[id],
            SE3::identity(),
            FrameKind::Body,
        )
        .with_inertia(inertia);
        builder.add_frame(frame, true)
    }

    /// Add a frame. With `append_inertia`, the frame's inertia is carried
    /// into its parent joint. A frame with the same name and kind as an
    /// existing one is not added again.
    pub fn add_frame(mut self, frame: Frame, append_inertia: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        let res = self.model.push_frame(frame, append_inertia);
        self.record(res);
        self
    }

    /// Validate and finalize the model.
    pub fn build(self) -> Result<Model> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let model = self.model;

        for (i, inertia) in model.inertias.iter().enumerate() {
            if !inertia.is_physical() {
                warn!(joint = i, name = %model.names[i], ?inertia, "inertia is not physically consistent");
            }
        }

        debug!(
            name = %model.name,
            njoints = model.njoints(),
            nframes = model.nframes(),
            nq = model.nq,
            nv = model.nv,
            "model built"
        );
        Ok(model)
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
