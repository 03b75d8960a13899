//! Named reference frames attached to joints.

use arbor_math::{Inertia, SE3};

/// What a frame marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameKind {
    /// User-defined point of interest (end effector, tool tip).
    Operational,
    /// Frame of a joint.
    Joint,
    /// Rigid attachment between links.
    Fixed,
    /// Link body.
    Body,
    /// Sensor mount.
    Sensor,
}

/// A frame rigidly attached to a joint. Frames never affect dynamics except
/// through the inertia appended when they are added as bodies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub name: String,
    /// Joint this frame is attached to.
    pub parent_joint: usize,
    /// Frame this frame was declared relative to.
    pub parent_frame: usize,
    /// Placement relative to the parent joint frame.
    pub placement: SE3,
    pub kind: FrameKind,
    /// Inertia carried by the frame (zero unless it is a body).
    pub inertia: Inertia,
}

impl Frame {
    /// Massless frame placed in its parent joint frame.
    pub fn new(
        name: &str,
        parent_joint: usize,
        parent_frame: usize,
        placement: SE3,
        kind: FrameKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            parent_joint,
            parent_frame,
            placement,
            kind,
            inertia: Inertia::zeros(),
        }
    }

    /// Attach an inertia, expressed in this frame.
    pub fn with_inertia(mut self, inertia: Inertia) -> Self {
        self.inertia = inertia;
        self
    }
}
