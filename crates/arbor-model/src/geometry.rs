//! Geometry attached to joints, for visualization and external collision tools.
//!
//! Shapes are opaque here: the model only tracks where each object sits so
//! that world placements can be handed to a renderer.

use crate::{ArborError, Model, Result};
use arbor_math::{Vec3, SE3};
use std::path::PathBuf;

/// Shape descriptor, never interpreted geometrically by arbor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Sphere with given radius.
    Sphere { radius: f64 },
    /// Box with half-extents.
    Box { half_extents: Vec3 },
    /// Cylinder along Z axis.
    Cylinder { radius: f64, length: f64 },
    /// Capsule along Z axis.
    Capsule { radius: f64, length: f64 },
    /// Mesh file with per-axis scale.
    Mesh { path: PathBuf, scale: Vec3 },
}

/// A shape rigidly attached to a joint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryObject {
    pub name: String,
    pub parent_joint: usize,
    pub parent_frame: usize,
    /// Placement relative to the parent joint frame.
    pub placement: SE3,
    pub shape: Shape,
    /// RGBA color.
    pub color: [f64; 4],
    /// Skip collision and distance queries for this object.
    pub disable_collision: bool,
}

impl GeometryObject {
    /// Object attached to `parent_joint`, placed in that joint's frame.
    pub fn new(name: &str, parent_joint: usize, parent_frame: usize, shape: Shape, placement: SE3) -> Self {
        Self {
            name: name.to_string(),
            parent_joint,
            parent_frame,
            placement,
            shape,
            color: [0.8, 0.8, 0.8, 1.0],
            disable_collision: false,
        }
    }

    pub fn with_color(mut self, color: [f64; 4]) -> Self {
        self.color = color;
        self
    }
}

/// Collection of geometry objects for one model.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryModel {
    pub objects: Vec<GeometryObject>,
}

impl GeometryModel {
    /// Empty geometry model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return its id.
    pub fn add_geometry_object(&mut self, object: GeometryObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Number of geometry objects.
    pub fn ngeoms(&self) -> usize {
        self.objects.len()
    }

    /// Index of the first object named `name`.
    pub fn geometry_id(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    /// Check that every object refers to a joint and frame of `model`.
    pub fn validate(&self, model: &Model) -> Result<()> {
        for obj in &self.objects {
            if obj.parent_joint >= model.njoints() {
                return Err(ArborError::InvalidJointIndex {
                    index: obj.parent_joint,
                    njoints: model.njoints(),
                });
            }
            if obj.parent_frame >= model.nframes() {
                return Err(ArborError::InvalidFrameIndex {
                    index: obj.parent_frame,
                    nframes: model.nframes(),
                });
            }
        }
        Ok(())
    }
}

/// World placements of geometry objects.
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// One placement per geometry object.
    pub placements: Vec<SE3>,
}

impl GeometryData {
    /// Identity placements sized for `geom_model`.
    pub fn new(geom_model: &GeometryModel) -> Self {
        Self {
            placements: vec![SE3::identity(); geom_model.ngeoms()],
        }
    }
}
