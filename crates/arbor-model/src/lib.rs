//! Model and data types for arbor.
//!
//! `Model` is the immutable description of a kinematic tree (joints,
//! placements, inertias, frames). `Data` is the mutable scratch space the
//! algorithms write into, sized once from a `Model`.

pub mod data;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod joint;
pub mod limits;
pub mod model;

pub use data::Data;
pub use error::{ArborError, Result};
pub use frame::{Frame, FrameKind};
pub use geometry::{GeometryData, GeometryModel, GeometryObject, Shape};
pub use joint::{Joint, JointKind, MotionSubspace};
pub use limits::JointLimits;
pub use model::{Model, ModelBuilder, WORLD_ID};
