//! Geometry algorithms on [`MeshGroup`](crate::MeshGroup) and
//! [`Mesh`](crate::Mesh): normals, flattening, merging, export and picking.

pub mod export;
pub mod flatten;
pub mod merge;
pub mod normals;
pub mod picking;

pub use export::GroupView;
pub use picking::PickedTriangle;
