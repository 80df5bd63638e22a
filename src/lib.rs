pub mod config;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod pipeline;
pub mod transform;
pub mod types;

pub use config::{ConvertConfig, Options};
pub use error::{MeshError, Result, last_error, take_last_error};
pub use formats::{MeshFormat, MeshStats, compute_stats};
pub use geometry::{GroupView, PickedTriangle};
pub use pipeline::Pipeline;
pub use types::{
    BasicVertex, BoundingBox, CoordSys, FaceWinding, MapMode, Material, Mesh, MeshGroup, Ray,
    Triangle, VertexDescr, WeightId,
};
