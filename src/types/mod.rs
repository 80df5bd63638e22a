pub mod bbox;
pub mod material;
pub mod mesh;
pub mod mesh_group;
pub mod ray;
pub mod vertex;

pub use bbox::BoundingBox;
pub use material::Material;
pub use mesh::Mesh;
pub use mesh_group::{CoordSys, FaceWinding, MapMode, MeshGroup};
pub use ray::Ray;
pub use vertex::{BasicVertex, Triangle, VertexDescr, WeightId};
