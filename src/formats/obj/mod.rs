//! Wavefront OBJ with its MTL material library.

pub mod mtl;
pub mod reader;
pub mod writer;

pub use reader::load_obj;
pub use writer::save_obj;
