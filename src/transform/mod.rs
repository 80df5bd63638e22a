//! Winding and coordinate-system conversion.

pub mod coordinates;
