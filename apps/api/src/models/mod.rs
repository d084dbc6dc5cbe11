pub mod geometry;
pub mod node;
pub mod target;
