pub mod camera;
pub mod detection;
pub mod errors;
pub mod faces;
pub mod geometry;
pub mod stream;
pub mod threat;
