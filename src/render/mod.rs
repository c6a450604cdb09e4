pub mod jpeg;
pub mod overlay;
pub mod stroke;

pub use jpeg::encode_jpeg;
pub use overlay::{Blend, Caption, HighlightStyle, Overlay};
