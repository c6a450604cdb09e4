pub mod client;
pub mod wire;

pub use client::{Credentials, GoogleVisionClient, DEFAULT_ENDPOINT};
