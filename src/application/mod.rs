pub mod annotate;
pub mod dto;
pub mod emotion_watch;
pub mod ports;
pub mod preview;
pub mod sampling;
pub mod services;
pub mod threat_watch;
