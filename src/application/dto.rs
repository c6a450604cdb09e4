use serde::{Deserialize, Serialize};

use crate::domain::camera::CameraInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraEntry {
    pub index: u32,
    pub card: String,
    pub path: String,
}

impl From<CameraInfo> for CameraEntry {
    fn from(c: CameraInfo) -> Self {
        let index = c.id.path
            .chars()
            .filter(|ch| ch.is_ascii_digit())
            .collect::<String>()
            .parse::<u32>()
            .unwrap_or(0);
        Self { index, card: c.card, path: c.id.path }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CamerasResponse {
    pub cameras: Vec<CameraEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
