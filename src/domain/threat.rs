use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::detection::Detection;

/// Categorías de arma que disparan una alerta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatKind {
    Handgun,
    Longgun,
    Knife,
}

impl ThreatKind {
    pub const ALL: [ThreatKind; 3] = [ThreatKind::Handgun, ThreatKind::Longgun, ThreatKind::Knife];

    /// Clasifica el nombre de un objeto localizado.
    pub fn classify(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "handgun" => Some(ThreatKind::Handgun),
            "rifle" | "shot gun" | "shotgun" => Some(ThreatKind::Longgun),
            "kitchen knife" | "knife" | "tableware knife" => Some(ThreatKind::Knife),
            _ => None,
        }
    }

    pub fn banner(self) -> &'static str {
        match self {
            ThreatKind::Handgun => "GUN Detected",
            ThreatKind::Longgun => "Rifle/Shotgun Detected",
            ThreatKind::Knife => "Knife Detected",
        }
    }

    pub fn snapshot_stem(self) -> &'static str {
        match self {
            ThreatKind::Handgun => "detectedgun",
            ThreatKind::Longgun => "detectedshotgun",
            ThreatKind::Knife => "detectedknife",
        }
    }

    pub fn alert_message(self, site: &str) -> String {
        match self {
            ThreatKind::Handgun => {
                format!("GUN ALERT!!! A gun has been detected in {site}. Click the button to call for Backup!!")
            }
            ThreatKind::Longgun => format!(
                "Rifle/ShotGun ALERT!!! A Rifle/ShotGun has been detected in {site}. Click the button to call for Backup!!"
            ),
            ThreatKind::Knife => {
                format!("Knife Alert. A Knife has been detected in {site}. Click the Button to call for Backup!!")
            }
        }
    }
}

impl std::fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ThreatKind::Handgun => "handgun",
            ThreatKind::Longgun => "rifle/shotgun",
            ThreatKind::Knife => "knife",
        };
        f.write_str(name)
    }
}

/// Tipos de amenaza presentes en un muestreo, una vez cada uno y en el
/// orden en que aparecen.
pub fn threats_in(detections: &[Detection]) -> Vec<ThreatKind> {
    let mut found = Vec::new();
    for kind in detections
        .iter()
        .filter_map(|d| d.label.as_deref())
        .filter_map(ThreatKind::classify)
    {
        if !found.contains(&kind) {
            found.push(kind);
        }
    }
    found
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAlert {
    pub kind: ThreatKind,
    pub message: String,
    pub snapshot: Option<PathBuf>,
    pub raised_at: DateTime<Local>,
}

impl ThreatAlert {
    pub fn new(kind: ThreatKind, site: &str, snapshot: Option<PathBuf>) -> Self {
        Self { kind, message: kind.alert_message(site), snapshot, raised_at: Local::now() }
    }
}
