use std::path::PathBuf;
use std::process::Command;

use crate::application::ports::SirenPort;
use crate::domain::errors::{DomainError, DomainResult};

/// Reproduce un WAV con `aplay` sin bloquear al llamante.
pub struct AplaySiren {
    player: String,
    sound: PathBuf,
}

impl AplaySiren {
    pub fn new(sound: impl Into<PathBuf>) -> Self {
        Self { player: "aplay".into(), sound: sound.into() }
    }

    /// Otro reproductor con la misma interfaz (`<player> <wav>`).
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = player.into();
        self
    }
}

impl SirenPort for AplaySiren {
    fn sound(&self) -> DomainResult<()> {
        if !self.sound.exists() {
            return Err(DomainError::NotFound(self.sound.display().to_string()));
        }
        let mut child = Command::new(&self.player)
            .arg("-q")
            .arg(&self.sound)
            .spawn()
            .map_err(|e| DomainError::OperationFailed(format!("{}: {e}", self.player)))?;
        tracing::warn!("🚓 Avisando a la policía... sirena en marcha");

        // Recoge el proceso al terminar para no dejar zombis
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!("Sirena: {e}");
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sound_file_is_not_found() {
        let siren = AplaySiren::new("/nonexistent/siren.wav");
        assert!(matches!(siren.sound(), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn missing_player_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("siren.wav");
        std::fs::write(&wav, b"RIFF").unwrap();
        let siren = AplaySiren::new(&wav).with_player("/nonexistent/player-binary");
        assert!(matches!(siren.sound(), Err(DomainError::OperationFailed(_))));
    }
}
