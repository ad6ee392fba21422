//! Process Audio Backend
//!
//! Plays sounds by spawning an external player (ffplay by default) for each
//! playback. Loading only checks that the file is there and non-empty; the
//! player does the decoding.
//!
//! The command line is a template. `{path}`, `{offset}`, `{duration}` and
//! `{volume}` are substituted per playback, anywhere inside an argument, so
//! `volume={volume}` works as well as a bare `{path}`.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use valentine_conductor::{AudioBackend, AudioConfig, AudioError, PlayRequest, SoundHandle, SoundSource};

/// Audio backend that shells out to a player command
#[derive(Clone, Debug)]
pub struct ProcessAudio {
    /// Command template; empty means no playback
    player: Vec<String>,
}

impl ProcessAudio {
    /// Create a backend with the given command template
    pub fn new(player: Vec<String>) -> Self {
        Self { player }
    }

    /// Create a backend from audio configuration
    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(config.player.clone())
    }

    /// The command template
    pub fn player(&self) -> &[String] {
        &self.player
    }

    /// Expand the template for one playback
    ///
    /// Returns `None` when no player is configured.
    pub fn command_line(&self, sound: &SoundHandle, request: PlayRequest) -> Option<Vec<String>> {
        if self.player.is_empty() {
            return None;
        }

        let duration = request
            .duration
            .unwrap_or_else(|| sound.clip.saturating_sub(request.offset));
        let path = sound.path.display().to_string();
        let offset = format!("{:.3}", request.offset.as_secs_f64());
        let duration = format!("{:.3}", duration.as_secs_f64());
        let volume = format!("{:.2}", request.volume.clamp(0.0, 1.0));

        Some(
            self.player
                .iter()
                .map(|arg| {
                    arg.replace("{path}", &path)
                        .replace("{offset}", &offset)
                        .replace("{duration}", &duration)
                        .replace("{volume}", &volume)
                })
                .collect(),
        )
    }
}

#[async_trait]
impl AudioBackend for ProcessAudio {
    fn name(&self) -> &str {
        self.player.first().map_or("none", String::as_str)
    }

    async fn load(&self, source: &SoundSource) -> Result<SoundHandle, AudioError> {
        if self.player.is_empty() {
            return Err(AudioError::Disabled);
        }

        let metadata = tokio::fs::metadata(&source.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AudioError::NotFound {
                    path: source.path.clone(),
                }
            } else {
                AudioError::Io {
                    path: source.path.clone(),
                    source: e,
                }
            }
        })?;

        if metadata.len() == 0 {
            return Err(AudioError::Empty {
                path: source.path.clone(),
            });
        }

        Ok(SoundHandle {
            kind: source.kind,
            path: source.path.clone(),
            clip: source.clip,
            size_bytes: metadata.len(),
        })
    }

    fn play(&self, sound: &SoundHandle, request: PlayRequest) {
        let Some(args) = self.command_line(sound, request) else {
            return;
        };
        let Some((program, rest)) = args.split_first() else {
            return;
        };

        let spawned = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    if let Err(e) = child.wait().await {
                        tracing::debug!(error = %e, "Player did not exit cleanly");
                    }
                });
            }
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "Failed to start player");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use valentine_conductor::SoundKind;

    fn handle() -> SoundHandle {
        SoundHandle {
            kind: SoundKind::Talking,
            path: PathBuf::from("/tmp/talking.mp3"),
            clip: Duration::from_secs(15),
            size_bytes: 10,
        }
    }

    fn source(path: PathBuf) -> SoundSource {
        SoundSource {
            kind: SoundKind::Hover,
            path,
            clip: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_command_line_substitutes_placeholders() {
        let audio = ProcessAudio::new(
            ["play", "-ss", "{offset}", "-t", "{duration}", "volume={volume}", "{path}"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        let request = PlayRequest {
            offset: Duration::from_millis(4500),
            duration: Some(Duration::from_millis(1500)),
            volume: 0.5,
        };

        assert_eq!(
            audio.command_line(&handle(), request).unwrap(),
            vec![
                "play",
                "-ss",
                "4.500",
                "-t",
                "1.500",
                "volume=0.50",
                "/tmp/talking.mp3"
            ]
        );
    }

    #[test]
    fn test_command_line_plays_to_end_without_duration() {
        let audio = ProcessAudio::new(vec!["play".into(), "{duration}".into()]);
        let request = PlayRequest {
            offset: Duration::from_secs(5),
            duration: None,
            volume: 1.0,
        };
        assert_eq!(
            audio.command_line(&handle(), request).unwrap(),
            vec!["play", "10.000"]
        );
    }

    #[test]
    fn test_empty_player_has_no_command() {
        let audio = ProcessAudio::new(Vec::new());
        let request = PlayRequest {
            offset: Duration::ZERO,
            duration: None,
            volume: 1.0,
        };
        assert!(audio.command_line(&handle(), request).is_none());
        assert_eq!(audio.name(), "none");
    }

    #[tokio::test]
    async fn test_load_disabled_without_player() {
        let audio = ProcessAudio::new(Vec::new());
        let result = audio.load(&source(PathBuf::from("/nope.mp3"))).await;
        assert!(matches!(result, Err(AudioError::Disabled)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let audio = ProcessAudio::new(vec!["ffplay".into()]);
        let path = PathBuf::from("/definitely/not/here/hover.mp3");
        let result = audio.load(&source(path.clone())).await;
        match result {
            Err(AudioError::NotFound { path: missing }) => assert_eq!(missing, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_empty_file() {
        let audio = ProcessAudio::new(vec!["ffplay".into()]);
        let file = NamedTempFile::new().unwrap();
        let result = audio.load(&source(file.path().to_path_buf())).await;
        assert!(matches!(result, Err(AudioError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_load_ready_file() {
        let audio = ProcessAudio::new(vec!["ffplay".into()]);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ID3 not really an mp3").unwrap();

        let handle = audio
            .load(&source(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(handle.kind, SoundKind::Hover);
        assert_eq!(handle.size_bytes, 21);
        assert_eq!(handle.clip, Duration::from_secs(3));
    }
}
