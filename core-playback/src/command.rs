//! Commands sent from the control facade to the playback service.

use std::time::Duration;

use crate::config::{OptionsUpdate, PlayerConfig};

/// Arguments of a `Play` command. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayRequest {
    /// Source to adopt; `None` replays the previously adopted URL.
    pub url: Option<String>,
    /// Output volume applied before starting.
    pub volume: Option<f32>,
    /// Where to start; stored as a pending seek until an engine exists.
    pub start_position: Option<Duration>,
    /// Request headers as a JSON object string.
    pub headers: Option<String>,
}

impl PlayRequest {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_start_position(mut self, position: Duration) -> Self {
        self.start_position = Some(position);
        self
    }

    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = Some(headers.into());
        self
    }
}

/// Raw theme color strings; unparsable values are ignored per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeColors {
    pub title_color: Option<String>,
    pub subtitle_color: Option<String>,
    pub background_color: Option<String>,
}

/// Facade -> core command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a session. Must be the first accepted command.
    Create(PlayerConfig),
    /// Tear the session down. Safe from any state, idempotent.
    Destroy,
    Play(PlayRequest),
    Pause,
    Resume,
    Stop,
    /// Pause when playing, otherwise resume (or replay the last URL).
    Toggle,
    Seek(Duration),
    SetVolume(f32),
    ChangeTrack {
        url: String,
        headers: Option<String>,
        start_position: Option<Duration>,
    },
    UpdateStatusSurface {
        title: Option<String>,
        subtitle: Option<String>,
    },
    UpdateStatusTheme(ThemeColors),
    UpdateOptions(OptionsUpdate),
}

impl Command {
    /// Short name used in logs and spans.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create(_) => "create",
            Command::Destroy => "destroy",
            Command::Play(_) => "play",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
            Command::Toggle => "toggle",
            Command::Seek(_) => "seek",
            Command::SetVolume(_) => "set_volume",
            Command::ChangeTrack { .. } => "change_track",
            Command::UpdateStatusSurface { .. } => "update_status_surface",
            Command::UpdateStatusTheme(_) => "update_status_theme",
            Command::UpdateOptions(_) => "update_options",
        }
    }
}

/// What the service did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was processed by the active session.
    Applied,
    /// No session was active (before `Create`, after `Destroy`, or a repeated
    /// `Create`); the command was dropped.
    Ignored,
}
