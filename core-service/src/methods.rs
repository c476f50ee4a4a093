//! Named-method command surface.
//!
//! Hosts that talk over a string-keyed channel call methods by name with a
//! JSON argument object. Unknown names fail with
//! [`CoreError::NotImplemented`]; known names with unusable arguments fail
//! with [`CoreError::InvalidArguments`]; failures inside the player surface as
//! [`CoreError::Failed`].
//!
//! Numeric sentinels follow the host convention: a negative `volume` or
//! `position` passed to `play` means "not given", and `seek` to a negative
//! position does nothing.

use core_playback::{Command, OptionsUpdate, PlayRequest, PlayerConfig, ThemeColors};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Every method the surface understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Init,
    Dispose,
    Play,
    Pause,
    Resume,
    Stop,
    Toggle,
    Seek,
    SetVolume,
    SetUrl,
    UpdateNotification,
    UpdateNotificationTheme,
    UpdateOptions,
    Status,
}

impl Method {
    pub const ALL: [Method; 14] = [
        Method::Init,
        Method::Dispose,
        Method::Play,
        Method::Pause,
        Method::Resume,
        Method::Stop,
        Method::Toggle,
        Method::Seek,
        Method::SetVolume,
        Method::SetUrl,
        Method::UpdateNotification,
        Method::UpdateNotificationTheme,
        Method::UpdateOptions,
        Method::Status,
    ];

    pub fn from_name(name: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::Init => "init",
            Method::Dispose => "dispose",
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Resume => "resume",
            Method::Stop => "stop",
            Method::Toggle => "toggle",
            Method::Seek => "seek",
            Method::SetVolume => "setVolume",
            Method::SetUrl => "setUrl",
            Method::UpdateNotification => "updateNotification",
            Method::UpdateNotificationTheme => "updateNotificationTheme",
            Method::UpdateOptions => "updateOptions",
            Method::Status => "status",
        }
    }

    /// Turn `args` into the player command. `None` when there is nothing to
    /// send: `status` only reads state, and `seek` to a negative position is
    /// dropped.
    pub fn to_command(&self, args: Value) -> Result<Option<Command>> {
        let command = match self {
            Method::Init => {
                let args: InitArgs = self.parse(args)?;
                Command::Create(args.into_config(*self)?)
            }
            Method::Dispose => Command::Destroy,
            Method::Play => {
                let args: PlayArgs = self.parse(args)?;
                Command::Play(args.into_request())
            }
            Method::Pause => Command::Pause,
            Method::Resume => Command::Resume,
            Method::Stop => Command::Stop,
            Method::Toggle => Command::Toggle,
            Method::Seek => {
                let args: SeekArgs = self.parse(args)?;
                match optional_ms(Some(args.position)) {
                    Some(position) => Command::Seek(position),
                    None => return Ok(None),
                }
            }
            Method::SetVolume => {
                let args: VolumeArgs = self.parse(args)?;
                Command::SetVolume(args.volume as f32)
            }
            Method::SetUrl => {
                let args: UrlArgs = self.parse(args)?;
                Command::ChangeTrack {
                    url: args.url,
                    headers: args.headers,
                    start_position: optional_ms(args.position),
                }
            }
            Method::UpdateNotification => {
                let args: NotificationArgs = self.parse(args)?;
                Command::UpdateStatusSurface {
                    title: args.title,
                    subtitle: args.subtitle,
                }
            }
            Method::UpdateNotificationTheme => {
                let args: ThemeArgs = self.parse(args)?;
                Command::UpdateStatusTheme(ThemeColors {
                    title_color: args.title_color,
                    subtitle_color: args.subtitle_color,
                    background_color: args.background_color,
                })
            }
            Method::UpdateOptions => {
                let args: OptionsArgs = self.parse(args)?;
                Command::UpdateOptions(OptionsUpdate {
                    request_audio_focus: args.audio_focus,
                    progress_interval_ms: args
                        .position_notify_interval
                        .map(|ms| self.non_negative_ms("positionNotifyInterval", ms))
                        .transpose()?
                        .map(|interval| interval.as_millis() as u64),
                })
            }
            Method::Status => return Ok(None),
        };
        Ok(Some(command))
    }

    fn parse<T: DeserializeOwned>(&self, args: Value) -> Result<T> {
        let args = match args {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        serde_json::from_value(args).map_err(|e| self.invalid(e.to_string()))
    }

    fn non_negative_ms(&self, field: &str, value: i64) -> Result<Duration> {
        u64::try_from(value)
            .map(Duration::from_millis)
            .map_err(|_| self.invalid(format!("{} must not be negative", field)))
    }

    fn invalid(&self, message: String) -> CoreError {
        CoreError::InvalidArguments {
            method: self.name().to_string(),
            message,
        }
    }
}

fn optional_ms(value: Option<i64>) -> Option<Duration> {
    value
        .and_then(|ms| u64::try_from(ms).ok())
        .map(Duration::from_millis)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitArgs {
    audio_focus: Option<bool>,
    position_notify_interval: Option<i64>,
    enable_logging: Option<bool>,
}

impl InitArgs {
    fn into_config(self, method: Method) -> Result<PlayerConfig> {
        let mut config = PlayerConfig::default();
        if let Some(enabled) = self.audio_focus {
            config = config.with_audio_focus(enabled);
        }
        if let Some(interval) = self.position_notify_interval {
            let interval = method.non_negative_ms("positionNotifyInterval", interval)?;
            config = config.with_progress_interval_ms(interval.as_millis() as u64);
        }
        if let Some(enabled) = self.enable_logging {
            config = config.with_logging(enabled);
        }
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayArgs {
    url: Option<String>,
    volume: Option<f64>,
    position: Option<i64>,
    headers: Option<String>,
}

impl PlayArgs {
    fn into_request(self) -> PlayRequest {
        PlayRequest {
            url: self.url,
            volume: self.volume.filter(|v| *v >= 0.0).map(|v| v as f32),
            start_position: optional_ms(self.position),
            headers: self.headers,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeekArgs {
    position: i64,
}

#[derive(Debug, Deserialize)]
struct VolumeArgs {
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct UrlArgs {
    url: String,
    headers: Option<String>,
    position: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationArgs {
    title: Option<String>,
    subtitle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeArgs {
    title_color: Option<String>,
    subtitle_color: Option<String>,
    background_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsArgs {
    audio_focus: Option<bool>,
    position_notify_interval: Option<i64>,
}
