//! # Player Configuration
//!
//! Per-session options supplied with `Create` and adjusted live with
//! `UpdateOptions`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a focus loss while playing means for a later focus gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusResumePolicy {
    /// Any loss (permanent or transient) arms auto-resume.
    #[default]
    AnyLoss,
    /// Only transient losses arm auto-resume; a permanent loss leaves the
    /// player paused until the user resumes.
    TransientOnly,
}

impl FocusResumePolicy {
    /// Whether a loss of the given kind should resume on the next gain.
    pub fn resumes_after(&self, transient: bool) -> bool {
        match self {
            FocusResumePolicy::AnyLoss => true,
            FocusResumePolicy::TransientOnly => transient,
        }
    }
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Whether to negotiate audio focus with the host before playing.
    ///
    /// Default: true.
    #[serde(default = "default_request_audio_focus")]
    pub request_audio_focus: bool,

    /// Cadence of position/buffer sampling while playing, in milliseconds.
    ///
    /// Default: 200ms.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Log lifecycle transitions at `info` instead of `debug`.
    ///
    /// Default: false.
    #[serde(default)]
    pub logging_enabled: bool,

    /// Auto-resume behavior after a focus loss.
    #[serde(default)]
    pub focus_resume_policy: FocusResumePolicy,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            request_audio_focus: default_request_audio_focus(),
            progress_interval_ms: default_progress_interval_ms(),
            logging_enabled: false,
            focus_resume_policy: FocusResumePolicy::default(),
        }
    }
}

impl PlayerConfig {
    pub fn with_audio_focus(mut self, enabled: bool) -> Self {
        self.request_audio_focus = enabled;
        self
    }

    pub fn with_progress_interval_ms(mut self, interval_ms: u64) -> Self {
        self.progress_interval_ms = interval_ms;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn with_focus_resume_policy(mut self, policy: FocusResumePolicy) -> Self {
        self.focus_resume_policy = policy;
        self
    }

    /// Sampling cadence as a [`Duration`].
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_interval_ms == 0 {
            return Err("progress_interval_ms must be > 0".to_string());
        }

        Ok(())
    }

    /// Apply a live options update. Absent fields keep their current value;
    /// a zero interval is rejected and the previous cadence kept.
    pub fn apply(&mut self, update: &OptionsUpdate) -> Result<(), String> {
        if let Some(interval_ms) = update.progress_interval_ms {
            if interval_ms == 0 {
                return Err("progress_interval_ms must be > 0".to_string());
            }
            self.progress_interval_ms = interval_ms;
        }

        if let Some(enabled) = update.request_audio_focus {
            self.request_audio_focus = enabled;
        }

        Ok(())
    }
}

/// Partial options carried by `UpdateOptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsUpdate {
    pub request_audio_focus: Option<bool>,
    pub progress_interval_ms: Option<u64>,
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_request_audio_focus() -> bool {
    true
}

fn default_progress_interval_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.request_audio_focus);
        assert_eq!(config.progress_interval(), Duration::from_millis(200));
        assert!(!config.logging_enabled);
        assert_eq!(config.focus_resume_policy, FocusResumePolicy::AnyLoss);
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: PlayerConfig = serde_json::from_str(r#"{"logging_enabled":true}"#).unwrap();
        assert!(config.logging_enabled);
        assert!(config.request_audio_focus);
        assert_eq!(config.progress_interval_ms, 200);

        let config: PlayerConfig =
            serde_json::from_str(r#"{"focus_resume_policy":"transient_only"}"#).unwrap();
        assert_eq!(config.focus_resume_policy, FocusResumePolicy::TransientOnly);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PlayerConfig::default().with_progress_interval_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_update() {
        let mut config = PlayerConfig::default();

        config
            .apply(&OptionsUpdate {
                request_audio_focus: Some(false),
                progress_interval_ms: Some(500),
            })
            .unwrap();
        assert!(!config.request_audio_focus);
        assert_eq!(config.progress_interval_ms, 500);

        config.apply(&OptionsUpdate::default()).unwrap();
        assert_eq!(config.progress_interval_ms, 500);

        assert!(config
            .apply(&OptionsUpdate {
                request_audio_focus: None,
                progress_interval_ms: Some(0),
            })
            .is_err());
        assert_eq!(config.progress_interval_ms, 500);
    }

    #[test]
    fn test_resume_policy() {
        assert!(FocusResumePolicy::AnyLoss.resumes_after(false));
        assert!(FocusResumePolicy::AnyLoss.resumes_after(true));
        assert!(!FocusResumePolicy::TransientOnly.resumes_after(false));
        assert!(FocusResumePolicy::TransientOnly.resumes_after(true));
    }
}
