//! Persistent status surface (notification) contract.

use crate::error::Result;
use std::sync::Arc;

/// Opaque platform color value, packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub fn argb(self) -> u32 {
        self.0
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// Render instruction for the status surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFrame {
    /// Show the pause glyph when true, the play glyph otherwise.
    pub playing: bool,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

/// Theme colors; `None` leaves the surface's current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTheme {
    pub title_color: Option<Color>,
    pub subtitle_color: Option<Color>,
    pub background_color: Option<Color>,
}

impl StatusTheme {
    pub fn is_empty(&self) -> bool {
        self.title_color.is_none() && self.subtitle_color.is_none() && self.background_color.is_none()
    }
}

/// Buttons a status surface may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceControl {
    Stop,
    Toggle,
}

/// Receives button presses from the status surface.
pub trait SurfaceControlHandler: Send + Sync {
    fn on_control(&self, control: SurfaceControl);
}

/// User-visible playback indicator kept in sync with playback state.
#[async_trait::async_trait]
pub trait StatusSurface: Send + Sync {
    async fn render(&self, frame: StatusFrame) -> Result<()>;

    async fn apply_theme(&self, theme: StatusTheme) -> Result<()>;

    /// Route button presses to `handler`. Surfaces without controls ignore it.
    fn attach_controls(&self, handler: Arc<dyn SurfaceControlHandler>) {
        let _ = handler;
    }
}
