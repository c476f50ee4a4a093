//! Status surface that writes to the tracing log.
//!
//! Desktop hosts without a notification area still get a readable trail of
//! what the surface would show. The last frame and theme are kept for
//! inspection, and [`TracingStatusSurface::press`] stands in for the buttons.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    status::{StatusFrame, StatusSurface, StatusTheme, SurfaceControl, SurfaceControlHandler},
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
pub struct TracingStatusSurface {
    frame: Mutex<Option<StatusFrame>>,
    theme: Mutex<StatusTheme>,
    controls: Mutex<Option<Arc<dyn SurfaceControlHandler>>>,
}

impl TracingStatusSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered frame.
    pub fn frame(&self) -> Option<StatusFrame> {
        self.frame.lock().clone()
    }

    /// Theme with every color applied so far.
    pub fn theme(&self) -> StatusTheme {
        *self.theme.lock()
    }

    /// Simulate a button press. Returns `false` when no handler is attached.
    pub fn press(&self, control: SurfaceControl) -> bool {
        let handler = self.controls.lock().clone();
        match handler {
            Some(handler) => {
                handler.on_control(control);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl StatusSurface for TracingStatusSurface {
    async fn render(&self, frame: StatusFrame) -> Result<()> {
        info!(
            glyph = if frame.playing { "pause" } else { "play" },
            title = frame.title.as_deref().unwrap_or(""),
            subtitle = frame.subtitle.as_deref().unwrap_or(""),
            "Status surface"
        );
        *self.frame.lock() = Some(frame);
        Ok(())
    }

    async fn apply_theme(&self, theme: StatusTheme) -> Result<()> {
        let mut current = self.theme.lock();
        if theme.title_color.is_some() {
            current.title_color = theme.title_color;
        }
        if theme.subtitle_color.is_some() {
            current.subtitle_color = theme.subtitle_color;
        }
        if theme.background_color.is_some() {
            current.background_color = theme.background_color;
        }
        debug!(theme = ?*current, "Status surface theme");
        Ok(())
    }

    fn attach_controls(&self, handler: Arc<dyn SurfaceControlHandler>) {
        *self.controls.lock() = Some(handler);
    }
}
