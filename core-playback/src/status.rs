//! Status surface presenter.
//!
//! Keeps the last title/subtitle so every glyph render carries them, turns
//! theme color strings into [`Color`]s, and routes surface button presses
//! back into the service loop.

use bridge_traits::{
    Color, PlaybackState, StatusFrame, StatusSurface, StatusTheme, SurfaceControl,
    SurfaceControlHandler,
};
use std::sync::Arc;
use tracing::{trace, warn};

use crate::command::ThemeColors;
use crate::error::{PlaybackError, Result};
use crate::session::SessionId;
use crate::signal::{Signal, SignalSender};

pub(crate) struct StatusPresenter {
    surface: Arc<dyn StatusSurface>,
    title: Option<String>,
    subtitle: Option<String>,
    playing: bool,
}

impl StatusPresenter {
    pub fn new(surface: Arc<dyn StatusSurface>) -> Self {
        Self {
            surface,
            title: None,
            subtitle: None,
            playing: false,
        }
    }

    /// Route the surface's buttons to `session`.
    pub fn attach_controls(&self, session: SessionId, signals: SignalSender) {
        self.surface
            .attach_controls(Arc::new(ControlCallback { session, signals }));
    }

    /// Show the pause glyph while playing, the play glyph otherwise.
    pub async fn render_state(&mut self, state: &PlaybackState) {
        self.playing = *state == PlaybackState::Playing;
        self.render().await;
    }

    /// Replace title and/or subtitle; `None` keeps the current text.
    pub async fn update_text(&mut self, title: Option<String>, subtitle: Option<String>) {
        if title.is_some() {
            self.title = title;
        }
        if subtitle.is_some() {
            self.subtitle = subtitle;
        }
        self.render().await;
    }

    /// Apply theme colors. Unparsable values are skipped field by field.
    pub async fn apply_theme(&self, colors: &ThemeColors) {
        let theme = StatusTheme {
            title_color: color_field("title_color", colors.title_color.as_deref()),
            subtitle_color: color_field("subtitle_color", colors.subtitle_color.as_deref()),
            background_color: color_field("background_color", colors.background_color.as_deref()),
        };

        if theme.is_empty() {
            trace!("No theme colors to apply");
            return;
        }

        if let Err(e) = self.surface.apply_theme(theme).await {
            warn!(error = %e, "Status surface rejected theme");
        }
    }

    async fn render(&self) {
        let frame = StatusFrame {
            playing: self.playing,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
        };
        if let Err(e) = self.surface.render(frame).await {
            warn!(error = %e, "Status surface render failed");
        }
    }
}

fn color_field(field: &'static str, raw: Option<&str>) -> Option<Color> {
    let raw = raw?;
    match parse_color(raw) {
        Ok(color) => Some(color),
        Err(e) => {
            warn!(field, error = %e, "Ignoring theme color");
            None
        }
    }
}

/// Parse `#RRGGBB`, `#AARRGGBB` or a named color.
pub fn parse_color(raw: &str) -> Result<Color> {
    let invalid = || PlaybackError::InvalidColor(raw.to_string());
    let value = raw.trim();

    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let bits = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        return match hex.len() {
            6 => Ok(Color(0xFF00_0000 | bits)),
            8 => Ok(Color(bits)),
            _ => Err(invalid()),
        };
    }

    named_color(&value.to_ascii_lowercase()).ok_or_else(invalid)
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "black" => 0x000000,
        "darkgray" | "darkgrey" => 0x444444,
        "gray" | "grey" => 0x888888,
        "lightgray" | "lightgrey" => 0xCCCCCC,
        "white" => 0xFFFFFF,
        "red" => 0xFF0000,
        "green" => 0x00FF00,
        "blue" => 0x0000FF,
        "yellow" => 0xFFFF00,
        "cyan" | "aqua" => 0x00FFFF,
        "magenta" | "fuchsia" => 0xFF00FF,
        "lime" => 0x00FF00,
        "maroon" => 0x800000,
        "navy" => 0x000080,
        "olive" => 0x808000,
        "purple" => 0x800080,
        "silver" => 0xC0C0C0,
        "teal" => 0x008080,
        _ => return None,
    };
    Some(Color(0xFF00_0000 | rgb))
}

struct ControlCallback {
    session: SessionId,
    signals: SignalSender,
}

impl SurfaceControlHandler for ControlCallback {
    fn on_control(&self, control: SurfaceControl) {
        let signal = Signal::Control {
            session: self.session,
            control,
        };
        if self.signals.send(signal).is_err() {
            trace!(?control, "Surface control after service shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#FF0000").unwrap(), Color(0xFFFF_0000));
        assert_eq!(parse_color("#80112233").unwrap(), Color(0x8011_2233));
        assert_eq!(parse_color("#80112233").unwrap().alpha(), 0x80);
        assert_eq!(parse_color(" #00ff00 ").unwrap(), Color(0xFF00_FF00));
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(parse_color("white").unwrap(), Color(0xFFFF_FFFF));
        assert_eq!(parse_color("Teal").unwrap(), Color(0xFF00_8080));
        assert_eq!(parse_color("grey"), parse_color("gray"));
    }

    #[test]
    fn rejects_bad_colors() {
        for raw in ["", "#", "#12345", "#GG0000", "#+12345", "#1234567890", "chartreuse", "FF0000"] {
            assert!(
                matches!(parse_color(raw), Err(PlaybackError::InvalidColor(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn theme_fields_fail_independently() {
        assert_eq!(color_field("title_color", Some("nope")), None);
        assert_eq!(color_field("title_color", None), None);
        assert_eq!(
            color_field("title_color", Some("#000000")),
            Some(Color(0xFF00_0000))
        );
    }
}
