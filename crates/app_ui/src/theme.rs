//! Application theming

use app_core::NotificationKind;
use egui::{Color32, Visuals};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub surface: Color32,
    pub primary: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub success: Color32,
    pub info: Color32,
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(32, 32, 32),
            surface: Color32::from_rgb(48, 48, 48),
            primary: Color32::from_rgb(64, 64, 64),
            text: Color32::from_rgb(240, 240, 240),
            text_secondary: Color32::from_rgb(160, 160, 160),
            accent: Color32::from_rgb(214, 64, 159), // Magenta
            error: Color32::from_rgb(220, 80, 80),
            warning: Color32::from_rgb(220, 180, 80),
            success: Color32::from_rgb(80, 200, 120),
            info: Color32::from_rgb(58, 191, 248),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(250, 250, 250),
            surface: Color32::from_rgb(255, 255, 255),
            primary: Color32::from_rgb(230, 230, 230),
            text: Color32::from_rgb(32, 32, 32),
            text_secondary: Color32::from_rgb(100, 100, 100),
            accent: Color32::from_rgb(59, 130, 246), // Blue
            error: Color32::from_rgb(220, 38, 38),
            warning: Color32::from_rgb(234, 179, 8),
            success: Color32::from_rgb(34, 197, 94),
            info: Color32::from_rgb(14, 165, 233),
        }
    }

    /// Apply theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = if self.name == "dark" {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        // Customize visuals
        visuals.panel_fill = self.surface;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.background;
        visuals.faint_bg_color = self.primary;

        visuals.widgets.noninteractive.bg_fill = self.surface;
        visuals.widgets.noninteractive.fg_stroke.color = self.text;

        visuals.widgets.inactive.bg_fill = self.primary;
        visuals.widgets.inactive.fg_stroke.color = self.text;

        visuals.widgets.hovered.bg_fill = self.accent.linear_multiply(0.3);
        visuals.widgets.hovered.fg_stroke.color = self.text;

        visuals.widgets.active.bg_fill = self.accent.linear_multiply(0.5);
        visuals.widgets.active.fg_stroke.color = self.text;

        visuals.selection.bg_fill = self.accent.linear_multiply(0.3);
        visuals.selection.stroke.color = self.accent;

        style.visuals = visuals;
        ctx.set_style(style);
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Toast fill for a notification kind
    pub fn notification_color(&self, kind: NotificationKind) -> Color32 {
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.error,
            NotificationKind::Info => self.info,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_falls_back_to_dark() {
        assert_eq!(Theme::by_name("LIGHT").name, "light");
        assert_eq!(Theme::by_name("solarized").name, "dark");
    }

    #[test]
    fn test_notification_colors_differ() {
        let theme = Theme::dark();
        assert_ne!(
            theme.notification_color(NotificationKind::Success),
            theme.notification_color(NotificationKind::Error)
        );
        assert_eq!(theme.notification_color(NotificationKind::Info), theme.info);
    }
}
