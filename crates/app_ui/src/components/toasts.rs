//! Toast notifications overlay

use crate::Theme;
use app_core::{NotificationKind, Toast};
use egui::{Align2, Area, Color32, Context, Frame, Id, Order, RichText, Rounding};

pub struct ToastStack;

impl ToastStack {
    /// Draw the active toasts top-center, oldest on top
    pub fn ui(ctx: &Context, toasts: &[Toast], theme: &Theme) {
        if toasts.is_empty() {
            return;
        }

        Area::new(Id::new("toasts"))
            .order(Order::Tooltip)
            .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
            .interactable(false)
            .show(ctx, |ui| {
                for toast in toasts {
                    let icon = match toast.notification.kind {
                        NotificationKind::Success => "✔",
                        NotificationKind::Error => "✖",
                        NotificationKind::Info => "ℹ",
                    };

                    Frame::none()
                        .fill(theme.notification_color(toast.notification.kind))
                        .rounding(Rounding::same(16.0))
                        .inner_margin(egui::Margin::symmetric(16.0, 8.0))
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(format!("{}  {}", icon, toast.notification.message))
                                    .color(Color32::BLACK)
                                    .strong(),
                            );
                        });
                    ui.add_space(6.0);
                }
            });
    }
}
