//! Toolbar component: rename toggle, guide, output file, folder picker, stats

use app_core::{Event, SessionState};
use egui::{Align, Area, Frame, Id, Layout, Order, RichText, Ui};

/// Toolbar component
pub struct Toolbar;

impl Toolbar {
    /// Render the toolbar; returns the events triggered this frame
    pub fn ui(ui: &mut Ui, session: &SessionState) -> Vec<Event> {
        let mut events = Vec::new();

        ui.horizontal(|ui| {
            ui.label(RichText::new("IMAGE TAGGER").strong().size(18.0));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                // Right-to-left: rightmost first
                let stats_button = ui.button("📊 Stats ⏷");
                if stats_button.clicked() {
                    events.push(Event::ToggleStats);
                }

                if ui
                    .button(format!("📁 {}", session.folder_label()))
                    .on_hover_text("Select the folder to tag")
                    .clicked()
                {
                    events.push(Event::SelectFolder);
                }

                if ui
                    .button("📄 OPEN OUTPUT FILE")
                    .on_hover_text("Open tagged/tags.json")
                    .clicked()
                {
                    events.push(Event::OpenOutputFile);
                }

                if ui.button("ℹ TAGGING GUIDE").clicked() {
                    events.push(Event::OpenGuide);
                }

                let mut rename = session.rename_files;
                if ui
                    .checkbox(&mut rename, "RENAME FILES")
                    .on_hover_text("Rename tagged images to a hash of their contents")
                    .changed()
                {
                    events.push(Event::ToggleRenameFiles);
                }

                if session.stats_open {
                    Self::stats_popover(ui, session, stats_button.rect.left_bottom());
                }
            });
        });

        events
    }

    fn stats_popover(ui: &Ui, session: &SessionState, anchor: egui::Pos2) {
        Area::new(Id::new("stats_popover"))
            .order(Order::Foreground)
            .fixed_pos(anchor + egui::vec2(0.0, 6.0))
            .show(ui.ctx(), |ui| {
                Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(140.0);
                    Self::stat(ui, session.stats.untagged(), "Untagged files");
                    ui.separator();
                    Self::stat(ui, session.stats.tagged, "Tagged");
                });
            });
    }

    fn stat(ui: &mut Ui, value: u64, label: &str) {
        ui.label(RichText::new(value.to_string()).size(28.0).strong());
        ui.label(RichText::new(label).small().strong());
    }
}
