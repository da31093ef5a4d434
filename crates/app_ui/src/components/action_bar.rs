//! Bottom action bar: submit and skip

use app_core::{Command, Event};
use egui::{Button, RichText, Ui};

pub struct ActionBar;

impl ActionBar {
    pub fn ui(ui: &mut Ui) -> Option<Event> {
        let mut event = None;

        ui.columns(2, |columns| {
            let submit = Button::new(RichText::new("SUBMIT TAGS").strong())
                .shortcut_text("space")
                .min_size(egui::vec2(columns[0].available_width(), 36.0));
            if columns[0].add(submit).clicked() {
                event = Some(Event::Command(Command::Submit));
            }

            let skip = Button::new(RichText::new("SKIP THIS IMAGE").strong())
                .shortcut_text("ctrl + space")
                .min_size(egui::vec2(columns[1].available_width(), 36.0));
            if columns[1].add(skip).clicked() {
                event = Some(Event::Command(Command::Skip));
            }
        });

        event
    }
}
