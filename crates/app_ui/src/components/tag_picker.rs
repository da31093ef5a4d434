//! Tag picker: search input with autocomplete dropdown, and the chip list of
//! tags chosen for the current image.
//!
//! Keyboard handling (Enter, arrows) does not happen here. Those keys are
//! resolved through the command dispatcher before egui sees them, using the
//! focus flag this component reports.

use app_core::{Candidate, Event, SessionState};
use egui::{Color32, Frame, Id, RichText, Rounding, Sense, Stroke, TextEdit, Ui};

/// Widget state that lives outside the session: the raw input text
#[derive(Debug, Default)]
pub struct TagPicker {
    text: String,
}

impl TagPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render; returns the events triggered this frame in the order they
    /// must be applied
    pub fn ui(&mut self, ui: &mut Ui, session: &SessionState, accent: Color32) -> Vec<Event> {
        let mut events = Vec::new();
        let mut focus_change = None;

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(ui.available_width() * 0.3);

                let response = ui.add(
                    TextEdit::singleline(&mut self.text)
                        .id(Id::new("tag_search"))
                        .hint_text(session.placeholder())
                        .desired_width(f32::INFINITY)
                        // Enter is a dispatcher command, never a focus change
                        .return_key(None::<egui::KeyboardShortcut>),
                );

                // The dropdown was built from the pre-frame query, so a pick
                // must land before this frame's keystroke recomputes it
                if session.search.is_active() {
                    if let Some(candidate) = Self::dropdown(ui, session, accent) {
                        events.push(Event::PickCandidate(candidate));
                    }
                }

                if response.changed() {
                    events.push(Event::QueryChanged(self.text.clone()));
                }

                let focused = response.has_focus();
                if focused != session.input_focused {
                    focus_change = Some(focused);
                }
            });

            ui.separator();

            Self::chips(ui, session, &mut events);
        });

        // Blur goes last so a pointer pick on the dropdown lands first
        if let Some(focused) = focus_change {
            if !focused {
                self.text.clear();
            }
            events.push(Event::SearchFocusChanged(focused));
        }

        events
    }

    /// Candidate list; returns the entry pressed this frame.
    ///
    /// Reacts on pointer press rather than click: the press already takes
    /// focus away from the input, and the dropdown disappears with it.
    fn dropdown(ui: &mut Ui, session: &SessionState, accent: Color32) -> Option<Candidate> {
        let mut picked = None;
        let highlighted = session.search.highlighted();

        for (index, candidate) in session.search.candidates().iter().enumerate() {
            let selected = index == highlighted;
            let fill = if selected {
                accent
            } else {
                ui.visuals().widgets.inactive.bg_fill
            };

            let label = match candidate {
                Candidate::Existing(_) => RichText::new(candidate.to_string()),
                Candidate::New(_) => RichText::new(candidate.to_string()).italics(),
            };

            let response = Frame::none()
                .fill(fill)
                .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(label);
                })
                .response
                .interact(Sense::click());

            let pressed = ui.input(|i| i.pointer.primary_pressed());
            if pressed && response.hovered() {
                picked = Some(candidate.clone());
            }
        }

        picked
    }

    fn chips(ui: &mut Ui, session: &SessionState, events: &mut Vec<Event>) {
        ui.horizontal_wrapped(|ui| {
            for tag in &session.image.tags {
                Frame::none()
                    .stroke(Stroke::new(1.0, ui.visuals().widgets.noninteractive.fg_stroke.color))
                    .rounding(Rounding::same(4.0))
                    .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(tag).monospace());
                            if ui.small_button("✖").on_hover_text("Remove tag").clicked() {
                                events.push(Event::RemoveTag(tag.clone()));
                            }
                        });
                    });
            }
        });
    }
}
