//! Modal dialogs

use egui::{Align2, Context, RichText, Window};

/// Result of dialog interaction
pub enum DialogResult<T> {
    None,   // still open
    Ok(T),  // confirmed
    Cancel, // dismissed
}

/// Common dialog trait
pub trait Dialog {
    type Output;
    fn ui(&mut self, ctx: &Context) -> DialogResult<Self::Output>;
}

/// Tagging instructions shown before the first image
pub struct GuideDialog {
    pub open: bool,
}

impl GuideDialog {
    const TITLE: &'static str = "Tagging guide";
    const HEADING: &'static str = "Please read the following information before tagging images.";

    /// Odd pieces are tag names
    const TAG_RULES: [&'static [&'static str]; 4] = [
        &["Every image needs either the ", "ecchi", " tag or the ", "hentai", " tag."],
        &[
            "An image tagged ", "hentai", " also needs either ", "uncensored", " or ",
            "censored", ".",
        ],
        &[
            "", "ecchi",
            " is for content that does not show genitals, but may show nipples, butts or similar.",
        ],
        &[
            "Tags such as ", "boobs", ", ", "pussy", " or ", "cock",
            " are for images where that is a main feature.",
        ],
    ];

    pub fn new(open: bool) -> Self {
        Self { open }
    }

    /// One bulleted line; odd pieces are tag names shown as code
    fn rule(ui: &mut egui::Ui, pieces: &[&str]) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            ui.label("•  ");
            for (i, piece) in pieces.iter().enumerate() {
                if i % 2 == 1 {
                    ui.code(*piece);
                } else if !piece.is_empty() {
                    ui.label(*piece);
                }
            }
        });
    }
}

impl Dialog for GuideDialog {
    type Output = ();

    fn ui(&mut self, ctx: &Context) -> DialogResult<()> {
        if !self.open {
            return DialogResult::None;
        }

        let mut result = DialogResult::None;
        let mut window_open = true;

        Window::new(Self::TITLE)
            .open(&mut window_open)
            .collapsible(false)
            .resizable(false)
            .default_width(640.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(Self::HEADING).strong().size(16.0));
                ui.add_space(8.0);

                ui.label(
                    "When you are tagging images, try to first make use of the tags that \
                     already exist. You are able to add new tags, but please try to avoid \
                     doing so unless absolutely necessary.",
                );
                ui.add_space(6.0);
                ui.label("A couple tags have special instructions. Please read them carefully.");
                ui.add_space(4.0);
                for rule in Self::TAG_RULES {
                    Self::rule(ui, rule);
                }
                ui.add_space(6.0);
                ui.label(
                    "If you are not sure whether to use a tag, imagine yourself searching \
                     for that tag: would you expect this image to come up?",
                );
                ui.add_space(6.0);
                ui.label(RichText::new("Try to use between 4 and 12 tags.").strong());

                ui.add_space(16.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Understood!").clicked() {
                        result = DialogResult::Ok(());
                        self.open = false;
                    }
                });
            });

        if !window_open {
            result = DialogResult::Cancel;
            self.open = false;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_in(rule: &[&str]) -> Vec<String> {
        rule.iter().skip(1).step_by(2).map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_guide_names_required_tags() {
        let rules = GuideDialog::TAG_RULES;
        assert_eq!(tags_in(rules[0]), vec!["ecchi", "hentai"]);
        assert_eq!(tags_in(rules[1]), vec!["hentai", "uncensored", "censored"]);
        assert_eq!(tags_in(rules[2]), vec!["ecchi"]);
    }

    #[test]
    fn test_closed_guide_draws_nothing() {
        let ctx = Context::default();
        let mut guide = GuideDialog::new(false);
        let mut result = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            result = Some(guide.ui(ctx));
        });
        assert!(matches!(result, Some(DialogResult::None)));
        assert!(!guide.open);
    }
}
