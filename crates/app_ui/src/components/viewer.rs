//! Image viewer component

use egui::{Pos2, Rect, TextureHandle, Ui, Vec2};

/// Shows the image being tagged, fit to the available space
pub struct ImageViewer {
    /// Current texture; dropping it frees the GPU copy
    texture: Option<TextureHandle>,

    /// Path the texture was decoded from
    source: Option<String>,

    /// Image dimensions
    image_size: Vec2,
}

impl ImageViewer {
    pub fn new() -> Self {
        Self {
            texture: None,
            source: None,
            image_size: Vec2::ZERO,
        }
    }

    /// Path currently displayed
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Set the image to display
    pub fn set_image(&mut self, source: String, texture: TextureHandle, width: u32, height: u32) {
        self.texture = Some(texture);
        self.source = Some(source);
        self.image_size = Vec2::new(width as f32, height as f32);
    }

    /// Clear the current image, remembering which path failed to load
    pub fn clear(&mut self, source: Option<String>) {
        self.texture = None;
        self.source = source;
        self.image_size = Vec2::ZERO;
    }

    /// Render the viewer
    pub fn ui(&self, ui: &mut Ui) {
        let available = ui.available_rect_before_wrap();
        ui.allocate_rect(available, egui::Sense::hover());

        match &self.texture {
            Some(texture) => {
                let display_size = fit_to(self.image_size, available.size());
                let image_rect = Rect::from_center_size(available.center(), display_size);

                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                ui.painter()
                    .image(texture.id(), image_rect, uv, egui::Color32::WHITE);
            }
            None => {
                let text = match &self.source {
                    Some(_) => "Cannot display this image",
                    None => "Select a folder to start tagging",
                };
                ui.painter().text(
                    available.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(24.0),
                    egui::Color32::GRAY,
                );
            }
        }
    }
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale `image` to fit inside `available` without upscaling
fn fit_to(image: Vec2, available: Vec2) -> Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Vec2::ZERO;
    }

    let scale_x = available.x / image.x;
    let scale_y = available.y / image.y;
    let scale = scale_x.min(scale_y).min(1.0);
    image * scale
}
