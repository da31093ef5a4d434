//! ImageTagger UI Layer
//!
//! Provides:
//! - egui-based tagging components
//! - wgpu rendering pipeline
//! - Keyboard event translation

pub mod renderer;
pub mod components;
pub mod input;
pub mod theme;

pub use renderer::Renderer;
pub use input::InputHandler;
pub use theme::Theme;
