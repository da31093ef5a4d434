//! Input handling and keybinding resolution

use app_core::{Command, CommandDispatcher, KeyChord};
use std::collections::HashMap;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Input handler that maps key presses to commands
pub struct InputHandler {
    dispatcher: CommandDispatcher,

    /// Current modifier state
    modifiers: ModifiersState,
}

impl InputHandler {
    /// Create a new input handler with bindings (command id -> keys)
    pub fn new(bindings: &HashMap<String, Vec<String>>) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(bindings),
            modifiers: ModifiersState::empty(),
        }
    }

    /// Update modifier state
    pub fn update_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Handle a key event and return the command it triggers, if any.
    ///
    /// `input_focused` is the session's view of the search input focus; it
    /// decides between page-level and input-level bindings.
    pub fn handle_key(&self, event: &KeyEvent, input_focused: bool) -> Option<Command> {
        if event.state != ElementState::Pressed {
            return None;
        }

        let key = key_to_string(&event.logical_key)?;
        let chord = self.chord(key);

        self.dispatcher.resolve(&chord, input_focused)
    }

    /// Build a chord with the current modifiers
    fn chord(&self, key: String) -> KeyChord {
        KeyChord {
            ctrl: self.modifiers.control_key(),
            alt: self.modifiers.alt_key(),
            shift: self.modifiers.shift_key(),
            super_key: self.modifiers.super_key(),
            key,
        }
    }
}

/// Convert a logical key to its binding name
fn key_to_string(key: &Key) -> Option<String> {
    let name = match key {
        Key::Named(named) => match named {
            NamedKey::Space => "Space".to_string(),
            NamedKey::Enter => "Return".to_string(),
            NamedKey::Tab => "Tab".to_string(),
            NamedKey::Escape => "Escape".to_string(),
            NamedKey::Backspace => "Backspace".to_string(),
            NamedKey::Delete => "Delete".to_string(),
            NamedKey::Home => "Home".to_string(),
            NamedKey::End => "End".to_string(),
            NamedKey::ArrowUp => "Up".to_string(),
            NamedKey::ArrowDown => "Down".to_string(),
            NamedKey::ArrowLeft => "Left".to_string(),
            NamedKey::ArrowRight => "Right".to_string(),
            _ => format!("{:?}", named),
        },
        // Some platforms report the space bar as a character
        Key::Character(c) if c.as_str() == " " => "Space".to_string(),
        Key::Character(c) => c.to_string(),
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn test_key_names() {
        assert_eq!(key_to_string(&Key::Named(NamedKey::Space)).as_deref(), Some("Space"));
        assert_eq!(key_to_string(&Key::Named(NamedKey::Enter)).as_deref(), Some("Return"));
        assert_eq!(key_to_string(&Key::Named(NamedKey::ArrowDown)).as_deref(), Some("Down"));
        assert_eq!(key_to_string(&Key::Character(SmolStr::new(" "))).as_deref(), Some("Space"));
        assert_eq!(key_to_string(&Key::Character(SmolStr::new("a"))).as_deref(), Some("a"));
    }

    #[test]
    fn test_modifiers_in_chord() {
        let mut handler = InputHandler::new(&HashMap::new());
        handler.update_modifiers(ModifiersState::CONTROL);
        assert_eq!(handler.chord("Space".to_string()).to_string(), "Ctrl+Space");
    }
}
