//! Command system for keyboard actions

use std::collections::HashMap;
use std::fmt;

/// Where a command listens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// Page-level; inactive while the search input holds focus
    Page,
    /// Only while the search input holds focus
    SearchInput,
    /// Regardless of focus
    Anywhere,
}

impl KeyScope {
    pub fn is_active(self, input_focused: bool) -> bool {
        match self {
            KeyScope::Page => !input_focused,
            KeyScope::SearchInput => input_focused,
            KeyScope::Anywhere => true,
        }
    }
}

/// Keyboard-triggered session actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    DismissOverlays,
    Submit,
    Skip,
    SearchConfirm,
    SearchPrev,
    SearchNext,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::DismissOverlays,
        Command::Submit,
        Command::Skip,
        Command::SearchConfirm,
        Command::SearchPrev,
        Command::SearchNext,
    ];

    // Identifiers used in the keybindings table
    pub const OVERLAY_DISMISS: &'static str = "overlay.dismiss";
    pub const TAG_SUBMIT: &'static str = "tag.submit";
    pub const TAG_SKIP: &'static str = "tag.skip";
    pub const SEARCH_CONFIRM: &'static str = "search.confirm";
    pub const SEARCH_PREV: &'static str = "search.prev";
    pub const SEARCH_NEXT: &'static str = "search.next";

    pub fn id(self) -> &'static str {
        match self {
            Command::DismissOverlays => Self::OVERLAY_DISMISS,
            Command::Submit => Self::TAG_SUBMIT,
            Command::Skip => Self::TAG_SKIP,
            Command::SearchConfirm => Self::SEARCH_CONFIRM,
            Command::SearchPrev => Self::SEARCH_PREV,
            Command::SearchNext => Self::SEARCH_NEXT,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn scope(self) -> KeyScope {
        match self {
            Command::DismissOverlays => KeyScope::Anywhere,
            Command::Submit | Command::Skip => KeyScope::Page,
            Command::SearchConfirm | Command::SearchPrev | Command::SearchNext => {
                KeyScope::SearchInput
            }
        }
    }
}

/// A pressed key plus modifiers, rendered as e.g. `Ctrl+Shift+Space`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
    pub key: String,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.super_key {
            parts.push("Super");
        }

        parts.push(&self.key);
        f.write_str(&parts.join("+"))
    }
}

/// Resolves key chords to commands.
///
/// A chord may be bound to several commands in different scopes (the
/// defaults bind nothing twice, but a user table may). Resolution picks the
/// first command whose scope is active, so one keystroke fires at most one
/// command.
pub struct CommandDispatcher {
    /// Key string (lowercase) -> commands
    bindings: HashMap<String, Vec<Command>>,
}

impl CommandDispatcher {
    /// Build from a command id -> key list table
    pub fn new(bindings: &HashMap<String, Vec<String>>) -> Self {
        let mut key_to_commands: HashMap<String, Vec<Command>> = HashMap::new();

        for (id, keys) in bindings {
            let Some(command) = Command::from_id(id) else {
                tracing::warn!("Unknown command in keybindings: {}", id);
                continue;
            };

            for key in keys {
                let commands = key_to_commands.entry(key.to_lowercase()).or_default();
                if !commands.contains(&command) {
                    commands.push(command);
                }
            }
        }

        // Deterministic precedence regardless of HashMap order
        for commands in key_to_commands.values_mut() {
            commands.sort_by_key(|c| Command::ALL.iter().position(|a| a == c));
        }

        Self {
            bindings: key_to_commands,
        }
    }

    /// Command for `chord` given the current focus, if any
    pub fn resolve(&self, chord: &KeyChord, input_focused: bool) -> Option<Command> {
        let key = chord.to_string().to_lowercase();

        let command = self
            .bindings
            .get(&key)?
            .iter()
            .copied()
            .find(|c| c.scope().is_active(input_focused));

        tracing::debug!(key = %key, input_focused, ?command, "Key resolved");
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_keybindings;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(&default_keybindings())
    }

    #[test]
    fn test_chord_string() {
        assert_eq!(KeyChord::new("Space").to_string(), "Space");
        assert_eq!(KeyChord::new("Space").ctrl().shift().to_string(), "Ctrl+Shift+Space");
        assert_eq!(KeyChord::new("x").alt().ctrl().to_string(), "Ctrl+Alt+x");
    }

    #[test]
    fn test_space_submits_only_outside_input() {
        let d = dispatcher();
        assert_eq!(d.resolve(&KeyChord::new("Space"), false), Some(Command::Submit));
        assert_eq!(d.resolve(&KeyChord::new("Space"), true), None);
    }

    #[test]
    fn test_search_keys_only_inside_input() {
        let d = dispatcher();
        assert_eq!(d.resolve(&KeyChord::new("Return"), true), Some(Command::SearchConfirm));
        assert_eq!(d.resolve(&KeyChord::new("Return"), false), None);
        assert_eq!(d.resolve(&KeyChord::new("Up"), true), Some(Command::SearchPrev));
        assert_eq!(d.resolve(&KeyChord::new("Down"), true), Some(Command::SearchNext));
    }

    #[test]
    fn test_escape_anywhere() {
        let d = dispatcher();
        assert_eq!(d.resolve(&KeyChord::new("Escape"), false), Some(Command::DismissOverlays));
        assert_eq!(d.resolve(&KeyChord::new("Escape"), true), Some(Command::DismissOverlays));
    }

    #[test]
    fn test_ctrl_space_skips() {
        let d = dispatcher();
        assert_eq!(d.resolve(&KeyChord::new("Space").ctrl(), false), Some(Command::Skip));
        assert_eq!(d.resolve(&KeyChord::new("space").ctrl(), false), Some(Command::Skip));
    }

    #[test]
    fn test_shared_key_fires_once_per_scope() {
        let mut table = HashMap::new();
        table.insert(Command::TAG_SUBMIT.to_string(), vec!["Return".to_string()]);
        table.insert(Command::SEARCH_CONFIRM.to_string(), vec!["Return".to_string()]);
        table.insert("nav.unknown".to_string(), vec!["x".to_string()]);
        let d = CommandDispatcher::new(&table);

        assert_eq!(d.resolve(&KeyChord::new("Return"), false), Some(Command::Submit));
        assert_eq!(d.resolve(&KeyChord::new("Return"), true), Some(Command::SearchConfirm));
        assert_eq!(d.resolve(&KeyChord::new("x"), false), None);
    }

    #[test]
    fn test_id_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_id(command.id()), Some(command));
        }
        assert_eq!(Command::from_id("app.quit"), None);
    }
}
