use anyhow::{anyhow, bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use itertools::Itertools;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use std::{collections::HashMap, ops::Not};
use strum::IntoEnumIterator;

use crate::system::command::{Command, CommandGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event
                .modifiers
                .intersection(KeyModifiers::not(KeyModifiers::SHIFT)),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self.code {
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => "bktab".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            _ => "?".to_string(),
        };

        let alt_str = if self.modifiers.contains(KeyModifiers::ALT) {
            "A-"
        } else {
            ""
        };

        let ctrl_str = if self.modifiers.contains(KeyModifiers::CONTROL) {
            "C-"
        } else {
            ""
        };

        write!(f, "{ctrl_str}{alt_str}{code_str}")
    }
}

impl TryFrom<&str> for Key {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        let parts: Vec<&str> = s.split('-').collect();
        let key_str = parts
            .last()
            .ok_or_else(|| anyhow!("Key not recognized: \"{s}\""))?;
        let mut modifiers = KeyModifiers::empty();

        for part in &parts[..parts.len() - 1] {
            match *part {
                "C" | "c" => modifiers.extend(KeyModifiers::CONTROL),
                "A" | "a" => modifiers.extend(KeyModifiers::ALT),
                _ => bail!("Modifier \"{part}\" in key \"{s}\" not recognized"),
            }
        }

        let code = match *key_str {
            "enter" | "Enter" | "return" | "Return" => KeyCode::Enter,
            "esc" | "Esc" => KeyCode::Esc,
            "up" | "Up" => KeyCode::Up,
            "down" | "Down" => KeyCode::Down,
            "left" | "Left" => KeyCode::Left,
            "right" | "Right" => KeyCode::Right,
            "home" | "Home" => KeyCode::Home,
            "end" | "End" => KeyCode::End,
            "space" | "Space" => KeyCode::Char(' '),
            "tab" | "Tab" => KeyCode::Tab,
            "backtab" | "BackTab" => KeyCode::BackTab,

            // just assume that any string of length 1 should refer to that character
            s if s.len() == 1 => KeyCode::Char(
                s.chars()
                    .next()
                    .ok_or_else(|| anyhow!("Key not recognized: \"{s}\""))?,
            ),
            _ => bail!("Key not recognized: \"{s}\""),
        };

        Ok(Self { code, modifiers })
    }
}

fn string_to_command(value: &str) -> Result<Command> {
    match value {
        "nav_up" => Ok(Command::NavUp),
        "nav_down" => Ok(Command::NavDown),
        "nav_top" => Ok(Command::NavTop),
        "nav_bottom" => Ok(Command::NavBottom),

        "focus_left" => Ok(Command::FocusLeft),
        "focus_right" => Ok(Command::FocusRight),

        "confirm" => Ok(Command::Confirm),
        "quit" => Ok(Command::Quit),
        _ => bail!(format!("Command not recognized: \"{value}\"")),
    }
}

#[derive(Debug, Clone)]
pub struct KeyMap {
    map: HashMap<Command, Key>,
}

impl TryFrom<HashMap<String, String>> for KeyMap {
    type Error = anyhow::Error;

    fn try_from(map: HashMap<String, String>) -> Result<Self, Self::Error> {
        let mut key_map = Self::default();

        for (command_str, key_str) in &map {
            let command = string_to_command(command_str)?;
            let key = Key::try_from(key_str.as_str())?;
            key_map.map.insert(command, key);
        }

        Ok(key_map)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = HashMap::default();

        // NOTE: creating the default map by iterating and matching like this
        // guarantees that every command is mapped to a key
        for command in Command::iter() {
            let key_code = match command {
                Command::NavUp => KeyCode::Up,
                Command::NavDown => KeyCode::Down,
                Command::NavTop => KeyCode::Home,
                Command::NavBottom => KeyCode::End,
                Command::FocusLeft => KeyCode::Left,
                Command::FocusRight => KeyCode::Right,
                Command::Confirm => KeyCode::Enter,
                Command::Quit => KeyCode::Char('q'),
            };

            map.insert(command, key_code.into());
        }

        Self { map }
    }
}

impl KeyMap {
    #[must_use]
    pub fn key_for_command(&self, command: Command) -> Option<Key> {
        self.map.get(&command).copied()
    }

    #[cfg(test)]
    #[must_use]
    pub fn command_for_key_unfiltered(&self, key: Key) -> Option<&Command> {
        self.map
            .iter()
            .find_map(|(cmd, &k)| if k == key { Some(cmd) } else { None })
    }

    /// Gets the command corresponding to a key based on the loaded keymap,
    /// making sure that the command is one of the commands that the currently-focused
    /// region will respond to
    #[must_use]
    pub fn command_for_key(
        &self,
        key: Key,
        available_commands: &[CommandGroup],
    ) -> Option<Command> {
        let commands = available_commands.iter().flat_map(|group| &group.commands);

        self.map
            .iter()
            .find_map(|(cmd, &k)| {
                if k == key && commands.clone().contains(cmd) {
                    Some(cmd)
                } else {
                    None
                }
            })
            .copied()
    }

    pub fn cmd_group_to_span<'a>(&self, group: &'a CommandGroup) -> Vec<Span<'a>> {
        let hint_style = Style::default();
        let key_hint: String = group
            .commands
            .iter()
            .filter_map(|c| self.key_for_command(*c))
            .map(|key| key.to_string())
            .collect();

        vec![
            Span::styled(key_hint, hint_style.add_modifier(Modifier::BOLD)),
            Span::styled(": ", hint_style),
            Span::styled(group.name, hint_style.fg(Color::Gray)),
            Span::raw("  "),
        ]
    }
}
