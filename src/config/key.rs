use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single key with modifiers, written in config files as e.g. `"ctrl+r"`,
/// `"G"`, `"PageDown"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Character keys ignore SHIFT: the terminal already reports `G` rather
    /// than `g`, and some terminals add SHIFT for symbols like `?` or `>`.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                a == b
                    && self.modifiers.difference(KeyModifiers::SHIFT)
                        == event.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => self.code == event.code && self.modifiers == event.modifiers,
        }
    }
}

fn parse_code(name: &str) -> Result<KeyCode, String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        lower => {
            let n = lower
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .ok_or_else(|| format!("Unknown key: {name}"))?;
            KeyCode::F(n)
        }
    };
    Ok(code)
}

fn code_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        _ => "?".to_string(),
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // "+" on its own is a key, not a separator
        if s == "+" {
            return Ok(Self::char('+'));
        }

        let mut parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.pop().unwrap_or_default();

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(format!("Unknown modifier: {part}")),
            };
        }

        Ok(Self {
            code: parse_code(key_part)?,
            modifiers,
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "shift+")?;
        }
        write!(f, "{}", code_name(self.code))
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One or more keys bound to the same action.
///
/// Config files accept either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KeyBindingRepr", into = "KeyBindingRepr")]
pub struct KeyBinding {
    keys: Vec<Key>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum KeyBindingRepr {
    One(Key),
    Many(Vec<Key>),
}

impl From<KeyBindingRepr> for KeyBinding {
    fn from(repr: KeyBindingRepr) -> Self {
        match repr {
            KeyBindingRepr::One(key) => Self { keys: vec![key] },
            KeyBindingRepr::Many(keys) => Self { keys },
        }
    }
}

impl From<KeyBinding> for KeyBindingRepr {
    fn from(binding: KeyBinding) -> Self {
        match <[Key; 1]>::try_from(binding.keys) {
            Ok([key]) => Self::One(key),
            Err(keys) => Self::Many(keys),
        }
    }
}

impl KeyBinding {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.iter().any(|k| k.matches(event))
    }
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        Self { keys: vec![key] }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing() {
        assert_eq!("q".parse::<Key>().unwrap(), Key::char('q'));
        assert_eq!("Enter".parse::<Key>().unwrap(), Key::new(KeyCode::Enter));
        assert_eq!("ctrl+r".parse::<Key>().unwrap(), Key::ctrl('r'));
        assert_eq!("F5".parse::<Key>().unwrap(), Key::new(KeyCode::F(5)));
        assert_eq!("+".parse::<Key>().unwrap(), Key::char('+'));
        assert_eq!("]".parse::<Key>().unwrap(), Key::char(']'));
        assert!("hyper+q".parse::<Key>().is_err());
        assert!("nonsense".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_display_round_trips() {
        for text in ["q", "Enter", "ctrl+r", "PageDown", "F5", "Space"] {
            let key: Key = text.parse().unwrap();
            assert_eq!(key.to_string(), text);
        }
    }

    #[test]
    fn test_uppercase_char_matches_with_shift() {
        let key = Key::char('G');
        assert!(key.matches(&KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)));
        assert!(!key.matches(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_ctrl_is_not_ignored() {
        let key = Key::char('r');
        assert!(!key.matches(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)));
    }

    #[derive(Deserialize)]
    struct Holder {
        one: KeyBinding,
        many: KeyBinding,
    }

    #[test]
    fn test_binding_accepts_string_or_list() {
        let holder: Holder = toml::from_str("one = \"d\"\nmany = [\"j\", \"Down\"]").unwrap();
        assert_eq!(holder.one.to_string(), "d");
        assert_eq!(holder.many.to_string(), "j/Down");
        assert!(holder.many.matches(&KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)));
    }
}
