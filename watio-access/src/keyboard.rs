//! Keyboard shortcut dispatcher.
use crate::commands::{Action, CommandTable};
use crate::prefs::ShortcutMap;
use std::fmt;

const MODIFIER_KEYS: [&str; 4] = ["control", "shift", "alt", "meta"];

/// Normalised key combination such as `ctrl+shift+c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyChord(String);

fn normalize_key(key: &str) -> String {
    let key = key.to_lowercase();
    match key.as_str() {
        "+" | "=" => "=".to_string(),
        "-" | "_" => "-".to_string(),
        " " | "spacebar" => "space".to_string(),
        _ => key,
    }
}

impl KeyChord {
    /// Build the chord for a key-down. Pure modifier presses yield `None`.
    #[must_use]
    pub fn from_event(key: &str, ctrl: bool, meta: bool, shift: bool, alt: bool) -> Option<Self> {
        let key = normalize_key(key);
        if key.is_empty() || MODIFIER_KEYS.contains(&key.as_str()) {
            return None;
        }
        let mut parts = Vec::with_capacity(4);
        if ctrl || meta {
            parts.push("ctrl".to_string());
        }
        if shift {
            parts.push("shift".to_string());
        }
        if alt {
            parts.push("alt".to_string());
        }
        parts.push(key);
        Some(Self(parts.join("+")))
    }

    /// Parse a written chord (`Ctrl+Shift+C`, `meta+plus`...) into canonical form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        // A trailing "+" is the key itself, as in "ctrl++".
        let (mods, key) = match lowered.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => lowered.rsplit_once('+').unwrap_or(("", lowered.as_str())),
        };
        let (mut ctrl, mut shift, mut alt) = (false, false, false);
        for part in mods.split('+').filter(|part| !part.is_empty()) {
            match part.trim() {
                "ctrl" | "control" | "meta" | "cmd" => ctrl = true,
                "shift" => shift = true,
                "alt" | "option" => alt = true,
                _ => return None,
            }
        }
        let key = match key.trim() {
            "plus" => "+",
            "minus" => "-",
            other => other,
        };
        Self::from_event(key, ctrl, false, shift, alt)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalise the chord keys of a custom shortcut table, dropping
/// entries whose chord cannot be parsed.
///
/// Spellings that normalise to the same chord collide; the last one in key
/// order wins.
#[must_use]
pub fn normalize_shortcuts(map: &ShortcutMap) -> ShortcutMap {
    let mut normalized = ShortcutMap::new();
    for (raw, action) in map {
        let Some(chord) = KeyChord::parse(raw) else {
            log::warn!("dropping unparseable shortcut chord {raw:?}");
            continue;
        };
        if let Some(previous) = normalized.insert(chord.0, action.trim().to_string()) {
            log::warn!("shortcut {raw:?} replaces an earlier binding to {previous:?}");
        }
    }
    normalized
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Unbound,
    Action(Action),
    /// Bound to an id no action answers to.
    Unknown(String),
}

impl Dispatch {
    /// Whether the browser default for the key-down should be suppressed.
    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        !matches!(self, Self::Unbound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub chord: String,
    pub action_id: String,
    pub description: String,
}

pub struct KeyboardDispatcher {
    table: &'static CommandTable,
}

impl Default for KeyboardDispatcher {
    fn default() -> Self {
        Self::new(CommandTable::global())
    }
}

impl KeyboardDispatcher {
    #[must_use]
    pub const fn new(table: &'static CommandTable) -> Self {
        Self { table }
    }

    /// Resolve a chord, custom entries first.
    #[must_use]
    pub fn dispatch(&self, chord: &KeyChord, custom: &ShortcutMap) -> Dispatch {
        let resolved = match custom.get(chord.as_str()) {
            Some(id) => id.parse::<Action>().map_err(|_| id.clone()),
            None => match self.table.shortcuts.get(chord.as_str()) {
                Some(action) => Ok(*action),
                None => return Dispatch::Unbound,
            },
        };
        log::debug!("dispatching chord {chord}: {resolved:?}");
        match resolved {
            Ok(action) => Dispatch::Action(action),
            Err(id) => Dispatch::Unknown(id),
        }
    }

    /// The merged table, defaults overridden by custom entries.
    #[must_use]
    pub fn help_entries(&self, custom: &ShortcutMap) -> Vec<HelpEntry> {
        let mut merged: ShortcutMap = self
            .table
            .shortcuts
            .iter()
            .map(|(chord, action)| (chord.clone(), action.id().to_string()))
            .collect();
        merged.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
            .into_iter()
            .map(|(chord, action_id)| {
                let description = action_id
                    .parse::<Action>()
                    .map_or_else(|_| action_id.clone(), |action| action.description().to_string());
                HelpEntry {
                    chord,
                    action_id,
                    description,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn help_text(&self, custom: &ShortcutMap) -> String {
        let lines: Vec<String> = self
            .help_entries(custom)
            .into_iter()
            .map(|entry| format!("{}: {}", entry.chord, entry.description))
            .collect();
        format!("Atajos de teclado disponibles:\n{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Destination;

    fn chord(raw: &str) -> KeyChord {
        KeyChord::parse(raw).unwrap()
    }

    #[test]
    fn chords_follow_modifier_order() {
        let c = KeyChord::from_event("C", true, false, true, false).unwrap();
        assert_eq!(c.as_str(), "ctrl+shift+c");
        let meta = KeyChord::from_event("d", false, true, false, false).unwrap();
        assert_eq!(meta.as_str(), "ctrl+d");
        let alt = KeyChord::from_event("x", true, false, true, true).unwrap();
        assert_eq!(alt.as_str(), "ctrl+shift+alt+x");
    }

    #[test]
    fn plus_and_minus_fold_together() {
        assert_eq!(KeyChord::from_event("+", true, false, false, false).unwrap().as_str(), "ctrl+=");
        assert_eq!(KeyChord::from_event("_", true, false, false, false).unwrap().as_str(), "ctrl+-");
        assert_eq!(chord("Ctrl++").as_str(), "ctrl+=");
        assert_eq!(chord("cmd+minus").as_str(), "ctrl+-");
    }

    #[test]
    fn space_has_one_spelling() {
        let pressed = KeyChord::from_event(" ", true, false, true, false).unwrap();
        assert_eq!(pressed.as_str(), "ctrl+shift+space");
        assert_eq!(chord("Ctrl+Shift+Space"), pressed);
        assert_eq!(chord("ctrl+shift+spacebar"), pressed);
    }

    #[test]
    fn modifier_only_presses_are_ignored() {
        assert_eq!(KeyChord::from_event("Shift", false, false, true, false), None);
        assert_eq!(KeyChord::from_event("Control", true, false, false, false), None);
        assert_eq!(KeyChord::parse("ctrl+hyper+k"), None);
    }

    #[test]
    fn defaults_dispatch() {
        let keys = KeyboardDispatcher::default();
        let empty = ShortcutMap::new();
        assert_eq!(keys.dispatch(&chord("ctrl+shift+c"), &empty), Dispatch::Action(Action::ToggleContrast));
        assert_eq!(
            keys.dispatch(&chord("ctrl+shift+p"), &empty),
            Dispatch::Action(Action::Navigate(Destination::Profile))
        );
        assert_eq!(keys.dispatch(&chord("ctrl+shift+?"), &empty), Dispatch::Action(Action::ShowHelp));
        let unbound = keys.dispatch(&chord("ctrl+q"), &empty);
        assert_eq!(unbound, Dispatch::Unbound);
        assert!(!unbound.prevents_default());
    }

    #[test]
    fn custom_entries_override_defaults() {
        let keys = KeyboardDispatcher::default();
        let mut custom = ShortcutMap::new();
        custom.insert("ctrl+shift+c".into(), "toggleLinks".into());
        custom.insert("ctrl+k".into(), "launchRocket".into());
        assert_eq!(keys.dispatch(&chord("ctrl+shift+c"), &custom), Dispatch::Action(Action::ToggleLinks));
        let unknown = keys.dispatch(&chord("ctrl+k"), &custom);
        assert_eq!(unknown, Dispatch::Unknown("launchRocket".into()));
        assert!(unknown.prevents_default());
    }

    #[test]
    fn stored_tables_are_normalized() {
        let mut raw = ShortcutMap::new();
        raw.insert("Ctrl+Shift+X".into(), " toggleDark ".into());
        raw.insert("ctrl+hyper+x".into(), "toggleDark".into());
        let normalized = normalize_shortcuts(&raw);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("ctrl+shift+x").map(String::as_str), Some("toggleDark"));
    }

    #[test]
    fn colliding_spellings_keep_one_binding() {
        let mut raw = ShortcutMap::new();
        raw.insert("Ctrl+Space".into(), "toggleDark".into());
        raw.insert("ctrl+space".into(), "toggleLinks".into());
        let normalized = normalize_shortcuts(&raw);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("ctrl+space").map(String::as_str), Some("toggleLinks"));
    }

    #[test]
    fn help_merges_tables() {
        let keys = KeyboardDispatcher::default();
        let mut custom = ShortcutMap::new();
        custom.insert("ctrl+d".into(), "goHome".into());
        custom.insert("ctrl+k".into(), "launchRocket".into());
        let entries = keys.help_entries(&custom);
        assert_eq!(entries.len(), 10);
        let ctrl_d = entries.iter().find(|e| e.chord == "ctrl+d").unwrap();
        assert_eq!(ctrl_d.description, "Ir a inicio");
        let rocket = entries.iter().find(|e| e.chord == "ctrl+k").unwrap();
        assert_eq!(rocket.description, "launchRocket");
        assert!(keys.help_text(&custom).starts_with("Atajos de teclado disponibles:\n"));
    }
}
