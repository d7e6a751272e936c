//! The action set shared by voice and keyboard input.
//!
//! Both input adapters resolve to an [`Action`] and hand it to
//! [`execute_action`], so there is exactly one place where commands mutate
//! preferences or navigate.
use crate::constants::FONT_SIZE_STEP;
use crate::notice::Notice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const DEFAULT_COMMAND_DATA: &str = include_str!("../data/commands.json");

/// Navigation targets reachable by command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Destination {
    Home,
    Dashboard,
    Profile,
}

impl Destination {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Dashboard => "/dashboard",
            Self::Profile => "/profile",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "inicio",
            Self::Dashboard => "dashboard",
            Self::Profile => "perfil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    Navigate(Destination),
    GoBack,
    ToggleDark,
    IncreaseFontSize,
    DecreaseFontSize,
    ToggleContrast,
    ToggleLinks,
    ShowHelp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action id: {0}")]
pub struct UnknownAction(pub String);

impl Action {
    pub const ALL: [Self; 10] = [
        Self::ToggleDark,
        Self::Navigate(Destination::Home),
        Self::Navigate(Destination::Dashboard),
        Self::Navigate(Destination::Profile),
        Self::GoBack,
        Self::IncreaseFontSize,
        Self::DecreaseFontSize,
        Self::ToggleContrast,
        Self::ToggleLinks,
        Self::ShowHelp,
    ];

    /// Stable identifier used in stored custom shortcut tables.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Navigate(Destination::Home) => "goHome",
            Self::Navigate(Destination::Dashboard) => "goDashboard",
            Self::Navigate(Destination::Profile) => "goProfile",
            Self::GoBack => "goBack",
            Self::ToggleDark => "toggleDark",
            Self::IncreaseFontSize => "increaseFontSize",
            Self::DecreaseFontSize => "decreaseFontSize",
            Self::ToggleContrast => "toggleContrast",
            Self::ToggleLinks => "toggleLinks",
            Self::ShowHelp => "showHelp",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Navigate(Destination::Home) => "Ir a inicio",
            Self::Navigate(Destination::Dashboard) => "Ir a dashboard",
            Self::Navigate(Destination::Profile) => "Ir a perfil",
            Self::GoBack => "Volver",
            Self::ToggleDark => "Cambiar tema",
            Self::IncreaseFontSize => "Aumentar texto",
            Self::DecreaseFontSize => "Disminuir texto",
            Self::ToggleContrast => "Alto contraste",
            Self::ToggleLinks => "Resaltar enlaces",
            Self::ShowHelp => "Mostrar ayuda",
        }
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.id() == s.trim())
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl TryFrom<String> for Action {
    type Error = UnknownAction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.id().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One spoken phrase and its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePhrase {
    pub phrase: String,
    pub action: Action,
}

/// Voice phrase table and default keyboard shortcuts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTable {
    #[serde(default)]
    pub voice: Vec<VoicePhrase>,
    #[serde(default)]
    pub shortcuts: BTreeMap<String, Action>,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandTableError {
    #[error("command table JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandTable {
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown action.
    pub fn from_json(json: &str) -> Result<Self, CommandTableError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_COMMAND_DATA).unwrap_or_else(|err| {
            log::error!("embedded command table is invalid: {err}");
            Self::default()
        })
    }

    /// Process-wide table parsed from the embedded data file.
    pub fn global() -> &'static Self {
        static TABLE: OnceLock<CommandTable> = OnceLock::new();
        TABLE.get_or_init(Self::load_from_static)
    }

    /// Exact lookup of an already-normalized transcript.
    #[must_use]
    pub fn voice_action(&self, phrase: &str) -> Option<Action> {
        self.voice
            .iter()
            .find(|entry| entry.phrase == phrase)
            .map(|entry| entry.action)
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.voice.iter().map(|entry| entry.phrase.as_str())
    }
}

/// State the commands operate on.
pub trait CommandTarget {
    fn toggle_dark(&mut self) -> bool;
    fn font_size(&self) -> u8;
    /// Store a clamped font size and return the value kept.
    fn set_font_size(&mut self, requested: i32) -> u8;
    fn high_contrast(&self) -> bool;
    fn set_high_contrast(&mut self, enabled: bool);
    fn link_highlight(&self) -> bool;
    fn set_link_highlight(&mut self, enabled: bool);
}

/// Router hook for navigation actions.
pub trait Navigator {
    fn navigate(&mut self, destination: Destination);
    fn go_back(&mut self);
}

/// Run an action and describe what happened.
///
/// `help` renders the help listing for the input that triggered the action.
pub fn execute_action<T, N, H>(action: Action, target: &mut T, navigator: &mut N, help: H) -> Notice
where
    T: CommandTarget + ?Sized,
    N: Navigator + ?Sized,
    H: FnOnce() -> String,
{
    log::debug!("executing action {action}");
    match action {
        Action::ToggleDark => {
            target.toggle_dark();
            Notice::success("Tema cambiado")
        }
        Action::IncreaseFontSize => {
            let size = target.set_font_size(i32::from(target.font_size()) + i32::from(FONT_SIZE_STEP));
            Notice::success(format!("Texto aumentado a {size}px"))
        }
        Action::DecreaseFontSize => {
            let size = target.set_font_size(i32::from(target.font_size()) - i32::from(FONT_SIZE_STEP));
            Notice::success(format!("Texto disminuido a {size}px"))
        }
        Action::ToggleContrast => {
            let was_on = target.high_contrast();
            target.set_high_contrast(!was_on);
            Notice::success(if was_on {
                "Contraste normal"
            } else {
                "Alto contraste activado"
            })
        }
        Action::ToggleLinks => {
            let was_on = target.link_highlight();
            target.set_link_highlight(!was_on);
            Notice::success(if was_on {
                "Enlaces normales"
            } else {
                "Enlaces resaltados"
            })
        }
        Action::ShowHelp => Notice::info(help()).sticky(),
        Action::Navigate(destination) => {
            navigator.navigate(destination);
            Notice::success(format!("Navegando a {}", destination.label()))
        }
        Action::GoBack => {
            navigator.go_back();
            Notice::success("Navegando hacia atrás")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RecordingNavigator;
    use crate::notice::NoticeLevel;

    #[derive(Default)]
    struct Target {
        dark: bool,
        size: u8,
        contrast: bool,
        links: bool,
    }

    impl CommandTarget for Target {
        fn toggle_dark(&mut self) -> bool {
            self.dark = !self.dark;
            self.dark
        }
        fn font_size(&self) -> u8 {
            self.size
        }
        fn set_font_size(&mut self, requested: i32) -> u8 {
            self.size = crate::constants::clamp_font_size(requested);
            self.size
        }
        fn high_contrast(&self) -> bool {
            self.contrast
        }
        fn set_high_contrast(&mut self, enabled: bool) {
            self.contrast = enabled;
        }
        fn link_highlight(&self) -> bool {
            self.links
        }
        fn set_link_highlight(&mut self, enabled: bool) {
            self.links = enabled;
        }
    }

    #[test]
    fn embedded_table_loads() {
        let table = CommandTable::global();
        assert_eq!(table.voice.len(), 14);
        assert_eq!(table.shortcuts.len(), 9);
        assert_eq!(table.voice_action("ir al panel"), Some(Action::Navigate(Destination::Dashboard)));
        assert_eq!(table.voice_action("volver"), Some(Action::GoBack));
        assert_eq!(table.shortcuts.get("ctrl+shift+c"), Some(&Action::ToggleContrast));
    }

    #[test]
    fn action_ids_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.id().parse(), Ok(action));
        }
        assert_eq!("flyAway".parse::<Action>(), Err(UnknownAction("flyAway".to_string())));
        assert!(CommandTable::from_json(r#"{"voice":[{"phrase":"x","action":"nope"}]}"#).is_err());
    }

    #[test]
    fn font_steps_clamp() {
        let mut target = Target {
            size: 24,
            ..Target::default()
        };
        let mut nav = RecordingNavigator::default();
        let notice = execute_action(Action::IncreaseFontSize, &mut target, &mut nav, String::new);
        assert_eq!(target.size, 24);
        assert_eq!(notice.message, "Texto aumentado a 24px");

        target.size = 13;
        execute_action(Action::DecreaseFontSize, &mut target, &mut nav, String::new);
        assert_eq!(target.size, 12);
    }

    #[test]
    fn toggles_report_the_new_state() {
        let mut target = Target::default();
        let mut nav = RecordingNavigator::default();
        let on = execute_action(Action::ToggleContrast, &mut target, &mut nav, String::new);
        assert!(target.contrast);
        assert_eq!(on.message, "Alto contraste activado");
        let off = execute_action(Action::ToggleContrast, &mut target, &mut nav, String::new);
        assert!(!target.contrast);
        assert_eq!(off.message, "Contraste normal");
    }

    #[test]
    fn navigation_and_help_reach_their_collaborators() {
        let mut target = Target::default();
        let mut nav = RecordingNavigator::default();
        execute_action(Action::Navigate(Destination::Profile), &mut target, &mut nav, String::new);
        execute_action(Action::GoBack, &mut target, &mut nav, String::new);
        assert_eq!(nav.visited, vec!["/profile".to_string(), "back".to_string()]);

        let help = execute_action(Action::ShowHelp, &mut target, &mut nav, || "ayuda".to_string());
        assert_eq!(help.level, NoticeLevel::Info);
        assert!(help.sticky);
        assert_eq!(help.message, "ayuda");
    }
}
