//! Voice command interpreter.
//!
//! The interpreter owns the listening state machine and turns recognition
//! events into actions and notices. It never touches preferences itself: the
//! caller runs returned actions through [`crate::commands::execute_action`]
//! and mirrors [`VoiceOutcome::active`] into the manager's voice marker.
use crate::commands::{Action, CommandTable};
use crate::constants::RECOGNITION_LANG;
use crate::notice::Notice;
use regex::Regex;
use std::sync::OnceLock;

fn whitespace() -> Option<&'static Regex> {
    static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").ok()).as_ref()
}

/// Settings handed to the recognition engine on every start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            lang: RECOGNITION_LANG.to_string(),
            continuous: true,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    #[error("speech recognition is not available")]
    Unavailable,
    #[error("speech recognition failed to start: {0}")]
    Start(String),
}

/// Host speech recognition engine.
pub trait SpeechRecognizer {
    fn is_available(&self) -> bool;

    /// Begin a recognition session.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is missing or refuses to start.
    fn start(&self, config: &RecognitionConfig) -> Result<(), RecognitionError>;

    fn stop(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    NoSpeech,
    NotAllowed,
    Other(String),
}

impl RecognitionErrorKind {
    /// Map an engine error code (`no-speech`, `not-allowed`, ...).
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "not-allowed" => Self::NotAllowed,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    /// Final transcript of the latest utterance.
    Result(String),
    Error(RecognitionErrorKind),
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening,
    /// The engine is missing on this host.
    Unavailable,
}

/// What the caller should do after feeding the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceOutcome {
    pub action: Option<Action>,
    pub notices: Vec<Notice>,
    /// New value for the voice-active marker, when it changed.
    pub active: Option<bool>,
}

impl VoiceOutcome {
    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            ..Self::default()
        }
    }
}

/// Lower-case, trim and collapse internal whitespace.
#[must_use]
pub fn normalize_transcript(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    match whitespace() {
        Some(re) => re.replace_all(&lowered, " ").into_owned(),
        None => lowered.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

pub struct VoiceInterpreter<R> {
    recognizer: R,
    table: &'static CommandTable,
    config: RecognitionConfig,
    state: VoiceState,
    unavailable_reported: bool,
    restart_pending: bool,
}

impl<R: SpeechRecognizer> VoiceInterpreter<R> {
    pub fn new(recognizer: R) -> Self {
        Self::with_table(recognizer, CommandTable::global())
    }

    pub fn with_table(recognizer: R, table: &'static CommandTable) -> Self {
        Self {
            recognizer,
            table,
            config: RecognitionConfig::default(),
            state: VoiceState::Idle,
            unavailable_reported: false,
            restart_pending: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> VoiceState {
        self.state
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        matches!(self.state, VoiceState::Listening)
    }

    /// Listening, but the last automatic restart failed; the next enable
    /// retries it.
    #[must_use]
    pub const fn restart_pending(&self) -> bool {
        self.restart_pending
    }

    pub const fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Follow the user's voice-control preference.
    pub fn set_enabled(&mut self, enabled: bool) -> VoiceOutcome {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }

    fn enable(&mut self) -> VoiceOutcome {
        if self.is_listening() {
            return self.restart();
        }
        if !self.recognizer.is_available() {
            self.state = VoiceState::Unavailable;
            if self.unavailable_reported {
                return VoiceOutcome::default();
            }
            self.unavailable_reported = true;
            return VoiceOutcome::notice(Notice::error(
                "Tu navegador no soporta reconocimiento de voz",
            ));
        }
        match self.recognizer.start(&self.config) {
            Ok(()) => {
                self.state = VoiceState::Listening;
                VoiceOutcome {
                    active: Some(true),
                    ..VoiceOutcome::default()
                }
            }
            Err(err) => {
                log::error!("error starting voice recognition: {err}");
                self.state = VoiceState::Idle;
                VoiceOutcome::notice(Notice::error("No se pudo iniciar el control por voz"))
            }
        }
    }

    fn disable(&mut self) -> VoiceOutcome {
        match self.state {
            VoiceState::Listening => {
                self.state = VoiceState::Idle;
                self.restart_pending = false;
                self.recognizer.stop();
                VoiceOutcome {
                    notices: vec![Notice::info("Control por voz desactivado")],
                    active: Some(false),
                    ..VoiceOutcome::default()
                }
            }
            VoiceState::Unavailable => {
                self.state = VoiceState::Idle;
                VoiceOutcome::default()
            }
            VoiceState::Idle => VoiceOutcome::default(),
        }
    }

    /// Feed one engine event.
    pub fn handle(&mut self, event: RecognitionEvent) -> VoiceOutcome {
        match event {
            RecognitionEvent::Started => VoiceOutcome::notice(Notice::success(
                "Control por voz activado. Di \"ayuda\" para ver comandos.",
            )),
            RecognitionEvent::Result(raw) if self.is_listening() => self.interpret(&raw),
            RecognitionEvent::Result(raw) => {
                log::debug!("ignoring transcript while not listening: {raw}");
                VoiceOutcome::default()
            }
            RecognitionEvent::Error(kind) => {
                log::warn!("voice recognition error: {kind:?}");
                VoiceOutcome::notice(match kind {
                    RecognitionErrorKind::NoSpeech => {
                        Notice::info("No se detectó voz. Intenta de nuevo.")
                    }
                    RecognitionErrorKind::NotAllowed => {
                        Notice::error("Permiso de micrófono denegado")
                    }
                    RecognitionErrorKind::Other(_) => {
                        Notice::error("Error en reconocimiento de voz")
                    }
                })
            }
            RecognitionEvent::Ended => {
                self.restart_pending = self.is_listening();
                self.restart()
            }
        }
    }

    /// Start a new session after the engine stopped on its own. Failures
    /// keep the state at Listening so a later retry can recover.
    fn restart(&mut self) -> VoiceOutcome {
        if !self.restart_pending {
            return VoiceOutcome::default();
        }
        match self.recognizer.start(&self.config) {
            Ok(()) => {
                self.restart_pending = false;
                VoiceOutcome::default()
            }
            Err(err) => {
                log::error!("error restarting voice recognition: {err}");
                VoiceOutcome::notice(Notice::error("No se pudo iniciar el control por voz"))
            }
        }
    }

    fn interpret(&self, raw: &str) -> VoiceOutcome {
        let transcript = normalize_transcript(raw);
        log::debug!("voice transcript: {transcript}");
        match self.table.voice_action(&transcript) {
            Some(action) => VoiceOutcome {
                action: Some(action),
                notices: vec![Notice::info(format!("Comando reconocido: \"{transcript}\""))],
                active: None,
            },
            None => VoiceOutcome::notice(Notice::error(format!(
                "Comando \"{transcript}\" no reconocido. Di \"ayuda\" para ver comandos."
            ))),
        }
    }

    /// Listing of every phrase, for the help action.
    #[must_use]
    pub fn help_text(&self) -> String {
        voice_help(self.table)
    }
}

#[must_use]
pub fn voice_help(table: &CommandTable) -> String {
    format!(
        "Comandos disponibles: {}",
        table.phrases().collect::<Vec<_>>().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Destination;
    use crate::memory::MemoryRecognizer;
    use crate::notice::NoticeLevel;

    fn listening() -> VoiceInterpreter<MemoryRecognizer> {
        let mut voice = VoiceInterpreter::new(MemoryRecognizer::default());
        let outcome = voice.set_enabled(true);
        assert_eq!(outcome.active, Some(true));
        voice
    }

    #[test]
    fn transcripts_are_normalized() {
        assert_eq!(normalize_transcript("  Modo   OSCURO \t"), "modo oscuro");
        assert_eq!(normalize_transcript("Qué  puedo\ndecir"), "qué puedo decir");
    }

    #[test]
    fn start_uses_spanish_continuous_config() {
        let voice = listening();
        assert_eq!(voice.state(), VoiceState::Listening);
        let config = voice.recognizer().last_config().unwrap();
        assert_eq!(config.lang, "es-ES");
        assert!(config.continuous);
        assert!(!config.interim_results);
        assert_eq!(config.max_alternatives, 1);
    }

    #[test]
    fn recognized_phrase_yields_action() {
        let mut voice = listening();
        let outcome = voice.handle(RecognitionEvent::Result("Ir al Panel".into()));
        assert_eq!(outcome.action, Some(Action::Navigate(Destination::Dashboard)));
        assert_eq!(outcome.notices[0].message, "Comando reconocido: \"ir al panel\"");
    }

    #[test]
    fn unknown_phrase_yields_exactly_one_error() {
        let mut voice = listening();
        let outcome = voice.handle(RecognitionEvent::Result("xyz no existe".into()));
        assert_eq!(outcome.action, None);
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Error);
        assert!(outcome.notices[0].message.contains("no reconocido"));
    }

    #[test]
    fn unavailable_engine_reports_once() {
        let mut voice = VoiceInterpreter::new(MemoryRecognizer::unavailable());
        assert_eq!(voice.set_enabled(true).notices.len(), 1);
        assert_eq!(voice.state(), VoiceState::Unavailable);
        assert!(voice.set_enabled(false).notices.is_empty());
        assert!(voice.set_enabled(true).notices.is_empty());
        assert_eq!(voice.recognizer().starts(), 0);
    }

    #[test]
    fn start_failure_stays_idle() {
        let recognizer = MemoryRecognizer::default();
        recognizer.fail_start(true);
        let mut voice = VoiceInterpreter::new(recognizer);
        let outcome = voice.set_enabled(true);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(outcome.active, None);
        assert_eq!(outcome.notices[0].message, "No se pudo iniciar el control por voz");
    }

    #[test]
    fn end_restarts_while_listening() {
        let mut voice = listening();
        voice.handle(RecognitionEvent::Ended);
        assert_eq!(voice.recognizer().starts(), 2);
        voice.set_enabled(false);
        voice.handle(RecognitionEvent::Ended);
        assert_eq!(voice.recognizer().starts(), 2);
    }

    #[test]
    fn failed_restart_keeps_listening_until_retry() {
        let mut voice = listening();
        voice.recognizer().fail_start(true);
        let outcome = voice.handle(RecognitionEvent::Ended);
        assert_eq!(outcome.active, None);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Error);
        assert_eq!(voice.state(), VoiceState::Listening);
        assert!(voice.restart_pending());

        voice.recognizer().fail_start(false);
        let retried = voice.set_enabled(true);
        assert!(retried.notices.is_empty());
        assert!(!voice.restart_pending());
        assert_eq!(voice.recognizer().starts(), 2);
    }

    #[test]
    fn enable_while_listening_does_not_restart() {
        let mut voice = listening();
        assert_eq!(voice.set_enabled(true), VoiceOutcome::default());
        assert_eq!(voice.recognizer().starts(), 1);
    }

    #[test]
    fn transcripts_after_disable_are_ignored() {
        let mut voice = listening();
        voice.set_enabled(false);
        let outcome = voice.handle(RecognitionEvent::Result("modo oscuro".into()));
        assert_eq!(outcome, VoiceOutcome::default());
    }

    #[test]
    fn disable_is_idempotent() {
        let mut voice = listening();
        let first = voice.set_enabled(false);
        assert_eq!(first.active, Some(false));
        assert_eq!(first.notices.len(), 1);
        let second = voice.set_enabled(false);
        assert_eq!(second, VoiceOutcome::default());
        assert_eq!(voice.recognizer().stops(), 1);
    }

    #[test]
    fn errors_map_to_notices_without_state_change() {
        let mut voice = listening();
        let no_speech = voice.handle(RecognitionEvent::Error(RecognitionErrorKind::from_code(
            "no-speech",
        )));
        assert_eq!(no_speech.notices[0].level, NoticeLevel::Info);
        let denied = voice.handle(RecognitionEvent::Error(RecognitionErrorKind::from_code(
            "not-allowed",
        )));
        assert_eq!(denied.notices[0].message, "Permiso de micrófono denegado");
        assert_eq!(voice.state(), VoiceState::Listening);
    }

    #[test]
    fn help_lists_every_phrase() {
        let voice = listening();
        let help = voice.help_text();
        for phrase in CommandTable::global().phrases() {
            assert!(help.contains(phrase), "missing {phrase}");
        }
    }
}
