//! Watio Accessibility Engine
//!
//! Platform-agnostic accessibility preferences for the Watio energy dashboard.
//! This crate owns state, persistence, remote profile sync, the styling model
//! and both command inputs (voice and keyboard) without any browser
//! dependency. Hosts plug in through the traits re-exported below.

pub mod commands;
pub mod constants;
pub mod keyboard;
pub mod manager;
pub mod memory;
pub mod notice;
pub mod prefs;
pub mod profile;
pub mod remote;
pub mod speech;
pub mod storage;
pub mod style;
pub mod voice;

// Re-export commonly used types
pub use commands::{
    Action, CommandTable, CommandTableError, CommandTarget, Destination, Navigator, UnknownAction,
    VoicePhrase, execute_action,
};
pub use keyboard::{Dispatch, HelpEntry, KeyChord, KeyboardDispatcher, normalize_shortcuts};
pub use manager::AccessibilityManager;
pub use memory::{
    MemoryRecognizer, MemoryRemote, MemorySpeech, MemoryStore, MemorySurface, RecordingNavigator,
    StoreError,
};
pub use notice::{Notice, NoticeLevel};
pub use prefs::{
    ColorError, ColorValue, CustomColors, FontFamily, LetterSpacing, LineHeight, PreferenceSet,
    ShortcutMap, Spacing, UnknownChoice,
};
pub use profile::{AccessibilityProfile, UnknownProfile};
pub use remote::{
    ConflictChoice, ProfileConflict, Reconciliation, RemoteProfileStore, Session, SyncError,
};
pub use speech::{NoSpeech, SpeechOutput};
pub use storage::{PrefField, PreferenceStore};
pub use style::{StyleModel, StyleOp, StyleSurface};
pub use voice::{
    RecognitionConfig, RecognitionError, RecognitionErrorKind, RecognitionEvent,
    SpeechRecognizer, VoiceInterpreter, VoiceOutcome, VoiceState,
};
