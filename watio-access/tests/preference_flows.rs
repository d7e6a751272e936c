use futures::executor::block_on;
use watio_access::{
    AccessibilityManager, AccessibilityProfile, Action, CommandTable, ConflictChoice, Dispatch,
    KeyChord, KeyboardDispatcher, MemoryRecognizer, MemoryRemote, MemorySpeech, MemoryStore,
    MemorySurface, NoticeLevel, PreferenceSet, ProfileConflict, Reconciliation, RecognitionEvent,
    RecordingNavigator, Session, ShortcutMap, Spacing, VoiceInterpreter, execute_action,
    constants::{KEY_FONT_SIZE, KEY_PROFILE},
    style::{PROFILE_SCOPED_VARIABLES, VAR_FONT_SIZE_BASE},
};

type Manager = AccessibilityManager<MemoryStore, MemorySurface, MemorySpeech>;

struct Harness {
    manager: Manager,
    store: MemoryStore,
    surface: MemorySurface,
    speech: MemorySpeech,
}

fn harness_with(store: MemoryStore, prefers_dark: bool) -> Harness {
    let surface = MemorySurface::default();
    let speech = MemorySpeech::default();
    let manager = AccessibilityManager::load(
        store.clone(),
        surface.clone(),
        speech.clone(),
        prefers_dark,
    );
    Harness {
        manager,
        store,
        surface,
        speech,
    }
}

fn harness() -> Harness {
    harness_with(MemoryStore::default(), false)
}

#[test]
fn fresh_device_starts_from_defaults() {
    let h = harness_with(MemoryStore::default(), true);
    let prefs = h.manager.preferences();
    assert_eq!(h.manager.profile(), AccessibilityProfile::None);
    assert_eq!(prefs.font_size_px, 16);
    assert!(prefs.dark_mode);
    assert!(!prefs.high_contrast);
    assert_eq!(prefs.spacing, Spacing::Normal);
    assert_eq!(prefs, &PreferenceSet::with_dark_mode(true));
    assert!(h.surface.has_class("spacing-normal"));
}

#[test]
fn every_font_size_in_range_reaches_the_surface() {
    let mut h = harness();
    for n in 12..=24 {
        assert_eq!(h.manager.set_font_size(n), u8::try_from(n).unwrap());
        assert_eq!(
            h.surface.property(VAR_FONT_SIZE_BASE),
            Some(format!("{n}px"))
        );
        assert_eq!(h.store.value(KEY_FONT_SIZE), Some(n.to_string()));
    }
}

#[test]
fn font_actions_clamp_at_the_bounds() {
    let mut h = harness();
    let mut nav = RecordingNavigator::default();
    h.manager.set_font_size(24);
    execute_action(Action::IncreaseFontSize, &mut h.manager, &mut nav, String::new);
    assert_eq!(h.manager.preferences().font_size_px, 24);
    h.manager.set_font_size(12);
    execute_action(Action::DecreaseFontSize, &mut h.manager, &mut nav, String::new);
    assert_eq!(h.manager.preferences().font_size_px, 12);
    assert_eq!(h.store.value(KEY_FONT_SIZE).as_deref(), Some("12"));
}

#[test]
fn every_profile_clears_back_to_none() {
    let mut h = harness();
    for profile in AccessibilityProfile::ALL {
        h.manager.apply_profile(profile);
        h.manager.apply_profile(AccessibilityProfile::None);
        for var in PROFILE_SCOPED_VARIABLES {
            assert_eq!(h.surface.property(var), None, "{profile}: {var}");
        }
        assert!(
            !h.surface.classes().iter().any(|c| c.starts_with("perfil-")),
            "{profile} left a class"
        );
    }
    assert_eq!(h.store.value(KEY_PROFILE).as_deref(), Some("ninguna"));
}

#[test]
fn boolean_setters_are_idempotent() {
    let mut h = harness();
    let setters: [fn(&mut Manager, bool); 5] = [
        Manager::set_dark_mode,
        Manager::set_high_contrast,
        Manager::set_link_highlight,
        Manager::set_custom_colors_enabled,
        Manager::set_text_to_speech,
    ];
    for setter in setters {
        setter(&mut h.manager, true);
        let classes = h.surface.classes();
        let properties = h.surface.properties();
        let stored = h.store.snapshot();
        setter(&mut h.manager, true);
        assert_eq!(h.surface.classes(), classes);
        assert_eq!(h.surface.properties(), properties);
        assert_eq!(h.store.snapshot(), stored);
    }
}

#[test]
fn disabling_speech_leaves_nothing_pending() {
    let mut h = harness();
    h.manager.set_text_to_speech(true);
    h.manager.speak("Consumo de hoy: 12 kWh");
    assert!(!h.speech.pending().is_empty());
    h.manager.set_text_to_speech(false);
    assert!(h.speech.pending().is_empty());
}

fn signed_in_conflict() -> (Harness, MemoryRemote, ProfileConflict) {
    let store = MemoryStore::with_entries([(KEY_PROFILE, "visual")]);
    let mut h = harness_with(store, false);
    let remote = MemoryRemote::default();
    remote.set_row("acct-7", Some(AccessibilityProfile::Cognitive));
    h.manager
        .set_session(Some(Session::new("acct-7", "token")));
    let outcome = block_on(h.manager.reconcile_with_account(&remote));
    let Reconciliation::Conflict(conflict) = outcome else {
        panic!("expected conflict, got {outcome:?}");
    };
    assert_eq!(h.manager.profile(), AccessibilityProfile::Visual);
    assert!(h.surface.has_class("perfil-visual"));
    (h, remote, conflict)
}

#[test]
fn conflict_resolved_with_account_value() {
    let (mut h, remote, conflict) = signed_in_conflict();
    let applied = block_on(h.manager.resolve_conflict(&remote, conflict, ConflictChoice::UseAccount));
    assert_eq!(applied, Some(AccessibilityProfile::Cognitive));
    assert_eq!(h.store.value(KEY_PROFILE).as_deref(), Some("cognitiva"));
    assert!(h.surface.has_class("perfil-cognitiva"));
    assert!(!h.surface.has_class("perfil-visual"));
}

#[test]
fn conflict_resolved_with_local_value_leaves_account_alone() {
    let (mut h, remote, conflict) = signed_in_conflict();
    let applied = block_on(h.manager.resolve_conflict(&remote, conflict, ConflictChoice::KeepLocal));
    assert_eq!(applied, Some(AccessibilityProfile::Visual));
    assert_eq!(h.store.value(KEY_PROFILE).as_deref(), Some("visual"));
    assert_eq!(remote.row("acct-7"), Some(AccessibilityProfile::Cognitive));
    assert_eq!(remote.updates(), 0);
}

#[test]
fn contrast_shortcut_toggles_once_per_keydown() {
    let mut h = harness();
    let mut nav = RecordingNavigator::default();
    let keys = KeyboardDispatcher::default();
    let chord = KeyChord::from_event("C", true, false, true, false).unwrap();

    let Dispatch::Action(action) = keys.dispatch(&chord, &h.manager.preferences().custom_shortcuts)
    else {
        panic!("ctrl+shift+c should be bound");
    };
    execute_action(action, &mut h.manager, &mut nav, String::new);
    assert!(h.manager.preferences().high_contrast);

    let mut custom = ShortcutMap::new();
    custom.insert("Ctrl+Shift+C".to_string(), "toggleLinks".to_string());
    h.manager.set_custom_shortcuts(&custom);
    let dispatch = keys.dispatch(&chord, &h.manager.preferences().custom_shortcuts);
    assert_eq!(dispatch, Dispatch::Action(Action::ToggleLinks));
    if let Dispatch::Action(action) = dispatch {
        execute_action(action, &mut h.manager, &mut nav, String::new);
    }
    assert!(h.manager.preferences().high_contrast);
    assert!(h.manager.preferences().link_highlight);
}

#[test]
fn voice_commands_drive_the_manager() {
    let mut h = harness();
    let mut nav = RecordingNavigator::default();
    let mut voice = VoiceInterpreter::new(MemoryRecognizer::default());
    let started = voice.set_enabled(true);
    if let Some(active) = started.active {
        h.manager.set_voice_active(active);
    }
    assert!(h.surface.has_class("voice-control-active"));

    let outcome = voice.handle(RecognitionEvent::Result("Modo Oscuro".to_string()));
    let action = outcome.action.unwrap();
    execute_action(action, &mut h.manager, &mut nav, || voice.help_text());
    assert!(h.manager.preferences().dark_mode);

    let dark_before = h.manager.preferences().clone();
    let missed = voice.handle(RecognitionEvent::Result("xyz no existe".to_string()));
    assert_eq!(missed.action, None);
    assert_eq!(missed.notices.len(), 1);
    assert_eq!(missed.notices[0].level, NoticeLevel::Error);
    assert_eq!(h.manager.preferences(), &dark_before);

    let stopped = voice.set_enabled(false);
    if let Some(active) = stopped.active {
        h.manager.set_voice_active(active);
    }
    assert!(!h.surface.has_class("voice-control-active"));

    let late = voice.handle(RecognitionEvent::Result("modo oscuro".to_string()));
    assert_eq!(late.action, None);
    assert!(late.notices.is_empty());
    assert!(h.manager.preferences().dark_mode);
}

#[test]
fn failed_restart_keeps_voice_marker_until_retry() {
    let mut h = harness();
    let recognizer = MemoryRecognizer::default();
    let mut voice = VoiceInterpreter::new(recognizer.clone());
    if let Some(active) = voice.set_enabled(true).active {
        h.manager.set_voice_active(active);
    }

    recognizer.fail_start(true);
    let ended = voice.handle(RecognitionEvent::Ended);
    assert_eq!(ended.active, None);
    assert_eq!(ended.notices.len(), 1);
    assert!(voice.is_listening());
    assert!(h.surface.has_class("voice-control-active"));
    assert_eq!(voice.set_enabled(true).notices.len(), 1);

    recognizer.fail_start(false);
    voice.handle(RecognitionEvent::Ended);
    assert!(!voice.restart_pending());
    assert_eq!(recognizer.starts(), 2);

    let outcome = voice.handle(RecognitionEvent::Result("modo oscuro".to_string()));
    assert!(outcome.action.is_some());
}

#[test]
fn state_survives_a_reload() {
    let mut h = harness();
    h.manager.set_dark_mode(false);
    h.manager.apply_profile(AccessibilityProfile::Auditory);
    h.manager.set_spacing(Spacing::Wide);
    h.manager.set_custom_colors("#101010", "#fafafa").unwrap();
    h.manager.set_custom_colors_enabled(true);

    let reloaded = harness_with(h.store.clone(), true);
    assert_eq!(reloaded.manager.profile(), AccessibilityProfile::Auditory);
    assert_eq!(reloaded.manager.preferences(), h.manager.preferences());
    assert_eq!(reloaded.surface.properties(), h.surface.properties());
    assert_eq!(reloaded.surface.classes(), h.surface.classes());
}

#[test]
fn embedded_tables_are_complete() {
    let table = CommandTable::global();
    for action in Action::ALL {
        assert!(
            table.voice.iter().any(|entry| entry.action == action),
            "{action} has no phrase"
        );
    }
    assert!(table.shortcuts.values().all(|action| *action != Action::GoBack));
}
