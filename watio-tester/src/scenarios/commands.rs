//! Keyboard and voice input driven through the shared action executor.
use anyhow::{Result, bail, ensure};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use watio_access::{
    Action, Dispatch, KeyChord, KeyboardDispatcher, MemoryRecognizer, NoticeLevel,
    RecognitionEvent, RecordingNavigator, ShortcutMap, VoiceInterpreter, execute_action,
};

use super::{Scenario, SeededCheck};
use crate::device::Device;

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(SeededCheck::new(
            "keyboard-dispatch",
            "Contrast chord toggles once per key-down; custom chords win",
            keyboard_dispatch,
        )),
        Box::new(SeededCheck::new(
            "voice-commands",
            "Known phrases run their action; unknown ones change nothing",
            voice_commands,
        )),
    ]
}

fn press(device: &mut Device, keys: &KeyboardDispatcher, chord: &KeyChord) -> Result<Action> {
    let custom = device.engine.preferences().custom_shortcuts.clone();
    match keys.dispatch(chord, &custom) {
        Dispatch::Action(action) => {
            let mut navigator = RecordingNavigator::default();
            execute_action(action, &mut device.engine, &mut navigator, || {
                keys.help_text(&custom)
            });
            Ok(action)
        }
        other => bail!("{chord} dispatched to {other:?}"),
    }
}

fn keyboard_dispatch(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut device = Device::fresh(false);
    let keys = KeyboardDispatcher::default();
    // Cmd on macOS maps to the same chord.
    let use_meta = rng.gen_bool(0.5);
    let Some(chord) = KeyChord::from_event("C", !use_meta, use_meta, true, false) else {
        bail!("ctrl+shift+c did not form a chord");
    };
    ensure!(chord.as_str() == "ctrl+shift+c", "chord normalised to {chord}");

    let presses = rng.gen_range(1..=7);
    for _ in 0..presses {
        let action = press(&mut device, &keys, &chord)?;
        ensure!(action == Action::ToggleContrast, "default chord ran {action}");
    }
    ensure!(
        device.engine.preferences().high_contrast == (presses % 2 == 1),
        "{presses} presses left contrast at {}",
        device.engine.preferences().high_contrast
    );

    ensure!(
        KeyChord::from_event("Shift", false, false, true, false).is_none(),
        "modifier-only key-down formed a chord"
    );

    let custom = ShortcutMap::from([("Ctrl+Shift+C".to_string(), "toggleLinks".to_string())]);
    device.engine.set_custom_shortcuts(&custom);
    let contrast = device.engine.preferences().high_contrast;
    let action = press(&mut device, &keys, &chord)?;
    ensure!(action == Action::ToggleLinks, "custom chord ran {action}");
    ensure!(
        device.engine.preferences().high_contrast == contrast,
        "custom chord still toggled contrast"
    );
    ensure!(device.engine.preferences().link_highlight, "links not highlighted");
    device.check_all()
}

/// Same words, with the casing and spacing a recognizer might produce.
fn mangle(phrase: &str, rng: &mut ChaCha8Rng) -> String {
    let words: Vec<String> = phrase
        .split(' ')
        .map(|word| {
            if rng.gen_bool(0.5) {
                word.to_uppercase()
            } else {
                word.to_string()
            }
        })
        .collect();
    let gap = " ".repeat(rng.gen_range(1..=3));
    format!("  {} ", words.join(gap.as_str()))
}

fn voice_commands(rng: &mut ChaCha8Rng) -> Result<()> {
    let mut device = Device::fresh(rng.gen_bool(0.5));
    let mut voice = VoiceInterpreter::new(MemoryRecognizer::default());
    let started = voice.set_enabled(true);
    ensure!(started.active == Some(true), "voice did not start: {started:?}");
    device.engine.set_voice_active(true);

    let dark_before = device.engine.preferences().dark_mode;
    let outcome = voice.handle(RecognitionEvent::Result(mangle("modo oscuro", rng)));
    let Some(action) = outcome.action else {
        bail!("\"modo oscuro\" was not recognised: {:?}", outcome.notices);
    };
    let mut navigator = RecordingNavigator::default();
    let notice = execute_action(action, &mut device.engine, &mut navigator, || {
        voice.help_text()
    });
    ensure!(notice.level == NoticeLevel::Success, "feedback {notice:?}");
    ensure!(
        device.engine.preferences().dark_mode != dark_before,
        "dark mode did not toggle"
    );

    let prefs = device.engine.preferences().clone();
    let stored = device.store.snapshot();
    let outcome = voice.handle(RecognitionEvent::Result("xyz no existe".to_string()));
    ensure!(outcome.action.is_none(), "unknown phrase ran {:?}", outcome.action);
    ensure!(outcome.notices.len() == 1, "notices {:?}", outcome.notices);
    ensure!(
        outcome.notices[0].level == NoticeLevel::Error
            && outcome.notices[0].message.contains("no reconocido"),
        "unexpected feedback {:?}",
        outcome.notices[0]
    );
    ensure!(device.engine.preferences() == &prefs, "unknown phrase changed preferences");
    ensure!(device.store.snapshot() == stored, "unknown phrase touched storage");
    ensure!(voice.is_listening(), "interpreter stopped listening");

    let stopped = voice.set_enabled(false);
    if let Some(active) = stopped.active {
        device.engine.set_voice_active(active);
    }
    ensure!(!device.engine.voice_active(), "voice marker left on");
    device.check_all()
}
