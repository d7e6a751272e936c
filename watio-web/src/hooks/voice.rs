use super::{LatestContext, RouterNavigator, current, use_latest_context};
use crate::browser::BrowserRecognizer;
use crate::context::AccessibilityContext;
use crate::dom;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use watio_access::voice::voice_help;
use watio_access::{
    CommandTable, Navigator, PreferenceStore, RecognitionEvent, RemoteProfileStore, SpeechOutput,
    StyleSurface, VoiceInterpreter, VoiceOutcome,
};
use yew::prelude::*;

type SharedInterpreter = Rc<RefCell<Option<VoiceInterpreter<BrowserRecognizer>>>>;

const RESTART_RETRY_MS: i32 = 1_000;

/// Push an interpreter outcome into the app: marker, toasts, then the action.
pub fn apply_voice_outcome<S, D, T, R>(
    ctx: &AccessibilityContext<S, D, T, R>,
    navigator: &mut dyn Navigator,
    outcome: VoiceOutcome,
) where
    S: PreferenceStore + 'static,
    D: StyleSurface + 'static,
    T: SpeechOutput + 'static,
    R: RemoteProfileStore + 'static,
{
    if let Some(active) = outcome.active {
        ctx.set_voice_active(active);
    }
    for notice in outcome.notices {
        ctx.notify(notice);
    }
    if let Some(action) = outcome.action {
        let notice = ctx.execute(action, navigator, || voice_help(CommandTable::global()));
        ctx.notify(notice);
    }
}

fn deliver(latest: &LatestContext, outcome: VoiceOutcome) {
    let Some((ctx, navigator)) = current(latest) else {
        return;
    };
    apply_voice_outcome(&ctx, &mut RouterNavigator::new(navigator), outcome);
}

fn forward(
    interpreter: &Weak<RefCell<Option<VoiceInterpreter<BrowserRecognizer>>>>,
    latest: &LatestContext,
    event: RecognitionEvent,
) {
    let Some(interpreter) = interpreter.upgrade() else {
        return;
    };
    let ended = matches!(event, RecognitionEvent::Ended);
    let (outcome, retry) = match interpreter.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map_or((None, false), |voice| {
            let outcome = voice.handle(event);
            (Some(outcome), ended && voice.restart_pending())
        }),
        Err(_) => {
            log::warn!("dropping recognition event {event:?} while the interpreter is busy");
            (None, false)
        }
    };
    if let Some(outcome) = outcome {
        deliver(latest, outcome);
    }
    if retry {
        schedule_restart(Rc::downgrade(&interpreter), Rc::clone(latest));
    }
}

fn schedule_restart(
    interpreter: Weak<RefCell<Option<VoiceInterpreter<BrowserRecognizer>>>>,
    latest: LatestContext,
) {
    dom::spawn(async move {
        if dom::sleep_ms(RESTART_RETRY_MS).await.is_err() {
            return;
        }
        let Some(interpreter) = interpreter.upgrade() else {
            return;
        };
        let pending = interpreter
            .try_borrow()
            .is_ok_and(|slot| slot.as_ref().is_some_and(VoiceInterpreter::restart_pending));
        if !pending {
            return;
        }
        if let Some(outcome) = set_enabled(&interpreter, true) {
            deliver(&latest, outcome);
        }
    });
}

fn set_enabled(interpreter: &SharedInterpreter, enabled: bool) -> Option<VoiceOutcome> {
    interpreter
        .try_borrow_mut()
        .ok()?
        .as_mut()
        .map(|voice| voice.set_enabled(enabled))
}

/// Drive speech recognition from the voice-control preference.
#[hook]
pub fn use_voice_control() {
    let latest = use_latest_context();
    let enabled = current(&latest).is_some_and(|(ctx, _)| ctx.snapshot.prefs.voice_control_enabled);
    let interpreter: SharedInterpreter = use_mut_ref(|| None);

    if interpreter.borrow().is_none() {
        let weak = Rc::downgrade(&interpreter);
        let sink_latest = Rc::clone(&latest);
        let sink = move |event: RecognitionEvent| forward(&weak, &sink_latest, event);
        *interpreter.borrow_mut() = Some(VoiceInterpreter::new(BrowserRecognizer::new(sink)));
    }

    {
        let interpreter = Rc::clone(&interpreter);
        let latest = Rc::clone(&latest);
        use_effect_with(enabled, move |enabled| {
            if let Some(outcome) = set_enabled(&interpreter, *enabled) {
                deliver(&latest, outcome);
            }
            || ()
        });
    }

    use_effect_with((), move |()| {
        move || {
            let _ = set_enabled(&interpreter, false);
        }
    });
}
