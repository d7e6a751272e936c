use super::{LatestContext, RouterNavigator, current, use_latest_context};
use crate::context::AccessibilityContext;
use watio_access::{
    Dispatch, KeyChord, KeyboardDispatcher, Navigator, Notice, PreferenceStore, RemoteProfileStore,
    SpeechOutput, StyleSurface,
};
use yew::prelude::*;

/// Resolve a chord against the user's shortcuts and run the bound action.
///
/// Returns the dispatch result so the caller can suppress the browser default.
pub fn handle_chord<S, D, T, R>(
    ctx: &AccessibilityContext<S, D, T, R>,
    chord: &KeyChord,
    navigator: &mut dyn Navigator,
) -> Dispatch
where
    S: PreferenceStore + 'static,
    D: StyleSurface + 'static,
    T: SpeechOutput + 'static,
    R: RemoteProfileStore + 'static,
{
    let custom = ctx.snapshot.prefs.custom_shortcuts.clone();
    let dispatch = KeyboardDispatcher::default().dispatch(chord, &custom);
    match &dispatch {
        Dispatch::Action(action) => {
            let notice = ctx.execute(*action, navigator, || {
                KeyboardDispatcher::default().help_text(&custom)
            });
            ctx.notify(notice);
        }
        Dispatch::Unknown(id) => {
            log::warn!("shortcut {chord} is bound to unknown action {id}");
            ctx.notify(Notice::error(format!("Acción desconocida: {id}")));
        }
        Dispatch::Unbound => {}
    }
    dispatch
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn on_key(latest: &LatestContext, chord: Option<KeyChord>) -> bool {
    let Some(chord) = chord else {
        return false;
    };
    let Some((ctx, navigator)) = current(latest) else {
        return false;
    };
    let mut navigator = RouterNavigator::new(navigator);
    handle_chord(&ctx, &chord, &mut navigator).prevents_default()
}

#[cfg(target_arch = "wasm32")]
struct KeyListener {
    document: web_sys::Document,
    callback: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::KeyboardEvent)>,
}

#[cfg(target_arch = "wasm32")]
impl Drop for KeyListener {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;
        let _ = self
            .document
            .remove_event_listener_with_callback("keydown", self.callback.as_ref().unchecked_ref());
    }
}

#[cfg(target_arch = "wasm32")]
fn install(latest: LatestContext) -> Option<KeyListener> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let document = crate::dom::document()?;
    let callback = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(
        move |event: web_sys::KeyboardEvent| {
            let chord = KeyChord::from_event(
                &event.key(),
                event.ctrl_key(),
                event.meta_key(),
                event.shift_key(),
                event.alt_key(),
            );
            if on_key(&latest, chord) {
                event.prevent_default();
            }
        },
    );
    if let Err(err) =
        document.add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())
    {
        log::error!(
            "failed to listen for shortcuts: {}",
            crate::dom::js_error_message(&err)
        );
        return None;
    }
    Some(KeyListener { document, callback })
}

#[cfg(not(target_arch = "wasm32"))]
fn install(_latest: LatestContext) -> Option<()> {
    None
}

/// Listen for shortcut chords on the whole document while mounted.
#[hook]
pub fn use_keyboard_shortcuts() {
    let latest = use_latest_context();
    use_effect_with((), move |()| {
        let listener = install(latest);
        move || drop(listener)
    });
}
