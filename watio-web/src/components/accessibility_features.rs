use super::{NoticeBoard, SyncConflictDialog};
use crate::a11y::{MAIN_CONTENT_ID, STATUS_REGION_ID};
use crate::context::use_accessibility;
use crate::hooks::{use_keyboard_shortcuts, use_voice_control};
use watio_access::ConflictChoice;
use yew::prelude::*;

/// Always-mounted accessibility chrome.
///
/// Skip link, live region, toasts, the sign-in conflict dialog, the
/// listening indicator, plus the keyboard and voice listeners.
#[function_component(AccessibilityFeatures)]
pub fn accessibility_features() -> Html {
    let ctx = use_accessibility();
    use_keyboard_shortcuts();
    use_voice_control();

    let skip_href = format!("#{MAIN_CONTENT_ID}");
    let skip_link = html! {
        <a class="skip-link" href={skip_href}>{"Saltar al contenido principal"}</a>
    };
    let live_region = html! {
        <div id={STATUS_REGION_ID} class="sr-only" role="status" aria-live="polite"></div>
    };

    let Some(ctx) = ctx else {
        return html! { <>{skip_link}{live_region}</> };
    };

    let on_choose = {
        let ctx = ctx.clone();
        Callback::from(move |choice: ConflictChoice| ctx.resolve_conflict(choice))
    };
    let on_dismiss = {
        let ctx = ctx.clone();
        Callback::from(move |id: u32| ctx.dismiss(id))
    };

    html! {
      <>
        {skip_link}
        {live_region}
        <NoticeBoard notices={ctx.notices.items.clone()} {on_dismiss} />
        <SyncConflictDialog conflict={ctx.conflict} {on_choose} />
        if ctx.snapshot.voice_active {
          <div class="voice-indicator badge badge-accent" role="status" aria-label="Control por voz activo">
            {"🎤 Escuchando"}
          </div>
        }
      </>
    }
}
