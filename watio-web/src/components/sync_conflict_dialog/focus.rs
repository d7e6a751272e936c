use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

const FOCUSABLE_QUERY: &str =
    "button, [href], input, textarea, select, [tabindex]:not([tabindex='-1'])";

fn focusable(container: &web_sys::Element) -> Vec<web_sys::HtmlElement> {
    let Ok(nodes) = container.query_selector_all(FOCUSABLE_QUERY) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|idx| nodes.get(idx))
        .filter_map(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .collect()
}

/// Move focus into the dialog while open and hand it back on close.
#[hook]
pub fn use_focus_management(open: bool, container_ref: NodeRef) {
    use_effect_with((open, container_ref), move |(open, container_ref)| {
        let mut prev_focus: Option<web_sys::HtmlElement> = None;
        let focus_target = if cfg!(target_arch = "wasm32") && *open {
            prev_focus = crate::dom::document()
                .and_then(|doc| doc.active_element())
                .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
            container_ref
                .cast::<web_sys::Element>()
                .and_then(|el| focusable(&el).into_iter().next())
        } else {
            None
        };

        if let Some(first) = focus_target {
            let _ = first.focus();
        }
        move || {
            if let Some(el) = prev_focus {
                let _ = el.focus();
            }
        }
    });
}

/// Escape dismisses; Tab cycles inside the dialog.
pub fn keydown_handler(container_ref: NodeRef, on_escape: Callback<()>) -> Callback<KeyboardEvent> {
    Callback::from(move |e: KeyboardEvent| {
        if !cfg!(target_arch = "wasm32") {
            return;
        }
        if e.key() == "Escape" {
            on_escape.emit(());
            return;
        }
        if e.key() != "Tab" {
            return;
        }
        let Some(container) = container_ref.cast::<web_sys::Element>() else {
            return;
        };
        let nodes = focusable(&container);
        let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
            return;
        };
        let Some(active) = crate::dom::document().and_then(|d| d.active_element()) else {
            return;
        };
        if !container.contains(Some(&active)) {
            e.prevent_default();
            let _ = first.focus();
            return;
        }
        let first_el: &web_sys::Element = first.as_ref();
        let last_el: &web_sys::Element = last.as_ref();
        if e.shift_key() && active == *first_el {
            e.prevent_default();
            let _ = last.focus();
        } else if !e.shift_key() && active == *last_el {
            e.prevent_default();
            let _ = first.focus();
        }
    })
}
