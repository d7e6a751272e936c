use js_sys::{Function, Promise};
use std::future::Future;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, Storage, Window};

/// The browser `window`, when running inside one.
#[must_use]
pub fn window() -> Option<Window> {
    if cfg!(target_arch = "wasm32") {
        web_sys::window()
    } else {
        None
    }
}

#[must_use]
pub fn document() -> Option<Document> {
    window().and_then(|win| win.document())
}

/// `<html>`, the element carrying accessibility classes and variables.
#[must_use]
pub fn document_root() -> Option<HtmlElement> {
    document()
        .and_then(|doc| doc.document_element())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// The browser `localStorage` handle; `None` outside a browser or when
/// storage is disabled.
#[must_use]
pub fn local_storage() -> Option<Storage> {
    match window()?.local_storage() {
        Ok(storage) => storage,
        Err(err) => {
            log::warn!("localStorage access denied: {}", js_error_message(&err));
            None
        }
    }
}

/// Add a `<style>` block to `<head>` once.
pub fn inject_style(id: &str, css: &str) {
    let Some(doc) = document() else {
        return;
    };
    if doc.get_element_by_id(id).is_some() {
        return;
    }
    let Some(head) = doc.head() else {
        return;
    };
    match doc.create_element("style") {
        Ok(style) => {
            style.set_id(id);
            style.set_text_content(Some(css));
            if let Err(err) = head.append_child(&style) {
                log::warn!("could not inject {id}: {}", js_error_message(&err));
            }
        }
        Err(err) => log::warn!("could not create style element: {}", js_error_message(&err)),
    }
}

/// OS colour-scheme hint.
#[must_use]
pub fn prefers_dark_scheme() -> bool {
    window()
        .and_then(|win| win.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .is_some_and(|query| query.matches())
}

/// Yield execution for the requested number of milliseconds.
///
/// # Errors
/// Returns an error if the timer cannot be scheduled or the underlying JavaScript promise rejects.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn sleep_ms(duration_ms: i32) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
    let mut resolve_slot: Option<Function> = None;
    let promise = Promise::new(&mut |resolve, _reject| {
        resolve_slot = Some(resolve);
    });

    let resolve =
        resolve_slot.ok_or_else(|| JsValue::from_str("resolve function should be set"))?;
    let closure = Closure::once(move || {
        let _ = resolve.call0(&JsValue::UNDEFINED);
    });

    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        duration_ms,
    )?;
    closure.forget();

    JsFuture::from(promise).await?;
    Ok(())
}

/// Run a future on the browser event loop. Outside the browser the future
/// is dropped unpolled.
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(future);
    #[cfg(not(target_arch = "wasm32"))]
    {
        drop(future);
        log::debug!("skipping browser task outside wasm");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_builds_have_no_browser() {
        assert!(window().is_none());
        assert!(document_root().is_none());
        assert!(local_storage().is_none());
        inject_style("watio-test", "body{}");
        assert!(!prefers_dark_scheme());
    }
}
