// Screen reader helpers

/// Live region id; announcements are written into it.
pub const STATUS_REGION_ID: &str = "a11y-status";

/// Skip link target.
pub const MAIN_CONTENT_ID: &str = "main-content";

/// Critical accessibility CSS, injected before the app renders.
///
/// Focus ring, screen reader utility class, and the rules driven by the
/// classes and variables the preference engine sets on `<html>`.
#[must_use]
pub const fn base_css() -> &'static str {
    concat!(
        ":focus-visible{outline:3px solid #f59e0b;outline-offset:2px}",
        ".sr-only{position:absolute;width:1px;height:1px;margin:-1px;overflow:hidden;clip:rect(0 0 0 0);white-space:nowrap;}",
        ".skip-link{position:absolute;left:-999px;top:0}.skip-link:focus{left:1rem;z-index:100}",
        "html{font-size:calc(var(--font-size-base,16px) * var(--font-scale,1));letter-spacing:var(--letter-spacing,normal);line-height:var(--line-height,1.5)}",
        "body{font-family:var(--font-family-base,system-ui,sans-serif)}",
        "html.high-contrast,html.perfil-visual{filter:contrast(var(--contrast-boost,1.5))}",
        "html.link-highlight a{text-decoration:underline;outline:2px dashed currentColor}",
        "html.custom-colors body{background:var(--custom-bg);color:var(--custom-text)}",
        "button,a,input,select{min-height:var(--target-size-min,auto);margin:var(--spacing-interactive,0)}",
        "main{max-width:var(--content-max-width,none)}",
    )
}

/// Update the live region for screen readers.
pub fn set_status(msg: &str) {
    if let Some(node) =
        crate::dom::document().and_then(|doc| doc.get_element_by_id(STATUS_REGION_ID))
    {
        node.set_text_content(Some(msg));
    }
}

/// Move keyboard focus to the main landmark.
pub fn focus_main_content() {
    use wasm_bindgen::JsCast;

    if let Some(main) = crate::dom::document()
        .and_then(|doc| doc.get_element_by_id(MAIN_CONTENT_ID))
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    {
        let _ = main.focus();
    }
}
