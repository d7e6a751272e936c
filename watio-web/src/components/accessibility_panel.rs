use crate::context::{AccessibilityContext, WebManager, use_accessibility};
use std::str::FromStr;
use watio_access::constants::{FONT_SIZE_MAX, FONT_SIZE_MIN, FONT_SIZE_STEP};
use watio_access::{
    AccessibilityProfile, FontFamily, KeyboardDispatcher, LetterSpacing, LineHeight, Notice,
    Spacing,
};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

const fn letter_spacing_label(value: LetterSpacing) -> &'static str {
    match value {
        LetterSpacing::Normal => "Normal",
        LetterSpacing::Wide => "Amplio",
        LetterSpacing::Wider => "Muy amplio",
    }
}

const fn line_height_label(value: LineHeight) -> &'static str {
    match value {
        LineHeight::Normal => "Normal",
        LineHeight::Relaxed => "Relajado",
        LineHeight::Loose => "Muy espaciado",
    }
}

fn toggle(ctx: &AccessibilityContext, apply: fn(&mut WebManager, bool)) -> Callback<Event> {
    let ctx = ctx.clone();
    Callback::from(move |e: Event| {
        let checked = e.target_unchecked_into::<HtmlInputElement>().checked();
        ctx.update(|engine| apply(engine, checked));
    })
}

/// Select bound to a parsed value; unparseable values are ignored.
fn choice<T: FromStr + 'static>(
    ctx: &AccessibilityContext,
    apply: fn(&AccessibilityContext, T),
) -> Callback<Event> {
    let ctx = ctx.clone();
    Callback::from(move |e: Event| {
        let raw = e.target_unchecked_into::<HtmlSelectElement>().value();
        match raw.parse::<T>() {
            Ok(value) => apply(&ctx, value),
            Err(_) => log::warn!("ignoring unknown option {raw:?}"),
        }
    })
}

fn options<T: Copy + PartialEq>(
    all: &[T],
    selected: T,
    id: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
) -> Html {
    all.iter()
        .map(|&value| {
            html! {
              <option value={id(value)} selected={value == selected}>{ label(value) }</option>
            }
        })
        .collect()
}

fn color_handler(ctx: &AccessibilityContext, background: bool) -> Callback<Event> {
    let ctx = ctx.clone();
    Callback::from(move |e: Event| {
        let value = e.target_unchecked_into::<HtmlInputElement>().value();
        let colors = ctx.snapshot.prefs.custom_colors.clone();
        let (bg, text) = if background {
            (value, colors.text.to_string())
        } else {
            (colors.background.to_string(), value)
        };
        if let Err(err) = ctx.update(|engine| engine.set_custom_colors(&bg, &text)) {
            log::warn!("rejected custom colour: {err}");
            ctx.notify(Notice::error("Color no válido"));
        }
    })
}

/// Every accessibility setting in one form.
#[function_component(AccessibilityPanel)]
pub fn accessibility_panel() -> Html {
    let Some(ctx) = use_accessibility() else {
        return html! {};
    };
    let prefs = &ctx.snapshot.prefs;
    let step = i32::from(FONT_SIZE_STEP);

    let on_profile =
        choice::<AccessibilityProfile>(&ctx, |ctx, profile| ctx.select_profile(profile));
    let on_font_family =
        choice::<FontFamily>(&ctx, |ctx, family| ctx.update(|e| e.set_font_family(family)));
    let on_spacing = choice::<Spacing>(&ctx, |ctx, spacing| ctx.update(|e| e.set_spacing(spacing)));
    let on_letter_spacing = choice::<LetterSpacing>(&ctx, |ctx, value| {
        ctx.update(|e| e.set_letter_spacing(value));
    });
    let on_line_height =
        choice::<LineHeight>(&ctx, |ctx, value| ctx.update(|e| e.set_line_height(value)));

    let on_font_size = {
        let ctx = ctx.clone();
        Callback::from(move |e: InputEvent| {
            let raw = e.target_unchecked_into::<HtmlInputElement>().value();
            if let Ok(px) = raw.parse::<i32>() {
                ctx.update(|engine| engine.set_font_size(px));
            }
        })
    };
    let font_step = |delta: i32| {
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| {
            ctx.update(|engine| engine.adjust_font_size(delta));
        })
    };

    let on_reset = {
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| {
            ctx.update(|engine| engine.reset_preferences());
            ctx.notify(Notice::success("Preferencias restablecidas"));
        })
    };

    let shortcuts = KeyboardDispatcher::default().help_entries(&prefs.custom_shortcuts);

    html! {
      <section class="accessibility-panel" aria-labelledby="a11y-panel-title">
        <h2 id="a11y-panel-title">{"Accesibilidad"}</h2>

        <div class="field">
          <label for="a11y-profile">{"Perfil de accesibilidad"}</label>
          <select id="a11y-profile" onchange={on_profile}>
            { options(&AccessibilityProfile::ALL, ctx.snapshot.profile, AccessibilityProfile::wire_value, AccessibilityProfile::label) }
          </select>
          <p class="hint">{ ctx.snapshot.profile.description() }</p>
          if ctx.can_sync() {
            <p class="hint">{"El perfil se guarda también en tu cuenta."}</p>
          }
        </div>

        <fieldset>
          <legend>{"Texto"}</legend>
          <div class="field">
            <label for="a11y-font-size">{ format!("Tamaño de texto: {}px", prefs.font_size_px) }</label>
            <button class="btn btn-sm" aria-label="Disminuir texto" onclick={font_step(-step)}>{"A-"}</button>
            <input id="a11y-font-size" type="range" min={FONT_SIZE_MIN.to_string()} max={FONT_SIZE_MAX.to_string()}
                   value={prefs.font_size_px.to_string()} oninput={on_font_size} />
            <button class="btn btn-sm" aria-label="Aumentar texto" onclick={font_step(step)}>{"A+"}</button>
          </div>
          <div class="field">
            <label for="a11y-font-family">{"Tipografía"}</label>
            <select id="a11y-font-family" onchange={on_font_family}>
              { options(FontFamily::ALL, prefs.font_family, FontFamily::id, FontFamily::label) }
            </select>
          </div>
          <div class="field">
            <label for="a11y-letter-spacing">{"Espaciado entre letras"}</label>
            <select id="a11y-letter-spacing" onchange={on_letter_spacing}>
              { options(LetterSpacing::ALL, prefs.letter_spacing, LetterSpacing::id, letter_spacing_label) }
            </select>
          </div>
          <div class="field">
            <label for="a11y-line-height">{"Interlineado"}</label>
            <select id="a11y-line-height" onchange={on_line_height}>
              { options(LineHeight::ALL, prefs.line_height, LineHeight::id, line_height_label) }
            </select>
          </div>
          <div class="field">
            <label for="a11y-spacing">{"Espaciado de controles"}</label>
            <select id="a11y-spacing" onchange={on_spacing}>
              { options(Spacing::ALL, prefs.spacing, Spacing::id, Spacing::label) }
            </select>
          </div>
        </fieldset>

        <fieldset>
          <legend>{"Visualización"}</legend>
          <label class="toggle-row">
            <input type="checkbox" checked={prefs.dark_mode} onchange={toggle(&ctx, |e, on| e.set_dark_mode(on))} />
            {"Modo oscuro"}
          </label>
          <label class="toggle-row">
            <input type="checkbox" checked={prefs.high_contrast} onchange={toggle(&ctx, |e, on| e.set_high_contrast(on))} />
            {"Alto contraste"}
          </label>
          <label class="toggle-row">
            <input type="checkbox" checked={prefs.link_highlight} onchange={toggle(&ctx, |e, on| e.set_link_highlight(on))} />
            {"Resaltar enlaces"}
          </label>
          <label class="toggle-row">
            <input type="checkbox" checked={prefs.custom_colors_enabled} onchange={toggle(&ctx, |e, on| e.set_custom_colors_enabled(on))} />
            {"Colores personalizados"}
          </label>
          if prefs.custom_colors_enabled {
            <div class="field">
              <label for="a11y-custom-bg">{"Fondo"}</label>
              <input id="a11y-custom-bg" type="color" value={prefs.custom_colors.background.to_string()} onchange={color_handler(&ctx, true)} />
              <label for="a11y-custom-text">{"Texto"}</label>
              <input id="a11y-custom-text" type="color" value={prefs.custom_colors.text.to_string()} onchange={color_handler(&ctx, false)} />
            </div>
          }
        </fieldset>

        <fieldset>
          <legend>{"Entrada y lectura"}</legend>
          <label class="toggle-row">
            <input type="checkbox" checked={prefs.text_to_speech} onchange={toggle(&ctx, |e, on| e.set_text_to_speech(on))} />
            {"Lectura en voz alta"}
          </label>
          <label class="toggle-row">
            <input type="checkbox" checked={prefs.voice_control_enabled} onchange={toggle(&ctx, |e, on| e.set_voice_control_enabled(on))} />
            {"Control por voz"}
          </label>
          <details>
            <summary>{"Atajos de teclado"}</summary>
            <dl class="shortcut-list">
              { for shortcuts.into_iter().map(|entry| html! {
                  <>
                    <dt><kbd>{ entry.chord }</kbd></dt>
                    <dd>{ entry.description }</dd>
                  </>
              }) }
            </dl>
          </details>
        </fieldset>

        <button class="btn btn-outline" onclick={on_reset}>{"Restablecer preferencias"}</button>
      </section>
    }
}
