use watio_access::{Notice, NoticeLevel};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub notices: Vec<(u32, Notice)>,
    #[prop_or_default]
    pub on_dismiss: Callback<u32>,
}

const fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "alert alert-info",
        NoticeLevel::Success => "alert alert-success",
        NoticeLevel::Error => "alert alert-error",
    }
}

/// Toast stack for command feedback.
#[function_component(NoticeBoard)]
pub fn notice_board(p: &Props) -> Html {
    if p.notices.is_empty() {
        return html! {};
    }
    html! {
      <div class="toast toast-end" aria-live="polite">
        { for p.notices.iter().map(|(id, notice)| {
            let id = *id;
            let on_dismiss = p.on_dismiss.clone();
            let dismiss = Callback::from(move |_: MouseEvent| on_dismiss.emit(id));
            let role = if notice.level == NoticeLevel::Error { "alert" } else { "status" };
            html! {
              <div key={id} class={level_class(notice.level)} role={role}>
                <span class="notice-text">{ notice.message.clone() }</span>
                <button class="btn btn-ghost btn-xs" aria-label="Cerrar aviso" onclick={dismiss}>{"×"}</button>
              </div>
            }
        }) }
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn empty_board_renders_nothing() {
        let props = Props {
            notices: Vec::new(),
            on_dismiss: Callback::noop(),
        };
        let html = block_on(LocalServerRenderer::<NoticeBoard>::with_props(props).render());
        assert!(!html.contains("toast"));
    }

    #[test]
    fn errors_are_announced_as_alerts() {
        let props = Props {
            notices: vec![
                (1, Notice::success("Tema cambiado")),
                (2, Notice::error("Permiso de micrófono denegado")),
            ],
            on_dismiss: Callback::noop(),
        };
        let html = block_on(LocalServerRenderer::<NoticeBoard>::with_props(props).render());
        assert!(html.contains("Tema cambiado"));
        assert!(html.contains("alert-success"));
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("Permiso de micrófono denegado"));
    }
}
