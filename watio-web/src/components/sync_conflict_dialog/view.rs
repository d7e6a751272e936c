use super::focus::{keydown_handler, use_focus_management};
use watio_access::{ConflictChoice, ProfileConflict};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub conflict: Option<ProfileConflict>,
    pub on_choose: Callback<ConflictChoice>,
}

#[function_component(SyncConflictDialog)]
pub fn sync_conflict_dialog(p: &Props) -> Html {
    let ref_node = use_node_ref();
    use_focus_management(p.conflict.is_some(), ref_node.clone());

    let Some(conflict) = p.conflict else {
        return html! {};
    };

    let choose = |choice: ConflictChoice| {
        let cb = p.on_choose.clone();
        Callback::from(move |_: MouseEvent| cb.emit(choice))
    };
    let on_keydown = {
        let cb = p.on_choose.clone();
        keydown_handler(
            ref_node.clone(),
            Callback::from(move |()| cb.emit(ConflictChoice::KeepLocal)),
        )
    };

    html! {
      <div class="modal" role="dialog" aria-modal="true" aria-labelledby="sync-conflict-title"
           aria-describedby="sync-conflict-body" ref={ref_node} onkeydown={on_keydown}>
        <div class="modal-box">
          <h2 id="sync-conflict-title">{"Preferencia local detectada"}</h2>
          <p id="sync-conflict-body">
            { format!(
                "Este dispositivo usa el perfil \"{}\" y tu cuenta tiene guardado \"{}\". ¿Cuál quieres usar?",
                conflict.local.label(),
                conflict.account.label()
            ) }
          </p>
          <div class="modal-action">
            <button class="btn" data-choice="local" onclick={choose(ConflictChoice::KeepLocal)}>
              {"Usar local"}
            </button>
            <button class="btn btn-primary" data-choice="account" onclick={choose(ConflictChoice::UseAccount)}>
              {"Usar de la cuenta"}
            </button>
          </div>
        </div>
      </div>
    }
}
