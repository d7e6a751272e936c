use super::{Props, SyncConflictDialog};
use futures::executor::block_on;
use watio_access::{AccessibilityProfile, ProfileConflict};
use yew::Callback;
use yew::LocalServerRenderer;

#[test]
fn dialog_renders_nothing_without_conflict() {
    let props = Props {
        conflict: None,
        on_choose: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<SyncConflictDialog>::with_props(props).render());
    assert!(!html.contains("modal-box"));
}

#[test]
fn dialog_names_both_profiles() {
    let props = Props {
        conflict: Some(ProfileConflict {
            local: AccessibilityProfile::Visual,
            account: AccessibilityProfile::Cognitive,
        }),
        on_choose: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<SyncConflictDialog>::with_props(props).render());
    assert!(html.contains("Preferencia local detectada"));
    assert!(html.contains(AccessibilityProfile::Visual.label()));
    assert!(html.contains(AccessibilityProfile::Cognitive.label()));
    assert!(html.contains("Usar local"));
    assert!(html.contains("Usar de la cuenta"));
    assert!(html.contains("aria-modal=\"true\""));
}
