//! Browser input hooks: keyboard shortcuts and voice control.
mod keyboard;
mod navigator;
mod voice;

pub use keyboard::{handle_chord, use_keyboard_shortcuts};
pub use navigator::RouterNavigator;
pub use voice::{apply_voice_outcome, use_voice_control};

use crate::context::{AccessibilityContext, use_accessibility};
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;
use yew_router::prelude::*;

/// Most recent context and router handle, refreshed on every render.
///
/// Browser callbacks outlive a single render; they read this slot instead of
/// capturing a stale context.
pub type LatestContext = Rc<RefCell<Option<(AccessibilityContext, Option<Navigator>)>>>;

#[hook]
fn use_latest_context() -> LatestContext {
    let ctx = use_accessibility();
    let navigator = use_navigator();
    let latest = use_mut_ref(|| None);
    *latest.borrow_mut() = ctx.map(|ctx| (ctx, navigator));
    latest
}

/// Copy out of the slot so no borrow is held while commands run.
fn current(latest: &LatestContext) -> Option<(AccessibilityContext, Option<Navigator>)> {
    latest.try_borrow().ok().and_then(|slot| slot.clone())
}
