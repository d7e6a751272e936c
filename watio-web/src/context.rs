//! Yew context around the preference engine.
//!
//! The engine lives in an `Rc<RefCell<_>>` shared by every consumer. Render
//! state is a [`Snapshot`] copied out after each change, so components never
//! hold a borrow while rendering. Account requests fetch first and borrow the
//! engine only to apply the result.
use crate::browser::{BrowserSpeech, DocumentSurface, WebStore};
use crate::dom;
use crate::supabase::{SupabaseProfileStore, stored_session};
use std::cell::RefCell;
use std::rc::Rc;
use watio_access::remote::{fetch_account_profile, push_account_profile};
use watio_access::{
    AccessibilityManager, AccessibilityProfile, Action, ConflictChoice, Navigator, Notice,
    PreferenceSet, PreferenceStore, ProfileConflict, Reconciliation, RemoteProfileStore, Session,
    SpeechOutput, StyleSurface, execute_action,
};
use yew::prelude::*;

pub type WebManager = AccessibilityManager<WebStore, DocumentSurface, BrowserSpeech>;
type SharedEngine<S, D, T> = Rc<RefCell<AccessibilityManager<S, D, T>>>;

/// How long a toast stays up, in milliseconds.
pub const NOTICE_TIMEOUT_MS: i32 = 3_000;
pub const STICKY_NOTICE_TIMEOUT_MS: i32 = 10_000;
const MAX_NOTICES: usize = 4;

/// Render copy of the engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub profile: AccessibilityProfile,
    pub prefs: PreferenceSet,
    pub voice_active: bool,
    /// Account of the current session, if any.
    pub account_id: Option<String>,
}

impl Snapshot {
    pub fn of<S, D, T>(manager: &AccessibilityManager<S, D, T>) -> Self
    where
        S: PreferenceStore,
        D: StyleSurface,
        T: SpeechOutput,
    {
        Self {
            profile: manager.profile(),
            prefs: manager.preferences().clone(),
            voice_active: manager.voice_active(),
            account_id: manager.session().map(|session| session.account_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeQueue {
    pub items: Vec<(u32, Notice)>,
}

pub enum NoticeAction {
    Push(u32, Notice),
    Dismiss(u32),
}

impl Reducible for NoticeQueue {
    type Action = NoticeAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut items = self.items.clone();
        match action {
            NoticeAction::Push(id, notice) => {
                items.push((id, notice));
                if items.len() > MAX_NOTICES {
                    items.remove(0);
                }
            }
            NoticeAction::Dismiss(id) => items.retain(|(existing, _)| *existing != id),
        }
        Rc::new(Self { items })
    }
}

#[must_use]
pub const fn notice_timeout(notice: &Notice) -> i32 {
    if notice.sticky {
        STICKY_NOTICE_TIMEOUT_MS
    } else {
        NOTICE_TIMEOUT_MS
    }
}

/// Read the account profile, then borrow the engine only to adopt it.
async fn adopt_from_account<S, D, T, R>(
    engine: &SharedEngine<S, D, T>,
    remote: &R,
    session: Option<&Session>,
) -> Option<AccessibilityProfile>
where
    S: PreferenceStore,
    D: StyleSurface,
    T: SpeechOutput,
    R: RemoteProfileStore + ?Sized,
{
    let account = fetch_account_profile(remote, session).await?;
    engine.borrow_mut().adopt_account_profile(account);
    Some(account)
}

/// Compare the account profile of the engine's session with the local one.
async fn reconcile_session<S, D, T, R>(
    engine: &SharedEngine<S, D, T>,
    remote: &R,
) -> Reconciliation
where
    S: PreferenceStore,
    D: StyleSurface,
    T: SpeechOutput,
    R: RemoteProfileStore + ?Sized,
{
    let session = engine.borrow().session().cloned();
    let fetched = fetch_account_profile(remote, session.as_ref()).await;
    engine.borrow_mut().reconcile_fetched(fetched)
}

fn report_reconciliation(
    outcome: Reconciliation,
    set_conflict: &Callback<Option<ProfileConflict>>,
    notify: &Callback<Notice>,
) {
    match outcome {
        Reconciliation::Conflict(found) => set_conflict.emit(Some(found)),
        Reconciliation::Adopted(profile) if !profile.is_none() => {
            notify.emit(Notice::info(format!(
                "Perfil de tu cuenta aplicado: {}",
                profile.label()
            )));
        }
        _ => {}
    }
}

/// Engine handle shared through the Yew context.
///
/// The type parameters default to the browser adapters; other adapters are
/// only used off the browser.
pub struct AccessibilityContext<
    S = WebStore,
    D = DocumentSurface,
    T = BrowserSpeech,
    R = SupabaseProfileStore,
> {
    engine: SharedEngine<S, D, T>,
    remote: Option<Rc<R>>,
    pub snapshot: Snapshot,
    pub conflict: Option<ProfileConflict>,
    pub notices: NoticeQueue,
    refresh: Callback<()>,
    notify: Callback<Notice>,
    dismiss: Callback<u32>,
    set_conflict: Callback<Option<ProfileConflict>>,
}

impl<S, D, T, R> Clone for AccessibilityContext<S, D, T, R> {
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            remote: self.remote.clone(),
            snapshot: self.snapshot.clone(),
            conflict: self.conflict,
            notices: self.notices.clone(),
            refresh: self.refresh.clone(),
            notify: self.notify.clone(),
            dismiss: self.dismiss.clone(),
            set_conflict: self.set_conflict.clone(),
        }
    }
}

impl<S, D, T, R> PartialEq for AccessibilityContext<S, D, T, R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine)
            && self.snapshot == other.snapshot
            && self.conflict == other.conflict
            && self.notices == other.notices
    }
}

impl<S, D, T, R> AccessibilityContext<S, D, T, R>
where
    S: PreferenceStore + 'static,
    D: StyleSurface + 'static,
    T: SpeechOutput + 'static,
    R: RemoteProfileStore + 'static,
{
    /// Run a change against the engine and re-render consumers.
    pub fn update<O>(&self, change: impl FnOnce(&mut AccessibilityManager<S, D, T>) -> O) -> O {
        let result = change(&mut self.engine.borrow_mut());
        self.refresh.emit(());
        result
    }

    pub fn notify(&self, notice: Notice) {
        self.notify.emit(notice);
    }

    pub fn dismiss(&self, id: u32) {
        self.dismiss.emit(id);
    }

    #[must_use]
    pub const fn can_sync(&self) -> bool {
        self.remote.is_some() && self.snapshot.account_id.is_some()
    }

    /// Hand over the session established by the auth layer.
    pub fn set_session(&self, session: Option<Session>) {
        self.update(|engine| engine.set_session(session));
    }

    /// Apply a profile here, then mirror it to the account in the background.
    pub fn select_profile(&self, profile: AccessibilityProfile) {
        self.update(|engine| engine.apply_profile(profile));
        let session = self.engine.borrow().session().cloned();
        let (Some(remote), Some(session)) = (self.remote.clone(), session) else {
            return;
        };
        let notify = self.notify.clone();
        dom::spawn(async move {
            if push_account_profile(&*remote, Some(&session), profile)
                .await
                .is_err()
            {
                notify.emit(Notice::error("No se pudo guardar el perfil en tu cuenta"));
            }
        });
    }

    /// Settle the pending conflict with the user's choice.
    pub fn resolve_conflict(&self, choice: ConflictChoice) {
        let Some(conflict) = self.conflict else {
            return;
        };
        self.set_conflict.emit(None);
        match choice {
            ConflictChoice::KeepLocal => {
                self.update(|engine| engine.apply_profile(conflict.local));
            }
            ConflictChoice::UseAccount => {
                let session = self.engine.borrow().session().cloned();
                let Some(remote) = self.remote.clone() else {
                    return;
                };
                let engine = Rc::clone(&self.engine);
                let refresh = self.refresh.clone();
                dom::spawn(async move {
                    if adopt_from_account(&engine, &*remote, session.as_ref())
                        .await
                        .is_some()
                    {
                        refresh.emit(());
                    }
                });
            }
        }
    }

    /// Run a command action and return the feedback to show.
    ///
    /// `help` must not touch the engine; it runs while the engine is borrowed.
    pub fn execute(
        &self,
        action: Action,
        navigator: &mut dyn Navigator,
        help: impl FnOnce() -> String,
    ) -> Notice {
        let notice = {
            let mut engine = self.engine.borrow_mut();
            execute_action(action, &mut *engine, navigator, help)
        };
        self.refresh.emit(());
        notice
    }

    /// Record whether recognition is live; only the document class changes.
    pub fn set_voice_active(&self, active: bool) {
        self.update(|engine| engine.set_voice_active(active));
    }
}

fn load_engine() -> WebManager {
    WebManager::load(
        WebStore::open(),
        DocumentSurface::from_document(),
        BrowserSpeech::from_window(),
        dom::prefers_dark_scheme(),
    )
}

#[derive(Properties, PartialEq)]
pub struct AccessibilityProviderProps {
    #[prop_or_default]
    pub children: Children,
}

#[function_component(AccessibilityProvider)]
pub fn accessibility_provider(props: &AccessibilityProviderProps) -> Html {
    let engine = use_mut_ref(load_engine);
    let remote = use_state(|| SupabaseProfileStore::from_env().map(Rc::new));
    let snapshot = {
        let engine = engine.clone();
        use_state(move || Snapshot::of(&*engine.borrow()))
    };
    let conflict = use_state(|| None::<ProfileConflict>);
    let notices = use_reducer(NoticeQueue::default);
    let next_notice = use_mut_ref(|| 0_u32);

    let refresh = {
        let engine = engine.clone();
        let snapshot = snapshot.clone();
        Callback::from(move |()| {
            if let Ok(engine) = engine.try_borrow() {
                snapshot.set(Snapshot::of(&*engine));
            }
        })
    };

    let notify = {
        let engine = engine.clone();
        let dispatcher = notices.dispatcher();
        Callback::from(move |notice: Notice| {
            let id = {
                let mut next = next_notice.borrow_mut();
                *next = next.wrapping_add(1);
                *next
            };
            crate::a11y::set_status(&notice.message);
            if let Ok(engine) = engine.try_borrow() {
                engine.speak(&notice.message);
            }
            let timeout = notice_timeout(&notice);
            dispatcher.dispatch(NoticeAction::Push(id, notice));
            let dispatcher = dispatcher.clone();
            dom::spawn(async move {
                let _ = dom::sleep_ms(timeout).await;
                dispatcher.dispatch(NoticeAction::Dismiss(id));
            });
        })
    };

    let dismiss = {
        let dispatcher = notices.dispatcher();
        Callback::from(move |id: u32| dispatcher.dispatch(NoticeAction::Dismiss(id)))
    };

    let set_conflict = {
        let conflict = conflict.clone();
        Callback::from(move |next: Option<ProfileConflict>| conflict.set(next))
    };

    {
        let engine = engine.clone();
        let remote = (*remote).clone();
        let refresh = refresh.clone();
        use_effect_with((), move |()| {
            if let Some(remote) = remote {
                let session = stored_session(remote.config(), engine.borrow().store());
                engine.borrow_mut().set_session(session);
                refresh.emit(());
            }
            || ()
        });
    }

    {
        let engine = engine.clone();
        let remote = (*remote).clone();
        let refresh = refresh.clone();
        let notify = notify.clone();
        let set_conflict = set_conflict.clone();
        use_effect_with(snapshot.account_id.clone(), move |account_id| {
            if let (Some(remote), Some(_)) = (remote, account_id) {
                dom::spawn(async move {
                    let outcome = reconcile_session(&engine, &*remote).await;
                    report_reconciliation(outcome, &set_conflict, &notify);
                    refresh.emit(());
                });
            }
            || ()
        });
    }

    let context = AccessibilityContext {
        engine,
        remote: (*remote).clone(),
        snapshot: (*snapshot).clone(),
        conflict: *conflict,
        notices: (*notices).clone(),
        refresh,
        notify,
        dismiss,
        set_conflict,
    };

    html! {
        <ContextProvider<AccessibilityContext> context={context}>
            { props.children.clone() }
        </ContextProvider<AccessibilityContext>>
    }
}

/// The shared accessibility context, when rendered under the provider.
#[hook]
pub fn use_accessibility() -> Option<AccessibilityContext> {
    use_context::<AccessibilityContext>()
}
