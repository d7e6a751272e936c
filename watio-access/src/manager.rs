//! The accessibility state manager.
//!
//! Owns the active profile and every fine-grained preference, keeps the
//! style surface in step with them and persists each change locally. Only the
//! coarse profile is ever mirrored to the account.
use crate::commands::CommandTarget;
use crate::constants::clamp_font_size;
use crate::keyboard::normalize_shortcuts;
use crate::prefs::{
    ColorError, ColorValue, CustomColors, FontFamily, LetterSpacing, LineHeight, PreferenceSet,
    ShortcutMap, Spacing,
};
use crate::profile::AccessibilityProfile;
use crate::remote::{
    ConflictChoice, ProfileConflict, Reconciliation, RemoteProfileStore, Session, SyncError,
    fetch_account_profile, push_account_profile, reconcile,
};
use crate::speech::SpeechOutput;
use crate::storage::{
    PrefField, PreferenceStore, load_preferences, persist_field, persist_profile, stored_profile,
};
use crate::style::{StyleModel, StyleSurface, apply_ops};

pub struct AccessibilityManager<S, D, T> {
    store: S,
    surface: D,
    speech: T,
    profile: AccessibilityProfile,
    prefs: PreferenceSet,
    prefers_dark: bool,
    voice_active: bool,
    session: Option<Session>,
    applied: StyleModel,
}

impl<S, D, T> AccessibilityManager<S, D, T>
where
    S: PreferenceStore,
    D: StyleSurface,
    T: SpeechOutput,
{
    /// Read every stored setting and paint the surface once.
    ///
    /// `prefers_dark` is the OS colour-scheme hint.
    pub fn load(store: S, surface: D, speech: T, prefers_dark: bool) -> Self {
        let profile = stored_profile(&store).unwrap_or_default();
        let prefs = load_preferences(&store, prefers_dark);
        let applied = StyleModel::derive(profile, &prefs, false);
        apply_ops(&surface, &applied.full_ops());
        log::debug!("loaded accessibility state: profile {profile}");
        Self {
            store,
            surface,
            speech,
            profile,
            prefs,
            prefers_dark,
            voice_active: false,
            session: None,
            applied,
        }
    }

    #[must_use]
    pub const fn profile(&self) -> AccessibilityProfile {
        self.profile
    }

    #[must_use]
    pub const fn preferences(&self) -> &PreferenceSet {
        &self.prefs
    }

    #[must_use]
    pub const fn style_model(&self) -> &StyleModel {
        &self.applied
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn voice_active(&self) -> bool {
        self.voice_active
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn surface(&self) -> &D {
        &self.surface
    }

    pub const fn speech(&self) -> &T {
        &self.speech
    }

    /// Attach or drop the authenticated account.
    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    fn restyle(&mut self) {
        let next = StyleModel::derive(self.profile, &self.prefs, self.voice_active);
        let ops = self.applied.diff(&next);
        if !ops.is_empty() {
            apply_ops(&self.surface, &ops);
        }
        self.applied = next;
    }

    fn update(&mut self, field: PrefField, change: impl FnOnce(&mut PreferenceSet)) {
        change(&mut self.prefs);
        self.restyle();
        persist_field(&self.store, &self.prefs, field);
    }

    /// Switch the coarse profile on this device only.
    pub fn apply_profile(&mut self, profile: AccessibilityProfile) {
        self.profile = profile;
        self.restyle();
        persist_profile(&self.store, profile);
    }

    /// Apply a profile the user picked and mirror it to the account.
    ///
    /// Without a session the change stays local and this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] when the account write fails; the local
    /// change is kept.
    pub async fn select_profile<R: RemoteProfileStore + ?Sized>(
        &mut self,
        remote: &R,
        profile: AccessibilityProfile,
    ) -> Result<(), SyncError> {
        self.apply_profile(profile);
        if self.session.is_none() {
            return Ok(());
        }
        push_account_profile(remote, self.session.as_ref(), profile).await
    }

    /// Read the account profile, optionally applying it here.
    pub async fn sync_profile_from_account<R: RemoteProfileStore + ?Sized>(
        &mut self,
        remote: &R,
        force_apply: bool,
    ) -> Option<AccessibilityProfile> {
        let account = fetch_account_profile(remote, self.session.as_ref()).await?;
        if force_apply {
            self.adopt_account_profile(account);
        }
        Some(account)
    }

    /// Apply a profile already fetched from the account.
    pub fn adopt_account_profile(&mut self, account: AccessibilityProfile) {
        self.apply_profile(account);
    }

    /// Compare device and account after sign-in.
    pub async fn reconcile_with_account<R: RemoteProfileStore + ?Sized>(
        &mut self,
        remote: &R,
    ) -> Reconciliation {
        if self.session.is_none() {
            return Reconciliation::NoSession;
        }
        let account = fetch_account_profile(remote, self.session.as_ref()).await;
        self.reconcile_fetched(account)
    }

    /// Second half of [`Self::reconcile_with_account`], for callers that
    /// fetch on their own.
    pub fn reconcile_fetched(&mut self, account: Option<AccessibilityProfile>) -> Reconciliation {
        if self.session.is_none() {
            return Reconciliation::NoSession;
        }
        let Some(account) = account else {
            return Reconciliation::Unavailable;
        };
        let outcome = reconcile(stored_profile(&self.store), account);
        if let Reconciliation::Adopted(profile) = outcome {
            self.adopt_account_profile(profile);
        }
        log::debug!("profile reconciliation: {outcome:?}");
        outcome
    }

    /// Settle a conflict. Keeping the local value never writes the account.
    pub async fn resolve_conflict<R: RemoteProfileStore + ?Sized>(
        &mut self,
        remote: &R,
        conflict: ProfileConflict,
        choice: ConflictChoice,
    ) -> Option<AccessibilityProfile> {
        match choice {
            ConflictChoice::KeepLocal => {
                self.apply_profile(conflict.local);
                Some(conflict.local)
            }
            ConflictChoice::UseAccount => self.sync_profile_from_account(remote, true).await,
        }
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.update(PrefField::DarkMode, |prefs| prefs.dark_mode = enabled);
    }

    /// Flip the theme and return the new value.
    pub fn toggle_dark(&mut self) -> bool {
        let next = !self.prefs.dark_mode;
        self.set_dark_mode(next);
        next
    }

    /// Store a clamped font size and return it.
    pub fn set_font_size(&mut self, requested: i32) -> u8 {
        let size = clamp_font_size(requested);
        self.update(PrefField::FontSize, |prefs| prefs.font_size_px = size);
        size
    }

    pub fn adjust_font_size(&mut self, delta: i32) -> u8 {
        self.set_font_size(i32::from(self.prefs.font_size_px) + delta)
    }

    pub fn set_font_family(&mut self, family: FontFamily) {
        self.update(PrefField::FontFamily, |prefs| prefs.font_family = family);
    }

    pub fn set_high_contrast(&mut self, enabled: bool) {
        self.update(PrefField::HighContrast, |prefs| prefs.high_contrast = enabled);
    }

    /// Turning read-aloud off also silences anything in flight.
    pub fn set_text_to_speech(&mut self, enabled: bool) {
        self.update(PrefField::TextToSpeech, |prefs| prefs.text_to_speech = enabled);
        if !enabled {
            self.speech.cancel();
        }
    }

    pub fn set_link_highlight(&mut self, enabled: bool) {
        self.update(PrefField::LinkHighlight, |prefs| prefs.link_highlight = enabled);
    }

    pub fn set_spacing(&mut self, spacing: Spacing) {
        self.update(PrefField::Spacing, |prefs| prefs.spacing = spacing);
    }

    pub fn set_letter_spacing(&mut self, letter_spacing: LetterSpacing) {
        self.update(PrefField::LetterSpacing, |prefs| {
            prefs.letter_spacing = letter_spacing;
        });
    }

    pub fn set_line_height(&mut self, line_height: LineHeight) {
        self.update(PrefField::LineHeight, |prefs| prefs.line_height = line_height);
    }

    /// # Errors
    ///
    /// Returns an error, leaving state untouched, if either colour is not a
    /// hex colour.
    pub fn set_custom_colors(&mut self, background: &str, text: &str) -> Result<(), ColorError> {
        let colors = CustomColors {
            background: ColorValue::parse(background)?,
            text: ColorValue::parse(text)?,
        };
        self.update(PrefField::CustomColors, |prefs| prefs.custom_colors = colors);
        Ok(())
    }

    pub fn set_custom_colors_enabled(&mut self, enabled: bool) {
        self.update(PrefField::CustomColorsEnabled, |prefs| {
            prefs.custom_colors_enabled = enabled;
        });
    }

    pub fn set_custom_shortcuts(&mut self, shortcuts: &ShortcutMap) {
        let shortcuts = normalize_shortcuts(shortcuts);
        self.update(PrefField::CustomShortcuts, |prefs| prefs.custom_shortcuts = shortcuts);
    }

    pub fn set_voice_control_enabled(&mut self, enabled: bool) {
        self.update(PrefField::VoiceControl, |prefs| {
            prefs.voice_control_enabled = enabled;
        });
    }

    /// Marker set by the voice interpreter while it listens. Not persisted.
    pub fn set_voice_active(&mut self, active: bool) {
        self.voice_active = active;
        self.restyle();
    }

    /// Restore every fine-grained default; the profile is kept.
    pub fn reset_preferences(&mut self) {
        self.prefs = PreferenceSet::with_dark_mode(self.prefers_dark);
        self.restyle();
        self.speech.cancel();
        for field in PrefField::ALL {
            persist_field(&self.store, &self.prefs, field);
        }
    }

    /// Read `text` aloud when text-to-speech is on, replacing any utterance
    /// in progress. Returns whether anything was spoken.
    pub fn speak(&self, text: &str) -> bool {
        if !self.prefs.text_to_speech || text.trim().is_empty() {
            return false;
        }
        if self.speech.is_speaking() {
            self.speech.cancel();
        }
        self.speech.speak(text);
        true
    }
}

impl<S, D, T> CommandTarget for AccessibilityManager<S, D, T>
where
    S: PreferenceStore,
    D: StyleSurface,
    T: SpeechOutput,
{
    fn toggle_dark(&mut self) -> bool {
        Self::toggle_dark(self)
    }

    fn font_size(&self) -> u8 {
        self.prefs.font_size_px
    }

    fn set_font_size(&mut self, requested: i32) -> u8 {
        Self::set_font_size(self, requested)
    }

    fn high_contrast(&self) -> bool {
        self.prefs.high_contrast
    }

    fn set_high_contrast(&mut self, enabled: bool) {
        Self::set_high_contrast(self, enabled);
    }

    fn link_highlight(&self) -> bool {
        self.prefs.link_highlight
    }

    fn set_link_highlight(&mut self, enabled: bool) {
        Self::set_link_highlight(self, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEY_CUSTOM_COLORS, KEY_FONT_SIZE, KEY_PROFILE, KEY_THEME};
    use crate::memory::{MemoryRemote, MemorySpeech, MemoryStore, MemorySurface};
    use crate::style::{CLASS_DARK, PROFILE_SCOPED_VARIABLES, VAR_FONT_SIZE_BASE};
    use futures::executor::block_on;

    type Manager = AccessibilityManager<MemoryStore, MemorySurface, MemorySpeech>;

    fn fresh(prefers_dark: bool) -> (Manager, MemoryStore, MemorySurface, MemorySpeech) {
        let store = MemoryStore::default();
        let surface = MemorySurface::default();
        let speech = MemorySpeech::default();
        let manager = AccessibilityManager::load(
            store.clone(),
            surface.clone(),
            speech.clone(),
            prefers_dark,
        );
        (manager, store, surface, speech)
    }

    #[test]
    fn load_paints_the_surface() {
        let (manager, _, surface, _) = fresh(true);
        assert_eq!(manager.profile(), AccessibilityProfile::None);
        assert!(surface.has_class(CLASS_DARK));
        assert_eq!(surface.property(VAR_FONT_SIZE_BASE).as_deref(), Some("16px"));
    }

    #[test]
    fn setters_update_memory_surface_and_store() {
        let (mut manager, store, surface, _) = fresh(false);
        assert_eq!(manager.set_font_size(30), 24);
        assert_eq!(surface.property(VAR_FONT_SIZE_BASE).as_deref(), Some("24px"));
        assert_eq!(store.value(KEY_FONT_SIZE).as_deref(), Some("24"));
        assert!(manager.toggle_dark());
        assert_eq!(store.value(KEY_THEME).as_deref(), Some("dark"));
        assert_eq!(manager.adjust_font_size(-20), 12);
    }

    #[test]
    fn repeated_setter_is_idempotent() {
        let (mut manager, store, surface, _) = fresh(false);
        manager.set_high_contrast(true);
        let mutations = surface.mutations();
        let snapshot = store.snapshot();
        manager.set_high_contrast(true);
        assert_eq!(surface.mutations(), mutations);
        assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn profile_overlay_is_removed_on_none() {
        let (mut manager, store, surface, _) = fresh(false);
        manager.apply_profile(AccessibilityProfile::Motor);
        assert!(surface.has_class("perfil-motriz"));
        assert_eq!(store.value(KEY_PROFILE).as_deref(), Some("motriz"));
        manager.apply_profile(AccessibilityProfile::None);
        for var in PROFILE_SCOPED_VARIABLES {
            assert_eq!(surface.property(var), None, "{var} left behind");
        }
        assert!(!surface.classes().iter().any(|c| c.starts_with("perfil-")));
    }

    #[test]
    fn invalid_colours_are_rejected() {
        let (mut manager, store, _, _) = fresh(false);
        assert!(manager.set_custom_colors("#zzz", "#000").is_err());
        assert_eq!(store.value(KEY_CUSTOM_COLORS), None);
        manager.set_custom_colors("#FFF", "#112233").unwrap();
        assert_eq!(manager.preferences().custom_colors.background.as_str(), "#fff");
    }

    #[test]
    fn disabling_speech_cancels_queue() {
        let (mut manager, _, _, speech) = fresh(false);
        assert!(!manager.speak("hola"));
        manager.set_text_to_speech(true);
        assert!(manager.speak("hola"));
        assert!(manager.speak("adiós"));
        assert_eq!(speech.pending(), vec!["adiós".to_string()]);
        manager.set_text_to_speech(false);
        assert!(speech.pending().is_empty());
        assert!(!speech.is_speaking());
    }

    #[test]
    fn reset_restores_defaults_but_keeps_profile() {
        let (mut manager, store, _, _) = fresh(true);
        manager.apply_profile(AccessibilityProfile::Visual);
        manager.set_dark_mode(false);
        manager.set_spacing(Spacing::Wide);
        manager.reset_preferences();
        assert_eq!(manager.preferences(), &PreferenceSet::with_dark_mode(true));
        assert_eq!(manager.profile(), AccessibilityProfile::Visual);
        assert_eq!(store.value(KEY_THEME).as_deref(), Some("dark"));
    }

    #[test]
    fn select_profile_writes_remote_only_with_session() {
        let (mut manager, _, _, _) = fresh(false);
        let remote = MemoryRemote::default();
        block_on(manager.select_profile(&remote, AccessibilityProfile::Visual)).unwrap();
        assert_eq!(remote.updates(), 0);

        manager.set_session(Some(Session::new("acct-9", "token")));
        block_on(manager.select_profile(&remote, AccessibilityProfile::Auditory)).unwrap();
        assert_eq!(remote.row("acct-9"), Some(AccessibilityProfile::Auditory));

        remote.fail_requests(true);
        let err = block_on(manager.select_profile(&remote, AccessibilityProfile::Motor));
        assert!(matches!(err, Err(SyncError::Remote(_))));
        assert_eq!(manager.profile(), AccessibilityProfile::Motor);
    }

    #[test]
    fn sync_without_session_changes_nothing() {
        let (mut manager, store, _, _) = fresh(false);
        let remote = MemoryRemote::default();
        assert_eq!(block_on(manager.sync_profile_from_account(&remote, true)), None);
        assert_eq!(store.value(KEY_PROFILE), None);
    }

    #[test]
    fn reconcile_adopts_when_nothing_local() {
        let (mut manager, store, _, _) = fresh(false);
        let remote = MemoryRemote::default();
        remote.set_row("acct-1", Some(AccessibilityProfile::Cognitive));
        assert_eq!(block_on(manager.reconcile_with_account(&remote)), Reconciliation::NoSession);
        manager.set_session(Some(Session::new("acct-1", "token")));
        assert_eq!(
            block_on(manager.reconcile_with_account(&remote)),
            Reconciliation::Adopted(AccessibilityProfile::Cognitive)
        );
        assert_eq!(store.value(KEY_PROFILE).as_deref(), Some("cognitiva"));
        remote.fail_requests(true);
        assert_eq!(block_on(manager.reconcile_with_account(&remote)), Reconciliation::Unavailable);
    }
}
