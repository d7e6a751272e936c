//! In-memory adapters for every host seam.
//!
//! Cloning any of these shares the underlying state, so a test can hand one
//! clone to the engine and keep another for inspection.
use crate::commands::{Destination, Navigator};
use crate::profile::AccessibilityProfile;
use crate::remote::{RemoteProfileStore, Session};
use crate::speech::SpeechOutput;
use crate::storage::PreferenceStore;
use crate::style::StyleSurface;
use crate::voice::{RecognitionConfig, RecognitionError, SpeechRecognizer};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    failing: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    /// A store whose every read and write fails, like private browsing
    /// with storage disabled.
    #[must_use]
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    /// Successful writes and removals so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.get() {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl PreferenceStore for MemoryStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Records classes and custom properties like a document root element.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    classes: Rc<RefCell<BTreeSet<String>>>,
    properties: Rc<RefCell<BTreeMap<String, String>>>,
    mutations: Rc<Cell<usize>>,
}

impl MemorySurface {
    #[must_use]
    pub fn classes(&self) -> BTreeSet<String> {
        self.classes.borrow().clone()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.properties.borrow().clone()
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    /// Number of calls received, changed or not.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.mutations.get()
    }

    fn bump(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl StyleSurface for MemorySurface {
    fn set_property(&self, name: &str, value: &str) {
        self.bump();
        self.properties
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_property(&self, name: &str) {
        self.bump();
        self.properties.borrow_mut().remove(name);
    }

    fn add_class(&self, class: &str) {
        self.bump();
        self.classes.borrow_mut().insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.bump();
        self.classes.borrow_mut().remove(class);
    }
}

/// Queues utterances until cancelled.
#[derive(Debug, Clone, Default)]
pub struct MemorySpeech {
    queue: Rc<RefCell<Vec<String>>>,
    spoken: Rc<RefCell<Vec<String>>>,
    cancels: Rc<Cell<usize>>,
}

impl MemorySpeech {
    #[must_use]
    pub fn pending(&self) -> Vec<String> {
        self.queue.borrow().clone()
    }

    /// Everything ever handed to `speak`.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.borrow().clone()
    }

    #[must_use]
    pub fn cancels(&self) -> usize {
        self.cancels.get()
    }
}

impl SpeechOutput for MemorySpeech {
    fn speak(&self, text: &str) {
        self.queue.borrow_mut().push(text.to_string());
        self.spoken.borrow_mut().push(text.to_string());
    }

    fn cancel(&self) {
        self.cancels.set(self.cancels.get() + 1);
        self.queue.borrow_mut().clear();
    }

    fn is_speaking(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryRemoteError {
    #[error("remote profile store is offline")]
    Offline,
}

/// Profile rows keyed by account id. Missing rows read as a null column.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    rows: Rc<RefCell<BTreeMap<String, Option<AccessibilityProfile>>>>,
    failing: Rc<Cell<bool>>,
    updates: Rc<Cell<usize>>,
}

impl MemoryRemote {
    pub fn set_row(&self, account_id: &str, profile: Option<AccessibilityProfile>) {
        self.rows
            .borrow_mut()
            .insert(account_id.to_string(), profile);
    }

    #[must_use]
    pub fn row(&self, account_id: &str) -> Option<AccessibilityProfile> {
        self.rows.borrow().get(account_id).copied().flatten()
    }

    pub fn fail_requests(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Successful updates so far.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates.get()
    }
}

#[async_trait(?Send)]
impl RemoteProfileStore for MemoryRemote {
    type Error = MemoryRemoteError;

    async fn select_profile(
        &self,
        session: &Session,
    ) -> Result<Option<AccessibilityProfile>, MemoryRemoteError> {
        if self.failing.get() {
            return Err(MemoryRemoteError::Offline);
        }
        Ok(self.row(&session.account_id))
    }

    async fn update_profile(
        &self,
        session: &Session,
        profile: AccessibilityProfile,
    ) -> Result<(), MemoryRemoteError> {
        if self.failing.get() {
            return Err(MemoryRemoteError::Offline);
        }
        self.set_row(&session.account_id, Some(profile));
        self.updates.set(self.updates.get() + 1);
        Ok(())
    }
}

/// Scriptable speech recognition engine.
#[derive(Debug, Clone)]
pub struct MemoryRecognizer {
    available: bool,
    fail_start: Rc<Cell<bool>>,
    starts: Rc<Cell<usize>>,
    stops: Rc<Cell<usize>>,
    last_config: Rc<RefCell<Option<RecognitionConfig>>>,
}

impl Default for MemoryRecognizer {
    fn default() -> Self {
        Self {
            available: true,
            fail_start: Rc::default(),
            starts: Rc::default(),
            stops: Rc::default(),
            last_config: Rc::default(),
        }
    }
}

impl MemoryRecognizer {
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    pub fn fail_start(&self, failing: bool) {
        self.fail_start.set(failing);
    }

    #[must_use]
    pub fn starts(&self) -> usize {
        self.starts.get()
    }

    #[must_use]
    pub fn stops(&self) -> usize {
        self.stops.get()
    }

    #[must_use]
    pub fn last_config(&self) -> Option<RecognitionConfig> {
        self.last_config.borrow().clone()
    }
}

impl SpeechRecognizer for MemoryRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&self, config: &RecognitionConfig) -> Result<(), RecognitionError> {
        if !self.available {
            return Err(RecognitionError::Unavailable);
        }
        if self.fail_start.get() {
            return Err(RecognitionError::Start("engine busy".to_string()));
        }
        self.starts.set(self.starts.get() + 1);
        *self.last_config.borrow_mut() = Some(config.clone());
        Ok(())
    }

    fn stop(&self) {
        self.stops.set(self.stops.get() + 1);
    }
}

/// Navigator that records where it was sent; `go_back` logs `"back"`.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, destination: Destination) {
        self.visited.push(destination.path().to_string());
    }

    fn go_back(&mut self) {
        self.visited.push("back".to_string());
    }
}
