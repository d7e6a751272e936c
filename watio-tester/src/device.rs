//! One simulated browser tab: engine plus inspectable in-memory adapters.
use anyhow::{Result, ensure};
use std::collections::{BTreeMap, BTreeSet};
use watio_access::constants::{FONT_SIZE_MAX, FONT_SIZE_MIN};
use watio_access::{AccessibilityManager, MemorySpeech, MemoryStore, MemorySurface, StyleModel};

pub type Engine = AccessibilityManager<MemoryStore, MemorySurface, MemorySpeech>;

pub struct Device {
    pub engine: Engine,
    pub store: MemoryStore,
    pub surface: MemorySurface,
    pub speech: MemorySpeech,
    prefers_dark: bool,
}

impl Device {
    pub fn fresh(prefers_dark: bool) -> Self {
        Self::with_store(MemoryStore::default(), prefers_dark)
    }

    pub fn with_store(store: MemoryStore, prefers_dark: bool) -> Self {
        let surface = MemorySurface::default();
        let speech = MemorySpeech::default();
        let engine =
            AccessibilityManager::load(store.clone(), surface.clone(), speech.clone(), prefers_dark);
        Self {
            engine,
            store,
            surface,
            speech,
            prefers_dark,
        }
    }

    /// A new tab over the same storage and OS hint.
    pub fn reload(&self) -> Self {
        Self::with_store(self.store.clone(), self.prefers_dark)
    }

    /// The surface shows exactly what the current state derives.
    pub fn check_surface(&self) -> Result<()> {
        let expected = StyleModel::derive(
            self.engine.profile(),
            self.engine.preferences(),
            self.engine.voice_active(),
        );
        ensure!(
            &expected == self.engine.style_model(),
            "applied model drifted from derived model"
        );
        let classes: BTreeSet<String> = expected.classes().map(str::to_string).collect();
        ensure!(
            classes == self.surface.classes(),
            "surface classes {:?} != derived {:?}",
            self.surface.classes(),
            classes
        );
        let variables: BTreeMap<String, String> = expected
            .variables()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        ensure!(
            variables == self.surface.properties(),
            "surface properties {:?} != derived {:?}",
            self.surface.properties(),
            variables
        );
        Ok(())
    }

    pub fn check_bounds(&self) -> Result<()> {
        let size = self.engine.preferences().font_size_px;
        ensure!(
            (FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&size),
            "font size {size} out of range"
        );
        if !self.engine.preferences().text_to_speech {
            ensure!(
                self.speech.pending().is_empty(),
                "speech pending with text-to-speech off"
            );
        }
        Ok(())
    }

    /// Reloading from storage yields the same profile and preferences.
    pub fn check_persisted(&self) -> Result<()> {
        let reloaded = self.reload();
        ensure!(
            reloaded.engine.profile() == self.engine.profile(),
            "profile {} reloaded as {}",
            self.engine.profile(),
            reloaded.engine.profile()
        );
        ensure!(
            reloaded.engine.preferences() == self.engine.preferences(),
            "preferences changed across reload: {:?} vs {:?}",
            self.engine.preferences(),
            reloaded.engine.preferences()
        );
        Ok(())
    }

    pub fn check_all(&self) -> Result<()> {
        self.check_surface()?;
        self.check_bounds()?;
        self.check_persisted()
    }
}
