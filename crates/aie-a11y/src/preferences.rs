//! Accessibility Preferences
//!
//! The process-wide preference record and the store that owns it. The
//! store is the only place preferences change: `update` merges a patch,
//! persists, then notifies subscribers in subscription order.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::storage::{MemoryStorage, PreferenceStorage};

/// Default storage key for the serialized record
pub const DEFAULT_STORAGE_KEY: &str = "accessibilityPreferences";

/// User accessibility settings. Flags are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityPreferences {
    pub high_contrast: bool,
    pub easy_reading: bool,
    pub keyboard_navigation: bool,
    pub captions: bool,
    pub screen_reader_announcements: bool,
}

impl Default for AccessibilityPreferences {
    fn default() -> Self {
        Self {
            high_contrast: false,
            easy_reading: false,
            keyboard_navigation: true,
            captions: false,
            screen_reader_announcements: false,
        }
    }
}

impl AccessibilityPreferences {
    /// Copy with every flag present in `patch` overwritten
    pub fn merged(self, patch: &PreferencePatch) -> Self {
        Self {
            high_contrast: patch.high_contrast.unwrap_or(self.high_contrast),
            easy_reading: patch.easy_reading.unwrap_or(self.easy_reading),
            keyboard_navigation: patch.keyboard_navigation.unwrap_or(self.keyboard_navigation),
            captions: patch.captions.unwrap_or(self.captions),
            screen_reader_announcements: patch
                .screen_reader_announcements
                .unwrap_or(self.screen_reader_announcements),
        }
    }
}

/// Partial update; `None` leaves a flag untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencePatch {
    pub high_contrast: Option<bool>,
    pub easy_reading: Option<bool>,
    pub keyboard_navigation: Option<bool>,
    pub captions: Option<bool>,
    pub screen_reader_announcements: Option<bool>,
}

impl PreferencePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn high_contrast(mut self, on: bool) -> Self {
        self.high_contrast = Some(on);
        self
    }

    pub fn easy_reading(mut self, on: bool) -> Self {
        self.easy_reading = Some(on);
        self
    }

    pub fn keyboard_navigation(mut self, on: bool) -> Self {
        self.keyboard_navigation = Some(on);
        self
    }

    pub fn captions(mut self, on: bool) -> Self {
        self.captions = Some(on);
        self
    }

    pub fn screen_reader_announcements(mut self, on: bool) -> Self {
        self.screen_reader_announcements = Some(on);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Rc<dyn Fn(&AccessibilityPreferences)>;

/// Owner of the preference record
pub struct PreferenceStore {
    state: Cell<AccessibilityPreferences>,
    storage: RefCell<Box<dyn PreferenceStorage>>,
    key: String,
    listeners: RefCell<Vec<(Subscription, Listener)>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    /// Set by an update that lands while listeners are running
    stale: Cell<bool>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("state", &self.state.get())
            .field("key", &self.key)
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl PreferenceStore {
    /// Load the record under `key`, falling back to defaults when it is
    /// missing or unreadable
    pub fn load(storage: Box<dyn PreferenceStorage>, key: &str) -> Self {
        let initial = match storage.load(key) {
            Ok(Some(raw)) => match serde_json::from_str::<AccessibilityPreferences>(&raw) {
                Ok(prefs) => prefs,
                Err(err) => {
                    tracing::warn!("Ignoring malformed stored preferences under {}: {}", key, err);
                    AccessibilityPreferences::default()
                }
            },
            Ok(None) => AccessibilityPreferences::default(),
            Err(err) => {
                tracing::warn!("Could not read stored preferences under {}: {}", key, err);
                AccessibilityPreferences::default()
            }
        };
        tracing::debug!("Preferences loaded: {:?}", initial);

        Self {
            state: Cell::new(initial),
            storage: RefCell::new(storage),
            key: key.to_string(),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            notifying: Cell::new(false),
            stale: Cell::new(false),
        }
    }

    /// Store backed by fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY)
    }

    /// Current preferences
    pub fn get(&self) -> AccessibilityPreferences {
        self.state.get()
    }

    /// Merge a patch, persist, then notify subscribers
    pub fn update(&self, patch: PreferencePatch) {
        let next = self.state.get().merged(&patch);
        self.commit(next);
    }

    /// Restore defaults through the regular update path
    pub fn reset(&self) {
        self.commit(AccessibilityPreferences::default());
    }

    fn commit(&self, next: AccessibilityPreferences) {
        self.state.set(next);
        self.persist(&next);

        // A nested update is delivered after the current round completes, so
        // every listener sees states in commit order and ends on the latest
        if self.notifying.get() {
            self.stale.set(true);
            return;
        }
        self.notifying.set(true);
        loop {
            self.stale.set(false);
            let current = self.state.get();
            // Snapshot so listeners may subscribe, unsubscribe or update re-entrantly
            let listeners: Vec<Listener> = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, l)| Rc::clone(l))
                .collect();
            for listener in listeners {
                listener(&current);
            }
            if !self.stale.get() {
                break;
            }
        }
        self.notifying.set(false);
    }

    fn persist(&self, prefs: &AccessibilityPreferences) {
        let raw = match serde_json::to_string(prefs) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Could not serialize preferences: {}", err);
                return;
            }
        };
        let result = match self.storage.try_borrow_mut() {
            Ok(mut storage) => storage.save(&self.key, &raw),
            Err(_) => {
                tracing::warn!("Preference storage busy; skipping persist");
                return;
            }
        };
        if let Err(err) = result {
            tracing::warn!("Could not persist preferences under {}: {}", self.key, err);
        }
    }

    /// Register a listener called with the new state after every update
    pub fn subscribe(&self, listener: impl Fn(&AccessibilityPreferences) + 'static) -> Subscription {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }
}

thread_local! {
    static SHARED_STORE: OnceCell<Rc<PreferenceStore>> = const { OnceCell::new() };
}

/// Process-wide store. `init` runs on first access only; later calls
/// return the same instance.
pub fn shared_store(init: impl FnOnce() -> PreferenceStore) -> Rc<PreferenceStore> {
    SHARED_STORE.with(|cell| Rc::clone(cell.get_or_init(|| Rc::new(init()))))
}
