//! Assistive Engine
//!
//! Wires the preference store to its dependents: narrated announcements
//! follow `screenReaderAnnouncements`, registered style sinks follow the
//! visual flags.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::announce::{announce_transient, Announcer, LiveRegionSink, Politeness};
use crate::audit::{ComplianceAuditor, ComplianceReport};
use crate::config::EngineConfig;
use crate::document::DocumentView;
use crate::preferences::{AccessibilityPreferences, PreferencePatch, PreferenceStore, Subscription};
use crate::speech::{
    CompletionStatus, NarrationRequest, NarrationStatus, SpeechController, SpeechSynthesizer,
    SynthesisEvent, UtteranceId,
};
use crate::storage::PreferenceStorage;
use crate::style::{apply_preference_classes, StyleClassSink};

/// Engine facade over the assistive components
pub struct AssistiveEngine<S: SpeechSynthesizer + 'static> {
    config: EngineConfig,
    store: Rc<PreferenceStore>,
    speech: Rc<RefCell<SpeechController<S>>>,
    auditor: ComplianceAuditor,
    subscriptions: Vec<Subscription>,
}

impl<S: SpeechSynthesizer + 'static> Debug for AssistiveEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistiveEngine")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl<S: SpeechSynthesizer + 'static> AssistiveEngine<S> {
    /// Engine with its own store loaded from `storage`
    pub fn new(config: EngineConfig, storage: Box<dyn PreferenceStorage>, synth: S) -> Self {
        let store = Rc::new(PreferenceStore::load(storage, &config.storage_key));
        Self::with_store(config, store, synth)
    }

    /// Engine over an existing, possibly shared, store
    pub fn with_store(config: EngineConfig, store: Rc<PreferenceStore>, synth: S) -> Self {
        let speech = Rc::new(RefCell::new(SpeechController::with_config(synth, config.clone())));
        speech
            .borrow_mut()
            .set_announcements_enabled(store.get().screen_reader_announcements);

        let weak: Weak<RefCell<SpeechController<S>>> = Rc::downgrade(&speech);
        let subscription = store.subscribe(move |prefs| {
            let Some(speech) = weak.upgrade() else {
                return;
            };
            match speech.try_borrow_mut() {
                Ok(mut speech) => speech.set_announcements_enabled(prefs.screen_reader_announcements),
                Err(_) => tracing::warn!("Speech controller busy; announcement preference not applied"),
            };
        });

        tracing::info!("Assistive engine ready (storage key {})", store.storage_key());
        Self {
            auditor: ComplianceAuditor::from_config(&config),
            config,
            store,
            speech,
            subscriptions: vec![subscription],
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Rc<PreferenceStore> {
        &self.store
    }

    pub fn preferences(&self) -> AccessibilityPreferences {
        self.store.get()
    }

    pub fn update_preferences(&self, patch: PreferencePatch) {
        self.store.update(patch);
    }

    /// Keep `sink`'s root classes in step with preferences. Applied
    /// immediately, then on every update while both are alive.
    pub fn attach_style_sink<T: StyleClassSink + 'static>(&mut self, sink: Rc<RefCell<T>>) {
        apply_preference_classes(&self.store.get(), &mut *sink.borrow_mut());

        let weak = Rc::downgrade(&sink);
        let subscription = self.store.subscribe(move |prefs| {
            let Some(sink) = weak.upgrade() else {
                return;
            };
            match sink.try_borrow_mut() {
                Ok(mut sink) => apply_preference_classes(prefs, &mut *sink),
                Err(_) => tracing::warn!("Style sink busy; root classes not updated"),
            };
        });
        self.subscriptions.push(subscription);
    }

    pub fn speech(&self) -> &Rc<RefCell<SpeechController<S>>> {
        &self.speech
    }

    pub fn is_speech_supported(&self) -> bool {
        self.speech.borrow().is_supported()
    }

    pub fn speech_status(&self) -> NarrationStatus {
        self.speech.borrow().status()
    }

    pub fn speak(&self, request: NarrationRequest) -> Option<UtteranceId> {
        self.speech.borrow_mut().speak(request)
    }

    /// Speak `text` with the configured voice defaults
    pub fn speak_text(&self, text: &str) -> Option<UtteranceId> {
        let mut speech = self.speech.borrow_mut();
        let request = speech.request(text);
        speech.speak(request)
    }

    pub fn speak_with(
        &self,
        request: NarrationRequest,
        on_complete: impl FnOnce(CompletionStatus) + 'static,
    ) -> Option<UtteranceId> {
        self.speech.borrow_mut().speak_with(request, on_complete)
    }

    pub fn speak_fragment<D: DocumentView>(&self, doc: &D, node: D::Node) -> Option<UtteranceId> {
        self.speech.borrow_mut().speak_fragment(doc, node)
    }

    pub fn pause(&self) -> bool {
        self.speech.borrow_mut().pause()
    }

    pub fn resume(&self) -> bool {
        self.speech.borrow_mut().resume()
    }

    pub fn stop(&self) -> bool {
        self.speech.borrow_mut().stop()
    }

    /// Feed a platform signal to the speech controller. The completion
    /// callback runs after the controller is released, so it may start a
    /// new narration.
    pub fn handle_synthesis_event(&self, event: SynthesisEvent) -> bool {
        let (applied, pending) = self.speech.borrow_mut().apply_event(event);
        if let Some(pending) = pending {
            pending.fire();
        }
        applied
    }

    /// Narrate a status message when screen reader announcements are on
    pub fn announce(&self, text: &str) -> Option<UtteranceId> {
        self.speech.borrow_mut().announce(text)
    }

    /// Announcer using the configured visibility window
    pub fn announcer<H: Copy + Debug>(&self) -> Announcer<H> {
        Announcer::new(self.config.announcement_window())
    }

    /// Inject a transient live-region message for the configured window,
    /// narrating it too when announcements are on
    pub async fn announce_live<L: LiveRegionSink>(&self, sink: &RefCell<L>, text: &str, politeness: Politeness) -> bool {
        self.announce(text);
        announce_transient(sink, text, politeness, self.config.announcement_window()).await
    }

    pub fn auditor(&self) -> &ComplianceAuditor {
        &self.auditor
    }

    pub fn audit<D: DocumentView>(&self, doc: &D, root: D::Node) -> ComplianceReport {
        self.auditor.audit(doc, root)
    }
}

impl<S: SpeechSynthesizer + 'static> Drop for AssistiveEngine<S> {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            self.store.unsubscribe(subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::tests::FakeSynth;
    use crate::storage::MemoryStorage;
    use crate::style::{EASY_READING_CLASS, HIGH_CONTRAST_CLASS};
    use aie_dom::Document;
    use std::time::Duration;

    fn engine() -> AssistiveEngine<FakeSynth> {
        AssistiveEngine::new(EngineConfig::default(), Box::new(MemoryStorage::new()), FakeSynth::default())
    }

    #[test]
    fn test_announcements_follow_preference() {
        let engine = engine();
        assert_eq!(engine.announce("Saved"), None);

        engine.update_preferences(PreferencePatch::new().screen_reader_announcements(true));
        let id = engine.announce("Saved").unwrap();
        assert_eq!(engine.speech_status(), NarrationStatus::Speaking);

        // Turning announcements off stops the in-flight announcement
        engine.update_preferences(PreferencePatch::new().screen_reader_announcements(false));
        assert_eq!(engine.speech_status(), NarrationStatus::Idle);
        assert!(!engine.handle_synthesis_event(SynthesisEvent::ended(id)));
    }

    #[test]
    fn test_stored_preference_enables_announcements() {
        let storage = MemoryStorage::new()
            .with_entry("accessibilityPreferences", r#"{"screenReaderAnnouncements":true}"#);
        let engine = AssistiveEngine::new(EngineConfig::default(), Box::new(storage), FakeSynth::default());
        assert!(engine.speech().borrow().announcements_enabled());
        assert!(engine.announce("Welcome back").is_some());
    }

    #[test]
    fn test_style_sink_tracks_preferences() {
        let mut engine = engine();
        let doc = Rc::new(RefCell::new(Document::new()));
        engine.attach_style_sink(Rc::clone(&doc));

        engine.update_preferences(PreferencePatch::new().high_contrast(true).easy_reading(true));
        assert!(doc.borrow().root_classes().contains(HIGH_CONTRAST_CLASS));
        assert!(doc.borrow().root_classes().contains(EASY_READING_CLASS));

        engine.update_preferences(PreferencePatch::new().high_contrast(false));
        assert!(!doc.borrow().root_classes().contains(HIGH_CONTRAST_CLASS));
    }

    #[test]
    fn test_completion_may_start_next_narration() {
        let engine = Rc::new(engine());
        let chained = Rc::clone(&engine);
        let first = engine
            .speak_with(NarrationRequest::new("Step one"), move |_| {
                chained.speak_text("Step two");
            })
            .unwrap();

        assert!(engine.handle_synthesis_event(SynthesisEvent::ended(first)));
        assert_eq!(engine.speech_status(), NarrationStatus::Speaking);
        assert_eq!(engine.speech().borrow().current_request().map(|r| r.text()), Some("Step two"));
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let store = Rc::new(PreferenceStore::in_memory());
        let mut engine = AssistiveEngine::with_store(EngineConfig::default(), Rc::clone(&store), FakeSynth::default());
        engine.attach_style_sink(Rc::new(RefCell::new(Document::new())));
        assert_eq!(store.listener_count(), 2);

        drop(engine);
        assert_eq!(store.listener_count(), 0);
        store.update(PreferencePatch::new().high_contrast(true));
    }

    #[test]
    fn test_live_announcement_uses_configured_window() {
        let config = EngineConfig::default().with_announcement_window(Duration::from_millis(5));
        let engine = AssistiveEngine::new(config, Box::new(MemoryStorage::new()), FakeSynth::default());
        let doc = RefCell::new(Document::new());

        assert!(smol::block_on(engine.announce_live(&doc, "Filters applied", Politeness::Polite)));
        let body = doc.borrow().body();
        assert!(doc.borrow().descendants(body).is_empty());
        assert_eq!(engine.announcer::<aie_dom::NodeId>().window(), Duration::from_millis(5));
    }
}
