//! Speech Output
//!
//! Narration state machine over a platform text-to-speech capability.
//!
//! ```text
//! Idle --speak--> Speaking <--pause/resume--> Paused
//!   ^                |                          |
//!   +--- ended / error / stop ------------------+
//! ```
//!
//! Requests supersede each other: a new `speak` cancels whatever is in
//! flight, and the cancelled request's completion callback is dropped
//! unfired. Every utterance carries a sequence number; platform signals
//! for anything but the current utterance are discarded.

use crate::config::EngineConfig;
use crate::document::{collapse_whitespace, DocumentView};

/// Allowed speaking rate range
pub const RATE_RANGE: (f32, f32) = (0.1, 10.0);
/// Allowed pitch range
pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);
/// Allowed volume range
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

fn clamp(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

/// Text plus voice parameters for one narration
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationRequest {
    text: String,
    language: String,
    rate: f32,
    pitch: f32,
    volume: f32,
}

impl NarrationRequest {
    /// Request with neutral voice settings in `en-US`
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            language: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    /// Request using the configured voice defaults
    pub fn from_config(text: &str, config: &EngineConfig) -> Self {
        Self::new(text)
            .with_language(&config.default_language)
            .with_rate(config.default_rate)
            .with_pitch(config.default_pitch)
            .with_volume(config.default_volume)
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Clamped to 0.1-10
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = clamp(rate, RATE_RANGE);
        self
    }

    /// Clamped to 0-2
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = clamp(pitch, PITCH_RANGE);
        self
    }

    /// Clamped to 0-1
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = clamp(volume, VOLUME_RANGE);
        self
    }

    pub fn text(&self) -> &str { &self.text }
    pub fn language(&self) -> &str { &self.language }
    pub fn rate(&self) -> f32 { self.rate }
    pub fn pitch(&self) -> f32 { self.pitch }
    pub fn volume(&self) -> f32 { self.volume }
}

/// Sequence number identifying one submitted utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

/// What the platform is asked to speak
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Platform text-to-speech surface
pub trait SpeechSynthesizer {
    /// Feature detection; nothing else is called when this is false
    fn is_available(&self) -> bool;

    /// Start speaking. Progress is reported back through `SynthesisEvent`s
    /// carrying `utterance.id`.
    fn speak(&mut self, utterance: &Utterance);

    /// Drop the current utterance immediately
    fn cancel(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);
}

/// Platform signal kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEventKind {
    Started,
    Ended,
    Error(String),
}

/// Platform signal for one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisEvent {
    pub utterance: UtteranceId,
    pub kind: SynthesisEventKind,
}

impl SynthesisEvent {
    pub fn started(utterance: UtteranceId) -> Self {
        Self { utterance, kind: SynthesisEventKind::Started }
    }

    pub fn ended(utterance: UtteranceId) -> Self {
        Self { utterance, kind: SynthesisEventKind::Ended }
    }

    pub fn error(utterance: UtteranceId, message: &str) -> Self {
        Self { utterance, kind: SynthesisEventKind::Error(message.to_string()) }
    }
}

/// Narration session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationStatus {
    #[default]
    Idle,
    Speaking,
    Paused,
}

/// How a narration finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Finished,
    Failed(String),
}

pub(crate) type CompletionCallback = Box<dyn FnOnce(CompletionStatus)>;

/// Who asked for the narration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NarrationOrigin {
    /// Explicit read-aloud request
    Requested,
    /// Automatic status announcement, gated by preferences
    Announcement,
}

struct ActiveNarration {
    id: UtteranceId,
    request: NarrationRequest,
    origin: NarrationOrigin,
    started: bool,
    on_complete: Option<CompletionCallback>,
}

/// Completion owed to a caller after an event was applied
pub(crate) struct PendingCompletion {
    callback: CompletionCallback,
    status: CompletionStatus,
}

impl PendingCompletion {
    pub(crate) fn fire(self) {
        (self.callback)(self.status);
    }
}

/// Speech output controller. Exclusively owns the synthesizer.
pub struct SpeechController<S: SpeechSynthesizer> {
    synth: S,
    status: NarrationStatus,
    current: Option<ActiveNarration>,
    last_id: u64,
    announcements_enabled: bool,
    config: EngineConfig,
}

impl<S: SpeechSynthesizer> std::fmt::Debug for SpeechController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechController")
            .field("status", &self.status)
            .field("current", &self.current.as_ref().map(|c| c.id))
            .field("announcements_enabled", &self.announcements_enabled)
            .finish()
    }
}

impl<S: SpeechSynthesizer> SpeechController<S> {
    pub fn new(synth: S) -> Self {
        Self::with_config(synth, EngineConfig::default())
    }

    pub fn with_config(synth: S, config: EngineConfig) -> Self {
        Self {
            synth,
            status: NarrationStatus::Idle,
            current: None,
            last_id: 0,
            announcements_enabled: false,
            config,
        }
    }

    /// Whether the platform can narrate at all
    pub fn is_supported(&self) -> bool {
        self.synth.is_available()
    }

    pub fn status(&self) -> NarrationStatus {
        self.status
    }

    pub fn current_request(&self) -> Option<&NarrationRequest> {
        self.current.as_ref().map(|c| &c.request)
    }

    pub fn current_utterance(&self) -> Option<UtteranceId> {
        self.current.as_ref().map(|c| c.id)
    }

    /// Whether the platform confirmed the current utterance started
    pub fn is_confirmed(&self) -> bool {
        self.current.as_ref().is_some_and(|c| c.started)
    }

    pub fn synthesizer(&self) -> &S {
        &self.synth
    }

    pub fn synthesizer_mut(&mut self) -> &mut S {
        &mut self.synth
    }

    /// Request built from the configured voice defaults
    pub fn request(&self, text: &str) -> NarrationRequest {
        NarrationRequest::from_config(text, &self.config)
    }

    /// Speak `request`, superseding anything in flight
    pub fn speak(&mut self, request: NarrationRequest) -> Option<UtteranceId> {
        self.start(request, NarrationOrigin::Requested, None)
    }

    /// Speak `request` and call `on_complete` once when it ends or fails.
    /// The callback is dropped unfired if the request is stopped or
    /// superseded.
    pub fn speak_with(
        &mut self,
        request: NarrationRequest,
        on_complete: impl FnOnce(CompletionStatus) + 'static,
    ) -> Option<UtteranceId> {
        self.start(request, NarrationOrigin::Requested, Some(Box::new(on_complete)))
    }

    /// Narrate the collapsed text content of a document fragment
    pub fn speak_fragment<D: DocumentView>(&mut self, doc: &D, node: D::Node) -> Option<UtteranceId> {
        let text = collapse_whitespace(&doc.text_content(node));
        let request = self.request(&text);
        self.speak(request)
    }

    /// Speak a status message if screen reader announcements are enabled
    pub fn announce(&mut self, text: &str) -> Option<UtteranceId> {
        if !self.announcements_enabled {
            tracing::trace!("Announcements disabled; not narrating {:?}", text);
            return None;
        }
        let request = self.request(text);
        self.start(request, NarrationOrigin::Announcement, None)
    }

    pub fn announcements_enabled(&self) -> bool {
        self.announcements_enabled
    }

    /// Follow the screen reader announcement preference. Disabling stops an
    /// in-flight announcement but not an explicit request.
    pub fn set_announcements_enabled(&mut self, enabled: bool) {
        if self.announcements_enabled == enabled {
            return;
        }
        self.announcements_enabled = enabled;
        tracing::debug!("Narrated announcements {}", if enabled { "enabled" } else { "disabled" });

        let announcing = self
            .current
            .as_ref()
            .is_some_and(|c| c.origin == NarrationOrigin::Announcement);
        if !enabled && announcing {
            self.stop();
        }
    }

    fn start(
        &mut self,
        request: NarrationRequest,
        origin: NarrationOrigin,
        on_complete: Option<CompletionCallback>,
    ) -> Option<UtteranceId> {
        if !self.synth.is_available() {
            tracing::debug!("Speech synthesis unavailable; request ignored");
            return None;
        }
        // A new request always ends the previous one, even if it is blank
        if let Some(previous) = self.current.take() {
            tracing::debug!("Utterance {:?} superseded", previous.id);
            self.synth.cancel();
            self.status = NarrationStatus::Idle;
        }

        if request.text.trim().is_empty() {
            tracing::debug!("Empty narration request ignored");
            return None;
        }

        self.last_id += 1;
        let id = UtteranceId(self.last_id);
        let utterance = Utterance {
            id,
            text: request.text.clone(),
            lang: request.language.clone(),
            rate: request.rate,
            pitch: request.pitch,
            volume: request.volume,
        };
        self.synth.speak(&utterance);

        self.current = Some(ActiveNarration { id, request, origin, started: false, on_complete });
        self.status = NarrationStatus::Speaking;
        Some(id)
    }

    /// Speaking -> Paused; no-op otherwise
    pub fn pause(&mut self) -> bool {
        if self.status != NarrationStatus::Speaking {
            return false;
        }
        self.synth.pause();
        self.status = NarrationStatus::Paused;
        true
    }

    /// Paused -> Speaking; no-op otherwise
    pub fn resume(&mut self) -> bool {
        if self.status != NarrationStatus::Paused {
            return false;
        }
        self.synth.resume();
        self.status = NarrationStatus::Speaking;
        true
    }

    /// Cancel the current utterance and go Idle without completing it.
    /// No-op when already Idle.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.current.take() else {
            return false;
        };
        self.synth.cancel();
        self.status = NarrationStatus::Idle;
        tracing::debug!("Utterance {:?} stopped", active.id);
        true
    }

    /// Apply a platform signal, firing the completion callback if it ended
    /// the current utterance. Returns false for stale signals.
    pub fn handle_event(&mut self, event: SynthesisEvent) -> bool {
        let (applied, pending) = self.apply_event(event);
        if let Some(pending) = pending {
            pending.fire();
        }
        applied
    }

    /// State transition for a platform signal. The completion is returned
    /// rather than fired so shared owners can release their borrow first.
    pub(crate) fn apply_event(&mut self, event: SynthesisEvent) -> (bool, Option<PendingCompletion>) {
        let is_current = self.current.as_ref().is_some_and(|c| c.id == event.utterance);
        if !is_current {
            tracing::debug!("Discarding stale {:?} for utterance {:?}", event.kind, event.utterance);
            return (false, None);
        }

        let status = match event.kind {
            SynthesisEventKind::Started => {
                if let Some(active) = self.current.as_mut() {
                    active.started = true;
                }
                return (true, None);
            }
            SynthesisEventKind::Ended => CompletionStatus::Finished,
            SynthesisEventKind::Error(message) => {
                tracing::warn!("Speech synthesis error on {:?}: {}", event.utterance, message);
                CompletionStatus::Failed(message)
            }
        };

        let active = self.current.take();
        self.status = NarrationStatus::Idle;
        let pending = active
            .and_then(|a| a.on_complete)
            .map(|callback| PendingCompletion { callback, status });
        (true, pending)
    }
}
