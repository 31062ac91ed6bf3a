//! AIE Accessibility
//!
//! The Assistive-Interaction Engine: control logic that makes an
//! interactive document usable with screen readers, keyboard-only
//! navigation and high-contrast/large-text rendering.
//!
//! Features:
//! - WCAG contrast evaluation (relative luminance, AA/AAA thresholds)
//! - Persisted accessibility preferences with change subscriptions
//! - Root style-class propagation (`high-contrast`, `easy-reading`)
//! - Focus containment for transient overlays
//! - Speech output state machine over a platform synthesizer
//! - Transient live-region announcements
//! - Compliance auditing of a document subtree
//!
//! The engine is single-threaded and cooperative: shared state lives in
//! `Rc`/`RefCell` and every failure degrades locally.

pub mod aria;
pub mod contrast;
pub mod document;
pub mod storage;
pub mod preferences;
pub mod style;
pub mod focus;
pub mod speech;
pub mod announce;
pub mod audit;
pub mod config;
pub mod engine;

pub use aria::AriaRole;
pub use contrast::{ContrastChecker, ContrastResult, ComplianceLevel, Rgb};
pub use document::{DocumentView, FocusHost, accessible_name};
pub use storage::{PreferenceStorage, MemoryStorage, FileStorage};
pub use preferences::{
    AccessibilityPreferences, PreferencePatch, PreferenceStore, Subscription, shared_store,
};
pub use style::{StyleClassSink, apply_preference_classes, HIGH_CONTRAST_CLASS, EASY_READING_CLASS};
pub use focus::{FocusTrap, FocusScope, KeyEvent, KeyDisposition, TabIndex, focusable_elements};
pub use speech::{
    SpeechController, SpeechSynthesizer, NarrationRequest, NarrationStatus, Utterance,
    UtteranceId, SynthesisEvent, SynthesisEventKind, CompletionStatus,
};
pub use announce::{Announcer, LiveRegionSink, Politeness, announce_transient};
pub use audit::{ComplianceAuditor, ComplianceReport};
pub use config::EngineConfig;
pub use engine::AssistiveEngine;

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
