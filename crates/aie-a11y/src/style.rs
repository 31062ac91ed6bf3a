//! Style Propagation
//!
//! Preferences map onto document-root class markers. Visual styling for
//! those classes belongs to the presentation layer.

use aie_dom::Document;

use crate::preferences::AccessibilityPreferences;

pub const HIGH_CONTRAST_CLASS: &str = "high-contrast";
pub const EASY_READING_CLASS: &str = "easy-reading";

/// Receiver of root class toggles
pub trait StyleClassSink {
    fn set_root_class(&mut self, class: &str, enabled: bool);
}

/// Force every preference-driven class to match `prefs`
pub fn apply_preference_classes(prefs: &AccessibilityPreferences, sink: &mut dyn StyleClassSink) {
    sink.set_root_class(HIGH_CONTRAST_CLASS, prefs.high_contrast);
    sink.set_root_class(EASY_READING_CLASS, prefs.easy_reading);
}

impl StyleClassSink for Document {
    fn set_root_class(&mut self, class: &str, enabled: bool) {
        Document::set_root_class(self, class, enabled);
    }
}
