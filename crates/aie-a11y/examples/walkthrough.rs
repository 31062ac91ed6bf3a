//! Example: auditing a small form and driving narration

use std::cell::RefCell;
use std::rc::Rc;

use aie_a11y::{
    AssistiveEngine, ContrastChecker, EngineConfig, FocusTrap, KeyEvent, MemoryStorage,
    PreferencePatch, SpeechSynthesizer, SynthesisEvent, Utterance,
};
use aie_dom::Document;

/// Synthesizer that prints instead of speaking
struct ConsoleSynth;

impl SpeechSynthesizer for ConsoleSynth {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&mut self, utterance: &Utterance) {
        println!("  [speech {:?}] {} ({}, rate {})", utterance.id, utterance.text, utterance.lang, utterance.rate);
    }

    fn cancel(&mut self) {
        println!("  [speech] cancel");
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::from_json(r#"{"defaultLanguage": "en-GB", "excerptLen": 30}"#)?;
    let mut engine = AssistiveEngine::new(config, Box::new(MemoryStorage::new()), ConsoleSynth);

    // Page under test
    let doc = Rc::new(RefCell::new(Document::new()));
    let (intro, dialog) = {
        let mut d = doc.borrow_mut();
        let body = d.body();
        let intro = d.append_element(body, "p", &[("style", "color: #aaaaaa")])?;
        d.append_text(intro, "Fill in the form below to apply for the position")?;

        let form = d.append_element(body, "form", &[])?;
        d.append_element(form, "input", &[("id", "email"), ("required", "")])?;
        d.append_element(form, "div", &[("onclick", "submit()")])?;

        let dialog = d.append_element(body, "div", &[("role", "dialog")])?;
        let ok = d.append_element(dialog, "button", &[])?;
        d.append_text(ok, "OK")?;
        let cancel = d.append_element(dialog, "button", &[])?;
        d.append_text(cancel, "Cancel")?;
        (intro, dialog)
    };

    engine.attach_style_sink(Rc::clone(&doc));

    println!("Contrast #aaaaaa on #ffffff: {:.2}:1", ContrastChecker::contrast_ratio("#aaaaaa", "#ffffff"));

    let report = engine.audit(&*doc.borrow(), doc.borrow().body());
    println!("Audit score: {}", report.overall_score);
    for issue in report.contrast_issues.iter().chain(&report.focus_issues).chain(&report.label_issues) {
        println!("  - {}", issue);
    }

    println!("Enabling high contrast and announcements");
    engine.update_preferences(PreferencePatch::new().high_contrast(true).screen_reader_announcements(true));
    println!("  root classes: {}", doc.borrow().root_classes().value());

    if let Some(id) = engine.announce("Preferences saved") {
        engine.handle_synthesis_event(SynthesisEvent::ended(id));
    }
    engine.speak_fragment(&*doc.borrow(), intro);

    println!("Trapping focus in the dialog");
    let mut trap = FocusTrap::new();
    let mut d = doc.borrow_mut();
    trap.activate(&mut *d, dialog);
    println!("  focused {:?}", d.active_element());
    let disposition = trap.dispatch_key(&mut *d, &KeyEvent::shift_tab());
    println!("  Shift+Tab -> {:?}, focused {:?}", disposition, d.active_element());
    trap.deactivate(&mut *d);

    Ok(())
}
