//! Live Region Announcements
//!
//! One-shot status messages injected into a live region and removed after
//! a short visibility window. Separate from full narration: assistive
//! technology picks these up from the document itself.

use std::cell::RefCell;
use std::fmt::Debug;
use std::time::{Duration, Instant};

use aie_dom::{Document, NodeId};

use crate::aria::AriaRole;

/// Live region politeness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    /// `aria-live` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }

    /// Role carrying the matching implicit politeness
    pub fn role(&self) -> AriaRole {
        match self {
            Self::Polite => AriaRole::Status,
            Self::Assertive => AriaRole::Alert,
        }
    }
}

/// Where announcement text is injected
pub trait LiveRegionSink {
    type Handle: Copy + Debug;

    /// Insert a transient region holding `text`; `None` if it cannot be placed
    fn insert_announcement(&mut self, text: &str, politeness: Politeness) -> Option<Self::Handle>;

    fn remove_announcement(&mut self, handle: Self::Handle);
}

/// Visually hidden live region appended to `<body>`
impl LiveRegionSink for Document {
    type Handle = NodeId;

    fn insert_announcement(&mut self, text: &str, politeness: Politeness) -> Option<NodeId> {
        let body = self.body();
        let region = self
            .append_element(body, "div", &[
                ("role", politeness.role().as_str()),
                ("aria-live", politeness.as_str()),
                ("aria-atomic", "true"),
                ("class", "sr-only"),
            ])
            .ok()?;
        self.append_text(region, text).ok()?;
        Some(region)
    }

    fn remove_announcement(&mut self, handle: NodeId) {
        if let Err(err) = self.remove(handle) {
            tracing::debug!("Announcement region {:?} already gone: {}", handle, err);
        }
    }
}

/// Tracks announcements still inside their visibility window
#[derive(Debug)]
pub struct Announcer<H> {
    window: Duration,
    pending: Vec<(H, Instant)>,
}

impl<H: Copy + Debug> Announcer<H> {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: Vec::new() }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Inject `text` now; it is removed by the first `expire` at or after
    /// `now + window`. Blank text is ignored.
    pub fn announce<S>(&mut self, sink: &mut S, text: &str, politeness: Politeness, now: Instant) -> Option<H>
    where
        S: LiveRegionSink<Handle = H>,
    {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let handle = sink.insert_announcement(text, politeness)?;
        tracing::debug!("Announced ({}) {:?}", politeness.as_str(), text);
        self.pending.push((handle, now + self.window));
        Some(handle)
    }

    /// Remove every announcement whose window has elapsed. Returns how many
    /// were removed.
    pub fn expire<S>(&mut self, sink: &mut S, now: Instant) -> usize
    where
        S: LiveRegionSink<Handle = H>,
    {
        let mut removed = 0;
        self.pending.retain(|(handle, deadline)| {
            if *deadline <= now {
                sink.remove_announcement(*handle);
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Inject `text`, wait out `window` on the executor, then remove it. The
/// sink is only borrowed around the insert and the removal. Returns true
/// once the region has been shown and removed; a sink still borrowed when
/// the window ends keeps the region.
pub async fn announce_transient<S>(sink: &RefCell<S>, text: &str, politeness: Politeness, window: Duration) -> bool
where
    S: LiveRegionSink,
{
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    let Some(handle) = sink.borrow_mut().insert_announcement(text, politeness) else {
        return false;
    };
    smol::Timer::after(window).await;
    match sink.try_borrow_mut() {
        Ok(mut sink) => {
            sink.remove_announcement(handle);
            true
        }
        Err(_) => {
            tracing::warn!("Live region sink busy; announcement {:?} left in place", handle);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentView;

    fn regions(doc: &Document) -> Vec<NodeId> {
        doc.descendants(doc.body())
            .into_iter()
            .filter(|n| doc.attribute(*n, "aria-live").is_some())
            .collect()
    }

    #[test]
    fn test_announce_inserts_live_region() {
        let mut doc = Document::new();
        let mut announcer = Announcer::new(Duration::from_secs(1));
        let region = announcer
            .announce(&mut doc, "Application submitted", Politeness::Polite, Instant::now())
            .unwrap();

        assert_eq!(doc.attribute(region, "role"), Some("status"));
        assert_eq!(doc.attribute(region, "aria-live"), Some("polite"));
        assert_eq!(doc.text_content(region), "Application submitted");
        assert_eq!(announcer.pending_count(), 1);
    }

    #[test]
    fn test_expire_after_window() {
        let mut doc = Document::new();
        let mut announcer = Announcer::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        announcer.announce(&mut doc, "Saved", Politeness::Polite, t0);
        let alert = announcer.announce(&mut doc, "Session expiring", Politeness::Assertive, t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(doc.attribute(alert, "role"), Some("alert"));
        assert_eq!(regions(&doc).len(), 2);

        assert_eq!(announcer.expire(&mut doc, t0 + Duration::from_millis(999)), 0);
        assert_eq!(announcer.expire(&mut doc, t0 + Duration::from_millis(1000)), 1);
        assert_eq!(regions(&doc), vec![alert]);
        assert_eq!(announcer.pending_count(), 1);
        assert_eq!(announcer.expire(&mut doc, t0 + Duration::from_millis(1499)), 0);

        assert_eq!(announcer.expire(&mut doc, t0 + Duration::from_secs(5)), 1);
        assert!(regions(&doc).is_empty());
        assert_eq!(announcer.pending_count(), 0);
    }

    #[test]
    fn test_blank_announcement_ignored() {
        let mut doc = Document::new();
        let mut announcer = Announcer::new(Duration::from_secs(1));
        assert_eq!(announcer.announce(&mut doc, "  ", Politeness::Polite, Instant::now()), None);
        assert!(regions(&doc).is_empty());
    }

    #[test]
    fn test_transient_announcement_removes_itself() {
        let doc = RefCell::new(Document::new());
        let shown = smol::block_on(announce_transient(&doc, "Copied", Politeness::Polite, Duration::from_millis(10)));
        assert!(shown);
        assert!(regions(&doc.borrow()).is_empty());
        assert!(!smol::block_on(announce_transient(&doc, "", Politeness::Polite, Duration::ZERO)));
    }

    #[test]
    fn test_transient_removal_skips_busy_sink() {
        let doc = RefCell::new(Document::new());
        let (removed, ()) = smol::block_on(smol::future::zip(
            announce_transient(&doc, "Saved", Politeness::Polite, Duration::from_millis(10)),
            async {
                smol::Timer::after(Duration::from_millis(2)).await;
                let held = doc.borrow();
                smol::Timer::after(Duration::from_millis(30)).await;
                drop(held);
            },
        ));
        assert!(!removed);
        assert_eq!(regions(&doc.borrow()).len(), 1);
    }
}
