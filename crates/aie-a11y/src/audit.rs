//! Compliance Auditing
//!
//! Read-only scan of a document subtree for contrast, keyboard reachability
//! and labelling problems, summarised into a 0-100 score.

use crate::aria;
use crate::config::EngineConfig;
use crate::contrast::ContrastChecker;
use crate::document::{accessible_name, collapse_whitespace, DocumentView};
use crate::focus::is_focusable;

/// Points deducted per issue
const ISSUE_PENALTY: usize = 5;

/// Audit findings. Messages are plain diagnostics for developers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceReport {
    pub contrast_issues: Vec<String>,
    pub focus_issues: Vec<String>,
    pub label_issues: Vec<String>,
    pub overall_score: u8,
}

impl ComplianceReport {
    pub fn total_issues(&self) -> usize {
        self.contrast_issues.len() + self.focus_issues.len() + self.label_issues.len()
    }

    pub fn is_clean(&self) -> bool {
        self.total_issues() == 0
    }
}

/// `max(0, 100 - 5 * issues)`
pub fn score(total_issues: usize) -> u8 {
    100usize.saturating_sub(ISSUE_PENALTY.saturating_mul(total_issues)) as u8
}

/// Document compliance auditor
#[derive(Debug, Clone)]
pub struct ComplianceAuditor {
    excerpt_len: usize,
}

impl Default for ComplianceAuditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceAuditor {
    pub fn new() -> Self {
        Self { excerpt_len: 50 }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self { excerpt_len: config.excerpt_len }
    }

    pub fn with_excerpt_len(mut self, len: usize) -> Self {
        self.excerpt_len = len;
        self
    }

    /// Audit `root` and its descendants. The document is not modified.
    pub fn audit<D: DocumentView>(&self, doc: &D, root: D::Node) -> ComplianceReport {
        let mut elements = vec![root];
        elements.extend(doc.descendants(root));
        elements.retain(|n| doc.is_element(*n));

        let contrast_issues = self.contrast_pass(doc, &elements);
        let focus_issues = focus_pass(doc, &elements);
        let label_issues = label_pass(doc, &elements);

        let mut report = ComplianceReport {
            contrast_issues,
            focus_issues,
            label_issues,
            overall_score: 0,
        };
        report.overall_score = score(report.total_issues());
        tracing::debug!(
            "Audit finished: {} contrast, {} focus, {} label issues, score {}",
            report.contrast_issues.len(),
            report.focus_issues.len(),
            report.label_issues.len(),
            report.overall_score
        );
        report
    }

    /// Elements with their own visible text must meet AA for normal text
    fn contrast_pass<D: DocumentView>(&self, doc: &D, elements: &[D::Node]) -> Vec<String> {
        let mut issues = Vec::new();
        for &node in elements {
            if matches!(doc.tag_name(node), Some("script" | "style" | "noscript" | "template")) {
                continue;
            }
            let text = collapse_whitespace(&doc.own_text(node));
            if text.is_empty() {
                continue;
            }

            let fg = doc.foreground_color(node);
            let bg = doc.background_color(node);
            let ratio = ContrastChecker::contrast_ratio(&fg, &bg);
            if !ContrastChecker::meets_aa(ratio, false) {
                issues.push(format!(
                    "Low contrast {:.2}:1 ({} on {}) for \"{}\"",
                    ratio,
                    fg,
                    bg,
                    excerpt(&text, self.excerpt_len)
                ));
            }
        }
        issues
    }
}

/// Looks clickable to a pointer user
fn is_visually_interactive<D: DocumentView>(doc: &D, node: D::Node) -> bool {
    match doc.tag_name(node) {
        Some("input") => !doc
            .attribute(node, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden")),
        Some("button" | "a" | "select" | "textarea") => true,
        _ => doc.has_attribute(node, "onclick") || doc.role(node).is_some_and(|r| r.is_widget()),
    }
}

/// Everything that looks interactive must be reachable by keyboard
fn focus_pass<D: DocumentView>(doc: &D, elements: &[D::Node]) -> Vec<String> {
    elements
        .iter()
        .filter(|&&n| is_visually_interactive(doc, n) && !doc.has_attribute(n, "disabled"))
        .filter(|&&n| !is_focusable(doc, n))
        .map(|&n| format!("{} is interactive but not keyboard focusable", describe(doc, n)))
        .collect()
}

fn is_required<D: DocumentView>(doc: &D, node: D::Node) -> bool {
    doc.has_attribute(node, "required")
        || doc
            .attribute(node, "aria-required")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Relations must resolve and labelled or required fields must have a name
fn label_pass<D: DocumentView>(doc: &D, elements: &[D::Node]) -> Vec<String> {
    let mut issues = Vec::new();
    for &node in elements {
        let relations: Vec<(&str, &str)> = aria::IDREF_RELATIONS
            .iter()
            .filter_map(|&rel| doc.attribute(node, rel).map(|v| (rel, v)))
            .collect();
        if relations.is_empty() && !is_required(doc, node) {
            continue;
        }

        for (rel, value) in &relations {
            for id in aria::idrefs(value) {
                if doc.element_by_id(id).is_none() {
                    issues.push(format!("{} references missing id \"{}\" in {}", describe(doc, node), id, rel));
                }
            }
        }

        if accessible_name(doc, node).is_empty() {
            issues.push(format!("{} has no accessible name", describe(doc, node)));
        }
    }
    issues
}

/// `<tag#id>` for messages
fn describe<D: DocumentView>(doc: &D, node: D::Node) -> String {
    let tag = doc.tag_name(node).unwrap_or("?");
    match doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        Some(id) => format!("<{}#{}>", tag, id),
        None => format!("<{}>", tag),
    }
}

/// First `max` characters, with `...` when cut
fn excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aie_dom::Document;

    #[test]
    fn test_score_bounds() {
        assert_eq!(score(0), 100);
        assert_eq!(score(3), 85);
        assert_eq!(score(20), 0);
        assert_eq!(score(21), 0);
        assert_eq!(score(usize::MAX), 0);
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 50), "short");
        assert_eq!(excerpt("abcdef", 3), "abc...");
        assert_eq!(excerpt("héllo wörld", 4), "héll...");
    }

    #[test]
    fn test_clean_document() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p", &[]).unwrap();
        doc.append_text(p, "Readable text").unwrap();
        let button = doc.append_element(body, "button", &[]).unwrap();
        doc.append_text(button, "Send").unwrap();

        let report = ComplianceAuditor::new().audit(&doc, body);
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.overall_score, 100);
    }

    #[test]
    fn test_low_contrast_reported() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p", &[("style", "color: #999999")]).unwrap();
        doc.append_text(p, "A fairly long paragraph of faint grey text").unwrap();

        let report = ComplianceAuditor::new().with_excerpt_len(10).audit(&doc, body);
        assert_eq!(report.contrast_issues, vec![
            "Low contrast 2.85:1 (#999999 on #ffffff) for \"A fairly l...\"".to_string()
        ]);
        assert_eq!(report.overall_score, 95);
    }

    #[test]
    fn test_css_colors_resolved_before_contrast() {
        let mut doc = Document::new();
        let body = doc.body();
        let inverted = doc.append_element(body, "p", &[("style", "color: white; background-color: black")]).unwrap();
        doc.append_text(inverted, "Light on dark").unwrap();
        let banner = doc.append_element(body, "p", &[("style", "background: #fff url(banner.png) no-repeat")]).unwrap();
        doc.append_text(banner, "Plain banner").unwrap();
        let warning = doc.append_element(body, "p", &[("style", "color: red")]).unwrap();
        doc.append_text(warning, "Red warning").unwrap();

        let report = ComplianceAuditor::new().audit(&doc, body);
        assert_eq!(report.contrast_issues, vec![
            "Low contrast 4.00:1 (#ff0000 on #ffffff) for \"Red warning\"".to_string()
        ]);
    }

    #[test]
    fn test_unreachable_widgets() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_element(body, "div", &[("onclick", "go()"), ("id", "fake-btn")]).unwrap();
        doc.append_element(body, "span", &[("role", "checkbox")]).unwrap();
        doc.append_element(body, "div", &[("role", "button"), ("tabindex", "0"), ("aria-label", "Ok")]).unwrap();
        doc.append_element(body, "button", &[("disabled", "")]).unwrap();
        doc.append_element(body, "input", &[("type", "hidden")]).unwrap();

        let report = ComplianceAuditor::new().audit(&doc, body);
        assert_eq!(report.focus_issues, vec![
            "<div#fake-btn> is interactive but not keyboard focusable".to_string(),
            "<span> is interactive but not keyboard focusable".to_string(),
        ]);
    }

    #[test]
    fn test_label_issues() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_element(body, "input", &[("id", "email"), ("required", "")]).unwrap();
        doc.append_element(body, "input", &[("id", "phone"), ("aria-describedby", "phone-hint")]).unwrap();

        let hint = doc.append_element(body, "span", &[("id", "name-hint")]).unwrap();
        doc.append_text(hint, "As on your passport").unwrap();
        let label = doc.append_element(body, "label", &[("for", "name")]).unwrap();
        doc.append_text(label, "Full name").unwrap();
        doc.append_element(body, "input", &[("id", "name"), ("aria-required", "true"), ("aria-describedby", "name-hint")]).unwrap();

        let report = ComplianceAuditor::new().audit(&doc, body);
        assert_eq!(report.label_issues, vec![
            "<input#email> has no accessible name".to_string(),
            "<input#phone> references missing id \"phone-hint\" in aria-describedby".to_string(),
            "<input#phone> has no accessible name".to_string(),
        ]);
    }

    #[test]
    fn test_audit_is_deterministic() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.append_element(body, "p", &[("style", "color: #999999; background: #888888")]).unwrap();
        doc.append_text(p, "hard to read").unwrap();
        doc.append_element(body, "a", &[]).unwrap();

        let auditor = ComplianceAuditor::new();
        let first = auditor.audit(&doc, body);
        let second = auditor.audit(&doc, body);
        assert_eq!(first, second);
        assert!(!first.is_clean());
    }

    #[test]
    fn test_score_floors_at_zero() {
        let mut doc = Document::new();
        let body = doc.body();
        for _ in 0..25 {
            doc.append_element(body, "div", &[("onclick", "x()")]).unwrap();
        }
        let report = ComplianceAuditor::new().audit(&doc, body);
        assert_eq!(report.total_issues(), 25);
        assert_eq!(report.overall_score, 0);
    }
}
