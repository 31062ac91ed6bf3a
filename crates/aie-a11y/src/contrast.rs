//! Contrast Evaluation
//!
//! WCAG relative luminance and contrast ratio. Every function here is pure;
//! malformed color input degrades to luminance 0 instead of failing.

use crate::A11yError;

/// Minimum ratio for normal text at level AA
pub const AA_NORMAL_TEXT: f64 = 4.5;
/// Minimum ratio for large text at level AA
pub const AA_LARGE_TEXT: f64 = 3.0;
/// Minimum ratio for normal text at level AAA
pub const AAA_NORMAL_TEXT: f64 = 7.0;

/// sRGB color, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`. Shorthand `#rgb` is rejected.
    pub fn from_hex(s: &str) -> Result<Self, A11yError> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(A11yError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| A11yError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse hex or computed-style `rgb(r, g, b)` / `rgba(r, g, b, a)`.
    /// Alpha is ignored.
    pub fn parse(s: &str) -> Result<Self, A11yError> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));

        let Some(args) = args else {
            return Self::from_hex(trimmed);
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() < 3 || parts.len() > 4 {
            return Err(A11yError::InvalidColor(s.to_string()));
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            let value: f64 = part
                .parse()
                .map_err(|_| A11yError::InvalidColor(s.to_string()))?;
            if !(0.0..=255.0).contains(&value) {
                return Err(A11yError::InvalidColor(s.to_string()));
            }
            *slot = value.round() as u8;
        }
        Ok(Self::new(channels[0], channels[1], channels[2]))
    }

    /// WCAG relative luminance in [0, 1]
    pub fn relative_luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// WCAG conformance level for normal-size text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComplianceLevel {
    Fail,
    Aa,
    Aaa,
}

/// Contrast query result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastResult {
    pub ratio: f64,
    pub passes_aa_normal_text: bool,
    pub passes_aa_large_text: bool,
    pub passes_aaa: bool,
    pub level: ComplianceLevel,
}

impl ContrastResult {
    pub fn from_ratio(ratio: f64) -> Self {
        Self {
            ratio,
            passes_aa_normal_text: ContrastChecker::meets_aa(ratio, false),
            passes_aa_large_text: ContrastChecker::meets_aa(ratio, true),
            passes_aaa: ContrastChecker::meets_aaa(ratio),
            level: ContrastChecker::classify(ratio),
        }
    }
}

/// Contrast checker
#[derive(Debug)]
pub struct ContrastChecker;

impl ContrastChecker {
    /// Luminance of a color string; malformed input yields 0
    pub fn relative_luminance(color: &str) -> f64 {
        match Rgb::parse(color) {
            Ok(rgb) => rgb.relative_luminance(),
            Err(err) => {
                tracing::debug!("{}; treating luminance as 0", err);
                0.0
            }
        }
    }

    /// Ratio between two luminance values, lighter over darker
    pub fn ratio_of(l1: f64, l2: f64) -> f64 {
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Contrast ratio between two color strings, in [1, 21]
    pub fn contrast_ratio(fg: &str, bg: &str) -> f64 {
        Self::ratio_of(Self::relative_luminance(fg), Self::relative_luminance(bg))
    }

    /// Contrast ratio between two parsed colors
    pub fn contrast_ratio_rgb(fg: Rgb, bg: Rgb) -> f64 {
        Self::ratio_of(fg.relative_luminance(), bg.relative_luminance())
    }

    /// WCAG AA: 4.5:1 for normal text, 3:1 for large text
    pub fn meets_aa(ratio: f64, large_text: bool) -> bool {
        if large_text { ratio >= AA_LARGE_TEXT } else { ratio >= AA_NORMAL_TEXT }
    }

    /// WCAG AAA for normal text (7:1)
    pub fn meets_aaa(ratio: f64) -> bool {
        ratio >= AAA_NORMAL_TEXT
    }

    pub fn classify(ratio: f64) -> ComplianceLevel {
        if Self::meets_aaa(ratio) {
            ComplianceLevel::Aaa
        } else if Self::meets_aa(ratio, false) {
            ComplianceLevel::Aa
        } else {
            ComplianceLevel::Fail
        }
    }

    pub fn evaluate(fg: &str, bg: &str) -> ContrastResult {
        ContrastResult::from_ratio(Self::contrast_ratio(fg, bg))
    }
}
