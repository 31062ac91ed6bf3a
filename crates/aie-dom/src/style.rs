//! Inline style declarations
//!
//! Only `property: value` pairs from the `style` attribute are modelled;
//! there is no cascade beyond ancestor inheritance done by `Document`.

use crate::Color;

/// Parsed `style="..."` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse `prop: value; prop: value`. Malformed declarations are skipped.
    pub fn parse(source: &str) -> Self {
        let declarations = source
            .split(';')
            .filter_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                let prop = prop.trim().to_ascii_lowercase();
                let value = value.trim();
                if prop.is_empty() || value.is_empty() {
                    return None;
                }
                Some((prop, value.to_string()))
            })
            .collect();
        Self { declarations }
    }

    /// Last declared value of a property
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Resolved background color, accepting the `background` shorthand.
    /// Transparent or unresolvable values yield `None`.
    pub fn background_color(&self) -> Option<Color> {
        let color = match self.get("background-color") {
            Some(value) => Color::parse(value),
            None => self.get("background").and_then(Color::find_in_shorthand),
        };
        color.filter(|c| !c.is_transparent())
    }

    /// Resolved text color; unresolvable values yield `None`
    pub fn color(&self) -> Option<Color> {
        self.get("color").and_then(Color::parse)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let style = InlineStyle::parse("color: #777777; BACKGROUND-COLOR:#fff ;broken; :x");
        assert_eq!(style.get("color"), Some("#777777"));
        assert_eq!(style.color(), Some(Color::rgb(0x77, 0x77, 0x77)));
        assert_eq!(style.background_color(), Some(Color::WHITE));
    }

    #[test]
    fn test_named_and_shorthand_colors() {
        let style = InlineStyle::parse("color: white; background: navy url(stars.png) repeat");
        assert_eq!(style.color(), Some(Color::WHITE));
        assert_eq!(style.background_color(), Some(Color::rgb(0, 0, 128)));
        assert_eq!(InlineStyle::parse("color: bogus").color(), None);
    }

    #[test]
    fn test_transparent_background_ignored() {
        assert_eq!(InlineStyle::parse("background: transparent").background_color(), None);
        assert_eq!(InlineStyle::parse("background: none").background_color(), None);
        assert_eq!(InlineStyle::parse("background-color: rgba(0, 0, 0, 0)").background_color(), None);
        assert_eq!(InlineStyle::parse("background: rgb(0, 0, 0)").background_color(), Some(Color::BLACK));
        assert!(InlineStyle::parse("").is_empty());
    }

    #[test]
    fn test_last_declaration_wins() {
        let style = InlineStyle::parse("color: red; color: #000000");
        assert_eq!(style.color(), Some(Color::BLACK));
    }
}
