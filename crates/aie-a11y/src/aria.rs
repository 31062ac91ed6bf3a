//! ARIA Support
//!
//! The subset of ARIA roles and relations the engine reasons about.

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    // Widget roles
    Button,
    Checkbox,
    Combobox,
    Link,
    MenuItem,
    MenuItemCheckbox,
    MenuItemRadio,
    Option,
    Radio,
    ScrollBar,
    SearchBox,
    Slider,
    SpinButton,
    Switch,
    Tab,
    TextBox,
    TreeItem,

    // Live region roles
    Alert,
    Log,
    Status,
    Timer,

    // Containers
    Dialog,
    AlertDialog,
    Presentation,
}

impl AriaRole {
    /// Parse from a `role` attribute (first recognised token wins)
    pub fn parse(s: &str) -> Option<Self> {
        s.split_whitespace().find_map(Self::parse_token)
    }

    fn parse_token(token: &str) -> Option<Self> {
        Some(match token.to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "checkbox" => Self::Checkbox,
            "combobox" => Self::Combobox,
            "link" => Self::Link,
            "menuitem" => Self::MenuItem,
            "menuitemcheckbox" => Self::MenuItemCheckbox,
            "menuitemradio" => Self::MenuItemRadio,
            "option" => Self::Option,
            "radio" => Self::Radio,
            "scrollbar" => Self::ScrollBar,
            "searchbox" => Self::SearchBox,
            "slider" => Self::Slider,
            "spinbutton" => Self::SpinButton,
            "switch" => Self::Switch,
            "tab" => Self::Tab,
            "textbox" => Self::TextBox,
            "treeitem" => Self::TreeItem,
            "alert" => Self::Alert,
            "log" => Self::Log,
            "status" => Self::Status,
            "timer" => Self::Timer,
            "dialog" => Self::Dialog,
            "alertdialog" => Self::AlertDialog,
            "none" | "presentation" => Self::Presentation,
            _ => return None,
        })
    }

    /// Attribute form of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Combobox => "combobox",
            Self::Link => "link",
            Self::MenuItem => "menuitem",
            Self::MenuItemCheckbox => "menuitemcheckbox",
            Self::MenuItemRadio => "menuitemradio",
            Self::Option => "option",
            Self::Radio => "radio",
            Self::ScrollBar => "scrollbar",
            Self::SearchBox => "searchbox",
            Self::Slider => "slider",
            Self::SpinButton => "spinbutton",
            Self::Switch => "switch",
            Self::Tab => "tab",
            Self::TextBox => "textbox",
            Self::TreeItem => "treeitem",
            Self::Alert => "alert",
            Self::Log => "log",
            Self::Status => "status",
            Self::Timer => "timer",
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::Presentation => "presentation",
        }
    }

    /// Interactive widget a user expects to reach by keyboard
    pub fn is_widget(&self) -> bool {
        matches!(self,
            Self::Button | Self::Checkbox | Self::Combobox | Self::Link |
            Self::MenuItem | Self::MenuItemCheckbox | Self::MenuItemRadio |
            Self::Option | Self::Radio | Self::ScrollBar | Self::SearchBox |
            Self::Slider | Self::SpinButton | Self::Switch | Self::Tab |
            Self::TextBox | Self::TreeItem
        )
    }

    /// Roles whose content changes are announced
    pub fn is_live_region(&self) -> bool {
        matches!(self, Self::Alert | Self::Log | Self::Status | Self::Timer)
    }

    /// Roles whose accessible name may come from their content
    pub fn name_from_content(&self) -> bool {
        matches!(self,
            Self::Button | Self::Checkbox | Self::Link | Self::MenuItem |
            Self::MenuItemCheckbox | Self::MenuItemRadio | Self::Option |
            Self::Radio | Self::Switch | Self::Tab | Self::TreeItem
        )
    }
}

/// ID reference attributes checked for dangling references
pub const IDREF_RELATIONS: [&str; 2] = ["aria-labelledby", "aria-describedby"];

/// Split an IDREF list (`aria-labelledby="a b"`)
pub fn idrefs(value: &str) -> impl Iterator<Item = &str> {
    value.split_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(AriaRole::parse("button"), Some(AriaRole::Button));
        assert_eq!(AriaRole::parse("SWITCH"), Some(AriaRole::Switch));
        assert_eq!(AriaRole::parse("fancy tab"), Some(AriaRole::Tab));
        assert_eq!(AriaRole::parse("navigation"), None);
        assert!(AriaRole::Button.is_widget());
        assert!(!AriaRole::Status.is_widget());
        assert!(AriaRole::Status.is_live_region());
        assert_eq!(AriaRole::parse(AriaRole::Combobox.as_str()), Some(AriaRole::Combobox));
    }

    #[test]
    fn test_idrefs() {
        let ids: Vec<_> = idrefs("  title   hint ").collect();
        assert_eq!(ids, vec!["title", "hint"]);
    }
}
