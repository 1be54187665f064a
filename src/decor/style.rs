//! Style types for decorations
//!
//! A [`StyleRecord`] is what the configuration declares: a render [`Style`],
//! the capture groups it binds to, and optional descriptive text shown by the
//! hover query.

use std::fmt;

use serde::Deserialize;

/// Terminal colors (ANSI 16-color palette plus 24-bit RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a color from its configuration name
    ///
    /// Accepts the palette names in kebab, snake or camel case
    /// (`bright-red`, `bright_red`, `brightRed`) and `#rrggbb`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(hex) = name.strip_prefix('#') {
            return parse_hex(hex);
        }

        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "default" => Some(Color::Default),
            "black" => Some(Color::Black),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "blue" => Some(Color::Blue),
            "magenta" => Some(Color::Magenta),
            "cyan" => Some(Color::Cyan),
            "white" => Some(Color::White),
            "brightblack" | "gray" | "grey" => Some(Color::BrightBlack),
            "brightred" => Some(Color::BrightRed),
            "brightgreen" => Some(Color::BrightGreen),
            "brightyellow" => Some(Color::BrightYellow),
            "brightblue" => Some(Color::BrightBlue),
            "brightmagenta" => Some(Color::BrightMagenta),
            "brightcyan" => Some(Color::BrightCyan),
            "brightwhite" => Some(Color::BrightWhite),
            _ => None,
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
    /// Reverse video (swap fg/bg)
    pub reverse: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Builder: set reverse video
    pub fn with_reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Identifies a capture group within a pattern match
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum GroupId {
    /// Positional group; 0 is the whole match
    Index(usize),
    /// Named group, `(?P<name>...)` or `(?<name>...)`
    Name(String),
}

impl GroupId {
    /// The whole-match group
    pub const WHOLE: GroupId = GroupId::Index(0);
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Index(idx) => write!(f, "{}", idx),
            GroupId::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for GroupId {
    fn from(idx: usize) -> Self {
        GroupId::Index(idx)
    }
}

impl From<&str> for GroupId {
    fn from(name: &str) -> Self {
        GroupId::Name(name.to_string())
    }
}

/// A declared visual treatment bound to capture groups
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleRecord {
    /// Groups this style decorates; empty means the whole match
    pub groups: Vec<GroupId>,
    /// Text shown by the hover query
    pub description: Option<String>,
    /// How matched text is rendered
    pub style: Style,
}

impl StyleRecord {
    /// Create a record decorating the whole match
    pub fn new(style: Style) -> Self {
        Self {
            groups: Vec::new(),
            description: None,
            style,
        }
    }

    /// Builder: bind to the given groups
    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupId>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the hover description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Groups this record binds to, defaulting to the whole match
    pub fn bound_groups(&self) -> Vec<GroupId> {
        if self.groups.is_empty() {
            vec![GroupId::WHOLE]
        } else {
            self.groups.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_default() {
        let style = Style::default();
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.bg, Color::Default);
        assert!(!style.bold);
    }

    #[test]
    fn test_style_builders() {
        let style = Style::fg(Color::Red).with_bold().with_bg(Color::Blue);
        assert_eq!(style.fg, Color::Red);
        assert_eq!(style.bg, Color::Blue);
        assert!(style.bold);
        assert!(!style.italic);
        assert_ne!(style, Style::default());
    }

    #[test]
    fn test_color_names() {
        assert_eq!(Color::from_name("red"), Some(Color::Red));
        assert_eq!(Color::from_name("Bright-Blue"), Some(Color::BrightBlue));
        assert_eq!(Color::from_name("bright_cyan"), Some(Color::BrightCyan));
        assert_eq!(Color::from_name("brightMagenta"), Some(Color::BrightMagenta));
        assert_eq!(Color::from_name("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(Color::from_name("#ff80"), None);
        assert_eq!(Color::from_name("chartreuse"), None);
    }

    #[test]
    fn test_bound_groups_default_to_whole_match() {
        let record = StyleRecord::new(Style::fg(Color::Red));
        assert_eq!(record.bound_groups(), vec![GroupId::WHOLE]);

        let record = record.with_groups([1usize, 2]);
        assert_eq!(record.bound_groups(), vec![GroupId::Index(1), GroupId::Index(2)]);
    }

    #[test]
    fn test_group_display() {
        assert_eq!(GroupId::Index(3).to_string(), "3");
        assert_eq!(GroupId::from("level").to_string(), "level");
    }
}
