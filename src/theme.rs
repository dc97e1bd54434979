//! Handle the color theme
use std::sync::LazyLock;

use ratatui::style::{Color, Modifier};

use crate::options::LayoutOptions;

/// Theme used when nothing else is configured
pub static DEFAULT_THEME: LazyLock<StyleSet> = LazyLock::new(StyleSet::default16);

/// One side of a cell's appearance: a color plus display modifiers.
///
/// `Color::Reset` stands for "no color selected", in which case the
/// terminal default shows through.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Attr {
    /// Palette color, `Color::Reset` when unset
    pub color: Color,
    /// Bold, reverse, underline and friends
    pub modifier: Modifier,
}

impl Attr {
    /// An attribute with a color and no modifiers
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            modifier: Modifier::empty(),
        }
    }

    /// Returns a copy with `modifier` added
    pub fn add_modifier(self, modifier: Modifier) -> Self {
        Self {
            modifier: self.modifier | modifier,
            ..self
        }
    }

    /// Returns a copy with the reverse-video modifier added
    pub fn reversed(self) -> Self {
        self.add_modifier(Modifier::REVERSED)
    }

    /// Returns a copy with the bold modifier added
    pub fn bold(self) -> Self {
        self.add_modifier(Modifier::BOLD)
    }

    /// Whether a color was selected for this attribute
    pub fn has_color(&self) -> bool {
        self.color != Color::Reset
    }
}

impl From<Color> for Attr {
    fn from(value: Color) -> Self {
        Self::new(value)
    }
}

/// Foreground and background attributes for one role
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StylePair {
    /// Foreground
    pub fg: Attr,
    /// Background
    pub bg: Attr,
}

impl StylePair {
    /// Builds a pair from its two sides
    pub const fn new(fg: Attr, bg: Attr) -> Self {
        Self { fg, bg }
    }
}

/// The color scheme of the selector
///
/// <pre>
/// +---------------------+
/// | QUERY> abc  IC [1/3]|  --> query (prefix and indicator use basic)
/// |  normal line        |  --> basic & matched
/// |  current line       |  --> selected & matched
/// |  saved line         |  --> saved_selection & matched
/// |          status text|  --> basic, reversed
/// +---------------------+
/// </pre>
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSet {
    /// Plain lines, prompt prefix, page indicator and status padding
    pub basic: StylePair,
    /// Query text
    pub query: StylePair,
    /// Matched portions of a line
    pub matched: StylePair,
    /// The line under the cursor
    pub selected: StylePair,
    /// Lines the user has marked
    pub saved_selection: StylePair,
}

impl StyleSet {
    /// Setup the styles from the layout options
    pub fn init_from_options(options: &LayoutOptions) -> StyleSet {
        if let Some(color) = options.color.as_deref() {
            StyleSet::from_spec(color)
        } else {
            // Check for NO_COLOR environment variable
            match std::env::var_os("NO_COLOR") {
                Some(no_color) if !no_color.is_empty() => StyleSet::none(),
                _ => *DEFAULT_THEME,
            }
        }
    }

    /// No colors at all; current and saved lines are told apart by modifiers
    pub fn none() -> Self {
        Self {
            selected: StylePair::new(Attr::default().add_modifier(Modifier::UNDERLINED), Attr::default()),
            saved_selection: StylePair::new(Attr::default().bold(), Attr::default()),
            ..StyleSet::default()
        }
    }

    /// Black and white, with reverse video for the current line
    pub fn bw() -> Self {
        let base = StyleSet::none();
        StyleSet {
            matched: StylePair::new(Attr::default().add_modifier(Modifier::UNDERLINED), Attr::default()),
            selected: StylePair::new(Attr::default().reversed(), Attr::default()),
            ..base
        }
    }

    /// 16-color defaults
    pub fn default16() -> Self {
        let base = StyleSet::none();
        StyleSet {
            matched: StylePair::new(Attr::new(Color::Cyan), Attr::default()),
            selected: StylePair::new(
                Attr::default().add_modifier(Modifier::UNDERLINED),
                Attr::new(Color::Magenta),
            ),
            saved_selection: StylePair::new(Attr::new(Color::Black).bold(), Attr::new(Color::Cyan)),
            ..base
        }
    }

    /// Builds a style set from a comma separated list of `role:word+word` entries.
    ///
    /// A bare word selects a preset (`default`, `none`, `bw`). Unknown roles
    /// and words are ignored.
    pub fn from_spec(spec: &str) -> Self {
        let mut styles = StyleSet::default16();
        for pair in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((name, words)) = pair.split_once(':') {
                styles.set_style(name, words);
            } else {
                styles = match pair {
                    "none" | "empty" => StyleSet::none(),
                    "bw" => StyleSet::bw(),
                    "16" | "default" => StyleSet::default16(),
                    t => {
                        debug!("Unknown color theme '{t}'");
                        StyleSet::default16()
                    }
                };
            }
        }
        styles
    }

    fn set_style(&mut self, name: &str, words: &str) {
        let target = match name {
            "basic" | "normal" => &mut self.basic,
            "query" => &mut self.query,
            "matched" | "hl" => &mut self.matched,
            "selected" | "current" => &mut self.selected,
            "saved" | "saved_selection" | "marker" => &mut self.saved_selection,
            n => {
                debug!("Unknown style role '{n}'");
                return;
            }
        };

        let mut pair = StylePair::default();
        for word in words.split('+').filter(|w| !w.is_empty()) {
            if let Some(bg) = word.strip_prefix("on_") {
                match parse_color(bg) {
                    Some(color) => pair.bg.color = color,
                    None => debug!("Unknown background color '{bg}'"),
                }
            } else if let Some(modifier) = parse_modifier(word) {
                pair.fg.modifier |= modifier;
            } else if let Some(color) = parse_color(word) {
                pair.fg.color = color;
            } else {
                debug!("Unknown style word '{word}'");
            }
        }
        *target = pair;
    }
}

fn parse_modifier(word: &str) -> Option<Modifier> {
    match word {
        "b" | "bold" => Some(Modifier::BOLD),
        "u" | "underline" | "underlined" => Some(Modifier::UNDERLINED),
        "r" | "reverse" => Some(Modifier::REVERSED),
        "d" | "dim" => Some(Modifier::DIM),
        "i" | "italic" => Some(Modifier::ITALIC),
        _ => None,
    }
}

fn parse_color(word: &str) -> Option<Color> {
    let color = match word {
        "default" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        hex if hex.len() == 7 && hex.starts_with('#') => {
            let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
            let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
            let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
            Color::Rgb(r, g, b)
        }
        n => Color::Indexed(n.parse::<u8>().ok()?),
    };
    Some(color)
}
