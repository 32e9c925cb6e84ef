//! Bar colors for the neon theme and color string parsing.

use crate::BarState;

/// RGB triple.
pub type Rgb = (u8, u8, u8);

/// Parse a color string into an RGB tuple.
///
/// Supports:
/// - Hex: `#RGB` (expanded to `#RRGGBB`), `#RRGGBB`
/// - Basic names: black, white, red, green, blue, yellow, cyan, magenta
/// - Theme names: slate, fuchsia, rose, violet, emerald, cyan-400, teal
/// - Case-insensitive, trims whitespace
pub fn parse_color(s: &str) -> Option<Rgb> {
    let s = s.trim();
    if s.starts_with('#') {
        parse_hex(s)
    } else {
        parse_named(s)
    }
}

fn parse_hex(s: &str) -> Option<Rgb> {
    let hex = s.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        3 => Some((channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17)),
        6 => Some((channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => None,
    }
}

fn parse_named(s: &str) -> Option<Rgb> {
    match s.to_lowercase().as_str() {
        "black"    => Some((0, 0, 0)),
        "white"    => Some((255, 255, 255)),
        "red"      => Some((255, 0, 0)),
        "green"    => Some((0, 128, 0)),
        "blue"     => Some((0, 0, 255)),
        "yellow"   => Some((255, 255, 0)),
        "cyan"     => Some((0, 255, 255)),
        "magenta"  => Some((255, 0, 255)),
        "slate"    => Some((51, 65, 85)),
        "fuchsia"  => Some((217, 70, 239)),
        "rose"     => Some((244, 63, 94)),
        "violet"   => Some((167, 139, 250)),
        "emerald"  => Some((52, 211, 153)),
        "cyan-400" => Some((34, 211, 238)),
        "teal"     => Some((45, 212, 191)),
        _          => None,
    }
}

/// Color for each [`BarState`] plus the chart background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub idle: Rgb,
    pub active: Rgb,
    pub compare: Rgb,
    pub overwrite: Rgb,
    pub sorted: Rgb,
    pub background: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self::neon()
    }
}

impl Palette {
    /// Fuchsia/rose/emerald on slate.
    pub fn neon() -> Self {
        Self {
            idle: (51, 65, 85),
            active: (217, 70, 239),
            compare: (244, 63, 94),
            overwrite: (167, 139, 250),
            sorted: (52, 211, 153),
            background: (15, 23, 42),
        }
    }

    /// Color used to draw a bar in `state`.
    #[inline]
    pub fn bar_color(&self, state: BarState) -> Rgb {
        match state {
            BarState::Idle => self.idle,
            BarState::Active => self.active,
            BarState::Compare => self.compare,
            BarState::Overwrite => self.overwrite,
            BarState::Sorted => self.sorted,
        }
    }

    /// CSS `rgb(r,g,b)` string for a bar in `state`.
    pub fn bar_css(&self, state: BarState) -> String {
        css(self.bar_color(state))
    }

    /// CSS `rgb(r,g,b)` string for the background.
    pub fn background_css(&self) -> String {
        css(self.background)
    }
}

fn css((r, g, b): Rgb) -> String {
    format!("rgb({r},{g},{b})")
}
