use ratatui::style::Color;
use unicode_display_width::{is_double_width, width as display_width};
use unicode_segmentation::UnicodeSegmentation;

use super::surface::Surface;
use crate::theme::Attr;

/// Glyph drawn in place of bytes that are not valid UTF-8
pub const REPLACEMENT_GLYPH: char = '?';

// Directly taken from https://docs.rs/unicode-display-width/0.3.0/src/unicode_display_width/lib.rs.html#77-81
/// Display width of a single char, in cells
#[inline]
pub fn char_display_width(c: char) -> usize {
    if c == '\u{FE0F}' || is_double_width(c) {
        return 2;
    }
    1
}

/// Display width of a string, in cells, counted per grapheme cluster
pub fn string_width(s: &str) -> usize {
    display_width(s) as usize
}

/// Display width of raw bytes, counting each invalid sequence as one cell
pub fn bytes_width(bytes: &[u8]) -> usize {
    bytes
        .utf8_chunks()
        .map(|chunk| string_width(chunk.valid()) + usize::from(!chunk.invalid().is_empty()))
        .sum()
}

/// Writes one glyph at column `x` of row `y` and returns the column after it.
///
/// Columns left of the screen are skipped but still advance the column.
pub fn print_char<S: Surface + ?Sized>(surface: &mut S, x: i32, y: u16, fg: Attr, bg: Attr, c: char) -> i32 {
    if let Ok(col) = u16::try_from(x) {
        surface.set_cell(col, y, c, fg, bg);
    }
    x + char_display_width(c) as i32
}

fn print_grapheme<S: Surface + ?Sized>(surface: &mut S, x: i32, y: u16, fg: Attr, bg: Attr, g: &str) -> i32 {
    if let Ok(col) = u16::try_from(x) {
        surface.set_symbol(col, y, g, fg, bg);
    }
    x + string_width(g) as i32
}

/// Writes `text` starting at column `x` of row `y` and returns the column after it.
///
/// Every grapheme cluster takes one cell and advances the column by its
/// display width, so the result agrees with [`string_width`]. Invalid UTF-8 shows
/// up as [`REPLACEMENT_GLYPH`]. Columns left of the screen are skipped, so a
/// right-aligned string wider than the screen keeps its tail. With `fill`,
/// the rest of the row is blanked with `fg`/`bg`.
pub fn print_screen<S: Surface + ?Sized>(
    surface: &mut S,
    mut x: i32,
    y: u16,
    fg: Attr,
    bg: Attr,
    text: impl AsRef<[u8]>,
    fill: bool,
) -> i32 {
    for chunk in text.as_ref().utf8_chunks() {
        for g in chunk.valid().graphemes(true) {
            x = print_grapheme(surface, x, y, fg, bg, g);
        }
        if !chunk.invalid().is_empty() {
            x = print_char(surface, x, y, fg, bg, REPLACEMENT_GLYPH);
        }
    }

    if fill {
        let (width, _) = surface.size();
        for col in x.max(0)..i32::from(width) {
            // col is within 0..width here
            surface.set_cell(col as u16, y, ' ', fg, bg);
        }
    }
    x
}

/// ANSI palette slot of a color, when it has one
fn palette_index(color: Color) -> Option<u8> {
    let index = match color {
        Color::Black => 0,
        Color::Red => 1,
        Color::Green => 2,
        Color::Yellow => 3,
        Color::Blue => 4,
        Color::Magenta => 5,
        Color::Cyan => 6,
        Color::Gray => 7,
        Color::DarkGray => 8,
        Color::LightRed => 9,
        Color::LightGreen => 10,
        Color::LightYellow => 11,
        Color::LightBlue => 12,
        Color::LightMagenta => 13,
        Color::LightCyan => 14,
        Color::White => 15,
        Color::Indexed(i) => i,
        Color::Reset | Color::Rgb(..) => return None,
    };
    Some(index)
}

/// Layers attribute `b` over attribute `a`.
///
/// When either side has no color the one that is set passes through. Two
/// palette colors are combined bitwise, the way a highlight overlays a base
/// color. A true-color `b` simply wins. Modifiers of both sides are kept.
pub fn merge_attribute(a: Attr, b: Attr) -> Attr {
    let modifier = a.modifier | b.modifier;
    if !a.has_color() || !b.has_color() {
        let color = if b.has_color() { b.color } else { a.color };
        return Attr { color, modifier };
    }
    let color = match (palette_index(a.color), palette_index(b.color)) {
        (Some(ia), Some(ib)) => Color::Indexed(ia | ib),
        _ => b.color,
    };
    Attr { color, modifier }
}
