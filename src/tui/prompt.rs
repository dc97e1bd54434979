use std::sync::Arc;

use super::anchor::AnchorSettings;
use super::pager::PageState;
use super::surface::Surface;
use super::util::{print_char, print_screen, string_width};
use crate::context::Context;
use crate::options::DEFAULT_PROMPT;
use crate::theme::StyleSet;

/// The query line: prefix, query with caret, and the page indicator
pub struct Prompt<C: Context> {
    ctx: Arc<C>,
    anchor: AnchorSettings,
    styles: StyleSet,
    prefix: String,
    prefix_len: usize,
}

impl<C: Context> Prompt<C> {
    /// Creates a prompt; an empty `prefix` falls back to `QUERY>`
    pub fn new(ctx: Arc<C>, anchor: AnchorSettings, styles: StyleSet, prefix: &str) -> Self {
        let prefix = if prefix.is_empty() { DEFAULT_PROMPT } else { prefix };
        Self {
            ctx,
            anchor,
            styles,
            prefix: prefix.to_string(),
            prefix_len: string_width(prefix),
        }
    }

    /// The row this prompt sits on, for a screen `height` rows tall
    pub fn row(&self, height: u16) -> u16 {
        self.anchor.position(height)
    }

    /// Draws the prompt line, without flushing
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, state: &PageState) {
        let (width, height) = surface.size();
        let y = self.anchor.position(height);
        let basic = self.styles.basic;
        let query_style = self.styles.query;

        print_screen(surface, 0, y, basic.fg, basic.bg, &self.prefix, false);

        let query: Vec<char> = self.ctx.query().chars().collect();
        let mut caret = self.ctx.caret_pos();
        if caret > query.len() {
            caret = query.len();
            self.ctx.set_caret_pos(caret);
        }

        let start = self.prefix_len as i32 + 1;
        if caret == query.len() {
            // the entire string + the caret after the string
            let qs: String = query.iter().collect();
            let x = print_screen(surface, start, y, query_style.fg, query_style.bg, &qs, false);
            let x = print_screen(
                surface,
                x,
                y,
                query_style.fg.reversed(),
                query_style.bg.reversed(),
                " ",
                false,
            );
            print_screen(surface, x, y, query_style.fg, query_style.bg, "", true);
        } else {
            // the caret is in the middle of the string
            let mut x = start;
            for (i, c) in query.iter().enumerate() {
                let (fg, bg) = if i == caret {
                    (query_style.fg.reversed(), query_style.bg.reversed())
                } else {
                    (query_style.fg, query_style.bg)
                };
                x = print_char(surface, x, y, fg, bg, *c);
            }
        }

        let indicator = format!("{} [{}/{}]", self.ctx.matcher_name(), state.page.index, state.max_page);
        let x = i32::from(width) - string_width(&indicator) as i32;
        print_screen(surface, x, y, basic.fg, basic.bg, &indicator, false);
    }
}
