use std::sync::Arc;

use super::anchor::AnchorSettings;
use super::pager::PageState;
use super::surface::Surface;
use super::util::{bytes_width, merge_attribute, print_screen};
use crate::context::Context;
use crate::item::Match;
use crate::theme::{StylePair, StyleSet};

/// The area where one page of candidate lines is displayed
pub struct ListArea<C: Context> {
    ctx: Arc<C>,
    anchor: AnchorSettings,
    styles: StyleSet,
    sort_top_down: bool,
}

impl<C: Context> ListArea<C> {
    /// Creates a list area. With `sort_top_down` rows grow downwards from the
    /// anchor, otherwise upwards.
    pub fn new(ctx: Arc<C>, anchor: AnchorSettings, styles: StyleSet, sort_top_down: bool) -> Self {
        Self {
            ctx,
            anchor,
            styles,
            sort_top_down,
        }
    }

    /// Whether rows grow downwards from the anchor
    pub fn is_top_down(&self) -> bool {
        self.sort_top_down
    }

    fn row_style(&self, idx: usize, state: &PageState) -> StylePair {
        let line = idx + 1;
        if line == state.current_line {
            self.styles.selected
        } else if self.ctx.selection_has(line) || self.ctx.selected_range_has(line) {
            self.styles.saved_selection
        } else {
            self.styles.basic
        }
    }

    /// Draws the page described by `state`, without flushing
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, targets: &[Match], per_page: usize, state: &PageState) {
        let (_, height) = surface.size();
        let start = i32::from(self.anchor.position(height));
        let offset = state.page.offset;

        for n in 0..per_page {
            let target_idx = offset + n;
            let Some(target) = targets.get(target_idx) else {
                break;
            };

            let y = if self.sort_top_down {
                start + n as i32
            } else {
                start - n as i32
            };
            let Ok(y) = u16::try_from(y) else {
                break;
            };

            let style = self.row_style(target_idx, state);
            self.render_line(surface, y, style, target);
        }
    }

    fn render_line<S: Surface + ?Sized>(&self, surface: &mut S, y: u16, style: StylePair, target: &Match) {
        let line = target.line().as_bytes();
        let matches = target.indices();
        if matches.is_empty() {
            print_screen(surface, 0, y, style.fg, style.bg, line, true);
            return;
        }

        let matched = self.styles.matched;
        let mut prev = 0;
        let mut index = 0;
        for m in matches {
            let end = m.end.min(line.len());
            let begin = m.start.min(end).max(index);
            if begin > index {
                let c = &line[index..begin];
                print_screen(surface, prev, y, style.fg, style.bg, c, false);
                prev += bytes_width(c) as i32;
                index = begin;
            }
            let c = &line[begin..end.max(begin)];
            print_screen(
                surface,
                prev,
                y,
                matched.fg,
                merge_attribute(style.bg, matched.bg),
                c,
                true,
            );
            prev += bytes_width(c) as i32;
            index = index.max(end);
        }

        if line.len() > index {
            print_screen(surface, prev, y, style.fg, style.bg, &line[index..], true);
        }
    }
}
