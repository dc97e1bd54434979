use std::sync::Arc;
use std::time::Duration;

use super::LayoutError;
use super::anchor::{Anchor, AnchorSettings};
use super::item_list::ListArea;
use super::pager::{Page, PageState, PagingRequest};
use super::prompt::Prompt;
use super::statusline::StatusBar;
use super::surface::{SharedSurface, Surface};
use crate::context::Context;
use crate::item::Match;
use crate::options::{LayoutOptions, LayoutType};
use crate::theme::StyleSet;

/// Rows that are not part of the list: the prompt and the status bar
const RESERVED_ROWS: u16 = 2;

/// What the event loop can ask of a layout
pub trait Layout {
    /// Shows a status message, cleared after `clear_delay` unless it is zero
    fn print_status(&self, msg: &str, clear_delay: Duration);
    /// Redraws only the prompt line
    fn draw_prompt(&mut self);
    /// Redraws the whole screen for `targets`
    fn draw_screen(&mut self, targets: &[Match]);
    /// Moves the cursor
    fn move_page(&mut self, request: PagingRequest);
}

/// The basic layout: a prompt, a list and a status bar.
///
/// The position of the components depends on the [`LayoutType`], but the set
/// of components is fixed.
pub struct BasicLayout<S: Surface, C: Context> {
    ctx: Arc<C>,
    surface: SharedSurface<S>,
    styles: StyleSet,
    layout: LayoutType,
    status: StatusBar<S>,
    prompt: Prompt<C>,
    list: ListArea<C>,
    state: PageState,
}

impl<S: Surface + 'static, C: Context> BasicLayout<S, C> {
    /// Creates the layout described by `options`
    pub fn new(options: &LayoutOptions, ctx: Arc<C>, surface: SharedSurface<S>) -> Self {
        let styles = StyleSet::init_from_options(options);
        match options.layout {
            LayoutType::TopDown => Self::top_down(ctx, surface, styles, options.prompt()),
            LayoutType::BottomUp => Self::bottom_up(ctx, surface, styles, options.prompt()),
        }
    }

    /// Prompt on the first row, items below it reading downwards
    pub fn top_down(ctx: Arc<C>, surface: SharedSurface<S>, styles: StyleSet, prompt: &str) -> Self {
        Self {
            status: StatusBar::new(surface.clone(), AnchorSettings::new(Anchor::Bottom, 0), styles),
            prompt: Prompt::new(ctx.clone(), AnchorSettings::new(Anchor::Top, 0), styles, prompt),
            list: ListArea::new(ctx.clone(), AnchorSettings::new(Anchor::Top, 1), styles, true),
            ctx,
            surface,
            styles,
            layout: LayoutType::TopDown,
            state: PageState::default(),
        }
    }

    /// Prompt above the status bar, items above it reading upwards
    pub fn bottom_up(ctx: Arc<C>, surface: SharedSurface<S>, styles: StyleSet, prompt: &str) -> Self {
        Self {
            status: StatusBar::new(surface.clone(), AnchorSettings::new(Anchor::Bottom, 0), styles),
            prompt: Prompt::new(ctx.clone(), AnchorSettings::new(Anchor::Bottom, 1), styles, prompt),
            list: ListArea::new(ctx.clone(), AnchorSettings::new(Anchor::Bottom, 2), styles, false),
            ctx,
            surface,
            styles,
            layout: LayoutType::BottomUp,
            state: PageState::default(),
        }
    }

    /// The orientation of this layout
    pub fn layout_type(&self) -> LayoutType {
        self.layout
    }

    /// 1-based position of the cursor
    pub fn current_line(&self) -> usize {
        self.state.current_line
    }

    /// Moves the cursor to a 1-based line, e.g. after the results changed
    pub fn set_current_line(&mut self, line: usize) {
        self.state.current_line = line;
    }

    /// The page shown by the last frame
    pub fn current_page(&self) -> Page {
        self.state.page
    }

    /// Number of pages in the last frame
    pub fn max_page(&self) -> usize {
        self.state.max_page
    }

    /// The status bar, for callers that want to share it
    pub fn status_bar(&self) -> &StatusBar<S> {
        &self.status
    }

    /// List rows available on the current screen
    pub fn lines_per_page(&self) -> usize {
        lines_per_page(&*self.surface.lock())
    }

    /// Calculates which page the cursor is on
    pub fn calculate_page(&mut self, targets: &[Match], per_page: usize) -> Result<(), LayoutError> {
        self.state
            .calculate_page(targets.len(), per_page, self.ctx.query_len() == 0)
    }

    fn try_draw_screen(&mut self, targets: &[Match]) -> Result<(), LayoutError> {
        let mut surface = self.surface.lock();
        surface.refresh_size()?;

        let mut state = self.state;
        if state.current_line > targets.len() && !targets.is_empty() {
            state.current_line = targets.len();
        }

        // resolve the page before touching any cell, so a dropped frame
        // leaves the previous one intact
        let per_page = lines_per_page(&*surface);
        state.calculate_page(targets.len(), per_page, self.ctx.query_len() == 0)?;

        let basic = self.styles.basic;
        surface.clear(basic.fg, basic.bg)?;
        self.prompt.render(&mut *surface, &state);
        self.list.render(&mut *surface, targets, per_page, &state);
        surface.flush()?;

        self.state = state;
        Ok(())
    }
}

fn lines_per_page<S: Surface + ?Sized>(surface: &S) -> usize {
    let (_, height) = surface.size();
    // list area is always the display area minus the prompt and status rows
    usize::from(height.saturating_sub(RESERVED_ROWS).max(1))
}

impl<S: Surface + 'static, C: Context> Layout for BasicLayout<S, C> {
    fn print_status(&self, msg: &str, clear_delay: Duration) {
        self.status.print_status(msg, clear_delay);
    }

    fn draw_prompt(&mut self) {
        let mut surface = self.surface.lock();
        self.prompt.render(&mut *surface, &self.state);
        if let Err(e) = surface.flush() {
            debug!("Dropping prompt update: {e}");
        }
    }

    /// Frames that cannot be drawn are dropped; the next call starts over
    fn draw_screen(&mut self, targets: &[Match]) {
        if let Err(e) = self.try_draw_screen(targets) {
            debug!("Dropping frame: {e}");
        }
    }

    fn move_page(&mut self, request: PagingRequest) {
        let per_page = self.lines_per_page();
        self.state
            .move_page(request, per_page, self.layout, self.ctx.backing_len());
    }
}

#[cfg(test)]
mod tests {
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::style::{Color, Modifier};

    use super::*;
    use crate::context::QueryContext;
    use crate::theme::{Attr, StylePair};
    use crate::tui::SurfaceError;

    /// A surface whose clear or flush can be made to fail
    struct FlakySurface {
        buf: Buffer,
        fail_clear: bool,
        fail_flush: bool,
        flushes: usize,
    }

    impl FlakySurface {
        fn new(width: u16, height: u16) -> Self {
            Self {
                buf: Buffer::empty(Rect::new(0, 0, width, height)),
                fail_clear: false,
                fail_flush: false,
                flushes: 0,
            }
        }
    }

    impl Surface for FlakySurface {
        fn size(&self) -> (u16, u16) {
            Surface::size(&self.buf)
        }

        fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Attr, bg: Attr) {
            Surface::set_cell(&mut self.buf, x, y, ch, fg, bg);
        }

        fn set_symbol(&mut self, x: u16, y: u16, symbol: &str, fg: Attr, bg: Attr) {
            Surface::set_symbol(&mut self.buf, x, y, symbol, fg, bg);
        }

        fn clear(&mut self, fg: Attr, bg: Attr) -> Result<(), SurfaceError> {
            if self.fail_clear {
                return Err(SurfaceError::Backend(String::from("clear failed")));
            }
            Surface::clear(&mut self.buf, fg, bg)
        }

        fn flush(&mut self) -> Result<(), SurfaceError> {
            if self.fail_flush {
                return Err(SurfaceError::Backend(String::from("flush failed")));
            }
            self.flushes += 1;
            Ok(())
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn items(n: usize) -> Vec<Match> {
        (1..=n).map(|i| Match::new(format!("item{i}"))).collect()
    }

    fn styles() -> StyleSet {
        StyleSet {
            selected: StylePair::new(Attr::default().add_modifier(Modifier::UNDERLINED), Attr::new(Color::Magenta)),
            ..StyleSet::default()
        }
    }

    fn top_down(
        width: u16,
        height: u16,
    ) -> (BasicLayout<FlakySurface, QueryContext>, SharedSurface<FlakySurface>, Arc<QueryContext>) {
        let ctx = Arc::new(QueryContext::new("IgnoreCase"));
        let surface = SharedSurface::new(FlakySurface::new(width, height));
        let layout = BasicLayout::top_down(ctx.clone(), surface.clone(), styles(), "");
        (layout, surface, ctx)
    }

    fn bottom_up(
        width: u16,
        height: u16,
    ) -> (BasicLayout<FlakySurface, QueryContext>, SharedSurface<FlakySurface>, Arc<QueryContext>) {
        let ctx = Arc::new(QueryContext::new("IgnoreCase"));
        let surface = SharedSurface::new(FlakySurface::new(width, height));
        let layout = BasicLayout::bottom_up(ctx.clone(), surface.clone(), styles(), "");
        (layout, surface, ctx)
    }

    /// Row showing the current line, found by its background
    fn highlighted_row(surface: &SharedSurface<FlakySurface>) -> Option<u16> {
        let s = surface.lock();
        (0..s.buf.area.height).find(|&y| s.buf[(0, y)].bg == Color::Magenta)
    }

    #[test]
    fn top_down_frame() {
        let (mut layout, surface, _) = top_down(30, 5);
        layout.draw_screen(&items(5));

        let s = surface.lock();
        assert!(row(&s.buf, 0).starts_with("QUERY> "));
        assert!(row(&s.buf, 0).ends_with("IgnoreCase [1/2]"));
        assert!(row(&s.buf, 1).starts_with("item1"));
        assert!(row(&s.buf, 3).starts_with("item3"));
        assert_eq!(row(&s.buf, 4).trim(), "");
        assert_eq!(s.buf[(0, 1)].bg, Color::Magenta);
        assert_eq!(s.flushes, 1);
    }

    #[test]
    fn bottom_up_frame() {
        let (mut layout, surface, _) = bottom_up(30, 5);
        layout.draw_screen(&items(5));

        let s = surface.lock();
        assert!(row(&s.buf, 3).starts_with("QUERY> "));
        assert!(row(&s.buf, 2).starts_with("item1"));
        assert!(row(&s.buf, 1).starts_with("item2"));
        assert!(row(&s.buf, 0).starts_with("item3"));
        assert_eq!(s.buf[(0, 2)].bg, Color::Magenta);
    }

    #[test]
    fn paging_to_second_page() {
        let (mut layout, surface, _) = top_down(30, 5);
        layout.set_current_line(4);
        layout.draw_screen(&items(5));

        assert_eq!(layout.current_page().index, 2);
        let s = surface.lock();
        assert!(row(&s.buf, 0).ends_with("[2/2]"));
        assert!(row(&s.buf, 1).starts_with("item4"));
        assert!(row(&s.buf, 2).starts_with("item5"));
    }

    #[test]
    fn cursor_is_clamped_to_items() {
        let (mut layout, _, _) = top_down(30, 5);
        layout.set_current_line(40);
        layout.draw_screen(&items(5));
        assert_eq!(layout.current_line(), 5);
        assert_eq!(layout.current_page().index, 2);
    }

    #[test]
    fn nothing_to_render_drops_the_frame() {
        let (mut layout, surface, _) = top_down(30, 5);
        layout.set_current_line(12);
        assert!(matches!(
            layout.try_draw_screen(&[]),
            Err(LayoutError::NothingToRender)
        ));
        layout.draw_screen(&[]);
        assert_eq!(surface.lock().flushes, 0);
    }

    #[test]
    fn dropped_frame_leaves_cells_and_cursor_alone() {
        let (mut layout, surface, _) = top_down(30, 5);
        layout.draw_screen(&items(5));
        layout.set_current_line(12);
        layout.draw_screen(&[]);

        assert_eq!(layout.current_line(), 12);
        let s = surface.lock();
        assert_eq!(s.flushes, 1);
        assert!(row(&s.buf, 1).starts_with("item1"));
        assert!(row(&s.buf, 0).starts_with("QUERY> "));
    }

    #[test]
    fn empty_results_with_query_still_draw_the_prompt() {
        let (mut layout, surface, ctx) = top_down(30, 5);
        ctx.set_query("zzz");
        layout.set_current_line(12);
        layout.draw_screen(&[]);
        let s = surface.lock();
        assert_eq!(s.flushes, 1);
        assert!(row(&s.buf, 0).starts_with("QUERY> zzz"));
    }

    #[test]
    fn surface_failures_drop_the_frame() {
        let (mut layout, surface, _) = top_down(30, 5);
        surface.lock().fail_clear = true;
        assert!(matches!(
            layout.try_draw_screen(&items(3)),
            Err(LayoutError::Surface(_))
        ));

        {
            let mut s = surface.lock();
            s.fail_clear = false;
            s.fail_flush = true;
        }
        layout.draw_screen(&items(3));
        assert_eq!(surface.lock().flushes, 0);

        surface.lock().fail_flush = false;
        layout.draw_screen(&items(3));
        assert_eq!(surface.lock().flushes, 1);
    }

    #[test]
    fn move_page_keeps_physical_direction() {
        let (mut down, down_surface, _) = top_down(30, 8);
        let (mut up, up_surface, _) = bottom_up(30, 8);
        for layout in [&mut down, &mut up] {
            layout.set_current_line(3);
            layout.draw_screen(&items(5));
        }
        let before_down = highlighted_row(&down_surface).unwrap();
        let before_up = highlighted_row(&up_surface).unwrap();

        down.move_page(PagingRequest::LineAbove);
        up.move_page(PagingRequest::LineAbove);
        assert_eq!(down.current_line(), 2);
        assert_eq!(up.current_line(), 4);

        down.draw_screen(&items(5));
        up.draw_screen(&items(5));
        assert_eq!(highlighted_row(&down_surface).unwrap(), before_down - 1);
        assert_eq!(highlighted_row(&up_surface).unwrap(), before_up - 1);
    }

    #[test]
    fn move_page_wraps_with_backing_list() {
        let (mut layout, _, ctx) = top_down(30, 5);
        ctx.set_backing_len(Some(5));
        layout.move_page(PagingRequest::LineAbove);
        assert_eq!(layout.current_line(), 5);
        layout.move_page(PagingRequest::LineBelow);
        assert_eq!(layout.current_line(), 1);
        // three list rows on a five row screen
        layout.move_page(PagingRequest::PageDown);
        assert_eq!(layout.current_line(), 4);
    }

    #[test]
    fn draw_prompt_alone() {
        let (mut layout, surface, ctx) = top_down(30, 5);
        ctx.set_query("ab");
        layout.draw_prompt();
        let s = surface.lock();
        assert!(row(&s.buf, 0).starts_with("QUERY> ab"));
        assert_eq!(s.flushes, 1);
    }

    #[test]
    fn status_shares_the_surface() {
        let (layout, surface, _) = bottom_up(10, 5);
        layout.print_status("done", Duration::ZERO);
        let s = surface.lock();
        assert_eq!(row(&s.buf, 4), "      done");
        assert_eq!(s.flushes, 1);
    }

    #[test]
    fn new_follows_options() {
        let ctx = Arc::new(QueryContext::new("IgnoreCase"));
        let surface = SharedSurface::new(Buffer::empty(Rect::new(0, 0, 30, 6)));
        let options = crate::options::LayoutOptionsBuilder::default()
            .layout(LayoutType::BottomUp)
            .prompt("pick>")
            .color("none")
            .build()
            .unwrap();
        let mut layout = BasicLayout::new(&options, ctx, surface.clone());
        assert_eq!(layout.layout_type(), LayoutType::BottomUp);
        assert_eq!(layout.lines_per_page(), 4);

        layout.draw_screen(&items(2));
        let buf = surface.lock();
        assert!(row(&buf, 4).starts_with("pick> "));
        assert!(row(&buf, 3).starts_with("item1"));
    }
}
