use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use unicode_segmentation::UnicodeSegmentation;

use super::anchor::AnchorSettings;
use super::surface::{SharedSurface, Surface};
use super::util::{print_screen, string_width};
use crate::theme::StyleSet;

/// Transient, right-aligned status message.
///
/// A message printed with a non-zero delay clears itself after that delay.
/// At most one clear is ever pending: printing anything cancels the previous
/// one before a new one is armed.
pub struct StatusBar<S> {
    surface: SharedSurface<S>,
    anchor: AnchorSettings,
    styles: StyleSet,
    // Held across every status draw and expiry, so a timer can only clear
    // the message it was armed for.
    pending_clear: Arc<Mutex<Option<CancellationToken>>>,
}

impl<S> Clone for StatusBar<S> {
    fn clone(&self) -> Self {
        Self {
            surface: self.surface.clone(),
            anchor: self.anchor,
            styles: self.styles,
            pending_clear: self.pending_clear.clone(),
        }
    }
}

fn stop_timer(pending: &mut Option<CancellationToken>) {
    if let Some(token) = pending.take() {
        trace!("Cancelling pending status clear");
        token.cancel();
    }
}

impl<S: Surface + 'static> StatusBar<S> {
    /// Creates a status bar drawing on `surface`
    pub fn new(surface: SharedSurface<S>, anchor: AnchorSettings, styles: StyleSet) -> Self {
        Self {
            surface,
            anchor,
            styles,
            pending_clear: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending_clear.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether an automatic clear is armed
    pub fn has_pending_clear(&self) -> bool {
        self.lock_pending().is_some()
    }

    /// Prints a new status message, replacing any pending automatic clear.
    ///
    /// A non-zero `clear_delay` arms a clear after that delay. Arming needs a
    /// tokio runtime; without one the message simply stays.
    pub fn print_status(&self, msg: &str, clear_delay: Duration) {
        let mut pending = self.lock_pending();
        stop_timer(&mut pending);
        self.draw(msg);

        if !clear_delay.is_zero() {
            *pending = self.schedule_clear(clear_delay);
        }
    }

    fn draw(&self, msg: &str) {
        let mut surface = self.surface.lock();
        self.render(&mut *surface, msg);
        if let Err(e) = surface.flush() {
            debug!("Failed to flush status message: {e}");
        }
    }

    /// Draws `msg` right-aligned on the status row, without flushing.
    ///
    /// Messages wider than the screen lose grapheme clusters from the front.
    pub fn render(&self, surface: &mut S, msg: &str) {
        let (w, height) = surface.size();
        let w = usize::from(w);
        let y = self.anchor.position(height);

        let mut msg = msg;
        let mut width = string_width(msg);
        while width > w {
            let Some(g) = msg.graphemes(true).next() else {
                break;
            };
            width -= string_width(g);
            msg = &msg[g.len()..];
        }

        let basic = self.styles.basic;
        if w > width {
            let pad = " ".repeat(w - width);
            print_screen(surface, 0, y, basic.fg, basic.bg, pad, false);
        }

        if width > 0 {
            print_screen(
                surface,
                (w - width) as i32,
                y,
                basic.fg.reversed().bold(),
                basic.bg.reversed(),
                msg,
                false,
            );
        }
    }

    fn schedule_clear(&self, delay: Duration) -> Option<CancellationToken> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, status message will not be cleared");
            return None;
        };

        let token = CancellationToken::new();
        let armed = token.clone();
        let bar = self.clone();
        trace!("Clearing status in {delay:?}");
        handle.spawn(async move {
            tokio::select! {
                biased;
                _ = armed.cancelled() => {}
                _ = tokio::time::sleep(delay) => bar.expire(&armed),
            }
        });
        Some(token)
    }

    fn expire(&self, token: &CancellationToken) {
        let mut pending = self.lock_pending();
        // tokens are only cancelled under this lock
        if token.is_cancelled() {
            return;
        }
        pending.take();
        self.draw("");
    }
}

#[cfg(test)]
mod tests {
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::style::Modifier;

    use super::*;
    use crate::tui::anchor::Anchor;

    fn row(surface: &SharedSurface<Buffer>, y: u16) -> String {
        let buf = surface.lock();
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn setup(width: u16) -> (StatusBar<Buffer>, SharedSurface<Buffer>) {
        let surface = SharedSurface::new(Buffer::empty(Rect::new(0, 0, width, 3)));
        let bar = StatusBar::new(surface.clone(), AnchorSettings::new(Anchor::Bottom, 0), StyleSet::default());
        (bar, surface)
    }

    #[test]
    fn message_is_right_aligned_and_reversed() {
        let (bar, surface) = setup(10);
        bar.print_status("hi", Duration::ZERO);
        assert_eq!(row(&surface, 2), "        hi");
        let buf = surface.lock();
        assert!(buf[(8, 2)].modifier.contains(Modifier::REVERSED | Modifier::BOLD));
        assert!(!buf[(7, 2)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn long_message_loses_its_front() {
        let (bar, surface) = setup(5);
        bar.print_status("abcdefgh", Duration::ZERO);
        assert_eq!(row(&surface, 2), "defgh");
    }

    #[test]
    fn long_wide_message_is_cut_by_display_width() {
        let (bar, surface) = setup(5);
        bar.print_status("日本語です", Duration::ZERO);
        // "です" is 4 cells wide and gets one cell of padding
        assert_eq!(surface.lock()[(1, 2)].symbol(), "で");
        assert_eq!(surface.lock()[(3, 2)].symbol(), "す");
        assert_eq!(row(&surface, 2), " で す ");
        assert!(!bar.has_pending_clear());
    }

    #[test]
    fn empty_message_blanks_the_row() {
        let (bar, surface) = setup(6);
        bar.print_status("status", Duration::ZERO);
        bar.print_status("", Duration::ZERO);
        assert_eq!(row(&surface, 2), "      ");
    }

    #[test]
    fn delay_without_runtime_arms_nothing() {
        let (bar, surface) = setup(6);
        bar.print_status("x", Duration::from_millis(10));
        assert!(!bar.has_pending_clear());
        assert_eq!(row(&surface, 2), "     x");
    }

    #[tokio::test(start_paused = true)]
    async fn message_clears_after_delay() {
        let (bar, surface) = setup(6);
        bar.print_status("x", Duration::from_millis(100));
        assert!(bar.has_pending_clear());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(row(&surface, 2), "     x");

        tokio::time::sleep(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert_eq!(row(&surface, 2), "      ");
        assert!(!bar.has_pending_clear());
    }

    #[tokio::test(start_paused = true)]
    async fn new_message_cancels_pending_clear() {
        let (bar, surface) = setup(6);
        bar.print_status("x", Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(50)).await;
        bar.print_status("y", Duration::ZERO);
        assert!(!bar.has_pending_clear());

        tokio::time::sleep(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert_eq!(row(&surface, 2), "     y");
    }

    #[tokio::test(start_paused = true)]
    async fn message_printed_as_timer_fires_survives() {
        let (bar, surface) = setup(6);
        for _ in 0..200 {
            bar.print_status("a", Duration::from_millis(100));
            tokio::time::sleep(Duration::from_millis(100)).await;
            bar.print_status("b", Duration::from_millis(100));
            tokio::task::yield_now().await;
            assert_eq!(row(&surface, 2), "     b");
            assert!(bar.has_pending_clear());
        }

        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(row(&surface, 2), "      ");
        assert!(!bar.has_pending_clear());
    }

    #[test]
    fn truncation_keeps_graphemes_whole() {
        let (bar, surface) = setup(3);
        bar.print_status("abe\u{301}x", Duration::ZERO);
        assert_eq!(row(&surface, 2), "be\u{301}x");
    }

    #[tokio::test(start_paused = true)]
    async fn only_latest_clear_is_armed() {
        let (bar, surface) = setup(6);
        bar.print_status("a", Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(80)).await;
        bar.print_status("b", Duration::from_millis(100));

        // the first timer would have fired here
        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        assert_eq!(row(&surface, 2), "     b");
        assert!(bar.has_pending_clear());

        tokio::time::sleep(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert_eq!(row(&surface, 2), "      ");
    }
}
