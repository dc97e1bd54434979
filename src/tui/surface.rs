use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ratatui::backend::Backend;
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::Style;

use super::SurfaceError;
use crate::theme::Attr;

/// A grid of character cells the layout draws on.
///
/// Coordinates are 0-based. Writes outside the grid are ignored.
pub trait Surface: Send {
    /// Width and height in cells
    fn size(&self) -> (u16, u16);
    /// Writes one glyph
    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Attr, bg: Attr);
    /// Writes one grapheme cluster. Surfaces holding a single char per cell
    /// keep its first char.
    fn set_symbol(&mut self, x: u16, y: u16, symbol: &str, fg: Attr, bg: Attr) {
        if let Some(ch) = symbol.chars().next() {
            self.set_cell(x, y, ch, fg, bg);
        }
    }
    /// Picks up a size change of the underlying device
    fn refresh_size(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
    /// Blanks every cell with the given attributes
    fn clear(&mut self, fg: Attr, bg: Attr) -> Result<(), SurfaceError>;
    /// Pushes pending writes to the device
    fn flush(&mut self) -> Result<(), SurfaceError>;
}

fn paint(cell: &mut Cell, symbol: &str, fg: Attr, bg: Attr) {
    cell.reset();
    cell.set_symbol(symbol).set_style(
        Style::default()
            .fg(fg.color)
            .bg(bg.color)
            .add_modifier(fg.modifier | bg.modifier),
    );
}

fn clear_buffer(buf: &mut Buffer, fg: Attr, bg: Attr) {
    for cell in buf.content.iter_mut() {
        paint(cell, " ", fg, bg);
    }
}

/// Headless surface: drawing lands in the buffer and flushing is a no-op
impl Surface for Buffer {
    fn size(&self) -> (u16, u16) {
        (self.area.width, self.area.height)
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Attr, bg: Attr) {
        Surface::set_symbol(self, x, y, ch.encode_utf8(&mut [0; 4]), fg, bg);
    }

    fn set_symbol(&mut self, x: u16, y: u16, symbol: &str, fg: Attr, bg: Attr) {
        let pos = (self.area.x.saturating_add(x), self.area.y.saturating_add(y));
        if let Some(cell) = self.cell_mut(pos) {
            paint(cell, symbol, fg, bg);
        }
    }

    fn clear(&mut self, fg: Attr, bg: Attr) -> Result<(), SurfaceError> {
        clear_buffer(self, fg, bg);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

fn backend_error<E: std::fmt::Display>(err: E) -> SurfaceError {
    SurfaceError::Backend(err.to_string())
}

/// Double-buffered surface over a ratatui backend.
///
/// Cells are written to a front buffer; `flush` sends only the cells that
/// changed since the previous flush. `clear` picks up terminal resizes.
pub struct TerminalSurface<B: Backend> {
    backend: B,
    front: Buffer,
    back: Buffer,
}

impl<B: Backend> TerminalSurface<B> {
    /// Wraps `backend`, sizing the buffers after the terminal
    pub fn new(backend: B) -> Result<Self, SurfaceError> {
        let size = backend.size().map_err(backend_error)?;
        let area = Rect::new(0, 0, size.width, size.height);
        Ok(Self {
            backend,
            front: Buffer::empty(area),
            back: Buffer::empty(area),
        })
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The wrapped backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Cells as they will look after the next flush
    pub fn buffer(&self) -> &Buffer {
        &self.front
    }

    fn autoresize(&mut self) -> Result<(), SurfaceError> {
        let size = self.backend.size().map_err(backend_error)?;
        let area = Rect::new(0, 0, size.width, size.height);
        if area != self.front.area {
            debug!("Terminal resized to {}x{}", size.width, size.height);
            self.front.resize(area);
            self.back = Buffer::empty(area);
            self.backend.clear().map_err(backend_error)?;
        }
        Ok(())
    }
}

impl<B: Backend + Send> Surface for TerminalSurface<B> {
    fn size(&self) -> (u16, u16) {
        (self.front.area.width, self.front.area.height)
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Attr, bg: Attr) {
        Surface::set_symbol(self, x, y, ch.encode_utf8(&mut [0; 4]), fg, bg);
    }

    fn set_symbol(&mut self, x: u16, y: u16, symbol: &str, fg: Attr, bg: Attr) {
        if let Some(cell) = self.front.cell_mut((x, y)) {
            paint(cell, symbol, fg, bg);
        }
    }

    fn refresh_size(&mut self) -> Result<(), SurfaceError> {
        self.autoresize()
    }

    fn clear(&mut self, fg: Attr, bg: Attr) -> Result<(), SurfaceError> {
        self.autoresize()?;
        clear_buffer(&mut self.front, fg, bg);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        let updates = self.back.diff(&self.front);
        self.backend.draw(updates.into_iter()).map_err(backend_error)?;
        self.backend.flush().map_err(backend_error)?;
        self.back.clone_from(&self.front);
        Ok(())
    }
}

/// A surface shared between the render path and the status timer.
///
/// Every draw path holds the lock across its writes and the flush that
/// follows them, so the two never interleave on screen.
pub struct SharedSurface<S>(Arc<Mutex<S>>);

impl<S> SharedSurface<S> {
    /// Shares `surface`
    pub fn new(surface: S) -> Self {
        Self(Arc::new(Mutex::new(surface)))
    }

    /// Locks the surface. A panic while drawing does not poison it for good.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Clone for SharedSurface<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
