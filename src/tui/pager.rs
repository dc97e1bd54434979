use super::LayoutError;
use crate::options::LayoutType;

/// Cursor movement requested by the input handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingRequest {
    /// One line towards the top of the screen
    LineAbove,
    /// One line towards the bottom of the screen
    LineBelow,
    /// One page further down the screen
    PageDown,
    /// One page further up the screen
    PageUp,
}

/// The window of items currently visible in the list area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub index: usize,
    /// Index of the first item on this page
    pub offset: usize,
    /// Items per page
    pub size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            index: 1,
            offset: 0,
            size: 1,
        }
    }
}

/// Cursor and page window, recomputed every frame from the live item count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// 1-based position of the cursor
    pub current_line: usize,
    /// The page being displayed
    pub page: Page,
    /// Number of pages, never less than 1
    pub max_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_line: 1,
            page: Page::default(),
            max_page: 1,
        }
    }
}

impl PageState {
    /// Resolves which page shows the cursor.
    ///
    /// When the list shrank below the cursor's page, the cursor moves back one
    /// page at a time until it lands on a page that exists. With no items and
    /// an empty query there is nothing to draw and
    /// [`LayoutError::NothingToRender`] is returned.
    pub fn calculate_page(&mut self, item_count: usize, per_page: usize, query_is_empty: bool) -> Result<(), LayoutError> {
        let per_page = per_page.max(1);
        self.max_page = item_count.div_ceil(per_page).max(1);

        loop {
            let index = self.current_line.saturating_sub(1) / per_page + 1;
            self.page = Page {
                index,
                offset: (index - 1) * per_page,
                size: per_page,
            };

            if index <= self.max_page {
                return Ok(());
            }
            if item_count == 0 && query_is_empty {
                // wait for targets
                return Err(LayoutError::NothingToRender);
            }

            // index > max_page >= 1, so offset >= per_page and the next
            // iteration lands exactly one page earlier
            trace!(
                "List shrank under the cursor: line {} -> {}",
                self.current_line, self.page.offset
            );
            self.current_line = self.page.offset;
        }
    }

    /// Moves the cursor, flipping the direction in bottom-up layouts so the
    /// highlighted row moves the way the key points.
    ///
    /// Moving above the first line wraps to the end of the backing list when
    /// its length is known; moving past its end wraps to the first line.
    pub fn move_page(&mut self, request: PagingRequest, per_page: usize, layout: LayoutType, backing_len: Option<usize>) {
        let per_page = per_page as isize;
        let delta: isize = match request {
            PagingRequest::LineAbove => -1,
            PagingRequest::LineBelow => 1,
            PagingRequest::PageDown => per_page,
            PagingRequest::PageUp => -per_page,
        };
        let delta = if layout.is_top_down() { delta } else { -delta };

        let line = self.current_line as isize + delta;
        self.current_line = if line < 1 {
            // Go to last page, if possible
            backing_len.unwrap_or(1)
        } else {
            match backing_len {
                Some(len) if line as usize > len => 1,
                _ => line as usize,
            }
        };
        trace!("{request:?}: current line is now {}", self.current_line);
    }
}
