//! Application state the layout reads while drawing.
//!
//! The layout never owns the query or the selection; it reads them through
//! [`Context`] each time it draws. [`QueryContext`] is a thread-safe
//! implementation that an application can use as-is.

use std::ops::RangeInclusive;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexSet;

/// Read accessors for everything the layout needs from the application
pub trait Context: Send + Sync {
    /// The query text
    fn query(&self) -> String;
    /// Query length in characters
    fn query_len(&self) -> usize {
        self.query().chars().count()
    }
    /// Caret position, as a character index into the query
    fn caret_pos(&self) -> usize;
    /// Moves the caret; the layout uses this to clamp stray positions
    fn set_caret_pos(&self, pos: usize);
    /// Display name of the active matching strategy
    fn matcher_name(&self) -> String;
    /// Whether the 1-based `line` is in the saved selection
    fn selection_has(&self, line: usize) -> bool;
    /// Whether the 1-based `line` falls in the range being selected
    fn selected_range_has(&self, line: usize) -> bool;
    /// Length of the full backing list, when the application knows it
    fn backing_len(&self) -> Option<usize>;
}

#[derive(Debug, Default)]
struct QueryState {
    query: Vec<char>,
    caret: usize,
    matcher: String,
    selection: IndexSet<usize>,
    range_start: Option<usize>,
    range: Option<RangeInclusive<usize>>,
    backing_len: Option<usize>,
}

/// Query, caret and selection state shared between the input handler and the layout
#[derive(Debug, Default)]
pub struct QueryContext {
    state: RwLock<QueryState>,
}

impl QueryContext {
    /// Creates an empty context using the given matcher name
    pub fn new(matcher: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(QueryState {
                matcher: matcher.into(),
                ..Default::default()
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&QueryState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut QueryState) -> T) -> T {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the query and moves the caret to its end
    pub fn set_query(&self, query: &str) {
        self.write(|s| {
            s.query = query.chars().collect();
            s.caret = s.query.len();
        });
    }

    /// Inserts a character at the caret
    pub fn insert(&self, c: char) {
        self.write(|s| {
            let at = s.caret.min(s.query.len());
            s.query.insert(at, c);
            s.caret = at + 1;
        });
    }

    /// Deletes the character before the caret
    pub fn delete_backward(&self) -> Option<char> {
        self.write(|s| {
            let at = s.caret.min(s.query.len());
            if at == 0 {
                return None;
            }
            s.caret = at - 1;
            Some(s.query.remove(at - 1))
        })
    }

    /// Deletes the character under the caret
    pub fn delete_forward(&self) -> Option<char> {
        self.write(|s| {
            let at = s.caret.min(s.query.len());
            if at >= s.query.len() {
                return None;
            }
            Some(s.query.remove(at))
        })
    }

    /// Moves the caret by `offset` characters, staying inside the query
    pub fn move_caret(&self, offset: isize) {
        self.write(|s| {
            s.caret = s.caret.saturating_add_signed(offset).min(s.query.len());
        });
    }

    /// Moves the caret to the end of the query
    pub fn move_caret_to_end(&self) {
        self.write(|s| s.caret = s.query.len());
    }

    /// Sets the name shown in the page indicator
    pub fn set_matcher_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.write(|s| s.matcher = name);
    }

    /// Adds or removes a 1-based line from the saved selection
    pub fn toggle_selection(&self, line: usize) {
        self.write(|s| {
            if !s.selection.shift_remove(&line) {
                s.selection.insert(line);
            }
        });
    }

    /// The saved selection, in the order lines were picked
    pub fn selection(&self) -> Vec<usize> {
        self.read(|s| s.selection.iter().copied().collect())
    }

    /// Forgets the saved selection and any range in progress
    pub fn clear_selection(&self) {
        self.write(|s| {
            s.selection.clear();
            s.range_start = None;
            s.range = None;
        });
    }

    /// Starts a range selection anchored at `line`
    pub fn start_range(&self, line: usize) {
        self.write(|s| {
            s.range_start = Some(line);
            s.range = Some(line..=line);
        });
    }

    /// Whether a range selection is in progress
    pub fn is_range_active(&self) -> bool {
        self.read(|s| s.range_start.is_some())
    }

    /// Extends the range in progress to `line`
    pub fn extend_range(&self, line: usize) {
        self.write(|s| {
            if let Some(start) = s.range_start {
                s.range = Some(start.min(line)..=start.max(line));
            }
        });
    }

    /// Moves the range in progress into the saved selection
    pub fn end_range(&self) {
        self.write(|s| {
            if let Some(range) = s.range.take() {
                s.selection.extend(range);
            }
            s.range_start = None;
        });
    }

    /// Records the length of the full backing list
    pub fn set_backing_len(&self, len: Option<usize>) {
        self.write(|s| s.backing_len = len);
    }
}

impl Context for QueryContext {
    fn query(&self) -> String {
        self.read(|s| s.query.iter().collect())
    }

    fn query_len(&self) -> usize {
        self.read(|s| s.query.len())
    }

    fn caret_pos(&self) -> usize {
        self.read(|s| s.caret)
    }

    fn set_caret_pos(&self, pos: usize) {
        self.write(|s| s.caret = pos);
    }

    fn matcher_name(&self) -> String {
        self.read(|s| s.matcher.clone())
    }

    fn selection_has(&self, line: usize) -> bool {
        self.read(|s| s.selection.contains(&line))
    }

    fn selected_range_has(&self, line: usize) -> bool {
        self.read(|s| s.range.as_ref().is_some_and(|r| r.contains(&line)))
    }

    fn backing_len(&self) -> Option<usize> {
        self.read(|s| s.backing_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_moves_caret() {
        let ctx = QueryContext::new("IgnoreCase");
        ctx.insert('a');
        ctx.insert('c');
        ctx.move_caret(-1);
        ctx.insert('b');
        assert_eq!(ctx.query(), "abc");
        assert_eq!(ctx.caret_pos(), 2);

        assert_eq!(ctx.delete_backward(), Some('b'));
        assert_eq!(ctx.delete_forward(), Some('c'));
        assert_eq!(ctx.delete_forward(), None);
        assert_eq!(ctx.query(), "a");
        assert_eq!(ctx.caret_pos(), 1);
    }

    #[test]
    fn caret_stays_inside_query() {
        let ctx = QueryContext::new("IgnoreCase");
        ctx.set_query("日本");
        assert_eq!(ctx.query_len(), 2);
        ctx.move_caret(10);
        assert_eq!(ctx.caret_pos(), 2);
        ctx.move_caret(-10);
        assert_eq!(ctx.caret_pos(), 0);
        assert_eq!(ctx.delete_backward(), None);
    }

    #[test]
    fn toggle_selection() {
        let ctx = QueryContext::new("IgnoreCase");
        ctx.toggle_selection(3);
        ctx.toggle_selection(1);
        assert!(ctx.selection_has(3));
        assert_eq!(ctx.selection(), vec![3, 1]);
        ctx.toggle_selection(3);
        assert!(!ctx.selection_has(3));
    }

    #[test]
    fn range_selection() {
        let ctx = QueryContext::new("IgnoreCase");
        assert!(!ctx.is_range_active());
        ctx.start_range(5);
        assert!(ctx.is_range_active());
        ctx.extend_range(2);
        assert!(ctx.selected_range_has(2));
        assert!(ctx.selected_range_has(5));
        assert!(!ctx.selected_range_has(6));
        assert!(!ctx.selection_has(3));

        ctx.end_range();
        assert!(!ctx.is_range_active());
        assert!(!ctx.selected_range_has(3));
        assert!(ctx.selection_has(3));
        assert_eq!(ctx.selection().len(), 4);
    }
}
