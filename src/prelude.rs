//! Convenience re-exports of commonly used types.
//!
//! This module provides a convenient way to import the layout, its
//! collaborators and their option builders with a single
//! `use linepick::prelude::*;` statement.

pub use crate::context::{Context, QueryContext};
pub use crate::item::Match;
pub use crate::options::{LayoutOptions, LayoutOptionsBuilder, LayoutType};
pub use crate::theme::{Attr, StylePair, StyleSet};
pub use crate::tui::anchor::{Anchor, AnchorSettings};
pub use crate::tui::layout::{BasicLayout, Layout};
pub use crate::tui::pager::{Page, PageState, PagingRequest};
pub use crate::tui::surface::{SharedSurface, Surface, TerminalSurface};
pub use crate::tui::{LayoutError, SurfaceError};
