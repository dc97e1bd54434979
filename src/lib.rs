//! linepick is the screen-layout engine of an interactive line selector.
//!
//! Given a list of candidate lines, each optionally annotated with the byte
//! ranges a query matched, it decides what the terminal shows: a query prompt,
//! one page of candidates with highlighting, and a transient status message.
//! It keeps that view consistent as the user scrolls, types or selects.
//!
//! Drawing goes through the [`Surface`](tui::surface::Surface) trait, so the
//! same layout renders into a real terminal or into a plain ratatui
//! [`Buffer`](ratatui::buffer::Buffer).
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use linepick::prelude::*;
//! use ratatui::buffer::Buffer;
//! use ratatui::layout::Rect;
//!
//! let ctx = Arc::new(QueryContext::new("IgnoreCase"));
//! let surface = SharedSurface::new(Buffer::empty(Rect::new(0, 0, 40, 10)));
//! let options = LayoutOptionsBuilder::default()
//!     .layout(LayoutType::BottomUp)
//!     .build()
//!     .unwrap();
//!
//! let mut layout = BasicLayout::new(&options, ctx, surface);
//! layout.draw_screen(&[Match::new("awk"), Match::with_ranges("bash", vec![0..1])]);
//! layout.move_page(PagingRequest::LineAbove);
//! layout.print_status("ready", Duration::ZERO);
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub use crate::context::{Context, QueryContext};
pub use crate::item::Match;
pub use crate::options::{LayoutOptions, LayoutOptionsBuilder, LayoutType};
pub use crate::theme::StyleSet;

pub mod context;
pub mod item;
pub mod options;
pub mod prelude;
pub mod theme;
pub mod tui;
