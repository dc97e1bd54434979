//! Terminal UI components and rendering.
//!
//! This module holds everything that ends up on screen: anchoring of the
//! prompt, list and status regions, the paging math, text rendering and the
//! coordinator that ties them into a frame.

use thiserror::Error;

pub use layout::{BasicLayout, Layout};
pub use pager::PagingRequest;
pub use surface::{SharedSurface, Surface, TerminalSurface};

/// Edge anchoring of screen regions
pub mod anchor;
/// Candidate list display
pub mod item_list;
/// Frame composition
pub mod layout;
/// Page window and cursor movement
pub mod pager;
/// Query prompt display
pub mod prompt;
/// Status message display
pub mod statusline;
/// The cell surface everything draws on
pub mod surface;
/// Width-aware text output and attribute merging
pub mod util;

/// Error raised by a cell surface
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The ratatui backend reported a failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Reasons a frame was abandoned
#[derive(Error, Debug)]
pub enum LayoutError {
    /// No items and no query, so there is nothing worth drawing yet
    #[error("no targets or query. nothing to do")]
    NothingToRender,
    /// Clearing or flushing the surface failed
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
