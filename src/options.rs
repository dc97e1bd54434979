//! Configuration options for the layout.
//!
//! This module provides the `LayoutOptions` struct and builder. With the `cli`
//! feature the same struct doubles as the binary's argument parser.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use derive_builder::Builder;
use thiserror::Error;

/// Default prompt prefix when none is configured
pub const DEFAULT_PROMPT: &str = "QUERY>";

/// Orientation of the whole screen
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LayoutType {
    /// Prompt at the top, items read from top to bottom
    #[default]
    TopDown,
    /// Prompt at the bottom, items read from bottom to top
    BottomUp,
}

impl LayoutType {
    /// Whether the list grows downwards from its anchor
    pub fn is_top_down(&self) -> bool {
        *self == LayoutType::TopDown
    }
}

/// Error returned when parsing an unknown layout name
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown layout type '{0}', expected 'top-down' or 'bottom-up'")]
pub struct LayoutTypeParseError(pub String);

impl FromStr for LayoutType {
    type Err = LayoutTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-down" => Ok(Self::TopDown),
            "bottom-up" => Ok(Self::BottomUp),
            other => Err(LayoutTypeParseError(other.to_string())),
        }
    }
}

impl Display for LayoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutType::TopDown => write!(f, "top-down"),
            LayoutType::BottomUp => write!(f, "bottom-up"),
        }
    }
}

/// linepick - pick lines from stdin
///
/// Reads candidate lines from stdin, lets you narrow them down with a query
/// and prints the picked lines to stdout.
#[derive(Builder, Debug, Clone, Default)]
#[builder(default)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(feature = "cli", command(name = "linepick", version, about))]
pub struct LayoutOptions {
    /// Screen orientation
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = LayoutType::TopDown))]
    pub layout: LayoutType,

    /// Prompt prefix shown before the query
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_PROMPT))]
    #[builder(setter(into))]
    pub prompt: String,

    /// Color overrides, e.g. `matched:red+bold,saved:black+on_cyan`
    #[cfg_attr(feature = "cli", arg(long))]
    #[builder(setter(into, strip_option))]
    pub color: Option<String>,

    /// Initial query
    #[cfg_attr(feature = "cli", arg(short, long, default_value = ""))]
    #[builder(setter(into))]
    pub query: String,

    /// How long status messages stay visible, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 2000))]
    pub status_timeout_ms: u64,

    /// Write debug logs to this file
    #[cfg_attr(feature = "cli", arg(long))]
    #[builder(setter(into, strip_option))]
    pub log_file: Option<PathBuf>,
}

impl LayoutOptions {
    /// The prompt prefix, falling back to `QUERY>` when empty
    pub fn prompt(&self) -> &str {
        if self.prompt.is_empty() { DEFAULT_PROMPT } else { &self.prompt }
    }
}
