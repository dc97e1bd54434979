use std::str::FromStr;

use thiserror::Error;

/// Screen edge a region is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Rows count down from the top of the screen
    Top,
    /// Rows count up from the bottom of the screen
    Bottom,
}

/// Error returned when parsing an unknown anchor edge
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid vertical anchor '{0}'")]
pub struct AnchorParseError(pub String);

impl FromStr for Anchor {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(AnchorParseError(s.to_string())),
        }
    }
}

/// Where an anchored region sits: an edge plus a row offset from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSettings {
    anchor: Anchor,
    offset: u16,
}

impl AnchorSettings {
    /// Anchors `offset` rows away from `anchor`
    pub fn new(anchor: Anchor, offset: u16) -> Self {
        Self { anchor, offset }
    }

    /// The edge this region is attached to
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Returns the 0-based row for a screen `height` rows tall
    pub fn position(&self, height: u16) -> u16 {
        match self.anchor {
            Anchor::Top => self.offset,
            // y is 0 based, height is a count
            Anchor::Bottom => height.saturating_sub(self.offset).saturating_sub(1),
        }
    }
}
