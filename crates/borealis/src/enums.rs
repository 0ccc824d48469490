//! Small enums shared by several widgets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Layout direction of a container or separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Orientation {
    /// The CSS class a widget with this orientation carries.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    /// The other orientation.
    pub fn flipped(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Layer-shell layer a window is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Below everything, including normal windows.
    Background,
    /// Below normal windows.
    Bottom,
    /// Above normal windows.
    #[default]
    Top,
    /// Above everything, including fullscreen windows.
    Overlay,
}

/// Screen edge a window is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

impl Edge {
    /// The orientation of a bar spanning this edge.
    pub fn bar_orientation(self) -> Orientation {
        match self {
            Self::Top | Self::Bottom => Orientation::Horizontal,
            Self::Left | Self::Right => Orientation::Vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        assert_eq!(Orientation::default(), Orientation::Horizontal);
        assert_eq!(Orientation::Vertical.css_class(), "vertical");
        assert_eq!(Orientation::Horizontal.flipped(), Orientation::Vertical);
    }

    #[test]
    fn test_bar_orientation() {
        assert_eq!(Edge::Top.bar_orientation(), Orientation::Horizontal);
        assert_eq!(Edge::Left.bar_orientation(), Orientation::Vertical);
    }
}
