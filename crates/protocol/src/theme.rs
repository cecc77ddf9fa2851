use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Border,
    CenterLine,

    TickMajor,
    TickMinor,
    TickData,

    TickLabel,
}

/// Fill or stroke color of a render command.
///
/// Configuration may name either a theme token (`"TickMajor"`) or an explicit
/// color (`{"r":1,"g":0,"b":0,"a":1}`); both decode into this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Theme(ThemeToken),
    Rgba(Color),
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Theme(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Rgba(color)
    }
}
