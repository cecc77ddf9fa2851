use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::Paint;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` for each redraw of a tickline.
/// Renderers consume this list sequentially; each command carries all the
/// data it needs. Coordinates are in the host's pixel space, with `y`
/// growing downwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a border.
    DrawRect {
        rect: Rect,
        color: Paint,
        border_color: Option<Paint>,
    },

    /// Draw a text string. `position` is the top-left corner of the text box
    /// when `align` is `Left`.
    DrawText {
        position: Point,
        text: SharedStr,
        color: Paint,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: Paint,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group (e.g. one tick tier). Renderers may use this for
    /// batching or layer separation.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
