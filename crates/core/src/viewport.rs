use serde::{Deserialize, Serialize};
use tickline_protocol::{Point, Rect};

/// Which screen axis the index runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Optional replacements for the current index range in
/// [`Viewport::index_to_pos_with`].
///
/// `mid` takes precedence: when set, the range is rebuilt symmetrically
/// around it using the current scale, answering "where would `index` be if
/// the view were centred on `mid`".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndexOverride {
    pub index_0: Option<f64>,
    pub index_1: Option<f64>,
    pub mid: Option<f64>,
}

/// Affine index → pixel map frozen from a [`Viewport`] for one redraw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    pub index_0: f64,
    pub scale: f64,
    pub direction: f64,
    pub pos0: f64,
}

impl AxisMap {
    /// Window coordinate of a global index.
    pub fn pos(&self, index: f64) -> f64 {
        self.pos0 + (index - self.index_0) * self.scale * self.direction
    }
}

/// The bidirectional index ↔ pixel transform of a tickline.
///
/// `index_0` is the index at the axis origin of the widget (its left edge when
/// horizontal, its top edge when vertical) and `index_1` the index at the far
/// edge. With `backward` set the direction flips, and `index_0 > index_1`.
///
/// `scale` (pixels per unit index) is cached and recomputed only by the
/// setters that change one of its inputs. [`translate_by`](Self::translate_by)
/// shifts both ends in one step and leaves the cached scale untouched, so a
/// translation can never perturb the zoom level through rounding.
#[derive(Debug, Clone)]
pub struct Viewport {
    bounds: Rect,
    orientation: Orientation,
    backward: bool,
    index_0: f64,
    index_1: f64,
    min_index: f64,
    max_index: f64,
    scale: f64,
    revision: u64,
}

impl Viewport {
    pub fn new(bounds: Rect, orientation: Orientation, index_0: f64, index_1: f64) -> Self {
        let mut viewport = Self {
            bounds,
            orientation,
            backward: false,
            index_0,
            index_1,
            min_index: f64::NEG_INFINITY,
            max_index: f64::INFINITY,
            scale: 0.0,
            revision: 0,
        };
        viewport.rederive_scale();
        viewport
    }

    // --- Derived quantities ---

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    pub fn backward(&self) -> bool {
        self.backward
    }

    /// `-1.0` when running backward, `+1.0` otherwise.
    pub fn direction(&self) -> f64 {
        if self.backward { -1.0 } else { 1.0 }
    }

    pub fn index_0(&self) -> f64 {
        self.index_0
    }

    pub fn index_1(&self) -> f64 {
        self.index_1
    }

    pub fn index_mid(&self) -> f64 {
        (self.index_0 + self.index_1) / 2.0
    }

    pub fn min_index(&self) -> f64 {
        self.min_index
    }

    pub fn max_index(&self) -> f64 {
        self.max_index
    }

    /// Pixel length of the widget along the axis.
    pub fn extent(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.bounds.h,
            Orientation::Horizontal => self.bounds.w,
        }
    }

    /// Window coordinate of the widget's origin along the axis.
    pub fn pos0(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.bounds.y,
            Orientation::Horizontal => self.bounds.x,
        }
    }

    /// Pixels per unit of global index. `+inf` for a zero-width index range.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Bumped on every mutation; lets owners detect change without diffing.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn axis_map(&self) -> AxisMap {
        AxisMap {
            index_0: self.index_0,
            scale: self.scale,
            direction: self.direction(),
            pos0: self.pos0(),
        }
    }

    /// Component of `p` along the axis.
    pub fn along(&self, p: Point) -> f64 {
        match self.orientation {
            Orientation::Vertical => p.y,
            Orientation::Horizontal => p.x,
        }
    }

    // --- Conversions ---

    /// Index at a pixel coordinate. With `window` set, `pixel` is a window
    /// coordinate; otherwise it is relative to the widget origin.
    pub fn pos_to_index(&self, pixel: f64, window: bool) -> f64 {
        let local = if window { pixel - self.pos0() } else { pixel };
        self.index_0 + self.direction() * local / self.scale
    }

    /// Window coordinate of a global index, even when it is off screen.
    pub fn index_to_pos(&self, index: f64) -> f64 {
        self.index_to_pos_with(index, IndexOverride::default())
    }

    pub fn index_to_pos_with(&self, index: f64, over: IndexOverride) -> f64 {
        let (i0, i1) = match over.mid {
            Some(mid) => {
                let half = self.extent() / 2.0 / self.scale * self.direction();
                (mid - half, mid + half)
            }
            None => (
                over.index_0.unwrap_or(self.index_0),
                over.index_1.unwrap_or(self.index_1),
            ),
        };
        (i0 - index) / (i0 - i1) * self.extent() + self.pos0()
    }

    // --- Mutation ---

    pub fn set_index_range(&mut self, index_0: f64, index_1: f64) {
        if index_0 == self.index_0 && index_1 == self.index_1 {
            return;
        }
        self.index_0 = index_0;
        self.index_1 = index_1;
        self.rederive_scale();
    }

    pub fn set_index_0(&mut self, index_0: f64) {
        self.set_index_range(index_0, self.index_1);
    }

    pub fn set_index_1(&mut self, index_1: f64) {
        self.set_index_range(self.index_0, index_1);
    }

    /// Shift both ends of the range by `delta`, keeping the scale exactly.
    pub fn translate_by(&mut self, delta: f64) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        self.index_0 += delta;
        self.index_1 += delta;
        self.revision += 1;
    }

    /// Centre the view on `mid` without changing the scale.
    pub fn set_index_mid(&mut self, mid: f64) {
        self.translate_by(mid - self.index_mid());
    }

    /// Set the zoom, keeping `index_0` fixed. Non-positive or non-finite
    /// scales are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        self.set_transform(self.index_0, scale);
    }

    /// Install a new origin index and scale together, deriving `index_1`.
    pub fn set_transform(&mut self, index_0: f64, scale: f64) {
        self.index_0 = index_0;
        self.index_1 = index_0 + self.direction() * self.extent() / scale;
        self.scale = scale;
        self.revision += 1;
    }

    /// Rescale so that global `index` lands on the widget-local pixel `at`.
    pub fn rescale_about(&mut self, index: f64, at: f64, scale: f64) {
        self.set_transform(index - self.direction() * at / scale, scale);
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        self.rederive_scale();
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation == self.orientation {
            return;
        }
        self.orientation = orientation;
        self.rederive_scale();
    }

    /// Flip the running direction. The index ends are swapped so that the
    /// range keeps a positive scale in the new direction.
    pub fn set_backward(&mut self, backward: bool) {
        if backward == self.backward {
            return;
        }
        self.backward = backward;
        let inverted = if backward {
            self.index_0 < self.index_1
        } else {
            self.index_0 > self.index_1
        };
        if inverted {
            std::mem::swap(&mut self.index_0, &mut self.index_1);
        }
        self.rederive_scale();
    }

    pub fn set_index_limits(&mut self, min_index: f64, max_index: f64) {
        if min_index == self.min_index && max_index == self.max_index {
            return;
        }
        self.min_index = min_index;
        self.max_index = max_index;
        self.revision += 1;
    }

    fn rederive_scale(&mut self) {
        let span = self.index_1 - self.index_0;
        self.scale = if span == 0.0 {
            f64::INFINITY
        } else {
            self.extent() / span * self.direction()
        };
        self.revision += 1;
    }
}
