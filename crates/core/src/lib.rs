//! Headless engine of a zoomable, pannable ruler.
//!
//! A [`Tickline`] maps a continuous index onto a pixel span, draws several
//! tiers of tick marks with collision-resolved labels, and turns touch
//! gestures into pans, pinch zooms and kinetic flings. Output is a list of
//! [`tickline_protocol::RenderCommand`]s for whatever front end hosts it.

pub mod config;
pub mod error;
pub mod gesture;
pub mod labels;
pub mod momentum;
pub mod schedule;
pub mod text;
pub mod tick;
pub mod tickline;
pub mod viewport;

pub use config::{TickConfig, TicklineConfig};
pub use error::ConfigError;
pub use gesture::{GestureController, GestureSettings, TouchEvent, TouchId, TouchPhase};
pub use labels::{CompositeLabelResolver, LabelResolver, LabelStrategy, Labeller};
pub use momentum::{DampedScroll, Momentum, MomentumTuning, Motion};
pub use text::{MonospaceMeasure, TextExtent, TextMeasure};
pub use tick::{HAlign, Tick, TickKind, TickMark, TickVariant, VAlign};
pub use tickline::Tickline;
pub use viewport::{IndexOverride, Orientation, Viewport};
