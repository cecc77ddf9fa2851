use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tickline_core::{MonospaceMeasure, Tickline, TicklineConfig, TouchEvent};
use tickline_protocol::Rect;
use wasm_bindgen::prelude::*;

static TICKLINES: Mutex<Vec<Option<Tickline>>> = Mutex::new(Vec::new());

/// Snapshot of the transform, for hosts that mirror it in their own UI.
#[derive(Debug, Serialize)]
struct State {
    index_0: f64,
    index_1: f64,
    scale: f64,
    in_motion: bool,
}

fn with_tickline<T>(handle: usize, f: impl FnOnce(&mut Tickline) -> T) -> Result<T, String> {
    let mut ticklines = TICKLINES.lock().unwrap_or_else(PoisonError::into_inner);
    let tickline = ticklines
        .get_mut(handle)
        .and_then(Option::as_mut)
        .ok_or_else(|| format!("invalid tickline handle {handle}"))?;
    Ok(f(tickline))
}

fn create(config_json: &str) -> Result<usize, String> {
    let config = TicklineConfig::from_json(config_json).map_err(|e| e.to_string())?;
    let tickline = Tickline::new(config).map_err(|e| e.to_string())?;
    let mut ticklines = TICKLINES.lock().unwrap_or_else(PoisonError::into_inner);
    ticklines.push(Some(tickline));
    Ok(ticklines.len() - 1)
}

fn touch(handle: usize, event_json: &str) -> Result<bool, String> {
    let event: TouchEvent = serde_json::from_str(event_json).map_err(|e| e.to_string())?;
    with_tickline(handle, |tl| tl.handle_touch(&event))
}

fn step(handle: usize, dt: f64) -> Result<Option<String>, String> {
    let measure = MonospaceMeasure::default();
    with_tickline(handle, |tl| tl.frame(dt, &measure))?
        .map(|commands| serde_json::to_string(&commands).map_err(|e| e.to_string()))
        .transpose()
}

fn state(handle: usize) -> Result<String, String> {
    let state = with_tickline(handle, |tl| State {
        index_0: tl.index_0(),
        index_1: tl.index_1(),
        scale: tl.scale(),
        in_motion: tl.in_motion(),
    })?;
    serde_json::to_string(&state).map_err(|e| e.to_string())
}

fn release(handle: usize) -> Result<(), String> {
    let mut ticklines = TICKLINES.lock().unwrap_or_else(PoisonError::into_inner);
    let slot = ticklines
        .get_mut(handle)
        .filter(|slot| slot.is_some())
        .ok_or_else(|| format!("invalid tickline handle {handle}"))?;
    *slot = None;
    Ok(())
}

/// Build a tickline from a JSON configuration. Returns a handle for later use.
#[wasm_bindgen]
pub fn create_tickline(config_json: &str) -> Result<usize, JsError> {
    create(config_json).map_err(|e| JsError::new(&e))
}

#[wasm_bindgen]
pub fn release_tickline(handle: usize) -> Result<(), JsError> {
    release(handle).map_err(|e| JsError::new(&e))
}

/// Feed a touch event (JSON `TouchEvent`). Returns whether it was consumed.
#[wasm_bindgen]
pub fn handle_touch(handle: usize, event_json: &str) -> Result<bool, JsError> {
    touch(handle, event_json).map_err(|e| JsError::new(&e))
}

/// Advance one animation frame. Returns the render commands as JSON when a
/// redraw ran, `undefined` otherwise.
#[wasm_bindgen]
pub fn frame(handle: usize, dt: f64) -> Result<Option<String>, JsError> {
    step(handle, dt).map_err(|e| JsError::new(&e))
}

#[wasm_bindgen]
pub fn set_bounds(handle: usize, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsError> {
    with_tickline(handle, |tl| tl.set_bounds(Rect::new(x, y, width, height)))
        .map_err(|e| JsError::new(&e))
}

/// Zoom by `ratio` around the window coordinate `pixel` along the axis.
#[wasm_bindgen]
pub fn zoom_by(handle: usize, ratio: f64, pixel: f64) -> Result<(), JsError> {
    with_tickline(handle, |tl| tl.zoom_by(ratio, pixel)).map_err(|e| JsError::new(&e))
}

#[wasm_bindgen]
pub fn set_index_range(handle: usize, index_0: f64, index_1: f64) -> Result<(), JsError> {
    with_tickline(handle, |tl| tl.set_index_range(index_0, index_1))
        .map_err(|e| JsError::new(&e))
}

/// Current transform as JSON: `{index_0, index_1, scale, in_motion}`.
#[wasm_bindgen]
pub fn get_state(handle: usize) -> Result<String, JsError> {
    state(handle).map_err(|e| JsError::new(&e))
}
