//! Boundary contracts with the outside world
//!
//! The core pushes [`RenderState`]s to a [`PresentationAdapter`] once per
//! render pass and never reads anything back. Input arrives as an
//! [`InputState`]: the set of held input codes plus the cursor in screen
//! pixels.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::screen_to_sim;
use crate::sim::ObjectId;

/// What the presentation layer needs to draw one object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub id: ObjectId,
    /// Screen-space translation (pixels)
    pub translate: Vec2,
    /// Degrees
    pub rotation: f32,
    pub render_tag: String,
    /// Kind-specific hint such as facing or damage stage
    pub hint: Option<&'static str>,
}

/// Render sink driven by the core
pub trait PresentationAdapter {
    /// Draw or move the visual for one live object
    fn draw(&mut self, state: &RenderState);

    /// The object is gone; drop its visual
    fn remove(&mut self, id: ObjectId);
}

/// Adapter that keeps the latest frame in memory
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    pub drawn: Vec<RenderState>,
    pub removed: Vec<ObjectId>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_state(&self, id: ObjectId) -> Option<&RenderState> {
        self.drawn.iter().rev().find(|s| s.id == id)
    }
}

impl PresentationAdapter for RecordingAdapter {
    fn draw(&mut self, state: &RenderState) {
        self.drawn.push(state.clone());
    }

    fn remove(&mut self, id: ObjectId) {
        self.removed.push(id);
    }
}

/// Live input: held codes and cursor position in screen pixels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub held: BTreeSet<String>,
    pub cursor: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, code: &str) {
        self.held.insert(code.to_string());
    }

    pub fn release(&mut self, code: &str) {
        self.held.remove(code);
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains(code)
    }

    pub fn move_cursor(&mut self, screen: Vec2) {
        self.cursor = screen;
    }

    /// Cursor converted into simulation units
    pub fn cursor_sim(&self, pixel_size: f32) -> Vec2 {
        screen_to_sim(self.cursor, pixel_size)
    }
}
