//! Shared fixtures for the integration tests.

use std::sync::{Arc, Mutex};

use glyphline::{DecorationRect, HostParent, PlacedGlyph, Vec2};

/// One recorded host invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    BeginFrame,
    SetBlockFrame {
        origin: Vec2,
        size: Vec2,
        anchor: Vec2,
    },
    AttachGlyph {
        index: usize,
        text: String,
        z_order: i32,
    },
    AttachRect,
}

/// A host parent that records every call. Clones share the call log, so a
/// test keeps one handle while the block owns the boxed other.
#[derive(Default, Clone)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of attached glyphs in attach order, for the last frame only.
    pub fn attached_texts(&self) -> Vec<String> {
        let calls = self.calls.lock().unwrap();
        let last_frame = calls
            .iter()
            .rposition(|call| *call == HostCall::BeginFrame)
            .map(|position| position + 1)
            .unwrap_or(0);
        calls[last_frame..]
            .iter()
            .filter_map(|call| match call {
                HostCall::AttachGlyph { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == HostCall::BeginFrame)
            .count()
    }
}

impl HostParent for RecordingHost {
    fn begin_frame(&mut self) {
        self.calls.lock().unwrap().push(HostCall::BeginFrame);
    }

    fn set_block_frame(&mut self, origin: Vec2, size: Vec2, anchor: Vec2) {
        self.calls.lock().unwrap().push(HostCall::SetBlockFrame {
            origin,
            size,
            anchor,
        });
    }

    fn attach_glyph(&mut self, index: usize, glyph: &PlacedGlyph, z_order: i32) {
        self.calls.lock().unwrap().push(HostCall::AttachGlyph {
            index,
            text: glyph.text.clone(),
            z_order,
        });
    }

    fn attach_rect(&mut self, _rect: &DecorationRect) {
        self.calls.lock().unwrap().push(HostCall::AttachRect);
    }
}
