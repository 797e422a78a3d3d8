//! Fill-in-blank slot values.
//!
//! Every `[BLANK]` marker in the current document owns one slot, assigned in
//! document order. Slots are re-derived when the document changes and only
//! patched in place by `fill_in_blank`/`reset_blank`.

use tracing::warn;

use crate::error::{LabelError, LabelResult};

#[derive(Debug, Clone)]
pub struct FillInSlots {
    values: Vec<String>,
    default_value: String,
    consumed: usize,
}

impl FillInSlots {
    pub fn new(default_value: impl Into<String>) -> Self {
        Self {
            values: Vec::new(),
            default_value: default_value.into(),
            consumed: 0,
        }
    }

    /// Re-derive the slot list for a document containing `count` blank
    /// markers. Every slot resets to the default value.
    pub fn derive(&mut self, count: usize) {
        self.values = vec![self.default_value.clone(); count];
        self.consumed = 0;
    }

    /// Patch one slot. The slot count stays untouched so the assignment of
    /// markers to slots remains stable.
    pub fn set(&mut self, index: usize, text: impl Into<String>) -> LabelResult<()> {
        let count = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(LabelError::FillInOutOfRange { index, count })?;
        *slot = text.into();
        Ok(())
    }

    /// Restore one slot to the default value.
    pub fn reset(&mut self, index: usize) -> LabelResult<()> {
        let default_value = self.default_value.clone();
        self.set(index, default_value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    /// Start consuming slots for a render pass.
    pub(crate) fn begin_pass(&mut self) {
        self.consumed = 0;
    }

    /// Consume the next slot value in document order.
    pub(crate) fn take_next(&mut self) -> String {
        match self.values.get(self.consumed) {
            Some(value) => {
                self.consumed += 1;
                value.clone()
            }
            None => {
                // Slot counts are derived from the same document that is
                // being cleaned, so an overrun means the document changed
                // under us. Degrade to the default value.
                warn!(
                    "fill-in slot overrun: {} slots, request #{}",
                    self.values.len(),
                    self.consumed + 1
                );
                self.default_value.clone()
            }
        }
    }
}
