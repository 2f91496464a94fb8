//! Wizard Step Controller: a linear state machine over steps `1..=total`.
//!
//! Independent of the draft: transitions never touch `ResumeDraft`. There is no terminal
//! state; advancing from the last step asks the caller to finalize instead.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::errors::DraftError;

pub const DEFAULT_TOTAL_STEPS: u8 = 5;

/// Result of `advance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advance {
    Moved { step: u8 },
    /// Already on the last step: hand the draft to the rendering sink.
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardController {
    current: u8,
    total: u8,
    completed: BTreeSet<u8>,
}

/// Snapshot for the adapter layer (nav button state, step badges).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardView {
    pub current: u8,
    pub total: u8,
    pub completed: Vec<u8>,
    pub can_retreat: bool,
    pub is_last: bool,
}

impl WizardController {
    /// `total` is clamped to at least one step.
    pub fn new(total: u8) -> Self {
        Self {
            current: 1,
            total: total.max(1),
            completed: BTreeSet::new(),
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn advance(&mut self) -> Advance {
        if self.current < self.total {
            self.completed.insert(self.current);
            self.current += 1;
            Advance::Moved { step: self.current }
        } else {
            Advance::Finalize
        }
    }

    /// Steps back one; a no-op on step 1.
    pub fn retreat(&mut self) -> u8 {
        if self.current > 1 {
            self.current -= 1;
        }
        self.current
    }

    pub fn go_to(&mut self, step: i64) -> Result<u8, DraftError> {
        if step < 1 || step > i64::from(self.total) {
            return Err(DraftError::OutOfRange {
                what: "step",
                value: step,
                min: 1,
                max: i64::from(self.total),
            });
        }
        self.current = step as u8;
        Ok(self.current)
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            current: self.current,
            total: self.total,
            completed: self.completed.iter().copied().collect(),
            can_retreat: self.current > 1,
            is_last: self.current == self.total,
        }
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_STEPS)
    }
}
