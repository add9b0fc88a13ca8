//! Hold-to-activate state machine for the 48V buttons
//!
//! Switching phantom power on takes a deliberate hold: the press arms a
//! deadline and the button only activates once the hold time elapses. The
//! release that ends the activating hold is swallowed, so the same gesture
//! cannot also switch it back off. Once active, a plain click deactivates.
//!
//! ```text
//! Inactive --press--> Arming --deadline--> Active{just_activated}
//!              ^         |                      |
//!              +-release/leave                  release (consumes flag)
//!              |                                v
//!              +-------------release------- Active
//! ```

use std::time::{Duration, Instant};
use tracing::trace;

/// Default hold time in milliseconds
pub const DEFAULT_HOLD_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Inactive,
    Arming { deadline: Instant },
    Active { just_activated: bool },
}

/// What a transition asks the panel to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldAction {
    None,
    Activate,
    Deactivate,
}

#[derive(Debug, Clone)]
pub struct HoldButton {
    hold: Duration,
    state: HoldState,
}

impl HoldButton {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            state: HoldState::Inactive,
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_arming(&self) -> bool {
        matches!(self.state, HoldState::Arming { .. })
    }

    /// Pointer down. Only an inactive button starts arming; at most one
    /// deadline is ever pending.
    pub fn press(&mut self, now: Instant) {
        if self.state == HoldState::Inactive {
            self.state = HoldState::Arming {
                deadline: now + self.hold,
            };
            trace!("48V hold armed");
        }
    }

    /// Pointer up
    pub fn release(&mut self) -> HoldAction {
        match self.state {
            HoldState::Inactive => HoldAction::None,
            HoldState::Arming { .. } => {
                trace!("48V hold released early");
                self.state = HoldState::Inactive;
                HoldAction::None
            }
            HoldState::Active {
                just_activated: true,
            } => {
                self.state = HoldState::Active {
                    just_activated: false,
                };
                HoldAction::None
            }
            HoldState::Active {
                just_activated: false,
            } => {
                self.state = HoldState::Inactive;
                HoldAction::Deactivate
            }
        }
    }

    /// Pointer left the button or the gesture was cancelled
    pub fn leave(&mut self) {
        if self.is_arming() {
            trace!("48V hold cancelled");
            self.state = HoldState::Inactive;
        }
    }

    /// Fire the hold deadline if it has passed
    pub fn poll(&mut self, now: Instant) -> HoldAction {
        match self.state {
            HoldState::Arming { deadline } if now >= deadline => {
                self.state = HoldState::Active {
                    just_activated: true,
                };
                HoldAction::Activate
            }
            _ => HoldAction::None,
        }
    }

    /// Follow a phantom flag that changed outside of a gesture
    pub fn sync(&mut self, phantom: bool) {
        self.state = if phantom {
            HoldState::Active {
                just_activated: false,
            }
        } else {
            HoldState::Inactive
        };
    }
}
