//! FLOW8 Remote
//!
//! Software control surface for the Behringer FLOW 8 digital mixer. The
//! [`panel::Panel`] owns the mixer state, turns user gestures into MIDI
//! messages for the selected output and saves the scene through a debounced
//! key-value store.

pub mod cli;
pub mod clock;
pub mod codec;
pub mod config;
pub mod device;
pub mod midi;
pub mod panel;
pub mod paths;
pub mod state;
