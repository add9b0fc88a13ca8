//! State management module - the panel's single source of truth
//!
//! This module holds the in-memory mixer state, the continuous control kinds
//! that address it, the persisted scene schema and the debounced key-value
//! persistence the scene is written through.

pub mod control;
pub mod persistence;
pub mod scene;
mod store;
pub mod types;

pub use control::{Control, ParseControlError};
pub use persistence::{
    Debounce, KeyValueStore, MemoryStore, SledStore, StoreError, DEFAULT_DEBOUNCE_MS,
    DEFAULT_SCENE_KEY,
};
pub use scene::Scene;
pub use store::{PanelState, StateError};
pub use types::{
    Bus, BusPairs, BusStrip, ChannelState, EqBand, EqBands, FxEngine, FxSettings, FxState,
    MasterState, Options, NUM_CHANNELS,
};
