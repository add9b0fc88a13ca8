//! PanelState - the single in-memory source of truth for the mixer
//!
//! Holds every channel strip, the master section, the bus pairs, both FX
//! engines and the global options. Numeric writes are clamped to the
//! control's range before they are stored.

use super::control::Control;
use super::types::{
    BusPairs, ChannelState, FxEngine, FxState, MasterState, Options, NUM_CHANNELS,
    PHANTOM_CHANNELS, PREAMP_CHANNELS,
};

/// Rejected state access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("channel {0} does not exist (1-{max})", max = NUM_CHANNELS)]
    UnknownChannel(u8),

    #[error("{what} is not available on channel {channel}")]
    NotApplicable { what: String, channel: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    channels: Vec<ChannelState>,
    pub master: MasterState,
    pub buses: BusPairs,
    pub fx: FxState,
    pub options: Options,
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelState {
    /// All channels at factory defaults
    pub fn new() -> Self {
        Self {
            channels: (1..=NUM_CHANNELS).map(ChannelState::new).collect(),
            master: MasterState::default(),
            buses: BusPairs::default(),
            fx: FxState::default(),
            options: Options::default(),
        }
    }

    /// Channel numbers in ascending order
    pub fn channel_numbers() -> impl Iterator<Item = u8> {
        1..=NUM_CHANNELS
    }

    pub fn has_phantom(channel: u8) -> bool {
        (1..=PHANTOM_CHANNELS).contains(&channel)
    }

    pub fn has_preamp(channel: u8) -> bool {
        (1..=PREAMP_CHANNELS).contains(&channel)
    }

    pub fn channel(&self, channel: u8) -> Result<&ChannelState, StateError> {
        usize::from(channel)
            .checked_sub(1)
            .and_then(|i| self.channels.get(i))
            .ok_or(StateError::UnknownChannel(channel))
    }

    pub fn channel_mut(&mut self, channel: u8) -> Result<&mut ChannelState, StateError> {
        usize::from(channel)
            .checked_sub(1)
            .and_then(|i| self.channels.get_mut(i))
            .ok_or(StateError::UnknownChannel(channel))
    }

    pub fn channels(&self) -> impl Iterator<Item = (u8, &ChannelState)> {
        Self::channel_numbers().zip(self.channels.iter())
    }

    /// Checks that `control` addresses an existing, equipped channel
    pub fn validate(&self, control: Control) -> Result<(), StateError> {
        let Some(channel) = control.channel() else {
            return Ok(());
        };
        self.channel(channel)?;
        let needs_preamp = matches!(
            control,
            Control::Gain(_) | Control::LowCut(_) | Control::Comp(_) | Control::Eq(_, _)
        );
        if needs_preamp && !Self::has_preamp(channel) {
            return Err(StateError::NotApplicable {
                what: control.to_string(),
                channel,
            });
        }
        Ok(())
    }

    /// Current value of a continuous control
    pub fn value(&self, control: Control) -> Result<u8, StateError> {
        self.validate(control)?;
        let value = match control {
            Control::Fader(ch) => self.channel(ch)?.level,
            Control::Pan(ch) => self.channel(ch)?.pan,
            Control::Send(ch, bus) => self.channel(ch)?.send(bus),
            Control::Gain(ch) => self.channel(ch)?.gain,
            Control::LowCut(ch) => self.channel(ch)?.lowcut,
            Control::Comp(ch) => self.channel(ch)?.comp,
            Control::Eq(ch, band) => self.channel(ch)?.eq.get(band),
            Control::MasterLevel => self.master.level,
            Control::MasterLimiter => self.master.limiter,
            Control::MasterBalance => self.master.balance,
            Control::BusLevel(bus) => self.buses.strip(bus).level,
            Control::BusLimiter(bus) => self.buses.strip(bus).limiter,
            Control::FxParam1(engine) => self.fx.engine(engine).param1,
            Control::FxParam2(engine) => self.fx.engine(engine).param2,
        };
        Ok(value)
    }

    /// Store a continuous control value, clamped to its range. Returns the
    /// value actually stored.
    pub fn set_value(&mut self, control: Control, value: i32) -> Result<u8, StateError> {
        self.validate(control)?;
        let value = control.clamp(value);
        match control {
            Control::Fader(ch) => self.channel_mut(ch)?.level = value,
            Control::Pan(ch) => self.channel_mut(ch)?.pan = value,
            Control::Send(ch, bus) => self.channel_mut(ch)?.set_send(bus, value),
            Control::Gain(ch) => self.channel_mut(ch)?.gain = value,
            Control::LowCut(ch) => self.channel_mut(ch)?.lowcut = value,
            Control::Comp(ch) => self.channel_mut(ch)?.comp = value,
            Control::Eq(ch, band) => self.channel_mut(ch)?.eq.set(band, value),
            Control::MasterLevel => self.master.level = value,
            Control::MasterLimiter => self.master.limiter = value,
            Control::MasterBalance => self.master.balance = value,
            Control::BusLevel(bus) => self.buses.strip_mut(bus).level = value,
            Control::BusLimiter(bus) => self.buses.strip_mut(bus).limiter = value,
            Control::FxParam1(engine) => self.fx.engine_mut(engine).param1 = value,
            Control::FxParam2(engine) => self.fx.engine_mut(engine).param2 = value,
        }
        Ok(value)
    }

    /// Phantom flag; errors on channels without a phantom switch
    pub fn set_phantom(&mut self, channel: u8, on: bool) -> Result<(), StateError> {
        let strip = self.channel_mut(channel)?;
        if !Self::has_phantom(channel) {
            return Err(StateError::NotApplicable {
                what: "48V".to_string(),
                channel,
            });
        }
        strip.phantom = on;
        Ok(())
    }

    /// Select a 1-based preset, clamped to the engine's preset list
    pub fn set_preset(&mut self, engine: FxEngine, preset: i32) -> u8 {
        let max = engine.presets().len() as i32;
        let preset = preset.clamp(1, max) as u8;
        self.fx.engine_mut(engine).preset = preset;
        preset
    }

    /// Channels other than `except` that are currently soloed
    pub fn soloed_except(&self, except: u8) -> Vec<u8> {
        self.channels()
            .filter(|(ch, st)| *ch != except && st.solo)
            .map(|(ch, _)| ch)
            .collect()
    }
}
