//! Panel state type definitions
//!
//! Channels, master section, bus pairs and FX engines of the mixer, plus the
//! global options.

use crate::codec::default_label;
use crate::midi::{cc, channel};
use std::fmt;

/// Number of input channel strips
pub const NUM_CHANNELS: u8 = 7;
/// Channels 1..=2 have a phantom power switch
pub const PHANTOM_CHANNELS: u8 = 2;
/// Channels 1..=6 have gain, low-cut, compressor and EQ
pub const PREAMP_CHANNELS: u8 = 6;
/// Upper bound of every 7-bit control
pub const LEVEL_MAX: u8 = 127;
/// Upper bound of the compressor knob
pub const COMP_MAX: u8 = 100;
/// Flat EQ / centred pan
pub const CENTER: u8 = 64;

pub const FX1_PRESETS: [&str; 16] = [
    "Ambience",
    "Perc. Reverb 1",
    "Perc. Reverb 2",
    "Guitar Reverb 1",
    "Guitar Reverb 2",
    "Chamber",
    "Room",
    "Concert",
    "Church",
    "Cathedral",
    "Temple",
    "Stadium",
    "Flanger",
    "Soft Chorus",
    "Warm Chorus",
    "Deep Chorus",
];

pub const FX2_PRESETS: [&str; 16] = [
    "Delay 1/1",
    "Delay 1/2",
    "Delay 1/3",
    "Delay 2/1",
    "Echo 1/1",
    "Echo 1/2",
    "Echo 1/3",
    "Echo 2/1",
    "Wide Echo",
    "Ping Pong",
    "Ping Pong 1/3",
    "Echo R>L",
    "Flanger",
    "Soft Chorus",
    "Warm Chorus",
    "Deep Chorus",
];

/// Output bus. Channels send to each of them; each has its own level and
/// limiter on a dedicated MIDI channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    Fx1,
    Fx2,
    Mon1,
    Mon2,
}

impl Bus {
    pub fn all() -> &'static [Bus] {
        &[Bus::Fx1, Bus::Fx2, Bus::Mon1, Bus::Mon2]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bus::Fx1 => "fx1",
            Bus::Fx2 => "fx2",
            Bus::Mon1 => "mon1",
            Bus::Mon2 => "mon2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Bus::all().iter().copied().find(|b| b.as_str() == s)
    }

    /// Controller used on an input channel for the send to this bus
    pub fn send_cc(&self) -> u8 {
        match self {
            Bus::Fx1 => cc::SEND_FX1,
            Bus::Fx2 => cc::SEND_FX2,
            Bus::Mon1 => cc::SEND_MON1,
            Bus::Mon2 => cc::SEND_MON2,
        }
    }

    /// Logical MIDI channel carrying the bus level and limiter
    pub fn midi_channel(&self) -> u8 {
        match self {
            Bus::Fx1 => channel::FX1_BUS,
            Bus::Fx2 => channel::FX2_BUS,
            Bus::Mon1 => channel::MON1_BUS,
            Bus::Mon2 => channel::MON2_BUS,
        }
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-band channel EQ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqBand {
    Low,
    LowMid,
    HiMid,
    Hi,
}

impl EqBand {
    pub fn all() -> &'static [EqBand] {
        &[EqBand::Low, EqBand::LowMid, EqBand::HiMid, EqBand::Hi]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EqBand::Low => "low",
            EqBand::LowMid => "lowmid",
            EqBand::HiMid => "himid",
            EqBand::Hi => "hi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        EqBand::all().iter().copied().find(|b| b.as_str() == s)
    }

    pub fn cc(&self) -> u8 {
        match self {
            EqBand::Low => cc::EQ_LOW,
            EqBand::LowMid => cc::EQ_LOWMID,
            EqBand::HiMid => cc::EQ_HIMID,
            EqBand::Hi => cc::EQ_HI,
        }
    }
}

impl fmt::Display for EqBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two internal effect engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxEngine {
    Fx1,
    Fx2,
}

impl FxEngine {
    pub fn all() -> &'static [FxEngine] {
        &[FxEngine::Fx1, FxEngine::Fx2]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FxEngine::Fx1 => "fx1",
            FxEngine::Fx2 => "fx2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        FxEngine::all().iter().copied().find(|e| e.as_str() == s)
    }

    pub fn midi_channel(&self) -> u8 {
        match self {
            FxEngine::Fx1 => channel::FX1_ENGINE,
            FxEngine::Fx2 => channel::FX2_ENGINE,
        }
    }

    pub fn presets(&self) -> &'static [&'static str; 16] {
        match self {
            FxEngine::Fx1 => &FX1_PRESETS,
            FxEngine::Fx2 => &FX2_PRESETS,
        }
    }

    /// Name of a 1-based preset index
    pub fn preset_name(&self, preset: u8) -> Option<&'static str> {
        let index = usize::from(preset).checked_sub(1)?;
        self.presets().get(index).copied()
    }
}

impl fmt::Display for FxEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqBands {
    pub low: u8,
    pub lowmid: u8,
    pub himid: u8,
    pub hi: u8,
}

impl EqBands {
    pub const FLAT: EqBands = EqBands {
        low: CENTER,
        lowmid: CENTER,
        himid: CENTER,
        hi: CENTER,
    };

    pub fn get(&self, band: EqBand) -> u8 {
        match band {
            EqBand::Low => self.low,
            EqBand::LowMid => self.lowmid,
            EqBand::HiMid => self.himid,
            EqBand::Hi => self.hi,
        }
    }

    pub fn set(&mut self, band: EqBand, value: u8) {
        match band {
            EqBand::Low => self.low = value,
            EqBand::LowMid => self.lowmid = value,
            EqBand::HiMid => self.himid = value,
            EqBand::Hi => self.hi = value,
        }
    }
}

impl Default for EqBands {
    fn default() -> Self {
        Self::FLAT
    }
}

/// State of one input channel strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    pub level: u8,
    pub mute: bool,
    pub solo: bool,
    /// Only meaningful on channels 1..=2
    pub phantom: bool,
    pub fx1: u8,
    pub fx2: u8,
    pub mon1: u8,
    pub mon2: u8,
    pub pan: u8,
    pub gain: u8,
    pub lowcut: u8,
    pub comp: u8,
    pub eq: EqBands,
    pub label: String,
}

impl ChannelState {
    pub const DEFAULT_LEVEL: u8 = 100;
    pub const DEFAULT_GAIN: u8 = 32;

    pub fn new(channel: u8) -> Self {
        Self {
            level: Self::DEFAULT_LEVEL,
            mute: false,
            solo: false,
            phantom: false,
            fx1: 0,
            fx2: 0,
            mon1: 0,
            mon2: 0,
            pan: CENTER,
            gain: Self::DEFAULT_GAIN,
            lowcut: 0,
            comp: 0,
            eq: EqBands::FLAT,
            label: default_label(channel),
        }
    }

    pub fn send(&self, bus: Bus) -> u8 {
        match bus {
            Bus::Fx1 => self.fx1,
            Bus::Fx2 => self.fx2,
            Bus::Mon1 => self.mon1,
            Bus::Mon2 => self.mon2,
        }
    }

    pub fn set_send(&mut self, bus: Bus, value: u8) {
        match bus {
            Bus::Fx1 => self.fx1 = value,
            Bus::Fx2 => self.fx2 = value,
            Bus::Mon1 => self.mon1 = value,
            Bus::Mon2 => self.mon2 = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterState {
    pub level: u8,
    pub limiter: u8,
    pub balance: u8,
}

impl Default for MasterState {
    fn default() -> Self {
        Self {
            level: 110,
            limiter: 0,
            balance: CENTER,
        }
    }
}

/// Level and limiter of one output bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusStrip {
    pub level: u8,
    pub limiter: u8,
}

impl Default for BusStrip {
    fn default() -> Self {
        Self {
            level: 110,
            limiter: 0,
        }
    }
}

/// FX and monitor bus pairs. With `stereo_link` set, mon2 follows mon1 and
/// cannot be driven on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusPairs {
    pub fx1: BusStrip,
    pub fx2: BusStrip,
    pub mon1: BusStrip,
    pub mon2: BusStrip,
    pub stereo_link: bool,
}

impl BusPairs {
    pub fn strip(&self, bus: Bus) -> &BusStrip {
        match bus {
            Bus::Fx1 => &self.fx1,
            Bus::Fx2 => &self.fx2,
            Bus::Mon1 => &self.mon1,
            Bus::Mon2 => &self.mon2,
        }
    }

    pub fn strip_mut(&mut self, bus: Bus) -> &mut BusStrip {
        match bus {
            Bus::Fx1 => &mut self.fx1,
            Bus::Fx2 => &mut self.fx2,
            Bus::Mon1 => &mut self.mon1,
            Bus::Mon2 => &mut self.mon2,
        }
    }
}

/// Preset (1-based) and parameters of one FX engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FxSettings {
    pub preset: u8,
    pub param1: u8,
    pub param2: u8,
}

impl Default for FxSettings {
    fn default() -> Self {
        Self {
            preset: 1,
            param1: 0,
            param2: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FxState {
    pub fx1: FxSettings,
    pub fx2: FxSettings,
}

impl FxState {
    pub fn engine(&self, engine: FxEngine) -> &FxSettings {
        match engine {
            FxEngine::Fx1 => &self.fx1,
            FxEngine::Fx2 => &self.fx2,
        }
    }

    pub fn engine_mut(&mut self, engine: FxEngine) -> &mut FxSettings {
        match engine {
            FxEngine::Fx1 => &mut self.fx1,
            FxEngine::Fx2 => &mut self.fx2,
        }
    }
}

/// Global toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Soloing one channel un-solos all others
    pub exclusive_solo: bool,
    /// Apply the logarithmic taper to transmitted fader values
    pub log_taper: bool,
}
