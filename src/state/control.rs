//! Continuous controls of the panel
//!
//! Every fader and knob is one [`Control`] variant. The variant decides the
//! value range, the readout format and the outgoing MIDI message.

use super::types::{Bus, EqBand, FxEngine, COMP_MAX, LEVEL_MAX};
use crate::codec;
use crate::midi::{cc, channel, MidiMessage};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Channel fader
    Fader(u8),
    Pan(u8),
    Send(u8, Bus),
    Gain(u8),
    LowCut(u8),
    Comp(u8),
    Eq(u8, EqBand),
    MasterLevel,
    MasterLimiter,
    MasterBalance,
    BusLevel(Bus),
    BusLimiter(Bus),
    FxParam1(FxEngine),
    FxParam2(FxEngine),
}

/// Failure to parse a control name such as `ch3.fader`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control '{0}'")]
pub struct ParseControlError(pub String);

impl Control {
    /// Input channel the control belongs to, if any
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Control::Fader(ch)
            | Control::Pan(ch)
            | Control::Send(ch, _)
            | Control::Gain(ch)
            | Control::LowCut(ch)
            | Control::Comp(ch)
            | Control::Eq(ch, _) => Some(ch),
            _ => None,
        }
    }

    /// Largest accepted value
    pub fn max(&self) -> u8 {
        match self {
            Control::Comp(_) => COMP_MAX,
            _ => LEVEL_MAX,
        }
    }

    /// Clamp an arbitrary gesture result into the control's range
    pub fn clamp(&self, value: i32) -> u8 {
        value.clamp(0, i32::from(self.max())) as u8
    }

    /// Controls that belong to the second monitor bus and go silent while
    /// the monitor pair is stereo-linked
    pub fn targets_mon2(&self) -> bool {
        matches!(
            self,
            Control::Send(_, Bus::Mon2) | Control::BusLevel(Bus::Mon2) | Control::BusLimiter(Bus::Mon2)
        )
    }

    /// Faders go through the taper before transmission
    pub fn is_fader(&self) -> bool {
        matches!(
            self,
            Control::Fader(_) | Control::MasterLevel | Control::BusLevel(_)
        )
    }

    /// Readout text for a raw value
    pub fn display(&self, value: u8) -> String {
        match self {
            Control::Fader(_) | Control::MasterLevel | Control::BusLevel(_) => {
                codec::fader_db(value)
            }
            Control::Pan(_) => codec::pan_display(value),
            Control::MasterBalance => codec::balance_display(value),
            Control::Gain(_) => codec::gain_display(value),
            Control::LowCut(_) => codec::low_cut_display(value),
            Control::Comp(_) => codec::comp_display(value),
            Control::Eq(_, _) => codec::eq_display(value),
            Control::FxParam1(_) => codec::percent_display(value, LEVEL_MAX),
            Control::FxParam2(_) => value.to_string(),
            Control::Send(_, _) | Control::MasterLimiter | Control::BusLimiter(_) => {
                codec::send_display(value)
            }
        }
    }

    /// Message that drives the device to `value`
    pub fn message(&self, value: u8, log_taper: bool) -> MidiMessage {
        let out = if self.is_fader() {
            codec::map_fader_out(value, log_taper)
        } else {
            value
        };
        let (controller, midi_channel) = match *self {
            Control::Fader(ch) => (cc::FADER, ch),
            Control::Pan(ch) => (cc::PAN, ch),
            Control::Send(ch, bus) => (bus.send_cc(), ch),
            Control::Gain(ch) => (cc::GAIN, ch),
            Control::LowCut(ch) => (cc::LOWCUT, ch),
            Control::Comp(ch) => (cc::COMP, ch),
            Control::Eq(ch, band) => (band.cc(), ch),
            Control::MasterLevel => (cc::BUS_LEVEL, channel::MASTER),
            Control::MasterLimiter => (cc::BUS_LIMITER, channel::MASTER),
            Control::MasterBalance => (cc::BUS_BALANCE, channel::MASTER),
            Control::BusLevel(bus) => (cc::FADER, bus.midi_channel()),
            Control::BusLimiter(bus) => (cc::BUS_LIMITER, bus.midi_channel()),
            Control::FxParam1(engine) => (cc::FX_PARAM1, engine.midi_channel()),
            Control::FxParam2(engine) => (cc::FX_PARAM2, engine.midi_channel()),
        };
        MidiMessage::cc(controller, out, midi_channel)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Fader(ch) => write!(f, "ch{}.fader", ch),
            Control::Pan(ch) => write!(f, "ch{}.pan", ch),
            Control::Send(ch, bus) => write!(f, "ch{}.{}", ch, bus),
            Control::Gain(ch) => write!(f, "ch{}.gain", ch),
            Control::LowCut(ch) => write!(f, "ch{}.lowcut", ch),
            Control::Comp(ch) => write!(f, "ch{}.comp", ch),
            Control::Eq(ch, band) => write!(f, "ch{}.eq.{}", ch, band),
            Control::MasterLevel => f.write_str("master.level"),
            Control::MasterLimiter => f.write_str("master.limiter"),
            Control::MasterBalance => f.write_str("master.balance"),
            Control::BusLevel(bus) => write!(f, "bus.{}.level", bus),
            Control::BusLimiter(bus) => write!(f, "bus.{}.limiter", bus),
            Control::FxParam1(engine) => write!(f, "{}.param1", engine),
            Control::FxParam2(engine) => write!(f, "{}.param2", engine),
        }
    }
}

impl FromStr for Control {
    type Err = ParseControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseControlError(s.to_string());
        let lowered = s.trim().to_lowercase();
        let parts: Vec<&str> = lowered.split('.').collect();

        match parts.as_slice() {
            ["master", "level"] => Ok(Control::MasterLevel),
            ["master", "limiter"] => Ok(Control::MasterLimiter),
            ["master", "balance"] => Ok(Control::MasterBalance),
            ["bus", bus, "level"] => Bus::parse(bus).map(Control::BusLevel).ok_or_else(err),
            ["bus", bus, "limiter"] => Bus::parse(bus).map(Control::BusLimiter).ok_or_else(err),
            [engine, "param1"] => FxEngine::parse(engine)
                .map(Control::FxParam1)
                .ok_or_else(err),
            [engine, "param2"] => FxEngine::parse(engine)
                .map(Control::FxParam2)
                .ok_or_else(err),
            [strip, rest @ ..] => {
                let ch: u8 = strip
                    .strip_prefix("ch")
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(err)?;
                match rest {
                    ["fader"] => Ok(Control::Fader(ch)),
                    ["pan"] => Ok(Control::Pan(ch)),
                    ["gain"] => Ok(Control::Gain(ch)),
                    ["lowcut"] => Ok(Control::LowCut(ch)),
                    ["comp"] => Ok(Control::Comp(ch)),
                    ["eq", band] => EqBand::parse(band)
                        .map(|b| Control::Eq(ch, b))
                        .ok_or_else(err),
                    [bus] => Bus::parse(bus).map(|b| Control::Send(ch, b)).ok_or_else(err),
                    _ => Err(err()),
                }
            }
            _ => Err(err()),
        }
    }
}
