//! MIDI message types and the FLOW 8 controller map
//!
//! Outbound-only: the panel never parses input, it only encodes the messages
//! it sends to the mixer.

use std::fmt;

/// Value sent for a switched-on boolean control
pub const BOOL_ON: u8 = 127;
/// Value sent for a switched-off boolean control
pub const BOOL_OFF: u8 = 0;

/// Controller value for an on/off switch
pub fn switch_value(on: bool) -> u8 {
    if on {
        BOOL_ON
    } else {
        BOOL_OFF
    }
}

/// Controller numbers on the input channels (1-7)
pub mod cc {
    pub const EQ_LOW: u8 = 1;
    pub const EQ_LOWMID: u8 = 2;
    pub const EQ_HIMID: u8 = 3;
    pub const EQ_HI: u8 = 4;
    pub const MUTE: u8 = 5;
    pub const SOLO: u8 = 6;
    pub const FADER: u8 = 7;
    pub const GAIN: u8 = 8;
    pub const LOWCUT: u8 = 9;
    pub const PAN: u8 = 10;
    pub const COMP: u8 = 11;
    pub const PHANTOM: u8 = 12;
    pub const SEND_MON1: u8 = 14;
    pub const SEND_MON2: u8 = 15;
    pub const SEND_FX1: u8 = 16;
    pub const SEND_FX2: u8 = 17;

    /// Bus and master controllers (on the bus's dedicated channel)
    pub const BUS_LEVEL: u8 = 7;
    pub const BUS_LIMITER: u8 = 8;
    pub const BUS_BALANCE: u8 = 10;

    /// FX engine parameters (on the FX engine channel)
    pub const FX_PARAM1: u8 = 1;
    pub const FX_PARAM2: u8 = 2;

    pub const ALL_SOUND_OFF: u8 = 121;
    pub const ALL_NOTES_OFF: u8 = 123;
}

/// Logical MIDI channels (1-16) of the non-input sections
pub mod channel {
    pub const MASTER: u8 = 8;
    pub const MON1_BUS: u8 = 9;
    pub const MON2_BUS: u8 = 10;
    pub const FX1_BUS: u8 = 11;
    pub const FX2_BUS: u8 = 12;
    pub const FX1_ENGINE: u8 = 14;
    pub const FX2_ENGINE: u8 = 15;
    pub const SNAPSHOT: u8 = 16;
    pub const TAP_TEMPO: u8 = 16;
}

/// Note used to tap the FX tempo
pub const TAP_TEMPO_NOTE: u8 = 60;

/// Outbound MIDI message. `channel` is the wire nibble (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },
}

/// Wire nibble for a 1-based logical channel
pub fn channel_nibble(logical: u8) -> u8 {
    logical.wrapping_sub(1) & 0x0F
}

impl MidiMessage {
    /// Note On addressed by 1-based logical channel
    pub fn note_on(note: u8, velocity: u8, logical_channel: u8) -> Self {
        MidiMessage::NoteOn {
            channel: channel_nibble(logical_channel),
            note: note & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    /// Note Off addressed by 1-based logical channel
    pub fn note_off(note: u8, logical_channel: u8) -> Self {
        MidiMessage::NoteOff {
            channel: channel_nibble(logical_channel),
            note: note & 0x7F,
            velocity: 0,
        }
    }

    /// Control Change addressed by 1-based logical channel
    pub fn cc(controller: u8, value: u8, logical_channel: u8) -> Self {
        MidiMessage::ControlChange {
            channel: channel_nibble(logical_channel),
            cc: controller & 0x7F,
            value: value & 0x7F,
        }
    }

    /// Program Change with a 1-based program on a 1-based logical channel
    pub fn program(program: u8, logical_channel: u8) -> Self {
        MidiMessage::ProgramChange {
            channel: channel_nibble(logical_channel),
            program: program.wrapping_sub(1) & 0x7F,
        }
    }

    /// Encode the message to MIDI bytes
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                vec![0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::ProgramChange { channel, program } => {
                vec![0xC0 | (channel & 0x0F), program & 0x7F]
            }
        }
    }

    /// Wire channel (0-15)
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOff { channel, .. }
            | MidiMessage::NoteOn { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. } => channel,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
        }
    }
}

/// Recovery broadcast: for all 16 channels, All-Sound-Off, All-Notes-Off,
/// Mute off and Solo off.
pub fn panic_sequence() -> Vec<MidiMessage> {
    (1..=16u8)
        .flat_map(|ch| {
            [
                MidiMessage::cc(cc::ALL_SOUND_OFF, 0, ch),
                MidiMessage::cc(cc::ALL_NOTES_OFF, 0, ch),
                MidiMessage::cc(cc::MUTE, BOOL_OFF, ch),
                MidiMessage::cc(cc::SOLO, BOOL_OFF, ch),
            ]
        })
        .collect()
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
