//! Message sequences that re-drive the mixer from state
//!
//! The mixer keeps no memory of its own, so resets and scene loads send every
//! value again. Mon2-targeted messages are left out while the monitor pair is
//! stereo-linked.

use crate::midi::{cc, channel, switch_value, MidiMessage};
use crate::state::{Bus, Control, EqBand, FxEngine, PanelState};

/// Continuous controls of one channel, in transmission order around the
/// mute/solo switches
fn sends(ch: u8) -> [Control; 4] {
    [
        Control::Send(ch, Bus::Fx1),
        Control::Send(ch, Bus::Fx2),
        Control::Send(ch, Bus::Mon1),
        Control::Send(ch, Bus::Mon2),
    ]
}

fn preamp(ch: u8) -> impl Iterator<Item = Control> {
    [Control::Gain(ch), Control::LowCut(ch), Control::Comp(ch)]
        .into_iter()
        .chain(EqBand::all().iter().map(move |band| Control::Eq(ch, *band)))
}

fn push(out: &mut Vec<MidiMessage>, state: &PanelState, control: Control) {
    if control.targets_mon2() && state.buses.stereo_link {
        return;
    }
    if let Ok(value) = state.value(control) {
        out.push(control.message(value, state.options.log_taper));
    }
}

/// Fader, mute, solo, sends, pan, then preamp and EQ (channels 1-6) and 48V
/// (channels 1-2)
pub fn channel_messages(state: &PanelState, ch: u8) -> Vec<MidiMessage> {
    let mut out = Vec::new();
    let Ok(strip) = state.channel(ch) else {
        return out;
    };

    push(&mut out, state, Control::Fader(ch));
    out.push(MidiMessage::cc(cc::MUTE, switch_value(strip.mute), ch));
    out.push(MidiMessage::cc(cc::SOLO, switch_value(strip.solo), ch));
    for send in sends(ch) {
        push(&mut out, state, send);
    }
    push(&mut out, state, Control::Pan(ch));
    if PanelState::has_preamp(ch) {
        for control in preamp(ch) {
            push(&mut out, state, control);
        }
    }
    if PanelState::has_phantom(ch) {
        out.push(MidiMessage::cc(cc::PHANTOM, switch_value(strip.phantom), ch));
    }
    out
}

pub fn master_messages(state: &PanelState) -> Vec<MidiMessage> {
    let mut out = Vec::new();
    for control in [
        Control::MasterLevel,
        Control::MasterLimiter,
        Control::MasterBalance,
    ] {
        push(&mut out, state, control);
    }
    out
}

/// Bus levels first, then bus limiters
pub fn bus_messages(state: &PanelState) -> Vec<MidiMessage> {
    let mut out = Vec::new();
    for bus in Bus::all() {
        push(&mut out, state, Control::BusLevel(*bus));
    }
    for bus in Bus::all() {
        push(&mut out, state, Control::BusLimiter(*bus));
    }
    out
}

/// Preset, param1 and param2 of each FX engine
pub fn fx_messages(state: &PanelState) -> Vec<MidiMessage> {
    let mut out = Vec::new();
    for engine in FxEngine::all() {
        let settings = state.fx.engine(*engine);
        out.push(MidiMessage::program(settings.preset, engine.midi_channel()));
        push(&mut out, state, Control::FxParam1(*engine));
        push(&mut out, state, Control::FxParam2(*engine));
    }
    out
}

/// Everything needed to bring the mixer to `state`
pub fn full_sequence(state: &PanelState) -> Vec<MidiMessage> {
    let mut out = Vec::new();
    for ch in PanelState::channel_numbers() {
        out.extend(channel_messages(state, ch));
    }
    out.extend(master_messages(state));
    out.extend(bus_messages(state));
    out.extend(fx_messages(state));
    out
}

/// Every continuous control the panel shows a readout for
pub fn all_controls() -> Vec<Control> {
    let mut out = Vec::new();
    for ch in PanelState::channel_numbers() {
        out.push(Control::Fader(ch));
        out.push(Control::Pan(ch));
        out.extend(sends(ch));
        if PanelState::has_preamp(ch) {
            out.extend(preamp(ch));
        }
    }
    out.extend([
        Control::MasterLevel,
        Control::MasterLimiter,
        Control::MasterBalance,
    ]);
    for bus in Bus::all() {
        out.push(Control::BusLevel(*bus));
        out.push(Control::BusLimiter(*bus));
    }
    for engine in FxEngine::all() {
        out.push(Control::FxParam1(*engine));
        out.push(Control::FxParam2(*engine));
    }
    out
}

/// Tap-tempo note pair. The mixer takes taps as a note on its tap channel,
/// Program-Change there would recall a snapshot instead.
pub fn tap_tempo() -> [MidiMessage; 2] {
    [
        MidiMessage::note_on(crate::midi::TAP_TEMPO_NOTE, 127, channel::TAP_TEMPO),
        MidiMessage::note_off(crate::midi::TAP_TEMPO_NOTE, channel::TAP_TEMPO),
    ]
}
